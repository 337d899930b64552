//! Command orchestration helpers from UI actions to backend command queue.

use crossbeam_channel::{Sender, TrySendError};

use crate::backend_bridge::commands::BackendCommand;

/// Queues a command for the backend worker. Returns false when the command
/// could not be queued, so the caller can release its busy state instead of
/// waiting for an event that will never come.
pub fn dispatch_backend_command(
    cmd_tx: &Sender<BackendCommand>,
    cmd: BackendCommand,
    status: &mut String,
) -> bool {
    let cmd_name = match &cmd {
        BackendCommand::UploadPdf { .. } => "upload_pdf",
        BackendCommand::Search { .. } => "search",
        BackendCommand::Grade { .. } => "grade",
        BackendCommand::Evaluate { .. } => "evaluate",
    };

    match cmd_tx.try_send(cmd) {
        Ok(()) => {
            tracing::debug!(command = cmd_name, "queued ui->backend command");
            true
        }
        Err(TrySendError::Full(_)) => {
            *status = "Очередь команд переполнена, повторите попытку".to_string();
            false
        }
        Err(TrySendError::Disconnected(_)) => {
            *status = "Фоновый обработчик недоступен, перезапустите приложение".to_string();
            false
        }
    }
}
