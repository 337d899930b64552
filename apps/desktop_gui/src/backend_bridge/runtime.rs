//! Worker thread owning the tokio runtime and the API client. Each queued
//! command becomes exactly one API call and exactly one UI event.

use std::{sync::Arc, thread};

use client_core::{CoachApi, CoachClient, PdfUpload};
use crossbeam_channel::{Receiver, Sender};
use shared::protocol::GradeRequest;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiErrorContext, UiEvent};

pub fn spawn_backend_thread(
    server_url: String,
    cmd_rx: Receiver<BackendCommand>,
    ui_tx: Sender<UiEvent>,
) {
    thread::spawn(move || {
        let _ = ui_tx.try_send(UiEvent::Info("Backend worker starting...".to_string()));
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                    UiErrorContext::BackendStartup,
                    format!("backend worker startup failure: failed to build runtime: {err}"),
                )));
                tracing::error!("failed to build backend runtime: {err}");
                return;
            }
        };

        runtime.block_on(async move {
            let api: Arc<dyn CoachApi> = Arc::new(CoachClient::new(server_url));
            let _ = ui_tx.try_send(UiEvent::Info("Backend worker ready".to_string()));
            run_command_loop(api, cmd_rx, ui_tx).await;
        });
    });
}

async fn run_command_loop(
    api: Arc<dyn CoachApi>,
    cmd_rx: Receiver<BackendCommand>,
    ui_tx: Sender<UiEvent>,
) {
    while let Ok(cmd) = cmd_rx.recv() {
        let event = handle_command(api.as_ref(), cmd).await;
        let _ = ui_tx.try_send(event);
    }
}

async fn handle_command(api: &dyn CoachApi, cmd: BackendCommand) -> UiEvent {
    match cmd {
        BackendCommand::UploadPdf { path, collection } => {
            let bytes = match tokio::fs::read(&path).await {
                Ok(bytes) => bytes,
                Err(err) => {
                    return UiEvent::Error(UiError::from_message(
                        UiErrorContext::Upload,
                        format!("не удалось прочитать файл {}: {err}", path.display()),
                    ))
                }
            };
            let filename = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| "lecture.pdf".to_string());
            let mime_type = Some(
                mime_guess::from_path(&path)
                    .first_or_octet_stream()
                    .essence_str()
                    .to_string(),
            );
            match api
                .upload_pdf(PdfUpload {
                    filename,
                    mime_type,
                    bytes,
                    collection,
                })
                .await
            {
                Ok(response) => UiEvent::UploadFinished(response),
                Err(err) => UiEvent::Error(UiError::from_client_error(UiErrorContext::Upload, &err)),
            }
        }
        BackendCommand::Search { question, top_k } => match api.search(&question, top_k).await {
            Ok(response) => UiEvent::SearchFinished {
                question: response.question.unwrap_or(question),
                hits: response.results,
            },
            Err(err) => UiEvent::Error(UiError::from_client_error(UiErrorContext::Search, &err)),
        },
        BackendCommand::Grade {
            question,
            student_answer,
            lecture_snippet,
        } => {
            let request = GradeRequest {
                question,
                student_answer,
                lecture_snippet,
            };
            match api.grade(&request).await {
                Ok(response) => UiEvent::GradeFinished {
                    result: response.result,
                },
                Err(err) => UiEvent::Error(UiError::from_client_error(UiErrorContext::Grade, &err)),
            }
        }
        BackendCommand::Evaluate { prompt } => match api.evaluate(&prompt).await {
            Ok(response) => UiEvent::EvaluateFinished {
                result: response.result,
            },
            Err(err) => UiEvent::Error(UiError::from_client_error(UiErrorContext::Evaluate, &err)),
        },
    }
}
