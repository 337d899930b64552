use clap::Parser;
use crossbeam_channel::bounded;
use eframe::egui;

mod backend_bridge;
mod controller;
mod ui;

use backend_bridge::commands::BackendCommand;
use backend_bridge::runtime::spawn_backend_thread;
use controller::events::UiEvent;
use ui::CoachApp;

/// Desktop client for the RAG coach backend: lecture upload, semantic
/// search, answer grading, and free-form prompt evaluation.
#[derive(Debug, Parser)]
#[command(name = "coach_gui")]
struct Args {
    /// Base URL of the coach API server.
    #[arg(long, default_value = "http://127.0.0.1:8000")]
    server_url: String,
}

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();
    let args = Args::parse();

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(256);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(2048);
    spawn_backend_thread(args.server_url, cmd_rx, ui_tx);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("RAG Coach")
            .with_inner_size([1024.0, 768.0])
            .with_min_inner_size([760.0, 560.0]),
        ..Default::default()
    };
    eframe::run_native(
        "RAG Coach",
        options,
        Box::new(|_cc| Ok(Box::new(CoachApp::new(cmd_tx, ui_rx)))),
    )
}
