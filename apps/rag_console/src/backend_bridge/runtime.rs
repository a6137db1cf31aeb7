//! Backend worker: owns the async runtime and the console, executes queued
//! commands one at a time and reports view changes back to the front end.

use std::{
    path::Path,
    sync::Arc,
    thread::{self, JoinHandle},
};

use anyhow::Context;
use client_core::{RagBackend, RagClient, UploadFile};
use crossbeam_channel::{Receiver, Sender};
use tokio::sync::Mutex;
use tracing::{error, info};
use url::Url;

use crate::{
    backend_bridge::commands::BackendCommand,
    controller::{
        events::{FormSubmission, UiEvent},
        orchestration::{Console, QueryLimits},
    },
    view::{page::render_document, ViewState},
};

pub const PAGE_TITLE: &str = "RAG Console";

pub fn launch(
    origin: Url,
    limits: QueryLimits,
    cmd_rx: Receiver<BackendCommand>,
    ui_tx: Sender<UiEvent>,
) -> anyhow::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("rag-console-backend".into())
        .spawn(move || {
            let runtime = match tokio::runtime::Runtime::new() {
                Ok(runtime) => runtime,
                Err(err) => {
                    error!(error = %err, "failed to build backend runtime");
                    let _ = ui_tx.send(UiEvent::Error(format!(
                        "failed to build backend runtime: {err}"
                    )));
                    return;
                }
            };

            info!(origin = %origin, "backend worker started");
            let mut page = ViewState::new();
            page.attach(ui_tx.clone());
            let view = Arc::new(Mutex::new(page));
            let console = Console::new(RagClient::new(&origin), view, limits);

            while let Ok(cmd) = cmd_rx.recv() {
                let shutdown = cmd == BackendCommand::Shutdown;
                runtime.block_on(handle_command(&console, cmd, &ui_tx));
                if shutdown {
                    break;
                }
            }
            info!("backend worker stopped");
        })
        .context("failed to spawn backend worker thread")
}

pub async fn handle_command<B: RagBackend>(
    console: &Console<B>,
    cmd: BackendCommand,
    ui_tx: &Sender<UiEvent>,
) {
    let command = cmd.name();
    let outcome = match cmd {
        BackendCommand::LoadPage => {
            let outcome = console.on_page_load().await;
            if let Some(info) = console.last_system_info().await.filter(|info| info.success) {
                let _ = ui_tx.send(UiEvent::Info(format!(
                    "{} documents, {} chunks indexed",
                    info.document_count, info.chunk_count
                )));
            }
            Some(outcome)
        }
        BackendCommand::Refresh => Some(console.refresh_data().await),
        BackendCommand::RenderPage => {
            if !console.is_loaded().await {
                let _ = ui_tx.send(UiEvent::Info(
                    "page has not been loaded yet; run `page` first for live panels".into(),
                ));
            }
            let page = render_document(&*console.view().lock().await, PAGE_TITLE);
            let _ = ui_tx.send(UiEvent::Page(page));
            None
        }
        BackendCommand::Upload { path } => {
            let file = match path {
                Some(path) => match read_upload(&path).await {
                    Ok(file) => Some(file),
                    Err(err) => {
                        let _ = ui_tx.send(UiEvent::Error(format!("{err:#}")));
                        let _ = ui_tx.send(UiEvent::Settled {
                            command,
                            outcome: None,
                        });
                        return;
                    }
                },
                None => None,
            };
            Some(console.submit(FormSubmission::Upload { file }).await.outcome)
        }
        BackendCommand::Ask { question } => Some(
            console
                .submit(FormSubmission::Query { question })
                .await
                .outcome,
        ),
        BackendCommand::AskWorldBank { question } => Some(
            console
                .submit(FormSubmission::WorldBankQuery { question })
                .await
                .outcome,
        ),
        BackendCommand::UpdateKnowledge {
            countries,
            indicators,
            include_topics,
        } => Some(
            console
                .submit(FormSubmission::UpdateKnowledge {
                    countries,
                    indicators,
                    include_topics,
                })
                .await
                .outcome,
        ),
        BackendCommand::Shutdown => {
            console.unload().await;
            let _ = ui_tx.send(UiEvent::Info("backend worker shutting down".into()));
            None
        }
    };

    let changes = console.view().lock().await.take_changes();
    for change in changes {
        let _ = ui_tx.send(UiEvent::View(change));
    }
    let _ = ui_tx.send(UiEvent::Settled { command, outcome });
}

/// Reads a file selected for upload and guesses its content type.
pub async fn read_upload(path: &Path) -> anyhow::Result<UploadFile> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read '{}'", path.display()))?;
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .with_context(|| format!("'{}' does not name a file", path.display()))?;
    let mime_type = mime_guess::from_path(path)
        .first_raw()
        .map(str::to_string);
    Ok(UploadFile {
        filename,
        mime_type,
        bytes,
    })
}
