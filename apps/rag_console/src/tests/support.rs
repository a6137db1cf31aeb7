//! In-memory backend for exercising the orchestrators without a server.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use client_core::{RagBackend, UploadFile};
use crossbeam_channel::{Receiver, Sender};
use shared::{
    domain::{CatalogEntry, ChatMessage, Document, QueryResult, SystemInfo, WorldBankInfo},
    error::ClientError,
    protocol::{QueryRequest, UpdateKnowledgeRequest, UpdateKnowledgeResponse, UploadResponse},
};
use tokio::sync::Mutex as AsyncMutex;

use crate::{
    controller::{
        events::UiEvent,
        orchestration::{Console, QueryLimits, SharedView},
    },
    view::ViewState,
};

pub struct FakeBackend {
    pub system_info: Result<SystemInfo, ClientError>,
    pub worldbank_info: Result<WorldBankInfo, ClientError>,
    pub documents: Result<Vec<Document>, ClientError>,
    pub upload: Result<UploadResponse, ClientError>,
    pub update: Result<UpdateKnowledgeResponse, ClientError>,
    pub answer: Result<QueryResult, ClientError>,
    pub countries: Result<Vec<CatalogEntry>, ClientError>,
    pub indicators: Result<Vec<CatalogEntry>, ClientError>,
    /// Endpoint names in call order.
    pub calls: Mutex<Vec<&'static str>>,
    pub queries: Mutex<Vec<QueryRequest>>,
    pub updates: Mutex<Vec<UpdateKnowledgeRequest>>,
    pub uploads: Mutex<Vec<UploadFile>>,
    /// When set, the chat log is captured while a question is in flight.
    pub observer: Option<SharedView>,
    pub chat_in_flight: Mutex<Vec<ChatMessage>>,
    /// When set, the number of front-end events already queued is recorded
    /// while a question is in flight.
    pub ui_watch: Option<Receiver<UiEvent>>,
    pub ui_events_in_flight: Mutex<Option<usize>>,
}

impl Default for FakeBackend {
    fn default() -> Self {
        Self {
            system_info: Ok(SystemInfo {
                success: true,
                document_count: 2,
                chunk_count: 10,
                model_loaded: true,
                model_name: Some("mistral-7b".into()),
                message: None,
            }),
            worldbank_info: Ok(WorldBankInfo {
                success: true,
                api_status: "online".into(),
                server_status: "ready".into(),
                document_count: 5,
                chunk_count: 50,
                ..WorldBankInfo::default()
            }),
            documents: Ok(vec![Document {
                filename: "report.pdf".into(),
                chunk_count: 4,
            }]),
            upload: Ok(UploadResponse {
                success: true,
                doc_id: Some("doc-1".into()),
                message: None,
            }),
            update: Ok(UpdateKnowledgeResponse {
                success: true,
                message: None,
            }),
            answer: Ok(QueryResult {
                success: true,
                answer: Some("GDP is the value of output.".into()),
                sources: None,
                message: None,
            }),
            countries: Ok(vec![CatalogEntry {
                id: "FRA".into(),
                name: "France".into(),
            }]),
            indicators: Ok(vec![CatalogEntry {
                id: "NY.GDP.MKTP.CD".into(),
                name: "GDP (current US$)".into(),
            }]),
            calls: Mutex::new(Vec::new()),
            queries: Mutex::new(Vec::new()),
            updates: Mutex::new(Vec::new()),
            uploads: Mutex::new(Vec::new()),
            observer: None,
            chat_in_flight: Mutex::new(Vec::new()),
            ui_watch: None,
            ui_events_in_flight: Mutex::new(None),
        }
    }
}

impl FakeBackend {
    fn record(&self, endpoint: &'static str) {
        self.calls.lock().expect("calls lock").push(endpoint);
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().expect("calls lock").clone()
    }

    pub fn count(&self, endpoint: &str) -> usize {
        self.calls().iter().filter(|call| **call == endpoint).count()
    }

    async fn answer_for(&self, request: &QueryRequest) -> Result<QueryResult, ClientError> {
        self.queries
            .lock()
            .expect("queries lock")
            .push(request.clone());
        if let Some(view) = &self.observer {
            let snapshot = view
                .lock()
                .await
                .chat()
                .iter()
                .map(|entry| entry.message.clone())
                .collect();
            *self.chat_in_flight.lock().expect("snapshot lock") = snapshot;
        }
        if let Some(ui_rx) = &self.ui_watch {
            *self.ui_events_in_flight.lock().expect("ui watch lock") = Some(ui_rx.len());
        }
        self.answer.clone()
    }
}

#[async_trait]
impl RagBackend for FakeBackend {
    async fn system_info(&self) -> Result<SystemInfo, ClientError> {
        self.record("system_info");
        self.system_info.clone()
    }

    async fn worldbank_info(&self) -> Result<WorldBankInfo, ClientError> {
        self.record("worldbank_info");
        self.worldbank_info.clone()
    }

    async fn update_worldbank_knowledge(
        &self,
        request: &UpdateKnowledgeRequest,
    ) -> Result<UpdateKnowledgeResponse, ClientError> {
        self.record("update_worldbank_knowledge");
        self.updates
            .lock()
            .expect("updates lock")
            .push(request.clone());
        self.update.clone()
    }

    async fn query_worldbank(&self, request: &QueryRequest) -> Result<QueryResult, ClientError> {
        self.record("query_worldbank");
        self.answer_for(request).await
    }

    async fn list_documents(&self) -> Result<Vec<Document>, ClientError> {
        self.record("list_documents");
        self.documents.clone()
    }

    async fn upload_document(&self, file: UploadFile) -> Result<UploadResponse, ClientError> {
        self.record("upload_document");
        self.uploads.lock().expect("uploads lock").push(file);
        self.upload.clone()
    }

    async fn query(&self, request: &QueryRequest) -> Result<QueryResult, ClientError> {
        self.record("query");
        self.answer_for(request).await
    }

    async fn worldbank_countries(&self) -> Result<Vec<CatalogEntry>, ClientError> {
        self.record("worldbank_countries");
        self.countries.clone()
    }

    async fn worldbank_indicators(&self) -> Result<Vec<CatalogEntry>, ClientError> {
        self.record("worldbank_indicators");
        self.indicators.clone()
    }
}

pub fn shared_view() -> SharedView {
    Arc::new(AsyncMutex::new(ViewState::new()))
}

pub fn console(backend: FakeBackend) -> Console<FakeBackend> {
    Console::new(backend, shared_view(), QueryLimits::default())
}

/// Console whose backend snapshots the chat log during each question.
pub fn observed_console(mut backend: FakeBackend) -> Console<FakeBackend> {
    let view = shared_view();
    backend.observer = Some(Arc::clone(&view));
    Console::new(backend, view, QueryLimits::default())
}

/// Console whose page streams every change into the returned channel.
pub fn streaming_console(
    mut backend: FakeBackend,
) -> (Console<FakeBackend>, Sender<UiEvent>, Receiver<UiEvent>) {
    let (ui_tx, ui_rx) = crossbeam_channel::unbounded();
    let mut page = ViewState::new();
    page.attach(ui_tx.clone());
    backend.ui_watch = Some(ui_rx.clone());
    let console = Console::new(backend, Arc::new(AsyncMutex::new(page)), QueryLimits::default());
    (console, ui_tx, ui_rx)
}

pub fn sample_file() -> UploadFile {
    UploadFile {
        filename: "notes.txt".into(),
        mime_type: Some("text/plain".into()),
        bytes: b"hello world".to_vec(),
    }
}
