//! Orchestrators: one per user-facing operation. Each one marks its slot as
//! loading, calls the backend, then installs the rendered result or an error
//! view. Failures are converted to view content here and go no further.

use std::sync::Arc;

use client_core::{RagBackend, UploadFile};
use shared::{
    domain::{ChatMessage, SystemInfo},
    error::ClientError,
    protocol::{QueryRequest, UpdateKnowledgeRequest, DEFAULT_MAX_TOKENS, DEFAULT_TOP_K},
};
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::{
    app_state::AppState,
    controller::events::{OperationContext, Outcome},
    view::{
        render::{self, describe_error},
        Html, Slot, ViewState,
    },
};

pub type SharedView = Arc<Mutex<ViewState>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryLimits {
    pub top_k: u32,
    pub max_tokens: u32,
}

impl Default for QueryLimits {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum QueryTarget {
    Documents,
    WorldBank,
}

impl QueryTarget {
    fn context(self) -> OperationContext {
        match self {
            QueryTarget::Documents => OperationContext::Query,
            QueryTarget::WorldBank => OperationContext::WorldBankQuery,
        }
    }
}

fn prefixed_error(message: &str) -> Html {
    render::error_alert(&format!("Error: {message}"))
}

fn document_list_failure(message: &str) -> Html {
    render::document_list_error(&format!("{} {message}", render::DOCUMENT_LIST_FAILURE))
}

fn rejection_text(message: Option<&str>, fallback: &str) -> String {
    message
        .map(str::trim)
        .filter(|message| !message.is_empty())
        .unwrap_or(fallback)
        .to_string()
}

pub struct Console<B: RagBackend> {
    backend: B,
    view: SharedView,
    state: Mutex<AppState>,
    limits: QueryLimits,
}

impl<B: RagBackend> Console<B> {
    pub fn new(backend: B, view: SharedView, limits: QueryLimits) -> Self {
        Self {
            backend,
            view,
            state: Mutex::new(AppState::default()),
            limits,
        }
    }

    #[cfg(test)]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn view(&self) -> &SharedView {
        &self.view
    }

    pub async fn last_system_info(&self) -> Option<SystemInfo> {
        self.state.lock().await.last_system_info.clone()
    }

    pub async fn is_loaded(&self) -> bool {
        self.state.lock().await.is_loaded()
    }

    pub(crate) async fn initialize_state(&self) {
        *self.state.lock().await = AppState::initialize();
    }

    /// Page unload: drops cached state and the rendered page.
    pub async fn unload(&self) {
        self.state.lock().await.teardown();
        self.view.lock().await.clear();
        info!("console state torn down");
    }

    async fn fail(
        &self,
        context: OperationContext,
        slot: Slot,
        err: ClientError,
        to_html: fn(&str) -> Html,
    ) -> Outcome {
        warn!(operation = context.as_str(), error = %err, "operation failed");
        let html = to_html(&describe_error(&err));
        self.view.lock().await.finish(slot, html, false);
        Outcome::Failed(err)
    }

    /// Loads the system summary, then always follows with the World Bank
    /// summary.
    pub async fn load_system_info(&self) -> Outcome {
        let outcome = self.load_system_summary().await;
        self.load_worldbank_info().await;
        outcome
    }

    async fn load_system_summary(&self) -> Outcome {
        let slot = Slot::SystemInfo;
        self.view
            .lock()
            .await
            .begin_loading(slot, render::LOADING_SYSTEM_INFO);

        match self.backend.system_info().await {
            Ok(info) => {
                let outcome = if info.success {
                    Outcome::Succeeded
                } else {
                    Outcome::Rejected(rejection_text(
                        info.message.as_deref(),
                        render::SYSTEM_INFO_FALLBACK,
                    ))
                };
                self.view
                    .lock()
                    .await
                    .finish(slot, render::system_info(&info), info.success);
                self.state.lock().await.last_system_info = Some(info);
                outcome
            }
            Err(err) => {
                self.fail(OperationContext::SystemInfo, slot, err, render::error_alert)
                    .await
            }
        }
    }

    pub async fn load_worldbank_info(&self) -> Outcome {
        let slot = Slot::WorldBankInfo;
        self.view
            .lock()
            .await
            .begin_loading(slot, render::LOADING_SYSTEM_INFO);

        match self.backend.worldbank_info().await {
            Ok(info) => {
                self.view
                    .lock()
                    .await
                    .finish(slot, render::worldbank_info(&info), info.success);
                if info.success {
                    Outcome::Succeeded
                } else {
                    Outcome::Rejected(rejection_text(
                        info.message.as_deref(),
                        render::SYSTEM_INFO_FALLBACK,
                    ))
                }
            }
            Err(err) => {
                self.fail(
                    OperationContext::WorldBankInfo,
                    slot,
                    err,
                    render::error_alert,
                )
                .await
            }
        }
    }

    pub async fn load_document_list(&self) -> Outcome {
        let slot = Slot::DocumentList;
        self.view
            .lock()
            .await
            .begin_loading(slot, render::LOADING_DOCUMENTS);

        match self.backend.list_documents().await {
            Ok(documents) => {
                info!(count = documents.len(), "document list loaded");
                self.view
                    .lock()
                    .await
                    .finish(slot, render::document_list(&documents), true);
                Outcome::Succeeded
            }
            Err(err) => {
                self.fail(
                    OperationContext::DocumentList,
                    slot,
                    err,
                    document_list_failure,
                )
                .await
            }
        }
    }

    /// System info and the document list, issued back-to-back without
    /// waiting for each other.
    pub async fn refresh_data(&self) -> Outcome {
        let (system, documents) =
            futures::join!(self.load_system_info(), self.load_document_list());
        if system.is_success() {
            documents
        } else {
            system
        }
    }

    pub async fn upload_document(&self, file: UploadFile) -> Outcome {
        let slot = Slot::UploadStatus;
        let filename = file.filename.clone();
        self.view
            .lock()
            .await
            .begin_loading(slot, render::LOADING_UPLOAD);

        match self.backend.upload_document(file).await {
            Ok(response) => {
                self.view
                    .lock()
                    .await
                    .finish(slot, render::upload_result(&response), response.success);
                if response.success {
                    info!(%filename, doc_id = ?response.doc_id, "document uploaded");
                    self.refresh_data().await;
                    Outcome::Succeeded
                } else {
                    Outcome::Rejected(rejection_text(
                        response.message.as_deref(),
                        render::GENERIC_FAILURE,
                    ))
                }
            }
            Err(err) => {
                self.fail(OperationContext::Upload, slot, err, prefixed_error)
                    .await
            }
        }
    }

    pub async fn update_worldbank_knowledge(&self, request: UpdateKnowledgeRequest) -> Outcome {
        let slot = Slot::UpdateStatus;
        self.view
            .lock()
            .await
            .begin_loading(slot, render::LOADING_KNOWLEDGE_UPDATE);
        info!(
            countries = request.countries.len(),
            indicators = request.indicators.len(),
            include_topics = request.include_topics,
            "updating World Bank knowledge base"
        );

        match self.backend.update_worldbank_knowledge(&request).await {
            Ok(response) => {
                self.view.lock().await.finish(
                    slot,
                    render::knowledge_update_result(&response),
                    response.success,
                );
                if response.success {
                    self.load_worldbank_info().await;
                    Outcome::Succeeded
                } else {
                    Outcome::Rejected(rejection_text(
                        response.message.as_deref(),
                        render::GENERIC_FAILURE,
                    ))
                }
            }
            Err(err) => {
                self.fail(
                    OperationContext::UpdateKnowledge,
                    slot,
                    err,
                    prefixed_error,
                )
                .await
            }
        }
    }

    pub async fn submit_query(&self, question: &str) -> Outcome {
        self.ask(QueryTarget::Documents, question).await
    }

    pub async fn query_worldbank(&self, question: &str) -> Outcome {
        self.ask(QueryTarget::WorldBank, question).await
    }

    /// Chat flow: the user entry and a loading placeholder go in first; the
    /// placeholder is removed before the resolved entry is appended.
    async fn ask(&self, target: QueryTarget, question: &str) -> Outcome {
        let placeholder = {
            let mut view = self.view.lock().await;
            view.push_chat(ChatMessage::user(question));
            view.push_chat(ChatMessage::loading())
        };

        let request = QueryRequest::new(question)
            .with_limits(self.limits.top_k, self.limits.max_tokens);
        let result = match target {
            QueryTarget::Documents => self.backend.query(&request).await,
            QueryTarget::WorldBank => self.backend.query_worldbank(&request).await,
        };

        let mut view = self.view.lock().await;
        view.remove_chat(placeholder);
        match result {
            Ok(result) if result.success => {
                info!(
                    operation = target.context().as_str(),
                    sources = result.sources().len(),
                    "question answered"
                );
                view.push_chat(ChatMessage::answer(result));
                Outcome::Succeeded
            }
            Ok(result) => {
                let message = rejection_text(result.message.as_deref(), render::GENERIC_FAILURE);
                view.push_chat(ChatMessage::system(format!("Error: {message}")));
                Outcome::Rejected(message)
            }
            Err(err) => {
                warn!(operation = target.context().as_str(), error = %err, "operation failed");
                view.push_chat(ChatMessage::system(format!(
                    "Error: {}",
                    describe_error(&err)
                )));
                Outcome::Failed(err)
            }
        }
    }

    /// Fills the country and indicator pickers of the knowledge-update form.
    pub async fn load_worldbank_catalog(&self) -> Outcome {
        {
            let mut view = self.view.lock().await;
            view.begin_loading(Slot::CountryOptions, render::LOADING_CATALOG);
            view.begin_loading(Slot::IndicatorOptions, render::LOADING_CATALOG);
        }

        let (countries, indicators) = futures::join!(
            self.backend.worldbank_countries(),
            self.backend.worldbank_indicators()
        );

        let mut outcomes = Vec::with_capacity(2);
        for (slot, name, catalog) in [
            (Slot::CountryOptions, "country", countries),
            (Slot::IndicatorOptions, "indicator", indicators),
        ] {
            let outcome = match catalog {
                Ok(entries) => {
                    self.view.lock().await.finish(
                        slot,
                        render::catalog_options(name, &entries),
                        true,
                    );
                    Outcome::Succeeded
                }
                Err(err) => {
                    self.fail(OperationContext::Catalog, slot, err, render::error_alert)
                        .await
                }
            };
            outcomes.push(outcome);
        }

        outcomes
            .into_iter()
            .find(|outcome| !outcome.is_success())
            .unwrap_or(Outcome::Succeeded)
    }
}

#[cfg(test)]
#[path = "../tests/orchestration_tests.rs"]
mod tests;
