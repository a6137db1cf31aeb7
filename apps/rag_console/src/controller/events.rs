//! Form submissions, operation contexts and orchestrator outcomes.

use client_core::UploadFile;
use shared::error::ClientError;

#[derive(Debug, Clone, PartialEq)]
pub enum FormSubmission {
    Upload {
        file: Option<UploadFile>,
    },
    Query {
        question: String,
    },
    WorldBankQuery {
        question: String,
    },
    UpdateKnowledge {
        countries: Vec<String>,
        indicators: Vec<String>,
        include_topics: bool,
    },
}

impl FormSubmission {
    pub fn form_name(&self) -> &'static str {
        match self {
            FormSubmission::Upload { .. } => "upload-form",
            FormSubmission::Query { .. } => "query-form",
            FormSubmission::WorldBankQuery { .. } => "worldbank-query-form",
            FormSubmission::UpdateKnowledge { .. } => "worldbank-form",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationContext {
    SystemInfo,
    WorldBankInfo,
    DocumentList,
    Upload,
    Query,
    WorldBankQuery,
    UpdateKnowledge,
    Catalog,
}

impl OperationContext {
    pub fn as_str(self) -> &'static str {
        match self {
            OperationContext::SystemInfo => "load_system_info",
            OperationContext::WorldBankInfo => "load_worldbank_info",
            OperationContext::DocumentList => "load_document_list",
            OperationContext::Upload => "upload_document",
            OperationContext::Query => "submit_query",
            OperationContext::WorldBankQuery => "query_worldbank",
            OperationContext::UpdateKnowledge => "update_worldbank_knowledge",
            OperationContext::Catalog => "load_worldbank_catalog",
        }
    }
}

/// How an orchestrator invocation ended. Errors stop here.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Succeeded,
    /// The server answered but reported `success = false`.
    Rejected(String),
    Failed(ClientError),
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Succeeded)
    }
}

/// What the form should do once its submission has been handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormDisposition {
    Reset,
    Keep,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubmitResult {
    pub outcome: Outcome,
    pub disposition: FormDisposition,
}

/// Backend worker to front end.
#[derive(Debug, Clone)]
pub enum UiEvent {
    View(crate::view::ViewChange),
    /// Fully assembled page, sent in answer to a render request.
    Page(String),
    Info(String),
    Error(String),
    Settled {
        command: &'static str,
        outcome: Option<Outcome>,
    },
}
