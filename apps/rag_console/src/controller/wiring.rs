//! Form handlers: validate synchronously, alert on missing input, then hand
//! the submission to its orchestrator.

use client_core::{RagBackend, UploadFile};
use shared::{
    error::{ClientError, FormField},
    protocol::UpdateKnowledgeRequest,
};
use tracing::{debug, info, warn};

use crate::{
    controller::{
        events::{FormDisposition, FormSubmission, Outcome, SubmitResult},
        orchestration::Console,
    },
    view::render::describe_error,
};

#[derive(Debug, Clone, PartialEq)]
pub enum ValidForm {
    Upload(UploadFile),
    Query(String),
    WorldBankQuery(String),
    UpdateKnowledge(UpdateKnowledgeRequest),
}

fn required_question(question: String) -> Result<String, ClientError> {
    let question = question.trim();
    if question.is_empty() {
        return Err(ClientError::validation(FormField::Question));
    }
    Ok(question.to_string())
}

pub fn validate(submission: FormSubmission) -> Result<ValidForm, ClientError> {
    match submission {
        FormSubmission::Upload { file } => file
            .map(ValidForm::Upload)
            .ok_or(ClientError::validation(FormField::File)),
        FormSubmission::Query { question } => required_question(question).map(ValidForm::Query),
        FormSubmission::WorldBankQuery { question } => {
            required_question(question).map(ValidForm::WorldBankQuery)
        }
        FormSubmission::UpdateKnowledge {
            countries,
            indicators,
            include_topics,
        } => {
            let countries = non_blank(countries);
            if countries.is_empty() {
                return Err(ClientError::validation(FormField::Countries));
            }
            let indicators = non_blank(indicators);
            if indicators.is_empty() {
                return Err(ClientError::validation(FormField::Indicators));
            }
            Ok(ValidForm::UpdateKnowledge(UpdateKnowledgeRequest {
                countries,
                indicators,
                include_topics,
            }))
        }
    }
}

fn non_blank(values: Vec<String>) -> Vec<String> {
    values
        .into_iter()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .collect()
}

impl<B: RagBackend> Console<B> {
    /// Page-load wiring: state is initialized, then the summaries, the
    /// document list and the World Bank pickers load concurrently. Returns
    /// the first failure, if any.
    pub async fn on_page_load(&self) -> Outcome {
        self.initialize_state().await;
        let (data, catalog) =
            futures::join!(self.refresh_data(), self.load_worldbank_catalog());
        info!(
            data_loaded = data.is_success(),
            catalog_loaded = catalog.is_success(),
            "page loaded"
        );
        if data.is_success() {
            catalog
        } else {
            data
        }
    }

    pub async fn submit(&self, submission: FormSubmission) -> SubmitResult {
        let form = submission.form_name();
        let valid = match validate(submission) {
            Ok(valid) => valid,
            Err(err) => {
                warn!(form, error = %err, "form rejected before any request");
                self.view().lock().await.alert(describe_error(&err));
                return SubmitResult {
                    outcome: Outcome::Failed(err),
                    disposition: FormDisposition::Keep,
                };
            }
        };

        debug!(form, "dispatching form submission");
        match valid {
            ValidForm::Upload(file) => {
                let outcome = self.upload_document(file).await;
                let disposition = if outcome.is_success() {
                    FormDisposition::Reset
                } else {
                    FormDisposition::Keep
                };
                SubmitResult {
                    outcome,
                    disposition,
                }
            }
            ValidForm::Query(question) => SubmitResult {
                outcome: self.submit_query(&question).await,
                disposition: FormDisposition::Reset,
            },
            ValidForm::WorldBankQuery(question) => SubmitResult {
                outcome: self.query_worldbank(&question).await,
                disposition: FormDisposition::Reset,
            },
            ValidForm::UpdateKnowledge(request) => SubmitResult {
                outcome: self.update_worldbank_knowledge(request).await,
                disposition: FormDisposition::Keep,
            },
        }
    }
}

#[cfg(test)]
#[path = "../tests/wiring_tests.rs"]
mod tests;
