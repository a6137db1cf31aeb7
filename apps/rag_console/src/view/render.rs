//! Pure payload-to-markup renderers. None of them can fail: a payload that
//! reports `success = false` gets the warning branch instead.

use std::fmt::Write as _;

use shared::{
    domain::{CatalogEntry, ChatContent, ChatMessage, Document, SystemInfo, WorldBankInfo},
    error::{ClientError, FormField},
    protocol::{UpdateKnowledgeResponse, UploadResponse},
};

use super::slots::{escape, Html};

pub const CONNECTION_ERROR_TEXT: &str =
    "Unable to reach the server. Check that the API is running.";
pub const MALFORMED_RESPONSE_TEXT: &str = "Unexpected response from the server.";
pub const SYSTEM_INFO_FALLBACK: &str = "Unable to retrieve system information.";
pub const GENERIC_FAILURE: &str = "An error occurred";
pub const EMPTY_DOCUMENT_LIST: &str = "No documents available. Upload one to get started.";
pub const DOCUMENT_LIST_FAILURE: &str = "Unable to load the document list.";
pub const KNOWLEDGE_UPDATED: &str = "Knowledge base updated successfully";
pub const EMPTY_CATALOG: &str = "No options available.";

pub const LOADING_SYSTEM_INFO: &str = "Loading system information...";
pub const LOADING_DOCUMENTS: &str = "Loading documents...";
pub const LOADING_UPLOAD: &str = "Uploading document...";
pub const LOADING_KNOWLEDGE_UPDATE: &str = "Updating the knowledge base...";
pub const LOADING_QUESTION: &str = "Processing your question...";
pub const LOADING_CATALOG: &str = "Loading options...";

/// Display text for a failure; the only place errors become prose.
pub fn describe_error(err: &ClientError) -> String {
    match err {
        ClientError::Connection { .. } => CONNECTION_ERROR_TEXT.to_string(),
        ClientError::Api { detail, .. } => detail.clone(),
        ClientError::Validation { field } => validation_prompt(*field).to_string(),
        ClientError::Decode { .. } => MALFORMED_RESPONSE_TEXT.to_string(),
    }
}

pub fn validation_prompt(field: FormField) -> &'static str {
    match field {
        FormField::File => "Please select a file",
        FormField::Question => "Please enter a question",
        FormField::Countries => "Please select at least one country",
        FormField::Indicators => "Please select at least one indicator",
    }
}

pub fn loading(label: &str) -> Html {
    Html::from_markup(format!(
        r#"<div class="alert alert-info"><div class="loader"></div> {}</div>"#,
        escape(label)
    ))
}

pub fn error_alert(message: &str) -> Html {
    alert("danger", message)
}

fn alert(kind: &str, message: &str) -> Html {
    Html::from_markup(format!(
        r#"<div class="alert alert-{kind}">{}</div>"#,
        escape(message)
    ))
}

fn failure_text(message: Option<&str>, fallback: &str) -> String {
    message
        .map(str::trim)
        .filter(|message| !message.is_empty())
        .unwrap_or(fallback)
        .to_string()
}

fn stat_card(out: &mut String, column: &str, title: &str, text: &str) {
    let _ = write!(
        out,
        r#"<div class="{column}"><div class="card text-center"><div class="card-body"><h5 class="card-title">{}</h5><p class="card-text">{}</p></div></div></div>"#,
        escape(title),
        escape(text)
    );
}

pub fn system_info(info: &SystemInfo) -> Html {
    if !info.success {
        return alert(
            "warning",
            &failure_text(info.message.as_deref(), SYSTEM_INFO_FALLBACK),
        );
    }

    let (status, model) = if info.model_loaded {
        let name = info
            .model_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or("not loaded");
        ("Active", format!("Model: {name}"))
    } else {
        ("Inactive", "Model: not loaded".to_string())
    };

    let mut out = String::from(r#"<div class="row">"#);
    stat_card(
        &mut out,
        "col-md-3",
        &info.document_count.to_string(),
        "Documents",
    );
    stat_card(&mut out, "col-md-3", &info.chunk_count.to_string(), "Chunks");
    stat_card(&mut out, "col-md-6", status, &model);
    out.push_str("</div>");
    Html::from_markup(out)
}

pub fn worldbank_info(info: &WorldBankInfo) -> Html {
    if !info.success {
        return alert(
            "warning",
            &failure_text(info.message.as_deref(), SYSTEM_INFO_FALLBACK),
        );
    }

    let mut out = String::from(
        r#"<div class="card mb-4"><div class="card-header bg-primary text-white">World Bank RAG system status</div><div class="card-body"><div class="row">"#,
    );
    stat_card(&mut out, "col-md-3", "API", &info.api_status);
    stat_card(&mut out, "col-md-3", "Server", &info.server_status);
    stat_card(
        &mut out,
        "col-md-3",
        "Documents",
        &info.document_count.to_string(),
    );
    stat_card(&mut out, "col-md-3", "Chunks", &info.chunk_count.to_string());
    out.push_str("</div>");

    if info.cache_status.is_some() || info.index_status.is_some() {
        out.push_str(r#"<div class="row mt-3">"#);
        if let Some(cache) = &info.cache_status {
            stat_card(&mut out, "col-md-6", "Cache", cache);
        }
        if let Some(index) = &info.index_status {
            stat_card(&mut out, "col-md-6", "Indices", index);
        }
        out.push_str("</div>");
    }

    out.push_str("</div></div>");
    Html::from_markup(out)
}

pub fn document_list(documents: &[Document]) -> Html {
    if documents.is_empty() {
        return Html::from_markup(format!(
            r#"<li class="list-group-item">{}</li>"#,
            escape(EMPTY_DOCUMENT_LIST)
        ));
    }

    let mut out = String::new();
    for document in documents {
        let _ = write!(
            out,
            r#"<li class="list-group-item d-flex justify-content-between align-items-center">{}<span class="badge bg-primary rounded-pill">{} chunks</span></li>"#,
            escape(&document.filename),
            document.chunk_count
        );
    }
    Html::from_markup(out)
}

pub fn document_list_error(message: &str) -> Html {
    Html::from_markup(format!(
        r#"<li class="list-group-item text-danger">{}</li>"#,
        escape(message)
    ))
}

pub fn upload_result(response: &UploadResponse) -> Html {
    if response.success {
        let doc_id = response.doc_id.as_deref().unwrap_or("unknown");
        alert(
            "success",
            &format!("Document uploaded successfully. ID: {doc_id}"),
        )
    } else {
        error_alert(&format!(
            "Error: {}",
            failure_text(response.message.as_deref(), GENERIC_FAILURE)
        ))
    }
}

pub fn knowledge_update_result(response: &UpdateKnowledgeResponse) -> Html {
    if response.success {
        alert(
            "success",
            &failure_text(response.message.as_deref(), KNOWLEDGE_UPDATED),
        )
    } else {
        error_alert(&format!(
            "Error: {}",
            failure_text(response.message.as_deref(), GENERIC_FAILURE)
        ))
    }
}

pub fn chat_message(message: &ChatMessage) -> Html {
    let mut out = format!(r#"<div class="{}-message">"#, message.role.as_str());
    match &message.content {
        ChatContent::Text(text) => {
            let _ = write!(out, "<p>{}</p>", escape(text));
        }
        ChatContent::Answer(result) => {
            let _ = write!(
                out,
                "<p>{}</p>",
                escape(result.answer.as_deref().unwrap_or_default())
            );
            if !result.sources().is_empty() {
                out.push_str(r#"<div class="sources-info"><strong>Sources:</strong><ul>"#);
                for source in result.sources() {
                    let _ = write!(
                        out,
                        "<li>{} (Score: {:.4})</li>",
                        escape(&source.filename),
                        source.score
                    );
                }
                out.push_str("</ul></div>");
            }
        }
        ChatContent::Loading => {
            let _ = write!(
                out,
                r#"<div class="loader"></div> {}"#,
                escape(LOADING_QUESTION)
            );
        }
    }
    out.push_str("</div>");
    Html::from_markup(out)
}

/// Checkbox list feeding the knowledge-update form (`name` is `country`
/// or `indicator`).
pub fn catalog_options(name: &str, entries: &[CatalogEntry]) -> Html {
    if entries.is_empty() {
        return alert("warning", EMPTY_CATALOG);
    }

    let mut out = String::new();
    for (index, entry) in entries.iter().enumerate() {
        let id = format!("{name}-{index}");
        let _ = write!(
            out,
            r#"<div class="form-check"><input class="form-check-input" type="checkbox" name="{}" value="{}" id="{id}"><label class="form-check-label" for="{id}">{}</label></div>"#,
            escape(name),
            escape(&entry.id),
            escape(&entry.name)
        );
    }
    Html::from_markup(out)
}

#[cfg(test)]
#[path = "../tests/render_tests.rs"]
mod tests;
