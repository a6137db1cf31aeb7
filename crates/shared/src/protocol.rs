use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::CatalogEntry;

pub const DEFAULT_TOP_K: u32 = 3;
pub const DEFAULT_MAX_TOKENS: u32 = 512;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryRequest {
    pub question: String,
    pub top_k: u32,
    pub max_tokens: u32,
}

impl QueryRequest {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            top_k: DEFAULT_TOP_K,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    pub fn with_limits(mut self, top_k: u32, max_tokens: u32) -> Self {
        self.top_k = top_k;
        self.max_tokens = max_tokens;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateKnowledgeRequest {
    pub countries: Vec<String>,
    pub indicators: Vec<String>,
    pub include_topics: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateKnowledgeResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Error body returned with non-2xx statuses. `detail` is usually a string,
/// but request validation failures carry a structured list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub detail: Option<Value>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ApiErrorBody {
    pub fn display_detail(&self) -> Option<String> {
        let detail = match &self.detail {
            Some(Value::String(detail)) => Some(detail.clone()),
            Some(Value::Null) | None => None,
            Some(other) => Some(other.to_string()),
        };
        detail
            .into_iter()
            .chain(self.message.clone())
            .find(|text| !text.trim().is_empty())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CountryCatalogResponse {
    #[serde(default)]
    pub countries: Value,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IndicatorCatalogResponse {
    #[serde(default)]
    pub indicators: Value,
}

/// Extracts `{id, name}` pairs from a World Bank list payload.
///
/// The upstream API answers with `[paging, [entry, ...]]`; a bare list of
/// entries is accepted too. Anything else yields an empty catalog.
pub fn parse_catalog(raw: &Value) -> Vec<CatalogEntry> {
    let entries = match raw {
        Value::Array(items) => match items.as_slice() {
            [Value::Object(_), Value::Array(entries), ..] => entries.as_slice(),
            _ => items.as_slice(),
        },
        _ => return Vec::new(),
    };

    entries
        .iter()
        .filter_map(|entry| {
            let id = entry.get("id")?.as_str()?.trim();
            if id.is_empty() {
                return None;
            }
            let name = entry
                .get("name")
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .unwrap_or(id);
            Some(CatalogEntry {
                id: id.to_string(),
                name: name.to_string(),
            })
        })
        .collect()
}
