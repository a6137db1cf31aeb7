//! HTTP transport against the RAG API mounted under `<origin>/api`.

use reqwest::{header::HeaderMap, multipart, Client, Method, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use shared::{error::ClientError, protocol::ApiErrorBody};
use tracing::{debug, warn};
use url::Url;

pub const API_PREFIX: &str = "/api";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub filename: String,
    pub mime_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    fn into_part(self) -> Result<multipart::Part, ClientError> {
        let part = multipart::Part::bytes(self.bytes).file_name(self.filename);
        match self.mime_type {
            Some(mime) => part
                .mime_str(&mime)
                .map_err(|err| ClientError::decode(format!("invalid content type '{mime}': {err}"))),
            None => Ok(part),
        }
    }
}

#[derive(Debug, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(serde_json::Value),
    /// Single-file multipart body sent under the `file` field.
    Multipart(UploadFile),
}

#[derive(Debug)]
pub struct RequestOptions {
    pub method: Method,
    pub body: RequestBody,
    pub headers: HeaderMap,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            method: Method::GET,
            body: RequestBody::Empty,
            headers: HeaderMap::new(),
        }
    }
}

impl RequestOptions {
    pub fn post_json<T: Serialize>(body: &T) -> Result<Self, ClientError> {
        let value = serde_json::to_value(body)
            .map_err(|err| ClientError::decode(format!("failed to encode request body: {err}")))?;
        Ok(Self {
            method: Method::POST,
            body: RequestBody::Json(value),
            ..Self::default()
        })
    }

    pub fn post_file(file: UploadFile) -> Self {
        Self {
            method: Method::POST,
            body: RequestBody::Multipart(file),
            ..Self::default()
        }
    }
}

#[derive(Clone)]
pub struct Transport {
    http: Client,
    api_base: String,
}

impl Transport {
    pub fn new(origin: &Url) -> Self {
        Self::with_client(Client::new(), origin)
    }

    pub fn with_client(http: Client, origin: &Url) -> Self {
        let api_base = format!("{}{API_PREFIX}", origin.as_str().trim_end_matches('/'));
        Self { http, api_base }
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    pub fn endpoint(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{path}", self.api_base)
        } else {
            format!("{}/{path}", self.api_base)
        }
    }

    /// Issues one call and decodes the JSON payload. Never retries.
    pub async fn request<T: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<T, ClientError> {
        let url = self.endpoint(path);
        let method = options.method.clone();
        let builder = self
            .http
            .request(options.method, &url)
            .headers(options.headers);
        let builder = match options.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(&value),
            RequestBody::Multipart(file) => {
                builder.multipart(multipart::Form::new().part("file", file.into_part()?))
            }
        };

        debug!(%method, path, "api request");
        let response = builder.send().await.map_err(|err| {
            warn!(%method, path, error = %err, "api request did not reach the server");
            ClientError::connection(err.to_string())
        })?;
        decode_response(path, response).await
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        self.request(path, RequestOptions::default()).await
    }

    pub async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        self.request(path, RequestOptions::post_json(body)?).await
    }
}

async fn decode_response<T: DeserializeOwned>(
    path: &str,
    response: Response,
) -> Result<T, ClientError> {
    let status = response.status();
    let body = response
        .bytes()
        .await
        .map_err(|err| ClientError::connection(format!("failed to read response body: {err}")))?;

    if !status.is_success() {
        let detail = error_detail(status, &body);
        warn!(path, status = status.as_u16(), %detail, "api request failed");
        return Err(ClientError::api(status.as_u16(), detail));
    }

    serde_json::from_slice(&body).map_err(|err| {
        warn!(path, error = %err, "api response did not match the expected shape");
        ClientError::decode(err.to_string())
    })
}

/// Human-readable detail for a failed call: `detail`, then `message`, then
/// a message synthesized from the status code.
pub fn error_detail(status: StatusCode, body: &[u8]) -> String {
    serde_json::from_slice::<ApiErrorBody>(body)
        .ok()
        .and_then(|body| body.display_detail())
        .unwrap_or_else(|| format!("HTTP error: {}", status.as_u16()))
}
