use super::*;
use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::{net::TcpListener, sync::Mutex};

#[derive(Clone, Default)]
struct ServerState {
    bodies: Arc<Mutex<Vec<Value>>>,
}

async fn handle_system_info() -> Json<Value> {
    Json(json!({
        "success": true,
        "document_count": 4,
        "chunk_count": 87,
        "model_loaded": true,
        "model_name": "mistral-7b-instruct"
    }))
}

async fn handle_query(State(state): State<ServerState>, Json(body): Json<Value>) -> Json<Value> {
    state.bodies.lock().await.push(body);
    Json(json!({
        "success": true,
        "answer": "GDP is the total value of goods and services.",
        "sources": [
            {"filename": "economics.pdf", "score": 0.91234},
            {"filename": "glossary.txt", "score": 0.5}
        ]
    }))
}

async fn handle_update_knowledge(
    State(state): State<ServerState>,
    Json(body): Json<Value>,
) -> Json<Value> {
    state.bodies.lock().await.push(body);
    Json(json!({"success": true, "message": "12 documents indexed"}))
}

async fn handle_list_documents() -> Json<Value> {
    Json(json!([
        {"filename": "report.pdf", "chunk_count": 12},
        {"filename": "notes.txt", "chunk_count": 3}
    ]))
}

async fn handle_upload(mut multipart: Multipart) -> Json<Value> {
    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().unwrap_or_default().to_string();
        let bytes = field.bytes().await.unwrap_or_default();
        return Json(json!({
            "success": true,
            "doc_id": format!("{filename}|{content_type}|{}", bytes.len()),
            "message": "stored"
        }));
    }
    Json(json!({"success": false, "message": "no file field"}))
}

async fn handle_worldbank_info_failure() -> (StatusCode, Json<Value>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({"detail": "RAG processor failed to initialize"})),
    )
}

async fn handle_worldbank_query_failure() -> (StatusCode, Json<Value>) {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({"message": "question must not be empty"})),
    )
}

async fn handle_countries() -> Json<Value> {
    Json(json!({
        "countries": [
            {"page": 1, "pages": 1},
            [{"id": "FRA", "name": "France"}, {"id": "BRA", "name": "Brazil"}]
        ]
    }))
}

async fn handle_indicators_malformed() -> &'static str {
    "not json at all"
}

async fn spawn_api_server() -> (String, ServerState) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let state = ServerState::default();
    let app = Router::new()
        .route("/api/system/", get(handle_system_info))
        .route("/api/query/", post(handle_query))
        .route("/api/worldbank/update-knowledge/", post(handle_update_knowledge))
        .route(
            "/api/documents/",
            get(handle_list_documents).post(handle_upload),
        )
        .route("/api/worldbank/system-info/", get(handle_worldbank_info_failure))
        .route("/api/worldbank/query/", post(handle_worldbank_query_failure))
        .route("/api/world-bank/countries", get(handle_countries))
        .route("/api/world-bank/indicators", get(handle_indicators_malformed))
        .with_state(state.clone());
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (format!("http://{addr}"), state)
}

/// Loopback servers must not be routed through a proxy taken from the
/// environment.
fn client_for(origin: &str) -> RagClient {
    let http = reqwest::Client::builder()
        .no_proxy()
        .build()
        .expect("http client");
    RagClient::with_transport(Transport::with_client(
        http,
        &Url::parse(origin).expect("origin"),
    ))
}

#[test]
fn endpoint_joins_origin_and_api_prefix() {
    let transport = Transport::new(&Url::parse("http://localhost:8000/").expect("url"));
    assert_eq!(transport.api_base(), "http://localhost:8000/api");
    assert_eq!(
        transport.endpoint("/system/"),
        "http://localhost:8000/api/system/"
    );
    assert_eq!(
        transport.endpoint("query/"),
        "http://localhost:8000/api/query/"
    );

    let proxied = Transport::new(&Url::parse("https://example.org/rag").expect("url"));
    assert_eq!(proxied.endpoint("/system/"), "https://example.org/rag/api/system/");
}

#[test]
fn error_detail_falls_back_to_status_code() {
    assert_eq!(
        transport::error_detail(StatusCode::NOT_FOUND, b"<html>missing</html>"),
        "HTTP error: 404"
    );
    assert_eq!(
        transport::error_detail(StatusCode::BAD_GATEWAY, br#"{"detail": null}"#),
        "HTTP error: 502"
    );
    assert_eq!(
        transport::error_detail(StatusCode::INTERNAL_SERVER_ERROR, br#"{"detail": "boom"}"#),
        "boom"
    );
}

#[tokio::test]
async fn fetches_system_info() {
    let (origin, _) = spawn_api_server().await;
    let info = client_for(&origin).system_info().await.expect("system info");
    assert!(info.success);
    assert_eq!(info.document_count, 4);
    assert_eq!(info.chunk_count, 87);
    assert!(info.model_loaded);
    assert_eq!(info.model_name.as_deref(), Some("mistral-7b-instruct"));
}

#[tokio::test]
async fn query_posts_question_with_default_limits() {
    let (origin, state) = spawn_api_server().await;
    let result = client_for(&origin)
        .query(&QueryRequest::new("What is GDP?"))
        .await
        .expect("query");

    assert!(result.success);
    assert_eq!(result.sources().len(), 2);
    assert_eq!(result.sources()[0].filename, "economics.pdf");

    let bodies = state.bodies.lock().await;
    assert_eq!(
        bodies.as_slice(),
        &[json!({"question": "What is GDP?", "top_k": 3, "max_tokens": 512})]
    );
}

#[tokio::test]
async fn update_knowledge_sends_selected_countries_and_indicators() {
    let (origin, state) = spawn_api_server().await;
    let response = client_for(&origin)
        .update_worldbank_knowledge(&UpdateKnowledgeRequest {
            countries: vec!["FRA".into(), "SEN".into()],
            indicators: vec!["NY.GDP.MKTP.CD".into()],
            include_topics: false,
        })
        .await
        .expect("update");

    assert!(response.success);
    assert_eq!(response.message.as_deref(), Some("12 documents indexed"));
    let bodies = state.bodies.lock().await;
    assert_eq!(
        bodies[0],
        json!({
            "countries": ["FRA", "SEN"],
            "indicators": ["NY.GDP.MKTP.CD"],
            "include_topics": false
        })
    );
}

#[tokio::test]
async fn lists_documents_in_server_order() {
    let (origin, _) = spawn_api_server().await;
    let documents = client_for(&origin).list_documents().await.expect("documents");
    let names: Vec<_> = documents.iter().map(|doc| doc.filename.as_str()).collect();
    assert_eq!(names, ["report.pdf", "notes.txt"]);
    assert_eq!(documents[0].chunk_count, 12);
}

#[tokio::test]
async fn upload_sends_multipart_file_field() {
    let (origin, _) = spawn_api_server().await;
    let response = client_for(&origin)
        .upload_document(UploadFile {
            filename: "notes.txt".into(),
            mime_type: Some("text/plain".into()),
            bytes: b"hello world".to_vec(),
        })
        .await
        .expect("upload");

    assert!(response.success);
    assert_eq!(response.doc_id.as_deref(), Some("notes.txt|text/plain|11"));
}

#[tokio::test]
async fn non_success_status_surfaces_detail() {
    let (origin, _) = spawn_api_server().await;
    let err = client_for(&origin)
        .worldbank_info()
        .await
        .expect_err("must fail");
    assert_eq!(
        err,
        ClientError::api(500, "RAG processor failed to initialize")
    );
}

#[tokio::test]
async fn non_success_status_falls_back_to_message_field() {
    let (origin, _) = spawn_api_server().await;
    let err = client_for(&origin)
        .query_worldbank(&QueryRequest::new(""))
        .await
        .expect_err("must fail");
    assert_eq!(err, ClientError::api(400, "question must not be empty"));
    assert_eq!(err.status_code(), Some(400));
}

#[tokio::test]
async fn unknown_route_synthesizes_status_message() {
    let (origin, _) = spawn_api_server().await;
    let err = client_for(&origin)
        .transport()
        .get::<Value>("/missing/")
        .await
        .expect_err("must fail");
    assert_eq!(err, ClientError::api(404, "HTTP error: 404"));
}

#[tokio::test]
async fn country_catalog_is_extracted_from_world_bank_payload() {
    let (origin, _) = spawn_api_server().await;
    let countries = client_for(&origin)
        .worldbank_countries()
        .await
        .expect("countries");
    let ids: Vec<_> = countries.iter().map(|entry| entry.id.as_str()).collect();
    assert_eq!(ids, ["FRA", "BRA"]);
}

#[tokio::test]
async fn malformed_payload_is_a_decode_error() {
    let (origin, _) = spawn_api_server().await;
    let err = client_for(&origin)
        .worldbank_indicators()
        .await
        .expect_err("must fail");
    assert!(matches!(err, ClientError::Decode { .. }), "got {err:?}");
}

#[tokio::test]
async fn unreachable_server_is_a_connection_error() {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let err = client_for(&format!("http://{addr}"))
        .system_info()
        .await
        .expect_err("must fail");
    assert!(matches!(err, ClientError::Connection { .. }), "got {err:?}");
}
