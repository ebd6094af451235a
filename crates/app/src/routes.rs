use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    extract::{
        multipart::MultipartRejection, rejection::JsonRejection, DefaultBodyLimit, Multipart,
        State,
    },
    http::{HeaderMap, HeaderValue},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use pdf_chat_core::{ingest_documents, UploadedPdf, DEFAULT_SESSION_ID};
use serde::Serialize;
use serde_json::Value;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

pub const SESSION_HEADER: &str = "x-session-id";

const FILES_FIELD: &str = "files";
const DEFAULT_INDEX_HTML: &str = include_str!("../assets/index.html");

#[derive(Debug, Serialize)]
struct UploadResponse {
    message: String,
}

pub fn router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/health", get(health))
        .route(
            "/upload",
            post(upload_files).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route("/ask", post(ask_question))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Only a missing or blank header maps to the shared default session. A
/// header that is present but not visible ASCII is rejected.
fn session_id(headers: &HeaderMap) -> Result<String, ApiError> {
    let Some(value) = headers.get(SESSION_HEADER) else {
        return Ok(DEFAULT_SESSION_ID.to_string());
    };
    let value = value
        .to_str()
        .map_err(|_| ApiError::BadRequest("Invalid session id"))?
        .trim();

    if value.is_empty() {
        Ok(DEFAULT_SESSION_ID.to_string())
    } else {
        Ok(value.to_string())
    }
}

fn with_session(session_id: &str, body: impl IntoResponse) -> Response {
    let mut response = body.into_response();
    if let Ok(value) = HeaderValue::from_str(session_id) {
        response.headers_mut().insert(SESSION_HEADER, value);
    }
    response
}

async fn home(State(state): State<AppState>) -> Html<String> {
    match tokio::fs::read_to_string(state.index_html()).await {
        Ok(page) => Html(page),
        Err(error) => {
            debug!(path = %state.index_html().display(), %error, "serving built-in page");
            Html(DEFAULT_INDEX_HTML.to_string())
        }
    }
}

async fn health() -> &'static str {
    "OK"
}

/// POST /upload: rebuilds the session's index from the uploaded PDFs.
async fn upload_files(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, ApiError> {
    let session_id = session_id(&headers)?;
    let Ok(mut multipart) = multipart else {
        return Err(ApiError::BadRequest("No files uploaded"));
    };

    let mut saw_files_field = false;
    let mut files = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|error| ApiError::InvalidUpload(error.to_string()))?
    {
        if field.name() != Some(FILES_FIELD) {
            continue;
        }
        // A part without a filename is a plain form value, not a file.
        let Some(file_name) = field.file_name().map(str::to_string) else {
            continue;
        };
        saw_files_field = true;

        let bytes = field
            .bytes()
            .await
            .map_err(|error| ApiError::InvalidUpload(error.to_string()))?;

        if file_name.is_empty() {
            continue;
        }
        files.push(UploadedPdf::new(file_name, bytes.to_vec()));
    }

    if !saw_files_field {
        return Err(ApiError::BadRequest("No files uploaded"));
    }
    if files.is_empty() {
        return Err(ApiError::BadRequest("No selected files"));
    }

    let file_count = files.len();
    let report = ingest_documents(
        files,
        state.extractor(),
        state.embedder(),
        state.options(),
    )
    .await?;

    let handle = state.sessions().get_or_create(&session_id).await;
    let mut session = handle.lock().await;
    let replaced = session.has_chain();
    session.replace_chain(report.chain);

    info!(
        session = %session_id,
        files = file_count,
        chunk_count = report.chunk_count,
        replaced,
        "indexed upload"
    );

    Ok(with_session(
        &session_id,
        Json(UploadResponse {
            message: format!("Processed {} chunks from PDF(s)", report.chunk_count),
        }),
    ))
}

/// POST /ask: answers a question against the session's index.
async fn ask_question(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Response, ApiError> {
    let session_id = session_id(&headers)?;
    let question = payload
        .ok()
        .and_then(|Json(body)| body.get("question").and_then(Value::as_str).map(str::to_string))
        .filter(|question| !question.trim().is_empty())
        .ok_or(ApiError::BadRequest("No question provided"))?;

    let handle = state
        .sessions()
        .get(&session_id)
        .await
        .ok_or(ApiError::BadRequest("Please upload PDFs first"))?;

    // Held for the whole turn so questions in one session never interleave.
    let mut session = handle.lock().await;
    let chain = session
        .chain_mut()
        .ok_or(ApiError::BadRequest("Please upload PDFs first"))?;

    let answer = chain.ask(&question, state.embedder(), state.llm()).await?;
    debug!(
        session = %session_id,
        turns = chain.memory().turns(),
        indexed_chunks = chain.indexed_chunks(),
        "answered question"
    );

    Ok(with_session(&session_id, Json(answer)))
}
