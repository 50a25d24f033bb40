use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use cedict_types::DictionaryEntry;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::engine::{Dictionary, EngineError};

const DEFAULT_PAGE_SIZE: usize = 50;

#[derive(Clone)]
pub struct AppState {
    pub dictionary: Arc<Dictionary>,
    pub max_page_size: usize,
    pub disable_cache: bool,
}

#[derive(Deserialize)]
pub struct LookupQuery {
    pub q: Option<String>,
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

#[derive(Deserialize)]
pub struct TextQuery {
    pub text: Option<String>,
}

/// Wire form of a dictionary entry.
#[derive(Serialize)]
pub struct EntryResponse {
    simplified: String,
    traditional: String,
    pinyin: Vec<String>,
    english: Vec<String>,
}

impl From<&DictionaryEntry> for EntryResponse {
    fn from(entry: &DictionaryEntry) -> Self {
        Self {
            simplified: entry.simplified.clone(),
            traditional: entry.traditional.clone(),
            pinyin: entry.pinyin.clone(),
            english: entry.english.clone(),
        }
    }
}

#[derive(Serialize)]
pub struct LookupResponse {
    query: String,
    page: usize,
    page_size: usize,
    total: usize,
    has_more: bool,
    items: Vec<EntryResponse>,
}

#[derive(Serialize)]
struct SegmentResponse {
    text: String,
    tokens: Vec<String>,
}

#[derive(Serialize)]
struct ConvertResponse {
    text: String,
    converted: String,
}

#[derive(Serialize)]
struct DetectResponse {
    text: String,
    simplified: bool,
    traditional: bool,
}

#[derive(Serialize)]
struct ClassifyResponse {
    text: String,
    classification: &'static str,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/v1/query", get(query_any))
        .route("/v1/query/chinese", get(query_chinese))
        .route("/v1/query/pinyin", get(query_pinyin))
        .route("/v1/query/english", get(query_english))
        .route("/v1/segment", get(segment))
        .route("/v1/convert/traditional", get(convert_traditional))
        .route("/v1/convert/simplified", get(convert_simplified))
        .route("/v1/detect", get(detect))
        .route("/v1/classify", get(classify))
        .with_state(state)
}

async fn healthz() -> impl IntoResponse {
    "ok"
}

#[derive(Clone, Copy)]
enum LookupKind {
    Any,
    Chinese,
    Pinyin,
    English,
}

impl LookupKind {
    fn run<'d>(
        self,
        dictionary: &'d Dictionary,
        text: &str,
    ) -> Result<Vec<&'d DictionaryEntry>, EngineError> {
        match self {
            LookupKind::Any => dictionary.query(text),
            LookupKind::Chinese => dictionary.query_by_chinese(text),
            LookupKind::Pinyin => dictionary.query_by_pinyin(text),
            LookupKind::English => dictionary.query_by_english(text),
        }
    }
}

async fn query_any(
    State(state): State<AppState>,
    Query(params): Query<LookupQuery>,
) -> Result<Response, ApiError> {
    lookup(state, params, LookupKind::Any).await
}

async fn query_chinese(
    State(state): State<AppState>,
    Query(params): Query<LookupQuery>,
) -> Result<Response, ApiError> {
    lookup(state, params, LookupKind::Chinese).await
}

async fn query_pinyin(
    State(state): State<AppState>,
    Query(params): Query<LookupQuery>,
) -> Result<Response, ApiError> {
    lookup(state, params, LookupKind::Pinyin).await
}

async fn query_english(
    State(state): State<AppState>,
    Query(params): Query<LookupQuery>,
) -> Result<Response, ApiError> {
    lookup(state, params, LookupKind::English).await
}

async fn lookup(
    state: AppState,
    params: LookupQuery,
    kind: LookupKind,
) -> Result<Response, ApiError> {
    let text = required(params.q, "q")?;

    let page = params.page.unwrap_or(1);
    if page == 0 {
        return Err(ApiError::bad_request("page must be >= 1"));
    }
    let mut page_size = params.page_size.unwrap_or(DEFAULT_PAGE_SIZE);
    if page_size == 0 {
        return Err(ApiError::bad_request("page_size must be >= 1"));
    }
    if page_size > state.max_page_size {
        page_size = state.max_page_size;
    }

    let dictionary = Arc::clone(&state.dictionary);
    let response = blocking(move || {
        let hits = kind.run(&dictionary, &text)?;
        let total = hits.len();
        let offset = (page - 1).saturating_mul(page_size);
        let items: Vec<EntryResponse> = hits
            .into_iter()
            .skip(offset)
            .take(page_size)
            .map(EntryResponse::from)
            .collect();
        let has_more = offset.saturating_add(items.len()) < total;
        Ok(LookupResponse {
            query: text,
            page,
            page_size,
            total,
            has_more,
            items,
        })
    })
    .await?;

    Ok(cacheable(state.disable_cache, Json(response)))
}

async fn segment(
    State(state): State<AppState>,
    Query(params): Query<TextQuery>,
) -> Result<Response, ApiError> {
    let text = required(params.text, "text")?;
    let dictionary = Arc::clone(&state.dictionary);
    let response = blocking(move || {
        let tokens = dictionary
            .segment(&text)?
            .into_iter()
            .map(str::to_string)
            .collect();
        Ok(SegmentResponse { text, tokens })
    })
    .await?;
    Ok(cacheable(state.disable_cache, Json(response)))
}

async fn convert_traditional(
    State(state): State<AppState>,
    Query(params): Query<TextQuery>,
) -> Result<Response, ApiError> {
    let text = required(params.text, "text")?;
    let dictionary = Arc::clone(&state.dictionary);
    let response = blocking(move || {
        let converted = dictionary.convert_to_traditional(&text)?;
        Ok(ConvertResponse { text, converted })
    })
    .await?;
    Ok(cacheable(state.disable_cache, Json(response)))
}

async fn convert_simplified(
    State(state): State<AppState>,
    Query(params): Query<TextQuery>,
) -> Result<Response, ApiError> {
    let text = required(params.text, "text")?;
    let dictionary = Arc::clone(&state.dictionary);
    let response = blocking(move || {
        let converted = dictionary.convert_to_simplified(&text)?;
        Ok(ConvertResponse { text, converted })
    })
    .await?;
    Ok(cacheable(state.disable_cache, Json(response)))
}

async fn detect(
    State(state): State<AppState>,
    Query(params): Query<TextQuery>,
) -> Result<Response, ApiError> {
    let text = required(params.text, "text")?;
    let dictionary = Arc::clone(&state.dictionary);
    let response = blocking(move || {
        Ok(DetectResponse {
            simplified: dictionary.is_simplified(&text),
            traditional: dictionary.is_traditional(&text),
            text,
        })
    })
    .await?;
    Ok(cacheable(state.disable_cache, Json(response)))
}

async fn classify(
    State(state): State<AppState>,
    Query(params): Query<TextQuery>,
) -> Result<Response, ApiError> {
    let text = required(params.text, "text")?;
    let classification = state.dictionary.classify(&text)?;
    let response = ClassifyResponse {
        text,
        classification: classification.as_str(),
    };
    Ok(cacheable(state.disable_cache, Json(response)))
}

fn required(value: Option<String>, name: &str) -> Result<String, ApiError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ApiError::bad_request(format!("{name} is required"))),
    }
}

/// Run a dictionary operation on the blocking pool.
async fn blocking<T, F>(work: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, EngineError> + Send + 'static,
    T: Send + 'static,
{
    match tokio::task::spawn_blocking(work).await {
        Ok(result) => result.map_err(ApiError::from),
        Err(err) => {
            error!("dictionary worker failed: {err}");
            Err(ApiError::Internal)
        }
    }
}

fn cacheable(disable_cache: bool, body: impl IntoResponse) -> Response {
    if disable_cache {
        return body.into_response();
    }
    (
        [(
            header::CACHE_CONTROL,
            HeaderValue::from_static("public, max-age=300"),
        )],
        body,
    )
        .into_response()
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unavailable(String),
    #[error("internal server error")]
    Internal,
}

impl ApiError {
    fn bad_request<T: Into<String>>(msg: T) -> Self {
        ApiError::BadRequest(msg.into())
    }
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Classification(_) => ApiError::BadRequest(err.to_string()),
            EngineError::NotInitialized | EngineError::DataLoad(_) => {
                ApiError::Unavailable(err.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(msg) => {
                let body = Json(ErrorResponse { error: msg });
                (StatusCode::BAD_REQUEST, body).into_response()
            }
            ApiError::Unavailable(msg) => {
                let body = Json(ErrorResponse { error: msg });
                (StatusCode::SERVICE_UNAVAILABLE, body).into_response()
            }
            ApiError::Internal => {
                let body = Json(json!({ "error": "internal server error" }));
                (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
            }
        }
    }
}
