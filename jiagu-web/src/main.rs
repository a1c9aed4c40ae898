//! Servidor web Axum expondo segmentação, POS, NER, relações e edição do dicionário.

mod config;

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use jiagu_core::{Class, EntitySpan, Jiagu, JiaguError, SegMode, Triple};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::config::ServerConfig;

/// Estado compartilhado da aplicação
struct AppState {
    jiagu: Jiagu,
}

type SharedState = Arc<AppState>;

#[derive(Deserialize)]
struct SegRequest {
    text: String,
    #[serde(default)]
    mode: SegMode,
}

#[derive(Deserialize)]
struct WordsRequest {
    words: Vec<String>,
}

#[derive(Deserialize)]
struct TextRequest {
    text: String,
}

#[derive(Deserialize)]
struct VocabRequest {
    word: String,
    #[serde(default)]
    freq: u64,
}

#[derive(Serialize)]
struct SegResponse {
    words: Vec<String>,
}

#[derive(Serialize)]
struct TagResponse {
    words: Vec<String>,
    tags: Vec<Class>,
}

#[derive(Serialize)]
struct NerResponse {
    tags: Vec<Class>,
    entities: Vec<EntitySpan>,
}

#[derive(Serialize)]
struct KnowledgeResponse {
    triples: Vec<Triple>,
}

/// Erros das rotas, convertidos em `{"error": ...}`.
enum ApiError {
    Core(JiaguError),
    BadRequest(String),
    Internal(String),
}

impl From<JiaguError> for ApiError {
    fn from(e: JiaguError) -> Self {
        ApiError::Core(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Core(e @ JiaguError::InvalidArgument(_)) => (StatusCode::BAD_REQUEST, e.to_string()),
            ApiError::Core(e @ JiaguError::ModelNotLoaded) => (StatusCode::SERVICE_UNAVAILABLE, e.to_string()),
            ApiError::Core(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };
        if status.is_server_error() {
            error!(%status, %message, "falha na requisição");
        }
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

/// Executa trabalho de CPU fora do runtime assíncrono.
async fn blocking<T, F>(state: SharedState, f: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&Jiagu) -> Result<T, JiaguError> + Send + 'static,
{
    tokio::task::spawn_blocking(move || f(&state.jiagu))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?
        .map_err(ApiError::from)
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ServerConfig::from_env();
    let jiagu = match Jiagu::open(&config.resources()) {
        Ok(jiagu) => jiagu,
        Err(e) => {
            error!(error = %e, "falha ao carregar recursos");
            std::process::exit(1);
        }
    };
    let state = Arc::new(AppState { jiagu });

    let listener = match tokio::net::TcpListener::bind(&config.bind).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(bind = %config.bind, error = %e, "falha ao abrir a porta");
            std::process::exit(1);
        }
    };
    info!("🚀 Servidor Jiagu iniciado em http://{}", config.bind);
    if let Err(e) = axum::serve(listener, router(state)).await {
        error!(error = %e, "servidor encerrado com erro");
    }
}

fn router(state: SharedState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route("/seg", post(seg_handler))
        .route("/pos", post(pos_handler))
        .route("/ner", post(ner_handler))
        .route("/knowledge", post(knowledge_handler))
        .route("/vocab", post(add_vocab_handler).delete(delete_vocab_handler))
        .layer(cors)
        .with_state(state)
}

async fn health_handler(State(state): State<SharedState>) -> impl IntoResponse {
    let segmenter = state.jiagu.segmenter();
    Json(serde_json::json!({
        "status": "ok",
        "words": segmenter.vocab().len(),
        "seg_model": segmenter.has_model(),
    }))
}

async fn seg_handler(
    State(state): State<SharedState>,
    Json(req): Json<SegRequest>,
) -> Result<Json<SegResponse>, ApiError> {
    let words = blocking(state, move |jiagu| jiagu.seg(&req.text, req.mode)).await?;
    Ok(Json(SegResponse { words }))
}

async fn pos_handler(
    State(state): State<SharedState>,
    Json(req): Json<WordsRequest>,
) -> Result<Json<TagResponse>, ApiError> {
    let words = req.words;
    let (words, tags) = blocking(state, move |jiagu| {
        let tags = jiagu.pos(&words)?;
        Ok((words, tags))
    })
    .await?;
    Ok(Json(TagResponse { words, tags }))
}

async fn ner_handler(
    State(state): State<SharedState>,
    Json(req): Json<WordsRequest>,
) -> Result<Json<NerResponse>, ApiError> {
    let words = req.words;
    let (tags, entities) = blocking(state, move |jiagu| {
        let tags = jiagu.ner(&words)?;
        let entities = jiagu_core::ner::entities(&words, &tags);
        Ok((tags, entities))
    })
    .await?;
    Ok(Json(NerResponse { tags, entities }))
}

async fn knowledge_handler(
    State(state): State<SharedState>,
    Json(req): Json<TextRequest>,
) -> Result<Json<KnowledgeResponse>, ApiError> {
    let triples = blocking(state, move |jiagu| jiagu.knowledge(&req.text)).await?;
    Ok(Json(KnowledgeResponse { triples }))
}

async fn add_vocab_handler(
    State(state): State<SharedState>,
    Json(req): Json<VocabRequest>,
) -> Result<StatusCode, ApiError> {
    if req.word.trim().is_empty() {
        return Err(ApiError::BadRequest("palavra vazia".to_string()));
    }
    state.jiagu.segmenter().add_vocab(&req.word, req.freq);
    info!(word = %req.word, freq = req.freq, "palavra adicionada");
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_vocab_handler(
    State(state): State<SharedState>,
    Json(req): Json<VocabRequest>,
) -> Result<StatusCode, ApiError> {
    if req.word.trim().is_empty() {
        return Err(ApiError::BadRequest("palavra vazia".to_string()));
    }
    state.jiagu.segmenter().delete_vocab(&req.word, req.freq);
    info!(word = %req.word, freq = req.freq, "palavra removida");
    Ok(StatusCode::NO_CONTENT)
}
