use std::sync::Arc;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{MethodRouter, get};
use axum::{Json, Router};
use lexicon_normalize::{audio_forms, normalize};
use lexicon_types::{AudioRef, EndpointKind, Normalized};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, info};

use crate::audio::AudioService;
use crate::completion::CompletionClient;
use crate::lookup::LookupCache;
use crate::prompts::prompt_for;

#[derive(Clone)]
pub struct AppState {
    pub completion: Arc<dyn CompletionClient>,
    pub audio: Arc<AudioService>,
    pub lookups: Option<Arc<LookupCache>>,
    pub disable_cache: bool,
}

#[derive(Deserialize)]
pub struct WordQuery {
    pub word: Option<String>,
}

#[derive(Serialize)]
struct AudioResponse {
    audio_url: AudioRef,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(frontend))
        .route("/healthz", get(healthz))
        .route("/getWordForms", lookup_route(EndpointKind::WordForms))
        .route("/getDialect", lookup_route(EndpointKind::Dialect))
        .route("/getPhonetic", lookup_route(EndpointKind::Phonetic))
        .route("/getStems", lookup_route(EndpointKind::Stems))
        .route("/getDefinition", lookup_route(EndpointKind::Definition))
        .route(
            "/getSenseTranslation",
            lookup_route(EndpointKind::Translations),
        )
        .route("/getExamples", lookup_route(EndpointKind::Examples))
        .route("/getContexts", lookup_route(EndpointKind::Contexts))
        .route("/getAudio/{word}", get(audio_for_word))
        .route("/files/{file_name}", get(audio_file))
        .with_state(state)
}

fn lookup_route(kind: EndpointKind) -> MethodRouter<AppState> {
    get(
        move |State(state): State<AppState>,
              query: Result<Query<WordQuery>, QueryRejection>| async move {
            match query {
                Ok(Query(query)) => lookup(state, kind, query).await,
                Err(rejection) => {
                    debug!(%kind, %rejection, "rejected query string");
                    Err(ApiError::bad_request(rejection.body_text()))
                }
            }
        },
    )
}

async fn healthz() -> impl IntoResponse {
    "ok"
}

const INDEX_HTML: &str = include_str!("../templates/index.html");

async fn frontend(State(state): State<AppState>) -> Response {
    let html = Html(INDEX_HTML);
    if state.disable_cache {
        return html.into_response();
    }
    (
        [(
            header::CACHE_CONTROL,
            HeaderValue::from_static("public, max-age=3600, immutable"),
        )],
        html,
    )
        .into_response()
}

async fn lookup(
    state: AppState,
    kind: EndpointKind,
    query: WordQuery,
) -> Result<Response, ApiError> {
    let word = query.word.as_deref().map(str::trim).unwrap_or_default();
    if word.is_empty() {
        return Err(ApiError::bad_request("word is required"));
    }

    if let Some(hit) = state.lookups.as_ref().and_then(|cache| cache.get(kind, word)) {
        debug!(%kind, word, "lookup served from memory");
        return Ok(lookup_response(&state, hit.as_ref()));
    }

    let text = state
        .completion
        .complete(&prompt_for(kind, word))
        .await
        .map_err(|err| {
            error!(%kind, word, %err, "completion failed");
            ApiError::Upstream(err.to_string())
        })?;

    let resolved = state.audio.resolve_all(audio_forms(&text, kind)).await;
    let normalized = normalize(&text, kind, &resolved);
    info!(
        %kind,
        word,
        records = normalized.record_count(),
        "lookup normalized"
    );

    let response = lookup_response(&state, &normalized);
    if let Some(cache) = &state.lookups {
        cache.insert(kind, word, Arc::new(normalized));
    }
    Ok(response)
}

fn lookup_response(state: &AppState, body: &Normalized) -> Response {
    if state.disable_cache {
        return Json(body).into_response();
    }
    (
        [(
            header::CACHE_CONTROL,
            HeaderValue::from_static("public, max-age=300"),
        )],
        Json(body),
    )
        .into_response()
}

async fn audio_for_word(
    State(state): State<AppState>,
    Path(word): Path<String>,
) -> Result<Response, ApiError> {
    if word.trim().is_empty() {
        return Err(ApiError::bad_request("word is required"));
    }
    let audio_url = state.audio.resolve(&word).await;
    Ok(Json(AudioResponse { audio_url }).into_response())
}

async fn audio_file(
    State(state): State<AppState>,
    Path(file_name): Path<String>,
) -> Result<Response, ApiError> {
    let bytes = state
        .audio
        .store()
        .read(&file_name)
        .await
        .map_err(|err| {
            error!(file = %file_name, %err, "failed to read audio file");
            ApiError::Internal
        })?
        .ok_or_else(|| {
            debug!(file = %file_name, "audio file not found");
            ApiError::NotFound
        })?;

    let content_type = (
        header::CONTENT_TYPE,
        HeaderValue::from_static("audio/mpeg"),
    );
    if state.disable_cache {
        return Ok(([content_type], bytes).into_response());
    }
    Ok((
        [
            content_type,
            (
                header::CACHE_CONTROL,
                HeaderValue::from_static("public, max-age=86400, immutable"),
            ),
        ],
        bytes,
    )
        .into_response())
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("not found")]
    NotFound,
    #[error("upstream completion failed: {0}")]
    Upstream(String),
    #[error("internal server error")]
    Internal,
}

impl ApiError {
    fn bad_request<T: Into<String>>(msg: T) -> Self {
        ApiError::BadRequest(msg.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Upstream(_) | ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = Json(ErrorResponse {
            error: self.to_string(),
        });
        (status, body).into_response()
    }
}
