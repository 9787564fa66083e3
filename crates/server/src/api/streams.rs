//! Stream resolution API handlers.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use streamseek_core::{
    CacheKey, MediaDescriptor, MediaKind, ResolvedStream, SwitchError, TorrentCandidate,
};

use crate::state::AppState;

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct StreamRequest {
    /// Catalog item, in any of the shapes the catalog produces.
    pub media: Value,
    /// Overrides the kind inferred from the catalog item.
    #[serde(default)]
    pub media_type: Option<String>,
    #[serde(default)]
    pub season: Option<u32>,
    #[serde(default)]
    pub episode: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct SwitchRequest {
    #[serde(flatten)]
    pub target: StreamRequest,
    pub index: usize,
}

#[derive(Debug, Serialize)]
pub struct StreamResponse {
    pub key: CacheKey,
    pub stream_url: Option<String>,
    pub stream: Option<ResolvedStream>,
}

impl StreamResponse {
    fn new(key: CacheKey, stream: Option<ResolvedStream>) -> Self {
        Self {
            key,
            stream_url: stream.as_ref().map(|s| s.stream_url().to_string()),
            stream,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AlternativesResponse {
    pub key: CacheKey,
    pub alternatives: Vec<TorrentCandidate>,
}

#[derive(Debug, Serialize)]
pub struct ClearResponse {
    pub cleared: bool,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

impl StreamRequest {
    fn descriptor(&self) -> Result<MediaDescriptor, ApiError> {
        let hint = match self.media_type.as_deref() {
            Some(raw) => Some(MediaKind::parse(raw).ok_or_else(|| {
                error(
                    StatusCode::BAD_REQUEST,
                    format!("Unknown media type: {}", raw),
                )
            })?),
            None => None,
        };

        MediaDescriptor::from_catalog_value(&self.media, hint)
            .map_err(|e| error(StatusCode::BAD_REQUEST, e.to_string()))
    }

    fn key(&self, media: &MediaDescriptor) -> CacheKey {
        CacheKey::new(&media.id, self.season, self.episode)
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/v1/streams/prepare
///
/// Resolve a playable stream for a catalog item. A `null` stream means no
/// source could be resolved.
pub async fn prepare(
    State(state): State<Arc<AppState>>,
    Json(body): Json<StreamRequest>,
) -> Result<Json<StreamResponse>, ApiError> {
    let media = body.descriptor()?;
    let key = body.key(&media);
    debug!(key = %key, title = %media.display_title(), "Prepare requested");

    let stream = state
        .engine()
        .resolve_stream(&media, body.season, body.episode)
        .await;

    Ok(Json(StreamResponse::new(key, stream)))
}

/// POST /api/v1/streams/alternatives
///
/// Ranked candidates kept for manual source switching.
pub async fn alternatives(
    State(state): State<Arc<AppState>>,
    Json(body): Json<StreamRequest>,
) -> Result<Json<AlternativesResponse>, ApiError> {
    let media = body.descriptor()?;
    let key = body.key(&media);

    let alternatives = state
        .engine()
        .alternatives(&media, body.season, body.episode)
        .await;

    Ok(Json(AlternativesResponse { key, alternatives }))
}

/// POST /api/v1/streams/switch
///
/// Resolve the alternative at `index`. A candidate that fails to resolve
/// yields a `null` stream; an index with no alternative is a 404.
pub async fn switch_source(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SwitchRequest>,
) -> Result<Json<StreamResponse>, ApiError> {
    let media = body.target.descriptor()?;
    let key = body.target.key(&media);

    match state
        .engine()
        .switch_source(&media, body.target.season, body.target.episode, body.index)
        .await
    {
        Ok(stream) => Ok(Json(StreamResponse::new(key, Some(stream)))),
        Err(e @ SwitchError::NoAlternative { .. }) => {
            Err(error(StatusCode::NOT_FOUND, e.to_string()))
        }
        Err(SwitchError::Resolve(e)) => {
            info!(key = %key, index = body.index, error = %e, "Switched source failed to resolve");
            Ok(Json(StreamResponse::new(key, None)))
        }
    }
}

/// DELETE /api/v1/streams
///
/// Drop cached streams and playback sessions.
pub async fn clear(State(state): State<Arc<AppState>>) -> Json<ClearResponse> {
    state.engine().clear();
    Json(ClearResponse { cleared: true })
}
