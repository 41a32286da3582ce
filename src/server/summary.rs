use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::Method;
use log::{debug, error, info};
use serde::{Deserialize, Serialize};
use url::Url;

use super::{AppState, parse_body};
use crate::auth::AuthUser;
use crate::cache::CachedSummary;
use crate::error::{ApiError, ApiResult};
use crate::join_fragments;
use crate::video_url::{VideoId, extract_video_id};

#[derive(Debug, Deserialize)]
pub struct SummaryRequest {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryResponse {
    pub transcript: Vec<String>,
    pub summary: String,
}

impl From<CachedSummary> for SummaryResponse {
    fn from(hit: CachedSummary) -> Self {
        Self {
            transcript: hit.transcript,
            summary: hit.summary,
        }
    }
}

/// `POST /api/getSummary`
pub(super) async fn get_summary(
    State(state): State<AppState>,
    auth: Result<AuthUser, ApiError>,
    method: Method,
    body: Bytes,
) -> ApiResult<Json<SummaryResponse>> {
    let user = auth?;
    if method != Method::POST {
        return Err(ApiError::MethodNotAllowed);
    }

    let request: SummaryRequest = parse_body(&body)?;
    Url::parse(&request.url).map_err(|e| ApiError::Validation(format!("url: Invalid url ({e})")))?;

    let video_id = extract_video_id(&request.url).ok_or(ApiError::VideoIdNotFound)?;

    let response = summarize_video(&state, &user.user_id, &video_id).await?;
    Ok(Json(response))
}

/// Cache-aside: serve a cached pair, or fetch, summarize and write it back.
///
/// A failed cache write is logged and the freshly computed summary is still returned.
pub async fn summarize_video(state: &AppState, user_id: &str, video_id: &VideoId) -> ApiResult<SummaryResponse> {
    if let Some(hit) = state.cache.lookup(user_id, video_id).await? {
        debug!("Cache hit for {user_id}/{video_id}");
        return Ok(hit.into());
    }
    debug!("Cache miss for {user_id}/{video_id}");

    let fetched = state.fetcher.fetch(video_id).await?;
    info!(
        "Fetched {} caption fragments for {video_id} ({:?}, lang={}, {:.0}s)",
        fetched.segments.len(),
        fetched.title,
        fetched.language,
        fetched.duration_secs()
    );
    let transcript = fetched.fragments();

    let summary = state
        .summarizer
        .summarize(&join_fragments(&transcript))
        .await?
        .ok_or(ApiError::EmptySummary)?;

    if let Err(e) = state.cache.store(user_id, video_id, &transcript, &summary).await {
        error!("Returning uncached summary for {video_id}: {e:#}");
    }

    Ok(SummaryResponse { transcript, summary })
}
