//! HTTP surface: router, shared state and the listener loop.

mod export;
mod summary;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::routing::{any, get};
use eyre::{Result, WrapErr, bail};
use log::info;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tokio::net::TcpListener;

use crate::auth::Authenticator;
use crate::cache::{MemoryCache, RedisCache, SummaryCache};
use crate::config::{CacheBackend, Config};
use crate::error::ApiError;
use crate::mail::{Mailer, PostmarkMailer};
use crate::pdf::{GotenbergRenderer, PdfRenderer};
use crate::summarize::{LlmSummarizer, Summarizer};
use crate::youtube::{CaptionFetcher, TranscriptFetcher};

pub use summary::{SummaryRequest, SummaryResponse, summarize_video};

/// Everything a handler needs; cheap to clone per request
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub auth: Authenticator,
    pub cache: Arc<dyn SummaryCache>,
    pub fetcher: Arc<dyn TranscriptFetcher>,
    pub summarizer: Arc<dyn Summarizer>,
    pub mailer: Arc<dyn Mailer>,
    pub pdf: Arc<dyn PdfRenderer>,
}

impl AppState {
    /// Wire up the production collaborators. Nothing connects until first use.
    pub fn from_config(config: Config) -> Result<Self> {
        let Some(secret) = config.auth.jwt_secret.as_deref().filter(|s| !s.is_empty()) else {
            bail!("no JWT secret configured; set AUTH_JWT_SECRET or [auth] jwt_secret");
        };
        let auth = Authenticator::new(secret, config.auth.issuer.as_deref());

        let cache: Arc<dyn SummaryCache> = match config.cache.backend {
            CacheBackend::Redis => Arc::new(RedisCache::new(&config.redis, config.cache.ttl())?),
            CacheBackend::Memory => Arc::new(MemoryCache::new(config.cache.ttl(), config.cache.max_entries)),
        };
        info!("Cache backend: {:?}, ttl {}s", config.cache.backend, config.cache.ttl_secs);

        let client = reqwest::Client::builder()
            .build()
            .wrap_err("failed to build HTTP client")?;

        Ok(Self {
            auth,
            cache,
            fetcher: Arc::new(CaptionFetcher::new(client.clone(), config.caption_lang.clone())),
            summarizer: Arc::new(LlmSummarizer::new(client.clone(), config.summarizer.model.clone())),
            mailer: Arc::new(PostmarkMailer::new(client.clone(), config.email.api_url.clone())),
            pdf: Arc::new(GotenbergRenderer::new(client, config.pdf.endpoint.clone())),
            config: Arc::new(config),
        })
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/getSummary", any(summary::get_summary))
        .route("/api/emailMe", any(export::email_me))
        .route("/api/downloadAsPdf", any(export::download_as_pdf))
        .route("/healthz", get(healthz))
        .with_state(state)
}

pub async fn serve(addr: SocketAddr, router: Router) -> Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .wrap_err_with(|| format!("failed to bind {addr}"))?;
    info!("Listening on {addr}");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown requested");
    }
}

async fn healthz() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Decode a JSON request body, mapping any failure to a 400
fn parse_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|e| ApiError::Validation(format!("Invalid request body: {e}")))
}
