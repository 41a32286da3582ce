use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use eyre::{Result, WrapErr};
use log::{debug, info};
use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use tokio::sync::OnceCell;

use super::{CacheKind, CachedSummary, SummaryCache, cache_key};
use crate::config::RedisConfig;
use crate::video_url::VideoId;

/// Redis-backed cache.
///
/// The connection is opened on first use and shared by every request after that;
/// `ConnectionManager` multiplexes commands and reconnects on its own.
pub struct RedisCache {
    client: redis::Client,
    conn: OnceCell<ConnectionManager>,
    ttl: Duration,
    endpoint: String,
}

impl fmt::Debug for RedisCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisCache")
            .field("endpoint", &self.endpoint)
            .field("ttl", &self.ttl)
            .field("connected", &self.conn.initialized())
            .finish()
    }
}

impl RedisCache {
    pub fn new(settings: &RedisConfig, ttl: Duration) -> Result<Self> {
        let url = settings.connection_url()?;
        let client = redis::Client::open(url.as_str()).wrap_err("invalid redis connection settings")?;
        Ok(Self {
            client,
            conn: OnceCell::new(),
            ttl,
            endpoint: format!("{}:{}", settings.host, settings.port),
        })
    }

    async fn connection(&self) -> Result<ConnectionManager> {
        let conn = self
            .conn
            .get_or_try_init(|| async {
                info!("Connecting to redis at {}", self.endpoint);
                ConnectionManager::new(self.client.clone()).await
            })
            .await
            .wrap_err_with(|| format!("failed to connect to redis at {}", self.endpoint))?;
        Ok(conn.clone())
    }

    fn ttl_secs(&self) -> i64 {
        i64::try_from(self.ttl.as_secs()).unwrap_or(i64::MAX)
    }
}

#[async_trait]
impl SummaryCache for RedisCache {
    async fn lookup_transcript(&self, user_id: &str, video_id: &VideoId) -> Result<Option<Vec<String>>> {
        let key = cache_key(user_id, CacheKind::Transcripts, video_id);
        let mut conn = self.connection().await?;
        let fragments: Vec<String> = conn.lrange(&key, 0, -1).await?;
        debug!("LRANGE {key}: {} fragments", fragments.len());
        Ok((!fragments.is_empty()).then_some(fragments))
    }

    async fn lookup_summary(&self, user_id: &str, video_id: &VideoId) -> Result<Option<String>> {
        let key = cache_key(user_id, CacheKind::Summary, video_id);
        let mut conn = self.connection().await?;
        let summary: Option<String> = conn.get(&key).await?;
        debug!("GET {key}: {}", if summary.is_some() { "hit" } else { "miss" });
        Ok(summary)
    }

    async fn store(&self, user_id: &str, video_id: &VideoId, transcript: &[String], summary: &str) -> Result<()> {
        let transcript_key = cache_key(user_id, CacheKind::Transcripts, video_id);
        let summary_key = cache_key(user_id, CacheKind::Summary, video_id);
        let ttl = self.ttl_secs();
        let pipe = store_pipeline(&transcript_key, &summary_key, transcript, summary, ttl);

        let mut conn = self.connection().await?;
        pipe.query_async::<_, ()>(&mut conn)
            .await
            .wrap_err_with(|| format!("failed to cache summary for video {video_id}"))?;

        debug!("Cached {} fragments and summary for {video_id} (ttl {ttl}s)", transcript.len());
        Ok(())
    }

    async fn lookup(&self, user_id: &str, video_id: &VideoId) -> Result<Option<CachedSummary>> {
        let transcript_key = cache_key(user_id, CacheKind::Transcripts, video_id);
        let summary_key = cache_key(user_id, CacheKind::Summary, video_id);
        let pipe = lookup_pipeline(&transcript_key, &summary_key);

        let mut conn = self.connection().await?;
        let (transcript, summary): (Vec<String>, Option<String>) = pipe.query_async(&mut conn).await?;
        debug!("LRANGE+GET {summary_key}: {} fragments, summary {}", transcript.len(), summary.is_some());

        Ok(match summary {
            Some(summary) if !transcript.is_empty() && !summary.is_empty() => Some(CachedSummary { transcript, summary }),
            _ => None,
        })
    }
}

/// `MULTI` / `DEL` / `RPUSH` / `EXPIRE` / `SET` / `EXPIRE` / `EXEC`
fn store_pipeline(
    transcript_key: &str,
    summary_key: &str,
    transcript: &[String],
    summary: &str,
    ttl: i64,
) -> redis::Pipeline {
    let mut pipe = redis::pipe();
    pipe.atomic().del(transcript_key).ignore();
    if !transcript.is_empty() {
        pipe.rpush(transcript_key, transcript.to_vec()).ignore();
    }
    pipe.cmd("EXPIRE")
        .arg(transcript_key)
        .arg(ttl)
        .ignore()
        .set(summary_key, summary)
        .ignore()
        .cmd("EXPIRE")
        .arg(summary_key)
        .arg(ttl)
        .ignore();
    pipe
}

/// Both halves read inside one `MULTI` so a concurrent store can't interleave
fn lookup_pipeline(transcript_key: &str, summary_key: &str) -> redis::Pipeline {
    let mut pipe = redis::pipe();
    pipe.atomic().lrange(transcript_key, 0, -1).get(summary_key);
    pipe
}
