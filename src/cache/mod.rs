//! Side cache for transcripts and summaries, keyed by user and video.
//!
//! Two backends share the [`SummaryCache`] contract:
//! - [`RedisCache`] - the production store, connected lazily on first use
//! - [`MemoryCache`] - in-process map with the same TTL semantics

mod memory;
mod redis_cache;

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use eyre::Result;

use crate::video_url::VideoId;

pub use memory::MemoryCache;
pub use redis_cache::RedisCache;

/// Retention window for cached entries (5 days)
pub const DEFAULT_TTL: Duration = Duration::from_secs(86_400 * 5);

/// Which half of a cached summary a key refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheKind {
    Transcripts,
    Summary,
}

impl CacheKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheKind::Transcripts => "transcripts",
            CacheKind::Summary => "summary",
        }
    }
}

impl fmt::Display for CacheKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `user:<userId>:<kind>:<videoId>`
pub fn cache_key(user_id: &str, kind: CacheKind, video_id: &VideoId) -> String {
    format!("user:{user_id}:{kind}:{video_id}")
}

/// A transcript together with the summary generated from it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedSummary {
    pub transcript: Vec<String>,
    pub summary: String,
}

#[async_trait]
pub trait SummaryCache: Send + Sync {
    /// Cached caption fragments; an empty list counts as a miss
    async fn lookup_transcript(&self, user_id: &str, video_id: &VideoId) -> Result<Option<Vec<String>>>;

    async fn lookup_summary(&self, user_id: &str, video_id: &VideoId) -> Result<Option<String>>;

    /// Replace both entries for a video in one atomic write, resetting their TTL
    async fn store(&self, user_id: &str, video_id: &VideoId, transcript: &[String], summary: &str) -> Result<()>;

    /// Hit only when both the transcript and the summary are present
    async fn lookup(&self, user_id: &str, video_id: &VideoId) -> Result<Option<CachedSummary>> {
        let transcript = self.lookup_transcript(user_id, video_id).await?;
        let summary = self.lookup_summary(user_id, video_id).await?;

        Ok(match (transcript, summary) {
            (Some(transcript), Some(summary)) if !summary.is_empty() => Some(CachedSummary { transcript, summary }),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract_video_id;

    #[test]
    fn test_cache_key_format() {
        let video = extract_video_id("https://youtu.be/dQw4w9WgXcQ").unwrap();
        assert_eq!(
            cache_key("user_2abc", CacheKind::Transcripts, &video),
            "user:user_2abc:transcripts:dQw4w9WgXcQ"
        );
        assert_eq!(cache_key("user_2abc", CacheKind::Summary, &video), "user:user_2abc:summary:dQw4w9WgXcQ");
    }

    #[test]
    fn test_cache_keys_distinct_per_user_and_video() {
        let a = extract_video_id("https://youtu.be/dQw4w9WgXcQ").unwrap();
        let b = extract_video_id("https://youtu.be/9bZkp7q19f0").unwrap();
        assert_ne!(cache_key("u1", CacheKind::Summary, &a), cache_key("u2", CacheKind::Summary, &a));
        assert_ne!(cache_key("u1", CacheKind::Summary, &a), cache_key("u1", CacheKind::Summary, &b));
        assert_ne!(cache_key("u1", CacheKind::Summary, &a), cache_key("u1", CacheKind::Transcripts, &a));
    }

    #[test]
    fn test_default_ttl_is_five_days() {
        assert_eq!(DEFAULT_TTL.as_secs(), 432_000);
    }
}
