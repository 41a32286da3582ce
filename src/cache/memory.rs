use std::time::Duration;

use async_trait::async_trait;
use eyre::Result;
use moka::sync::Cache;

use super::{CachedSummary, SummaryCache};
use crate::video_url::VideoId;

/// moka refuses a time-to-live longer than 1000 years
const MAX_TTL: Duration = Duration::from_secs(100 * 365 * 86_400);

/// In-process cache, bounded and evicting entries once their TTL runs out.
///
/// Each `(user, video)` pair holds one [`CachedSummary`], so a write replaces
/// the transcript and the summary together.
pub struct MemoryCache {
    entries: Cache<(String, String), CachedSummary>,
}

impl MemoryCache {
    pub fn new(ttl: Duration, max_entries: u64) -> Self {
        let entries = Cache::builder()
            .max_capacity(max_entries)
            .time_to_live(ttl.min(MAX_TTL))
            .build();
        Self { entries }
    }

    fn key(user_id: &str, video_id: &VideoId) -> (String, String) {
        (user_id.to_string(), video_id.to_string())
    }

    /// Number of cached videos, after pending evictions have run
    pub fn len(&self) -> u64 {
        self.entries.run_pending_tasks();
        self.entries.entry_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl SummaryCache for MemoryCache {
    async fn lookup_transcript(&self, user_id: &str, video_id: &VideoId) -> Result<Option<Vec<String>>> {
        Ok(self
            .entries
            .get(&Self::key(user_id, video_id))
            .map(|hit| hit.transcript)
            .filter(|fragments| !fragments.is_empty()))
    }

    async fn lookup_summary(&self, user_id: &str, video_id: &VideoId) -> Result<Option<String>> {
        Ok(self.entries.get(&Self::key(user_id, video_id)).map(|hit| hit.summary))
    }

    async fn store(&self, user_id: &str, video_id: &VideoId, transcript: &[String], summary: &str) -> Result<()> {
        let value = CachedSummary {
            transcript: transcript.to_vec(),
            summary: summary.to_string(),
        };
        self.entries.insert(Self::key(user_id, video_id), value);
        Ok(())
    }

    async fn lookup(&self, user_id: &str, video_id: &VideoId) -> Result<Option<CachedSummary>> {
        Ok(self
            .entries
            .get(&Self::key(user_id, video_id))
            .filter(|hit| !hit.transcript.is_empty() && !hit.summary.is_empty()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::DEFAULT_TTL;
    use crate::extract_video_id;
    use pretty_assertions::assert_eq;

    fn video() -> VideoId {
        extract_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ").unwrap()
    }

    fn fragments() -> Vec<String> {
        vec!["never gonna give you up".to_string(), "never gonna let you down".to_string()]
    }

    #[tokio::test]
    async fn test_store_then_lookup_round_trips() {
        let cache = MemoryCache::new(DEFAULT_TTL, 100);
        cache.store("user_1", &video(), &fragments(), "- a song").await.unwrap();

        assert_eq!(
            cache.lookup("user_1", &video()).await.unwrap(),
            Some(CachedSummary {
                transcript: fragments(),
                summary: "- a song".to_string(),
            })
        );
        assert_eq!(cache.lookup_transcript("user_1", &video()).await.unwrap(), Some(fragments()));
        assert_eq!(cache.lookup_summary("user_1", &video()).await.unwrap().as_deref(), Some("- a song"));
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_lookup_is_scoped_to_user() {
        let cache = MemoryCache::new(DEFAULT_TTL, 100);
        cache.store("user_1", &video(), &fragments(), "- a song").await.unwrap();
        assert_eq!(cache.lookup("user_2", &video()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_store_replaces_previous_transcript() {
        let cache = MemoryCache::new(DEFAULT_TTL, 100);
        cache.store("u", &video(), &fragments(), "old").await.unwrap();
        cache.store("u", &video(), &["fresh".to_string()], "new").await.unwrap();

        let hit = cache.lookup("u", &video()).await.unwrap().unwrap();
        assert_eq!(hit.transcript, vec!["fresh".to_string()]);
        assert_eq!(hit.summary, "new");
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_empty_transcript_is_a_miss() {
        let cache = MemoryCache::new(DEFAULT_TTL, 100);
        cache.store("u", &video(), &[], "summary only").await.unwrap();

        assert_eq!(cache.lookup_transcript("u", &video()).await.unwrap(), None);
        assert_eq!(cache.lookup_summary("u", &video()).await.unwrap().as_deref(), Some("summary only"));
        assert_eq!(cache.lookup("u", &video()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_expired_entries_are_evicted() {
        let cache = MemoryCache::new(Duration::ZERO, 1_000);
        for user in 0..200 {
            cache.store(&format!("user_{user}"), &video(), &fragments(), "gone").await.unwrap();
        }

        assert_eq!(cache.lookup("user_0", &video()).await.unwrap(), None);
        assert_eq!(cache.len(), 0);
    }

    #[tokio::test]
    async fn test_capacity_bounds_entries() {
        let cache = MemoryCache::new(DEFAULT_TTL, 10);
        for user in 0..100 {
            cache.store(&format!("user_{user}"), &video(), &fragments(), "kept?").await.unwrap();
        }
        assert!(cache.len() <= 10, "len = {}", cache.len());
    }

    #[tokio::test]
    async fn test_huge_ttl_is_clamped() {
        let cache = MemoryCache::new(Duration::from_secs(u64::MAX), 10);
        cache.store("u", &video(), &fragments(), "forever").await.unwrap();
        assert!(cache.lookup("u", &video()).await.unwrap().is_some());
    }
}
