//! Time-boxed cache for rendered pages.
//!
//! Entries expire on their own after their TTL. Writes to the underlying data
//! never invalidate them; only expiry or an explicit [`PageCache::clear`] does.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use fred::clients::Client as RedisClient;
use fred::interfaces::KeysInterface;
use fred::types::Expiration;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::{debug, info};
use yatube_common::{AppError, AppResult};

/// Cache key of a global feed page, one entry per requested page number.
///
/// Only the `page` value takes part: missing or non-numeric values share the
/// first page's key and every other query parameter is ignored.
#[must_use]
pub fn index_page_key(page: Option<&str>) -> String {
    let number = page
        .map(str::trim)
        .and_then(|p| p.parse::<i64>().ok())
        .unwrap_or(1);
    format!("index_page:{number}")
}

/// Storage for rendered page bodies.
#[async_trait::async_trait]
pub trait PageCache: Send + Sync {
    /// Get a cached body if it has not expired.
    async fn get(&self, key: &str) -> AppResult<Option<String>>;

    /// Store a body for `ttl`.
    async fn set(&self, key: &str, body: &str, ttl: Duration) -> AppResult<()>;

    /// Drop every entry.
    async fn clear(&self) -> AppResult<()>;
}

/// Process-local page cache.
#[derive(Default)]
pub struct MemoryPageCache {
    entries: RwLock<HashMap<String, (String, Instant)>>,
}

impl MemoryPageCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl PageCache for MemoryPageCache {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        let now = Instant::now();
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some((body, expires_at)) if *expires_at > now => {
                    debug!(key = %key, "Page cache hit");
                    return Ok(Some(body.clone()));
                }
                None => {
                    debug!(key = %key, "Page cache miss");
                    return Ok(None);
                }
                Some(_) => {}
            }
        }

        // Expired: evict under the write lock
        let mut entries = self.entries.write().await;
        if entries.get(key).is_some_and(|(_, expires_at)| *expires_at <= now) {
            entries.remove(key);
        }
        debug!(key = %key, "Page cache entry expired");
        Ok(None)
    }

    async fn set(&self, key: &str, body: &str, ttl: Duration) -> AppResult<()> {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        entries.retain(|_, (_, expires_at)| *expires_at > now);
        entries.insert(key.to_string(), (body.to_string(), now + ttl));
        Ok(())
    }

    async fn clear(&self) -> AppResult<()> {
        let mut entries = self.entries.write().await;
        let dropped = entries.len();
        entries.clear();
        info!(dropped, "Cleared page cache");
        Ok(())
    }
}

/// Redis-backed page cache shared between processes.
///
/// Keys are namespaced by a generation counter; clearing bumps the counter so
/// older entries are never read again and expire by TTL.
pub struct RedisPageCache {
    redis: Arc<RedisClient>,
    prefix: String,
}

impl RedisPageCache {
    /// Create a cache over a connected client.
    #[must_use]
    pub fn new(redis: Arc<RedisClient>) -> Self {
        Self::with_prefix(redis, "yatube:page_cache:")
    }

    /// Create a cache with a custom key prefix.
    #[must_use]
    pub fn with_prefix(redis: Arc<RedisClient>, prefix: impl Into<String>) -> Self {
        Self {
            redis,
            prefix: prefix.into(),
        }
    }

    fn generation_key(&self) -> String {
        format!("{}generation", self.prefix)
    }

    async fn generation(&self) -> AppResult<i64> {
        let generation: Option<i64> = self
            .redis
            .get(self.generation_key())
            .await
            .map_err(|e| AppError::Cache(e.to_string()))?;
        Ok(generation.unwrap_or(0))
    }

    async fn entry_key(&self, key: &str) -> AppResult<String> {
        Ok(format!("{}{}:{key}", self.prefix, self.generation().await?))
    }
}

#[async_trait::async_trait]
impl PageCache for RedisPageCache {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        let body: Option<String> = self
            .redis
            .get(self.entry_key(key).await?)
            .await
            .map_err(|e| AppError::Cache(e.to_string()))?;

        if body.is_some() {
            debug!(key = %key, "Page cache hit");
        } else {
            debug!(key = %key, "Page cache miss");
        }
        Ok(body)
    }

    async fn set(&self, key: &str, body: &str, ttl: Duration) -> AppResult<()> {
        self.redis
            .set::<(), _, _>(
                self.entry_key(key).await?,
                body,
                Some(Expiration::EX(ttl.as_secs().max(1) as i64)),
                None,
                false,
            )
            .await
            .map_err(|e| AppError::Cache(e.to_string()))
    }

    async fn clear(&self) -> AppResult<()> {
        let generation: i64 = self
            .redis
            .incr(self.generation_key())
            .await
            .map_err(|e| AppError::Cache(e.to_string()))?;
        info!(generation, "Cleared page cache");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_index_page_key_uses_page_number_only() {
        assert_eq!(index_page_key(None), "index_page:1");
        assert_eq!(index_page_key(Some("2")), "index_page:2");
        assert_eq!(index_page_key(Some(" 2 ")), "index_page:2");
        assert_eq!(index_page_key(Some("abc")), "index_page:1");
        assert_eq!(index_page_key(Some("-3")), "index_page:-3");
    }

    #[tokio::test(start_paused = true)]
    async fn test_memory_set_drops_expired_entries() {
        let cache = MemoryPageCache::new();
        let ttl = Duration::from_secs(20);
        for i in 0..1_000 {
            cache
                .set(&index_page_key(Some(&i.to_string())), "stale", ttl)
                .await
                .unwrap();
        }
        assert_eq!(cache.entries.read().await.len(), 1_000);

        tokio::time::advance(Duration::from_secs(3600)).await;
        cache
            .set(&index_page_key(None), "fresh", ttl)
            .await
            .unwrap();

        assert_eq!(cache.entries.read().await.len(), 1);
        assert_eq!(
            cache.get(&index_page_key(None)).await.unwrap().as_deref(),
            Some("fresh")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_memory_set_keeps_live_entries() {
        let cache = MemoryPageCache::new();
        cache
            .set("index_page:1", "one", Duration::from_secs(60))
            .await
            .unwrap();

        tokio::time::advance(Duration::from_secs(30)).await;
        cache
            .set("index_page:2", "two", Duration::from_secs(60))
            .await
            .unwrap();

        assert_eq!(cache.entries.read().await.len(), 2);
        assert_eq!(cache.get("index_page:1").await.unwrap().as_deref(), Some("one"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_memory_entry_expires_after_ttl() {
        let cache = MemoryPageCache::new();
        cache
            .set("index_page:1", "cached", Duration::from_secs(20))
            .await
            .unwrap();

        tokio::time::advance(Duration::from_secs(19)).await;
        assert_eq!(
            cache.get("index_page:1").await.unwrap().as_deref(),
            Some("cached")
        );

        tokio::time::advance(Duration::from_secs(2)).await;
        assert!(cache.get("index_page:1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_memory_clear_drops_everything() {
        let cache = MemoryPageCache::new();
        let ttl = Duration::from_secs(20);
        cache.set("index_page:1", "one", ttl).await.unwrap();
        cache.set("index_page:2", "two", ttl).await.unwrap();

        cache.clear().await.unwrap();

        assert!(cache.get("index_page:1").await.unwrap().is_none());
        assert!(cache.get("index_page:2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_memory_keys_are_independent() {
        let cache = MemoryPageCache::new();
        let ttl = Duration::from_secs(20);
        cache.set("index_page:1", "first", ttl).await.unwrap();

        assert!(cache.get("index_page:2").await.unwrap().is_none());
    }
}
