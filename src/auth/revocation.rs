//! Revocation Registry
//!
//! Remembers session tokens that were explicitly logged out so the gating
//! check can refuse them before they expire on their own.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use tokio::task::JoinHandle;
use tokio::time::interval;

/// Store of revoked raw token strings
#[async_trait]
pub trait RevocationRegistry: Send + Sync {
    /// Record `token` as revoked until `expires_at` (unix seconds). Idempotent.
    async fn add(&self, token: &str, expires_at: i64);

    async fn contains(&self, token: &str) -> bool;

    /// Forget revocations whose deadline is at or before `now`. Returns how
    /// many entries were evicted.
    async fn purge_expired(&self, now: i64) -> usize;
}

/// Process-local registry over a sharded concurrent map.
///
/// Not shared between server instances and lost on restart.
#[derive(Debug, Default)]
pub struct InMemoryRevocationRegistry {
    entries: DashMap<String, i64>,
}

impl InMemoryRevocationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl RevocationRegistry for InMemoryRevocationRegistry {
    async fn add(&self, token: &str, expires_at: i64) {
        self.entries
            .entry(token.to_string())
            .and_modify(|deadline| *deadline = (*deadline).max(expires_at))
            .or_insert(expires_at);
    }

    async fn contains(&self, token: &str) -> bool {
        self.entries.contains_key(token)
    }

    async fn purge_expired(&self, now: i64) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, deadline| *deadline > now);
        before.saturating_sub(self.entries.len())
    }
}

/// Spawn the background task that evicts lapsed revocations every `every`.
pub fn spawn_sweeper(registry: Arc<dyn RevocationRegistry>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(every);
        // First tick completes immediately
        ticker.tick().await;

        loop {
            ticker.tick().await;
            let evicted = registry.purge_expired(Utc::now().timestamp()).await;
            if evicted > 0 {
                tracing::debug!("Evicted {} expired revocations", evicted);
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn starts_empty() {
        let registry = InMemoryRevocationRegistry::new();
        assert!(registry.is_empty());
        assert!(!registry.contains("anything").await);
    }

    #[tokio::test]
    async fn add_then_contains() {
        let registry = InMemoryRevocationRegistry::new();
        registry.add("tok-a", i64::MAX).await;

        assert!(registry.contains("tok-a").await);
        assert!(!registry.contains("tok-b").await);
    }

    #[tokio::test]
    async fn add_is_idempotent() {
        let registry = InMemoryRevocationRegistry::new();
        registry.add("tok-a", 100).await;
        registry.add("tok-a", 100).await;
        registry.add("tok-a", 50).await;

        assert_eq!(registry.len(), 1);
        // Re-adding never shortens the deadline
        assert_eq!(registry.purge_expired(99).await, 0);
        assert!(registry.contains("tok-a").await);
    }

    #[tokio::test]
    async fn purge_evicts_only_lapsed_entries() {
        let registry = InMemoryRevocationRegistry::new();
        registry.add("old", 10).await;
        registry.add("edge", 20).await;
        registry.add("fresh", 30).await;

        assert_eq!(registry.purge_expired(20).await, 2);
        assert!(!registry.contains("old").await);
        assert!(!registry.contains("edge").await);
        assert!(registry.contains("fresh").await);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_adds_are_not_lost() {
        let registry = Arc::new(InMemoryRevocationRegistry::new());

        let handles: Vec<_> = (0..64)
            .map(|i| {
                let registry = registry.clone();
                tokio::spawn(async move {
                    for j in 0..50 {
                        registry.add(&format!("tok-{i}-{j}"), i64::MAX).await;
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(registry.len(), 64 * 50);
        assert!(registry.contains("tok-63-49").await);
    }

    #[tokio::test]
    async fn sweeper_evicts_in_background() {
        let registry = Arc::new(InMemoryRevocationRegistry::new());
        registry.add("lapsed", 0).await;
        registry.add("live", i64::MAX).await;

        let handle = spawn_sweeper(registry.clone(), Duration::from_millis(10));
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert!(!registry.contains("lapsed").await);
        assert!(registry.contains("live").await);
        handle.abort();
    }
}
