// Shared credential slot

use std::sync::Arc;
use tokio::sync::RwLock;

/// Current value of one credential
///
/// Clones share the same slot. Many readers may hold the lock at once; a write
/// waits for in-flight reads and blocks new ones until it commits, so readers
/// never see a partial value. An empty string means nothing has been fetched yet.
#[derive(Clone, Debug, Default)]
pub struct CredentialCache {
    value: Arc<RwLock<String>>,
}

impl CredentialCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Latest committed value
    pub async fn get(&self) -> String {
        self.value.read().await.clone()
    }

    /// Replace the stored value
    pub async fn set(&self, value: String) {
        let mut slot = self.value.write().await;
        *slot = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_new_cache_is_empty() {
        let cache = CredentialCache::new();
        assert_eq!(cache.get().await, "");
    }

    #[tokio::test]
    async fn test_set_then_get() {
        let cache = CredentialCache::new();
        cache.set("token-1".to_string()).await;
        assert_eq!(cache.get().await, "token-1");

        cache.set("token-2".to_string()).await;
        assert_eq!(cache.get().await, "token-2");
    }

    #[tokio::test]
    async fn test_clones_share_slot() {
        let writer = CredentialCache::new();
        let reader = writer.clone();
        writer.set("shared".to_string()).await;
        assert_eq!(reader.get().await, "shared");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_readers_see_committed_value() {
        let cache = CredentialCache::new();
        cache.set("committed".to_string()).await;

        let readers: Vec<_> = (0..64)
            .map(|_| {
                let cache = cache.clone();
                tokio::spawn(async move { cache.get().await })
            })
            .collect();

        for reader in readers {
            assert_eq!(reader.await.unwrap(), "committed");
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_readers_never_observe_partial_write() {
        let cache = CredentialCache::new();
        let a = "a".repeat(512);
        let b = "b".repeat(512);
        cache.set(a.clone()).await;

        let writer = {
            let cache = cache.clone();
            let (a, b) = (a.clone(), b.clone());
            tokio::spawn(async move {
                for i in 0..200 {
                    let next = if i % 2 == 0 { b.clone() } else { a.clone() };
                    cache.set(next).await;
                }
            })
        };

        let readers: Vec<_> = (0..8)
            .map(|_| {
                let cache = cache.clone();
                let (a, b) = (a.clone(), b.clone());
                tokio::spawn(async move {
                    for _ in 0..200 {
                        let seen = cache.get().await;
                        assert!(seen == a || seen == b);
                    }
                })
            })
            .collect();

        writer.await.unwrap();
        for reader in readers {
            reader.await.unwrap();
        }
    }
}
