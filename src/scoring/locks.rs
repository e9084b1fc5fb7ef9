use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex as AsyncMutex, RwLock};
use uuid::Uuid;

/// Registry of per-key async mutexes used to serialize scoring of the same
/// match and refresh of the same user's or group's aggregates. Disjoint keys
/// proceed in parallel with no coordination.
#[derive(Debug, Default)]
pub struct KeyedLocks {
    inner: Arc<RwLock<HashMap<Uuid, Arc<AsyncMutex<()>>>>>,
}

impl KeyedLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn lock_for(&self, key: Uuid) -> Arc<AsyncMutex<()>> {
        {
            let guard = self.inner.read().await;
            if let Some(lock) = guard.get(&key) {
                return lock.clone();
            }
        }

        let mut guard = self.inner.write().await;
        guard
            .entry(key)
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn same_key_returns_same_mutex() {
        let locks = KeyedLocks::new();
        let key = Uuid::new_v4();
        let first = locks.lock_for(key).await;
        let second = locks.lock_for(key).await;
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn different_keys_do_not_block_each_other() {
        let locks = KeyedLocks::new();
        let first = locks.lock_for(Uuid::new_v4()).await;
        let second = locks.lock_for(Uuid::new_v4()).await;

        let _held = first.lock().await;
        // Locking an unrelated key must not deadlock.
        let _other = second.lock().await;
    }
}
