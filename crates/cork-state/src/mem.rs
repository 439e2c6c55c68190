use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::{watch, RwLock};

use cork_types::{CorkError, StateEntry, DEFAULT_KEY};

use crate::format::render_entries;
use crate::traits::StateStore;

struct MemStateInner {
    data: BTreeMap<String, String>,
    stopped: bool,
}

/// In-memory `StateStore` backed by a `BTreeMap`.
///
/// A single `RwLock` covers the map and the stopped flag, so enumeration,
/// writes, reset and stop are all ordered against each other. Keys enumerate
/// in ascending order. Not persisted across restarts.
pub struct MemStateStore {
    inner: Arc<RwLock<MemStateInner>>,
    shutdown: Option<watch::Sender<bool>>,
}

impl MemStateStore {
    pub fn new() -> Self {
        MemStateStore {
            inner: Arc::new(RwLock::new(MemStateInner { data: BTreeMap::new(), stopped: false })),
            shutdown: None,
        }
    }

    /// Like [`MemStateStore::new`], but `stop` also flips `shutdown` to `true`
    /// so the owning server can wind down.
    pub fn with_shutdown(shutdown: watch::Sender<bool>) -> Self {
        MemStateStore { shutdown: Some(shutdown), ..Self::new() }
    }
}

impl Default for MemStateStore {
    fn default() -> Self {
        Self::new()
    }
}

impl StateStore for MemStateStore {
    async fn get(&self, key: &str) -> Result<String, CorkError> {
        let g = self.inner.read().await;
        if g.stopped {
            return Err(CorkError::Stopped);
        }
        if key.is_empty() {
            let entries: Vec<StateEntry> =
                g.data.iter().map(|(k, v)| StateEntry::new(k.clone(), v.clone())).collect();
            tracing::debug!(entries = entries.len(), "queried full state");
            return Ok(render_entries(&entries));
        }
        let value = g.data.get(key).cloned().unwrap_or_default();
        tracing::debug!(key, value = %value, "queried state");
        Ok(value)
    }

    async fn set(&self, key: &str, value: String) -> Result<StateEntry, CorkError> {
        let key = if key.is_empty() {
            tracing::warn!("no key specified, using '{DEFAULT_KEY}'");
            DEFAULT_KEY
        } else {
            key
        };
        let mut g = self.inner.write().await;
        if g.stopped {
            return Err(CorkError::Stopped);
        }
        g.data.insert(key.to_string(), value.clone());
        tracing::debug!(key, value = %value, "received new state data");
        Ok(StateEntry::new(key, value))
    }

    async fn reset(&self) -> Result<(), CorkError> {
        let mut g = self.inner.write().await;
        if g.stopped {
            return Err(CorkError::Stopped);
        }
        let dropped = g.data.len();
        g.data = BTreeMap::new();
        tracing::info!(dropped, "state reset");
        Ok(())
    }

    async fn stop(&self) -> Result<(), CorkError> {
        let mut g = self.inner.write().await;
        if g.stopped {
            return Err(CorkError::Stopped);
        }
        g.stopped = true;
        g.data.clear();
        tracing::info!("stopping");
        if let Some(tx) = &self.shutdown {
            // Nobody listening just means there is no server to wind down.
            let _ = tx.send(true);
        }
        Ok(())
    }

    async fn snapshot(&self) -> Result<Vec<StateEntry>, CorkError> {
        let g = self.inner.read().await;
        if g.stopped {
            return Err(CorkError::Stopped);
        }
        Ok(g.data.iter().map(|(k, v)| StateEntry::new(k.clone(), v.clone())).collect())
    }

    async fn len(&self) -> Result<usize, CorkError> {
        let g = self.inner.read().await;
        if g.stopped {
            return Err(CorkError::Stopped);
        }
        Ok(g.data.len())
    }
}

#[cfg(test)]
mod tests {
    use cork_types::{StateOp, StateOutcome};
    use tokio::sync::mpsc;

    use super::*;

    #[tokio::test]
    async fn set_then_get() {
        let store = MemStateStore::new();

        let stored = store.set("foo", "bar".into()).await.unwrap();
        assert_eq!(stored, StateEntry::new("foo", "bar"));
        assert_eq!(store.get("foo").await.unwrap(), "bar");

        // Last write wins.
        store.set("foo", "baz".into()).await.unwrap();
        assert_eq!(store.get("foo").await.unwrap(), "baz");
        assert_eq!(store.len().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn missing_key_is_soft_miss() {
        let store = MemStateStore::new();
        assert_eq!(store.get("never-written").await.unwrap(), "");
        assert_eq!(store.get("").await.unwrap(), "");
    }

    #[tokio::test]
    async fn empty_key_uses_default() {
        let store = MemStateStore::new();
        let stored = store.set("", "v".into()).await.unwrap();
        assert_eq!(stored.key, DEFAULT_KEY);
        assert_eq!(store.get(DEFAULT_KEY).await.unwrap(), "v");
    }

    #[tokio::test]
    async fn full_enumeration_is_sorted_and_stable() {
        let store = MemStateStore::new();
        store.set("b", "2".into()).await.unwrap();
        store.set("a", "1".into()).await.unwrap();
        store.set("c/d", "".into()).await.unwrap();

        let first = store.get("").await.unwrap();
        assert_eq!(first, "a=1\nb=2\nc/d=");
        assert_eq!(store.get("").await.unwrap(), first);
    }

    #[tokio::test]
    async fn reset_empties_everything() {
        let store = MemStateStore::new();
        store.set("foo", "bar".into()).await.unwrap();
        store.set("x", "y".into()).await.unwrap();

        store.reset().await.unwrap();

        assert_eq!(store.get("").await.unwrap(), "");
        assert_eq!(store.get("foo").await.unwrap(), "");
        assert_eq!(store.get("x").await.unwrap(), "");
        assert!(store.snapshot().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn apply_dispatches_control_and_data() {
        let store = MemStateStore::new();

        let out = store.apply(StateOp::from_write("foo", "bar")).await.unwrap();
        assert_eq!(out, StateOutcome::Stored(StateEntry::new("foo", "bar")));

        let out = store.apply(StateOp::from_write("reset", "ignored")).await.unwrap();
        assert_eq!(out, StateOutcome::Reset);
        assert_eq!(store.get("foo").await.unwrap(), "");
        // The control verb itself is never stored.
        assert_eq!(store.get("reset").await.unwrap(), "");
    }

    #[tokio::test]
    async fn stop_signals_and_refuses_further_ops() {
        let (tx, mut rx) = watch::channel(false);
        let store = MemStateStore::with_shutdown(tx);
        store.set("foo", "bar".into()).await.unwrap();

        let out = store.apply(StateOp::from_write("stop", "")).await.unwrap();
        assert_eq!(out, StateOutcome::Stopped);
        rx.changed().await.unwrap();
        assert!(*rx.borrow());

        assert!(matches!(store.get("foo").await, Err(CorkError::Stopped)));
        assert!(matches!(store.set("foo", "x".into()).await, Err(CorkError::Stopped)));
        assert!(matches!(store.reset().await, Err(CorkError::Stopped)));
        assert!(matches!(store.stop().await, Err(CorkError::Stopped)));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn parallel_writes_to_distinct_keys() {
        let store = Arc::new(MemStateStore::new());

        let (send, mut recv) = mpsc::unbounded_channel();
        for n in 0..1000u32 {
            let send_clone = send.clone();
            let store_clone = store.clone();
            tokio::spawn(async move {
                tokio::time::sleep(std::time::Duration::from_millis(rand::random::<u64>() % 50))
                    .await;
                let entry = store_clone.set(&format!("key{n:04}"), n.to_string()).await.unwrap();
                let _ = send_clone.send(entry);
            });
        }

        drop(send);
        let mut written = 0;
        while recv.recv().await.is_some() {
            written += 1;
        }
        assert_eq!(written, 1000);
        assert_eq!(store.len().await.unwrap(), 1000);
        for n in [0u32, 499, 999] {
            assert_eq!(store.get(&format!("key{n:04}")).await.unwrap(), n.to_string());
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn parallel_writes_to_same_key_leave_one_value() {
        let store = Arc::new(MemStateStore::new());
        let a = "a".repeat(4096);
        let b = "b".repeat(4096);

        let mut handles = Vec::new();
        for i in 0..200 {
            let store = store.clone();
            let value = if i % 2 == 0 { a.clone() } else { b.clone() };
            handles.push(tokio::spawn(async move { store.set("shared", value).await.unwrap() }));
        }
        for h in handles {
            h.await.unwrap();
        }

        let value = store.get("shared").await.unwrap();
        assert!(value == a || value == b);
        assert_eq!(store.len().await.unwrap(), 1);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn enumeration_never_straddles_reset() {
        let store = Arc::new(MemStateStore::new());
        let writer = {
            let store = store.clone();
            tokio::spawn(async move {
                for round in 0..100 {
                    store.set("a", round.to_string()).await.unwrap();
                    store.set("b", round.to_string()).await.unwrap();
                    store.reset().await.unwrap();
                }
            })
        };

        for _ in 0..200 {
            let snapshot = store.snapshot().await.unwrap();
            // Either empty, only `a`, or `a` and `b` from the same round.
            match snapshot.as_slice() {
                [] | [_] => {}
                [a, b] => assert_eq!(a.value, b.value),
                other => panic!("unexpected snapshot {other:?}"),
            }
        }
        writer.await.unwrap();
    }
}
