//! In-memory Remote Store.
//!
//! Reference implementation of the store contract and the backend for the
//! test suite. Documents live in a `BTreeMap`, so snapshots arrive in
//! lexicographic id order rather than the canonical display order,
//! which keeps projection honest. Every committed write fans the full
//! collection out to live subscribers; a batch lands as one delivery.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::error::StoreError;
use crate::store::{MonthSnapshot, RemoteStore, SettingsSnapshot, Subscription, WriteBatch};
use crate::types::{BoardSettings, MonthRecord};

#[derive(Default)]
struct StoreInner {
    months: BTreeMap<String, MonthRecord>,
    settings: Option<BoardSettings>,
    month_listeners: HashMap<Uuid, mpsc::UnboundedSender<MonthSnapshot>>,
    settings_listeners: HashMap<Uuid, mpsc::UnboundedSender<SettingsSnapshot>>,
    fail_next_write: Option<StoreError>,
    subscribe_error: Option<StoreError>,
    write_count: usize,
}

/// In-memory store with live snapshot fan-out and failure injection.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<StoreInner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with month documents (settings left unset).
    pub fn with_months(months: Vec<MonthRecord>) -> Self {
        let store = Self::new();
        if let Ok(mut inner) = store.inner.lock() {
            for month in months {
                inner.months.insert(month.id.clone(), month);
            }
        }
        store
    }

    fn lock(&self) -> Result<MutexGuard<'_, StoreInner>, StoreError> {
        self.inner
            .lock()
            .map_err(|_| StoreError::Unavailable("store lock poisoned".to_string()))
    }

    /// Make the next write (single or batch) fail with `err`, leaving the
    /// collection untouched.
    pub fn fail_next_write(&self, err: StoreError) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.fail_next_write = Some(err);
        }
    }

    /// Make new subscriptions fail immediately with `err` (the listener
    /// is dead after that one delivery, like a rejected remote listener).
    pub fn set_subscribe_error(&self, err: StoreError) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.subscribe_error = Some(err);
        }
    }

    /// Push an error to current month subscribers, killing their streams.
    pub fn emit_month_error(&self, err: StoreError) {
        if let Ok(mut inner) = self.inner.lock() {
            for (_, tx) in inner.month_listeners.drain() {
                let _ = tx.send(Err(err.clone()));
            }
        }
    }

    pub fn month(&self, id: &str) -> Option<MonthRecord> {
        self.inner
            .lock()
            .ok()
            .and_then(|inner| inner.months.get(id).cloned())
    }

    pub fn month_count(&self) -> usize {
        self.inner.lock().map(|inner| inner.months.len()).unwrap_or(0)
    }

    pub fn settings(&self) -> Option<BoardSettings> {
        self.inner
            .lock()
            .ok()
            .and_then(|inner| inner.settings.clone())
    }

    /// Number of write attempts seen, including failed ones.
    pub fn write_count(&self) -> usize {
        self.inner.lock().map(|inner| inner.write_count).unwrap_or(0)
    }

    pub fn month_listener_count(&self) -> usize {
        self.inner
            .lock()
            .map(|inner| inner.month_listeners.len())
            .unwrap_or(0)
    }
}

/// Merge `patch` into `base` the way the hosted store does: maps merge
/// key-by-key recursively, everything else (arrays included) replaces.
fn merge_value(base: &mut serde_json::Value, patch: serde_json::Value) {
    match (base, patch) {
        (serde_json::Value::Object(base_map), serde_json::Value::Object(patch_map)) => {
            for (key, value) in patch_map {
                match base_map.get_mut(&key) {
                    Some(slot) => merge_value(slot, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}

fn merge_documents<T>(current: &T, incoming: &T) -> Result<T, StoreError>
where
    T: serde::Serialize + serde::de::DeserializeOwned,
{
    let mut base = serde_json::to_value(current)
        .map_err(|e| StoreError::Unavailable(format!("serialize failed: {}", e)))?;
    let patch = serde_json::to_value(incoming)
        .map_err(|e| StoreError::Unavailable(format!("serialize failed: {}", e)))?;
    merge_value(&mut base, patch);
    serde_json::from_value(base)
        .map_err(|e| StoreError::Unavailable(format!("merge produced bad document: {}", e)))
}

fn take_injected_failure(inner: &mut StoreInner) -> Result<(), StoreError> {
    inner.write_count += 1;
    match inner.fail_next_write.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

fn notify_month_listeners(inner: &mut StoreInner) {
    let snapshot: Vec<MonthRecord> = inner.months.values().cloned().collect();
    inner
        .month_listeners
        .retain(|_, tx| tx.send(Ok(snapshot.clone())).is_ok());
}

fn notify_settings_listeners(inner: &mut StoreInner) {
    let settings = inner.settings.clone().unwrap_or_default();
    inner
        .settings_listeners
        .retain(|_, tx| tx.send(Ok(settings.clone())).is_ok());
}

#[async_trait]
impl RemoteStore for MemoryStore {
    async fn subscribe_months(&self) -> Subscription<MonthSnapshot> {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = Uuid::new_v4();
        if let Ok(mut inner) = self.inner.lock() {
            match inner.subscribe_error.clone() {
                Some(err) => {
                    // One error delivery, then the stream is dead.
                    let _ = tx.send(Err(err));
                }
                None => {
                    let _ = tx.send(Ok(inner.months.values().cloned().collect()));
                    inner.month_listeners.insert(id, tx);
                }
            }
        }
        let registry = Arc::clone(&self.inner);
        Subscription::new(rx, move || {
            if let Ok(mut inner) = registry.lock() {
                inner.month_listeners.remove(&id);
            }
        })
    }

    async fn subscribe_settings(&self) -> Subscription<SettingsSnapshot> {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = Uuid::new_v4();
        if let Ok(mut inner) = self.inner.lock() {
            match inner.subscribe_error.clone() {
                Some(err) => {
                    let _ = tx.send(Err(err));
                }
                None => {
                    let _ = tx.send(Ok(inner.settings.clone().unwrap_or_default()));
                    inner.settings_listeners.insert(id, tx);
                }
            }
        }
        let registry = Arc::clone(&self.inner);
        Subscription::new(rx, move || {
            if let Ok(mut inner) = registry.lock() {
                inner.settings_listeners.remove(&id);
            }
        })
    }

    async fn set_month_merge(&self, month: &MonthRecord) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        take_injected_failure(&mut inner)?;
        let merged = match inner.months.get(&month.id) {
            Some(current) => merge_documents(current, month)?,
            None => month.clone(),
        };
        inner.months.insert(month.id.clone(), merged);
        notify_month_listeners(&mut inner);
        Ok(())
    }

    async fn set_settings_merge(&self, settings: &BoardSettings) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        take_injected_failure(&mut inner)?;
        let merged = match inner.settings.as_ref() {
            Some(current) => merge_documents(current, settings)?,
            None => settings.clone(),
        };
        inner.settings = Some(merged);
        notify_settings_listeners(&mut inner);
        Ok(())
    }

    async fn commit_batch(&self, batch: WriteBatch) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        take_injected_failure(&mut inner)?;
        // Batch entries are plain sets, not merges.
        for month in batch.months {
            inner.months.insert(month.id.clone(), month);
        }
        let wrote_settings = batch.settings.is_some();
        if let Some(settings) = batch.settings {
            inner.settings = Some(settings);
        }
        notify_month_listeners(&mut inner);
        if wrote_settings {
            notify_settings_listeners(&mut inner);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::seed_months;

    fn sample_month() -> MonthRecord {
        seed_months().remove(2)
    }

    #[tokio::test]
    async fn test_subscribe_delivers_current_contents_first() {
        let store = MemoryStore::with_months(vec![sample_month()]);
        let mut sub = store.subscribe_months().await;
        let first = sub.next().await.unwrap().unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].id, "mar-2026");
    }

    #[tokio::test]
    async fn test_write_fans_out_to_subscribers() {
        let store = MemoryStore::new();
        let mut sub = store.subscribe_months().await;
        assert!(sub.next().await.unwrap().unwrap().is_empty());

        store.set_month_merge(&sample_month()).await.unwrap();
        let snapshot = sub.next().await.unwrap().unwrap();
        assert_eq!(snapshot.len(), 1);
    }

    #[tokio::test]
    async fn test_merge_keeps_missing_fields() {
        let store = MemoryStore::new();
        let mut original = sample_month();
        original.product_launch.launch_date = Some("Early March".to_string());
        store.set_month_merge(&original).await.unwrap();

        // A client that never saw launchDate writes the launch without it.
        let mut sparse = original.clone();
        sparse.product_launch.launch_date = None;
        sparse.product_launch.title = "Flavortown II".to_string();
        store.set_month_merge(&sparse).await.unwrap();

        let merged = store.month("mar-2026").unwrap();
        assert_eq!(merged.product_launch.title, "Flavortown II");
        assert_eq!(
            merged.product_launch.launch_date.as_deref(),
            Some("Early March")
        );
    }

    #[tokio::test]
    async fn test_merge_replaces_arrays_wholesale() {
        let store = MemoryStore::new();
        let original = sample_month();
        assert_eq!(original.product_launch.resources.len(), 2);
        store.set_month_merge(&original).await.unwrap();

        let mut trimmed = original.clone();
        trimmed.product_launch.resources.truncate(1);
        store.set_month_merge(&trimmed).await.unwrap();

        let merged = store.month("mar-2026").unwrap();
        assert_eq!(merged.product_launch.resources.len(), 1);
    }

    #[tokio::test]
    async fn test_batch_lands_as_single_delivery() {
        let store = MemoryStore::new();
        let mut sub = store.subscribe_months().await;
        let _ = sub.next().await;

        store
            .commit_batch(WriteBatch {
                months: seed_months(),
                settings: Some(BoardSettings::default()),
            })
            .await
            .unwrap();

        let snapshot = sub.next().await.unwrap().unwrap();
        assert_eq!(snapshot.len(), 12);
        // Exactly one delivery for the whole batch.
        assert!(sub.try_next().is_none());
        assert!(store.settings().is_some());
    }

    #[tokio::test]
    async fn test_failed_write_leaves_collection_untouched() {
        let store = MemoryStore::new();
        store.fail_next_write(StoreError::Unavailable("injected".to_string()));
        let result = store.set_month_merge(&sample_month()).await;
        assert!(result.is_err());
        assert_eq!(store.month_count(), 0);
        assert_eq!(store.write_count(), 1);

        // The injection is one-shot.
        store.set_month_merge(&sample_month()).await.unwrap();
        assert_eq!(store.month_count(), 1);
    }

    #[tokio::test]
    async fn test_subscribe_error_is_single_delivery() {
        let store = MemoryStore::new();
        store.set_subscribe_error(StoreError::PermissionDenied);
        let mut sub = store.subscribe_months().await;
        assert_eq!(sub.next().await.unwrap(), Err(StoreError::PermissionDenied));
        assert!(sub.next().await.is_none());
    }

    #[tokio::test]
    async fn test_drop_releases_listener() {
        let store = MemoryStore::new();
        let sub = store.subscribe_months().await;
        assert_eq!(store.month_listener_count(), 1);
        drop(sub);
        assert_eq!(store.month_listener_count(), 0);
    }

    #[tokio::test]
    async fn test_snapshot_order_is_server_order() {
        let store = MemoryStore::with_months(seed_months());
        let mut sub = store.subscribe_months().await;
        let snapshot = sub.next().await.unwrap().unwrap();
        // BTreeMap order: apr-2026 sorts before jan-2026.
        assert_eq!(snapshot[0].id, "apr-2026");
        assert_ne!(snapshot[0].id, crate::calendar::MONTH_IDS[0]);
    }
}
