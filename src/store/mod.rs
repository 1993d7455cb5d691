//! Remote Store contract.
//!
//! The store is a document collection keyed by month id plus a settings
//! singleton. The core consumes exactly four capabilities: live snapshot
//! subscription over the month collection, merge-write of one document,
//! an atomic multi-document batch, and a settings-document subscription.
//! Subscription failures arrive in-stream so permission denial can be
//! told apart from generic unavailability.

pub mod memory;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::StoreError;
use crate::types::{BoardSettings, MonthRecord};

/// One delivery from the month collection: every document currently in
/// the collection, in arbitrary server order.
pub type MonthSnapshot = Result<Vec<MonthRecord>, StoreError>;

/// One delivery from the settings singleton.
pub type SettingsSnapshot = Result<BoardSettings, StoreError>;

/// Live handle on a snapshot stream.
///
/// The underlying listener registration is released when the handle is
/// dropped, on every exit path. Listener lifetime is therefore exactly
/// the lifetime of the value, never ambient state.
pub struct Subscription<T> {
    receiver: mpsc::UnboundedReceiver<T>,
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl<T> Subscription<T> {
    pub fn new(
        receiver: mpsc::UnboundedReceiver<T>,
        release: impl FnOnce() + Send + 'static,
    ) -> Self {
        Subscription {
            receiver,
            release: Some(Box::new(release)),
        }
    }

    /// Next delivery; `None` once the stream is closed.
    pub async fn next(&mut self) -> Option<T> {
        self.receiver.recv().await
    }

    /// Non-blocking poll for an already-delivered item.
    pub fn try_next(&mut self) -> Option<T> {
        self.receiver.try_recv().ok()
    }
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

/// A multi-document write applied atomically: all or nothing.
#[derive(Debug, Clone, Default)]
pub struct WriteBatch {
    pub months: Vec<MonthRecord>,
    pub settings: Option<BoardSettings>,
}

/// The document database the core synchronizes against.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Subscribe to the month collection. The collection's current
    /// contents arrive as the first delivery.
    async fn subscribe_months(&self) -> Subscription<MonthSnapshot>;

    /// Subscribe to the settings singleton. Current value first.
    async fn subscribe_settings(&self) -> Subscription<SettingsSnapshot>;

    /// Merge-write one month document under its id. Fields absent from
    /// the serialized form keep their remote values.
    async fn set_month_merge(&self, month: &MonthRecord) -> Result<(), StoreError>;

    /// Merge-write the settings singleton.
    async fn set_settings_merge(&self, settings: &BoardSettings) -> Result<(), StoreError>;

    /// Commit a batch atomically.
    async fn commit_batch(&self, batch: WriteBatch) -> Result<(), StoreError>;
}
