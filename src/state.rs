//! Shared board state.
//!
//! One `BoardState` is shared (via `Arc`) between the view layer, the
//! snapshot reconciler and the write coordinators. The month list is kept
//! as an `Arc<Vec<_>>` behind a lock: readers take a cheap handle on a
//! consistent list value, writers always install a freshly built list and
//! never mutate entries in place.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use crate::calendar::seed_months;
use crate::editor::EditSession;
use crate::error::{AppError, UserNotice};
use crate::types::{BoardSettings, MonthRecord};

/// Connection lifecycle of the month-collection subscription.
#[derive(Debug, Clone, PartialEq, Eq, Default, serde::Serialize)]
#[serde(tag = "phase", rename_all = "camelCase")]
pub enum SyncPhase {
    /// Waiting for the first usable snapshot (covers the seed write).
    #[default]
    Connecting,
    /// Live and reconciled.
    Syncing,
    /// The store rejected us; terminal until the user retries.
    PermissionError,
    /// Any other subscription failure; terminal until reload.
    OtherError { message: String },
}

/// Shared state read by views, written by the reconciler and the write
/// coordinators.
pub struct BoardState {
    months: RwLock<Arc<Vec<MonthRecord>>>,
    pub settings: Mutex<BoardSettings>,
    pub phase: Mutex<SyncPhase>,
    /// The currently open editing session, if any.
    pub session: Mutex<Option<EditSession>>,
    /// Most recent failure for the view to surface; consumed on read.
    pub notice: Mutex<Option<UserNotice>>,
    seed_attempted: AtomicBool,
}

impl BoardState {
    /// Fresh state showing the seed skeleton until the first snapshot.
    pub fn new() -> Self {
        Self {
            months: RwLock::new(Arc::new(seed_months())),
            settings: Mutex::new(BoardSettings::default()),
            phase: Mutex::new(SyncPhase::Connecting),
            session: Mutex::new(None),
            notice: Mutex::new(None),
            seed_attempted: AtomicBool::new(false),
        }
    }

    /// Current month list. The returned handle stays consistent even if a
    /// writer installs a newer list afterwards.
    pub fn months(&self) -> Arc<Vec<MonthRecord>> {
        self.months
            .read()
            .map(|guard| Arc::clone(&guard))
            .unwrap_or_default()
    }

    /// Install a new month list value.
    pub fn set_months(&self, months: Vec<MonthRecord>) {
        if let Ok(mut guard) = self.months.write() {
            *guard = Arc::new(months);
        }
    }

    pub fn month_by_id(&self, id: &str) -> Option<MonthRecord> {
        self.months().iter().find(|m| m.id == id).cloned()
    }

    pub fn phase(&self) -> SyncPhase {
        self.phase
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    pub fn set_phase(&self, phase: SyncPhase) {
        if let Ok(mut guard) = self.phase.lock() {
            *guard = phase;
        }
    }

    /// Writes are allowed outside the two terminal error states.
    pub fn writes_enabled(&self) -> bool {
        !matches!(
            self.phase(),
            SyncPhase::PermissionError | SyncPhase::OtherError { .. }
        )
    }

    pub fn settings(&self) -> BoardSettings {
        self.settings
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    pub fn set_settings(&self, settings: BoardSettings) {
        if let Ok(mut guard) = self.settings.lock() {
            *guard = settings;
        }
    }

    /// Record a failure for the view layer.
    pub fn push_notice(&self, err: &AppError) {
        if let Ok(mut guard) = self.notice.lock() {
            *guard = Some(UserNotice::from(err));
        }
    }

    /// Take the pending notice, if any.
    pub fn take_notice(&self) -> Option<UserNotice> {
        self.notice.lock().ok().and_then(|mut guard| guard.take())
    }

    /// Refresh the open session's view of its month from `months`.
    /// The session's edit buffer is left alone.
    pub fn refresh_session_view(&self, months: &[MonthRecord]) {
        if let Ok(mut guard) = self.session.lock() {
            if let Some(session) = guard.as_mut() {
                if let Some(current) = months.iter().find(|m| m.id == session.month_id) {
                    session.view = current.clone();
                }
            }
        }
    }

    /// One-shot gate for the bootstrap seed write. True exactly once.
    pub fn try_begin_seed(&self) -> bool {
        self.seed_attempted
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }
}

impl Default for BoardState {
    fn default() -> Self {
        Self::new()
    }
}
