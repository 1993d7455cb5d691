//! Optimistic write coordinator.
//!
//! Month-level mutations (comments, campaigns, whole-record updates) apply
//! to the local list immediately and the merge-write happens in the
//! background. A failed write is surfaced as a notice and the local list
//! is left alone: the next successful snapshot is the recovery path.
//! Eventual convergence over rollback, by policy.

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::error::AppError;
use crate::state::BoardState;
use crate::store::RemoteStore;
use crate::types::MonthRecord;

/// Replace the record matching `updated.id`, producing a new list value.
/// An id not present in `current` leaves the contents unchanged.
pub fn apply_update(current: &[MonthRecord], updated: &MonthRecord) -> Vec<MonthRecord> {
    current
        .iter()
        .map(|m| {
            if m.id == updated.id {
                updated.clone()
            } else {
                m.clone()
            }
        })
        .collect()
}

/// Apply `updated` to the shared list right away and issue the
/// merge-write in the background.
///
/// The returned handle resolves once the remote write settled; views
/// fire-and-forget it. While the board is in a terminal error state the
/// update is dropped entirely.
pub fn push_month_update(
    state: &Arc<BoardState>,
    store: &Arc<dyn RemoteStore>,
    updated: MonthRecord,
) -> JoinHandle<()> {
    if !state.writes_enabled() {
        log::warn!(
            "Board: dropping update for {} while writes are disabled",
            updated.id
        );
        return tokio::spawn(async {});
    }

    let next = apply_update(&state.months(), &updated);
    state.refresh_session_view(&next);
    state.set_months(next);

    let state = Arc::clone(state);
    let store = Arc::clone(store);
    tokio::spawn(async move {
        if let Err(err) = store.set_month_merge(&updated).await {
            let err = AppError::from(err);
            log::error!("Board: failed to save {}: {}", updated.id, err);
            // Local state intentionally not reverted.
            state.push_notice(&err);
        }
    })
}
