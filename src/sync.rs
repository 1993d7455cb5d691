//! Remote sync reconciliation.
//!
//! One task owns both snapshot subscriptions and drives the board's
//! sync phase. Month snapshots are projected onto the canonical
//! twelve-month order before they replace the shared list; an empty
//! first snapshot triggers the one-time seed batch. Listener errors map
//! to the blocking phases and the task winds down when the month stream
//! closes, which is how a rejected remote listener presents.

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::calendar;
use crate::error::{AppError, StoreError};
use crate::state::{BoardState, SyncPhase};
use crate::store::{RemoteStore, WriteBatch};
use crate::types::MonthRecord;

/// Project fetched documents onto the canonical twelve-month order.
/// A fetched record wins its slot by id; missing slots fall back to the
/// default skeleton, so the board always renders a full year. Documents
/// with ids outside the canonical year are dropped.
pub fn project_on_canonical(fetched: &[MonthRecord]) -> Vec<MonthRecord> {
    calendar::seed_months()
        .into_iter()
        .map(|slot| {
            fetched
                .iter()
                .find(|month| month.id == slot.id)
                .cloned()
                .unwrap_or(slot)
        })
        .collect()
}

/// Spawn the reconciler. The task runs until the month subscription
/// closes.
pub fn spawn_sync(state: Arc<BoardState>, store: Arc<dyn RemoteStore>) -> JoinHandle<()> {
    tokio::spawn(run_sync(state, store))
}

pub async fn run_sync(state: Arc<BoardState>, store: Arc<dyn RemoteStore>) {
    let mut months_sub = store.subscribe_months().await;
    let mut settings_sub = store.subscribe_settings().await;
    let mut settings_open = true;

    loop {
        tokio::select! {
            snapshot = months_sub.next() => {
                match snapshot {
                    Some(Ok(docs)) => apply_month_snapshot(&state, &store, docs).await,
                    Some(Err(err)) => {
                        let phase = match err {
                            StoreError::PermissionDenied => {
                                log::error!("Sync: month listener rejected: permission denied");
                                SyncPhase::PermissionError
                            }
                            StoreError::Unavailable(message) => {
                                log::error!("Sync: month listener failed: {}", message);
                                SyncPhase::OtherError { message }
                            }
                        };
                        state.set_phase(phase);
                    }
                    None => {
                        log::info!("Sync: month listener closed");
                        break;
                    }
                }
            }
            snapshot = settings_sub.next(), if settings_open => {
                match snapshot {
                    Some(Ok(settings)) => {
                        log::debug!("Sync: settings refreshed");
                        state.set_settings(settings);
                    }
                    Some(Err(err)) => {
                        // Best effort. Branding must not block the board.
                        log::warn!("Sync: settings listener failed: {}", err);
                    }
                    None => settings_open = false,
                }
            }
        }
    }
}

/// Fold one month snapshot into shared state. Empty collection means a
/// fresh board: seed it exactly once and stay in `Connecting` until the
/// populated snapshot comes back around.
async fn apply_month_snapshot(
    state: &Arc<BoardState>,
    store: &Arc<dyn RemoteStore>,
    docs: Vec<MonthRecord>,
) {
    if docs.is_empty() {
        if state.try_begin_seed() {
            log::info!("Sync: empty collection, seeding the twelve-month board");
            let batch = WriteBatch {
                months: calendar::seed_months(),
                settings: Some(calendar::default_settings()),
            };
            if let Err(err) = store.commit_batch(batch).await {
                let err = AppError::from(err);
                log::error!("Sync: seed batch failed: {}", err);
                state.push_notice(&err);
            }
        } else {
            log::debug!("Sync: empty snapshot after seed attempt, waiting");
        }
        return;
    }

    let doc_count = docs.len();
    let projected = project_on_canonical(&docs);
    state.refresh_session_view(&projected);
    state.set_months(projected);
    if state.phase() != SyncPhase::Syncing {
        log::info!("Sync: live with {} month documents", doc_count);
        state.set_phase(SyncPhase::Syncing);
    }
}
