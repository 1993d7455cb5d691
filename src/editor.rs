//! Launch edit sessions.
//!
//! Opening a month takes a full copy of its launch record as a local
//! buffer. Field edits land in the buffer only; a quiet-period debounce
//! flushes the buffer to the store as one merge-write when it differs
//! from the last value known to match remote. Discrete actions (resource
//! add/remove, media upload completion) skip the debounce and write
//! immediately. The two write paths are explicit: `Edit` re-arms the
//! timer, `Immediate` flushes on the spot.
//!
//! A single background task serializes everything, so at most one flush
//! is in flight per client and switching months force-flushes the old
//! buffer before it is discarded.

use std::sync::Arc;
use std::time::Duration;

use rand::RngExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};

use crate::error::AppError;
use crate::optimistic;
use crate::state::BoardState;
use crate::store::RemoteStore;
use crate::types::{CampaignActivity, LaunchRecord, MonthRecord, ResourceLink};

/// Quiet period before a buffered edit is flushed.
pub const DEBOUNCE_MS: u64 = 500;

/// Label given to a freshly added campaign activity.
pub const NEW_ACTIVITY_NAME: &str = "New Activity";

/// Label and URL given to a freshly added resource link.
pub const NEW_RESOURCE_LABEL: &str = "New Resource";
pub const NEW_RESOURCE_URL: &str = "https://";

const TOKEN_CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Collision-tolerant 9-character id for locally created list items.
fn local_token() -> String {
    let mut rng = rand::rng();
    (0..9)
        .map(|_| TOKEN_CHARS[rng.random_range(0..TOKEN_CHARS.len())] as char)
        .collect()
}

/// One field edit against the launch buffer. Every mutable field is a
/// variant, so the full edit surface is enumerable.
#[derive(Debug, Clone)]
pub enum LaunchEdit {
    Title(String),
    Logo(Option<String>),
    Image(Option<String>),
    Objective(String),
    Budget(String),
    PerformanceSpend(String),
    BrandSpend(String),
    LaunchDate(Option<String>),
    EndDate(Option<String>),
    Section1Title(Option<String>),
    Section1Text(Option<String>),
    Section2Title(Option<String>),
    Section2Text(Option<String>),
}

impl LaunchEdit {
    pub fn apply(&self, launch: &mut LaunchRecord) {
        match self {
            LaunchEdit::Title(v) => launch.title = v.clone(),
            LaunchEdit::Logo(v) => launch.logo = v.clone(),
            LaunchEdit::Image(v) => launch.image = v.clone(),
            LaunchEdit::Objective(v) => launch.objective = v.clone(),
            LaunchEdit::Budget(v) => launch.budget = v.clone(),
            LaunchEdit::PerformanceSpend(v) => launch.performance_spend = v.clone(),
            LaunchEdit::BrandSpend(v) => launch.brand_spend = v.clone(),
            LaunchEdit::LaunchDate(v) => launch.launch_date = v.clone(),
            LaunchEdit::EndDate(v) => launch.end_date = v.clone(),
            LaunchEdit::Section1Title(v) => launch.section1_title = v.clone(),
            LaunchEdit::Section1Text(v) => launch.section1_text = v.clone(),
            LaunchEdit::Section2Title(v) => launch.section2_title = v.clone(),
            LaunchEdit::Section2Text(v) => launch.section2_text = v.clone(),
        }
    }
}

/// Which resource-link field a text edit targets.
#[derive(Debug, Clone, Copy)]
pub enum ResourceField {
    Label,
    Url,
}

/// The open editing session for one month.
#[derive(Debug, Clone)]
pub struct EditSession {
    pub month_id: String,
    /// Live view of the month; comments and campaigns refresh from
    /// snapshots while the session stays open.
    pub view: MonthRecord,
    /// Local launch buffer. Snapshots never touch it.
    pub buffer: LaunchRecord,
    /// Launch value last known to match remote; the flush dirty check.
    pub last_flushed: LaunchRecord,
    /// A media upload is in flight for this session.
    pub media_busy: bool,
}

impl EditSession {
    pub fn open(month: &MonthRecord) -> Self {
        Self {
            month_id: month.id.clone(),
            view: month.clone(),
            buffer: month.product_launch.clone(),
            last_flushed: month.product_launch.clone(),
            media_busy: false,
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.buffer != self.last_flushed
    }

    /// The view with the buffer substituted in, i.e. the document a
    /// flush writes.
    pub fn month_with_buffer(&self) -> MonthRecord {
        let mut month = self.view.clone();
        month.product_launch = self.buffer.clone();
        month
    }
}

enum EditorCommand {
    Open(String),
    Close,
    Edit(LaunchEdit),
    Immediate(LaunchEdit),
    AddResource,
    RemoveResource(String),
    UpdateResource {
        id: String,
        field: ResourceField,
        value: String,
    },
    AddCampaign,
    RemoveCampaign(String),
    RenameCampaign {
        id: String,
        name: String,
    },
    SetMediaBusy(bool),
    FlushNow,
    Shutdown,
}

/// Cheap cloneable sender for driving the editor task.
#[derive(Clone)]
pub struct EditorHandle {
    tx: mpsc::UnboundedSender<EditorCommand>,
}

impl EditorHandle {
    pub fn open(&self, month_id: &str) {
        let _ = self.tx.send(EditorCommand::Open(month_id.to_string()));
    }

    pub fn close(&self) {
        let _ = self.tx.send(EditorCommand::Close);
    }

    /// Buffered edit: re-arms the debounce timer.
    pub fn edit(&self, edit: LaunchEdit) {
        let _ = self.tx.send(EditorCommand::Edit(edit));
    }

    /// Discrete edit: applied to the buffer and flushed immediately.
    pub fn edit_now(&self, edit: LaunchEdit) {
        let _ = self.tx.send(EditorCommand::Immediate(edit));
    }

    pub fn add_resource(&self) {
        let _ = self.tx.send(EditorCommand::AddResource);
    }

    pub fn remove_resource(&self, id: &str) {
        let _ = self.tx.send(EditorCommand::RemoveResource(id.to_string()));
    }

    pub fn update_resource(&self, id: &str, field: ResourceField, value: &str) {
        let _ = self.tx.send(EditorCommand::UpdateResource {
            id: id.to_string(),
            field,
            value: value.to_string(),
        });
    }

    pub fn add_campaign(&self) {
        let _ = self.tx.send(EditorCommand::AddCampaign);
    }

    pub fn remove_campaign(&self, id: &str) {
        let _ = self.tx.send(EditorCommand::RemoveCampaign(id.to_string()));
    }

    pub fn rename_campaign(&self, id: &str, name: &str) {
        let _ = self.tx.send(EditorCommand::RenameCampaign {
            id: id.to_string(),
            name: name.to_string(),
        });
    }

    pub fn set_media_busy(&self, busy: bool) {
        let _ = self.tx.send(EditorCommand::SetMediaBusy(busy));
    }

    /// Force a flush of the current buffer without closing the session.
    pub fn flush_now(&self) {
        let _ = self.tx.send(EditorCommand::FlushNow);
    }

    pub fn shutdown(&self) {
        let _ = self.tx.send(EditorCommand::Shutdown);
    }
}

/// Spawn the editor task with the standard debounce.
pub fn spawn_editor(
    state: Arc<BoardState>,
    store: Arc<dyn RemoteStore>,
) -> (EditorHandle, JoinHandle<()>) {
    spawn_editor_with_debounce(state, store, Duration::from_millis(DEBOUNCE_MS))
}

/// Spawn the editor task with an explicit debounce (tests shrink it).
pub fn spawn_editor_with_debounce(
    state: Arc<BoardState>,
    store: Arc<dyn RemoteStore>,
    debounce: Duration,
) -> (EditorHandle, JoinHandle<()>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let task = tokio::spawn(run_editor(state, store, debounce, rx));
    (EditorHandle { tx }, task)
}

fn with_session<R>(state: &BoardState, f: impl FnOnce(&mut EditSession) -> R) -> Option<R> {
    state
        .session
        .lock()
        .ok()
        .and_then(|mut guard| guard.as_mut().map(f))
}

/// Flush the open session's buffer if it differs from the last flushed
/// value. On success the flushed value becomes the new baseline and the
/// shared list picks the document up optimistically; on failure the
/// buffer stays dirty so a later flush retries.
async fn flush_if_dirty(state: &Arc<BoardState>, store: &Arc<dyn RemoteStore>) {
    let pending = with_session(state, |session| {
        session
            .is_dirty()
            .then(|| (session.month_id.clone(), session.month_with_buffer(), session.buffer.clone()))
    })
    .flatten();

    let Some((month_id, month, buffer)) = pending else {
        return;
    };
    if !state.writes_enabled() {
        log::warn!("Editor: holding flush for {} while writes are disabled", month_id);
        return;
    }

    match store.set_month_merge(&month).await {
        Ok(()) => {
            log::debug!("Editor: flushed launch buffer for {}", month_id);
            with_session(state, |session| {
                if session.month_id == month_id {
                    session.last_flushed = buffer;
                }
            });
            let next = optimistic::apply_update(&state.months(), &month);
            state.refresh_session_view(&next);
            state.set_months(next);
        }
        Err(err) => {
            let err = AppError::from(err);
            log::error!("Editor: flush for {} failed: {}", month_id, err);
            state.push_notice(&err);
        }
    }
}

async fn sleep_until_deadline(deadline: Option<Instant>) {
    match deadline {
        Some(at) => sleep_until(at).await,
        None => std::future::pending().await,
    }
}

async fn run_editor(
    state: Arc<BoardState>,
    store: Arc<dyn RemoteStore>,
    debounce: Duration,
    mut rx: mpsc::UnboundedReceiver<EditorCommand>,
) {
    let mut deadline: Option<Instant> = None;

    loop {
        tokio::select! {
            command = rx.recv() => {
                match command {
                    None | Some(EditorCommand::Shutdown) => {
                        flush_if_dirty(&state, &store).await;
                        break;
                    }
                    Some(command) => {
                        handle_command(&state, &store, command, &mut deadline, debounce).await;
                    }
                }
            }
            _ = sleep_until_deadline(deadline) => {
                deadline = None;
                flush_if_dirty(&state, &store).await;
            }
        }
    }
    log::debug!("Editor: task stopped");
}

async fn handle_command(
    state: &Arc<BoardState>,
    store: &Arc<dyn RemoteStore>,
    command: EditorCommand,
    deadline: &mut Option<Instant>,
    debounce: Duration,
) {
    match command {
        EditorCommand::Open(month_id) => {
            // The old buffer must land before it is discarded.
            flush_if_dirty(state, store).await;
            *deadline = None;
            match state.month_by_id(&month_id) {
                Some(month) => {
                    if let Ok(mut guard) = state.session.lock() {
                        *guard = Some(EditSession::open(&month));
                    }
                    log::info!("Editor: opened {}", month_id);
                }
                None => {
                    log::warn!("Editor: no month {} to open", month_id);
                    if let Ok(mut guard) = state.session.lock() {
                        *guard = None;
                    }
                }
            }
        }
        EditorCommand::Close => {
            flush_if_dirty(state, store).await;
            *deadline = None;
            if let Ok(mut guard) = state.session.lock() {
                if let Some(session) = guard.take() {
                    log::info!("Editor: closed {}", session.month_id);
                }
            }
        }
        EditorCommand::Edit(edit) => {
            let applied = with_session(state, |session| edit.apply(&mut session.buffer));
            if applied.is_some() {
                *deadline = Some(Instant::now() + debounce);
            } else {
                log::debug!("Editor: edit with no open session");
            }
        }
        EditorCommand::Immediate(edit) => {
            let applied = with_session(state, |session| edit.apply(&mut session.buffer));
            if applied.is_some() {
                *deadline = None;
                flush_if_dirty(state, store).await;
            }
        }
        EditorCommand::AddResource => {
            let applied = with_session(state, |session| {
                session.buffer.resources.push(ResourceLink {
                    id: local_token(),
                    label: NEW_RESOURCE_LABEL.to_string(),
                    url: NEW_RESOURCE_URL.to_string(),
                });
            });
            if applied.is_some() {
                *deadline = None;
                flush_if_dirty(state, store).await;
            }
        }
        EditorCommand::RemoveResource(id) => {
            let applied = with_session(state, |session| {
                session.buffer.resources.retain(|r| r.id != id);
            });
            if applied.is_some() {
                *deadline = None;
                flush_if_dirty(state, store).await;
            }
        }
        EditorCommand::UpdateResource { id, field, value } => {
            let applied = with_session(state, |session| {
                if let Some(resource) = session.buffer.resources.iter_mut().find(|r| r.id == id) {
                    match field {
                        ResourceField::Label => resource.label = value.clone(),
                        ResourceField::Url => resource.url = value.clone(),
                    }
                }
            });
            if applied.is_some() {
                *deadline = Some(Instant::now() + debounce);
            }
        }
        EditorCommand::AddCampaign => {
            push_view_update(state, store, |month| {
                month.campaigns.push(CampaignActivity {
                    id: local_token(),
                    name: NEW_ACTIVITY_NAME.to_string(),
                });
            });
        }
        EditorCommand::RemoveCampaign(id) => {
            push_view_update(state, store, |month| {
                month.campaigns.retain(|c| c.id != id);
            });
        }
        EditorCommand::RenameCampaign { id, name } => {
            push_view_update(state, store, |month| {
                if let Some(campaign) = month.campaigns.iter_mut().find(|c| c.id == id) {
                    campaign.name = name.clone();
                }
            });
        }
        EditorCommand::SetMediaBusy(busy) => {
            with_session(state, |session| session.media_busy = busy);
        }
        EditorCommand::FlushNow => {
            *deadline = None;
            flush_if_dirty(state, store).await;
        }
        EditorCommand::Shutdown => {}
    }
}

/// Campaign-style mutations act on the live view (not the launch buffer)
/// and go out through the optimistic month write.
fn push_view_update(
    state: &Arc<BoardState>,
    store: &Arc<dyn RemoteStore>,
    mutate: impl FnOnce(&mut MonthRecord),
) {
    let updated = with_session(state, |session| {
        let mut month = session.view.clone();
        mutate(&mut month);
        month
    });
    if let Some(month) = updated {
        let _ = optimistic::push_month_update(state, store, month);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::store::memory::MemoryStore;

    const TEST_DEBOUNCE: Duration = Duration::from_millis(200);

    fn init_logs() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn harness() -> (Arc<BoardState>, MemoryStore, EditorHandle, JoinHandle<()>) {
        let state = Arc::new(BoardState::new());
        let mem = MemoryStore::new();
        let store: Arc<dyn RemoteStore> = Arc::new(mem.clone());
        let (handle, task) = spawn_editor_with_debounce(Arc::clone(&state), store, TEST_DEBOUNCE);
        (state, mem, handle, task)
    }

    async fn wait_until(mut cond: impl FnMut() -> bool) {
        for _ in 0..300 {
            if cond() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("condition not reached in time");
    }

    #[tokio::test]
    async fn test_field_edit_flushes_after_quiet_period() {
        init_logs();
        let (_state, mem, handle, task) = harness();
        handle.open("mar-2026");
        handle.edit(LaunchEdit::Title("Flavortown II".to_string()));

        // Inside the quiet period nothing is written.
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(mem.write_count(), 0);

        wait_until(|| mem.month("mar-2026").is_some()).await;
        assert_eq!(
            mem.month("mar-2026").unwrap().product_launch.title,
            "Flavortown II"
        );
        handle.shutdown();
        task.await.unwrap();
    }

    #[tokio::test]
    async fn test_rapid_edits_coalesce_into_one_flush() {
        let (_state, mem, handle, task) = harness();
        handle.open("mar-2026");
        handle.edit(LaunchEdit::Title("F".to_string()));
        tokio::time::sleep(Duration::from_millis(120)).await;
        handle.edit(LaunchEdit::Title("Fl".to_string()));
        tokio::time::sleep(Duration::from_millis(120)).await;
        // 240ms since the first keystroke, but the timer re-armed at 120.
        assert_eq!(mem.write_count(), 0);
        handle.edit(LaunchEdit::Title("Flavortown II".to_string()));

        wait_until(|| mem.write_count() > 0).await;
        assert_eq!(mem.write_count(), 1);
        assert_eq!(
            mem.month("mar-2026").unwrap().product_launch.title,
            "Flavortown II"
        );
        handle.shutdown();
        task.await.unwrap();
    }

    #[tokio::test]
    async fn test_clean_session_never_writes() {
        let (_state, mem, handle, task) = harness();
        handle.open("mar-2026");
        handle.flush_now();
        handle.close();
        handle.shutdown();
        task.await.unwrap();
        assert_eq!(mem.write_count(), 0);
    }

    #[tokio::test]
    async fn test_switching_months_flushes_old_buffer_first() {
        let (state, mem, handle, task) = harness();
        handle.open("mar-2026");
        handle.edit(LaunchEdit::Objective("Go bigger".to_string()));
        // Switch right away, well inside the debounce window.
        handle.open("may-2026");

        wait_until(|| mem.month("mar-2026").is_some()).await;
        assert_eq!(
            mem.month("mar-2026").unwrap().product_launch.objective,
            "Go bigger"
        );
        let session = state.session.lock().unwrap().clone().unwrap();
        assert_eq!(session.month_id, "may-2026");
        assert!(!session.is_dirty());
        handle.shutdown();
        task.await.unwrap();
    }

    #[tokio::test]
    async fn test_close_force_flushes() {
        let (state, mem, handle, task) = harness();
        handle.open("jun-2026");
        handle.edit(LaunchEdit::BrandSpend("$30,000".to_string()));
        handle.close();

        wait_until(|| mem.month("jun-2026").is_some()).await;
        assert_eq!(
            mem.month("jun-2026").unwrap().product_launch.brand_spend,
            "$30,000"
        );
        assert!(state.session.lock().unwrap().is_none());
        handle.shutdown();
        task.await.unwrap();
    }

    #[tokio::test]
    async fn test_shutdown_flushes_pending_buffer() {
        let (_state, mem, handle, task) = harness();
        handle.open("mar-2026");
        handle.edit(LaunchEdit::Title("Last keystroke".to_string()));
        handle.shutdown();
        task.await.unwrap();
        assert_eq!(
            mem.month("mar-2026").unwrap().product_launch.title,
            "Last keystroke"
        );
    }

    #[tokio::test]
    async fn test_resource_add_writes_immediately_with_defaults() {
        let (state, mem, handle, task) = harness();
        handle.open("may-2026");
        handle.add_resource();

        wait_until(|| mem.month("may-2026").is_some()).await;
        let resources = mem.month("may-2026").unwrap().product_launch.resources;
        assert_eq!(resources.len(), 1);
        assert_eq!(resources[0].label, NEW_RESOURCE_LABEL);
        assert_eq!(resources[0].url, NEW_RESOURCE_URL);
        assert_eq!(resources[0].id.len(), 9);

        // The buffer is clean again after the immediate flush.
        let session = state.session.lock().unwrap().clone().unwrap();
        assert!(!session.is_dirty());
        handle.shutdown();
        task.await.unwrap();
    }

    #[tokio::test]
    async fn test_resource_remove_of_unknown_id_is_noop() {
        let (_state, mem, handle, task) = harness();
        handle.open("may-2026");
        handle.remove_resource("nope");
        handle.shutdown();
        task.await.unwrap();
        assert_eq!(mem.write_count(), 0);
    }

    #[tokio::test]
    async fn test_campaign_add_updates_view_and_store() {
        init_logs();
        let (state, mem, handle, task) = harness();
        handle.open("feb-2026");
        handle.add_campaign();

        wait_until(|| {
            mem.month("feb-2026")
                .map(|m| m.campaigns.len() == 1)
                .unwrap_or(false)
        })
        .await;
        let written = mem.month("feb-2026").unwrap();
        assert_eq!(written.campaigns[0].name, NEW_ACTIVITY_NAME);

        // The open session's view picked the campaign up too.
        wait_until(|| {
            state
                .session
                .lock()
                .unwrap()
                .as_ref()
                .map(|s| s.view.campaigns.len() == 1)
                .unwrap_or(false)
        })
        .await;
        handle.shutdown();
        task.await.unwrap();
    }

    #[tokio::test]
    async fn test_failed_flush_keeps_buffer_dirty_for_retry() {
        let (state, mem, handle, task) = harness();
        handle.open("mar-2026");
        mem.fail_next_write(StoreError::Unavailable("offline".to_string()));
        handle.edit(LaunchEdit::Title("Unlucky".to_string()));

        wait_until(|| mem.write_count() == 1).await;
        assert!(mem.month("mar-2026").is_none());
        assert!(state.take_notice().is_some());
        let session = state.session.lock().unwrap().clone().unwrap();
        assert!(session.is_dirty());

        // The next edit re-arms the timer and the retry lands.
        handle.edit(LaunchEdit::Title("Lucky".to_string()));
        wait_until(|| mem.month("mar-2026").is_some()).await;
        assert_eq!(mem.month("mar-2026").unwrap().product_launch.title, "Lucky");
        handle.shutdown();
        task.await.unwrap();
    }

    #[tokio::test]
    async fn test_media_busy_flag() {
        let (state, _mem, handle, task) = harness();
        handle.open("mar-2026");
        handle.set_media_busy(true);
        wait_until(|| {
            state
                .session
                .lock()
                .unwrap()
                .as_ref()
                .map(|s| s.media_busy)
                .unwrap_or(false)
        })
        .await;
        handle.set_media_busy(false);
        wait_until(|| {
            state
                .session
                .lock()
                .unwrap()
                .as_ref()
                .map(|s| !s.media_busy)
                .unwrap_or(false)
        })
        .await;
        handle.shutdown();
        task.await.unwrap();
    }

    #[test]
    fn test_local_token_shape() {
        let token = local_token();
        assert_eq!(token.len(), 9);
        assert!(token
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
        assert_ne!(local_token(), local_token());
    }

    #[test]
    fn test_launch_edit_covers_every_field() {
        let mut launch = LaunchRecord::default();
        LaunchEdit::Title("t".into()).apply(&mut launch);
        LaunchEdit::Logo(Some("l".into())).apply(&mut launch);
        LaunchEdit::Image(Some("i".into())).apply(&mut launch);
        LaunchEdit::Objective("o".into()).apply(&mut launch);
        LaunchEdit::Budget("b".into()).apply(&mut launch);
        LaunchEdit::PerformanceSpend("p".into()).apply(&mut launch);
        LaunchEdit::BrandSpend("br".into()).apply(&mut launch);
        LaunchEdit::LaunchDate(Some("d1".into())).apply(&mut launch);
        LaunchEdit::EndDate(Some("d2".into())).apply(&mut launch);
        LaunchEdit::Section1Title(Some("s1".into())).apply(&mut launch);
        LaunchEdit::Section1Text(Some("s1t".into())).apply(&mut launch);
        LaunchEdit::Section2Title(Some("s2".into())).apply(&mut launch);
        LaunchEdit::Section2Text(Some("s2t".into())).apply(&mut launch);

        assert_eq!(launch.title, "t");
        assert_eq!(launch.logo.as_deref(), Some("l"));
        assert_eq!(launch.image.as_deref(), Some("i"));
        assert_eq!(launch.objective, "o");
        assert_eq!(launch.budget, "b");
        assert_eq!(launch.performance_spend, "p");
        assert_eq!(launch.brand_spend, "br");
        assert_eq!(launch.launch_date.as_deref(), Some("d1"));
        assert_eq!(launch.end_date.as_deref(), Some("d2"));
        assert_eq!(launch.section1_title.as_deref(), Some("s1"));
        assert_eq!(launch.section1_text.as_deref(), Some("s1t"));
        assert_eq!(launch.section2_title.as_deref(), Some("s2"));
        assert_eq!(launch.section2_text.as_deref(), Some("s2t"));
    }
}
