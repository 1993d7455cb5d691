//! Upload validation and the launch media pipeline.
//!
//! Validation runs entirely client-side and never lets a bad file reach
//! the host. The pipeline marks the open session busy for the whole
//! round trip; a returned URL lands in the target slot through the
//! editor's immediate write path, skipping the typing debounce.

use std::sync::Arc;

use crate::editor::EditorHandle;
use crate::error::AppError;
use crate::media::host::{MediaHost, UploadMetadata};
use crate::media::MediaSlot;
use crate::state::BoardState;

/// Still images other than GIF.
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;
/// GIFs get a tighter cap; large animations belong in the video path.
pub const MAX_GIF_BYTES: usize = 8 * 1024 * 1024;
pub const MAX_VIDEO_BYTES: usize = 100 * 1024 * 1024;

/// Gate a file before it is allowed anywhere near the Media Host.
pub fn validate(byte_len: usize, content_type: &str) -> Result<(), AppError> {
    let is_image = content_type.starts_with("image/");
    let is_video = content_type.starts_with("video/");
    if !is_image && !is_video {
        return Err(AppError::UploadRejected(
            "Only image and video files are supported.".to_string(),
        ));
    }
    if content_type == "image/gif" && byte_len > MAX_GIF_BYTES {
        return Err(AppError::UploadRejected(
            "GIF is too large (max 8MB). Convert large animations to video for smooth playback."
                .to_string(),
        ));
    }
    if is_image && byte_len > MAX_IMAGE_BYTES {
        return Err(AppError::UploadRejected(
            "Image is too large (max 10MB).".to_string(),
        ));
    }
    if is_video && byte_len > MAX_VIDEO_BYTES {
        return Err(AppError::UploadRejected(
            "Video is too large (max 100MB).".to_string(),
        ));
    }
    Ok(())
}

/// Run one launch media upload end to end: validate, mark the session
/// busy, push through the host, land the URL in `slot`. Failures are
/// surfaced as inline notices; the slot keeps its previous value.
pub async fn upload_launch_media(
    state: &Arc<BoardState>,
    editor: &EditorHandle,
    host: &Arc<dyn MediaHost>,
    slot: MediaSlot,
    bytes: Vec<u8>,
    metadata: UploadMetadata,
) {
    if let Err(err) = validate(bytes.len(), &metadata.content_type) {
        log::warn!("Media: rejected {}: {}", metadata.file_name, err);
        state.push_notice(&err);
        return;
    }

    let busy = state
        .session
        .lock()
        .ok()
        .and_then(|guard| guard.as_ref().map(|session| session.media_busy));
    match busy {
        None => {
            log::warn!("Media: upload of {} with no open session", metadata.file_name);
            return;
        }
        Some(true) => {
            log::warn!("Media: upload already in flight, ignoring {}", metadata.file_name);
            return;
        }
        Some(false) => {}
    }

    editor.set_media_busy(true);
    match host.upload(bytes, &metadata).await {
        Ok(url) => {
            log::info!("Media: {} stored at {}", metadata.file_name, url);
            editor.edit_now(slot.edit(url));
        }
        Err(err) => {
            log::error!("Media: upload of {} failed: {}", metadata.file_name, err);
            state.push_notice(&err);
        }
    }
    editor.set_media_busy(false);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::editor::spawn_editor_with_debounce;
    use crate::error::NoticeSeverity;
    use crate::media::host::RecordingHost;
    use crate::store::memory::MemoryStore;
    use crate::store::RemoteStore;

    fn png_metadata() -> UploadMetadata {
        UploadMetadata {
            file_name: "hero.png".to_string(),
            content_type: "image/png".to_string(),
        }
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

    // Long debounce so anything that lands must have used the
    // immediate path.
    fn harness() -> (
        Arc<BoardState>,
        MemoryStore,
        EditorHandle,
        Arc<RecordingHost>,
        Arc<dyn MediaHost>,
    ) {
        let state = Arc::new(BoardState::new());
        let mem = MemoryStore::new();
        let store: Arc<dyn RemoteStore> = Arc::new(mem.clone());
        let (editor, _task) =
            spawn_editor_with_debounce(Arc::clone(&state), store, Duration::from_secs(60));
        let recording = Arc::new(RecordingHost::new("https://cdn.example.com/u/1.png"));
        let host: Arc<dyn MediaHost> = recording.clone();
        (state, mem, editor, recording, host)
    }

    #[test]
    fn test_limits_are_type_specific() {
        assert!(validate(MAX_GIF_BYTES, "image/gif").is_ok());
        assert!(validate(MAX_IMAGE_BYTES, "image/png").is_ok());
        assert!(validate(MAX_VIDEO_BYTES, "video/mp4").is_ok());

        let gif = validate(MAX_GIF_BYTES + 1, "image/gif").unwrap_err();
        assert!(gif.to_string().contains("GIF"));
        let image = validate(MAX_IMAGE_BYTES + 1, "image/png").unwrap_err();
        assert!(image.to_string().contains("Image"));
        let video = validate(MAX_VIDEO_BYTES + 1, "video/mp4").unwrap_err();
        assert!(video.to_string().contains("Video"));
    }

    #[test]
    fn test_non_media_types_rejected() {
        let err = validate(1024, "application/pdf").unwrap_err();
        assert!(matches!(err, AppError::UploadRejected(_)));
    }

    #[tokio::test]
    async fn test_oversized_gif_never_reaches_host() {
        let (state, mem, editor, recording, host) = harness();
        editor.open("mar-2026");

        let bytes = vec![0u8; 10 * 1024 * 1024];
        let metadata = UploadMetadata {
            file_name: "party.gif".to_string(),
            content_type: "image/gif".to_string(),
        };
        upload_launch_media(&state, &editor, &host, MediaSlot::Image, bytes, metadata).await;

        assert_eq!(recording.upload_count(), 0);
        assert_eq!(mem.write_count(), 0);
        let notice = state.take_notice().unwrap();
        assert_eq!(notice.severity, NoticeSeverity::Inline);
        assert!(notice.message.contains("GIF"));
    }

    #[tokio::test]
    async fn test_successful_upload_lands_immediately() {
        let (state, mem, editor, recording, host) = harness();
        editor.open("mar-2026");
        wait_until(|| state.session.lock().unwrap().is_some()).await;

        upload_launch_media(
            &state,
            &editor,
            &host,
            MediaSlot::Image,
            vec![1, 2, 3, 4],
            png_metadata(),
        )
        .await;

        wait_until(|| mem.month("mar-2026").is_some()).await;
        assert_eq!(
            mem.month("mar-2026").unwrap().product_launch.image.as_deref(),
            Some("https://cdn.example.com/u/1.png")
        );
        assert_eq!(recording.upload_count(), 1);
        assert_eq!(recording.last_metadata().unwrap().file_name, "hero.png");

        // Busy clears once the round trip settles.
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
    }

    #[tokio::test]
    async fn test_logo_slot_uses_its_own_field() {
        let (state, mem, editor, _recording, host) = harness();
        editor.open("may-2026");
        wait_until(|| state.session.lock().unwrap().is_some()).await;

        upload_launch_media(
            &state,
            &editor,
            &host,
            MediaSlot::Logo,
            vec![1, 2, 3],
            png_metadata(),
        )
        .await;

        wait_until(|| mem.month("may-2026").is_some()).await;
        let launch = mem.month("may-2026").unwrap().product_launch;
        assert_eq!(launch.logo.as_deref(), Some("https://cdn.example.com/u/1.png"));
        assert!(launch.image.is_none());
    }

    #[tokio::test]
    async fn test_host_failure_notices_and_keeps_slot() {
        let (state, mem, editor, recording, host) = harness();
        editor.open("mar-2026");
        wait_until(|| state.session.lock().unwrap().is_some()).await;
        recording.fail_next("cloud said no");

        upload_launch_media(
            &state,
            &editor,
            &host,
            MediaSlot::Image,
            vec![1, 2, 3],
            png_metadata(),
        )
        .await;

        let notice = state.take_notice().unwrap();
        assert_eq!(notice.severity, NoticeSeverity::Inline);
        assert!(notice.message.contains("cloud said no"));
        assert_eq!(mem.write_count(), 0);
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
    }

    #[tokio::test]
    async fn test_upload_ignored_while_one_is_in_flight() {
        let (state, _mem, editor, recording, host) = harness();
        editor.open("mar-2026");
        wait_until(|| state.session.lock().unwrap().is_some()).await;
        if let Ok(mut guard) = state.session.lock() {
            if let Some(session) = guard.as_mut() {
                session.media_busy = true;
            }
        }

        upload_launch_media(
            &state,
            &editor,
            &host,
            MediaSlot::Image,
            vec![1, 2, 3],
            png_metadata(),
        )
        .await;
        assert_eq!(recording.upload_count(), 0);
    }

    #[tokio::test]
    async fn test_upload_without_open_session_is_refused() {
        let (state, _mem, editor, recording, host) = harness();
        upload_launch_media(
            &state,
            &editor,
            &host,
            MediaSlot::Image,
            vec![1, 2, 3],
            png_metadata(),
        )
        .await;
        assert_eq!(recording.upload_count(), 0);
    }
}
