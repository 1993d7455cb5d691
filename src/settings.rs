//! Shared board branding.
//!
//! The settings singleton carries two independent logo slots shown on
//! every client. Logos are inlined into the document as base64 data
//! URIs rather than going through the Media Host, so the size gate is
//! much tighter than for launch media. Saves are optimistic like every
//! other write on the board.

use std::sync::Arc;

use base64::Engine;

use crate::error::AppError;
use crate::state::BoardState;
use crate::store::RemoteStore;

/// Hard cap for an inlined branding logo. The encoded logo lives inside
/// the settings document, which has to stay within document size limits.
pub const MAX_SETTINGS_LOGO_BYTES: usize = 700 * 1024;

/// Which of the two branding slots a save targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoSlot {
    Primary,
    Secondary,
}

fn to_data_uri(bytes: &[u8], content_type: &str) -> String {
    format!(
        "data:{};base64,{}",
        content_type,
        base64::engine::general_purpose::STANDARD.encode(bytes)
    )
}

/// Validate, inline, and save a branding logo. The new value shows up
/// locally before the merge write settles; a write failure is reported
/// without reverting.
pub async fn save_logo(
    state: &Arc<BoardState>,
    store: &Arc<dyn RemoteStore>,
    slot: LogoSlot,
    bytes: &[u8],
    content_type: &str,
) {
    if !content_type.starts_with("image/") {
        let err = AppError::UploadRejected("Logos must be image files.".to_string());
        log::warn!("Store: rejected logo: {}", err);
        state.push_notice(&err);
        return;
    }
    if bytes.len() > MAX_SETTINGS_LOGO_BYTES {
        let err = AppError::UploadRejected(
            "File too large. Please upload a logo smaller than 700KB.".to_string(),
        );
        log::warn!("Store: rejected logo: {}", err);
        state.push_notice(&err);
        return;
    }
    if !state.writes_enabled() {
        log::warn!("Store: dropping logo save while writes are disabled");
        return;
    }

    let mut settings = state.settings();
    let uri = to_data_uri(bytes, content_type);
    match slot {
        LogoSlot::Primary => settings.logo = Some(uri),
        LogoSlot::Secondary => settings.secondary_logo = Some(uri),
    }
    state.set_settings(settings.clone());

    if let Err(err) = store.set_settings_merge(&settings).await {
        let err = AppError::from(err);
        log::error!("Store: failed to save logo: {}", err);
        // Local value is intentionally kept.
        state.push_notice(&err);
    }
}
