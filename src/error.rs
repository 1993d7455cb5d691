//! Error types for the sync core.
//!
//! Errors are classified by presentation:
//! - Blocking: the board cannot be trusted (store permission/connection
//!   failures). Full-screen message, writes disabled.
//! - Inline: a single action failed (upload validation, upload call,
//!   media render). Message near the control, user may retry.

use thiserror::Error;

/// Application-level error taxonomy.
#[derive(Debug, Clone, Error)]
pub enum AppError {
    // Blocking errors
    #[error("Remote store denied access")]
    PermissionDenied,

    #[error("Remote store unavailable: {0}")]
    ConnectionFailure(String),

    // Inline errors
    #[error("Upload rejected: {0}")]
    UploadRejected(String),

    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Media failed to load: {0}")]
    MediaLoadFailure(String),
}

impl AppError {
    /// Returns true if this error blocks the whole board.
    pub fn is_blocking(&self) -> bool {
        matches!(
            self,
            AppError::PermissionDenied | AppError::ConnectionFailure(_)
        )
    }

    /// Returns true if the user can retry the action immediately.
    pub fn is_recoverable(&self) -> bool {
        !self.is_blocking()
    }

    /// Get a user-friendly recovery suggestion
    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            AppError::PermissionDenied => {
                "The database exists but its access rules are blocking the app. Update the rules, then reload."
            }
            AppError::ConnectionFailure(_) => {
                "Check your internet connection and reload the page."
            }
            AppError::UploadRejected(_) => {
                "Choose a smaller file, or paste a hosted link instead."
            }
            AppError::UploadFailed(_) => {
                "Try the upload again, or paste a hosted link instead."
            }
            AppError::MediaLoadFailure(_) => {
                "A placeholder is shown. Replace the media reference or re-upload the file."
            }
        }
    }
}

/// Errors surfaced by the Remote Store boundary.
///
/// The subscribe path must be able to report permission denial separately
/// from every other failure, since the two drive different terminal states.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("permission denied")]
    PermissionDenied,

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::PermissionDenied => AppError::PermissionDenied,
            StoreError::Unavailable(message) => AppError::ConnectionFailure(message),
        }
    }
}

/// How a notice is presented by the view layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeSeverity {
    Blocking,
    Inline,
}

/// Serializable failure representation handed to the view layer.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserNotice {
    pub message: String,
    pub severity: NoticeSeverity,
    pub recovery_suggestion: String,
}

impl From<&AppError> for UserNotice {
    fn from(err: &AppError) -> Self {
        let severity = if err.is_blocking() {
            NoticeSeverity::Blocking
        } else {
            NoticeSeverity::Inline
        };

        UserNotice {
            message: err.to_string(),
            severity,
            recovery_suggestion: err.recovery_suggestion().to_string(),
        }
    }
}
