//! Media handling: reference interpretation, upload validation, and the
//! asset host boundary.
//!
//! Pasted links and uploaded files end up as the same thing, an opaque
//! reference string in a launch slot. `resolver` decides how a stored
//! reference renders, `upload` gates and runs the host round trip, and
//! `host` is the narrow contract to the asset service.

pub mod host;
pub mod resolver;
pub mod upload;

use crate::editor::LaunchEdit;

/// Which launch media slot an upload targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaSlot {
    Image,
    Logo,
}

impl MediaSlot {
    /// The immediate edit that lands a freshly hosted URL in this slot.
    pub(crate) fn edit(self, url: String) -> LaunchEdit {
        match self {
            MediaSlot::Image => LaunchEdit::Image(Some(url)),
            MediaSlot::Logo => LaunchEdit::Logo(Some(url)),
        }
    }
}
