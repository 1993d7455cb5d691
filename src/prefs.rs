//! Per-user local preferences.
//!
//! The board has no authenticated identity, so the display name used to
//! attribute comments lives on the user's machine, next to optional
//! Media Host credential overrides. Everything in here is local-only
//! state in ~/.bigmoments/prefs.json; a missing file just means
//! defaults.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::comments::ANONYMOUS_AUTHOR;

/// Cloudinary cloud used when no override is set.
pub const DEFAULT_MEDIA_CLOUD: &str = "drnmanvbf";
/// Unsigned upload preset used when no override is set.
pub const DEFAULT_MEDIA_PRESET: &str = "davedave";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalPrefs {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub media_cloud_name: Option<String>,
    #[serde(default)]
    pub media_upload_preset: Option<String>,
}

impl LocalPrefs {
    /// Name used when attributing comments.
    pub fn author_name(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(ANONYMOUS_AUTHOR)
    }

    pub fn media_cloud(&self) -> &str {
        self.media_cloud_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(DEFAULT_MEDIA_CLOUD)
    }

    pub fn media_preset(&self) -> &str {
        self.media_upload_preset
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(DEFAULT_MEDIA_PRESET)
    }
}

pub fn prefs_path() -> Result<PathBuf, String> {
    let home = dirs::home_dir().ok_or("Could not find home directory")?;
    Ok(home.join(".bigmoments").join("prefs.json"))
}

pub fn load_prefs() -> Result<LocalPrefs, String> {
    load_prefs_from(&prefs_path()?)
}

pub fn load_prefs_from(path: &Path) -> Result<LocalPrefs, String> {
    if !path.exists() {
        return Ok(LocalPrefs::default());
    }
    let content =
        fs::read_to_string(path).map_err(|e| format!("Failed to read prefs: {}", e))?;
    serde_json::from_str(&content).map_err(|e| format!("Failed to parse prefs: {}", e))
}

pub fn save_prefs(prefs: &LocalPrefs) -> Result<(), String> {
    save_prefs_to(&prefs_path()?, prefs)
}

pub fn save_prefs_to(path: &Path, prefs: &LocalPrefs) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| format!("Failed to create prefs dir: {}", e))?;
    }
    let content = serde_json::to_string_pretty(prefs)
        .map_err(|e| format!("Failed to serialize prefs: {}", e))?;
    fs::write(path, content).map_err(|e| format!("Failed to write prefs: {}", e))
}
