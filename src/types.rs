//! Document types shared across the sync core.
//!
//! Everything here mirrors the remote document shapes: camelCase field
//! names, permissive deserialization (`#[serde(default)]`) so partially
//! written or older documents still load.

use serde::{Deserialize, Serialize};

/// Fiscal quarter tag assigned to each month slot.
///
/// Serialized exactly as the remote documents store it ("FY26 - Q4" etc.),
/// so the wire value doubles as the display label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Quarter {
    #[serde(rename = "FY26 - Q4")]
    Fy26Q4,
    #[serde(rename = "FY27 - Q1")]
    Fy27Q1,
    #[serde(rename = "FY27 - Q2")]
    Fy27Q2,
    #[serde(rename = "FY27 - Q3")]
    Fy27Q3,
}

impl Quarter {
    /// All quarters in board order.
    pub const ALL: [Quarter; 4] = [
        Quarter::Fy26Q4,
        Quarter::Fy27Q1,
        Quarter::Fy27Q2,
        Quarter::Fy27Q3,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Quarter::Fy26Q4 => "FY26 - Q4",
            Quarter::Fy27Q1 => "FY27 - Q1",
            Quarter::Fy27Q2 => "FY27 - Q2",
            Quarter::Fy27Q3 => "FY27 - Q3",
        }
    }
}

impl Default for Quarter {
    fn default() -> Self {
        Quarter::Fy26Q4
    }
}

impl std::fmt::Display for Quarter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// A labeled link attached to a launch (deck, asset folder, brief).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceLink {
    pub id: String,
    pub label: String,
    pub url: String,
}

/// A campaign line item on a month card.
///
/// `name` is free text and may carry lightweight markup (bullet lines,
/// `[label](url)` spans) interpreted only at render time by
/// [`crate::markup::parse_activity_markup`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignActivity {
    pub id: String,
    pub name: String,
}

/// A reply under a top-level comment.
///
/// Replies are exactly one level deep: no resolved flag, no nested
/// replies. Older documents that stored replies with those extra fields
/// still deserialize (unknown fields are ignored).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reply {
    pub id: String,
    pub text: String,
    /// RFC 3339 timestamp string, UTC.
    pub timestamp: String,
    pub author: String,
}

/// A top-level comment thread on a month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    /// Millisecond-epoch string; unique within the owning month and used
    /// as the delete/toggle target.
    pub id: String,
    pub text: String,
    /// RFC 3339 timestamp string, UTC. Visibility sorting parses this.
    pub timestamp: String,
    pub author: String,
    #[serde(default)]
    pub resolved: bool,
    #[serde(default)]
    pub replies: Vec<Reply>,
}

/// The "product launch" details nested inside a month.
///
/// No required fields; the whole object is replaced on every edit flush
/// rather than patched field-by-field.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchRecord {
    #[serde(default)]
    pub title: String,
    /// Media reference for the launch logo (uploaded URL, pasted link, or
    /// data URI).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    /// Media reference for the hero visual. Same forms as `logo`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default)]
    pub objective: String,
    /// Legacy total budget string, display-only (e.g. "$120k").
    #[serde(default)]
    pub budget: String,
    #[serde(default)]
    pub performance_spend: String,
    #[serde(default)]
    pub brand_spend: String,
    #[serde(default)]
    pub resources: Vec<ResourceLink>,
    /// Free-form date strings, not parsed as real dates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub launch_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section1_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section1_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section2_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section2_text: Option<String>,
}

/// One calendar month on the board. The set of twelve ids is fixed; see
/// [`crate::calendar::MONTH_IDS`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthRecord {
    /// Stable document key, e.g. "mar-2026".
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header_logo: Option<String>,
    #[serde(default)]
    pub quarter: Quarter,
    #[serde(default)]
    pub year: u16,
    #[serde(default)]
    pub product_launch: LaunchRecord,
    #[serde(default)]
    pub campaigns: Vec<CampaignActivity>,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

impl MonthRecord {
    /// Find a top-level comment by id.
    pub fn comment(&self, id: &str) -> Option<&Comment> {
        self.comments.iter().find(|c| c.id == id)
    }
}

/// Board-wide settings singleton: two independent branding logo slots.
///
/// `logo` serializes even when unset (the seed writes `"logo": null`);
/// the secondary slot was added later and defaults in.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardSettings {
    pub logo: Option<String>,
    #[serde(default)]
    pub secondary_logo: Option<String>,
}
