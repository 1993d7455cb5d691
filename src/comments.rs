//! Comment thread operations.
//!
//! Threads are exactly two levels deep: a month holds top-level comments,
//! each top-level comment holds a flat list of replies. Every operation
//! takes the owning month by reference and returns an updated copy, so
//! callers can install the result as a fresh list value without anything
//! mutating in place.

use chrono::{DateTime, SecondsFormat, Utc};

use crate::types::{Comment, MonthRecord, Reply};

/// Author recorded when no display name is configured.
pub const ANONYMOUS_AUTHOR: &str = "Anonymous";

/// Current wall-clock timestamp in the stored wire format
/// (RFC 3339, millisecond precision, `Z` suffix).
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Millisecond-epoch id, bumped past any id already taken so rapid
/// successive adds inside the same millisecond stay unique.
fn unique_time_id<F>(taken: F) -> String
where
    F: Fn(&str) -> bool,
{
    let mut candidate = Utc::now().timestamp_millis();
    while taken(&candidate.to_string()) {
        candidate += 1;
    }
    candidate.to_string()
}

fn rejects(author: &str, text: &str) -> bool {
    author.is_empty() || text.trim().is_empty()
}

/// Append a new top-level comment. No-op when `text` is empty or
/// whitespace, or `author` is empty. The text is stored as given
/// (the trim is only an emptiness check).
pub fn add_top_level_comment(record: &MonthRecord, author: &str, text: &str) -> MonthRecord {
    if rejects(author, text) {
        return record.clone();
    }
    let id = unique_time_id(|candidate| record.comments.iter().any(|c| c.id == candidate));
    let mut updated = record.clone();
    updated.comments.push(Comment {
        id,
        text: text.to_string(),
        timestamp: now_timestamp(),
        author: author.to_string(),
        resolved: false,
        replies: Vec::new(),
    });
    updated
}

/// Append a reply to the top-level comment with id `parent_id`. Same
/// emptiness checks as [`add_top_level_comment`]; no-op when the parent
/// does not exist.
pub fn add_reply(record: &MonthRecord, parent_id: &str, author: &str, text: &str) -> MonthRecord {
    if rejects(author, text) {
        return record.clone();
    }
    let mut updated = record.clone();
    let Some(parent) = updated.comments.iter_mut().find(|c| c.id == parent_id) else {
        return record.clone();
    };
    let id = unique_time_id(|candidate| parent.replies.iter().any(|r| r.id == candidate));
    parent.replies.push(Reply {
        id,
        text: text.to_string(),
        timestamp: now_timestamp(),
        author: author.to_string(),
    });
    updated
}

/// Remove a comment by id. With `parent_id`, removes the reply from that
/// parent's list; without, removes the whole top-level thread including
/// its replies. Missing ids are a silent no-op so repeated deletes from a
/// stale view stay safe.
pub fn delete_comment(
    record: &MonthRecord,
    comment_id: &str,
    parent_id: Option<&str>,
) -> MonthRecord {
    let mut updated = record.clone();
    match parent_id {
        Some(parent_id) => {
            if let Some(parent) = updated.comments.iter_mut().find(|c| c.id == parent_id) {
                parent.replies.retain(|r| r.id != comment_id);
            }
        }
        None => {
            updated.comments.retain(|c| c.id != comment_id);
        }
    }
    updated
}

/// Flip the resolved flag on a top-level comment. Replies carry no
/// resolved state; a reply id here is a no-op.
pub fn toggle_resolved(record: &MonthRecord, comment_id: &str) -> MonthRecord {
    let mut updated = record.clone();
    if let Some(comment) = updated.comments.iter_mut().find(|c| c.id == comment_id) {
        comment.resolved = !comment.resolved;
    }
    updated
}

/// Top-level comments for display: unresolved only unless
/// `include_resolved`, always sorted ascending by timestamp.
///
/// Storage order is insertion order, not time order, so the sort re-runs
/// on every call. The sort is stable; unparseable timestamps sort to the
/// epoch.
pub fn visible_comments(record: &MonthRecord, include_resolved: bool) -> Vec<Comment> {
    let mut visible: Vec<Comment> = record
        .comments
        .iter()
        .filter(|c| include_resolved || !c.resolved)
        .cloned()
        .collect();
    visible.sort_by_key(|c| parse_timestamp(&c.timestamp));
    visible
}

/// Whether `display_name` may delete a comment: only its author may.
pub fn may_delete(comment_author: &str, display_name: &str) -> bool {
    !display_name.is_empty() && comment_author == display_name
}

fn parse_timestamp(value: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}
