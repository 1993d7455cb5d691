//! Activity text markup parser.
//!
//! Campaign activity names carry a lightweight markup: each line is either
//! plain or a bullet (leading `- ` or `* `), and any line may embed
//! `[label](url)` link spans. The markup is interpreted at render time
//! only and never validated at write time, so parsing is total over
//! arbitrary input and anything malformed falls back to plain text.

use std::sync::OnceLock;

use regex::Regex;

/// One rendered segment of an activity line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivitySpan {
    Text(String),
    Link { label: String, url: String },
}

/// One line of an activity, split into renderable spans.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityLine {
    /// Line started with a `- ` or `* ` bullet marker (marker stripped).
    pub bullet: bool,
    pub spans: Vec<ActivitySpan>,
}

fn re_link() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").unwrap())
}

/// Parse activity text into lines of spans.
pub fn parse_activity_markup(text: &str) -> Vec<ActivityLine> {
    text.lines().map(parse_line).collect()
}

fn parse_line(line: &str) -> ActivityLine {
    let trimmed = line.trim_start();
    let (bullet, content) = match trimmed
        .strip_prefix("- ")
        .or_else(|| trimmed.strip_prefix("* "))
    {
        Some(rest) => (true, rest),
        None => (false, trimmed),
    };
    ActivityLine {
        bullet,
        spans: parse_spans(content),
    }
}

fn parse_spans(content: &str) -> Vec<ActivitySpan> {
    let mut spans = Vec::new();
    let mut cursor = 0;
    for caps in re_link().captures_iter(content) {
        let whole = caps.get(0).unwrap();
        if whole.start() > cursor {
            spans.push(ActivitySpan::Text(content[cursor..whole.start()].to_string()));
        }
        spans.push(ActivitySpan::Link {
            label: caps[1].to_string(),
            url: caps[2].to_string(),
        });
        cursor = whole.end();
    }
    if cursor < content.len() {
        spans.push(ActivitySpan::Text(content[cursor..].to_string()));
    }
    spans
}
