//! Media reference interpretation.
//!
//! A launch's image or logo slot holds one opaque string: a data URI, a
//! hosted-asset URL, a pasted Drive or YouTube link, or anything else a
//! user dropped in. `classify` maps that string to a render strategy and
//! is total over arbitrary input; unrecognized values fall back to the
//! image path and broken links are the renderer's problem.

use std::sync::OnceLock;

use regex::Regex;

/// How a stored media reference should be rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderStrategy {
    /// Blank reference, nothing to show.
    Empty,
    /// Drive preview link, shown in an embedded frame.
    EmbeddedFramePreview(String),
    /// YouTube link rewritten to its embeddable player URL.
    EmbeddedFrameVideo(String),
    /// Direct video source for an inline player.
    InlineVideo,
    /// Everything else renders as an image source.
    InlineImage,
}

fn re_youtube_watch() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"youtube\.com/watch\?v=([A-Za-z0-9_-]+)").unwrap())
}

fn re_youtube_short() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"youtu\.be/([A-Za-z0-9_-]+)").unwrap())
}

fn re_drive_file() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"drive\.google\.com/file/d/([^/?#]+)").unwrap())
}

const VIDEO_EXTENSIONS: [&str; 3] = [".mp4", ".webm", ".mov"];

fn youtube_embed_url(reference: &str) -> Option<String> {
    if reference.contains("youtube.com/embed/") {
        return Some(reference.to_string());
    }
    let id = re_youtube_watch()
        .captures(reference)
        .or_else(|| re_youtube_short().captures(reference))
        .and_then(|caps| caps.get(1))?;
    Some(format!("https://www.youtube.com/embed/{}", id.as_str()))
}

fn is_video_source(reference: &str) -> bool {
    if reference.starts_with("data:video") {
        return true;
    }
    // Cloudinary delivery URLs carry the resource kind as a path segment.
    if reference.contains("/video/upload/") {
        return true;
    }
    let path = reference
        .split(['?', '#'])
        .next()
        .unwrap_or(reference)
        .to_ascii_lowercase();
    VIDEO_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}

/// Classify a stored media reference into its render strategy.
pub fn classify(reference: &str) -> RenderStrategy {
    let reference = reference.trim();
    if reference.is_empty() {
        return RenderStrategy::Empty;
    }
    if let Some(embed) = youtube_embed_url(reference) {
        return RenderStrategy::EmbeddedFrameVideo(embed);
    }
    if reference.contains("drive.google.com") && reference.contains("/preview") {
        return RenderStrategy::EmbeddedFramePreview(reference.to_string());
    }
    if is_video_source(reference) {
        return RenderStrategy::InlineVideo;
    }
    RenderStrategy::InlineImage
}

/// Save-time normalization for pasted links. Drive share links become
/// their direct-view form; everything else passes through untouched.
pub fn normalize_reference(reference: &str) -> String {
    let trimmed = reference.trim();
    if let Some(id) = re_drive_file()
        .captures(trimmed)
        .and_then(|caps| caps.get(1))
    {
        return format!("https://drive.google.com/uc?export=view&id={}", id.as_str());
    }
    trimmed.to_string()
}
