//! Article metadata extraction.
//!
//! Every field of [`ArticleMetadata`] is derived heuristically from the raw
//! Markdown text and the source filename. Extraction never fails: each field
//! falls back to a deterministic value when the content gives no answer.
//!
//! ## Field resolution
//!
//! - **Title**: the first `# ` heading → the title-cased filename stem.
//! - **Description**: the first prose line, emphasis and link markup
//!   stripped, cut to 160 characters → `"Article about {title}"`.
//! - **Keywords**: every `## ` / `### ` heading (lowercased) followed by the
//!   dash-split filename stem, deduplicated case-insensitively, at most 10.
//! - **Author**: the text after an `Author:` / `By:` label (also the
//!   Portuguese `Autor:` / `Por:`) → the configured default author.
//!
//! Lines inside fenced code blocks are ignored by every rule, so a shell
//! comment like `# install` is never mistaken for a title.
//!
//! ## Overrides
//!
//! Per-article config values replace extracted ones after extraction (see
//! [`ArticleMetadata::apply_overrides`]). Overrides go through the same
//! truncation and deduplication, so the length invariants always hold.

use crate::config::MetadataOverrides;
use crate::naming;
use chrono::{DateTime, FixedOffset, SecondsFormat};
use regex::Regex;
use serde::Serialize;
use std::collections::HashSet;
use std::path::Path;
use std::sync::LazyLock;

/// Maximum description length, in characters.
pub const MAX_DESCRIPTION_CHARS: usize = 160;

/// Maximum number of keywords.
pub const MAX_KEYWORDS: usize = 10;

static BOLD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*\*(.*?)\*\*").unwrap());
static ITALIC_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*(.*?)\*").unwrap());
static BOLD_UNDERSCORE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b__(.*?)__\b").unwrap());
static ITALIC_UNDERSCORE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b_(.*?)_\b").unwrap());
static HEADING_ATTRS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\{[^{}]*\}$").unwrap());
static LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!?\[(.*?)\]\([^)]*\)").unwrap());
static AUTHOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:author|autor|by|por):\s*(.+)").unwrap());

/// Metadata derived from one article. Created fresh on every conversion.
///
/// Serializes to the object `check --json` prints.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArticleMetadata {
    pub title: String,
    /// At most [`MAX_DESCRIPTION_CHARS`] characters, free of Markdown markup.
    pub description: String,
    /// Unique (case-insensitive), at most [`MAX_KEYWORDS`] entries.
    pub keywords: Vec<String>,
    pub author: String,
    pub published_at: DateTime<FixedOffset>,
    /// Always equal to `published_at`; modifications are not tracked.
    pub modified_at: DateTime<FixedOffset>,
    /// Filename stem of the source document.
    pub slug: String,
    /// Whitespace-separated token count of the raw Markdown.
    pub word_count: usize,
}

impl ArticleMetadata {
    /// Comma-separated keyword list for `<meta name="keywords">`.
    pub fn keywords_csv(&self) -> String {
        self.keywords.join(", ")
    }

    /// `published_at` as RFC 3339 with whole seconds.
    pub fn published_iso(&self) -> String {
        self.published_at.to_rfc3339_opts(SecondsFormat::Secs, false)
    }

    /// `modified_at` as RFC 3339 with whole seconds.
    pub fn modified_iso(&self) -> String {
        self.modified_at.to_rfc3339_opts(SecondsFormat::Secs, false)
    }

    /// Replace extracted values with explicitly configured ones.
    pub fn apply_overrides(&mut self, overrides: &MetadataOverrides) {
        if let Some(title) = non_empty(overrides.title.as_deref()) {
            self.title = title.to_string();
        }
        if let Some(description) = non_empty(overrides.description.as_deref()) {
            self.description = truncate_chars(description, MAX_DESCRIPTION_CHARS);
        }
        if let Some(keywords) = &overrides.keywords {
            self.keywords = dedup_keywords(keywords.iter().cloned());
        }
        if let Some(author) = non_empty(overrides.author.as_deref()) {
            self.author = author.to_string();
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

/// Extract metadata from Markdown `content` read from `source`.
///
/// `default_author` is used when no author label is found; `generated_at`
/// stamps both the published and modified timestamps.
pub fn extract(
    content: &str,
    source: &Path,
    default_author: &str,
    generated_at: DateTime<FixedOffset>,
) -> ArticleMetadata {
    let slug = naming::slug_from_path(source);
    let lines: Vec<&str> = prose_lines(content).collect();

    let title = extract_title(&lines).unwrap_or_else(|| naming::title_from_stem(&slug));
    let description =
        extract_description(&lines).unwrap_or_else(|| format!("Article about {title}"));
    let keywords = extract_keywords(&lines, &slug);
    let author = extract_author(&lines).unwrap_or_else(|| default_author.to_string());

    ArticleMetadata {
        title,
        description,
        keywords,
        author,
        published_at: generated_at,
        modified_at: generated_at,
        slug,
        word_count: content.split_whitespace().count(),
    }
}

/// Lines outside fenced code blocks. Fence delimiters themselves are dropped.
///
/// A fence is closed only by a bare run of the same character at least as
/// long as the opening run, so a four-backtick block may contain three-backtick
/// lines.
fn prose_lines(content: &str) -> impl Iterator<Item = &str> {
    let mut open: Option<Fence> = None;
    content.lines().filter(move |line| match open {
        None => match Fence::parse(line) {
            Some((fence, _)) => {
                open = Some(fence);
                false
            }
            None => true,
        },
        Some(fence) => {
            if fence.is_closed_by(line) {
                open = None;
            }
            false
        }
    })
}

/// An open code fence: its marker character and run length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Fence {
    marker: char,
    len: usize,
}

impl Fence {
    /// The fence opened by `line`, with the text after the run (info string).
    fn parse(line: &str) -> Option<(Fence, &str)> {
        let trimmed = line.trim_start();
        let marker = trimmed.chars().next().filter(|c| matches!(c, '`' | '~'))?;
        let len = trimmed.chars().take_while(|&c| c == marker).count();
        (len >= 3).then(|| (Fence { marker, len }, &trimmed[len..]))
    }

    fn is_closed_by(&self, line: &str) -> bool {
        Fence::parse(line).is_some_and(|(fence, rest)| {
            fence.marker == self.marker && fence.len >= self.len && rest.trim().is_empty()
        })
    }
}

/// Text of the first `# ` heading, trimmed.
fn extract_title(lines: &[&str]) -> Option<String> {
    lines
        .iter()
        .filter_map(|line| line.strip_prefix("# "))
        .map(heading_text)
        .find(|title| !title.is_empty())
}

/// First prose paragraph line with inline markup removed.
fn extract_description(lines: &[&str]) -> Option<String> {
    lines
        .iter()
        .map(|line| line.trim())
        .find(|line| is_description_candidate(line))
        .map(|line| truncate_chars(strip_inline_markup(line).trim(), MAX_DESCRIPTION_CHARS))
        .filter(|description| !description.is_empty())
}

fn is_description_candidate(line: &str) -> bool {
    !line.is_empty()
        && !line.starts_with(['#', '*', '-', '<', '|'])
        && line != "[TOC]"
        && !AUTHOR_RE.is_match(line)
}

/// Remove bold, italic, link and image markup, keeping the visible text.
///
/// Underscore emphasis only counts at word edges, so `snake_case_names`
/// survive.
pub fn strip_inline_markup(text: &str) -> String {
    let text = BOLD_RE.replace_all(text, "$1");
    let text = BOLD_UNDERSCORE_RE.replace_all(&text, "$1");
    let text = ITALIC_RE.replace_all(&text, "$1");
    let text = ITALIC_UNDERSCORE_RE.replace_all(&text, "$1");
    LINK_RE.replace_all(&text, "$1").into_owned()
}

/// Heading text without a trailing `{#id .class}` attribute block.
fn heading_text(text: &str) -> String {
    HEADING_ATTRS_RE.replace(text.trim(), "").trim().to_string()
}

fn extract_keywords(lines: &[&str], slug: &str) -> Vec<String> {
    let headings = lines
        .iter()
        .filter(|line| line.starts_with("## ") || line.starts_with("### "))
        .map(|line| heading_text(line.trim_start_matches('#')).to_lowercase());
    dedup_keywords(headings.chain(naming::stem_keywords(slug)))
}

/// Drop empty and case-insensitively repeated keywords, keeping first
/// occurrences in order, and cap the list at [`MAX_KEYWORDS`].
fn dedup_keywords(candidates: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty() && seen.insert(k.to_lowercase()))
        .take(MAX_KEYWORDS)
        .collect()
}

fn extract_author(lines: &[&str]) -> Option<String> {
    lines.iter().find_map(|line| {
        let caps = AUTHOR_RE.captures(line)?;
        let author = strip_inline_markup(&caps[1]);
        let author = author.trim().trim_matches(['*', '_']).trim();
        (!author.is_empty()).then(|| author.to_string())
    })
}

/// Keep at most `max` characters (not bytes).
fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}
