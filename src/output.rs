//! CLI output formatting.
//!
//! # Information-First Display
//!
//! Every article is shown by its title first, with the output file as the
//! arrow target and filesystem paths or metadata as indented context lines.
//! The output reads as a content inventory; paths are there to trace each
//! entry back to its source.
//!
//! # Output Format
//!
//! ## Convert
//!
//! ```text
//! Kafka Fundamentals → parte1-fundamentos.html
//!     Source: content/parte1-fundamentos.md
//!     Output: content/parte1-fundamentos.html
//!     URL: https://mine.dev/parte1-fundamentos.html
//!     Media: 2 copied, 0 skipped
//! ```
//!
//! ## Check
//!
//! ```text
//! Kafka Fundamentals
//!     Slug: parte1-fundamentos
//!     Description: Apache Kafka is a distributed event streaming platform...
//!     Keywords: producers, consumers, kafka
//!     Author: Jane Doe
//!     Words: 412
//! ```
//!
//! `check --json` prints the same metadata as one pretty-printed JSON object
//! with every field, timestamps in RFC 3339.
//!
//! ## Build
//!
//! ```text
//! 001 Introduction to Kafka → intro.html
//! 002 Kafka Fundamentals → parte1-fundamentos.html
//!
//! Failed
//! 001 broken.md
//!     Error: cannot convert content/broken.md: not valid UTF-8
//!
//! Media: 2 copied, 0 skipped
//! Rendered 2 articles, 1 failed
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure: no I/O, no side effects.

use crate::batch::BuildReport;
use crate::media::MediaReport;
use crate::metadata::ArticleMetadata;
use crate::render::RenderOutcome;
use std::path::Path;

/// Longest description shown by `check` before it is cut with `...`.
const DESCRIPTION_PREVIEW_CHARS: usize = 72;

// ============================================================================
// Shared helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Truncate text to `max` characters, appending `...` if truncated.
fn truncate_desc(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max).collect();
        format!("{}...", cut.trim_end())
    }
}

/// `path` relative to `base` when it lies under it, otherwise unchanged.
fn display_path(path: &Path, base: Option<&Path>) -> String {
    base.and_then(|b| path.strip_prefix(b).ok())
        .unwrap_or(path)
        .display()
        .to_string()
}

/// `"2 copied, 1 skipped"`, with failures only when there were any.
fn media_summary(report: &MediaReport) -> String {
    let mut summary = format!("{} copied, {} skipped", report.copied, report.skipped);
    if report.failed > 0 {
        summary.push_str(&format!(", {} failed", report.failed));
    }
    summary
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

// ============================================================================
// Convert
// ============================================================================

/// Format the result of a single conversion.
pub fn format_convert_output(outcome: &RenderOutcome) -> Vec<String> {
    let target = outcome
        .output
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| outcome.output.display().to_string());

    let mut lines = vec![format!("{} → {}", outcome.metadata.title, target)];
    lines.push(format!("{}Source: {}", indent(1), outcome.source.display()));
    lines.push(format!("{}Output: {}", indent(1), outcome.output.display()));
    if let Some(url) = &outcome.url {
        lines.push(format!("{}URL: {}", indent(1), url));
    }
    if outcome.media.total() > 0 {
        lines.push(format!("{}Media: {}", indent(1), media_summary(&outcome.media)));
    }
    lines
}

/// Print conversion output to stdout.
pub fn print_convert_output(outcome: &RenderOutcome) {
    for line in format_convert_output(outcome) {
        println!("{}", line);
    }
}

// ============================================================================
// Check
// ============================================================================

/// Format extracted metadata without rendering anything.
pub fn format_metadata(meta: &ArticleMetadata) -> Vec<String> {
    let mut lines = vec![meta.title.clone()];
    lines.push(format!("{}Slug: {}", indent(1), meta.slug));
    lines.push(format!(
        "{}Description: {}",
        indent(1),
        truncate_desc(&meta.description, DESCRIPTION_PREVIEW_CHARS)
    ));
    if !meta.keywords.is_empty() {
        lines.push(format!("{}Keywords: {}", indent(1), meta.keywords_csv()));
    }
    lines.push(format!("{}Author: {}", indent(1), meta.author));
    lines.push(format!("{}Words: {}", indent(1), meta.word_count));
    lines
}

/// Print extracted metadata to stdout.
pub fn print_metadata(meta: &ArticleMetadata) {
    for line in format_metadata(meta) {
        println!("{}", line);
    }
}

/// Format extracted metadata as pretty-printed JSON for `check --json`.
pub fn format_metadata_json(meta: &ArticleMetadata) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(meta)
}

/// Print extracted metadata as JSON to stdout.
pub fn print_metadata_json(meta: &ArticleMetadata) -> Result<(), serde_json::Error> {
    println!("{}", format_metadata_json(meta)?);
    Ok(())
}

// ============================================================================
// Build
// ============================================================================

/// Format a build report: one line per rendered article, failures with their
/// messages, then media and totals.
///
/// Output file names are shown relative to `output_dir`.
pub fn format_build_output(report: &BuildReport, output_dir: &Path) -> Vec<String> {
    let mut lines = Vec::new();

    for (i, outcome) in report.rendered.iter().enumerate() {
        lines.push(format!(
            "{} {} → {}",
            format_index(i + 1),
            outcome.metadata.title,
            display_path(&outcome.output, Some(output_dir))
        ));
    }

    if !report.failed.is_empty() {
        lines.push(String::new());
        lines.push("Failed".to_string());
        for (i, failure) in report.failed.iter().enumerate() {
            let name = failure
                .source
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| failure.source.display().to_string());
            lines.push(format!("{} {}", format_index(i + 1), name));
            lines.push(format!("{}Error: {}", indent(1), failure.message));
        }
    }

    lines.push(String::new());
    if report.media.total() > 0 {
        lines.push(format!("Media: {}", media_summary(&report.media)));
    }
    let mut totals = format!("Rendered {}", plural(report.rendered.len(), "article"));
    if !report.failed.is_empty() {
        totals.push_str(&format!(", {} failed", report.failed.len()));
    }
    lines.push(totals);
    lines
}

/// Print build output to stdout.
pub fn print_build_output(report: &BuildReport, output_dir: &Path) {
    for line in format_build_output(report, output_dir) {
        println!("{}", line);
    }
}

// ============================================================================
// Clean
// ============================================================================

pub fn format_clean_output(removed: usize, output_dir: &Path) -> Vec<String> {
    vec![format!(
        "Removed {} from {}",
        plural(removed, "page"),
        output_dir.display()
    )]
}

pub fn print_clean_output(removed: usize, output_dir: &Path) {
    for line in format_clean_output(removed, output_dir) {
        println!("{}", line);
    }
}
