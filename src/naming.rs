//! Filename-derived names for articles.
//!
//! An article is identified by its source path. The filename stem doubles as
//! the URL slug, the fallback title, and a source of keywords:
//!
//! - `my-article.md` → slug `"my-article"`
//! - `my-article.md` → fallback title `"My Article"`
//! - `kafka-java-parte1.md` → stem keywords `["kafka", "java", "parte1"]`
//!
//! Dashes are word separators everywhere; nothing else is rewritten.

use std::path::Path;

/// Slug for a source path: the filename without its extension.
///
/// Stable for a given path. Non-UTF-8 filenames are converted lossily.
pub fn slug_from_path(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Fallback title for a document with no top-level heading.
///
/// Dashes become spaces, then every word is title-cased:
/// `"my-article"` → `"My Article"`, `"JAVA-tips"` → `"Java Tips"`.
pub fn title_from_stem(stem: &str) -> String {
    title_case(&stem.replace('-', " "))
}

/// Whitespace-separated tokens of the dash-split stem, in order.
pub fn stem_keywords(stem: &str) -> Vec<String> {
    stem.replace('-', " ")
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Title-case a string: a cased character that follows another cased
/// character is lowercased, every other cased character is uppercased.
///
/// Digits and punctuation break words, so `"2nd"` becomes `"2Nd"` and
/// `"it's"` becomes `"It'S"`.
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_cased = false;
    for c in text.chars() {
        let cased = c.is_uppercase() || c.is_lowercase();
        if cased {
            if prev_cased {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
        } else {
            out.push(c);
        }
        prev_cased = cased;
    }
    out
}
