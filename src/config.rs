//! Site configuration module.
//!
//! Handles loading, validating, and merging `config.toml` files. Configuration
//! is layered: stock defaults are overridden by the site `config.toml`, whose
//! site-wide values are in turn overridden by command-line flags. An
//! article's own `[articles."<file>.md"]` table sits on top of both, so a
//! per-article `author` beats `--author`.
//!
//! ## Config File Location
//!
//! Place `config.toml` next to the Markdown sources:
//!
//! ```text
//! content/
//! ├── config.toml              # Site config (overrides stock defaults)
//! ├── images/                  # Article images, copied next to the output
//! ├── parte1-fundamentos.md
//! └── parte2-java.md
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! author = "Editorial Team"  # Default author when the article names none
//! base_url = ""              # Canonical site URL; empty disables URL tags
//! language = "en-US"         # BCP 47 language tag
//! exclude = ["README.md", "CHANGELOG.md", "TODO.md"]
//!
//! [social]
//! # site_name = "..."        # og:site_name (defaults to the author)
//! # twitter_handle = "@..." # twitter:creator (defaults to @author)
//! image_width = 1200
//! image_height = 630
//! section = "Technology"    # Schema.org articleSection
//!
//! [theme]
//! color = "#667eea"         # theme-color hints
//!
//! [processing]
//! max_processes = 4         # Max parallel renders (omit for auto = CPU cores)
//!
//! [articles."parte1-fundamentos.md"]
//! title = "Part I: Kafka Fundamentals"
//! keywords = ["kafka", "java"]
//! ```
//!
//! ## Per-Article Overrides
//!
//! The `[articles]` table replaces per-article driver scripts: one entry per
//! source filename, each key overriding a heuristically extracted value or a
//! site-wide default for that article only.
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `config.toml`.
///
/// All fields have sensible defaults. User config files need only specify
/// the values they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Default author, used when the article carries no author label.
    pub author: String,
    /// Canonical base URL of the published site. Empty disables canonical,
    /// Open Graph and Twitter URL emission.
    pub base_url: String,
    /// Language tag for `<html lang>`, `og:locale` and `inLanguage`.
    pub language: String,
    /// Markdown filenames skipped by batch builds.
    pub exclude: Vec<String>,
    /// Open Graph / Twitter / Schema.org settings.
    pub social: SocialConfig,
    /// Page theme settings.
    pub theme: ThemeConfig,
    /// Parallel rendering settings.
    pub processing: ProcessingConfig,
    /// Per-article overrides keyed by source filename.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub articles: BTreeMap<String, ArticleOverrides>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            author: "Editorial Team".to_string(),
            base_url: String::new(),
            language: "en-US".to_string(),
            exclude: vec![
                "README.md".to_string(),
                "CHANGELOG.md".to_string(),
                "TODO.md".to_string(),
            ],
            social: SocialConfig::default(),
            theme: ThemeConfig::default(),
            processing: ProcessingConfig::default(),
            articles: BTreeMap::new(),
        }
    }
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.base_url.is_empty()
            && !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://"))
        {
            return Err(ConfigError::Validation(
                "base_url must be empty or start with http:// or https://".into(),
            ));
        }
        if self.language.trim().is_empty() {
            return Err(ConfigError::Validation(
                "language must not be empty".into(),
            ));
        }
        if self.social.image_width == 0 || self.social.image_height == 0 {
            return Err(ConfigError::Validation(
                "social.image_width and social.image_height must be non-zero".into(),
            ));
        }
        if !is_hex_color(&self.theme.color) {
            return Err(ConfigError::Validation(format!(
                "theme.color must be a #rgb or #rrggbb value, got {:?}",
                self.theme.color
            )));
        }
        for name in self.articles.keys() {
            if !name.ends_with(".md") {
                return Err(ConfigError::Validation(format!(
                    "articles.{name:?} must name a .md file"
                )));
            }
        }
        Ok(())
    }

    /// Resolve the options for one article: site-wide values with the
    /// article's `[articles."<file_name>"]` overrides applied on top.
    pub fn options_for(&self, file_name: &str) -> RenderOptions {
        let article = self.articles.get(file_name).cloned().unwrap_or_default();
        RenderOptions {
            author: self.author.clone(),
            base_url: self.base_url.trim_end_matches('/').to_string(),
            language: self.language.clone(),
            theme_color: self.theme.color.clone(),
            site_name: self.social.site_name.clone(),
            twitter_handle: self.social.twitter_handle.clone(),
            image_width: self.social.image_width,
            image_height: self.social.image_height,
            section: article
                .section
                .clone()
                .unwrap_or_else(|| self.social.section.clone()),
            social_image: article.social_image.clone(),
            output: article.output.clone(),
            overrides: MetadataOverrides {
                title: article.title,
                description: article.description,
                keywords: article.keywords,
                author: article.author,
            },
        }
    }
}

fn is_hex_color(value: &str) -> bool {
    value
        .strip_prefix('#')
        .is_some_and(|hex| matches!(hex.len(), 3 | 6) && hex.chars().all(|c| c.is_ascii_hexdigit()))
}

/// Open Graph, Twitter Card and Schema.org settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SocialConfig {
    /// `og:site_name`. When absent, the article author is used.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site_name: Option<String>,
    /// `twitter:creator`. When absent, derived from the author name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub twitter_handle: Option<String>,
    /// Advertised social image width in pixels.
    pub image_width: u32,
    /// Advertised social image height in pixels.
    pub image_height: u32,
    /// Schema.org `articleSection`.
    pub section: String,
}

impl Default for SocialConfig {
    fn default() -> Self {
        Self {
            site_name: None,
            twitter_handle: None,
            image_width: 1200,
            image_height: 630,
            section: "Technology".to_string(),
        }
    }
}

/// Page theme settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThemeConfig {
    /// Browser chrome colour (`theme-color` and vendor variants).
    pub color: String,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            color: "#667eea".to_string(),
        }
    }
}

/// Parallel rendering settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of articles rendered in parallel by `build`.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

/// One `[articles."<file>.md"]` entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ArticleOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keywords: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// Schema.org `articleSection` for this article only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    /// Social image path relative to `base_url`, e.g. `"images/cover.png"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub social_image: Option<String>,
    /// Output filename used by batch builds instead of `<slug>.html`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

/// Metadata values that replace the heuristically extracted ones.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetadataOverrides {
    pub title: Option<String>,
    pub description: Option<String>,
    pub keywords: Option<Vec<String>>,
    pub author: Option<String>,
}

/// Fully resolved settings for rendering one article.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    /// Default author; an author label in the article wins over it.
    pub author: String,
    /// Base URL without trailing slash; empty disables URL emission.
    pub base_url: String,
    pub language: String,
    pub theme_color: String,
    pub site_name: Option<String>,
    pub twitter_handle: Option<String>,
    pub image_width: u32,
    pub image_height: u32,
    pub section: String,
    pub social_image: Option<String>,
    pub output: Option<String>,
    pub overrides: MetadataOverrides,
}

impl Default for RenderOptions {
    fn default() -> Self {
        SiteConfig::default().options_for("")
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(SiteConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a TOML file as a raw value.
///
/// Returns `Ok(None)` if the file does not exist.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config_file(config_path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Load `config.toml` from a directory as a raw TOML value.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    load_raw_config_file(&dir.join("config.toml"))
}

/// Merge optional overlays onto a base value in order, then deserialize and
/// validate.
pub fn resolve_config(
    base: toml::Value,
    overlays: impl IntoIterator<Item = Option<toml::Value>>,
) -> Result<SiteConfig, ConfigError> {
    let merged = overlays
        .into_iter()
        .flatten()
        .fold(base, merge_toml);
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `config.toml` in the given directory.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(dir: &Path) -> Result<SiteConfig, ConfigError> {
    resolve_config(stock_defaults_value(), [load_raw_config(dir)?])
}

/// Build a TOML overlay from command-line flags. Returns `None` when no flag
/// was given so the caller can skip the layer entirely.
pub fn cli_overlay(
    author: Option<&str>,
    base_url: Option<&str>,
    language: Option<&str>,
) -> Option<toml::Value> {
    let mut table = toml::map::Map::new();
    let flags = [("author", author), ("base_url", base_url), ("language", language)];
    for (key, value) in flags {
        if let Some(value) = value {
            table.insert(key.to_string(), toml::Value::String(value.to_string()));
        }
    }
    (!table.is_empty()).then_some(toml::Value::Table(table))
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# seo-press Configuration
# =======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Layers, lowest to highest priority:
#   stock defaults -> this file -> CLI flags -> [articles."<file>.md"]
#
# Unknown keys will cause an error.

# Default author. An "Author:" / "By:" line inside an article wins over it.
author = "Editorial Team"

# Canonical site URL, e.g. "https://example.dev". Leave empty to omit the
# canonical link and every Open Graph / Twitter URL.
base_url = ""

# Language tag used for <html lang>, og:locale and inLanguage.
language = "en-US"

# Markdown files skipped by `seo-press build`.
exclude = ["README.md", "CHANGELOG.md", "TODO.md"]

# ---------------------------------------------------------------------------
# Social / structured data
# ---------------------------------------------------------------------------
[social]
# og:site_name. Defaults to the article author.
# site_name = "My Blog"

# twitter:creator. Defaults to "@" + author name without spaces, lowercased.
# twitter_handle = "@myblog"

# Advertised social image size (og:image:width / og:image:height).
image_width = 1200
image_height = 630

# Schema.org articleSection.
section = "Technology"

# ---------------------------------------------------------------------------
# Theme
# ---------------------------------------------------------------------------
[theme]
# Browser chrome colour (theme-color and vendor variants).
color = "#667eea"

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum articles rendered in parallel by `build`.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4

# ---------------------------------------------------------------------------
# Per-article overrides, keyed by source filename
# ---------------------------------------------------------------------------
# [articles."parte1-fundamentos.md"]
# title = "Part I: Kafka Fundamentals"
# description = "Producers and consumers from scratch."
# keywords = ["kafka", "java", "streaming"]
# author = "Jane Doe"
# section = "Programming"
# social_image = "images/kafka-part1.png"
# output = "kafka-part-1.html"
"##
}
