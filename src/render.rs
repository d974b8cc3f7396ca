//! The article renderer.
//!
//! One call converts one Markdown file into one HTML page:
//!
//! 1. **Read** the source (missing file → [`RenderError::MissingSource`],
//!    invalid UTF-8 → [`RenderError::Conversion`])
//! 2. **Extract** metadata and apply per-article overrides ([`crate::metadata`])
//! 3. **Convert** Markdown to an HTML fragment ([`crate::convert`])
//! 4. **Post-process** the fragment ([`crate::postprocess`])
//! 5. **Describe** the article as JSON-LD ([`crate::structured_data`])
//! 6. **Assemble** the page ([`crate::page`])
//! 7. **Write** the page atomically: a temp file in the destination directory
//!    is renamed over the target, so a failed run never leaves a partial page
//! 8. **Copy media** from the source's `images/` to the destination's
//!    `images/` ([`crate::media`]), once per conversion
//!
//! Steps 1-7 fail the conversion. Media copy failures are only counted in the
//! returned [`MediaReport`].
//!
//! The destination defaults to the article's configured `output` name in the
//! source directory, or the source path with an `.html` extension.

use crate::config::RenderOptions;
use crate::convert;
use crate::media::{self, MediaReport};
use crate::metadata::{self, ArticleMetadata};
use crate::page::{self, PageContext};
use crate::postprocess::RenderedBody;
use crate::structured_data::{self, ArticleUrls};
use chrono::{DateTime, FixedOffset};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("source not found: {}", .0.display())]
    MissingSource(PathBuf),
    #[error("cannot convert {}: {reason}", path.display())]
    Conversion { path: PathBuf, reason: String },
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result of one successful conversion.
#[derive(Debug, Clone)]
pub struct RenderOutcome {
    pub source: PathBuf,
    pub output: PathBuf,
    /// Canonical URL, when a base URL is configured.
    pub url: Option<String>,
    pub metadata: ArticleMetadata,
    pub media: MediaReport,
}

/// Convert `source` to an HTML page and copy its media.
///
/// `dest` overrides the default output path (see module docs).
/// `generated_at` stamps the published and modified timestamps.
pub fn render_article(
    source: &Path,
    dest: Option<&Path>,
    options: &RenderOptions,
    generated_at: DateTime<FixedOffset>,
) -> Result<RenderOutcome, RenderError> {
    let mut outcome = render_document(source, dest, options, generated_at)?;
    outcome.media = media::copy_media(
        &media::media_dir_for(source),
        &media::media_dir_for(&outcome.output),
    );
    Ok(outcome)
}

/// Convert `source` to an HTML page without touching media.
///
/// Batch builds use this and sync the shared media directory once at the end.
pub fn render_document(
    source: &Path,
    dest: Option<&Path>,
    options: &RenderOptions,
    generated_at: DateTime<FixedOffset>,
) -> Result<RenderOutcome, RenderError> {
    let output = match dest {
        Some(dest) => dest.to_path_buf(),
        None => default_destination(source, options),
    };
    debug!(source = %source.display(), output = %output.display(), "rendering");

    let content = read_source(source)?;

    let mut meta = metadata::extract(&content, source, &options.author, generated_at);
    meta.apply_overrides(&options.overrides);

    let mut body = RenderedBody::new(convert::markdown_to_html(&content));
    body.process(&meta.title, &options.base_url);

    let urls = ArticleUrls::new(&meta, options);
    let json_ld = structured_data::article_json_ld(&meta, options, &urls)?;

    let document = page::render_page(&PageContext {
        meta: &meta,
        options,
        urls: &urls,
        json_ld: &json_ld,
        body: &body,
    });
    write_atomic(&output, &document.into_string())?;

    info!("{} -> {}", source.display(), output.display());
    Ok(RenderOutcome {
        source: source.to_path_buf(),
        output,
        url: urls.canonical,
        metadata: meta,
        media: MediaReport::default(),
    })
}

/// Extract an article's metadata, overrides applied, without writing anything.
pub fn inspect_article(
    source: &Path,
    options: &RenderOptions,
    generated_at: DateTime<FixedOffset>,
) -> Result<ArticleMetadata, RenderError> {
    let content = read_source(source)?;
    let mut meta = metadata::extract(&content, source, &options.author, generated_at);
    meta.apply_overrides(&options.overrides);
    Ok(meta)
}

/// Where a page goes when no destination is given.
pub fn default_destination(source: &Path, options: &RenderOptions) -> PathBuf {
    match &options.output {
        Some(name) => source.with_file_name(name),
        None => source.with_extension("html"),
    }
}

fn read_source(source: &Path) -> Result<String, RenderError> {
    if !source.is_file() {
        return Err(RenderError::MissingSource(source.to_path_buf()));
    }
    let bytes = fs::read(source).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => RenderError::MissingSource(source.to_path_buf()),
        _ => RenderError::Io(e),
    })?;
    String::from_utf8(bytes).map_err(|e| RenderError::Conversion {
        path: source.to_path_buf(),
        reason: format!("not valid UTF-8 ({e})"),
    })
}

/// Write `contents` to `path` through a temp file in the same directory.
fn write_atomic(path: &Path, contents: &str) -> io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(contents.as_bytes())?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tmp.as_file()
            .set_permissions(fs::Permissions::from_mode(0o644))?;
    }
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
