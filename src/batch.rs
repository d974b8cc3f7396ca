//! Batch build and clean.
//!
//! A build renders every top-level `*.md` file of a content directory into an
//! output directory, then syncs the shared media directory once:
//!
//! ```text
//! content/                          output/
//! ├── config.toml                   ├── parte1-fundamentos.html
//! ├── README.md         (excluded)  ├── parte2-java.html
//! ├── parte1-fundamentos.md   ──►   └── images/
//! ├── parte2-java.md                    └── kafka-topology.svg
//! └── images/
//!     └── kafka-topology.svg
//! ```
//!
//! Articles render in parallel on the global rayon pool (sized from
//! `[processing] max_processes` by the CLI). Each article writes only its own
//! page, so renders share no mutable state; media is copied after all pages
//! are written. One article failing does not stop the others, but the build
//! is reported as failed.

use crate::config::SiteConfig;
use crate::media::{self, MediaReport};
use crate::naming;
use crate::render::{self, RenderOutcome};
use chrono::{DateTime, FixedOffset};
use rayon::prelude::*;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("cannot scan content directory: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("content directory not found: {}", .0.display())]
    MissingContent(PathBuf),
}

/// An article that could not be rendered.
#[derive(Debug, Clone)]
pub struct DocumentFailure {
    pub source: PathBuf,
    pub message: String,
}

/// Outcome of a whole build.
#[derive(Debug, Default)]
pub struct BuildReport {
    /// Successful renders, in source order.
    pub rendered: Vec<RenderOutcome>,
    /// Failed renders, in source order.
    pub failed: Vec<DocumentFailure>,
    pub media: MediaReport,
}

impl BuildReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Top-level `*.md` files in `content_dir`, sorted, minus `exclude`d names.
///
/// Exclusion matches file names exactly (`README.md`, not `readme.md`).
pub fn discover_articles(
    content_dir: &Path,
    exclude: &[String],
) -> Result<Vec<PathBuf>, BuildError> {
    if !content_dir.is_dir() {
        return Err(BuildError::MissingContent(content_dir.to_path_buf()));
    }
    let mut articles = Vec::new();
    for entry in WalkDir::new(content_dir).min_depth(1).max_depth(1) {
        let entry = entry?;
        let path = entry.path();
        let is_markdown = path.extension().is_some_and(|ext| ext == "md");
        if !entry.file_type().is_file() || !is_markdown {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        if exclude.iter().any(|excluded| *excluded == name) {
            continue;
        }
        articles.push(path.to_path_buf());
    }
    articles.sort();
    Ok(articles)
}

/// Render every article of `content_dir` into `output_dir`.
///
/// Each article is written to `output_dir/<slug>.html`, or to its configured
/// `output` name. Media is synced from `content_dir/images` to
/// `output_dir/images` afterwards.
pub fn build(
    content_dir: &Path,
    output_dir: &Path,
    config: &SiteConfig,
    generated_at: DateTime<FixedOffset>,
) -> Result<BuildReport, BuildError> {
    let articles = discover_articles(content_dir, &config.exclude)?;
    info!("building {} articles from {}", articles.len(), content_dir.display());
    fs::create_dir_all(output_dir)?;

    let results: Vec<Result<RenderOutcome, DocumentFailure>> = articles
        .par_iter()
        .map(|source| {
            let file_name = source
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let options = config.options_for(&file_name);
            let dest = output_dir.join(page_file_name(source, options.output.as_deref()));
            render::render_document(source, Some(&dest), &options, generated_at).map_err(|e| {
                warn!(source = %source.display(), error = %e, "render failed");
                DocumentFailure {
                    source: source.clone(),
                    message: e.to_string(),
                }
            })
        })
        .collect();

    let mut report = BuildReport::default();
    for result in results {
        match result {
            Ok(outcome) => report.rendered.push(outcome),
            Err(failure) => report.failed.push(failure),
        }
    }

    report.media = media::copy_media(
        &content_dir.join(media::MEDIA_DIR),
        &output_dir.join(media::MEDIA_DIR),
    );

    info!(
        rendered = report.rendered.len(),
        failed = report.failed.len(),
        "build finished"
    );
    Ok(report)
}

fn page_file_name(source: &Path, configured: Option<&str>) -> String {
    match configured {
        Some(name) => name.to_string(),
        None => format!("{}.html", naming::slug_from_path(source)),
    }
}

/// Remove generated `*.html` pages directly under `output_dir`.
///
/// Returns how many files were removed. A missing directory removes nothing.
/// Subdirectories (including `images/`) are left alone.
pub fn clean_output(output_dir: &Path) -> io::Result<usize> {
    if !output_dir.is_dir() {
        return Ok(0);
    }
    let mut removed = 0;
    for entry in fs::read_dir(output_dir)? {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type()?.is_file() && path.extension().is_some_and(|ext| ext == "html") {
            fs::remove_file(&path)?;
            removed += 1;
        }
    }
    info!("removed {removed} pages from {}", output_dir.display());
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ArticleOverrides, load_config};
    use crate::test_helpers::{find_outcome, fixed_time, setup_fixtures};
    use tempfile::TempDir;

    fn default_exclude() -> Vec<String> {
        SiteConfig::default().exclude
    }

    fn names(paths: &[PathBuf]) -> Vec<String> {
        paths
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect()
    }

    // =========================================================================
    // Discovery
    // =========================================================================

    #[test]
    fn discovers_fixture_articles() {
        let tmp = setup_fixtures();
        let found = discover_articles(tmp.path(), &default_exclude()).unwrap();
        assert_eq!(
            names(&found),
            vec!["introducao-ao-kafka.md", "parte1-fundamentos.md", "parte2-java.md"]
        );
    }

    #[test]
    fn discovery_is_top_level_only() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("a.md"), "# A").unwrap();
        fs::create_dir_all(tmp.path().join("drafts")).unwrap();
        fs::write(tmp.path().join("drafts/b.md"), "# B").unwrap();
        fs::write(tmp.path().join("notes.txt"), "x").unwrap();
        let found = discover_articles(tmp.path(), &[]).unwrap();
        assert_eq!(names(&found), vec!["a.md"]);
    }

    #[test]
    fn discovery_honours_exclude_list() {
        let tmp = TempDir::new().unwrap();
        for name in ["README.md", "TODO.md", "keep.md"] {
            fs::write(tmp.path().join(name), "x").unwrap();
        }
        let found = discover_articles(tmp.path(), &default_exclude()).unwrap();
        assert_eq!(names(&found), vec!["keep.md"]);
    }

    #[test]
    fn discovery_requires_directory() {
        let tmp = TempDir::new().unwrap();
        let err = discover_articles(&tmp.path().join("missing"), &[]).unwrap_err();
        assert!(matches!(err, BuildError::MissingContent(_)));
    }

    // =========================================================================
    // Build
    // =========================================================================

    #[test]
    fn builds_fixture_site() {
        let tmp = setup_fixtures();
        let out = TempDir::new().unwrap();
        let config = load_config(tmp.path()).unwrap();

        let report = build(tmp.path(), out.path(), &config, fixed_time()).unwrap();

        assert!(report.is_success());
        assert_eq!(report.rendered.len(), 3);
        assert!(out.path().join("parte1-fundamentos.html").is_file());
        assert!(out.path().join("parte2-java.html").is_file());
        assert!(!out.path().join("README.html").exists());
        assert_eq!(report.media.copied, 2);
        assert!(out.path().join("images/kafka-topology.svg").is_file());
    }

    #[test]
    fn build_uses_article_overrides() {
        let tmp = setup_fixtures();
        let out = TempDir::new().unwrap();
        let config = load_config(tmp.path()).unwrap();

        let report = build(tmp.path(), out.path(), &config, fixed_time()).unwrap();
        let intro = find_outcome(&report, "introducao-ao-kafka");
        assert_eq!(intro.output, out.path().join("intro.html"));
        assert_eq!(intro.metadata.title, "Introduction to Kafka");
    }

    #[test]
    fn rebuild_skips_unchanged_media() {
        let tmp = setup_fixtures();
        let out = TempDir::new().unwrap();
        let config = load_config(tmp.path()).unwrap();
        build(tmp.path(), out.path(), &config, fixed_time()).unwrap();
        let report = build(tmp.path(), out.path(), &config, fixed_time()).unwrap();
        assert_eq!(report.media.copied, 0);
        assert_eq!(report.media.skipped, 2);
    }

    #[test]
    fn failure_is_recorded_and_others_continue() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("good.md"), "# Good\n").unwrap();
        fs::write(tmp.path().join("bad.md"), b"\xff\xfe").unwrap();
        let out = tmp.path().join("out");

        let report = build(tmp.path(), &out, &SiteConfig::default(), fixed_time()).unwrap();

        assert!(!report.is_success());
        assert_eq!(report.rendered.len(), 1);
        assert_eq!(report.failed.len(), 1);
        assert!(report.failed[0].source.ends_with("bad.md"));
        assert!(report.failed[0].message.contains("UTF-8"));
        assert!(out.join("good.html").is_file());
        assert!(!out.join("bad.html").exists());
    }

    #[test]
    fn configured_output_name_in_output_dir() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("long-name.md"), "# X\n").unwrap();
        let mut config = SiteConfig::default();
        config.articles.insert(
            "long-name.md".to_string(),
            ArticleOverrides {
                output: Some("short.html".to_string()),
                ..Default::default()
            },
        );
        let out = tmp.path().join("out");
        build(tmp.path(), &out, &config, fixed_time()).unwrap();
        assert!(out.join("short.html").is_file());
        assert!(!out.join("long-name.html").exists());
    }

    // =========================================================================
    // Clean
    // =========================================================================

    #[test]
    fn clean_removes_only_top_level_pages() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("a.html"), "").unwrap();
        fs::write(tmp.path().join("b.html"), "").unwrap();
        fs::write(tmp.path().join("notes.txt"), "").unwrap();
        fs::create_dir_all(tmp.path().join("images")).unwrap();
        fs::write(tmp.path().join("images/keep.html"), "").unwrap();

        assert_eq!(clean_output(tmp.path()).unwrap(), 2);
        assert!(!tmp.path().join("a.html").exists());
        assert!(tmp.path().join("notes.txt").exists());
        assert!(tmp.path().join("images/keep.html").exists());
    }

    #[test]
    fn clean_missing_directory_is_noop() {
        let tmp = TempDir::new().unwrap();
        assert_eq!(clean_output(&tmp.path().join("nope")).unwrap(), 0);
    }
}
