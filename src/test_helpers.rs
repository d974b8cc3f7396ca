//! Shared test utilities for the seo-press test suite.
//!
//! Provides fixture setup, a pinned generation timestamp, and lookup helpers
//! over build results.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = setup_fixtures();
//! let config = load_config(tmp.path()).unwrap();
//! let report = build(tmp.path(), &tmp.path().join("out"), &config, fixed_time()).unwrap();
//!
//! let intro = find_outcome(&report, "introducao-ao-kafka");
//! assert_eq!(intro.metadata.title, "Introduction to Kafka");
//! ```

use chrono::{DateTime, FixedOffset};
use std::path::Path;
use tempfile::TempDir;

use crate::batch::BuildReport;
use crate::render::RenderOutcome;

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/content/` to a temp directory and return it.
///
/// Tests get an isolated copy they can mutate without affecting other tests
/// or the source fixtures.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/content");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    tmp
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            std::fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            std::fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

/// Generation timestamp used wherever output must be reproducible:
/// 2024-01-15T10:30:00+00:00.
pub fn fixed_time() -> DateTime<FixedOffset> {
    DateTime::parse_from_rfc3339("2024-01-15T10:30:00+00:00").unwrap()
}

// =========================================================================
// Build report lookups
// =========================================================================

/// Find a rendered article by slug. Panics if not found.
pub fn find_outcome<'a>(report: &'a BuildReport, slug: &str) -> &'a RenderOutcome {
    report
        .rendered
        .iter()
        .find(|o| o.metadata.slug == slug)
        .unwrap_or_else(|| {
            let slugs: Vec<&str> = report
                .rendered
                .iter()
                .map(|o| o.metadata.slug.as_str())
                .collect();
            panic!("article '{slug}' not found. Available: {slugs:?}")
        })
}
