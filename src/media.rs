//! Article media copying.
//!
//! Images live in an `images/` directory next to the Markdown sources and are
//! copied to an `images/` directory next to the rendered pages:
//!
//! ```text
//! content/                     output/
//! ├── kafka.md          ──►    ├── kafka.html
//! └── images/                  └── images/
//!     ├── topology.png  ──►        ├── topology.png
//!     └── lag.svg       ──►        └── lag.svg
//! ```
//!
//! A file is copied only when the destination is missing or strictly older
//! than the source. The copy takes the source's modification time, so an
//! unchanged tree copies nothing on the next run.
//!
//! Only regular files directly under the source directory are copied. A
//! failing file is logged and counted; the remaining files are still copied.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Name of the media directory on both sides.
pub const MEDIA_DIR: &str = "images";

/// Per-file outcome counts of one copy run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MediaReport {
    pub copied: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl MediaReport {
    pub fn total(&self) -> usize {
        self.copied + self.skipped + self.failed
    }
}

/// The `images/` directory next to `path`'s parent directory entry.
///
/// `content/kafka.md` → `content/images`.
pub fn media_dir_for(path: &Path) -> PathBuf {
    path.parent()
        .unwrap_or_else(|| Path::new(""))
        .join(MEDIA_DIR)
}

/// Copy stale or missing files from `source_dir` to `dest_dir`.
///
/// A missing `source_dir` yields an empty report. When both paths name the
/// same directory nothing is copied.
pub fn copy_media(source_dir: &Path, dest_dir: &Path) -> MediaReport {
    let mut report = MediaReport::default();

    if !source_dir.is_dir() {
        debug!(dir = %source_dir.display(), "no media directory");
        return report;
    }
    if same_dir(source_dir, dest_dir) {
        debug!(dir = %source_dir.display(), "media already in place");
        return report;
    }

    let files = match list_files(source_dir) {
        Ok(files) => files,
        Err(e) => {
            warn!(dir = %source_dir.display(), error = %e, "cannot read media directory");
            return report;
        }
    };
    if files.is_empty() {
        return report;
    }

    if let Err(e) = fs::create_dir_all(dest_dir) {
        warn!(dir = %dest_dir.display(), error = %e, "cannot create media directory");
        report.failed = files.len();
        return report;
    }

    for src in files {
        let Some(name) = src.file_name() else {
            continue;
        };
        let dst = dest_dir.join(name);
        match copy_if_stale(&src, &dst) {
            Ok(true) => {
                debug!(file = %dst.display(), "copied");
                report.copied += 1;
            }
            Ok(false) => report.skipped += 1,
            Err(e) => {
                warn!(file = %src.display(), error = %e, "media copy failed");
                report.failed += 1;
            }
        }
    }

    info!(
        copied = report.copied,
        skipped = report.skipped,
        failed = report.failed,
        "media synced to {}",
        dest_dir.display()
    );
    report
}

/// Regular files directly under `dir`, sorted by name. Symlinks count when
/// their target is a regular file.
fn list_files(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn same_dir(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

/// Returns `Ok(true)` if the file was copied, `Ok(false)` if it was current.
fn copy_if_stale(src: &Path, dst: &Path) -> io::Result<bool> {
    let src_modified = fs::metadata(src)?.modified()?;
    if let Ok(dst_meta) = fs::metadata(dst) {
        if dst_meta.modified()? >= src_modified {
            return Ok(false);
        }
    }
    fs::copy(src, dst)?;
    fs::File::options()
        .write(true)
        .open(dst)?
        .set_modified(src_modified)?;
    Ok(true)
}
