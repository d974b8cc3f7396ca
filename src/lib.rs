//! # seo-press
//!
//! Renders Markdown articles into standalone, search-engine-optimized HTML
//! pages. Each page carries its own metadata (description, keywords, Open
//! Graph, Twitter Card, Schema.org JSON-LD), inline styles, and a small
//! script, so it can be published by copying one file plus its images.
//!
//! # Architecture: One Article, One Pass
//!
//! Every article goes through the same pipeline, with no intermediate files:
//!
//! ```text
//! 1. Read        kafka.md      →  UTF-8 text
//! 2. Extract     text          →  ArticleMetadata   (title, description, keywords, author)
//! 3. Convert     text          →  HTML fragment     ([TOC] expanded, extensions on)
//! 4. Post-process fragment     →  RenderedBody      (media paths, alt, links, heading ids)
//! 5. Assemble    everything    →  kafka.html        (head, JSON-LD, styles, body)
//! 6. Media       images/       →  images/           (copy stale files only)
//! ```
//!
//! Metadata is extracted from the raw Markdown rather than the rendered HTML,
//! which keeps extraction a pure function of the source text that unit tests
//! can exercise without touching the filesystem.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`metadata`] | Heuristic title, description, keyword and author extraction |
//! | [`convert`] | Markdown → HTML with tables, footnotes, fenced code and `[TOC]` |
//! | [`postprocess`] | Fragment rewriting: media paths, image alt/lazy, external links, anchor ids |
//! | [`structured_data`] | Canonical URLs and the Schema.org `Article` JSON-LD graph |
//! | [`page`] | Full document assembly with Maud |
//! | [`render`] | Single-article orchestration and atomic output writes |
//! | [`media`] | Incremental `images/` directory copying |
//! | [`batch`] | Whole-directory builds on the rayon pool, and output cleanup |
//! | [`config`] | Layered `config.toml` loading, validation and per-article overrides |
//! | [`naming`] | Slugs and titles derived from file names |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Self-Contained Pages
//!
//! Styles and the page script are compiled into the binary with
//! `include_str!` and inlined into every page. Only the Inter font and the
//! highlight.js theme come from a CDN. A rendered article has no sibling
//! asset files beyond its own `images/` directory.
//!
//! ## Maud Over Template Engines
//!
//! The page shell is a [Maud](https://maud.lambda.xyz/) template. Every
//! interpolated value (titles, descriptions, author names) is escaped by the
//! macro, so article text containing `<`, `&` or quotes can never break the
//! document head. Only the converted article body and the JSON-LD block are
//! inserted pre-escaped.
//!
//! ## Config Instead of Driver Scripts
//!
//! Per-article settings (a title that reads better than the first heading, a
//! hand-written description, a short output name) live in the site
//! `config.toml` under `[articles."<file>.md"]`:
//!
//! ```text
//! stock defaults → content/config.toml → CLI flags → [articles."x.md"]
//! ```
//!
//! ## Deterministic Output
//!
//! The generation timestamp is an argument rather than a clock read deep in
//! the pipeline, keywords keep first-occurrence order, and heading anchors are
//! assigned in document order. The same source and timestamp always produce
//! the same bytes.

pub mod batch;
pub mod config;
pub mod convert;
pub mod media;
pub mod metadata;
pub mod naming;
pub mod output;
pub mod page;
pub mod postprocess;
pub mod render;
pub mod structured_data;

#[cfg(test)]
pub(crate) mod test_helpers;
