//! Post-processing passes over converted article HTML.
//!
//! [`RenderedBody`] wraps the HTML fragment produced by [`crate::convert`] and
//! rewrites it in place. Each pass is a regex scan over opening tags, so raw
//! HTML embedded in the Markdown is covered the same way as generated markup.
//! Text inside code blocks is entity-escaped by the converter and never
//! matches a tag pattern.
//!
//! ## Passes
//!
//! | Pass | Target | Effect |
//! |------|--------|--------|
//! | [`rewrite_media_paths`](RenderedBody::rewrite_media_paths) | `src="…"` | legacy image prefixes → `images/` |
//! | [`annotate_images`](RenderedBody::annotate_images) | `<img>` | generated `alt` when missing or empty, `loading="lazy"` |
//! | [`protect_external_links`](RenderedBody::protect_external_links) | `<a href="http…">` | `rel="noopener noreferrer"` + `target="_blank"` off-site |
//! | [`assign_heading_ids`](RenderedBody::assign_heading_ids) | `<h1>`…`<h6>` | `id` derived from the heading text unless one exists |

use regex::{Captures, Regex};
use std::collections::HashSet;
use std::sync::LazyLock;

static MEDIA_PREFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)(\bsrc\s*=\s*["']?)(?:\.\./articles_md/images/|articles_md/images/|/assets/images/|assets/images/)"#,
    )
    .unwrap()
});

static OPEN_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[A-Za-z][^<>]*>").unwrap());

static IMG_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<img\b([^>]*?)(/?)>").unwrap());

static A_TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<a\b([^>]*?)(/?)>").unwrap());

static HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<(h[1-6])\b([^>]*)>(.*?)</h[1-6]\s*>").unwrap());

static ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([^\s"'>/=]+)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+)))?"#).unwrap()
});

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());

static FOOTNOTE_REF_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<sup\b[^>]*class="footnote-reference"[^>]*>.*?</sup>"#).unwrap()
});

/// Article HTML fragment (body only, no document shell).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedBody {
    html: String,
}

impl RenderedBody {
    pub fn new(html: impl Into<String>) -> Self {
        Self { html: html.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.html
    }

    pub fn into_html(self) -> String {
        self.html
    }

    /// Run every pass in order.
    pub fn process(&mut self, title: &str, base_url: &str) {
        self.rewrite_media_paths();
        self.annotate_images(title);
        self.protect_external_links(base_url);
        self.assign_heading_ids();
    }

    /// Normalize legacy article-image locations (`articles_md/images/`,
    /// `../articles_md/images/`, `/assets/images/`, `assets/images/`) to the
    /// flat `images/` directory that sits next to the output page.
    pub fn rewrite_media_paths(&mut self) {
        self.html = OPEN_TAG_RE
            .replace_all(&self.html, |caps: &Captures| {
                MEDIA_PREFIX_RE.replace_all(&caps[0], "${1}images/").into_owned()
            })
            .into_owned();
    }

    /// Give every image a lazy-loading hint, and an `alt` text derived from the
    /// article title when it has none (or an empty one).
    pub fn annotate_images(&mut self, title: &str) {
        let alt = escape_attr(&format!("Image related to {title}"));
        self.html = IMG_TAG_RE
            .replace_all(&self.html, |caps: &Captures| {
                let mut tag = StartTag::parse("img", &caps[1], !caps[2].is_empty());
                if tag.get("alt").is_none_or(|v| v.trim().is_empty()) {
                    tag.set("alt", alt.clone());
                }
                tag.set("loading", "lazy".to_string());
                tag.render()
            })
            .into_owned();
    }

    /// Mark absolute links that leave the site so they open in a new context
    /// without leaking the opener or referrer.
    ///
    /// A link stays untouched when its target is `base_url` itself or lies
    /// beneath it. With an empty `base_url` every absolute link is external.
    pub fn protect_external_links(&mut self, base_url: &str) {
        let base_url = base_url.trim_end_matches('/');
        self.html = A_TAG_RE
            .replace_all(&self.html, |caps: &Captures| {
                let mut tag = StartTag::parse("a", &caps[1], !caps[2].is_empty());
                let external = tag
                    .get("href")
                    .is_some_and(|href| is_external(href.trim(), base_url));
                if !external {
                    return caps[0].to_string();
                }
                tag.set("rel", "noopener noreferrer".to_string());
                tag.set("target", "_blank".to_string());
                tag.render()
            })
            .into_owned();
    }

    /// Give every heading without an `id` one derived from its text with
    /// [`anchor_id`]. Repeated ids get a numeric suffix (`-1`, `-2`, ...).
    /// Headings whose text yields an empty id are left alone.
    pub fn assign_heading_ids(&mut self) {
        let mut anchors = AnchorIds::default();
        self.html = HEADING_RE
            .replace_all(&self.html, |caps: &Captures| {
                match resolve_heading_id(&mut anchors, caps) {
                    HeadingId::Assigned(id) => {
                        let (name, attrs, inner) = (&caps[1], &caps[2], &caps[3]);
                        format!("<{name} id=\"{id}\"{attrs}>{inner}</{name}>")
                    }
                    HeadingId::Kept(_) | HeadingId::Unnamed => caps[0].to_string(),
                }
            })
            .into_owned();
    }
}

/// A heading of a rendered fragment with the anchor the heading-id pass
/// keeps or assigns for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadingAnchor {
    /// 1 for `<h1>` through 6 for `<h6>`.
    pub level: usize,
    pub id: String,
    /// Visible text without footnote markers.
    pub text: String,
}

/// Headings of `html` in document order, with the same ids
/// [`RenderedBody::assign_heading_ids`] gives them. Headings left without an
/// id are skipped.
pub fn heading_anchors(html: &str) -> Vec<HeadingAnchor> {
    let mut anchors = AnchorIds::default();
    HEADING_RE
        .captures_iter(html)
        .filter_map(|caps| {
            let id = match resolve_heading_id(&mut anchors, &caps) {
                HeadingId::Kept(id) | HeadingId::Assigned(id) => id,
                HeadingId::Unnamed => return None,
            };
            let visible = FOOTNOTE_REF_RE.replace_all(&caps[3], "");
            Some(HeadingAnchor {
                level: caps[1][1..].parse().unwrap_or(1),
                id,
                text: plain_text(&visible).trim().to_string(),
            })
        })
        .collect()
}

enum HeadingId {
    Kept(String),
    Assigned(String),
    Unnamed,
}

fn resolve_heading_id(anchors: &mut AnchorIds, caps: &Captures) -> HeadingId {
    let tag = StartTag::parse(&caps[1], &caps[2], false);
    if let Some(existing) = tag.get("id") {
        anchors.reserve(existing);
        return HeadingId::Kept(existing.to_string());
    }
    match anchors.next(&plain_text(&caps[3])) {
        Some(id) => HeadingId::Assigned(id),
        None => HeadingId::Unnamed,
    }
}

/// Text content of an HTML fragment: tags removed, entities decoded.
fn plain_text(html: &str) -> String {
    decode_entities(&TAG_RE.replace_all(html, ""))
}

fn is_external(href: &str, base_url: &str) -> bool {
    let lower = href.to_ascii_lowercase();
    if !(lower.starts_with("http://") || lower.starts_with("https://")) {
        return false;
    }
    if base_url.is_empty() {
        return true;
    }
    match href.strip_prefix(base_url) {
        Some(rest) => !(rest.is_empty() || rest.starts_with(['/', '?', '#'])),
        None => true,
    }
}

/// Heading anchor for `text`: lowercased, characters outside `[a-z0-9]`,
/// whitespace and `-` removed, whitespace runs collapsed to one hyphen, edge
/// hyphens trimmed.
///
/// `"Hello, World!"` → `"hello-world"`.
pub fn anchor_id(text: &str) -> String {
    let kept: String = text
        .to_lowercase()
        .chars()
        .filter(|c| {
            c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace() || *c == '-'
        })
        .collect();
    kept.split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .trim_matches('-')
        .to_string()
}

/// Unique heading anchors for one document, assigned in document order.
///
/// Shared by the heading-id pass and the table of contents so both produce
/// the same ids for the same headings.
#[derive(Debug, Default)]
pub struct AnchorIds {
    used: HashSet<String>,
}

impl AnchorIds {
    /// Next unique anchor for a heading with `text`, or `None` if the text
    /// has no usable characters.
    pub fn next(&mut self, text: &str) -> Option<String> {
        let base = anchor_id(text);
        if base.is_empty() {
            return None;
        }
        let mut candidate = base.clone();
        let mut n = 0;
        while self.used.contains(&candidate) {
            n += 1;
            candidate = format!("{base}-{n}");
        }
        self.used.insert(candidate.clone());
        Some(candidate)
    }

    /// Record an explicit id so generated ones never collide with it.
    pub fn reserve(&mut self, id: &str) {
        self.used.insert(id.to_string());
    }
}

/// Opening tag with its attributes in source order.
///
/// Attribute values are kept exactly as written (still entity-encoded).
struct StartTag {
    name: String,
    attrs: Vec<(String, Option<String>)>,
    self_closing: bool,
}

impl StartTag {
    fn parse(name: &str, attrs: &str, self_closing: bool) -> Self {
        let attrs = ATTR_RE
            .captures_iter(attrs)
            .map(|caps| {
                let value = caps
                    .get(2)
                    .or_else(|| caps.get(3))
                    .or_else(|| caps.get(4))
                    .map(|m| m.as_str().to_string());
                (caps[1].to_string(), value)
            })
            .collect();
        Self {
            name: name.to_string(),
            attrs,
            self_closing,
        }
    }

    fn get(&self, key: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_deref().unwrap_or(""))
    }

    /// Set `key` to an already-escaped `value`, replacing any existing value.
    fn set(&mut self, key: &str, value: String) {
        match self.attrs.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(key)) {
            Some((_, v)) => *v = Some(value),
            None => self.attrs.push((key.to_string(), Some(value))),
        }
    }

    fn render(&self) -> String {
        let mut out = format!("<{}", self.name);
        for (key, value) in &self.attrs {
            out.push(' ');
            out.push_str(key);
            if let Some(value) = value {
                out.push_str("=\"");
                out.push_str(&value.replace('"', "&quot;"));
                out.push('"');
            }
        }
        if self.self_closing {
            out.push_str(" /");
        }
        out.push('>');
        out
    }
}

fn escape_attr(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn decode_entities(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}
