//! Page assembly.
//!
//! Wraps a post-processed article body in the fixed page template: SEO meta
//! tags, Open Graph and Twitter Card tags, the JSON-LD block, inline styles,
//! and the scripts that run after the body.
//!
//! ## Head
//!
//! | Group | Tags |
//! |-------|------|
//! | SEO | `description`, `keywords`, `author`, `robots`, `language`, `revisit-after`, `distribution`, `rating` |
//! | Open Graph | `og:title`, `og:description`, `og:type`, `og:url`\*, `og:site_name`, `og:locale`, `og:image`\*, image size, `article:*` (author, times, section, tags) |
//! | Twitter | `twitter:card`, `twitter:title`, `twitter:description`, `twitter:image`\*, `twitter:creator` |
//! | Theme | `theme-color`, `msapplication-navbutton-color`, `apple-mobile-web-app-status-bar-style` |
//! | Links | `canonical`\*, Inter font, highlight.js theme |
//!
//! \* emitted only when a base URL is configured.
//!
//! ## CSS and JavaScript
//!
//! Embedded at compile time:
//! - `static/article.css`: page styles, accent colour injected from config
//! - `static/article.js`: smooth anchor scrolling and the back-to-top button
//!
//! highlight.js is loaded from cdnjs after the body and initialised before
//! `article.js` runs.

use crate::config::RenderOptions;
use crate::metadata::ArticleMetadata;
use crate::postprocess::RenderedBody;
use crate::structured_data::ArticleUrls;
use maud::{DOCTYPE, Markup, PreEscaped, html};

const CSS_STATIC: &str = include_str!("../static/article.css");
const JS: &str = include_str!("../static/article.js");

const SCHEMA_ARTICLE: &str = "https://schema.org/Article";
const FONT_CSS: &str =
    "https://fonts.googleapis.com/css2?family=Inter:wght@300;400;500;600;700&display=swap";
const HIGHLIGHT_CSS: &str =
    "https://cdnjs.cloudflare.com/ajax/libs/highlight.js/11.9.0/styles/github-dark.min.css";
const HIGHLIGHT_JS: &str =
    "https://cdnjs.cloudflare.com/ajax/libs/highlight.js/11.9.0/highlight.min.js";
const HIGHLIGHT_INIT: &str = "hljs.highlightAll();";

/// Second stop of the accent gradients.
const ACCENT_END: &str = "#764ba2";

/// Everything the template needs for one article.
pub struct PageContext<'a> {
    pub meta: &'a ArticleMetadata,
    pub options: &'a RenderOptions,
    pub urls: &'a ArticleUrls,
    pub json_ld: &'a str,
    pub body: &'a RenderedBody,
}

/// Render the full page document.
pub fn render_page(ctx: &PageContext) -> Markup {
    let css = format!("{}\n\n{}", theme_css(&ctx.options.theme_color), CSS_STATIC);
    html! {
        (DOCTYPE)
        html lang=(ctx.options.language) itemscope itemtype=(SCHEMA_ARTICLE) {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                meta http-equiv="X-UA-Compatible" content="IE=edge";
                title { (ctx.meta.title) }
                (seo_tags(ctx))
                (open_graph_tags(ctx))
                (twitter_tags(ctx))
                (theme_tags(&ctx.options.theme_color))
                @if let Some(canonical) = &ctx.urls.canonical {
                    link rel="canonical" href=(canonical);
                }
                link rel="preconnect" href="https://fonts.googleapis.com";
                link rel="stylesheet" href=(FONT_CSS);
                link rel="stylesheet" href=(HIGHLIGHT_CSS);
                script type="application/ld+json" { (PreEscaped(ctx.json_ld)) }
                style { (PreEscaped(css)) }
            }
            body {
                main.container role="main" {
                    article itemscope itemtype=(SCHEMA_ARTICLE) {
                        meta itemprop="author" content=(ctx.meta.author);
                        meta itemprop="datePublished" content=(ctx.meta.published_iso());
                        div itemprop="articleBody" {
                            (PreEscaped(ctx.body.as_str()))
                        }
                    }
                }
                script src=(HIGHLIGHT_JS) {}
                script { (PreEscaped(HIGHLIGHT_INIT)) }
                script { (PreEscaped(JS)) }
            }
        }
    }
}

/// CSS custom properties for the configured accent colour.
pub fn theme_css(color: &str) -> String {
    format!(":root {{\n    --accent: {color};\n    --accent-end: {ACCENT_END};\n}}")
}

fn seo_tags(ctx: &PageContext) -> Markup {
    html! {
        meta name="description" content=(ctx.meta.description);
        meta name="keywords" content=(ctx.meta.keywords_csv());
        meta name="author" content=(ctx.meta.author);
        meta name="robots" content="index, follow";
        meta name="language" content=(ctx.options.language);
        meta name="revisit-after" content="7 days";
        meta name="distribution" content="global";
        meta name="rating" content="general";
    }
}

fn open_graph_tags(ctx: &PageContext) -> Markup {
    let site_name = ctx
        .options
        .site_name
        .as_deref()
        .unwrap_or(&ctx.meta.author);
    html! {
        meta property="og:title" content=(ctx.meta.title);
        meta property="og:description" content=(ctx.meta.description);
        meta property="og:type" content="article";
        @if let Some(canonical) = &ctx.urls.canonical {
            meta property="og:url" content=(canonical);
        }
        meta property="og:site_name" content=(site_name);
        meta property="og:locale" content=(og_locale(&ctx.options.language));
        @if let Some(image) = &ctx.urls.image {
            meta property="og:image" content=(image);
            meta property="og:image:width" content=(ctx.options.image_width);
            meta property="og:image:height" content=(ctx.options.image_height);
        }
        meta property="article:author" content=(ctx.meta.author);
        meta property="article:published_time" content=(ctx.meta.published_iso());
        meta property="article:modified_time" content=(ctx.meta.modified_iso());
        meta property="article:section" content=(ctx.options.section);
        @for keyword in &ctx.meta.keywords {
            meta property="article:tag" content=(keyword);
        }
    }
}

fn twitter_tags(ctx: &PageContext) -> Markup {
    html! {
        meta name="twitter:card" content="summary_large_image";
        meta name="twitter:title" content=(ctx.meta.title);
        meta name="twitter:description" content=(ctx.meta.description);
        @if let Some(image) = &ctx.urls.image {
            meta name="twitter:image" content=(image);
        }
        meta name="twitter:creator"
            content=(twitter_creator(ctx.options.twitter_handle.as_deref(), &ctx.meta.author));
    }
}

fn theme_tags(color: &str) -> Markup {
    html! {
        meta name="theme-color" content=(color);
        meta name="msapplication-navbutton-color" content=(color);
        meta name="apple-mobile-web-app-status-bar-style" content=(color);
    }
}

/// Open Graph locale: `en-US` → `en_US`.
pub fn og_locale(language: &str) -> String {
    language.replace('-', "_")
}

/// The configured handle (with a leading `@`), or `@` followed by the author
/// name without spaces, lowercased.
pub fn twitter_creator(handle: Option<&str>, author: &str) -> String {
    match handle.map(str::trim).filter(|h| !h.is_empty()) {
        Some(handle) => format!("@{}", handle.trim_start_matches('@')),
        None => format!("@{}", author.replace(' ', "").to_lowercase()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata;
    use crate::test_helpers::fixed_time;
    use std::path::Path;

    fn render(content: &str, options: &RenderOptions) -> String {
        let meta = metadata::extract(content, Path::new("kafka.md"), "Jane Doe", fixed_time());
        let urls = ArticleUrls::new(&meta, options);
        let body = RenderedBody::new("<p>BODY MARKER</p>");
        render_page(&PageContext {
            meta: &meta,
            options,
            urls: &urls,
            json_ld: "{\"@type\": \"Article\"}",
            body: &body,
        })
        .into_string()
    }

    fn with_base(base_url: &str) -> RenderOptions {
        RenderOptions {
            base_url: base_url.to_string(),
            ..RenderOptions::default()
        }
    }

    #[test]
    fn document_shell() {
        let html = render("# Kafka\n", &with_base(""));
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains(
            r#"<html lang="en-US" itemscope itemtype="https://schema.org/Article">"#
        ));
        assert!(html.contains("<title>Kafka</title>"));
        assert!(html.contains(r#"<main class="container" role="main">"#));
    }

    #[test]
    fn body_embedded_verbatim() {
        let html = render("# Kafka\n", &with_base(""));
        assert!(html.contains(r#"<div itemprop="articleBody"><p>BODY MARKER</p></div>"#));
    }

    #[test]
    fn json_ld_embedded_verbatim() {
        let html = render("# Kafka\n", &with_base(""));
        assert!(html.contains(
            r#"<script type="application/ld+json">{"@type": "Article"}</script>"#
        ));
    }

    #[test]
    fn highlighter_initialised_after_body() {
        let html = render("# Kafka\n", &with_base(""));
        let body = html.find("BODY MARKER").unwrap();
        let script = html.find(HIGHLIGHT_JS).unwrap();
        let init = html.find(HIGHLIGHT_INIT).unwrap();
        assert!(body < script && script < init);
        assert!(html.contains(HIGHLIGHT_CSS));
        assert!(html.contains("family=Inter"));
    }

    #[test]
    fn seo_tags_present() {
        let html = render("# Kafka\n\nStreams explained.\n\n## Topics\n", &with_base(""));
        assert!(html.contains(r#"<meta name="description" content="Streams explained.">"#));
        assert!(html.contains(r#"<meta name="keywords" content="topics, kafka">"#));
        assert!(html.contains(r#"<meta name="author" content="Jane Doe">"#));
        assert!(html.contains(r#"<meta name="robots" content="index, follow">"#));
        assert!(html.contains(r#"<meta name="language" content="en-US">"#));
    }

    #[test]
    fn open_graph_and_twitter_tags() {
        let html = render("# Kafka\n", &with_base("https://mine.dev"));
        assert!(html.contains(r#"<meta property="og:title" content="Kafka">"#));
        assert!(html.contains(r#"<meta property="og:type" content="article">"#));
        assert!(html.contains(r#"<meta property="og:url" content="https://mine.dev/kafka.html">"#));
        assert!(html.contains(r#"<meta property="og:site_name" content="Jane Doe">"#));
        assert!(html.contains(r#"<meta property="og:locale" content="en_US">"#));
        assert!(html.contains(r#"<meta property="og:image" content="https://mine.dev/img/kafka.png">"#));
        assert!(html.contains(r#"<meta property="og:image:width" content="1200">"#));
        assert!(html.contains(r#"<meta property="og:image:height" content="630">"#));
        assert!(html.contains(
            r#"<meta property="article:published_time" content="2024-01-15T10:30:00+00:00">"#
        ));
        assert!(html.contains(r#"<meta name="twitter:card" content="summary_large_image">"#));
        assert!(html.contains(r#"<meta name="twitter:creator" content="@janedoe">"#));
        assert!(html.contains(r#"<link rel="canonical" href="https://mine.dev/kafka.html">"#));
    }

    #[test]
    fn url_tags_omitted_without_base() {
        let html = render("# Kafka\n", &with_base(""));
        assert!(!html.contains("og:url"));
        assert!(!html.contains("og:image"));
        assert!(!html.contains("twitter:image"));
        assert!(!html.contains(r#"rel="canonical""#));
    }

    #[test]
    fn theme_colour_applied() {
        let options = RenderOptions {
            theme_color: "#ff6600".to_string(),
            ..RenderOptions::default()
        };
        let html = render("# Kafka\n", &options);
        assert!(html.contains(r##"<meta name="theme-color" content="#ff6600">"##));
        assert!(html.contains(r##"<meta name="msapplication-navbutton-color" content="#ff6600">"##));
        assert!(html.contains("--accent: #ff6600;"));
    }

    #[test]
    fn configured_site_name_and_handle() {
        let options = RenderOptions {
            site_name: Some("Streams Weekly".to_string()),
            twitter_handle: Some("streams".to_string()),
            ..RenderOptions::default()
        };
        let html = render("# Kafka\n", &options);
        assert!(html.contains(r#"<meta property="og:site_name" content="Streams Weekly">"#));
        assert!(html.contains(r#"<meta name="twitter:creator" content="@streams">"#));
    }

    #[test]
    fn attribute_values_escaped() {
        let html = render("# Tom & \"Jerry\"\n", &with_base(""));
        assert!(html.contains(r#"<meta property="og:title" content="Tom &amp; &quot;Jerry&quot;">"#));
        assert!(html.contains("<title>Tom &amp; &quot;Jerry&quot;</title>"));
    }

    #[test]
    fn twitter_creator_rules() {
        assert_eq!(twitter_creator(None, "Christian V. Mulato"), "@christianv.mulato");
        assert_eq!(twitter_creator(Some("@handle"), "x"), "@handle");
        assert_eq!(twitter_creator(Some("  "), "Ann Lee"), "@annlee");
    }

    #[test]
    fn og_locale_uses_underscore() {
        assert_eq!(og_locale("pt-BR"), "pt_BR");
    }
}
