//! Schema.org `Article` structured data.
//!
//! Builds the JSON-LD object embedded in every page's
//! `<script type="application/ld+json">` block. The graph is a typed serde
//! model serialized with two-space indentation:
//!
//! ```json
//! {
//!   "@context": "https://schema.org",
//!   "@type": "Article",
//!   "headline": "Kafka Fundamentals",
//!   "author": { "@type": "Person", "name": "Jane Doe" },
//!   "publisher": {
//!     "@type": "Organization",
//!     "name": "Jane Doe",
//!     "logo": { "@type": "ImageObject", "url": "https://mine.dev/img/logo.png" }
//!   },
//!   "mainEntityOfPage": { "@type": "WebPage", "@id": "https://mine.dev/kafka.html" },
//!   ...
//! }
//! ```
//!
//! URL-valued fields are omitted when no base URL is configured.

use crate::config::RenderOptions;
use crate::metadata::ArticleMetadata;
use serde::Serialize;

const SCHEMA_CONTEXT: &str = "https://schema.org";

/// Absolute URLs for one article. All `None` when `base_url` is empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArticleUrls {
    /// `{base_url}/{output file name}`
    pub canonical: Option<String>,
    /// Social preview image: the configured one, or `{base_url}/img/{slug}.png`.
    pub image: Option<String>,
    /// `{base_url}/img/logo.png`
    pub logo: Option<String>,
}

impl ArticleUrls {
    pub fn new(meta: &ArticleMetadata, options: &RenderOptions) -> Self {
        let base = options.base_url.trim_end_matches('/');
        let mut urls = if base.is_empty() {
            Self::default()
        } else {
            Self {
                canonical: Some(format!("{base}/{}", output_file_name(meta, options))),
                image: Some(format!("{base}/img/{}.png", meta.slug)),
                logo: Some(format!("{base}/img/logo.png")),
            }
        };

        let configured = options.social_image.as_deref().map(str::trim);
        match configured.filter(|image| !image.is_empty()) {
            Some(image) if is_absolute(image) => urls.image = Some(image.to_string()),
            Some(image) if !base.is_empty() => {
                urls.image = Some(format!("{base}/{}", image.trim_start_matches('/')));
            }
            _ => {}
        }
        urls
    }
}

fn is_absolute(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

/// File name of the rendered page: the configured `output`, or `{slug}.html`.
pub fn output_file_name(meta: &ArticleMetadata, options: &RenderOptions) -> String {
    options
        .output
        .clone()
        .unwrap_or_else(|| format!("{}.html", meta.slug))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ArticleGraph<'a> {
    #[serde(rename = "@context")]
    context: &'static str,
    #[serde(rename = "@type")]
    kind: &'static str,
    headline: &'a str,
    description: &'a str,
    author: Person<'a>,
    date_published: String,
    date_modified: String,
    publisher: Organization<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    main_entity_of_page: Option<WebPage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    image: Option<&'a str>,
    word_count: usize,
    article_section: &'a str,
    in_language: &'a str,
}

#[derive(Debug, Serialize)]
struct Person<'a> {
    #[serde(rename = "@type")]
    kind: &'static str,
    name: &'a str,
}

#[derive(Debug, Serialize)]
struct Organization<'a> {
    #[serde(rename = "@type")]
    kind: &'static str,
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    logo: Option<ImageObject<'a>>,
}

#[derive(Debug, Serialize)]
struct ImageObject<'a> {
    #[serde(rename = "@type")]
    kind: &'static str,
    url: &'a str,
}

#[derive(Debug, Serialize)]
struct WebPage<'a> {
    #[serde(rename = "@type")]
    kind: &'static str,
    #[serde(rename = "@id")]
    id: &'a str,
}

/// Indented JSON-LD for the article, safe to embed in a `<script>` element.
pub fn article_json_ld(
    meta: &ArticleMetadata,
    options: &RenderOptions,
    urls: &ArticleUrls,
) -> Result<String, serde_json::Error> {
    let graph = ArticleGraph {
        context: SCHEMA_CONTEXT,
        kind: "Article",
        headline: &meta.title,
        description: &meta.description,
        author: Person {
            kind: "Person",
            name: &meta.author,
        },
        date_published: meta.published_iso(),
        date_modified: meta.modified_iso(),
        publisher: Organization {
            kind: "Organization",
            name: &meta.author,
            logo: urls.logo.as_deref().map(|url| ImageObject {
                kind: "ImageObject",
                url,
            }),
        },
        main_entity_of_page: urls.canonical.as_deref().map(|id| WebPage {
            kind: "WebPage",
            id,
        }),
        image: urls.image.as_deref(),
        word_count: meta.word_count,
        article_section: &options.section,
        in_language: &options.language,
    };
    let json = serde_json::to_string_pretty(&graph)?;
    // A literal "</script>" inside a string value would end the element early.
    Ok(json.replace("</", "<\\/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata;
    use crate::test_helpers::fixed_time;
    use serde_json::Value;
    use std::path::Path;

    fn meta(content: &str) -> ArticleMetadata {
        metadata::extract(content, Path::new("kafka-basics.md"), "Jane Doe", fixed_time())
    }

    fn options(base_url: &str) -> RenderOptions {
        RenderOptions {
            base_url: base_url.to_string(),
            ..RenderOptions::default()
        }
    }

    fn graph(content: &str, options: &RenderOptions) -> Value {
        let meta = meta(content);
        let urls = ArticleUrls::new(&meta, options);
        let json = article_json_ld(&meta, options, &urls).unwrap();
        serde_json::from_str(&json).unwrap()
    }

    #[test]
    fn article_fields_populated() {
        let g = graph("# Kafka Basics\n\nIntro text here.\n", &options("https://mine.dev"));
        assert_eq!(g["@context"], "https://schema.org");
        assert_eq!(g["@type"], "Article");
        assert_eq!(g["headline"], "Kafka Basics");
        assert_eq!(g["description"], "Intro text here.");
        assert_eq!(g["author"]["@type"], "Person");
        assert_eq!(g["author"]["name"], "Jane Doe");
        assert_eq!(g["publisher"]["@type"], "Organization");
        assert_eq!(g["publisher"]["name"], "Jane Doe");
        assert_eq!(g["articleSection"], "Technology");
        assert_eq!(g["inLanguage"], "en-US");
        assert_eq!(g["wordCount"], 6);
    }

    #[test]
    fn timestamps_are_rfc3339() {
        let g = graph("text", &options(""));
        assert_eq!(g["datePublished"], "2024-01-15T10:30:00+00:00");
        assert_eq!(g["dateModified"], g["datePublished"]);
    }

    #[test]
    fn urls_derived_from_base() {
        let g = graph("text", &options("https://mine.dev"));
        assert_eq!(g["mainEntityOfPage"]["@type"], "WebPage");
        assert_eq!(g["mainEntityOfPage"]["@id"], "https://mine.dev/kafka-basics.html");
        assert_eq!(g["image"], "https://mine.dev/img/kafka-basics.png");
        assert_eq!(g["publisher"]["logo"]["url"], "https://mine.dev/img/logo.png");
    }

    #[test]
    fn urls_omitted_without_base() {
        let g = graph("text", &options(""));
        assert!(g.get("mainEntityOfPage").is_none());
        assert!(g.get("image").is_none());
        assert!(g["publisher"].get("logo").is_none());
    }

    #[test]
    fn configured_social_image_and_output() {
        let opts = RenderOptions {
            social_image: Some("/social/kafka.jpg".to_string()),
            output: Some("kafka.html".to_string()),
            ..options("https://mine.dev")
        };
        let g = graph("text", &opts);
        assert_eq!(g["image"], "https://mine.dev/social/kafka.jpg");
        assert_eq!(g["mainEntityOfPage"]["@id"], "https://mine.dev/kafka.html");
    }

    #[test]
    fn absolute_social_image_used_without_base() {
        let opts = RenderOptions {
            social_image: Some("https://cdn.example/k.png".to_string()),
            ..options("")
        };
        let g = graph("text", &opts);
        assert_eq!(g["image"], "https://cdn.example/k.png");
        assert!(g.get("mainEntityOfPage").is_none());
    }

    #[test]
    fn section_and_language_from_options() {
        let opts = RenderOptions {
            section: "Streaming".to_string(),
            language: "pt-BR".to_string(),
            ..options("")
        };
        let g = graph("text", &opts);
        assert_eq!(g["articleSection"], "Streaming");
        assert_eq!(g["inLanguage"], "pt-BR");
    }

    #[test]
    fn output_is_indented() {
        let meta = meta("text");
        let opts = options("");
        let json = article_json_ld(&meta, &opts, &ArticleUrls::new(&meta, &opts)).unwrap();
        assert!(json.starts_with("{\n  \"@context\""));
    }

    #[test]
    fn script_close_sequence_escaped() {
        let meta = meta("# Ends </script> early\n");
        let opts = options("");
        let json = article_json_ld(&meta, &opts, &ArticleUrls::new(&meta, &opts)).unwrap();
        assert!(!json.contains("</script>"));
        let g: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(g["headline"], "Ends </script> early");
    }
}
