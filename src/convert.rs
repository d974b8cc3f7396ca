//! Markdown to HTML conversion.
//!
//! Produces the article body fragment (no document shell) with pulldown-cmark.
//! Enabled extensions: tables, footnotes, strikethrough, task lists, and
//! `{#id .class}` heading attributes. Fenced code keeps its language tag as
//! `class="language-…"` for client-side highlighting.
//!
//! A paragraph consisting solely of `[TOC]` is replaced by a table of contents
//! linking every heading of the document:
//!
//! ```html
//! <div class="toc">
//! <ul>
//! <li><a href="#setup">Setup</a><ul>
//! <li><a href="#install">Install</a></li>
//! </ul>
//! </li>
//! </ul>
//! </div>
//! ```
//!
//! The table is built from the rendered fragment with
//! [`heading_anchors`], which shares its id resolution with the heading-id
//! pass in [`crate::postprocess`], so every link resolves after
//! post-processing.

use crate::postprocess::{HeadingAnchor, heading_anchors};
use maud::html;
use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd, html as md_html};

const TOC_DIRECTIVE: &str = "[TOC]";

/// Stands in for the table of contents until the headings are rendered.
const TOC_PLACEHOLDER: &str = "<!-- seo-press:toc -->\n";

fn parser_options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_HEADING_ATTRIBUTES
}

/// Convert Markdown to an HTML body fragment.
pub fn markdown_to_html(markdown: &str) -> String {
    let events: Vec<Event> = Parser::new_ext(markdown, parser_options()).collect();
    let directives = toc_paragraphs(&events);
    let events = replace_paragraphs(events, &directives);

    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    md_html::push_html(&mut out, events.into_iter());
    if !directives.is_empty() {
        let toc = render_toc(&heading_anchors(&out));
        out = out.replace(TOC_PLACEHOLDER, &toc);
    }
    out
}

/// Replace every `[TOC]` paragraph with the placeholder.
fn replace_paragraphs<'a>(events: Vec<Event<'a>>, directives: &[(usize, usize)]) -> Vec<Event<'a>> {
    if directives.is_empty() {
        return events;
    }
    let mut out = Vec::with_capacity(events.len());
    let mut skip_until = None;
    for (i, event) in events.into_iter().enumerate() {
        if let Some(end) = skip_until {
            if i <= end {
                continue;
            }
            skip_until = None;
        }
        if let Some(&(_, end)) = directives.iter().find(|(start, _)| *start == i) {
            out.push(Event::Html(TOC_PLACEHOLDER.into()));
            skip_until = Some(end);
            continue;
        }
        out.push(event);
    }
    out
}

/// `(start, end)` event indices of paragraphs whose only content is `[TOC]`.
///
/// The parser may split the brackets into separate text events, so the
/// paragraph text is joined before comparison.
fn toc_paragraphs(events: &[Event<'_>]) -> Vec<(usize, usize)> {
    let mut found = Vec::new();
    let mut i = 0;
    while i < events.len() {
        if matches!(events[i], Event::Start(Tag::Paragraph)) {
            let mut text = String::new();
            let mut j = i + 1;
            let mut plain = true;
            while j < events.len() && !matches!(events[j], Event::End(TagEnd::Paragraph)) {
                match &events[j] {
                    Event::Text(t) => text.push_str(t),
                    _ => plain = false,
                }
                j += 1;
            }
            if plain && j < events.len() && text.trim() == TOC_DIRECTIVE {
                found.push((i, j));
            }
            i = j;
        }
        i += 1;
    }
    found
}

/// Nested list of heading links. A heading deeper than the previous one opens
/// a sub-list inside the previous item.
fn render_toc(entries: &[HeadingAnchor]) -> String {
    let mut out = String::from("<div class=\"toc\">\n");
    let mut open: Vec<usize> = Vec::new();

    for entry in entries {
        while open.len() > 1 && open.last().is_some_and(|&top| entry.level < top) {
            out.push_str("</li>\n</ul>\n");
            open.pop();
        }
        match open.last() {
            Some(&top) if entry.level <= top => out.push_str("</li>\n"),
            _ => {
                out.push_str("<ul>\n");
                open.push(entry.level);
            }
        }
        let link = html! { a href={ "#" (entry.id) } { (entry.text) } };
        out.push_str("<li>");
        out.push_str(&link.into_string());
    }
    for _ in open {
        out.push_str("</li>\n</ul>\n");
    }
    out.push_str("</div>\n");
    out
}
