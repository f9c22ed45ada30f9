//! Markdown to HTML rendering.

use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd, html};

fn options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_FOOTNOTES
}

/// Render `markdown` to HTML.
///
/// When `title` is given and the first heading's text matches it
/// (case-insensitively, ignoring whitespace), that heading is demoted one
/// level so the title is not repeated at the same rank.
pub fn render_html(markdown: &str, title: Option<&str>) -> String {
    let mut events: Vec<Event<'_>> = Parser::new_ext(markdown, options()).collect();

    if let Some(title) = title {
        demote_duplicate_heading(&mut events, title);
    }

    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, events.into_iter());
    out
}

fn demote_duplicate_heading(events: &mut [Event<'_>], title: &str) {
    let Some(start) = events
        .iter()
        .position(|e| matches!(e, Event::Start(Tag::Heading { .. })))
    else {
        return;
    };
    let Some(len) = events[start..]
        .iter()
        .position(|e| matches!(e, Event::End(TagEnd::Heading(_))))
    else {
        return;
    };
    let end = start + len;

    let text: String = events[start + 1..end]
        .iter()
        .filter_map(|e| match e {
            Event::Text(t) | Event::Code(t) => Some(t.as_ref()),
            _ => None,
        })
        .collect();

    if !same_text(&text, title) {
        return;
    }

    if let Event::Start(Tag::Heading { level, .. }) = &mut events[start] {
        *level = demote(*level);
    }
    if let Event::End(TagEnd::Heading(level)) = &mut events[end] {
        *level = demote(*level);
    }
}

fn same_text(a: &str, b: &str) -> bool {
    let normalize = |s: &str| -> String {
        s.chars()
            .filter(|c| !c.is_whitespace())
            .flat_map(char::to_lowercase)
            .collect()
    };
    let a = normalize(a);
    !a.is_empty() && a == normalize(b)
}

const fn demote(level: HeadingLevel) -> HeadingLevel {
    match level {
        HeadingLevel::H1 => HeadingLevel::H2,
        HeadingLevel::H2 => HeadingLevel::H3,
        HeadingLevel::H3 => HeadingLevel::H4,
        HeadingLevel::H4 => HeadingLevel::H5,
        HeadingLevel::H5 | HeadingLevel::H6 => HeadingLevel::H6,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_basic() {
        let html = render_html("Hello *world*", None);
        assert_eq!(html.trim(), "<p>Hello <em>world</em></p>");
    }

    #[test]
    fn test_duplicate_title_demoted() {
        let html = render_html("# Hello World\n\nBody", Some("hello world"));
        assert!(html.contains("<h2>Hello World</h2>"));
        assert!(!html.contains("<h1>"));
    }

    #[test]
    fn test_whitespace_insensitive_match() {
        let html = render_html("## Hello  World", Some("HelloWorld"));
        assert!(html.contains("<h3>"));
    }

    #[test]
    fn test_different_heading_untouched() {
        let html = render_html("# Introduction\n\nBody", Some("Hello World"));
        assert!(html.contains("<h1>Introduction</h1>"));
    }

    #[test]
    fn test_only_first_heading_considered() {
        let html = render_html("# Intro\n\n# Hello", Some("Hello"));
        assert!(html.contains("<h1>Intro</h1>"));
        assert!(html.contains("<h1>Hello</h1>"));
    }

    #[test]
    fn test_no_title_no_demotion() {
        let html = render_html("# Hello", None);
        assert!(html.contains("<h1>Hello</h1>"));
    }

    #[test]
    fn test_tables_enabled() {
        let html = render_html("| a | b |\n|---|---|\n| 1 | 2 |", None);
        assert!(html.contains("<table>"));
    }
}
