//! Markdown rendering glue.
//!
//! Thin wrapper around [pulldown-cmark](https://docs.rs/pulldown-cmark):
//! body rendering, the teaser split on `<!--more-->`, and a first-heading
//! fallback for posts whose front matter carries no title.

use pulldown_cmark::{Event, HeadingLevel, Parser, Tag, TagEnd, html as md_html};

/// Marker separating a post's teaser from the rest of its body.
pub const TEASER_MARKER: &str = "<!--more-->";

/// Render Markdown to an HTML fragment.
pub fn render(markdown: &str) -> String {
    let parser = Parser::new(markdown);
    let mut out = String::new();
    md_html::push_html(&mut out, parser);
    out
}

/// Split a body on the first teaser marker.
///
/// Returns the (trimmed) teaser and whether the marker was present. Without
/// a marker the whole body is the teaser.
pub fn split_teaser(body: &str) -> (&str, bool) {
    match body.split_once(TEASER_MARKER) {
        Some((teaser, _)) => (teaser.trim(), true),
        None => (body.trim(), false),
    }
}

/// Text of the first `# heading` in the document, if any.
pub fn first_heading(markdown: &str) -> Option<String> {
    let mut in_h1 = false;
    let mut text = String::new();
    for event in Parser::new(markdown) {
        match event {
            Event::Start(Tag::Heading {
                level: HeadingLevel::H1,
                ..
            }) => in_h1 = true,
            Event::End(TagEnd::Heading(HeadingLevel::H1)) => {
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    return Some(trimmed.to_string());
                }
                in_h1 = false;
                text.clear();
            }
            Event::Text(t) | Event::Code(t) if in_h1 => text.push_str(&t),
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_emphasis() {
        let html = render("This is **bold** and *italic*.");
        assert!(html.contains("<strong>bold</strong>"));
        assert!(html.contains("<em>italic</em>"));
    }

    #[test]
    fn renders_heading() {
        let html = render("# Hello");
        assert!(html.contains("<h1>Hello</h1>"));
    }

    #[test]
    fn teaser_split_at_marker() {
        let (teaser, has_more) = split_teaser("Intro paragraph.\n\n<!--more-->\n\nThe rest.");
        assert_eq!(teaser, "Intro paragraph.");
        assert!(has_more);
    }

    #[test]
    fn teaser_without_marker_is_whole_body() {
        let (teaser, has_more) = split_teaser("Only paragraph.\n");
        assert_eq!(teaser, "Only paragraph.");
        assert!(!has_more);
    }

    #[test]
    fn first_heading_found() {
        assert_eq!(
            first_heading("intro\n\n# The Title\n\nmore"),
            Some("The Title".to_string())
        );
    }

    #[test]
    fn first_heading_with_inline_code() {
        assert_eq!(
            first_heading("# Using `penpress` daily"),
            Some("Using penpress daily".to_string())
        );
    }

    #[test]
    fn first_heading_ignores_lower_levels() {
        assert_eq!(first_heading("## Subheading only"), None);
    }

    #[test]
    fn first_heading_none_for_plain_text() {
        assert_eq!(first_heading("no headings here"), None);
    }
}
