//! Converts post bodies from markdown to HTML. Besides the HTML itself,
//! [`render`] produces a table of contents linking to every heading and the
//! document's plain text, from which post excerpts are derived.

use pulldown_cmark::{html, CowStr, Event, Options, Parser, Tag};
use std::collections::HashSet;

/// The output of [`render`].
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Rendered {
    /// The HTML body. Headings carry `id` attributes.
    pub html: String,

    /// A `<div class="toc">` containing nested lists of links to the
    /// headings in `html`, or an empty string if there are no headings.
    pub toc: String,

    /// The document's text with all markup stripped.
    pub text: String,
}

struct Heading {
    level: u32,
    id: String,
    text: String,
}

/// Renders `markdown` into HTML.
pub fn render(markdown: &str) -> Rendered {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_SMART_PUNCTUATION);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_TASKLISTS);

    let events: Vec<Event> = Parser::new_ext(markdown, options).collect();
    let text = plain_text(&events);
    let (events, headings) = anchor_headings(events);

    let mut rendered = Rendered {
        text,
        ..Rendered::default()
    };
    html::push_html(&mut rendered.html, events.into_iter());
    if !headings.is_empty() {
        html::push_html(&mut rendered.toc, toc_events(&headings).into_iter());
    }
    rendered
}

/// Returns the first `length` characters of `text` after trimming
/// surrounding whitespace.
pub fn excerpt(text: &str, length: usize) -> String {
    text.trim().chars().take(length).collect()
}

fn plain_text(events: &[Event]) -> String {
    let mut text = String::new();
    for ev in events {
        match ev {
            Event::Text(t) | Event::Code(t) => text.push_str(t),
            Event::SoftBreak | Event::HardBreak => text.push('\n'),
            Event::End(
                Tag::Paragraph
                | Tag::Heading(_)
                | Tag::Item
                | Tag::CodeBlock(_)
                | Tag::TableRow
                | Tag::TableHead,
            ) => {
                if !text.ends_with('\n') {
                    text.push('\n');
                }
            }
            _ => {}
        }
    }
    text
}

// Replaces each heading's start and end tags with raw HTML so the heading can
// carry an `id`. Returns the rewritten events along with the headings found.
fn anchor_headings(events: Vec<Event>) -> (Vec<Event>, Vec<Heading>) {
    let mut out = Vec::with_capacity(events.len());
    let mut headings: Vec<Heading> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    // the heading being read along with the index of its start tag in `out`
    let mut current: Option<(usize, Heading)> = None;

    for ev in events {
        match ev {
            Event::Start(Tag::Heading(level)) => {
                current = Some((
                    out.len(),
                    Heading {
                        level,
                        id: String::new(),
                        text: String::new(),
                    },
                ));
                out.push(Event::Html(CowStr::from(String::new())));
            }
            Event::End(Tag::Heading(level)) => {
                if let Some((start, mut heading)) = current.take() {
                    heading.id = unique_id(&mut seen, &heading.text);
                    out[start] = Event::Html(CowStr::from(format!(
                        "<h{} id=\"{}\">",
                        level, heading.id
                    )));
                    out.push(Event::Html(CowStr::from(format!("</h{}>\n", level))));
                    headings.push(heading);
                }
            }
            ev => {
                if let Some((_, heading)) = current.as_mut() {
                    if let Event::Text(t) | Event::Code(t) = &ev {
                        heading.text.push_str(t);
                    }
                }
                out.push(ev);
            }
        }
    }
    (out, headings)
}

fn unique_id(seen: &mut HashSet<String>, text: &str) -> String {
    let mut base = slug::slugify(text);
    if base.is_empty() {
        base = String::from("section");
    }
    // a suffixed id may coincide with another heading's own slug
    let mut id = base.clone();
    let mut n = 0;
    while seen.contains(&id) {
        n += 1;
        id = format!("{}-{}", base, n);
    }
    seen.insert(id.clone());
    id
}

fn toc_events(headings: &[Heading]) -> Vec<Event<'static>> {
    let html = |s: String| Event::Html(CowStr::from(s));
    let mut events = vec![html(String::from("<div class=\"toc\">\n"))];
    let mut levels: Vec<u32> = Vec::new();

    for heading in headings {
        while let Some(&top) = levels.last() {
            if top <= heading.level {
                break;
            }
            events.push(html(String::from("</li>\n</ul>\n")));
            levels.pop();
        }
        match levels.last() {
            Some(&top) if top == heading.level => {
                events.push(html(String::from("</li>\n")));
            }
            _ => {
                events.push(html(String::from("<ul>\n")));
                levels.push(heading.level);
            }
        }
        events.push(html(format!("<li><a href=\"#{}\">", heading.id)));
        events.push(Event::Text(CowStr::from(heading.text.clone())));
        events.push(html(String::from("</a>")));
    }
    for _ in levels {
        events.push(html(String::from("</li>\n</ul>\n")));
    }
    events.push(html(String::from("</div>\n")));
    events
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_headings_get_ids() {
        let rendered = render("# Intro\n\nHello\n\n## Intro\n\n## Code `x`\n");
        assert!(rendered.html.contains("<h1 id=\"intro\">Intro</h1>"));
        assert!(rendered.html.contains("<h2 id=\"intro-1\">Intro</h2>"));
        assert!(rendered
            .html
            .contains("<h2 id=\"code-x\">Code <code>x</code></h2>"));
        assert!(rendered.html.contains("<p>Hello</p>"));
    }

    #[test]
    fn test_heading_ids_never_collide() {
        let rendered = render("# Intro\n\n# Intro\n\n# Intro 1\n\n# ???\n\n# Section\n");
        for id in &["intro", "intro-1", "intro-1-1", "section", "section-1"] {
            assert!(
                rendered.html.contains(&format!("id=\"{}\"", id)),
                "missing id {} in {}",
                id,
                rendered.html
            );
        }
    }

    #[test]
    fn test_toc() {
        let rendered = render("# A\n\n## B\n\n## C\n\n# D\n");
        assert_eq!(
            concat!(
                "<div class=\"toc\">\n",
                "<ul>\n",
                "<li><a href=\"#a\">A</a>",
                "<ul>\n",
                "<li><a href=\"#b\">B</a>",
                "</li>\n",
                "<li><a href=\"#c\">C</a>",
                "</li>\n</ul>\n",
                "</li>\n",
                "<li><a href=\"#d\">D</a>",
                "</li>\n</ul>\n",
                "</div>\n",
            ),
            rendered.toc
        );
    }

    #[test]
    fn test_toc_escapes_heading_text() {
        let rendered = render("# Fish & Chips < 5\n");
        assert!(rendered.toc.contains("<a href=\"#fish-chips-5\">Fish &amp; Chips &lt; 5</a>"));
    }

    #[test]
    fn test_no_headings_no_toc() {
        assert_eq!("", render("just a paragraph").toc);
    }

    #[test]
    fn test_plain_text() {
        let rendered = render("# Title\n\nSome *emphasised* `code`\nand more.\n\n- one\n- two\n");
        assert_eq!("Title\nSome emphasised code\nand more.\none\ntwo\n", rendered.text);
    }

    #[test]
    fn test_extensions() {
        let rendered = render("| a | b |\n|---|---|\n| 1 | 2 |\n\n~~gone~~\n\n```rust\nfn main() {}\n```\n");
        assert!(rendered.html.contains("<table>"));
        assert!(rendered.html.contains("<del>gone</del>"));
        assert!(rendered.html.contains("<code class=\"language-rust\">"));
    }

    #[test]
    fn test_excerpt() {
        assert_eq!("héllo", excerpt("  héllo wörld", 5));
        assert_eq!("short", excerpt("short\n", 54));
        assert_eq!(54, excerpt(&"x".repeat(100), 54).chars().count());
    }
}
