//! Read-only access to a rendered store page.
//!
//! The extraction chain only ever talks to [`PageAccessor`]: it asks for
//! descendants matching a [`Pattern`], for a node's text, and for a node's
//! attributes. [`HtmlPage`] implements it on top of `scraper`; tests use a
//! hand-built fake.

use itertools::Itertools;
use scraper::{ElementRef, Html, Node, Selector};
use tracing::warn;

/// A structural pattern locating descendant elements of a scope node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pattern {
    /// A CSS selector.
    Css(&'static str),
    /// `tag` elements where any of `attrs` contains `needle`.
    AttrContains {
        tag: &'static str,
        attrs: &'static [&'static str],
        needle: &'static str,
    },
    /// `descendant` elements nested inside the following siblings of any
    /// `heading` whose text contains one of `keywords`.
    AfterHeading {
        heading: &'static str,
        keywords: &'static [&'static str],
        descendant: &'static str,
    },
}

/// Query capability over a rendered document.
pub trait PageAccessor {
    /// Handle to a node inside the page.
    type Node<'a>: Copy
    where
        Self: 'a;

    /// The document root.
    fn root(&self) -> Self::Node<'_>;

    /// Descendants of `scope` matching `pattern`, in document order.
    fn select<'a>(&'a self, scope: Self::Node<'a>, pattern: &Pattern) -> Vec<Self::Node<'a>>;

    /// Rendered text of `node`: inline runs joined on one line, one line per
    /// block element or `<br>`, each line trimmed, empty lines dropped.
    fn text(&self, node: Self::Node<'_>) -> String;

    /// Value of the attribute `name` on `node`, if present.
    fn attr(&self, node: Self::Node<'_>, name: &str) -> Option<String>;
}

/// A parsed HTML document.
pub struct HtmlPage {
    document: Html,
}

impl HtmlPage {
    pub fn parse(html: &str) -> Self {
        Self {
            document: Html::parse_document(html),
        }
    }
}

impl std::fmt::Debug for HtmlPage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HtmlPage").finish_non_exhaustive()
    }
}

impl PageAccessor for HtmlPage {
    type Node<'a> = ElementRef<'a>;

    fn root(&self) -> ElementRef<'_> {
        self.document.root_element()
    }

    fn select<'a>(&'a self, scope: ElementRef<'a>, pattern: &Pattern) -> Vec<ElementRef<'a>> {
        match *pattern {
            Pattern::Css(css) => match Selector::parse(css) {
                Ok(selector) => scope.select(&selector).collect(),
                Err(e) => {
                    warn!(%css, error = %e, "Skipping unparseable selector");
                    Vec::new()
                }
            },
            Pattern::AttrContains { tag, attrs, needle } => descendants(scope)
                .filter(|el| el.value().name() == tag)
                .filter(|el| {
                    attrs
                        .iter()
                        .any(|a| el.value().attr(a).is_some_and(|v| v.contains(needle)))
                })
                .collect(),
            Pattern::AfterHeading {
                heading,
                keywords,
                descendant,
            } => descendants(scope)
                .filter(|el| el.value().name() == heading)
                .filter(|el| {
                    let text = el.text().collect::<String>();
                    keywords.iter().any(|k| text.contains(k))
                })
                .flat_map(|h| h.next_siblings().filter_map(ElementRef::wrap))
                .flat_map(descendants)
                .filter(|el| el.value().name() == descendant)
                .unique_by(|el| (**el).id())
                .collect(),
        }
    }

    fn text(&self, node: ElementRef<'_>) -> String {
        let mut raw = String::new();
        write_text(node, &mut raw);
        raw.lines()
            .map(|line| line.split_whitespace().join(" "))
            .filter(|line| !line.is_empty())
            .join("\n")
    }

    fn attr(&self, node: ElementRef<'_>, name: &str) -> Option<String> {
        node.value().attr(name).map(|v| v.trim().to_string())
    }
}

/// Elements that start and end a line of rendered text.
const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "dd", "details", "div", "dl", "dt",
    "fieldset", "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6",
    "header", "hr", "li", "main", "nav", "ol", "p", "pre", "section", "summary", "table",
    "tr", "ul",
];

/// Elements whose contents are never rendered as text.
const HIDDEN_TAGS: &[&str] = &["script", "style", "noscript", "template"];

/// Append the rendered text of `el` to `out`.
///
/// Inline runs stay on one line with source whitespace collapsed to spaces;
/// block elements and `<br>` introduce line breaks.
fn write_text(el: ElementRef<'_>, out: &mut String) {
    for child in el.children() {
        match child.value() {
            Node::Text(text) => {
                out.extend(text.chars().map(|c| if c.is_whitespace() { ' ' } else { c }))
            }
            Node::Element(element) => {
                let name = element.name();
                if name == "br" {
                    out.push('\n');
                    continue;
                }
                if HIDDEN_TAGS.contains(&name) {
                    continue;
                }
                let Some(child) = ElementRef::wrap(child) else {
                    continue;
                };
                let block = BLOCK_TAGS.contains(&name);
                if block {
                    out.push('\n');
                }
                write_text(child, out);
                if block {
                    out.push('\n');
                }
            }
            _ => {}
        }
    }
}

/// Strict element descendants of `scope`, in document order.
fn descendants(scope: ElementRef<'_>) -> impl Iterator<Item = ElementRef<'_>> {
    scope.descendants().skip(1).filter_map(ElementRef::wrap)
}
