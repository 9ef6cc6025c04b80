//! Where offers live on a store page.
//!
//! Store pages change markup between redesigns, so offers are located with
//! several structural guesses applied in priority order. Update this file
//! when the markup drifts: add a strategy, keep the old ones.

use crate::page::Pattern;

/// A named structural pattern for offer-bearing containers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerStrategy {
    pub name: &'static str,
    pub pattern: Pattern,
}

/// How to read one field out of a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldSelector {
    /// Text content of the first match with non-empty text.
    Text(Pattern),
    /// An attribute of the first match carrying a non-empty value.
    Attr(Pattern, &'static str),
}

/// Container strategies, highest priority first.
pub const CONTAINER_STRATEGIES: &[ContainerStrategy] = &[
    ContainerStrategy {
        name: "offer-card-testid",
        pattern: Pattern::Css("div[data-testid*='offer-card-container']"),
    },
    ContainerStrategy {
        name: "styled-offer-card",
        pattern: Pattern::Css("div.sc-dExYaf.hQBmmU"),
    },
    ContainerStrategy {
        name: "offer-class",
        pattern: Pattern::Css("div[class*='offer']"),
    },
    ContainerStrategy {
        name: "offer-class-or-testid",
        pattern: Pattern::AttrContains {
            tag: "div",
            attrs: &["class", "data-testid"],
            needle: "offer",
        },
    },
    ContainerStrategy {
        name: "deals-heading-siblings",
        pattern: Pattern::AfterHeading {
            heading: "h2",
            keywords: &["Deals", "Offers"],
            descendant: "div",
        },
    },
];

/// Title lookups inside a container, in order.
pub const TITLE_FIELDS: &[FieldSelector] = &[
    FieldSelector::Text(Pattern::Css("div[class*='title']")),
    FieldSelector::Text(Pattern::Css("h3")),
    FieldSelector::Text(Pattern::Css("h4")),
    FieldSelector::Attr(Pattern::Css("img[alt]"), "alt"),
];

/// Description or promo code lookups inside a container, in order.
pub const DESCRIPTION_FIELDS: &[FieldSelector] = &[
    FieldSelector::Text(Pattern::Css("div[class*='desc']")),
    FieldSelector::Text(Pattern::Css("span[class*='code']")),
];
