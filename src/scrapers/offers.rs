//! Offer extraction from a rendered store page.
//!
//! Every strategy in [`CONTAINER_STRATEGIES`] is applied and all of their
//! matches are accumulated; a later strategy often finds containers an
//! earlier one missed. Each container is then read field by field, falling
//! back to its raw lines when the expected sub-elements are missing.
//!
//! Overlapping strategies can yield the same container more than once. The
//! resulting duplicate records are removed later by [`crate::dedup`].

use crate::identity::resolve;
use crate::models::{is_valid_title, OfferRecord, PLACEHOLDER};
use crate::page::PageAccessor;
use crate::scrapers::strategies::{
    FieldSelector, CONTAINER_STRATEGIES, DESCRIPTION_FIELDS, TITLE_FIELDS,
};
use crate::utils::truncate_for_log;
use tracing::{debug, info, instrument};

/// Minimum trimmed length of a container's text.
const MIN_CONTAINER_TEXT: usize = 3;

/// Result of reading one container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionOutcome {
    /// Both fields came from dedicated sub-elements.
    Found { title: String, description: String },
    /// At least one field came from the container's raw lines.
    FallbackUsed { title: String, description: String },
    /// The container cannot produce an offer.
    Rejected(RejectReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Container text was empty or too short.
    ContainerTooShort,
    /// Title was empty, the placeholder, or too short.
    InvalidTitle,
}

/// Extract all offers from `page`, attributing them to the store at `url`.
///
/// Records come out in strategy order, then document order.
#[instrument(level = "info", skip_all, fields(%url))]
pub fn extract<P: PageAccessor>(page: &P, url: &str) -> Vec<OfferRecord> {
    let store_name = resolve(url);
    let mut offers = Vec::new();

    for container in locate_containers(page) {
        match extract_container(page, container) {
            ExtractionOutcome::Found { title, description }
            | ExtractionOutcome::FallbackUsed { title, description } => {
                offers.push(OfferRecord {
                    store_name: store_name.clone(),
                    store_url: url.to_string(),
                    title,
                    description,
                });
            }
            ExtractionOutcome::Rejected(reason) => {
                debug!(?reason, "Skipping container");
            }
        }
    }

    info!(count = offers.len(), store = %store_name, "Extracted offers");
    offers
}

/// Containers from every strategy that matches, in strategy order.
pub fn locate_containers<P: PageAccessor>(page: &P) -> Vec<P::Node<'_>> {
    let root = page.root();
    let mut containers = Vec::new();

    for strategy in CONTAINER_STRATEGIES {
        let found = page.select(root, &strategy.pattern);
        if found.is_empty() {
            debug!(strategy = strategy.name, "No containers");
            continue;
        }
        debug!(strategy = strategy.name, count = found.len(), "Found containers");
        containers.extend(found);
    }

    if containers.is_empty() {
        info!("No offer elements found");
    }
    containers
}

/// Read a title and description out of one container.
pub fn extract_container<'a, P: PageAccessor>(page: &'a P, container: P::Node<'a>) -> ExtractionOutcome {
    let text = page.text(container);
    if text.chars().count() < MIN_CONTAINER_TEXT {
        return ExtractionOutcome::Rejected(RejectReason::ContainerTooShort);
    }

    let title = first_field(page, container, TITLE_FIELDS);
    let description = first_field(page, container, DESCRIPTION_FIELDS);
    let fallback_used = title.is_none() || description.is_none();

    let mut lines = text.lines().map(str::trim).filter(|l| !l.is_empty());
    let first_line = lines.next().unwrap_or_default().to_string();
    let second_line = lines.next().map(str::to_string);

    let title = title.unwrap_or(first_line);
    let description = description
        .or(second_line)
        .unwrap_or_else(|| PLACEHOLDER.to_string());

    if !is_valid_title(&title) {
        debug!(title = %truncate_for_log(&title, 40), "Rejected title");
        return ExtractionOutcome::Rejected(RejectReason::InvalidTitle);
    }

    if fallback_used {
        debug!(container = %truncate_for_log(&text, 80), "Used line fallback");
        ExtractionOutcome::FallbackUsed { title, description }
    } else {
        ExtractionOutcome::Found { title, description }
    }
}

/// First non-empty value produced by `selectors`, tried in order.
fn first_field<'a, P: PageAccessor>(
    page: &'a P,
    container: P::Node<'a>,
    selectors: &[FieldSelector],
) -> Option<String> {
    selectors.iter().find_map(|selector| match selector {
        FieldSelector::Text(pattern) => page
            .select(container, pattern)
            .into_iter()
            .map(|node| page.text(node))
            .find(|text| !text.is_empty()),
        FieldSelector::Attr(pattern, name) => page
            .select(container, pattern)
            .into_iter()
            .filter_map(|node| page.attr(node, name))
            .find(|value| !value.is_empty()),
    })
}
