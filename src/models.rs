//! Data models for extracted offers.
//!
//! [`OfferRecord`] is the one canonical unit that flows from the extraction
//! chain through deduplication into the table encoder.

use serde::{Deserialize, Serialize};

/// Placeholder used when an offer has no second line of detail.
pub const PLACEHOLDER: &str = "N/A";

/// Minimum trimmed length, in characters, for an offer title.
pub const MIN_TITLE_LEN: usize = 3;

/// A single promotional offer found on a store page.
///
/// `description` holds either secondary prose or a promo code; both live in
/// the same field and are told apart only by their content.
///
/// Records are only built once the title has passed [`is_valid_title`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfferRecord {
    /// Display name derived from the store URL.
    pub store_name: String,
    /// The store page the offer was found on.
    pub store_url: String,
    /// Primary offer text, e.g. `"20% off"`.
    pub title: String,
    /// Secondary detail or promo code, or [`PLACEHOLDER`].
    pub description: String,
}

impl OfferRecord {
    /// Identity used for deduplication. `store_url` is deliberately absent.
    pub fn key(&self) -> (String, String, String) {
        (
            self.store_name.clone(),
            self.title.clone(),
            self.description.clone(),
        )
    }
}

/// Whether `title` may be used as an offer title.
///
/// Rejects empty text, the [`PLACEHOLDER`], and anything shorter than
/// [`MIN_TITLE_LEN`] characters once trimmed.
pub fn is_valid_title(title: &str) -> bool {
    let title = title.trim();
    !title.is_empty() && title != PLACEHOLDER && title.chars().count() >= MIN_TITLE_LEN
}
