//! First-seen deduplication of offer records.

use crate::models::OfferRecord;
use itertools::Itertools;
use tracing::{debug, instrument};

/// Drop every record whose `(store_name, title, description)` was already
/// seen earlier in `records`, keeping first-seen order.
///
/// Meant to run once over a whole run's output so duplicates from
/// non-adjacent stores are caught too.
#[instrument(level = "debug", skip_all, fields(input = records.len()))]
pub fn dedup(records: Vec<OfferRecord>) -> Vec<OfferRecord> {
    let before = records.len();
    let unique = records
        .into_iter()
        .unique_by(OfferRecord::key)
        .collect::<Vec<_>>();
    debug!(before, after = unique.len(), "Deduplicated offers");
    unique
}
