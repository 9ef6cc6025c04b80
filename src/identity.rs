//! Store display names derived from store URLs.
//!
//! Two URL shapes are recognised:
//!
//! | Shape | Example | Name |
//! |-------|---------|------|
//! | City-scoped | `/city/guwahati/burger-singh-ganeshguri-rest579784` | `guwahati-burger-singh-ganeshguri` |
//! | Direct listing | `/restaurants/burger-singh-ganeshguri-guwahati-579784` | `Burger Singh Ganeshguri Guwahati` |
//!
//! Anything else falls back to the last path segment. URLs without a path
//! use their host (`https://example.com` gives `example.com`), and opaque
//! URLs use their body (`mailto:offers@example.com` gives
//! `offers@example.com`). Anything that cannot be parsed at all, or that
//! names a marker without the segment after it, becomes [`UNKNOWN_STORE`].

use crate::utils::upcase;
use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;
use url::Url;

/// Name returned for URLs that cannot be interpreted.
pub const UNKNOWN_STORE: &str = "unknown-store";

/// Joins the city and location of a city-scoped URL.
pub const CITY_SEPARATOR: &str = "-";

/// A `-rest<digits>` token (and everything after it), or a bare numeric
/// listing id at the end of a slug.
static TRAILING_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"-rest\d+.*$|-\d+$").unwrap());

/// Derive a human-readable store name from `url`.
///
/// Never fails: malformed URLs or missing segments yield [`UNKNOWN_STORE`].
pub fn resolve(url: &str) -> String {
    match try_resolve(url) {
        Some(name) => name,
        None => {
            debug!(%url, "Could not derive store name");
            UNKNOWN_STORE.to_string()
        }
    }
}

fn try_resolve(url: &str) -> Option<String> {
    let parsed = parse_lenient(url)?;
    let segments = match parsed.path_segments() {
        Some(segments) => segments
            .filter(|s| !s.is_empty())
            .map(|s| urlencoding::decode(s).ok().map(|c| c.into_owned()))
            .collect::<Option<Vec<String>>>()?,
        None => Vec::new(),
    };
    if segments.is_empty() {
        let name = parsed.host_str().unwrap_or(parsed.path());
        return (!name.is_empty()).then(|| name.to_string());
    }

    let name = if let Some(pos) = segments.iter().position(|s| s == "city") {
        let city = segments.get(pos + 1)?;
        let location = strip_trailing_id(segments.get(pos + 2)?);
        if location.is_empty() {
            return None;
        }
        format!("{city}{CITY_SEPARATOR}{location}")
    } else if let Some(pos) = segments.iter().position(|s| s == "restaurants") {
        strip_trailing_id(segments.get(pos + 1)?)
            .split('-')
            .filter(|word| !word.is_empty())
            .map(upcase)
            .join(" ")
    } else {
        segments.last()?.clone()
    };

    (!name.is_empty()).then_some(name)
}

/// Parse `url`, retrying with an `https://` prefix when the scheme is missing.
fn parse_lenient(url: &str) -> Option<Url> {
    let url = url.trim();
    if url.is_empty() {
        return None;
    }
    match Url::parse(url) {
        Ok(parsed) => Some(parsed),
        Err(_) if !url.contains("://") => Url::parse(&format!("https://{url}")).ok(),
        Err(_) => None,
    }
}

/// Cut a slug at its trailing identifier.
fn strip_trailing_id(segment: &str) -> &str {
    match TRAILING_ID.find(segment) {
        Some(m) => &segment[..m.start()],
        None => segment,
    }
}
