//! Small string and filesystem helpers shared across the crate:
//! - Capitalization and slugification for store names and file names
//! - String truncation for logging
//! - Output directory defaults, naming and validation

use chrono::{DateTime, Local};
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, instrument};

const PROBE_FILE: &str = ".offers_probe_write";

/// Truncate a string for logging purposes.
///
/// Long strings are truncated to `max` characters with an ellipsis and
/// byte count indicator appended.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        None => s.to_string(),
        Some((cut, _)) => format!("{}…(+{} bytes)", &s[..cut], s.len() - cut),
    }
}

/// Turn free text into a lowercase, underscore-separated file name stem.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(slugify("Burger Singh"), "burger_singh");
/// assert_eq!(slugify("Wow! Momo"), "wow_momo");
/// ```
pub fn slugify(text: &str) -> String {
    text.to_lowercase()
        .replace(|c: char| !c.is_alphanumeric() && c != ' ' && c != '-' && c != '_', "")
        .split(|c: char| c == ' ' || c == '-' || c == '_')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}

/// Capitalize the first character of a string, leaving the rest untouched.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(upcase("hello"), "Hello");
/// assert_eq!(upcase(""), "");
/// ```
pub fn upcase(s: &str) -> String {
    let mut c = s.chars();
    match c.next() {
        None => String::new(),
        Some(f) => f.to_uppercase().collect::<String>() + c.as_str(),
    }
}

/// The user's desktop, or the current directory when `HOME` is not set.
pub fn default_output_dir() -> PathBuf {
    match std::env::var_os("HOME") {
        Some(home) => Path::new(&home).join("Desktop"),
        None => PathBuf::from("."),
    }
}

/// Build `<prefix>_offers_<YYYYmmdd_HHMMSS>.<ext>` for the given instant.
pub fn timestamped_filename(prefix: &str, at: DateTime<Local>, ext: &str) -> String {
    let stem = slugify(prefix);
    let stamp = at.format("%Y%m%d_%H%M%S");
    if stem.is_empty() {
        format!("offers_{stamp}.{ext}")
    } else {
        format!("{stem}_offers_{stamp}.{ext}")
    }
}

/// Create `path` if needed and prove it accepts writes with a probe file.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn ensure_writable_dir(path: &Path) -> io::Result<()> {
    fs::create_dir_all(path).await?;
    let probe = path.join(PROBE_FILE);
    fs::write(&probe, b"").await?;
    let _ = fs::remove_file(&probe).await;
    info!("Output directory is writable");
    Ok(())
}
