//! JSON export of offer records.
//!
//! Unlike the grouped table, every record carries its full store name and
//! URL, which makes the file easy to load from other tools.

use crate::error::OutputError;
use crate::models::OfferRecord;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

/// Write `records` to `path` as a pretty-printed JSON array.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn write_records(records: &[OfferRecord], path: &Path) -> Result<(), OutputError> {
    let json = serde_json::to_string_pretty(records)?;
    fs::write(path, json).await?;
    info!(count = records.len(), "Wrote JSON offers file");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_write_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("offers.json");
        let records = vec![OfferRecord {
            store_name: "Ganeshguri".to_string(),
            store_url: "https://x.com/restaurants/ganeshguri-1".to_string(),
            title: "20% off".to_string(),
            description: "BURGER20".to_string(),
        }];

        write_records(&records, &path).await.unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let back: Vec<OfferRecord> = serde_json::from_str(&text).unwrap();
        assert_eq!(back, records);
    }

    #[tokio::test]
    async fn test_write_records_missing_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("offers.json");
        let err = write_records(&[], &path).await.unwrap_err();
        assert!(matches!(err, OutputError::Io(_)));
    }
}
