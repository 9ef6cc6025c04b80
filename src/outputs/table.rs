//! Grouped CSV table of offers.
//!
//! Consecutive rows for the same store only carry the store name and URL on
//! the first row; later rows leave both columns blank:
//!
//! ```text
//! store_name,store_url,title,description
//! Burger Singh Ganeshguri,https://…/burger-singh-ganeshguri-579784,20% off,BURGER20
//! ,,Free fries,N/A
//! Burger Singh Purnea,https://…/burger-singh-purnea-698848,Flat 50 off,N/A
//! ```
//!
//! This is lossless as long as each store's records are contiguous, which
//! the runner guarantees by finishing one store before starting the next.

use crate::error::OutputError;
use crate::models::OfferRecord;
use serde::Deserialize;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

/// Header labels for the exported table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Columns {
    /// `store_name,store_url,title,description`
    #[default]
    Offers,
    /// `store_name,store_url,discounts,CODE`
    Codes,
}

impl Columns {
    pub fn header(self) -> [&'static str; 4] {
        match self {
            Columns::Offers => ["store_name", "store_url", "title", "description"],
            Columns::Codes => ["store_name", "store_url", "discounts", "CODE"],
        }
    }
}

/// Encode `records` as a grouped CSV table.
pub fn encode(records: &[OfferRecord], columns: Columns) -> Result<String, OutputError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(columns.header())?;

    let mut last_store: Option<&str> = None;
    for record in records {
        let (name, url) = if last_store == Some(record.store_name.as_str()) {
            ("", "")
        } else {
            last_store = Some(&record.store_name);
            (record.store_name.as_str(), record.store_url.as_str())
        };
        writer.write_record([name, url, record.title.as_str(), record.description.as_str()])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| OutputError::Io(e.into_error()))?;
    Ok(String::from_utf8(bytes)?)
}

/// Decode a grouped table, filling blank store columns from the row above.
///
/// The header row is skipped whichever column labels it uses.
pub fn decode(text: &str) -> Result<Vec<OfferRecord>, OutputError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(text.as_bytes());

    let mut records = Vec::new();
    let mut store_name = String::new();
    let mut store_url = String::new();
    for row in reader.records() {
        let row = row?;
        let field = |i: usize| row.get(i).unwrap_or_default().to_string();
        if !field(0).is_empty() || !field(1).is_empty() {
            store_name = field(0);
            store_url = field(1);
        }
        records.push(OfferRecord {
            store_name: store_name.clone(),
            store_url: store_url.clone(),
            title: field(2),
            description: field(3),
        });
    }
    Ok(records)
}

/// Encode `records` and write them to `path`.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn write_table(
    records: &[OfferRecord],
    columns: Columns,
    path: &Path,
) -> Result<(), OutputError> {
    let table = encode(records, columns)?;
    fs::write(path, table).await?;
    info!(count = records.len(), "Wrote offers table");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offer(store: &str, url: &str, title: &str, description: &str) -> OfferRecord {
        OfferRecord {
            store_name: store.to_string(),
            store_url: url.to_string(),
            title: title.to_string(),
            description: description.to_string(),
        }
    }

    fn sample() -> Vec<OfferRecord> {
        vec![
            offer("Ganeshguri", "https://x.com/restaurants/ganeshguri-1", "20% off", "BURGER20"),
            offer("Ganeshguri", "https://x.com/restaurants/ganeshguri-1", "Free fries", "N/A"),
            offer("Purnea", "https://x.com/restaurants/purnea-2", "Flat 50 off", "Orders above ₹299"),
            offer("Purnea", "https://x.com/restaurants/purnea-2", "Buy 1, get \"1\"", "Line one\nline two"),
            offer("Ganeshguri", "https://x.com/restaurants/ganeshguri-1", "Late night deal", "N/A"),
        ]
    }

    #[test]
    fn test_encode_single_offer() {
        let records = vec![offer(
            "Burger Singh Ganeshguri",
            "https://www.swiggy.com/restaurants/burger-singh-ganeshguri-579784",
            "20% off",
            "Use code BURGER20",
        )];
        let table = encode(&records, Columns::Offers).unwrap();
        let lines = table.lines().collect::<Vec<_>>();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "store_name,store_url,title,description");
        assert_eq!(
            lines[1],
            "Burger Singh Ganeshguri,https://www.swiggy.com/restaurants/burger-singh-ganeshguri-579784,20% off,Use code BURGER20"
        );
    }

    #[test]
    fn test_encode_blanks_repeated_store_columns() {
        let table = encode(&sample()[..3], Columns::Offers).unwrap();
        let lines = table.lines().collect::<Vec<_>>();
        assert_eq!(lines[1], "Ganeshguri,https://x.com/restaurants/ganeshguri-1,20% off,BURGER20");
        assert_eq!(lines[2], ",,Free fries,N/A");
        assert_eq!(lines[3], "Purnea,https://x.com/restaurants/purnea-2,Flat 50 off,Orders above ₹299");
    }

    #[test]
    fn test_encode_code_header() {
        let table = encode(&[], Columns::Codes).unwrap();
        assert_eq!(table.lines().collect::<Vec<_>>(), vec!["store_name,store_url,discounts,CODE"]);
    }

    #[test]
    fn test_encode_quotes_separators() {
        let table = encode(&sample()[3..4], Columns::Offers).unwrap();
        assert!(table.contains("\"Buy 1, get \"\"1\"\"\""));
        assert!(table.contains("\"Line one\nline two\""));
    }

    #[test]
    fn test_round_trip() {
        let records = sample();
        for columns in [Columns::Offers, Columns::Codes] {
            let table = encode(&records, columns).unwrap();
            assert_eq!(decode(&table).unwrap(), records);
        }
    }

    #[test]
    fn test_decode_header_only() {
        assert!(decode("store_name,store_url,title,description\n").unwrap().is_empty());
    }

    #[test]
    fn test_decode_rejects_ragged_rows() {
        let text = "store_name,store_url,title,description\nA,u,t\n";
        assert!(matches!(decode(text), Err(OutputError::Csv(_))));
    }

    #[tokio::test]
    async fn test_write_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("offers.csv");
        write_table(&sample(), Columns::Offers, &path).await.unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(decode(&text).unwrap(), sample());
    }
}
