//! Output generation for collected offers.
//!
//! # Submodules
//!
//! - [`table`]: Grouped CSV table (the primary export) and its decoder
//! - [`json`]: Flat JSON array of records
//!
//! # Output Structure
//!
//! ```text
//! output_dir/
//! ├── burger_singh_offers_20250506_203005.csv
//! └── burger_singh_offers_20250506_203005.json   # with --json
//! ```

pub mod json;
pub mod table;
