//! Command-line interface definitions for store_offers.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! Most options can also come from a YAML config file (see [`crate::config`]);
//! values given on the command line win.

use crate::outputs::table::Columns;
use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for store_offers.
///
/// # Examples
///
/// ```sh
/// # Scrape two stores, write the CSV to ~/Desktop
/// store_offers https://www.swiggy.com/restaurants/burger-singh-ganeshguri-guwahati-579784 \
///              https://www.swiggy.com/restaurants/burger-singh-purnea-698848
///
/// # Read the store list from a file, write CSV and JSON to ./out
/// store_offers --stores stores.txt -o ./out --json
///
/// # Everything from a config file
/// store_offers --config offers.yaml
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Store page URLs to scrape, in order
    pub urls: Vec<String>,

    /// File with one store URL per line (`#` starts a comment)
    #[arg(short, long)]
    pub stores: Option<PathBuf>,

    /// Optional path to a YAML config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output directory for the exported files [default: ~/Desktop]
    #[arg(short, long, env = "OFFERS_OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Output file name; defaults to `<brand>_offers_<timestamp>.csv`
    #[arg(short, long)]
    pub filename: Option<String>,

    /// Brand name used as the file name prefix
    #[arg(short, long)]
    pub brand: Option<String>,

    /// Header labels for the exported table
    #[arg(long, value_enum)]
    pub columns: Option<Columns>,

    /// Also write the offers as JSON next to the CSV
    #[arg(long)]
    pub json: bool,

    /// Minimum delay between stores, in seconds
    #[arg(long)]
    pub pacing_min: Option<f64>,

    /// Maximum delay between stores, in seconds
    #[arg(long)]
    pub pacing_max: Option<f64>,

    /// Page load timeout, in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// User agent sent with every page request
    #[arg(long, env = "OFFERS_USER_AGENT")]
    pub user_agent: Option<String>,
}
