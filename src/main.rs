//! # store_offers
//!
//! Scrapes promotional offers from a list of store pages and saves them as
//! a grouped CSV file (and optionally JSON).
//!
//! ## Usage
//!
//! ```sh
//! store_offers --stores stores.txt -o ./out --brand "Burger Singh"
//! ```
//!
//! Press Ctrl-C at any time: the run stops after the current store and the
//! offers collected so far are still saved.

use chrono::Local;
use clap::Parser;
use std::error::Error;
use store_offers::cli::Cli;
use store_offers::config::{self, FileConfig, Settings};
use store_offers::outputs::{json, table};
use store_offers::render::HttpRenderer;
use store_offers::runner::OfferRun;
use store_offers::utils::{ensure_writable_dir, timestamped_filename};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{fmt as tfmt, EnvFilter};

/// Log a summary line every this many stores.
const PROGRESS_EVERY: usize = 10;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("store_offers starting up");

    // Parse CLI
    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let file_config = match &args.config {
        Some(path) => config::load(path)?,
        None => FileConfig::default(),
    };
    let settings = Settings::resolve(&args, file_config)?;
    info!(
        stores = settings.stores.len(),
        output_dir = %settings.output_dir.display(),
        "Configuration resolved"
    );

    // Early check: ensure output dir is writable
    if let Err(e) = ensure_writable_dir(&settings.output_dir).await {
        error!(
            path = %settings.output_dir.display(),
            error = %e,
            "Output directory is not writable (fix perms or choose a different path)"
        );
        return Err(e.into());
    }

    // ---- Ctrl-C stops the run between stores ----
    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Scraping interrupted by user. Saving collected data...");
                cancel.cancel();
            }
        });
    }

    // ---- Scrape ----
    let report = OfferRun::new(&settings.stores)
        .with_pacing(settings.pacing)
        .with_cancellation(cancel)
        .on_progress(|p| {
            if p.processed % PROGRESS_EVERY == 0 {
                info!(
                    "--- Progress: {}/{} stores completed, {} total offers found ---",
                    p.processed, p.total, p.offers
                );
            }
        })
        .run(|| HttpRenderer::new(&settings.render))
        .await?;

    for failed in report.failed() {
        warn!(url = %failed.url, state = ?failed.state, "Store yielded no offers");
    }

    if report.offers.is_empty() {
        info!("No offers to save!");
        return Ok(());
    }

    // ---- Output ----
    let now = Local::now();
    let csv_name = settings
        .filename
        .clone()
        .unwrap_or_else(|| timestamped_filename(&settings.brand, now, "csv"));
    let csv_path = settings.output_dir.join(&csv_name);
    table::write_table(&report.offers, settings.columns, &csv_path).await?;
    info!(
        path = %csv_path.display(),
        count = report.offers.len(),
        "Offers saved"
    );

    if settings.json {
        let json_path = csv_path.with_extension("json");
        if let Err(e) = json::write_records(&report.offers, &json_path).await {
            error!(path = %json_path.display(), error = %e, "Failed to write JSON");
        }
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        cancelled = report.cancelled,
        "Execution complete"
    );

    Ok(())
}
