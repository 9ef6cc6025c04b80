//! Run configuration: YAML file, store lists and CLI overrides.
//!
//! Precedence is CLI, then the YAML file, then built-in defaults. The store
//! list is the concatenation of the YAML `stores`, the `--stores` file and
//! positional URLs, in that order, and is never modified during a run.
//!
//! ```yaml
//! brand: Burger Singh
//! stores:
//!   - https://www.swiggy.com/restaurants/burger-singh-big-punjabi-burgers-ganeshguri-guwahati-579784
//!   - https://www.swiggy.com/restaurants/burger-singh-big-punjabi-burgers-stational-club-durga-mandir-purnea-purnea-698848
//! pacing_min_secs: 2
//! pacing_max_secs: 5
//! timeout_secs: 10
//! columns: offers
//! json: false
//! ```

use crate::cli::Cli;
use crate::error::ConfigError;
use crate::outputs::table::Columns;
use crate::render::RenderSettings;
use crate::runner::Pacing;
use crate::utils::default_output_dir;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, instrument};

/// Contents of the optional YAML config file.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub brand: Option<String>,
    pub stores: Vec<String>,
    pub output_dir: Option<PathBuf>,
    pub pacing_min_secs: Option<f64>,
    pub pacing_max_secs: Option<f64>,
    pub timeout_secs: Option<u64>,
    pub user_agent: Option<String>,
    pub columns: Option<Columns>,
    pub json: Option<bool>,
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone)]
pub struct Settings {
    pub brand: String,
    pub stores: Vec<String>,
    pub output_dir: PathBuf,
    pub filename: Option<String>,
    pub pacing: Pacing,
    pub render: RenderSettings,
    pub columns: Columns,
    pub json: bool,
}

/// Load a YAML config file.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub fn load(path: &Path) -> Result<FileConfig, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config = serde_yaml::from_str::<FileConfig>(&text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    info!(stores = config.stores.len(), "Loaded config file");
    Ok(config)
}

/// Read a newline-delimited store list.
pub fn read_store_list(path: &Path) -> Result<Vec<String>, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(parse_store_list(&text))
}

/// One URL per line; blank lines and `#` comments are skipped.
pub fn parse_store_list(text: &str) -> Vec<String> {
    text.lines()
        .map(|line| line.split('#').next().unwrap_or_default().trim())
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

impl Settings {
    /// Merge CLI arguments over `file` and the defaults.
    ///
    /// # Errors
    ///
    /// [`ConfigError::NoStores`] when no URL was given anywhere,
    /// [`ConfigError::InvalidPacing`] for negative, non-finite or overflowing
    /// delays, and read errors for the `--stores` file.
    pub fn resolve(cli: &Cli, file: FileConfig) -> Result<Self, ConfigError> {
        let mut stores = file.stores;
        if let Some(path) = &cli.stores {
            stores.extend(read_store_list(path)?);
        }
        stores.extend(cli.urls.iter().map(|u| u.trim().to_string()));
        stores.retain(|u| !u.is_empty());
        if stores.is_empty() {
            return Err(ConfigError::NoStores);
        }

        let defaults = Pacing::default();
        let min = cli
            .pacing_min
            .or(file.pacing_min_secs)
            .unwrap_or(defaults.min.as_secs_f64());
        let max = cli
            .pacing_max
            .or(file.pacing_max_secs)
            .unwrap_or(defaults.max.as_secs_f64());
        let invalid = |_| ConfigError::InvalidPacing { min, max };
        let pacing = Pacing::new(
            Duration::try_from_secs_f64(min).map_err(invalid)?,
            Duration::try_from_secs_f64(max).map_err(invalid)?,
        );

        let mut render = RenderSettings::default();
        if let Some(secs) = cli.timeout.or(file.timeout_secs) {
            render.timeout = Duration::from_secs(secs);
        }
        if let Some(agent) = cli.user_agent.clone().or(file.user_agent) {
            render.user_agent = agent;
        }

        Ok(Self {
            brand: cli.brand.clone().or(file.brand).unwrap_or_default(),
            stores,
            output_dir: cli
                .output_dir
                .clone()
                .or(file.output_dir)
                .unwrap_or_else(default_output_dir),
            filename: cli.filename.clone(),
            pacing,
            render,
            columns: cli.columns.or(file.columns).unwrap_or_default(),
            json: cli.json || file.json.unwrap_or(false),
        })
    }
}
