//! Configuration system for Cinelens.
//!
//! Uses `figment` for layered configuration: defaults -> user config file ->
//! workspace config file -> explicit config file -> environment.
//! CLI flags are applied by the binary on top of the extracted value.

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CinelensConfig {
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub charts: ChartConfig,
    #[serde(default)]
    pub report: ReportConfig,
}

/// Input file configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputConfig {
    /// Path of the movie metadata file.
    #[serde(default = "default_input_path")]
    pub path: PathBuf,
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
    /// Field values read as missing.
    #[serde(default = "default_na_values")]
    pub na_values: Vec<String>,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            path: default_input_path(),
            delimiter: default_delimiter(),
            na_values: default_na_values(),
        }
    }
}

fn default_input_path() -> PathBuf {
    PathBuf::from("movie_metadata.csv")
}

fn default_delimiter() -> char {
    ','
}

/// The usual missing-value markers of delimited data exports.
pub fn default_na_values() -> Vec<String> {
    [
        "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
        "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// Relational store configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,
    /// Destination table for the cleaned data.
    #[serde(default = "default_table_name")]
    pub table_name: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            table_name: default_table_name(),
        }
    }
}

fn default_database_path() -> PathBuf {
    PathBuf::from("cinelens.db")
}

fn default_table_name() -> String {
    "movie_data".to_string()
}

/// Chart rendering configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartConfig {
    /// Directory that receives rendered chart pages.
    #[serde(default = "default_chart_dir")]
    pub output_dir: PathBuf,
    /// Category labels longer than this wrap onto several lines.
    #[serde(default = "default_label_wrap_width")]
    pub label_wrap_width: usize,
    #[serde(default = "default_histogram_bins")]
    pub histogram_bins: usize,
    /// Open rendered charts in the default browser.
    #[serde(default)]
    pub open_in_browser: bool,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            output_dir: default_chart_dir(),
            label_wrap_width: default_label_wrap_width(),
            histogram_bins: default_histogram_bins(),
            open_in_browser: false,
        }
    }
}

fn default_chart_dir() -> PathBuf {
    PathBuf::from("charts")
}

fn default_label_wrap_width() -> usize {
    15
}

fn default_histogram_bins() -> usize {
    10
}

/// Text report configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Rows printed for a report result.
    #[serde(default = "default_preview_rows")]
    pub preview_rows: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            preview_rows: default_preview_rows(),
        }
    }
}

fn default_preview_rows() -> usize {
    10
}

impl CinelensConfig {
    /// Resolve relative paths against the workspace directory.
    pub fn resolve_paths(&mut self, workspace: &Path) {
        for path in [
            &mut self.input.path,
            &mut self.store.database_path,
            &mut self.charts.output_dir,
        ] {
            if path.is_relative() {
                *path = workspace.join(&*path);
            }
        }
    }

    /// Reject values the loader, store or renderer cannot work with.
    pub fn validate(&self) -> crate::error::Result<()> {
        use crate::error::CinelensError;
        if !self.input.delimiter.is_ascii() {
            return Err(CinelensError::config(format!(
                "input.delimiter must be a single ASCII character, got '{}'",
                self.input.delimiter
            )));
        }
        if self.store.table_name.trim().is_empty() {
            return Err(CinelensError::config("store.table_name must not be empty"));
        }
        if self.charts.label_wrap_width == 0 || self.charts.histogram_bins == 0 {
            return Err(CinelensError::config(
                "charts.label_wrap_width and charts.histogram_bins must be positive",
            ));
        }
        Ok(())
    }
}

/// Workspace-level config file location.
pub fn workspace_config_path(workspace: &Path) -> PathBuf {
    workspace.join(".cinelens").join("config.toml")
}

fn user_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("dev", "cinelens", "cinelens")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Load configuration from all layers.
pub fn load_config(
    workspace: Option<&Path>,
    explicit: Option<&Path>,
) -> Result<CinelensConfig, Box<figment::Error>> {
    let mut figment = Figment::from(Serialized::defaults(CinelensConfig::default()));

    // User-level config
    if let Some(user_config) = user_config_path() {
        if user_config.exists() {
            figment = figment.merge(Toml::file(&user_config));
        }
    }

    // Workspace-level config
    if let Some(ws) = workspace {
        let ws_config = workspace_config_path(ws);
        if ws_config.exists() {
            figment = figment.merge(Toml::file(&ws_config));
        }
    }

    if let Some(path) = explicit {
        figment = figment.merge(Toml::file(path));
    }

    // Environment variables (CINELENS_STORE__TABLE_NAME, CINELENS_INPUT__PATH, etc.)
    figment = figment.merge(Env::prefixed("CINELENS_").split("__"));

    figment.extract().map_err(Box::new)
}

/// Check whether any Cinelens configuration file exists.
pub fn config_exists(workspace: Option<&Path>) -> bool {
    if user_config_path().is_some_and(|p| p.exists()) {
        return true;
    }
    workspace.is_some_and(|ws| workspace_config_path(ws).exists())
}

/// Write the default configuration to the workspace config file.
/// Returns the path written.
pub fn write_default_config(workspace: &Path) -> std::io::Result<PathBuf> {
    let path = workspace_config_path(workspace);
    let toml_str = toml::to_string_pretty(&CinelensConfig::default()).map_err(std::io::Error::other)?;
    crate::persistence::atomic_write(&path, toml_str.as_bytes())?;
    Ok(path)
}
