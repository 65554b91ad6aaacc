//! Row loader: reads a delimited file into a [`Table`].

use crate::config::InputConfig;
use crate::data::schema::{infer_raw_column_type, parse_cell};
use crate::data::table::Table;
use crate::error::{CinelensError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::io;
use std::path::{Path, PathBuf};

/// How a delimited file is parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOptions {
    pub delimiter: u8,
    /// Fields equal to one of these tokens are read as missing.
    pub na_values: Vec<String>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            na_values: crate::config::default_na_values(),
        }
    }
}

impl From<&InputConfig> for LoadOptions {
    fn from(config: &InputConfig) -> Self {
        Self {
            delimiter: config.delimiter as u8,
            na_values: config.na_values.clone(),
        }
    }
}

/// Where a loaded table came from, recorded alongside the persisted table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceInfo {
    pub location: String,
    pub sha256: String,
    pub row_count: usize,
    pub column_count: usize,
    pub loaded_at: DateTime<Utc>,
}

/// CSV file data source.
#[derive(Debug, Clone)]
pub struct CsvSource {
    pub path: PathBuf,
    pub options: LoadOptions,
}

impl CsvSource {
    pub fn new(path: impl Into<PathBuf>, options: LoadOptions) -> Self {
        Self {
            path: path.into(),
            options,
        }
    }

    /// Read and type the whole file.
    pub fn read(&self) -> Result<Table> {
        let file = std::fs::File::open(&self.path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => CinelensError::NotFound {
                path: self.path.clone(),
            },
            _ => CinelensError::load(&self.path, e.to_string()),
        })?;

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.options.delimiter)
            .has_headers(true)
            .trim(csv::Trim::None)
            .from_reader(file);

        let columns: Vec<String> = reader
            .headers()
            .map_err(|e| CinelensError::load(&self.path, e.to_string()))?
            .iter()
            .map(str::to_string)
            .collect();
        if columns.is_empty() || columns.iter().all(String::is_empty) {
            return Err(CinelensError::load(&self.path, "no header row"));
        }

        let mut raw: Vec<Vec<Option<String>>> = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| CinelensError::load(&self.path, e.to_string()))?;
            let row = record
                .iter()
                .map(|field| {
                    if self.is_na(field) {
                        None
                    } else {
                        Some(field.to_string())
                    }
                })
                .collect();
            raw.push(row);
        }

        let dtypes: Vec<_> = (0..columns.len())
            .map(|i| infer_raw_column_type(raw.iter().map(|row| row[i].as_deref())))
            .collect();

        let rows = raw
            .iter()
            .map(|row| {
                row.iter()
                    .zip(&dtypes)
                    .map(|(value, dtype)| parse_cell(value.as_deref(), *dtype))
                    .collect()
            })
            .collect();

        Ok(Table::new(columns, rows))
    }

    /// Describe the source for the load record.
    pub fn source_info(&self, table: &Table) -> Result<SourceInfo> {
        Ok(SourceInfo {
            location: self.path.display().to_string(),
            sha256: hash_file(&self.path)?,
            row_count: table.row_count(),
            column_count: table.column_count(),
            loaded_at: Utc::now(),
        })
    }

    fn is_na(&self, field: &str) -> bool {
        self.options.na_values.iter().any(|na| na == field)
    }
}

/// Load a delimited file, reporting the failure kind to the caller.
pub fn try_load(path: &Path, options: &LoadOptions) -> Result<Table> {
    CsvSource::new(path, options.clone()).read()
}

/// Load a delimited file. Failures are logged and yield an empty table, so
/// callers must treat an empty result as "loading failed".
pub fn load(path: &Path, options: &LoadOptions) -> Table {
    match try_load(path, options) {
        Ok(table) => {
            tracing::info!(
                path = %path.display(),
                rows = table.row_count(),
                columns = table.column_count(),
                "File successfully loaded from: {}",
                path.display()
            );
            table
        }
        Err(e @ CinelensError::NotFound { .. }) => {
            tracing::error!(kind = e.kind(), "File not found at: {}", path.display());
            Table::empty()
        }
        Err(e) => {
            tracing::error!(kind = e.kind(), "Error reading file: {e}");
            Table::empty()
        }
    }
}

/// Compute SHA-256 hash of file contents.
pub fn hash_file(path: &Path) -> Result<String> {
    let content = std::fs::read(path)?;
    let mut hasher = Sha256::new();
    hasher.update(&content);
    Ok(format!("{:x}", hasher.finalize()))
}
