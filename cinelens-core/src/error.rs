//! Error types for the cinelens-core crate.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for loading, cleaning, storing and reporting.
#[derive(Debug, Error)]
pub enum CinelensError {
    #[error("File not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("Error reading file {}: {message}", path.display())]
    Load { path: PathBuf, message: String },

    #[error("Table is empty, skipping {0}")]
    EmptyInput(String),

    #[error("Cannot fill column '{column}': {statistic} is undefined ({reason})")]
    UndefinedStatistic {
        column: String,
        statistic: String,
        reason: String,
    },

    #[error("Invalid choice: {0}")]
    InvalidChoice(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Query error: {0}")]
    Query(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

impl CinelensError {
    pub fn load(path: impl Into<PathBuf>, msg: impl Into<String>) -> Self {
        Self::Load {
            path: path.into(),
            message: msg.into(),
        }
    }

    pub fn empty_input(stage: impl Into<String>) -> Self {
        Self::EmptyInput(stage.into())
    }

    pub fn undefined_statistic(
        column: impl Into<String>,
        statistic: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::UndefinedStatistic {
            column: column.into(),
            statistic: statistic.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_choice(msg: impl Into<String>) -> Self {
        Self::InvalidChoice(msg.into())
    }

    pub fn persistence(msg: impl Into<String>) -> Self {
        Self::Persistence(msg.into())
    }

    pub fn query(msg: impl Into<String>) -> Self {
        Self::Query(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Short, stable name of the failure kind, used in status lines.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "NotFoundError",
            Self::Load { .. } => "LoadError",
            Self::EmptyInput(_) => "EmptyInputError",
            Self::UndefinedStatistic { .. } => "UndefinedStatisticError",
            Self::InvalidChoice(_) => "InvalidChoice",
            Self::Persistence(_) => "PersistenceError",
            Self::Query(_) | Self::Sqlite(_) => "QueryError",
            Self::Config(_) => "ConfigError",
            Self::Io(_) => "IoError",
        }
    }

    /// Whether the menu loop may report this error and carry on.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::InvalidChoice(_) | Self::Query(_) | Self::EmptyInput(_) | Self::Sqlite(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, CinelensError>;
