//! # cinelens-core
//!
//! Loads a movie metadata file, cleans it with a fixed pipeline, persists the
//! cleaned table to SQLite and runs a catalog of aggregate reports over it.
//!
//! ```text
//! file -> data::load -> Table -> data::clean -> CleanedTable
//!      -> store::TableStore::persist -> reports::execute -> canvas
//! ```

// Foundation
pub mod config;
pub mod error;
pub mod persistence;

// Pipeline
pub mod data;

// Store and reports
pub mod reports;
pub mod store;

// Presentation
pub mod canvas;

// Re-exports
pub use canvas::{ChartKind, ChartOptions, ChartSpec};
pub use config::CinelensConfig;
pub use data::{Cell, CleanedTable, CleaningReport, Table, TableProfile, clean, load, profile};
pub use error::{CinelensError, Result};
pub use reports::{ReportSpec, execute, find_report, list_reports};
pub use store::{PersistMode, SqliteStore, TableStore};
