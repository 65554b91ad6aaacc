//! Data pipeline: loading, typing, cleaning and profiling of the movie table.

pub mod clean;
pub mod profile;
pub mod schema;
pub mod source;
pub mod stats;
pub mod table;

pub use clean::{Cleaned, CleaningPipeline, CleaningReport, CleaningStage, clean};
pub use profile::{TableProfile, profile};
pub use schema::ColumnType;
pub use source::{CsvSource, LoadOptions, SourceInfo, load, try_load};
pub use table::{Cell, CleanedTable, Table};
