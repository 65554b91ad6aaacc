//! Storage type decisions for table columns.

use crate::data::table::{Cell, Table};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Column storage type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    Integer,
    Float,
    /// Also used for a column whose every cell is missing.
    Text,
}

impl ColumnType {
    /// SQLite column affinity used when the column is persisted.
    pub fn sql_type(self) -> &'static str {
        match self {
            Self::Integer => "INTEGER",
            Self::Float => "REAL",
            Self::Text => "TEXT",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Integer => "int64",
            Self::Float => "float64",
            Self::Text => "object",
        };
        f.write_str(name)
    }
}

/// Decide the storage type of a raw text column. `None` marks a missing field.
pub fn infer_raw_column_type<'a>(values: impl IntoIterator<Item = Option<&'a str>>) -> ColumnType {
    let mut seen = false;
    let mut all_int = true;
    let mut all_float = true;

    for value in values.into_iter().flatten() {
        seen = true;
        if all_int && value.parse::<i64>().is_err() {
            all_int = false;
        }
        if !all_int && value.parse::<f64>().is_err() {
            all_float = false;
            break;
        }
    }

    match (seen, all_int, all_float) {
        (true, true, _) => ColumnType::Integer,
        (true, false, true) => ColumnType::Float,
        _ => ColumnType::Text,
    }
}

/// Convert a raw field into a cell of the column's storage type.
pub fn parse_cell(value: Option<&str>, dtype: ColumnType) -> Cell {
    let Some(value) = value else {
        return Cell::Missing;
    };
    match dtype {
        ColumnType::Integer => value.parse().map(Cell::Int).unwrap_or(Cell::Missing),
        ColumnType::Float => value.parse().map(Cell::Float).unwrap_or(Cell::Missing),
        ColumnType::Text => Cell::text(value),
    }
}

/// Storage type of a column that is already made of cells.
pub fn column_type(table: &Table, idx: usize) -> ColumnType {
    let mut seen = false;
    let mut all_int = true;
    for row in &table.rows {
        match &row[idx] {
            Cell::Missing => continue,
            Cell::Int(_) => seen = true,
            Cell::Float(_) => {
                seen = true;
                all_int = false;
            }
            Cell::Text(_) => return ColumnType::Text,
        }
    }
    match (seen, all_int) {
        (false, _) => ColumnType::Text,
        (true, true) => ColumnType::Integer,
        (true, false) => ColumnType::Float,
    }
}
