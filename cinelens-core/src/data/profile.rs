//! Table profile: per-column storage types and null counts, duplicate rows.

use crate::data::schema::{ColumnType, column_type};
use crate::data::table::Table;
use serde::Serialize;
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnProfile {
    pub name: String,
    pub dtype: ColumnType,
    pub null_count: usize,
    pub null_percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableProfile {
    pub total_rows: usize,
    pub total_columns: usize,
    pub columns: Vec<ColumnProfile>,
    pub duplicate_rows: usize,
}

impl TableProfile {
    pub fn total_nulls(&self) -> usize {
        self.columns.iter().map(|c| c.null_count).sum()
    }
}

/// Profile a table.
pub fn profile(table: &Table) -> TableProfile {
    let total_rows = table.row_count();

    let columns = table
        .columns
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let null_count = table.missing_count(i);
            let null_percentage = if total_rows > 0 {
                null_count as f64 / total_rows as f64 * 100.0
            } else {
                0.0
            };
            ColumnProfile {
                name: name.clone(),
                dtype: column_type(table, i),
                null_count,
                null_percentage,
            }
        })
        .collect();

    let mut seen = HashSet::new();
    let duplicate_rows = table.rows.iter().filter(|row| !seen.insert(*row)).count();

    TableProfile {
        total_rows,
        total_columns: table.column_count(),
        columns,
        duplicate_rows,
    }
}
