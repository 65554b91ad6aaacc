//! Column statistics used to fill missing cells.

use crate::data::table::Cell;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// A statistic computed from the non-missing values of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Statistic {
    Median,
    Mean,
    Mode,
}

impl fmt::Display for Statistic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Median => "median",
            Self::Mean => "mean",
            Self::Mode => "mode",
        })
    }
}

/// Why a statistic could not be computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatError {
    NoValues,
    NotNumeric,
}

impl fmt::Display for StatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NoValues => "column has no non-missing values",
            Self::NotNumeric => "column is not numeric",
        })
    }
}

fn numeric_values<'a>(cells: impl IntoIterator<Item = &'a Cell>) -> Result<Vec<f64>, StatError> {
    let mut values = Vec::new();
    for cell in cells {
        match cell {
            Cell::Missing => {}
            Cell::Text(_) => return Err(StatError::NotNumeric),
            other => values.extend(other.as_f64()),
        }
    }
    if values.is_empty() {
        return Err(StatError::NoValues);
    }
    Ok(values)
}

/// Median of the numeric cells; the mean of the two middle values for an even count.
pub fn median<'a>(cells: impl IntoIterator<Item = &'a Cell>) -> Result<f64, StatError> {
    let mut values = numeric_values(cells)?;
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Ok((values[mid - 1] + values[mid]) / 2.0)
    } else {
        Ok(values[mid])
    }
}

pub fn mean<'a>(cells: impl IntoIterator<Item = &'a Cell>) -> Result<f64, StatError> {
    let values = numeric_values(cells)?;
    Ok(values.iter().sum::<f64>() / values.len() as f64)
}

/// Most frequent non-missing cell. Ties go to the smallest value in cell
/// order, which is the lexicographically smallest string for text columns.
pub fn mode<'a>(cells: impl IntoIterator<Item = &'a Cell>) -> Result<Cell, StatError> {
    let mut counts: HashMap<&Cell, usize> = HashMap::new();
    for cell in cells {
        if !cell.is_missing() {
            *counts.entry(cell).or_default() += 1;
        }
    }
    counts
        .into_iter()
        .max_by(|(a, ca), (b, cb)| ca.cmp(cb).then_with(|| b.cmp(a)))
        .map(|(cell, _)| cell.clone())
        .ok_or(StatError::NoValues)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ints(values: &[Option<i64>]) -> Vec<Cell> {
        values.iter().map(|v| Cell::from(*v)).collect()
    }

    #[test]
    fn test_median_odd_and_even() {
        assert_eq!(median(&ints(&[Some(3), None, Some(1), Some(2)])), Ok(2.0));
        assert_eq!(median(&ints(&[Some(4), Some(1), Some(2), Some(3)])), Ok(2.5));
    }

    #[test]
    fn test_mean() {
        assert_eq!(mean(&ints(&[Some(1), Some(2), None, Some(6)])), Ok(3.0));
    }

    #[test]
    fn test_numeric_statistic_errors() {
        assert_eq!(median(&ints(&[None, None])), Err(StatError::NoValues));
        let text = vec![Cell::text("a"), Cell::Missing];
        assert_eq!(mean(&text), Err(StatError::NotNumeric));
    }

    #[test]
    fn test_mode_picks_most_frequent() {
        let cells = vec![
            Cell::text("English"),
            Cell::text("French"),
            Cell::Missing,
            Cell::text("English"),
        ];
        assert_eq!(mode(&cells), Ok(Cell::text("English")));
    }

    #[test]
    fn test_mode_tie_breaks_to_smallest() {
        let cells = vec![
            Cell::text("Spanish"),
            Cell::text("English"),
            Cell::text("Spanish"),
            Cell::text("English"),
        ];
        assert_eq!(mode(&cells), Ok(Cell::text("English")));

        let ratios = vec![Cell::Float(2.35), Cell::Float(1.85)];
        assert_eq!(mode(&ratios), Ok(Cell::Float(1.85)));
    }

    #[test]
    fn test_mode_of_missing_column() {
        assert_eq!(mode(&[Cell::Missing]), Err(StatError::NoValues));
    }
}
