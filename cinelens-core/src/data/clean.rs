//! Cleaning pipeline.
//!
//! A pipeline is an ordered list of [`CleaningStage`]s. Each stage takes the
//! table by value and returns the next one, so the observable state between
//! stages is exactly the documented stage boundary. Stage order matters: fill
//! statistics are computed from whatever rows survived the earlier stages.

use crate::data::schema::{ColumnType, column_type};
use crate::data::stats::{self, Statistic};
use crate::data::table::{Cell, CleanedTable, Table};
use crate::error::{CinelensError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Rows missing any of these are dropped before numeric filling.
pub const CRITICAL_CATEGORICALS: [&str; 4] =
    ["director_name", "actor_2_name", "actor_3_name", "plot_keywords"];

/// Rows missing any of these are dropped after numeric filling.
pub const FINANCIAL_COLUMNS: [&str; 2] = ["gross", "budget"];

pub const NUMERIC_FILL_RULES: [(&str, Statistic); 6] = [
    ("num_critic_for_reviews", Statistic::Median),
    ("duration", Statistic::Median),
    ("director_facebook_likes", Statistic::Mean),
    ("actor_3_facebook_likes", Statistic::Mean),
    ("actor_1_facebook_likes", Statistic::Mean),
    ("facenumber_in_poster", Statistic::Median),
];

/// `color` labels and their codes. The leading space is part of the label.
pub const COLOR_CODES: [(&str, i64); 2] = [("Color", 1), (" Black and White", 0)];

pub const CONTENT_RATING_DEFAULT: &str = "Not Rated";

/// How missing cells of one column are filled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum FillWith {
    Statistic(Statistic),
    Constant(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FillRule {
    pub column: String,
    pub with: FillWith,
}

impl FillRule {
    pub fn statistic(column: &str, statistic: Statistic) -> Self {
        Self {
            column: column.to_string(),
            with: FillWith::Statistic(statistic),
        }
    }

    pub fn constant(column: &str, value: &str) -> Self {
        Self {
            column: column.to_string(),
            with: FillWith::Constant(value.to_string()),
        }
    }
}

/// A single cleaning step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CleaningStage {
    /// Remove rows equal to an earlier row across every column.
    Deduplicate,
    /// Fill with the column mode, then map labels to integer codes.
    /// Labels outside the mapping become missing. A column already holding
    /// only codes, or nothing at all, is left alone.
    RecodeBinary {
        column: String,
        mapping: Vec<(String, i64)>,
    },
    /// Drop rows missing a value in any of the listed columns.
    DropMissing { columns: Vec<String> },
    /// Fill missing cells per rule. Rules target distinct columns and every
    /// fill value is computed before any column is filled.
    FillMissing { rules: Vec<FillRule> },
}

impl CleaningStage {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Deduplicate => "deduplicate",
            Self::RecodeBinary { .. } => "recode_binary",
            Self::DropMissing { .. } => "drop_missing",
            Self::FillMissing { .. } => "fill_missing",
        }
    }

    /// Columns the stage works on. An empty list means the stage always applies.
    pub fn required_columns(&self) -> Vec<&str> {
        match self {
            Self::Deduplicate => Vec::new(),
            Self::RecodeBinary { column, .. } => vec![column.as_str()],
            Self::DropMissing { columns } => columns.iter().map(String::as_str).collect(),
            Self::FillMissing { rules } => rules.iter().map(|r| r.column.as_str()).collect(),
        }
    }

    /// A stage runs unless every column it needs is absent.
    pub fn applies_to(&self, table: &Table) -> bool {
        let required = self.required_columns();
        required.is_empty() || required.iter().any(|c| table.has_column(c))
    }
}

/// A fill that was applied to a column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FillRecord {
    pub column: String,
    pub method: String,
    pub value: Cell,
    pub cells: usize,
}

/// Record of a stage applied.
#[derive(Debug, Clone, Serialize)]
pub struct StageRecord {
    pub stage: String,
    pub applied_at: DateTime<Utc>,
    pub rows_before: usize,
    pub rows_after: usize,
    pub cells_filled: usize,
    pub decode_failures: usize,
    pub fills: Vec<FillRecord>,
    pub skipped: bool,
}

impl StageRecord {
    fn new(stage: &CleaningStage, rows_before: usize) -> Self {
        Self {
            stage: stage.name().to_string(),
            applied_at: Utc::now(),
            rows_before,
            rows_after: rows_before,
            cells_filled: 0,
            decode_failures: 0,
            fills: Vec::new(),
            skipped: false,
        }
    }

    pub fn rows_removed(&self) -> usize {
        self.rows_before - self.rows_after
    }
}

/// Summary of one pipeline run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CleaningReport {
    /// The input was empty and no stage ran.
    pub skipped: bool,
    pub rows_in: usize,
    pub rows_out: usize,
    pub stages: Vec<StageRecord>,
}

impl CleaningReport {
    pub fn duplicates_removed(&self) -> usize {
        self.stages
            .iter()
            .filter(|s| s.stage == "deduplicate")
            .map(StageRecord::rows_removed)
            .sum()
    }
}

/// Output of the pipeline.
#[derive(Debug, Clone)]
pub struct Cleaned {
    pub table: CleanedTable,
    pub report: CleaningReport,
}

/// A pipeline of cleaning stages.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CleaningPipeline {
    pub stages: Vec<CleaningStage>,
}

impl CleaningPipeline {
    pub fn new() -> Self {
        Self { stages: Vec::new() }
    }

    pub fn add_stage(mut self, stage: CleaningStage) -> Self {
        self.stages.push(stage);
        self
    }

    /// The movie metadata cleaning sequence.
    pub fn movie_default() -> Self {
        let owned = |cols: &[&str]| -> Vec<String> { cols.iter().map(|c| c.to_string()).collect() };
        Self::new()
            .add_stage(CleaningStage::Deduplicate)
            .add_stage(CleaningStage::RecodeBinary {
                column: "color".into(),
                mapping: COLOR_CODES
                    .iter()
                    .map(|(label, code)| (label.to_string(), *code))
                    .collect(),
            })
            .add_stage(CleaningStage::DropMissing {
                columns: owned(&CRITICAL_CATEGORICALS),
            })
            .add_stage(CleaningStage::FillMissing {
                rules: NUMERIC_FILL_RULES
                    .iter()
                    .map(|(col, stat)| FillRule::statistic(col, *stat))
                    .collect(),
            })
            .add_stage(CleaningStage::DropMissing {
                columns: owned(&FINANCIAL_COLUMNS),
            })
            .add_stage(CleaningStage::FillMissing {
                rules: vec![
                    FillRule::statistic("language", Statistic::Mode),
                    FillRule::constant("content_rating", CONTENT_RATING_DEFAULT),
                    FillRule::statistic("aspect_ratio", Statistic::Mode),
                ],
            })
            // Filling can make two surviving rows identical.
            .add_stage(CleaningStage::Deduplicate)
    }

    /// Apply the pipeline to a table.
    pub fn apply(&self, table: Table) -> Result<Cleaned> {
        let rows_in = table.row_count();
        if table.is_empty() {
            tracing::info!("Dataset is empty. Skipping cleaning process.");
            return Ok(Cleaned {
                table: CleanedTable::new(table),
                report: CleaningReport {
                    skipped: true,
                    ..CleaningReport::default()
                },
            });
        }

        tracing::info!(rows = rows_in, "Starting data cleaning process");
        let mut table = table;
        let mut records = Vec::with_capacity(self.stages.len());
        for stage in &self.stages {
            let mut record = StageRecord::new(stage, table.row_count());
            if !stage.applies_to(&table) {
                tracing::debug!(stage = stage.name(), "required columns absent, skipping");
                record.skipped = true;
                records.push(record);
                continue;
            }
            table = apply_stage(table, stage, &mut record)?;
            record.rows_after = table.row_count();
            log_stage(&record);
            records.push(record);
        }

        let rows_out = table.row_count();
        tracing::info!(rows_in, rows_out, "Cleaning completed");
        Ok(Cleaned {
            table: CleanedTable::new(table),
            report: CleaningReport {
                skipped: false,
                rows_in,
                rows_out,
                stages: records,
            },
        })
    }
}

/// Clean a movie table with the default pipeline.
pub fn clean(table: Table) -> Result<Cleaned> {
    CleaningPipeline::movie_default().apply(table)
}

fn log_stage(record: &StageRecord) {
    match record.stage.as_str() {
        "deduplicate" => {
            tracing::info!("Removed {} duplicate rows.", record.rows_removed())
        }
        "recode_binary" => tracing::info!(
            decode_failures = record.decode_failures,
            "Converted column to binary format."
        ),
        "drop_missing" => tracing::info!(
            "Dropped {} rows with missing required values.",
            record.rows_removed()
        ),
        _ => {
            for fill in &record.fills {
                tracing::info!(
                    "Filled {} missing values in '{}' with {} ({}).",
                    fill.cells,
                    fill.column,
                    fill.method,
                    fill.value
                );
            }
        }
    }
}

fn apply_stage(table: Table, stage: &CleaningStage, record: &mut StageRecord) -> Result<Table> {
    match stage {
        CleaningStage::Deduplicate => Ok(deduplicate(table)),
        CleaningStage::RecodeBinary { column, mapping } => {
            recode_binary(table, column, mapping, record)
        }
        CleaningStage::DropMissing { columns } => Ok(drop_missing(table, columns)),
        CleaningStage::FillMissing { rules } => fill_missing(table, rules, record),
    }
}

fn deduplicate(mut table: Table) -> Table {
    let mut seen = HashSet::with_capacity(table.rows.len());
    table.rows.retain(|row| seen.insert(row.clone()));
    table
}

fn recode_binary(
    mut table: Table,
    column: &str,
    mapping: &[(String, i64)],
    record: &mut StageRecord,
) -> Result<Table> {
    let Some(idx) = table.column_index(column) else {
        return Ok(table);
    };

    let is_code = |cell: &Cell| matches!(cell, Cell::Int(i) if mapping.iter().any(|(_, c)| c == i));
    // Every non-missing value is a code. Holds for an all-missing column too,
    // which is what a recode with only decode failures leaves behind.
    if table
        .rows
        .iter()
        .all(|row| row[idx].is_missing() || is_code(&row[idx]))
    {
        if table.missing_count(idx) == table.row_count() {
            tracing::warn!(column, "column has no values to recode");
        } else {
            tracing::debug!(column, "column already encoded");
        }
        return Ok(table);
    }

    let missing = table.missing_count(idx);
    if missing > 0 {
        let fill = stats::mode(table.rows.iter().map(|row| &row[idx])).map_err(|e| {
            CinelensError::undefined_statistic(column, Statistic::Mode.to_string(), e.to_string())
        })?;
        record.fills.push(FillRecord {
            column: column.to_string(),
            method: Statistic::Mode.to_string(),
            value: fill.clone(),
            cells: missing,
        });
        record.cells_filled += missing;
        for row in &mut table.rows {
            if row[idx].is_missing() {
                row[idx] = fill.clone();
            }
        }
    }

    for row in &mut table.rows {
        let code = match &row[idx] {
            cell @ Cell::Int(i) if is_code(cell) => Some(*i),
            cell => cell
                .as_str()
                .and_then(|label| mapping.iter().find(|(l, _)| l == label))
                .map(|(_, code)| *code),
        };
        row[idx] = match code {
            Some(code) => Cell::Int(code),
            None => {
                record.decode_failures += 1;
                Cell::Missing
            }
        };
    }
    if record.decode_failures > 0 {
        tracing::warn!(
            column,
            count = record.decode_failures,
            "values outside the recoding domain were set to missing"
        );
    }
    Ok(table)
}

fn drop_missing(mut table: Table, columns: &[String]) -> Table {
    let indices: Vec<usize> = columns
        .iter()
        .filter_map(|c| table.column_index(c))
        .collect();
    table
        .rows
        .retain(|row| indices.iter().all(|&i| !row[i].is_missing()));
    table
}

fn fill_missing(mut table: Table, rules: &[FillRule], record: &mut StageRecord) -> Result<Table> {
    let mut planned = Vec::new();
    for rule in rules {
        let Some(idx) = table.column_index(&rule.column) else {
            continue;
        };
        let missing = table.missing_count(idx);
        if missing == 0 {
            continue;
        }
        let (method, value) = fill_value(&table, idx, rule)?;
        planned.push((idx, missing, method, value));
    }

    for (idx, missing, method, value) in planned {
        if matches!(value, Cell::Float(_)) && column_type(&table, idx) == ColumnType::Integer {
            promote_to_float(&mut table, idx);
        }
        for row in &mut table.rows {
            if row[idx].is_missing() {
                row[idx] = value.clone();
            }
        }
        record.cells_filled += missing;
        record.fills.push(FillRecord {
            column: table.columns[idx].clone(),
            method,
            value,
            cells: missing,
        });
    }
    Ok(table)
}

fn fill_value(table: &Table, idx: usize, rule: &FillRule) -> Result<(String, Cell)> {
    let cells = table.rows.iter().map(|row| &row[idx]);
    let statistic = match &rule.with {
        FillWith::Constant(value) => return Ok(("constant".to_string(), Cell::text(value))),
        FillWith::Statistic(statistic) => *statistic,
    };
    let undefined =
        |e: stats::StatError| CinelensError::undefined_statistic(&rule.column, statistic.to_string(), e.to_string());

    let value = match statistic {
        Statistic::Mode => stats::mode(cells).map_err(undefined)?,
        Statistic::Median => numeric_fill(stats::median(cells).map_err(undefined)?, table, idx),
        Statistic::Mean => numeric_fill(stats::mean(cells).map_err(undefined)?, table, idx),
    };
    Ok((statistic.to_string(), value))
}

/// Integral statistics keep an integer column integral; anything else is a float.
fn numeric_fill(value: f64, table: &Table, idx: usize) -> Cell {
    let integral = value.fract() == 0.0 && value.abs() < i64::MAX as f64;
    if integral && column_type(table, idx) == ColumnType::Integer {
        Cell::Int(value as i64)
    } else {
        Cell::Float(value)
    }
}

fn promote_to_float(table: &mut Table, idx: usize) {
    for row in &mut table.rows {
        if let Cell::Int(i) = row[idx] {
            row[idx] = Cell::Float(i as f64);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn table(columns: &[&str], rows: Vec<Vec<Cell>>) -> Table {
        Table::new(columns.iter().map(|c| c.to_string()).collect(), rows)
    }

    fn col(table: &Table, name: &str) -> Vec<Cell> {
        table.column(name).unwrap().cloned().collect()
    }

    #[test]
    fn test_empty_input_is_noop() {
        let cleaned = clean(Table::empty()).unwrap();
        assert!(cleaned.report.skipped);
        assert!(cleaned.table.is_empty());
        assert!(cleaned.report.stages.is_empty());
    }

    #[test]
    fn test_deduplicate_keeps_first() {
        let t = table(
            &["a", "b"],
            vec![
                vec![Cell::Int(1), Cell::text("x")],
                vec![Cell::Int(2), Cell::Missing],
                vec![Cell::Int(1), Cell::text("x")],
                vec![Cell::Int(2), Cell::Missing],
            ],
        );
        let cleaned = CleaningPipeline::new()
            .add_stage(CleaningStage::Deduplicate)
            .apply(t)
            .unwrap();
        assert_eq!(cleaned.table.row_count(), 2);
        assert_eq!(cleaned.report.duplicates_removed(), 2);
        assert_eq!(cleaned.table.rows[0], vec![Cell::Int(1), Cell::text("x")]);
    }

    #[test]
    fn test_color_recoding_with_mode_fill() {
        let pipeline = CleaningPipeline::movie_default();
        let t = table(
            &["id", "color"],
            vec![
                vec![Cell::Int(1), Cell::text("Color")],
                vec![Cell::Int(2), Cell::text("Color")],
                vec![Cell::Int(3), Cell::Missing],
                vec![Cell::Int(4), Cell::text(" Black and White")],
            ],
        );
        let cleaned = pipeline.apply(t).unwrap();
        let recode = &cleaned.report.stages[1];
        assert_eq!(recode.cells_filled, 1);
        assert_eq!(recode.fills[0].value, Cell::text("Color"));
        assert_eq!(
            col(&cleaned.table, "color"),
            vec![Cell::Int(1), Cell::Int(1), Cell::Int(1), Cell::Int(0)]
        );
    }

    #[test]
    fn test_color_without_leading_space_is_decode_failure() {
        let t = table(
            &["id", "color"],
            vec![
                vec![Cell::Int(1), Cell::text("Color")],
                vec![Cell::Int(2), Cell::text("Black and White")],
            ],
        );
        let cleaned = clean(t).unwrap();
        assert_eq!(col(&cleaned.table, "color"), vec![Cell::Int(1), Cell::Missing]);
        assert_eq!(cleaned.report.stages[1].decode_failures, 1);
    }

    #[test]
    fn test_encoded_color_is_left_alone() {
        let t = table(
            &["id", "color"],
            vec![
                vec![Cell::Int(1), Cell::Int(1)],
                vec![Cell::Int(2), Cell::Missing],
            ],
        );
        let cleaned = clean(t.clone()).unwrap();
        assert_eq!(cleaned.table.as_table(), &t);
    }

    #[test]
    fn test_all_missing_color_is_left_missing() {
        let t = table(
            &["id", "color"],
            vec![
                vec![Cell::Int(1), Cell::Missing],
                vec![Cell::Int(2), Cell::Missing],
            ],
        );
        let cleaned = clean(t.clone()).unwrap();
        assert_eq!(cleaned.table.as_table(), &t);
        assert_eq!(cleaned.report.stages[1].cells_filled, 0);
    }

    #[test]
    fn test_color_with_no_decodable_label_recleans_unchanged() {
        let t = table(
            &["id", "color"],
            vec![
                vec![Cell::Int(1), Cell::text("Black and White")],
                vec![Cell::Int(2), Cell::text("Black and White")],
            ],
        );
        let once = clean(t).unwrap();
        assert_eq!(once.report.stages[1].decode_failures, 2);
        assert_eq!(col(&once.table, "color"), vec![Cell::Missing, Cell::Missing]);

        let twice = clean(once.table.clone().into_inner()).unwrap();
        assert_eq!(twice.table, once.table);
        assert_eq!(twice.report.stages[1].decode_failures, 0);
    }

    #[test]
    fn test_decoded_rows_dropped_later_recleans_unchanged() {
        let t = table(
            &["color", "director_name"],
            vec![
                vec![Cell::text("Color"), Cell::Missing],
                vec![Cell::text("Sepia"), Cell::text("Lang")],
            ],
        );
        let once = clean(t).unwrap().table;
        assert_eq!(once.rows, vec![vec![Cell::Missing, Cell::text("Lang")]]);
        let twice = clean(once.clone().into_inner()).unwrap().table;
        assert_eq!(twice, once);
    }

    #[test]
    fn test_out_of_domain_integer_color_is_decoded() {
        let t = table(
            &["id", "color"],
            vec![
                vec![Cell::Int(1), Cell::Int(5)],
                vec![Cell::Int(2), Cell::Int(7)],
            ],
        );
        let cleaned = clean(t).unwrap();
        assert_eq!(col(&cleaned.table, "color"), vec![Cell::Missing, Cell::Missing]);
        assert_eq!(cleaned.report.stages[1].decode_failures, 2);

        let t = table(
            &["id", "color"],
            vec![
                vec![Cell::Int(1), Cell::Int(0)],
                vec![Cell::Int(2), Cell::Int(7)],
                vec![Cell::Int(3), Cell::Int(1)],
            ],
        );
        let cleaned = clean(t).unwrap();
        assert_eq!(
            col(&cleaned.table, "color"),
            vec![Cell::Int(0), Cell::Missing, Cell::Int(1)]
        );
        assert_eq!(cleaned.report.stages[1].decode_failures, 1);

        let twice = clean(cleaned.table.clone().into_inner()).unwrap().table;
        assert_eq!(twice, cleaned.table);
    }

    #[test]
    fn test_critical_categorical_drop_is_cumulative() {
        let t = table(
            &["director_name", "actor_2_name", "plot_keywords"],
            vec![
                vec![Cell::text("A"), Cell::text("B"), Cell::text("k")],
                vec![Cell::Missing, Cell::text("B"), Cell::text("k")],
                vec![Cell::text("A"), Cell::Missing, Cell::text("j")],
                vec![Cell::text("C"), Cell::text("D"), Cell::Missing],
            ],
        );
        let cleaned = clean(t).unwrap();
        assert_eq!(cleaned.table.row_count(), 1);
        assert_eq!(cleaned.table.rows[0][0], Cell::text("A"));
    }

    #[test]
    fn test_financial_drop_scenario() {
        let t = table(
            &["movie_title", "gross", "budget"],
            vec![
                vec![Cell::text("a"), Cell::Missing, Cell::Int(100)],
                vec![Cell::text("b"), Cell::Int(50), Cell::Missing],
                vec![Cell::text("c"), Cell::Int(30), Cell::Int(40)],
            ],
        );
        let cleaned = clean(t).unwrap();
        assert_eq!(
            cleaned.table.rows,
            vec![vec![Cell::text("c"), Cell::Int(30), Cell::Int(40)]]
        );
    }

    #[test]
    fn test_numeric_fill_uses_post_drop_state() {
        // The dropped row's duration (1000) must not influence the median.
        let t = table(
            &["director_name", "duration", "director_facebook_likes"],
            vec![
                vec![Cell::Missing, Cell::Int(1000), Cell::Int(0)],
                vec![Cell::text("A"), Cell::Int(90), Cell::Int(10)],
                vec![Cell::text("B"), Cell::Int(100), Cell::Missing],
                vec![Cell::text("C"), Cell::Missing, Cell::Int(21)],
            ],
        );
        let cleaned = clean(t).unwrap();
        assert_eq!(
            col(&cleaned.table, "duration"),
            vec![Cell::Float(90.0), Cell::Float(100.0), Cell::Float(95.0)]
        );
        assert_eq!(
            col(&cleaned.table, "director_facebook_likes"),
            vec![Cell::Float(10.0), Cell::Float(15.5), Cell::Float(21.0)]
        );
    }

    #[test]
    fn test_integral_fill_keeps_integer_column() {
        let t = table(
            &["facenumber_in_poster"],
            vec![vec![Cell::Int(1)], vec![Cell::Missing], vec![Cell::Int(3)], vec![Cell::Int(2)]],
        );
        let cleaned = clean(t).unwrap();
        assert_eq!(
            col(&cleaned.table, "facenumber_in_poster"),
            vec![Cell::Int(1), Cell::Int(2), Cell::Int(3)]
        );
        // The filled row duplicated the last one and was removed again.
        assert_eq!(cleaned.report.duplicates_removed(), 1);
    }

    #[test]
    fn test_numeric_fill_on_empty_column_fails() {
        let t = table(
            &["id", "duration"],
            vec![vec![Cell::Int(1), Cell::Missing], vec![Cell::Int(2), Cell::Missing]],
        );
        let err = clean(t).unwrap_err();
        assert_eq!(err.kind(), "UndefinedStatisticError");
        assert!(err.to_string().contains("duration"));
    }

    #[test]
    fn test_categorical_fill() {
        let t = table(
            &["id", "language", "content_rating", "aspect_ratio"],
            vec![
                vec![Cell::Int(1), Cell::text("English"), Cell::Missing, Cell::Float(2.35)],
                vec![Cell::Int(2), Cell::Missing, Cell::text("PG"), Cell::Missing],
                vec![Cell::Int(3), Cell::text("French"), Cell::text("R"), Cell::Float(1.85)],
                vec![Cell::Int(4), Cell::text("English"), Cell::Missing, Cell::Float(2.35)],
            ],
        );
        let cleaned = clean(t).unwrap();
        assert_eq!(cleaned.table.rows[1][1], Cell::text("English"));
        assert_eq!(cleaned.table.rows[0][2], Cell::text("Not Rated"));
        assert_eq!(cleaned.table.rows[1][3], Cell::Float(2.35));
    }

    #[test]
    fn test_absent_columns_skip_stages() {
        let t = table(&["movie_title"], vec![vec![Cell::text("Avatar")]]);
        let cleaned = clean(t.clone()).unwrap();
        assert_eq!(cleaned.table.as_table(), &t);
        let skipped: Vec<_> = cleaned
            .report
            .stages
            .iter()
            .filter(|s| s.skipped)
            .map(|s| s.stage.as_str())
            .collect();
        assert_eq!(
            skipped,
            vec!["recode_binary", "drop_missing", "fill_missing", "drop_missing", "fill_missing"]
        );
    }

    #[test]
    fn test_clean_is_idempotent() {
        let t = table(
            &["color", "director_name", "duration", "gross", "language"],
            vec![
                vec![Cell::text("Color"), Cell::text("A"), Cell::Int(100), Cell::Int(5), Cell::Missing],
                vec![Cell::Missing, Cell::text("B"), Cell::Missing, Cell::Int(7), Cell::text("English")],
                vec![Cell::text(" Black and White"), Cell::text("C"), Cell::Int(91), Cell::Int(9), Cell::text("French")],
                vec![Cell::text("Color"), Cell::text("A"), Cell::Int(100), Cell::Int(5), Cell::Missing],
            ],
        );
        let once = clean(t).unwrap().table;
        let twice = clean(once.clone().into_inner()).unwrap().table;
        assert_eq!(once, twice);
    }

    #[test]
    fn test_pipeline_serde() {
        let pipeline = CleaningPipeline::movie_default();
        let json = serde_json::to_string(&pipeline).unwrap();
        assert!(json.contains("recode_binary"));
        let restored: CleaningPipeline = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, pipeline);
    }
}
