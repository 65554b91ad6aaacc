//! Chart specifications.
//!
//! A [`ChartSpec`] is built from a report result and holds everything the
//! renderer needs: chart kind, (possibly multi-line) labels, numeric data and
//! axis titles.

use crate::config::ChartConfig;
use crate::data::table::{Cell, Table};
use crate::error::{CinelensError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Supported chart kinds, in menu order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChartKind {
    Bar,
    HorizontalBar,
    Line,
    Histogram,
    Scatter,
    Pie,
}

impl ChartKind {
    pub const ALL: [ChartKind; 6] = [
        ChartKind::Bar,
        ChartKind::HorizontalBar,
        ChartKind::Line,
        ChartKind::Histogram,
        ChartKind::Scatter,
        ChartKind::Pie,
    ];

    /// Map a 1-based menu number to a chart kind.
    pub fn from_menu(choice: u32) -> Result<Self> {
        usize::try_from(choice)
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| Self::ALL.get(i).copied())
            .ok_or_else(|| {
                CinelensError::invalid_choice(format!(
                    "chart type {choice}, choose 1 to {}",
                    Self::ALL.len()
                ))
            })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bar => "bar",
            Self::HorizontalBar => "horizontal-bar",
            Self::Line => "line",
            Self::Histogram => "histogram",
            Self::Scatter => "scatter",
            Self::Pie => "pie",
        }
    }

    /// Human-readable menu label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Bar => "Bar chart",
            Self::HorizontalBar => "Horizontal bar chart",
            Self::Line => "Line chart",
            Self::Histogram => "Histogram",
            Self::Scatter => "Scatter plot",
            Self::Pie => "Pie chart",
        }
    }

    /// The Chart.js chart type used to draw this kind.
    pub fn chart_js_type(&self) -> &'static str {
        match self {
            Self::Bar | Self::HorizontalBar | Self::Histogram => "bar",
            Self::Line => "line",
            Self::Scatter => "scatter",
            Self::Pie => "pie",
        }
    }

    fn wraps_labels(&self) -> bool {
        matches!(self, Self::Bar | Self::HorizontalBar | Self::Line)
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChartKind {
    type Err = CinelensError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bar" => Ok(Self::Bar),
            "horizontal-bar" | "hbar" | "barh" => Ok(Self::HorizontalBar),
            "line" => Ok(Self::Line),
            "histogram" | "hist" => Ok(Self::Histogram),
            "scatter" => Ok(Self::Scatter),
            "pie" => Ok(Self::Pie),
            other => Err(CinelensError::invalid_choice(format!(
                "unknown chart type '{other}'"
            ))),
        }
    }
}

/// Rendering knobs taken from the chart configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartOptions {
    pub label_wrap_width: usize,
    pub histogram_bins: usize,
    pub output_dir: PathBuf,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self::from(&ChartConfig::default())
    }
}

impl From<&ChartConfig> for ChartOptions {
    fn from(config: &ChartConfig) -> Self {
        Self {
            label_wrap_width: config.label_wrap_width,
            histogram_bins: config.histogram_bins,
            output_dir: config.output_dir.clone(),
        }
    }
}

/// Chart specification (rendered via Chart.js).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub title: String,
    /// Category labels, one entry per data point; each label may span several lines.
    pub labels: Vec<Vec<String>>,
    pub datasets: Vec<ChartDataset>,
    pub x_label: String,
    pub y_label: String,
}

/// A single dataset in a chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartDataset {
    pub label: String,
    pub data: Vec<f64>,
    #[serde(default)]
    pub color: Option<String>,
}

impl ChartSpec {
    /// Build a chart of `kind` from the `x` and `y` columns of a report result.
    ///
    /// Rows whose `y` cell is missing are left out. A text `y` cell is an
    /// error naming the column.
    pub fn from_result(
        result: &Table,
        x: &str,
        y: &str,
        title: &str,
        kind: ChartKind,
        options: &ChartOptions,
    ) -> Result<Self> {
        if result.is_empty() {
            return Err(CinelensError::empty_input("chart rendering"));
        }
        let x_idx = result
            .column_index(x)
            .ok_or_else(|| CinelensError::invalid_choice(format!("column '{x}' is not in the result")))?;
        let y_idx = result
            .column_index(y)
            .ok_or_else(|| CinelensError::invalid_choice(format!("column '{y}' is not in the result")))?;

        let mut labels = Vec::with_capacity(result.row_count());
        let mut values = Vec::with_capacity(result.row_count());
        for row in &result.rows {
            let value = match &row[y_idx] {
                Cell::Missing => continue,
                Cell::Text(_) => {
                    return Err(CinelensError::invalid_choice(format!(
                        "column '{y}' is not numeric"
                    )));
                }
                cell => cell.as_f64().unwrap_or_default(),
            };
            labels.push(row[x_idx].to_string());
            values.push(value);
        }

        if kind == ChartKind::Histogram {
            return Ok(Self::histogram(&values, y, title, options.histogram_bins));
        }

        let labels = labels
            .iter()
            .map(|label| {
                if kind.wraps_labels() {
                    wrap_label(label, options.label_wrap_width)
                } else {
                    vec![label.clone()]
                }
            })
            .collect();
        let (x_label, y_label) = match kind {
            ChartKind::HorizontalBar => (title_case(y), title_case(x)),
            _ => (title_case(x), title_case(y)),
        };

        Ok(Self {
            kind,
            title: title.to_string(),
            labels,
            datasets: vec![ChartDataset {
                label: y.to_string(),
                data: values,
                color: default_color(kind).map(String::from),
            }],
            x_label,
            y_label,
        })
    }

    /// Equal-width histogram of `values`. The last bin includes its upper edge.
    pub fn histogram(values: &[f64], column: &str, title: &str, bins: usize) -> Self {
        let bins = bins.max(1);
        let (min, max) = values
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(*v), hi.max(*v)));
        let (lo, hi) = if values.is_empty() {
            (0.0, 1.0)
        } else if min == max {
            (min - 0.5, max + 0.5)
        } else {
            (min, max)
        };
        let width = (hi - lo) / bins as f64;

        let mut counts = vec![0.0; bins];
        for v in values {
            let idx = (((v - lo) / width).floor() as usize).min(bins - 1);
            counts[idx] += 1.0;
        }
        let labels = (0..bins)
            .map(|i| {
                let start = lo + width * i as f64;
                vec![format!("{:.2}-{:.2}", start, start + width)]
            })
            .collect();

        Self {
            kind: ChartKind::Histogram,
            title: title.to_string(),
            labels,
            datasets: vec![ChartDataset {
                label: column.to_string(),
                data: counts,
                color: default_color(ChartKind::Histogram).map(String::from),
            }],
            x_label: column.to_string(),
            y_label: "Frequency".to_string(),
        }
    }
}

fn default_color(kind: ChartKind) -> Option<&'static str> {
    match kind {
        ChartKind::Bar | ChartKind::HorizontalBar => Some("skyblue"),
        ChartKind::Line => Some("green"),
        ChartKind::Histogram => Some("orange"),
        ChartKind::Scatter => Some("red"),
        ChartKind::Pie => None,
    }
}

/// Wrap a label into lines of at most `width` columns.
pub fn wrap_label(label: &str, width: usize) -> Vec<String> {
    let lines: Vec<String> = textwrap::wrap(label, width.max(1))
        .into_iter()
        .map(|line| line.into_owned())
        .collect();
    if lines.is_empty() {
        vec![String::new()]
    } else {
        lines
    }
}

/// Capitalise the first letter of every run of letters and lowercase the rest,
/// so `avg_rating` becomes `Avg_Rating`.
pub fn title_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut in_word = false;
    for c in name.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }
    out
}
