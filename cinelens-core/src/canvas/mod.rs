//! # Canvas
//!
//! Turns report results into presentable output: Chart.js HTML pages written
//! to the chart directory, and aligned text tables for the terminal.

pub mod components;
pub mod renderer;

pub use components::{ChartDataset, ChartKind, ChartOptions, ChartSpec, title_case};
pub use renderer::{render, render_chart_config, render_chart_html, render_table_text, slugify};
