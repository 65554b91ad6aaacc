//! Chart and table renderers.
//!
//! Converts chart specs into Chart.js configs and standalone HTML pages, and
//! report results into aligned plain-text tables.

use super::components::{ChartKind, ChartOptions, ChartSpec};
use crate::data::table::{Cell, Table};
use crate::error::Result;
use std::path::PathBuf;
use unicode_width::UnicodeWidthStr;

const CHART_JS_CDN: &str = "https://cdn.jsdelivr.net/npm/chart.js@4";

const PIE_PALETTE: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

fn label_value(lines: &[String]) -> serde_json::Value {
    match lines {
        [single] => serde_json::json!(single),
        _ => serde_json::json!(lines),
    }
}

/// Render a ChartSpec to a Chart.js config JSON string.
pub fn render_chart_config(spec: &ChartSpec) -> String {
    let labels: Vec<serde_json::Value> = spec.labels.iter().map(|l| label_value(l)).collect();

    let datasets: Vec<serde_json::Value> = spec
        .datasets
        .iter()
        .map(|ds| {
            let data = if spec.kind == ChartKind::Scatter {
                spec.labels
                    .iter()
                    .zip(&ds.data)
                    .map(|(label, y)| serde_json::json!({ "x": label.join(" "), "y": y }))
                    .collect()
            } else {
                serde_json::json!(ds.data)
            };
            let mut obj = serde_json::json!({
                "label": ds.label,
                "data": data,
            });
            if let Some(color) = &ds.color {
                obj["borderColor"] = serde_json::json!(color);
                obj["backgroundColor"] = serde_json::json!(color);
            }
            match spec.kind {
                ChartKind::Histogram => {
                    obj["borderColor"] = serde_json::json!("black");
                    obj["borderWidth"] = serde_json::json!(1);
                    obj["barPercentage"] = serde_json::json!(1.0);
                    obj["categoryPercentage"] = serde_json::json!(1.0);
                }
                ChartKind::Line => {
                    obj["fill"] = serde_json::json!(false);
                    obj["pointStyle"] = serde_json::json!("circle");
                }
                ChartKind::Pie => {
                    let colors: Vec<&str> = PIE_PALETTE.iter().copied().cycle().take(ds.data.len()).collect();
                    obj["backgroundColor"] = serde_json::json!(colors);
                }
                _ => {}
            }
            obj
        })
        .collect();

    let mut options = serde_json::json!({
        "responsive": true,
        "plugins": {
            "title": {
                "display": !spec.title.is_empty(),
                "text": spec.title,
            },
            "legend": { "display": spec.kind == ChartKind::Pie },
        }
    });
    if spec.kind != ChartKind::Pie {
        let (category_axis, value_axis) = if spec.kind == ChartKind::HorizontalBar {
            ("y", "x")
        } else {
            ("x", "y")
        };
        let (category_title, value_title) = if spec.kind == ChartKind::HorizontalBar {
            (&spec.y_label, &spec.x_label)
        } else {
            (&spec.x_label, &spec.y_label)
        };
        let mut scales = serde_json::Map::new();
        scales.insert(
            category_axis.to_string(),
            serde_json::json!({ "title": { "display": true, "text": category_title } }),
        );
        scales.insert(
            value_axis.to_string(),
            serde_json::json!({ "title": { "display": true, "text": value_title } }),
        );
        if spec.kind == ChartKind::Scatter {
            scales["x"]["type"] = serde_json::json!("category");
        }
        options["scales"] = serde_json::Value::Object(scales);
    }
    if spec.kind == ChartKind::HorizontalBar {
        options["indexAxis"] = serde_json::json!("y");
    }

    let config = serde_json::json!({
        "type": spec.kind.chart_js_type(),
        "data": {
            "labels": labels,
            "datasets": datasets,
        },
        "options": options,
    });

    serde_json::to_string_pretty(&config).unwrap_or_else(|_| "{}".into())
}

/// Render a ChartSpec to a standalone HTML page.
pub fn render_chart_html(spec: &ChartSpec) -> String {
    // A literal "</" would close the script element early.
    let config = render_chart_config(spec).replace("</", "<\\/");
    let pie_tooltip = if spec.kind == ChartKind::Pie {
        r#"
      config.options.plugins.tooltip = {
        callbacks: {
          label: (ctx) => {
            const total = ctx.dataset.data.reduce((a, b) => a + b, 0);
            const pct = total ? (ctx.parsed / total) * 100 : 0;
            return `${ctx.label}: ${pct.toFixed(1)}%`;
          },
        },
      };"#
    } else {
        ""
    };
    let title = escape_html(&spec.title);
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>{title}</title>
  <script src="{CHART_JS_CDN}"></script>
  <style>
    body {{ font-family: sans-serif; margin: 2rem; }}
    .chart {{ max-width: 1100px; margin: auto; }}
  </style>
</head>
<body>
  <div class="chart"><canvas id="chart"></canvas></div>
  <script>
    const config = {config};{pie_tooltip}
    new Chart(document.getElementById("chart"), config);
  </script>
</body>
</html>
"#
    )
}

/// Lowercase, dash-separated form of a report title used in file names.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    for c in title.chars() {
        if c.is_alphanumeric() {
            slug.extend(c.to_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

/// Build a chart from a report result and write it as an HTML page under the
/// configured chart directory. Returns the written path.
pub fn render(
    result: &Table,
    x: &str,
    y: &str,
    title: &str,
    kind: ChartKind,
    options: &ChartOptions,
) -> Result<PathBuf> {
    let spec = ChartSpec::from_result(result, x, y, title, kind, options)?;
    let path = options
        .output_dir
        .join(format!("report-{}-{}.html", slugify(title), kind));
    crate::persistence::atomic_write(&path, render_chart_html(&spec).as_bytes())?;
    tracing::info!(path = %path.display(), chart = %kind, "Chart rendered.");
    Ok(path)
}

/// Render the first `max_rows` rows of a result as an aligned text table.
/// Numbers are right-aligned, everything else left-aligned.
pub fn render_table_text(result: &Table, max_rows: usize) -> String {
    let shown = result.head(max_rows);
    let cells: Vec<Vec<String>> = shown
        .rows
        .iter()
        .map(|row| row.iter().map(Cell::to_string).collect())
        .collect();

    let widths: Vec<usize> = result
        .columns
        .iter()
        .enumerate()
        .map(|(i, name)| {
            cells
                .iter()
                .map(|row| row[i].width())
                .chain(std::iter::once(name.width()))
                .max()
                .unwrap_or(0)
        })
        .collect();
    let numeric: Vec<bool> = (0..result.column_count())
        .map(|i| {
            shown
                .rows
                .iter()
                .any(|row| matches!(row[i], Cell::Int(_) | Cell::Float(_)))
        })
        .collect();

    let mut out = String::new();
    let header: Vec<String> = result
        .columns
        .iter()
        .enumerate()
        .map(|(i, name)| pad(name, widths[i], numeric[i]))
        .collect();
    out.push_str(header.join("  ").trim_end());
    out.push('\n');
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&rule.join("  "));
    out.push('\n');
    for row in &cells {
        let line: Vec<String> = row
            .iter()
            .enumerate()
            .map(|(i, cell)| pad(cell, widths[i], numeric[i]))
            .collect();
        out.push_str(line.join("  ").trim_end());
        out.push('\n');
    }
    if result.row_count() > shown.row_count() {
        out.push_str(&format!(
            "({} of {} rows shown)\n",
            shown.row_count(),
            result.row_count()
        ));
    }
    out
}

fn pad(text: &str, width: usize, right_align: bool) -> String {
    let fill = " ".repeat(width.saturating_sub(text.width()));
    if right_align {
        format!("{fill}{text}")
    } else {
        format!("{text}{fill}")
    }
}

/// Escape HTML special characters.
fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::components::ChartDataset;
    use pretty_assertions::assert_eq;

    fn spec(kind: ChartKind) -> ChartSpec {
        ChartSpec {
            kind,
            title: "Movies per Year".into(),
            labels: vec![vec!["2009".into()], vec!["2010".into()]],
            datasets: vec![ChartDataset {
                label: "movie_count".into(),
                data: vec![3.0, 5.0],
                color: Some("green".into()),
            }],
            x_label: "Title_Year".into(),
            y_label: "Movie_Count".into(),
        }
    }

    #[test]
    fn test_render_chart_config_line() {
        let json_str = render_chart_config(&spec(ChartKind::Line));
        let parsed: serde_json::Value = serde_json::from_str(&json_str).unwrap();
        assert_eq!(parsed["type"], "line");
        assert_eq!(parsed["data"]["labels"][0], "2009");
        assert_eq!(parsed["data"]["datasets"][0]["data"][1], 5.0);
        assert_eq!(parsed["options"]["plugins"]["title"]["text"], "Movies per Year");
        assert_eq!(parsed["options"]["scales"]["x"]["title"]["text"], "Title_Year");
    }

    #[test]
    fn test_render_chart_config_horizontal_bar() {
        let mut s = spec(ChartKind::HorizontalBar);
        s.x_label = "Movie_Count".into();
        s.y_label = "Title_Year".into();
        let parsed: serde_json::Value =
            serde_json::from_str(&render_chart_config(&s)).unwrap();
        assert_eq!(parsed["type"], "bar");
        assert_eq!(parsed["options"]["indexAxis"], "y");
        assert_eq!(parsed["options"]["scales"]["x"]["title"]["text"], "Movie_Count");
        assert_eq!(parsed["options"]["scales"]["y"]["title"]["text"], "Title_Year");
    }

    #[test]
    fn test_render_chart_config_multiline_label() {
        let mut s = spec(ChartKind::Bar);
        s.labels[0] = vec!["The Lord of the".into(), "Rings".into()];
        let parsed: serde_json::Value =
            serde_json::from_str(&render_chart_config(&s)).unwrap();
        assert_eq!(parsed["data"]["labels"][0][1], "Rings");
    }

    #[test]
    fn test_render_chart_config_pie_and_scatter() {
        let pie: serde_json::Value =
            serde_json::from_str(&render_chart_config(&spec(ChartKind::Pie))).unwrap();
        assert_eq!(pie["type"], "pie");
        assert!(pie["options"]["scales"].is_null());
        assert_eq!(pie["data"]["datasets"][0]["backgroundColor"][1], "#ff7f0e");

        let scatter: serde_json::Value =
            serde_json::from_str(&render_chart_config(&spec(ChartKind::Scatter))).unwrap();
        assert_eq!(scatter["data"]["datasets"][0]["data"][0]["x"], "2009");
        assert_eq!(scatter["options"]["scales"]["x"]["type"], "category");
    }

    #[test]
    fn test_render_chart_html() {
        let mut s = spec(ChartKind::Pie);
        s.title = "<b>Genres</b>".into();
        let html = render_chart_html(&s);
        assert!(html.contains("<title>&lt;b&gt;Genres&lt;/b&gt;</title>"));
        assert!(html.contains("toFixed(1)"));
        assert!(!render_chart_html(&spec(ChartKind::Bar)).contains("toFixed"));
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Top IMDb Movies"), "top-imdb-movies");
        assert_eq!(slugify("Avg Duration by Primary Genre!"), "avg-duration-by-primary-genre");
    }

    #[test]
    fn test_render_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let options = ChartOptions {
            output_dir: dir.path().join("charts"),
            ..ChartOptions::default()
        };
        let table = Table::new(
            vec!["title_year".into(), "movie_count".into()],
            vec![vec![Cell::Int(2009), Cell::Int(3)]],
        );
        let path = render(&table, "title_year", "movie_count", "Movies per Year", ChartKind::Line, &options)
            .unwrap();
        assert_eq!(path, dir.path().join("charts/report-movies-per-year-line.html"));
        let html = std::fs::read_to_string(path).unwrap();
        assert!(html.contains("new Chart"));
    }

    #[test]
    fn test_render_table_text() {
        let table = Table::new(
            vec!["language".into(), "avg_rating".into()],
            vec![
                vec![Cell::text("English"), Cell::Float(6.4)],
                vec![Cell::text("日本語"), Cell::Float(7.25)],
                vec![Cell::text("French"), Cell::Float(7.1)],
            ],
        );
        let text = render_table_text(&table, 2);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "language  avg_rating");
        assert_eq!(lines[1], "--------  ----------");
        assert_eq!(lines[2], "English          6.4");
        assert_eq!(lines[3], "日本語          7.25");
        assert_eq!(lines[4], "(2 of 3 rows shown)");
    }
}
