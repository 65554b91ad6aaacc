//! Interactive numbered report menu.

use cinelens_core::canvas::{self, ChartOptions};
use cinelens_core::config::CinelensConfig;
use cinelens_core::reports;
use cinelens_core::store::TableStore;
use cinelens_core::{ChartKind, CinelensError};
use dialoguer::Input;
use std::path::Path;

/// What the user typed at the main menu prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    Exit,
    Report(u8),
    OutOfRange,
    NotANumber,
}

pub fn parse_choice(input: &str) -> MenuChoice {
    let Ok(n) = input.trim().parse::<i64>() else {
        return MenuChoice::NotANumber;
    };
    if n == 0 {
        return MenuChoice::Exit;
    }
    match u8::try_from(n) {
        Ok(id) if reports::find_report(id).is_ok() => MenuChoice::Report(id),
        _ => MenuChoice::OutOfRange,
    }
}

/// Parse the chart prompt: empty picks `default`, `0` skips, a number picks
/// from the chart menu, anything else is read as a chart name.
pub fn parse_chart_choice(
    input: &str,
    default: ChartKind,
) -> Result<Option<ChartKind>, CinelensError> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(Some(default));
    }
    match input.parse::<u32>() {
        Ok(0) => Ok(None),
        Ok(n) => ChartKind::from_menu(n).map(Some),
        Err(_) => input.parse::<ChartKind>().map(Some),
    }
}

fn show_menu() {
    println!("\n=== Movie Query & Visualization Menu ===");
    for report in reports::list_reports() {
        println!("{}. {}", report.id, report.title);
    }
    println!("0. Exit");
}

/// Run the menu loop until the user exits.
pub fn run_menu<S: TableStore + ?Sized>(store: &S, config: &CinelensConfig) -> anyhow::Result<()> {
    loop {
        show_menu();
        let input: String = Input::new()
            .with_prompt("Enter your choice (0 to exit)")
            .allow_empty(true)
            .interact_text()?;
        match parse_choice(&input) {
            MenuChoice::Exit => {
                println!("Exiting program.");
                return Ok(());
            }
            MenuChoice::Report(id) => show_report(store, config, id)?,
            MenuChoice::OutOfRange => println!("Invalid choice. Choose 1 to 10."),
            MenuChoice::NotANumber => println!("Please enter a valid number."),
        }
    }
}

/// Run and print one report, then offer a chart. Query and render failures
/// are reported and control returns to the menu.
fn show_report<S: TableStore + ?Sized>(
    store: &S,
    config: &CinelensConfig,
    id: u8,
) -> anyhow::Result<()> {
    let spec = reports::find_report(id)?;
    let result = match reports::execute(id, store, &config.store.table_name) {
        Ok(result) => result,
        Err(e) if e.is_recoverable() => {
            println!("Query failed: {e}");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };
    if result.is_empty() {
        println!("No data returned for this query.");
        return Ok(());
    }

    println!("\n--- {} ---", spec.title);
    print!("{}", canvas::render_table_text(&result, config.report.preview_rows));

    let Some(kind) = choose_chart(spec.default_chart)? else {
        return Ok(());
    };
    match canvas::render(
        &result,
        spec.x_column,
        spec.y_column,
        spec.title,
        kind,
        &ChartOptions::from(&config.charts),
    ) {
        Ok(path) => {
            println!("Chart written to {}", path.display());
            if config.charts.open_in_browser {
                open_chart(&path);
            }
        }
        Err(e) => println!("Could not render chart: {e}"),
    }
    Ok(())
}

fn choose_chart(default: ChartKind) -> anyhow::Result<Option<ChartKind>> {
    println!("\nChoose chart type:");
    for (i, kind) in ChartKind::ALL.iter().enumerate() {
        let marker = if *kind == default { " (default)" } else { "" };
        println!("{}. {}{}", i + 1, kind.label(), marker);
    }
    println!("0. Skip");
    loop {
        let input: String = Input::new()
            .with_prompt(format!("Enter chart type (1-{}, 0 to skip)", ChartKind::ALL.len()))
            .allow_empty(true)
            .interact_text()?;
        match parse_chart_choice(&input, default) {
            Ok(choice) => return Ok(choice),
            Err(e) => println!("{e}"),
        }
    }
}

/// Open a rendered chart in the default browser; failures are only reported.
pub fn open_chart(path: &Path) {
    if let Err(e) = open::that(path) {
        tracing::warn!(path = %path.display(), "Could not open browser: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_choice() {
        assert_eq!(parse_choice("0"), MenuChoice::Exit);
        assert_eq!(parse_choice(" 3 "), MenuChoice::Report(3));
        assert_eq!(parse_choice("10"), MenuChoice::Report(10));
        assert_eq!(parse_choice("11"), MenuChoice::OutOfRange);
        assert_eq!(parse_choice("-2"), MenuChoice::OutOfRange);
        assert_eq!(parse_choice("300"), MenuChoice::OutOfRange);
        assert_eq!(parse_choice("abc"), MenuChoice::NotANumber);
        assert_eq!(parse_choice(""), MenuChoice::NotANumber);
    }

    #[test]
    fn test_parse_chart_choice() {
        assert_eq!(parse_chart_choice("", ChartKind::Line).unwrap(), Some(ChartKind::Line));
        assert_eq!(parse_chart_choice("0", ChartKind::Bar).unwrap(), None);
        assert_eq!(parse_chart_choice("4", ChartKind::Bar).unwrap(), Some(ChartKind::Histogram));
        assert_eq!(parse_chart_choice("pie", ChartKind::Bar).unwrap(), Some(ChartKind::Pie));
        assert!(parse_chart_choice("9", ChartKind::Bar).is_err());
        assert!(parse_chart_choice("donut", ChartKind::Bar).is_err());
    }
}
