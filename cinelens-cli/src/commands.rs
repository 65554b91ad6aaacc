//! CLI subcommand handlers.

use crate::Commands;
use crate::ConfigAction;
use crate::menu;
use cinelens_core::canvas::{self, ChartOptions};
use cinelens_core::config::{self, CinelensConfig};
use cinelens_core::data::{CsvSource, LoadOptions, profile};
use cinelens_core::reports;
use cinelens_core::store::{PersistMode, SqliteStore, TableStore};
use cinelens_core::{ChartKind, clean, load};
use std::path::{Path, PathBuf};

/// Handle a CLI subcommand.
pub fn handle_command(
    command: Commands,
    mut config: CinelensConfig,
    workspace: &Path,
) -> anyhow::Result<()> {
    match command {
        Commands::Run { input } => {
            override_input(&mut config, input);
            handle_run(&config)
        }
        Commands::Clean { input, json } => {
            override_input(&mut config, input);
            handle_clean(&config, json)
        }
        Commands::Ingest { input } => {
            override_input(&mut config, input);
            if let Some(store) = ingest(&config)? {
                store.close()?;
            }
            Ok(())
        }
        Commands::Reports => {
            handle_reports();
            Ok(())
        }
        Commands::Report { id, chart, rows } => handle_report(&config, id, chart, rows),
        Commands::Menu => {
            let store = open_existing_store(&config)?;
            menu::run_menu(&store, &config)?;
            store.close()?;
            Ok(())
        }
        Commands::Config { action } => handle_config(action, &config, workspace),
    }
}

fn override_input(config: &mut CinelensConfig, input: Option<PathBuf>) {
    if let Some(path) = input {
        config.input.path = path;
    }
}

fn handle_run(config: &CinelensConfig) -> anyhow::Result<()> {
    let Some(store) = ingest(config)? else {
        return Ok(());
    };
    menu::run_menu(&store, config)?;
    store.close()?;
    println!("Connection closed. Program complete.");
    Ok(())
}

/// Load, clean and persist the configured input. Returns the open store, or
/// `None` when loading or cleaning produced nothing to persist.
pub(crate) fn ingest(config: &CinelensConfig) -> anyhow::Result<Option<SqliteStore>> {
    let options = LoadOptions::from(&config.input);
    let raw = load(&config.input.path, &options);
    if raw.is_empty() {
        println!("Data loading failed. Check file path.");
        return Ok(None);
    }

    let cleaned = clean(raw)?;
    if cleaned.table.is_empty() {
        println!("Cleaning returned an empty table.");
        return Ok(None);
    }

    let table_name = &config.store.table_name;
    let mut store = SqliteStore::open(&config.store.database_path)?;
    let written = store.persist(&cleaned.table, table_name, PersistMode::Replace)?;
    let info = CsvSource::new(&config.input.path, options).source_info(&cleaned.table)?;
    store.record_load(table_name, &info)?;

    println!(
        "Loaded {} rows into '{}' ({} duplicates removed, {} rows dropped).",
        written,
        table_name,
        cleaned.report.duplicates_removed(),
        cleaned.report.rows_in - cleaned.report.rows_out - cleaned.report.duplicates_removed(),
    );
    Ok(Some(store))
}

fn handle_clean(config: &CinelensConfig, json: bool) -> anyhow::Result<()> {
    let raw = load(&config.input.path, &LoadOptions::from(&config.input));
    if raw.is_empty() {
        println!("Data loading failed. Check file path.");
        return Ok(());
    }
    let cleaned = clean(raw)?;
    let table_profile = profile(&cleaned.table);

    if json {
        let output = serde_json::json!({
            "report": cleaned.report,
            "head": cleaned.table.head(3),
            "profile": table_profile,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    let report = &cleaned.report;
    println!("Cleaning report: {} rows in, {} rows out", report.rows_in, report.rows_out);
    for stage in &report.stages {
        if stage.skipped {
            println!("  {:<14} skipped (columns absent)", stage.stage);
            continue;
        }
        println!(
            "  {:<14} rows {} -> {}, {} cells filled, {} decode failures",
            stage.stage, stage.rows_before, stage.rows_after, stage.cells_filled, stage.decode_failures
        );
        for fill in &stage.fills {
            println!("    {} <- {} ({}, {} cells)", fill.column, fill.value, fill.method, fill.cells);
        }
    }

    println!();
    print!("{}", canvas::render_table_text(&cleaned.table, 3));
    println!();
    println!(
        "{} rows x {} columns, {} nulls, {} duplicate rows",
        table_profile.total_rows,
        table_profile.total_columns,
        table_profile.total_nulls(),
        table_profile.duplicate_rows
    );
    for column in &table_profile.columns {
        println!(
            "  {:<28} {:<8} {} nulls",
            column.name,
            column.dtype.to_string(),
            column.null_count
        );
    }
    Ok(())
}

fn handle_reports() {
    println!("Available reports:");
    for report in reports::list_reports() {
        println!("  {:>2}. {} ({})", report.id, report.title, report.default_chart);
    }
}

/// Open the store for reading reports. Fails when nothing has been ingested yet.
pub(crate) fn open_existing_store(config: &CinelensConfig) -> anyhow::Result<SqliteStore> {
    let db = &config.store.database_path;
    if !db.exists() {
        anyhow::bail!(
            "No store at {}. Run `cinelens ingest` first.",
            db.display()
        );
    }
    let store = SqliteStore::open(db)?;
    if !store.table_exists(&config.store.table_name)? {
        anyhow::bail!(
            "Table '{}' not found in {}. Run `cinelens ingest` first.",
            config.store.table_name,
            db.display()
        );
    }
    if let Some(record) = store.latest_load(&config.store.table_name)? {
        tracing::info!(
            source = %record.source,
            rows = record.rows,
            loaded_at = %record.loaded_at,
            "Reporting on '{}'",
            record.table_name
        );
    }
    Ok(store)
}

fn handle_report(
    config: &CinelensConfig,
    id: u8,
    chart: Option<ChartKind>,
    rows: Option<usize>,
) -> anyhow::Result<()> {
    let spec = reports::find_report(id)?;
    let store = open_existing_store(config)?;
    let result = reports::execute(id, &store, &config.store.table_name)?;
    store.close()?;

    if result.is_empty() {
        println!("No data returned for this query.");
        return Ok(());
    }
    println!("--- {} ---", spec.title);
    print!(
        "{}",
        canvas::render_table_text(&result, rows.unwrap_or(config.report.preview_rows))
    );

    if let Some(kind) = chart {
        let path = canvas::render(
            &result,
            spec.x_column,
            spec.y_column,
            spec.title,
            kind,
            &ChartOptions::from(&config.charts),
        )?;
        println!("Chart written to {}", path.display());
        if config.charts.open_in_browser {
            menu::open_chart(&path);
        }
    }
    Ok(())
}

fn handle_config(
    action: ConfigAction,
    effective: &CinelensConfig,
    workspace: &Path,
) -> anyhow::Result<()> {
    match action {
        ConfigAction::Init => {
            let config_path = config::workspace_config_path(workspace);
            if config_path.exists() {
                println!(
                    "Configuration file already exists at: {}",
                    config_path.display()
                );
                return Ok(());
            }
            let path = config::write_default_config(workspace)?;
            println!("Created default configuration at: {}", path.display());
            Ok(())
        }
        ConfigAction::Show => {
            let toml_str = toml::to_string_pretty(effective)?;
            println!("{}", toml_str);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cinelens_core::Cell;
    use pretty_assertions::assert_eq;

    fn config_in(dir: &Path) -> CinelensConfig {
        let mut config = CinelensConfig::default();
        config.resolve_paths(dir);
        config
    }

    fn write_input(dir: &Path) {
        std::fs::write(
            dir.join("movie_metadata.csv"),
            "movie_title,genres,imdb_score,title_year,gross,budget\n\
             Heat,Crime|Drama,8.2,1995,67436818,60000000\n\
             Up,Animation|Adventure,8.3,2009,292979556,175000000\n\
             Up,Animation|Adventure,8.3,2009,292979556,175000000\n\
             Lost,Drama,6.0,2012,,1000\n",
        )
        .unwrap();
    }

    #[test]
    fn test_ingest_persists_cleaned_table() {
        let dir = tempfile::tempdir().unwrap();
        write_input(dir.path());
        let config = config_in(dir.path());

        let store = ingest(&config).unwrap().unwrap();
        let count = store.query("SELECT COUNT(*) AS n FROM movie_data").unwrap();
        assert_eq!(count.rows[0][0], Cell::Int(2));
        let record = store.latest_load("movie_data").unwrap().unwrap();
        assert_eq!(record.rows, 2);
        store.close().unwrap();

        let store = open_existing_store(&config).unwrap();
        let per_year = reports::execute(10, &store, &config.store.table_name).unwrap();
        assert_eq!(per_year.row_count(), 2);
    }

    #[test]
    fn test_ingest_missing_input_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        assert!(ingest(&config).unwrap().is_none());
        assert!(!config.store.database_path.exists());
    }

    #[test]
    fn test_report_without_store_fails() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        let err = open_existing_store(&config).unwrap_err();
        assert!(err.to_string().contains("cinelens ingest"));
    }

    #[test]
    fn test_report_renders_chart() {
        let dir = tempfile::tempdir().unwrap();
        write_input(dir.path());
        let config = config_in(dir.path());
        ingest(&config).unwrap().unwrap().close().unwrap();

        handle_report(&config, 1, Some(ChartKind::Bar), None).unwrap();
        assert!(
            config
                .charts
                .output_dir
                .join("report-top-imdb-movies-bar.html")
                .exists()
        );
        assert!(handle_report(&config, 11, None, None).is_err());
    }

    #[test]
    fn test_config_init_writes_once() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        handle_config(ConfigAction::Init, &config, dir.path()).unwrap();
        let path = config::workspace_config_path(dir.path());
        assert!(path.exists());
        std::fs::write(&path, "# edited\n").unwrap();
        handle_config(ConfigAction::Init, &config, dir.path()).unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "# edited\n");
    }
}
