//! Relational store adapter: persists the cleaned table and runs report queries.

use crate::data::schema::column_type;
use crate::data::source::SourceInfo;
use crate::data::table::{Cell, CleanedTable, Table};
use crate::error::{CinelensError, Result};
use rusqlite::types::{ToSqlOutput, Value, ValueRef};
use rusqlite::{Connection, OptionalExtension, ToSql};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Table holding one row per successful persist.
pub const LOADS_TABLE: &str = "cinelens_loads";

/// What `persist` does when the destination table already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersistMode {
    /// Drop and recreate the table wholesale.
    Replace,
    Fail,
}

/// A relational sink for cleaned tables and source for report results.
pub trait TableStore {
    /// Write the table under `name`, returning the number of rows written.
    fn persist(&mut self, table: &CleanedTable, name: &str, mode: PersistMode) -> Result<usize>;

    /// Run a read-only query and return its rows with the statement's column names.
    fn query(&self, sql: &str) -> Result<Table>;

    fn table_exists(&self, name: &str) -> Result<bool>;
}

/// Provenance of a persisted table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadRecord {
    pub table_name: String,
    pub source: String,
    pub sha256: String,
    pub rows: i64,
    pub loaded_at: String,
}

/// Double-quote an identifier for SQLite.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

impl ToSql for Cell {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Cell::Missing => ToSqlOutput::Owned(Value::Null),
            Cell::Int(i) => ToSqlOutput::Owned(Value::Integer(*i)),
            Cell::Float(f) => ToSqlOutput::Owned(Value::Real(*f)),
            Cell::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
        })
    }
}

fn cell_from_value(value: ValueRef<'_>) -> Cell {
    match value {
        ValueRef::Null => Cell::Missing,
        ValueRef::Integer(i) => Cell::Int(i),
        ValueRef::Real(f) => Cell::Float(f),
        ValueRef::Text(t) => Cell::Text(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(_) => Cell::text("<blob>"),
    }
}

fn persist_err(e: rusqlite::Error) -> CinelensError {
    CinelensError::persistence(e.to_string())
}

fn query_err(e: rusqlite::Error) -> CinelensError {
    CinelensError::query(e.to_string())
}

/// SQLite-backed store. The connection lives as long as the store and is
/// released when the store is dropped or closed.
#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .map_err(|e| CinelensError::persistence(format!("{}: {e}", path.display())))?;
        tracing::info!(path = %path.display(), "Connected to SQLite store.");
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        Ok(Self {
            conn: Connection::open_in_memory().map_err(persist_err)?,
        })
    }

    /// Release the connection explicitly.
    pub fn close(self) -> Result<()> {
        self.conn.close().map_err(|(_, e)| persist_err(e))?;
        tracing::info!("Connection closed.");
        Ok(())
    }

    /// Remember where the table under `table_name` came from.
    pub fn record_load(&mut self, table_name: &str, info: &SourceInfo) -> Result<()> {
        self.conn
            .execute_batch(&format!(
                "CREATE TABLE IF NOT EXISTS {LOADS_TABLE} (
                    table_name TEXT NOT NULL,
                    source TEXT NOT NULL,
                    sha256 TEXT NOT NULL,
                    rows INTEGER NOT NULL,
                    loaded_at TEXT NOT NULL
                )"
            ))
            .map_err(persist_err)?;
        self.conn
            .execute(
                &format!(
                    "INSERT INTO {LOADS_TABLE} (table_name, source, sha256, rows, loaded_at)
                     VALUES (?1, ?2, ?3, ?4, ?5)"
                ),
                rusqlite::params![
                    table_name,
                    info.location,
                    info.sha256,
                    info.row_count as i64,
                    info.loaded_at.to_rfc3339(),
                ],
            )
            .map_err(persist_err)?;
        Ok(())
    }

    /// The most recent load record for a table, if any.
    pub fn latest_load(&self, table_name: &str) -> Result<Option<LoadRecord>> {
        if !self.table_exists(LOADS_TABLE)? {
            return Ok(None);
        }
        self.conn
            .query_row(
                &format!(
                    "SELECT table_name, source, sha256, rows, loaded_at FROM {LOADS_TABLE}
                     WHERE table_name = ?1 ORDER BY rowid DESC LIMIT 1"
                ),
                [table_name],
                |row| {
                    Ok(LoadRecord {
                        table_name: row.get(0)?,
                        source: row.get(1)?,
                        sha256: row.get(2)?,
                        rows: row.get(3)?,
                        loaded_at: row.get(4)?,
                    })
                },
            )
            .optional()
            .map_err(query_err)
    }
}

impl TableStore for SqliteStore {
    fn persist(&mut self, table: &CleanedTable, name: &str, mode: PersistMode) -> Result<usize> {
        if table.is_empty() {
            tracing::info!("Table is empty. Skipping upload.");
            return Ok(0);
        }
        let exists = self.table_exists(name)?;
        if exists && mode == PersistMode::Fail {
            return Err(CinelensError::persistence(format!(
                "table '{name}' already exists"
            )));
        }

        let ident = quote_ident(name);
        let column_defs = table
            .columns
            .iter()
            .enumerate()
            .map(|(i, col)| format!("{} {}", quote_ident(col), column_type(table, i).sql_type()))
            .collect::<Vec<_>>()
            .join(", ");
        let placeholders = (1..=table.column_count())
            .map(|i| format!("?{i}"))
            .collect::<Vec<_>>()
            .join(", ");

        let tx = self.conn.transaction().map_err(persist_err)?;
        if exists {
            tx.execute(&format!("DROP TABLE {ident}"), [])
                .map_err(persist_err)?;
        }
        tx.execute(&format!("CREATE TABLE {ident} ({column_defs})"), [])
            .map_err(persist_err)?;
        {
            let mut stmt = tx
                .prepare(&format!("INSERT INTO {ident} VALUES ({placeholders})"))
                .map_err(persist_err)?;
            for row in &table.rows {
                stmt.execute(rusqlite::params_from_iter(row.iter()))
                    .map_err(persist_err)?;
            }
        }
        tx.commit().map_err(persist_err)?;

        tracing::info!(rows = table.row_count(), "Data uploaded to table '{name}'.");
        Ok(table.row_count())
    }

    fn query(&self, sql: &str) -> Result<Table> {
        let mut stmt = self.conn.prepare(sql).map_err(query_err)?;
        if !stmt.readonly() {
            return Err(CinelensError::query("only read-only statements may be queried"));
        }
        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let width = columns.len();

        let mut rows = Vec::new();
        let mut result_rows = stmt.query([]).map_err(query_err)?;
        while let Some(row) = result_rows.next().map_err(query_err)? {
            let mut cells = Vec::with_capacity(width);
            for i in 0..width {
                cells.push(cell_from_value(row.get_ref(i).map_err(query_err)?));
            }
            rows.push(cells);
        }
        Ok(Table::new(columns, rows))
    }

    fn table_exists(&self, name: &str) -> Result<bool> {
        self.conn
            .query_row(
                "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1",
                [name],
                |_| Ok(()),
            )
            .optional()
            .map(|found| found.is_some())
            .map_err(query_err)
    }
}
