//! In-memory table model shared by the loader, the cleaning pipeline and the store.

use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Deref;

/// A single cell value. `Missing` is its own state, never a sentinel string.
#[derive(Debug, Clone, Default)]
pub enum Cell {
    #[default]
    Missing,
    Int(i64),
    Float(f64),
    Text(String),
}

impl Cell {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }

    /// Numeric view of the cell, `None` for text and missing cells.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Self::Missing => 0,
            Self::Int(_) | Self::Float(_) => 1,
            Self::Text(_) => 2,
        }
    }

    fn float_bits(f: f64) -> u64 {
        if f == 0.0 { 0.0f64.to_bits() } else { f.to_bits() }
    }
}

impl PartialEq for Cell {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Missing, Self::Missing) => true,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => Self::float_bits(*a) == Self::float_bits(*b),
            (Self::Text(a), Self::Text(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Cell {}

impl Hash for Cell {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Self::Missing => {}
            Self::Int(i) => i.hash(state),
            Self::Float(f) => Self::float_bits(*f).hash(state),
            Self::Text(s) => s.hash(state),
        }
    }
}

/// Total order: missing first, then numbers by value, then text by bytes.
/// Ints sort before floats of the same value so the order stays consistent with `Eq`.
impl Ord for Cell {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => a.cmp(b),
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            (Self::Missing, Self::Missing) => Ordering::Equal,
            (a, b) if a.rank() == 1 && b.rank() == 1 => {
                let x = f64::from_bits(Self::float_bits(a.as_f64().unwrap_or_default()));
                let y = f64::from_bits(Self::float_bits(b.as_f64().unwrap_or_default()));
                x.total_cmp(&y).then_with(|| match (a, b) {
                    (Self::Int(_), Self::Float(_)) => Ordering::Less,
                    (Self::Float(_), Self::Int(_)) => Ordering::Greater,
                    (Self::Float(p), Self::Float(q)) => {
                        Self::float_bits(*p).cmp(&Self::float_bits(*q))
                    }
                    _ => Ordering::Equal,
                })
            }
            (a, b) => a.rank().cmp(&b.rank()),
        }
    }
}

impl PartialOrd for Cell {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => write!(f, "NULL"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Text(s) => write!(f, "{s}"),
        }
    }
}

impl Serialize for Cell {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Missing => serializer.serialize_none(),
            Self::Int(i) => serializer.serialize_i64(*i),
            Self::Float(f) => serializer.serialize_f64(*f),
            Self::Text(s) => serializer.serialize_str(s),
        }
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for Cell {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl<T: Into<Cell>> From<Option<T>> for Cell {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Missing, Into::into)
    }
}

/// An ordered, rectangular table: named columns and rows of aligned cells.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        debug_assert!(
            rows.iter().all(|r| r.len() == columns.len()),
            "every row must have one cell per column"
        );
        Self { columns, rows }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Iterate the cells of the named column, top to bottom.
    pub fn column(&self, name: &str) -> Option<impl Iterator<Item = &Cell>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(move |row| &row[idx]))
    }

    pub fn missing_count(&self, idx: usize) -> usize {
        self.rows.iter().filter(|row| row[idx].is_missing()).count()
    }

    /// The first `n` rows as a new table.
    pub fn head(&self, n: usize) -> Table {
        Table {
            columns: self.columns.clone(),
            rows: self.rows.iter().take(n).cloned().collect(),
        }
    }
}

/// A table produced by the cleaning pipeline. Only `data::clean` can build one,
/// so holding a `CleanedTable` means the cleaning guarantees were established.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CleanedTable(Table);

impl CleanedTable {
    pub(crate) fn new(table: Table) -> Self {
        Self(table)
    }

    pub fn as_table(&self) -> &Table {
        &self.0
    }

    pub fn into_inner(self) -> Table {
        self.0
    }
}

impl Deref for CleanedTable {
    type Target = Table;

    fn deref(&self) -> &Table {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_cell_order_missing_numbers_text() {
        let mut cells = vec![
            Cell::text("b"),
            Cell::Float(2.5),
            Cell::Missing,
            Cell::Int(3),
            Cell::text("a"),
            Cell::Int(1),
        ];
        cells.sort();
        assert_eq!(
            cells,
            vec![
                Cell::Missing,
                Cell::Int(1),
                Cell::Float(2.5),
                Cell::Int(3),
                Cell::text("a"),
                Cell::text("b"),
            ]
        );
    }

    #[test]
    fn test_cell_equality_and_hash() {
        assert_eq!(Cell::Float(0.0), Cell::Float(-0.0));
        assert_ne!(Cell::Int(1), Cell::Float(1.0));
        assert_ne!(Cell::Missing, Cell::text(""));

        let set: HashSet<Cell> = [Cell::Float(0.0), Cell::Float(-0.0), Cell::Missing]
            .into_iter()
            .collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_cell_serialize() {
        let row = vec![Cell::Missing, Cell::Int(7), Cell::text("Color")];
        assert_eq!(serde_json::to_string(&row).unwrap(), r#"[null,7,"Color"]"#);
    }

    #[test]
    fn test_table_accessors() {
        let table = Table::new(
            vec!["a".into(), "b".into()],
            vec![
                vec![Cell::Int(1), Cell::Missing],
                vec![Cell::Int(2), Cell::text("x")],
            ],
        );
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.column_count(), 2);
        assert_eq!(table.column_index("b"), Some(1));
        assert!(!table.has_column("c"));
        assert_eq!(table.missing_count(1), 1);
        let a: Vec<_> = table.column("a").unwrap().cloned().collect();
        assert_eq!(a, vec![Cell::Int(1), Cell::Int(2)]);
        assert_eq!(table.head(1).row_count(), 1);
    }

    #[test]
    fn test_table_empty() {
        let table = Table::empty();
        assert!(table.is_empty());
        assert_eq!(table.column_count(), 0);
    }
}
