use serde::{Deserialize, Serialize};

/// A single loosely typed table value, as exported by the offline pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Cell {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    List(Vec<String>),
}

impl Cell {
    pub fn is_null(&self) -> bool {
        match self {
            Cell::Null => true,
            Cell::Float(f) => f.is_nan(),
            _ => false,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Image references are sometimes exported as a list of URLs; the first one is used.
    pub fn as_image(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            Cell::List(items) => items.first().map(String::as_str),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Int(i) => Some(*i as f64),
            Cell::Float(f) if !f.is_nan() => Some(*f),
            Cell::Text(s) => s.trim().parse().ok().filter(|f: &f64| !f.is_nan()),
            _ => None,
        }
    }

    /// Counts may arrive as floats (pandas upcasts integer columns holding NaN).
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Cell::Int(i) if *i >= 0 => Some(*i as u64),
            Cell::Float(f) if f.is_finite() && *f >= 0.0 => Some(*f as u64),
            Cell::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

/// Column-oriented names over row-oriented values. Column names are kept
/// exactly as the producer wrote them; mapping them to logical fields is the
/// job of [`crate::schema::resolve_column`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Frame {
    pub fn new(columns: Vec<String>) -> Self {
        Self { columns, rows: Vec::new() }
    }

    pub fn push_row(&mut self, row: Vec<Cell>) {
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&Cell> {
        self.rows.get(row).and_then(|r| r.get(col))
    }

    /// Index of the first row whose width does not match the column count.
    pub(crate) fn first_ragged_row(&self) -> Option<usize> {
        self.rows.iter().position(|r| r.len() != self.columns.len())
    }
}
