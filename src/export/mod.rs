// Serializers for finished summary tables.
//
// Exporters see rows only through `TabularRow`, so the same writer serves
// the facility, district and metrics tables.

pub mod pdf;
pub mod xlsx;

use std::fmt;

/// A typed cell value. `Blank` is left empty in every output format.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Int(i64),
    Float(f64),
    Blank,
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Text(s) => f.write_str(s),
            Cell::Int(n) => write!(f, "{n}"),
            Cell::Float(v) => write!(f, "{v}"),
            Cell::Blank => Ok(()),
        }
    }
}

pub trait TabularRow {
    const HEADERS: &'static [&'static str];

    fn cells(&self) -> Vec<Cell>;
}
