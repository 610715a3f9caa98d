use crate::error::Result;
use serde::Serialize;
use std::fs;
use std::path::Path;
use tabled::{settings::Style, Table, Tabled};
use tracing::info;

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

pub fn write_bytes(path: &Path, bytes: &[u8]) -> Result<()> {
    ensure_parent_dir(path)?;
    fs::write(path, bytes)?;
    info!(path = %path.display(), bytes = bytes.len(), "Wrote artifact");
    Ok(())
}

pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    ensure_parent_dir(path)?;
    let mut wtr = csv::Writer::from_path(path)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    info!(path = %path.display(), rows = rows.len(), "Wrote artifact");
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    write_bytes(path, s.as_bytes())
}

/// Markdown preview of the first `max_rows` rows. When rows are cut, the
/// last row (the grand total) is still shown.
pub fn preview_table_rows<T>(rows: &[T], max_rows: usize) -> String
where
    T: Tabled + Clone,
{
    if rows.is_empty() {
        return "(no rows)".to_string();
    }
    let mut slice: Vec<T> = rows.iter().take(max_rows).cloned().collect();
    if rows.len() > max_rows {
        if let Some(last) = rows.last() {
            slice.push(last.clone());
        }
    }
    Table::new(slice).with(Style::markdown()).to_string()
}
