use crate::error::{ReportError, Result};
use crate::util::excel_serial_to_date;
use calamine::{open_workbook_auto, Data, Reader};
use csv::ReaderBuilder;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// An untyped table: one header row plus string cells.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Cell text, or `""` when the row is shorter than the header.
    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Load a delimited-text or spreadsheet file, chosen by extension.
pub fn load_table(path: &Path) -> Result<RawTable> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    let table = match ext.as_str() {
        "csv" | "txt" => read_delimited(std::fs::File::open(path)?, b',')?,
        "tsv" => read_delimited(std::fs::File::open(path)?, b'\t')?,
        "xlsx" | "xlsm" | "xls" | "xlsb" | "ods" => read_workbook(path)?,
        _ => return Err(ReportError::UnsupportedFormat(path.display().to_string())),
    };
    debug!(
        path = %path.display(),
        columns = table.headers.len(),
        rows = table.len(),
        "Loaded table"
    );
    Ok(table)
}

pub fn read_delimited<R: Read>(reader: R, delimiter: u8) -> Result<RawTable> {
    let mut rdr = ReaderBuilder::new()
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(reader);
    let headers = rdr.headers()?.iter().map(str::to_string).collect();
    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record?;
        // Blank lines in exported sheets come through as a single empty field.
        if record.iter().all(|c| c.trim().is_empty()) {
            continue;
        }
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok(RawTable::new(headers, rows))
}

fn read_workbook(path: &Path) -> Result<RawTable> {
    let mut workbook = open_workbook_auto(path)?;
    let range = match workbook.worksheet_range_at(0) {
        Some(range) => range?,
        None => return Ok(RawTable::default()),
    };
    let mut rows = range.rows();
    let headers = match rows.next() {
        Some(r) => r.iter().map(cell_text).collect(),
        None => return Ok(RawTable::default()),
    };
    let rows = rows
        .map(|r| r.iter().map(cell_text).collect::<Vec<String>>())
        .filter(|r| r.iter().any(|c| !c.trim().is_empty()))
        .collect();
    Ok(RawTable::new(headers, rows))
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => float_text(*f),
        Data::DateTime(dt) => excel_serial_to_date(dt.as_f64())
            .map(|d| d.to_string())
            .unwrap_or_default(),
        other => other.to_string(),
    }
}

/// Integral floats render without a fractional part, as a spreadsheet shows
/// them.
fn float_text(f: f64) -> String {
    if f.fract() == 0.0 && f.abs() < 1e15 {
        format!("{}", f as i64)
    } else {
        f.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_ragged_csv() {
        let data = "Facility Name,District\nA,North\nB\n\n";
        let table = read_delimited(data.as_bytes(), b',').unwrap();
        assert_eq!(table.headers, ["Facility Name", "District"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.cell(1, 0), "B");
        assert_eq!(table.cell(1, 1), "");
        assert_eq!(table.cell(9, 0), "");
    }

    #[test]
    fn reads_tab_delimited() {
        let data = "a\tb\n1\t2\n";
        let table = read_delimited(data.as_bytes(), b'\t').unwrap();
        assert_eq!(table.column_index("b"), Some(1));
        assert_eq!(table.cell(0, 1), "2");
    }

    #[test]
    fn rejects_unknown_extension() {
        let err = load_table(Path::new("footfall.json")).unwrap_err();
        assert!(matches!(err, ReportError::UnsupportedFormat(_)));
    }

    #[test]
    fn float_text_drops_integral_fraction() {
        assert_eq!(float_text(3.0), "3");
        assert_eq!(float_text(66.67), "66.67");
    }

    #[test]
    fn date_cells_render_as_iso_or_blank() {
        use calamine::{ExcelDateTime, ExcelDateTimeType};

        let date = |serial| Data::DateTime(ExcelDateTime::new(serial, ExcelDateTimeType::DateTime, false));
        assert_eq!(cell_text(&date(45293.0)), "2024-01-02");
        assert_eq!(cell_text(&date(1.0e15)), "");
    }
}
