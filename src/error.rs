use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error(
        "Missing columns in Footfall table: {}, Master table: {}",
        list(.footfall),
        list(.master)
    )]
    MissingColumns {
        footfall: Vec<String>,
        master: Vec<String>,
    },
    #[error("unsupported file type: {0}")]
    UnsupportedFormat(String),
    #[error("invalid number {value:?} in column {column} (data row {row})")]
    InvalidNumber {
        column: &'static str,
        row: usize,
        value: String,
    },
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("spreadsheet read error: {0}")]
    Spreadsheet(#[from] calamine::Error),
    #[error("xlsx export error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
    #[error("pdf export error: {0}")]
    Pdf(String),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ReportError>;

fn list(cols: &[String]) -> String {
    format!("[{}]", cols.join(", "))
}
