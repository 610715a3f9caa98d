// Turn normalized raw tables into typed records.
//
// Facility names and AAM types are trimmed and upper-cased so grouping is
// insensitive to case and stray whitespace. District names are kept as given.
use crate::config::{
    TableKind, AAM_TYPE, DISTRICT_NAME, ENTRY_DATE, FACILITY_NAME, FOOTFALL_FEMALE, FOOTFALL_TOTAL,
};
use crate::error::{ReportError, Result};
use crate::loader::RawTable;
use crate::normalize::missing_columns;
use crate::types::{FacilityRecord, FootfallRecord};
use crate::util::{parse_count_safe, parse_date_safe};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StandardizeReport {
    pub rows: usize,
    pub unparsed_dates: usize,
}

pub fn standardize_identity(value: &str) -> String {
    value.trim().to_uppercase()
}

fn require(table: &RawTable, kind: TableKind, column: &str) -> Result<usize> {
    table.column_index(column).ok_or_else(|| {
        let missing = missing_columns(table, kind);
        match kind {
            TableKind::Footfall => ReportError::MissingColumns {
                footfall: missing,
                master: vec![],
            },
            TableKind::Master => ReportError::MissingColumns {
                footfall: vec![],
                master: missing,
            },
        }
    })
}

pub fn master_records(table: &RawTable) -> Result<Vec<FacilityRecord>> {
    let kind = TableKind::Master;
    let name = require(table, kind, FACILITY_NAME)?;
    let aam = require(table, kind, AAM_TYPE)?;
    let district = require(table, kind, DISTRICT_NAME)?;

    Ok((0..table.len())
        .map(|r| FacilityRecord {
            facility_name: standardize_identity(table.cell(r, name)),
            aam_type: standardize_identity(table.cell(r, aam)),
            district_name: table.cell(r, district).to_string(),
        })
        .collect())
}

pub fn footfall_records(table: &RawTable) -> Result<(Vec<FootfallRecord>, StandardizeReport)> {
    let kind = TableKind::Footfall;
    let name = require(table, kind, FACILITY_NAME)?;
    let aam = require(table, kind, AAM_TYPE)?;
    let district = require(table, kind, DISTRICT_NAME)?;
    let date = require(table, kind, ENTRY_DATE)?;
    let total = require(table, kind, FOOTFALL_TOTAL)?;
    let female = require(table, kind, FOOTFALL_FEMALE)?;

    let mut report = StandardizeReport::default();
    let mut records = Vec::with_capacity(table.len());
    for r in 0..table.len() {
        let entry_date = parse_date_safe(table.cell(r, date));
        if entry_date.is_none() {
            report.unparsed_dates += 1;
        }
        records.push(FootfallRecord {
            facility_name: standardize_identity(table.cell(r, name)),
            aam_type: standardize_identity(table.cell(r, aam)),
            district_name: table.cell(r, district).to_string(),
            entry_date,
            footfall_total: count_cell(table, r, total, FOOTFALL_TOTAL)?,
            footfall_female: count_cell(table, r, female, FOOTFALL_FEMALE)?,
        });
    }
    report.rows = records.len();
    Ok((records, report))
}

fn count_cell(table: &RawTable, row: usize, col: usize, column: &'static str) -> Result<u64> {
    let raw = table.cell(row, col);
    parse_count_safe(raw).ok_or_else(|| ReportError::InvalidNumber {
        column,
        row: row + 1,
        value: raw.to_string(),
    })
}
