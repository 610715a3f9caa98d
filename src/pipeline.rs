// One full report pass: normalize, standardize, filter, aggregate.
//
// Every stage logs its row counts so a run can be traced in the diagnostics
// log without re-running it.

use crate::config::{ReportConfig, AAM_TYPE, FACILITY_NAME};
use crate::error::Result;
use crate::filter::{filter_by_date, resolve_range, DateRange};
use crate::loader::{load_table, RawTable};
use crate::normalize::normalize_pair;
use crate::reports::{dashboard_metrics, district_summary, facility_summary};
use crate::standardize::{footfall_records, master_records};
use crate::types::{
    AamType, DashboardMetrics, DistrictSummaryRow, FacilityRecord, FacilitySummaryRow,
    FootfallRecord,
};
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::Path;
use tracing::{debug, info, instrument, warn};

/// Row counts at each stage of the pass.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct StageCounts {
    pub master_rows: usize,
    pub footfall_rows: usize,
    pub unparsed_dates: usize,
    pub footfall_in_range: usize,
    pub footfall_selected: usize,
    pub master_selected: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportBundle {
    pub aam_type: String,
    pub range: DateRange,
    pub metrics: DashboardMetrics,
    pub counts: StageCounts,
    #[serde(skip)]
    pub facility: Vec<FacilitySummaryRow>,
    #[serde(skip)]
    pub district: Vec<DistrictSummaryRow>,
}

fn distinct_values(table: &RawTable, column: &str) -> Vec<String> {
    let Some(col) = table.column_index(column) else {
        return Vec::new();
    };
    let set: BTreeSet<&str> = (0..table.len()).map(|r| table.cell(r, col)).collect();
    set.into_iter().map(str::to_string).collect()
}

fn log_raw(label: &'static str, table: &RawTable) {
    debug!(
        table = label,
        aam_types = ?distinct_values(table, AAM_TYPE),
        facility_entries = table.len(),
        facility_unique = distinct_values(table, FACILITY_NAME).len(),
        "Raw data before standardization"
    );
}

fn log_master(records: &[FacilityRecord]) {
    let types: BTreeSet<&str> = records.iter().map(|r| r.aam_type.as_str()).collect();
    let unique: BTreeSet<&str> = records.iter().map(|r| r.facility_name.as_str()).collect();
    let sample: Vec<&str> = records.iter().take(5).map(|r| r.facility_name.as_str()).collect();
    debug!(
        table = "Master",
        aam_types = ?types,
        facility_entries = records.len(),
        facility_unique = unique.len(),
        sample = ?sample,
        "Data after standardization"
    );
}

fn log_footfall(stage: &'static str, records: &[FootfallRecord]) {
    let types: BTreeSet<&str> = records.iter().map(|r| r.aam_type.as_str()).collect();
    let unique: BTreeSet<&str> = records.iter().map(|r| r.facility_name.as_str()).collect();
    let sample: Vec<&str> = records.iter().take(5).map(|r| r.facility_name.as_str()).collect();
    debug!(
        table = "Footfall",
        stage,
        aam_types = ?types,
        facility_entries = records.len(),
        facility_unique = unique.len(),
        sample = ?sample,
        "Footfall data"
    );
}

/// Run the pass over two already-loaded tables.
#[instrument(skip_all, fields(aam_type = %config.aam_type))]
pub fn run(mut footfall: RawTable, mut master: RawTable, config: &ReportConfig) -> Result<ReportBundle> {
    normalize_pair(&mut footfall, &mut master)?;
    log_raw("Master", &master);
    log_raw("Footfall", &footfall);

    let master = master_records(&master)?;
    let (footfall, std_report) = footfall_records(&footfall)?;
    log_master(&master);
    log_footfall("standardized", &footfall);
    if std_report.unparsed_dates > 0 {
        warn!(
            unparsed = std_report.unparsed_dates,
            "Entry_Date values could not be parsed and are excluded from date filtering"
        );
    }

    let range = resolve_range(&footfall, config);
    if range.is_inverted() {
        warn!(%range, "Start date is after end date; date filter not applied");
    }
    info!(%range, "Selected date range");
    let in_range = filter_by_date(&footfall, &range);
    log_footfall("date-filtered", &in_range);

    let metrics = dashboard_metrics(&master, &in_range);
    info!(
        total_uphc = metrics.registered_for(AamType::Uphc),
        total_ushc = metrics.registered_for(AamType::Ushc),
        reported_uphc = metrics.reported_for(AamType::Uphc),
        reported_ushc = metrics.reported_for(AamType::Ushc),
        master_entries = master.len(),
        footfall_entries = in_range.len(),
        "Calculated metrics"
    );

    let selected = config.aam_type.as_str();
    let counts = StageCounts {
        master_rows: master.len(),
        footfall_rows: footfall.len(),
        unparsed_dates: std_report.unparsed_dates,
        footfall_in_range: in_range.len(),
        footfall_selected: in_range.iter().filter(|r| r.aam_type == selected).count(),
        master_selected: master.iter().filter(|r| r.aam_type == selected).count(),
    };

    let facility = facility_summary(&in_range, config.aam_type);
    let district = district_summary(&master, &in_range, config.aam_type);
    info!(
        facility_rows = facility.len(),
        district_rows = district.len(),
        reported_sum = district.last().map(|r| r.reported).unwrap_or(0),
        "Summary data"
    );

    Ok(ReportBundle {
        aam_type: selected.to_string(),
        range,
        metrics,
        counts,
        facility,
        district,
    })
}

/// Load both files and run the pass.
pub fn run_files(footfall: &Path, master: &Path, config: &ReportConfig) -> Result<ReportBundle> {
    let footfall_table = load_table(footfall)?;
    let master_table = load_table(master)?;
    info!(
        footfall = %footfall.display(),
        footfall_rows = footfall_table.len(),
        master = %master.display(),
        master_rows = master_table.len(),
        "Loaded inputs"
    );
    run(footfall_table, master_table, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReportError;
    use chrono::NaiveDate;

    fn table(headers: &[&str], rows: &[&[&str]]) -> RawTable {
        RawTable::new(
            headers.iter().map(|h| h.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
        )
    }

    fn master() -> RawTable {
        table(
            &["HFI Name", "Facility Type", "District"],
            &[
                &["Civil Hospital ", "aam-uphc", "North"],
                &["Ward 2", "AAM-UPHC", "North"],
                &["Ward 3", "AAM-UPHC", "South"],
                &["Sub Centre A", "AAM-USHC", "South"],
                &["Sub Centre B", "AAM-USHC", "South"],
            ],
        )
    }

    fn footfall() -> RawTable {
        table(
            &["Facility Name", "AAM Type", "District", "Entry Date", "Footfall Total", "Footfall Female"],
            &[
                &["civil hospital", "AAM-UPHC", "North", "2024-01-01", "20", "12"],
                &["Ward 3", "AAM-UPHC", "South", "2024-01-02", "10", "5"],
                &["Ward 2", "AAM-UPHC", "North", "2024-02-15", "7", "1"],
                &["Sub Centre A", "AAM-USHC", "South", "garbled", "3", "1"],
            ],
        )
    }

    fn january(aam: AamType) -> ReportConfig {
        ReportConfig {
            aam_type: aam,
            from: NaiveDate::from_ymd_opt(2024, 1, 1),
            to: NaiveDate::from_ymd_opt(2024, 1, 31),
        }
    }

    #[test]
    fn dashboard_matches_worked_example() {
        let bundle = run(footfall(), master(), &january(AamType::Uphc)).unwrap();
        assert_eq!(bundle.metrics.registered_for(AamType::Uphc), 3);
        assert_eq!(bundle.metrics.registered_for(AamType::Ushc), 2);
        assert_eq!(bundle.metrics.reported_for(AamType::Uphc), 2);
        assert_eq!(bundle.metrics.reported_for(AamType::Ushc), 0);
        assert_eq!(bundle.counts.unparsed_dates, 1);
        assert_eq!(bundle.counts.footfall_in_range, 2);
    }

    #[test]
    fn summaries_merge_case_variants() {
        let bundle = run(footfall(), master(), &january(AamType::Uphc)).unwrap();
        assert_eq!(bundle.facility.len(), 3);
        assert_eq!(bundle.facility[0].facility_name, "CIVIL HOSPITAL");
        assert_eq!(bundle.facility[0].pct_female, 60.0);

        let north = &bundle.district[0];
        assert_eq!(north.district_name, "North");
        assert_eq!((north.registered, north.reported, north.unreported), (2, 1, 1));
        let total = bundle.district.last().unwrap();
        assert_eq!(total.total_footfall, 30);
    }

    #[test]
    fn default_range_comes_from_data() {
        let bundle = run(footfall(), master(), &ReportConfig::default()).unwrap();
        assert_eq!(
            bundle.range,
            DateRange::new(
                NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2024, 2, 15).unwrap()
            )
        );
        assert_eq!(bundle.counts.footfall_in_range, 3);
    }

    #[test]
    fn missing_columns_halt_the_pass() {
        let broken = table(&["Facility Name", "District"], &[&["A", "North"]]);
        let err = run(broken, master(), &ReportConfig::default()).unwrap_err();
        assert!(matches!(err, ReportError::MissingColumns { .. }));
    }
}
