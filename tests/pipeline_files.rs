use calamine::{open_workbook_auto, Data, DataType, Reader};
use chrono::NaiveDate;
use footfall_report::config::ReportConfig;
use footfall_report::error::ReportError;
use footfall_report::export::{xlsx, TabularRow};
use footfall_report::loader::load_table;
use footfall_report::pipeline::run_files;
use footfall_report::types::{AamType, DistrictSummaryRow, FacilitySummaryRow, MetricRow};
use rust_xlsxwriter::{Format, Workbook};
use std::fs;
use std::path::{Path, PathBuf};

const MASTER_CSV: &str = "\
HFI_Name,FACILITY_TYPE,District_Name
Civil Hospital ,AAM-UPHC,North
Ward 2,aam-uphc,North
Ward 3,AAM-UPHC,South
Sub Centre A,AAM-USHC,South
Sub Centre B,AAM-USHC,South
";

const FOOTFALL_CSV: &str = "\
Facility Name,AAM Type,District,Entry Date,Footfall Total,Footfall Female
civil hospital,AAM-UPHC,North,2024-01-01,20,12
WARD 3,AAM-UPHC,South,2024-01-02,10,5
Ward 2,AAM-UPHC,North,2024-02-15,7,1
Sub Centre A,AAM-USHC,South,not a date,3,1
";

fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

fn january(aam: AamType) -> ReportConfig {
    ReportConfig {
        aam_type: aam,
        from: NaiveDate::from_ymd_opt(2024, 1, 1),
        to: NaiveDate::from_ymd_opt(2024, 1, 31),
    }
}

#[test]
fn csv_inputs_produce_dashboard_and_summaries() {
    let dir = tempfile::tempdir().unwrap();
    let master = write(dir.path(), "master.csv", MASTER_CSV);
    let footfall = write(dir.path(), "footfall.csv", FOOTFALL_CSV);

    let bundle = run_files(&footfall, &master, &january(AamType::Uphc)).unwrap();
    assert_eq!(bundle.metrics.registered_for(AamType::Uphc), 3);
    assert_eq!(bundle.metrics.registered_for(AamType::Ushc), 2);
    assert_eq!(bundle.metrics.reported_for(AamType::Uphc), 2);
    assert_eq!(bundle.metrics.reported_for(AamType::Ushc), 0);

    let body: Vec<&FacilitySummaryRow> = bundle.facility.iter().filter(|r| !r.is_total()).collect();
    assert_eq!(body.len(), 2);
    let total = bundle.facility.last().unwrap();
    assert_eq!(
        total.footfall_total,
        body.iter().map(|r| r.footfall_total).sum::<u64>()
    );

    for row in &bundle.district {
        assert_eq!(row.unreported, row.registered as i64 - row.reported as i64);
    }
}

#[test]
fn single_day_range_keeps_that_day_only() {
    let dir = tempfile::tempdir().unwrap();
    let master = write(dir.path(), "master.csv", MASTER_CSV);
    let footfall = write(dir.path(), "footfall.csv", FOOTFALL_CSV);
    let day = NaiveDate::from_ymd_opt(2024, 1, 2);
    let config = ReportConfig {
        aam_type: AamType::Uphc,
        from: day,
        to: day,
    };

    let bundle = run_files(&footfall, &master, &config).unwrap();
    assert_eq!(bundle.counts.footfall_in_range, 1);
    assert_eq!(bundle.facility[0].facility_name, "WARD 3");
}

#[test]
fn inverted_range_disables_filtering() {
    let dir = tempfile::tempdir().unwrap();
    let master = write(dir.path(), "master.csv", MASTER_CSV);
    let footfall = write(dir.path(), "footfall.csv", FOOTFALL_CSV);
    let config = ReportConfig {
        aam_type: AamType::Ushc,
        from: NaiveDate::from_ymd_opt(2024, 3, 1),
        to: NaiveDate::from_ymd_opt(2024, 1, 1),
    };

    let bundle = run_files(&footfall, &master, &config).unwrap();
    assert_eq!(bundle.counts.footfall_in_range, 4);
    assert_eq!(bundle.metrics.reported_for(AamType::Ushc), 1);
}

#[test]
fn missing_columns_are_listed_per_table() {
    let dir = tempfile::tempdir().unwrap();
    let master = write(dir.path(), "master.csv", "HFI Name,Zone\nA,1\n");
    let footfall = write(
        dir.path(),
        "footfall.csv",
        "Facility Name,AAM Type,District,Entry Date\nA,AAM-UPHC,North,2024-01-01\n",
    );

    let err = run_files(&footfall, &master, &ReportConfig::default()).unwrap_err();
    match err {
        ReportError::MissingColumns { footfall, master } => {
            assert_eq!(footfall, ["Footfall_Total", "Footfall_Female"]);
            assert_eq!(master, ["AAM_Type", "District_Name"]);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn spreadsheet_inputs_read_dates_and_numbers() {
    let dir = tempfile::tempdir().unwrap();
    let master = write(dir.path(), "master.csv", MASTER_CSV);
    let footfall = dir.path().join("footfall.xlsx");

    let mut workbook = Workbook::new();
    let date_format = Format::new().set_num_format("yyyy-mm-dd");
    {
        let ws = workbook.add_worksheet();
        let headers = ["Facility_Name", "AAM_Type", "District_Name", "Entry_Date", "Footfall_Total", "Footfall_Female"];
        for (c, h) in headers.iter().enumerate() {
            ws.write_string(0, c as u16, *h).unwrap();
        }
        ws.write_string(1, 0, "Ward 3").unwrap();
        ws.write_string(1, 1, "AAM-UPHC").unwrap();
        ws.write_string(1, 2, "South").unwrap();
        // 2024-01-02 as an Excel serial.
        ws.write_number_with_format(1, 3, 45293.0, &date_format).unwrap();
        ws.write_number(1, 4, 10.0).unwrap();
        ws.write_number(1, 5, 4.0).unwrap();
    }
    workbook.save(&footfall).unwrap();

    let bundle = run_files(&footfall, &master, &january(AamType::Uphc)).unwrap();
    assert_eq!(bundle.counts.unparsed_dates, 0);
    assert_eq!(bundle.counts.footfall_in_range, 1);
    assert_eq!(bundle.facility[0].footfall_total, 10);
    assert_eq!(bundle.facility[0].pct_female, 40.0);
}

#[test]
fn summary_xlsx_round_trips_cell_values() {
    let dir = tempfile::tempdir().unwrap();
    let master = write(dir.path(), "master.csv", MASTER_CSV);
    let footfall = write(dir.path(), "footfall.csv", FOOTFALL_CSV);
    let bundle = run_files(&footfall, &master, &ReportConfig {
        aam_type: AamType::Uphc,
        from: None,
        to: None,
    })
    .unwrap();

    let path = dir.path().join("FacilityWiseReport.xlsx");
    fs::write(&path, xlsx::to_xlsx(&bundle.facility, "Sheet1").unwrap()).unwrap();
    let table = load_table(&path).unwrap();

    assert_eq!(table.headers, FacilitySummaryRow::HEADERS);
    assert_eq!(table.len(), bundle.facility.len());
    for (r, row) in bundle.facility.iter().enumerate() {
        let expected: Vec<String> = row.cells().iter().map(|c| c.to_string()).collect();
        let actual: Vec<&str> = (0..expected.len()).map(|c| table.cell(r, c)).collect();
        assert_eq!(actual, expected, "row {r}");
    }
}

#[test]
fn combined_workbook_holds_all_three_summaries() {
    let dir = tempfile::tempdir().unwrap();
    let master = write(dir.path(), "master.csv", MASTER_CSV);
    let footfall = write(dir.path(), "footfall.csv", FOOTFALL_CSV);
    let bundle = run_files(&footfall, &master, &january(AamType::Uphc)).unwrap();
    let metrics = bundle.metrics.rows();

    let bytes = xlsx::to_combined_xlsx(&bundle.facility, &bundle.district, &metrics).unwrap();
    let path = dir.path().join("Combined_Footfall_Report.xlsx");
    fs::write(&path, bytes).unwrap();

    let table = load_table(&path).unwrap();
    assert_eq!(table.headers, FacilitySummaryRow::HEADERS);
    assert_eq!(table.cell(table.len() - 1, 1), "Total");

    let mut workbook = open_workbook_auto(&path).unwrap();
    assert_eq!(
        workbook.sheet_names(),
        [xlsx::FACILITY_SHEET, xlsx::DISTRICT_SHEET, xlsx::DASHBOARD_SHEET]
    );

    let district = workbook.worksheet_range(xlsx::DISTRICT_SHEET).unwrap();
    let mut rows = district.rows();
    let header: Vec<String> = rows.next().unwrap().iter().map(|c| c.to_string()).collect();
    assert_eq!(header, DistrictSummaryRow::HEADERS);
    let body: Vec<&[Data]> = rows.collect();
    assert_eq!(body.len(), bundle.district.len());
    for (cells, row) in body.iter().zip(&bundle.district) {
        assert_eq!(cells[1].to_string(), row.district_name);
        assert_eq!(cells[2].as_f64(), Some(row.registered as f64));
        assert_eq!(cells[3].as_f64(), Some(row.reported as f64));
    }

    let dashboard = workbook.worksheet_range(xlsx::DASHBOARD_SHEET).unwrap();
    let mut rows = dashboard.rows();
    let header: Vec<String> = rows.next().unwrap().iter().map(|c| c.to_string()).collect();
    assert_eq!(header, MetricRow::HEADERS);
    let cards: Vec<(String, Option<f64>)> = rows
        .map(|cells| (cells[0].to_string(), cells[1].as_f64()))
        .collect();
    let expected: Vec<(String, Option<f64>)> = metrics
        .iter()
        .map(|m| (m.metric.clone(), Some(m.value as f64)))
        .collect();
    assert_eq!(cards.len(), 4);
    assert_eq!(cards, expected);
}
