use crate::export::{Cell, TabularRow};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tabled::Tabled;

/// The two facility categories a report can be run for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AamType {
    Uphc,
    Ushc,
}

impl AamType {
    pub const ALL: [AamType; 2] = [AamType::Uphc, AamType::Ushc];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Uphc => "AAM-UPHC",
            Self::Ushc => "AAM-USHC",
        }
    }
}

impl fmt::Display for AamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AamType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "AAM-UPHC" => Ok(Self::Uphc),
            "AAM-USHC" => Ok(Self::Ushc),
            other => Err(format!(
                "unknown AAM type {other:?} (expected AAM-UPHC or AAM-USHC)"
            )),
        }
    }
}

/// One row of the facility master list.
#[derive(Debug, Clone, PartialEq)]
pub struct FacilityRecord {
    pub facility_name: String,
    pub aam_type: String,
    pub district_name: String,
}

/// One row of the daily footfall log.
#[derive(Debug, Clone, PartialEq)]
pub struct FootfallRecord {
    pub facility_name: String,
    pub aam_type: String,
    pub district_name: String,
    pub entry_date: Option<NaiveDate>,
    pub footfall_total: u64,
    pub footfall_female: u64,
}

fn display_serial(serial: &Option<usize>) -> String {
    serial.map(|n| n.to_string()).unwrap_or_default()
}

fn serial_cell(serial: Option<usize>) -> Cell {
    match serial {
        Some(n) => Cell::Int(n as i64),
        None => Cell::Blank,
    }
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct FacilitySummaryRow {
    #[serde(rename = "S.No.")]
    #[tabled(rename = "S.No.", display_with = "display_serial")]
    pub serial: Option<usize>,
    #[serde(rename = "District_Name")]
    #[tabled(rename = "District_Name")]
    pub district_name: String,
    #[serde(rename = "Facility_Name")]
    #[tabled(rename = "Facility_Name")]
    pub facility_name: String,
    #[serde(rename = "AAM_Type")]
    #[tabled(rename = "AAM_Type")]
    pub aam_type: String,
    #[serde(rename = "Footfall_Total")]
    #[tabled(rename = "Footfall_Total")]
    pub footfall_total: u64,
    #[serde(rename = "Footfall_Female")]
    #[tabled(rename = "Footfall_Female")]
    pub footfall_female: u64,
    #[serde(rename = "% Female Footfall")]
    #[tabled(rename = "% Female Footfall")]
    pub pct_female: f64,
}

impl FacilitySummaryRow {
    pub fn is_total(&self) -> bool {
        self.serial.is_none()
    }
}

impl TabularRow for FacilitySummaryRow {
    const HEADERS: &'static [&'static str] = &[
        "S.No.",
        "District_Name",
        "Facility_Name",
        "AAM_Type",
        "Footfall_Total",
        "Footfall_Female",
        "% Female Footfall",
    ];

    fn cells(&self) -> Vec<Cell> {
        vec![
            serial_cell(self.serial),
            Cell::Text(self.district_name.clone()),
            Cell::Text(self.facility_name.clone()),
            Cell::Text(self.aam_type.clone()),
            Cell::Int(self.footfall_total as i64),
            Cell::Int(self.footfall_female as i64),
            Cell::Float(self.pct_female),
        ]
    }
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct DistrictSummaryRow {
    #[serde(rename = "S.No.")]
    #[tabled(rename = "S.No.", display_with = "display_serial")]
    pub serial: Option<usize>,
    #[serde(rename = "District_Name")]
    #[tabled(rename = "District_Name")]
    pub district_name: String,
    #[serde(rename = "Registered_Facilities")]
    #[tabled(rename = "Registered_Facilities")]
    pub registered: u64,
    #[serde(rename = "Reported_Facilities")]
    #[tabled(rename = "Reported_Facilities")]
    pub reported: u64,
    #[serde(rename = "Unreported_Facilities")]
    #[tabled(rename = "Unreported_Facilities")]
    pub unreported: i64,
    #[serde(rename = "Total_Footfall")]
    #[tabled(rename = "Total_Footfall")]
    pub total_footfall: u64,
    #[serde(rename = "Avg_Footfall_Per_Facility")]
    #[tabled(rename = "Avg_Footfall_Per_Facility")]
    pub avg_footfall: f64,
    #[serde(rename = "%_Reported")]
    #[tabled(rename = "%_Reported")]
    pub pct_reported: f64,
}

impl DistrictSummaryRow {
    pub fn is_total(&self) -> bool {
        self.serial.is_none()
    }
}

impl TabularRow for DistrictSummaryRow {
    const HEADERS: &'static [&'static str] = &[
        "S.No.",
        "District_Name",
        "Registered_Facilities",
        "Reported_Facilities",
        "Unreported_Facilities",
        "Total_Footfall",
        "Avg_Footfall_Per_Facility",
        "%_Reported",
    ];

    fn cells(&self) -> Vec<Cell> {
        vec![
            serial_cell(self.serial),
            Cell::Text(self.district_name.clone()),
            Cell::Int(self.registered as i64),
            Cell::Int(self.reported as i64),
            Cell::Int(self.unreported),
            Cell::Int(self.total_footfall as i64),
            Cell::Float(self.avg_footfall),
            Cell::Float(self.pct_reported),
        ]
    }
}

/// Row counts per upper-cased AAM type, for the dashboard cards.
#[derive(Debug, Serialize, Clone, Default, PartialEq)]
pub struct DashboardMetrics {
    pub registered: BTreeMap<String, u64>,
    pub reported: BTreeMap<String, u64>,
}

impl DashboardMetrics {
    pub fn registered_for(&self, aam: AamType) -> u64 {
        self.registered.get(aam.as_str()).copied().unwrap_or(0)
    }

    pub fn reported_for(&self, aam: AamType) -> u64 {
        self.reported.get(aam.as_str()).copied().unwrap_or(0)
    }

    /// The four dashboard cards in display order.
    pub fn rows(&self) -> Vec<MetricRow> {
        let mut rows = Vec::with_capacity(4);
        for aam in AamType::ALL {
            rows.push(MetricRow {
                metric: format!("Total Facilities ({aam})"),
                value: self.registered_for(aam),
            });
        }
        for aam in AamType::ALL {
            rows.push(MetricRow {
                metric: format!("Reported Facilities ({aam})"),
                value: self.reported_for(aam),
            });
        }
        rows
    }
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct MetricRow {
    #[serde(rename = "Metric")]
    #[tabled(rename = "Metric")]
    pub metric: String,
    #[serde(rename = "Value")]
    #[tabled(rename = "Value")]
    pub value: u64,
}

impl TabularRow for MetricRow {
    const HEADERS: &'static [&'static str] = &["Metric", "Value"];

    fn cells(&self) -> Vec<Cell> {
        vec![Cell::Text(self.metric.clone()), Cell::Int(self.value as i64)]
    }
}
