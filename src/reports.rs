use crate::types::{
    AamType, DashboardMetrics, DistrictSummaryRow, FacilityRecord, FacilitySummaryRow,
    FootfallRecord,
};
use crate::util::{percent, round2};
use std::collections::BTreeMap;

const TOTAL_LABEL: &str = "Total";

// Rows without a facility name are kept but never counted.
fn named(facility_name: &str) -> u64 {
    u64::from(!facility_name.is_empty())
}

/// Female share of footfall, 0 when there is no footfall, capped at 100.
pub fn percent_female(female: u64, total: u64) -> f64 {
    percent(female, total).clamp(0.0, 100.0)
}

/// Facility-wise summary for one AAM type over already date-filtered rows.
///
/// Groups by (district, facility, type) in key order and appends a grand
/// total row.
pub fn facility_summary(footfall: &[FootfallRecord], aam: AamType) -> Vec<FacilitySummaryRow> {
    #[derive(Default)]
    struct Acc {
        total: u64,
        female: u64,
    }

    let mut map: BTreeMap<(String, String, String), Acc> = BTreeMap::new();
    for r in footfall
        .iter()
        .filter(|r| r.aam_type == aam.as_str() && !r.facility_name.is_empty())
    {
        let key = (
            r.district_name.clone(),
            r.facility_name.clone(),
            r.aam_type.clone(),
        );
        let e = map.entry(key).or_default();
        e.total += r.footfall_total;
        e.female += r.footfall_female;
    }

    let mut rows: Vec<FacilitySummaryRow> = map
        .into_iter()
        .enumerate()
        .map(|(idx, ((district, facility, aam_type), acc))| FacilitySummaryRow {
            serial: Some(idx + 1),
            district_name: district,
            facility_name: facility,
            aam_type,
            footfall_total: acc.total,
            footfall_female: acc.female,
            pct_female: percent_female(acc.female, acc.total),
        })
        .collect();

    let total: u64 = rows.iter().map(|r| r.footfall_total).sum();
    let female: u64 = rows.iter().map(|r| r.footfall_female).sum();
    rows.push(FacilitySummaryRow {
        serial: None,
        district_name: TOTAL_LABEL.to_string(),
        facility_name: String::new(),
        aam_type: String::new(),
        footfall_total: total,
        footfall_female: female,
        pct_female: percent_female(female, total),
    });
    rows
}

/// District-wise summary for one AAM type.
///
/// Registered counts come from the master list and reported counts from the
/// date-filtered footfall rows; both count rows, not distinct facilities.
/// Every master district appears even with no reports. Footfall districts
/// missing from the master are dropped.
pub fn district_summary(
    master: &[FacilityRecord],
    footfall: &[FootfallRecord],
    aam: AamType,
) -> Vec<DistrictSummaryRow> {
    let mut registered: BTreeMap<&str, u64> = BTreeMap::new();
    for r in master.iter().filter(|r| r.aam_type == aam.as_str()) {
        *registered.entry(r.district_name.as_str()).or_default() += named(&r.facility_name);
    }

    let mut reported: BTreeMap<&str, (u64, u64)> = BTreeMap::new();
    for r in footfall.iter().filter(|r| r.aam_type == aam.as_str()) {
        let e = reported.entry(r.district_name.as_str()).or_default();
        e.0 += named(&r.facility_name);
        e.1 += r.footfall_total;
    }

    let mut rows: Vec<DistrictSummaryRow> = registered
        .into_iter()
        .enumerate()
        .map(|(idx, (district, registered))| {
            let (reported, total_footfall) = reported.get(district).copied().unwrap_or((0, 0));
            DistrictSummaryRow {
                serial: Some(idx + 1),
                district_name: district.to_string(),
                registered,
                reported,
                unreported: registered as i64 - reported as i64,
                total_footfall,
                avg_footfall: round2(total_footfall as f64 / reported.max(1) as f64),
                pct_reported: percent(reported, registered),
            }
        })
        .collect();

    let registered: u64 = rows.iter().map(|r| r.registered).sum();
    let reported: u64 = rows.iter().map(|r| r.reported).sum();
    let unreported: i64 = rows.iter().map(|r| r.unreported).sum();
    let total_footfall: u64 = rows.iter().map(|r| r.total_footfall).sum();
    let avg_footfall = if reported == 0 {
        0.0
    } else {
        round2(total_footfall as f64 / reported as f64)
    };
    rows.push(DistrictSummaryRow {
        serial: None,
        district_name: TOTAL_LABEL.to_string(),
        registered,
        reported,
        unreported,
        total_footfall,
        avg_footfall,
        pct_reported: percent(reported, registered),
    });
    rows
}

/// Per-type row counts: registered over the whole master list, reported over
/// the date-filtered footfall rows of every type. Rows with a blank facility
/// name are not counted.
pub fn dashboard_metrics(
    master: &[FacilityRecord],
    footfall: &[FootfallRecord],
) -> DashboardMetrics {
    let mut metrics = DashboardMetrics::default();
    for r in master {
        *metrics.registered.entry(r.aam_type.clone()).or_default() += named(&r.facility_name);
    }
    for r in footfall {
        *metrics.reported.entry(r.aam_type.clone()).or_default() += named(&r.facility_name);
    }
    metrics
}
