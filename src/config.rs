// Static lookup tables and the per-run report configuration.
//
// Header synonyms, required-column checklists, PDF column widths and
// artifact file names all live here so adding a new spelling or column is a
// one-line change.
use crate::types::AamType;
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use std::collections::HashMap;

pub const FACILITY_NAME: &str = "Facility_Name";
pub const AAM_TYPE: &str = "AAM_Type";
pub const DISTRICT_NAME: &str = "District_Name";
pub const ENTRY_DATE: &str = "Entry_Date";
pub const FOOTFALL_TOTAL: &str = "Footfall_Total";
pub const FOOTFALL_FEMALE: &str = "Footfall_Female";

/// Known header spellings for the daily footfall log, in folded form.
const FOOTFALL_VARIANTS: &[(&str, &str)] = &[
    ("facility name", FACILITY_NAME),
    ("aam type", AAM_TYPE),
    ("district", DISTRICT_NAME),
    ("district name", DISTRICT_NAME),
    ("entry date", ENTRY_DATE),
    ("footfall total", FOOTFALL_TOTAL),
    ("footfall female", FOOTFALL_FEMALE),
];

/// Known header spellings for the facility master list, in folded form.
const MASTER_VARIANTS: &[(&str, &str)] = &[
    ("facility name", FACILITY_NAME),
    ("hfi name", FACILITY_NAME),
    ("aam type", AAM_TYPE),
    ("facility type", AAM_TYPE),
    ("district", DISTRICT_NAME),
    ("district name", DISTRICT_NAME),
];

const FOOTFALL_REQUIRED: &[&str] = &[
    FACILITY_NAME,
    AAM_TYPE,
    DISTRICT_NAME,
    ENTRY_DATE,
    FOOTFALL_TOTAL,
    FOOTFALL_FEMALE,
];

const MASTER_REQUIRED: &[&str] = &[FACILITY_NAME, AAM_TYPE, DISTRICT_NAME];

static FOOTFALL_HEADER_MAP: Lazy<HashMap<String, &'static str>> =
    Lazy::new(|| build_header_map(FOOTFALL_VARIANTS));
static MASTER_HEADER_MAP: Lazy<HashMap<String, &'static str>> =
    Lazy::new(|| build_header_map(MASTER_VARIANTS));

fn build_header_map(variants: &[(&str, &'static str)]) -> HashMap<String, &'static str> {
    variants
        .iter()
        .map(|(variant, canonical)| (fold_header(variant), *canonical))
        .collect()
}

/// Fold a header into its lookup key: lower-case, with runs of spaces and
/// underscores collapsed into a single `_`.
pub fn fold_header(header: &str) -> String {
    let lowered = header.trim().to_lowercase();
    lowered
        .split(|c: char| c == ' ' || c == '_')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    Master,
    Footfall,
}

impl TableKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Master => "Master",
            Self::Footfall => "Footfall",
        }
    }

    pub fn required_columns(&self) -> &'static [&'static str] {
        match self {
            Self::Master => MASTER_REQUIRED,
            Self::Footfall => FOOTFALL_REQUIRED,
        }
    }

    /// Canonical name for a raw header, if it is a known variant.
    pub fn canonical_for(&self, header: &str) -> Option<&'static str> {
        let map = match self {
            Self::Master => &*MASTER_HEADER_MAP,
            Self::Footfall => &*FOOTFALL_HEADER_MAP,
        };
        map.get(&fold_header(header)).copied()
    }
}

const PDF_COLUMN_WIDTHS: &[(&str, f32)] = &[
    (FACILITY_NAME, 60.0),
    (DISTRICT_NAME, 35.0),
    (AAM_TYPE, 25.0),
];
const PDF_DEFAULT_WIDTH: f32 = 30.0;

/// PDF column width in millimetres for a header name.
pub fn pdf_column_width(column: &str) -> f32 {
    PDF_COLUMN_WIDTHS
        .iter()
        .find(|(name, _)| *name == column)
        .map(|(_, w)| *w)
        .unwrap_or(PDF_DEFAULT_WIDTH)
}

pub const FACILITY_XLSX: &str = "FacilityWiseReport.xlsx";
pub const FACILITY_PDF: &str = "FacilityWiseReport.pdf";
pub const FACILITY_CSV: &str = "FacilityWiseReport.csv";
pub const DISTRICT_XLSX: &str = "DistrictWiseReport.xlsx";
pub const DISTRICT_PDF: &str = "DistrictWiseReport.pdf";
pub const DISTRICT_CSV: &str = "DistrictWiseReport.csv";
pub const COMBINED_XLSX: &str = "Combined_Footfall_Report.xlsx";
pub const DASHBOARD_JSON: &str = "dashboard.json";

pub const FACILITY_TITLE: &str = "Facility-wise Summary Report";
pub const DISTRICT_TITLE: &str = "District-wise Summary Report";

/// Selections that belong to one report run: the AAM type and an optional
/// override of either end of the date range.
#[derive(Debug, Clone)]
pub struct ReportConfig {
    pub aam_type: AamType,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            aam_type: AamType::Ushc,
            from: None,
            to: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fold_collapses_spacing_and_case() {
        assert_eq!(fold_header("  Footfall Female "), "footfall_female");
        assert_eq!(fold_header("FACILITY__NAME"), "facility_name");
        assert_eq!(fold_header("aam type"), "aam_type");
    }

    #[test]
    fn every_listed_variant_resolves() {
        for (variant, canonical) in FOOTFALL_VARIANTS {
            assert_eq!(TableKind::Footfall.canonical_for(variant), Some(*canonical));
        }
        for (variant, canonical) in MASTER_VARIANTS {
            assert_eq!(TableKind::Master.canonical_for(variant), Some(*canonical));
        }
    }

    #[test]
    fn facility_type_only_maps_in_master() {
        assert_eq!(TableKind::Master.canonical_for("FACILITY_TYPE"), Some(AAM_TYPE));
        assert_eq!(TableKind::Footfall.canonical_for("FACILITY_TYPE"), None);
    }

    #[test]
    fn pdf_widths_fall_back_to_default() {
        assert_eq!(pdf_column_width(FACILITY_NAME), 60.0);
        assert_eq!(pdf_column_width("% Female Footfall"), 30.0);
    }
}
