use crate::error::Result;
use crate::export::{Cell, TabularRow};
use crate::types::{DistrictSummaryRow, FacilitySummaryRow, MetricRow};
use rust_xlsxwriter::{Format, FormatAlign, Workbook, Worksheet};

pub const FACILITY_SHEET: &str = "Facility-wise Summary";
pub const DISTRICT_SHEET: &str = "District-wise Summary";
pub const DASHBOARD_SHEET: &str = "Dashboard Summary";

fn header_format() -> Format {
    Format::new().set_bold().set_align(FormatAlign::Center)
}

fn write_sheet<T: TabularRow>(ws: &mut Worksheet, rows: &[T], autofit: bool) -> Result<()> {
    let hfmt = header_format();
    for (c, h) in T::HEADERS.iter().enumerate() {
        ws.write_string_with_format(0, c as u16, *h, &hfmt)?;
    }

    let mut widths: Vec<usize> = T::HEADERS.iter().map(|h| h.chars().count()).collect();
    for (i, row) in rows.iter().enumerate() {
        let r = (i + 1) as u32;
        for (c, cell) in row.cells().into_iter().enumerate() {
            let col = c as u16;
            if let Some(w) = widths.get_mut(c) {
                *w = (*w).max(cell.to_string().chars().count());
            }
            match cell {
                Cell::Text(s) if s.is_empty() => {}
                Cell::Text(s) => {
                    ws.write_string(r, col, s)?;
                }
                Cell::Int(n) => {
                    ws.write_number(r, col, n as f64)?;
                }
                Cell::Float(v) => {
                    ws.write_number(r, col, v)?;
                }
                Cell::Blank => {}
            }
        }
    }

    if autofit {
        for (c, w) in widths.into_iter().enumerate() {
            ws.set_column_width(c as u16, (w + 2) as f64)?;
        }
    }
    Ok(())
}

/// One summary table as a single-sheet workbook.
pub fn to_xlsx<T: TabularRow>(rows: &[T], sheet_name: &str) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let ws = workbook.add_worksheet();
    ws.set_name(sheet_name)?;
    write_sheet(ws, rows, false)?;
    Ok(workbook.save_to_buffer()?)
}

/// Both summaries plus the dashboard cards, one sheet each, with columns
/// sized to their content.
pub fn to_combined_xlsx(
    facility: &[FacilitySummaryRow],
    district: &[DistrictSummaryRow],
    metrics: &[MetricRow],
) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    {
        let ws = workbook.add_worksheet();
        ws.set_name(FACILITY_SHEET)?;
        write_sheet(ws, facility, true)?;
    }
    {
        let ws = workbook.add_worksheet();
        ws.set_name(DISTRICT_SHEET)?;
        write_sheet(ws, district, true)?;
    }
    {
        let ws = workbook.add_worksheet();
        ws.set_name(DASHBOARD_SHEET)?;
        write_sheet(ws, metrics, true)?;
    }
    Ok(workbook.save_to_buffer()?)
}
