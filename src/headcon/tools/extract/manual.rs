use tracing::{debug, trace};

use crate::headcon::tools::error::Result;
use crate::headcon::tools::extract::classify::MANUAL_ROWS;
use crate::headcon::tools::io::{SheetGrid, SheetSource};
use crate::headcon::tools::model::{CanonicalRecord, ReportingPeriod, Shift, Source};

/// Row holding the "usage" headers above the data block.
pub const USAGE_HEADER_ROW: u32 = 5;
/// Quantity columns and the shift each one records.
pub const SHIFT_COLUMNS: [(&str, Shift); 2] = [("H", Shift::Day), ("L", Shift::Night)];
/// Column read for the head surface when the row table leaves it open.
pub const SURFACE_COLUMN: &str = "D";

/// Extracts records from the manual log. Each sheet holds one day of the
/// period and is named after the day of the month.
///
/// A sheet missing from the workbook aborts the whole call; anything wrong
/// inside a sheet only drops the affected cells.
pub fn extract_manual<S, N>(
    source: &mut S,
    sheets: &[N],
    period: &ReportingPeriod,
) -> Result<Vec<CanonicalRecord>>
where
    S: SheetSource + ?Sized,
    N: AsRef<str>,
{
    let mut records = Vec::new();
    for name in sheets {
        let grid = source.sheet(name.as_ref())?;
        let extracted = extract_manual_sheet(&grid, period);
        debug!(sheet = grid.name(), records = extracted.len(), "decoded manual sheet");
        records.extend(extracted);
    }
    Ok(records)
}

/// Decodes a single day sheet of the manual log.
pub fn extract_manual_sheet(grid: &SheetGrid, period: &ReportingPeriod) -> Vec<CanonicalRecord> {
    let date = manual_date(grid.name(), period);
    let usage_columns: Vec<(&str, Shift)> = SHIFT_COLUMNS
        .iter()
        .copied()
        .filter(|(column, _)| {
            let header = grid.cell(column, USAGE_HEADER_ROW).unwrap_or_default();
            header.to_lowercase().contains("usage")
        })
        .collect();
    if usage_columns.is_empty() {
        trace!(sheet = grid.name(), "no usage header found");
        return Vec::new();
    }

    let mut records = Vec::new();
    for category in &MANUAL_ROWS {
        for &(column, shift) in &usage_columns {
            let cell = grid.cell(column, category.row).unwrap_or_default();
            let quantity = parse_quantity(cell);
            if quantity < 1 {
                continue;
            }

            let head_surface = if category.head_surface.is_empty() {
                grid.cell(SURFACE_COLUMN, category.row)
                    .unwrap_or_default()
                    .trim()
                    .to_string()
            } else {
                category.head_surface.to_string()
            };

            records.push(CanonicalRecord {
                date: date.clone(),
                shift,
                head_type: category.head_type.to_string(),
                head_surface,
                quantity,
                source: Source::Manual,
            });
        }
    }
    records
}

/// `DD-MM-YYYY` for a sheet named after its day of the month. Numeric names
/// are zero-padded; anything else is kept verbatim and will not land on the
/// aggregation axis.
fn manual_date(sheet_name: &str, period: &ReportingPeriod) -> String {
    let name = sheet_name.trim();
    let day = match name.parse::<u32>() {
        Ok(day) => format!("{day:02}"),
        Err(_) => name.to_string(),
    };
    format!("{day}-{:02}-{:04}", period.month(), period.year())
}

fn parse_quantity(cell: &str) -> u32 {
    cell.trim().parse().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headcon::tools::extract::classify::{AHEAD_TEK, FEMTO, PMR6_PIH};
    use crate::headcon::tools::io::MemoryWorkbook;

    fn april() -> ReportingPeriod {
        ReportingPeriod::new(4, 2024).unwrap()
    }

    fn day_sheet(workbook: &mut MemoryWorkbook, name: &str) {
        workbook.set_cell(name, ("H", 5), "Head Usage");
        workbook.set_cell(name, ("L", 5), "HEAD USAGE");
    }

    #[test]
    fn usage_cells_become_records() {
        let mut workbook = MemoryWorkbook::new();
        day_sheet(&mut workbook, "15");
        workbook.set_cell("15", ("H", 6), "4");
        workbook.set_cell("15", ("L", 6), "2");
        workbook.set_cell("15", ("D", 8), "Top");
        workbook.set_cell("15", ("H", 8), "5");

        let records = extract_manual(&mut workbook, &["15"], &april()).unwrap();
        assert_eq!(records.len(), 3);

        assert_eq!(records[0].head_type, AHEAD_TEK);
        assert_eq!(records[0].head_surface, "3122");
        assert_eq!(records[0].shift, Shift::Day);
        assert_eq!(records[0].quantity, 4);
        assert_eq!(records[0].date, "15-04-2024");
        assert_eq!(records[0].source, Source::Manual);

        assert_eq!(records[1].shift, Shift::Night);
        assert_eq!(records[1].quantity, 2);

        assert_eq!(records[2].head_type, FEMTO);
        assert_eq!(records[2].head_surface, "Top");
    }

    #[test]
    fn zero_and_invalid_quantities_are_dropped() {
        let mut workbook = MemoryWorkbook::new();
        day_sheet(&mut workbook, "3");
        workbook.set_cell("3", ("H", 10), "0");
        workbook.set_cell("3", ("L", 10), "n/a");
        workbook.set_cell("3", ("H", 11), "-2");
        workbook.set_cell("3", ("L", 17), "1");

        let records = extract_manual(&mut workbook, &["3"], &april()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].head_type, PMR6_PIH);
        assert_eq!(records[0].date, "03-04-2024");
    }

    #[test]
    fn columns_without_usage_header_are_skipped() {
        let mut workbook = MemoryWorkbook::new();
        workbook.set_cell("1", ("H", 5), "Usage");
        workbook.set_cell("1", ("L", 5), "Stock");
        workbook.set_cell("1", ("H", 9), "7");
        workbook.set_cell("1", ("L", 9), "8");

        let records = extract_manual(&mut workbook, &["1"], &april()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].shift, Shift::Day);
        assert_eq!(records[0].quantity, 7);
    }

    #[test]
    fn missing_sheet_is_fatal() {
        let mut workbook = MemoryWorkbook::new();
        day_sheet(&mut workbook, "1");
        workbook.set_cell("1", ("H", 6), "3");

        let result = extract_manual(&mut workbook, &["1", "2"], &april());
        assert!(result.is_err());
    }
}
