use tracing::{debug, trace};

use crate::headcon::tools::error::Result;
use crate::headcon::tools::extract::classify::{classify_head_type, classify_surface};
use crate::headcon::tools::extract::date::{DateLayout, correct_rollover};
use crate::headcon::tools::io::{SheetGrid, SheetSource};
use crate::headcon::tools::model::{CanonicalRecord, ReportingPeriod, Shift, Source, format_date};

/// Rows narrower than this are headers, blanks or footers.
pub const MIN_ROW_WIDTH: usize = 15;
pub const DATE_FIELD: usize = 0;
pub const SURFACE_FIELD: usize = 9;
pub const HEAD_FIELD: usize = 10;
pub const QUANTITY_FIELD: usize = 14;
pub const SHIFT_FIELD: usize = 18;

/// Extracts records from one sheet of the database export.
///
/// Only a missing sheet is an error. Rows that are too short, do not start
/// with a date, or carry a date the layout cannot parse are skipped.
/// Date-typed cells arrive as `DD/MM/YYYY` text, so they need a day-first
/// layout.
pub fn extract_database<S>(
    source: &mut S,
    sheet: &str,
    period: &ReportingPeriod,
    layout: &DateLayout,
) -> Result<Vec<CanonicalRecord>>
where
    S: SheetSource + ?Sized,
{
    let grid = source.sheet(sheet)?;
    let records = extract_database_sheet(&grid, period, layout);
    debug!(sheet, records = records.len(), "decoded database sheet");
    Ok(records)
}

/// Decodes every row of an already loaded export sheet.
pub fn extract_database_sheet(
    grid: &SheetGrid,
    period: &ReportingPeriod,
    layout: &DateLayout,
) -> Vec<CanonicalRecord> {
    grid.rows()
        .enumerate()
        .filter_map(|(index, row)| {
            let record = decode_row(row, period, layout);
            if record.is_none() {
                trace!(row = index + 1, "skipped database row");
            }
            record
        })
        .collect()
}

/// Decodes a single export row, or `None` when the row carries no entry.
pub fn decode_row(
    row: &[String],
    period: &ReportingPeriod,
    layout: &DateLayout,
) -> Option<CanonicalRecord> {
    if row.len() < MIN_ROW_WIDTH {
        return None;
    }
    let field = |index: usize| row.get(index).map(String::as_str).unwrap_or("");

    let date_text = field(DATE_FIELD);
    if !date_text.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        return None;
    }
    let date = layout.parse_date(date_text)?;
    let date = correct_rollover(date, period);

    let shift = match field(SHIFT_FIELD).trim().to_lowercase().as_str() {
        "d" => Shift::Day,
        "n" => Shift::Night,
        _ => Shift::Unknown,
    };

    let mut category = classify_head_type(field(HEAD_FIELD));
    if category.head_surface.is_empty() {
        category.head_surface = classify_surface(field(SURFACE_FIELD))
            .unwrap_or_default()
            .to_string();
    }

    let quantity = field(QUANTITY_FIELD).trim().parse().unwrap_or(0);

    Some(CanonicalRecord {
        date: format_date(date),
        shift,
        head_type: category.head_type,
        head_surface: category.head_surface,
        quantity,
        source: Source::Database,
    })
}
