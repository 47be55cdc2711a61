use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use calamine::{DataType, Range, Reader, Sheets, open_workbook_auto};
use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use tracing::debug;

use crate::headcon::tools::error::{Result, ToolError};
use crate::headcon::tools::io::{SheetGrid, SheetSource};

/// An opened spreadsheet file (xlsx, xlsm, xlsb, xls or ods).
///
/// The handle owns the file; dropping it releases the file, so the entry
/// points in [`sync`](crate::sync) open one per call and let it fall out of
/// scope before returning.
pub struct Workbook {
    sheets: Sheets<BufReader<File>>,
}

impl Workbook {
    /// Opens the workbook at `path`, detecting the container format from the
    /// file extension.
    pub fn open(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ToolError::MissingInput(path.to_path_buf()));
        }
        let sheets = open_workbook_auto(path)?;
        Ok(Self { sheets })
    }
}

impl SheetSource for Workbook {
    fn sheet_names(&self) -> Vec<String> {
        self.sheets.sheet_names().to_vec()
    }

    fn sheet(&mut self, name: &str) -> Result<SheetGrid> {
        let range_result = self
            .sheets
            .worksheet_range(name)
            .ok_or_else(|| ToolError::MissingSheet(name.to_string()))?;
        let range = range_result.map_err(ToolError::from)?;
        let grid = range_to_grid(name, &range);
        debug!(sheet = name, rows = grid.rows().count(), "loaded sheet");
        Ok(grid)
    }
}

/// Re-anchors a calamine range at `A1` so row and column positions match the
/// spreadsheet's own coordinates.
fn range_to_grid(name: &str, range: &Range<DataType>) -> SheetGrid {
    let (start_row, start_col) = range.start().unwrap_or((0, 0));
    let mut rows: Vec<Vec<String>> = vec![Vec::new(); start_row as usize];

    for row in range.rows() {
        let mut cells = vec![String::new(); start_col as usize];
        cells.extend(row.iter().map(|cell| cell_to_string(Some(cell))));
        rows.push(cells);
    }

    SheetGrid::new(name, rows)
}

fn cell_to_string(cell: Option<&DataType>) -> String {
    match cell {
        Some(DataType::String(value)) => value.clone(),
        Some(DataType::Float(value)) => value.to_string(),
        Some(DataType::Int(value)) => value.to_string(),
        Some(DataType::Bool(value)) => value.to_string(),
        Some(DataType::DateTime(serial)) => {
            excel_serial_to_text(*serial).unwrap_or_else(|| serial.to_string())
        }
        Some(DataType::Empty) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

/// Renders an Excel date serial as `DD/MM/YYYY`, adding `HH:MM:SS` when the
/// serial carries a time of day.
fn excel_serial_to_text(serial: f64) -> Option<String> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    let epoch: NaiveDateTime = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let seconds = (serial * 86_400.0).round() as i64;
    let moment = epoch.checked_add_signed(TimeDelta::try_seconds(seconds)?)?;
    let text = if seconds % 86_400 == 0 {
        moment.format("%d/%m/%Y").to_string()
    } else {
        moment.format("%d/%m/%Y %H:%M:%S").to_string()
    };
    Some(text)
}
