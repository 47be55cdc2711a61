use crate::headcon::tools::error::{Result, ToolError};
use crate::headcon::tools::io::{SheetGrid, SheetSource};

/// Workbook held entirely in memory, for callers that already have rows of
/// text (and for exercising the extractors without a file on disk).
#[derive(Debug, Clone, Default)]
pub struct MemoryWorkbook {
    sheets: Vec<SheetGrid>,
}

impl MemoryWorkbook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the sheet called `name`.
    pub fn with_sheet(mut self, name: impl Into<String>, rows: Vec<Vec<String>>) -> Self {
        let grid = SheetGrid::new(name, rows);
        self.sheets.retain(|existing| existing.name() != grid.name());
        self.sheets.push(grid);
        self
    }

    /// Sets a single cell, growing the sheet as needed. Creates the sheet when
    /// it does not exist yet.
    pub fn set_cell(&mut self, sheet: &str, reference: (&str, u32), value: impl Into<String>) {
        let (column, row) = reference;
        let (Some(column_idx), Some(row_idx)) = (
            super::column_index(column),
            (row as usize).checked_sub(1),
        ) else {
            return;
        };

        let position = self.sheets.iter().position(|s| s.name() == sheet);
        let mut rows: Vec<Vec<String>> = match position {
            Some(index) => self.sheets[index].rows().map(<[String]>::to_vec).collect(),
            None => Vec::new(),
        };
        if rows.len() <= row_idx {
            rows.resize(row_idx + 1, Vec::new());
        }
        let cells = &mut rows[row_idx];
        if cells.len() <= column_idx {
            cells.resize(column_idx + 1, String::new());
        }
        cells[column_idx] = value.into();

        let grid = SheetGrid::new(sheet, rows);
        match position {
            Some(index) => self.sheets[index] = grid,
            None => self.sheets.push(grid),
        }
    }
}

impl SheetSource for MemoryWorkbook {
    fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|s| s.name().to_string()).collect()
    }

    fn sheet(&mut self, name: &str) -> Result<SheetGrid> {
        self.sheets
            .iter()
            .find(|s| s.name() == name)
            .cloned()
            .ok_or_else(|| ToolError::MissingSheet(name.to_string()))
    }
}
