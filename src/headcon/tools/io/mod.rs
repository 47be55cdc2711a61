//! Workbook access. Extractors only see [`SheetSource`] and the text grids it
//! hands out, so they can run against a file on disk or rows held in memory.

pub mod excel_read;
pub mod memory;

use crate::headcon::tools::error::{Result, ToolError};

pub use excel_read::Workbook;
pub use memory::MemoryWorkbook;

/// Capability the extractors need from an opened workbook.
pub trait SheetSource {
    /// Sheet names in workbook order.
    fn sheet_names(&self) -> Vec<String>;

    /// Loads a sheet as a text grid. Fails with [`ToolError::MissingSheet`]
    /// when the workbook has no sheet called `name`.
    fn sheet(&mut self, name: &str) -> Result<SheetGrid>;
}

/// A sheet materialised as text, anchored at cell `A1`.
///
/// Rows keep their position in the sheet; trailing empty cells are dropped from
/// every row so the row width reflects the last populated column.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SheetGrid {
    name: String,
    rows: Vec<Vec<String>>,
}

impl SheetGrid {
    pub fn new(name: impl Into<String>, rows: Vec<Vec<String>>) -> Self {
        let rows = rows
            .into_iter()
            .map(|mut row| {
                while row.last().is_some_and(|cell| cell.is_empty()) {
                    row.pop();
                }
                row
            })
            .collect();
        Self {
            name: name.into(),
            rows,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Value at zero-based `(row, column)`; cells outside the grid read as empty.
    pub fn value(&self, row: usize, column: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|cells| cells.get(column))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Value at a spreadsheet position such as column `"H"`, row `5`.
    pub fn cell(&self, column: &str, row: u32) -> Result<&str> {
        let column_idx = column_index(column)
            .ok_or_else(|| ToolError::InvalidCellReference(format!("{column}{row}")))?;
        let row_idx = (row as usize)
            .checked_sub(1)
            .ok_or_else(|| ToolError::InvalidCellReference(format!("{column}{row}")))?;
        Ok(self.value(row_idx, column_idx))
    }

    /// Value at an `A1`-style reference.
    pub fn cell_ref(&self, reference: &str) -> Result<&str> {
        let split = reference
            .find(|c: char| c.is_ascii_digit())
            .ok_or_else(|| ToolError::InvalidCellReference(reference.to_string()))?;
        let (column, row) = reference.split_at(split);
        let row: u32 = row
            .parse()
            .map_err(|_| ToolError::InvalidCellReference(reference.to_string()))?;
        self.cell(column, row)
    }

    /// All rows from the top of the sheet, in order.
    pub fn rows(&self) -> impl Iterator<Item = &[String]> + '_ {
        self.rows.iter().map(Vec::as_slice)
    }
}

/// Converts column letters (`A`, `H`, `AA`) into a zero-based index.
pub fn column_index(letters: &str) -> Option<usize> {
    if letters.is_empty() {
        return None;
    }
    letters.chars().try_fold(0usize, |acc, c| {
        if !c.is_ascii_alphabetic() {
            return None;
        }
        let digit = (c.to_ascii_uppercase() as u8 - b'A') as usize + 1;
        acc.checked_mul(26)?.checked_add(digit)
    })
    .map(|one_based| one_based - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(rows: &[&[&str]]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|row| row.iter().map(|cell| cell.to_string()).collect())
            .collect()
    }

    #[test]
    fn column_letters_map_to_indices() {
        assert_eq!(column_index("A"), Some(0));
        assert_eq!(column_index("d"), Some(3));
        assert_eq!(column_index("H"), Some(7));
        assert_eq!(column_index("L"), Some(11));
        assert_eq!(column_index("AA"), Some(26));
        assert_eq!(column_index(""), None);
        assert_eq!(column_index("A1"), None);
    }

    #[test]
    fn grid_trims_trailing_empty_cells() {
        let grid = SheetGrid::new("s", text(&[&["1", "", "x", "", ""], &["", ""]]));
        let widths: Vec<usize> = grid.rows().map(<[String]>::len).collect();
        assert_eq!(widths, vec![3, 0]);
    }

    #[test]
    fn cells_outside_the_grid_read_as_empty() {
        let grid = SheetGrid::new("s", text(&[&["a", "b"], &["c"]]));
        assert_eq!(grid.cell("B", 1).unwrap(), "b");
        assert_eq!(grid.cell("A", 2).unwrap(), "c");
        assert_eq!(grid.cell("Z", 40).unwrap(), "");
        assert_eq!(grid.cell_ref("A2").unwrap(), "c");
        assert!(grid.cell("A", 0).is_err());
        assert!(grid.cell_ref("12").is_err());
    }
}
