use crate::{
    error::Result,
    storage::models::{CellMarker, CellValue, Record, Table},
};

/// Host-side table adapter. Engines never touch this directly: the
/// dispatcher reads tables up front, runs the pure engines, then applies the
/// resulting writes back through the store one by one. There is no batching
/// and no rollback; a failure mid-batch leaves the earlier writes in place.
#[cfg_attr(test, mockall::automock)]
pub trait TableStore {
    /// Full snapshot of a table, header row included. Missing tables are a
    /// structural error.
    fn get_all_rows(&self, table: &str) -> Result<Table>;

    /// Overwrite one cell. `row` is absolute (header is row 0).
    fn set_cell(&self, table: &str, row: usize, col: usize, value: CellValue) -> Result<()>;

    /// Append a record after the current last row.
    fn append_row(&self, table: &str, record: Record) -> Result<()>;

    /// Cosmetic highlight on a cell. Optional for hosts; failures here are
    /// never fatal to an action.
    fn set_cell_marker(&self, table: &str, row: usize, col: usize, marker: CellMarker) -> Result<()>;

    /// Delete every data row, keeping the header.
    fn clear_data_rows(&self, table: &str) -> Result<()>;
}
