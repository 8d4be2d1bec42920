//! # Table Module
//! The row/cell matrix at the heart of `sps`: the primitive mutations and
//! queries every command funnels through, and the rectangularity invariant
//! they all restore before returning.
//!
//! All public operations take 1-based row/column coordinates, matching the
//! user-visible coordinate system; the vectors underneath are 0-based, as
//! usual in Rust.
use crate::error::SpsError;

/// A single table cell: an arbitrary-length, possibly empty byte string.
pub type Cell = Vec<u8>;

/// An ordered sequence of cells. Rows own their cells exclusively.
pub type Row = Vec<Cell>;

/// The table: an ordered sequence of rows, which in turn own their cells.
///
/// `Vec::push`/`Vec::insert` already grow their backing allocation by
/// doubling, so that growth policy is inherited from `Vec` rather than
/// hand-rolled. Rust's global allocator
/// aborts the process on allocation failure instead of returning an error,
/// so [`SpsError::AllocationFailed`] is not actually reachable from these
/// methods; they still return `Result` so a future pluggable allocator (or
/// a bound on table size) could surface it without changing callers.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Table {
    rows: Vec<Row>,
}

impl Table {
    /// Creates an empty table: zero rows, zero columns.
    pub fn new() -> Self {
        Self { rows: Vec::new() }
    }

    /// Builds a table directly from already-decoded rows (used by the
    /// codec). Callers are responsible for calling
    /// [`Table::align_row_sizes`] afterwards if the rows are not already
    /// rectangular.
    pub fn from_rows(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    /// Number of rows currently in the table.
    pub fn rows(&self) -> usize {
        self.rows.len()
    }

    /// Width of the table: the cell count of its first row, or 0 if the
    /// table has no rows. Rectangularity guarantees every row shares this
    /// width.
    pub fn cols(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    /// Read-only view of row `r` (1-based), for callers that need to walk
    /// a whole row (the encoder).
    pub fn row(&self, r: usize) -> Option<&Row> {
        self.rows.get(r.checked_sub(1)?)
    }

    /// Returns a read-only view of the cell at `(r, c)` (1-based), or
    /// `None` if that coordinate lies outside the current dimensions.
    pub fn get_cell(&self, r: usize, c: usize) -> Option<&[u8]> {
        self.rows.get(r.checked_sub(1)?)?.get(c.checked_sub(1)?).map(Vec::as_slice)
    }

    /// Replaces the content of cell `(r, c)` (1-based) with a copy of
    /// `bytes`. `(r, c)` must already be within the table's dimensions;
    /// upholding that is the dispatcher's responsibility, not this
    /// method's.
    pub fn set_cell(&mut self, r: usize, c: usize, bytes: &[u8]) {
        self.rows[r - 1][c - 1] = bytes.to_vec();
    }

    /// Inserts an empty row before 1-based `pos` (`pos` may equal
    /// `rows() + 1` to append). Pads the new row to the table's current
    /// width via [`Table::align_row_sizes`].
    pub fn insert_row(&mut self, pos: usize) -> Result<(), SpsError> {
        self.rows.insert(pos - 1, Vec::new());
        self.align_row_sizes();
        Ok(())
    }

    /// Appends one empty cell at 1-based position `pos` of every row.
    pub fn insert_column(&mut self, pos: usize) -> Result<(), SpsError> {
        for row in &mut self.rows {
            row.insert(pos - 1, Vec::new());
        }
        Ok(())
    }

    /// Removes row `pos` (1-based) from the table.
    pub fn delete_row(&mut self, pos: usize) {
        self.rows.remove(pos - 1);
    }

    /// Removes column `pos` (1-based) from every row of the table.
    pub fn delete_column(&mut self, pos: usize) {
        for row in &mut self.rows {
            row.remove(pos - 1);
        }
    }

    /// Pads every row shorter than the widest row with empty cells, so all
    /// rows end up the same length. Idempotent.
    pub fn align_row_sizes(&mut self) {
        let widest = self.rows.iter().map(Vec::len).max().unwrap_or(0);
        for row in &mut self.rows {
            row.resize(widest, Cell::new());
        }
    }

    /// Deletes every column to the right of the last column that holds
    /// non-empty content in any row. A fully empty table becomes zero-wide
    /// but keeps its rows. Idempotent.
    pub fn trim_rows(&mut self) {
        let mut last_non_empty = 0;
        for row in &self.rows {
            for (j, cell) in row.iter().enumerate() {
                if !cell.is_empty() {
                    last_non_empty = last_non_empty.max(j + 1);
                }
            }
        }
        for row in &mut self.rows {
            row.truncate(last_non_empty);
        }
    }

    /// Grow-only resize: appends empty rows until `rows() >= rows`, and
    /// empty cells to the first row (then re-aligns) until
    /// `cols() >= cols`. Never shrinks the table.
    pub fn resize(&mut self, rows: usize, cols: usize) -> Result<(), SpsError> {
        if let Some(first) = self.rows.first_mut() {
            while first.len() < cols {
                first.push(Cell::new());
            }
        } else if cols > 0 {
            self.rows.push(vec![Cell::new(); cols]);
        }
        while self.rows.len() < rows {
            self.rows.push(Row::new());
        }
        self.align_row_sizes();
        Ok(())
    }
}
