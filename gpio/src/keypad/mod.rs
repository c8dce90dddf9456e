mod gpio;

use std::fmt::Debug;
use crate::GpioResult;
pub use gpio::*;

/// The `MatrixLines` trait gives row-by-row access to a scanned key matrix.
///
/// A row is driven with [assert_row](MatrixLines::assert_row) and every key closed in
/// that row then reads as `true` on its column.
pub trait MatrixLines: Debug {
    /// Number of row lines.
    fn rows(&self) -> usize;
    /// Number of column lines.
    fn columns(&self) -> usize;

    /// Reads the raw level of a column line.
    fn read_column(&self, column: usize) -> GpioResult<bool>;
    /// Drives a row line active.
    fn assert_row(&self, row: usize) -> GpioResult<()>;
    /// Drives a row line inactive.
    fn deassert_row(&self, row: usize) -> GpioResult<()>;

    /// Drives every row line inactive.
    fn release_all(&self) -> GpioResult<()> {
        for row in 0..self.rows() {
            self.deassert_row(row)?;
        }
        Ok(())
    }
}
