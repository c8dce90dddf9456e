use std::fmt::{Debug, Formatter};
use log::warn;
use crate::{GpioError, GpioInput, GpioOutput, GpioResult};
use crate::keypad::MatrixLines;

/// The `GpioMatrix` struct represents a GPIO-wired key matrix with `ROWS` driven rows
/// and `COLS` sensed columns.
///
/// All rows are released when the matrix is dropped.
pub struct GpioMatrix<'a, const ROWS: usize, const COLS: usize> {
    rows: [&'a dyn GpioOutput; ROWS],
    cols: [&'a dyn GpioInput; COLS],
}

impl<const ROWS: usize, const COLS: usize> Debug for GpioMatrix<'_, ROWS, COLS> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "GpioMatrix<{}x{}>({:?}, {:?})", ROWS, COLS, self.rows, self.cols)
    }
}

impl<'a, const ROWS: usize, const COLS: usize> GpioMatrix<'a, ROWS, COLS> {
    /// Creates a new `GpioMatrix` from row outputs and column inputs.
    ///
    /// The columns should be biased so that they read `false` while no key in the
    /// asserted row is closed.
    pub fn new(rows: [&'a dyn GpioOutput; ROWS], cols: [&'a dyn GpioInput; COLS]) -> Self {
        GpioMatrix { rows, cols }
    }
}

impl<const ROWS: usize, const COLS: usize> MatrixLines for GpioMatrix<'_, ROWS, COLS> {
    fn rows(&self) -> usize {
        ROWS
    }

    fn columns(&self) -> usize {
        COLS
    }

    fn read_column(&self, column: usize) -> GpioResult<bool> {
        self.cols
            .get(column)
            .ok_or(GpioError::InvalidArgument)?
            .read()
    }

    fn assert_row(&self, row: usize) -> GpioResult<()> {
        self.rows
            .get(row)
            .ok_or(GpioError::InvalidArgument)?
            .write(true)
    }

    fn deassert_row(&self, row: usize) -> GpioResult<()> {
        self.rows
            .get(row)
            .ok_or(GpioError::InvalidArgument)?
            .write(false)
    }
}

impl<const ROWS: usize, const COLS: usize> Drop for GpioMatrix<'_, ROWS, COLS> {
    fn drop(&mut self) {
        if let Err(e) = self.release_all() {
            warn!("Failed to release matrix rows: {}", e);
        }
    }
}
