//! Double-read confirmation of matrix lines.

use std::time::Duration;
use m100kbd_gpio::GpioResult;
use m100kbd_gpio::keypad::MatrixLines;
use crate::clock::Clock;

/// Outcome of sampling one line.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Sample {
    /// The first read was already inactive.
    Open,
    /// The first read was active but the settled read was not.
    Bounced,
    /// Both reads were active.
    Closed,
}

impl Sample {
    pub fn is_closed(self) -> bool {
        self == Sample::Closed
    }
}

/// Confirms a column level by reading it twice, `settle` apart.
///
/// An inactive first read returns immediately, so idle lines cost a single read.
pub struct Sampler<'a> {
    clock: &'a dyn Clock,
    settle: Duration,
}

impl<'a> Sampler<'a> {
    pub fn new(clock: &'a dyn Clock, settle: Duration) -> Self {
        Sampler { clock, settle }
    }

    pub fn sample(&self, lines: &dyn MatrixLines, column: usize) -> GpioResult<Sample> {
        if !lines.read_column(column)? {
            return Ok(Sample::Open);
        }

        self.clock.sleep(self.settle);

        if lines.read_column(column)? {
            Ok(Sample::Closed)
        } else {
            Ok(Sample::Bounced)
        }
    }
}
