//! The scan loop: row by row, find the closed key, then translate, filter, resolve and emit it.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use log::{debug, info};
use thiserror::Error;
use m100kbd_gpio::{GpioError, GpioResult};
use m100kbd_gpio::keypad::MatrixLines;
use crate::clock::Clock;
use crate::config::{MODIFIER_COLUMN, ROWS, Timing};
use crate::debounce::{Sample, Sampler};
use crate::emitter::Emitter;
use crate::guard::{admit, LastEmission};
use crate::keymap::{translate, KeyCode, MatrixPosition};
use crate::layer::{resolve, Action, Latch, ModifierState};

/// Faults of the line or emitter collaborators. The scanner has none of its own.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("GPIO error: {0}")]
    Gpio(#[from] GpioError),
    #[error("failed to emit key event: {0}")]
    Emit(#[from] io::Error),
}

pub type ScanResult<T> = Result<T, ScanError>;

/// A key that made it through repeat suppression and layer resolution.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Resolved {
    pub key: KeyCode,
    pub action: Action,
}

/// Everything the scan loop remembers between keys.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct ScanState {
    pub modifiers: ModifierState,
    pub last: Option<LastEmission>,
}

impl ScanState {
    /// Handles a confirmed key at `position`, seen at `now`.
    ///
    /// Returns `None` without touching any state when the key is a repeat that came
    /// too soon.
    pub fn step(
        self,
        position: MatrixPosition,
        now: Duration,
        repeat_threshold: Duration,
    ) -> (ScanState, Option<Resolved>) {
        let key = translate(position);
        debug!("{} key {} : {}", position, key.code(), key.name());

        if !admit(self.last, key, now, repeat_threshold) {
            return (self, None);
        }

        let (modifiers, action) = resolve(self.modifiers, position, key);
        (ScanState { modifiers, ..self }, Some(Resolved { key, action }))
    }

    /// Remembers `key` as emitted at `at`.
    pub fn emitted(self, key: KeyCode, at: Duration) -> ScanState {
        ScanState {
            last: Some(LastEmission { key, at }),
            ..self
        }
    }
}

/// Drives the matrix lines and feeds confirmed keys to the emitter.
pub struct Scanner<'a> {
    lines: &'a dyn MatrixLines,
    emitter: &'a mut dyn Emitter,
    clock: &'a dyn Clock,
    timing: Timing,
    state: ScanState,
}

impl<'a> Scanner<'a> {
    pub fn new(
        lines: &'a dyn MatrixLines,
        emitter: &'a mut dyn Emitter,
        clock: &'a dyn Clock,
        timing: Timing,
    ) -> Self {
        Scanner {
            lines,
            emitter,
            clock,
            timing,
            state: ScanState::default(),
        }
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    #[cfg(test)]
    pub fn with_state(mut self, state: ScanState) -> Self {
        self.state = state;
        self
    }

    /// Scans the matrix until `shutdown` is set, pausing between full cycles.
    ///
    /// The flag is checked once per cycle.
    pub fn run(&mut self, shutdown: &AtomicBool) -> ScanResult<()> {
        info!(
            "Starting keyboard scanner (debounce {:?}, cycle {:?}, key repeat {:?}, post-key {:?}).",
            self.timing.debounce, self.timing.cycle, self.timing.repeat_threshold, self.timing.post_emission,
        );

        while !shutdown.load(Ordering::Relaxed) {
            self.scan_cycle()?;
            self.clock.sleep(self.timing.cycle);
        }

        info!("Stopping keyboard scanner.");
        Ok(())
    }

    /// Scans every row once.
    pub fn scan_cycle(&mut self) -> ScanResult<()> {
        for row in 0..ROWS {
            self.scan_row(row)?;
        }
        Ok(())
    }

    /// Asserts `row`, handles at most one key in it and deasserts it again.
    ///
    /// The row is deasserted even when handling the key fails.
    pub fn scan_row(&mut self, row: usize) -> ScanResult<()> {
        self.lines.assert_row(row)?;
        let result = self.handle_row(row);
        let released = self.lines.deassert_row(row);
        result?;
        released?;
        Ok(())
    }

    fn handle_row(&mut self, row: usize) -> ScanResult<()> {
        let Some(position) = self.find_key(row)? else {
            return Ok(());
        };

        let (state, resolved) = self.state.step(position, self.clock.now(), self.timing.repeat_threshold);
        self.state = state;
        let Some(Resolved { key, action }) = resolved else {
            return Ok(());
        };

        self.emitter.perform(action)?;
        self.state = self.state.emitted(key, self.clock.now());
        self.clock.sleep(self.timing.post_emission);
        Ok(())
    }

    /// Samples the modifier column, then the data columns in order, and returns the
    /// first position that needs a key handled.
    fn find_key(&mut self, row: usize) -> GpioResult<Option<MatrixPosition>> {
        let sampler = Sampler::new(self.clock, self.timing.debounce);

        match sampler.sample(self.lines, MODIFIER_COLUMN)? {
            Sample::Closed => match Latch::for_row(row) {
                Some(latch) => {
                    if !self.state.modifiers.is_set(latch) {
                        debug!("{:?} latched from row {}.", latch, row);
                    }
                    self.state.modifiers.set(latch);
                }
                None => return Ok(Some(MatrixPosition::new(row, MODIFIER_COLUMN))),
            },
            Sample::Bounced => {
                if self.state.modifiers.any() {
                    debug!("Modifier column settled open on row {}, releasing latches.", row);
                }
                self.state.modifiers.release_all();
            }
            Sample::Open => {}
        }

        for column in 0..MODIFIER_COLUMN {
            if sampler.sample(self.lines, column)?.is_closed() {
                return Ok(Some(MatrixPosition::new(row, column)));
            }
        }

        Ok(None)
    }
}
