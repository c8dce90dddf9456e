//! Test doubles for the matrix lines, the clock and the emitter.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet, VecDeque};
use std::io;
use std::time::Duration;
use m100kbd_gpio::{GpioError, GpioResult};
use m100kbd_gpio::keypad::MatrixLines;
use crate::clock::Clock;
use crate::config::{COLUMNS, ROWS};
use crate::emitter::Emitter;
use crate::keymap::KeyCode;
use crate::layer::Action;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum LineEvent {
    Assert(usize),
    Deassert(usize),
    Read(usize),
}

/// In-memory key matrix.
///
/// Reads of a scripted line consume its script first and then fall back to whether
/// the key is held.
#[derive(Debug, Default)]
pub struct FakeMatrix {
    held: RefCell<HashSet<(usize, usize)>>,
    scripts: RefCell<HashMap<(usize, usize), VecDeque<bool>>>,
    asserted: Cell<Option<usize>>,
    log: RefCell<Vec<LineEvent>>,
}

impl FakeMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&self, row: usize, column: usize) {
        self.held.borrow_mut().insert((row, column));
    }

    pub fn release(&self, row: usize, column: usize) {
        self.held.borrow_mut().remove(&(row, column));
    }

    pub fn script(&self, row: usize, column: usize, reads: impl IntoIterator<Item = bool>) {
        self.scripts
            .borrow_mut()
            .entry((row, column))
            .or_default()
            .extend(reads);
    }

    pub fn asserted(&self) -> Option<usize> {
        self.asserted.get()
    }

    pub fn log(&self) -> Vec<LineEvent> {
        self.log.borrow().clone()
    }
}

impl MatrixLines for FakeMatrix {
    fn rows(&self) -> usize {
        ROWS
    }

    fn columns(&self) -> usize {
        COLUMNS
    }

    fn read_column(&self, column: usize) -> GpioResult<bool> {
        if column >= COLUMNS {
            return Err(GpioError::InvalidArgument);
        }
        self.log.borrow_mut().push(LineEvent::Read(column));

        let Some(row) = self.asserted.get() else {
            return Ok(false);
        };
        if let Some(value) = self
            .scripts
            .borrow_mut()
            .get_mut(&(row, column))
            .and_then(|reads| reads.pop_front())
        {
            return Ok(value);
        }
        Ok(self.held.borrow().contains(&(row, column)))
    }

    fn assert_row(&self, row: usize) -> GpioResult<()> {
        if row >= ROWS {
            return Err(GpioError::InvalidArgument);
        }
        if let Some(other) = self.asserted.get() {
            panic!("row {} asserted while row {} is still asserted", row, other);
        }
        self.asserted.set(Some(row));
        self.log.borrow_mut().push(LineEvent::Assert(row));
        Ok(())
    }

    fn deassert_row(&self, row: usize) -> GpioResult<()> {
        if row >= ROWS {
            return Err(GpioError::InvalidArgument);
        }
        if self.asserted.get() == Some(row) {
            self.asserted.set(None);
        }
        self.log.borrow_mut().push(LineEvent::Deassert(row));
        Ok(())
    }
}

/// Virtual time that only moves when something sleeps.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<Duration>,
    sleeps: RefCell<Vec<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, duration: Duration) {
        self.now.set(self.now.get() + duration);
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.borrow().clone()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }

    fn sleep(&self, duration: Duration) {
        self.sleeps.borrow_mut().push(duration);
        self.advance(duration);
    }
}

/// Records every emitted event as the [Action] it came from.
#[derive(Debug, Default)]
pub struct RecordingEmitter {
    pub actions: Vec<Action>,
    pub fail: bool,
}

impl RecordingEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&mut self, action: Action) -> io::Result<()> {
        if self.fail {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "device gone"));
        }
        self.actions.push(action);
        Ok(())
    }
}

impl Emitter for RecordingEmitter {
    fn click(&mut self, key: KeyCode) -> io::Result<()> {
        self.record(Action::Click(key))
    }

    fn combo(&mut self, modifier: KeyCode, key: KeyCode) -> io::Result<()> {
        self.record(Action::Combo { modifier, key })
    }

    fn raw_event(&mut self, type_code: u16, scan_code: u16) -> io::Result<()> {
        self.record(Action::Raw { type_code, scan_code })
    }
}
