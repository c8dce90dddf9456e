//! Fixed wiring and timing of the keyboard, plus the few settings read at startup.

use std::env::var_os;
use std::path::PathBuf;
use std::time::Duration;
use clap::Parser;

/// Number of row lines driven by the scanner.
pub const ROWS: usize = 8;
/// Number of column lines, including the modifier column.
pub const COLUMNS: usize = 9;
/// The column wired to the modifier/layer keys.
pub const MODIFIER_COLUMN: usize = 8;

/// BCM line offsets of the row outputs, row 0 first.
pub const ROW_PINS: [usize; ROWS] = [6, 12, 13, 19, 16, 26, 20, 21];
/// BCM line offsets of the column inputs, column 0 first. The last one is the modifier column.
pub const COLUMN_PINS: [usize; COLUMNS] = [4, 17, 18, 27, 22, 23, 24, 25, 5];

/// Name the virtual keyboard registers with the input layer.
pub const DEVICE_NAME: &str = "TRS-80 M100 Keyboard";

const GPIO_CHIP_VAR: &str = "M100_GPIO_CHIP";
const DEFAULT_GPIO_CHIP: &str = "gpiochip0";

/// Delays used by the scan loop.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Timing {
    /// Settle time between the two reads of a line.
    pub debounce: Duration,
    /// Pause after a key was handled, giving the operator time to let go.
    pub post_emission: Duration,
    /// Pause between two full matrix scans.
    pub cycle: Duration,
    /// The same key seen again sooner than this is treated as bounce.
    pub repeat_threshold: Duration,
}

impl Timing {
    pub const DEFAULT: Timing = Timing {
        debounce: Duration::from_millis(10),
        post_emission: Duration::from_millis(50),
        cycle: Duration::from_millis(5),
        repeat_threshold: Duration::from_millis(100),
    };
}

impl Default for Timing {
    fn default() -> Self {
        Timing::DEFAULT
    }
}

/// Command line arguments.
#[derive(Parser, Debug)]
#[command(version, about = "TRS-80 Model 100 keyboard driver")]
pub struct Args {
    /// Enable debug logging
    #[arg(short, long)]
    pub debug: bool,
}

/// Settings taken from the environment (or a `.env` file).
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Config {
    /// The GPIO character device the matrix is wired to.
    pub gpio_chip: PathBuf,
}

impl Config {
    pub fn from_env() -> Self {
        let chip = var_os(GPIO_CHIP_VAR)
            .map(|s| s.to_string_lossy().into_owned())
            .filter(|s| !s.trim().is_empty());
        Config {
            gpio_chip: chip_path(chip.as_deref().unwrap_or(DEFAULT_GPIO_CHIP)),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            gpio_chip: chip_path(DEFAULT_GPIO_CHIP),
        }
    }
}

/// Bare chip names (`gpiochip4`) live under `/dev`.
fn chip_path(chip: &str) -> PathBuf {
    let chip = chip.trim();
    if chip.contains('/') {
        PathBuf::from(chip)
    } else {
        PathBuf::from("/dev").join(chip)
    }
}
