mod clock;
mod config;
mod debounce;
mod emitter;
mod guard;
mod keymap;
mod layer;
mod scanner;
mod uinput;
#[cfg(test)]
mod testing;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use clap::Parser;
use dotenv::dotenv;
use log::{debug, info, LevelFilter};
use sysinfo::System;
use m100kbd_gpio::{GpioBias, GpioDriver, GpioInput, GpioOutput, GpioPin};
use m100kbd_gpio::gpiod::GpiodDriver;
use m100kbd_gpio::keypad::GpioMatrix;
use crate::clock::MonotonicClock;
use crate::config::{Args, Config, Timing, COLUMNS, COLUMN_PINS, DEVICE_NAME, ROWS, ROW_PINS};
use crate::scanner::Scanner;
use crate::uinput::UinputEmitter;

fn init_logger(debug: bool) {
    let mut builder = pretty_env_logger::formatted_builder();
    builder.filter_level(if debug { LevelFilter::Debug } else { LevelFilter::Info });
    if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }
    builder.init();
}

fn log_system() {
    const UNKNOWN_STR: &str = "???";

    info!(
        "Running on {} {} (kernel {}), host {}, arch {}",
        System::name().as_deref().unwrap_or(UNKNOWN_STR),
        System::os_version().as_deref().unwrap_or(UNKNOWN_STR),
        System::kernel_version().as_deref().unwrap_or(UNKNOWN_STR),
        System::host_name().as_deref().unwrap_or(UNKNOWN_STR),
        System::cpu_arch(),
    );
}

fn main() -> eyre::Result<()> {
    // A missing .env file is fine, everything has a default
    dotenv().ok();
    let args = Args::parse();
    init_logger(args.debug);

    info!("TRS-80 Model 100 keyboard driver v{} starting...", env!("CARGO_PKG_VERSION"));
    log_system();

    let config = Config::from_env();
    info!("GPIO chip {}", config.gpio_chip.display());
    info!("Matrix @ Rows: {:?}, Cols: {:?}", ROW_PINS, COLUMN_PINS);

    let shutdown = Arc::new(AtomicBool::new(false));
    let flag = shutdown.clone();
    ctrlc::set_handler(move || {
        info!("Received termination signal, shutting down...");
        flag.store(true, Ordering::Relaxed);
    })?;

    debug!("Initializing GPIO driver...");
    let gpio = GpiodDriver::open(&config.gpio_chip)?;
    debug!("{:?} initialized.", gpio);

    debug!("Initializing keyboard matrix...");
    let mut row_pins = ROW_PINS
        .iter()
        .map(|&pin| gpio.get_pin(pin))
        .collect::<Result<Vec<_>, _>>()?;
    let mut col_pins = COLUMN_PINS
        .iter()
        .map(|&pin| gpio.get_pin(pin))
        .collect::<Result<Vec<_>, _>>()?;
    for pin in col_pins.iter_mut() {
        pin.set_bias(GpioBias::PullDown)?;
    }
    let row_outs = row_pins
        .iter_mut()
        .map(|pin| pin.as_output())
        .collect::<Result<Vec<Box<dyn GpioOutput + '_>>, _>>()?;
    let col_ins = col_pins
        .iter_mut()
        .map(|pin| pin.as_input())
        .collect::<Result<Vec<Box<dyn GpioInput + '_>>, _>>()?;

    let matrix: GpioMatrix<'_, ROWS, COLUMNS> = GpioMatrix::new(
        std::array::from_fn(|i| &*row_outs[i]),
        std::array::from_fn(|i| &*col_ins[i]),
    );
    debug!("{:?} initialized.", matrix);

    let mut emitter = UinputEmitter::new(DEVICE_NAME)?;
    debug!("{:?} initialized.", emitter);

    let clock = MonotonicClock::new();
    let mut scanner = Scanner::new(&matrix, &mut emitter, &clock, Timing::default());

    info!("Keyboard driver initialized.");
    scanner.run(&shutdown)?;
    debug!("Latches at shutdown: {:?}", scanner.state().modifiers);

    info!("Shutdown complete.");
    Ok(())
}
