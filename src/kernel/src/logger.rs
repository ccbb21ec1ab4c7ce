//! Kernel logger for the `log` facade.
//!
//! Records go straight to a raw output function (the serial port on
//! hardware), never through the console lock.

use core::fmt::{self, Write};

use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};

/// Writes log lines through a formatting function.
pub struct KernelLogger {
    write: fn(fmt::Arguments),
}

impl KernelLogger {
    /// Creates a logger that emits through `write`.
    pub const fn new(write: fn(fmt::Arguments)) -> Self {
        Self { write }
    }
}

impl Log for KernelLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let _ = format_line(&mut Emit(self.write), record);
        }
    }

    fn flush(&self) {}
}

/// Forwards formatted pieces to the output function.
struct Emit(fn(fmt::Arguments));

impl Write for Emit {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        (self.0)(format_args!("{}", s));
        Ok(())
    }
}

/// Level used unless the `verbose` feature is enabled.
pub const fn default_level() -> LevelFilter {
    if cfg!(feature = "verbose") {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

/// Installs `logger` as the global logger.
pub fn init(logger: &'static KernelLogger, level: LevelFilter) -> Result<(), SetLoggerError> {
    log::set_logger(logger)?;
    log::set_max_level(level);
    Ok(())
}

/// Formats one record the way [`KernelLogger`] emits it.
pub fn format_line(out: &mut impl Write, record: &Record) -> fmt::Result {
    write!(
        out,
        "[{:<5} {}] {}\n",
        record.level(),
        record.target(),
        record.args()
    )
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use log::Level;
    use std::string::String;

    #[test]
    fn test_format_line() {
        let mut out = String::new();
        format_line(
            &mut out,
            &Record::builder()
                .level(Level::Warn)
                .target("kestrel_console::editor")
                .args(format_args!("input buffer full"))
                .build(),
        )
        .unwrap();
        assert_eq!(out, "[WARN  kestrel_console::editor] input buffer full\n");
    }

    #[test]
    fn test_default_level() {
        assert!(default_level() >= LevelFilter::Info);
    }
}
