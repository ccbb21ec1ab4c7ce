//! Boot progress messages.
//!
//! Each stage prints a bracketed status before its message, on the console
//! and, through the console's mirror, on the serial port.

pub mod banner;

use crate::{print, println};

/// Boot status indicators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// `[ OK ]`
    Ok,
    /// `[FAIL]`
    Fail,
    /// `[INFO]`
    Info,
}

impl Status {
    /// The bracketed tag printed before the message.
    pub const fn tag(self) -> &'static str {
        match self {
            Status::Ok => "[ OK ]",
            Status::Fail => "[FAIL]",
            Status::Info => "[INFO]",
        }
    }
}

/// Logs a boot stage with its status.
///
/// Format: `[ OK ] Message text`
pub fn log(status: Status, message: &str) {
    print!("{}", status.tag());
    println!(" {}", message);
    log::debug!("boot: {} {}", status.tag(), message);
}

/// Logs an indented detail line under the previous stage.
pub fn log_detail(message: &str) {
    println!("       {}", message);
}
