//! Serial port driver for x86_64.
//!
//! Provides serial output via COM1 (0x3F8) for the console mirror and the
//! kernel log, and serial input for the console.

use core::fmt::{self, Write};
use spin::Mutex;
use uart_16550::SerialPort;
use x86_64::instructions::interrupts;

/// COM1 I/O port address.
const COM1_PORT: u16 = 0x3F8;

/// Global serial port instance, lazily initialized.
///
/// Uses a spinlock for safe concurrent access from multiple contexts,
/// including interrupt handlers.
pub static SERIAL: spin::Once<Mutex<SerialPort>> = spin::Once::new();

/// Initializes the global serial port.
///
/// This function is idempotent - calling it multiple times has no effect
/// after the first successful initialization.
pub fn init() {
    port();
}

/// Returns the serial port, initializing it on first use.
fn port() -> &'static Mutex<SerialPort> {
    SERIAL.call_once(|| {
        // SAFETY: COM1_PORT (0x3F8) is a well-known x86 serial port address.
        // We're running in kernel mode with full I/O port access.
        // The uart_16550 crate handles the port initialization sequence correctly,
        // including enabling the received-data interrupt.
        let mut serial = unsafe { SerialPort::new(COM1_PORT) };
        serial.init();
        Mutex::new(serial)
    })
}

/// Prints to the serial port without a newline.
#[macro_export]
macro_rules! serial_print {
    ($($arg:tt)*) => {
        $crate::arch::x86_64::serial::_print(format_args!($($arg)*))
    };
}

/// Prints to the serial port with a newline.
#[macro_export]
macro_rules! serial_println {
    () => ($crate::serial_print!("\n"));
    ($($arg:tt)*) => ($crate::serial_print!("{}\n", format_args!($($arg)*)))
}

/// Internal print function used by macros and the logger.
#[doc(hidden)]
pub fn _print(args: fmt::Arguments) {
    // The console echoes to this port from the keyboard interrupt.
    interrupts::without_interrupts(|| {
        let _ = port().lock().write_fmt(args);
    });
}

/// COM1 as the console's serial mirror and second input source.
pub struct Com1;

impl kestrel_hal::Serial for Com1 {
    fn write_byte(&mut self, byte: u8) {
        // Raw: the console already expands erase into backspace-space-backspace.
        port().lock().send_raw(byte);
    }

    fn read_byte(&mut self) -> Option<u8> {
        port().lock().try_receive().ok()
    }
}
