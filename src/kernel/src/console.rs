//! The kernel's console instance and print macros.

use core::fmt;

use kestrel_console::Console;
use spin::Mutex;
use x86_64::instructions::interrupts;

use crate::arch::x86_64::{Com1, VgaScreen};
use crate::keymap::KeyDecoder;
use crate::platform::KernelPlatform;

/// The kernel console type.
pub type KernelConsole = Console<KernelPlatform, Com1, VgaScreen>;

/// The console, created once for the lifetime of the kernel.
pub static CONSOLE: KernelConsole =
    Console::new(KernelPlatform::new(), Com1, VgaScreen::new());

/// Keyboard decoder state shared with the keyboard interrupt.
pub static KEYBOARD: Mutex<KeyDecoder> = Mutex::new(KeyDecoder::new());

/// Blanks the screen and homes the cursor.
pub fn clear_screen() {
    interrupts::without_interrupts(|| CONSOLE.with_sink(|sink| sink.screen_mut().clear()));
}

/// Prints to the console without a newline.
#[macro_export]
macro_rules! print {
    ($($arg:tt)*) => {
        $crate::console::_print(format_args!($($arg)*))
    };
}

/// Prints to the console with a newline.
#[macro_export]
macro_rules! println {
    () => ($crate::print!("\n"));
    ($($arg:tt)*) => ($crate::print!("{}\n", format_args!($($arg)*)))
}

/// Internal print function used by macros.
#[doc(hidden)]
pub fn _print(args: fmt::Arguments) {
    // The keyboard interrupt takes the console lock too.
    interrupts::without_interrupts(|| CONSOLE.print(args));
}
