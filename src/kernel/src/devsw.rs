//! Device switch: routes file reads and writes to character devices.

use kestrel_common::CharDevice;

use crate::console::CONSOLE;

/// Major number of the console.
pub const CONSOLE_MAJOR: usize = 1;

/// Number of device slots.
const NDEV: usize = 10;

/// Device table indexed by major number.
static DEVSW: [Option<&'static dyn CharDevice>; NDEV] = {
    let mut table: [Option<&'static dyn CharDevice>; NDEV] = [None; NDEV];
    table[CONSOLE_MAJOR] = Some(&CONSOLE);
    table
};

/// Looks up the device registered under `major`.
pub fn device(major: usize) -> Option<&'static dyn CharDevice> {
    DEVSW.get(major).copied().flatten()
}
