//! QEMU exit support for the boot self-test.
//!
//! QEMU must be started with `-device isa-debug-exit,iobase=0xf4,iosize=0x04`.
//! The process exit code is `(value << 1) | 1`:
//! - `Success` (0x10) → exit code 33
//! - `Failed` (0x11) → exit code 35

use x86_64::instructions::port::Port;

/// QEMU exit codes for signaling test results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum QemuExitCode {
    /// All checks passed.
    Success = 0x10,
    /// One or more checks failed.
    Failed = 0x11,
}

/// Exits QEMU with the given exit code.
pub fn exit_qemu(exit_code: QemuExitCode) {
    // SAFETY: port 0xf4 is the isa-debug-exit device; writing it ends the
    // QEMU process. On real hardware the port is unassigned.
    unsafe {
        let mut port = Port::new(0xf4);
        port.write(exit_code as u32);
    }
}
