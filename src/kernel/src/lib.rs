//! Kestrel Kernel
//!
//! A small x86_64 teaching kernel built around a line-disciplined console.
//!
//! # Architecture
//!
//! The kernel is structured into the following modules:
//! - `arch`: Platform-specific code (VGA, serial, PIC, interrupts)
//! - `console`: the global console and the `print!` macros
//! - `platform`: sleep, wake-up and CPU hooks for the console
//! - `devsw`: character device table
//! - `shell`: the boot shell
//! - `keymap`: scancode to console byte translation
//! - `logger`: the `log` backend
//!
//! Only `keymap` and `logger` are built for the host, so their unit tests
//! run under `cargo test`.
//!
//! # Safety
//!
//! This is a `#![no_std]` kernel. All unsafe code is documented with safety
//! invariants explaining why the usage is correct.

#![no_std]
#![cfg_attr(target_os = "none", feature(abi_x86_interrupt))]
#![warn(missing_docs)]

pub mod keymap;
pub mod logger;

#[cfg(all(target_arch = "x86_64", target_os = "none"))]
pub mod arch;
#[cfg(all(target_arch = "x86_64", target_os = "none"))]
pub mod boot;
#[cfg(all(target_arch = "x86_64", target_os = "none"))]
pub mod console;
#[cfg(all(target_arch = "x86_64", target_os = "none"))]
pub mod devsw;
#[cfg(all(target_arch = "x86_64", target_os = "none"))]
pub mod platform;
#[cfg(all(target_arch = "x86_64", target_os = "none", feature = "selftest"))]
pub mod selftest;
#[cfg(all(target_arch = "x86_64", target_os = "none"))]
pub mod shell;
#[cfg(all(target_arch = "x86_64", target_os = "none"))]
pub mod testutil;

#[cfg(all(target_arch = "x86_64", target_os = "none"))]
static LOGGER: logger::KernelLogger = logger::KernelLogger::new(arch::x86_64::serial::_print);

/// Initializes core kernel subsystems.
///
/// Called early in the boot process, before interrupts are enabled.
#[cfg(all(target_arch = "x86_64", target_os = "none"))]
pub fn init() {
    arch::x86_64::serial::init();
    if logger::init(&LOGGER, logger::default_level()).is_err() {
        serial_println!("logger already installed");
    }
    console::clear_screen();
    arch::x86_64::interrupts::init_idt();
    log::info!("kernel: console ready");
}
