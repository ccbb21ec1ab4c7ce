//! x86_64 architecture support.
//!
//! Provides the VGA text screen, the COM1 serial port, the 8259 PICs and the
//! interrupt descriptor table.

pub mod interrupts;
pub mod pic;
pub mod serial;
pub mod vga;

pub use serial::{Com1, SERIAL};
pub use vga::VgaScreen;

/// Halts the CPU until the next interrupt.
///
/// Used in idle loops to reduce power consumption.
#[inline]
pub fn hlt() {
    x86_64::instructions::hlt();
}

/// Disables interrupts and halts the CPU forever.
///
/// Used after unrecoverable errors (panics).
pub fn halt_loop() -> ! {
    x86_64::instructions::interrupts::disable();
    loop {
        hlt();
    }
}

/// Local APIC ID of the executing CPU.
pub fn cpu_id() -> u32 {
    // SAFETY: CPUID leaf 1 is available on every x86_64 processor.
    let leaf = unsafe { core::arch::x86_64::__cpuid(1) };
    leaf.ebx >> 24
}

/// Fills `pcs` with return addresses by walking the frame-pointer chain.
///
/// Slots past the outermost frame are zeroed.
pub fn caller_pcs(pcs: &mut [usize]) {
    let mut rbp: usize;
    // SAFETY: reading rbp has no side effects.
    unsafe { core::arch::asm!("mov {}, rbp", out(reg) rbp, options(nomem, nostack)) };

    for pc in pcs.iter_mut() {
        if rbp == 0 || rbp % core::mem::align_of::<usize>() != 0 {
            *pc = 0;
            continue;
        }
        // SAFETY: the kernel is built with frame pointers, so rbp points at
        // the saved caller rbp followed by the return address. The chain
        // ends with a null rbp set up by the bootloader's entry.
        unsafe {
            let frame = rbp as *const usize;
            *pc = *frame.add(1);
            rbp = *frame;
        }
    }
}
