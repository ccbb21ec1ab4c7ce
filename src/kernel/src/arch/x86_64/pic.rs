//! Support for the primary and secondary 8259 Programmable Interrupt Controllers (PICs).

use kestrel_hal::InterruptController;
use pic8259::ChainedPics;
use spin::Mutex;

/// The offset of the first PIC (master).
///
/// IRQs 0..7 are mapped to interrupts 32..39.
pub const PIC_1_OFFSET: u8 = 32;

/// The offset of the second PIC (slave).
///
/// IRQs 8..15 are mapped to interrupts 40..47.
pub const PIC_2_OFFSET: u8 = PIC_1_OFFSET + 8;

/// Master mask with IRQ0 (timer), IRQ1 (keyboard) and IRQ4 (COM1) enabled.
const PIC_1_MASK: u8 = !(1 << 0 | 1 << 1 | 1 << 4);

/// Every slave IRQ stays masked.
const PIC_2_MASK: u8 = 0xff;

/// The global instance of the chained PICs.
pub static PICS: Mutex<ChainedPics> =
    Mutex::new(unsafe { ChainedPics::new(PIC_1_OFFSET, PIC_2_OFFSET) });

/// Possible IRQ indices.
#[derive(Debug, Clone, Copy)]
#[repr(u8)]
pub enum InterruptIndex {
    /// Timer interrupt.
    Timer = PIC_1_OFFSET,
    /// Keyboard interrupt.
    Keyboard,
    /// COM1 received-data interrupt.
    Com1 = PIC_1_OFFSET + 4,
}

impl InterruptIndex {
    /// Returns the internal u8 value.
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Returns the internal usize value.
    pub fn as_usize(self) -> usize {
        usize::from(self as u8)
    }
}

/// Remaps the PICs and unmasks the console's interrupt lines.
pub fn init() {
    let mut pics = PICS.lock();
    // SAFETY: the offsets do not overlap CPU exceptions and the IDT has
    // handlers for every unmasked line.
    unsafe {
        pics.initialize();
        pics.write_masks(PIC_1_MASK, PIC_2_MASK);
    }
}

/// The chained PICs plus the CPU interrupt flag.
pub struct Pic;

impl InterruptController for Pic {
    fn enable(&mut self) {
        x86_64::instructions::interrupts::enable();
    }

    fn disable(&mut self) {
        x86_64::instructions::interrupts::disable();
    }

    fn end_of_interrupt(&mut self, irq: u8) {
        // SAFETY: only called at the end of the handler for `irq`.
        unsafe { PICS.lock().notify_end_of_interrupt(irq) }
    }
}
