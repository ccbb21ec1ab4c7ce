//! Kestrel Hardware Abstraction Layer (HAL) traits.
//!
//! This crate defines traits that abstract away platform-specific hardware details.

#![no_std]

/// Trait for a serial port or similar character-based communication channel.
pub trait Serial {
    /// Writes a single byte to the serial port.
    fn write_byte(&mut self, byte: u8);
    /// Reads a single byte from the serial port, if available.
    fn read_byte(&mut self) -> Option<u8>;
}

/// Trait for a memory-mapped text frame buffer with a hardware cursor.
///
/// Cells are addressed by a linear, row-major offset. Each cell holds the
/// character in the low byte and the display attribute in the high byte.
pub trait TextScreen {
    /// Reads the cursor offset from the cursor location registers.
    fn read_cursor(&mut self) -> usize;
    /// Writes the cursor offset to the cursor location registers.
    fn write_cursor(&mut self, pos: usize);
    /// Reads the cell at `index`.
    fn read_cell(&self, index: usize) -> u16;
    /// Writes the cell at `index`.
    fn write_cell(&mut self, index: usize, cell: u16);
}

/// Trait for controlling interrupts.
pub trait InterruptController {
    /// Globally enables interrupts.
    fn enable(&mut self);
    /// Globally disables interrupts.
    fn disable(&mut self);
    /// Signals the end of an interrupt to the controller.
    fn end_of_interrupt(&mut self, irq: u8);
}
