//! VGA text mode screen for x86_64.
//!
//! Exposes the text buffer at 0xB8000 and the CRT controller's cursor
//! location registers through [`TextScreen`].

use core::ptr;

use kestrel_console::render::{BLANK, CELLS};
use kestrel_hal::TextScreen;
use x86_64::instructions::port::Port;

/// VGA text buffer memory-mapped I/O address.
const VGA_BUFFER_ADDR: usize = 0xB8000;

/// CRT controller index register.
const CRT_INDEX: u16 = 0x3D4;

/// CRT controller data register.
const CRT_DATA: u16 = 0x3D5;

/// Cursor location high byte register index.
const CURSOR_HIGH: u8 = 14;

/// Cursor location low byte register index.
const CURSOR_LOW: u8 = 15;

/// The VGA text buffer and its hardware cursor.
pub struct VgaScreen {
    /// Pointer to the first cell.
    ///
    /// SAFETY: This pointer is valid for the lifetime of the kernel.
    /// The VGA buffer at 0xB8000 is always mapped in x86 real/protected mode.
    cells: *mut u16,
    index: Port<u8>,
    data: Port<u8>,
}

// SAFETY: VgaScreen only accesses the VGA buffer through volatile operations.
// The buffer is memory-mapped hardware that exists for the kernel's lifetime.
// Access is synchronized through the console lock.
unsafe impl Send for VgaScreen {}

impl VgaScreen {
    /// Creates a handle to the VGA text screen.
    pub const fn new() -> Self {
        VgaScreen {
            cells: VGA_BUFFER_ADDR as *mut u16,
            index: Port::new(CRT_INDEX),
            data: Port::new(CRT_DATA),
        }
    }

    /// Blanks every cell and homes the cursor.
    pub fn clear(&mut self) {
        for index in 0..CELLS {
            self.write_cell(index, BLANK);
        }
        self.write_cursor(0);
    }

    fn read_register(&mut self, register: u8) -> u8 {
        // SAFETY: 0x3D4/0x3D5 are the CRT controller ports on every VGA
        // compatible adapter; selecting a register then reading it has no
        // other side effects.
        unsafe {
            self.index.write(register);
            self.data.read()
        }
    }

    fn write_register(&mut self, register: u8, value: u8) {
        // SAFETY: see `read_register`.
        unsafe {
            self.index.write(register);
            self.data.write(value);
        }
    }
}

impl Default for VgaScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl TextScreen for VgaScreen {
    fn read_cursor(&mut self) -> usize {
        let high = self.read_register(CURSOR_HIGH);
        let low = self.read_register(CURSOR_LOW);
        usize::from(high) << 8 | usize::from(low)
    }

    fn write_cursor(&mut self, pos: usize) {
        self.write_register(CURSOR_HIGH, (pos >> 8) as u8);
        self.write_register(CURSOR_LOW, pos as u8);
    }

    fn read_cell(&self, index: usize) -> u16 {
        if index >= CELLS {
            return BLANK;
        }
        // SAFETY: index < CELLS keeps the access inside the 80x25 buffer.
        // Using volatile because the VGA buffer is memory-mapped I/O.
        unsafe { ptr::read_volatile(self.cells.add(index)) }
    }

    fn write_cell(&mut self, index: usize, cell: u16) {
        if index >= CELLS {
            return;
        }
        // SAFETY: as in `read_cell`.
        unsafe { ptr::write_volatile(self.cells.add(index), cell) }
    }
}
