//! Simulated devices for exercising the console without hardware.

use core::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use kestrel_hal::{Serial, TextScreen};
use spin::{Mutex, MutexGuard};

use crate::platform::{Platform, WaitChannel};
use crate::render::{BLANK, CELLS};

/// Bytes retained by [`SimSerial`].
pub const SERIAL_CAPACITY: usize = 4096;

/// In-memory text screen with cursor registers.
pub struct SimScreen {
    cells: [u16; CELLS],
    cursor: usize,
    cursor_writes: usize,
}

impl SimScreen {
    /// Blank screen with the cursor at the origin.
    pub const fn new() -> Self {
        Self {
            cells: [BLANK; CELLS],
            cursor: 0,
            cursor_writes: 0,
        }
    }

    /// Current cursor register value.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Sets the cursor register as hardware would, without counting a write.
    pub fn set_cursor(&mut self, pos: usize) {
        self.cursor = pos;
    }

    /// Number of cursor register writes so far.
    pub fn cursor_writes(&self) -> usize {
        self.cursor_writes
    }

    /// Raw cell value.
    pub fn cell(&self, index: usize) -> u16 {
        self.cells[index]
    }

    /// Character byte of a cell.
    pub fn char_at(&self, index: usize) -> u8 {
        (self.cells[index] & 0xff) as u8
    }

    /// `N` consecutive characters starting at `start`.
    pub fn text<const N: usize>(&self, start: usize) -> [u8; N] {
        let mut out = [0u8; N];
        for (i, slot) in out.iter_mut().enumerate() {
            *slot = self.char_at(start + i);
        }
        out
    }
}

impl Default for SimScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl TextScreen for SimScreen {
    fn read_cursor(&mut self) -> usize {
        self.cursor
    }

    fn write_cursor(&mut self, pos: usize) {
        self.cursor = pos;
        self.cursor_writes += 1;
    }

    fn read_cell(&self, index: usize) -> u16 {
        self.cells.get(index).copied().unwrap_or(BLANK)
    }

    fn write_cell(&mut self, index: usize, cell: u16) {
        if let Some(slot) = self.cells.get_mut(index) {
            *slot = cell;
        }
    }
}

/// Serial port that records everything written to it.
pub struct SimSerial {
    out: [u8; SERIAL_CAPACITY],
    len: usize,
}

impl SimSerial {
    /// Empty recorder.
    pub const fn new() -> Self {
        Self {
            out: [0; SERIAL_CAPACITY],
            len: 0,
        }
    }

    /// Bytes written so far, up to [`SERIAL_CAPACITY`].
    pub fn output(&self) -> &[u8] {
        &self.out[..self.len]
    }
}

impl Default for SimSerial {
    fn default() -> Self {
        Self::new()
    }
}

impl Serial for SimSerial {
    fn write_byte(&mut self, byte: u8) {
        if self.len < SERIAL_CAPACITY {
            self.out[self.len] = byte;
            self.len += 1;
        }
    }

    fn read_byte(&mut self) -> Option<u8> {
        None
    }
}

/// Single-threaded platform that counts calls instead of blocking.
///
/// `sleep` returns at once, so a reader with nothing to consume spins until
/// it is killed.
#[derive(Default)]
pub struct ScriptedPlatform {
    killed: AtomicBool,
    sleeps: AtomicUsize,
    wakeups: AtomicUsize,
    dumps: AtomicUsize,
    halts: AtomicUsize,
}

impl ScriptedPlatform {
    /// Fresh platform with all counters at zero.
    pub const fn new() -> Self {
        Self {
            killed: AtomicBool::new(false),
            sleeps: AtomicUsize::new(0),
            wakeups: AtomicUsize::new(0),
            dumps: AtomicUsize::new(0),
            halts: AtomicUsize::new(0),
        }
    }

    /// Marks the calling process for termination.
    pub fn kill(&self) {
        self.killed.store(true, Ordering::SeqCst);
    }

    /// Number of `sleep` calls.
    pub fn sleeps(&self) -> usize {
        self.sleeps.load(Ordering::SeqCst)
    }

    /// Number of `wakeup` calls.
    pub fn wakeups(&self) -> usize {
        self.wakeups.load(Ordering::SeqCst)
    }

    /// Number of `proc_dump` calls.
    pub fn dumps(&self) -> usize {
        self.dumps.load(Ordering::SeqCst)
    }

    /// Number of `halt` calls.
    pub fn halts(&self) -> usize {
        self.halts.load(Ordering::SeqCst)
    }
}

impl Platform for ScriptedPlatform {
    fn sleep<'a, T>(
        &self,
        _chan: WaitChannel,
        guard: MutexGuard<'a, T>,
        _lock: &'a Mutex<T>,
    ) -> MutexGuard<'a, T> {
        self.sleeps.fetch_add(1, Ordering::SeqCst);
        guard
    }

    fn wakeup(&self, _chan: WaitChannel) {
        self.wakeups.fetch_add(1, Ordering::SeqCst);
    }

    fn killed(&self) -> bool {
        self.killed.load(Ordering::SeqCst)
    }

    fn proc_dump(&self) {
        self.dumps.fetch_add(1, Ordering::SeqCst);
    }

    fn cpu_id(&self) -> u32 {
        0
    }

    fn caller_pcs(&self, pcs: &mut [usize]) {
        for (i, pc) in pcs.iter_mut().enumerate() {
            *pc = if i < 2 { 0x1000 + i * 0x10 } else { 0 };
        }
    }

    fn halt(&self) {
        self.halts.fetch_add(1, Ordering::SeqCst);
    }
}
