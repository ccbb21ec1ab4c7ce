//! Output sink: mirrors characters to the serial port and the text screen.

use kestrel_common::FatalError;
use kestrel_hal::{Serial, TextScreen};

use crate::render::{self, cell, Glyph, BLANK, CELLS, COLUMNS, SCROLL_ROW};

/// Renders glyphs to a serial mirror and a cursor-addressed text screen.
///
/// The cursor offset is never cached: every operation reads it from the
/// screen's registers and writes the result back.
pub struct OutputSink<S, T> {
    serial: S,
    screen: T,
}

impl<S: Serial, T: TextScreen> OutputSink<S, T> {
    /// Creates a sink over the given devices.
    pub const fn new(serial: S, screen: T) -> Self {
        Self { serial, screen }
    }

    /// Returns the serial backend.
    pub fn serial(&self) -> &S {
        &self.serial
    }

    /// Returns the screen backend.
    pub fn screen(&self) -> &T {
        &self.screen
    }

    /// Returns the screen backend mutably.
    pub fn screen_mut(&mut self) -> &mut T {
        &mut self.screen
    }

    /// Renders one glyph, serial first.
    ///
    /// `advance` controls whether the cursor moves past a drawn byte.
    pub fn put_char(&mut self, glyph: Glyph, advance: bool) -> Result<(), FatalError> {
        self.put_serial(glyph);
        self.put_screen(glyph, advance)
    }

    /// Writes a glyph to the serial mirror only.
    pub fn put_serial(&mut self, glyph: Glyph) {
        match glyph {
            Glyph::Erase => {
                self.serial.write_byte(b'\x08');
                self.serial.write_byte(b' ');
                self.serial.write_byte(b'\x08');
            }
            Glyph::Byte(byte) | Glyph::Marker(byte) => self.serial.write_byte(byte),
        }
    }

    /// Flashes `marker` at the marker column of the cursor's row.
    ///
    /// The cursor does not move and the cell under the marker is restored,
    /// so text already on the row is left intact.
    pub fn flash_marker(&mut self, marker: u8) -> Result<(), FatalError> {
        self.put_serial(Glyph::Marker(marker));
        self.put_serial(Glyph::Erase);

        let pos = self.screen.read_cursor();
        let plan = render::plan(pos, Glyph::Marker(marker), false)?;
        if let Some((index, value)) = plan.draw {
            let saved = self.screen.read_cell(index);
            self.screen.write_cell(index, value);
            self.screen.write_cell(index, saved);
        }
        Ok(())
    }

    fn put_screen(&mut self, glyph: Glyph, advance: bool) -> Result<(), FatalError> {
        let pos = self.screen.read_cursor();
        let plan = render::plan(pos, glyph, advance)?;

        if let Some((index, value)) = plan.draw {
            self.screen.write_cell(index, value);
        }
        if plan.scroll {
            for index in 0..(SCROLL_ROW - 1) * COLUMNS {
                let moved = self.screen.read_cell(index + COLUMNS);
                self.screen.write_cell(index, moved);
            }
            for index in plan.pos..SCROLL_ROW * COLUMNS {
                self.screen.write_cell(index, BLANK);
            }
        }

        self.screen.write_cursor(plan.pos);
        self.screen.write_cell(plan.pos, BLANK);
        Ok(())
    }

    /// Inserts `byte` at the cursor, shifting the next `trailing + 1` cells
    /// right by one, and advances the cursor.
    pub fn insert_in_place(&mut self, byte: u8, trailing: usize) {
        let pos = self.screen.read_cursor();
        for index in (pos..=pos + trailing).rev() {
            let shifted = self.cell_at(index);
            self.set_cell(index + 1, shifted);
        }
        self.set_cell(pos, cell(byte));

        let pos = pos + 1;
        self.screen.write_cursor(pos);
        self.set_cell(pos + trailing, BLANK);
    }

    /// Deletes the cell before the cursor, shifting the following
    /// `trailing + 1` cells left by one, and moves the cursor back.
    pub fn erase_in_place(&mut self, trailing: usize) {
        let pos = self.screen.read_cursor();
        if pos == 0 {
            return;
        }
        for index in pos - 1..=pos + trailing {
            let shifted = self.cell_at(index + 1);
            self.set_cell(index, shifted);
        }

        let pos = pos - 1;
        self.screen.write_cursor(pos);
        self.set_cell(pos + trailing, BLANK);
    }

    /// Moves the cursor by `delta` cells without drawing.
    pub fn move_cursor(&mut self, delta: isize) {
        let pos = self.screen.read_cursor();
        self.screen.write_cursor(render::moved(pos, delta));
    }

    fn cell_at(&self, index: usize) -> u16 {
        if index < CELLS {
            self.screen.read_cell(index)
        } else {
            BLANK
        }
    }

    fn set_cell(&mut self, index: usize, value: u16) {
        if index < CELLS {
            self.screen.write_cell(index, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{SimScreen, SimSerial};

    fn sink() -> OutputSink<SimSerial, SimScreen> {
        OutputSink::new(SimSerial::new(), SimScreen::new())
    }

    #[test]
    fn test_put_char_mirrors_to_serial_and_screen() {
        let mut sink = sink();
        sink.put_char(Glyph::Byte(b'h'), true).unwrap();
        sink.put_char(Glyph::Byte(b'i'), true).unwrap();

        assert_eq!(sink.serial().output(), b"hi");
        assert_eq!(sink.screen().char_at(0), b'h');
        assert_eq!(sink.screen().char_at(1), b'i');
        assert_eq!(sink.screen().cursor(), 2);
    }

    #[test]
    fn test_erase_translates_on_serial() {
        let mut sink = sink();
        sink.put_char(Glyph::Byte(b'x'), true).unwrap();
        sink.put_char(Glyph::Erase, true).unwrap();

        assert_eq!(sink.serial().output(), b"x\x08 \x08");
        assert_eq!(sink.screen().cursor(), 0);
        assert_eq!(sink.screen().cell(0), BLANK);
    }

    #[test]
    fn test_scroll_shifts_rows_up() {
        let mut sink = sink();
        sink.screen_mut().write_cell(COLUMNS, cell(b'r'));
        sink.screen_mut().set_cursor(SCROLL_ROW * COLUMNS - 1);
        sink.put_char(Glyph::Byte(b'z'), true).unwrap();

        assert_eq!(sink.screen().char_at(0), b'r');
        assert_eq!(sink.screen().char_at((SCROLL_ROW - 2) * COLUMNS + COLUMNS - 1), b'z');
        assert_eq!(sink.screen().cursor(), (SCROLL_ROW - 1) * COLUMNS);
        assert_eq!(sink.screen().cell((SCROLL_ROW - 1) * COLUMNS), BLANK);
    }

    #[test]
    fn test_flash_marker_keeps_cursor_and_text() {
        let mut sink = sink();
        for &b in b"hello world" {
            sink.put_char(Glyph::Byte(b), true).unwrap();
        }
        let writes = sink.screen().cursor_writes();

        sink.flash_marker(b'{').unwrap();

        assert_eq!(&sink.screen().text::<11>(0), b"hello world");
        assert_eq!(sink.screen().cursor(), 11);
        assert_eq!(sink.screen().cursor_writes(), writes);
        assert_eq!(sink.serial().output(), b"hello world{\x08 \x08");
    }

    #[test]
    fn test_out_of_bounds_cursor_is_fatal() {
        let mut sink = sink();
        sink.screen_mut().set_cursor(CELLS + 5);
        assert!(matches!(
            sink.put_char(Glyph::Byte(b'a'), true),
            Err(FatalError::CursorOutOfBounds { .. })
        ));
    }

    #[test]
    fn test_insert_in_place_shifts_tail_right() {
        let mut sink = sink();
        for &b in b"ac" {
            sink.put_char(Glyph::Byte(b), true).unwrap();
        }
        sink.move_cursor(-1);
        sink.insert_in_place(b'b', 1);

        assert_eq!(&sink.screen().text::<3>(0), b"abc");
        assert_eq!(sink.screen().cursor(), 2);
    }

    #[test]
    fn test_erase_in_place_shifts_tail_left() {
        let mut sink = sink();
        for &b in b"axbc" {
            sink.put_char(Glyph::Byte(b), true).unwrap();
        }
        sink.move_cursor(-2);
        sink.erase_in_place(2);

        assert_eq!(&sink.screen().text::<4>(0), b"abc ");
        assert_eq!(sink.screen().cursor(), 1);
    }

    #[test]
    fn test_erase_in_place_at_origin_is_noop() {
        let mut sink = sink();
        sink.erase_in_place(0);
        assert_eq!(sink.screen().cursor(), 0);
    }
}
