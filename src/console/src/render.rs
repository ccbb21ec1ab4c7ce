//! Pure rendering decisions for the text frame buffer.
//!
//! Nothing here touches hardware. [`plan`] computes where a glyph is drawn
//! and where the cursor ends up; the output sink applies the result.

use kestrel_common::FatalError;

/// Number of columns on screen.
pub const COLUMNS: usize = 80;

/// Number of rows on screen.
pub const ROWS: usize = 25;

/// Total number of cells.
pub const CELLS: usize = COLUMNS * ROWS;

/// Output scrolls when the cursor reaches this row.
pub const SCROLL_ROW: usize = ROWS - 1;

/// Column at which the relocation marker is drawn.
pub const MARKER_COLUMN: usize = 5;

/// Display attribute: light grey on black.
pub const ATTRIBUTE: u16 = 0x0700;

/// An empty cell.
pub const BLANK: u16 = cell(b' ');

/// Encodes `byte` as a cell with the display attribute.
pub const fn cell(byte: u8) -> u16 {
    byte as u16 | ATTRIBUTE
}

/// Something the output sink can render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Glyph {
    /// A raw byte.
    Byte(u8),
    /// Erase the previous cell.
    Erase,
    /// A marker drawn at [`MARKER_COLUMN`] of the cursor's row.
    Marker(u8),
}

/// Result of planning a single [`Glyph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Plan {
    /// Cell to draw, if any.
    pub draw: Option<(usize, u16)>,
    /// Cursor offset after rendering, already adjusted for scrolling.
    pub pos: usize,
    /// Whether the frame buffer scrolls up one row.
    pub scroll: bool,
}

/// Plans rendering `glyph` with the cursor at `pos`.
///
/// Fails if the cursor is, or would end up, outside the screen.
pub fn plan(pos: usize, glyph: Glyph, advance: bool) -> Result<Plan, FatalError> {
    if pos >= CELLS {
        return Err(FatalError::CursorOutOfBounds { pos: pos as isize });
    }
    let step = isize::from(advance);
    let mut next = pos as isize;
    let mut draw = None;

    match glyph {
        Glyph::Byte(b'\n') => next += (COLUMNS - pos % COLUMNS) as isize,
        Glyph::Erase => {
            if advance && next > 0 {
                next -= 1;
            }
        }
        Glyph::Marker(byte) => {
            let at = pos - pos % COLUMNS + MARKER_COLUMN;
            draw = Some((at, cell(byte)));
            next = at as isize + step;
        }
        Glyph::Byte(byte) => {
            draw = Some((pos, cell(byte)));
            next += step;
        }
    }

    if next < 0 || next > CELLS as isize {
        return Err(FatalError::CursorOutOfBounds { pos: next });
    }

    let mut next = next as usize;
    let scroll = next / COLUMNS >= SCROLL_ROW;
    if scroll {
        next -= COLUMNS;
    }
    Ok(Plan {
        draw,
        pos: next,
        scroll,
    })
}

/// Applies a relative cursor move, clamped to the screen.
pub fn moved(pos: usize, delta: isize) -> usize {
    let target = pos as isize + delta;
    target.clamp(0, CELLS as isize - 1) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_ordinary_byte() {
        let plan = plan(10, Glyph::Byte(b'a'), true).unwrap();
        assert_eq!(plan.draw, Some((10, cell(b'a'))));
        assert_eq!(plan.pos, 11);
        assert!(!plan.scroll);
    }

    #[test]
    fn test_plan_without_advance() {
        let plan = plan(10, Glyph::Byte(b'a'), false).unwrap();
        assert_eq!(plan.pos, 10);
    }

    #[test]
    fn test_plan_newline() {
        let plan = plan(85, Glyph::Byte(b'\n'), true).unwrap();
        assert_eq!(plan.pos, 160);
        assert_eq!(plan.draw, None);
    }

    #[test]
    fn test_plan_erase() {
        assert_eq!(plan(5, Glyph::Erase, true).unwrap().pos, 4);
        assert_eq!(plan(0, Glyph::Erase, true).unwrap().pos, 0);
        assert_eq!(plan(5, Glyph::Erase, false).unwrap().pos, 5);
    }

    #[test]
    fn test_plan_marker_snaps_to_column() {
        let plan = plan(2 * COLUMNS + 40, Glyph::Marker(b'{'), true).unwrap();
        assert_eq!(plan.draw, Some((2 * COLUMNS + MARKER_COLUMN, cell(b'{'))));
        assert_eq!(plan.pos, 2 * COLUMNS + MARKER_COLUMN + 1);
    }

    #[test]
    fn test_plan_braces_are_ordinary_bytes() {
        let plan = plan(42, Glyph::Byte(b'}'), true).unwrap();
        assert_eq!(plan.draw, Some((42, cell(b'}'))));
        assert_eq!(plan.pos, 43);
    }

    #[test]
    fn test_plan_scrolls_on_last_row() {
        let last = SCROLL_ROW * COLUMNS - 1;
        let plan = plan(last, Glyph::Byte(b'z'), true).unwrap();
        assert!(plan.scroll);
        assert_eq!(plan.pos, (SCROLL_ROW - 1) * COLUMNS);

        let plan = super::plan((SCROLL_ROW - 1) * COLUMNS + 3, Glyph::Byte(b'\n'), true).unwrap();
        assert!(plan.scroll);
        assert_eq!(plan.pos, (SCROLL_ROW - 1) * COLUMNS);
    }

    #[test]
    fn test_plan_rejects_out_of_bounds_cursor() {
        assert_eq!(
            plan(CELLS, Glyph::Byte(b'a'), true),
            Err(FatalError::CursorOutOfBounds {
                pos: CELLS as isize
            })
        );
    }

    #[test]
    fn test_moved_clamps() {
        assert_eq!(moved(3, -10), 0);
        assert_eq!(moved(CELLS - 2, 10), CELLS - 1);
        assert_eq!(moved(100, -20), 80);
    }
}
