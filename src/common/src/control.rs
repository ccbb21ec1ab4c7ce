//! Control bytes recognized by the console line discipline.

/// Returns the control code for `Ctrl-<letter>`.
///
/// `ctrl(b'D')` is `0x04`.
pub const fn ctrl(letter: u8) -> u8 {
    letter - b'@'
}

/// Moves the edit point back to the start of the pending line.
pub const RELOCATE_OPEN: u8 = b'{';
/// Returns the edit point to the end of the pending line.
pub const RELOCATE_CLOSE: u8 = b'}';
/// Requests a process listing.
pub const PROC_DUMP: u8 = ctrl(b'P');
/// Kills the pending line.
pub const KILL_LINE: u8 = ctrl(b'U');
/// Alias of [`KILL_LINE`].
pub const INTERRUPT: u8 = ctrl(b'C');
/// Deletes the byte before the edit point.
pub const BACKSPACE: u8 = ctrl(b'H');
/// Alias of [`BACKSPACE`].
pub const DELETE: u8 = 0x7f;
/// End of file.
pub const EOF: u8 = ctrl(b'D');

/// Classification of a raw input byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCode {
    /// Zero byte, ignored.
    Nul,
    /// Enter edit-point relocation mode.
    RelocateOpen,
    /// Exit edit-point relocation mode.
    RelocateClose,
    /// Defer a process-list dump.
    ProcDump,
    /// Erase the entire pending line.
    KillLine,
    /// Delete one byte before the edit point.
    Backspace,
    /// Newline or carriage return; commits the line.
    Newline,
    /// End of file; commits the line.
    EndOfFile,
    /// Any other byte, inserted as typed.
    Ordinary(u8),
}

impl ControlCode {
    /// Classifies a raw input byte.
    pub const fn classify(byte: u8) -> Self {
        match byte {
            0 => ControlCode::Nul,
            RELOCATE_OPEN => ControlCode::RelocateOpen,
            RELOCATE_CLOSE => ControlCode::RelocateClose,
            PROC_DUMP => ControlCode::ProcDump,
            KILL_LINE | INTERRUPT => ControlCode::KillLine,
            BACKSPACE | DELETE => ControlCode::Backspace,
            b'\n' | b'\r' => ControlCode::Newline,
            EOF => ControlCode::EndOfFile,
            other => ControlCode::Ordinary(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ctrl_codes() {
        assert_eq!(ctrl(b'D'), 0x04);
        assert_eq!(ctrl(b'H'), 0x08);
        assert_eq!(ctrl(b'P'), 0x10);
        assert_eq!(ctrl(b'U'), 0x15);
    }

    #[test]
    fn test_classify_aliases() {
        assert_eq!(ControlCode::classify(0x03), ControlCode::KillLine);
        assert_eq!(ControlCode::classify(0x15), ControlCode::KillLine);
        assert_eq!(ControlCode::classify(0x08), ControlCode::Backspace);
        assert_eq!(ControlCode::classify(0x7f), ControlCode::Backspace);
        assert_eq!(ControlCode::classify(b'\r'), ControlCode::Newline);
        assert_eq!(ControlCode::classify(b'a'), ControlCode::Ordinary(b'a'));
        assert_eq!(ControlCode::classify(0), ControlCode::Nul);
    }
}
