//! System-wide error types for the Kestrel console.

use core::fmt;

/// Errors returned through the console device contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ConsoleError {
    /// The calling process was marked for termination while blocked.
    Killed,
    /// The system has halted; no further I/O is possible.
    Halted,
}

impl ConsoleError {
    /// Result value reported at the system call boundary.
    pub const fn errno(self) -> isize {
        -1
    }
}

impl fmt::Display for ConsoleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConsoleError::Killed => write!(f, "reader killed while waiting for input"),
            ConsoleError::Halted => write!(f, "console halted"),
        }
    }
}

/// Unrecoverable conditions that halt every processor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FatalError {
    /// The display cursor left the screen.
    CursorOutOfBounds {
        /// The offending linear offset.
        pos: isize,
    },
}

impl fmt::Display for FatalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FatalError::CursorOutOfBounds { .. } => write!(f, "pos under/overflow"),
        }
    }
}

#[cfg(test)]
mod tests {
    extern crate std;
    use super::*;
    use std::string::ToString;

    #[test]
    fn test_display() {
        assert_eq!(
            FatalError::CursorOutOfBounds { pos: 2001 }.to_string(),
            "pos under/overflow"
        );
        assert_eq!(ConsoleError::Killed.errno(), -1);
    }
}
