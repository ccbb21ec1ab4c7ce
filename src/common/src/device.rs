//! The character-device contract used by the kernel's device table.

use crate::ConsoleError;

/// A byte-stream device reachable through the file layer.
pub trait CharDevice: Sync {
    /// Reads into `dst`, blocking until data is available.
    ///
    /// Returns the number of bytes copied.
    fn read(&self, dst: &mut [u8]) -> Result<usize, ConsoleError>;

    /// Writes all of `src`.
    fn write(&self, src: &[u8]) -> Result<usize, ConsoleError>;
}
