//! Line editor: turns raw input bytes into committed lines.

use bitflags::bitflags;
use kestrel_common::control::{EOF, RELOCATE_OPEN};
use kestrel_common::{ControlCode, FatalError};
use kestrel_hal::{Serial, TextScreen};

use crate::render::Glyph;
use crate::ring::{InputRing, LineIndices};
use crate::sink::OutputSink;

bitflags! {
    /// Side effects of feeding input that the caller must act on.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct FeedEffects: u8 {
        /// A line was committed; readers must be woken.
        const COMMITTED = 1 << 0;
        /// A process listing was requested; run it after unlocking.
        const PROC_DUMP = 1 << 1;
    }
}

/// Owns the input ring and the edit-point relocation state.
pub struct LineEditor {
    ring: InputRing,
    /// Cells ahead of the on-screen cursor while relocation mode is active.
    back_counter: usize,
}

impl LineEditor {
    /// Creates an editor with an empty buffer.
    pub const fn new() -> Self {
        Self {
            ring: InputRing::new(),
            back_counter: 0,
        }
    }

    /// Current ring indices.
    pub fn indices(&self) -> LineIndices {
        self.ring.indices()
    }

    /// Relocation counter; nonzero while relocation mode is active.
    pub fn back_counter(&self) -> usize {
        self.back_counter
    }

    /// The input ring.
    pub fn ring(&self) -> &InputRing {
        &self.ring
    }

    /// The input ring, for readers consuming committed data.
    pub fn ring_mut(&mut self) -> &mut InputRing {
        &mut self.ring
    }

    /// Consumes one input byte, updating the buffer and the screen.
    pub fn feed<S: Serial, T: TextScreen>(
        &mut self,
        byte: u8,
        sink: &mut OutputSink<S, T>,
    ) -> Result<FeedEffects, FatalError> {
        let code = ControlCode::classify(byte);
        log::trace!("console: feed {:#04x} as {:?}", byte, code);

        match code {
            ControlCode::Nul => Ok(FeedEffects::empty()),
            ControlCode::RelocateOpen => self.open_relocation(sink),
            ControlCode::RelocateClose => {
                self.close_relocation(sink);
                Ok(FeedEffects::empty())
            }
            ControlCode::ProcDump => Ok(FeedEffects::PROC_DUMP),
            ControlCode::KillLine => self.kill_line(sink),
            ControlCode::Backspace => {
                self.backspace(sink);
                Ok(FeedEffects::empty())
            }
            ControlCode::Newline => self.commit_with(b'\n', sink),
            ControlCode::EndOfFile => self.commit_with(EOF, sink),
            ControlCode::Ordinary(byte) => self.insert(byte, sink),
        }
    }

    fn open_relocation<S: Serial, T: TextScreen>(
        &mut self,
        sink: &mut OutputSink<S, T>,
    ) -> Result<FeedEffects, FatalError> {
        self.ring.edit_to_line_start();
        sink.flash_marker(RELOCATE_OPEN)?;

        let tail = self.ring.tail_len();
        self.back_counter += tail + 1;
        sink.move_cursor(-(tail as isize));
        Ok(FeedEffects::empty())
    }

    fn close_relocation<S: Serial, T: TextScreen>(&mut self, sink: &mut OutputSink<S, T>) {
        sink.move_cursor(self.ring.tail_len() as isize);
        self.ring.edit_to_line_end();
        self.back_counter = 0;
    }

    fn kill_line<S: Serial, T: TextScreen>(
        &mut self,
        sink: &mut OutputSink<S, T>,
    ) -> Result<FeedEffects, FatalError> {
        if self.ring.pending_len() == 0 {
            return Ok(FeedEffects::empty());
        }
        let tail = self.ring.tail_len();
        if tail > 0 {
            sink.move_cursor(tail as isize);
        }
        while self.ring.pending_len() > 0 && self.ring.last() != Some(b'\n') {
            self.ring.truncate_last();
            sink.put_char(Glyph::Erase, true)?;
        }
        self.back_counter = 0;
        Ok(FeedEffects::empty())
    }

    fn backspace<S: Serial, T: TextScreen>(&mut self, sink: &mut OutputSink<S, T>) {
        if self.ring.at_line_start() {
            return;
        }
        // The serial mirror only ever sees the end of the line.
        if self.ring.at_end() {
            sink.put_serial(Glyph::Erase);
        }
        self.ring.delete_before_edit();
        sink.erase_in_place(self.back_counter);
    }

    fn commit_with<S: Serial, T: TextScreen>(
        &mut self,
        byte: u8,
        sink: &mut OutputSink<S, T>,
    ) -> Result<FeedEffects, FatalError> {
        if !self.ring.at_end() {
            self.close_relocation(sink);
        }
        if self.ring.is_full() {
            log::warn!("console: input buffer full, dropping {:#04x}", byte);
            if self.ring.pending_len() > 0 {
                return Ok(self.commit());
            }
            return Ok(FeedEffects::empty());
        }
        self.ring.push_end(byte);
        sink.put_char(Glyph::Byte(byte), true)?;
        Ok(self.commit())
    }

    fn insert<S: Serial, T: TextScreen>(
        &mut self,
        byte: u8,
        sink: &mut OutputSink<S, T>,
    ) -> Result<FeedEffects, FatalError> {
        if self.ring.is_full() {
            log::warn!("console: input buffer full, dropping {:#04x}", byte);
            return Ok(FeedEffects::empty());
        }
        if self.ring.at_end() {
            self.ring.append(byte);
            sink.put_char(Glyph::Byte(byte), true)?;
        } else {
            self.ring.insert(byte);
            sink.insert_in_place(byte, self.back_counter);
        }
        if self.ring.is_full() {
            if !self.ring.at_end() {
                self.close_relocation(sink);
            }
            return Ok(self.commit());
        }
        Ok(FeedEffects::empty())
    }

    fn commit(&mut self) -> FeedEffects {
        self.ring.commit_all();
        self.back_counter = 0;
        log::debug!("console: committed up to {}", self.ring.indices().commit);
        FeedEffects::COMMITTED
    }
}

impl Default for LineEditor {
    fn default() -> Self {
        Self::new()
    }
}
