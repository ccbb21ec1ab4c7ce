//! The four-index circular input buffer.
//!
//! Indices grow without bound; the slot for index `i` is `i % INPUT_CAPACITY`.
//! At all times `read <= commit <= edit <= end`:
//!
//! - `[read, commit)` is committed data visible to readers.
//! - `[commit, end)` is the pending line, still editable.
//! - `edit` is where the next typed byte lands; `[edit, end)` is the
//!   trailing tail shifted by mid-line inserts and deletes.

use crate::platform::WaitChannel;

/// Capacity of the input buffer in bytes.
pub const INPUT_CAPACITY: usize = 128;

/// Snapshot of the ring indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineIndices {
    /// Next byte a reader consumes.
    pub read: usize,
    /// End of committed data.
    pub commit: usize,
    /// Insertion point within the pending line.
    pub edit: usize,
    /// One past the last byte present.
    pub end: usize,
}

impl LineIndices {
    /// Returns `true` if `read <= commit <= edit <= end` and the span fits
    /// in the buffer.
    pub fn is_ordered(&self) -> bool {
        self.read <= self.commit
            && self.commit <= self.edit
            && self.edit <= self.end
            && self.end - self.read <= INPUT_CAPACITY
    }
}

/// Circular input buffer shared by the line editor and readers.
pub struct InputRing {
    buf: [u8; INPUT_CAPACITY],
    read: usize,
    commit: usize,
    edit: usize,
    end: usize,
}

impl InputRing {
    /// Creates an empty ring.
    pub const fn new() -> Self {
        Self {
            buf: [0; INPUT_CAPACITY],
            read: 0,
            commit: 0,
            edit: 0,
            end: 0,
        }
    }

    /// Returns the current indices.
    pub fn indices(&self) -> LineIndices {
        LineIndices {
            read: self.read,
            commit: self.commit,
            edit: self.edit,
            end: self.end,
        }
    }

    /// Channel readers sleep on while no committed data is available.
    pub fn read_channel(&self) -> WaitChannel {
        WaitChannel::of(&self.read)
    }

    fn slot(i: usize) -> usize {
        i % INPUT_CAPACITY
    }

    /// Byte at logical index `i`.
    pub fn at(&self, i: usize) -> u8 {
        self.buf[Self::slot(i)]
    }

    /// Returns `true` if the buffer holds `INPUT_CAPACITY` unread bytes.
    pub fn is_full(&self) -> bool {
        self.end - self.read >= INPUT_CAPACITY
    }

    /// Length of the pending line.
    pub fn pending_len(&self) -> usize {
        self.end - self.commit
    }

    /// Bytes between the edit point and the end of the pending line.
    pub fn tail_len(&self) -> usize {
        self.end - self.edit
    }

    /// Returns `true` while the edit point sits at the end of the line.
    pub fn at_end(&self) -> bool {
        self.edit == self.end
    }

    /// Returns `true` if there is nothing before the edit point to delete.
    pub fn at_line_start(&self) -> bool {
        self.edit == self.commit
    }

    /// Returns `true` if readers have committed data to consume.
    pub fn has_committed(&self) -> bool {
        self.read != self.commit
    }

    /// Stores `byte` at `end`, advancing both `edit` and `end`.
    ///
    /// Only valid when the edit point is at the end of the line.
    pub fn append(&mut self, byte: u8) {
        debug_assert!(self.at_end());
        self.buf[Self::slot(self.end)] = byte;
        self.end += 1;
        self.edit = self.end;
    }

    /// Inserts `byte` at the edit point, shifting the tail right by one.
    pub fn insert(&mut self, byte: u8) {
        let mut i = self.end;
        while i > self.edit {
            self.buf[Self::slot(i)] = self.buf[Self::slot(i - 1)];
            i -= 1;
        }
        self.buf[Self::slot(self.edit)] = byte;
        self.edit += 1;
        self.end += 1;
    }

    /// Deletes the byte before the edit point, shifting the tail left by one.
    pub fn delete_before_edit(&mut self) {
        debug_assert!(!self.at_line_start());
        for i in self.edit - 1..self.end - 1 {
            self.buf[Self::slot(i)] = self.buf[Self::slot(i + 1)];
        }
        self.edit -= 1;
        self.end -= 1;
    }

    /// Stores `byte` at `end` regardless of the edit point.
    pub fn push_end(&mut self, byte: u8) {
        self.buf[Self::slot(self.end)] = byte;
        self.end += 1;
    }

    /// Drops the last byte of the pending line.
    ///
    /// The edit point follows only if it is past the start of the line.
    pub fn truncate_last(&mut self) {
        debug_assert!(self.end > self.commit);
        if self.edit > self.commit {
            self.edit -= 1;
        }
        self.end -= 1;
    }

    /// Last byte present in the buffer, if any.
    pub fn last(&self) -> Option<u8> {
        (self.end > self.read).then(|| self.at(self.end - 1))
    }

    /// Moves the edit point to the start of the pending line.
    pub fn edit_to_line_start(&mut self) {
        self.edit = self.commit;
    }

    /// Moves the edit point to the end of the pending line.
    pub fn edit_to_line_end(&mut self) {
        self.edit = self.end;
    }

    /// Makes the whole pending line visible to readers.
    pub fn commit_all(&mut self) {
        self.edit = self.end;
        self.commit = self.end;
    }

    /// Consumes the next committed byte.
    pub fn pop(&mut self) -> Option<u8> {
        if !self.has_committed() {
            return None;
        }
        let byte = self.at(self.read);
        self.read += 1;
        Some(byte)
    }

    /// Puts the last consumed byte back.
    pub fn unread(&mut self) {
        debug_assert!(self.read > 0);
        self.read -= 1;
    }
}

impl Default for InputRing {
    fn default() -> Self {
        Self::new()
    }
}
