//! Read cursor over an immutable byte buffer.
//!
//! The cursor is the only mutable piece of parse position state. Every
//! combinator that may need to rewind takes a [`CursorMark`] first and
//! restores it on failure; `mark`/`restore` are O(1) in both tracking
//! modes and reproduce cursor state exactly, including eager line/column.

use crate::input::position::{position_at, Position};

/// How the cursor accounts for line/column positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrackingMode {
    /// Maintain line and column incrementally on every advance.
    #[default]
    Eager,
    /// Maintain only the byte offset; resolving a [`Position`] rescans
    /// the buffer from the start (O(offset), for rare diagnostic use).
    Lazy,
}

/// An O(1) snapshot of cursor state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CursorMark {
    pub(crate) offset: usize,
    line: u32,
    column: u32,
}

impl CursorMark {
    /// Byte offset captured by this mark.
    #[must_use]
    pub const fn offset(&self) -> usize {
        self.offset
    }
}

/// Tracks the read position in an input buffer.
///
/// The offset is monotonically non-decreasing except on an explicit
/// [`restore`](Cursor::restore), which always returns to a previously
/// taken mark exactly.
#[derive(Debug, Clone)]
pub struct Cursor<'i> {
    buffer: &'i [u8],
    tracking: TrackingMode,
    offset: usize,
    line: u32,
    column: u32,
}

impl<'i> Cursor<'i> {
    /// Create a cursor at the start of `buffer`.
    #[must_use]
    pub const fn new(buffer: &'i [u8], tracking: TrackingMode) -> Self {
        Self {
            buffer,
            tracking,
            offset: 0,
            line: 1,
            column: 1,
        }
    }

    /// The whole underlying buffer.
    #[must_use]
    pub const fn buffer(&self) -> &'i [u8] {
        self.buffer
    }

    /// Current byte offset.
    #[must_use]
    pub const fn offset(&self) -> usize {
        self.offset
    }

    /// Bytes not yet consumed.
    #[must_use]
    pub fn rest(&self) -> &'i [u8] {
        &self.buffer[self.offset..]
    }

    /// Number of bytes not yet consumed.
    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.buffer.len() - self.offset
    }

    /// Whether the cursor is at the end of the buffer.
    #[must_use]
    pub const fn at_end(&self) -> bool {
        self.offset == self.buffer.len()
    }

    /// The tracking mode this cursor was created with.
    #[must_use]
    pub const fn tracking(&self) -> TrackingMode {
        self.tracking
    }

    /// Take an O(1) snapshot of the current state.
    #[must_use]
    pub const fn mark(&self) -> CursorMark {
        CursorMark {
            offset: self.offset,
            line: self.line,
            column: self.column,
        }
    }

    /// Return exactly to a previously taken mark.
    pub fn restore(&mut self, mark: CursorMark) {
        debug_assert!(mark.offset <= self.buffer.len());
        self.offset = mark.offset;
        self.line = mark.line;
        self.column = mark.column;
    }

    /// Advance the cursor by `len` consumed bytes.
    ///
    /// Under eager tracking this also updates line/column: a line feed, a
    /// bare carriage return, or a carriage-return/line-feed pair counts as
    /// one terminator (counted at the LF of a pair).
    ///
    /// # Panics
    ///
    /// Panics if `len` exceeds the remaining input.
    pub fn advance(&mut self, len: usize) {
        assert!(len <= self.remaining(), "advance past end of input");
        if matches!(self.tracking, TrackingMode::Eager) {
            let end = self.offset + len;
            let mut at = self.offset;
            while at < end {
                match self.buffer[at] {
                    b'\n' => {
                        self.line += 1;
                        self.column = 1;
                    }
                    b'\r' => {
                        if self.buffer.get(at + 1) != Some(&b'\n') {
                            self.line += 1;
                            self.column = 1;
                        }
                        // CR of a CRLF pair is zero-width; the LF counts.
                    }
                    _ => self.column += 1,
                }
                at += 1;
            }
        }
        self.offset += len;
    }

    /// Resolve the current position.
    ///
    /// Exact under eager tracking. Under lazy tracking this rescans the
    /// buffer up to the current offset.
    #[must_use]
    pub fn position(&self) -> Position {
        match self.tracking {
            TrackingMode::Eager => Position {
                offset: self.offset,
                line: self.line,
                column: self.column,
            },
            TrackingMode::Lazy => position_at(self.buffer, self.offset),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_advance_and_rest() {
        let mut cursor = Cursor::new(b"hello", TrackingMode::Eager);
        assert_eq!(cursor.remaining(), 5);
        cursor.advance(2);
        assert_eq!(cursor.offset(), 2);
        assert_eq!(cursor.rest(), b"llo");
        assert!(!cursor.at_end());
        cursor.advance(3);
        assert!(cursor.at_end());
    }

    #[test]
    fn test_cursor_mark_restore_exact() {
        let mut cursor = Cursor::new(b"ab\ncd", TrackingMode::Eager);
        cursor.advance(1);
        let mark = cursor.mark();
        let before = cursor.position();
        cursor.advance(3);
        assert_eq!(cursor.position().line, 2);
        cursor.restore(mark);
        assert_eq!(cursor.position(), before);
        assert_eq!(cursor.offset(), 1);
    }

    #[test]
    fn test_cursor_eager_crlf_is_one_terminator() {
        let mut cursor = Cursor::new(b"ab\r\ncd", TrackingMode::Eager);
        cursor.advance(6);
        let pos = cursor.position();
        assert_eq!(pos.line, 2);
        assert_eq!(pos.column, 3);
    }

    #[test]
    fn test_cursor_eager_split_crlf_advances() {
        // A CRLF pair consumed one byte at a time still counts once.
        let mut cursor = Cursor::new(b"a\r\nb", TrackingMode::Eager);
        cursor.advance(2);
        cursor.advance(1);
        cursor.advance(1);
        let pos = cursor.position();
        assert_eq!(pos.line, 2);
        assert_eq!(pos.column, 2);
    }

    #[test]
    fn test_cursor_lazy_matches_eager() {
        let input = b"one\rtwo\r\nthree\nfour";
        for cut in 0..=input.len() {
            let mut eager = Cursor::new(input, TrackingMode::Eager);
            let mut lazy = Cursor::new(input, TrackingMode::Lazy);
            eager.advance(cut);
            lazy.advance(cut);
            assert_eq!(eager.position(), lazy.position(), "at offset {cut}");
        }
    }

    #[test]
    #[should_panic(expected = "advance past end")]
    fn test_cursor_advance_past_end_panics() {
        let mut cursor = Cursor::new(b"ab", TrackingMode::Lazy);
        cursor.advance(3);
    }
}
