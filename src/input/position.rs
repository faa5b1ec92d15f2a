//! Offset to line/column resolution.
//!
//! Line and column are 1-based. A bare line feed, a bare carriage return,
//! or a carriage-return/line-feed pair each count as exactly one line
//! terminator; the CR of a CRLF pair advances neither line nor column.

use memchr::memchr2_iter;

/// A resolved position in an input buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    /// Byte offset from the start of the buffer.
    pub offset: usize,
    /// 1-based line number.
    pub line: u32,
    /// 1-based column number, in bytes.
    pub column: u32,
}

impl Position {
    /// The position at the start of any buffer.
    #[must_use]
    pub const fn start() -> Self {
        Self {
            offset: 0,
            line: 1,
            column: 1,
        }
    }
}

/// Resolve `offset` within `buffer` by rescanning from the start.
///
/// This is the lazy-mode fallback: O(offset), intended for rare
/// diagnostic use. Eager cursors maintain the same figures incrementally
/// and never call this.
#[must_use]
pub fn position_at(buffer: &[u8], offset: usize) -> Position {
    let offset = offset.min(buffer.len());
    let mut line: u32 = 1;
    let mut line_start = 0usize;
    let mut cr_of_crlf = false;

    for at in memchr2_iter(b'\n', b'\r', &buffer[..offset]) {
        if buffer[at] == b'\r' && buffer.get(at + 1) == Some(&b'\n') {
            // Counted when the LF is reached; remember it so the CR does
            // not widen the column either.
            if at + 1 >= offset {
                cr_of_crlf = true;
            }
            continue;
        }
        line = line.saturating_add(1);
        line_start = at + 1;
    }

    let mut column = u32::try_from(offset - line_start).unwrap_or(u32::MAX - 1) + 1;
    if cr_of_crlf {
        // The trailing CR of a split CRLF pair is zero-width.
        column -= 1;
    }

    Position {
        offset,
        line,
        column,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_start() {
        assert_eq!(position_at(b"hello", 0), Position::start());
    }

    #[test]
    fn test_position_single_line() {
        let pos = position_at(b"hello", 3);
        assert_eq!(pos.line, 1);
        assert_eq!(pos.column, 4);
    }

    #[test]
    fn test_position_lf() {
        let pos = position_at(b"ab\ncd", 5);
        assert_eq!(pos.line, 2);
        assert_eq!(pos.column, 3);
    }

    #[test]
    fn test_position_crlf_counts_once() {
        let pos = position_at(b"ab\r\ncd", 6);
        assert_eq!(pos.line, 2);
        assert_eq!(pos.column, 3);
    }

    #[test]
    fn test_position_bare_cr() {
        let pos = position_at(b"ab\rcd", 5);
        assert_eq!(pos.line, 2);
        assert_eq!(pos.column, 3);
    }

    #[test]
    fn test_position_at_line_start() {
        let pos = position_at(b"ab\r\ncd", 4);
        assert_eq!(pos.line, 2);
        assert_eq!(pos.column, 1);
    }

    #[test]
    fn test_position_inside_crlf() {
        // Offset between CR and LF: the CR is zero-width.
        let pos = position_at(b"ab\r\ncd", 3);
        assert_eq!(pos.line, 1);
        assert_eq!(pos.column, 3);
    }

    #[test]
    fn test_position_clamps_to_len() {
        let pos = position_at(b"ab", 10);
        assert_eq!(pos.offset, 2);
        assert_eq!(pos.column, 3);
    }
}
