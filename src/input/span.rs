//! Non-owning view of the bytes matched by one rule attempt.

use std::str::Utf8Error;

/// The extent of the last successful match.
///
/// A `MatchSpan` borrows the input buffer and is handed to [`Apply`
/// actions](crate::action::ActionBinding) for the duration of the dispatch
/// call that produced it. A consumer that needs the bytes beyond that must
/// copy them.
#[derive(Debug, Clone, Copy)]
pub struct MatchSpan<'i> {
    buffer: &'i [u8],
    start: usize,
    end: usize,
}

impl<'i> MatchSpan<'i> {
    pub(crate) fn new(buffer: &'i [u8], start: usize, end: usize) -> Self {
        debug_assert!(start <= end && end <= buffer.len());
        Self { buffer, start, end }
    }

    /// Byte offset where the match began.
    #[must_use]
    pub const fn start(&self) -> usize {
        self.start
    }

    /// Byte offset just past the match (the cursor offset at creation).
    #[must_use]
    pub const fn end(&self) -> usize {
        self.end
    }

    /// Length of the match in bytes.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.end - self.start
    }

    /// Whether the match was zero-width.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// The matched bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &'i [u8] {
        &self.buffer[self.start..self.end]
    }

    /// The matched bytes as UTF-8 text.
    ///
    /// # Errors
    ///
    /// Returns the underlying [`Utf8Error`] if the span is not valid UTF-8.
    pub fn as_str(&self) -> Result<&'i str, Utf8Error> {
        std::str::from_utf8(self.as_bytes())
    }
}
