//! # Input Handling
//!
//! Cursor, position, and span types for walking a byte buffer.
//!
//! - [`Cursor`] tracks the read position and supports O(1)
//!   snapshot/restore via [`CursorMark`].
//! - [`TrackingMode`] selects eager (incremental line/column) or lazy
//!   (offset-only) position accounting.
//! - [`Position`] is a resolved offset/line/column triple.
//! - [`MatchSpan`] is a non-owning view of the bytes matched by one rule
//!   attempt.

pub mod cursor;
pub mod position;
pub mod span;

pub use cursor::{Cursor, CursorMark, TrackingMode};
pub use position::{position_at, Position};
pub use span::MatchSpan;
