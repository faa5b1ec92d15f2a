//! # Error Types
//!
//! Error types for grammar construction and parsing.
//!
//! ## Overview
//!
//! The engine distinguishes three failure tiers:
//!
//! - **Local failure**: an ordinary `false` from a combinator or an action
//!   veto. Local failures are values, not errors — they flow through the
//!   dispatcher as `Ok(false)` and are always recoverable by an enclosing
//!   choice or repetition.
//! - **Fatal failure** ([`FatalError`]): raised by a `must` combinator (or
//!   deliberately by a custom match strategy) when a grammar point declares
//!   that no further alternative is acceptable. It aborts the parse past
//!   every enclosing combinator.
//! - **Construction-time error** ([`GrammarError`]): a grammar-shape fault
//!   detected by the static analyzer before any parse runs.
//!
//! When the `diagnostics` feature is enabled, errors integrate with
//! `miette` for rich reporting.

use crate::input::Position;
use thiserror::Error;

#[cfg(feature = "diagnostics")]
use miette::Diagnostic;

/// A grammar-shape fault detected at construction time, before any parse.
#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "diagnostics", derive(Diagnostic))]
pub enum GrammarError {
    /// A cycle of named rules reachable without consuming input.
    #[error("unguarded left recursion: {}", cycle.join(" -> "))]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(pegcore::left_recursion)))]
    LeftRecursion {
        /// Rule names forming the cycle, in reachability order.
        cycle: Vec<String>,
    },

    /// A rule was declared (or referenced) but never defined.
    #[error("rule '{name}' is declared but never defined")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(pegcore::undefined_rule)))]
    UndefinedRule { name: String },

    /// A rule was defined twice.
    #[error("rule '{name}' is defined more than once")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(pegcore::duplicate_rule)))]
    DuplicateRule { name: String },
}

/// A non-recoverable parse abort.
///
/// Raised when a `must` combinator's child fails, or deliberately by a
/// custom match strategy. It propagates past every enclosing combinator
/// uncaught; the cursor position at the moment of escalation is preserved
/// in the payload for diagnostics.
#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "diagnostics", derive(Diagnostic))]
#[error("parse aborted in rule '{rule}' at {}:{} (offset {})", position.line, position.column, position.offset)]
#[cfg_attr(feature = "diagnostics", diagnostic(code(pegcore::fatal_failure)))]
pub struct FatalError {
    /// Name of the innermost named rule at the abort point, or
    /// `"<anonymous>"` when the abort happened outside any named rule.
    pub rule: String,
    /// Cursor position at the moment of escalation. Exact under eager
    /// tracking; recomputed best-effort under lazy tracking.
    pub position: Position,
    /// Type names of the state-chain frames at the abort point, bottom
    /// to top.
    pub state_frames: Vec<&'static str>,
}

impl FatalError {
    /// Byte offset of the abort point.
    #[must_use]
    pub const fn offset(&self) -> usize {
        self.position.offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grammar_error_display() {
        let err = GrammarError::LeftRecursion {
            cycle: vec!["expr".to_string(), "term".to_string(), "expr".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "unguarded left recursion: expr -> term -> expr"
        );

        let err = GrammarError::UndefinedRule {
            name: "value".to_string(),
        };
        assert!(err.to_string().contains("never defined"));
    }

    #[test]
    fn test_fatal_error_display() {
        let err = FatalError {
            rule: "must_b".to_string(),
            position: Position {
                offset: 1,
                line: 1,
                column: 2,
            },
            state_frames: vec![],
        };
        let msg = err.to_string();
        assert!(msg.contains("must_b"));
        assert!(msg.contains("offset 1"));
        assert_eq!(err.offset(), 1);
    }
}
