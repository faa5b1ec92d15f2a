//! # Parse Engine
//!
//! The recursive-descent dispatcher that executes a compiled grammar
//! against a byte buffer.
//!
//! A parse is one call to [`parse`] (or [`parse_with`]): the engine walks
//! the start rule's combinator tree depth-first, threading a single
//! [`Cursor`] and the caller's [`StateChain`] through every node. Matching
//! is PEG-style: ordered choice commits to its first successful
//! alternative, repetition is greedy, and every combinator that fails
//! locally rewinds the cursor to the exact state it held on entry.
//!
//! Failures come in two tiers. A local failure is a value (`Ok(false)`)
//! and is always recoverable by an enclosing choice or repetition. A
//! fatal failure ([`FatalError`]) is raised by a `must` combinator and
//! propagates past every enclosing combinator with `?`, without rewinding,
//! so the abort position survives into the payload.
//!
//! The grammar, action table, and input are all borrowed immutably, so
//! independent parses over the same grammar may run on separate threads.

mod context;

pub use context::MatchContext;

use crate::action::ActionTable;
use crate::error::FatalError;
use crate::grammar::{Grammar, RuleId};
use crate::input::{Cursor, Position, TrackingMode};
use crate::state::StateChain;

/// Whether rule actions currently run on successful matches.
///
/// `Nothing` is entered by lookaheads and the `disable` combinator;
/// `enable` restores the mode the top-level parse started with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyMode {
    /// Invoke the bound action after a successful rule match.
    Action,
    /// Match structurally only; no actions fire.
    Nothing,
}

/// Per-parse configuration.
#[derive(Debug, Clone, Copy)]
pub struct ParseOptions {
    /// Line/column accounting mode for the cursor.
    pub tracking: TrackingMode,
    /// Initial apply mode; `false` runs the whole parse structurally.
    pub actions_enabled: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            tracking: TrackingMode::Eager,
            actions_enabled: true,
        }
    }
}

/// Outcome of a completed (non-aborted) parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseReport {
    /// Whether the start rule matched.
    pub matched: bool,
    /// Final cursor offset; equals the number of bytes consumed, and is
    /// the entry offset when `matched` is `false`.
    pub offset: usize,
    /// Bytes left unconsumed after the match.
    pub remaining: usize,
    /// Final cursor position.
    pub position: Position,
}

/// A replacement match algorithm for one rule.
///
/// Registered per rule id in an [`ActionTable`]; when present, the
/// dispatcher delegates the entire match attempt for that rule to the
/// strategy. The strategy assumes the standard algorithm's obligations:
/// rewind the context to its entry state when reporting `Ok(false)`, and
/// invoke the rule's action itself if it wants one to run (the default
/// algorithm is available as [`MatchContext::match_default`]).
pub trait MatchStrategy: Send + Sync {
    /// Attempt to match `rule` at the context's current position.
    ///
    /// # Errors
    ///
    /// Returns [`FatalError`] to abort the parse.
    fn attempt(&self, rule: RuleId, ctx: &mut MatchContext<'_, '_>) -> Result<bool, FatalError>;
}

/// Parse `input` from `rule` with default options: eager position
/// tracking, actions enabled.
///
/// A match need not consume the whole buffer; the report carries the
/// final offset, and a grammar wanting exhaustion ends in an `eof` leaf.
///
/// # Errors
///
/// Returns [`FatalError`] if a `must` combinator's child failed.
///
/// # Panics
///
/// Panics if `rule` does not belong to `grammar`.
pub fn parse(
    grammar: &Grammar,
    rule: RuleId,
    input: &[u8],
    actions: &ActionTable,
    states: &mut StateChain,
) -> Result<ParseReport, FatalError> {
    parse_with(grammar, rule, input, actions, states, &ParseOptions::default())
}

/// Parse `input` from `rule` with explicit options.
///
/// # Errors
///
/// Returns [`FatalError`] if a `must` combinator's child failed.
///
/// # Panics
///
/// Panics if `rule` does not belong to `grammar`.
pub fn parse_with(
    grammar: &Grammar,
    rule: RuleId,
    input: &[u8],
    actions: &ActionTable,
    states: &mut StateChain,
    options: &ParseOptions,
) -> Result<ParseReport, FatalError> {
    assert!(
        grammar.get(rule).is_some(),
        "start rule does not belong to this grammar"
    );
    let root_apply = if options.actions_enabled {
        ApplyMode::Action
    } else {
        ApplyMode::Nothing
    };
    let cursor = Cursor::new(input, options.tracking);
    let mut ctx = MatchContext::new(grammar, actions, states, cursor, root_apply);
    let matched = ctx.match_rule(rule)?;
    let position = ctx.position();
    Ok(ParseReport {
        matched,
        offset: position.offset,
        remaining: input.len() - position.offset,
        position,
    })
}
