//! # Pegcore
//!
//! A PEG (parsing expression grammar) execution engine with rule actions,
//! threaded user state, and exact backtracking.
//!
//! ## Overview
//!
//! Pegcore separates a parser into three pieces:
//!
//! - **Grammar**: an immutable combinator tree built once with
//!   [`GrammarBuilder`] — sequences, ordered choices, bounded repetition,
//!   zero-width lookaheads, fatal-failure escalation, and leaf matchers,
//!   validated for unguarded left recursion before any parse runs
//! - **Actions**: an [`ActionTable`] binding behavior to rules by name,
//!   invoked with the matched span and a mutable [`StateChain`] of user
//!   state; an action may veto its match, and whole subtrees can suppress,
//!   re-enable, or rebind actions
//! - **Engine**: the [`parse`] dispatcher executing the grammar against a
//!   byte buffer with PEG semantics — ordered choice commits, repetition
//!   is greedy, every failing combinator rewinds exactly, and a `must`
//!   combinator aborts the whole parse with position diagnostics
//!
//! ## Quick Start
//!
//! Sum a comma-separated list of numbers:
//!
//! ```rust
//! use pegcore::engine::parse;
//! use pegcore::grammar::{GrammarBuilder, RuleExpr};
//! use pegcore::{ActionTable, StateChain};
//!
//! let mut builder = GrammarBuilder::new();
//! let number = builder.rule("number", RuleExpr::plus(RuleExpr::byte_range(b'0', b'9')));
//! let list = builder.rule(
//!     "list",
//!     RuleExpr::seq([
//!         RuleExpr::rule(number),
//!         RuleExpr::star(RuleExpr::seq([
//!             RuleExpr::literal(","),
//!             RuleExpr::rule(number),
//!         ])),
//!         RuleExpr::eof(),
//!     ]),
//! );
//! let grammar = builder.build().expect("grammar is well-shaped");
//!
//! let mut actions = ActionTable::new();
//! actions.apply(number, |span, states| {
//!     let text = span.as_str().expect("digits are utf-8");
//!     let value: u64 = text.parse().expect("digits parse");
//!     if let Some(sum) = states.last_mut::<u64>() {
//!         *sum += value;
//!     }
//! });
//!
//! let mut states = StateChain::with(0u64);
//! let report = parse(&grammar, list, b"10,20,12", &actions, &mut states)
//!     .expect("no fatal failure");
//! assert!(report.matched);
//! assert_eq!(states.last::<u64>(), Some(&42));
//! ```
//!
//! ## Feature Flags
//!
//! - `diagnostics`: derive `miette::Diagnostic` on error types for rich
//!   terminal reports.

pub mod action;
pub mod analysis;
pub mod engine;
pub mod error;
pub mod grammar;
pub mod input;
pub mod state;
pub mod testing;

pub use action::{ActionBinding, ActionTable};
pub use analysis::StaticAnalyzer;
pub use engine::{parse, parse_with, MatchContext, MatchStrategy, ParseOptions, ParseReport};
pub use error::{FatalError, GrammarError};
pub use grammar::{Grammar, GrammarBuilder, LeafMatcher, RuleExpr, RuleId};
pub use input::{Cursor, CursorMark, MatchSpan, Position, TrackingMode};
pub use state::{FnScope, ScopeHook, StateChain};
