//! # Grammar Verification Harness
//!
//! Test-support assertions over a single rule: run it against a fixed
//! input and check the outcome tier and the unconsumed remainder in one
//! call. Intended for grammar unit tests; [`verify_rule`] panics with a
//! descriptive message on any mismatch, so it composes directly with
//! `#[test]`.

use crate::action::ActionTable;
use crate::engine::{parse_with, ParseOptions};
use crate::grammar::{Grammar, RuleId};
use crate::state::StateChain;

/// The observed outcome tier of one rule attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultKind {
    /// The rule matched; `remaining` bytes were left unconsumed.
    Success { remaining: usize },
    /// The rule failed locally; the cursor is back at the start.
    LocalFailure,
    /// A `must` combinator aborted the parse at byte `offset`.
    FatalFailure { offset: usize },
}

/// The outcome tier a rule attempt is expected to land in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expectation {
    /// The rule matches.
    Success,
    /// The rule fails locally; the parse as a whole still completes.
    LocalFailure,
    /// A `must` combinator aborts the parse.
    FatalFailure,
}

/// Run `rule` against `input` with no actions bound and classify the
/// outcome.
#[must_use]
pub fn classify(grammar: &Grammar, rule: RuleId, input: &[u8]) -> ResultKind {
    let mut states = StateChain::new();
    match parse_with(
        grammar,
        rule,
        input,
        &ActionTable::new(),
        &mut states,
        &ParseOptions::default(),
    ) {
        Ok(report) if report.matched => ResultKind::Success {
            remaining: report.remaining,
        },
        Ok(_) => ResultKind::LocalFailure,
        Err(err) => ResultKind::FatalFailure {
            offset: err.offset(),
        },
    }
}

/// Assert that `rule` applied to `input` lands in the expected tier and
/// leaves exactly `remain` bytes unconsumed.
///
/// On success, `remain` counts from the match end. On a local failure the
/// cursor is back at the start, so `remain` is the full input length. On
/// a fatal failure, `remain` counts from the abort offset.
///
/// Actions are left enabled but none are bound; grammar tests that need
/// state assertions drive [`parse`](crate::engine::parse) directly.
///
/// # Panics
///
/// Panics if the outcome tier or the unconsumed remainder differ from the
/// expectation.
pub fn verify_rule(
    grammar: &Grammar,
    rule: RuleId,
    input: &[u8],
    expectation: Expectation,
    remain: usize,
) {
    let name = grammar.name(rule);
    let (got, remaining) = match classify(grammar, rule, input) {
        ResultKind::Success { remaining } => (Expectation::Success, remaining),
        ResultKind::LocalFailure => (Expectation::LocalFailure, input.len()),
        ResultKind::FatalFailure { offset } => (Expectation::FatalFailure, input.len() - offset),
    };
    assert_eq!(
        got, expectation,
        "rule '{name}' on {input:?}: expected {expectation:?}, got {got:?}"
    );
    assert_eq!(
        remaining, remain,
        "rule '{name}' on {input:?}: expected {remain} bytes remaining, got {remaining}"
    );
}
