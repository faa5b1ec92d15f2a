//! The match context: all mutable state of one parse in flight.

use crate::action::ActionTable;
use crate::engine::ApplyMode;
use crate::error::FatalError;
use crate::grammar::{Grammar, RuleExpr, RuleId};
use crate::input::{Cursor, CursorMark, MatchSpan, Position};
use crate::state::StateChain;
use smallvec::SmallVec;
use std::sync::Arc;

/// Execution context for one parse: cursor, apply mode, bound action
/// table, state chain, and the stack of named rules being attempted.
///
/// Custom [`MatchStrategy`](crate::engine::MatchStrategy) implementations
/// receive the context mutably
/// and drive it through the public surface here; everything a strategy
/// needs to honor the rewind contract is `mark`/`restore`, and
/// [`match_default`](Self::match_default) re-enters the standard
/// algorithm for the rule's own body.
pub struct MatchContext<'p, 'i> {
    grammar: &'p Grammar,
    actions: &'p ActionTable,
    states: &'p mut StateChain,
    cursor: Cursor<'i>,
    root_apply: ApplyMode,
    apply: ApplyMode,
    rule_stack: SmallVec<[RuleId; 16]>,
}

impl<'p, 'i> MatchContext<'p, 'i> {
    pub(crate) fn new(
        grammar: &'p Grammar,
        actions: &'p ActionTable,
        states: &'p mut StateChain,
        cursor: Cursor<'i>,
        root_apply: ApplyMode,
    ) -> Self {
        Self {
            grammar,
            actions,
            states,
            cursor,
            root_apply,
            apply: root_apply,
            rule_stack: SmallVec::new(),
        }
    }

    /// The grammar being executed.
    #[must_use]
    pub fn grammar(&self) -> &'p Grammar {
        self.grammar
    }

    /// Snapshot the cursor.
    #[must_use]
    pub fn mark(&self) -> CursorMark {
        self.cursor.mark()
    }

    /// Return the cursor exactly to a previous snapshot.
    pub fn restore(&mut self, mark: CursorMark) {
        self.cursor.restore(mark);
    }

    /// Current byte offset.
    #[must_use]
    pub fn offset(&self) -> usize {
        self.cursor.offset()
    }

    /// Unconsumed input.
    #[must_use]
    pub fn rest(&self) -> &'i [u8] {
        self.cursor.rest()
    }

    /// Whole input buffer.
    #[must_use]
    pub fn buffer(&self) -> &'i [u8] {
        self.cursor.buffer()
    }

    /// Consume `len` bytes.
    ///
    /// # Panics
    ///
    /// Panics if `len` exceeds the remaining input.
    pub fn advance(&mut self, len: usize) {
        self.cursor.advance(len);
    }

    /// Resolve the current position.
    #[must_use]
    pub fn position(&self) -> Position {
        self.cursor.position()
    }

    /// The state chain.
    #[must_use]
    pub fn states(&self) -> &StateChain {
        self.states
    }

    /// The state chain, mutably.
    pub fn states_mut(&mut self) -> &mut StateChain {
        self.states
    }

    /// Whether actions currently fire on successful rule matches.
    #[must_use]
    pub fn actions_enabled(&self) -> bool {
        matches!(self.apply, ApplyMode::Action)
    }

    /// Build a fatal failure at the current position, for a strategy to
    /// abort the parse with.
    #[must_use]
    pub fn fatal(&self) -> FatalError {
        let rule = match self.rule_stack.last() {
            Some(id) => self.grammar.name(*id).to_string(),
            None => "<anonymous>".to_string(),
        };
        FatalError {
            rule,
            position: self.cursor.position(),
            state_frames: self.states.frame_types(),
        }
    }

    /// Match a named rule: strategy override if one is bound, the standard
    /// algorithm otherwise.
    pub(crate) fn match_rule(&mut self, id: RuleId) -> Result<bool, FatalError> {
        let table = self.actions;
        if let Some(strategy) = table.strategy_for(id) {
            let strategy = Arc::clone(strategy);
            self.rule_stack.push(id);
            let result = strategy.attempt(id, self);
            self.rule_stack.pop();
            return result;
        }
        self.match_default(id)
    }

    /// The standard match algorithm for a named rule, ignoring any
    /// strategy override: match the body, rewind on failure, and on an
    /// action-enabled success invoke the bound action with the matched
    /// span, treating a veto as a local failure.
    ///
    /// # Errors
    ///
    /// Returns [`FatalError`] if the body raised one.
    pub fn match_default(&mut self, id: RuleId) -> Result<bool, FatalError> {
        let mark = self.cursor.mark();
        if !self.match_body(id)? {
            self.cursor.restore(mark);
            return Ok(false);
        }
        if !self.invoke_binding(id, mark.offset()) {
            self.cursor.restore(mark);
            return Ok(false);
        }
        Ok(true)
    }

    /// Match a rule's body expression alone: no rewind on failure, no
    /// action invocation. A strategy composing its own protocol from
    /// this takes over both obligations.
    ///
    /// # Errors
    ///
    /// Returns [`FatalError`] if the body raised one.
    pub fn match_body(&mut self, id: RuleId) -> Result<bool, FatalError> {
        let grammar = self.grammar;
        let def = grammar
            .get(id)
            .expect("rule references are validated at grammar build");
        self.rule_stack.push(id);
        let result = self.match_expr(&def.expr);
        self.rule_stack.pop();
        result
    }

    /// Invoke the action bound to `rule` over the bytes from `start` to
    /// the current offset. Returns `false` only on an action veto; no
    /// binding, or actions currently suppressed, keep the match.
    pub fn invoke_binding(&mut self, rule: RuleId, start: usize) -> bool {
        if !matches!(self.apply, ApplyMode::Action) {
            return true;
        }
        let table = self.actions;
        match table.binding(rule) {
            Some(binding) => {
                let span = MatchSpan::new(self.cursor.buffer(), start, self.cursor.offset());
                binding.invoke(&span, self.states)
            }
            None => true,
        }
    }

    pub(crate) fn match_expr(&mut self, expr: &'p RuleExpr) -> Result<bool, FatalError> {
        match expr {
            RuleExpr::Seq(exprs) => {
                let mark = self.cursor.mark();
                for child in exprs {
                    if !self.match_expr(child)? {
                        self.cursor.restore(mark);
                        return Ok(false);
                    }
                }
                Ok(true)
            }

            RuleExpr::Choice(exprs) => {
                for alt in exprs {
                    let mark = self.cursor.mark();
                    if self.match_expr(alt)? {
                        // Committed: later alternatives are never tried.
                        return Ok(true);
                    }
                    self.cursor.restore(mark);
                }
                Ok(false)
            }

            RuleExpr::Repeat { expr, min, max } => {
                let loop_mark = self.cursor.mark();
                let mut count = 0usize;
                loop {
                    if max.is_some_and(|m| count >= m) {
                        break;
                    }
                    let iter_mark = self.cursor.mark();
                    if !self.match_expr(expr)? {
                        self.cursor.restore(iter_mark);
                        break;
                    }
                    count += 1;
                    // A zero-width success would loop forever.
                    if self.cursor.offset() == iter_mark.offset() {
                        break;
                    }
                }
                if count >= *min {
                    Ok(true)
                } else {
                    self.cursor.restore(loop_mark);
                    Ok(false)
                }
            }

            RuleExpr::Lookahead { positive, expr } => {
                let mark = self.cursor.mark();
                let saved = std::mem::replace(&mut self.apply, ApplyMode::Nothing);
                let result = self.match_expr(expr);
                self.apply = saved;
                // A fatal inside the probe keeps its abort position.
                let matched = result?;
                self.cursor.restore(mark);
                Ok(if *positive { matched } else { !matched })
            }

            RuleExpr::Must(expr) => {
                if self.match_expr(expr)? {
                    Ok(true)
                } else {
                    Err(self.fatal())
                }
            }

            RuleExpr::Disable(expr) => {
                let saved = std::mem::replace(&mut self.apply, ApplyMode::Nothing);
                let result = self.match_expr(expr);
                self.apply = saved;
                result
            }

            RuleExpr::Enable(expr) => {
                let saved = std::mem::replace(&mut self.apply, self.root_apply);
                let result = self.match_expr(expr);
                self.apply = saved;
                result
            }

            RuleExpr::WithActions { actions, expr } => {
                let saved = std::mem::replace(&mut self.actions, &**actions);
                let result = self.match_expr(expr);
                self.actions = saved;
                result
            }

            RuleExpr::Scope { hook, expr } => {
                hook.enter(&self.cursor, self.states);
                match self.match_expr(expr) {
                    Ok(true) if matches!(self.apply, ApplyMode::Action) => {
                        hook.fold(&self.cursor, self.states);
                        Ok(true)
                    }
                    Ok(matched) => {
                        hook.discard(self.states);
                        Ok(matched)
                    }
                    Err(err) => {
                        hook.discard(self.states);
                        Err(err)
                    }
                }
            }

            RuleExpr::Leaf(matcher) => match matcher.match_len(self.cursor.rest()) {
                Some(len) => {
                    self.cursor.advance(len);
                    Ok(true)
                }
                None => Ok(false),
            },

            RuleExpr::Rule(id) => self.match_rule(*id),
        }
    }
}
