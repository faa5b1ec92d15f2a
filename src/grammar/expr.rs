//! Combinator expression tree.
//!
//! [`RuleExpr`] is the tagged variant over the engine's combinator kinds.
//! Trees are built once, before any parsing, and are immutable and shared
//! for the life of the grammar. Rule identity is nominal: only a
//! [`RuleExpr::Rule`] reference to a declared name participates in action
//! dispatch and static analysis; structurally identical subtrees under
//! different names are distinct.

use crate::action::ActionTable;
use crate::grammar::{LeafMatcher, RuleId};
use crate::state::ScopeHook;
use std::sync::Arc;

/// One grammar tree node.
#[derive(Clone)]
pub enum RuleExpr {
    /// Match every child in declared order; any child failure rewinds to
    /// the pre-sequence snapshot.
    Seq(Vec<RuleExpr>),
    /// Ordered choice: the first alternative to succeed wins and commits;
    /// later alternatives are never attempted.
    Choice(Vec<RuleExpr>),
    /// Repeat the child greedily. Succeeds iff at least `min` iterations
    /// match; `max: None` means unbounded.
    Repeat {
        expr: Box<RuleExpr>,
        min: usize,
        max: Option<usize>,
    },
    /// Zero-width check: attempt the child with actions suppressed,
    /// always rewind, and report the child's outcome (`positive`) or its
    /// negation.
    Lookahead { positive: bool, expr: Box<RuleExpr> },
    /// Escalate the child's local failure to a fatal, parse-aborting one.
    Must(Box<RuleExpr>),
    /// Match the child with actions suppressed for the subtree.
    Disable(Box<RuleExpr>),
    /// Match the child with the apply mode restored to whatever was
    /// active when the top-level parse started.
    Enable(Box<RuleExpr>),
    /// Match the child with a different action table bound for the
    /// subtree.
    WithActions {
        actions: Arc<ActionTable>,
        expr: Box<RuleExpr>,
    },
    /// Match the child with fresh scope state: the hook constructs new
    /// state-chain frames on entry and folds them into the prior chain
    /// only on a successful, action-enabled exit.
    Scope {
        hook: Arc<dyn ScopeHook>,
        expr: Box<RuleExpr>,
    },
    /// Terminal matcher against raw input.
    Leaf(LeafMatcher),
    /// Reference to a named rule; the dispatch point for actions.
    Rule(RuleId),
}

impl RuleExpr {
    /// Sequence of expressions, in match order.
    #[must_use]
    pub fn seq<I>(exprs: I) -> Self
    where
        I: IntoIterator<Item = Self>,
    {
        Self::Seq(exprs.into_iter().collect())
    }

    /// Ordered choice over alternatives.
    #[must_use]
    pub fn choice<I>(exprs: I) -> Self
    where
        I: IntoIterator<Item = Self>,
    {
        Self::Choice(exprs.into_iter().collect())
    }

    /// Repeat `expr` between `min` and `max` times (`None` = unbounded).
    #[must_use]
    pub fn repeat(expr: Self, min: usize, max: Option<usize>) -> Self {
        Self::Repeat {
            expr: Box::new(expr),
            min,
            max,
        }
    }

    /// Zero or one occurrence.
    #[must_use]
    pub fn opt(expr: Self) -> Self {
        Self::repeat(expr, 0, Some(1))
    }

    /// Zero or more occurrences.
    #[must_use]
    pub fn star(expr: Self) -> Self {
        Self::repeat(expr, 0, None)
    }

    /// One or more occurrences.
    #[must_use]
    pub fn plus(expr: Self) -> Self {
        Self::repeat(expr, 1, None)
    }

    /// Positive lookahead: succeed iff `expr` matches here, consuming
    /// nothing and firing no actions.
    #[must_use]
    pub fn at(expr: Self) -> Self {
        Self::Lookahead {
            positive: true,
            expr: Box::new(expr),
        }
    }

    /// Negative lookahead: succeed iff `expr` does not match here.
    #[must_use]
    pub fn not_at(expr: Self) -> Self {
        Self::Lookahead {
            positive: false,
            expr: Box::new(expr),
        }
    }

    /// Declare `expr` the only grammatically valid continuation: its
    /// local failure aborts the parse.
    #[must_use]
    pub fn must(expr: Self) -> Self {
        Self::Must(Box::new(expr))
    }

    /// Suppress actions for the subtree.
    #[must_use]
    pub fn disable(expr: Self) -> Self {
        Self::Disable(Box::new(expr))
    }

    /// Restore the top-level apply mode for the subtree.
    #[must_use]
    pub fn enable(expr: Self) -> Self {
        Self::Enable(Box::new(expr))
    }

    /// Rebind the action table consulted for the subtree.
    #[must_use]
    pub fn with_actions(actions: Arc<ActionTable>, expr: Self) -> Self {
        Self::WithActions {
            actions,
            expr: Box::new(expr),
        }
    }

    /// Wrap the subtree in a state scope.
    #[must_use]
    pub fn scope(hook: impl ScopeHook + 'static, expr: Self) -> Self {
        Self::Scope {
            hook: Arc::new(hook),
            expr: Box::new(expr),
        }
    }

    /// Reference a named rule.
    #[must_use]
    pub const fn rule(id: RuleId) -> Self {
        Self::Rule(id)
    }

    /// Arbitrary leaf matcher.
    #[must_use]
    pub const fn leaf(matcher: LeafMatcher) -> Self {
        Self::Leaf(matcher)
    }

    /// Fixed byte-string leaf.
    #[must_use]
    pub fn literal(text: impl AsRef<str>) -> Self {
        Self::Leaf(LeafMatcher::Literal(text.as_ref().into()))
    }

    /// Any single byte.
    #[must_use]
    pub const fn any_byte() -> Self {
        Self::Leaf(LeafMatcher::AnyByte)
    }

    /// A single byte in `lo..=hi`.
    #[must_use]
    pub const fn byte_range(lo: u8, hi: u8) -> Self {
        Self::Leaf(LeafMatcher::ByteRange { lo, hi })
    }

    /// A single byte from `set`.
    #[must_use]
    pub fn one_of(set: impl IntoIterator<Item = u8>) -> Self {
        Self::Leaf(LeafMatcher::OneOf(set.into_iter().collect()))
    }

    /// End of input, zero-width.
    #[must_use]
    pub const fn eof() -> Self {
        Self::Leaf(LeafMatcher::Eof)
    }

    /// Named predicate leaf.
    #[must_use]
    pub fn pred(
        name: &'static str,
        matcher: impl Fn(&[u8]) -> Option<usize> + Send + Sync + 'static,
    ) -> Self {
        Self::Leaf(LeafMatcher::Predicate {
            name,
            matcher: Arc::new(matcher),
        })
    }

    /// Collect every named-rule reference in this expression, at any
    /// depth.
    pub(crate) fn referenced_rules(&self, out: &mut Vec<RuleId>) {
        match self {
            Self::Seq(exprs) | Self::Choice(exprs) => {
                for expr in exprs {
                    expr.referenced_rules(out);
                }
            }
            Self::Repeat { expr, .. }
            | Self::Lookahead { expr, .. }
            | Self::Must(expr)
            | Self::Disable(expr)
            | Self::Enable(expr)
            | Self::WithActions { expr, .. }
            | Self::Scope { expr, .. } => expr.referenced_rules(out),
            Self::Rule(id) => out.push(*id),
            Self::Leaf(_) => {}
        }
    }
}

impl std::fmt::Debug for RuleExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Seq(exprs) => f.debug_tuple("Seq").field(exprs).finish(),
            Self::Choice(exprs) => f.debug_tuple("Choice").field(exprs).finish(),
            Self::Repeat { expr, min, max } => f
                .debug_struct("Repeat")
                .field("expr", expr)
                .field("min", min)
                .field("max", max)
                .finish(),
            Self::Lookahead { positive, expr } => f
                .debug_struct("Lookahead")
                .field("positive", positive)
                .field("expr", expr)
                .finish(),
            Self::Must(expr) => f.debug_tuple("Must").field(expr).finish(),
            Self::Disable(expr) => f.debug_tuple("Disable").field(expr).finish(),
            Self::Enable(expr) => f.debug_tuple("Enable").field(expr).finish(),
            Self::WithActions { expr, .. } => f.debug_tuple("WithActions").field(expr).finish(),
            Self::Scope { expr, .. } => f.debug_tuple("Scope").field(expr).finish(),
            Self::Leaf(matcher) => f.debug_tuple("Leaf").field(matcher).finish(),
            Self::Rule(id) => f.debug_tuple("Rule").field(id).finish(),
        }
    }
}
