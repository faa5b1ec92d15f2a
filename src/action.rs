//! # Action Bindings
//!
//! The registry mapping rule identity to behavior.
//!
//! An [`ActionTable`] holds at most one [`ActionBinding`] and at most one
//! custom [`MatchStrategy`](crate::engine::MatchStrategy) per named rule.
//! Lookup is by [`RuleId`] — nominal identity, never structural equality
//! of the combinator tree. The default for every rule is no binding and
//! the standard match algorithm.
//!
//! Actions run only when a rule matches and actions are currently
//! enabled. An action's `false` outcome vetoes the match: the dispatcher
//! rewinds to the rule's start offset and reports an ordinary local
//! failure, indistinguishable from the rule's own matcher failing.

use crate::engine::MatchStrategy;
use crate::grammar::RuleId;
use crate::input::MatchSpan;
use crate::state::StateChain;
use hashbrown::HashMap;
use std::sync::Arc;

type ApplyFn = Arc<dyn Fn(&MatchSpan<'_>, &mut StateChain) -> bool + Send + Sync>;
type Apply0Fn = Arc<dyn Fn(&mut StateChain) -> bool + Send + Sync>;

/// Behavior bound to one rule.
#[derive(Clone)]
pub enum ActionBinding {
    /// Invoked with the span of the bytes the rule just matched.
    Apply(ApplyFn),
    /// Invoked without a span, for actions that only touch state.
    Apply0(Apply0Fn),
}

impl ActionBinding {
    pub(crate) fn invoke(&self, span: &MatchSpan<'_>, states: &mut StateChain) -> bool {
        match self {
            Self::Apply(f) => f(span, states),
            Self::Apply0(f) => f(states),
        }
    }
}

impl std::fmt::Debug for ActionBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Apply(_) => f.write_str("Apply"),
            Self::Apply0(_) => f.write_str("Apply0"),
        }
    }
}

/// Registry of action bindings and match-strategy overrides, keyed by
/// rule identity.
///
/// Assembled once alongside a grammar; rebound for a subtree by the
/// [`with_actions`](crate::grammar::RuleExpr::with_actions) combinator.
#[derive(Default, Clone)]
pub struct ActionTable {
    bindings: HashMap<RuleId, ActionBinding, ahash::RandomState>,
    strategies: HashMap<RuleId, Arc<dyn MatchStrategy>, ahash::RandomState>,
}

impl ActionTable {
    /// Create an empty table: every rule defaults to no action.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind an infallible action receiving the matched span. The match is
    /// always kept.
    pub fn apply(
        &mut self,
        rule: RuleId,
        f: impl Fn(&MatchSpan<'_>, &mut StateChain) + Send + Sync + 'static,
    ) -> &mut Self {
        self.bindings.insert(
            rule,
            ActionBinding::Apply(Arc::new(move |span, states| {
                f(span, states);
                true
            })),
        );
        self
    }

    /// Bind a vetoing action receiving the matched span. Returning `false`
    /// converts the match into a local failure.
    pub fn try_apply(
        &mut self,
        rule: RuleId,
        f: impl Fn(&MatchSpan<'_>, &mut StateChain) -> bool + Send + Sync + 'static,
    ) -> &mut Self {
        self.bindings
            .insert(rule, ActionBinding::Apply(Arc::new(f)));
        self
    }

    /// Bind an infallible span-less action.
    pub fn apply0(
        &mut self,
        rule: RuleId,
        f: impl Fn(&mut StateChain) + Send + Sync + 'static,
    ) -> &mut Self {
        self.bindings.insert(
            rule,
            ActionBinding::Apply0(Arc::new(move |states| {
                f(states);
                true
            })),
        );
        self
    }

    /// Bind a vetoing span-less action.
    pub fn try_apply0(
        &mut self,
        rule: RuleId,
        f: impl Fn(&mut StateChain) -> bool + Send + Sync + 'static,
    ) -> &mut Self {
        self.bindings
            .insert(rule, ActionBinding::Apply0(Arc::new(f)));
        self
    }

    /// Replace the default match algorithm for one rule.
    ///
    /// The strategy alone becomes responsible for correct rewind and
    /// action invocation for that rule.
    pub fn strategy(&mut self, rule: RuleId, s: impl MatchStrategy + 'static) -> &mut Self {
        self.strategies.insert(rule, Arc::new(s));
        self
    }

    /// The binding for a rule, if any.
    #[must_use]
    pub fn binding(&self, rule: RuleId) -> Option<&ActionBinding> {
        self.bindings.get(&rule)
    }

    /// The strategy override for a rule, if any.
    #[must_use]
    pub fn strategy_for(&self, rule: RuleId) -> Option<&Arc<dyn MatchStrategy>> {
        self.strategies.get(&rule)
    }

    /// Number of bound actions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Whether the table binds nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty() && self.strategies.is_empty()
    }
}

impl std::fmt::Debug for ActionTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionTable")
            .field("bindings", &self.bindings.len())
            .field("strategies", &self.strategies.len())
            .finish()
    }
}
