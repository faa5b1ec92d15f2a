//! # Grammar Definition
//!
//! Programmatic grammar construction: there is no runtime grammar-text
//! interpreter. A grammar is composed once from [`RuleExpr`] combinators
//! under named rules, validated by the static analyzer at
//! [`GrammarBuilder::build`], and then shared read-only across parses.
//!
//! ## Usage
//!
//! ```rust
//! use pegcore::grammar::{GrammarBuilder, RuleExpr};
//!
//! let mut builder = GrammarBuilder::new();
//! let digit = builder.rule("digit", RuleExpr::byte_range(b'0', b'9'));
//! let number = builder.rule("number", RuleExpr::plus(RuleExpr::rule(digit)));
//! let grammar = builder.build().expect("grammar is well-shaped");
//! assert_eq!(grammar.name(number), "number");
//! ```
//!
//! Recursive rules are declared first and defined later:
//!
//! ```rust
//! use pegcore::grammar::{GrammarBuilder, RuleExpr};
//!
//! let mut builder = GrammarBuilder::new();
//! let value = builder.declare("value");
//! let list = builder.rule(
//!     "list",
//!     RuleExpr::seq([
//!         RuleExpr::literal("("),
//!         RuleExpr::star(RuleExpr::rule(value)),
//!         RuleExpr::literal(")"),
//!     ]),
//! );
//! builder.define(value, RuleExpr::choice([
//!     RuleExpr::byte_range(b'0', b'9'),
//!     RuleExpr::rule(list),
//! ])).unwrap();
//! let grammar = builder.build().unwrap();
//! # let _ = grammar;
//! ```

pub mod expr;
pub mod leaf;

pub use expr::RuleExpr;
pub use leaf::LeafMatcher;

use crate::analysis::StaticAnalyzer;
use crate::error::GrammarError;
use hashbrown::HashMap;
use lasso::{Rodeo, RodeoReader, Spur};

/// Identity token for a named rule.
///
/// Identity is nominal: the id wraps the rule's interned name, so two
/// structurally identical definitions under different names are distinct
/// registry keys for actions, strategies, and analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RuleId(pub(crate) Spur);

/// A named rule definition.
#[derive(Debug, Clone)]
pub struct RuleDef {
    /// The rule's combinator tree.
    pub expr: RuleExpr,
}

/// An immutable, compiled grammar.
///
/// Built once by [`GrammarBuilder`], persisting for the process; `Send +
/// Sync`, so independent parses on separate threads may share it
/// read-only.
pub struct Grammar {
    rules: HashMap<RuleId, RuleDef, ahash::RandomState>,
    interner: RodeoReader,
}

impl Grammar {
    /// The definition of a rule.
    #[must_use]
    pub fn get(&self, id: RuleId) -> Option<&RuleDef> {
        self.rules.get(&id)
    }

    /// The declared name of a rule.
    #[must_use]
    pub fn name(&self, id: RuleId) -> &str {
        self.interner.resolve(&id.0)
    }

    /// Look a rule up by name.
    #[must_use]
    pub fn rule_id(&self, name: &str) -> Option<RuleId> {
        let spur = self.interner.get(name)?;
        let id = RuleId(spur);
        self.rules.contains_key(&id).then_some(id)
    }

    /// Number of named rules.
    #[must_use]
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Iterate over all named rules.
    pub fn rules(&self) -> impl Iterator<Item = (RuleId, &RuleDef)> {
        self.rules.iter().map(|(id, def)| (*id, def))
    }
}

impl std::fmt::Debug for Grammar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&str> = self.rules.keys().map(|id| self.name(*id)).collect();
        names.sort_unstable();
        f.debug_struct("Grammar").field("rules", &names).finish()
    }
}

/// Builder for [`Grammar`].
///
/// `build` runs the static analyzer: declared-but-undefined rules and
/// unguarded left recursion are construction-time errors, reported before
/// any parse executes and independent of input.
#[derive(Default)]
pub struct GrammarBuilder {
    rules: HashMap<RuleId, RuleDef, ahash::RandomState>,
    interner: Rodeo,
    declared: Vec<RuleId>,
}

impl GrammarBuilder {
    /// Create an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a rule name without defining it yet, for forward and
    /// recursive references. Declaring the same name twice yields the
    /// same id.
    pub fn declare(&mut self, name: &str) -> RuleId {
        let id = RuleId(self.interner.get_or_intern(name));
        if !self.declared.contains(&id) {
            self.declared.push(id);
        }
        id
    }

    /// Define a previously declared rule.
    ///
    /// # Errors
    ///
    /// Returns [`GrammarError::DuplicateRule`] if the rule is already
    /// defined.
    pub fn define(&mut self, id: RuleId, expr: RuleExpr) -> Result<(), GrammarError> {
        if self.rules.contains_key(&id) {
            return Err(GrammarError::DuplicateRule {
                name: self.interner.resolve(&id.0).to_string(),
            });
        }
        self.rules.insert(id, RuleDef { expr });
        Ok(())
    }

    /// Declare and define a rule in one step.
    ///
    /// # Panics
    ///
    /// Panics if the name is already defined; use [`declare`](Self::declare)
    /// plus [`define`](Self::define) when redefinition is a possibility to
    /// handle.
    pub fn rule(&mut self, name: &str, expr: RuleExpr) -> RuleId {
        let id = self.declare(name);
        assert!(
            !self.rules.contains_key(&id),
            "rule '{name}' is defined more than once"
        );
        self.rules.insert(id, RuleDef { expr });
        id
    }

    /// Validate and freeze the grammar.
    ///
    /// # Errors
    ///
    /// - [`GrammarError::UndefinedRule`] for a declared or referenced rule
    ///   with no definition.
    /// - [`GrammarError::LeftRecursion`] for a cycle of named rules
    ///   reachable without consuming input.
    pub fn build(self) -> Result<Grammar, GrammarError> {
        // Every declared or referenced id must have a definition.
        let mut referenced: Vec<RuleId> = self.declared.clone();
        for def in self.rules.values() {
            def.expr.referenced_rules(&mut referenced);
        }
        for id in referenced {
            if !self.rules.contains_key(&id) {
                return Err(GrammarError::UndefinedRule {
                    name: self.interner.resolve(&id.0).to_string(),
                });
            }
        }

        let grammar = Grammar {
            rules: self.rules,
            interner: self.interner.into_reader(),
        };
        StaticAnalyzer::new(&grammar).check()?;
        Ok(grammar)
    }
}
