//! # Static Grammar Analysis
//!
//! Grammar-shape analysis run at construction time, before any input is
//! parsed.
//!
//! The analyzer builds a directed graph whose nodes are the grammar's
//! named rules and whose edges connect a rule to each rule reachable from
//! its body *without first requiring another child to consume input*:
//!
//! - `Seq` contributes only its first child;
//! - `Choice` contributes every alternative;
//! - `Repeat`, `Lookahead`, `Must`, `Disable`, `Enable`, `WithActions`,
//!   and `Scope` contribute their single child;
//! - `Leaf` contributes nothing.
//!
//! Every edge is zero-consumption by construction, so any strongly
//! connected component containing a cycle is unguarded left recursion: a
//! parse entering it could recurse forever without advancing the cursor.
//! This is reported as a [`GrammarError`] independent of input.

use crate::error::GrammarError;
use crate::grammar::{Grammar, RuleExpr, RuleId};
use hashbrown::HashMap;
use smallvec::SmallVec;

/// A cycle of named rules reachable without consuming input.
#[derive(Debug, Clone)]
pub struct RecursionCycle {
    /// The rules in the cycle, in discovery order.
    pub nodes: SmallVec<[RuleId; 4]>,
}

impl RecursionCycle {
    /// Whether the cycle is direct (a rule reaching itself immediately).
    #[must_use]
    pub fn is_direct(&self) -> bool {
        self.nodes.len() == 1
    }
}

/// Zero-consumption reachability analyzer over a grammar's rule tree.
pub struct StaticAnalyzer<'g> {
    grammar: &'g Grammar,
}

impl<'g> StaticAnalyzer<'g> {
    /// Create an analyzer over `grammar`.
    #[must_use]
    pub const fn new(grammar: &'g Grammar) -> Self {
        Self { grammar }
    }

    /// Check the grammar shape, turning the first detected cycle into a
    /// construction-time error.
    ///
    /// # Errors
    ///
    /// Returns [`GrammarError::LeftRecursion`] if any unguarded cycle
    /// exists.
    pub fn check(&self) -> Result<(), GrammarError> {
        let cycles = self.find_unguarded_recursion();
        if let Some(cycle) = cycles.first() {
            let mut names: Vec<String> = cycle
                .nodes
                .iter()
                .map(|id| self.grammar.name(*id).to_string())
                .collect();
            // Close the loop for readability.
            if let Some(first) = names.first().cloned() {
                names.push(first);
            }
            return Err(GrammarError::LeftRecursion { cycle: names });
        }
        Ok(())
    }

    /// Find every unguarded left-recursion cycle, as the strongly
    /// connected components of the zero-consumption graph that contain a
    /// cycle.
    #[must_use]
    pub fn find_unguarded_recursion(&self) -> Vec<RecursionCycle> {
        let edges = self.zero_consumption_edges();
        Tarjan::new(&edges).cycles()
    }

    fn zero_consumption_edges(&self) -> HashMap<RuleId, Vec<RuleId>, ahash::RandomState> {
        let mut edges: HashMap<RuleId, Vec<RuleId>, ahash::RandomState> = HashMap::default();
        for (id, def) in self.grammar.rules() {
            let mut targets = Vec::new();
            collect_zero_reachable(&def.expr, &mut targets);
            edges.insert(id, targets);
        }
        edges
    }
}

/// Collect the named rules reachable from `expr` without any prior input
/// consumption.
fn collect_zero_reachable(expr: &RuleExpr, out: &mut Vec<RuleId>) {
    match expr {
        RuleExpr::Seq(exprs) => {
            if let Some(first) = exprs.first() {
                collect_zero_reachable(first, out);
            }
        }
        RuleExpr::Choice(exprs) => {
            for alt in exprs {
                collect_zero_reachable(alt, out);
            }
        }
        RuleExpr::Repeat { expr, .. }
        | RuleExpr::Lookahead { expr, .. }
        | RuleExpr::Must(expr)
        | RuleExpr::Disable(expr)
        | RuleExpr::Enable(expr)
        | RuleExpr::WithActions { expr, .. }
        | RuleExpr::Scope { expr, .. } => collect_zero_reachable(expr, out),
        RuleExpr::Rule(id) => out.push(*id),
        RuleExpr::Leaf(_) => {}
    }
}

/// Tarjan's strongly-connected-components algorithm over the rule graph.
struct Tarjan<'a> {
    edges: &'a HashMap<RuleId, Vec<RuleId>, ahash::RandomState>,
    index: HashMap<RuleId, usize, ahash::RandomState>,
    lowlink: HashMap<RuleId, usize, ahash::RandomState>,
    on_stack: HashMap<RuleId, bool, ahash::RandomState>,
    stack: Vec<RuleId>,
    next_index: usize,
    cycles: Vec<RecursionCycle>,
}

impl<'a> Tarjan<'a> {
    fn new(edges: &'a HashMap<RuleId, Vec<RuleId>, ahash::RandomState>) -> Self {
        Self {
            edges,
            index: HashMap::default(),
            lowlink: HashMap::default(),
            on_stack: HashMap::default(),
            stack: Vec::new(),
            next_index: 0,
            cycles: Vec::new(),
        }
    }

    fn cycles(mut self) -> Vec<RecursionCycle> {
        let roots: Vec<RuleId> = self.edges.keys().copied().collect();
        for id in roots {
            if !self.index.contains_key(&id) {
                self.strongconnect(id);
            }
        }
        self.cycles
    }

    fn strongconnect(&mut self, v: RuleId) {
        self.index.insert(v, self.next_index);
        self.lowlink.insert(v, self.next_index);
        self.next_index += 1;
        self.stack.push(v);
        self.on_stack.insert(v, true);

        let successors = self.edges.get(&v).cloned().unwrap_or_default();
        for w in successors {
            if !self.index.contains_key(&w) {
                self.strongconnect(w);
                let low_w = self.lowlink[&w];
                let low_v = self.lowlink[&v];
                self.lowlink.insert(v, low_v.min(low_w));
            } else if self.on_stack.get(&w).copied().unwrap_or(false) {
                let idx_w = self.index[&w];
                let low_v = self.lowlink[&v];
                self.lowlink.insert(v, low_v.min(idx_w));
            }
        }

        if self.lowlink[&v] == self.index[&v] {
            let mut component: SmallVec<[RuleId; 4]> = SmallVec::new();
            loop {
                let w = match self.stack.pop() {
                    Some(w) => w,
                    None => break,
                };
                self.on_stack.insert(w, false);
                component.push(w);
                if w == v {
                    break;
                }
            }
            component.reverse();

            let has_self_loop = component.len() == 1
                && self
                    .edges
                    .get(&component[0])
                    .is_some_and(|succ| succ.contains(&component[0]));
            if component.len() > 1 || has_self_loop {
                self.cycles.push(RecursionCycle { nodes: component });
            }
        }
    }
}
