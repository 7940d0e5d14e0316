//! Labeling and selection: the matcher contract and the data-driven
//! matching engine.
//!
//! Matching a tree is a two-phase process:
//!
//! - **label**: a bottom-up pass that records, at every node, the
//!   cheapest rule achieving each reachable non-terminal (with
//!   single-hop chain-rule propagation). Labeling never fails by
//!   itself.
//! - **select**: a top-down pass that, given the goal non-terminal at
//!   the root, applies the winning rules' actions in cost-optimal
//!   order. Selection fails if the root does not reach the goal.
//!
//! [`TreeMatcher`] captures the contract every matcher exhibits; the
//! generic drivers (`label`, `select`, `rewrite`) are provided
//! methods over a small required core. [`RuleMatcher`] implements
//! the core by interpreting a [`BurgSystem`] directly; matchers
//! emitted by the code generator implement it with straight-line
//! per-terminal code.

use crate::pattern::{compute_kids, structural_match, CompiledPattern, Pattern};
use crate::rule::BurgSystem;
use crate::tree::{RuleNr, State, Tree};
use rustc_hash::FxHashMap;
use std::rc::Rc;
use thiserror::Error;

/// Errors raised during selection.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MatchError {
    #[error("tree {0} not covered")]
    Uncovered(String),
}

impl MatchError {
    pub(crate) fn uncovered(tree: &Tree) -> Self {
        MatchError::Uncovered(tree.to_string())
    }
}

/// The contract of a matcher: the specialized per-node labeling step
/// and the per-rule dispatch tables, plus the generic label/select
/// drivers as provided methods.
pub trait TreeMatcher {
    /// Result type produced by rule actions.
    type Res;

    /// The category the root of a matched tree must satisfy.
    fn goal(&self) -> Rc<str>;

    /// Compute a fresh [`State`] for one node whose children are
    /// already labeled.
    fn state_node(&self, tree: &mut Tree);

    /// The subtrees filling a rule's holes at `tree`, in action
    /// argument order. For a chain rule this is the node itself.
    fn kids<'t>(&self, tree: &'t Tree, rule: RuleNr) -> Vec<&'t Tree>;

    /// The non-terminal each of a rule's holes must satisfy.
    fn nts(&self, rule: RuleNr) -> Vec<Rc<str>>;

    /// Invoke a rule's action with the node and the hole results.
    fn action(&mut self, tree: &Tree, rule: RuleNr, args: Vec<Self::Res>) -> Self::Res;

    /// Bottom-up labeling pass: children fully labeled before their
    /// parent. Never fails.
    fn label(&self, tree: &mut Tree) {
        for child in tree.children.iter_mut() {
            self.label(child);
        }
        self.state_node(tree);
    }

    /// Top-down cost-optimal application: look up the winning rule
    /// for `nt` at this node, select each of its holes recursively,
    /// then invoke the rule's action.
    fn select(&mut self, tree: &Tree, nt: &str) -> Result<Self::Res, MatchError> {
        let rule = tree
            .state
            .get_rule(nt)
            .ok_or_else(|| MatchError::uncovered(tree))?;
        let kids = self.kids(tree, rule);
        let nts = self.nts(rule);
        let mut args = Vec::with_capacity(kids.len());
        for (kid, nt) in kids.into_iter().zip(nts.iter()) {
            args.push(self.select(kid, nt)?);
        }
        Ok(self.action(tree, rule, args))
    }

    /// Label the tree, check that the root reaches the goal, then
    /// select. Re-running on an unchanged tree is idempotent.
    fn rewrite(&mut self, tree: &mut Tree) -> Result<Self::Res, MatchError> {
        self.label(tree);
        let goal = self.goal();
        if !tree.state.has_goal(&goal) {
            return Err(MatchError::uncovered(tree));
        }
        self.select(tree, &goal)
    }
}

/// Acceptance predicate: an opaque side condition over node contents.
pub type AcceptFn = Box<dyn Fn(&Tree) -> bool>;

/// Rule action: combines a node with its hole results.
pub type ActionFn<R> = Box<dyn FnMut(&Tree, Vec<R>) -> R>;

/// The data-driven matching engine: interprets a frozen rule system,
/// with acceptance predicates and actions registered as closures per
/// rule sequence number.
pub struct RuleMatcher<'s, R> {
    system: &'s BurgSystem,
    /// Per-rule hole extraction, indexed by rule position.
    compiled: Vec<CompiledPattern>,
    /// Terminal name -> ordinary rule indices, declaration order.
    by_root: FxHashMap<Rc<str>, Vec<usize>>,
    acceptors: FxHashMap<RuleNr, AcceptFn>,
    actions: FxHashMap<RuleNr, ActionFn<R>>,
}

impl<'s, R> RuleMatcher<'s, R> {
    pub fn new(system: &'s BurgSystem) -> Self {
        let compiled = system
            .rules()
            .iter()
            .map(|r| compute_kids(&r.pattern))
            .collect();

        let mut by_root: FxHashMap<Rc<str>, Vec<usize>> = FxHashMap::default();
        for (i, rule) in system.rules().iter().enumerate() {
            if let Pattern::Term { name, .. } = &rule.pattern {
                by_root.entry(name.clone()).or_default().push(i);
            }
        }

        RuleMatcher {
            system,
            compiled,
            by_root,
            acceptors: FxHashMap::default(),
            actions: FxHashMap::default(),
        }
    }

    /// Register an acceptance predicate for a rule.
    pub fn register_acceptance(&mut self, nr: RuleNr, accept: impl Fn(&Tree) -> bool + 'static) {
        self.acceptors.insert(nr, Box::new(accept));
    }

    /// Register the action for a rule.
    pub fn register_action(&mut self, nr: RuleNr, action: impl FnMut(&Tree, Vec<R>) -> R + 'static) {
        self.actions.insert(nr, Box::new(action));
    }

    /// The per-node labeling step: try every ordinary rule rooted at
    /// this node's terminal, in declaration order, recording
    /// improvements and propagating chain rules one hop.
    fn label_node(&self, tree: &mut Tree) {
        tree.state = State::new();
        let indices = match self.by_root.get(tree.name.as_ref()) {
            Some(indices) => indices,
            None => return,
        };
        for &i in indices {
            let rule = &self.system.rules()[i];
            if !structural_match(&rule.pattern, tree) {
                continue;
            }
            if let Some(accept) = self.acceptors.get(&rule.nr) {
                if !accept(tree) {
                    continue;
                }
            }

            // Every hole's addressed child must already reach the
            // required category; the candidate cost sums their best
            // costs on top of the rule's own.
            let compiled = &self.compiled[i];
            let mut cost = rule.cost;
            let mut applies = true;
            for (path, nt) in compiled.paths.iter().zip(compiled.nts.iter()) {
                match tree.at_path(path).and_then(|kid| kid.state.get_cost(nt)) {
                    Some(c) => cost += c,
                    None => {
                        applies = false;
                        break;
                    }
                }
            }
            if !applies {
                continue;
            }

            tree.state.set_cost(&rule.non_term, cost, rule.nr);

            // Single-hop chain propagation: applied once per direct
            // rule match, never iterated to a fixpoint.
            for &ci in self.system.chain_rules(&rule.non_term) {
                let chain = &self.system.rules()[ci];
                tree.state.set_cost(&chain.non_term, cost + chain.cost, chain.nr);
            }
        }
    }
}

impl<'s, R> TreeMatcher for RuleMatcher<'s, R> {
    type Res = R;

    fn goal(&self) -> Rc<str> {
        self.system.goal().clone()
    }

    fn state_node(&self, tree: &mut Tree) {
        self.label_node(tree);
    }

    fn kids<'t>(&self, tree: &'t Tree, rule: RuleNr) -> Vec<&'t Tree> {
        self.compiled[(rule - 1) as usize]
            .paths
            .iter()
            .filter_map(|path| tree.at_path(path))
            .collect()
    }

    fn nts(&self, rule: RuleNr) -> Vec<Rc<str>> {
        self.compiled[(rule - 1) as usize].nts.clone()
    }

    fn action(&mut self, tree: &Tree, rule: RuleNr, args: Vec<R>) -> R {
        match self.actions.get_mut(&rule) {
            Some(action) => action(tree, args),
            None => panic!("no action registered for rule {}", rule),
        }
    }
}
