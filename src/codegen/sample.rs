//! Hand-maintained reference of generated matcher output.
//!
//! This module keeps a compiled, tested copy of what
//! [`super::BurgGenerator`] emits for a small grammar:
//!
//! ```text
//! reg -> CONST 1          (load)
//! reg -> ADD(reg, reg) 2  (add)
//! rc  -> reg 0            (pass-through)
//! ```
//!
//! The only differences from real output are the crate-internal
//! import paths and concrete action bodies; the table and labeling
//! shapes are the generator's.

use crate::matcher::TreeMatcher;
use crate::tree::{RuleNr, State, Tree};
use std::rc::Rc;

/// Result type produced by rule actions.
pub type Res = String;

pub struct SampleMatcher;

impl SampleMatcher {
    //  1: reg -> CONST $1
    fn p1(&mut self, tree: &Tree) -> Res {
        match &tree.value {
            Some(v) => format!("load({})", v),
            None => "load(?)".to_string(),
        }
    }

    //  2: reg -> ADD(reg, reg) $2
    fn p2(&mut self, _tree: &Tree, c0: Res, c1: Res) -> Res {
        format!("add({}, {})", c0, c1)
    }

    //  3: rc -> reg $0
    fn p3(&mut self, _tree: &Tree, c0: Res) -> Res {
        c0
    }
}

impl TreeMatcher for SampleMatcher {
    type Res = Res;

    fn goal(&self) -> Rc<str> {
        "reg".into()
    }

    fn kids<'t>(&self, tree: &'t Tree, rule: RuleNr) -> Vec<&'t Tree> {
        match rule {
            1 => vec![],
            2 => vec![&tree.children[0], &tree.children[1]],
            3 => vec![tree],
            _ => unreachable!("unknown rule {}", rule),
        }
    }

    fn nts(&self, rule: RuleNr) -> Vec<Rc<str>> {
        match rule {
            1 => vec![],
            2 => vec!["reg".into(), "reg".into()],
            3 => vec!["reg".into()],
            _ => unreachable!("unknown rule {}", rule),
        }
    }

    fn action(&mut self, tree: &Tree, rule: RuleNr, mut args: Vec<Res>) -> Res {
        match rule {
            1 => self.p1(tree),
            2 => {
                let c1 = args.pop().unwrap();
                let c0 = args.pop().unwrap();
                self.p2(tree, c0, c1)
            }
            3 => {
                let c0 = args.pop().unwrap();
                self.p3(tree, c0)
            }
            _ => unreachable!("unknown rule {}", rule),
        }
    }

    fn state_node(&self, tree: &mut Tree) {
        tree.state = State::new();

        //  1: reg -> CONST $1
        if tree.name.as_ref() == "CONST" {
            let kids = self.kids(tree, 1);
            let nts = self.nts(1);
            if kids.iter().zip(nts.iter()).all(|(k, n)| k.state.has_goal(n)) {
                let c = kids
                    .iter()
                    .zip(nts.iter())
                    .filter_map(|(k, n)| k.state.get_cost(n))
                    .sum::<u32>()
                    + 1;
                tree.state.set_cost("reg", c, 1);
                // chain rule: rc -> reg $0
                tree.state.set_cost("rc", c + 0, 3);
            }
        }

        //  2: reg -> ADD(reg, reg) $2
        if tree.name.as_ref() == "ADD" {
            let kids = self.kids(tree, 2);
            let nts = self.nts(2);
            if kids.iter().zip(nts.iter()).all(|(k, n)| k.state.has_goal(n)) {
                let c = kids
                    .iter()
                    .zip(nts.iter())
                    .filter_map(|(k, n)| k.state.get_cost(n))
                    .sum::<u32>()
                    + 2;
                tree.state.set_cost("reg", c, 2);
                // chain rule: rc -> reg $0
                tree.state.set_cost("rc", c + 0, 3);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::RuleMatcher;
    use crate::rule::{BurgSystem, SystemBuilder};
    use crate::tree::Value;

    fn example_tree() -> Tree {
        Tree::new(
            "ADD",
            vec![
                Tree::leaf_with("CONST", Value::int(2)),
                Tree::leaf_with("CONST", Value::int(3)),
            ],
        )
    }

    #[test]
    fn test_sample_label_costs() {
        let matcher = SampleMatcher;
        let mut tree = example_tree();
        matcher.label(&mut tree);

        assert_eq!(tree.children[0].state.get_cost("reg"), Some(1));
        assert_eq!(tree.children[1].state.get_cost("reg"), Some(1));
        assert_eq!(tree.state.get_cost("reg"), Some(4));
        assert_eq!(tree.state.get_rule("reg"), Some(2));
        assert_eq!(tree.state.get_cost("rc"), Some(4));
        assert_eq!(tree.state.get_rule("rc"), Some(3));
    }

    #[test]
    fn test_sample_rewrite() {
        let mut matcher = SampleMatcher;
        let mut tree = example_tree();
        let result = matcher.rewrite(&mut tree).unwrap();
        assert_eq!(result, "add(load(2), load(3))");
    }

    #[test]
    fn test_sample_uncovered() {
        let mut matcher = SampleMatcher;
        let mut tree = Tree::leaf("BOGUS");
        let err = matcher.rewrite(&mut tree).unwrap_err();
        assert!(err.to_string().contains("BOGUS"));
    }

    #[test]
    fn test_sample_relabel_idempotent() {
        let matcher = SampleMatcher;
        let mut tree = example_tree();
        matcher.label(&mut tree);
        let state = tree.state.clone();
        matcher.label(&mut tree);
        assert_eq!(tree.state, state);
    }

    /// The same grammar interpreted by the data-driven engine.
    fn data_driven_system() -> BurgSystem {
        let mut b = SystemBuilder::new();
        b.declare_terminal("CONST").unwrap();
        b.declare_terminal("ADD").unwrap();
        let p = b.tree("CONST", vec![]).unwrap();
        b.add_rule("reg", p, 1, None, "load".into()).unwrap();
        let p = b
            .tree(
                "ADD",
                vec![b.tree("reg", vec![]).unwrap(), b.tree("reg", vec![]).unwrap()],
            )
            .unwrap();
        b.add_rule("reg", p, 2, None, "add".into()).unwrap();
        let chain = b.tree("reg", vec![]).unwrap();
        b.add_rule("rc", chain, 0, None, "c0".into()).unwrap();
        b.finish().unwrap()
    }

    #[test]
    fn test_sample_agrees_with_engine() {
        let system = data_driven_system();
        let mut engine: RuleMatcher<'_, String> = RuleMatcher::new(&system);
        engine.register_action(1, |tree, _| match &tree.value {
            Some(v) => format!("load({})", v),
            None => "load(?)".to_string(),
        });
        engine.register_action(2, |_, args| format!("add({}, {})", args[0], args[1]));
        engine.register_action(3, |_, mut args| args.pop().unwrap());

        let mut by_engine = example_tree();
        let engine_result = engine.rewrite(&mut by_engine).unwrap();

        let mut by_sample = example_tree();
        let sample_result = SampleMatcher.rewrite(&mut by_sample).unwrap();

        assert_eq!(engine_result, sample_result);
        assert_eq!(by_engine.state, by_sample.state);
        assert_eq!(by_engine.children[0].state, by_sample.children[0].state);
    }
}
