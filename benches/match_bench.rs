//! Benchmark comparing a specialized matcher against the data-driven
//! engine on the same grammar.
//!
//! Run with: cargo bench --bench match_bench
//!
//! The specialized matcher is the hand-maintained copy of generator
//! output; the generic engine interprets the rule system at match
//! time.

use std::time::Instant;

use burg::codegen::sample::SampleMatcher;
use burg::matcher::{RuleMatcher, TreeMatcher};
use burg::rule::{BurgSystem, SystemBuilder};
use burg::tree::{Tree, Value};

/// Balanced ADD tree with numbered CONST leaves.
fn build_tree(depth: usize, next: &mut i64) -> Tree {
    if depth == 0 {
        let tree = Tree::leaf_with("CONST", Value::int(*next));
        *next += 1;
        tree
    } else {
        Tree::new(
            "ADD",
            vec![build_tree(depth - 1, next), build_tree(depth - 1, next)],
        )
    }
}

/// reg -> CONST $1; reg -> ADD(reg, reg) $2; rc -> reg $0.
fn build_system() -> BurgSystem {
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

fn bench_generic(system: &BurgSystem, tree: &mut Tree) -> (String, std::time::Duration) {
    let mut engine: RuleMatcher<'_, String> = RuleMatcher::new(system);
    engine.register_action(1, |tree, _| match &tree.value {
        Some(v) => format!("load({})", v),
        None => "load(?)".to_string(),
    });
    engine.register_action(2, |_, args| format!("add({}, {})", args[0], args[1]));
    engine.register_action(3, |_, mut args| args.pop().unwrap());

    let start = Instant::now();
    let result = engine.rewrite(tree).unwrap();
    (result, start.elapsed())
}

fn bench_compiled(tree: &mut Tree) -> (String, std::time::Duration) {
    let mut matcher = SampleMatcher;
    let start = Instant::now();
    let result = matcher.rewrite(tree).unwrap();
    (result, start.elapsed())
}

fn main() {
    println!("=== label + select: generic engine vs specialized matcher ===");
    let system = build_system();

    for depth in [6, 8, 10, 12] {
        let mut next = 0;
        let mut generic_tree = build_tree(depth, &mut next);
        let mut compiled_tree = generic_tree.clone();
        let nodes = generic_tree.size();

        let (generic_result, generic_time) = bench_generic(&system, &mut generic_tree);
        let (compiled_result, compiled_time) = bench_compiled(&mut compiled_tree);

        assert_eq!(generic_result, compiled_result);

        let speedup = generic_time.as_secs_f64() / compiled_time.as_secs_f64().max(1e-9);
        println!(
            "depth {:2} ({:6} nodes): generic {:>10.2?}  compiled {:>10.2?}  speedup {:.2}x",
            depth, nodes, generic_time, compiled_time, speedup
        );
    }
}
