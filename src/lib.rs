//! burg: a bottom-up rewrite system (BURS) generator.
//!
//! This crate compiles a declarative grammar of tree-rewrite rules,
//! each mapping a tree pattern to a result category at a given cost
//! with an attached semantic action, into a matcher that covers any
//! concrete input tree at minimum cost and applies the winning
//! actions in order. The classical use is instruction selection: an
//! IR expression tree covered optimally by machine-instruction
//! patterns.
//!
//! It provides:
//! - Concrete trees and per-node cost state ([`tree`])
//! - Patterns and the pattern compiler: hole extraction and
//!   structural tests ([`pattern`])
//! - Rule-system construction and the frozen rule system ([`rule`])
//! - The matcher contract and the data-driven labeling/selection
//!   engine ([`matcher`])
//! - A grammar-file front end ([`parser`])
//! - A code generator emitting specialized matcher modules
//!   ([`codegen`])
//!
//! Matching is a two-phase process: a bottom-up **label** pass
//! records at every node the cheapest rule reaching each
//! non-terminal (with single-hop chain-rule propagation), then a
//! top-down **select** pass applies the winning actions, failing if
//! the root cannot reach the goal category.

pub mod codegen;
pub mod matcher;
pub mod parser;
pub mod pattern;
pub mod rule;
pub mod tree;

// Re-exports for convenience
pub use codegen::{BurgGenerator, GenConfig};
pub use matcher::{MatchError, RuleMatcher, TreeMatcher};
pub use parser::{parse_spec, ParseError, SpecError};
pub use pattern::{compute_kids, structural_match, CompiledPattern, Path, Pattern};
pub use rule::{BurgSystem, GrammarError, Rule, SystemBuilder};
pub use tree::{RuleNr, State, Tree, Value};
