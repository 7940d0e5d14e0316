//! Code generator for specialized tree matchers.
//!
//! Emits the Rust source of a matcher module from a frozen rule
//! system. The general labeling algorithm is specialized into
//! straight-line per-terminal dispatch code: for every terminal, the
//! structural test chain of each rule rooted there, followed by the
//! cost-record update and single-hop chain propagation. Action and
//! acceptance payloads are reproduced verbatim; their semantics
//! belong to the crate the emitted module is compiled into.

use crate::pattern::{compute_kids, emit_path, emit_test, CompiledPattern};
use crate::rule::{BurgSystem, Rule};
use std::fmt::Write;

/// Configuration for matcher emission.
#[derive(Clone, Debug)]
pub struct GenConfig {
    /// Name of the emitted matcher struct.
    pub matcher_name: String,
    /// Rust type actions produce, emitted as `pub type Res = ...;`.
    pub result_type: String,
}

impl Default for GenConfig {
    fn default() -> Self {
        Self {
            matcher_name: "Matcher".to_string(),
            result_type: "String".to_string(),
        }
    }
}

/// Emits a matcher module for one rule system.
pub struct BurgGenerator<'s> {
    system: &'s BurgSystem,
    config: GenConfig,
    /// Per-rule hole extraction, indexed by rule position.
    compiled: Vec<CompiledPattern>,
}

impl<'s> BurgGenerator<'s> {
    pub fn new(system: &'s BurgSystem) -> Self {
        Self::with_config(system, GenConfig::default())
    }

    pub fn with_config(system: &'s BurgSystem, config: GenConfig) -> Self {
        let compiled = system
            .rules()
            .iter()
            .map(|r| compute_kids(&r.pattern))
            .collect();
        BurgGenerator {
            system,
            config,
            compiled,
        }
    }

    fn holes(&self, rule: &Rule) -> &CompiledPattern {
        &self.compiled[(rule.nr - 1) as usize]
    }

    /// Generate the complete matcher module source.
    pub fn generate(&self) -> String {
        let mut code = String::new();
        self.generate_prologue(&mut code);
        self.generate_routines(&mut code);
        self.generate_matcher_impl(&mut code);
        code
    }

    fn generate_prologue(&self, code: &mut String) {
        writeln!(code, "//! Auto-generated tree matcher. DO NOT EDIT.").unwrap();
        writeln!(code, "//!").unwrap();
        writeln!(code, "//! Generated by burg from a rewrite-rule grammar.").unwrap();
        writeln!(code).unwrap();
        writeln!(code, "#![allow(unused_variables, unused_mut, dead_code)]").unwrap();
        writeln!(code).unwrap();
        writeln!(code, "use std::rc::Rc;").unwrap();
        writeln!(code).unwrap();
        writeln!(code, "use burg::matcher::TreeMatcher;").unwrap();
        writeln!(code, "use burg::tree::{{RuleNr, State, Tree}};").unwrap();

        if !self.system.headers().is_empty() {
            writeln!(code).unwrap();
            for header in self.system.headers() {
                writeln!(code, "{}", header).unwrap();
            }
        }

        writeln!(code).unwrap();
        writeln!(code, "/// Result type produced by rule actions.").unwrap();
        writeln!(code, "pub type Res = {};", self.config.result_type).unwrap();
        writeln!(code).unwrap();
        writeln!(code, "pub struct {};", self.config.matcher_name).unwrap();
    }

    /// One action routine per rule, one acceptance routine per rule
    /// that has one, bodies verbatim.
    fn generate_routines(&self, code: &mut String) {
        writeln!(code).unwrap();
        writeln!(code, "impl {} {{", self.config.matcher_name).unwrap();
        for rule in self.system.rules() {
            let params: String = (0..self.holes(rule).len())
                .map(|k| format!(", c{}: Res", k))
                .collect();

            writeln!(code).unwrap();
            writeln!(code, "    //  {}: {}", rule.nr, rule).unwrap();
            writeln!(
                code,
                "    fn p{}(&mut self, tree: &Tree{}) -> Res {{",
                rule.nr, params
            )
            .unwrap();
            for line in rule.action.lines() {
                writeln!(code, "        {}", line).unwrap();
            }
            writeln!(code, "    }}").unwrap();

            if let Some(acceptance) = &rule.acceptance {
                writeln!(code).unwrap();
                writeln!(code, "    fn a{}(&self, tree: &Tree) -> bool {{", rule.nr).unwrap();
                for line in acceptance.lines() {
                    writeln!(code, "        {}", line).unwrap();
                }
                writeln!(code, "    }}").unwrap();
            }
        }
        writeln!(code, "}}").unwrap();
    }

    fn generate_matcher_impl(&self, code: &mut String) {
        writeln!(code).unwrap();
        writeln!(
            code,
            "impl TreeMatcher for {} {{",
            self.config.matcher_name
        )
        .unwrap();
        writeln!(code, "    type Res = Res;").unwrap();
        writeln!(code).unwrap();
        writeln!(code, "    fn goal(&self) -> Rc<str> {{").unwrap();
        writeln!(code, "        \"{}\".into()", self.system.goal()).unwrap();
        writeln!(code, "    }}").unwrap();

        self.generate_kids_table(code);
        self.generate_nts_table(code);
        self.generate_action_table(code);
        self.generate_state_fn(code);

        writeln!(code, "}}").unwrap();
    }

    /// Hole-position table: rule number -> subtree references.
    fn generate_kids_table(&self, code: &mut String) {
        writeln!(code).unwrap();
        writeln!(
            code,
            "    fn kids<'t>(&self, tree: &'t Tree, rule: RuleNr) -> Vec<&'t Tree> {{"
        )
        .unwrap();
        writeln!(code, "        match rule {{").unwrap();
        for rule in self.system.rules() {
            let accessors: Vec<String> = self
                .holes(rule)
                .paths
                .iter()
                .map(|path| {
                    if path.is_empty() {
                        "tree".to_string()
                    } else {
                        format!("&{}", emit_path(path, "tree"))
                    }
                })
                .collect();
            writeln!(
                code,
                "            {} => vec![{}],",
                rule.nr,
                accessors.join(", ")
            )
            .unwrap();
        }
        writeln!(code, "            _ => unreachable!(\"unknown rule {{}}\", rule),").unwrap();
        writeln!(code, "        }}").unwrap();
        writeln!(code, "    }}").unwrap();
    }

    /// Required-category table: rule number -> non-terminals.
    fn generate_nts_table(&self, code: &mut String) {
        writeln!(code).unwrap();
        writeln!(code, "    fn nts(&self, rule: RuleNr) -> Vec<Rc<str>> {{").unwrap();
        writeln!(code, "        match rule {{").unwrap();
        for rule in self.system.rules() {
            let entries: Vec<String> = self
                .holes(rule)
                .nts
                .iter()
                .map(|nt| format!("\"{}\".into()", nt))
                .collect();
            writeln!(
                code,
                "            {} => vec![{}],",
                rule.nr,
                entries.join(", ")
            )
            .unwrap();
        }
        writeln!(code, "            _ => unreachable!(\"unknown rule {{}}\", rule),").unwrap();
        writeln!(code, "        }}").unwrap();
        writeln!(code, "    }}").unwrap();
    }

    /// Action dispatch: rule number -> action routine call.
    fn generate_action_table(&self, code: &mut String) {
        writeln!(code).unwrap();
        writeln!(
            code,
            "    fn action(&mut self, tree: &Tree, rule: RuleNr, mut args: Vec<Res>) -> Res {{"
        )
        .unwrap();
        writeln!(code, "        match rule {{").unwrap();
        for rule in self.system.rules() {
            let holes = self.holes(rule).len();
            if holes == 0 {
                writeln!(code, "            {} => self.p{}(tree),", rule.nr, rule.nr).unwrap();
            } else {
                writeln!(code, "            {} => {{", rule.nr).unwrap();
                for k in (0..holes).rev() {
                    writeln!(code, "                let c{} = args.pop().unwrap();", k).unwrap();
                }
                let args: Vec<String> = (0..holes).map(|k| format!("c{}", k)).collect();
                writeln!(
                    code,
                    "                self.p{}(tree, {})",
                    rule.nr,
                    args.join(", ")
                )
                .unwrap();
                writeln!(code, "            }}").unwrap();
            }
        }
        writeln!(code, "            _ => unreachable!(\"unknown rule {{}}\", rule),").unwrap();
        writeln!(code, "        }}").unwrap();
        writeln!(code, "    }}").unwrap();
    }

    /// The labeling routine: per terminal, the structural test chain
    /// of every rule rooted there, followed by the cost-record
    /// update logic.
    fn generate_state_fn(&self, code: &mut String) {
        writeln!(code).unwrap();
        writeln!(code, "    fn state_node(&self, tree: &mut Tree) {{").unwrap();
        writeln!(code, "        tree.state = State::new();").unwrap();
        for terminal in self.system.terminals() {
            for rule in self.system.rules_with_root(terminal) {
                self.generate_record(code, rule);
            }
        }
        writeln!(code, "    }}").unwrap();
    }

    /// Structural test plus cost-record update for one rule.
    fn generate_record(&self, code: &mut String, rule: &Rule) {
        writeln!(code).unwrap();
        writeln!(code, "        //  {}: {}", rule.nr, rule).unwrap();
        writeln!(code, "        if {} {{", emit_test(&rule.pattern, "tree")).unwrap();
        writeln!(code, "            let kids = self.kids(tree, {});", rule.nr).unwrap();
        writeln!(code, "            let nts = self.nts({});", rule.nr).unwrap();

        let accept = match rule.acceptance {
            Some(_) => format!(" && self.a{}(tree)", rule.nr),
            None => String::new(),
        };
        writeln!(
            code,
            "            if kids.iter().zip(nts.iter()).all(|(k, n)| k.state.has_goal(n)){} {{",
            accept
        )
        .unwrap();
        writeln!(
            code,
            "                let c = kids.iter().zip(nts.iter()).filter_map(|(k, n)| k.state.get_cost(n)).sum::<u32>() + {};",
            rule.cost
        )
        .unwrap();
        writeln!(
            code,
            "                tree.state.set_cost(\"{}\", c, {});",
            rule.non_term, rule.nr
        )
        .unwrap();
        for &ci in self.system.chain_rules(&rule.non_term) {
            let chain = &self.system.rules()[ci];
            writeln!(code, "                // chain rule: {}", chain).unwrap();
            writeln!(
                code,
                "                tree.state.set_cost(\"{}\", c + {}, {});",
                chain.non_term, chain.cost, chain.nr
            )
            .unwrap();
        }
        writeln!(code, "            }}").unwrap();
        writeln!(code, "        }}").unwrap();
    }
}
