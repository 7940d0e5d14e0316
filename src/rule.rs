//! Rewrite rules and the rule system.
//!
//! A rule maps a tree pattern to a result non-terminal at a given
//! cost, with opaque acceptance and action text attached. Rules are
//! accumulated through [`SystemBuilder`] and frozen into a
//! [`BurgSystem`], which the matcher and the code generator consume
//! read-only.

use crate::pattern::Pattern;
use crate::tree::RuleNr;
use rustc_hash::FxHashMap;
use std::fmt;
use std::rc::Rc;
use thiserror::Error;

/// Errors raised while building a rule system.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GrammarError {
    #[error("cannot redefine terminal `{0}` as a non-terminal")]
    RedefinedTerminal(String),
    #[error("`{0}` is already declared as a non-terminal")]
    AlreadyNonTerminal(String),
    #[error("non-terminal reference `{0}` cannot have children in a pattern")]
    NonTerminalWithChildren(String),
    #[error("grammar declares no rules")]
    EmptyGrammar,
}

/// A rewrite rule: a pattern that can be rewritten into `non_term`
/// at `cost`. The acceptance and action payloads are opaque text
/// reproduced verbatim into generated matchers.
#[derive(Clone, Debug)]
pub struct Rule {
    pub non_term: Rc<str>,
    pub pattern: Pattern,
    pub cost: u32,
    pub acceptance: Option<String>,
    pub action: String,
    /// 1-based declaration sequence number; the rule's stable
    /// identity for dispatch.
    pub nr: RuleNr,
}

impl Rule {
    /// Whether the pattern is a bare non-terminal reference.
    pub fn is_chain(&self) -> bool {
        self.pattern.is_nonterm()
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {} ${}", self.non_term, self.pattern, self.cost)
    }
}

/// A name in the grammar's symbol space.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Symbol {
    /// An operator label concrete tree nodes carry; never rewritten.
    Terminal,
    /// An abstract category, owning the chain rules registered on it
    /// (indices into the rule list).
    NonTerminal { chain_rules: Vec<usize> },
}

/// Accumulation phase of rule-system construction. Append-only: no
/// removal operation exists.
#[derive(Debug, Default)]
pub struct SystemBuilder {
    symbols: FxHashMap<Rc<str>, Symbol>,
    terminal_order: Vec<Rc<str>>,
    rules: Vec<Rule>,
    goal: Option<Rc<str>>,
    headers: Vec<String>,
}

impl SystemBuilder {
    pub fn new() -> Self {
        SystemBuilder::default()
    }

    /// Record a header line to be reproduced verbatim at the top of
    /// generated output.
    pub fn add_header(&mut self, line: impl Into<String>) {
        self.headers.push(line.into());
    }

    /// Declare a terminal. Idempotent; fails if the name is already
    /// a non-terminal.
    pub fn declare_terminal(&mut self, name: &str) -> Result<(), GrammarError> {
        match self.symbols.get(name) {
            Some(Symbol::NonTerminal { .. }) => {
                Err(GrammarError::AlreadyNonTerminal(name.to_string()))
            }
            Some(Symbol::Terminal) => Ok(()),
            None => {
                let name: Rc<str> = name.into();
                self.symbols.insert(name.clone(), Symbol::Terminal);
                self.terminal_order.push(name);
                Ok(())
            }
        }
    }

    /// Whether `name` is a declared terminal.
    pub fn is_terminal(&self, name: &str) -> bool {
        matches!(self.symbols.get(name), Some(Symbol::Terminal))
    }

    /// Build a pattern node, classifying `name` against the current
    /// symbol table: a declared terminal becomes a terminal pattern
    /// node, anything else a non-terminal reference, which must be a
    /// leaf.
    pub fn tree(&self, name: &str, children: Vec<Pattern>) -> Result<Pattern, GrammarError> {
        if self.is_terminal(name) {
            Ok(Pattern::term(name, children))
        } else if children.is_empty() {
            Ok(Pattern::nonterm(name))
        } else {
            Err(GrammarError::NonTerminalWithChildren(name.to_string()))
        }
    }

    /// Add a rule. Fails if `non_term` was declared a terminal. If
    /// the pattern is a bare non-terminal reference, the rule is
    /// additionally filed as a chain rule on the referenced
    /// non-terminal. Sets the goal symbol if unset and returns the
    /// rule's sequence number.
    pub fn add_rule(
        &mut self,
        non_term: &str,
        pattern: Pattern,
        cost: u32,
        acceptance: Option<String>,
        action: String,
    ) -> Result<RuleNr, GrammarError> {
        let lhs = self.install_non_term(non_term)?;
        if self.goal.is_none() {
            self.goal = Some(lhs.clone());
        }

        let index = self.rules.len();
        let nr = (index + 1) as RuleNr;

        if let Pattern::Nonterm(target) = &pattern {
            let target = target.clone();
            self.install_non_term(&target)?;
            match self.symbols.get_mut(target.as_ref()) {
                Some(Symbol::NonTerminal { chain_rules }) => chain_rules.push(index),
                _ => unreachable!("just installed as non-terminal"),
            }
        }

        self.rules.push(Rule {
            non_term: lhs,
            pattern,
            cost,
            acceptance,
            action,
            nr,
        });
        Ok(nr)
    }

    fn install_non_term(&mut self, name: &str) -> Result<Rc<str>, GrammarError> {
        if let Some((key, symbol)) = self.symbols.get_key_value(name) {
            return match symbol {
                Symbol::Terminal => Err(GrammarError::RedefinedTerminal(name.to_string())),
                Symbol::NonTerminal { .. } => Ok(key.clone()),
            };
        }
        let key: Rc<str> = name.into();
        self.symbols.insert(
            key.clone(),
            Symbol::NonTerminal {
                chain_rules: Vec::new(),
            },
        );
        Ok(key)
    }

    /// Freeze the builder into an immutable rule system.
    pub fn finish(self) -> Result<BurgSystem, GrammarError> {
        let goal = self.goal.ok_or(GrammarError::EmptyGrammar)?;
        Ok(BurgSystem {
            symbols: self.symbols,
            terminal_order: self.terminal_order,
            rules: self.rules,
            goal,
            headers: self.headers,
        })
    }
}

/// A frozen rule system: the full symbol table, the ordered list of
/// declared rules, the goal symbol, and the grammar's header lines.
/// Built once, then consumed read-only by the matcher and the code
/// generator.
#[derive(Debug)]
pub struct BurgSystem {
    symbols: FxHashMap<Rc<str>, Symbol>,
    terminal_order: Vec<Rc<str>>,
    rules: Vec<Rule>,
    goal: Rc<str>,
    headers: Vec<String>,
}

impl BurgSystem {
    /// All rules in declaration order.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Look up a rule by sequence number.
    pub fn rule(&self, nr: RuleNr) -> &Rule {
        &self.rules[(nr - 1) as usize]
    }

    /// The category the root of a matched tree must satisfy.
    pub fn goal(&self) -> &Rc<str> {
        &self.goal
    }

    /// Header lines for generated output, verbatim.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn is_terminal(&self, name: &str) -> bool {
        matches!(self.symbols.get(name), Some(Symbol::Terminal))
    }

    pub fn is_non_terminal(&self, name: &str) -> bool {
        matches!(self.symbols.get(name), Some(Symbol::NonTerminal { .. }))
    }

    /// Terminals in declaration order.
    pub fn terminals(&self) -> impl Iterator<Item = &Rc<str>> {
        self.terminal_order.iter()
    }

    /// Indices of the chain rules registered on `nt`.
    pub fn chain_rules(&self, nt: &str) -> &[usize] {
        match self.symbols.get(nt) {
            Some(Symbol::NonTerminal { chain_rules }) => chain_rules,
            _ => &[],
        }
    }

    /// Ordinary rules whose pattern root is the terminal `name`, in
    /// declaration order. Chain rules have a non-terminal root and
    /// never appear here.
    pub fn rules_with_root<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Rule> {
        self.rules.iter().filter(move |r| match &r.pattern {
            Pattern::Term { name: n, .. } => n.as_ref() == name,
            Pattern::Nonterm(_) => false,
        })
    }
}

impl fmt::Display for BurgSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rule in &self.rules {
            writeln!(f, "{}", rule)?;
        }
        Ok(())
    }
}
