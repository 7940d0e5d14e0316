//! Grammar patterns and the pattern compiler.
//!
//! A pattern is a tree literal over terminal names, where a leaf may
//! instead reference a non-terminal (a "hole" that matches any
//! subtree already reduced to that non-terminal). The pattern
//! compiler derives two things from each pattern, in both executable
//! and textual form:
//!
//! - the ordered list of holes (`compute_kids`): the tree positions
//!   a concrete node must supply, with the non-terminal each position
//!   must satisfy;
//! - the structural test (`structural_match` / `emit_test`): whether
//!   a concrete node has the right terminal shape, independent of
//!   hole contents.

use crate::tree::Tree;
use std::fmt;
use std::rc::Rc;

/// A tree pattern. Non-terminal references are always leaves; nesting
/// one inside further structure is rejected at construction time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Pattern {
    /// A terminal node with ordered child patterns.
    Term {
        name: Rc<str>,
        children: Vec<Pattern>,
    },
    /// A bare non-terminal reference: a hole.
    Nonterm(Rc<str>),
}

impl Pattern {
    /// Create a terminal pattern node.
    pub fn term(name: impl Into<Rc<str>>, children: Vec<Pattern>) -> Self {
        Pattern::Term {
            name: name.into(),
            children,
        }
    }

    /// Create a non-terminal reference.
    pub fn nonterm(name: impl Into<Rc<str>>) -> Self {
        Pattern::Nonterm(name.into())
    }

    /// The name at the root of this pattern.
    pub fn name(&self) -> &Rc<str> {
        match self {
            Pattern::Term { name, .. } => name,
            Pattern::Nonterm(name) => name,
        }
    }

    /// Whether this pattern is a bare non-terminal reference.
    pub fn is_nonterm(&self) -> bool {
        matches!(self, Pattern::Nonterm(_))
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pattern::Nonterm(name) => write!(f, "{}", name),
            Pattern::Term { name, children } if children.is_empty() => {
                write!(f, "{}", name)
            }
            Pattern::Term { name, children } => {
                write!(f, "{}(", name)?;
                for (i, c) in children.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", c)?;
                }
                write!(f, ")")
            }
        }
    }
}

/// A child-index path from a matched node. The empty path is the node
/// itself (a chain rule's single hole).
pub type Path = Vec<usize>;

/// The holes of one rule's pattern: parallel sequences of tree
/// positions and the non-terminal each position must satisfy, in the
/// order the rule's action expects them.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CompiledPattern {
    pub paths: Vec<Path>,
    pub nts: Vec<Rc<str>>,
}

impl CompiledPattern {
    /// Number of holes.
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

/// Extract the holes of a pattern, depth-first, left to right.
pub fn compute_kids(pattern: &Pattern) -> CompiledPattern {
    let mut out = CompiledPattern::default();
    let mut path = Vec::new();
    walk(pattern, &mut path, &mut out);
    out
}

fn walk(pattern: &Pattern, path: &mut Path, out: &mut CompiledPattern) {
    match pattern {
        Pattern::Nonterm(name) => {
            out.paths.push(path.clone());
            out.nts.push(name.clone());
        }
        Pattern::Term { children, .. } => {
            for (i, child) in children.iter().enumerate() {
                path.push(i);
                walk(child, path, out);
                path.pop();
            }
        }
    }
}

/// Whether a concrete node has the terminal shape the pattern
/// requires. Holes only require a child to exist at their position;
/// a zero-children terminal pattern matches on name alone, whatever
/// the concrete node's arity.
pub fn structural_match(pattern: &Pattern, tree: &Tree) -> bool {
    match pattern {
        Pattern::Nonterm(_) => true,
        Pattern::Term { name, children } => {
            if tree.name.as_ref() != name.as_ref() {
                return false;
            }
            children.iter().enumerate().all(|(i, child)| match child {
                Pattern::Nonterm(_) => i < tree.children.len(),
                Pattern::Term { .. } => tree
                    .children
                    .get(i)
                    .map_or(false, |t| structural_match(child, t)),
            })
        }
    }
}

/// The structural test as a Rust boolean expression over a node
/// reachable through `prefix`. Hole children contribute no test.
pub fn emit_test(pattern: &Pattern, prefix: &str) -> String {
    match pattern {
        Pattern::Nonterm(_) => "true".to_string(),
        Pattern::Term { name, children } => {
            let mut test = format!("{}.name.as_ref() == \"{}\"", prefix, name);
            for (i, child) in children.iter().enumerate() {
                if let Pattern::Term { .. } = child {
                    let child_prefix = format!("{}.children[{}]", prefix, i);
                    test.push_str(&format!(" && ({})", emit_test(child, &child_prefix)));
                }
            }
            test
        }
    }
}

/// A hole path as a Rust accessor expression rooted at `root`.
pub fn emit_path(path: &[usize], root: &str) -> String {
    let mut expr = root.to_string();
    for i in path {
        expr.push_str(&format!(".children[{}]", i));
    }
    expr
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::Tree;

    fn muladd() -> Pattern {
        // ADD(MUL(reg, reg), reg)
        Pattern::term(
            "ADD",
            vec![
                Pattern::term(
                    "MUL",
                    vec![Pattern::nonterm("reg"), Pattern::nonterm("reg")],
                ),
                Pattern::nonterm("reg"),
            ],
        )
    }

    #[test]
    fn test_compute_kids_order() {
        let kids = compute_kids(&muladd());
        assert_eq!(kids.paths, vec![vec![0, 0], vec![0, 1], vec![1]]);
        assert_eq!(kids.nts.len(), 3);
        assert!(kids.nts.iter().all(|n| n.as_ref() == "reg"));
    }

    #[test]
    fn test_compute_kids_chain() {
        // Bare non-terminal reference: one hole at the node itself.
        let kids = compute_kids(&Pattern::nonterm("reg"));
        assert_eq!(kids.paths, vec![Vec::<usize>::new()]);
        assert_eq!(kids.nts[0].as_ref(), "reg");
    }

    #[test]
    fn test_compute_kids_no_holes() {
        let kids = compute_kids(&Pattern::term("CONST", vec![]));
        assert!(kids.is_empty());
    }

    #[test]
    fn test_structural_match_nested() {
        let t = Tree::new(
            "ADD",
            vec![
                Tree::new("MUL", vec![Tree::leaf("CONST"), Tree::leaf("CONST")]),
                Tree::leaf("CONST"),
            ],
        );
        assert!(structural_match(&muladd(), &t));

        let wrong = Tree::new(
            "ADD",
            vec![Tree::leaf("CONST"), Tree::leaf("CONST")],
        );
        assert!(!structural_match(&muladd(), &wrong));
    }

    #[test]
    fn test_structural_match_hole_requires_child() {
        let p = Pattern::term("NEG", vec![Pattern::nonterm("reg")]);
        assert!(structural_match(&p, &Tree::new("NEG", vec![Tree::leaf("X")])));
        assert!(!structural_match(&p, &Tree::leaf("NEG")));
    }

    #[test]
    fn test_structural_match_leaf_ignores_arity() {
        // A zero-children terminal pattern matches on name alone.
        let p = Pattern::term("CONST", vec![]);
        let with_children = Tree::new("CONST", vec![Tree::leaf("X")]);
        assert!(structural_match(&p, &with_children));
    }

    #[test]
    fn test_emit_test() {
        let test = emit_test(&muladd(), "tree");
        assert_eq!(
            test,
            "tree.name.as_ref() == \"ADD\" && \
             (tree.children[0].name.as_ref() == \"MUL\")"
        );
    }

    #[test]
    fn test_emit_test_leaf() {
        let test = emit_test(&Pattern::term("CONST", vec![]), "tree");
        assert_eq!(test, "tree.name.as_ref() == \"CONST\"");
    }

    #[test]
    fn test_emit_path() {
        assert_eq!(emit_path(&[], "tree"), "tree");
        assert_eq!(emit_path(&[0, 1], "tree"), "tree.children[0].children[1]");
    }

    #[test]
    fn test_pattern_display() {
        assert_eq!(format!("{}", muladd()), "ADD(MUL(reg, reg), reg)");
        assert_eq!(format!("{}", Pattern::nonterm("reg")), "reg");
    }
}
