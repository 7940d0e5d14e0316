//! Matcher source emission.
//!
//! This side of the crate turns a frozen rule system into the source
//! text of a specialized matcher module. The emitted module contains
//! one action routine per rule (and an acceptance routine where the
//! rule has one), the per-rule hole tables, and a labeling routine
//! specialized into straight-line per-terminal dispatch code, all
//! behind the [`crate::matcher::TreeMatcher`] contract whose generic
//! label/select drivers come from this crate.
//!
//! ```text
//! ┌──────────────┐    ┌──────────────────┐    ┌─────────────────────┐
//! │ BurgSystem   │───►│ Pattern Compiler │───►│ Emitted matcher     │
//! │ (rules)      │    │ (holes + tests)  │    │ - action routines   │
//! └──────────────┘    └──────────────────┘    │ - kids/nts tables   │
//!                                             │ - per-terminal      │
//!                                             │   labeling dispatch │
//!                                             └─────────────────────┘
//! ```
//!
//! [`sample`] keeps a hand-maintained copy of the output for a small
//! grammar so the emitted shape stays compiled and tested in-tree.

pub mod generator;
pub mod sample;

pub use generator::{BurgGenerator, GenConfig};
