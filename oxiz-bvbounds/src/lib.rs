//! OxiZ BvBounds - Contextual Bit-Vector Bounds Simplification
//!
//! This crate tracks, for each bit-vector subterm, the tightest range of
//! values allowed by the hypotheses of the current search branch, and uses it
//! to rewrite comparisons against literals:
//! - Modular [`Interval`]s with wraparound over any bit width
//! - A [`ScopeStack`] of facts following push/pop backtracking
//! - The [`BvBoundsSimplifier`] plug-in and the `bv-bounds` tactic
//!
//! # Examples
//!
//! ## Simplifying Under Hypotheses
//!
//! ```
//! use oxiz_bvbounds::{BvBoundsSimplifier, CtxSimplifier, Polarity, TermManager};
//!
//! let mut tm = TermManager::new();
//! let x = tm.mk_bv_var("x", 8);
//! let five = tm.mk_bitvec(5u32, 8);
//! let ten = tm.mk_bitvec(10u32, 8);
//! let le5 = tm.mk_bvule(x, five);
//! let le10 = tm.mk_bvule(x, ten);
//!
//! let mut simp = BvBoundsSimplifier::new(&tm);
//! simp.enter_scope();
//! simp.on_hypothesis(&tm, le5, Polarity::Positive).unwrap();
//!
//! let t = tm.mk_true();
//! assert_eq!(simp.try_simplify(&mut tm, le10), Some(t));
//!
//! simp.leave_scopes(1).unwrap();
//! assert_eq!(simp.try_simplify(&mut tm, le10), None);
//! ```
//!
//! ## Using the Tactic
//!
//! ```
//! use oxiz_bvbounds::{BvBoundsConfig, Goal, SolveResult, Tactic, TacticResult, TermManager};
//! use oxiz_bvbounds::mk_bv_bounds_tactic;
//!
//! let mut tm = TermManager::new();
//! let x = tm.mk_bv_var("x", 8);
//! let five = tm.mk_bitvec(5u32, 8);
//! let four = tm.mk_bitvec(4u32, 8);
//! let eq = tm.mk_eq(x, five);
//! let le = tm.mk_bvule(x, four);
//!
//! let tactic = mk_bv_bounds_tactic(BvBoundsConfig::default());
//! let result = tactic.apply(&Goal::new(vec![eq, le]), &mut tm).unwrap();
//! assert_eq!(result, TacticResult::Solved(SolveResult::Unsat));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod ast;
pub mod config;
pub mod error;
pub mod extract;
pub mod interval;
pub mod scope;
pub mod simplifier;
pub mod tactic;
pub mod term;

pub use ast::{Sort, Term, TermKind, TermManager};
pub use config::BvBoundsConfig;
pub use error::{BoundsError, Result};
pub use extract::{Bound, BoundExtractor, BoundShape, Polarity};
pub use interval::{BvWidth, Interval, max_value};
pub use scope::ScopeStack;
pub use simplifier::{BvBoundsSimplifier, BvBoundsStats, CtxSimplifier};
pub use tactic::{
    CtxSimplifyTactic, Goal, SimplifierFactory, SolveResult, Tactic, TacticResult,
    mk_bv_bounds_tactic,
};
pub use term::{BvShapes, ContextId, TermContext, TermId};
