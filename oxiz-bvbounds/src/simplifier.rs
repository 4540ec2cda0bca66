//! Contextual Bit-Vector Bounds Simplifier.
//!
//! Tracks, per bit-vector subterm, the tightest interval implied by the
//! hypotheses of the current branch and uses it to rewrite comparisons
//! against literals:
//!
//! - `x <=u 10` under `x <=u 5` becomes `true`
//! - `x <=u 4` under `x = 5` becomes `false`
//! - `x <=u 5` under `5 <=u x` becomes `x = 5`
//!
//! Facts follow the scope discipline of the driving search: whatever is
//! learned after `enter_scope` is forgotten by the matching `leave_scopes`.
//!
//! ## References
//!
//! - Z3's `tactic/bv/bv_bounds_tactic.cpp`
//! - Z3's `tactic/core/ctx_simplify_tactic.cpp`

use crate::config::BvBoundsConfig;
use crate::error::{BoundsError, Result};
use crate::extract::{BoundExtractor, Polarity};
use crate::interval::Interval;
use crate::scope::ScopeStack;
use crate::term::{BvShapes, ContextId, TermContext, TermId};
use serde::{Deserialize, Serialize};
use tracing::trace;

/// A simplifier driven by a backtracking rewriting framework.
///
/// The framework mirrors its own branching through `enter_scope` and
/// `leave_scopes`, reports each branch condition through `on_hypothesis`, and
/// asks `try_simplify` for rewrites of subterms met while normalizing.
pub trait CtxSimplifier<C: ?Sized> {
    /// Assume `term` (or its negation) for the rest of the current scope.
    ///
    /// An error for which [`BoundsError::is_infeasible`] holds means the
    /// hypotheses of the current scope have no common solution.
    fn on_hypothesis(&mut self, ctx: &C, term: TermId, polarity: Polarity) -> Result<()>;

    /// Rewrite `term` using the current hypotheses, `None` if nothing applies.
    fn try_simplify(&mut self, ctx: &mut C, term: TermId) -> Option<TermId>;

    /// Open a nested scope.
    fn enter_scope(&mut self);

    /// Close the `num_scopes` innermost scopes.
    fn leave_scopes(&mut self, num_scopes: usize) -> Result<()>;

    /// Number of open scopes.
    fn current_depth(&self) -> usize;

    /// A fresh simplifier of the same kind bound to `ctx`, with no facts.
    fn clone_for(&self, ctx: &C) -> Box<dyn CtxSimplifier<C>>;
}

/// Statistics for the bounds simplifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BvBoundsStats {
    /// Hypotheses that produced a bound.
    pub hypotheses_recorded: u64,
    /// Hypotheses with no recognized shape.
    pub hypotheses_ignored: u64,
    /// Hypotheses contradicting the current facts.
    pub contradictions: u64,
    /// Terms rewritten to `true`.
    pub simplified_true: u64,
    /// Terms rewritten to `false`.
    pub simplified_false: u64,
    /// Terms rewritten to an equality with a literal.
    pub simplified_eq: u64,
    /// Scopes entered.
    pub scopes_entered: u64,
    /// Scopes left.
    pub scopes_left: u64,
}

impl BvBoundsStats {
    /// Total number of rewrites produced.
    pub fn simplifications(&self) -> u64 {
        self.simplified_true + self.simplified_false + self.simplified_eq
    }
}

/// Bit-vector bounds simplifier.
#[derive(Debug, Clone)]
pub struct BvBoundsSimplifier {
    /// Context whose term ids are stored in `scopes`.
    context: ContextId,
    config: BvBoundsConfig,
    extractor: BoundExtractor,
    scopes: ScopeStack,
    stats: BvBoundsStats,
}

impl BvBoundsSimplifier {
    /// Create a simplifier for terms of `ctx` with the default configuration.
    pub fn new<C: TermContext + ?Sized>(ctx: &C) -> Self {
        Self::with_config(ctx, BvBoundsConfig::default())
    }

    /// Create a simplifier for terms of `ctx`.
    pub fn with_config<C: TermContext + ?Sized>(ctx: &C, config: BvBoundsConfig) -> Self {
        Self {
            context: ctx.context_id(),
            extractor: BoundExtractor::new(&config),
            config,
            scopes: ScopeStack::new(),
            stats: BvBoundsStats::default(),
        }
    }

    /// The configuration.
    pub fn config(&self) -> &BvBoundsConfig {
        &self.config
    }

    /// Get statistics.
    pub fn stats(&self) -> &BvBoundsStats {
        &self.stats
    }

    /// Reset statistics.
    pub fn reset_stats(&mut self) {
        self.stats = BvBoundsStats::default();
    }

    /// The interval currently known for `term`.
    pub fn bound_of(&self, term: TermId) -> Option<&Interval> {
        self.scopes.lookup(term)
    }

    /// Open a nested scope.
    pub fn enter_scope(&mut self) {
        trace!("push");
        self.stats.scopes_entered += 1;
        self.scopes.enter_scope();
    }

    /// Close the `num_scopes` innermost scopes.
    pub fn leave_scopes(&mut self, num_scopes: usize) -> Result<()> {
        trace!("pop: {}", num_scopes);
        self.scopes.leave_scopes(num_scopes)?;
        self.stats.scopes_left += num_scopes as u64;
        Ok(())
    }

    /// Number of open scopes.
    pub fn current_depth(&self) -> usize {
        self.scopes.current_depth()
    }

    fn check_context<C: TermContext + ?Sized>(&self, ctx: &C) {
        debug_assert_eq!(
            self.context,
            ctx.context_id(),
            "bounds simplifier used with terms of another context"
        );
    }
}

impl<C> CtxSimplifier<C> for BvBoundsSimplifier
where
    C: TermContext + BvShapes + ?Sized,
{
    fn on_hypothesis(&mut self, ctx: &C, term: TermId, polarity: Polarity) -> Result<()> {
        self.check_context(ctx);

        let Some(bound) = self.extractor.extract(ctx, term) else {
            self.stats.hypotheses_ignored += 1;
            return Ok(());
        };
        debug_assert_eq!(ctx.bv_width(bound.term), Some(bound.interval.width()));

        let subject = bound.term;
        let Some(bound) = bound.clone().under(polarity) else {
            self.stats.contradictions += 1;
            return Err(BoundsError::EmptyNegation {
                term: subject,
                bound: bound.interval,
            });
        };

        trace!(
            "{}{}: {} in {}",
            if polarity.is_negated() { "not " } else { "" },
            term,
            bound.term,
            bound.interval
        );

        match self.scopes.record(bound.term, bound.interval) {
            Ok(_) => {
                self.stats.hypotheses_recorded += 1;
                Ok(())
            }
            Err(err) => {
                self.stats.contradictions += 1;
                Err(err)
            }
        }
    }

    fn try_simplify(&mut self, ctx: &mut C, term: TermId) -> Option<TermId> {
        self.check_context(ctx);

        let bound = self.extractor.extract(ctx, term)?;
        let known = self.scopes.lookup(bound.term)?;

        let result = match bound.interval.intersect(known) {
            None => {
                self.stats.simplified_false += 1;
                ctx.mk_false()
            }
            Some(_) if known.implies(&bound.interval) => {
                self.stats.simplified_true += 1;
                ctx.mk_true()
            }
            // a point candidate is already an equality, pinning adds nothing
            Some(common)
                if self.config.propagate_eq && common.is_point() && !bound.interval.is_point() =>
            {
                self.stats.simplified_eq += 1;
                let value = ctx.mk_bv_numeral(common.lower(), common.width());
                ctx.mk_eq(bound.term, value)
            }
            Some(_) => return None,
        };

        trace!("{} {} (ctx: {}): {}", term, bound.interval, known, result);
        Some(result)
    }

    fn enter_scope(&mut self) {
        BvBoundsSimplifier::enter_scope(self);
    }

    fn leave_scopes(&mut self, num_scopes: usize) -> Result<()> {
        BvBoundsSimplifier::leave_scopes(self, num_scopes)
    }

    fn current_depth(&self) -> usize {
        BvBoundsSimplifier::current_depth(self)
    }

    fn clone_for(&self, ctx: &C) -> Box<dyn CtxSimplifier<C>> {
        Box::new(BvBoundsSimplifier::with_config(ctx, self.config.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::TermManager;
    use num_bigint::BigUint;

    fn iv(lower: u32, upper: u32) -> Interval {
        Interval::new(BigUint::from(lower), BigUint::from(upper), 8)
    }

    fn setup() -> (TermManager, TermId, BvBoundsSimplifier) {
        let mut tm = TermManager::new();
        let x = tm.mk_bv_var("x", 8);
        let simp = BvBoundsSimplifier::new(&tm);
        (tm, x, simp)
    }

    #[test]
    fn test_hypothesis_records_bound() {
        let (mut tm, x, mut simp) = setup();
        let five = tm.mk_bitvec(5u32, 8);
        let le = tm.mk_bvule(x, five);

        simp.on_hypothesis(&tm, le, Polarity::Positive).unwrap();
        assert_eq!(simp.bound_of(x), Some(&iv(0, 5)));
        assert_eq!(simp.stats().hypotheses_recorded, 1);
    }

    #[test]
    fn test_negated_hypothesis() {
        let (mut tm, x, mut simp) = setup();
        let two = tm.mk_bitvec(2u32, 8);
        let le = tm.mk_bvule(x, two);

        simp.on_hypothesis(&tm, le, Polarity::Negative).unwrap();
        assert_eq!(simp.bound_of(x), Some(&iv(3, 255)));
    }

    #[test]
    fn test_unrecognized_hypothesis_ignored() {
        let (mut tm, x, mut simp) = setup();
        let y = tm.mk_bv_var("y", 8);
        let le = tm.mk_bvule(x, y);

        simp.on_hypothesis(&tm, le, Polarity::Positive).unwrap();
        assert!(simp.bound_of(x).is_none());
        assert_eq!(simp.stats().hypotheses_ignored, 1);
    }

    #[test]
    fn test_negated_full_bound_is_infeasible() {
        let (mut tm, x, mut simp) = setup();
        let max = tm.mk_bitvec(255u32, 8);
        let le = tm.mk_bvule(x, max);

        let err = simp.on_hypothesis(&tm, le, Polarity::Negative).unwrap_err();
        assert!(matches!(err, BoundsError::EmptyNegation { .. }));
        assert!(err.is_infeasible());
        assert_eq!(simp.stats().contradictions, 1);
    }

    #[test]
    fn test_contradicting_hypothesis() {
        let (mut tm, x, mut simp) = setup();
        let three = tm.mk_bitvec(3u32, 8);
        let nine = tm.mk_bitvec(9u32, 8);
        let le = tm.mk_bvule(x, three);
        let ge = tm.mk_bvule(nine, x);

        simp.on_hypothesis(&tm, le, Polarity::Positive).unwrap();
        let err = simp.on_hypothesis(&tm, ge, Polarity::Positive).unwrap_err();
        assert!(matches!(err, BoundsError::Contradiction { .. }));
        assert_eq!(simp.bound_of(x), Some(&iv(0, 3)));
    }

    #[test]
    fn test_simplify_without_context() {
        let (mut tm, x, mut simp) = setup();
        let five = tm.mk_bitvec(5u32, 8);
        let le = tm.mk_bvule(x, five);

        assert!(simp.try_simplify(&mut tm, le).is_none());
    }

    #[test]
    fn test_simplify_pins_value() {
        let (mut tm, x, mut simp) = setup();
        let five = tm.mk_bitvec(5u32, 8);
        let ge = tm.mk_bvule(five, x);
        let le = tm.mk_bvule(x, five);

        simp.on_hypothesis(&tm, ge, Polarity::Positive).unwrap();
        let result = simp.try_simplify(&mut tm, le).unwrap();
        assert_eq!(result, tm.mk_eq(x, five));
        assert_eq!(simp.stats().simplified_eq, 1);
    }

    #[test]
    fn test_pinning_disabled() {
        let mut tm = TermManager::new();
        let x = tm.mk_bv_var("x", 8);
        let config = BvBoundsConfig {
            propagate_eq: false,
            ..BvBoundsConfig::default()
        };
        let mut simp = BvBoundsSimplifier::with_config(&tm, config);
        let five = tm.mk_bitvec(5u32, 8);
        let ge = tm.mk_bvule(five, x);
        let le = tm.mk_bvule(x, five);

        simp.on_hypothesis(&tm, ge, Polarity::Positive).unwrap();
        assert!(simp.try_simplify(&mut tm, le).is_none());
    }

    #[test]
    fn test_signed_context() {
        let (mut tm, x, mut simp) = setup();
        let zero = tm.mk_bitvec(0u32, 8);
        let ten = tm.mk_bitvec(10u32, 8);
        let nonneg = tm.mk_bvsle(zero, x);
        let small = tm.mk_bvule(x, ten);
        let max_pos = tm.mk_bitvec(127u32, 8);
        let unsigned_bound = tm.mk_bvule(x, max_pos);

        simp.on_hypothesis(&tm, nonneg, Polarity::Positive).unwrap();
        assert_eq!(simp.bound_of(x), Some(&iv(0, 127)));
        assert!(simp.try_simplify(&mut tm, small).is_none());
        let t = tm.mk_true();
        assert_eq!(simp.try_simplify(&mut tm, unsigned_bound), Some(t));
    }

    #[test]
    fn test_scopes_forget_facts() {
        let (mut tm, x, mut simp) = setup();
        let five = tm.mk_bitvec(5u32, 8);
        let ten = tm.mk_bitvec(10u32, 8);
        let le5 = tm.mk_bvule(x, five);
        let le10 = tm.mk_bvule(x, ten);

        simp.enter_scope();
        simp.on_hypothesis(&tm, le5, Polarity::Positive).unwrap();
        assert!(simp.try_simplify(&mut tm, le10).is_some());
        assert_eq!(simp.current_depth(), 1);

        simp.leave_scopes(1).unwrap();
        assert!(simp.try_simplify(&mut tm, le10).is_none());
        assert_eq!(simp.current_depth(), 0);
    }

    #[test]
    fn test_leave_too_many_scopes() {
        let (_tm, _x, mut simp) = setup();
        let err = simp.leave_scopes(1).unwrap_err();
        assert!(matches!(err, BoundsError::ScopeUnderflow { .. }));
    }

    #[test]
    fn test_clone_for_starts_empty() {
        let (mut tm, x, mut simp) = setup();
        let five = tm.mk_bitvec(5u32, 8);
        let le = tm.mk_bvule(x, five);
        simp.on_hypothesis(&tm, le, Polarity::Positive).unwrap();
        simp.enter_scope();

        let mut other_tm = TermManager::new();
        let y = other_tm.mk_bv_var("y", 8);
        let five = other_tm.mk_bitvec(5u32, 8);
        let le = other_tm.mk_bvule(y, five);

        let mut clone = simp.clone_for(&other_tm);
        assert_eq!(clone.current_depth(), 0);
        assert!(clone.try_simplify(&mut other_tm, le).is_none());
    }
}
