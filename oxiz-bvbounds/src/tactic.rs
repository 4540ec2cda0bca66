//! Contextual simplification tactic.
//!
//! Walks the assertions of a goal, rewriting each one under the hypotheses
//! collected so far and then assuming it. Inside `and`/`or` every argument is
//! rewritten in a nested scope where the preceding arguments are assumed true
//! (for `and`) or false (for `or`).

use crate::ast::{TermKind, TermManager};
use crate::config::BvBoundsConfig;
use crate::error::Result;
use crate::extract::Polarity;
use crate::simplifier::{BvBoundsSimplifier, CtxSimplifier};
use crate::term::TermId;
use smallvec::SmallVec;
use tracing::debug;

/// A goal: a conjunction of assertions.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Goal {
    /// The assertions in this goal.
    pub assertions: Vec<TermId>,
}

impl Goal {
    /// Create a new goal with the given assertions.
    #[must_use]
    pub fn new(assertions: Vec<TermId>) -> Self {
        Self { assertions }
    }

    /// Add an assertion to the goal.
    pub fn add(&mut self, term: TermId) {
        self.assertions.push(term);
    }

    /// Check if the goal is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.assertions.is_empty()
    }

    /// Get the number of assertions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.assertions.len()
    }
}

/// Solve result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveResult {
    /// Satisfiable.
    Sat,
    /// Unsatisfiable.
    Unsat,
}

/// Result of applying a tactic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TacticResult {
    /// The goal was solved.
    Solved(SolveResult),
    /// The goal was transformed into sub-goals.
    SubGoals(Vec<Goal>),
    /// The tactic does not apply to this goal.
    NotApplicable,
}

/// A tactic transforms goals into sub-goals.
pub trait Tactic: Send + Sync {
    /// Get the name of this tactic.
    fn name(&self) -> &str;

    /// Apply the tactic to a goal whose terms live in `tm`.
    fn apply(&self, goal: &Goal, tm: &mut TermManager) -> Result<TacticResult>;

    /// Get a description of the tactic.
    fn description(&self) -> &str {
        ""
    }
}

/// Builds one simplifier per goal.
pub type SimplifierFactory =
    Box<dyn Fn(&TermManager) -> Box<dyn CtxSimplifier<TermManager>> + Send + Sync>;

/// Tactic rewriting assertions with a [`CtxSimplifier`].
pub struct CtxSimplifyTactic {
    name: String,
    factory: SimplifierFactory,
    max_depth: usize,
}

impl CtxSimplifyTactic {
    /// Create a tactic using simplifiers produced by `factory`.
    pub fn new(name: impl Into<String>, factory: SimplifierFactory, max_depth: usize) -> Self {
        Self {
            name: name.into(),
            factory,
            max_depth,
        }
    }
}

impl std::fmt::Debug for CtxSimplifyTactic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CtxSimplifyTactic")
            .field("name", &self.name)
            .field("max_depth", &self.max_depth)
            .finish_non_exhaustive()
    }
}

impl Tactic for CtxSimplifyTactic {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, goal: &Goal, tm: &mut TermManager) -> Result<TacticResult> {
        let mut walker = Walker {
            simplifier: (self.factory)(&*tm),
            tm,
            max_depth: self.max_depth,
        };

        let mut assertions = Vec::with_capacity(goal.len());
        let mut changed = false;

        for &assertion in &goal.assertions {
            let simplified = walker.simplify(assertion, 0)?;
            if simplified != assertion {
                debug!(
                    "{}: {} -> {}",
                    self.name,
                    walker.tm.display(assertion),
                    walker.tm.display(simplified)
                );
                changed = true;
            }

            if walker.tm.is_false(simplified) {
                return Ok(TacticResult::Solved(SolveResult::Unsat));
            }
            if walker.tm.is_true(simplified) {
                continue;
            }

            match walker.assume(simplified, Polarity::Positive) {
                Ok(()) => {}
                Err(err) if err.is_infeasible() => {
                    debug!("{}: {}", self.name, err);
                    return Ok(TacticResult::Solved(SolveResult::Unsat));
                }
                Err(err) => return Err(err),
            }
            assertions.push(simplified);
        }

        if !changed {
            return Ok(TacticResult::NotApplicable);
        }
        if assertions.is_empty() {
            return Ok(TacticResult::Solved(SolveResult::Sat));
        }
        Ok(TacticResult::SubGoals(vec![Goal::new(assertions)]))
    }

    fn description(&self) -> &str {
        "Simplifies assertions using the assertions that precede them"
    }
}

/// Contextual bit-vector bounds simplification tactic.
///
/// Each application builds a fresh [`BvBoundsSimplifier`] for the goal.
pub fn mk_bv_bounds_tactic(config: BvBoundsConfig) -> CtxSimplifyTactic {
    let max_depth = config.max_depth;
    let factory: SimplifierFactory =
        Box::new(move |tm: &TermManager| -> Box<dyn CtxSimplifier<TermManager>> {
            Box::new(BvBoundsSimplifier::with_config(tm, config.clone()))
        });
    CtxSimplifyTactic::new("bv-bounds", factory, max_depth)
}

/// State of one tactic application.
struct Walker<'a> {
    tm: &'a mut TermManager,
    simplifier: Box<dyn CtxSimplifier<TermManager>>,
    max_depth: usize,
}

impl Walker<'_> {
    fn simplify(&mut self, term: TermId, depth: usize) -> Result<TermId> {
        if let Some(result) = self.simplifier.try_simplify(self.tm, term) {
            return Ok(result);
        }

        match self.tm.kind(term).cloned() {
            Some(TermKind::Not(arg)) => {
                let simplified = self.simplify(arg, depth)?;
                if simplified == arg {
                    Ok(term)
                } else {
                    Ok(self.tm.mk_not(simplified))
                }
            }
            Some(TermKind::And(args)) if depth < self.max_depth => {
                self.simplify_connective(term, &args, depth, Polarity::Positive)
            }
            Some(TermKind::Or(args)) if depth < self.max_depth => {
                self.simplify_connective(term, &args, depth, Polarity::Negative)
            }
            _ => Ok(term),
        }
    }

    /// Rewrite the arguments of an `and` (assumed positively) or an `or`
    /// (assumed negatively), each under the assumption of those before it.
    fn simplify_connective(
        &mut self,
        term: TermId,
        args: &[TermId],
        depth: usize,
        polarity: Polarity,
    ) -> Result<TermId> {
        let is_and = polarity == Polarity::Positive;

        self.simplifier.enter_scope();
        let outcome = self.rewrite_args(args, depth, polarity);
        self.simplifier.leave_scopes(1)?;

        let Some(new_args) = outcome? else {
            return Ok(self.tm.mk_bool(!is_and));
        };

        if new_args.as_slice() == args {
            return Ok(term);
        }
        Ok(if is_and {
            self.tm.mk_and(new_args)
        } else {
            self.tm.mk_or(new_args)
        })
    }

    /// `None` if the connective collapsed to its absorbing element.
    fn rewrite_args(
        &mut self,
        args: &[TermId],
        depth: usize,
        polarity: Polarity,
    ) -> Result<Option<SmallVec<[TermId; 4]>>> {
        let absorbing = polarity.is_negated();
        let mut new_args = SmallVec::new();

        for &arg in args {
            let simplified = self.simplify(arg, depth + 1)?;
            if self.is_bool(simplified, absorbing) {
                return Ok(None);
            }
            if self.is_bool(simplified, !absorbing) {
                continue;
            }

            match self.assume(simplified, polarity) {
                Ok(()) => {}
                // the preceding arguments already decide the connective
                Err(err) if err.is_infeasible() => return Ok(None),
                Err(err) => return Err(err),
            }
            new_args.push(simplified);
        }

        Ok(Some(new_args))
    }

    fn is_bool(&self, term: TermId, value: bool) -> bool {
        if value {
            self.tm.is_true(term)
        } else {
            self.tm.is_false(term)
        }
    }

    /// Assume `term` with `polarity`, looking through negations and, for
    /// positive conjunctions, into their arguments.
    fn assume(&mut self, term: TermId, polarity: Polarity) -> Result<()> {
        match self.tm.kind(term).cloned() {
            Some(TermKind::Not(arg)) => self.assume(arg, polarity.flip()),
            Some(TermKind::And(args)) if polarity == Polarity::Positive => {
                args.iter().try_for_each(|&arg| self.assume(arg, polarity))
            }
            Some(TermKind::Or(args)) if polarity == Polarity::Negative => {
                args.iter().try_for_each(|&arg| self.assume(arg, polarity))
            }
            _ => self.simplifier.on_hypothesis(self.tm, term, polarity),
        }
    }
}
