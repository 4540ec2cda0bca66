//! Error types for bounds tracking.

use crate::interval::Interval;
use crate::term::TermId;
use thiserror::Error;

/// Errors raised while recording bounds or managing scopes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BoundsError {
    /// A new bound has no value in common with the bound already known.
    #[error("contradictory bound on {term}: known {known}, asserted {incoming}")]
    Contradiction {
        /// Subterm the bound constrains.
        term: TermId,
        /// Bound recorded in the current scope.
        known: Interval,
        /// Bound that was being recorded.
        incoming: Interval,
    },
    /// A negated hypothesis whose bound covered the whole domain.
    #[error("negation of full-domain bound {bound} on {term} is empty")]
    EmptyNegation {
        /// Subterm the bound constrains.
        term: TermId,
        /// The full-domain bound.
        bound: Interval,
    },
    /// More scopes were left than are open.
    #[error("cannot leave {requested} scope(s) at depth {depth}")]
    ScopeUnderflow {
        /// Number of scopes requested.
        requested: usize,
        /// Depth at the time of the request.
        depth: usize,
    },
}

impl BoundsError {
    /// True if this error means the current branch has no solutions.
    #[must_use]
    pub fn is_infeasible(&self) -> bool {
        matches!(
            self,
            BoundsError::Contradiction { .. } | BoundsError::EmptyNegation { .. }
        )
    }
}

/// Result type for bounds operations.
pub type Result<T> = std::result::Result<T, BoundsError>;

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigUint;

    #[test]
    fn test_infeasible_classification() {
        let bound = Interval::full(8);
        let err = BoundsError::EmptyNegation {
            term: TermId::new(1),
            bound,
        };
        assert!(err.is_infeasible());

        let err = BoundsError::ScopeUnderflow {
            requested: 2,
            depth: 1,
        };
        assert!(!err.is_infeasible());
    }

    #[test]
    fn test_contradiction_message() {
        let err = BoundsError::Contradiction {
            term: TermId::new(3),
            known: Interval::new(BigUint::from(0u32), BigUint::from(5u32), 8),
            incoming: Interval::new(BigUint::from(6u32), BigUint::from(9u32), 8),
        };
        assert_eq!(
            err.to_string(),
            "contradictory bound on t3: known [0, 5], asserted [6, 9]"
        );
    }
}
