//! Configuration for contextual bounds simplification.

use serde::{Deserialize, Serialize};

/// Configuration for the bit-vector bounds simplifier and tactic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BvBoundsConfig {
    /// Rewrite a comparison to an equality when the context pins its subterm
    /// to a single value.
    pub propagate_eq: bool,
    /// Recognize signed `bvsle` comparisons against literals.
    pub use_signed: bool,
    /// Recognize equalities against literals.
    pub use_equalities: bool,
    /// Maximum nesting of `and`/`or` the tactic descends into.
    pub max_depth: usize,
}

impl Default for BvBoundsConfig {
    fn default() -> Self {
        Self {
            propagate_eq: true,
            use_signed: true,
            use_equalities: true,
            max_depth: 64,
        }
    }
}

impl BvBoundsConfig {
    /// Configuration that only tracks unsigned comparisons.
    #[must_use]
    pub fn unsigned_only() -> Self {
        Self {
            use_signed: false,
            ..Self::default()
        }
    }
}
