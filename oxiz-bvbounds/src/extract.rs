//! Bound extraction from comparisons against literals.
//!
//! Recognized shapes, with `v` the non-literal side and `n` the literal:
//!
//! | term        | bound on `v`              |
//! |-------------|---------------------------|
//! | `n <=u v`   | `[n, 2^w - 1]`            |
//! | `v <=u n`   | `[0, n]`                  |
//! | `n <=s v`   | `[n, 2^(w-1) - 1]`        |
//! | `v <=s n`   | `[2^(w-1), n]`            |
//! | `n = v`     | `[n, n]`                  |
//!
//! Signed bounds are written in the unsigned encoding, so they usually wrap.

use crate::config::BvBoundsConfig;
use crate::interval::{BvWidth, Interval, max_value};
use crate::term::{BvShapes, TermId};
use num_bigint::BigUint;
use num_traits::{One, Zero};

/// Whether a hypothesis is assumed as stated or negated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Polarity {
    /// The hypothesis holds.
    #[default]
    Positive,
    /// The negation of the hypothesis holds.
    Negative,
}

impl Polarity {
    /// Polarity from a "negated" flag.
    #[must_use]
    pub fn from_sign(negated: bool) -> Self {
        if negated {
            Polarity::Negative
        } else {
            Polarity::Positive
        }
    }

    /// True for [`Polarity::Negative`].
    pub fn is_negated(self) -> bool {
        self == Polarity::Negative
    }

    /// The opposite polarity.
    #[must_use]
    pub fn flip(self) -> Self {
        match self {
            Polarity::Positive => Polarity::Negative,
            Polarity::Negative => Polarity::Positive,
        }
    }
}

/// Comparison a bound was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundShape {
    /// Unsigned `bvule`.
    Ule,
    /// Signed `bvsle`.
    Sle,
    /// Equality.
    Eq,
}

/// A range constraint on a subterm.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bound {
    /// The constrained subterm.
    pub term: TermId,
    /// Values the subterm may take.
    pub interval: Interval,
    /// Comparison the bound came from.
    pub shape: BoundShape,
}

impl Bound {
    /// The bound that holds when the comparison is assumed with `polarity`.
    ///
    /// Returns `None` if the comparison is negated and its bound is the whole
    /// domain.
    pub fn under(self, polarity: Polarity) -> Option<Bound> {
        match polarity {
            Polarity::Positive => Some(self),
            Polarity::Negative => {
                let interval = self.interval.negate()?;
                Some(Bound { interval, ..self })
            }
        }
    }
}

/// Turns comparisons against literals into [`Bound`]s.
#[derive(Debug, Clone, Copy)]
pub struct BoundExtractor {
    use_signed: bool,
    use_equalities: bool,
}

impl BoundExtractor {
    /// Create an extractor honoring the shape toggles of `config`.
    pub fn new(config: &BvBoundsConfig) -> Self {
        Self {
            use_signed: config.use_signed,
            use_equalities: config.use_equalities,
        }
    }

    /// Extract the bound asserted by `term`, if it has a recognized shape.
    pub fn extract<C: BvShapes + ?Sized>(&self, ctx: &C, term: TermId) -> Option<Bound> {
        if let Some((lhs, rhs)) = ctx.as_bv_ule(term) {
            if let Some((n, width)) = ctx.as_bv_numeral(lhs) {
                // n ule x <=> x uge n
                let interval = Interval::new(n, max_value(width), width);
                return Some(bound(rhs, interval, BoundShape::Ule));
            }
            if let Some((n, width)) = ctx.as_bv_numeral(rhs) {
                let interval = Interval::new(BigUint::zero(), n, width);
                return Some(bound(lhs, interval, BoundShape::Ule));
            }
            return None;
        }

        if let Some((lhs, rhs)) = ctx.as_bv_sle(term) {
            if !self.use_signed {
                return None;
            }
            if let Some((n, width)) = ctx.as_bv_numeral(lhs) {
                // n sle x <=> x sge n
                let interval = Interval::new(n, signed_max(width), width);
                return Some(bound(rhs, interval, BoundShape::Sle));
            }
            if let Some((n, width)) = ctx.as_bv_numeral(rhs) {
                let interval = Interval::new(signed_min(width), n, width);
                return Some(bound(lhs, interval, BoundShape::Sle));
            }
            return None;
        }

        if let Some((lhs, rhs)) = ctx.as_eq(term) {
            if !self.use_equalities {
                return None;
            }
            if let Some((n, width)) = ctx.as_bv_numeral(lhs) {
                return Some(bound(rhs, Interval::point(n, width), BoundShape::Eq));
            }
            if let Some((n, width)) = ctx.as_bv_numeral(rhs) {
                return Some(bound(lhs, Interval::point(n, width), BoundShape::Eq));
            }
        }

        None
    }
}

impl Default for BoundExtractor {
    fn default() -> Self {
        Self::new(&BvBoundsConfig::default())
    }
}

fn bound(term: TermId, interval: Interval, shape: BoundShape) -> Bound {
    Bound {
        term,
        interval,
        shape,
    }
}

/// Unsigned encoding of the most negative signed value, `2^(w-1)`.
fn signed_min(width: BvWidth) -> BigUint {
    BigUint::one() << (width as usize - 1)
}

/// Unsigned encoding of the largest signed value, `2^(w-1) - 1`.
fn signed_max(width: BvWidth) -> BigUint {
    signed_min(width) - BigUint::one()
}
