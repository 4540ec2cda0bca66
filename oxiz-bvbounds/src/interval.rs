//! Modular intervals over fixed-width unsigned domains.
//!
//! An interval `[l, h]` over width `w` denotes a set of residues modulo `2^w`:
//!
//! - `l <= h`: the contiguous range `{l, ..., h}`
//! - `l > h`: the wrapped range `{0, ..., h} ∪ {l, ..., 2^w - 1}`
//!
//! Bounds are arbitrary precision so the algebra holds for any width.
//! Combining intervals of different widths is a caller bug and panics.
//!
//! ## References
//!
//! - Z3's `tactic/bv/bv_bounds_tactic.cpp`

use num_bigint::BigUint;
use num_traits::{One, Zero};
use std::cmp::{max, min};
use std::fmt;

/// Bit width of a bit-vector domain.
pub type BvWidth = u32;

/// Largest value of a `width`-bit unsigned domain, `2^width - 1`.
#[must_use]
pub fn max_value(width: BvWidth) -> BigUint {
    (BigUint::one() << width as usize) - BigUint::one()
}

/// An unsigned, possibly wrapped, range of `width`-bit values.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Interval {
    lower: BigUint,
    upper: BigUint,
    width: BvWidth,
}

impl Interval {
    /// Create an interval. Bounds are reduced modulo `2^width`.
    ///
    /// A wrapped interval with `lower = upper + 1` covers every value and is
    /// stored as the full interval.
    #[must_use]
    pub fn new(lower: BigUint, upper: BigUint, width: BvWidth) -> Self {
        debug_assert!(width > 0, "bit-vector width must be positive");
        let mask = max_value(width);
        let lower = lower & &mask;
        let upper = upper & &mask;

        if lower == &upper + 1u32 {
            return Self::full(width);
        }

        Self {
            lower,
            upper,
            width,
        }
    }

    /// The whole domain `[0, 2^width - 1]`.
    #[must_use]
    pub fn full(width: BvWidth) -> Self {
        Self {
            lower: BigUint::zero(),
            upper: max_value(width),
            width,
        }
    }

    /// The single value `[value, value]`.
    #[must_use]
    pub fn point(value: BigUint, width: BvWidth) -> Self {
        Self::new(value.clone(), value, width)
    }

    /// Lower bound (start of the high segment when wrapped).
    pub fn lower(&self) -> &BigUint {
        &self.lower
    }

    /// Upper bound (end of the low segment when wrapped).
    pub fn upper(&self) -> &BigUint {
        &self.upper
    }

    /// Width of the domain in bits.
    pub fn width(&self) -> BvWidth {
        self.width
    }

    /// True if the interval is the whole domain.
    pub fn is_full(&self) -> bool {
        self.lower.is_zero() && self.upper == max_value(self.width)
    }

    /// True if the interval wraps around the top of the domain.
    pub fn is_wrapped(&self) -> bool {
        self.lower > self.upper
    }

    /// True if the interval holds exactly one value.
    pub fn is_point(&self) -> bool {
        self.lower == self.upper
    }

    /// Check membership of a value.
    pub fn contains(&self, value: &BigUint) -> bool {
        if self.is_wrapped() {
            *value <= self.upper || (*value >= self.lower && *value <= max_value(self.width))
        } else {
            *value >= self.lower && *value <= self.upper
        }
    }

    /// True if every value of `self` is a value of `other`.
    pub fn implies(&self, other: &Interval) -> bool {
        self.check_width(other);

        if other.is_full() {
            return true;
        }
        if self.is_full() {
            return false;
        }

        if self.is_wrapped() {
            // other.upper >= upper, lower >= other.lower
            other.is_wrapped() && self.upper <= other.upper && self.lower >= other.lower
        } else if other.is_wrapped() {
            // inside the low segment or inside the high segment
            self.upper <= other.upper || self.lower >= other.lower
        } else {
            self.lower >= other.lower && self.upper <= other.upper
        }
    }

    /// Intersect two intervals, `None` if they share no value.
    ///
    /// When the exact intersection splits into more segments than an
    /// interval can hold, the tighter operand is returned instead.
    pub fn intersect(&self, other: &Interval) -> Option<Interval> {
        self.check_width(other);

        if self.is_full() || self == other {
            return Some(other.clone());
        }
        if other.is_full() {
            return Some(self.clone());
        }

        if self.is_wrapped() {
            if !other.is_wrapped() {
                return other.intersect(self);
            }
            if self.upper >= other.lower {
                Some(other.clone())
            } else if other.upper >= self.lower {
                Some(self.clone())
            } else {
                Some(Interval::new(
                    max(&self.lower, &other.lower).clone(),
                    min(&self.upper, &other.upper).clone(),
                    self.width,
                ))
            }
        } else if other.is_wrapped() {
            // .. other.upper .. lower .. upper .. other.lower ..
            if self.upper < other.lower && self.lower > other.upper {
                return None;
            }
            if self.upper >= other.lower && self.lower <= other.upper {
                Some(other.clone())
            } else if self.upper >= other.lower {
                // upper reaches the high segment, lower is above the low one
                Some(Interval::new(
                    max(&self.lower, &other.lower).clone(),
                    self.upper.clone(),
                    self.width,
                ))
            } else {
                // .. lower .. other.upper .. upper .. other.lower ..
                Some(Interval::new(
                    self.lower.clone(),
                    min(&self.upper, &other.upper).clone(),
                    self.width,
                ))
            }
        } else {
            let lower = max(&self.lower, &other.lower);
            let upper = min(&self.upper, &other.upper);
            if lower > upper {
                return None;
            }
            Some(Interval::new(lower.clone(), upper.clone(), self.width))
        }
    }

    /// Complement of the interval, `None` if the interval is full.
    pub fn negate(&self) -> Option<Interval> {
        if self.is_full() {
            return None;
        }

        let top = max_value(self.width);
        let complement = if self.lower.is_zero() {
            Interval::new(&self.upper + 1u32, top, self.width)
        } else if self.upper == top {
            Interval::new(BigUint::zero(), &self.lower - 1u32, self.width)
        } else {
            Interval::new(&self.upper + 1u32, &self.lower - 1u32, self.width)
        };
        Some(complement)
    }

    fn check_width(&self, other: &Interval) {
        assert_eq!(
            self.width, other.width,
            "cannot combine intervals of different widths"
        );
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.lower, self.upper)
    }
}
