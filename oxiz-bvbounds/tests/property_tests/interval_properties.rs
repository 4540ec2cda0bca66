//! Property-based tests for modular intervals
//!
//! Tests:
//! - Representation invariants
//! - Soundness of implies and intersect
//! - Exactness of negation

use num_bigint::BigUint;
use oxiz_bvbounds::{Interval, max_value};
use proptest::prelude::*;

const WIDTH: u32 = 8;

fn interval() -> impl Strategy<Value = Interval> {
    (0u32..256, 0u32..256)
        .prop_map(|(lower, upper)| Interval::new(BigUint::from(lower), BigUint::from(upper), WIDTH))
}

fn values() -> impl Iterator<Item = BigUint> {
    (0u32..256).map(BigUint::from)
}

proptest! {
    /// Bounds stay in the domain and a full cover is stored as `[0, max]`
    #[test]
    fn bounds_in_domain(a in interval()) {
        let top = max_value(WIDTH);
        prop_assert!(a.lower() <= &top);
        prop_assert!(a.upper() <= &top);
        if a.is_full() {
            prop_assert_eq!(a.lower(), &BigUint::from(0u32));
        }
        prop_assert!(a.lower() != &(a.upper() + 1u32));
    }

    /// The full interval is the identity of intersect
    #[test]
    fn full_is_identity(a in interval()) {
        let full = Interval::full(WIDTH);
        prop_assert_eq!(a.intersect(&full), Some(a.clone()));
        prop_assert_eq!(full.intersect(&a), Some(a.clone()));
        prop_assert!(a.implies(&full));
    }

    /// Every interval implies itself
    #[test]
    fn implies_reflexive(a in interval()) {
        prop_assert!(a.implies(&a));
    }

    /// If `a` implies `b`, every value of `a` is a value of `b`
    #[test]
    fn implies_sound(a in interval(), b in interval()) {
        if a.implies(&b) {
            for v in values() {
                prop_assert!(!a.contains(&v) || b.contains(&v), "{} in {} but not {}", v, a, b);
            }
        }
    }

    /// Intersect never loses a common value
    #[test]
    fn intersect_sound(a in interval(), b in interval()) {
        let common = a.intersect(&b);
        for v in values() {
            if a.contains(&v) && b.contains(&v) {
                let Some(r) = &common else {
                    return Err(TestCaseError::fail(format!("{} and {} share {}", a, b, v)));
                };
                prop_assert!(r.contains(&v), "{} missing from {}", v, r);
            }
        }
    }

    /// Intersecting with a point inside an interval gives the point
    #[test]
    fn point_is_pinned(a in interval(), n in 0u32..256) {
        let n = BigUint::from(n);
        let point = Interval::point(n.clone(), WIDTH);
        if a.contains(&n) {
            prop_assert_eq!(point.intersect(&a), Some(point.clone()));
            prop_assert_eq!(a.intersect(&point), Some(point.clone()));
        } else {
            prop_assert_eq!(point.intersect(&a), None);
        }
    }

    /// Negation holds exactly the values outside the interval
    #[test]
    fn negate_is_complement(a in interval()) {
        match a.negate() {
            None => prop_assert!(a.is_full()),
            Some(neg) => {
                for v in values() {
                    prop_assert_ne!(a.contains(&v), neg.contains(&v));
                }
                prop_assert_eq!(neg.negate(), Some(a.clone()));
            }
        }
    }
}
