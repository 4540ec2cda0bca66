//! Term handles and the collaborator interfaces the bounds simplifier consumes.
//!
//! The simplifier never owns or dereferences terms. It hashes and compares
//! [`TermId`]s, asks a [`BvShapes`] implementation what a term looks like, and
//! asks a [`TermContext`] to build the replacement terms it produces.

use num_bigint::BigUint;
use std::sync::atomic::{AtomicU32, Ordering};

/// Opaque handle to a term owned by a [`TermContext`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TermId(pub u32);

impl TermId {
    /// Create a handle from a raw index.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Raw index of this handle.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for TermId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "t{}", self.0)
    }
}

/// Identity of a term-ownership context.
///
/// Term handles are only meaningful inside the context that allocated them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContextId(u32);

impl ContextId {
    /// Allocate an identity distinct from every previously allocated one.
    #[must_use]
    pub fn fresh() -> Self {
        static NEXT: AtomicU32 = AtomicU32::new(0);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// Term construction and sort queries.
pub trait TermContext {
    /// Identity of this context.
    fn context_id(&self) -> ContextId;

    /// The Boolean constant `true`.
    fn mk_true(&mut self) -> TermId;

    /// The Boolean constant `false`.
    fn mk_false(&mut self) -> TermId;

    /// Equality between two terms.
    fn mk_eq(&mut self, lhs: TermId, rhs: TermId) -> TermId;

    /// Bit-vector literal of the given width.
    fn mk_bv_numeral(&mut self, value: &BigUint, width: u32) -> TermId;

    /// Bit width of a bit-vector term, `None` for other sorts.
    fn bv_width(&self, term: TermId) -> Option<u32>;
}

/// Recognizer for the bit-vector term shapes the bounds simplifier reasons about.
pub trait BvShapes {
    /// Operands of an unsigned `bvule` application.
    fn as_bv_ule(&self, term: TermId) -> Option<(TermId, TermId)>;

    /// Operands of a signed `bvsle` application.
    fn as_bv_sle(&self, term: TermId) -> Option<(TermId, TermId)>;

    /// Operands of an equality.
    fn as_eq(&self, term: TermId) -> Option<(TermId, TermId)>;

    /// Value and width of a bit-vector literal.
    fn as_bv_numeral(&self, term: TermId) -> Option<(BigUint, u32)>;
}
