//! Hash-consed term store.
//!
//! [`TermManager`] owns every term it creates and hands out [`TermId`]s that
//! index into its arena. Structurally equal terms share one id, so ids can be
//! compared and hashed in place of the terms themselves.

use crate::interval::{BvWidth, max_value};
use crate::term::{BvShapes, ContextId, TermContext, TermId};
use lasso::{Rodeo, Spur};
use num_bigint::BigUint;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

/// Sort of a term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sort {
    /// Booleans.
    Bool,
    /// Bit-vectors of the given width.
    BitVec(BvWidth),
}

/// Term constructors.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TermKind {
    /// Boolean `true`.
    True,
    /// Boolean `false`.
    False,
    /// Boolean variable.
    BoolVar(Spur),
    /// Bit-vector variable.
    BvVar(Spur, BvWidth),
    /// Bit-vector literal.
    BitVecConst {
        /// Value, already reduced to the width.
        value: BigUint,
        /// Width in bits.
        width: BvWidth,
    },
    /// Negation.
    Not(TermId),
    /// Conjunction.
    And(SmallVec<[TermId; 4]>),
    /// Disjunction.
    Or(SmallVec<[TermId; 4]>),
    /// Equality.
    Eq(TermId, TermId),
    /// Unsigned less-or-equal.
    BvUle(TermId, TermId),
    /// Signed less-or-equal.
    BvSle(TermId, TermId),
}

/// A term together with its sort.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Term {
    /// Constructor and arguments.
    pub kind: TermKind,
    /// Sort of the term.
    pub sort: Sort,
}

/// Arena of hash-consed terms.
#[derive(Debug)]
pub struct TermManager {
    id: ContextId,
    terms: Vec<Term>,
    cache: FxHashMap<TermKind, TermId>,
    names: Rodeo,
}

impl TermManager {
    /// Create an empty manager with a fresh [`ContextId`].
    pub fn new() -> Self {
        Self {
            id: ContextId::fresh(),
            terms: Vec::new(),
            cache: FxHashMap::default(),
            names: Rodeo::default(),
        }
    }

    /// Look up a term.
    pub fn get(&self, id: TermId) -> Option<&Term> {
        self.terms.get(id.0 as usize)
    }

    /// Constructor of a term.
    pub fn kind(&self, id: TermId) -> Option<&TermKind> {
        self.get(id).map(|t| &t.kind)
    }

    /// Sort of a term.
    pub fn sort(&self, id: TermId) -> Option<Sort> {
        self.get(id).map(|t| t.sort)
    }

    /// Number of distinct terms.
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// True if no term has been created.
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// True if `id` is the constant `true`.
    pub fn is_true(&self, id: TermId) -> bool {
        matches!(self.kind(id), Some(TermKind::True))
    }

    /// True if `id` is the constant `false`.
    pub fn is_false(&self, id: TermId) -> bool {
        matches!(self.kind(id), Some(TermKind::False))
    }

    fn intern(&mut self, kind: TermKind, sort: Sort) -> TermId {
        if let Some(&id) = self.cache.get(&kind) {
            return id;
        }
        let id = TermId(self.terms.len() as u32);
        self.cache.insert(kind.clone(), id);
        self.terms.push(Term { kind, sort });
        id
    }

    /// Boolean `true`.
    pub fn mk_true(&mut self) -> TermId {
        self.intern(TermKind::True, Sort::Bool)
    }

    /// Boolean `false`.
    pub fn mk_false(&mut self) -> TermId {
        self.intern(TermKind::False, Sort::Bool)
    }

    /// Boolean constant.
    pub fn mk_bool(&mut self, value: bool) -> TermId {
        if value { self.mk_true() } else { self.mk_false() }
    }

    /// Boolean variable.
    pub fn mk_bool_var(&mut self, name: &str) -> TermId {
        let name = self.names.get_or_intern(name);
        self.intern(TermKind::BoolVar(name), Sort::Bool)
    }

    /// Bit-vector variable.
    pub fn mk_bv_var(&mut self, name: &str, width: BvWidth) -> TermId {
        let name = self.names.get_or_intern(name);
        self.intern(TermKind::BvVar(name, width), Sort::BitVec(width))
    }

    /// Bit-vector literal, reduced modulo `2^width`.
    pub fn mk_bitvec(&mut self, value: impl Into<BigUint>, width: BvWidth) -> TermId {
        let value = value.into() & max_value(width);
        self.intern(TermKind::BitVecConst { value, width }, Sort::BitVec(width))
    }

    /// Negation, folding constants and double negation.
    pub fn mk_not(&mut self, arg: TermId) -> TermId {
        match self.kind(arg).cloned() {
            Some(TermKind::True) => self.mk_false(),
            Some(TermKind::False) => self.mk_true(),
            Some(TermKind::Not(inner)) => inner,
            _ => self.intern(TermKind::Not(arg), Sort::Bool),
        }
    }

    /// Conjunction. Empty is `true`, a single argument is returned as is.
    pub fn mk_and(&mut self, args: impl IntoIterator<Item = TermId>) -> TermId {
        let args: SmallVec<[TermId; 4]> = args.into_iter().collect();
        match args.len() {
            0 => self.mk_true(),
            1 => args[0],
            _ => self.intern(TermKind::And(args), Sort::Bool),
        }
    }

    /// Disjunction. Empty is `false`, a single argument is returned as is.
    pub fn mk_or(&mut self, args: impl IntoIterator<Item = TermId>) -> TermId {
        let args: SmallVec<[TermId; 4]> = args.into_iter().collect();
        match args.len() {
            0 => self.mk_false(),
            1 => args[0],
            _ => self.intern(TermKind::Or(args), Sort::Bool),
        }
    }

    /// Equality.
    pub fn mk_eq(&mut self, lhs: TermId, rhs: TermId) -> TermId {
        self.intern(TermKind::Eq(lhs, rhs), Sort::Bool)
    }

    /// Unsigned `lhs <= rhs`.
    pub fn mk_bvule(&mut self, lhs: TermId, rhs: TermId) -> TermId {
        self.intern(TermKind::BvUle(lhs, rhs), Sort::Bool)
    }

    /// Signed `lhs <= rhs`.
    pub fn mk_bvsle(&mut self, lhs: TermId, rhs: TermId) -> TermId {
        self.intern(TermKind::BvSle(lhs, rhs), Sort::Bool)
    }

    /// Render a term in SMT-LIB syntax.
    pub fn display(&self, id: TermId) -> String {
        let Some(kind) = self.kind(id) else {
            return format!("<unknown {id}>");
        };
        match kind {
            TermKind::True => "true".to_string(),
            TermKind::False => "false".to_string(),
            TermKind::BoolVar(name) | TermKind::BvVar(name, _) => {
                self.names.resolve(name).to_string()
            }
            TermKind::BitVecConst { value, width } => format!("(_ bv{value} {width})"),
            TermKind::Not(arg) => format!("(not {})", self.display(*arg)),
            TermKind::And(args) => self.display_app("and", args),
            TermKind::Or(args) => self.display_app("or", args),
            TermKind::Eq(a, b) => self.display_app("=", &[*a, *b]),
            TermKind::BvUle(a, b) => self.display_app("bvule", &[*a, *b]),
            TermKind::BvSle(a, b) => self.display_app("bvsle", &[*a, *b]),
        }
    }

    fn display_app(&self, op: &str, args: &[TermId]) -> String {
        let mut out = format!("({op}");
        for &arg in args {
            out.push(' ');
            out.push_str(&self.display(arg));
        }
        out.push(')');
        out
    }
}

impl Default for TermManager {
    fn default() -> Self {
        Self::new()
    }
}

impl TermContext for TermManager {
    fn context_id(&self) -> ContextId {
        self.id
    }

    fn mk_true(&mut self) -> TermId {
        TermManager::mk_true(self)
    }

    fn mk_false(&mut self) -> TermId {
        TermManager::mk_false(self)
    }

    fn mk_eq(&mut self, lhs: TermId, rhs: TermId) -> TermId {
        TermManager::mk_eq(self, lhs, rhs)
    }

    fn mk_bv_numeral(&mut self, value: &BigUint, width: u32) -> TermId {
        self.mk_bitvec(value.clone(), width)
    }

    fn bv_width(&self, term: TermId) -> Option<u32> {
        match self.sort(term)? {
            Sort::BitVec(width) => Some(width),
            Sort::Bool => None,
        }
    }
}

impl BvShapes for TermManager {
    fn as_bv_ule(&self, term: TermId) -> Option<(TermId, TermId)> {
        match self.kind(term)? {
            TermKind::BvUle(a, b) => Some((*a, *b)),
            _ => None,
        }
    }

    fn as_bv_sle(&self, term: TermId) -> Option<(TermId, TermId)> {
        match self.kind(term)? {
            TermKind::BvSle(a, b) => Some((*a, *b)),
            _ => None,
        }
    }

    fn as_eq(&self, term: TermId) -> Option<(TermId, TermId)> {
        match self.kind(term)? {
            TermKind::Eq(a, b) => Some((*a, *b)),
            _ => None,
        }
    }

    fn as_bv_numeral(&self, term: TermId) -> Option<(BigUint, u32)> {
        match self.kind(term)? {
            TermKind::BitVecConst { value, width } => Some((value.clone(), *width)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_consing() {
        let mut tm = TermManager::new();
        let x = tm.mk_bv_var("x", 8);
        let five = tm.mk_bitvec(5u32, 8);
        let a = tm.mk_bvule(x, five);
        let b = tm.mk_bvule(x, five);
        assert_eq!(a, b);
        assert_eq!(tm.mk_bv_var("x", 8), x);
        assert_ne!(tm.mk_bv_var("x", 16), x);
    }

    #[test]
    fn test_bitvec_reduced() {
        let mut tm = TermManager::new();
        let a = tm.mk_bitvec(261u32, 8);
        let b = tm.mk_bitvec(5u32, 8);
        assert_eq!(a, b);
        assert_eq!(tm.as_bv_numeral(a), Some((BigUint::from(5u32), 8)));
    }

    #[test]
    fn test_not_folding() {
        let mut tm = TermManager::new();
        let p = tm.mk_bool_var("p");
        let not_p = tm.mk_not(p);
        assert_eq!(tm.mk_not(not_p), p);

        let t = tm.mk_true();
        let not_t = tm.mk_not(t);
        assert!(tm.is_false(not_t));
    }

    #[test]
    fn test_and_or_degenerate() {
        let mut tm = TermManager::new();
        let p = tm.mk_bool_var("p");
        let empty_and = tm.mk_and([]);
        let empty_or = tm.mk_or([]);
        assert!(tm.is_true(empty_and));
        assert!(tm.is_false(empty_or));
        assert_eq!(tm.mk_and([p]), p);
    }

    #[test]
    fn test_sorts_and_widths() {
        let mut tm = TermManager::new();
        let x = tm.mk_bv_var("x", 32);
        let p = tm.mk_bool_var("p");
        assert_eq!(tm.bv_width(x), Some(32));
        assert_eq!(tm.bv_width(p), None);
        assert_eq!(tm.sort(p), Some(Sort::Bool));
    }

    #[test]
    fn test_display() {
        let mut tm = TermManager::new();
        let x = tm.mk_bv_var("x", 8);
        let five = tm.mk_bitvec(5u32, 8);
        let le = tm.mk_bvule(x, five);
        let not_le = tm.mk_not(le);
        assert_eq!(tm.display(not_le), "(not (bvule x (_ bv5 8)))");
    }

    #[test]
    fn test_context_ids_distinct() {
        let a = TermManager::new();
        let b = TermManager::new();
        assert_ne!(a.context_id(), b.context_id());
    }
}
