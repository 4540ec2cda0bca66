//! Property-based tests for oxiz-bvbounds
//!
//! Intervals are checked against their set semantics by enumerating every
//! 8-bit value, and the scope stack against a copy-per-scope model.

mod interval_properties;
mod scope_properties;
