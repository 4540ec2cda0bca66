//! Scoped store of interval facts.
//!
//! Facts live in a single table. Every overwrite made inside an open scope is
//! logged on a trail together with the value it replaced, and leaving a scope
//! replays the trail back to the boundary recorded when the scope was entered.
//! The visible table at any depth is therefore exactly the table a full copy
//! per scope would hold, without copying on entry.

use crate::error::{BoundsError, Result};
use crate::interval::Interval;
use crate::term::TermId;
use rustc_hash::FxHashMap;

/// Undo record for one overwritten fact.
#[derive(Debug, Clone)]
struct TrailEntry {
    term: TermId,
    previous: Option<Interval>,
}

/// Stack of fact tables mirroring the push/pop discipline of a backtracking search.
#[derive(Debug, Clone, Default)]
pub struct ScopeStack {
    /// Facts visible at the current depth.
    facts: FxHashMap<TermId, Interval>,
    /// Overwritten facts, oldest first.
    trail: Vec<TrailEntry>,
    /// Trail length at each scope entry.
    level_boundaries: Vec<usize>,
}

impl ScopeStack {
    /// Create a stack at depth 0 with no facts.
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a nested scope inheriting every current fact.
    pub fn enter_scope(&mut self) {
        self.level_boundaries.push(self.trail.len());
    }

    /// Discard the `num_scopes` innermost scopes and every fact learned in them.
    ///
    /// Nothing is discarded if fewer than `num_scopes` scopes are open.
    pub fn leave_scopes(&mut self, num_scopes: usize) -> Result<()> {
        let depth = self.current_depth();
        if num_scopes > depth {
            return Err(BoundsError::ScopeUnderflow {
                requested: num_scopes,
                depth,
            });
        }
        if num_scopes == 0 {
            return Ok(());
        }

        let boundary = self.level_boundaries[depth - num_scopes];
        self.level_boundaries.truncate(depth - num_scopes);

        while self.trail.len() > boundary {
            if let Some(entry) = self.trail.pop() {
                match entry.previous {
                    Some(interval) => {
                        self.facts.insert(entry.term, interval);
                    }
                    None => {
                        self.facts.remove(&entry.term);
                    }
                }
            }
        }

        Ok(())
    }

    /// Number of open scopes.
    pub fn current_depth(&self) -> usize {
        self.level_boundaries.len()
    }

    /// Tighten the fact on `term` with `interval`.
    ///
    /// Returns the fact now stored. If the intersection with the existing fact
    /// is empty the store is left unchanged and a
    /// [`BoundsError::Contradiction`] is returned.
    pub fn record(&mut self, term: TermId, interval: Interval) -> Result<Interval> {
        let previous = self.facts.get(&term).cloned();

        let refined = match &previous {
            None => interval,
            Some(known) => match known.intersect(&interval) {
                Some(refined) => refined,
                None => {
                    return Err(BoundsError::Contradiction {
                        term,
                        known: known.clone(),
                        incoming: interval,
                    });
                }
            },
        };

        if previous.as_ref() == Some(&refined) {
            return Ok(refined);
        }

        // facts at depth 0 are never undone
        if !self.level_boundaries.is_empty() {
            self.trail.push(TrailEntry { term, previous });
        }
        self.facts.insert(term, refined.clone());
        Ok(refined)
    }

    /// The fact currently known for `term`.
    pub fn lookup(&self, term: TermId) -> Option<&Interval> {
        self.facts.get(&term)
    }

    /// Number of subterms with a known fact.
    pub fn len(&self) -> usize {
        self.facts.len()
    }

    /// True if no fact is known.
    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }

    /// Drop every fact and scope.
    pub fn clear(&mut self) {
        self.facts.clear();
        self.trail.clear();
        self.level_boundaries.clear();
    }
}
