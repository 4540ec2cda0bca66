//! Property-based tests for the scope stack
//!
//! Random sequences of scope entries, exits and facts are replayed both on
//! [`ScopeStack`] and on a model keeping one full table per scope.

use num_bigint::BigUint;
use oxiz_bvbounds::{Interval, ScopeStack, TermId};
use proptest::prelude::*;
use std::collections::HashMap;

#[derive(Debug, Clone)]
enum Op {
    Enter,
    Leave(usize),
    Record(u32, Interval),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        Just(Op::Enter),
        (0usize..3).prop_map(Op::Leave),
        (0u32..4, 0u32..256, 0u32..256).prop_map(|(term, lower, upper)| {
            Op::Record(
                term,
                Interval::new(BigUint::from(lower), BigUint::from(upper), 8),
            )
        }),
    ]
}

/// One table per open scope, copied on entry.
struct Model {
    tables: Vec<HashMap<u32, Interval>>,
}

impl Model {
    fn new() -> Self {
        Self {
            tables: vec![HashMap::new()],
        }
    }

    fn top(&mut self) -> &mut HashMap<u32, Interval> {
        let last = self.tables.len() - 1;
        &mut self.tables[last]
    }

    fn depth(&self) -> usize {
        self.tables.len() - 1
    }
}

proptest! {
    /// The stack agrees with the copy-per-scope model after every operation
    #[test]
    fn matches_copying_model(ops in prop::collection::vec(op(), 0..60)) {
        let mut scopes = ScopeStack::new();
        let mut model = Model::new();

        for op in ops {
            match op {
                Op::Enter => {
                    scopes.enter_scope();
                    let copy = model.top().clone();
                    model.tables.push(copy);
                }
                Op::Leave(n) => {
                    let result = scopes.leave_scopes(n);
                    if n > model.depth() {
                        prop_assert!(result.is_err());
                    } else {
                        prop_assert!(result.is_ok());
                        let keep = model.tables.len() - n;
                        model.tables.truncate(keep);
                    }
                }
                Op::Record(term, interval) => {
                    let result = scopes.record(TermId::new(term), interval.clone());
                    let table = model.top();
                    let refined = match table.get(&term) {
                        None => Some(interval),
                        Some(known) => known.intersect(&interval),
                    };
                    match refined {
                        Some(refined) => {
                            prop_assert_eq!(result.ok(), Some(refined.clone()));
                            table.insert(term, refined);
                        }
                        None => prop_assert!(result.is_err()),
                    }
                }
            }

            prop_assert_eq!(scopes.current_depth(), model.depth());
            let table = model.top().clone();
            for term in 0u32..4 {
                prop_assert_eq!(scopes.lookup(TermId::new(term)), table.get(&term));
            }
        }
    }
}
