//! Order-insensitive equality checks used when diffing settings.
//!
//! The two are not interchangeable: model lists may legitimately repeat an
//! entry, hidden module keys never do.

use indexmap::IndexSet;
use std::collections::HashMap;
use std::hash::{BuildHasher, Hash};

/// Same elements with the same multiplicities, in any order.
pub fn same_multiset<T: Eq + Hash>(left: &[T], right: &[T]) -> bool {
    if left.len() != right.len() {
        return false;
    }
    let mut counts: HashMap<&T, isize> = HashMap::with_capacity(left.len());
    for item in left {
        *counts.entry(item).or_default() += 1;
    }
    for item in right {
        match counts.get_mut(item) {
            Some(count) if *count > 0 => *count -= 1,
            _ => return false,
        }
    }
    true
}

/// Same members, ignoring insertion order.
pub fn same_set<T, S1, S2>(left: &IndexSet<T, S1>, right: &IndexSet<T, S2>) -> bool
where
    T: Eq + Hash,
    S1: BuildHasher,
    S2: BuildHasher,
{
    left.len() == right.len() && left.iter().all(|item| right.contains(item))
}
