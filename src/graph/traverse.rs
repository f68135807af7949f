//! Cycle-safe depth-first reachability.
//!
//! Every closure in [`super::closure`] is expressed as a neighbour function
//! handed to [`reach`]. The visited set lives here and nowhere else: a node is
//! marked on first discovery and expanded exactly once, so cyclic input
//! terminates without a depth limit.

use std::collections::HashSet;
use std::hash::Hash;

/// Outcome of a traversal.
#[derive(Debug, Clone)]
pub struct Reach<T> {
    /// Every node discovered, starts included.
    pub visited: HashSet<T>,
    /// Nodes in the order they were expanded.
    pub order: Vec<T>,
}

impl<T: Copy + Eq + Hash> Reach<T> {
    /// Visited nodes minus `excluded`.
    pub fn without(mut self, excluded: &HashSet<T>) -> HashSet<T> {
        self.visited.retain(|n| !excluded.contains(n));
        self.visited
    }
}

/// Depth-first traversal from `starts`, following `neighbors`.
///
/// `neighbors` is called once per discovered node.
pub fn reach<T, I, F>(starts: impl IntoIterator<Item = T>, mut neighbors: F) -> Reach<T>
where
    T: Copy + Eq + Hash,
    I: IntoIterator<Item = T>,
    F: FnMut(T) -> I,
{
    let mut visited = HashSet::new();
    let mut order = Vec::new();
    let mut stack: Vec<T> = Vec::new();

    for start in starts {
        if visited.insert(start) {
            stack.push(start);
        }
    }

    while let Some(node) = stack.pop() {
        order.push(node);
        for next in neighbors(node) {
            if visited.insert(next) {
                stack.push(next);
            }
        }
    }

    Reach { visited, order }
}

/// Nodes reachable from `start` in one or more steps, `start` itself excluded.
pub fn reachable_from<T, I, F>(start: T, neighbors: F) -> HashSet<T>
where
    T: Copy + Eq + Hash,
    I: IntoIterator<Item = T>,
    F: FnMut(T) -> I,
{
    let mut visited = reach([start], neighbors).visited;
    visited.remove(&start);
    visited
}
