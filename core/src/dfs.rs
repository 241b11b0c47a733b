use crate::{graph::GraphStore, types::Neighbor};
use rustc_hash::FxHashSet;

/// Depth-first traversal that only follows edges accepted by a filter.
///
/// Each node is visited at most once. The set of visited slots is borrowed
/// from the caller, so several traversals can share it (e.g. to enumerate
/// all connected parts of a segment without visiting a node twice).
pub struct FilteredDFS<'a, F>
where
    F: FnMut(u32, &Neighbor) -> bool,
{
    graph: &'a GraphStore,
    filter: F,
    stack: Vec<(u32, usize)>,
    visited: &'a mut FxHashSet<u32>,
}

pub struct DFSStep {
    pub slot: u32,
    pub distance: usize,
}

impl<'a, F> FilteredDFS<'a, F>
where
    F: FnMut(u32, &Neighbor) -> bool,
{
    /// Start a traversal at `start_slot`.
    ///
    /// If the start node was already visited, the traversal is empty.
    pub fn new(
        graph: &'a GraphStore,
        start_slot: u32,
        visited: &'a mut FxHashSet<u32>,
        filter: F,
    ) -> FilteredDFS<'a, F> {
        FilteredDFS {
            graph,
            filter,
            stack: vec![(start_slot, 0)],
            visited,
        }
    }
}

impl<'a, F> Iterator for FilteredDFS<'a, F>
where
    F: FnMut(u32, &Neighbor) -> bool,
{
    type Item = DFSStep;

    fn next(&mut self) -> Option<Self::Item> {
        let graph = self.graph;
        while let Some((slot, distance)) = self.stack.pop() {
            if !self.visited.insert(slot) {
                continue;
            }
            trace!("enter slot {} with distance {}", slot, distance);
            for n in graph.slot_neighbors(slot) {
                if !self.visited.contains(&n.slot) && (self.filter)(slot, n) {
                    self.stack.push((n.slot, distance + 1));
                }
            }
            return Some(DFSStep { slot, distance });
        }
        None
    }
}
