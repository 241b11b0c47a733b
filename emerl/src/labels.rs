use emerl_core::types::{Label, NodeID};
use num_traits::ToPrimitive;
use rustc_hash::FxHashMap;
use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

/// Access to the predicted label of each node.
pub trait LabelLookup: Sync {
    /// Get the predicted label of `node` or `None` if the node has no label.
    fn label_of(&self, node: NodeID) -> Option<Label>;
}

/// A slice is indexed by the node ID.
impl LabelLookup for [Label] {
    fn label_of(&self, node: NodeID) -> Option<Label> {
        node.to_usize().and_then(|idx| self.get(idx)).copied()
    }
}

impl LabelLookup for Vec<Label> {
    fn label_of(&self, node: NodeID) -> Option<Label> {
        self.as_slice().label_of(node)
    }
}

impl<S> LabelLookup for HashMap<NodeID, Label, S>
where
    S: BuildHasher + Sync,
{
    fn label_of(&self, node: NodeID) -> Option<Label> {
        self.get(&node).copied()
    }
}

impl LabelLookup for BTreeMap<NodeID, Label> {
    fn label_of(&self, node: NodeID) -> Option<Label> {
        self.get(&node).copied()
    }
}

impl<L> LabelLookup for &L
where
    L: LabelLookup + ?Sized,
{
    fn label_of(&self, node: NodeID) -> Option<Label> {
        (**self).label_of(node)
    }
}

/// Collect the labels into a hash map, e.g. to combine lookups of several chunks.
pub fn collect_labels<I>(labels: I) -> FxHashMap<NodeID, Label>
where
    I: IntoIterator<Item = (NodeID, Label)>,
{
    labels.into_iter().collect()
}
