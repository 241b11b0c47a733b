use crate::{
    errors::{GraphStoreError, Result},
    types::NodeID,
};
use num_traits::ToPrimitive;
use rustc_hash::FxHashMap;

/// Maps node IDs to the slot of the node in the dense node arrays.
///
/// As long as nodes are added with the IDs `0, 1, 2, ...` the ID is the slot
/// and no lookup table is needed. The first node that breaks this pattern
/// switches the index to a hash map.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub enum NodeIndex {
    Dense { len: usize },
    Sparse(FxHashMap<NodeID, u32>),
}

impl Default for NodeIndex {
    fn default() -> Self {
        NodeIndex::Dense { len: 0 }
    }
}

impl NodeIndex {
    pub fn is_dense(&self) -> bool {
        matches!(self, NodeIndex::Dense { .. })
    }

    pub fn len(&self) -> usize {
        match self {
            NodeIndex::Dense { len } => *len,
            NodeIndex::Sparse(map) => map.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, node: NodeID) -> Option<u32> {
        match self {
            NodeIndex::Dense { len } => {
                let slot = node.to_usize()?;
                if slot < *len {
                    slot.to_u32()
                } else {
                    None
                }
            }
            NodeIndex::Sparse(map) => map.get(&node).copied(),
        }
    }

    /// Register `node` for the next free slot and return this slot.
    ///
    /// `ids` contains the IDs of all already registered nodes ordered by slot
    /// and is used to build the sparse index when switching modes.
    pub fn insert(&mut self, node: NodeID, ids: &[NodeID]) -> Result<u32> {
        if self.get(node).is_some() {
            return Err(GraphStoreError::DuplicateNode(node));
        }
        let next = self.len();
        let slot = next
            .to_u32()
            .ok_or(GraphStoreError::IndexOverflow(u32::MAX as usize))?;

        match self {
            NodeIndex::Dense { len } => {
                if node.to_usize() == Some(next) {
                    *len += 1;
                } else {
                    debug!(
                        "node {} breaks the dense ID range at slot {}, switching to sparse index",
                        node, next
                    );
                    let mut map: FxHashMap<NodeID, u32> = FxHashMap::default();
                    map.reserve(ids.len() + 1);
                    for (existing_slot, id) in ids.iter().enumerate() {
                        // ids of a dense index are smaller than `u32::MAX`
                        if let Some(existing_slot) = existing_slot.to_u32() {
                            map.insert(*id, existing_slot);
                        }
                    }
                    map.insert(node, slot);
                    *self = NodeIndex::Sparse(map);
                }
            }
            NodeIndex::Sparse(map) => {
                map.insert(node, slot);
            }
        }
        Ok(slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stays_dense_for_contiguous_ids() {
        let mut index = NodeIndex::default();
        let mut ids = Vec::new();
        for id in 0..5 {
            let slot = index.insert(id, &ids).unwrap();
            assert_eq!(id as u32, slot);
            ids.push(id);
        }
        assert!(index.is_dense());
        assert_eq!(Some(3), index.get(3));
        assert_eq!(None, index.get(5));
    }

    #[test]
    fn switches_to_sparse() {
        let mut index = NodeIndex::default();
        let mut ids = Vec::new();
        for id in [0, 1, 10, 2] {
            index.insert(id, &ids).unwrap();
            ids.push(id);
        }
        assert!(!index.is_dense());
        assert_eq!(Some(0), index.get(0));
        assert_eq!(Some(1), index.get(1));
        assert_eq!(Some(2), index.get(10));
        assert_eq!(Some(3), index.get(2));
        assert_eq!(None, index.get(3));
    }

    #[test]
    fn rejects_duplicates() {
        let mut index = NodeIndex::default();
        index.insert(0, &[]).unwrap();
        assert!(matches!(
            index.insert(0, &[0]),
            Err(GraphStoreError::DuplicateNode(0))
        ));
    }
}
