pub mod index;
pub mod skeleton;

use crate::{
    errors::{GraphStoreError, Result},
    types::{euclidean_distance, Edge, Neighbor, NodeID, Position, SegmentID, Weight},
};
use index::NodeIndex;
use itertools::Itertools;
use num_traits::ToPrimitive;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::path::Path;

/// Skeleton nodes rarely have more than two neighbors, so these are stored inline.
pub type AdjacencyList = SmallVec<[Neighbor; 2]>;

/// Some general statistical numbers of a graph store.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct StoreStatistics {
    /// Number of nodes.
    pub nodes: usize,
    /// Number of undirected edges.
    pub edges: usize,
    /// Number of distinct ground-truth segments.
    pub segments: usize,
    /// Number of nodes without any edge.
    pub isolated_nodes: usize,
    /// Maximal number of neighbors of a node.
    pub max_degree: usize,
    /// Average number of neighbors of a node.
    pub avg_degree: f64,
    /// Sum of all edge weights.
    pub total_length: f64,
    /// True if the node IDs are a contiguous range starting at 0.
    pub dense_ids: bool,
}

impl std::fmt::Display for StoreStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "nodes={}, edges={}, segments={}, avg_degree={:.2}, max_degree={}, total_length={:.3}",
            self.nodes,
            self.edges,
            self.segments,
            self.avg_degree,
            self.max_degree,
            self.total_length
        )?;
        if self.isolated_nodes > 0 {
            write!(f, ", isolated_nodes={}", self.isolated_nodes)?;
        }
        if !self.dense_ids {
            write!(f, ", sparse")?;
        }
        Ok(())
    }
}

/// Ground-truth skeleton graph with weighted, undirected edges.
///
/// Every node gets a slot in a set of parallel arrays (ID, segment, position
/// and adjacency list). Node lookup is either the identity (dense IDs) or a
/// single hash map (sparse IDs), see [`NodeIndex`].
///
/// Nodes and edges can only be added, never removed.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct GraphStore {
    ids: Vec<NodeID>,
    segments: Vec<SegmentID>,
    positions: Vec<Option<Position>>,
    adjacency: Vec<AdjacencyList>,
    index: NodeIndex,
    edge_count: usize,
}

impl GraphStore {
    pub fn new() -> GraphStore {
        GraphStore::default()
    }

    /// Create an empty graph store with room for `nodes` nodes.
    pub fn with_capacity(nodes: usize) -> GraphStore {
        GraphStore {
            ids: Vec::with_capacity(nodes),
            segments: Vec::with_capacity(nodes),
            positions: Vec::with_capacity(nodes),
            adjacency: Vec::with_capacity(nodes),
            index: NodeIndex::default(),
            edge_count: 0,
        }
    }

    /// Add a node with its ground-truth segment and an optional position.
    pub fn add_node(
        &mut self,
        node: NodeID,
        segment: SegmentID,
        position: Option<Position>,
    ) -> Result<()> {
        let slot = self.index.insert(node, &self.ids)?;
        trace!("adding node {} in segment {} at slot {}", node, segment, slot);
        self.ids.push(node);
        self.segments.push(segment);
        self.positions.push(position);
        self.adjacency.push(AdjacencyList::new());
        Ok(())
    }

    /// Add all nodes of the iterator, stopping at the first error.
    pub fn extend_nodes<I>(&mut self, nodes: I) -> Result<()>
    where
        I: IntoIterator<Item = (NodeID, SegmentID, Option<Position>)>,
    {
        let nodes = nodes.into_iter();
        let (lower, _) = nodes.size_hint();
        self.ids.reserve(lower);
        self.segments.reserve(lower);
        self.positions.reserve(lower);
        self.adjacency.reserve(lower);
        for (node, segment, position) in nodes {
            self.add_node(node, segment, position)?;
        }
        Ok(())
    }

    /// Add an undirected edge between two existing nodes.
    ///
    /// If the edge already exists, its weight is replaced. Self loops are
    /// ignored.
    pub fn add_edge(&mut self, u: NodeID, v: NodeID, weight: Weight) -> Result<()> {
        let slot_u = self.slot(u)?;
        let slot_v = self.slot(v)?;
        // also rejects NaN and infinity
        if !(weight.is_finite() && weight >= 0.0) {
            return Err(GraphStoreError::InvalidWeight { u, v, weight });
        }
        if slot_u == slot_v {
            trace!("ignoring self loop on node {}", u);
            return Ok(());
        }

        if let Some(existing) = self.adjacency[slot_u as usize]
            .iter_mut()
            .find(|n| n.slot == slot_v)
        {
            existing.weight = weight;
            if let Some(inverse) = self.adjacency[slot_v as usize]
                .iter_mut()
                .find(|n| n.slot == slot_u)
            {
                inverse.weight = weight;
            }
            trace!("updated weight of edge {}--{} to {}", u, v, weight);
        } else {
            self.adjacency[slot_u as usize].push(Neighbor {
                slot: slot_v,
                weight,
            });
            self.adjacency[slot_v as usize].push(Neighbor {
                slot: slot_u,
                weight,
            });
            self.edge_count += 1;
        }
        Ok(())
    }

    /// Add an edge whose weight is the Euclidean distance between the positions of both nodes.
    ///
    /// Returns the weight of the new edge.
    pub fn add_edge_from_positions(&mut self, u: NodeID, v: NodeID) -> Result<Weight> {
        let pos_u = self.position_of(u)?.ok_or(GraphStoreError::MissingPosition(u))?;
        let pos_v = self.position_of(v)?.ok_or(GraphStoreError::MissingPosition(v))?;
        let weight = euclidean_distance(&pos_u, &pos_v);
        self.add_edge(u, v, weight)?;
        Ok(weight)
    }

    /// Add all edges of the iterator, stopping at the first error.
    pub fn extend_edges<I>(&mut self, edges: I) -> Result<()>
    where
        I: IntoIterator<Item = (NodeID, NodeID, Weight)>,
    {
        for (u, v, weight) in edges {
            self.add_edge(u, v, weight)?;
        }
        Ok(())
    }

    /// Get all neighbors of the node `u` together with the weight of the connecting edge.
    pub fn neighbors<'a>(
        &'a self,
        u: NodeID,
    ) -> Result<impl Iterator<Item = (NodeID, Weight)> + 'a> {
        let slot = self.slot(u)?;
        let it = self.adjacency[slot as usize]
            .iter()
            .map(move |n| (self.ids[n.slot as usize], n.weight));
        Ok(it)
    }

    pub fn node_count(&self) -> usize {
        self.ids.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// True if the node IDs are `0..node_count()`.
    pub fn has_dense_ids(&self) -> bool {
        self.index.is_dense()
    }

    pub fn contains_node(&self, u: NodeID) -> bool {
        self.index.get(u).is_some()
    }

    /// Get the ground-truth segment of the node `u`.
    pub fn segment_of(&self, u: NodeID) -> Result<SegmentID> {
        let slot = self.slot(u)?;
        Ok(self.segments[slot as usize])
    }

    pub fn position_of(&self, u: NodeID) -> Result<Option<Position>> {
        let slot = self.slot(u)?;
        Ok(self.positions[slot as usize])
    }

    pub fn degree(&self, u: NodeID) -> Result<usize> {
        let slot = self.slot(u)?;
        Ok(self.adjacency[slot as usize].len())
    }

    /// Get the weight of the edge between `u` and `v` or `None` if they are not connected.
    pub fn edge_weight(&self, u: NodeID, v: NodeID) -> Result<Option<Weight>> {
        let slot_u = self.slot(u)?;
        let slot_v = self.slot(v)?;
        Ok(self.adjacency[slot_u as usize]
            .iter()
            .find(|n| n.slot == slot_v)
            .map(|n| n.weight))
    }

    /// Iterate over all nodes and their segment in the order they were added.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeID, SegmentID)> + '_ {
        self.ids.iter().copied().zip(self.segments.iter().copied())
    }

    /// Iterate over each undirected edge exactly once.
    pub fn edges(&self) -> impl Iterator<Item = (Edge, Weight)> + '_ {
        self.adjacency
            .iter()
            .enumerate()
            .flat_map(move |(slot, outgoing)| {
                outgoing
                    .iter()
                    .filter(move |n| (n.slot as usize) > slot)
                    .map(move |n| {
                        let edge = Edge::new(self.ids[slot], self.ids[n.slot as usize]);
                        (edge, n.weight)
                    })
            })
    }

    /// Sum of all edge weights.
    pub fn total_length(&self) -> Weight {
        self.edges().map(|(_, weight)| weight).sum()
    }

    /// All distinct ground-truth segments in ascending order.
    pub fn segment_ids(&self) -> Vec<SegmentID> {
        self.segments.iter().copied().unique().sorted().collect()
    }

    /// Get the slot of a node in the internal arrays.
    pub fn node_slot(&self, u: NodeID) -> Option<u32> {
        self.index.get(u)
    }

    /// Get the node ID stored in `slot`.
    ///
    /// Slots are in the range `0..node_count()`.
    pub fn slot_node(&self, slot: u32) -> NodeID {
        self.ids[slot as usize]
    }

    pub fn slot_segment(&self, slot: u32) -> SegmentID {
        self.segments[slot as usize]
    }

    pub fn slot_neighbors(&self, slot: u32) -> &[Neighbor] {
        &self.adjacency[slot as usize]
    }

    /// Iterate over all slots.
    pub fn slots(&self) -> impl Iterator<Item = u32> + '_ {
        (0..self.ids.len()).filter_map(|slot| slot.to_u32())
    }

    fn slot(&self, u: NodeID) -> Result<u32> {
        self.index.get(u).ok_or(GraphStoreError::UnknownNode(u))
    }

    pub fn calculate_statistics(&self) -> StoreStatistics {
        let degrees = self.adjacency.iter().map(|a| a.len());
        let max_degree = degrees.clone().max().unwrap_or(0);
        let isolated_nodes = degrees.filter(|d| *d == 0).count();
        let avg_degree = if self.ids.is_empty() {
            0.0
        } else {
            (2 * self.edge_count) as f64 / self.ids.len() as f64
        };
        StoreStatistics {
            nodes: self.ids.len(),
            edges: self.edge_count,
            segments: self.segments.iter().unique().count(),
            isolated_nodes,
            max_degree,
            avg_degree,
            total_length: self.total_length(),
            dense_ids: self.index.is_dense(),
        }
    }

    /// Save the statistics of this graph store as TOML file.
    pub fn save_statistics_to_toml(&self, location: &Path) -> Result<()> {
        let stats = self.calculate_statistics();
        let file_content = toml::to_string(&stats)?;
        std::fs::write(location, file_content)?;
        Ok(())
    }

    /// Save the graph store to a file at `location`.
    pub fn save_to(&self, location: &Path) -> Result<()> {
        default_serialize(self, location)?;
        debug!(
            "saved graph store with {} nodes and {} edges to {}",
            self.node_count(),
            self.edge_count(),
            location.to_string_lossy()
        );
        Ok(())
    }

    /// Load a graph store previously saved with [`save_to`](#method.save_to).
    pub fn load_from(location: &Path) -> Result<GraphStore> {
        let result: GraphStore = default_deserialize(location)?;
        debug!(
            "loaded graph store with {} nodes and {} edges from {}",
            result.node_count(),
            result.edge_count(),
            location.to_string_lossy()
        );
        Ok(result)
    }
}

pub fn default_serialize<T>(value: &T, location: &Path) -> Result<()>
where
    T: Serialize,
{
    let f_data = std::fs::File::create(location)?;
    let mut writer = std::io::BufWriter::new(f_data);
    bincode::serialize_into(&mut writer, value)?;
    Ok(())
}

pub fn default_deserialize<T>(location: &Path) -> Result<T>
where
    for<'de> T: std::marker::Sized + Deserialize<'de>,
{
    let f_data = std::fs::File::open(location)?;
    let input = std::io::BufReader::new(f_data);

    let result = bincode::deserialize_from(input)?;

    Ok(result)
}
