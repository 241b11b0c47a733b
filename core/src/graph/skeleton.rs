//! Import of skeletons given as vertex and edge lists.

use super::GraphStore;
use crate::{
    errors::{GraphStoreError, Result},
    types::{NodeID, Position, SegmentID},
};

/// A single skeleton with local vertex indices.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Skeleton {
    /// Vertex coordinates in (z, y, x) order.
    pub vertices: Vec<Position>,
    /// Edges as pairs of indexes into `vertices`.
    pub edges: Vec<(usize, usize)>,
}

impl GraphStore {
    /// Build a graph store from a list of skeletons.
    ///
    /// The ground-truth segment of each node is the position of its skeleton
    /// in the list. Node IDs are assigned consecutively, so the resulting
    /// store always has dense IDs. Skeletons without edges are skipped, but
    /// still consume a segment ID. If a `resolution` is given, the vertex
    /// coordinates are scaled by it per axis. Edge weights are the Euclidean
    /// length of the edges.
    pub fn from_skeletons<'a, I>(skeletons: I, resolution: Option<[f32; 3]>) -> Result<GraphStore>
    where
        I: IntoIterator<Item = &'a Skeleton>,
    {
        let mut graph = GraphStore::new();
        let mut offset: NodeID = 0;

        for (skeleton_idx, skeleton) in skeletons.into_iter().enumerate() {
            if skeleton.edges.is_empty() {
                debug!("skipping skeleton {} without edges", skeleton_idx);
                continue;
            }
            let segment = skeleton_idx as SegmentID;

            for (i, vertex) in skeleton.vertices.iter().enumerate() {
                let position = match resolution {
                    Some(res) => [vertex[0] * res[0], vertex[1] * res[1], vertex[2] * res[2]],
                    None => *vertex,
                };
                graph.add_node(offset + i as NodeID, segment, Some(position))?;
            }

            for (a, b) in skeleton.edges.iter() {
                for vertex in [a, b] {
                    if *vertex >= skeleton.vertices.len() {
                        return Err(GraphStoreError::InvalidSkeletonEdge {
                            skeleton: skeleton_idx,
                            vertex: *vertex,
                            vertices: skeleton.vertices.len(),
                        });
                    }
                }
                graph.add_edge_from_positions(offset + *a as NodeID, offset + *b as NodeID)?;
            }

            offset += skeleton.vertices.len() as NodeID;
        }

        debug!(
            "imported {} nodes and {} edges from skeletons",
            graph.node_count(),
            graph.edge_count()
        );
        Ok(graph)
    }
}
