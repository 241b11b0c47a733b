use std::fmt;

/// Unique identifier for a single skeleton node.
pub type NodeID = u64;

/// Identifier of a ground-truth segment (one skeleton).
pub type SegmentID = u64;

/// Identifier a segmentation assigns to a node.
pub type Label = u64;

/// Physical length of an edge.
pub type Weight = f64;

/// Position of a node in (z, y, x) order.
pub type Position = [f32; 3];

/// Undirected edge between two nodes which are identified by their ID.
///
/// The edge is always stored normalized, i.e. with `source <= target`.
#[derive(
    Serialize, Deserialize, Eq, PartialEq, PartialOrd, Ord, Clone, Copy, Debug, Hash, Default,
)]
#[repr(C)]
pub struct Edge {
    pub source: NodeID,
    pub target: NodeID,
}

impl Edge {
    pub fn new(u: NodeID, v: NodeID) -> Edge {
        if u <= v {
            Edge {
                source: u,
                target: v,
            }
        } else {
            Edge {
                source: v,
                target: u,
            }
        }
    }

    pub fn is_loop(&self) -> bool {
        self.source == self.target
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}--{}", self.source, self.target)
    }
}

/// An entry of an adjacency list: the neighbor slot and the weight of the connecting edge.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct Neighbor {
    pub slot: u32,
    pub weight: Weight,
}

/// Euclidean distance between two positions.
pub fn euclidean_distance(a: &Position, b: &Position) -> Weight {
    a.iter()
        .zip(b.iter())
        .map(|(a, b)| {
            let d = f64::from(*a) - f64::from(*b);
            d * d
        })
        .sum::<f64>()
        .sqrt()
}
