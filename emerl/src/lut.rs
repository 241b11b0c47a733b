//! Lookup of predicted labels in a segmentation volume.
//!
//! Volumes are indexed in (z, y, x) order, the same order as the node
//! positions of the graph store.

use crate::errors::{ErlError, Result};
use emerl_core::{
    errors::GraphStoreError,
    graph::GraphStore,
    types::{Label, NodeID},
};
use ndarray::ArrayView3;
use rustc_hash::{FxHashMap, FxHashSet};

fn shape_of<T>(volume: &ArrayView3<T>) -> [usize; 3] {
    let (z, y, x) = volume.dim();
    [z, y, x]
}

/// Get the label at each of the `voxels`.
///
/// The position of a voxel in the list is used as node ID in errors.
pub fn sample_volume(volume: ArrayView3<Label>, voxels: &[[usize; 3]]) -> Result<Vec<Label>> {
    let mut result = Vec::with_capacity(voxels.len());
    for (idx, voxel) in voxels.iter().enumerate() {
        let label = volume
            .get(*voxel)
            .ok_or_else(|| ErlError::VolumeIndexOutOfBounds {
                node: idx as NodeID,
                voxel: *voxel,
                shape: shape_of(&volume),
            })?;
        result.push(*label);
    }
    Ok(result)
}

/// Convert a physical node position to the voxel it lies in.
fn voxel_of(position: &[f32; 3], resolution: &[f32; 3]) -> Option<[usize; 3]> {
    let mut voxel = [0; 3];
    for d in 0..3 {
        let v = (f64::from(position[d]) / f64::from(resolution[d])).round();
        if !(v >= 0.0) || v > usize::MAX as f64 {
            return None;
        }
        voxel[d] = v as usize;
    }
    Some(voxel)
}

/// Get the label of every graph node from the volume.
///
/// The node positions are divided by the `resolution` (size of a voxel per
/// axis) and rounded to find the voxel of a node.
pub fn labels_at_positions(
    volume: ArrayView3<Label>,
    graph: &GraphStore,
    resolution: [f32; 3],
) -> Result<FxHashMap<NodeID, Label>> {
    let mut result = FxHashMap::default();
    result.reserve(graph.node_count());
    for (node, _) in graph.nodes() {
        let position = graph
            .position_of(node)?
            .ok_or(GraphStoreError::MissingPosition(node))?;
        let voxel = voxel_of(&position, &resolution)
            .ok_or(ErlError::InvalidPosition { node, position })?;
        let label = volume
            .get(voxel)
            .ok_or_else(|| ErlError::VolumeIndexOutOfBounds {
                node,
                voxel,
                shape: shape_of(&volume),
            })?;
        result.insert(node, *label);
    }
    debug!("looked up {} node labels in volume", result.len());
    Ok(result)
}

/// Label lookup for volumes that are too large to be loaded at once.
///
/// The volume is given chunk by chunk along the z axis, starting at `z = 0`.
/// Each chunk must have the full extent in y and x.
pub struct ChunkedLookup {
    voxels: Vec<[usize; 3]>,
    labels: Vec<Option<Label>>,
    z_start: usize,
    shape: [usize; 3],
}

impl ChunkedLookup {
    pub fn new(voxels: Vec<[usize; 3]>) -> ChunkedLookup {
        let labels = vec![None; voxels.len()];
        ChunkedLookup {
            voxels,
            labels,
            z_start: 0,
            shape: [0; 3],
        }
    }

    /// Look up all voxels inside the next chunk.
    pub fn add_chunk(&mut self, chunk: ArrayView3<Label>) {
        let [depth, height, width] = shape_of(&chunk);
        let z_end = self.z_start + depth;
        let mut found = 0;
        for (voxel, label) in self.voxels.iter().zip(self.labels.iter_mut()) {
            if voxel[0] >= self.z_start && voxel[0] < z_end {
                if let Some(l) = chunk.get([voxel[0] - self.z_start, voxel[1], voxel[2]]) {
                    *label = Some(*l);
                    found += 1;
                }
            }
        }
        trace!(
            "chunk z={}..{} contained {} voxel(s)",
            self.z_start,
            z_end,
            found
        );
        self.z_start = z_end;
        self.shape = [z_end, height, width];
    }

    /// Return the labels in the order of the voxels.
    ///
    /// Fails if a voxel was not covered by any chunk.
    pub fn finish(self) -> Result<Vec<Label>> {
        let shape = self.shape;
        self.labels
            .into_iter()
            .zip(self.voxels)
            .enumerate()
            .map(|(idx, (label, voxel))| {
                label.ok_or(ErlError::VolumeIndexOutOfBounds {
                    node: idx as NodeID,
                    voxel,
                    shape,
                })
            })
            .collect()
    }
}

/// Collect the labels of all voxels where the `mask` is non-zero.
///
/// If `node_labels` is given, only labels that also occur there are kept.
/// The result has one entry per voxel and is meant to be passed to
/// [`ErlEvaluator::with_mask_labels`](crate::erl::ErlEvaluator::with_mask_labels).
pub fn mask_labels(
    volume: ArrayView3<Label>,
    mask: ArrayView3<u8>,
    node_labels: Option<&[Label]>,
) -> Result<Vec<Label>> {
    if volume.dim() != mask.dim() {
        return Err(ErlError::MaskShapeMismatch {
            mask: shape_of(&mask),
            volume: shape_of(&volume),
        });
    }
    let relevant: Option<FxHashSet<Label>> =
        node_labels.map(|labels| labels.iter().copied().collect());

    let result: Vec<Label> = volume
        .iter()
        .zip(mask.iter())
        .filter(|(_, m)| **m > 0)
        .map(|(l, _)| *l)
        .filter(|l| relevant.as_ref().map_or(true, |r| r.contains(l)))
        .collect();
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;
    use pretty_assertions::assert_eq;

    /// A 4x2x2 volume where the label is `10 * z + y`.
    fn example_volume() -> Array3<Label> {
        Array3::from_shape_fn((4, 2, 2), |(z, y, _)| (10 * z + y) as Label)
    }

    #[test]
    fn sample_voxels() {
        let volume = example_volume();
        let labels = sample_volume(volume.view(), &[[0, 0, 0], [3, 1, 0], [2, 0, 1]]).unwrap();
        assert_eq!(vec![0, 31, 20], labels);

        let result = sample_volume(volume.view(), &[[0, 0, 0], [4, 0, 0]]);
        assert!(matches!(
            result,
            Err(ErlError::VolumeIndexOutOfBounds {
                node: 1,
                voxel: [4, 0, 0],
                shape: [4, 2, 2]
            })
        ));
    }

    #[test]
    fn sample_at_graph_positions() {
        let volume = example_volume();
        let mut graph = GraphStore::new();
        graph.add_node(5, 1, Some([30.0, 8.0, 0.0])).unwrap();
        graph.add_node(6, 1, Some([60.0, 0.0, 8.0])).unwrap();
        let labels = labels_at_positions(volume.view(), &graph, [30.0, 8.0, 8.0]).unwrap();
        assert_eq!(Some(&11), labels.get(&5));
        assert_eq!(Some(&20), labels.get(&6));

        graph.add_node(7, 1, None).unwrap();
        let result = labels_at_positions(volume.view(), &graph, [30.0, 8.0, 8.0]);
        assert!(matches!(
            result,
            Err(ErlError::Core(GraphStoreError::MissingPosition(7)))
        ));
    }

    #[test]
    fn position_outside_of_volume() {
        let volume = example_volume();
        let mut graph = GraphStore::new();
        graph.add_node(3, 1, Some([0.0, -16.0, 0.0])).unwrap();
        let result = labels_at_positions(volume.view(), &graph, [30.0, 8.0, 8.0]);
        assert!(matches!(
            result,
            Err(ErlError::InvalidPosition {
                node: 3,
                position: [_, y, _],
            }) if y == -16.0
        ));

        let mut graph = GraphStore::new();
        graph.add_node(4, 1, Some([0.0, 0.0, f32::NAN])).unwrap();
        let result = labels_at_positions(volume.view(), &graph, [30.0, 8.0, 8.0]);
        assert!(matches!(
            result,
            Err(ErlError::InvalidPosition { node: 4, .. })
        ));

        let mut graph = GraphStore::new();
        graph.add_node(5, 1, Some([0.0, 0.0, 80.0])).unwrap();
        let result = labels_at_positions(volume.view(), &graph, [30.0, 8.0, 8.0]);
        assert!(matches!(
            result,
            Err(ErlError::VolumeIndexOutOfBounds {
                node: 5,
                voxel: [0, 0, 10],
                shape: [4, 2, 2],
            })
        ));
    }

    #[test]
    fn chunked_lookup() {
        let volume = example_volume();
        let voxels = vec![[3, 1, 1], [0, 1, 0], [1, 0, 0]];
        let mut lookup = ChunkedLookup::new(voxels.clone());
        lookup.add_chunk(volume.slice(ndarray::s![0..2, .., ..]));
        lookup.add_chunk(volume.slice(ndarray::s![2..4, .., ..]));
        let chunked = lookup.finish().unwrap();
        assert_eq!(sample_volume(volume.view(), &voxels).unwrap(), chunked);

        let mut lookup = ChunkedLookup::new(voxels);
        lookup.add_chunk(volume.slice(ndarray::s![0..2, .., ..]));
        assert!(matches!(
            lookup.finish(),
            Err(ErlError::VolumeIndexOutOfBounds { node: 0, .. })
        ));
    }

    #[test]
    fn labels_inside_mask() {
        let volume = example_volume();
        let mut mask = Array3::<u8>::zeros((4, 2, 2));
        mask[[1, 0, 0]] = 1;
        mask[[1, 0, 1]] = 1;
        mask[[2, 1, 1]] = 255;
        let labels = mask_labels(volume.view(), mask.view(), None).unwrap();
        assert_eq!(vec![10, 10, 21], labels);

        let labels = mask_labels(volume.view(), mask.view(), Some(&[21, 30][..])).unwrap();
        assert_eq!(vec![21], labels);

        let small_mask = Array3::<u8>::zeros((1, 2, 2));
        assert!(matches!(
            mask_labels(volume.view(), small_mask.view(), None),
            Err(ErlError::MaskShapeMismatch { .. })
        ));
    }
}
