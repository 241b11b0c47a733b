use emerl_core::{
    graph::GraphStore,
    types::{SegmentID, Weight},
};
use std::collections::BTreeMap;

/// The nodes of a single ground-truth segment together with its length.
#[derive(Clone, Debug)]
pub struct SegmentSlots {
    pub segment: SegmentID,
    /// Slots of all nodes of the segment in ascending order.
    pub slots: Vec<u32>,
    /// Sum of the weights of all edges inside the segment.
    pub length: Weight,
    /// Number of edges inside the segment.
    pub edges: usize,
}

/// Partition of the graph nodes by their ground-truth segment.
///
/// Only segments with at least one edge are part of the partition. The
/// partition only depends on the graph, so it can be reused to evaluate
/// several segmentations.
#[derive(Clone, Debug, Default)]
pub struct SegmentPartition {
    segments: Vec<SegmentSlots>,
    cross_segment_edges: usize,
    skipped_segments: usize,
}

impl SegmentPartition {
    pub fn new(graph: &GraphStore) -> SegmentPartition {
        let mut by_segment: BTreeMap<SegmentID, Vec<u32>> = BTreeMap::new();
        for slot in graph.slots() {
            by_segment
                .entry(graph.slot_segment(slot))
                .or_default()
                .push(slot);
        }

        let mut cross_segment_edges = 0;
        let mut skipped_segments = 0;
        let mut segments = Vec::with_capacity(by_segment.len());

        for (segment, slots) in by_segment {
            let mut length = 0.0;
            let mut edges = 0;
            for slot in slots.iter() {
                for n in graph.slot_neighbors(*slot) {
                    // each undirected edge is visited from its smaller slot only
                    if n.slot < *slot {
                        continue;
                    }
                    if graph.slot_segment(n.slot) == segment {
                        length += n.weight;
                        edges += 1;
                    } else {
                        debug!(
                            "edge {}--{} connects segment {} with segment {}",
                            graph.slot_node(*slot),
                            graph.slot_node(n.slot),
                            segment,
                            graph.slot_segment(n.slot)
                        );
                        cross_segment_edges += 1;
                    }
                }
            }

            if edges == 0 {
                trace!(
                    "skipping segment {} with {} node(s) and no edges",
                    segment,
                    slots.len()
                );
                skipped_segments += 1;
                continue;
            }
            if length == 0.0 {
                warn!("segment {} has {} edge(s) but zero length", segment, edges);
            }
            segments.push(SegmentSlots {
                segment,
                slots,
                length,
                edges,
            });
        }

        if cross_segment_edges > 0 {
            warn!(
                "ignoring {} edge(s) between different ground-truth segments",
                cross_segment_edges
            );
        }
        debug!(
            "partitioned graph into {} segment(s), skipped {} segment(s) without edges",
            segments.len(),
            skipped_segments
        );

        SegmentPartition {
            segments,
            cross_segment_edges,
            skipped_segments,
        }
    }

    /// All segments with at least one edge, ordered by segment ID.
    pub fn segments(&self) -> &[SegmentSlots] {
        &self.segments
    }

    pub fn get(&self, segment: SegmentID) -> Option<&SegmentSlots> {
        self.segments
            .binary_search_by_key(&segment, |s| s.segment)
            .ok()
            .map(|idx| &self.segments[idx])
    }

    /// Number of edges whose endpoints belong to different segments.
    pub fn cross_segment_edges(&self) -> usize {
        self.cross_segment_edges
    }

    /// Number of segments that were left out because they have no edges.
    pub fn skipped_segments(&self) -> usize {
        self.skipped_segments
    }

    /// Sum of the lengths of all segments.
    pub fn total_length(&self) -> Weight {
        self.segments.iter().map(|s| s.length).sum()
    }
}
