use emerl_core::types::{Label, SegmentID, Weight};
use std::collections::BTreeMap;
use std::fmt;

/// Evaluation result for a single ground-truth segment.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct SegmentScore {
    pub segment: SegmentID,
    /// Sum of the weights of all edges of the segment.
    pub length: Weight,
    /// Expected run length inside this segment.
    pub erl: f64,
    /// Number of edges whose endpoints have the same predicted label.
    pub correct: usize,
    /// Number of edges whose endpoints have different predicted labels.
    pub split: usize,
    /// Number of edges inside a label that merges several segments.
    pub merged: usize,
    /// Number of edges with at least one endpoint on the background label.
    pub omitted: usize,
    /// Number of runs with at least one correct edge.
    pub runs: usize,
    /// Sum of the weights of all correct edges.
    pub correct_length: Weight,
}

/// Scores for the segments whose length is inside the given bounds.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct IntervalScore {
    /// Lower (inclusive) and upper (exclusive) segment length, `None` for all segments.
    pub bounds: Option<(f64, f64)>,
    pub erl: f64,
    pub max_erl: f64,
    pub segment_count: usize,
}

/// Details about merge and split errors.
#[derive(Serialize, Clone, Debug, Default, PartialEq)]
pub struct MergeSplitStats {
    /// For each label that merges segments, the list of segments it covers.
    pub merges: BTreeMap<Label, Vec<SegmentID>>,
    /// For each segment, the label pairs of all its split edges.
    pub splits: BTreeMap<SegmentID, Vec<(Label, Label)>>,
}

/// Result of an expected run length evaluation.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct ErlReport {
    /// The expected run length over all segments.
    pub erl: f64,
    /// The expected run length a perfect segmentation would reach.
    pub max_erl: f64,
    /// Number of evaluated segments.
    pub segment_count: usize,
    /// Sum of the lengths of all evaluated segments.
    pub total_length: Weight,
    /// Number of edges between different ground-truth segments which were ignored.
    pub cross_segment_edges: usize,
    /// Score of each evaluated segment, ordered by segment ID.
    pub segments: Vec<SegmentScore>,
    pub intervals: Option<Vec<IntervalScore>>,
    pub merge_split_stats: Option<MergeSplitStats>,
}

impl ErlReport {
    /// Get the score of a single segment.
    pub fn segment(&self, segment: SegmentID) -> Option<&SegmentScore> {
        self.segments
            .binary_search_by_key(&segment, |s| s.segment)
            .ok()
            .map(|idx| &self.segments[idx])
    }
}

impl fmt::Display for ErlReport {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "erl={:.4}, max_erl={:.4}, segments={}, total_length={:.4}",
            self.erl, self.max_erl, self.segment_count, self.total_length
        )?;
        if self.cross_segment_edges > 0 {
            write!(f, ", cross_segment_edges={}", self.cross_segment_edges)?;
        }
        Ok(())
    }
}
