use super::partition::SegmentSlots;
use super::report::SegmentScore;
use crate::config::RunGrouping;
use emerl_core::{
    dfs::FilteredDFS,
    graph::GraphStore,
    types::{Label, Neighbor, SegmentID, Weight},
};
use itertools::Itertools;
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::BTreeMap;

/// How an edge inside a segment is judged by the predicted labels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum EdgeClass {
    Correct,
    Split,
    Merged,
    Omitted,
}

/// Labels that cover more than one ground-truth segment.
#[derive(Default, Debug)]
pub(crate) struct MergingLabels {
    labels: FxHashSet<Label>,
    /// For each merging label all segments it has nodes in.
    pub(crate) merges: BTreeMap<Label, Vec<SegmentID>>,
}

impl MergingLabels {
    /// Find the labels that merge segments.
    ///
    /// A label merges segments if it has at least `threshold` nodes in more
    /// than one segment, or if it occurs more than `threshold` times in the
    /// `mask_labels`.
    pub(crate) fn find(
        graph: &GraphStore,
        labels_by_slot: &[Label],
        threshold: usize,
        mask_labels: &[Label],
        background: Option<Label>,
    ) -> MergingLabels {
        let mut pair_count: FxHashMap<(SegmentID, Label), usize> = FxHashMap::default();
        for slot in graph.slots() {
            let label = labels_by_slot[slot as usize];
            *pair_count
                .entry((graph.slot_segment(slot), label))
                .or_default() += 1;
        }

        let segments_per_label = pair_count
            .iter()
            .filter(|(_, count)| **count >= threshold)
            .map(|((segment, label), _)| (*label, *segment))
            .into_group_map();

        let mut labels: FxHashSet<Label> = segments_per_label
            .into_iter()
            .filter(|(_, segments)| segments.len() > 1)
            .map(|(label, _)| label)
            .collect();

        if !mask_labels.is_empty() {
            let mask_count = mask_labels.iter().copied().counts();
            labels.extend(
                mask_count
                    .into_iter()
                    .filter(|(_, count)| *count > threshold)
                    .map(|(label, _)| label),
            );
        }
        if let Some(background) = background {
            labels.remove(&background);
        }

        let mut merges: BTreeMap<Label, Vec<SegmentID>> = BTreeMap::new();
        for (segment, label) in pair_count.keys() {
            if labels.contains(label) {
                merges.entry(*label).or_default().push(*segment);
            }
        }
        for segments in merges.values_mut() {
            segments.sort_unstable();
        }

        debug!("found {} merging label(s)", labels.len());
        MergingLabels { labels, merges }
    }

    pub(crate) fn contains(&self, label: Label) -> bool {
        self.labels.contains(&label)
    }

    pub(crate) fn len(&self) -> usize {
        self.labels.len()
    }
}

/// Everything needed to judge the edges of one segment.
pub(crate) struct SegmentContext<'a> {
    pub(crate) graph: &'a GraphStore,
    pub(crate) labels_by_slot: &'a [Label],
    pub(crate) merging: &'a MergingLabels,
    pub(crate) background: Option<Label>,
}

/// Score of a segment plus the label pairs of its split edges.
pub(crate) struct SegmentOutcome {
    pub(crate) score: SegmentScore,
    pub(crate) splits: Vec<(Label, Label)>,
}

impl<'a> SegmentContext<'a> {
    pub(crate) fn classify(
        &self,
        segment: SegmentID,
        slot: u32,
        n: &Neighbor,
    ) -> Option<EdgeClass> {
        if self.graph.slot_segment(n.slot) != segment {
            return None;
        }
        let label_u = self.labels_by_slot[slot as usize];
        let label_v = self.labels_by_slot[n.slot as usize];
        let class = if Some(label_u) == self.background || Some(label_v) == self.background {
            EdgeClass::Omitted
        } else if label_u != label_v {
            EdgeClass::Split
        } else if self.merging.contains(label_u) {
            EdgeClass::Merged
        } else {
            EdgeClass::Correct
        };
        Some(class)
    }

    fn is_correct(&self, segment: SegmentID, slot: u32, n: &Neighbor) -> bool {
        self.classify(segment, slot, n) == Some(EdgeClass::Correct)
    }

    /// Count the edge classes, compute the runs and the expected run length of a segment.
    pub(crate) fn evaluate(
        &self,
        segment: &SegmentSlots,
        grouping: RunGrouping,
        collect_splits: bool,
    ) -> SegmentOutcome {
        let mut score = SegmentScore {
            segment: segment.segment,
            length: segment.length,
            erl: 0.0,
            correct: 0,
            split: 0,
            merged: 0,
            omitted: 0,
            runs: 0,
            correct_length: 0.0,
        };
        let mut splits = Vec::new();

        for slot in segment.slots.iter().copied() {
            for n in self.graph.slot_neighbors(slot) {
                if n.slot < slot {
                    continue;
                }
                match self.classify(segment.segment, slot, n) {
                    Some(EdgeClass::Correct) => {
                        score.correct += 1;
                        score.correct_length += n.weight;
                    }
                    Some(EdgeClass::Split) => {
                        score.split += 1;
                        if collect_splits {
                            splits.push((
                                self.labels_by_slot[slot as usize],
                                self.labels_by_slot[n.slot as usize],
                            ));
                        }
                    }
                    Some(EdgeClass::Merged) => score.merged += 1,
                    Some(EdgeClass::Omitted) => score.omitted += 1,
                    None => {}
                }
            }
        }

        let runs = match grouping {
            RunGrouping::Connected => self.connected_runs(segment),
            RunGrouping::Label => self.label_runs(segment),
        };
        score.runs = runs.len();
        if segment.length > 0.0 {
            score.erl = runs
                .iter()
                .fold(0.0, |erl, run| erl + run * (run / segment.length));
        }
        trace!(
            "segment {}: length={}, runs={}, erl={}",
            segment.segment,
            segment.length,
            score.runs,
            score.erl
        );

        SegmentOutcome { score, splits }
    }

    /// Lengths of the maximal connected sets of correct edges.
    fn connected_runs(&self, segment: &SegmentSlots) -> Vec<Weight> {
        let mut runs = Vec::new();
        let mut visited: FxHashSet<u32> = FxHashSet::default();
        for start in segment.slots.iter().copied() {
            if visited.contains(&start) {
                continue;
            }
            let mut run_length = 0.0;
            let mut run_edges = 0;
            let dfs = FilteredDFS::new(self.graph, start, &mut visited, |slot, n| {
                self.is_correct(segment.segment, slot, n)
            });
            for step in dfs {
                for n in self.graph.slot_neighbors(step.slot) {
                    if n.slot > step.slot && self.is_correct(segment.segment, step.slot, n) {
                        run_length += n.weight;
                        run_edges += 1;
                    }
                }
            }
            if run_edges > 0 {
                runs.push(run_length);
            }
        }
        runs
    }

    /// Lengths of all correct edges summed up per predicted label.
    fn label_runs(&self, segment: &SegmentSlots) -> Vec<Weight> {
        let mut runs: BTreeMap<Label, Weight> = BTreeMap::new();
        for slot in segment.slots.iter().copied() {
            for n in self.graph.slot_neighbors(slot) {
                if n.slot > slot && self.is_correct(segment.segment, slot, n) {
                    *runs.entry(self.labels_by_slot[slot as usize]).or_default() += n.weight;
                }
            }
        }
        runs.into_values().collect()
    }
}
