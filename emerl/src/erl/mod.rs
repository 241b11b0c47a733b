//! Computation of the expected run length (ERL).
//!
//! For every ground-truth segment with length `L` the edges are classified by
//! the predicted labels of their endpoints, and the correct edges are grouped
//! into runs. A segment with runs of lengths `r_1..r_n` has the expected run
//! length `sum(r_i * r_i / L)`: the length of the run a random point on the
//! skeleton falls into. The global score is the average of the segment scores
//! weighted by the segment length.

pub mod partition;
mod report;
mod scoring;

pub use partition::{SegmentPartition, SegmentSlots};
pub use report::{ErlReport, IntervalScore, MergeSplitStats, SegmentScore};

use crate::{
    config::ErlConfig,
    errors::{ErlError, Result},
    labels::LabelLookup,
};
use emerl_core::{graph::GraphStore, types::Label};
use rayon::prelude::*;
use scoring::{MergingLabels, SegmentContext, SegmentOutcome};
use std::collections::BTreeMap;

/// Evaluates segmentations against a fixed ground-truth graph.
///
/// The partition of the graph into segments is computed once, so evaluating
/// several segmentations of the same ground truth only pays for the label
/// lookup and the run decomposition.
pub struct ErlEvaluator<'a> {
    graph: &'a GraphStore,
    config: ErlConfig,
    partition: SegmentPartition,
    mask_labels: Vec<Label>,
}

impl<'a> ErlEvaluator<'a> {
    pub fn new(graph: &'a GraphStore, config: ErlConfig) -> Result<ErlEvaluator<'a>> {
        config.validate()?;
        if graph.edge_count() == 0 {
            return Err(ErlError::EmptyGraph);
        }
        let partition = SegmentPartition::new(graph);
        Ok(ErlEvaluator {
            graph,
            config,
            partition,
            mask_labels: Vec::new(),
        })
    }

    /// Set the labels found inside a mask of regions that must not be
    /// segmented (one entry per voxel). Labels occurring more often than the
    /// merge threshold are treated as false merges. Ignored if no merge
    /// threshold is configured.
    pub fn with_mask_labels(mut self, mask_labels: Vec<Label>) -> ErlEvaluator<'a> {
        self.mask_labels = mask_labels;
        self
    }

    pub fn config(&self) -> &ErlConfig {
        &self.config
    }

    pub fn partition(&self) -> &SegmentPartition {
        &self.partition
    }

    /// Compute the expected run length of the segmentation given by `labels`.
    ///
    /// Every node of the graph needs a predicted label.
    pub fn evaluate<L>(&self, labels: &L) -> Result<ErlReport>
    where
        L: LabelLookup + ?Sized,
    {
        let labels_by_slot = self.resolve_labels(labels)?;

        let merging = match self.config.merge_threshold {
            Some(threshold) => MergingLabels::find(
                self.graph,
                &labels_by_slot,
                threshold,
                &self.mask_labels,
                self.config.background_label,
            ),
            None => MergingLabels::default(),
        };

        let context = SegmentContext {
            graph: self.graph,
            labels_by_slot: &labels_by_slot,
            merging: &merging,
            background: self.config.background_label,
        };
        let grouping = self.config.run_grouping;
        let collect_stats = self.config.merge_split_stats;

        let outcomes: Vec<SegmentOutcome> = if self.config.parallel {
            self.partition
                .segments()
                .par_iter()
                .map(|segment| context.evaluate(segment, grouping, collect_stats))
                .collect()
        } else {
            self.partition
                .segments()
                .iter()
                .map(|segment| context.evaluate(segment, grouping, collect_stats))
                .collect()
        };

        let mut segments = Vec::with_capacity(outcomes.len());
        let mut splits = BTreeMap::new();
        for outcome in outcomes {
            if !outcome.splits.is_empty() {
                splits.insert(outcome.score.segment, outcome.splits);
            }
            segments.push(outcome.score);
        }

        let total_length = segments.iter().fold(0.0, |sum, s| sum + s.length);
        if total_length <= 0.0 {
            warn!("all segments have zero length, the expected run length is 0");
        }
        let (erl, max_erl) = weighted_scores(segments.iter(), total_length);

        let intervals = self
            .config
            .length_intervals
            .as_ref()
            .map(|bounds| interval_scores(&segments, bounds, erl, max_erl));

        let merge_split_stats = if collect_stats {
            Some(MergeSplitStats {
                merges: merging.merges.clone(),
                splits,
            })
        } else {
            None
        };

        let report = ErlReport {
            erl,
            max_erl,
            segment_count: segments.len(),
            total_length,
            cross_segment_edges: self.partition.cross_segment_edges(),
            segments,
            intervals,
            merge_split_stats,
        };
        info!(
            "expected run length: {} ({} merging label(s))",
            report,
            merging.len()
        );
        Ok(report)
    }

    fn resolve_labels<L>(&self, labels: &L) -> Result<Vec<Label>>
    where
        L: LabelLookup + ?Sized,
    {
        let mut result = Vec::with_capacity(self.graph.node_count());
        for slot in self.graph.slots() {
            let node = self.graph.slot_node(slot);
            let label = labels
                .label_of(node)
                .ok_or(ErlError::LabelMismatch(node))?;
            result.push(label);
        }
        Ok(result)
    }
}

/// Compute the expected run length of a segmentation in a single call.
pub fn compute_erl<L>(graph: &GraphStore, labels: &L, config: &ErlConfig) -> Result<ErlReport>
where
    L: LabelLookup + ?Sized,
{
    ErlEvaluator::new(graph, config.clone())?.evaluate(labels)
}

/// Length-weighted average of the segment scores and of the best possible scores.
fn weighted_scores<'b, I>(segments: I, normalizer: f64) -> (f64, f64)
where
    I: Iterator<Item = &'b SegmentScore>,
{
    if normalizer <= 0.0 {
        return (0.0, 0.0);
    }
    segments.fold((0.0, 0.0), |(erl, max_erl), s| {
        (
            erl + (s.length * s.erl) / normalizer,
            max_erl + (s.length * s.length) / normalizer,
        )
    })
}

/// The first entry covers all segments, every following entry `i` the
/// segments with `bounds[i - 1] <= length < bounds[i]`.
fn interval_scores(
    segments: &[SegmentScore],
    bounds: &[f64],
    erl: f64,
    max_erl: f64,
) -> Vec<IntervalScore> {
    let mut result = Vec::with_capacity(bounds.len());
    result.push(IntervalScore {
        bounds: None,
        erl,
        max_erl,
        segment_count: segments.len(),
    });
    for w in bounds.windows(2) {
        let (lower, upper) = (w[0], w[1]);
        let selected: Vec<&SegmentScore> = segments
            .iter()
            .filter(|s| s.length >= lower && s.length < upper)
            .collect();
        let selected_length = selected.iter().fold(0.0, |sum, s| sum + s.length);
        let (erl, max_erl) = weighted_scores(selected.iter().copied(), selected_length);
        result.push(IntervalScore {
            bounds: Some((lower, upper)),
            erl,
            max_erl,
            segment_count: selected.len(),
        });
    }
    result
}
