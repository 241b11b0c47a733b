use crate::errors::{ErlError, Result};
use emerl_core::types::Label;
use std::path::Path;

/// Defines which correct edges of a ground-truth segment form a single run.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum_macros::EnumString,
    strum_macros::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RunGrouping {
    /// A run is a maximal connected set of correct edges.
    Connected,
    /// All correct edges with the same predicted label form one run, even if
    /// they are not connected.
    Label,
}

impl Default for RunGrouping {
    fn default() -> Self {
        RunGrouping::Connected
    }
}

/// Configuration of an expected run length evaluation.
///
/// All fields have defaults, so a TOML file only needs to list the values
/// that differ.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ErlConfig {
    /// Predicted label that marks unsegmented nodes. Edges touching such a
    /// node are counted as omitted.
    pub background_label: Option<Label>,
    /// Minimal number of nodes a predicted label needs inside a segment to
    /// count as a false merge of this segment. `None` disables the merge
    /// detection.
    pub merge_threshold: Option<usize>,
    pub run_grouping: RunGrouping,
    /// Segment length boundaries for the per-interval breakdown.
    pub length_intervals: Option<Vec<f64>>,
    /// Collect which labels merged segments and which label pairs split them.
    pub merge_split_stats: bool,
    /// Evaluate the segments in parallel.
    pub parallel: bool,
}

impl Default for ErlConfig {
    fn default() -> Self {
        ErlConfig {
            background_label: None,
            merge_threshold: None,
            run_grouping: RunGrouping::default(),
            length_intervals: None,
            merge_split_stats: false,
            parallel: true,
        }
    }
}

impl ErlConfig {
    pub fn from_toml_str(content: &str) -> Result<ErlConfig> {
        let config: ErlConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(location: &Path) -> Result<ErlConfig> {
        let content = std::fs::read_to_string(location)?;
        debug!(
            "loading ERL configuration from {}",
            location.to_string_lossy()
        );
        ErlConfig::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(intervals) = &self.length_intervals {
            if intervals.len() < 2 {
                return Err(ErlError::InvalidConfiguration(
                    "length_intervals needs at least two boundaries".into(),
                ));
            }
            if intervals.iter().any(|b| !b.is_finite()) {
                return Err(ErlError::InvalidConfiguration(
                    "length_intervals must only contain finite values".into(),
                ));
            }
            if intervals.windows(2).any(|w| w[0] >= w[1]) {
                return Err(ErlError::InvalidConfiguration(format!(
                    "length_intervals must be strictly increasing, got {:?}",
                    intervals
                )));
            }
        }
        Ok(())
    }
}
