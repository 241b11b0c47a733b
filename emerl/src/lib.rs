//! Expected run length (ERL) evaluation of segmentations.
//!
//! The ground truth is a [`GraphStore`](emerl_core::GraphStore) of skeleton
//! nodes, each with the ID of its ground-truth segment. A segmentation is given
//! as predicted label per node (see [`LabelLookup`] and the [`lut`] module to
//! sample labels from a volume). [`compute_erl`] or an [`ErlEvaluator`]
//! compute the score and a per-segment breakdown.

#![warn(clippy::panic)]
#![warn(clippy::expect_used)]

#[macro_use]
extern crate log;
#[macro_use]
extern crate serde_derive;

pub mod config;
pub mod erl;
pub mod errors;
pub mod labels;
pub mod lut;

pub use config::{ErlConfig, RunGrouping};
pub use erl::{compute_erl, ErlEvaluator, ErlReport};
pub use labels::LabelLookup;
