#![warn(clippy::panic)]
#![warn(clippy::expect_used)]

#[macro_use]
extern crate log;
#[macro_use]
extern crate serde_derive;

pub mod dfs;
pub mod errors;
pub mod graph;
pub mod types;
pub mod util;

pub use graph::GraphStore;
