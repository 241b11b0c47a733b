use thiserror::Error;

use crate::types::{NodeID, Weight};

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum GraphStoreError {
    #[error("node {0} already exists")]
    DuplicateNode(NodeID),
    #[error("node {0} does not exist")]
    UnknownNode(NodeID),
    #[error("invalid weight {weight} for edge {u}--{v}, weights must be non-negative")]
    InvalidWeight { u: NodeID, v: NodeID, weight: Weight },
    #[error("node {0} has no position")]
    MissingPosition(NodeID),
    #[error("a graph store can hold at most {0} nodes")]
    IndexOverflow(usize),
    #[error("skeleton {skeleton} references vertex {vertex}, but only has {vertices} vertices")]
    InvalidSkeletonEdge {
        skeleton: usize,
        vertex: usize,
        vertices: usize,
    },
    #[error(transparent)]
    BincodeSerialization(#[from] bincode::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    TomlDeserializer(#[from] toml::de::Error),
    #[error(transparent)]
    TomlSerializer(#[from] toml::ser::Error),
}

pub type Result<T> = std::result::Result<T, GraphStoreError>;
