use emerl_core::{errors::GraphStoreError, types::NodeID};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ErlError>;

#[derive(Error, Debug, strum_macros::IntoStaticStr)]
#[non_exhaustive]
pub enum ErlError {
    #[error(transparent)]
    Core(#[from] GraphStoreError),
    #[error("no predicted label for node {0}")]
    LabelMismatch(NodeID),
    #[error("the graph has no edges, the expected run length is undefined")]
    EmptyGraph,
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("voxel {voxel:?} of node {node} is outside of the volume with shape {shape:?}")]
    VolumeIndexOutOfBounds {
        node: NodeID,
        voxel: [usize; 3],
        shape: [usize; 3],
    },
    #[error("position {position:?} of node {node} does not map to a voxel")]
    InvalidPosition { node: NodeID, position: [f32; 3] },
    #[error("mask shape {mask:?} does not match the volume shape {volume:?}")]
    MaskShapeMismatch {
        mask: [usize; 3],
        volume: [usize; 3],
    },
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    TomlDeserializer(#[from] toml::de::Error),
}
