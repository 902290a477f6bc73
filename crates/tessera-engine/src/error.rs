use indextree::NodeId;
use thiserror::Error;

/// Invalid input to a tree operation.
///
/// Only caller mistakes are reported here. Expected empty results (no
/// previous position, no joinable block) are `Option`s, and policy refusals
/// are handled in place.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EditError {
    #[error("node {0:?} is not attached to the tree")]
    DetachedNode(NodeId),

    #[error("offset {offset} is out of range for node {node:?} of size {size}")]
    OffsetOutOfRange {
        node: NodeId,
        offset: usize,
        size: usize,
    },

    #[error("node {0:?} is not a text node")]
    NotText(NodeId),

    #[error("node {0:?} cannot have children")]
    NotContainer(NodeId),

    #[error("the root node cannot be removed")]
    RootRemoval,

    #[error("invalid position path {path:?}: {reason}")]
    InvalidPath { path: String, reason: String },
}
