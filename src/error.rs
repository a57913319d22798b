//! Crate error type.
//!
//! Most invalid states are absorbed rather than raised: lookups return
//! `Option`, duplicate connections are no-ops, and degenerate transforms leave
//! the camera untouched. `GraphError` covers the remaining cases where a
//! mutator cannot do what was asked.

use crate::anchor::AnchorKey;
use crate::graph::GraphKey;
use crate::group::GroupKey;
use crate::node::NodeKey;

#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("graph not mounted: {0}")]
    NotMounted(GraphKey),
    #[error("graph already mounted: {0}")]
    AlreadyMounted(GraphKey),
    #[error("node not found: {0}")]
    NodeNotFound(NodeKey),
    #[error("duplicate node: {0}")]
    DuplicateNode(NodeKey),
    #[error("anchor not found: {0}")]
    AnchorNotFound(AnchorKey),
    #[error("group box not found: {0}")]
    GroupNotFound(GroupKey),
    #[error("anchor {0} cannot connect to itself")]
    SelfConnection(AnchorKey),
    #[error("anchor {0} reached its connection limit")]
    ConnectionLimit(AnchorKey),
    #[error("graph is locked")]
    Locked,
    #[error("invalid config: {0}")]
    Config(#[from] serde_json::Error),
}

impl GraphError {
    /// Stable machine-readable code for hosts that surface errors.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotMounted(_) => "E_NOT_MOUNTED",
            Self::AlreadyMounted(_) => "E_ALREADY_MOUNTED",
            Self::NodeNotFound(_) => "E_NODE_NOT_FOUND",
            Self::DuplicateNode(_) => "E_DUPLICATE_NODE",
            Self::AnchorNotFound(_) => "E_ANCHOR_NOT_FOUND",
            Self::GroupNotFound(_) => "E_GROUP_NOT_FOUND",
            Self::SelfConnection(_) => "E_SELF_CONNECTION",
            Self::ConnectionLimit(_) => "E_CONNECTION_LIMIT",
            Self::Locked => "E_LOCKED",
            Self::Config(_) => "E_CONFIG",
        }
    }
}
