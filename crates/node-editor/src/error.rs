//! Error types for the node editor

use thiserror::Error;

use crate::types::{ConnectionId, NodeId, PortIndex, PortType};

/// Result type alias using NodeEditorError
pub type Result<T> = std::result::Result<T, NodeEditorError>;

/// Errors that can occur while editing a graph
#[derive(Debug, Error)]
pub enum NodeEditorError {
    /// Operation named a node that does not exist
    #[error("Unknown node: {0}")]
    UnknownNode(NodeId),

    /// Requested node type is not registered
    #[error("Unknown node type: {0}")]
    UnknownNodeType(String),

    /// Identical connection already present
    #[error("Connection already exists: {0}")]
    DuplicateConnection(ConnectionId),

    /// Port index beyond the node's port count
    #[error("Port {port_type:?}[{index}] out of range on node {node_id} ({count} ports)")]
    PortOutOfRange {
        node_id: NodeId,
        port_type: PortType,
        index: PortIndex,
        count: u32,
    },

    /// A serialized subgraph could not be fully restored
    #[error("Failed to materialize subgraph: {0}")]
    MaterializeFailed(String),

    /// Clipboard unavailable or rejected the payload
    #[error("Clipboard error: {0}")]
    Clipboard(String),

    /// Scene document failed validation
    #[error("Invalid scene: {0}")]
    InvalidScene(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl NodeEditorError {
    /// Create a clipboard error with a message
    pub fn clipboard(msg: impl Into<String>) -> Self {
        Self::Clipboard(msg.into())
    }
}
