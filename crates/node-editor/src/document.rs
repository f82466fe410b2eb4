//! Serialized node and subgraph documents
//!
//! These are the portable snapshots exchanged between the graph model, the
//! commands (as undo payloads) and the clipboard. The JSON shape is:
//!
//! ```text
//! { "nodes": [ { "id", "type", "position": { "x", "y" }, "data" } ],
//!   "connections": [ { "outNodeId", "outPortIndex", "inNodeId", "inPortIndex" } ] }
//! ```

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::{ConnectionId, NodeId, Point};

/// A single serialized node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDocument {
    /// Id the node had when it was saved
    pub id: NodeId,
    /// Node type tag
    #[serde(rename = "type")]
    pub node_type: String,
    /// Canvas position
    pub position: Point,
    /// Node-type-specific payload
    #[serde(default)]
    pub data: serde_json::Value,
}

/// A serialized subset of a graph
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneDocument {
    #[serde(default)]
    pub nodes: Vec<NodeDocument>,
    #[serde(default)]
    pub connections: Vec<ConnectionId>,
}

impl SceneDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when the document holds neither nodes nor connections
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.connections.is_empty()
    }

    /// Ids of the serialized nodes, in document order
    pub fn node_ids(&self) -> Vec<NodeId> {
        self.nodes.iter().map(|n| n.id).collect()
    }

    pub fn contains_node(&self, node_id: NodeId) -> bool {
        self.nodes.iter().any(|n| n.id == node_id)
    }

    /// Append a connection unless an identical one is already listed
    pub fn push_connection(&mut self, connection_id: ConnectionId) -> bool {
        if self.connections.contains(&connection_id) {
            return false;
        }
        self.connections.push(connection_id);
        true
    }

    /// Average position of the serialized nodes; `None` without nodes
    pub fn centroid(&self) -> Option<Point> {
        if self.nodes.is_empty() {
            return None;
        }
        let sum = self
            .nodes
            .iter()
            .fold(Point::ORIGIN, |acc, node| acc + node.position);
        let count = self.nodes.len() as f64;
        Some(Point::new(sum.x / count, sum.y / count))
    }

    /// Offset every node position by `delta`
    pub fn translate(&mut self, delta: Point) {
        for node in &mut self.nodes {
            node.position += delta;
        }
    }

    /// Connections whose endpoints both lie inside this document
    pub fn internal_connections(&self) -> impl Iterator<Item = &ConnectionId> {
        let ids: HashSet<NodeId> = self.nodes.iter().map(|n| n.id).collect();
        self.connections
            .iter()
            .filter(move |c| ids.contains(&c.out_node_id) && ids.contains(&c.in_node_id))
    }

    /// Parse from JSON text
    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Parse from JSON bytes
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Render as indented JSON text
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
