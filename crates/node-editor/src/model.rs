//! Abstract graph model
//!
//! [`GraphModel`] is the narrow interface the serializer and the commands
//! work against. Every mutation is total: invalid input produces a sentinel
//! id, `false`, `None` or an `Err` value, never a panic.

use std::collections::BTreeSet;

use crate::descriptor::PortDataType;
use crate::document::{NodeDocument, SceneDocument};
use crate::error::Result;
use crate::types::{ConnectionId, NodeId, NodeRole, NodeValue, Point, PortIndex, PortType};

/// Authoritative store of nodes and connections
pub trait GraphModel {
    /// Ids of every live node, ascending
    fn all_node_ids(&self) -> Vec<NodeId>;

    fn node_exists(&self, node_id: NodeId) -> bool;

    fn connection_exists(&self, connection_id: &ConnectionId) -> bool;

    /// Every connection with `node_id` as either endpoint
    fn all_connection_ids(&self, node_id: NodeId) -> BTreeSet<ConnectionId>;

    /// Connections attached to one port of a node
    fn connections(
        &self,
        node_id: NodeId,
        port_type: PortType,
        port_index: PortIndex,
    ) -> BTreeSet<ConnectionId> {
        self.all_connection_ids(node_id)
            .into_iter()
            .filter(|c| c.node_id(port_type) == node_id && c.port_index(port_type) == port_index)
            .collect()
    }

    /// Reserve a fresh id without creating a node
    fn new_node_id(&mut self) -> NodeId;

    /// Create a node of `node_type`; returns `INVALID_NODE_ID` for unknown types
    fn add_node(&mut self, node_type: &str) -> NodeId;

    /// Delete a node and, first, all its connections. `false` if absent.
    fn delete_node(&mut self, node_id: NodeId) -> bool;

    /// Check whether `connection_id` may be added under the model's rules
    fn connection_possible(&self, connection_id: &ConnectionId) -> bool;

    /// Register an edge. Fails if an endpoint is missing, a port index is
    /// out of range or the identical edge already exists.
    fn add_connection(&mut self, connection_id: ConnectionId) -> Result<()>;

    /// Remove an edge. Idempotent; `false` when nothing was removed.
    fn delete_connection(&mut self, connection_id: &ConnectionId) -> bool;

    fn node_data(&self, node_id: NodeId, role: NodeRole) -> Option<NodeValue>;

    /// Write a property. `false` for missing nodes, read-only roles or a
    /// value of the wrong shape.
    fn set_node_data(&mut self, node_id: NodeId, role: NodeRole, value: NodeValue) -> bool;

    /// Data type of one port, `None` if the node or port does not exist
    fn port_data_type(
        &self,
        node_id: NodeId,
        port_type: PortType,
        port_index: PortIndex,
    ) -> Option<PortDataType>;

    /// Serialize one node
    fn save_node(&self, node_id: NodeId) -> Option<NodeDocument>;

    /// Create a node from a document. The returned id may differ from the
    /// document's id; `INVALID_NODE_ID` on failure.
    fn load_node(&mut self, document: &NodeDocument) -> NodeId;

    /// Serialize the whole graph
    fn save_scene(&self) -> SceneDocument {
        let mut scene = SceneDocument::new();
        for node_id in self.all_node_ids() {
            if let Some(node) = self.save_node(node_id) {
                scene.nodes.push(node);
            }
            for connection_id in self.all_connection_ids(node_id) {
                // Each edge is reached from both endpoints; keep the out side
                if connection_id.out_node_id == node_id {
                    scene.connections.push(connection_id);
                }
            }
        }
        scene
    }

    fn node_count(&self) -> usize {
        self.all_node_ids().len()
    }

    fn connection_count(&self) -> usize {
        self.all_node_ids()
            .into_iter()
            .map(|id| {
                self.all_connection_ids(id)
                    .into_iter()
                    .filter(|c| c.out_node_id == id)
                    .count()
            })
            .sum()
    }

    fn node_position(&self, node_id: NodeId) -> Option<Point> {
        self.node_data(node_id, NodeRole::Position)
            .and_then(|v| v.as_point())
    }
}
