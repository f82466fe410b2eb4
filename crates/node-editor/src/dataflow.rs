//! Data-flow graph model
//!
//! The concrete [`GraphModel`] used by editor sessions. Nodes are created
//! from the [`NodeRegistry`] it owns; each node keeps a copy of its port
//! layout so it stays consistent even if its type is unregistered later.
//! The model also remembers the layout of every type it has instantiated:
//! `load_node` falls back to it, so deleted nodes of an unloaded type can
//! still be restored, while `add_node` only creates registered types.
//!
//! # Id policy
//!
//! `load_node` reuses the document's id whenever no live node holds it, so
//! undoing a deletion restores the exact ids that later history entries
//! refer to. Only on a conflict is a fresh id minted. Ids come from a
//! monotonic counter that is advanced past every reused id.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::Arc;

use crate::descriptor::{ConnectionPolicy, NodeTypeMetadata, PortDataType, PortMetadata};
use crate::document::{NodeDocument, SceneDocument};
use crate::error::{NodeEditorError, Result};
use crate::events::{GraphEvent, GraphObserver};
use crate::model::GraphModel;
use crate::registry::NodeRegistry;
use crate::types::{
    ConnectionId, NodeId, NodeRole, NodeValue, Point, PortIndex, PortType, INVALID_NODE_ID,
};
use crate::validation::{has_cycle, validate_scene};

/// A live node
#[derive(Debug, Clone)]
struct NodeRecord {
    node_type: String,
    caption: String,
    position: Point,
    data: serde_json::Value,
    inputs: Vec<PortMetadata>,
    outputs: Vec<PortMetadata>,
}

impl NodeRecord {
    fn from_metadata(metadata: &NodeTypeMetadata) -> Self {
        Self {
            node_type: metadata.node_type.clone(),
            caption: metadata.caption.clone(),
            position: Point::ORIGIN,
            data: metadata.default_data.clone(),
            inputs: metadata.inputs.clone(),
            outputs: metadata.outputs.clone(),
        }
    }

    fn ports(&self, port_type: PortType) -> &[PortMetadata] {
        match port_type {
            PortType::In => &self.inputs,
            PortType::Out => &self.outputs,
        }
    }
}

/// Graph model backed by ordered maps
pub struct DataFlowGraphModel {
    registry: NodeRegistry,
    nodes: BTreeMap<NodeId, NodeRecord>,
    connections: BTreeSet<ConnectionId>,
    /// Fresh record of every type instantiated so far
    known_types: BTreeMap<String, NodeRecord>,
    next_node_id: NodeId,
    loops_enabled: bool,
    observers: Vec<Arc<dyn GraphObserver>>,
}

impl DataFlowGraphModel {
    /// Create an empty model creating nodes from `registry`
    pub fn new(registry: NodeRegistry) -> Self {
        Self {
            registry,
            nodes: BTreeMap::new(),
            connections: BTreeSet::new(),
            known_types: BTreeMap::new(),
            next_node_id: 0,
            loops_enabled: false,
            observers: Vec::new(),
        }
    }

    /// Allow connections that close a cycle
    pub fn with_loops_enabled(mut self, enabled: bool) -> Self {
        self.loops_enabled = enabled;
        self
    }

    pub fn loops_enabled(&self) -> bool {
        self.loops_enabled
    }

    pub fn set_loops_enabled(&mut self, enabled: bool) {
        self.loops_enabled = enabled;
    }

    pub fn registry(&self) -> &NodeRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut NodeRegistry {
        &mut self.registry
    }

    /// Subscribe to change notifications
    pub fn add_observer(&mut self, observer: Arc<dyn GraphObserver>) {
        self.observers.push(observer);
    }

    /// All live connections, ordered
    pub fn all_connections(&self) -> impl Iterator<Item = &ConnectionId> {
        self.connections.iter()
    }

    /// Delete every node (and so every connection)
    pub fn clear(&mut self) {
        let ids: Vec<NodeId> = self.nodes.keys().copied().collect();
        for node_id in ids {
            self.delete_node(node_id);
        }
    }

    /// Replace the whole graph with `scene`, keeping its ids
    ///
    /// The scene is validated against the registry first; on any problem
    /// the current graph is left untouched.
    pub fn load_scene(&mut self, scene: &SceneDocument) -> Result<()> {
        let errors = validate_scene(scene, &self.registry);
        if errors.is_empty() && !self.loops_enabled && has_cycle(&scene.node_ids(), &scene.connections)
        {
            return Err(NodeEditorError::InvalidScene(
                "scene contains a cycle and loops are disabled".to_string(),
            ));
        }
        if !errors.is_empty() {
            let message = errors
                .iter()
                .map(|e| e.to_string())
                .collect::<Vec<_>>()
                .join("; ");
            return Err(NodeEditorError::InvalidScene(message));
        }

        self.clear();
        for node in &scene.nodes {
            if self.load_node(node) == INVALID_NODE_ID {
                return Err(NodeEditorError::UnknownNodeType(node.node_type.clone()));
            }
        }
        for connection_id in &scene.connections {
            self.add_connection(*connection_id)?;
        }
        log::debug!(
            "Loaded scene with {} nodes and {} connections",
            self.nodes.len(),
            self.connections.len()
        );
        Ok(())
    }

    fn emit(&self, event: GraphEvent) {
        for observer in &self.observers {
            observer.notify(&event);
        }
    }

    fn allocate_node_id(&mut self) -> NodeId {
        let mut id = self.next_node_id;
        while id == INVALID_NODE_ID || self.nodes.contains_key(&id) {
            id = id.wrapping_add(1);
        }
        self.next_node_id = id.wrapping_add(1);
        id
    }

    fn record_from_registry(&mut self, node_type: &str) -> Option<NodeRecord> {
        let record = NodeRecord::from_metadata(self.registry.get_metadata(node_type)?);
        self.known_types
            .insert(node_type.to_string(), record.clone());
        Some(record)
    }

    /// Registry first, then the layout remembered from earlier instances
    fn record_for_restore(&mut self, node_type: &str) -> Option<NodeRecord> {
        if let Some(record) = self.record_from_registry(node_type) {
            return Some(record);
        }
        let record = self.known_types.get(node_type).cloned()?;
        log::debug!("Restoring node of unregistered type '{}'", node_type);
        Some(record)
    }

    fn port(&self, node_id: NodeId, port_type: PortType, index: PortIndex) -> Option<&PortMetadata> {
        self.nodes
            .get(&node_id)?
            .ports(port_type)
            .get(index as usize)
    }

    fn check_port(&self, connection_id: &ConnectionId, port_type: PortType) -> Result<()> {
        let node_id = connection_id.node_id(port_type);
        let index = connection_id.port_index(port_type);
        let node = self
            .nodes
            .get(&node_id)
            .ok_or(NodeEditorError::UnknownNode(node_id))?;
        let count = node.ports(port_type).len() as u32;
        if index >= count {
            return Err(NodeEditorError::PortOutOfRange {
                node_id,
                port_type,
                index,
                count,
            });
        }
        Ok(())
    }

    /// Whether data can already flow from `from` to `to`
    fn reaches(&self, from: NodeId, to: NodeId) -> bool {
        let mut visited = HashSet::new();
        let mut stack = vec![from];
        while let Some(node_id) = stack.pop() {
            if node_id == to {
                return true;
            }
            if !visited.insert(node_id) {
                continue;
            }
            stack.extend(
                self.connections
                    .iter()
                    .filter(|c| c.out_node_id == node_id)
                    .map(|c| c.in_node_id),
            );
        }
        false
    }
}

impl GraphModel for DataFlowGraphModel {
    fn all_node_ids(&self) -> Vec<NodeId> {
        self.nodes.keys().copied().collect()
    }

    fn node_exists(&self, node_id: NodeId) -> bool {
        self.nodes.contains_key(&node_id)
    }

    fn connection_exists(&self, connection_id: &ConnectionId) -> bool {
        self.connections.contains(connection_id)
    }

    fn all_connection_ids(&self, node_id: NodeId) -> BTreeSet<ConnectionId> {
        self.connections
            .iter()
            .filter(|c| c.touches(node_id))
            .copied()
            .collect()
    }

    fn new_node_id(&mut self) -> NodeId {
        self.allocate_node_id()
    }

    fn add_node(&mut self, node_type: &str) -> NodeId {
        let Some(record) = self.record_from_registry(node_type) else {
            log::debug!("Cannot create node of unknown type '{}'", node_type);
            return INVALID_NODE_ID;
        };

        let node_id = self.allocate_node_id();
        self.nodes.insert(node_id, record);
        log::debug!("Created node {} of type '{}'", node_id, node_type);
        self.emit(GraphEvent::NodeCreated { node_id });
        node_id
    }

    fn delete_node(&mut self, node_id: NodeId) -> bool {
        if !self.nodes.contains_key(&node_id) {
            return false;
        }

        for connection_id in self.all_connection_ids(node_id) {
            self.delete_connection(&connection_id);
        }

        self.nodes.remove(&node_id);
        log::debug!("Deleted node {}", node_id);
        self.emit(GraphEvent::NodeDeleted { node_id });
        true
    }

    fn connection_possible(&self, connection_id: &ConnectionId) -> bool {
        let (Some(out_port), Some(in_port)) = (
            self.port(
                connection_id.out_node_id,
                PortType::Out,
                connection_id.out_port_index,
            ),
            self.port(
                connection_id.in_node_id,
                PortType::In,
                connection_id.in_port_index,
            ),
        ) else {
            return false;
        };

        if self.connections.contains(connection_id) {
            return false;
        }

        if !out_port.data_type.is_compatible_with(&in_port.data_type) {
            return false;
        }

        let vacant = |port_type: PortType| {
            GraphModel::connections(
                self,
                connection_id.node_id(port_type),
                port_type,
                connection_id.port_index(port_type),
            )
            .is_empty()
        };
        if in_port.input_policy() == ConnectionPolicy::One && !vacant(PortType::In) {
            return false;
        }
        if out_port.output_policy() == ConnectionPolicy::One && !vacant(PortType::Out) {
            return false;
        }

        if !self.loops_enabled && self.reaches(connection_id.in_node_id, connection_id.out_node_id)
        {
            return false;
        }

        true
    }

    fn add_connection(&mut self, connection_id: ConnectionId) -> Result<()> {
        self.check_port(&connection_id, PortType::Out)?;
        self.check_port(&connection_id, PortType::In)?;

        if !self.connections.insert(connection_id) {
            return Err(NodeEditorError::DuplicateConnection(connection_id));
        }

        log::debug!("Added connection {}", connection_id);
        self.emit(GraphEvent::ConnectionCreated { connection_id });
        Ok(())
    }

    fn delete_connection(&mut self, connection_id: &ConnectionId) -> bool {
        if !self.connections.remove(connection_id) {
            return false;
        }

        log::debug!("Deleted connection {}", connection_id);
        self.emit(GraphEvent::ConnectionDeleted {
            connection_id: *connection_id,
        });
        true
    }

    fn node_data(&self, node_id: NodeId, role: NodeRole) -> Option<NodeValue> {
        let node = self.nodes.get(&node_id)?;
        let value = match role {
            NodeRole::Type => NodeValue::Text(node.node_type.clone()),
            NodeRole::Caption => NodeValue::Text(node.caption.clone()),
            NodeRole::Position => NodeValue::Point(node.position),
            NodeRole::InPortCount => NodeValue::Count(node.inputs.len() as u32),
            NodeRole::OutPortCount => NodeValue::Count(node.outputs.len() as u32),
            NodeRole::InternalData => NodeValue::Json(node.data.clone()),
        };
        Some(value)
    }

    fn set_node_data(&mut self, node_id: NodeId, role: NodeRole, value: NodeValue) -> bool {
        let Some(node) = self.nodes.get_mut(&node_id) else {
            return false;
        };

        let event = match (role, value) {
            (NodeRole::Position, NodeValue::Point(position)) => {
                node.position = position;
                GraphEvent::NodePositionUpdated { node_id }
            }
            (NodeRole::InternalData, NodeValue::Json(data)) => {
                node.data = data;
                GraphEvent::NodeUpdated { node_id }
            }
            _ => return false,
        };

        self.emit(event);
        true
    }

    fn port_data_type(
        &self,
        node_id: NodeId,
        port_type: PortType,
        port_index: PortIndex,
    ) -> Option<PortDataType> {
        self.port(node_id, port_type, port_index)
            .map(|p| p.data_type.clone())
    }

    fn save_node(&self, node_id: NodeId) -> Option<NodeDocument> {
        let node = self.nodes.get(&node_id)?;
        Some(NodeDocument {
            id: node_id,
            node_type: node.node_type.clone(),
            position: node.position,
            data: node.data.clone(),
        })
    }

    fn load_node(&mut self, document: &NodeDocument) -> NodeId {
        let Some(mut record) = self.record_for_restore(&document.node_type) else {
            log::debug!(
                "Cannot load node {} of unknown type '{}'",
                document.id,
                document.node_type
            );
            return INVALID_NODE_ID;
        };
        record.position = document.position;
        record.data = document.data.clone();

        let node_id = if document.id != INVALID_NODE_ID && !self.nodes.contains_key(&document.id) {
            if document.id >= self.next_node_id {
                self.next_node_id = document.id.saturating_add(1);
            }
            document.id
        } else {
            self.allocate_node_id()
        };

        self.nodes.insert(node_id, record);
        log::debug!(
            "Loaded node {} (saved as {}) of type '{}'",
            node_id,
            document.id,
            document.node_type
        );
        self.emit(GraphEvent::NodeCreated { node_id });
        node_id
    }

    fn connection_count(&self) -> usize {
        self.connections.len()
    }

    fn node_count(&self) -> usize {
        self.nodes.len()
    }
}
