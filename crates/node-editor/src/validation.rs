//! Scene document validation
//!
//! Checks a serialized scene against a node registry before it replaces a
//! live graph. All problems are reported, not just the first.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::descriptor::{ConnectionPolicy, NodeTypeMetadata, PortMetadata};
use crate::document::SceneDocument;
use crate::registry::NodeRegistry;
use crate::types::{ConnectionId, NodeId, PortIndex, PortType};

/// Validation error with location context
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Two node documents share an id
    DuplicateNodeId { node_id: NodeId },
    /// A node has a type missing from the registry
    UnknownNodeType { node_id: NodeId, node_type: String },
    /// A connection references a node not in the scene
    UnknownNode {
        connection: ConnectionId,
        node_id: NodeId,
    },
    /// A connection uses a port the node type does not have
    PortOutOfRange {
        connection: ConnectionId,
        port_type: PortType,
        index: PortIndex,
    },
    /// The same connection is listed twice
    DuplicateConnection { connection: ConnectionId },
    /// A connection joins ports of incompatible data types
    IncompatiblePortTypes {
        connection: ConnectionId,
        source_type: String,
        target_type: String,
    },
    /// A single-connection port has more than one connection
    PortOverConnected {
        node_id: NodeId,
        port_type: PortType,
        index: PortIndex,
        count: usize,
    },
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateNodeId { node_id } => write!(f, "Node id {} is used twice", node_id),
            Self::UnknownNodeType { node_id, node_type } => {
                write!(f, "Unknown node type '{}' for node {}", node_type, node_id)
            }
            Self::UnknownNode {
                connection,
                node_id,
            } => {
                write!(
                    f,
                    "Connection {} references unknown node {}",
                    connection, node_id
                )
            }
            Self::PortOutOfRange {
                connection,
                port_type,
                index,
            } => {
                write!(
                    f,
                    "Connection {} uses missing {:?} port {}",
                    connection, port_type, index
                )
            }
            Self::DuplicateConnection { connection } => {
                write!(f, "Connection {} is listed twice", connection)
            }
            Self::IncompatiblePortTypes {
                connection,
                source_type,
                target_type,
            } => {
                write!(
                    f,
                    "Connection {} joins incompatible types: {} -> {}",
                    connection, source_type, target_type
                )
            }
            Self::PortOverConnected {
                node_id,
                port_type,
                index,
                count,
            } => {
                write!(
                    f,
                    "{:?} port {} of node {} accepts one connection but has {}",
                    port_type, index, node_id, count
                )
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Validate a scene document against `registry`
pub fn validate_scene(scene: &SceneDocument, registry: &NodeRegistry) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    let mut types: HashMap<NodeId, Option<&NodeTypeMetadata>> = HashMap::new();
    for node in &scene.nodes {
        let metadata = registry.get_metadata(&node.node_type);
        if metadata.is_none() {
            errors.push(ValidationError::UnknownNodeType {
                node_id: node.id,
                node_type: node.node_type.clone(),
            });
        }
        if types.insert(node.id, metadata).is_some() {
            errors.push(ValidationError::DuplicateNodeId { node_id: node.id });
        }
    }

    let mut seen = HashSet::new();
    // Single-connection ports in first-use order, with their use counts
    let mut single_ports: Vec<(NodeId, PortType, PortIndex)> = Vec::new();
    let mut uses: HashMap<(NodeId, PortType, PortIndex), usize> = HashMap::new();
    for connection in &scene.connections {
        if !seen.insert(*connection) {
            errors.push(ValidationError::DuplicateConnection {
                connection: *connection,
            });
            continue;
        }
        for (port_type, port) in validate_connection(connection, &types, &mut errors) {
            let policy = match port_type {
                PortType::In => port.input_policy(),
                PortType::Out => port.output_policy(),
            };
            if policy != ConnectionPolicy::One {
                continue;
            }
            let key = (
                connection.node_id(port_type),
                port_type,
                connection.port_index(port_type),
            );
            let count = uses.entry(key).or_insert(0);
            if *count == 0 {
                single_ports.push(key);
            }
            *count += 1;
        }
    }

    for key @ (node_id, port_type, index) in single_ports {
        let count = uses.get(&key).copied().unwrap_or(0);
        if count > 1 {
            errors.push(ValidationError::PortOverConnected {
                node_id,
                port_type,
                index,
                count,
            });
        }
    }

    errors
}

/// Check one connection, returning the ports it resolves to
fn validate_connection<'a>(
    connection: &ConnectionId,
    types: &HashMap<NodeId, Option<&'a NodeTypeMetadata>>,
    errors: &mut Vec<ValidationError>,
) -> Vec<(PortType, &'a PortMetadata)> {
    let mut ports = Vec::with_capacity(2);
    for port_type in [PortType::Out, PortType::In] {
        let node_id = connection.node_id(port_type);
        let Some(entry) = types.get(&node_id) else {
            errors.push(ValidationError::UnknownNode {
                connection: *connection,
                node_id,
            });
            continue;
        };
        // Unknown types are already reported on the node itself
        let Some(metadata) = *entry else { continue };

        let index = connection.port_index(port_type);
        let list = match port_type {
            PortType::Out => &metadata.outputs,
            PortType::In => &metadata.inputs,
        };
        match list.get(index as usize) {
            Some(port) => ports.push((port_type, port)),
            None => errors.push(ValidationError::PortOutOfRange {
                connection: *connection,
                port_type,
                index,
            }),
        }
    }

    if let [(_, source), (_, target)] = ports.as_slice() {
        if !source.data_type.is_compatible_with(&target.data_type) {
            errors.push(ValidationError::IncompatiblePortTypes {
                connection: *connection,
                source_type: format!("{:?}", source.data_type),
                target_type: format!("{:?}", target.data_type),
            });
        }
    }

    ports
}

/// Detect cycles using Kahn's algorithm (topological sort)
///
/// Connections whose endpoints are not in `nodes` are ignored.
pub fn has_cycle(nodes: &[NodeId], connections: &[ConnectionId]) -> bool {
    let mut in_degree: HashMap<NodeId, usize> = nodes.iter().map(|&id| (id, 0)).collect();
    let edges: Vec<&ConnectionId> = connections
        .iter()
        .filter(|c| in_degree.contains_key(&c.out_node_id) && in_degree.contains_key(&c.in_node_id))
        .collect();
    for edge in &edges {
        if let Some(deg) = in_degree.get_mut(&edge.in_node_id) {
            *deg += 1;
        }
    }

    let mut queue: VecDeque<NodeId> = in_degree
        .iter()
        .filter(|(_, &deg)| deg == 0)
        .map(|(&id, _)| id)
        .collect();

    let mut visited = 0;
    while let Some(node_id) = queue.pop_front() {
        visited += 1;
        for edge in &edges {
            if edge.out_node_id == node_id {
                if let Some(deg) = in_degree.get_mut(&edge.in_node_id) {
                    *deg -= 1;
                    if *deg == 0 {
                        queue.push_back(edge.in_node_id);
                    }
                }
            }
        }
    }

    visited < in_degree.len()
}
