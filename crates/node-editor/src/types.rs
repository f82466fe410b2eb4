//! Core identifier and geometry types for editable graphs
//!
//! Nodes are addressed by integer ids, ports by zero-based indices and
//! connections by the full `(out node, out port, in node, in port)` tuple.

use std::fmt;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

use serde::{Deserialize, Serialize};

/// Unique identifier for a node
pub type NodeId = u32;

/// Zero-based index of an input or output port
pub type PortIndex = u32;

/// Sentinel that never identifies a live node
pub const INVALID_NODE_ID: NodeId = NodeId::MAX;

/// Direction of a port
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PortType {
    /// Input slot, receives data
    In,
    /// Output slot, produces data
    Out,
}

/// A directed edge from an output port to an input port
///
/// The tuple is the whole identity of a connection. Field names are part of
/// the serialized document format and must stay stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionId {
    /// Node owning the output port
    pub out_node_id: NodeId,
    /// Output port index on `out_node_id`
    pub out_port_index: PortIndex,
    /// Node owning the input port
    pub in_node_id: NodeId,
    /// Input port index on `in_node_id`
    pub in_port_index: PortIndex,
}

impl ConnectionId {
    pub fn new(
        out_node_id: NodeId,
        out_port_index: PortIndex,
        in_node_id: NodeId,
        in_port_index: PortIndex,
    ) -> Self {
        Self {
            out_node_id,
            out_port_index,
            in_node_id,
            in_port_index,
        }
    }

    /// Node id on the given side
    pub fn node_id(&self, port_type: PortType) -> NodeId {
        match port_type {
            PortType::Out => self.out_node_id,
            PortType::In => self.in_node_id,
        }
    }

    /// Port index on the given side
    pub fn port_index(&self, port_type: PortType) -> PortIndex {
        match port_type {
            PortType::Out => self.out_port_index,
            PortType::In => self.in_port_index,
        }
    }

    /// Whether `node_id` is either endpoint
    pub fn touches(&self, node_id: NodeId) -> bool {
        self.out_node_id == node_id || self.in_node_id == node_id
    }

    /// Same ports, endpoints rewritten through `f`
    pub fn map_nodes(&self, mut f: impl FnMut(NodeId) -> NodeId) -> Self {
        Self {
            out_node_id: f(self.out_node_id),
            out_port_index: self.out_port_index,
            in_node_id: f(self.in_node_id),
            in_port_index: self.in_port_index,
        }
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{} -> {}:{}",
            self.out_node_id, self.out_port_index, self.in_node_id, self.in_port_index
        )
    }
}

/// Position or offset on the canvas
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Point {
    fn add_assign(&mut self, rhs: Point) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl SubAssign for Point {
    fn sub_assign(&mut self, rhs: Point) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl Neg for Point {
    type Output = Point;

    fn neg(self) -> Point {
        Point::new(-self.x, -self.y)
    }
}

/// Keys for per-node property access
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeRole {
    /// Node type tag (read only)
    Type,
    /// Display caption from the node type (read only)
    Caption,
    /// Canvas position
    Position,
    /// Number of input ports (read only)
    InPortCount,
    /// Number of output ports (read only)
    OutPortCount,
    /// Node-type-specific payload
    InternalData,
}

/// Value stored under a [`NodeRole`]
#[derive(Debug, Clone, PartialEq)]
pub enum NodeValue {
    Text(String),
    Point(Point),
    Count(u32),
    Json(serde_json::Value),
}

impl NodeValue {
    pub fn as_point(&self) -> Option<Point> {
        match self {
            NodeValue::Point(p) => Some(*p),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            NodeValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_count(&self) -> Option<u32> {
        match self {
            NodeValue::Count(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            NodeValue::Json(v) => Some(v),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_id_field_names() {
        let conn = ConnectionId::new(1, 0, 2, 3);
        let json = serde_json::to_value(conn).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "outNodeId": 1,
                "outPortIndex": 0,
                "inNodeId": 2,
                "inPortIndex": 3
            })
        );
    }

    #[test]
    fn test_connection_id_sides() {
        let conn = ConnectionId::new(4, 1, 9, 0);
        assert_eq!(conn.node_id(PortType::Out), 4);
        assert_eq!(conn.node_id(PortType::In), 9);
        assert_eq!(conn.port_index(PortType::Out), 1);
        assert!(conn.touches(9));
        assert!(!conn.touches(5));

        let mapped = conn.map_nodes(|id| id + 100);
        assert_eq!(mapped, ConnectionId::new(104, 1, 109, 0));
    }

    #[test]
    fn test_point_arithmetic() {
        let mut p = Point::new(1.0, 2.0) + Point::new(3.0, 4.0);
        assert_eq!(p, Point::new(4.0, 6.0));
        p -= Point::new(4.0, 6.0);
        assert_eq!(p, Point::ORIGIN);
        assert_eq!(-Point::new(1.0, -1.0), Point::new(-1.0, 1.0));
    }
}
