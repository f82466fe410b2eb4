//! Node type descriptor trait and metadata types
//!
//! A node type describes its ports, caption and default payload. Plugins
//! hand these descriptions to the [`NodeRegistry`](crate::registry::NodeRegistry),
//! and the graph model copies the port layout into every node it creates.
//!
//! # Example
//!
//! ```ignore
//! use node_editor::{NodeTypeDescriptor, NodeTypeMetadata, PortMetadata, PortDataType};
//!
//! impl NodeTypeDescriptor for NumberSource {
//!     fn descriptor() -> NodeTypeMetadata {
//!         NodeTypeMetadata::new("number-source", "Number Source")
//!             .with_output(PortMetadata::new("Number", PortDataType::Decimal))
//!     }
//! }
//! ```

use serde::{Deserialize, Serialize};

/// The data type carried by a port
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PortDataType {
    /// Accepts any type
    Any,
    /// Floating point number
    Decimal,
    /// Whole number
    Integer,
    /// Text string
    Text,
    /// Boolean value
    Boolean,
    /// Image data
    Image,
    /// JSON value
    Json,
    /// Plugin-defined type, compared by id
    Custom(String),
}

impl PortDataType {
    /// Check if an output of this type can feed an input of `other`
    pub fn is_compatible_with(&self, other: &PortDataType) -> bool {
        if matches!(self, PortDataType::Any) || matches!(other, PortDataType::Any) {
            return true;
        }

        // Integers widen into decimals
        if matches!(self, PortDataType::Integer) && matches!(other, PortDataType::Decimal) {
            return true;
        }

        self == other
    }
}

/// How many connections a port accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionPolicy {
    /// At most one connection
    One,
    /// Any number of connections
    Many,
}

/// Metadata for a port (input or output)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortMetadata {
    /// Human-readable label
    pub label: String,
    /// Data type
    pub data_type: PortDataType,
    /// Connection multiplicity; `None` means the side's default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy: Option<ConnectionPolicy>,
}

impl PortMetadata {
    /// Create a port using the default policy of its side
    pub fn new(label: impl Into<String>, data_type: PortDataType) -> Self {
        Self {
            label: label.into(),
            data_type,
            policy: None,
        }
    }

    /// Override the connection policy
    pub fn with_policy(mut self, policy: ConnectionPolicy) -> Self {
        self.policy = Some(policy);
        self
    }

    /// Effective policy for an input port (defaults to one connection)
    pub fn input_policy(&self) -> ConnectionPolicy {
        self.policy.unwrap_or(ConnectionPolicy::One)
    }

    /// Effective policy for an output port (defaults to many connections)
    pub fn output_policy(&self) -> ConnectionPolicy {
        self.policy.unwrap_or(ConnectionPolicy::Many)
    }
}

/// Complete metadata for a node type
///
/// This describes everything the editor needs to create a node and check
/// connections against it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeTypeMetadata {
    /// Unique type identifier (e.g., "number-source")
    pub node_type: String,
    /// Category for palette grouping
    #[serde(default)]
    pub category: String,
    /// Caption shown on the node
    pub caption: String,
    /// Description of what the node does
    #[serde(default)]
    pub description: String,
    /// Input ports, addressed by index
    #[serde(default)]
    pub inputs: Vec<PortMetadata>,
    /// Output ports, addressed by index
    #[serde(default)]
    pub outputs: Vec<PortMetadata>,
    /// Payload given to freshly created nodes
    #[serde(default)]
    pub default_data: serde_json::Value,
}

impl NodeTypeMetadata {
    pub fn new(node_type: impl Into<String>, caption: impl Into<String>) -> Self {
        Self {
            node_type: node_type.into(),
            category: String::new(),
            caption: caption.into(),
            description: String::new(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            default_data: serde_json::Value::Null,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_input(mut self, port: PortMetadata) -> Self {
        self.inputs.push(port);
        self
    }

    pub fn with_output(mut self, port: PortMetadata) -> Self {
        self.outputs.push(port);
        self
    }

    pub fn with_default_data(mut self, data: serde_json::Value) -> Self {
        self.default_data = data;
        self
    }
}

/// Trait for node types that can describe their metadata
pub trait NodeTypeDescriptor {
    /// Get the static metadata for this node type
    fn descriptor() -> NodeTypeMetadata
    where
        Self: Sized;
}
