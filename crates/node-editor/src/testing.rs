//! Shared fixtures for unit tests

use crate::dataflow::DataFlowGraphModel;
use crate::descriptor::{NodeTypeMetadata, PortDataType, PortMetadata};
use crate::model::GraphModel;
use crate::registry::NodeRegistry;
use crate::types::{NodeId, NodeRole, NodeValue, Point};

pub const SOURCE: &str = "number-source";
pub const SINK: &str = "number-display";
pub const ADDER: &str = "addition";
pub const TEXT_SOURCE: &str = "text-source";

pub fn test_registry() -> NodeRegistry {
    let mut registry = NodeRegistry::new();
    registry.register(
        NodeTypeMetadata::new(SOURCE, "Number Source")
            .with_output(PortMetadata::new("Number", PortDataType::Decimal))
            .with_default_data(serde_json::json!({"number": 0.0})),
    );
    registry.register(
        NodeTypeMetadata::new(SINK, "Result")
            .with_input(PortMetadata::new("Number", PortDataType::Decimal)),
    );
    registry.register(
        NodeTypeMetadata::new(ADDER, "Addition")
            .with_input(PortMetadata::new("A", PortDataType::Decimal))
            .with_input(PortMetadata::new("B", PortDataType::Decimal))
            .with_output(PortMetadata::new("Sum", PortDataType::Decimal)),
    );
    registry.register(
        NodeTypeMetadata::new(TEXT_SOURCE, "Text")
            .with_output(PortMetadata::new("Text", PortDataType::Text)),
    );
    registry
}

pub fn test_model() -> DataFlowGraphModel {
    DataFlowGraphModel::new(test_registry())
}

/// Add a node and place it
pub fn add_at(model: &mut dyn GraphModel, node_type: &str, x: f64, y: f64) -> NodeId {
    let id = model.add_node(node_type);
    model.set_node_data(id, NodeRole::Position, NodeValue::Point(Point::new(x, y)));
    id
}
