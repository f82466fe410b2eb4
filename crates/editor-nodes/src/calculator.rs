//! Calculator plugin
//!
//! Decimal number sources, displays and the four arithmetic operations.

use std::sync::Arc;

use node_editor::{
    NodePlugin, NodeRegistry, NodeTypeDescriptor, NodeTypeMetadata, PortDataType, PortMetadata,
};

/// Emits a constant number
pub struct NumberSource;

impl NumberSource {
    pub const NODE_TYPE: &'static str = "number-source";
}

impl NodeTypeDescriptor for NumberSource {
    fn descriptor() -> NodeTypeMetadata {
        NodeTypeMetadata::new(Self::NODE_TYPE, "Number Source")
            .with_category("Sources")
            .with_description("Outputs a number entered by the user")
            .with_output(PortMetadata::new("Number", PortDataType::Decimal))
            .with_default_data(serde_json::json!({ "number": 0.0 }))
    }
}

/// Shows the number on its input
pub struct NumberDisplay;

impl NumberDisplay {
    pub const NODE_TYPE: &'static str = "number-display";
}

impl NodeTypeDescriptor for NumberDisplay {
    fn descriptor() -> NodeTypeMetadata {
        NodeTypeMetadata::new(Self::NODE_TYPE, "Result")
            .with_category("Displays")
            .with_description("Displays the incoming number")
            .with_input(PortMetadata::new("Number", PortDataType::Decimal))
    }
}

/// A binary operator on two decimal inputs
pub struct MathOperation {
    node_type: &'static str,
    caption: &'static str,
    operands: [&'static str; 2],
    result: &'static str,
}

pub const ADDITION: MathOperation = MathOperation {
    node_type: "addition",
    caption: "Addition",
    operands: ["A", "B"],
    result: "Sum",
};

pub const SUBTRACTION: MathOperation = MathOperation {
    node_type: "subtraction",
    caption: "Subtraction",
    operands: ["Minuend", "Subtrahend"],
    result: "Difference",
};

pub const MULTIPLICATION: MathOperation = MathOperation {
    node_type: "multiplication",
    caption: "Multiplication",
    operands: ["A", "B"],
    result: "Product",
};

pub const DIVISION: MathOperation = MathOperation {
    node_type: "division",
    caption: "Division",
    operands: ["Dividend", "Divisor"],
    result: "Quotient",
};

impl MathOperation {
    pub fn node_type(&self) -> &'static str {
        self.node_type
    }

    pub fn metadata(&self) -> NodeTypeMetadata {
        let [left, right] = self.operands;
        NodeTypeMetadata::new(self.node_type, self.caption)
            .with_category("Operators")
            .with_input(PortMetadata::new(left, PortDataType::Decimal))
            .with_input(PortMetadata::new(right, PortDataType::Decimal))
            .with_output(PortMetadata::new(self.result, PortDataType::Decimal))
    }
}

pub struct CalculatorPlugin;

impl CalculatorPlugin {
    pub const NAME: &'static str = "calculator";

    pub fn create() -> Arc<dyn NodePlugin> {
        Arc::new(CalculatorPlugin)
    }
}

impl NodePlugin for CalculatorPlugin {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn version(&self) -> &str {
        env!("CARGO_PKG_VERSION")
    }

    fn describe(&self) -> &str {
        "Number sources, displays and arithmetic operators"
    }

    fn register_node_types(&self, registry: &mut NodeRegistry) {
        registry.register(NumberSource::descriptor());
        registry.register(NumberDisplay::descriptor());
        for operation in [ADDITION, SUBTRACTION, MULTIPLICATION, DIVISION] {
            registry.register(operation.metadata());
        }
        log::debug!("Registered calculator node types");
    }
}

inventory::submit!(node_editor::PluginFn(CalculatorPlugin::create));

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operators_have_two_inputs() {
        let mut registry = NodeRegistry::new();
        CalculatorPlugin.register_node_types(&mut registry);

        assert_eq!(registry.len(), 6);
        let by_category = registry.metadata_by_category();
        assert_eq!(by_category["Operators"].len(), 4);

        let division = registry.get_metadata(DIVISION.node_type()).unwrap();
        assert_eq!(division.inputs.len(), 2);
        assert_eq!(division.inputs[1].label, "Divisor");
        assert_eq!(division.outputs.len(), 1);
    }
}
