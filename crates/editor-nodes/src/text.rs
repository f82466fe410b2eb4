//! Text plugin

use std::sync::Arc;

use node_editor::{
    NodePlugin, NodeRegistry, NodeTypeDescriptor, NodeTypeMetadata, PortDataType, PortMetadata,
};

/// Emits a string entered by the user
pub struct TextSource;

impl TextSource {
    pub const NODE_TYPE: &'static str = "text-source";
}

impl NodeTypeDescriptor for TextSource {
    fn descriptor() -> NodeTypeMetadata {
        NodeTypeMetadata::new(Self::NODE_TYPE, "Text Source")
            .with_category("Sources")
            .with_output(PortMetadata::new("Text", PortDataType::Text))
            .with_default_data(serde_json::json!({ "text": "" }))
    }
}

/// Shows the text on its input
pub struct TextDisplay;

impl TextDisplay {
    pub const NODE_TYPE: &'static str = "text-display";
}

impl NodeTypeDescriptor for TextDisplay {
    fn descriptor() -> NodeTypeMetadata {
        NodeTypeMetadata::new(Self::NODE_TYPE, "Text Display")
            .with_category("Displays")
            .with_input(PortMetadata::new("Text", PortDataType::Text))
    }
}

pub struct TextPlugin;

impl TextPlugin {
    pub const NAME: &'static str = "text";

    pub fn create() -> Arc<dyn NodePlugin> {
        Arc::new(TextPlugin)
    }
}

impl NodePlugin for TextPlugin {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn version(&self) -> &str {
        env!("CARGO_PKG_VERSION")
    }

    fn describe(&self) -> &str {
        "Text sources and displays"
    }

    fn register_node_types(&self, registry: &mut NodeRegistry) {
        registry.register(TextSource::descriptor());
        registry.register(TextDisplay::descriptor());
    }
}

inventory::submit!(node_editor::PluginFn(TextPlugin::create));
