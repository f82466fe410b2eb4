//! Node type registry
//!
//! Maps node type strings to their [`NodeTypeMetadata`]. The graph model
//! consults it when creating or loading nodes; a type missing from the
//! registry makes `add_node` return the invalid-id sentinel.
//!
//! # Composability
//!
//! Registries can be composed by merging:
//! ```ignore
//! let mut registry = NodeRegistry::new();
//! registry.register(NumberSource::descriptor());
//! registry.merge(plugin_registry); // Add plugin nodes
//! ```

use std::collections::{BTreeMap, HashMap};

use crate::descriptor::NodeTypeMetadata;

/// Registry of node types
#[derive(Debug, Clone, Default)]
pub struct NodeRegistry {
    entries: BTreeMap<String, NodeTypeMetadata>,
}

impl NodeRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Register a node type, replacing any previous entry of the same type
    pub fn register(&mut self, metadata: NodeTypeMetadata) {
        log::debug!("Registering node type '{}'", metadata.node_type);
        self.entries.insert(metadata.node_type.clone(), metadata);
    }

    /// Remove a node type, returning its metadata
    pub fn unregister(&mut self, node_type: &str) -> Option<NodeTypeMetadata> {
        self.entries.remove(node_type)
    }

    /// Get metadata for a node type
    pub fn get_metadata(&self, node_type: &str) -> Option<&NodeTypeMetadata> {
        self.entries.get(node_type)
    }

    /// Get all registered metadata, ordered by type
    pub fn all_metadata(&self) -> Vec<&NodeTypeMetadata> {
        self.entries.values().collect()
    }

    /// Get metadata grouped by category
    pub fn metadata_by_category(&self) -> HashMap<&str, Vec<&NodeTypeMetadata>> {
        let mut grouped: HashMap<&str, Vec<&NodeTypeMetadata>> = HashMap::new();
        for metadata in self.entries.values() {
            grouped
                .entry(metadata.category.as_str())
                .or_default()
                .push(metadata);
        }
        grouped
    }

    /// Check if a node type is registered
    pub fn has_node_type(&self, node_type: &str) -> bool {
        self.entries.contains_key(node_type)
    }

    /// List all registered node type strings, sorted
    pub fn node_types(&self) -> Vec<&str> {
        self.entries.keys().map(|s| s.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Merge another registry into this one
    ///
    /// Entries from `other` override entries in `self` if they share the same node_type.
    pub fn merge(&mut self, other: NodeRegistry) {
        self.entries.extend(other.entries);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{PortDataType, PortMetadata};

    fn test_metadata(node_type: &str) -> NodeTypeMetadata {
        NodeTypeMetadata::new(node_type, format!("Test {}", node_type))
            .with_category("Processing")
            .with_input(PortMetadata::new("Input", PortDataType::Text))
            .with_output(PortMetadata::new("Output", PortDataType::Text))
    }

    #[test]
    fn test_register_and_lookup() {
        let mut registry = NodeRegistry::new();
        registry.register(test_metadata("test-node"));

        assert!(registry.has_node_type("test-node"));
        assert!(!registry.has_node_type("unknown"));

        let meta = registry.get_metadata("test-node").unwrap();
        assert_eq!(meta.caption, "Test test-node");
    }

    #[test]
    fn test_unregister() {
        let mut registry = NodeRegistry::new();
        registry.register(test_metadata("test-node"));

        assert!(registry.unregister("test-node").is_some());
        assert!(registry.unregister("test-node").is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_node_types_sorted() {
        let mut registry = NodeRegistry::new();
        registry.register(test_metadata("node-b"));
        registry.register(test_metadata("node-a"));

        assert_eq!(registry.node_types(), vec!["node-a", "node-b"]);
        assert_eq!(registry.all_metadata().len(), 2);
    }

    #[test]
    fn test_merge_override() {
        let mut registry1 = NodeRegistry::new();
        let mut meta1 = test_metadata("node-a");
        meta1.caption = "Original".to_string();
        registry1.register(meta1);

        let mut registry2 = NodeRegistry::new();
        let mut meta2 = test_metadata("node-a");
        meta2.caption = "Override".to_string();
        registry2.register(meta2);
        registry2.register(test_metadata("node-b"));

        registry1.merge(registry2);
        assert_eq!(registry1.len(), 2);
        assert_eq!(registry1.get_metadata("node-a").unwrap().caption, "Override");
    }

    #[test]
    fn test_metadata_by_category() {
        let mut registry = NodeRegistry::new();
        registry.register(test_metadata("text-source").with_category("Sources"));
        registry.register(test_metadata("addition").with_category("Operators"));
        registry.register(test_metadata("subtraction").with_category("Operators"));

        let grouped = registry.metadata_by_category();
        assert_eq!(grouped.get("Sources").unwrap().len(), 1);
        assert_eq!(grouped.get("Operators").unwrap().len(), 2);
    }
}
