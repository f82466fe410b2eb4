//! Presentation-layer seam: selection and visual state
//!
//! The editor core never looks at scene items directly. It asks a
//! [`SceneView`] for the selected [`SceneItem`]s and tells it which items to
//! highlight or raise. [`SceneState`] is the plain in-memory implementation.

use std::collections::{BTreeSet, HashMap};

use crate::document::SceneDocument;
use crate::types::{ConnectionId, NodeId};

/// A selectable thing on the canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SceneItem {
    Node(NodeId),
    Connection(ConnectionId),
}

/// Selected ids split by kind
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub nodes: Vec<NodeId>,
    pub connections: Vec<ConnectionId>,
}

impl Selection {
    /// Partition a list of items, keeping order and dropping repeats
    pub fn from_items(items: impl IntoIterator<Item = SceneItem>) -> Self {
        let mut selection = Selection::default();
        for item in items {
            match item {
                SceneItem::Node(id) if !selection.nodes.contains(&id) => selection.nodes.push(id),
                SceneItem::Connection(id) if !selection.connections.contains(&id) => {
                    selection.connections.push(id)
                }
                _ => {}
            }
        }
        selection
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.connections.is_empty()
    }
}

/// What the editor needs from the presentation layer
pub trait SceneView {
    /// Currently selected items
    fn selected_items(&self) -> Vec<SceneItem>;

    fn clear_selection(&mut self);

    fn set_selected(&mut self, item: SceneItem, selected: bool);

    /// Stacking order of a node's visual
    fn set_node_z_value(&mut self, node_id: NodeId, z: f64);

    fn selection(&self) -> Selection {
        Selection::from_items(self.selected_items())
    }

    /// Drop all visual state of a node that left the graph
    fn forget_node(&mut self, node_id: NodeId) {
        self.set_selected(SceneItem::Node(node_id), false);
    }

    /// Forget every item of `scene` after it was deleted
    fn forget_document(&mut self, scene: &SceneDocument) {
        for connection_id in &scene.connections {
            self.set_selected(SceneItem::Connection(*connection_id), false);
        }
        for node in &scene.nodes {
            self.forget_node(node.id);
        }
    }

    /// Select every item of `scene`, raising its nodes
    fn select_document(&mut self, scene: &SceneDocument) {
        for node in &scene.nodes {
            self.set_node_z_value(node.id, 1.0);
            self.set_selected(SceneItem::Node(node.id), true);
        }
        for connection_id in &scene.connections {
            self.set_selected(SceneItem::Connection(*connection_id), true);
        }
    }
}

/// In-memory selection and z-order
#[derive(Debug, Clone, Default)]
pub struct SceneState {
    selected: BTreeSet<SceneItem>,
    z_values: HashMap<NodeId, f64>,
}

impl SceneState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_selected(&self, item: &SceneItem) -> bool {
        self.selected.contains(item)
    }

    /// Z value of a node's visual, 0.0 unless raised
    pub fn z_value(&self, node_id: NodeId) -> f64 {
        self.z_values.get(&node_id).copied().unwrap_or(0.0)
    }

    /// Drop the selection and all z values
    pub fn clear(&mut self) {
        self.selected.clear();
        self.z_values.clear();
    }
}

impl SceneView for SceneState {
    fn selected_items(&self) -> Vec<SceneItem> {
        self.selected.iter().copied().collect()
    }

    fn clear_selection(&mut self) {
        self.selected.clear();
    }

    fn set_selected(&mut self, item: SceneItem, selected: bool) {
        if selected {
            self.selected.insert(item);
        } else {
            self.selected.remove(&item);
        }
    }

    fn set_node_z_value(&mut self, node_id: NodeId, z: f64) {
        self.z_values.insert(node_id, z);
    }

    fn forget_node(&mut self, node_id: NodeId) {
        self.selected.remove(&SceneItem::Node(node_id));
        self.z_values.remove(&node_id);
    }
}
