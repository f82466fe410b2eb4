//! Editing session
//!
//! One [`EditorSession`] owns a graph model, its undo history, the selection
//! state, a clipboard handle and the plugin manager. There is no global state:
//! independent sessions can run side by side.
//!
//! Every user-level edit goes through [`UndoStack::push`], so an action that
//! has no effect never shows up in the history.

use std::sync::Arc;

use crate::clipboard::{Clipboard, MemoryClipboard};
use crate::commands::{
    ConnectCommand, CopyCommand, CreateCommand, DeleteCommand, DisconnectCommand, EditCommand,
    EditContext, MoveCommand, PasteCommand,
};
use crate::config::EditorConfig;
use crate::dataflow::DataFlowGraphModel;
use crate::document::SceneDocument;
use crate::error::Result;
use crate::events::GraphObserver;
use crate::model::GraphModel;
use crate::plugins::{NodePlugin, PluginInfo, PluginManager};
use crate::registry::NodeRegistry;
use crate::selection::{SceneItem, SceneState, SceneView, Selection};
use crate::types::{ConnectionId, NodeId, Point};
use crate::undo::UndoStack;

/// A graph being edited
pub struct EditorSession {
    model: DataFlowGraphModel,
    history: UndoStack,
    scene: SceneState,
    clipboard: Box<dyn Clipboard>,
    plugins: PluginManager,
    config: EditorConfig,
}

impl EditorSession {
    /// Empty session with no node types and a process-local clipboard
    pub fn new(config: EditorConfig) -> Self {
        Self::with_registry(NodeRegistry::new(), config)
    }

    pub fn with_registry(registry: NodeRegistry, config: EditorConfig) -> Self {
        let model = DataFlowGraphModel::new(registry).with_loops_enabled(config.loops_enabled);
        Self {
            model,
            history: UndoStack::new(config.undo_limit),
            scene: SceneState::new(),
            clipboard: Box::new(MemoryClipboard::new()),
            plugins: PluginManager::new(),
            config,
        }
    }

    /// Use a different clipboard, e.g. the system one
    pub fn with_clipboard(mut self, clipboard: Box<dyn Clipboard>) -> Self {
        self.clipboard = clipboard;
        self
    }

    pub fn model(&self) -> &DataFlowGraphModel {
        &self.model
    }

    pub fn history(&self) -> &UndoStack {
        &self.history
    }

    pub fn scene(&self) -> &SceneState {
        &self.scene
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn plugins(&self) -> &PluginManager {
        &self.plugins
    }

    pub fn clipboard(&self) -> &dyn Clipboard {
        self.clipboard.as_ref()
    }

    /// Subscribe to graph change notifications
    pub fn add_observer(&mut self, observer: Arc<dyn GraphObserver>) {
        self.model.add_observer(observer);
    }

    fn execute(&mut self, command: EditCommand) -> bool {
        let mut ctx = EditContext::new(&mut self.model, &mut self.scene);
        self.history.push(command, &mut ctx)
    }

    // --- Edits ---

    /// Create a node; `None` if the type is unknown
    pub fn create_node(&mut self, node_type: &str, position: Point) -> Option<NodeId> {
        let command = CreateCommand::new(&mut self.model, node_type, position);
        let node_id = command.node_id();
        self.execute(command.into()).then_some(node_id)
    }

    /// Delete the selected items and every connection touching them
    pub fn delete_selection(&mut self) -> bool {
        let command = DeleteCommand::new(&self.model, &self.scene.selection());
        self.execute(command.into())
    }

    /// Copy the selected nodes and the selected connections among them
    ///
    /// Returns the number of nodes copied. The history is not affected.
    pub fn copy_selection(&mut self) -> usize {
        let command = CopyCommand::new(
            &self.model,
            &self.scene.selection(),
            self.clipboard.as_mut(),
            &self.config.clipboard_mime,
        );
        let copied = command.copied_nodes();
        self.execute(command.into());
        copied
    }

    /// Paste the clipboard centred on `drop_point`
    ///
    /// Returns the ids of the pasted nodes, which end up selected.
    pub fn paste(&mut self, drop_point: Point) -> Vec<NodeId> {
        let command = PasteCommand::new(
            &mut self.model,
            self.clipboard.as_ref(),
            &self.config.clipboard_mime,
            drop_point,
        );
        if self.execute(command.into()) {
            self.scene.selection().nodes
        } else {
            Vec::new()
        }
    }

    /// Connect two ports if the model allows it
    pub fn connect(&mut self, connection_id: ConnectionId) -> bool {
        if !self.model.connection_possible(&connection_id) {
            log::debug!("Connection {} is not possible", connection_id);
            return false;
        }
        self.execute(ConnectCommand::new(connection_id).into())
    }

    pub fn disconnect(&mut self, connection_id: ConnectionId) -> bool {
        if !self.model.connection_exists(&connection_id) {
            return false;
        }
        self.execute(DisconnectCommand::new(connection_id).into())
    }

    /// Offset the selected nodes
    ///
    /// Repeated calls with the same selection merge into one history entry.
    pub fn move_selection(&mut self, delta: Point) -> bool {
        let nodes = self.scene.selection().nodes;
        self.move_nodes(&nodes, delta)
    }

    pub fn move_nodes(&mut self, node_ids: &[NodeId], delta: Point) -> bool {
        let live: Vec<NodeId> = node_ids
            .iter()
            .copied()
            .filter(|&id| self.model.node_exists(id))
            .collect();
        if live.is_empty() {
            return false;
        }
        self.execute(MoveCommand::new(live, delta).into())
    }

    pub fn undo(&mut self) -> bool {
        let mut ctx = EditContext::new(&mut self.model, &mut self.scene);
        self.history.undo(&mut ctx)
    }

    pub fn redo(&mut self) -> bool {
        let mut ctx = EditContext::new(&mut self.model, &mut self.scene);
        self.history.redo(&mut ctx)
    }

    // --- Selection ---

    pub fn selection(&self) -> Selection {
        self.scene.selection()
    }

    pub fn select_node(&mut self, node_id: NodeId) -> bool {
        if !self.model.node_exists(node_id) {
            return false;
        }
        self.scene.set_selected(SceneItem::Node(node_id), true);
        true
    }

    pub fn select_connection(&mut self, connection_id: ConnectionId) -> bool {
        if !self.model.connection_exists(&connection_id) {
            return false;
        }
        self.scene
            .set_selected(SceneItem::Connection(connection_id), true);
        true
    }

    /// Select every node and connection
    pub fn select_all(&mut self) {
        for node_id in self.model.all_node_ids() {
            self.scene.set_selected(SceneItem::Node(node_id), true);
        }
        for connection_id in self.model.all_connections() {
            self.scene
                .set_selected(SceneItem::Connection(*connection_id), true);
        }
    }

    pub fn clear_selection(&mut self) {
        self.scene.clear_selection();
    }

    // --- Plugins ---

    pub fn load_plugin(&mut self, plugin: Arc<dyn NodePlugin>) -> PluginInfo {
        self.plugins.load_plugin(plugin, self.model.registry_mut())
    }

    /// Load every plugin linked into the binary
    pub fn load_builtin_plugins(&mut self) -> usize {
        self.plugins.load_builtin_plugins(self.model.registry_mut())
    }

    pub fn unload_plugin(&mut self, name: &str) -> bool {
        self.plugins.unload_plugin(name, self.model.registry_mut())
    }

    pub fn unload_plugins(&mut self) -> usize {
        self.plugins.unload_plugins(self.model.registry_mut())
    }

    // --- Documents ---

    pub fn save_scene(&self) -> SceneDocument {
        self.model.save_scene()
    }

    /// Replace the graph with `scene` and start a fresh history
    pub fn load_scene(&mut self, scene: &SceneDocument) -> Result<()> {
        self.model.load_scene(scene)?;
        self.history.clear();
        self.scene.clear();
        log::info!(
            "Loaded scene with {} nodes and {} connections",
            scene.nodes.len(),
            scene.connections.len()
        );
        Ok(())
    }
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}
