//! Undoable graph edits
//!
//! Each command captures just enough state to apply (`redo`) and reverse
//! (`undo`) one user action:
//!
//! - Delete and Paste capture a full [`SceneDocument`] before mutating.
//! - Create, Connect, Disconnect and Move only keep ids or a delta.
//!
//! A command whose action had no effect marks itself obsolete when it is
//! constructed and never enters the history. Copy is always obsolete: its
//! only effect is on the clipboard.
//!
//! Commands are a closed set, so they live in the [`EditCommand`] enum and
//! merge eligibility is decided by comparing [`CommandKind`] tags.

use std::collections::BTreeSet;
use std::fmt;

use crate::clipboard::{read_scene, write_scene, Clipboard};
use crate::document::SceneDocument;
use crate::error::Result;
use crate::model::GraphModel;
use crate::selection::{SceneItem, SceneView, Selection};
use crate::serializer::{delete_document, materialize, remint_node_ids, serialize_selection};
use crate::types::{ConnectionId, NodeId, NodeRole, NodeValue, Point, INVALID_NODE_ID};

/// The model and presentation a command operates on
pub struct EditContext<'a> {
    pub model: &'a mut dyn GraphModel,
    pub scene: &'a mut dyn SceneView,
}

impl<'a> EditContext<'a> {
    pub fn new(model: &'a mut dyn GraphModel, scene: &'a mut dyn SceneView) -> Self {
        Self { model, scene }
    }

    /// Materialize `document` and select what was created
    fn insert_document(&mut self, document: &SceneDocument) -> Result<SceneDocument> {
        let created = materialize(document, &mut *self.model)?;
        self.scene.select_document(&created);
        Ok(created)
    }

    /// Delete `document` and forget its visual state
    fn remove_document(&mut self, document: &SceneDocument) {
        delete_document(document, &mut *self.model);
        self.scene.forget_document(document);
    }
}

/// Explicit command identity, used for merge eligibility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    Create,
    Delete,
    Copy,
    Paste,
    Connect,
    Disconnect,
    Move,
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CommandKind::Create => "Create",
            CommandKind::Delete => "Delete",
            CommandKind::Copy => "Copy",
            CommandKind::Paste => "Paste",
            CommandKind::Connect => "Connect",
            CommandKind::Disconnect => "Disconnect",
            CommandKind::Move => "Move",
        };
        f.write_str(name)
    }
}

/// Create one node at a position
///
/// The node is added by the constructor, so the first `redo` issued by the
/// stack must do nothing.
#[derive(Debug, Clone)]
pub struct CreateCommand {
    node_type: String,
    node_id: NodeId,
    document: SceneDocument,
}

impl CreateCommand {
    pub fn new(model: &mut dyn GraphModel, node_type: &str, position: Point) -> Self {
        let node_id = model.add_node(node_type);
        if node_id != INVALID_NODE_ID {
            model.set_node_data(node_id, NodeRole::Position, NodeValue::Point(position));
        }
        Self {
            node_type: node_type.to_string(),
            node_id,
            document: SceneDocument::new(),
        }
    }

    /// Id of the created node, `INVALID_NODE_ID` if creation failed
    pub fn node_id(&self) -> NodeId {
        self.node_id
    }

    pub fn is_obsolete(&self) -> bool {
        self.node_id == INVALID_NODE_ID
    }

    pub fn redo(&mut self, ctx: &mut EditContext<'_>) {
        if self.document.nodes.is_empty() {
            return;
        }
        match ctx.insert_document(&self.document) {
            Ok(created) => {
                if let Some(node) = created.nodes.first() {
                    self.node_id = node.id;
                }
                self.document = created;
            }
            Err(e) => log::warn!("Could not recreate '{}' node: {}", self.node_type, e),
        }
    }

    pub fn undo(&mut self, ctx: &mut EditContext<'_>) {
        let Some(node) = ctx.model.save_node(self.node_id) else {
            return;
        };
        self.document = SceneDocument::new();
        self.document.nodes.push(node);
        ctx.remove_document(&self.document);
    }
}

/// Delete the selection together with every connection touching it
#[derive(Debug, Clone)]
pub struct DeleteCommand {
    document: SceneDocument,
}

impl DeleteCommand {
    pub fn new(model: &dyn GraphModel, selection: &Selection) -> Self {
        let mut document = SceneDocument::new();

        // Selected connections are captured even when neither end is selected
        for connection_id in &selection.connections {
            if model.connection_exists(connection_id) {
                document.push_connection(*connection_id);
            }
        }

        for &node_id in &selection.nodes {
            if document.contains_node(node_id) {
                continue;
            }
            let Some(node) = model.save_node(node_id) else {
                continue;
            };
            for connection_id in model.all_connection_ids(node_id) {
                document.push_connection(connection_id);
            }
            document.nodes.push(node);
        }

        Self { document }
    }

    pub fn is_obsolete(&self) -> bool {
        self.document.is_empty()
    }

    /// Everything this command removes
    pub fn document(&self) -> &SceneDocument {
        &self.document
    }

    pub fn redo(&mut self, ctx: &mut EditContext<'_>) {
        ctx.remove_document(&self.document);
    }

    pub fn undo(&mut self, ctx: &mut EditContext<'_>) {
        match ctx.insert_document(&self.document) {
            Ok(restored) => self.document = restored,
            Err(e) => log::warn!("Could not restore deleted items: {}", e),
        }
    }
}

/// Put the selection on the clipboard
///
/// Never enters the history.
#[derive(Debug, Clone)]
pub struct CopyCommand {
    copied_nodes: usize,
}

impl CopyCommand {
    pub fn new(
        model: &dyn GraphModel,
        selection: &Selection,
        clipboard: &mut dyn Clipboard,
        mime_type: &str,
    ) -> Self {
        let document = serialize_selection(model, &selection.nodes, &selection.connections);

        let mut copied_nodes = 0;
        if document.nodes.is_empty() {
            log::debug!("Nothing to copy");
        } else {
            match write_scene(clipboard, &document, mime_type) {
                Ok(()) => copied_nodes = document.nodes.len(),
                Err(e) => log::warn!("Could not write to clipboard: {}", e),
            }
        }

        Self { copied_nodes }
    }

    /// Number of nodes written to the clipboard
    pub fn copied_nodes(&self) -> usize {
        self.copied_nodes
    }

    pub fn is_obsolete(&self) -> bool {
        true
    }
}

/// Insert the clipboard subgraph centred on a drop point
#[derive(Debug, Clone)]
pub struct PasteCommand {
    document: SceneDocument,
    obsolete: bool,
}

impl PasteCommand {
    pub fn new(
        model: &mut dyn GraphModel,
        clipboard: &dyn Clipboard,
        mime_type: &str,
        drop_point: Point,
    ) -> Self {
        let Some(clipboard_document) =
            read_scene(clipboard, mime_type).filter(|d| !d.nodes.is_empty())
        else {
            return Self {
                document: SceneDocument::new(),
                obsolete: true,
            };
        };

        let mut document = remint_node_ids(&clipboard_document, model);
        if let Some(centroid) = document.centroid() {
            document.translate(drop_point - centroid);
        }

        Self {
            document,
            obsolete: false,
        }
    }

    pub fn is_obsolete(&self) -> bool {
        self.obsolete
    }

    /// The document as last materialized
    pub fn document(&self) -> &SceneDocument {
        &self.document
    }

    pub fn redo(&mut self, ctx: &mut EditContext<'_>) {
        ctx.scene.clear_selection();
        match ctx.insert_document(&self.document) {
            // Keep the ids that really exist so undo removes exactly these
            Ok(created) => self.document = created,
            Err(e) => {
                log::warn!("Paste failed: {}", e);
                self.obsolete = true;
            }
        }
    }

    pub fn undo(&mut self, ctx: &mut EditContext<'_>) {
        ctx.remove_document(&self.document);
    }
}

/// Add one connection
#[derive(Debug, Clone)]
pub struct ConnectCommand {
    connection_id: ConnectionId,
}

impl ConnectCommand {
    pub fn new(connection_id: ConnectionId) -> Self {
        Self { connection_id }
    }

    pub fn connection_id(&self) -> ConnectionId {
        self.connection_id
    }

    pub fn redo(&mut self, ctx: &mut EditContext<'_>) {
        if let Err(e) = ctx.model.add_connection(self.connection_id) {
            log::debug!("Connect {}: {}", self.connection_id, e);
        }
    }

    pub fn undo(&mut self, ctx: &mut EditContext<'_>) {
        ctx.model.delete_connection(&self.connection_id);
        ctx.scene
            .set_selected(SceneItem::Connection(self.connection_id), false);
    }
}

/// Remove one connection
#[derive(Debug, Clone)]
pub struct DisconnectCommand {
    connection_id: ConnectionId,
}

impl DisconnectCommand {
    pub fn new(connection_id: ConnectionId) -> Self {
        Self { connection_id }
    }

    pub fn connection_id(&self) -> ConnectionId {
        self.connection_id
    }

    pub fn redo(&mut self, ctx: &mut EditContext<'_>) {
        ctx.model.delete_connection(&self.connection_id);
        ctx.scene
            .set_selected(SceneItem::Connection(self.connection_id), false);
    }

    pub fn undo(&mut self, ctx: &mut EditContext<'_>) {
        if let Err(e) = ctx.model.add_connection(self.connection_id) {
            log::debug!("Reconnect {}: {}", self.connection_id, e);
        }
    }
}

/// Offset a set of nodes
///
/// Consecutive moves of the same node set merge into one entry, so a whole
/// drag gesture undoes in one step.
#[derive(Debug, Clone)]
pub struct MoveCommand {
    node_ids: BTreeSet<NodeId>,
    delta: Point,
}

impl MoveCommand {
    pub fn new(node_ids: impl IntoIterator<Item = NodeId>, delta: Point) -> Self {
        Self {
            node_ids: node_ids.into_iter().collect(),
            delta,
        }
    }

    pub fn node_ids(&self) -> &BTreeSet<NodeId> {
        &self.node_ids
    }

    /// Accumulated offset
    pub fn delta(&self) -> Point {
        self.delta
    }

    pub fn redo(&mut self, ctx: &mut EditContext<'_>) {
        self.offset(ctx, self.delta);
    }

    pub fn undo(&mut self, ctx: &mut EditContext<'_>) {
        self.offset(ctx, -self.delta);
    }

    /// Absorb `other` if it moves exactly the same nodes
    pub fn merge_with(&mut self, other: &MoveCommand) -> bool {
        if self.node_ids != other.node_ids {
            return false;
        }
        self.delta += other.delta;
        true
    }

    fn offset(&self, ctx: &mut EditContext<'_>, delta: Point) {
        for &node_id in &self.node_ids {
            if let Some(position) = ctx.model.node_position(node_id) {
                ctx.model.set_node_data(
                    node_id,
                    NodeRole::Position,
                    NodeValue::Point(position + delta),
                );
            }
        }
    }
}

/// Any undoable edit
#[derive(Debug, Clone)]
pub enum EditCommand {
    Create(CreateCommand),
    Delete(DeleteCommand),
    Copy(CopyCommand),
    Paste(PasteCommand),
    Connect(ConnectCommand),
    Disconnect(DisconnectCommand),
    Move(MoveCommand),
}

impl EditCommand {
    pub fn kind(&self) -> CommandKind {
        match self {
            EditCommand::Create(_) => CommandKind::Create,
            EditCommand::Delete(_) => CommandKind::Delete,
            EditCommand::Copy(_) => CommandKind::Copy,
            EditCommand::Paste(_) => CommandKind::Paste,
            EditCommand::Connect(_) => CommandKind::Connect,
            EditCommand::Disconnect(_) => CommandKind::Disconnect,
            EditCommand::Move(_) => CommandKind::Move,
        }
    }

    /// Obsolete commands have no effect and are kept out of the history
    pub fn is_obsolete(&self) -> bool {
        match self {
            EditCommand::Create(c) => c.is_obsolete(),
            EditCommand::Delete(c) => c.is_obsolete(),
            EditCommand::Copy(c) => c.is_obsolete(),
            EditCommand::Paste(c) => c.is_obsolete(),
            EditCommand::Connect(_) | EditCommand::Disconnect(_) | EditCommand::Move(_) => false,
        }
    }

    pub fn redo(&mut self, ctx: &mut EditContext<'_>) {
        match self {
            EditCommand::Create(c) => c.redo(ctx),
            EditCommand::Delete(c) => c.redo(ctx),
            EditCommand::Copy(_) => {}
            EditCommand::Paste(c) => c.redo(ctx),
            EditCommand::Connect(c) => c.redo(ctx),
            EditCommand::Disconnect(c) => c.redo(ctx),
            EditCommand::Move(c) => c.redo(ctx),
        }
    }

    pub fn undo(&mut self, ctx: &mut EditContext<'_>) {
        match self {
            EditCommand::Create(c) => c.undo(ctx),
            EditCommand::Delete(c) => c.undo(ctx),
            EditCommand::Copy(_) => {}
            EditCommand::Paste(c) => c.undo(ctx),
            EditCommand::Connect(c) => c.undo(ctx),
            EditCommand::Disconnect(c) => c.undo(ctx),
            EditCommand::Move(c) => c.undo(ctx),
        }
    }

    /// Fold `other` into `self`; `false` leaves both untouched
    pub fn merge(&mut self, other: &EditCommand) -> bool {
        if self.kind() != other.kind() {
            return false;
        }
        match (self, other) {
            (EditCommand::Move(current), EditCommand::Move(next)) => current.merge_with(next),
            _ => false,
        }
    }

    /// Short description for undo/redo menus
    pub fn text(&self) -> String {
        match self {
            EditCommand::Create(c) => format!("Create {}", c.node_type),
            EditCommand::Delete(c) => format!(
                "Delete {} nodes, {} connections",
                c.document.nodes.len(),
                c.document.connections.len()
            ),
            EditCommand::Copy(c) => format!("Copy {} nodes", c.copied_nodes),
            EditCommand::Paste(c) => format!("Paste {} nodes", c.document.nodes.len()),
            EditCommand::Connect(c) => format!("Connect {}", c.connection_id),
            EditCommand::Disconnect(c) => format!("Disconnect {}", c.connection_id),
            EditCommand::Move(c) => format!("Move {} nodes", c.node_ids.len()),
        }
    }
}

impl From<CreateCommand> for EditCommand {
    fn from(command: CreateCommand) -> Self {
        EditCommand::Create(command)
    }
}

impl From<DeleteCommand> for EditCommand {
    fn from(command: DeleteCommand) -> Self {
        EditCommand::Delete(command)
    }
}

impl From<CopyCommand> for EditCommand {
    fn from(command: CopyCommand) -> Self {
        EditCommand::Copy(command)
    }
}

impl From<PasteCommand> for EditCommand {
    fn from(command: PasteCommand) -> Self {
        EditCommand::Paste(command)
    }
}

impl From<ConnectCommand> for EditCommand {
    fn from(command: ConnectCommand) -> Self {
        EditCommand::Connect(command)
    }
}

impl From<DisconnectCommand> for EditCommand {
    fn from(command: DisconnectCommand) -> Self {
        EditCommand::Disconnect(command)
    }
}

impl From<MoveCommand> for EditCommand {
    fn from(command: MoveCommand) -> Self {
        EditCommand::Move(command)
    }
}
