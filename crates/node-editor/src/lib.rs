//! Node Editor - editing core for node-based dataflow graphs
//!
//! This crate holds everything a node editor needs below the rendering
//! layer:
//!
//! - A graph model of typed nodes and connections with referential integrity
//! - Subgraph serialization with id remapping on restore
//! - Undoable edit commands and a merging undo/redo stack
//! - Selection and clipboard exchange through narrow traits
//! - Node type registry and plugin manager
//!
//! # Architecture
//!
//! - `GraphModel`: the interface commands and the serializer work against
//! - `DataFlowGraphModel`: the concrete model, creating nodes from a `NodeRegistry`
//! - `EditCommand` / `UndoStack`: command objects and their history
//! - `SceneView` / `Clipboard`: seams to the presentation layer and the system clipboard
//! - `EditorSession`: owns one model, its history and its collaborators
//!
//! # Example
//!
//! ```ignore
//! use node_editor::{ConnectionId, EditorConfig, EditorSession, Point};
//!
//! let mut session = EditorSession::new(EditorConfig::default());
//! session.load_builtin_plugins();
//!
//! let a = session.create_node("number-source", Point::new(0.0, 0.0)).unwrap();
//! let b = session.create_node("number-display", Point::new(100.0, 0.0)).unwrap();
//! session.connect(ConnectionId::new(a, 0, b, 0));
//! session.undo();
//! ```

pub mod clipboard;
pub mod commands;
pub mod config;
pub mod dataflow;
pub mod descriptor;
pub mod document;
pub mod error;
pub mod events;
pub mod model;
pub mod plugins;
pub mod registry;
pub mod selection;
pub mod serializer;
pub mod session;
pub mod types;
pub mod undo;
pub mod validation;

#[cfg(test)]
mod testing;

// Re-export key types
pub use clipboard::{Clipboard, ClipboardPayload, MemoryClipboard, GRAPH_MIME_TYPE};
pub use commands::{CommandKind, EditCommand, EditContext};
pub use config::EditorConfig;
pub use dataflow::DataFlowGraphModel;
pub use descriptor::{
    ConnectionPolicy, NodeTypeDescriptor, NodeTypeMetadata, PortDataType, PortMetadata,
};
pub use document::{NodeDocument, SceneDocument};
pub use error::{NodeEditorError, Result};
pub use events::{GraphEvent, GraphObserver, VecObserver};
pub use model::GraphModel;
pub use plugins::{NodePlugin, PluginFn, PluginInfo, PluginManager};
pub use registry::NodeRegistry;
pub use selection::{SceneItem, SceneState, SceneView, Selection};
pub use session::EditorSession;
pub use types::{
    ConnectionId, NodeId, NodeRole, NodeValue, Point, PortIndex, PortType, INVALID_NODE_ID,
};
pub use undo::UndoStack;
pub use validation::{validate_scene, ValidationError};
