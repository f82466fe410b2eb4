//! Change notifications emitted by graph models
//!
//! Observers are called synchronously from inside the mutating call, after
//! the mutation has been applied. A presentation layer can therefore create
//! the item for a new node before the command that created it continues.

use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::types::{ConnectionId, NodeId};

/// Trait for receiving graph change notifications
///
/// This abstracts over whatever sits on top of the model (a scene, a
/// property panel, a test recorder).
pub trait GraphObserver: Send + Sync {
    /// Called once per applied mutation
    fn notify(&self, event: &GraphEvent);
}

/// Mutations reported by a graph model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum GraphEvent {
    /// A node was added
    #[serde(rename_all = "camelCase")]
    NodeCreated { node_id: NodeId },

    /// A node was removed (its connections were removed first)
    #[serde(rename_all = "camelCase")]
    NodeDeleted { node_id: NodeId },

    /// A node's payload changed
    #[serde(rename_all = "camelCase")]
    NodeUpdated { node_id: NodeId },

    /// A node moved on the canvas
    #[serde(rename_all = "camelCase")]
    NodePositionUpdated { node_id: NodeId },

    /// A connection was added
    #[serde(rename_all = "camelCase")]
    ConnectionCreated { connection_id: ConnectionId },

    /// A connection was removed
    #[serde(rename_all = "camelCase")]
    ConnectionDeleted { connection_id: ConnectionId },
}

/// A vector-based observer that records events
///
/// Useful for testing to verify events were emitted correctly.
pub struct VecObserver {
    events: Mutex<Vec<GraphEvent>>,
}

impl VecObserver {
    pub fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
        }
    }

    /// Get all recorded events
    pub fn events(&self) -> Vec<GraphEvent> {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Clear all recorded events
    pub fn clear(&self) {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clear();
    }
}

impl Default for VecObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphObserver for VecObserver {
    fn notify(&self, event: &GraphEvent) {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(event.clone());
    }
}
