//! Subgraph serialization
//!
//! Converts a selected set of nodes and connections to a [`SceneDocument`]
//! and back. Restoring goes through `load_node`, which may hand out ids
//! different from the saved ones, so [`materialize`] keeps an explicit
//! old-id → new-id map and returns the document with the ids it actually
//! created. Callers that later need to reverse the operation must keep that
//! returned document, not their input.

use std::collections::{BTreeSet, HashMap, HashSet};

use crate::document::SceneDocument;
use crate::error::{NodeEditorError, Result};
use crate::model::GraphModel;
use crate::types::{ConnectionId, NodeId, INVALID_NODE_ID};

/// Serialize the given nodes and the connections among them
///
/// A connection is included only if it exists and both its endpoints are in
/// `node_ids`, so the document never carries a dangling edge.
pub fn serialize_selection(
    model: &dyn GraphModel,
    node_ids: &[NodeId],
    connection_ids: &[ConnectionId],
) -> SceneDocument {
    let mut scene = SceneDocument::new();
    let mut selected = HashSet::new();

    for &node_id in node_ids {
        if !selected.insert(node_id) {
            continue;
        }
        match model.save_node(node_id) {
            Some(node) => scene.nodes.push(node),
            None => {
                selected.remove(&node_id);
            }
        }
    }

    for connection_id in connection_ids {
        if selected.contains(&connection_id.out_node_id)
            && selected.contains(&connection_id.in_node_id)
            && model.connection_exists(connection_id)
        {
            scene.push_connection(*connection_id);
        }
    }

    scene
}

/// Every live connection with both endpoints in `node_ids`
pub fn induced_connections(model: &dyn GraphModel, node_ids: &[NodeId]) -> Vec<ConnectionId> {
    let selected: HashSet<NodeId> = node_ids.iter().copied().collect();
    let mut induced = BTreeSet::new();
    for &node_id in &selected {
        for connection_id in model.all_connection_ids(node_id) {
            if selected.contains(&connection_id.out_node_id)
                && selected.contains(&connection_id.in_node_id)
            {
                induced.insert(connection_id);
            }
        }
    }
    induced.into_iter().collect()
}

/// Insert a document into `model`
///
/// Connection endpoints are remapped through the ids returned by
/// `load_node`. An endpoint that is not part of the document is kept as is
/// when that node is live, otherwise the connection is skipped. Connections
/// the model rejects are skipped as well.
///
/// If any node fails to load, every node created by this call is removed
/// again and `MaterializeFailed` is returned; the model is left as it was.
pub fn materialize(scene: &SceneDocument, model: &mut dyn GraphModel) -> Result<SceneDocument> {
    let mut created = SceneDocument::new();
    let mut id_map: HashMap<NodeId, NodeId> = HashMap::new();

    for node in &scene.nodes {
        let new_id = model.load_node(node);
        if new_id == INVALID_NODE_ID {
            log::warn!(
                "Node {} of type '{}' could not be restored; rolling back {} nodes",
                node.id,
                node.node_type,
                created.nodes.len()
            );
            for restored in &created.nodes {
                model.delete_node(restored.id);
            }
            return Err(NodeEditorError::MaterializeFailed(format!(
                "node {} of type '{}' could not be loaded",
                node.id, node.node_type
            )));
        }

        id_map.insert(node.id, new_id);
        if let Some(saved) = model.save_node(new_id) {
            created.nodes.push(saved);
        }
    }

    for connection_id in &scene.connections {
        let remap = |node_id: NodeId| match id_map.get(&node_id) {
            Some(&new_id) => Some(new_id),
            None if model.node_exists(node_id) => Some(node_id),
            None => None,
        };
        let (Some(out_node_id), Some(in_node_id)) = (
            remap(connection_id.out_node_id),
            remap(connection_id.in_node_id),
        ) else {
            log::debug!("Skipping connection {} with a missing endpoint", connection_id);
            continue;
        };

        let restored = ConnectionId {
            out_node_id,
            in_node_id,
            ..*connection_id
        };
        match model.add_connection(restored) {
            Ok(()) => {
                created.push_connection(restored);
            }
            Err(e) => log::debug!("Skipping connection {}: {}", restored, e),
        }
    }

    Ok(created)
}

/// Remove everything listed in `scene` from `model`
///
/// Connections go first, then nodes. Node deletion cascades to connections,
/// and deleting one that is already gone is a no-op.
pub fn delete_document(scene: &SceneDocument, model: &mut dyn GraphModel) {
    for connection_id in &scene.connections {
        model.delete_connection(connection_id);
    }
    for node in &scene.nodes {
        model.delete_node(node.id);
    }
}

/// Give every node in `scene` a freshly reserved id
///
/// Connections are rewritten to the new ids; connections that reference a
/// node outside the document are dropped.
pub fn remint_node_ids(scene: &SceneDocument, model: &mut dyn GraphModel) -> SceneDocument {
    let mut reminted = SceneDocument::new();
    let mut id_map: HashMap<NodeId, NodeId> = HashMap::new();

    for node in &scene.nodes {
        let new_id = model.new_node_id();
        id_map.insert(node.id, new_id);
        let mut node = node.clone();
        node.id = new_id;
        reminted.nodes.push(node);
    }

    for connection_id in scene.internal_connections() {
        let restored = connection_id.map_nodes(|id| id_map.get(&id).copied().unwrap_or(id));
        reminted.push_connection(restored);
    }

    reminted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::NodeDocument;
    use crate::testing::{add_at, test_model, ADDER, SINK, SOURCE};
    use crate::types::Point;

    #[test]
    fn test_serialize_excludes_dangling_connections() {
        let mut model = test_model();
        let a = add_at(&mut model, SOURCE, 0.0, 0.0);
        let b = add_at(&mut model, ADDER, 100.0, 0.0);
        let c = add_at(&mut model, SINK, 200.0, 0.0);
        let ab = ConnectionId::new(a, 0, b, 0);
        let bc = ConnectionId::new(b, 0, c, 0);
        model.add_connection(ab).unwrap();
        model.add_connection(bc).unwrap();

        let scene = serialize_selection(&model, &[a, b], &[ab, bc]);
        assert_eq!(scene.node_ids(), vec![a, b]);
        assert_eq!(scene.connections, vec![ab]);

        // Nothing is exported for an edge that has only one end selected
        let scene = serialize_selection(&model, &[c], &[ab, bc]);
        assert!(scene.connections.is_empty());
    }

    #[test]
    fn test_serialize_skips_missing_nodes() {
        let mut model = test_model();
        let a = model.add_node(SOURCE);

        let scene = serialize_selection(&model, &[a, a, 77], &[]);
        assert_eq!(scene.node_ids(), vec![a]);
    }

    #[test]
    fn test_induced_connections() {
        let mut model = test_model();
        let a = model.add_node(SOURCE);
        let b = model.add_node(ADDER);
        let c = model.add_node(SINK);
        model.add_connection(ConnectionId::new(a, 0, b, 0)).unwrap();
        model.add_connection(ConnectionId::new(a, 0, b, 1)).unwrap();
        model.add_connection(ConnectionId::new(b, 0, c, 0)).unwrap();

        let induced = induced_connections(&model, &[a, b]);
        assert_eq!(
            induced,
            vec![ConnectionId::new(a, 0, b, 0), ConnectionId::new(a, 0, b, 1)]
        );
    }

    #[test]
    fn test_round_trip_restores_counts() {
        let mut model = test_model();
        let a = add_at(&mut model, SOURCE, 0.0, 0.0);
        let b = add_at(&mut model, ADDER, 50.0, 0.0);
        let c = add_at(&mut model, SINK, 100.0, 0.0);
        model.add_connection(ConnectionId::new(a, 0, b, 0)).unwrap();
        model.add_connection(ConnectionId::new(b, 0, c, 0)).unwrap();

        let nodes_before = model.node_count();
        let connections_before = model.connection_count();

        let selection = [a, b, c];
        let scene = serialize_selection(&model, &selection, &induced_connections(&model, &selection));
        let created = materialize(&scene, &mut model).unwrap();
        assert_eq!(model.node_count(), nodes_before * 2);
        assert_eq!(model.connection_count(), connections_before * 2);

        delete_document(&created, &mut model);
        assert_eq!(model.node_count(), nodes_before);
        assert_eq!(model.connection_count(), connections_before);
    }

    #[test]
    fn test_materialize_remaps_conflicting_ids() {
        let mut model = test_model();
        let a = model.add_node(SOURCE);
        let b = model.add_node(SINK);
        let conn = ConnectionId::new(a, 0, b, 0);
        model.add_connection(conn).unwrap();

        let scene = serialize_selection(&model, &[a, b], &[conn]);
        let created = materialize(&scene, &mut model).unwrap();

        let new_ids = created.node_ids();
        assert_eq!(new_ids.len(), 2);
        assert!(!new_ids.contains(&a) && !new_ids.contains(&b));
        assert_eq!(
            created.connections,
            vec![ConnectionId::new(new_ids[0], 0, new_ids[1], 0)]
        );
        assert!(model.connection_exists(&created.connections[0]));
    }

    #[test]
    fn test_materialize_keeps_live_outside_endpoints() {
        let mut model = test_model();
        let a = model.add_node(SOURCE);
        let b = model.add_node(SINK);
        let conn = ConnectionId::new(a, 0, b, 0);
        model.add_connection(conn).unwrap();

        let mut scene = SceneDocument::new();
        scene.nodes.push(model.save_node(b).unwrap());
        scene.connections.push(conn);
        scene.connections.push(ConnectionId::new(55, 0, b, 0));
        model.delete_node(b);

        let created = materialize(&scene, &mut model).unwrap();
        assert_eq!(created.node_ids(), vec![b]);
        // Edge from the live node survives, edge from the missing one is skipped
        assert_eq!(created.connections, vec![conn]);
        assert!(model.connection_exists(&conn));
    }

    #[test]
    fn test_materialize_rolls_back_on_failure() {
        let mut model = test_model();
        let existing = model.add_node(SOURCE);

        let mut scene = SceneDocument::new();
        scene.nodes.push(NodeDocument {
            id: 10,
            node_type: SOURCE.to_string(),
            position: Point::ORIGIN,
            data: serde_json::Value::Null,
        });
        scene.nodes.push(NodeDocument {
            id: 11,
            node_type: "unregistered".to_string(),
            position: Point::ORIGIN,
            data: serde_json::Value::Null,
        });

        let result = materialize(&scene, &mut model);
        assert!(matches!(result, Err(NodeEditorError::MaterializeFailed(_))));
        assert_eq!(model.all_node_ids(), vec![existing]);
    }

    #[test]
    fn test_delete_document_tolerates_cascaded_connections() {
        let mut model = test_model();
        let a = model.add_node(SOURCE);
        let b = model.add_node(SINK);
        let conn = ConnectionId::new(a, 0, b, 0);
        model.add_connection(conn).unwrap();

        let mut scene = serialize_selection(&model, &[a, b], &[conn]);
        // Listed twice: second delete is a no-op
        scene.connections.push(conn);
        delete_document(&scene, &mut model);
        delete_document(&scene, &mut model);

        assert_eq!(model.node_count(), 0);
        assert_eq!(model.connection_count(), 0);
    }

    #[test]
    fn test_remint_node_ids() {
        let mut model = test_model();
        let a = model.add_node(SOURCE);
        let b = model.add_node(SINK);
        let conn = ConnectionId::new(a, 0, b, 0);
        model.add_connection(conn).unwrap();

        let mut scene = serialize_selection(&model, &[a, b], &[conn]);
        scene.connections.push(ConnectionId::new(a, 0, 999, 0));

        let reminted = remint_node_ids(&scene, &mut model);
        let ids = reminted.node_ids();
        assert!(!ids.contains(&a) && !ids.contains(&b));
        assert_eq!(reminted.connections, vec![ConnectionId::new(ids[0], 0, ids[1], 0)]);

        // Reserved ids are used as-is when loaded
        let created = materialize(&reminted, &mut model).unwrap();
        assert_eq!(created.node_ids(), ids);
    }
}
