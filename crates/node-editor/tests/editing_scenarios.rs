//! End-to-end editing scenarios through `EditorSession`

use std::sync::Arc;

use node_editor::{
    ConnectionId, EditorConfig, EditorSession, GraphEvent, GraphModel, NodeId, NodeRegistry,
    NodeTypeMetadata, PortDataType, PortMetadata, Point, SceneDocument, VecObserver,
};

fn calculator_registry() -> NodeRegistry {
    let mut registry = NodeRegistry::new();
    registry.register(
        NodeTypeMetadata::new("number-source", "Number Source")
            .with_output(PortMetadata::new("Number", PortDataType::Decimal))
            .with_default_data(serde_json::json!({"number": 1.5})),
    );
    registry.register(
        NodeTypeMetadata::new("number-display", "Result")
            .with_input(PortMetadata::new("Number", PortDataType::Decimal)),
    );
    registry.register(
        NodeTypeMetadata::new("addition", "Addition")
            .with_input(PortMetadata::new("A", PortDataType::Decimal))
            .with_input(PortMetadata::new("B", PortDataType::Decimal))
            .with_output(PortMetadata::new("Sum", PortDataType::Decimal)),
    );
    registry
}

fn session() -> EditorSession {
    EditorSession::with_registry(calculator_registry(), EditorConfig::default())
}

fn create(session: &mut EditorSession, node_type: &str, x: f64, y: f64) -> NodeId {
    session
        .create_node(node_type, Point::new(x, y))
        .unwrap_or_else(|| panic!("could not create {}", node_type))
}

#[test]
fn delete_cascades_and_undo_chain_empties_graph() {
    let mut session = session();
    let a = create(&mut session, "number-source", 0.0, 0.0);
    let b = create(&mut session, "number-display", 100.0, 0.0);
    let conn = ConnectionId::new(a, 0, b, 0);
    assert!(session.connect(conn));

    session.clear_selection();
    session.select_node(b);
    assert!(session.delete_selection());

    assert!(!session.model().connection_exists(&conn));
    assert_eq!(session.model().all_node_ids(), vec![a]);
    assert_eq!(session.history().len(), 4);

    // Undoing the delete brings back node and edge
    assert!(session.undo());
    assert!(session.model().node_exists(b));
    assert!(session.model().connection_exists(&conn));

    for _ in 0..3 {
        assert!(session.undo());
    }
    assert_eq!(session.model().node_count(), 0);
    assert!(!session.undo());

    // Full redo replays the same ids
    while session.redo() {}
    assert_eq!(session.model().all_node_ids(), vec![a]);
    assert_eq!(session.model().node_position(a), Some(Point::new(0.0, 0.0)));
    assert_eq!(session.model().connection_count(), 0);
}

#[test]
fn copy_paste_centres_on_drop_point() {
    let mut session = session();
    let source = create(&mut session, "number-source", 0.0, 0.0);
    let adder = create(&mut session, "addition", 100.0, 20.0);
    let first = ConnectionId::new(source, 0, adder, 0);
    let second = ConnectionId::new(source, 0, adder, 1);
    session.connect(first);
    session.connect(second);

    let before = session.save_scene();
    let history_before = session.history().len();

    session.select_all();
    assert_eq!(session.copy_selection(), 2);
    // Copy touches neither graph nor history
    assert_eq!(session.save_scene(), before);
    assert_eq!(session.history().len(), history_before);

    let pasted = session.paste(Point::new(50.0, 50.0));
    assert_eq!(pasted.len(), 2);
    assert!(!pasted.contains(&source) && !pasted.contains(&adder));

    let positions: Vec<Point> = pasted
        .iter()
        .filter_map(|&id| session.model().node_position(id))
        .collect();
    let centroid = Point::new(
        positions.iter().map(|p| p.x).sum::<f64>() / 2.0,
        positions.iter().map(|p| p.y).sum::<f64>() / 2.0,
    );
    assert_eq!(centroid, Point::new(50.0, 50.0));
    assert_eq!(session.model().connection_count(), 4);
    assert_eq!(session.selection().nodes, pasted);

    // Original nodes are untouched
    assert_eq!(session.model().node_position(source), Some(Point::new(0.0, 0.0)));

    session.undo();
    assert_eq!(session.save_scene(), before);
}

#[test]
fn pasting_twice_creates_independent_copies() {
    let mut session = session();
    let a = create(&mut session, "number-source", 10.0, 10.0);
    session.select_node(a);
    session.copy_selection();

    let first = session.paste(Point::new(0.0, 0.0));
    let second = session.paste(Point::new(0.0, 0.0));
    assert_eq!(first.len(), 1);
    assert_eq!(second.len(), 1);
    assert_ne!(first, second);
    assert_eq!(session.model().node_count(), 3);

    session.undo();
    session.undo();
    assert_eq!(session.model().all_node_ids(), vec![a]);
}

#[test]
fn undo_of_deleted_hub_restores_every_connection() {
    let mut session = session();
    let x = create(&mut session, "number-source", 0.0, 0.0);
    let y = create(&mut session, "number-source", 0.0, 50.0);
    let sum = create(&mut session, "addition", 100.0, 25.0);
    let out = create(&mut session, "number-display", 200.0, 25.0);
    let edges = [
        ConnectionId::new(x, 0, sum, 0),
        ConnectionId::new(y, 0, sum, 1),
        ConnectionId::new(sum, 0, out, 0),
    ];
    for edge in edges {
        assert!(session.connect(edge));
    }

    session.clear_selection();
    session.select_node(sum);
    session.delete_selection();
    assert_eq!(session.model().connection_count(), 0);

    session.undo();
    for edge in &edges {
        assert!(session.model().connection_exists(edge), "missing {}", edge);
    }
    assert_eq!(
        session.model().node_data(sum, node_editor::NodeRole::InPortCount),
        Some(node_editor::NodeValue::Count(2))
    );
}

#[test]
fn drag_collapses_into_one_undo_step() {
    let mut session = session();
    let a = create(&mut session, "number-source", 0.0, 0.0);
    let b = create(&mut session, "number-display", 100.0, 0.0);
    session.clear_selection();
    session.select_node(a);
    session.select_node(b);

    session.move_selection(Point::new(3.0, 4.0));
    session.move_selection(Point::new(7.0, -4.0));
    assert_eq!(session.history().len(), 3);
    assert_eq!(session.model().node_position(b), Some(Point::new(110.0, 0.0)));

    session.undo();
    assert_eq!(session.model().node_position(a), Some(Point::new(0.0, 0.0)));
    assert_eq!(session.model().node_position(b), Some(Point::new(100.0, 0.0)));

    // A different node set starts a new entry
    session.move_nodes(&[a], Point::new(1.0, 1.0));
    session.move_nodes(&[a, b], Point::new(1.0, 1.0));
    assert_eq!(session.history().len(), 4);
}

#[test]
fn deleting_twice_is_harmless() {
    let mut session = session();
    let a = create(&mut session, "number-source", 0.0, 0.0);
    let b = create(&mut session, "number-display", 50.0, 0.0);
    let conn = ConnectionId::new(a, 0, b, 0);
    session.connect(conn);

    session.select_node(a);
    session.select_connection(conn);
    assert!(session.delete_selection());
    // Selection was cleared by the delete
    assert!(!session.delete_selection());
    assert_eq!(session.history().len(), 4);
    assert_eq!(session.model().all_node_ids(), vec![b]);
}

#[test]
fn observers_see_cascade_before_node_removal() {
    let mut session = session();
    let observer = Arc::new(VecObserver::new());
    let a = create(&mut session, "number-source", 0.0, 0.0);
    let b = create(&mut session, "number-display", 50.0, 0.0);
    let conn = ConnectionId::new(a, 0, b, 0);
    session.connect(conn);
    session.add_observer(observer.clone());

    session.clear_selection();
    session.select_node(a);
    session.delete_selection();

    let events = observer.events();
    assert_eq!(
        events,
        vec![
            GraphEvent::ConnectionDeleted { connection_id: conn },
            GraphEvent::NodeDeleted { node_id: a },
        ]
    );
}

#[test]
fn saved_scene_reloads_in_a_new_session() {
    let mut session = session();
    let a = create(&mut session, "number-source", 0.0, 0.0);
    let b = create(&mut session, "number-display", 50.0, 0.0);
    session.connect(ConnectionId::new(a, 0, b, 0));

    let text = session.save_scene().to_json_string().unwrap();
    let document = SceneDocument::from_json_str(&text).unwrap();

    let mut restored = self::session();
    restored.load_scene(&document).unwrap();
    assert_eq!(restored.save_scene(), session.save_scene());
    assert_eq!(restored.model().connection_count(), 1);
}
