#![allow(clippy::float_cmp)]

use super::*;
use crate::anchor::AnchorKey;
use crate::camera::ScaleOrigin;
use crate::graph::{GraphConfig, create_graph};
use crate::group::GroupBoxConfig;
use crate::node::NodeConfig;

fn node(id: &str, x: f64, y: f64) -> NodeConfig {
    NodeConfig { id: Some(id.to_owned()), position: Point::new(x, y), ..NodeConfig::default() }
}

/// Identity camera with a top-left scale origin, so screen and graph coincide.
fn graph_with(nodes: Vec<NodeConfig>) -> Graph {
    let config = GraphConfig { scale_origin: ScaleOrigin::TopLeft, nodes, ..GraphConfig::default() };
    create_graph("g", &config).unwrap()
}

fn key(id: &str) -> NodeKey {
    NodeKey::new(id)
}

fn position(graph: &Graph, id: &str) -> Point {
    graph.nodes().position(&key(id)).unwrap()
}

// --- Snap ---

#[test]
fn snap_rounds_to_nearest_multiple() {
    assert_eq!(snap(50.0, 20.0), 60.0);
    assert_eq!(snap(49.0, 20.0), 40.0);
    assert_eq!(snap(-50.0, 20.0), -40.0);
    assert_eq!(snap(0.0, 20.0), 0.0);
}

#[test]
fn snap_with_bad_grid_is_identity() {
    assert_eq!(snap(13.0, 0.0), 13.0);
    assert_eq!(snap(13.0, -5.0), 13.0);
    assert_eq!(snap(13.0, f64::NAN), 13.0);
}

#[test]
fn snapped_values_are_multiples() {
    for v in [-123.4, -7.0, 0.1, 19.99, 333.3] {
        let s = snap(v, 25.0);
        assert_eq!((s / 25.0).fract(), 0.0, "{v} snapped to {s}");
    }
}

// --- Drag ---

#[test]
fn drag_moves_by_cursor_delta() {
    let mut graph = graph_with(vec![node("a", 0.0, 0.0)]);
    graph.set_cursor_screen(Point::new(10.0, 10.0));
    let session = start_drag(&mut graph, &key("a"), false).unwrap();
    graph.set_cursor_screen(Point::new(60.0, 40.0));
    let moved = move_nodes(&mut graph, &session, None);
    assert_eq!(moved, vec![key("a")]);
    assert_eq!(position(&graph, "a"), Point::new(50.0, 30.0));
}

#[test]
fn drag_is_absolute_not_incremental() {
    let mut graph = graph_with(vec![node("a", 0.0, 0.0)]);
    let session = start_drag(&mut graph, &key("a"), false).unwrap();
    for x in [10.0, 20.0, 30.0] {
        graph.set_cursor_screen(Point::new(x, 0.0));
        move_nodes(&mut graph, &session, Some(20.0));
    }
    assert_eq!(position(&graph, "a"), Point::new(40.0, 0.0));
}

#[test]
fn drag_snaps_resulting_position() {
    let mut graph = graph_with(vec![node("a", 3.0, 7.0)]);
    let session = start_drag(&mut graph, &key("a"), false).unwrap();
    graph.set_cursor_screen(Point::new(50.0, 50.0));
    move_nodes(&mut graph, &session, Some(20.0));
    assert_eq!(position(&graph, "a"), Point::new(60.0, 60.0));
}

#[test]
fn drag_moves_whole_selection() {
    let mut graph = graph_with(vec![node("a", 0.0, 0.0), node("b", 300.0, 0.0)]);
    graph.select(&key("a"), false);
    graph.select(&key("b"), true);
    let session = start_drag(&mut graph, &key("a"), false).unwrap();
    assert_eq!(session.origins.len(), 2);
    graph.set_cursor_screen(Point::new(0.0, 100.0));
    move_nodes(&mut graph, &session, None);
    assert_eq!(position(&graph, "a"), Point::new(0.0, 100.0));
    assert_eq!(position(&graph, "b"), Point::new(300.0, 100.0));
}

#[test]
fn start_drag_raises_and_selects() {
    let mut graph = graph_with(vec![node("a", 0.0, 0.0), node("b", 300.0, 0.0)]);
    start_drag(&mut graph, &key("a"), false).unwrap();
    assert_eq!(graph.node(&key("a")).unwrap().z_index, 3);
    assert!(graph.node(&key("a")).unwrap().moving);
    assert!(graph.selection().contains(&key("a")));
}

#[test]
fn end_drag_clears_moving_flag() {
    let mut graph = graph_with(vec![node("a", 0.0, 0.0)]);
    let session = start_drag(&mut graph, &key("a"), false).unwrap();
    end_drag(&mut graph, &session);
    assert!(!graph.node(&key("a")).unwrap().moving);
}

#[test]
fn locked_graph_refuses_drag() {
    let mut graph = graph_with(vec![node("a", 0.0, 0.0)]);
    graph.locked = true;
    assert!(matches!(start_drag(&mut graph, &key("a"), false), Err(GraphError::Locked)));
}

#[test]
fn locked_node_in_selection_stays_put() {
    let mut locked = node("b", 300.0, 0.0);
    locked.locked = true;
    let mut graph = graph_with(vec![node("a", 0.0, 0.0), locked]);
    graph.select(&key("a"), false);
    graph.select(&key("b"), true);
    let session = start_drag(&mut graph, &key("a"), false).unwrap();
    graph.set_cursor_screen(Point::new(50.0, 0.0));
    move_nodes(&mut graph, &session, None);
    assert_eq!(position(&graph, "b"), Point::new(300.0, 0.0));
    assert_eq!(position(&graph, "a"), Point::new(50.0, 0.0));
}

#[test]
fn graph_locked_mid_drag_stops_moves() {
    let mut graph = graph_with(vec![node("a", 0.0, 0.0)]);
    let session = start_drag(&mut graph, &key("a"), false).unwrap();
    graph.locked = true;
    graph.set_cursor_screen(Point::new(50.0, 0.0));
    assert!(move_nodes(&mut graph, &session, None).is_empty());
    assert_eq!(position(&graph, "a"), Point::ZERO);
}

// --- Group clamp ---

fn grouped_graph() -> Graph {
    let mut graph = graph_with(vec![node("a", 100.0, 100.0), node("free", 600.0, 600.0)]);
    graph
        .add_group_box(&GroupBoxConfig {
            id: "box".to_owned(),
            position: Point::new(50.0, 50.0),
            dimensions: Dimensions::new(400.0, 300.0),
            color: None,
            members: vec!["a".to_owned()],
        })
        .unwrap();
    graph
}

#[test]
fn members_are_clamped_inside_their_box() {
    let mut graph = grouped_graph();
    let session = start_drag(&mut graph, &key("a"), false).unwrap();
    assert_eq!(session.constraint, Some(GroupKey::new("box")));
    graph.set_cursor_screen(Point::new(1000.0, -1000.0));
    move_nodes(&mut graph, &session, None);
    // x ∈ [60, 240], y ∈ [60, 240] for a 200×100 node in a 400×300 box at (50, 50).
    assert_eq!(position(&graph, "a"), Point::new(240.0, 60.0));
}

#[test]
fn clamped_member_stays_within_box() {
    let mut graph = grouped_graph();
    let session = start_drag(&mut graph, &key("a"), false).unwrap();
    let group = graph.group_boxes().get(&GroupKey::new("box")).unwrap().rect();
    for (x, y) in [(-500.0, 0.0), (0.0, 800.0), (37.0, 41.0), (999.0, 999.0)] {
        graph.set_cursor_screen(Point::new(x, y));
        move_nodes(&mut graph, &session, Some(20.0));
        let rect = graph.node(&key("a")).unwrap().rect();
        assert!(group.contains_rect(&rect), "{rect:?} escaped {group:?}");
    }
}

#[test]
fn non_members_move_unclamped() {
    let mut graph = grouped_graph();
    let session = start_drag(&mut graph, &key("free"), false).unwrap();
    assert!(session.constraint.is_none());
    graph.set_cursor_screen(Point::new(-5000.0, 0.0));
    move_nodes(&mut graph, &session, None);
    assert_eq!(position(&graph, "free"), Point::new(-4400.0, 600.0));
}

#[test]
fn missing_constraint_box_moves_unclamped() {
    let mut graph = grouped_graph();
    let session = start_drag(&mut graph, &key("a"), false).unwrap();
    graph.remove_group_box(&GroupKey::new("box"));
    graph.set_cursor_screen(Point::new(1000.0, 0.0));
    move_nodes(&mut graph, &session, None);
    assert_eq!(position(&graph, "a"), Point::new(1100.0, 100.0));
}

#[test]
fn group_drag_moves_box_and_members() {
    let mut graph = grouped_graph();
    let session = start_group_drag(&mut graph, &GroupKey::new("box")).unwrap();
    assert!(graph.group_boxes().get(&GroupKey::new("box")).unwrap().moving);
    graph.set_cursor_screen(Point::new(25.0, -10.0));
    let moved = move_group_box(&mut graph, &session);
    assert_eq!(moved, vec![key("a")]);
    assert_eq!(graph.group_boxes().get(&GroupKey::new("box")).unwrap().position, Point::new(75.0, 40.0));
    assert_eq!(position(&graph, "a"), Point::new(125.0, 90.0));
    assert_eq!(position(&graph, "free"), Point::new(600.0, 600.0));
    end_group_drag(&mut graph, &session);
    assert!(!graph.group_boxes().get(&GroupKey::new("box")).unwrap().moving);
}

#[test]
fn group_drag_of_missing_box_fails() {
    let mut graph = grouped_graph();
    assert!(matches!(start_group_drag(&mut graph, &GroupKey::new("nope")), Err(GraphError::GroupNotFound(_))));
}

// --- Resize ---

#[test]
fn resize_has_a_minimum() {
    let mut graph = graph_with(vec![node("a", 0.0, 0.0)]);
    let applied = resize_node(&mut graph, &key("a"), Dimensions::new(10.0, 5.0));
    assert_eq!(applied, Some(Dimensions::new(50.0, 25.0)));
}

#[test]
fn resize_keeps_anchors_on_their_sides() {
    let mut graph = graph_with(vec![node("a", 0.0, 0.0)]);
    resize_node(&mut graph, &key("a"), Dimensions::new(400.0, 200.0));
    let out = AnchorKey::new(&key("a"), "out");
    assert_eq!(graph.nodes().anchor_position(&out), Some(Point::new(400.0, 100.0)));
}

#[test]
fn resize_from_cursor_tracks_delta() {
    let mut graph = graph_with(vec![node("a", 0.0, 0.0)]);
    graph.set_cursor_screen(Point::new(200.0, 100.0));
    let session = start_resize(&mut graph, &key("a")).unwrap();
    assert!(graph.node(&key("a")).unwrap().resizing);
    graph.set_cursor_screen(Point::new(250.0, 80.0));
    assert_eq!(resize_from_cursor(&mut graph, &session), Some(Dimensions::new(250.0, 80.0)));
    end_resize(&mut graph, &session);
    assert!(!graph.node(&key("a")).unwrap().resizing);
    assert_eq!(graph.bounds().node_bounds, Rect::new(0.0, 0.0, 250.0, 80.0));
}

#[test]
fn locked_node_cannot_resize() {
    let mut locked = node("a", 0.0, 0.0);
    locked.locked = true;
    let mut graph = graph_with(vec![locked]);
    assert!(resize_node(&mut graph, &key("a"), Dimensions::new(400.0, 200.0)).is_none());
    assert!(matches!(start_resize(&mut graph, &key("a")), Err(GraphError::Locked)));
}

// --- Camera ---

#[test]
fn zoom_and_translate_keeps_center_fixed() {
    let viewport = Rect::new(0.0, 0.0, 800.0, 600.0);
    for origin in [ScaleOrigin::Center, ScaleOrigin::TopLeft] {
        let camera = Camera::new(1.0, Point::new(40.0, -20.0), origin);
        let before = camera.screen_to_graph(viewport.center(), &viewport);
        let zoomed = zoom_and_translate(ZoomDirection::In, &viewport, camera, 0.1);
        assert!((zoomed.scale - 1.1).abs() < 1e-12);
        let after = zoomed.screen_to_graph(viewport.center(), &viewport);
        assert!((after - before).is_zero());
    }
}

#[test]
fn zoom_and_translate_respects_limits() {
    let viewport = Rect::new(0.0, 0.0, 800.0, 600.0);
    let camera = Camera::new(2.0, Point::ZERO, ScaleOrigin::Center);
    let zoomed = zoom_and_translate(ZoomDirection::In, &viewport, camera, 0.1);
    assert_eq!(zoomed.scale, 2.0);
    assert!(zoomed.translation.is_zero());
}

#[test]
fn zoom_at_pointer_pinch_example() {
    let mut graph = graph_with(Vec::new());
    let camera = zoom_at_pointer(&mut graph, 1.5, Point::new(400.0, 300.0));
    assert_eq!(camera.scale, 1.5);
    assert!((camera.translation - Point::new(-200.0, -150.0)).is_zero());
}

#[test]
fn pan_shifts_translation() {
    let mut graph = graph_with(Vec::new());
    pan(&mut graph, Point::new(15.0, -5.0));
    pan(&mut graph, Point::new(f64::NAN, 0.0));
    assert_eq!(graph.camera().translation, Point::new(15.0, -5.0));
}

// --- Nudge ---

#[test]
fn nudge_moves_selection_only() {
    let mut graph = graph_with(vec![node("a", 0.0, 0.0), node("b", 300.0, 0.0)]);
    graph.select(&key("a"), false);
    let moved = nudge_selection(&mut graph, Point::new(10.0, 0.0));
    assert_eq!(moved, vec![key("a")]);
    assert_eq!(position(&graph, "a"), Point::new(10.0, 0.0));
    assert_eq!(position(&graph, "b"), Point::new(300.0, 0.0));
}

#[test]
fn nudge_clamps_group_members() {
    let mut graph = grouped_graph();
    graph.select(&key("a"), false);
    nudge_selection(&mut graph, Point::new(-500.0, 0.0));
    assert_eq!(position(&graph, "a"), Point::new(60.0, 100.0));
}
