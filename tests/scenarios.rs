//! End-to-end scenarios driven through the public API only.
#![allow(clippy::float_cmp)]

use std::cell::RefCell;
use std::rc::Rc;

use graph_canvas::anchor::{AnchorConfig, AnchorKey, AnchorKind};
use graph_canvas::camera::ScaleOrigin;
use graph_canvas::edge::{ConnectionEvent, EdgeConfig};
use graph_canvas::engine::{Action, Engine};
use graph_canvas::geometry::{Cardinal, Dimensions, Direction, Point};
use graph_canvas::graph::{ConnectionConfig, GraphConfig, GraphRegistry, create_graph};
use graph_canvas::input::{Button, Modifiers, PointerTarget};
use graph_canvas::node::{NodeConfig, NodeKey};
use graph_canvas::routing::{DirectedPoint, RouteCase, classify, route_orthogonal_path};

const BUFFER: f64 = 30.0;

fn node(id: &str, x: f64, anchors: Vec<AnchorConfig>) -> NodeConfig {
    NodeConfig {
        id: Some(id.to_owned()),
        position: Point::new(x, 0.0),
        dimensions: Some(Dimensions::new(100.0, 50.0)),
        anchors: Some(anchors),
        ..NodeConfig::default()
    }
}

fn anchor(id: &str, kind: AnchorKind, direction: Direction) -> AnchorConfig {
    AnchorConfig { id: id.to_owned(), kind, direction: Some(direction), ..AnchorConfig::default() }
}

/// A(0,0) facing east and B(300,0) facing west, both 100×50, connected.
fn facing_pair() -> GraphConfig {
    GraphConfig {
        id: Some("facing".to_owned()),
        scale_origin: ScaleOrigin::TopLeft,
        nodes: vec![
            node("A", 0.0, vec![anchor("out", AnchorKind::Output, Direction::East)]),
            node("B", 300.0, vec![anchor("in", AnchorKind::Input, Direction::West)]),
        ],
        edges: vec![ConnectionConfig {
            source_node: "A".to_owned(),
            source_anchor: "out".to_owned(),
            target_node: "B".to_owned(),
            target_anchor: "in".to_owned(),
            edge: EdgeConfig::default(),
        }],
        ..GraphConfig::default()
    }
}

fn akey(node: &str, id: &str) -> AnchorKey {
    AnchorKey::new(&NodeKey::new(node), id)
}

fn sum(steps: &[Point]) -> Point {
    steps.iter().fold(Point::ZERO, |acc, s| acc + *s)
}

#[test]
fn facing_nodes_route_in_three_segments() {
    let origin = DirectedPoint::new(Point::ZERO, Cardinal::East);
    let other = DirectedPoint::new(Point::new(300.0, 0.0), Cardinal::West);
    assert_eq!(classify(origin, other, BUFFER), RouteCase::Facing);
    let steps = route_orthogonal_path(origin, other, BUFFER);
    assert_eq!(steps.len(), 3);
    assert_eq!(sum(&steps), Point::new(300.0, 0.0));

    // The same pair mounted as a graph routes between its anchors.
    let graph = create_graph("facing", &facing_pair()).unwrap();
    let (out, inp) = (akey("A", "out"), akey("B", "in"));
    let target_pos = graph.nodes().anchor_position(&inp).unwrap();
    let source_pos = graph.nodes().anchor_position(&out).unwrap();
    let source = graph.directed_anchor(&out, target_pos).unwrap();
    let target = graph.directed_anchor(&inp, source_pos).unwrap();
    assert_eq!(classify(source, target, BUFFER), RouteCase::Facing);
    let steps = route_orthogonal_path(source, target, BUFFER);
    assert_eq!(steps.len(), 3);
    assert_eq!(sum(&steps), target_pos - source_pos);
}

#[test]
fn pinch_about_viewport_center() {
    let config = GraphConfig { scale_origin: ScaleOrigin::TopLeft, ..GraphConfig::default() };
    let mut engine = Engine::new(create_graph("pinch", &config).unwrap());
    engine.on_touch_start(&[Point::new(300.0, 300.0), Point::new(500.0, 300.0)]);
    engine.on_touch_move(&[Point::new(250.0, 300.0), Point::new(550.0, 300.0)]);
    engine.on_frame();

    let camera = engine.camera();
    assert!((camera.scale - 1.5).abs() < 1e-12);
    assert!((camera.translation - Point::new(-200.0, -150.0)).is_zero());
}

#[test]
fn snapped_drag_lands_on_grid() {
    let config = GraphConfig { snap_to: Some(20.0), ..facing_pair() };
    let mut engine = Engine::new(create_graph("snap", &config).unwrap());
    let a = NodeKey::new("A");
    let target = PointerTarget::Node(a.clone());
    let start = Point::new(10.0, 10.0);

    engine.on_pointer_down(start, &target, Button::Primary, Modifiers::default());
    engine.on_pointer_move(Point::new(60.0, 60.0), Modifiers::default());
    let frame = engine.on_frame();
    assert!(frame.contains(&Action::NodesMoved(vec![a.clone()])));
    engine.on_pointer_up(Point::new(60.0, 60.0), &target, Button::Primary);

    let position = engine.graph().nodes().position(&a).unwrap();
    assert_eq!(position, Point::new(60.0, 60.0));
    assert_eq!(position.x % 20.0, 0.0);
    assert_eq!(position.y % 20.0, 0.0);
    assert!(engine.on_frame().is_empty());
}

#[test]
fn disconnect_then_reconnect_fires_one_event_each() {
    let mut registry = GraphRegistry::new();
    let key = registry.mount(&facing_pair()).unwrap();
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    let (out, inp) = (akey("A", "out"), akey("B", "in"));

    let original = registry.get(&key).unwrap().edges().len();
    registry
        .update(&key, |graph| {
            graph.edges_mut().on_connection(move |_, event| sink.borrow_mut().push(event));
            assert!(graph.disconnect(&out, &inp).is_some());
            graph.connect(&out, &inp, &EdgeConfig::default())
        })
        .unwrap()
        .unwrap();

    assert_eq!(*events.borrow(), vec![ConnectionEvent::Disconnected, ConnectionEvent::Connected]);
    assert_eq!(registry.get(&key).unwrap().edges().len(), original);
}
