#![allow(clippy::float_cmp)]

use super::*;
use crate::camera::ScaleOrigin;
use crate::geometry::Point;
use crate::node::{NodeConfig, NodeKey, create_node};

fn viewport() -> Rect {
    Rect::new(0.0, 0.0, 800.0, 600.0)
}

fn add_node(nodes: &mut NodeStore, id: &str, x: f64, y: f64) {
    let config = NodeConfig { id: Some(id.to_owned()), position: Point::new(x, y), ..NodeConfig::default() };
    nodes.add(create_node(&config)).unwrap();
}

#[test]
fn node_bounds_is_union_of_rects() {
    let rects = [Rect::new(0.0, 0.0, 10.0, 10.0), Rect::new(50.0, -20.0, 10.0, 10.0)];
    assert_eq!(compute_node_bounds(rects), Some(Rect::new(0.0, -20.0, 60.0, 30.0)));
}

#[test]
fn node_bounds_of_nothing_is_none() {
    assert!(compute_node_bounds(Vec::new()).is_none());
}

#[test]
fn graph_bounds_contains_node_bounds_and_view() {
    let nodes = Rect::new(-500.0, 100.0, 50.0, 50.0);
    let visible = Rect::new(0.0, 0.0, 800.0, 600.0);
    let bounds = compute_bounds(Some(nodes), visible);
    assert!(bounds.graph_bounds.contains_rect(&bounds.node_bounds));
    assert!(bounds.graph_bounds.contains_rect(&visible));
}

#[test]
fn empty_graph_collapses_node_bounds_to_view_center() {
    let bounds = compute_bounds(None, viewport());
    assert_eq!(bounds.node_bounds, Rect::new(400.0, 300.0, 0.0, 0.0));
    assert_eq!(bounds.graph_bounds, viewport());
}

#[test]
fn tracker_starts_dirty() {
    let tracker = BoundsTracker::default();
    assert!(tracker.is_dirty());
}

#[test]
fn node_mutations_mark_tracker_dirty() {
    let mut nodes = NodeStore::new();
    let mut tracker = BoundsTracker::new();
    tracker.attach(&mut nodes);
    let camera = Camera::default();

    add_node(&mut nodes, "a", 0.0, 0.0);
    assert!(tracker.is_dirty());
    tracker.refresh(&nodes, &camera, &viewport());
    assert!(!tracker.is_dirty());

    nodes.set_position(&NodeKey::new("a"), Point::new(-1000.0, 0.0));
    assert!(tracker.is_dirty());
    assert!(tracker.refresh(&nodes, &camera, &viewport()));
    assert_eq!(tracker.bounds().node_bounds.x, -1000.0);
}

#[test]
fn refresh_is_a_no_op_when_clean() {
    let mut nodes = NodeStore::new();
    let mut tracker = BoundsTracker::new();
    tracker.attach(&mut nodes);
    add_node(&mut nodes, "a", 0.0, 0.0);
    let camera = Camera::default();
    assert!(tracker.refresh(&nodes, &camera, &viewport()));
    assert!(!tracker.refresh(&nodes, &camera, &viewport()));
}

#[test]
fn graph_bounds_follow_the_camera() {
    let mut nodes = NodeStore::new();
    let mut tracker = BoundsTracker::new();
    tracker.attach(&mut nodes);
    add_node(&mut nodes, "a", 0.0, 0.0);
    let zoomed_out = Camera::new(0.5, Point::ZERO, ScaleOrigin::TopLeft);
    tracker.recompute(&nodes, &zoomed_out, &viewport());
    assert_eq!(tracker.bounds().graph_bounds, Rect::new(0.0, 0.0, 1600.0, 1200.0));
}

#[test]
fn bounds_always_contain_every_node() {
    let mut nodes = NodeStore::new();
    let mut tracker = BoundsTracker::new();
    tracker.attach(&mut nodes);
    for (i, (x, y)) in [(0.0, 0.0), (-300.0, 900.0), (5000.0, -40.0)].into_iter().enumerate() {
        add_node(&mut nodes, &i.to_string(), x, y);
    }
    tracker.refresh(&nodes, &Camera::default(), &viewport());
    let bounds = tracker.bounds();
    for node in nodes.get_all() {
        assert!(bounds.node_bounds.contains_rect(&node.rect()));
    }
    assert!(bounds.graph_bounds.contains_rect(&bounds.node_bounds));
}
