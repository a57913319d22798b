//! Drag, snap, clamp, resize, pan, and zoom mutators.
//!
//! Drags are absolute: every frame recomputes each node's position from its
//! drag-start origin plus `cursor - initial_click`, so accumulated rounding
//! from snapping never compounds across frames.

#[cfg(test)]
#[path = "movement_test.rs"]
mod movement_test;

use std::collections::BTreeMap;

use tracing::debug;

use crate::camera::{Camera, ZoomDirection, clamp_scale, step_scale, zoom_about_point};
use crate::consts::{MIN_NODE_HEIGHT, MIN_NODE_WIDTH};
use crate::error::GraphError;
use crate::geometry::{Dimensions, Point, Rect};
use crate::graph::Graph;
use crate::group::GroupKey;
use crate::node::NodeKey;

/// Context captured when a node drag starts.
#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    /// Graph-space cursor at pointer-down.
    pub initial_click: Point,
    /// Drag-start position of every node being moved.
    pub origins: BTreeMap<NodeKey, Point>,
    /// Group box the grabbed node belongs to; members are clamped inside it.
    pub constraint: Option<GroupKey>,
}

/// Context captured when a group box drag starts.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupDragSession {
    pub group: GroupKey,
    pub initial_click: Point,
    pub origin: Point,
    pub members: BTreeMap<NodeKey, Point>,
}

/// Context captured when a node resize starts.
#[derive(Debug, Clone, PartialEq)]
pub struct ResizeSession {
    pub node: NodeKey,
    pub initial_click: Point,
    pub origin_dimensions: Dimensions,
}

/// Round `value` to the nearest multiple of `grid`. Ties round up.
///
/// A non-finite or non-positive grid leaves `value` unchanged.
#[must_use]
pub fn snap(value: f64, grid: f64) -> f64 {
    if !grid.is_finite() || grid <= 0.0 {
        return value;
    }
    (value / grid + 0.5).floor() * grid
}

/// [`snap`] applied per axis.
#[must_use]
pub fn snap_point(point: Point, grid: f64) -> Point {
    Point::new(snap(point.x, grid), snap(point.y, grid))
}

/// Begin dragging `grabbed` at the graph's current cursor.
///
/// Raises the node, selects it (toggling with `additive`) when it is not
/// already selected, and records the origins of every selected, unlocked node.
///
/// # Errors
///
/// Returns `Locked` for a locked graph or node, `NodeNotFound` if absent.
pub fn start_drag(graph: &mut Graph, grabbed: &NodeKey, additive: bool) -> Result<DragSession, GraphError> {
    if graph.locked {
        return Err(GraphError::Locked);
    }
    let node = graph.nodes.get(grabbed).ok_or_else(|| GraphError::NodeNotFound(grabbed.clone()))?;
    if node.locked {
        return Err(GraphError::Locked);
    }
    let constraint = node.group_box.clone().filter(|g| graph.group_boxes.contains(g));

    graph.raise_node(grabbed);
    if !graph.selected.contains(grabbed) {
        graph.select(grabbed, additive);
    }

    let mut origins = BTreeMap::new();
    for key in graph.selected.clone() {
        let moved = graph.nodes.update(&key, |n| {
            if n.locked {
                return None;
            }
            n.moving = true;
            Some(n.position)
        });
        if let Some(Some(position)) = moved {
            origins.insert(key, position);
        }
    }
    debug!(nodes = origins.len(), "drag started");
    Ok(DragSession { initial_click: graph.cursor, origins, constraint })
}

/// Reposition every dragged node for the current cursor.
///
/// Each position is `origin + (cursor - initial_click)`, snapped to
/// `snap_to` when given, then clamped inside the constraint box for nodes
/// that are its members. Returns the keys that moved.
pub fn move_nodes(graph: &mut Graph, session: &DragSession, snap_to: Option<f64>) -> Vec<NodeKey> {
    if graph.locked {
        return Vec::new();
    }
    let delta = graph.cursor - session.initial_click;
    let constraint = session.constraint.as_ref().and_then(|g| graph.group_boxes.get(g)).cloned();

    let mut moved = Vec::new();
    for (key, origin) in &session.origins {
        let Some(node) = graph.nodes.get(key) else {
            continue;
        };
        if node.locked {
            continue;
        }
        let mut next = *origin + delta;
        if let Some(grid) = snap_to {
            next = snap_point(next, grid);
        }
        if let Some(group) = &constraint
            && group.contains(key)
        {
            next = group.clamp_member(next, node.dimensions);
        }
        if next != node.position && graph.nodes.set_position(key, next) {
            moved.push(key.clone());
        }
    }
    moved
}

/// Clear the moving flags set by [`start_drag`].
pub fn end_drag(graph: &mut Graph, session: &DragSession) {
    for key in session.origins.keys() {
        graph.nodes.update(key, |n| n.moving = false);
    }
    graph.refresh_bounds();
    debug!(nodes = session.origins.len(), "drag ended");
}

/// Begin dragging a group box together with its members.
///
/// # Errors
///
/// Returns `Locked` for a locked graph, `GroupNotFound` if absent.
pub fn start_group_drag(graph: &mut Graph, group: &GroupKey) -> Result<GroupDragSession, GraphError> {
    if graph.locked {
        return Err(GraphError::Locked);
    }
    let origin = graph
        .group_boxes
        .update(group, |g| {
            g.moving = true;
            g.position
        })
        .ok_or_else(|| GraphError::GroupNotFound(group.clone()))?;
    let members = graph
        .group_boxes
        .get(group)
        .map(|g| g.members.iter().filter_map(|k| graph.nodes.position(k).map(|p| (k.clone(), p))).collect())
        .unwrap_or_default();
    debug!(group = %group, "group drag started");
    Ok(GroupDragSession { group: group.clone(), initial_click: graph.cursor, origin, members })
}

/// Move a group box and all of its unlocked members by the cursor delta.
pub fn move_group_box(graph: &mut Graph, session: &GroupDragSession) -> Vec<NodeKey> {
    if graph.locked {
        return Vec::new();
    }
    let delta = graph.cursor - session.initial_click;
    let target = session.origin + delta;
    graph.group_boxes.update(&session.group, |g| g.position = target);

    let mut moved = Vec::new();
    for (key, origin) in &session.members {
        if graph.nodes.get(key).is_some_and(|n| !n.locked) && graph.nodes.set_position(key, *origin + delta) {
            moved.push(key.clone());
        }
    }
    moved
}

pub fn end_group_drag(graph: &mut Graph, session: &GroupDragSession) {
    graph.group_boxes.update(&session.group, |g| g.moving = false);
    graph.refresh_bounds();
    debug!(group = %session.group, "group drag ended");
}

/// Begin resizing `node` from its bottom-right handle.
///
/// # Errors
///
/// Returns `Locked` for a locked graph or node, `NodeNotFound` if absent.
pub fn start_resize(graph: &mut Graph, node: &NodeKey) -> Result<ResizeSession, GraphError> {
    if graph.locked {
        return Err(GraphError::Locked);
    }
    let dims = graph
        .nodes
        .update(node, |n| {
            if n.locked {
                return None;
            }
            n.resizing = true;
            Some(n.dimensions)
        })
        .ok_or_else(|| GraphError::NodeNotFound(node.clone()))?
        .ok_or(GraphError::Locked)?;
    Ok(ResizeSession { node: node.clone(), initial_click: graph.cursor, origin_dimensions: dims })
}

/// Resize to the drag-start size plus the cursor delta.
pub fn resize_from_cursor(graph: &mut Graph, session: &ResizeSession) -> Option<Dimensions> {
    let delta = graph.cursor - session.initial_click;
    let dims = session.origin_dimensions;
    resize_node(graph, &session.node, Dimensions::new(dims.width + delta.x, dims.height + delta.y))
}

pub fn end_resize(graph: &mut Graph, session: &ResizeSession) {
    graph.nodes.update(&session.node, |n| n.resizing = false);
    graph.refresh_bounds();
}

/// Set a node's size, no smaller than 50×25.
///
/// Anchor offsets scale with the node so anchors stay on the same spot of its
/// boundary. Returns the applied size, or `None` if the node is absent or locked.
pub fn resize_node(graph: &mut Graph, key: &NodeKey, requested: Dimensions) -> Option<Dimensions> {
    if graph.locked {
        return None;
    }
    let width = if requested.width.is_finite() { requested.width.max(MIN_NODE_WIDTH) } else { MIN_NODE_WIDTH };
    let height = if requested.height.is_finite() { requested.height.max(MIN_NODE_HEIGHT) } else { MIN_NODE_HEIGHT };
    let next = Dimensions::new(width, height);
    graph
        .nodes
        .update(key, |n| {
            if n.locked {
                return None;
            }
            let old = n.dimensions;
            let sx = if old.width > 0.0 { next.width / old.width } else { 1.0 };
            let sy = if old.height > 0.0 { next.height / old.height } else { 1.0 };
            for anchor in n.anchors.keys() {
                n.anchors.update(&anchor, |a| a.offset = Point::new(a.offset.x * sx, a.offset.y * sy));
            }
            n.dimensions = next;
            Some(next)
        })
        .flatten()
}

/// Step the camera's scale and compensate translation so the graph point at
/// the viewport center stays put. Scale and translation change together.
#[must_use]
pub fn zoom_and_translate(direction: ZoomDirection, viewport: &Rect, camera: Camera, increment: f64) -> Camera {
    let scale = step_scale(camera.scale, increment, direction);
    let translation =
        zoom_about_point(camera.scale, scale, camera.translation, viewport.center(), viewport, camera.origin);
    Camera { scale, translation, ..camera }
}

/// Set the scale to `new_scale` (clamped) while keeping the graph point under
/// the screen-space `pointer` fixed. Returns the applied camera.
pub fn zoom_at_pointer(graph: &mut Graph, new_scale: f64, pointer: Point) -> Camera {
    let camera = graph.camera;
    let scale = clamp_scale(new_scale);
    let translation = zoom_about_point(camera.scale, scale, camera.translation, pointer, &graph.viewport, camera.origin);
    graph.set_camera(Camera { scale, translation, ..camera });
    graph.camera
}

/// Shift the camera by a screen-space delta.
pub fn pan(graph: &mut Graph, screen_delta: Point) {
    if !screen_delta.is_finite() {
        return;
    }
    let camera = graph.camera;
    graph.set_camera(Camera { translation: camera.translation + screen_delta, ..camera });
}

/// Move every selected, unlocked node by `delta`, keeping group members inside
/// their boxes. Returns the keys that moved.
pub fn nudge_selection(graph: &mut Graph, delta: Point) -> Vec<NodeKey> {
    if graph.locked {
        return Vec::new();
    }
    let mut moved = Vec::new();
    for key in graph.selected.clone() {
        let Some(node) = graph.nodes.get(&key) else {
            continue;
        };
        if node.locked {
            continue;
        }
        let mut next = node.position + delta;
        if let Some(group) = node.group_box.as_ref().and_then(|g| graph.group_boxes.get(g))
            && group.contains(&key)
        {
            next = group.clamp_member(next, node.dimensions);
        }
        if graph.nodes.set_position(&key, next) {
            moved.push(key);
        }
    }
    graph.refresh_bounds();
    moved
}
