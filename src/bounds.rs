//! Node and graph bounding boxes.
//!
//! `node_bounds` covers every node rectangle; `graph_bounds` is the union of
//! that with the viewport expressed in graph space, so it always contains
//! `node_bounds`. The tracker subscribes to the node store and is marked
//! dirty by every node mutation; the graph refreshes it after each of its own
//! mutators and once per frame while a gesture is tracking.

#[cfg(test)]
#[path = "bounds_test.rs"]
mod bounds_test;

use std::cell::Cell;
use std::rc::Rc;

use tracing::trace;

use crate::camera::Camera;
use crate::geometry::{Dimensions, Rect};
use crate::node::NodeStore;
use crate::store::SubscriberId;

/// Derived bounding boxes of a graph.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Bounds {
    pub node_bounds: Rect,
    pub graph_bounds: Rect,
}

/// Smallest rectangle covering every rectangle in `rects`, or `None` if empty.
#[must_use]
pub fn compute_node_bounds(rects: impl IntoIterator<Item = Rect>) -> Option<Rect> {
    rects.into_iter().reduce(|acc, r| acc.union(&r))
}

/// Union of the node bounds with the visible graph-space rectangle.
///
/// With no nodes, `node_bounds` collapses to the visible rectangle's center.
#[must_use]
pub fn compute_bounds(node_bounds: Option<Rect>, visible: Rect) -> Bounds {
    match node_bounds {
        Some(nodes) => Bounds { node_bounds: nodes, graph_bounds: nodes.union(&visible) },
        None => {
            let c = visible.center();
            Bounds { node_bounds: Rect::from_parts(c, Dimensions::default()), graph_bounds: visible }
        }
    }
}

/// Keeps a graph's [`Bounds`] current.
#[derive(Debug)]
pub struct BoundsTracker {
    bounds: Bounds,
    dirty: Rc<Cell<bool>>,
    subscription: Option<SubscriberId>,
}

impl Default for BoundsTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl BoundsTracker {
    #[must_use]
    pub fn new() -> Self {
        Self { bounds: Bounds::default(), dirty: Rc::new(Cell::new(true)), subscription: None }
    }

    /// Subscribe to `nodes` so any node mutation marks the bounds dirty.
    pub fn attach(&mut self, nodes: &mut NodeStore) {
        if let Some(id) = self.subscription.take() {
            nodes.unsubscribe(id);
        }
        let dirty = Rc::clone(&self.dirty);
        self.subscription = Some(nodes.subscribe(move |_| dirty.set(true)));
        self.dirty.set(true);
    }

    /// Force the next [`refresh`](Self::refresh) to recompute.
    pub fn mark_dirty(&self) {
        self.dirty.set(true);
    }

    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty.get()
    }

    #[must_use]
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Recompute if dirty. Returns true when the bounds changed.
    pub fn refresh(&mut self, nodes: &NodeStore, camera: &Camera, viewport: &Rect) -> bool {
        if !self.dirty.replace(false) {
            return false;
        }
        self.recompute(nodes, camera, viewport)
    }

    /// Full rescan regardless of the dirty flag. Returns true when the bounds changed.
    pub fn recompute(&mut self, nodes: &NodeStore, camera: &Camera, viewport: &Rect) -> bool {
        self.dirty.set(false);
        let visible = camera.visible_graph_rect(viewport);
        let next = compute_bounds(compute_node_bounds(nodes.rects()), visible);
        let changed = next != self.bounds;
        self.bounds = next;
        if changed {
            trace!(
                node_w = next.node_bounds.width,
                node_h = next.node_bounds.height,
                graph_w = next.graph_bounds.width,
                graph_h = next.graph_bounds.height,
                "bounds recomputed"
            );
        }
        changed
    }
}
