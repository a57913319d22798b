//! Gesture-driven engine over a [`Graph`].
//!
//! Hosts forward pointer, wheel, touch and key events with screen-space
//! positions and get back a list of [`Action`]s describing what changed.
//! Long gestures (node drag, group drag, resize, connect, pinch) put the
//! input state machine in a tracking state: pointer and touch moves only
//! record where the pointer is, and the mutation is applied by
//! [`Engine::on_frame`], which the host calls once per animation frame.
//! While tracking, each frame returns [`Action::FrameRequested`]; returning
//! to a non-tracking state ends the chain.

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use std::collections::BTreeSet;

use tracing::debug;

use crate::anchor::AnchorKey;
use crate::camera::{Camera, ZoomDirection, zoom_delta};
use crate::consts::{NUDGE_STEP, ZOOM_INCREMENT};
use crate::edge::{EdgeConfig, EdgeKey};
use crate::geometry::{Dimensions, Point};
use crate::graph::Graph;
use crate::input::{Button, InputState, Key, Modifiers, PointerTarget, WheelDelta};
use crate::movement::{
    end_drag, end_group_drag, end_resize, move_group_box, move_nodes, nudge_selection, pan, resize_from_cursor, resize_node,
    start_drag, start_group_drag, start_resize, zoom_and_translate, zoom_at_pointer,
};
use crate::node::NodeKey;

/// Actions returned from input handlers for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    RenderNeeded,
    /// Call [`Engine::on_frame`] on the next animation frame.
    FrameRequested,
    NodesMoved(Vec<NodeKey>),
    NodeResized { node: NodeKey, dimensions: Dimensions },
    EdgeConnected(EdgeKey),
    EdgeDisconnected(EdgeKey),
    NodesDeleted(Vec<NodeKey>),
    CameraChanged(Camera),
    SelectionChanged(Vec<NodeKey>),
}

/// Input engine bound to one graph.
#[derive(Debug)]
pub struct Engine {
    pub graph: Graph,
    pub input: InputState,
    /// Config applied to edges created by drag-to-connect.
    pub edge_defaults: EdgeConfig,
}

impl Engine {
    #[must_use]
    pub fn new(graph: Graph) -> Self {
        Self {
            graph,
            input: InputState::Idle,
            edge_defaults: EdgeConfig::default(),
        }
    }

    // --- Queries ---

    #[must_use]
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    #[must_use]
    pub fn camera(&self) -> Camera {
        self.graph.camera()
    }

    /// Whether a gesture is waiting for per-frame updates.
    #[must_use]
    pub fn is_tracking(&self) -> bool {
        self.input.is_tracking()
    }

    // --- Pointer ---

    pub fn on_pointer_down(
        &mut self,
        screen_pt: Point,
        target: &PointerTarget,
        button: Button,
        modifiers: Modifiers,
    ) -> Vec<Action> {
        self.graph.set_cursor_screen(screen_pt);
        if button == Button::Middle {
            self.input = InputState::Panning { last_screen: screen_pt };
            return Vec::new();
        }
        if button != Button::Primary {
            return Vec::new();
        }

        let before = self.graph.selection().clone();
        let mut actions = Vec::new();
        match target {
            PointerTarget::Background => {
                if !modifiers.is_additive() {
                    self.graph.clear_selection();
                }
                self.input = InputState::Panning { last_screen: screen_pt };
            }
            PointerTarget::Node(key) => match start_drag(&mut self.graph, key, modifiers.is_additive()) {
                Ok(session) => self.begin_tracking(InputState::DraggingNodes(session), &mut actions),
                Err(err) => {
                    debug!(node = %key, error = %err, "drag refused");
                    self.graph.select(key, modifiers.is_additive());
                }
            },
            PointerTarget::GroupBox(group) => match start_group_drag(&mut self.graph, group) {
                Ok(session) => self.begin_tracking(InputState::DraggingGroup(session), &mut actions),
                Err(err) => debug!(group = %group, error = %err, "group drag refused"),
            },
            PointerTarget::ResizeHandle(node) => match start_resize(&mut self.graph, node) {
                Ok(session) => self.begin_tracking(InputState::Resizing(session), &mut actions),
                Err(err) => debug!(node = %node, error = %err, "resize refused"),
            },
            PointerTarget::Anchor(anchor) => {
                if self.graph.editable && !self.graph.locked {
                    match self.graph.begin_preview(anchor, &self.edge_defaults) {
                        Ok(()) => {
                            let source = anchor.clone();
                            self.begin_tracking(InputState::Connecting { source }, &mut actions);
                        }
                        Err(err) => debug!(anchor = %anchor, error = %err, "connect refused"),
                    }
                }
            }
        }
        self.push_selection_change(&before, &mut actions);
        actions
    }

    pub fn on_pointer_move(&mut self, screen_pt: Point, _modifiers: Modifiers) -> Vec<Action> {
        self.graph.set_cursor_screen(screen_pt);
        match &mut self.input {
            InputState::Panning { last_screen } => {
                let delta = screen_pt - *last_screen;
                *last_screen = screen_pt;
                pan(&mut self.graph, delta);
                vec![Action::CameraChanged(self.graph.camera()), Action::RenderNeeded]
            }
            _ => Vec::new(),
        }
    }

    /// End the current gesture. `target` is what lies under the pointer on release.
    pub fn on_pointer_up(&mut self, screen_pt: Point, target: &PointerTarget, _button: Button) -> Vec<Action> {
        self.graph.set_cursor_screen(screen_pt);
        let mut actions = self.apply_gesture();
        match std::mem::take(&mut self.input) {
            InputState::DraggingNodes(session) => end_drag(&mut self.graph, &session),
            InputState::DraggingGroup(session) => end_group_drag(&mut self.graph, &session),
            InputState::Resizing(session) => end_resize(&mut self.graph, &session),
            InputState::Connecting { source } => {
                self.graph.end_preview();
                if let PointerTarget::Anchor(target) = target {
                    self.finish_connection(&source, target, &mut actions);
                }
                actions.push(Action::RenderNeeded);
            }
            InputState::Idle | InputState::Panning { .. } | InputState::Pinching { .. } => {}
        }
        actions
    }

    // --- Wheel / touch ---

    /// Zoom about the pointer by the wheel's vertical delta.
    pub fn on_wheel(&mut self, screen_pt: Point, delta: WheelDelta, _modifiers: Modifiers) -> Vec<Action> {
        let scale = zoom_delta(self.graph.camera().scale, delta.dy);
        let camera = zoom_at_pointer(&mut self.graph, scale, screen_pt);
        vec![Action::CameraChanged(camera), Action::RenderNeeded]
    }

    /// Track active touches; two touches start a pinch.
    pub fn on_touch_start(&mut self, touches: &[Point]) -> Vec<Action> {
        let [a, b] = touches else {
            return Vec::new();
        };
        let mut actions = Vec::new();
        let state = InputState::Pinching { last_distance: (*b - *a).length(), pending: None };
        self.begin_tracking(state, &mut actions);
        actions
    }

    /// Record the touch pair; the next frame scales by the distance ratio.
    pub fn on_touch_move(&mut self, touches: &[Point]) -> Vec<Action> {
        if let (InputState::Pinching { pending, .. }, [a, b]) = (&mut self.input, touches) {
            *pending = Some((*a, *b));
        }
        Vec::new()
    }

    /// Lifting a finger applies any pending pinch step and ends the pinch.
    pub fn on_touch_end(&mut self, touches: &[Point]) -> Vec<Action> {
        if touches.len() >= 2 || !matches!(self.input, InputState::Pinching { .. }) {
            return Vec::new();
        }
        let mut actions = self.apply_gesture();
        self.input = InputState::Idle;
        actions.push(Action::RenderNeeded);
        actions
    }

    // --- Keyboard ---

    pub fn on_key_down(&mut self, key: &Key, modifiers: Modifiers) -> Vec<Action> {
        let step = if modifiers.shift { NUDGE_STEP * 5.0 } else { NUDGE_STEP };
        match key.0.as_str() {
            "ArrowLeft" => self.nudge(Point::new(-step, 0.0)),
            "ArrowRight" => self.nudge(Point::new(step, 0.0)),
            "ArrowUp" => self.nudge(Point::new(0.0, -step)),
            "ArrowDown" => self.nudge(Point::new(0.0, step)),
            "Delete" | "Backspace" => self.delete_selection(),
            "=" | "+" => self.zoom_in(),
            "-" | "_" => self.zoom_out(),
            "Escape" => self.cancel(),
            _ => Vec::new(),
        }
    }

    // --- Frame loop ---

    /// Apply the tracked gesture for the current cursor and refresh bounds.
    ///
    /// Returns nothing once tracking has stopped.
    pub fn on_frame(&mut self) -> Vec<Action> {
        if !self.is_tracking() {
            return Vec::new();
        }
        let mut actions = self.apply_gesture();
        self.graph.refresh_bounds();
        actions.push(Action::RenderNeeded);
        actions.push(Action::FrameRequested);
        actions
    }

    // --- Camera controls ---

    pub fn zoom_in(&mut self) -> Vec<Action> {
        self.zoom_step(ZoomDirection::In)
    }

    pub fn zoom_out(&mut self) -> Vec<Action> {
        self.zoom_step(ZoomDirection::Out)
    }

    fn zoom_step(&mut self, direction: ZoomDirection) -> Vec<Action> {
        let viewport = self.graph.viewport();
        let camera = zoom_and_translate(direction, &viewport, self.graph.camera(), ZOOM_INCREMENT);
        self.graph.set_camera(camera);
        vec![Action::CameraChanged(self.graph.camera()), Action::RenderNeeded]
    }

    // --- Internals ---

    fn begin_tracking(&mut self, state: InputState, actions: &mut Vec<Action>) {
        self.input = state;
        actions.push(Action::RenderNeeded);
        actions.push(Action::FrameRequested);
    }

    fn apply_gesture(&mut self) -> Vec<Action> {
        match &mut self.input {
            InputState::DraggingNodes(session) => {
                let snap_to = self.graph.snap_to;
                let moved = move_nodes(&mut self.graph, session, snap_to);
                if moved.is_empty() { Vec::new() } else { vec![Action::NodesMoved(moved)] }
            }
            InputState::DraggingGroup(session) => {
                let moved = move_group_box(&mut self.graph, session);
                if moved.is_empty() { Vec::new() } else { vec![Action::NodesMoved(moved)] }
            }
            InputState::Resizing(session) => resize_from_cursor(&mut self.graph, session)
                .map(|dimensions| vec![Action::NodeResized { node: session.node.clone(), dimensions }])
                .unwrap_or_default(),
            InputState::Pinching { last_distance, pending } => {
                let Some((a, b)) = pending.take() else {
                    return Vec::new();
                };
                let distance = (b - a).length();
                if *last_distance <= 0.0 || !distance.is_finite() || distance <= 0.0 {
                    return Vec::new();
                }
                let ratio = distance / *last_distance;
                *last_distance = distance;
                let scale = self.graph.camera().scale * ratio;
                let camera = zoom_at_pointer(&mut self.graph, scale, a.midpoint(b));
                vec![Action::CameraChanged(camera)]
            }
            InputState::Idle | InputState::Panning { .. } | InputState::Connecting { .. } => Vec::new(),
        }
    }

    fn finish_connection(&mut self, source: &AnchorKey, target: &AnchorKey, actions: &mut Vec<Action>) {
        if source == target {
            return;
        }
        match self.graph.connect(source, target, &self.edge_defaults) {
            Ok(true) => actions.push(Action::EdgeConnected(EdgeKey::between(source, target))),
            Ok(false) => {}
            Err(err) => debug!(source = %source, target = %target, error = %err, "connect refused"),
        }
    }

    fn nudge(&mut self, delta: Point) -> Vec<Action> {
        let moved = nudge_selection(&mut self.graph, delta);
        if moved.is_empty() {
            return Vec::new();
        }
        vec![Action::NodesMoved(moved), Action::RenderNeeded]
    }

    fn delete_selection(&mut self) -> Vec<Action> {
        if self.graph.locked || !self.graph.editable {
            return Vec::new();
        }
        let mut actions = Vec::new();
        let mut deleted = Vec::new();
        for key in self.graph.selection().clone() {
            if self.graph.node(&key).is_some_and(|n| n.locked) {
                continue;
            }
            let edges = self.graph.edges().match_edges(Some(&key), None, None);
            actions.extend(edges.into_iter().map(Action::EdgeDisconnected));
            if self.graph.remove_node(&key).is_ok() {
                deleted.push(key);
            }
        }
        if deleted.is_empty() {
            return Vec::new();
        }
        actions.push(Action::NodesDeleted(deleted));
        actions.push(Action::SelectionChanged(self.graph.selection().iter().cloned().collect()));
        actions.push(Action::RenderNeeded);
        actions
    }

    /// Abandon the current gesture, restoring dragged nodes to their origins.
    fn cancel(&mut self) -> Vec<Action> {
        let mut actions = Vec::new();
        match std::mem::take(&mut self.input) {
            InputState::DraggingNodes(session) => {
                for (key, origin) in &session.origins {
                    self.graph.nodes.set_position(key, *origin);
                }
                end_drag(&mut self.graph, &session);
                actions.push(Action::NodesMoved(session.origins.into_keys().collect()));
            }
            InputState::DraggingGroup(session) => {
                self.graph.group_boxes.update(&session.group, |g| g.position = session.origin);
                for (key, origin) in &session.members {
                    self.graph.nodes.set_position(key, *origin);
                }
                end_group_drag(&mut self.graph, &session);
                actions.push(Action::NodesMoved(session.members.into_keys().collect()));
            }
            InputState::Resizing(session) => {
                resize_node(&mut self.graph, &session.node, session.origin_dimensions);
                end_resize(&mut self.graph, &session);
            }
            InputState::Connecting { .. } => {
                self.graph.end_preview();
            }
            InputState::Pinching { .. } => {}
            InputState::Idle | InputState::Panning { .. } => return Vec::new(),
        }
        actions.push(Action::RenderNeeded);
        actions
    }

    fn push_selection_change(&self, before: &BTreeSet<NodeKey>, actions: &mut Vec<Action>) {
        if self.graph.selection() != before {
            actions.push(Action::SelectionChanged(self.graph.selection().iter().cloned().collect()));
        }
    }
}
