//! Input model: modifier keys, buttons, pointer targets, and the gesture state machine.
//!
//! The engine binds no devices. Hosts resolve what lies under the pointer
//! themselves and pass it in as a [`PointerTarget`] together with the
//! screen-space position. `InputState` is the gesture being tracked between
//! pointer-down and pointer-up, carrying the session each mutator needs.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use crate::anchor::AnchorKey;
use crate::geometry::Point;
use crate::group::GroupKey;
use crate::movement::{DragSession, GroupDragSession, ResizeSession};
use crate::node::NodeKey;

/// Keyboard/mouse modifier keys held during an event.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    /// Whether a selection click should toggle instead of replace.
    #[must_use]
    pub fn is_additive(self) -> bool {
        self.shift || self.ctrl || self.meta
    }
}

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    /// Left mouse button (or single-finger tap).
    Primary,
    /// Middle mouse button (scroll wheel click).
    Middle,
    /// Right mouse button (or two-finger tap).
    Secondary,
}

/// A keyboard key, named as the host reports it (e.g. `"Delete"`, `"ArrowLeft"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key(pub String);

/// Wheel / trackpad scroll delta.
#[derive(Debug, Clone, Copy)]
pub struct WheelDelta {
    /// Horizontal scroll amount in pixels.
    pub dx: f64,
    /// Vertical scroll amount in pixels (positive = down).
    pub dy: f64,
}

/// What the host found under the pointer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PointerTarget {
    Background,
    Node(NodeKey),
    Anchor(AnchorKey),
    GroupBox(GroupKey),
    /// The resize handle of a node.
    ResizeHandle(NodeKey),
}

/// Internal state for the input state machine.
#[derive(Debug, Clone, Default)]
pub enum InputState {
    /// No gesture in progress; waiting for the next pointer-down.
    #[default]
    Idle,
    /// Dragging the empty canvas moves the camera.
    Panning {
        /// Screen-space position of the previous pointer event.
        last_screen: Point,
    },
    /// Moving the selected nodes.
    DraggingNodes(DragSession),
    /// Moving a group box and its members.
    DraggingGroup(GroupDragSession),
    /// Resizing a node from its handle.
    Resizing(ResizeSession),
    /// Drawing a new connection from `source`; the preview edge follows the cursor.
    Connecting { source: AnchorKey },
    /// Two-finger pinch zoom.
    Pinching {
        /// Screen distance between the touches when the camera last changed.
        last_distance: f64,
        /// Latest touch pair, applied on the next frame.
        pending: Option<(Point, Point)>,
    },
}

impl InputState {
    /// Whether this gesture needs per-frame updates.
    #[must_use]
    pub fn is_tracking(&self) -> bool {
        !matches!(self, Self::Idle | Self::Panning { .. })
    }
}
