//! Pan/zoom camera and screen ↔ graph coordinate conversion.
//!
//! Screen space is the host's pixel space; the viewport rectangle locates the
//! canvas inside it. Graph space is the diagram's logical coordinate system.
//! The camera maps between the two:
//!
//! ```text
//! screen = viewport.origin + centering(scale) + translation + graph * scale
//! ```
//!
//! where `centering(scale)` is `viewport.size * (1 - scale) / 2` when the
//! camera scales about the viewport center and zero when it scales about the
//! top-left corner.
//!
//! Degenerate inputs (non-finite or non-positive scale, zero-area viewport)
//! never produce NaN or infinity: conversions fall back to unit scale and the
//! zoom solvers return the translation unchanged.

#[cfg(test)]
#[path = "camera_test.rs"]
mod camera_test;

use serde::{Deserialize, Serialize};

use crate::consts::{MAX_SCALE, MAX_ZOOM_STEP, MIN_SCALE, SCALE_EPSILON, ZOOM_SENSITIVITY};
use crate::geometry::{Point, Rect};

/// Fixed point of the scale transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScaleOrigin {
    /// Scale about the viewport center.
    #[default]
    Center,
    /// Scale about the viewport's top-left corner.
    TopLeft,
}

/// Camera state for pan/zoom on the canvas.
///
/// `translation` is in screen pixels; `scale` is a factor (1.0 = no zoom).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub scale: f64,
    pub translation: Point,
    #[serde(default)]
    pub origin: ScaleOrigin,
}

impl Default for Camera {
    fn default() -> Self {
        Self { scale: 1.0, translation: Point::ZERO, origin: ScaleOrigin::Center }
    }
}

/// Zoom direction requested by buttons or keyboard shortcuts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomDirection {
    In,
    Out,
}

impl Camera {
    #[must_use]
    pub fn new(scale: f64, translation: Point, origin: ScaleOrigin) -> Self {
        Self { scale, translation, origin }
    }

    /// Convert a screen-space point to graph coordinates.
    #[must_use]
    pub fn screen_to_graph(&self, screen: Point, viewport: &Rect) -> Point {
        screen_to_graph(screen, viewport, self.scale, self.translation, self.origin)
    }

    /// Convert a graph-space point to screen coordinates.
    #[must_use]
    pub fn graph_to_screen(&self, graph: Point, viewport: &Rect) -> Point {
        graph_to_screen(graph, viewport, self.scale, self.translation, self.origin)
    }

    /// Convert a screen-space distance to a graph-space distance.
    #[must_use]
    pub fn screen_dist_to_graph(&self, screen_dist: f64) -> f64 {
        screen_dist / effective_scale(self.scale)
    }

    /// The viewport rectangle expressed in graph coordinates.
    #[must_use]
    pub fn visible_graph_rect(&self, viewport: &Rect) -> Rect {
        let top_left = self.screen_to_graph(viewport.origin(), viewport);
        let bottom_right = self.screen_to_graph(Point::new(viewport.right(), viewport.bottom()), viewport);
        Rect::from_corners(top_left, bottom_right)
    }
}

/// Remove the viewport origin, centering offset, and translation from a screen
/// point, then divide by scale.
#[must_use]
pub fn screen_to_graph(point: Point, viewport: &Rect, scale: f64, translation: Point, origin: ScaleOrigin) -> Point {
    let scale = effective_scale(scale);
    let offset = centering_offset(viewport, scale, origin);
    Point::new(
        (point.x - viewport.x - offset.x - translation.x) / scale,
        (point.y - viewport.y - offset.y - translation.y) / scale,
    )
}

/// Inverse of [`screen_to_graph`].
#[must_use]
pub fn graph_to_screen(point: Point, viewport: &Rect, scale: f64, translation: Point, origin: ScaleOrigin) -> Point {
    let scale = effective_scale(scale);
    let offset = centering_offset(viewport, scale, origin);
    Point::new(
        point.x * scale + translation.x + offset.x + viewport.x,
        point.y * scale + translation.y + offset.y + viewport.y,
    )
}

/// Apply a wheel delta to `scale`. Negative deltas zoom in.
#[must_use]
pub fn zoom_delta(scale: f64, wheel_delta: f64) -> f64 {
    if !wheel_delta.is_finite() {
        return clamp_scale(scale);
    }
    let step = (wheel_delta.abs() * ZOOM_SENSITIVITY).min(MAX_ZOOM_STEP);
    let direction = if wheel_delta < 0.0 { ZoomDirection::In } else { ZoomDirection::Out };
    step_scale(scale, step, direction)
}

/// Scale `scale` by a relative `step` in `direction`, clamped to the zoom limits.
#[must_use]
pub fn step_scale(scale: f64, step: f64, direction: ZoomDirection) -> f64 {
    let scale = effective_scale(scale);
    let next = match direction {
        ZoomDirection::In => scale * (1.0 + step),
        ZoomDirection::Out => scale * (1.0 - step),
    };
    clamp_scale(next)
}

/// Clamp to `[MIN_SCALE, MAX_SCALE]`, mapping non-finite input to 1.0.
#[must_use]
pub fn clamp_scale(scale: f64) -> f64 {
    if scale.is_finite() { scale.clamp(MIN_SCALE, MAX_SCALE) } else { 1.0 }
}

/// Solve the translation that keeps the graph point under `pointer` visually
/// fixed when the scale changes from `old_scale` to `new_scale`.
///
/// Returns `translation` unchanged for degenerate scales or a zero-area viewport.
#[must_use]
pub fn zoom_about_point(
    old_scale: f64,
    new_scale: f64,
    translation: Point,
    pointer: Point,
    viewport: &Rect,
    origin: ScaleOrigin,
) -> Point {
    if !is_valid_scale(old_scale) || !is_valid_scale(new_scale) || viewport.dimensions().is_degenerate() {
        return translation;
    }
    if !pointer.is_finite() || !translation.is_finite() {
        return translation;
    }
    let anchored = screen_to_graph(pointer, viewport, old_scale, translation, origin);
    let offset = centering_offset(viewport, new_scale, origin);
    Point::new(
        pointer.x - viewport.x - offset.x - anchored.x * new_scale,
        pointer.y - viewport.y - offset.y - anchored.y * new_scale,
    )
}

fn is_valid_scale(scale: f64) -> bool {
    scale.is_finite() && scale > SCALE_EPSILON
}

fn effective_scale(scale: f64) -> f64 {
    if is_valid_scale(scale) { scale } else { 1.0 }
}

fn centering_offset(viewport: &Rect, scale: f64, origin: ScaleOrigin) -> Point {
    match origin {
        ScaleOrigin::TopLeft => Point::ZERO,
        ScaleOrigin::Center if viewport.dimensions().is_degenerate() => Point::ZERO,
        ScaleOrigin::Center => Point::new(viewport.width * (1.0 - scale) * 0.5, viewport.height * (1.0 - scale) * 0.5),
    }
}
