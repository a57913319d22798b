//! Shared numeric constants for the graph canvas.

// ── Zoom ────────────────────────────────────────────────────────

/// Smallest scale the camera may reach.
pub const MIN_SCALE: f64 = 0.1;

/// Largest scale the camera may reach.
pub const MAX_SCALE: f64 = 2.0;

/// Scale change per pixel of wheel delta.
pub const ZOOM_SENSITIVITY: f64 = 0.009;

/// Upper bound on the relative scale change of a single wheel event.
pub const MAX_ZOOM_STEP: f64 = 0.08;

/// Relative scale change applied by the zoom-in / zoom-out controls.
pub const ZOOM_INCREMENT: f64 = 0.1;

/// Scales at or below this are treated as degenerate.
pub const SCALE_EPSILON: f64 = 1e-6;

// ── Nodes ───────────────────────────────────────────────────────

/// Width given to a node whose config omits dimensions.
pub const DEFAULT_NODE_WIDTH: f64 = 200.0;

/// Height given to a node whose config omits dimensions.
pub const DEFAULT_NODE_HEIGHT: f64 = 100.0;

/// Resizing never shrinks a node below this width.
pub const MIN_NODE_WIDTH: f64 = 50.0;

/// Resizing never shrinks a node below this height.
pub const MIN_NODE_HEIGHT: f64 = 25.0;

/// Side length of an anchor whose config omits dimensions.
pub const DEFAULT_ANCHOR_SIZE: f64 = 12.0;

// ── Groups ──────────────────────────────────────────────────────

/// Inner margin kept between a group box edge and its member nodes.
pub const GROUP_MARGIN: f64 = 10.0;

// ── Routing ─────────────────────────────────────────────────────

/// Default stand-off distance before an orthogonal edge turns.
pub const DEFAULT_ROUTE_BUFFER: f64 = 30.0;

/// Default corner radius for rounded step paths.
pub const DEFAULT_CORNER_RADIUS: f64 = 8.0;

/// Tolerance below which a step or delta counts as zero length.
pub const LENGTH_EPSILON: f64 = 1e-9;

// ── Edge labels ─────────────────────────────────────────────────

/// Label width used when an edge label omits it.
pub const DEFAULT_LABEL_WIDTH: f64 = 80.0;

/// Label height used when an edge label omits it.
pub const DEFAULT_LABEL_HEIGHT: f64 = 24.0;

/// Label fraction along the path used when an edge label omits it.
pub const DEFAULT_LABEL_POSITION: f64 = 0.5;

// ── Keyboard ────────────────────────────────────────────────────

/// Distance in graph units an arrow key nudges the selection.
pub const NUDGE_STEP: f64 = 10.0;
