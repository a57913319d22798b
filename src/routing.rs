//! Orthogonal edge routing.
//!
//! Each endpoint carries a position and the cardinal direction the edge leaves
//! (source) or enters from (target). An endpoint "reaches" the other when the
//! other point is less than `buffer` ahead of it along its direction, so its
//! stand-off stub would overshoot. The pair is classified, first match wins:
//!
//! 1. **Same direction**: step out past the farther point, traverse, come back.
//! 2. **Crossing**: perpendicular directions whose rays meet; one corner.
//! 3. **Facing**: opposite directions with clearance; out half, jog, in half.
//! 4. **Both reaching**: dog-leg between the two buffered stub ends.
//! 5. **One reaching**: stub out of the reaching end, then approach the other.
//!
//! Output is a list of relative step vectors; [`accumulate`] turns them into
//! an absolute polyline. Steps always sum to `target - source`.

#[cfg(test)]
#[path = "routing_test.rs"]
mod routing_test;

use crate::geometry::{Cardinal, Point};

/// A route endpoint: where the edge attaches and which way it points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectedPoint {
    pub position: Point,
    pub direction: Cardinal,
}

impl DirectedPoint {
    #[must_use]
    pub fn new(position: Point, direction: Cardinal) -> Self {
        Self { position, direction }
    }
}

/// Which routing case a source/target pair falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteCase {
    SameDirection,
    Crossing,
    Facing,
    BothReaching,
    SourceReaching,
    TargetReaching,
}

/// Classify a pair of endpoints.
#[must_use]
pub fn classify(source: DirectedPoint, target: DirectedPoint, buffer: f64) -> RouteCase {
    let buffer = sanitize_buffer(buffer);
    let delta = target.position - source.position;
    if source.direction == target.direction {
        return RouteCase::SameDirection;
    }
    let source_reaches = reach(delta, source.direction) < buffer;
    let target_reaches = reach(-delta, target.direction) < buffer;
    let orthogonal = source.direction.is_orthogonal_to(target.direction);

    match (source_reaches, target_reaches) {
        (false, false) if orthogonal => RouteCase::Crossing,
        (false, false) => RouteCase::Facing,
        (true, true) => RouteCase::BothReaching,
        (true, false) => RouteCase::SourceReaching,
        (false, true) => RouteCase::TargetReaching,
    }
}

/// Route an orthogonal path from `source` to `target`, returning relative steps.
///
/// A zero delta yields no steps.
#[must_use]
pub fn route_orthogonal_path(source: DirectedPoint, target: DirectedPoint, buffer: f64) -> Vec<Point> {
    let buffer = sanitize_buffer(buffer);
    let delta = target.position - source.position;
    if delta.is_zero() || !delta.is_finite() {
        return Vec::new();
    }

    match classify(source, target, buffer) {
        RouteCase::SameDirection => same_direction(delta, source.direction, buffer),
        RouteCase::Crossing => crossing(delta, source.direction),
        RouteCase::Facing => facing(delta, source.direction),
        RouteCase::BothReaching => both_reaching(delta, source.direction, target.direction, buffer),
        RouteCase::SourceReaching => one_reaching(delta, source.direction, target.direction, buffer),
        RouteCase::TargetReaching => {
            // Route from the target's side and walk it backwards.
            let mut steps = one_reaching(-delta, target.direction, source.direction, buffer);
            steps.reverse();
            steps.into_iter().map(|s| -s).collect()
        }
    }
}

/// Route and accumulate into an absolute polyline starting at `source.position`.
#[must_use]
pub fn route_polyline(source: DirectedPoint, target: DirectedPoint, buffer: f64) -> Vec<Point> {
    accumulate(source.position, &route_orthogonal_path(source, target, buffer))
}

/// Turn relative steps into absolute points, `start` included.
#[must_use]
pub fn accumulate(start: Point, steps: &[Point]) -> Vec<Point> {
    let mut points = Vec::with_capacity(steps.len() + 1);
    let mut cursor = start;
    points.push(cursor);
    for step in steps {
        cursor += *step;
        points.push(cursor);
    }
    points
}

// =============================================================================
// CASES
// =============================================================================

fn same_direction(delta: Point, dir: Cardinal, buffer: f64) -> Vec<Point> {
    let d = dir.vector();
    let ahead = delta.dot(d);
    let out = ahead.max(0.0) + buffer;
    let back = out - ahead;
    let lateral = delta - d * ahead;
    non_zero(vec![d * out, lateral, -d * back])
}

fn crossing(delta: Point, source_dir: Cardinal) -> Vec<Point> {
    let (along, across) = split(delta, source_dir);
    non_zero(vec![along, across])
}

fn facing(delta: Point, source_dir: Cardinal) -> Vec<Point> {
    let (along, across) = split(delta, source_dir);
    let half = along * 0.5;
    // Always three steps so renderers see a stable bend count; the jog is
    // zero when the endpoints are aligned.
    vec![half, across, half]
}

fn both_reaching(delta: Point, source_dir: Cardinal, target_dir: Cardinal, buffer: f64) -> Vec<Point> {
    let ds = source_dir.vector();
    let dt = target_dir.vector();
    let stub_out = ds * buffer;
    let stub_in = -dt * buffer;
    let gap = delta + dt * buffer - stub_out;

    if source_dir.is_orthogonal_to(target_dir) {
        let (on_target_axis, on_source_axis) = split(gap, target_dir);
        return non_zero(vec![stub_out, on_target_axis, on_source_axis, stub_in]);
    }

    let (axis, across) = split(gap, source_dir);
    if across.is_zero() {
        let jog = perpendicular(source_dir).vector() * buffer;
        return non_zero(vec![stub_out, jog, axis, -jog, stub_in]);
    }
    let half = across * 0.5;
    non_zero(vec![stub_out, half, axis, half, stub_in])
}

/// Source stub overshoots; the target approaches cleanly along its own axis.
fn one_reaching(delta: Point, reaching_dir: Cardinal, other_dir: Cardinal, buffer: f64) -> Vec<Point> {
    let ds = reaching_dir.vector();
    let dt = other_dir.vector();
    let stub_out = ds * buffer;
    let stub_in = -dt * buffer;
    let between = delta + dt * buffer - stub_out;
    let (on_other_axis, across) = split(between, other_dir);

    if reaching_dir.is_orthogonal_to(other_dir) {
        non_zero(vec![stub_out, on_other_axis, across, stub_in])
    } else {
        non_zero(vec![stub_out, across, on_other_axis, stub_in])
    }
}

// =============================================================================
// HELPERS
// =============================================================================

/// Signed distance `v` travels along `dir`.
fn reach(v: Point, dir: Cardinal) -> f64 {
    v.dot(dir.vector())
}

/// Split `v` into its component along `dir`'s axis and the perpendicular rest.
fn split(v: Point, dir: Cardinal) -> (Point, Point) {
    let d = dir.vector();
    let along = d * v.dot(d);
    (along, v - along)
}

fn perpendicular(dir: Cardinal) -> Cardinal {
    if dir.is_horizontal() { Cardinal::South } else { Cardinal::East }
}

fn non_zero(steps: Vec<Point>) -> Vec<Point> {
    steps.into_iter().filter(|s| !s.is_zero()).collect()
}

fn sanitize_buffer(buffer: f64) -> f64 {
    if buffer.is_finite() { buffer.max(0.0) } else { 0.0 }
}
