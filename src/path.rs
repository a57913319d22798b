//! Style-specific edge path builders.
//!
//! Every builder takes the resolved source and target endpoints and returns a
//! [`PathDescription`]: a renderer-neutral command list plus the point where
//! an edge label should sit. [`PathDescription::to_svg`] serializes the
//! commands as an SVG `d` attribute for hosts that draw with SVG.

#[cfg(test)]
#[path = "path_test.rs"]
mod path_test;

use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_CORNER_RADIUS, DEFAULT_ROUTE_BUFFER, LENGTH_EPSILON};
use crate::geometry::Point;
use crate::routing::{DirectedPoint, route_polyline};

/// Bezier control arm as a fraction of the endpoint distance.
const CURVATURE: f64 = 0.25;

/// Shortest bezier control arm, so near endpoints still curve outward.
const MIN_CONTROL_ARM: f64 = 25.0;

/// How an edge is drawn between its anchors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeStyle {
    Straight,
    #[default]
    Bezier,
    /// Orthogonal route with sharp corners.
    Step,
    /// Orthogonal route with rounded corners.
    Subway,
    HorizontalFirst,
    VerticalFirst,
    /// Short stubs out of each anchor joined by one diagonal.
    Diagonal,
    /// Octilinear path: axis runs joined by a single 45° segment.
    FortyFive,
}

/// Tunables shared by the builders.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathOptions {
    /// Stand-off distance for orthogonal routing and diagonal stubs.
    pub buffer: f64,
    /// Corner radius for [`EdgeStyle::Subway`].
    pub radius: f64,
}

impl Default for PathOptions {
    fn default() -> Self {
        Self { buffer: DEFAULT_ROUTE_BUFFER, radius: DEFAULT_CORNER_RADIUS }
    }
}

/// A single drawing command in graph space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCommand {
    MoveTo(Point),
    LineTo(Point),
    QuadTo { control: Point, to: Point },
    CubicTo { c1: Point, c2: Point, to: Point },
}

/// A drawable path plus label placement.
#[derive(Debug, Clone, PartialEq)]
pub struct PathDescription {
    pub commands: Vec<PathCommand>,
    pub label_point: Point,
}

impl PathDescription {
    /// Serialize as an SVG path `d` string.
    #[must_use]
    pub fn to_svg(&self) -> String {
        self.commands
            .iter()
            .map(|cmd| match cmd {
                PathCommand::MoveTo(p) => format!("M {} {}", p.x, p.y),
                PathCommand::LineTo(p) => format!("L {} {}", p.x, p.y),
                PathCommand::QuadTo { control, to } => format!("Q {} {} {} {}", control.x, control.y, to.x, to.y),
                PathCommand::CubicTo { c1, c2, to } => {
                    format!("C {} {} {} {} {} {}", c1.x, c1.y, c2.x, c2.y, to.x, to.y)
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Final point the path reaches, if any.
    #[must_use]
    pub fn end(&self) -> Option<Point> {
        self.commands.last().map(|cmd| match *cmd {
            PathCommand::MoveTo(p) | PathCommand::LineTo(p) => p,
            PathCommand::QuadTo { to, .. } | PathCommand::CubicTo { to, .. } => to,
        })
    }
}

/// Build the path for `style` between two endpoints.
#[must_use]
pub fn build_path(style: EdgeStyle, source: DirectedPoint, target: DirectedPoint, options: PathOptions) -> PathDescription {
    match style {
        EdgeStyle::Straight => straight(source.position, target.position),
        EdgeStyle::Bezier => bezier(source, target),
        EdgeStyle::Step => polyline_path(&route_polyline(source, target, options.buffer)),
        EdgeStyle::Subway => rounded(&route_polyline(source, target, options.buffer), options.radius),
        EdgeStyle::HorizontalFirst => {
            let (s, t) = (source.position, target.position);
            polyline_path(&dedup(vec![s, Point::new(t.x, s.y), t]))
        }
        EdgeStyle::VerticalFirst => {
            let (s, t) = (source.position, target.position);
            polyline_path(&dedup(vec![s, Point::new(s.x, t.y), t]))
        }
        EdgeStyle::Diagonal => diagonal(source, target, options.buffer),
        EdgeStyle::FortyFive => forty_five(source.position, target.position),
    }
}

fn straight(s: Point, t: Point) -> PathDescription {
    PathDescription { commands: vec![PathCommand::MoveTo(s), PathCommand::LineTo(t)], label_point: s.midpoint(t) }
}

fn bezier(source: DirectedPoint, target: DirectedPoint) -> PathDescription {
    let (s, t) = (source.position, target.position);
    let arm = ((t - s).length() * CURVATURE).max(MIN_CONTROL_ARM);
    let c1 = s + source.direction.vector() * arm;
    let c2 = t + target.direction.vector() * arm;
    // Cubic at t = 0.5.
    let label_point = (s + c1 * 3.0 + c2 * 3.0 + t) * 0.125;
    PathDescription { commands: vec![PathCommand::MoveTo(s), PathCommand::CubicTo { c1, c2, to: t }], label_point }
}

fn diagonal(source: DirectedPoint, target: DirectedPoint, buffer: f64) -> PathDescription {
    let buffer = if buffer.is_finite() { buffer.max(0.0) } else { 0.0 };
    let s = source.position;
    let t = target.position;
    let out = s + source.direction.vector() * buffer;
    let inn = t + target.direction.vector() * buffer;
    polyline_path(&dedup(vec![s, out, inn, t]))
}

fn forty_five(s: Point, t: Point) -> PathDescription {
    let d = t - s;
    let (major, minor) = if d.x.abs() >= d.y.abs() { (d.x.abs(), d.y.abs()) } else { (d.y.abs(), d.x.abs()) };
    let run = (major - minor) * 0.5;
    let sign = |v: f64| if v < 0.0 { -1.0 } else { 1.0 };
    let run_vec = if d.x.abs() >= d.y.abs() {
        Point::new(sign(d.x) * run, 0.0)
    } else {
        Point::new(0.0, sign(d.y) * run)
    };
    let a = s + run_vec;
    let b = t - run_vec;
    polyline_path(&dedup(vec![s, a, b, t]))
}

/// Polyline through `points` with rounded interior corners.
fn rounded(points: &[Point], radius: f64) -> PathDescription {
    let Some((&first, rest)) = points.split_first() else {
        return PathDescription { commands: Vec::new(), label_point: Point::ZERO };
    };
    let radius = if radius.is_finite() { radius.max(0.0) } else { 0.0 };
    let mut commands = vec![PathCommand::MoveTo(first)];
    let mut prev = first;
    for (i, &corner) in rest.iter().enumerate() {
        let Some(&next) = rest.get(i + 1) else {
            commands.push(PathCommand::LineTo(corner));
            break;
        };
        let len_in = (corner - prev).length();
        let len_out = (next - corner).length();
        let r = radius.min(len_in * 0.5).min(len_out * 0.5);
        if r <= LENGTH_EPSILON {
            commands.push(PathCommand::LineTo(corner));
        } else {
            let before = corner - (corner - prev) * (r / len_in);
            let after = corner + (next - corner) * (r / len_out);
            commands.push(PathCommand::LineTo(before));
            commands.push(PathCommand::QuadTo { control: corner, to: after });
        }
        prev = corner;
    }
    PathDescription { commands, label_point: polyline_midpoint(points) }
}

fn polyline_path(points: &[Point]) -> PathDescription {
    let mut commands = Vec::with_capacity(points.len());
    for (i, &p) in points.iter().enumerate() {
        commands.push(if i == 0 { PathCommand::MoveTo(p) } else { PathCommand::LineTo(p) });
    }
    PathDescription { commands, label_point: polyline_midpoint(points) }
}

/// Point halfway along the polyline by arc length.
#[must_use]
pub fn polyline_midpoint(points: &[Point]) -> Point {
    let total: f64 = points.windows(2).map(|w| (w[1] - w[0]).length()).sum();
    let Some(&first) = points.first() else {
        return Point::ZERO;
    };
    if total <= LENGTH_EPSILON {
        return first;
    }
    let mut remaining = total * 0.5;
    for w in points.windows(2) {
        let len = (w[1] - w[0]).length();
        if len >= remaining && len > LENGTH_EPSILON {
            return w[0] + (w[1] - w[0]) * (remaining / len);
        }
        remaining -= len;
    }
    points.last().copied().unwrap_or(first)
}

fn dedup(mut points: Vec<Point>) -> Vec<Point> {
    points.dedup_by(|b, a| (*b - *a).is_zero());
    points
}
