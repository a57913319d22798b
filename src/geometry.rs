//! Plain geometric value types shared by every layer of the canvas.

#[cfg(test)]
#[path = "geometry_test.rs"]
mod geometry_test;

use std::ops::{Add, AddAssign, Mul, Neg, Sub};

use serde::{Deserialize, Serialize};

use crate::consts::LENGTH_EPSILON;

/// A point or vector in either screen or graph space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Dot product, treating both points as vectors.
    #[must_use]
    pub fn dot(self, other: Self) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// Euclidean length of the vector.
    #[must_use]
    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Whether both components are within [`LENGTH_EPSILON`] of zero.
    #[must_use]
    pub fn is_zero(self) -> bool {
        self.x.abs() <= LENGTH_EPSILON && self.y.abs() <= LENGTH_EPSILON
    }

    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Midpoint between `self` and `other`.
    #[must_use]
    pub fn midpoint(self, other: Self) -> Self {
        Self::new((self.x + other.x) * 0.5, (self.y + other.y) * 0.5)
    }
}

impl Add for Point {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Point {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Point {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Point {
    type Output = Self;
    fn mul(self, rhs: f64) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

impl Neg for Point {
    type Output = Self;
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

/// Width and height of a node, anchor, group box, or viewport.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: f64,
    pub height: f64,
}

impl Dimensions {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Half of each dimension as a vector.
    #[must_use]
    pub fn half(self) -> Point {
        Point::new(self.width * 0.5, self.height * 0.5)
    }

    /// True when either side is zero, negative, or not finite.
    #[must_use]
    pub fn is_degenerate(self) -> bool {
        !(self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0)
    }
}

/// Axis-aligned rectangle given by its top-left corner and size.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    #[must_use]
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    #[must_use]
    pub fn from_parts(origin: Point, dims: Dimensions) -> Self {
        Self::new(origin.x, origin.y, dims.width, dims.height)
    }

    /// Smallest rectangle containing both corners.
    #[must_use]
    pub fn from_corners(a: Point, b: Point) -> Self {
        let left = a.x.min(b.x);
        let top = a.y.min(b.y);
        Self::new(left, top, (a.x - b.x).abs(), (a.y - b.y).abs())
    }

    #[must_use]
    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    #[must_use]
    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.width, self.height)
    }

    #[must_use]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width * 0.5, self.y + self.height * 0.5)
    }

    /// Smallest rectangle covering both `self` and `other`.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        let left = self.x.min(other.x);
        let top = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Self::new(left, top, right - left, bottom - top)
    }

    /// Whether `other` lies entirely inside `self` (edges inclusive).
    #[must_use]
    pub fn contains_rect(&self, other: &Self) -> bool {
        other.x >= self.x && other.y >= self.y && other.right() <= self.right() && other.bottom() <= self.bottom()
    }

    #[must_use]
    pub fn contains_point(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }

    /// Whether the two rectangles overlap (touching edges count).
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        self.x <= other.right() && other.x <= self.right() && self.y <= other.bottom() && other.y <= self.bottom()
    }
}

/// One of the four axis directions a routed edge can leave or enter by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cardinal {
    North,
    South,
    East,
    West,
}

impl Cardinal {
    /// Unit vector in graph space (y grows downward).
    #[must_use]
    pub fn vector(self) -> Point {
        match self {
            Self::North => Point::new(0.0, -1.0),
            Self::South => Point::new(0.0, 1.0),
            Self::East => Point::new(1.0, 0.0),
            Self::West => Point::new(-1.0, 0.0),
        }
    }

    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            Self::North => Self::South,
            Self::South => Self::North,
            Self::East => Self::West,
            Self::West => Self::East,
        }
    }

    #[must_use]
    pub fn is_horizontal(self) -> bool {
        matches!(self, Self::East | Self::West)
    }

    /// Whether the two directions lie on perpendicular axes.
    #[must_use]
    pub fn is_orthogonal_to(self, other: Self) -> bool {
        self.is_horizontal() != other.is_horizontal()
    }

    /// The cardinal direction closest to the vector `v`. Ties favor the horizontal axis.
    #[must_use]
    pub fn toward(v: Point) -> Self {
        if v.x.abs() >= v.y.abs() {
            if v.x >= 0.0 { Self::East } else { Self::West }
        } else if v.y >= 0.0 {
            Self::South
        } else {
            Self::North
        }
    }
}

/// Direction an anchor faces. `SelfFacing` anchors pick a cardinal at route time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    North,
    South,
    #[default]
    East,
    West,
    #[serde(rename = "self")]
    SelfFacing,
}

impl Direction {
    /// Resolve to a routable cardinal. Fixed directions map one to one;
    /// `SelfFacing` points toward `other` as seen from `from`.
    #[must_use]
    pub fn resolve(self, from: Point, other: Point) -> Cardinal {
        match self {
            Self::North => Cardinal::North,
            Self::South => Cardinal::South,
            Self::East => Cardinal::East,
            Self::West => Cardinal::West,
            Self::SelfFacing => Cardinal::toward(other - from),
        }
    }
}

impl From<Cardinal> for Direction {
    fn from(c: Cardinal) -> Self {
        match c {
            Cardinal::North => Self::North,
            Cardinal::South => Self::South,
            Cardinal::East => Self::East,
            Cardinal::West => Self::West,
        }
    }
}

/// Flow direction of the diagram layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LayoutDirection {
    /// Left to right: inputs on the west side, outputs on the east.
    #[default]
    #[serde(rename = "LR")]
    LeftRight,
    /// Top to bottom: inputs on the north side, outputs on the south.
    #[serde(rename = "TB")]
    TopBottom,
}

impl LayoutDirection {
    /// Side on which input anchors are placed by default.
    #[must_use]
    pub fn input_side(self) -> Cardinal {
        match self {
            Self::LeftRight => Cardinal::West,
            Self::TopBottom => Cardinal::North,
        }
    }

    /// Side on which output anchors are placed by default.
    #[must_use]
    pub fn output_side(self) -> Cardinal {
        self.input_side().opposite()
    }
}
