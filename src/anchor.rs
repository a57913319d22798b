//! Connection anchors.
//!
//! An anchor belongs to exactly one node and stores only a fixed offset from
//! that node's top-left corner. Its absolute position is derived on read as
//! `node.position + offset`, so moving a node never leaves an anchor behind.
//! The owning node is referenced by key, never by pointer.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::consts::DEFAULT_ANCHOR_SIZE;
use crate::geometry::{Cardinal, Dimensions, Direction, Point, Rect};
use crate::node::{Node, NodeKey};

/// Anchor key: the anchor's own id scoped by its owning node.
///
/// Displays as `A-{id}/{node}`, which is globally unique within a graph.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AnchorKey {
    pub node: NodeKey,
    pub id: String,
}

impl AnchorKey {
    #[must_use]
    pub fn new(node: &NodeKey, id: &str) -> Self {
        let id = id.strip_prefix("A-").unwrap_or(id);
        Self { node: node.clone(), id: id.to_owned() }
    }
}

impl fmt::Display for AnchorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "A-{}/{}", self.id, self.node)
    }
}

/// Whether edges flow into or out of the anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnchorKind {
    Input,
    #[default]
    Output,
}

/// Host-supplied anchor description.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnchorConfig {
    pub id: String,
    pub kind: AnchorKind,
    /// Facing direction; defaults to the graph layout's side for `kind`.
    pub direction: Option<Direction>,
    /// Dynamic anchors re-pick their facing toward the connected anchor.
    pub dynamic: bool,
    /// Fraction along the side where the anchor sits.
    pub ratio: f64,
    pub dimensions: Option<Dimensions>,
    /// Upper bound on simultaneous connections; `None` is unlimited.
    pub max_connections: Option<usize>,
}

impl Default for AnchorConfig {
    fn default() -> Self {
        Self {
            id: String::new(),
            kind: AnchorKind::Output,
            direction: None,
            dynamic: false,
            ratio: 0.5,
            dimensions: None,
            max_connections: None,
        }
    }
}

/// A connection point on a node's boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct Anchor {
    pub key: AnchorKey,
    pub offset: Point,
    pub dimensions: Dimensions,
    pub direction: Direction,
    pub dynamic: bool,
    pub kind: AnchorKind,
    pub connected: BTreeSet<AnchorKey>,
    pub max_connections: Option<usize>,
}

impl Anchor {
    /// The owning node's key.
    #[must_use]
    pub fn node(&self) -> &NodeKey {
        &self.key.node
    }

    /// Absolute position of the anchor center for an owner at `node_position`.
    #[must_use]
    pub fn position(&self, node_position: Point) -> Point {
        node_position + self.offset
    }

    /// Fold measured layout drift into the offset, once.
    ///
    /// `measured_position` is the anchor's observed top-left corner. Later
    /// node moves keep deriving from the corrected offset.
    pub fn recalculate_position(&mut self, node_position: Point, measured_position: Point) {
        self.offset = measured_position - node_position + self.dimensions.half();
    }

    #[must_use]
    pub fn is_connected_to(&self, other: &AnchorKey) -> bool {
        self.connected.contains(other)
    }

    /// Whether one more connection would exceed `max_connections`.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.max_connections.is_some_and(|max| self.connected.len() >= max)
    }

    /// Cardinal to route with, given where the other endpoint is.
    #[must_use]
    pub fn route_direction(&self, own_position: Point, other_position: Point) -> Cardinal {
        if self.dynamic {
            Direction::SelfFacing.resolve(own_position, other_position)
        } else {
            self.direction.resolve(own_position, other_position)
        }
    }
}

/// Build an anchor on `node` whose element's top-left sits at `initial_position`.
///
/// `offset = initial_position - node.position + dimensions / 2`, making the
/// derived position the anchor's center.
#[must_use]
pub fn create_anchor(
    node: &Node,
    id: &str,
    initial_position: Point,
    dimensions: Dimensions,
    config: &AnchorConfig,
    direction: Direction,
) -> Anchor {
    Anchor {
        key: AnchorKey::new(&node.key, id),
        offset: initial_position - node.position + dimensions.half(),
        dimensions,
        direction,
        dynamic: config.dynamic,
        kind: config.kind,
        connected: BTreeSet::new(),
        max_connections: config.max_connections,
    }
}

/// Top-left corner for an anchor of `dims` centered on `side` of `rect`,
/// `ratio` of the way along it.
#[must_use]
pub fn boundary_position(rect: &Rect, side: Cardinal, ratio: f64, dims: Dimensions) -> Point {
    let ratio = if ratio.is_finite() { ratio.clamp(0.0, 1.0) } else { 0.5 };
    let center = match side {
        Cardinal::North => Point::new(rect.x + rect.width * ratio, rect.y),
        Cardinal::South => Point::new(rect.x + rect.width * ratio, rect.bottom()),
        Cardinal::East => Point::new(rect.right(), rect.y + rect.height * ratio),
        Cardinal::West => Point::new(rect.x, rect.y + rect.height * ratio),
    };
    center - dims.half()
}

/// Default anchor element size.
#[must_use]
pub fn default_anchor_dimensions() -> Dimensions {
    Dimensions::new(DEFAULT_ANCHOR_SIZE, DEFAULT_ANCHOR_SIZE)
}
