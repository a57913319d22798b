//! Group boxes: rectangular containers that constrain their member nodes.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::consts::GROUP_MARGIN;
use crate::geometry::{Dimensions, Point, Rect};
use crate::node::NodeKey;

/// Namespaced group box key, always of the form `GB-{id}`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GroupKey(String);

impl GroupKey {
    /// Normalize `id` into the `GB-` form; already-prefixed ids pass through.
    #[must_use]
    pub fn new(id: &str) -> Self {
        if id.starts_with("GB-") { Self(id.to_owned()) } else { Self(format!("GB-{id}")) }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Host-supplied group box description.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupBoxConfig {
    pub id: String,
    pub position: Point,
    pub dimensions: Dimensions,
    pub color: Option<String>,
    pub members: Vec<String>,
}

/// A group box on the canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupBox {
    pub key: GroupKey,
    pub position: Point,
    pub dimensions: Dimensions,
    pub members: BTreeSet<NodeKey>,
    pub color: String,
    pub moving: bool,
}

impl GroupBox {
    #[must_use]
    pub fn from_config(config: &GroupBoxConfig) -> Self {
        Self {
            key: GroupKey::new(&config.id),
            position: config.position,
            dimensions: config.dimensions,
            members: config.members.iter().map(|m| NodeKey::new(m)).collect(),
            color: config.color.clone().unwrap_or_else(|| "#7F7F7F".to_owned()),
            moving: false,
        }
    }

    #[must_use]
    pub fn rect(&self) -> Rect {
        Rect::from_parts(self.position, self.dimensions)
    }

    #[must_use]
    pub fn contains(&self, node: &NodeKey) -> bool {
        self.members.contains(node)
    }

    /// Clamp a member's proposed top-left corner into the box interior.
    ///
    /// Bounds are `[x + m, x + W - w - m]` per axis, applied as max-then-min.
    /// A node wider than the interior pins to the far bound.
    #[must_use]
    pub fn clamp_member(&self, proposed: Point, node_dims: Dimensions) -> Point {
        let lo_x = self.position.x + GROUP_MARGIN;
        let hi_x = self.position.x + self.dimensions.width - node_dims.width - GROUP_MARGIN;
        let lo_y = self.position.y + GROUP_MARGIN;
        let hi_y = self.position.y + self.dimensions.height - node_dims.height - GROUP_MARGIN;
        Point::new(proposed.x.max(lo_x).min(hi_x), proposed.y.max(lo_y).min(hi_y))
    }
}
