//! Nodes, node config, and the indexed node store.
//!
//! `NodeStore` wraps a [`Store`] and keeps parallel position and dimension
//! indices that the bounds subsystem scans. Every geometric write goes
//! through the store so the indices never drift from the nodes themselves.

#[cfg(test)]
#[path = "node_test.rs"]
mod node_test;

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::anchor::{Anchor, AnchorConfig, AnchorKey};
use crate::consts::{DEFAULT_NODE_HEIGHT, DEFAULT_NODE_WIDTH};
use crate::edge::Connection;
use crate::error::GraphError;
use crate::geometry::{Dimensions, LayoutDirection, Point, Rect};
use crate::group::GroupKey;
use crate::store::{Store, StoreEvent, SubscriberId};

/// Namespaced node key, always of the form `N-{id}`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeKey(String);

impl NodeKey {
    /// Normalize `id` into the `N-` form; already-prefixed ids pass through.
    #[must_use]
    pub fn new(id: &str) -> Self {
        if id.starts_with("N-") { Self(id.to_owned()) } else { Self(format!("N-{id}")) }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Host-supplied node description.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    /// Node id; a random one is generated when absent.
    pub id: Option<String>,
    pub position: Point,
    pub dimensions: Option<Dimensions>,
    pub rotation: f64,
    pub z_index: Option<i64>,
    pub label: Option<String>,
    pub bg_color: Option<String>,
    pub border_color: Option<String>,
    pub text_color: Option<String>,
    pub locked: bool,
    pub editable: Option<bool>,
    pub direction: Option<LayoutDirection>,
    pub group_box: Option<String>,
    /// Anchors to create; `None` means one input and one output on the layout sides.
    pub anchors: Option<Vec<AnchorConfig>>,
}

/// A node on the canvas.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug)]
pub struct Node {
    pub key: NodeKey,
    pub position: Point,
    pub dimensions: Dimensions,
    pub rotation: f64,
    pub z_index: i64,
    pub direction: LayoutDirection,
    /// Group box this node is constrained by, if any.
    pub group_box: Option<GroupKey>,
    pub anchors: Store<AnchorKey, Anchor>,
    pub connections: Vec<Connection>,
    pub label: String,
    pub bg_color: Option<String>,
    pub border_color: Option<String>,
    pub text_color: Option<String>,
    pub locked: bool,
    pub moving: bool,
    pub resizing: bool,
    pub editable: bool,
}

impl Node {
    #[must_use]
    pub fn rect(&self) -> Rect {
        Rect::from_parts(self.position, self.dimensions)
    }

    /// Absolute position of one of this node's anchors.
    #[must_use]
    pub fn anchor_position(&self, key: &AnchorKey) -> Option<Point> {
        self.anchors.get(key).map(|a| a.position(self.position))
    }
}

/// Build a node from config: 200×100 default size, `N-` key, no anchors.
#[must_use]
pub fn create_node(config: &NodeConfig) -> Node {
    let id = config.id.clone().unwrap_or_else(|| Uuid::new_v4().to_string());
    Node {
        key: NodeKey::new(&id),
        position: config.position,
        dimensions: config
            .dimensions
            .unwrap_or_else(|| Dimensions::new(DEFAULT_NODE_WIDTH, DEFAULT_NODE_HEIGHT)),
        rotation: config.rotation,
        z_index: config.z_index.unwrap_or(0),
        direction: config.direction.unwrap_or_default(),
        group_box: config.group_box.as_deref().map(GroupKey::new),
        anchors: Store::new(),
        connections: Vec::new(),
        label: config.label.clone().unwrap_or_default(),
        bg_color: config.bg_color.clone(),
        border_color: config.border_color.clone(),
        text_color: config.text_color.clone(),
        locked: config.locked,
        moving: false,
        resizing: false,
        editable: config.editable.unwrap_or(true),
    }
}

/// Node collection with position/dimension indices.
#[derive(Debug, Default)]
pub struct NodeStore {
    nodes: Store<NodeKey, Node>,
    positions: HashMap<NodeKey, Point>,
    dimensions: HashMap<NodeKey, Dimensions>,
}

impl NodeStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateNode` if the key is already present; the store is unchanged.
    pub fn add(&mut self, node: Node) -> Result<(), GraphError> {
        if self.nodes.contains(&node.key) {
            return Err(GraphError::DuplicateNode(node.key));
        }
        let key = node.key.clone();
        self.positions.insert(key.clone(), node.position);
        self.dimensions.insert(key.clone(), node.dimensions);
        debug!(node = %key, "node added");
        self.nodes.add(key, node);
        Ok(())
    }

    /// Remove a node and tear down its index entries.
    pub fn remove(&mut self, key: &NodeKey) -> Option<Node> {
        self.positions.remove(key);
        self.dimensions.remove(key);
        let removed = self.nodes.remove(key);
        if removed.is_some() {
            debug!(node = %key, "node removed");
        }
        removed
    }

    #[must_use]
    pub fn get(&self, key: &NodeKey) -> Option<&Node> {
        self.nodes.get(key)
    }

    #[must_use]
    pub fn contains(&self, key: &NodeKey) -> bool {
        self.nodes.contains(key)
    }

    #[must_use]
    pub fn get_all(&self) -> Vec<&Node> {
        self.nodes.get_all()
    }

    #[must_use]
    pub fn keys(&self) -> Vec<NodeKey> {
        self.nodes.keys()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn clear(&mut self) {
        self.positions.clear();
        self.dimensions.clear();
        self.nodes.clear();
    }

    pub fn subscribe(&mut self, f: impl FnMut(&StoreEvent<NodeKey>) + 'static) -> SubscriberId {
        self.nodes.subscribe(f)
    }

    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        self.nodes.unsubscribe(id)
    }

    /// Apply `f` to a node, then re-sync the indices from the node's fields.
    pub fn update<R>(&mut self, key: &NodeKey, f: impl FnOnce(&mut Node) -> R) -> Option<R> {
        let (result, position, dimensions) = self.nodes.update(key, |node| {
            let result = f(node);
            (result, node.position, node.dimensions)
        })?;
        self.positions.insert(key.clone(), position);
        self.dimensions.insert(key.clone(), dimensions);
        Some(result)
    }

    /// Move a node's top-left corner. Returns false if the node is absent.
    pub fn set_position(&mut self, key: &NodeKey, position: Point) -> bool {
        self.update(key, |node| node.position = position).is_some()
    }

    /// Shift a node by `delta`. Returns false if the node is absent.
    pub fn translate(&mut self, key: &NodeKey, delta: Point) -> bool {
        self.update(key, |node| node.position += delta).is_some()
    }

    /// Resize a node. Returns false if the node is absent.
    pub fn set_dimensions(&mut self, key: &NodeKey, dimensions: Dimensions) -> bool {
        self.update(key, |node| node.dimensions = dimensions).is_some()
    }

    #[must_use]
    pub fn position(&self, key: &NodeKey) -> Option<Point> {
        self.positions.get(key).copied()
    }

    #[must_use]
    pub fn dimensions(&self, key: &NodeKey) -> Option<Dimensions> {
        self.dimensions.get(key).copied()
    }

    /// Every node rectangle, read from the indices.
    pub fn rects(&self) -> impl Iterator<Item = Rect> + '_ {
        self.positions.iter().filter_map(|(key, position)| {
            self.dimensions.get(key).map(|dims| Rect::from_parts(*position, *dims))
        })
    }

    #[must_use]
    pub fn anchor(&self, key: &AnchorKey) -> Option<&Anchor> {
        self.nodes.get(&key.node)?.anchors.get(key)
    }

    /// Live absolute position of an anchor.
    #[must_use]
    pub fn anchor_position(&self, key: &AnchorKey) -> Option<Point> {
        self.nodes.get(&key.node)?.anchor_position(key)
    }

    /// Apply `f` to an anchor through its owning node.
    pub fn update_anchor<R>(&mut self, key: &AnchorKey, f: impl FnOnce(&mut Anchor) -> R) -> Option<R> {
        self.update(&key.node, |node| node.anchors.update(key, f)).flatten()
    }

    /// Insert an anchor into its owning node.
    ///
    /// # Errors
    ///
    /// Returns `NodeNotFound` if the owner is absent.
    pub fn add_anchor(&mut self, anchor: Anchor) -> Result<(), GraphError> {
        let owner = anchor.node().clone();
        self.update(&owner, |node| {
            node.anchors.add(anchor.key.clone(), anchor);
        })
        .ok_or(GraphError::NodeNotFound(owner))
    }
}
