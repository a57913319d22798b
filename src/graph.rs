//! Graph aggregate, its config, and the registry of mounted graphs.
//!
//! DESIGN
//! ======
//! A `Graph` owns its node, edge, and group-box collections plus the camera
//! and viewport state. Back-references between entities (anchor → node,
//! node → group box) are keys into these collections. Every mutator that
//! can move geometry ends by refreshing the bounds tracker, so
//! `bounds()` is current whenever control returns to the host.
//!
//! ERROR HANDLING
//! ==============
//! Reads of missing entities return `None`. Mutators that need an entity
//! return `GraphError`. The registry reports `NotMounted` when a graph is
//! read before it was created, the one condition treated as a hard failure.

#[cfg(test)]
#[path = "graph_test.rs"]
mod graph_test;

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::anchor::{AnchorConfig, AnchorKey, AnchorKind, boundary_position, create_anchor, default_anchor_dimensions};
use crate::bounds::{Bounds, BoundsTracker, compute_node_bounds};
use crate::camera::{Camera, ScaleOrigin, clamp_scale};
use crate::consts::GROUP_MARGIN;
use crate::edge::{Edge, EdgeConfig, EdgeKey, EdgeStore, create_edge, create_preview_edge};
use crate::error::GraphError;
use crate::geometry::{Cardinal, Dimensions, Direction, LayoutDirection, Point, Rect};
use crate::group::{GroupBox, GroupBoxConfig, GroupKey};
use crate::node::{Node, NodeConfig, NodeKey, NodeStore, create_node};
use crate::path::{PathDescription, PathOptions, build_path};
use crate::routing::DirectedPoint;
use crate::store::Store;

/// Namespaced graph key, always of the form `G-{id}`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GraphKey(String);

impl GraphKey {
    #[must_use]
    pub fn new(id: &str) -> Self {
        if id.starts_with("G-") { Self(id.to_owned()) } else { Self(format!("G-{id}")) }
    }
}

impl fmt::Display for GraphKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A connection to create at construction, by node and anchor id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    pub source_node: String,
    pub source_anchor: String,
    pub target_node: String,
    pub target_anchor: String,
    pub edge: EdgeConfig,
}

/// Host-supplied graph description.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// Graph id; a random one is generated when absent.
    pub id: Option<String>,
    /// Initial scale.
    pub zoom: f64,
    pub translation: Point,
    pub scale_origin: ScaleOrigin,
    pub direction: LayoutDirection,
    pub locked: bool,
    pub editable: bool,
    /// Grid spacing for snapped drags; `None` disables snapping.
    pub snap_to: Option<f64>,
    /// Screen-space rectangle of the canvas.
    pub viewport: Rect,
    pub nodes: Vec<NodeConfig>,
    pub edges: Vec<ConnectionConfig>,
    pub group_boxes: Vec<GroupBoxConfig>,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            id: None,
            zoom: 1.0,
            translation: Point::ZERO,
            scale_origin: ScaleOrigin::default(),
            direction: LayoutDirection::default(),
            locked: false,
            editable: true,
            snap_to: None,
            viewport: Rect::new(0.0, 0.0, 800.0, 600.0),
            nodes: Vec::new(),
            edges: Vec::new(),
            group_boxes: Vec::new(),
        }
    }
}

impl GraphConfig {
    /// Parse a config from host JSON.
    ///
    /// # Errors
    ///
    /// Returns `GraphError::Config` if the JSON does not match the schema.
    pub fn from_json(json: &str) -> Result<Self, GraphError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// The live diagram.
#[derive(Debug)]
pub struct Graph {
    key: GraphKey,
    pub(crate) nodes: NodeStore,
    pub(crate) edges: EdgeStore,
    pub(crate) group_boxes: Store<GroupKey, GroupBox>,
    pub(crate) selected: BTreeSet<NodeKey>,
    pub(crate) camera: Camera,
    pub(crate) viewport: Rect,
    pub(crate) bounds: BoundsTracker,
    pub(crate) cursor: Point,
    pub(crate) max_z_index: i64,
    pub(crate) preview: Option<Edge>,
    pub locked: bool,
    pub editable: bool,
    pub direction: LayoutDirection,
    pub snap_to: Option<f64>,
}

/// Build and populate a graph from `config`.
///
/// # Errors
///
/// Fails if the config names duplicate nodes or connects missing anchors.
pub fn create_graph(id: &str, config: &GraphConfig) -> Result<Graph, GraphError> {
    let mut nodes = NodeStore::new();
    let mut bounds = BoundsTracker::new();
    bounds.attach(&mut nodes);

    let mut graph = Graph {
        key: GraphKey::new(id),
        nodes,
        edges: EdgeStore::new(),
        group_boxes: Store::new(),
        selected: BTreeSet::new(),
        camera: Camera::new(clamp_scale(config.zoom), config.translation, config.scale_origin),
        viewport: config.viewport,
        bounds,
        cursor: Point::ZERO,
        max_z_index: 0,
        preview: None,
        locked: config.locked,
        editable: config.editable,
        direction: config.direction,
        snap_to: config.snap_to.filter(|g| g.is_finite() && *g > 0.0),
    };

    for node in &config.nodes {
        graph.add_node(node)?;
    }
    for group in &config.group_boxes {
        graph.add_group_box(group)?;
    }
    // Nodes may also name their box from their own config.
    for node in graph.nodes.get_all() {
        if let Some(group) = &node.group_box {
            graph.group_boxes.update(group, |g| g.members.insert(node.key.clone()));
        }
    }
    for conn in &config.edges {
        let source = AnchorKey::new(&NodeKey::new(&conn.source_node), &conn.source_anchor);
        let target = AnchorKey::new(&NodeKey::new(&conn.target_node), &conn.target_anchor);
        graph.connect(&source, &target, &conn.edge)?;
    }
    graph.bounds.recompute(&graph.nodes, &graph.camera, &graph.viewport);
    Ok(graph)
}

impl Graph {
    // --- Queries ---

    #[must_use]
    pub fn key(&self) -> &GraphKey {
        &self.key
    }

    #[must_use]
    pub fn nodes(&self) -> &NodeStore {
        &self.nodes
    }

    #[must_use]
    pub fn edges(&self) -> &EdgeStore {
        &self.edges
    }

    /// Mutable edge store, for registering connection listeners.
    pub fn edges_mut(&mut self) -> &mut EdgeStore {
        &mut self.edges
    }

    #[must_use]
    pub fn group_boxes(&self) -> &Store<GroupKey, GroupBox> {
        &self.group_boxes
    }

    #[must_use]
    pub fn node(&self, key: &NodeKey) -> Option<&Node> {
        self.nodes.get(key)
    }

    #[must_use]
    pub fn camera(&self) -> Camera {
        self.camera
    }

    #[must_use]
    pub fn viewport(&self) -> Rect {
        self.viewport
    }

    #[must_use]
    pub fn bounds(&self) -> Bounds {
        self.bounds.bounds()
    }

    /// Pointer position in graph space.
    #[must_use]
    pub fn cursor(&self) -> Point {
        self.cursor
    }

    /// Graph-space point at the viewport center.
    #[must_use]
    pub fn center(&self) -> Point {
        self.camera.screen_to_graph(self.viewport.center(), &self.viewport)
    }

    #[must_use]
    pub fn selection(&self) -> &BTreeSet<NodeKey> {
        &self.selected
    }

    #[must_use]
    pub fn max_z_index(&self) -> i64 {
        self.max_z_index
    }

    /// The drag-preview edge, while a connection is being drawn.
    #[must_use]
    pub fn preview_edge(&self) -> Option<&Edge> {
        self.preview.as_ref()
    }

    // --- Nodes ---

    /// Create a node (and its anchors) from config.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateNode` if the key is taken.
    pub fn add_node(&mut self, config: &NodeConfig) -> Result<NodeKey, GraphError> {
        let mut node = create_node(config);
        if config.z_index.is_none() {
            self.max_z_index += 1;
            node.z_index = self.max_z_index;
        } else {
            self.max_z_index = self.max_z_index.max(node.z_index);
        }
        if config.direction.is_none() {
            node.direction = self.direction;
        }
        let key = node.key.clone();
        self.nodes.add(node)?;

        let anchors = config.anchors.clone().unwrap_or_else(default_anchors);
        for anchor in &anchors {
            self.add_anchor(&key, anchor)?;
        }
        self.refresh_bounds();
        Ok(key)
    }

    /// Remove a node, its edges, and its group/selection memberships.
    ///
    /// # Errors
    ///
    /// Returns `NodeNotFound` if absent.
    pub fn remove_node(&mut self, key: &NodeKey) -> Result<Node, GraphError> {
        if !self.nodes.contains(key) {
            return Err(GraphError::NodeNotFound(key.clone()));
        }
        for edge in self.edges.match_edges(Some(key), None, None) {
            self.edges.remove(&edge, &mut self.nodes);
        }
        for group in self.group_boxes.keys() {
            self.group_boxes.update(&group, |g| g.members.remove(key));
        }
        self.selected.remove(key);
        let node = self.nodes.remove(key).ok_or_else(|| GraphError::NodeNotFound(key.clone()))?;
        self.refresh_bounds();
        Ok(node)
    }

    /// Add an anchor to `node`, placed on the side it faces.
    ///
    /// # Errors
    ///
    /// Returns `NodeNotFound` if the owner is absent.
    pub fn add_anchor(&mut self, node_key: &NodeKey, config: &AnchorConfig) -> Result<AnchorKey, GraphError> {
        let node = self.nodes.get(node_key).ok_or_else(|| GraphError::NodeNotFound(node_key.clone()))?;
        let side = match config.direction {
            Some(Direction::North) => Cardinal::North,
            Some(Direction::South) => Cardinal::South,
            Some(Direction::East) => Cardinal::East,
            Some(Direction::West) => Cardinal::West,
            Some(Direction::SelfFacing) | None => match config.kind {
                AnchorKind::Input => node.direction.input_side(),
                AnchorKind::Output => node.direction.output_side(),
            },
        };
        let direction = config.direction.unwrap_or(Direction::from(side));
        let dims = config.dimensions.unwrap_or_else(default_anchor_dimensions);
        let initial = boundary_position(&node.rect(), side, config.ratio, dims);
        let id = if config.id.is_empty() { format!("{}", node.anchors.len()) } else { config.id.clone() };
        let anchor = create_anchor(node, &id, initial, dims, config, direction);
        let key = anchor.key.clone();
        self.nodes.add_anchor(anchor)?;
        Ok(key)
    }

    /// Resolve an anchor for rendering: its live position and routing direction
    /// toward `other`.
    #[must_use]
    pub fn directed_anchor(&self, key: &AnchorKey, other: Point) -> Option<DirectedPoint> {
        let anchor = self.nodes.anchor(key)?;
        let position = self.nodes.anchor_position(key)?;
        Some(DirectedPoint::new(position, anchor.route_direction(position, other)))
    }

    /// Path for a stored edge, or for the preview edge (whose far end is the cursor).
    #[must_use]
    pub fn edge_path(&self, key: &EdgeKey, options: PathOptions) -> Option<PathDescription> {
        if key.is_cursor() {
            let edge = self.preview.as_ref()?;
            let source_pos = self.nodes.anchor_position(&edge.source)?;
            let source = self.directed_anchor(&edge.source, self.cursor)?;
            let toward_source = Cardinal::toward(source_pos - self.cursor);
            let target = DirectedPoint::new(self.cursor, toward_source);
            return Some(build_path(edge.style, source, target, options));
        }
        let edge = self.edges.get(key)?;
        let source_pos = self.nodes.anchor_position(&edge.source)?;
        let target_pos = self.nodes.anchor_position(&edge.target)?;
        let source = self.directed_anchor(&edge.source, target_pos)?;
        let target = self.directed_anchor(&edge.target, source_pos)?;
        Some(build_path(edge.style, source, target, options))
    }

    /// Fold measured anchor drift into its offset once.
    ///
    /// # Errors
    ///
    /// Returns `AnchorNotFound` if the anchor or its owner is absent.
    pub fn recalibrate_anchor(&mut self, key: &AnchorKey, measured_top_left: Point) -> Result<(), GraphError> {
        let node_position = self.nodes.position(&key.node).ok_or_else(|| GraphError::AnchorNotFound(key.clone()))?;
        self.nodes
            .update_anchor(key, |a| a.recalculate_position(node_position, measured_top_left))
            .ok_or_else(|| GraphError::AnchorNotFound(key.clone()))
    }

    /// Bring a node to the front. Returns its new z-index.
    pub fn raise_node(&mut self, key: &NodeKey) -> Option<i64> {
        if !self.nodes.contains(key) {
            return None;
        }
        self.max_z_index += 1;
        let z = self.max_z_index;
        self.nodes.update(key, |n| n.z_index = z);
        Some(z)
    }

    // --- Edges ---

    /// Connect two anchors. Returns false when the pair was already connected.
    ///
    /// # Errors
    ///
    /// Fails for missing anchors, an anchor connected to itself, or an anchor
    /// at its connection limit.
    pub fn connect(&mut self, source: &AnchorKey, target: &AnchorKey, config: &EdgeConfig) -> Result<bool, GraphError> {
        if source == target {
            return Err(GraphError::SelfConnection(source.clone()));
        }
        let a = self.nodes.anchor(source).ok_or_else(|| GraphError::AnchorNotFound(source.clone()))?;
        let b = self.nodes.anchor(target).ok_or_else(|| GraphError::AnchorNotFound(target.clone()))?;
        if self.edges.fetch(source, target).is_some() {
            return Ok(false);
        }
        if a.is_full() {
            return Err(GraphError::ConnectionLimit(source.clone()));
        }
        if b.is_full() {
            return Err(GraphError::ConnectionLimit(target.clone()));
        }
        let edge = create_edge(source, target, config);
        Ok(self.edges.add(edge, &mut self.nodes))
    }

    /// Remove the edge between two anchors, if any.
    pub fn disconnect(&mut self, a: &AnchorKey, b: &AnchorKey) -> Option<Edge> {
        self.edges.remove(&EdgeKey::between(a, b), &mut self.nodes)
    }

    pub fn remove_edge(&mut self, key: &EdgeKey) -> Option<Edge> {
        self.edges.remove(key, &mut self.nodes)
    }

    /// Start drawing a connection from `source`.
    ///
    /// # Errors
    ///
    /// Returns `AnchorNotFound` if the anchor is absent.
    pub fn begin_preview(&mut self, source: &AnchorKey, config: &EdgeConfig) -> Result<(), GraphError> {
        if self.nodes.anchor(source).is_none() {
            return Err(GraphError::AnchorNotFound(source.clone()));
        }
        self.preview = Some(create_preview_edge(source, config));
        Ok(())
    }

    /// Drop the preview edge, returning it.
    pub fn end_preview(&mut self) -> Option<Edge> {
        self.preview.take()
    }

    // --- Groups ---

    /// Create a group box and bind its members to it.
    ///
    /// Members are taken out of any box they belonged to before.
    ///
    /// # Errors
    ///
    /// Returns `NodeNotFound` for a member that does not exist.
    pub fn add_group_box(&mut self, config: &GroupBoxConfig) -> Result<GroupKey, GraphError> {
        let group = GroupBox::from_config(config);
        if let Some(missing) = group.members.iter().find(|m| !self.nodes.contains(m)) {
            return Err(GraphError::NodeNotFound(missing.clone()));
        }
        let key = group.key.clone();
        for member in &group.members {
            let gk = key.clone();
            let previous = self.nodes.update(member, |n| n.group_box.replace(gk)).flatten();
            // A node belongs to one box at a time.
            if let Some(old) = previous.filter(|old| old != &key) {
                self.group_boxes.update(&old, |g| g.members.remove(member));
            }
        }
        debug!(group = %key, members = group.members.len(), "group box added");
        self.group_boxes.add(key.clone(), group);
        Ok(key)
    }

    /// Wrap the current selection in a new group box with a margin around it.
    ///
    /// Returns `None` when nothing is selected.
    pub fn group_selection(&mut self, id: &str, color: Option<String>) -> Option<GroupKey> {
        let rects = self.selected.iter().filter_map(|k| self.nodes.get(k).map(Node::rect));
        let covered = compute_node_bounds(rects)?;
        let pad = GROUP_MARGIN * 2.0;
        let config = GroupBoxConfig {
            id: id.to_owned(),
            position: Point::new(covered.x - pad, covered.y - pad),
            dimensions: Dimensions::new(covered.width + pad * 2.0, covered.height + pad * 2.0),
            color,
            members: self.selected.iter().map(|k| k.as_str().to_owned()).collect(),
        };
        match self.add_group_box(&config) {
            Ok(key) => Some(key),
            Err(err) => {
                debug!(error = %err, "selection not grouped");
                None
            }
        }
    }

    /// Remove a group box and release its members.
    pub fn remove_group_box(&mut self, key: &GroupKey) -> Option<GroupBox> {
        let group = self.group_boxes.remove(key)?;
        for member in &group.members {
            self.nodes.update(member, |n| {
                if n.group_box.as_ref() == Some(key) {
                    n.group_box = None;
                }
            });
        }
        Some(group)
    }

    // --- Selection ---

    /// Select `key`. With `additive`, toggle it within the existing selection.
    pub fn select(&mut self, key: &NodeKey, additive: bool) {
        if !self.nodes.contains(key) {
            return;
        }
        if additive {
            if !self.selected.remove(key) {
                self.selected.insert(key.clone());
            }
        } else {
            self.selected.clear();
            self.selected.insert(key.clone());
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected.clear();
    }

    /// Select every node intersecting a graph-space rectangle.
    pub fn select_in_rect(&mut self, area: &Rect) {
        self.selected = self
            .nodes
            .get_all()
            .into_iter()
            .filter(|n| n.rect().intersects(area))
            .map(|n| n.key.clone())
            .collect();
    }

    // --- Camera & viewport ---

    /// Replace the camera. Scale is clamped to the zoom limits.
    pub fn set_camera(&mut self, camera: Camera) {
        self.camera = Camera { scale: clamp_scale(camera.scale), ..camera };
        self.bounds.mark_dirty();
        self.refresh_bounds();
    }

    /// Update the canvas rectangle in screen space.
    pub fn set_viewport(&mut self, viewport: Rect) {
        self.viewport = viewport;
        self.bounds.mark_dirty();
        self.refresh_bounds();
    }

    /// Record the pointer position, converting it to graph space.
    pub fn set_cursor_screen(&mut self, screen: Point) {
        self.cursor = self.camera.screen_to_graph(screen, &self.viewport);
    }

    /// Recompute bounds if anything changed since the last refresh.
    pub fn refresh_bounds(&mut self) -> bool {
        self.bounds.refresh(&self.nodes, &self.camera, &self.viewport)
    }
}

fn default_anchors() -> Vec<AnchorConfig> {
    vec![
        AnchorConfig { id: "in".to_owned(), kind: AnchorKind::Input, ..AnchorConfig::default() },
        AnchorConfig { id: "out".to_owned(), kind: AnchorKind::Output, ..AnchorConfig::default() },
    ]
}

/// Registry of mounted graphs. A graph is mounted when its canvas appears and
/// unmounted when the canvas is destroyed.
#[derive(Debug, Default)]
pub struct GraphRegistry {
    graphs: Store<GraphKey, Graph>,
}

impl GraphRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from config and mount it under `config.id` (or a fresh id).
    ///
    /// # Errors
    ///
    /// Returns `AlreadyMounted` for a duplicate id, or any construction error.
    pub fn mount(&mut self, config: &GraphConfig) -> Result<GraphKey, GraphError> {
        let id = config.id.clone().unwrap_or_else(|| Uuid::new_v4().to_string());
        let key = GraphKey::new(&id);
        if self.graphs.contains(&key) {
            return Err(GraphError::AlreadyMounted(key));
        }
        let graph = create_graph(&id, config)?;
        info!(graph = %key, nodes = graph.nodes.len(), edges = graph.edges.len(), "graph mounted");
        self.graphs.add(key.clone(), graph);
        Ok(key)
    }

    /// Destroy a mounted graph, returning it.
    pub fn unmount(&mut self, key: &GraphKey) -> Option<Graph> {
        let graph = self.graphs.remove(key)?;
        info!(graph = %key, "graph unmounted");
        Some(graph)
    }

    /// # Errors
    ///
    /// Returns `NotMounted` if the graph has not been created.
    pub fn get(&self, key: &GraphKey) -> Result<&Graph, GraphError> {
        self.graphs.get(key).ok_or_else(|| GraphError::NotMounted(key.clone()))
    }

    /// Mutate a mounted graph.
    ///
    /// # Errors
    ///
    /// Returns `NotMounted` if the graph has not been created.
    pub fn update<R>(&mut self, key: &GraphKey, f: impl FnOnce(&mut Graph) -> R) -> Result<R, GraphError> {
        self.graphs.update(key, f).ok_or_else(|| GraphError::NotMounted(key.clone()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.graphs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.graphs.is_empty()
    }
}
