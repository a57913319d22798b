//! Edges, connection bookkeeping, and connect/disconnect events.
//!
//! DESIGN
//! ======
//! An edge's key is derived from its two anchor keys, sorted, so the same
//! unordered pair always yields the same key and the store can hold at most
//! one edge per pair. The transient drag-preview edge uses a fixed sentinel
//! key instead and never enters the store.
//!
//! `EdgeStore::add` and `EdgeStore::remove` also maintain the anchors'
//! connected sets and the per-node `Connection` caches. Connection listeners
//! fire only on net changes: the first connection of a pair and the removal
//! that leaves it fully disconnected. They run before the mutating call
//! returns, so no listener sees a half-updated pair.

#[cfg(test)]
#[path = "edge_test.rs"]
mod edge_test;

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::anchor::AnchorKey;
use crate::consts::{DEFAULT_LABEL_HEIGHT, DEFAULT_LABEL_POSITION, DEFAULT_LABEL_WIDTH};
use crate::geometry::Dimensions;
use crate::node::{NodeKey, NodeStore};
use crate::path::EdgeStyle;
use crate::store::{Store, StoreEvent, SubscriberId};

/// Edge key: the unordered anchor pair it joins, or the preview sentinel.
///
/// Identity is the pair itself, sorted, so ids containing `+`, `/` or `A-`
/// cannot make two different pairs compare equal. The `E-{a}+{b}` string is
/// for display only.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EdgeKey {
    Pair(AnchorKey, AnchorKey),
    Cursor,
}

impl EdgeKey {
    /// Key for the edge between `a` and `b`. Symmetric in its arguments.
    #[must_use]
    pub fn between(a: &AnchorKey, b: &AnchorKey) -> Self {
        let (first, second) = if a <= b { (a, b) } else { (b, a) };
        Self::Pair(first.clone(), second.clone())
    }

    /// Sentinel key of the drag-preview edge.
    #[must_use]
    pub fn cursor() -> Self {
        Self::Cursor
    }

    #[must_use]
    pub fn is_cursor(&self) -> bool {
        matches!(self, Self::Cursor)
    }

    /// The sorted anchor pair, `None` for the preview edge.
    #[must_use]
    pub fn anchors(&self) -> Option<(&AnchorKey, &AnchorKey)> {
        match self {
            Self::Pair(a, b) => Some((a, b)),
            Self::Cursor => None,
        }
    }
}

impl fmt::Display for EdgeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pair(a, b) => write!(f, "E-{a}+{b}"),
            Self::Cursor => f.write_str("E-cursor"),
        }
    }
}

/// Cached `(source, target, edge)` record kept on both endpoint nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    pub source: AnchorKey,
    pub target: AnchorKey,
    pub edge: EdgeKey,
}

/// Net change in an anchor pair's connectivity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionEvent {
    Connected,
    Disconnected,
}

/// Label request on an edge config. Missing geometry is filled with defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgeLabelConfig {
    pub text: String,
    pub color: Option<String>,
    pub text_color: Option<String>,
    pub dimensions: Option<Dimensions>,
    /// Fraction along the path, 0.0 at the source.
    pub position: Option<f64>,
}

/// Resolved label geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeLabel {
    pub text: String,
    pub color: String,
    pub text_color: String,
    pub dimensions: Dimensions,
    pub position: f64,
}

/// Host-supplied edge description.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgeConfig {
    pub style: EdgeStyle,
    pub color: String,
    pub width: f64,
    pub animated: bool,
    pub label: Option<EdgeLabelConfig>,
    pub metadata: serde_json::Value,
}

impl Default for EdgeConfig {
    fn default() -> Self {
        Self {
            style: EdgeStyle::default(),
            color: "#1F1A17".to_owned(),
            width: 2.0,
            animated: false,
            label: None,
            metadata: serde_json::Value::Null,
        }
    }
}

/// An edge between two anchors.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub key: EdgeKey,
    pub source: AnchorKey,
    pub target: AnchorKey,
    pub style: EdgeStyle,
    pub color: String,
    pub width: f64,
    pub animated: bool,
    pub label: Option<EdgeLabel>,
    pub metadata: serde_json::Value,
}

impl Edge {
    /// The endpoint opposite `anchor`, if `anchor` is one of this edge's ends.
    #[must_use]
    pub fn other_end(&self, anchor: &AnchorKey) -> Option<&AnchorKey> {
        if &self.source == anchor {
            Some(&self.target)
        } else if &self.target == anchor {
            Some(&self.source)
        } else {
            None
        }
    }
}

/// Build an edge between `source` and `target` with a derived key.
#[must_use]
pub fn create_edge(source: &AnchorKey, target: &AnchorKey, config: &EdgeConfig) -> Edge {
    Edge {
        key: EdgeKey::between(source, target),
        source: source.clone(),
        target: target.clone(),
        style: config.style,
        color: config.color.clone(),
        width: config.width,
        animated: config.animated,
        label: config.label.as_ref().map(resolve_label),
        metadata: config.metadata.clone(),
    }
}

/// Build the transient drag-preview edge. Its target is the source anchor
/// itself; renderers draw its far end at the graph cursor.
#[must_use]
pub fn create_preview_edge(source: &AnchorKey, config: &EdgeConfig) -> Edge {
    Edge { key: EdgeKey::cursor(), ..create_edge(source, source, config) }
}

fn resolve_label(config: &EdgeLabelConfig) -> EdgeLabel {
    EdgeLabel {
        text: config.text.clone(),
        color: config.color.clone().unwrap_or_else(|| "#FFFFFF".to_owned()),
        text_color: config.text_color.clone().unwrap_or_else(|| "#1F1A17".to_owned()),
        dimensions: config
            .dimensions
            .unwrap_or_else(|| Dimensions::new(DEFAULT_LABEL_WIDTH, DEFAULT_LABEL_HEIGHT)),
        position: config.position.unwrap_or(DEFAULT_LABEL_POSITION).clamp(0.0, 1.0),
    }
}

/// Handle for a registered connection listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Box<dyn FnMut(&Edge, ConnectionEvent)>;

/// Edge collection with connection bookkeeping.
#[derive(Default)]
pub struct EdgeStore {
    edges: Store<EdgeKey, Edge>,
    pair_counts: HashMap<(AnchorKey, AnchorKey), usize>,
    listeners: Vec<(ListenerId, Listener)>,
    next_listener: u64,
}

impl fmt::Debug for EdgeStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EdgeStore")
            .field("edges", &self.edges)
            .field("pairs", &self.pair_counts.len())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl EdgeStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `edge` and record the connection on both anchors and nodes.
    ///
    /// Returns false, changing nothing, if an edge with the same key exists.
    pub fn add(&mut self, edge: Edge, nodes: &mut NodeStore) -> bool {
        if self.edges.contains(&edge.key) {
            return false;
        }
        let pair = unordered(&edge.source, &edge.target);
        let count = self.pair_counts.entry(pair).or_insert(0);
        *count += 1;
        let first = *count == 1;

        let connection = Connection { source: edge.source.clone(), target: edge.target.clone(), edge: edge.key.clone() };
        if first {
            link(nodes, &edge.source, &edge.target);
        }
        cache_connection(nodes, &connection);

        let key = edge.key.clone();
        self.edges.add(key.clone(), edge);
        if first {
            debug!(edge = %key, "anchors connected");
            self.emit(&key, ConnectionEvent::Connected);
        }
        true
    }

    /// Remove an edge and reverse its bookkeeping.
    pub fn remove(&mut self, key: &EdgeKey, nodes: &mut NodeStore) -> Option<Edge> {
        let edge = self.edges.remove(key)?;
        uncache_connection(nodes, &edge);

        let pair = unordered(&edge.source, &edge.target);
        let remaining = match self.pair_counts.get_mut(&pair) {
            Some(count) => {
                *count = count.saturating_sub(1);
                *count
            }
            None => 0,
        };
        if remaining == 0 {
            self.pair_counts.remove(&pair);
            unlink(nodes, &edge.source, &edge.target);
            debug!(edge = %key, "anchors disconnected");
            self.emit_edge(&edge, ConnectionEvent::Disconnected);
        }
        Some(edge)
    }

    #[must_use]
    pub fn get(&self, key: &EdgeKey) -> Option<&Edge> {
        self.edges.get(key)
    }

    #[must_use]
    pub fn contains(&self, key: &EdgeKey) -> bool {
        self.edges.contains(key)
    }

    #[must_use]
    pub fn get_all(&self) -> Vec<&Edge> {
        self.edges.get_all()
    }

    #[must_use]
    pub fn keys(&self) -> Vec<EdgeKey> {
        self.edges.keys()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Remove every edge, firing disconnections as each pair empties.
    pub fn clear(&mut self, nodes: &mut NodeStore) {
        for key in self.edges.keys() {
            self.remove(&key, nodes);
        }
    }

    /// Apply `f` to a stored edge (style, label, metadata, ...).
    pub fn update<R>(&mut self, key: &EdgeKey, f: impl FnOnce(&mut Edge) -> R) -> Option<R> {
        self.edges.update(key, f)
    }

    /// The single edge directly joining `a` and `b`, in either orientation.
    #[must_use]
    pub fn fetch(&self, a: &AnchorKey, b: &AnchorKey) -> Option<&Edge> {
        self.edges.get(&EdgeKey::between(a, b))
    }

    /// Keys of edges whose endpoints match the filters. `None` is a wildcard.
    ///
    /// `source` and `target` filter by owning node and are tried in both
    /// orientations; `anchor`, when given, must be one of the two ends.
    #[must_use]
    pub fn match_edges(&self, source: Option<&NodeKey>, target: Option<&NodeKey>, anchor: Option<&AnchorKey>) -> Vec<EdgeKey> {
        let fits = |a: &AnchorKey, b: &AnchorKey| {
            source.is_none_or(|n| &a.node == n) && target.is_none_or(|n| &b.node == n)
        };
        self.edges
            .iter()
            .filter(|(_, edge)| fits(&edge.source, &edge.target) || fits(&edge.target, &edge.source))
            .filter(|(_, edge)| anchor.is_none_or(|k| &edge.source == k || &edge.target == k))
            .map(|(key, _)| key.clone())
            .collect()
    }

    /// Register a store-level subscriber (fires on every edge mutation).
    pub fn subscribe(&mut self, f: impl FnMut(&StoreEvent<EdgeKey>) + 'static) -> SubscriberId {
        self.edges.subscribe(f)
    }

    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        self.edges.unsubscribe(id)
    }

    /// Register `f` for net connect/disconnect events.
    pub fn on_connection(&mut self, f: impl FnMut(&Edge, ConnectionEvent) + 'static) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, Box::new(f)));
        id
    }

    pub fn off_connection(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        self.listeners.len() != before
    }

    fn emit(&mut self, key: &EdgeKey, event: ConnectionEvent) {
        let Some(edge) = self.edges.get(key) else {
            return;
        };
        for (_, listener) in &mut self.listeners {
            listener(edge, event);
        }
    }

    fn emit_edge(&mut self, edge: &Edge, event: ConnectionEvent) {
        for (_, listener) in &mut self.listeners {
            listener(edge, event);
        }
    }
}

fn unordered(a: &AnchorKey, b: &AnchorKey) -> (AnchorKey, AnchorKey) {
    if a <= b { (a.clone(), b.clone()) } else { (b.clone(), a.clone()) }
}

fn link(nodes: &mut NodeStore, a: &AnchorKey, b: &AnchorKey) {
    nodes.update_anchor(a, |anchor| anchor.connected.insert(b.clone()));
    nodes.update_anchor(b, |anchor| anchor.connected.insert(a.clone()));
}

fn unlink(nodes: &mut NodeStore, a: &AnchorKey, b: &AnchorKey) {
    nodes.update_anchor(a, |anchor| anchor.connected.remove(b));
    nodes.update_anchor(b, |anchor| anchor.connected.remove(a));
}

fn cache_connection(nodes: &mut NodeStore, connection: &Connection) {
    nodes.update(&connection.source.node, |node| node.connections.push(connection.clone()));
    if connection.target.node != connection.source.node {
        nodes.update(&connection.target.node, |node| node.connections.push(connection.clone()));
    }
}

fn uncache_connection(nodes: &mut NodeStore, edge: &Edge) {
    for owner in [&edge.source.node, &edge.target.node] {
        nodes.update(owner, |node| node.connections.retain(|c| c.edge != edge.key));
    }
}
