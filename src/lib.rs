//! Reactive graph-canvas engine for node-diagram editors.
//!
//! The crate owns the authoritative in-memory diagram (nodes, anchors, edges
//! and group boxes), keeps it synchronized with a pan/zoom viewport, and
//! computes routed paths between connected anchors. It binds to no input
//! device and draws nothing: hosts feed screen-space pointer events into
//! [`engine::Engine`] and read entity state back for rendering.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Gesture-driven engine and the [`engine::Action`]s it reports |
//! | [`graph`] | Graph aggregate, its config, and the mounted-graph registry |
//! | [`node`] | Nodes, node config, and the indexed node store |
//! | [`anchor`] | Connection anchors and their live position derivation |
//! | [`edge`] | Edges, connection bookkeeping, and connect/disconnect events |
//! | [`group`] | Group boxes that constrain member movement |
//! | [`store`] | Generic keyed collection with synchronous change notification |
//! | [`bounds`] | Node and graph bounding boxes |
//! | [`movement`] | Drag, snap, clamp, resize, and zoom mutators |
//! | [`input`] | Input event types and the gesture state machine |
//! | [`camera`] | Screen/graph conversions and zoom math |
//! | [`routing`] | Orthogonal edge routing |
//! | [`path`] | Style-specific path builders |
//! | [`geometry`] | Points, sizes, rectangles, and directions |
//! | [`error`] | Crate error type |
//! | [`consts`] | Shared numeric constants (zoom limits, defaults, margins) |

pub mod anchor;
pub mod bounds;
pub mod camera;
pub mod consts;
pub mod edge;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod graph;
pub mod group;
pub mod input;
pub mod movement;
pub mod node;
pub mod path;
pub mod routing;
pub mod store;

pub use error::GraphError;
