//! Scene graph, geometry, and scene instance loading.
//!
//! The graph is an index arena: nodes own their children by index, meshes
//! are stored once and shared. [`SceneLoad`] drives a two-phase load where
//! all instance geometry resolves before the graph is assembled.

pub mod desc;
pub mod error;
pub mod geometry;
pub mod graph;
pub mod loader;

pub use desc::{InstanceDesc, ScaleDesc, SceneDesc};
pub use error::{ResolveError, SceneError};
pub use geometry::{BoundingBox, Box2, TriangleMesh};
pub use graph::{NodeMetadata, SceneGraph, SceneNode, Traversal};
pub use loader::{load_scene, AssetResolver, LoadPhase, SceneEvent, SceneLoad};
