//! Error types for scenekit-scene.

use scenekit_core::FullId;
use thiserror::Error;

/// Errors from scene graph manipulation and scene description handling.
#[derive(Debug, Error)]
pub enum SceneError {
    /// Scene description deserialization error.
    #[error("scene json error: {0}")]
    Json(#[from] serde_json::Error),

    /// A node index past the end of the arena.
    #[error("node index {index} out of range")]
    NodeOutOfRange { index: usize },

    /// Re-parenting that would make a node its own ancestor.
    #[error("attaching node {child} under {parent} would create a cycle")]
    Cycle { child: usize, parent: usize },

    /// A flat transform with the wrong number of entries.
    #[error("transform must have 16 entries, got {len}")]
    BadTransform { len: usize },

    /// An instance index outside the declared scene.
    #[error("instance index {index} out of range (scene has {total})")]
    InstanceOutOfRange { index: usize, total: usize },
}

/// Errors reported by an [`crate::AssetResolver`] for a single instance.
#[derive(Debug, Clone, Error)]
pub enum ResolveError {
    /// The asset is not known to the resolver.
    #[error("asset {0} not found")]
    NotFound(FullId),

    /// The requested format is not supported for this asset.
    #[error("unsupported format '{format}' for asset {id}")]
    UnsupportedFormat { id: FullId, format: String },

    /// The asset exists but could not be loaded.
    #[error("failed to load asset {id}: {reason}")]
    Failed { id: FullId, reason: String },
}
