//! Error types for scenekit-arch.

use thiserror::Error;

/// Errors from architecture description handling.
///
/// Geometry problems inside an otherwise valid description (degenerate
/// walls, unknown element types, malformed holes) are logged and skipped
/// rather than surfaced here.
#[derive(Debug, Error)]
pub enum ArchError {
    /// Architecture JSON deserialization error.
    #[error("architecture json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Scene graph construction error.
    #[error(transparent)]
    Scene(#[from] scenekit_scene::SceneError),
}
