//! Error types for scene setup, asset loading and rendering.

use thiserror::Error;

/// Failure while importing the model asset.
#[derive(Debug, Error)]
pub enum AssetError {
    /// The glTF importer rejected the file (missing, unreadable or malformed).
    #[error("failed to import {path}: {message}")]
    Import { path: String, message: String },

    /// The document has neither a default scene nor any scene at all.
    #[error("{path} contains no scene")]
    NoScene { path: String },

    /// A mesh primitive came without vertex positions.
    #[error("mesh {mesh:?} has a primitive without positions")]
    MissingPositions { mesh: Option<String> },

    /// The loader thread went away before reporting a result.
    #[error("model load was cancelled before completing")]
    Cancelled,
}

/// Errors surfaced by the scene controller.
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("container element `{0}` does not exist")]
    MissingContainer(String),

    #[error("page layout has no sections; at least one is required")]
    NoSections,

    #[error("section {index} has no overlay element")]
    MissingOverlay { index: usize },

    #[error("page layout {path}: {message}")]
    PageLayout { path: String, message: String },

    #[error(transparent)]
    AssetLoad(#[from] AssetError),

    #[error("a model is already attached to the scene")]
    ModelAlreadyAttached,

    #[error("render failed: {0}")]
    Render(String),
}

pub type SceneResult<T> = std::result::Result<T, SceneError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn asset_errors_convert_into_scene_errors() {
        let err: SceneError = AssetError::Cancelled.into();
        assert!(matches!(err, SceneError::AssetLoad(AssetError::Cancelled)));
        assert_eq!(err.to_string(), "model load was cancelled before completing");
    }

    #[test]
    fn missing_overlay_names_the_section() {
        let err = SceneError::MissingOverlay { index: 2 };
        assert_eq!(err.to_string(), "section 2 has no overlay element");
    }
}
