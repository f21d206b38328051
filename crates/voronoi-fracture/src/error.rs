//! Error types for fracture runs.

use thiserror::Error;

use crate::distribution::DistributionError;
use crate::scene::SceneError;

/// Broad category of a [`FractureError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad input; reported before the scene is touched.
    Input,
    /// The scene failed mid-run; edits made so far are not rolled back.
    Collaborator,
}

/// Errors that abort a fracture run.
///
/// Fragments that collapse during clipping are not errors; they show up as
/// discarded entries in the report.
#[derive(Debug, Error)]
pub enum FractureError {
    /// No seed points were left to fracture with.
    #[error("no seed points to fracture with")]
    NoSeeds,

    /// The source mesh has no geometry.
    #[error("source mesh {node} has no geometry")]
    EmptySource {
        /// Debug rendering of the source handle.
        node: String,
    },

    /// A command parameter is out of range.
    #[error("invalid parameter `{name}`: {details}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// What is wrong with it.
        details: String,
    },

    /// A seed sampler rejected its parameters.
    #[error("seed distribution failed: {0}")]
    Distribution(#[from] DistributionError),

    /// Duplicating the source returned the wrong number of copies.
    #[error("expected {expected} copies of the source mesh, got {actual}")]
    DuplicateCountMismatch {
        /// Requested copies.
        expected: usize,
        /// Copies returned by the scene.
        actual: usize,
    },

    /// A scene operation failed.
    #[error("scene error: {0}")]
    Scene(#[from] SceneError),
}

impl FractureError {
    /// Returns the category of the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NoSeeds
            | Self::EmptySource { .. }
            | Self::InvalidParameter { .. }
            | Self::Distribution(_) => ErrorKind::Input,
            Self::DuplicateCountMismatch { .. } | Self::Scene(_) => ErrorKind::Collaborator,
        }
    }
}

/// Result type for fracture runs.
pub type FractureResult<T> = Result<T, FractureError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds() {
        assert_eq!(FractureError::NoSeeds.kind(), ErrorKind::Input);
        assert_eq!(
            FractureError::from(DistributionError::ZeroSteps).kind(),
            ErrorKind::Input
        );
        let scene = SceneError::Failed {
            details: "boom".to_owned(),
        };
        let err = FractureError::from(scene);
        assert_eq!(err.kind(), ErrorKind::Collaborator);
        assert_eq!(err.to_string(), "scene error: scene operation failed: boom");
    }
}
