//! Brick construction errors

use bk_cad::CadError;
use thiserror::Error;

/// Errors raised while deriving dimensions or building a brick
#[derive(Debug, Clone, Error)]
pub enum BrickError {
    /// Rejected before any geometry is built
    #[error("Invalid parameter `{parameter}`: {reason}")]
    InvalidParameter {
        parameter: &'static str,
        reason: String,
    },

    /// A requested feature would have zero or negative extent
    #[error("Degenerate geometry in {feature}: {reason}")]
    DegenerateGeometry {
        feature: &'static str,
        reason: String,
    },

    /// The geometry kernel rejected an operation
    #[error("Kernel failure in {feature}: {source}")]
    KernelFailure {
        feature: &'static str,
        #[source]
        source: CadError,
    },
}

impl BrickError {
    pub fn invalid(parameter: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            parameter,
            reason: reason.into(),
        }
    }

    pub fn degenerate(feature: &'static str, reason: impl Into<String>) -> Self {
        Self::DegenerateGeometry {
            feature,
            reason: reason.into(),
        }
    }

    pub fn kernel(feature: &'static str, source: CadError) -> Self {
        Self::KernelFailure { feature, source }
    }

    /// Parameter or feature the error refers to
    pub fn subject(&self) -> &'static str {
        match self {
            Self::InvalidParameter { parameter, .. } => parameter,
            Self::DegenerateGeometry { feature, .. } | Self::KernelFailure { feature, .. } => {
                feature
            }
        }
    }
}

/// Result type for brick operations
pub type BrickResult<T> = Result<T, BrickError>;
