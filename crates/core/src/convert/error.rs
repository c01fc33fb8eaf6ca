//! Error types for the conversion dispatcher and engines.

use std::path::PathBuf;
use thiserror::Error;

use crate::registry::RegistryError;

/// Errors that can occur while dispatching a conversion.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// Input file missing or not a regular file.
    #[error("input file not found: {path}")]
    InputNotFound { path: PathBuf },

    /// Target format token did not resolve.
    #[error(transparent)]
    UnsupportedFormat(#[from] RegistryError),

    /// Quality value out of range or of the wrong class for the target.
    #[error("invalid quality: {reason}")]
    InvalidQuality { reason: String },

    /// Output directory could not be created or output could not be placed.
    #[error("cannot prepare output path {path}: {source}")]
    OutputPath {
        path: PathBuf,
        source: std::io::Error,
    },

    /// An engine this conversion needs is not usable.
    #[error("{engine} engine unavailable: {reason}")]
    EngineUnavailable { engine: String, reason: String },

    /// The engine accepted the job but failed to complete it.
    #[error("conversion failed: {reason}")]
    Engine {
        reason: String,
        stderr: Option<String>,
    },

    /// Conversion ran past the configured timeout.
    #[error("conversion timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },

    /// I/O error outside the stages above.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConvertError {
    /// Creates an engine failure without captured stderr.
    pub fn engine(reason: impl Into<String>) -> Self {
        Self::Engine {
            reason: reason.into(),
            stderr: None,
        }
    }

    /// Creates an engine failure carrying subprocess stderr.
    pub fn engine_with_stderr(reason: impl Into<String>, stderr: Option<String>) -> Self {
        Self::Engine {
            reason: reason.into(),
            stderr,
        }
    }

    /// Creates an invalid quality error.
    pub fn invalid_quality(reason: impl Into<String>) -> Self {
        Self::InvalidQuality {
            reason: reason.into(),
        }
    }

    /// Creates an engine-unavailable error.
    pub fn engine_unavailable(engine: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::EngineUnavailable {
            engine: engine.into(),
            reason: reason.into(),
        }
    }

    /// Whether this failure is an operator mistake rather than an
    /// engine or filesystem problem.
    pub fn is_usage_error(&self) -> bool {
        matches!(
            self,
            Self::InputNotFound { .. } | Self::UnsupportedFormat(_) | Self::InvalidQuality { .. }
        )
    }
}
