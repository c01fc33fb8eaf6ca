//! Error types for the format registry.

use thiserror::Error;

/// Errors raised while resolving a format token.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The operator supplied an empty token.
    #[error("no output format given")]
    EmptyToken,

    /// No format matches the supplied name, alias, or menu index.
    #[error("unsupported output format '{token}' (supported: {supported})")]
    UnsupportedFormat { token: String, supported: String },
}

impl RegistryError {
    /// Creates an unsupported-format error.
    pub fn unsupported(token: impl Into<String>, supported: impl Into<String>) -> Self {
        Self::UnsupportedFormat {
            token: token.into(),
            supported: supported.into(),
        }
    }
}
