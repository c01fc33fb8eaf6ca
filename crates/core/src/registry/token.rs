//! Operator-supplied format tokens.

use super::error::RegistryError;

/// A user-facing identifier for an output format: either a name/alias
/// or a 1-based index into the class's menu list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatToken {
    Name(String),
    Index(usize),
}

impl FormatToken {
    /// Parses raw operator input into a token.
    ///
    /// Input is trimmed; all-digit input becomes an `Index`, anything else
    /// a lowercased `Name`. Empty input is rejected.
    pub fn parse(raw: &str) -> Result<Self, RegistryError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(RegistryError::EmptyToken);
        }
        if trimmed.chars().all(|c| c.is_ascii_digit()) {
            // Absurdly long digit strings still resolve (and fail) as indexes.
            let index = trimmed.parse::<usize>().unwrap_or(usize::MAX);
            Ok(Self::Index(index))
        } else {
            Ok(Self::Name(trimmed.to_ascii_lowercase()))
        }
    }
}

impl std::fmt::Display for FormatToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Name(name) => write!(f, "{}", name),
            Self::Index(index) => write!(f, "#{}", index),
        }
    }
}
