//! Request, plan, and result types for the conversion dispatcher.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::registry::{FormatClass, FormatToken, OutputFormat, Quality};

/// A single conversion request, as assembled by the shell.
#[derive(Debug, Clone)]
pub struct ConversionRequest {
    /// Path to the source file. Must exist and be a regular file.
    pub input_path: PathBuf,
    /// Explicit output path; when absent the dispatcher derives one by
    /// swapping the input extension for the target's canonical extension.
    pub output_path: Option<PathBuf>,
    /// Class the operator chose before picking a format.
    pub class: FormatClass,
    /// Target format token (name, alias, or menu index).
    pub target: FormatToken,
    /// Requested quality; the registry default applies when unset.
    pub quality: Option<Quality>,
    /// Video codec override (video targets only).
    pub codec: Option<String>,
}

impl ConversionRequest {
    /// Convenience constructor for the common fields.
    pub fn new(input_path: impl Into<PathBuf>, class: FormatClass, target: FormatToken) -> Self {
        Self {
            input_path: input_path.into(),
            output_path: None,
            class,
            target,
            quality: None,
            codec: None,
        }
    }

    pub fn with_output_path(mut self, output_path: impl Into<PathBuf>) -> Self {
        self.output_path = Some(output_path.into());
        self
    }

    pub fn with_quality(mut self, quality: Quality) -> Self {
        self.quality = Some(quality);
        self
    }

    pub fn with_codec(mut self, codec: impl Into<String>) -> Self {
        self.codec = Some(codec.into());
        self
    }
}

/// A fully validated job handed to an engine.
///
/// `output_path` is the temporary path; the dispatcher owns the final
/// rename so engines never touch the real destination.
#[derive(Debug, Clone)]
pub struct ConversionPlan {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub format: OutputFormat,
    pub quality: Quality,
    pub codec: Option<String>,
    /// Target keeps every frame of a multi-frame input; otherwise the
    /// engine takes the first frame only.
    pub supports_multiframe: bool,
}

/// Result of a successful conversion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionOutcome {
    /// Final output path.
    pub output_path: PathBuf,
    /// Output file size in bytes.
    pub output_size_bytes: u64,
    /// Wall-clock conversion duration in milliseconds.
    pub duration_ms: u64,
    /// Input format as inferred from the input extension.
    pub input_format: String,
    /// Canonical name of the output format.
    pub output_format: String,
}

/// Progress update emitted while an ffmpeg conversion runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionProgress {
    /// Source time processed so far, in seconds.
    pub time_secs: f64,
    /// Processing speed as reported by the encoder (e.g. "1.5x").
    pub speed: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::FormatClass;

    #[test]
    fn test_request_builder() {
        let request = ConversionRequest::new(
            "/tmp/in.png",
            FormatClass::Image,
            FormatToken::Name("jpeg".to_string()),
        )
        .with_output_path("/tmp/out.jpg")
        .with_quality(Quality::Image(90));

        assert_eq!(request.output_path, Some(PathBuf::from("/tmp/out.jpg")));
        assert_eq!(request.quality, Some(Quality::Image(90)));
        assert!(request.codec.is_none());
    }
}
