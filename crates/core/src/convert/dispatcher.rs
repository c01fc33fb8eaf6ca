//! Conversion dispatcher: validates requests, fills defaults, and
//! delegates the byte-level work to an engine.

use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::config::EngineConfig;
use super::error::ConvertError;
use super::ffmpeg::FfmpegEngine;
use super::raster::RasterEngine;
use super::traits::Engine;
use super::types::{ConversionOutcome, ConversionPlan, ConversionProgress, ConversionRequest};
use crate::registry::{EngineKind, FormatClass, FormatDescriptor, FormatRegistry, Quality};

/// Turns validated conversion requests into completed output files.
///
/// Holds the injected registry and one instance of each engine. A request
/// is processed start-to-finish before the next begins; this layer performs
/// no retries and leaves no partial output behind on failure.
pub struct Dispatcher {
    registry: FormatRegistry,
    raster: RasterEngine,
    ffmpeg: FfmpegEngine,
}

impl Dispatcher {
    /// Creates a dispatcher over the given registry and engine configuration.
    pub fn new(registry: FormatRegistry, engine_config: EngineConfig) -> Self {
        Self {
            registry,
            raster: RasterEngine::new(),
            ffmpeg: FfmpegEngine::new(engine_config),
        }
    }

    /// The registry this dispatcher resolves targets against.
    pub fn registry(&self) -> &FormatRegistry {
        &self.registry
    }

    /// Checks that the ffmpeg engine is usable.
    ///
    /// The shell calls this once before offering video conversions so a
    /// missing binary surfaces up front instead of mid-conversion.
    pub async fn validate_ffmpeg(&self) -> Result<(), ConvertError> {
        self.ffmpeg.validate().await
    }

    /// Converts according to the request, returning the final output path
    /// and conversion stats.
    pub async fn convert(
        &self,
        request: ConversionRequest,
    ) -> Result<ConversionOutcome, ConvertError> {
        self.run(request, None).await
    }

    /// Converts with progress updates sent over the channel.
    pub async fn convert_with_progress(
        &self,
        request: ConversionRequest,
        progress_tx: mpsc::Sender<ConversionProgress>,
    ) -> Result<ConversionOutcome, ConvertError> {
        self.run(request, Some(progress_tx)).await
    }

    async fn run(
        &self,
        request: ConversionRequest,
        progress_tx: Option<mpsc::Sender<ConversionProgress>>,
    ) -> Result<ConversionOutcome, ConvertError> {
        let start = Instant::now();

        // Input must exist before anything is created on disk.
        let input_meta = tokio::fs::metadata(&request.input_path).await.map_err(|_| {
            ConvertError::InputNotFound {
                path: request.input_path.clone(),
            }
        })?;
        if !input_meta.is_file() {
            return Err(ConvertError::InputNotFound {
                path: request.input_path.clone(),
            });
        }

        let descriptor = self.registry.resolve(request.class, &request.target)?;

        // An explicit output path always wins over the derived default.
        let output_path = request.output_path.clone().unwrap_or_else(|| {
            request
                .input_path
                .with_extension(descriptor.format.extension())
        });

        if let Some(parent) = output_path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| ConvertError::OutputPath {
                        path: output_path.clone(),
                        source: e,
                    })?;
            }
        }

        let quality = validate_quality(descriptor, request.quality)?;

        // Engines write to a sibling temporary path; the rename below makes
        // placement atomic so a failure never leaves a partial output file.
        let temp_path = temp_output_path(&output_path);
        let plan = ConversionPlan {
            input_path: request.input_path.clone(),
            output_path: temp_path.clone(),
            format: descriptor.format,
            quality,
            codec: request.codec.clone(),
            supports_multiframe: descriptor.supports_multiframe,
        };

        let engine: &dyn Engine = match descriptor.engine {
            EngineKind::Raster => &self.raster,
            EngineKind::Ffmpeg => &self.ffmpeg,
        };

        info!(
            input = %request.input_path.display(),
            output = %output_path.display(),
            format = descriptor.format.name(),
            engine = engine.name(),
            "converting"
        );

        let result = match progress_tx {
            Some(tx) => engine.convert_with_progress(&plan, tx).await,
            None => engine.convert(&plan).await,
        };

        if let Err(e) = result {
            if let Err(cleanup) = tokio::fs::remove_file(&temp_path).await {
                if cleanup.kind() != std::io::ErrorKind::NotFound {
                    warn!(
                        path = %temp_path.display(),
                        error = %cleanup,
                        "failed to remove temporary output"
                    );
                }
            }
            return Err(e);
        }

        tokio::fs::rename(&temp_path, &output_path)
            .await
            .map_err(|e| ConvertError::OutputPath {
                path: output_path.clone(),
                source: e,
            })?;

        let output_meta = tokio::fs::metadata(&output_path).await?;
        let input_format = request
            .input_path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_else(|| "unknown".to_string());

        debug!(
            duration_ms = start.elapsed().as_millis() as u64,
            size = output_meta.len(),
            "conversion complete"
        );

        Ok(ConversionOutcome {
            output_path,
            output_size_bytes: output_meta.len(),
            duration_ms: start.elapsed().as_millis() as u64,
            input_format,
            output_format: descriptor.format.name().to_string(),
        })
    }
}

/// Validates the requested quality against the target's class, or falls
/// back to the registry default. Out-of-range values fail rather than
/// being clamped so operator mistakes stay visible.
fn validate_quality(
    descriptor: &FormatDescriptor,
    requested: Option<Quality>,
) -> Result<Quality, ConvertError> {
    let quality = match requested {
        None => descriptor.default_quality,
        Some(quality) => quality,
    };

    match (descriptor.format.class(), quality) {
        (FormatClass::Image, Quality::Image(value)) => {
            if (1..=100).contains(&value) {
                Ok(quality)
            } else {
                Err(ConvertError::invalid_quality(format!(
                    "image quality must be between 1 and 100, got {}",
                    value
                )))
            }
        }
        (FormatClass::Video, Quality::Video(_)) => Ok(quality),
        (class, _) => Err(ConvertError::invalid_quality(format!(
            "quality does not apply to {} target '{}'",
            class.label(),
            descriptor.format.name()
        ))),
    }
}

/// Sibling temporary path sharing the final path's extension so
/// extension-sniffing engines pick the right container.
fn temp_output_path(output_path: &Path) -> PathBuf {
    let stem = output_path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "output".to_string());
    let name = match output_path.extension() {
        Some(ext) => format!(".{}.recast-tmp.{}", stem, ext.to_string_lossy()),
        None => format!(".{}.recast-tmp", stem),
    };
    output_path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{FormatClass, FormatToken, VideoPreset};

    fn image_descriptor(name: &str) -> FormatDescriptor {
        FormatRegistry::new()
            .resolve(FormatClass::Image, &FormatToken::Name(name.to_string()))
            .unwrap()
            .clone()
    }

    fn video_descriptor(name: &str) -> FormatDescriptor {
        FormatRegistry::new()
            .resolve(FormatClass::Video, &FormatToken::Name(name.to_string()))
            .unwrap()
            .clone()
    }

    #[test]
    fn test_validate_quality_defaults() {
        let quality = validate_quality(&image_descriptor("jpeg"), None).unwrap();
        assert_eq!(quality, Quality::Image(85));

        let quality = validate_quality(&video_descriptor("mp4"), None).unwrap();
        assert_eq!(quality, Quality::Video(VideoPreset::Medium));
    }

    #[test]
    fn test_validate_quality_range() {
        let descriptor = image_descriptor("jpeg");
        assert!(validate_quality(&descriptor, Some(Quality::Image(1))).is_ok());
        assert!(validate_quality(&descriptor, Some(Quality::Image(100))).is_ok());
        assert!(matches!(
            validate_quality(&descriptor, Some(Quality::Image(0))),
            Err(ConvertError::InvalidQuality { .. })
        ));
        assert!(matches!(
            validate_quality(&descriptor, Some(Quality::Image(101))),
            Err(ConvertError::InvalidQuality { .. })
        ));
    }

    #[test]
    fn test_validate_quality_class_mismatch() {
        assert!(matches!(
            validate_quality(
                &image_descriptor("png"),
                Some(Quality::Video(VideoPreset::High))
            ),
            Err(ConvertError::InvalidQuality { .. })
        ));
        assert!(matches!(
            validate_quality(&video_descriptor("mkv"), Some(Quality::Image(50))),
            Err(ConvertError::InvalidQuality { .. })
        ));
    }

    #[test]
    fn test_temp_output_path() {
        let temp = temp_output_path(Path::new("/videos/clip.mp4"));
        assert_eq!(temp, PathBuf::from("/videos/.clip.recast-tmp.mp4"));

        let temp = temp_output_path(Path::new("noext"));
        assert_eq!(temp, PathBuf::from(".noext.recast-tmp"));
    }
}
