//! Format descriptors and the registry that resolves tokens to them.

use super::error::RegistryError;
use super::token::FormatToken;
use super::types::{
    EngineKind, FormatClass, ImageFormat, OutputFormat, Quality, VideoFormat, VideoPreset,
};

/// Immutable description of one supported output format.
#[derive(Debug, Clone)]
pub struct FormatDescriptor {
    /// Canonical output format.
    pub format: OutputFormat,
    /// Known file extensions, first entry is the canonical one.
    pub extensions: &'static [&'static str],
    /// Quality applied when the request leaves it unset.
    pub default_quality: Quality,
    /// Whether the output can hold every frame of a multi-frame input.
    pub supports_multiframe: bool,
    /// Engine responsible for this format.
    pub engine: EngineKind,
}

/// Read-only mapping from format tokens to descriptors.
///
/// Built once at startup and handed to the dispatcher; there is no
/// mutation after construction.
#[derive(Debug, Clone)]
pub struct FormatRegistry {
    image: Vec<FormatDescriptor>,
    video: Vec<FormatDescriptor>,
}

impl FormatRegistry {
    /// Builds the registry with the stock defaults (image quality 85,
    /// video preset medium).
    pub fn new() -> Self {
        Self::with_defaults(85, VideoPreset::Medium)
    }

    /// Builds the registry with configured default qualities.
    pub fn with_defaults(image_quality: u8, video_preset: VideoPreset) -> Self {
        let image = ImageFormat::ALL
            .iter()
            .map(|f| FormatDescriptor {
                format: OutputFormat::Image(*f),
                extensions: f.extensions(),
                default_quality: Quality::Image(image_quality),
                supports_multiframe: f.supports_multiframe(),
                engine: f.engine(),
            })
            .collect();

        let video = VideoFormat::ALL
            .iter()
            .map(|f| FormatDescriptor {
                format: OutputFormat::Video(*f),
                extensions: f.extensions(),
                default_quality: Quality::Video(video_preset),
                supports_multiframe: true,
                engine: EngineKind::Ffmpeg,
            })
            .collect();

        Self { image, video }
    }

    /// Descriptors of one class, in menu order.
    pub fn formats(&self, class: FormatClass) -> &[FormatDescriptor] {
        match class {
            FormatClass::Image => &self.image,
            FormatClass::Video => &self.video,
        }
    }

    /// Resolves a token against one class's table.
    ///
    /// Names match canonical names and extensions case-insensitively;
    /// indexes are 1-based positions in the menu list.
    pub fn resolve(
        &self,
        class: FormatClass,
        token: &FormatToken,
    ) -> Result<&FormatDescriptor, RegistryError> {
        let table = self.formats(class);
        match token {
            FormatToken::Name(name) => table
                .iter()
                .find(|d| d.format.name() == name.as_str() || d.extensions.contains(&name.as_str()))
                .ok_or_else(|| RegistryError::unsupported(name.clone(), self.supported_names(class))),
            FormatToken::Index(index) => {
                if *index >= 1 && *index <= table.len() {
                    Ok(&table[*index - 1])
                } else {
                    Err(RegistryError::unsupported(
                        index.to_string(),
                        self.supported_names(class),
                    ))
                }
            }
        }
    }

    fn supported_names(&self, class: FormatClass) -> String {
        self.formats(class)
            .iter()
            .map(|d| d.format.name())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_by_name() {
        let registry = FormatRegistry::new();
        let descriptor = registry
            .resolve(FormatClass::Image, &FormatToken::Name("png".to_string()))
            .unwrap();
        assert_eq!(descriptor.format, OutputFormat::Image(ImageFormat::Png));
    }

    #[test]
    fn test_resolve_by_alias() {
        let registry = FormatRegistry::new();
        let descriptor = registry
            .resolve(FormatClass::Image, &FormatToken::Name("jpg".to_string()))
            .unwrap();
        assert_eq!(descriptor.format, OutputFormat::Image(ImageFormat::Jpeg));

        let descriptor = registry
            .resolve(FormatClass::Image, &FormatToken::Name("tif".to_string()))
            .unwrap();
        assert_eq!(descriptor.format, OutputFormat::Image(ImageFormat::Tiff));
    }

    #[test]
    fn test_resolve_by_index() {
        let registry = FormatRegistry::new();
        // Menu order: 1-based, jpeg first.
        let descriptor = registry
            .resolve(FormatClass::Image, &FormatToken::Index(1))
            .unwrap();
        assert_eq!(descriptor.format, OutputFormat::Image(ImageFormat::Jpeg));

        let descriptor = registry
            .resolve(FormatClass::Video, &FormatToken::Index(5))
            .unwrap();
        assert_eq!(descriptor.format, OutputFormat::Video(VideoFormat::Webm));
    }

    #[test]
    fn test_resolve_index_out_of_range() {
        let registry = FormatRegistry::new();
        assert!(registry
            .resolve(FormatClass::Image, &FormatToken::Index(0))
            .is_err());
        assert!(registry
            .resolve(FormatClass::Image, &FormatToken::Index(11))
            .is_err());
    }

    #[test]
    fn test_resolve_unknown_name() {
        let registry = FormatRegistry::new();
        let err = registry
            .resolve(FormatClass::Image, &FormatToken::Name("xyz123".to_string()))
            .unwrap_err();
        assert!(matches!(err, RegistryError::UnsupportedFormat { .. }));
        let message = err.to_string();
        assert!(message.contains("xyz123"));
        assert!(message.contains("jpeg"));
    }

    #[test]
    fn test_video_names_do_not_resolve_as_images() {
        let registry = FormatRegistry::new();
        assert!(registry
            .resolve(FormatClass::Image, &FormatToken::Name("mp4".to_string()))
            .is_err());
    }

    #[test]
    fn test_configured_defaults() {
        let registry = FormatRegistry::with_defaults(70, VideoPreset::High);
        let image = registry
            .resolve(FormatClass::Image, &FormatToken::Name("jpeg".to_string()))
            .unwrap();
        assert_eq!(image.default_quality, Quality::Image(70));

        let video = registry
            .resolve(FormatClass::Video, &FormatToken::Name("mkv".to_string()))
            .unwrap();
        assert_eq!(video.default_quality, Quality::Video(VideoPreset::High));
    }

    #[test]
    fn test_heic_routes_to_ffmpeg() {
        let registry = FormatRegistry::new();
        let descriptor = registry
            .resolve(FormatClass::Image, &FormatToken::Name("heif".to_string()))
            .unwrap();
        assert_eq!(descriptor.engine, EngineKind::Ffmpeg);
        assert!(!descriptor.supports_multiframe);
    }
}
