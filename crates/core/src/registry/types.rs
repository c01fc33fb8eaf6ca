//! Format and quality types for the registry.

use serde::{Deserialize, Serialize};

/// Raster/document output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageFormat {
    /// JPEG (lossy)
    Jpeg,
    /// Portable Network Graphics
    Png,
    /// Graphics Interchange Format (animated)
    Gif,
    /// WebP (lossless output)
    Webp,
    /// Windows Bitmap
    Bmp,
    /// Tagged Image File Format
    Tiff,
    /// Portable Document Format (one page per frame)
    Pdf,
    /// Windows Icon
    Ico,
    /// High Efficiency Image Container
    Heic,
    /// AV1 Image File Format
    Avif,
}

impl ImageFormat {
    /// All formats in menu order.
    pub const ALL: &'static [ImageFormat] = &[
        Self::Jpeg,
        Self::Png,
        Self::Gif,
        Self::Webp,
        Self::Bmp,
        Self::Tiff,
        Self::Pdf,
        Self::Ico,
        Self::Heic,
        Self::Avif,
    ];

    /// Returns the canonical name for this format.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Jpeg => "jpeg",
            Self::Png => "png",
            Self::Gif => "gif",
            Self::Webp => "webp",
            Self::Bmp => "bmp",
            Self::Tiff => "tiff",
            Self::Pdf => "pdf",
            Self::Ico => "ico",
            Self::Heic => "heic",
            Self::Avif => "avif",
        }
    }

    /// Known file extensions, first entry is the canonical one.
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Self::Jpeg => &["jpg", "jpeg"],
            Self::Png => &["png"],
            Self::Gif => &["gif"],
            Self::Webp => &["webp"],
            Self::Bmp => &["bmp"],
            Self::Tiff => &["tiff", "tif"],
            Self::Pdf => &["pdf"],
            Self::Ico => &["ico"],
            Self::Heic => &["heic", "heif"],
            Self::Avif => &["avif"],
        }
    }

    /// Returns the extension used when deriving a default output path.
    pub fn extension(&self) -> &'static str {
        self.extensions()[0]
    }

    /// Whether the encoder honors an integer quality setting.
    pub fn uses_quality(&self) -> bool {
        matches!(self, Self::Jpeg | Self::Webp | Self::Pdf | Self::Heic | Self::Avif)
    }

    /// Whether the output can hold every frame of a multi-frame input.
    ///
    /// Targets without multi-frame support receive the first frame only.
    pub fn supports_multiframe(&self) -> bool {
        matches!(self, Self::Gif | Self::Pdf)
    }

    /// Engine responsible for encoding this format.
    ///
    /// HEIC and AVIF have no in-process codec; they go through the ffmpeg
    /// engine in still-image mode.
    pub fn engine(&self) -> EngineKind {
        match self {
            Self::Heic | Self::Avif => EngineKind::Ffmpeg,
            _ => EngineKind::Raster,
        }
    }

    /// Mapping into the `image` crate's format enum, where one exists.
    pub fn codec_format(&self) -> Option<image::ImageFormat> {
        match self {
            Self::Jpeg => Some(image::ImageFormat::Jpeg),
            Self::Png => Some(image::ImageFormat::Png),
            Self::Gif => Some(image::ImageFormat::Gif),
            Self::Webp => Some(image::ImageFormat::WebP),
            Self::Bmp => Some(image::ImageFormat::Bmp),
            Self::Tiff => Some(image::ImageFormat::Tiff),
            Self::Ico => Some(image::ImageFormat::Ico),
            Self::Pdf | Self::Heic | Self::Avif => None,
        }
    }
}

/// Video container output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VideoFormat {
    /// MPEG-4 Part 14
    Mp4,
    /// Audio Video Interleave
    Avi,
    /// QuickTime
    Mov,
    /// Matroska
    Mkv,
    /// WebM
    Webm,
    /// Flash Video
    Flv,
    /// Windows Media Video
    Wmv,
    /// MPEG-4 (Apple variant)
    M4v,
    /// 3GPP
    #[serde(rename = "3gp")]
    ThreeGp,
    /// Ogg Video
    Ogv,
}

impl VideoFormat {
    /// All formats in menu order.
    pub const ALL: &'static [VideoFormat] = &[
        Self::Mp4,
        Self::Avi,
        Self::Mov,
        Self::Mkv,
        Self::Webm,
        Self::Flv,
        Self::Wmv,
        Self::M4v,
        Self::ThreeGp,
        Self::Ogv,
    ];

    /// Returns the canonical name for this format.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Mp4 => "mp4",
            Self::Avi => "avi",
            Self::Mov => "mov",
            Self::Mkv => "mkv",
            Self::Webm => "webm",
            Self::Flv => "flv",
            Self::Wmv => "wmv",
            Self::M4v => "m4v",
            Self::ThreeGp => "3gp",
            Self::Ogv => "ogv",
        }
    }

    /// Known file extensions, first entry is the canonical one.
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Self::Mp4 => &["mp4"],
            Self::Avi => &["avi"],
            Self::Mov => &["mov"],
            Self::Mkv => &["mkv"],
            Self::Webm => &["webm"],
            Self::Flv => &["flv"],
            Self::Wmv => &["wmv"],
            Self::M4v => &["m4v"],
            Self::ThreeGp => &["3gp"],
            Self::Ogv => &["ogv"],
        }
    }

    /// Returns the extension used when deriving a default output path.
    pub fn extension(&self) -> &'static str {
        self.extensions()[0]
    }

    /// Default ffmpeg video codec for this container, if one is pinned.
    ///
    /// Containers without an entry rely on ffmpeg's own per-muxer default.
    pub fn default_codec(&self) -> Option<&'static str> {
        match self {
            Self::Mp4 | Self::Mkv => Some("libx264"),
            Self::Webm => Some("libvpx-vp9"),
            _ => None,
        }
    }
}

/// Either class of output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OutputFormat {
    Image(ImageFormat),
    Video(VideoFormat),
}

impl OutputFormat {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Image(f) => f.name(),
            Self::Video(f) => f.name(),
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Image(f) => f.extension(),
            Self::Video(f) => f.extension(),
        }
    }

    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Self::Image(f) => f.extensions(),
            Self::Video(f) => f.extensions(),
        }
    }

    pub fn class(&self) -> FormatClass {
        match self {
            Self::Image(_) => FormatClass::Image,
            Self::Video(_) => FormatClass::Video,
        }
    }
}

/// Format class, selected by the operator before picking a format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormatClass {
    Image,
    Video,
}

impl FormatClass {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
        }
    }
}

/// Engine responsible for a conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineKind {
    /// In-process codecs (`image` crate plus the PDF writer).
    Raster,
    /// External ffmpeg subprocess.
    Ffmpeg,
}

/// Encoding-effort/size tradeoff for video targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VideoPreset {
    /// Faster encode, larger file (crf 28, preset fast).
    Low,
    /// Balanced (crf 23, preset medium).
    Medium,
    /// Slower encode, smaller file (crf 18, preset slow).
    High,
    /// Stream copy, no re-encoding.
    Copy,
}

impl VideoPreset {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Copy => "copy",
        }
    }

    /// CRF and encoder speed preset, `None` for stream copy.
    pub fn crf_and_speed(&self) -> Option<(u8, &'static str)> {
        match self {
            Self::Low => Some((28, "fast")),
            Self::Medium => Some((23, "medium")),
            Self::High => Some((18, "slow")),
            Self::Copy => None,
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            "copy" => Some(Self::Copy),
            _ => None,
        }
    }
}

/// Quality setting, tagged by format class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quality {
    /// Integer compression quality for image targets (valid range 1-100).
    Image(u8),
    /// Named preset for video targets.
    Video(VideoPreset),
}
