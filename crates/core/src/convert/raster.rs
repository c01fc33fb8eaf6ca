//! In-process raster conversion engine built on the `image` crate.

use async_trait::async_trait;
use image::codecs::gif::{GifDecoder, GifEncoder, Repeat};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::webp::WebPDecoder;
use image::{AnimationDecoder, DynamicImage, Frame, ImageReader};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tokio::sync::mpsc;

use super::error::ConvertError;
use super::pdf;
use super::traits::Engine;
use super::types::{ConversionPlan, ConversionProgress};
use crate::registry::{ImageFormat, OutputFormat, Quality};

/// Conversion engine for the raster formats the `image` crate covers,
/// plus PDF output. Decoding and encoding run on the blocking pool.
pub struct RasterEngine;

impl RasterEngine {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RasterEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Decoded source, either a single image or an expanded frame sequence.
enum DecodedInput {
    Still(DynamicImage),
    Animation(Vec<Frame>),
}

fn codec_error(e: image::ImageError) -> ConvertError {
    ConvertError::engine(e.to_string())
}

/// Decodes the input, expanding frames only when the target can hold them.
///
/// Single-frame targets take the plain decode path, which yields the first
/// frame of an animated source.
fn decode_input(path: &Path, want_frames: bool) -> Result<DecodedInput, ConvertError> {
    let reader = ImageReader::open(path)?.with_guessed_format()?;
    let format = reader.format();

    if want_frames {
        match format {
            Some(image::ImageFormat::Gif) => {
                let decoder =
                    GifDecoder::new(BufReader::new(File::open(path)?)).map_err(codec_error)?;
                let frames = decoder.into_frames().collect_frames().map_err(codec_error)?;
                return Ok(DecodedInput::Animation(frames));
            }
            Some(image::ImageFormat::WebP) => {
                let decoder =
                    WebPDecoder::new(BufReader::new(File::open(path)?)).map_err(codec_error)?;
                if decoder.has_animation() {
                    let frames = decoder.into_frames().collect_frames().map_err(codec_error)?;
                    return Ok(DecodedInput::Animation(frames));
                }
            }
            _ => {}
        }
    }

    Ok(DecodedInput::Still(reader.decode().map_err(codec_error)?))
}

fn encode_still(
    img: &DynamicImage,
    format: ImageFormat,
    quality: u8,
    path: &Path,
) -> Result<(), ConvertError> {
    match format {
        ImageFormat::Jpeg => {
            let file = File::create(path)?;
            let mut writer = BufWriter::new(file);
            let encoder = JpegEncoder::new_with_quality(&mut writer, quality);
            // JPEG has no alpha channel.
            img.to_rgb8()
                .write_with_encoder(encoder)
                .map_err(codec_error)?;
            writer.flush()?;
        }
        other => {
            let codec = other
                .codec_format()
                .ok_or_else(|| ConvertError::engine(format!("no raster codec for {}", other.name())))?;
            img.save_with_format(path, codec).map_err(codec_error)?;
        }
    }
    Ok(())
}

fn encode_gif_animation(frames: Vec<Frame>, path: &Path) -> Result<(), ConvertError> {
    let file = File::create(path)?;
    let mut encoder = GifEncoder::new(BufWriter::new(file));
    encoder.set_repeat(Repeat::Infinite).map_err(codec_error)?;
    encoder.encode_frames(frames).map_err(codec_error)?;
    Ok(())
}

fn first_frame(frames: Vec<Frame>) -> Result<DynamicImage, ConvertError> {
    frames
        .into_iter()
        .next()
        .map(|f| DynamicImage::ImageRgba8(f.into_buffer()))
        .ok_or_else(|| ConvertError::engine("input has no frames"))
}

fn convert_blocking(plan: ConversionPlan) -> Result<(), ConvertError> {
    let format = match plan.format {
        OutputFormat::Image(format) => format,
        OutputFormat::Video(_) => {
            return Err(ConvertError::engine(
                "raster engine cannot encode video containers",
            ))
        }
    };
    let quality = match plan.quality {
        Quality::Image(quality) => quality,
        Quality::Video(_) => {
            return Err(ConvertError::engine(
                "quality class does not match target format",
            ))
        }
    };

    let decoded = decode_input(&plan.input_path, plan.supports_multiframe)?;

    match decoded {
        DecodedInput::Still(img) => match format {
            ImageFormat::Pdf => pdf::write_pdf(std::slice::from_ref(&img), quality, &plan.output_path),
            _ => encode_still(&img, format, quality, &plan.output_path),
        },
        DecodedInput::Animation(frames) => match format {
            ImageFormat::Pdf => {
                let images: Vec<DynamicImage> = frames
                    .into_iter()
                    .map(|f| DynamicImage::ImageRgba8(f.into_buffer()))
                    .collect();
                pdf::write_pdf(&images, quality, &plan.output_path)
            }
            ImageFormat::Gif => encode_gif_animation(frames, &plan.output_path),
            _ => encode_still(&first_frame(frames)?, format, quality, &plan.output_path),
        },
    }
}

#[async_trait]
impl Engine for RasterEngine {
    fn name(&self) -> &str {
        "raster"
    }

    async fn validate(&self) -> Result<(), ConvertError> {
        // In-process codecs, nothing external to probe.
        Ok(())
    }

    async fn convert(&self, plan: &ConversionPlan) -> Result<(), ConvertError> {
        let plan = plan.clone();
        tokio::task::spawn_blocking(move || convert_blocking(plan))
            .await
            .map_err(|e| ConvertError::engine(format!("raster task failed: {e}")))?
    }

    async fn convert_with_progress(
        &self,
        plan: &ConversionPlan,
        _progress_tx: mpsc::Sender<ConversionProgress>,
    ) -> Result<(), ConvertError> {
        // Raster conversions finish in well under a progress interval.
        self.convert(plan).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Delay, RgbaImage};
    use std::time::Duration;
    use tempfile::TempDir;

    fn plan(input: &Path, output: &Path, format: ImageFormat) -> ConversionPlan {
        ConversionPlan {
            input_path: input.to_path_buf(),
            output_path: output.to_path_buf(),
            format: OutputFormat::Image(format),
            quality: Quality::Image(85),
            codec: None,
            supports_multiframe: format.supports_multiframe(),
        }
    }

    fn write_png(path: &Path) {
        let img = RgbaImage::from_pixel(8, 8, image::Rgba([200, 40, 40, 255]));
        img.save_with_format(path, image::ImageFormat::Png).unwrap();
    }

    fn write_animated_gif(path: &Path, frame_count: u32) {
        let file = File::create(path).unwrap();
        let mut encoder = GifEncoder::new(BufWriter::new(file));
        let frames: Vec<Frame> = (0..frame_count)
            .map(|i| {
                let shade = (i * 60) as u8;
                let buffer = RgbaImage::from_pixel(8, 8, image::Rgba([shade, shade, shade, 255]));
                Frame::from_parts(
                    buffer,
                    0,
                    0,
                    Delay::from_saturating_duration(Duration::from_millis(100)),
                )
            })
            .collect();
        encoder.encode_frames(frames).unwrap();
    }

    #[tokio::test]
    async fn test_png_to_jpeg() {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("in.png");
        let output = temp.path().join("out.jpg");
        write_png(&input);

        RasterEngine::new()
            .convert(&plan(&input, &output, ImageFormat::Jpeg))
            .await
            .unwrap();

        let bytes = std::fs::read(&output).unwrap();
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
    }

    #[tokio::test]
    async fn test_png_to_bmp() {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("in.png");
        let output = temp.path().join("out.bmp");
        write_png(&input);

        RasterEngine::new()
            .convert(&plan(&input, &output, ImageFormat::Bmp))
            .await
            .unwrap();

        let bytes = std::fs::read(&output).unwrap();
        assert_eq!(&bytes[..2], b"BM");
    }

    #[tokio::test]
    async fn test_animated_gif_to_pdf_page_per_frame() {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("in.gif");
        let output = temp.path().join("out.pdf");
        write_animated_gif(&input, 3);

        RasterEngine::new()
            .convert(&plan(&input, &output, ImageFormat::Pdf))
            .await
            .unwrap();

        let doc = lopdf::Document::load(&output).unwrap();
        assert_eq!(doc.get_pages().len(), 3);
    }

    #[tokio::test]
    async fn test_animated_gif_to_png_takes_first_frame() {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("in.gif");
        let output = temp.path().join("out.png");
        write_animated_gif(&input, 3);

        RasterEngine::new()
            .convert(&plan(&input, &output, ImageFormat::Png))
            .await
            .unwrap();

        // Exactly one still image comes out.
        let img = image::open(&output).unwrap();
        assert_eq!(img.width(), 8);
        assert_eq!(img.height(), 8);
    }

    #[tokio::test]
    async fn test_corrupt_input_is_engine_error() {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("in.png");
        let output = temp.path().join("out.jpg");
        std::fs::write(&input, b"not an image at all").unwrap();

        let err = RasterEngine::new()
            .convert(&plan(&input, &output, ImageFormat::Jpeg))
            .await
            .unwrap_err();
        assert!(matches!(err, ConvertError::Engine { .. }));
        assert!(!output.exists());
    }
}
