//! PDF assembly for image-to-PDF conversion.
//!
//! Each frame becomes one page embedding the frame as a DCTDecode (JPEG)
//! image XObject, scaled at one point per pixel.

use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use std::path::Path;

use super::error::ConvertError;

pub(crate) fn write_pdf(
    frames: &[DynamicImage],
    quality: u8,
    path: &Path,
) -> Result<(), ConvertError> {
    if frames.is_empty() {
        return Err(ConvertError::engine("input has no frames"));
    }

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let mut kids = Vec::with_capacity(frames.len());

    for frame in frames {
        let rgb = frame.to_rgb8();
        let (width, height) = rgb.dimensions();

        let mut jpeg = Vec::new();
        let encoder = JpegEncoder::new_with_quality(&mut jpeg, quality);
        rgb.write_with_encoder(encoder)
            .map_err(|e| ConvertError::engine(e.to_string()))?;

        let image_id = doc.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => Object::Integer(width as i64),
                "Height" => Object::Integer(height as i64),
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => Object::Integer(8),
                "Filter" => "DCTDecode",
            },
            jpeg,
        ));

        let content = Content {
            operations: vec![
                Operation::new("q", vec![]),
                Operation::new(
                    "cm",
                    vec![
                        Object::Integer(width as i64),
                        Object::Integer(0),
                        Object::Integer(0),
                        Object::Integer(height as i64),
                        Object::Integer(0),
                        Object::Integer(0),
                    ],
                ),
                Operation::new("Do", vec!["Im0".into()]),
                Operation::new("Q", vec![]),
            ],
        };
        let encoded = content
            .encode()
            .map_err(|e| ConvertError::engine(e.to_string()))?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(width as i64),
                Object::Integer(height as i64),
            ],
            "Contents" => content_id,
            "Resources" => dictionary! {
                "XObject" => dictionary! { "Im0" => image_id },
            },
        });
        kids.push(Object::Reference(page_id));
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => Object::Integer(count),
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    doc.save(path)
        .map_err(|e| ConvertError::engine(format!("failed to write PDF: {e}")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, RgbaImage};
    use tempfile::TempDir;

    fn solid_frame(width: u32, height: u32, rgba: [u8; 4]) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, image::Rgba(rgba)))
    }

    #[test]
    fn test_write_pdf_page_per_frame() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("out.pdf");
        let frames = vec![
            solid_frame(8, 8, [255, 0, 0, 255]),
            solid_frame(8, 8, [0, 255, 0, 255]),
            solid_frame(8, 8, [0, 0, 255, 255]),
        ];

        write_pdf(&frames, 85, &path).unwrap();

        let doc = Document::load(&path).unwrap();
        assert_eq!(doc.get_pages().len(), 3);
    }

    #[test]
    fn test_write_pdf_single_frame() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("single.pdf");

        write_pdf(&[solid_frame(16, 9, [1, 2, 3, 255])], 85, &path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"%PDF-"));
        let doc = Document::load(&path).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }

    #[test]
    fn test_write_pdf_no_frames_fails() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("none.pdf");
        let err = write_pdf(&[], 85, &path).unwrap_err();
        assert!(matches!(err, ConvertError::Engine { .. }));
        assert!(!path.exists());
    }
}
