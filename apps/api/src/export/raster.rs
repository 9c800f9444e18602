//! Raster exports: PNG, JPEG, and a single-page PDF wrapping the JPEG.
//!
//! The pixels come from a `PreviewCapture` of the rendered preview page, so
//! the output matches what the preview shows, omission rules included.

use std::io::Cursor;

use async_trait::async_trait;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use tracing::debug;

use crate::export::ExportError;

pub const PREVIEW_SELECTOR: &str = "#cv-preview";
pub const JPEG_QUALITY: u8 = 95;
const IMAGE_NAME: &[u8] = b"Im0";

/// Screenshots the `#cv-preview` element of a standalone HTML page.
#[async_trait]
pub trait PreviewCapture: Send + Sync {
    /// Returns PNG bytes captured at `scale` device pixels per CSS pixel.
    async fn capture(&self, page_html: &str, scale: f64) -> Result<Vec<u8>, ExportError>;
}

/// Decodes a capture and composites it onto opaque white.
pub fn flatten(png: &[u8]) -> Result<RgbImage, ExportError> {
    let rgba = image::load_from_memory(png)?.to_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(RgbImage::from_fn(width, height, |x, y| {
        let [r, g, b, a] = rgba.get_pixel(x, y).0;
        let alpha = u16::from(a);
        let blend = |c: u8| ((u16::from(c) * alpha + 255 * (255 - alpha)) / 255) as u8;
        Rgb([blend(r), blend(g), blend(b)])
    }))
}

pub fn encode_png(image: &RgbImage) -> Result<Vec<u8>, ExportError> {
    let mut buf = Vec::new();
    DynamicImage::ImageRgb8(image.clone()).write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)?;
    Ok(buf)
}

pub fn encode_jpeg(image: &RgbImage) -> Result<Vec<u8>, ExportError> {
    let mut buf = Vec::new();
    JpegEncoder::new_with_quality(&mut buf, JPEG_QUALITY).encode_image(image)?;
    Ok(buf)
}

/// Page size in points: one point per captured pixel, so the page is
/// landscape whenever the capture is wider than tall.
pub fn page_size(width_px: u32, height_px: u32) -> (i64, i64) {
    (i64::from(width_px), i64::from(height_px))
}

/// Wraps a baseline JPEG in a one-page PDF whose page is exactly the image.
pub fn pdf_from_jpeg(jpeg: &[u8], width_px: u32, height_px: u32) -> Result<Vec<u8>, ExportError> {
    let (w, h) = page_size(width_px, height_px);
    let mut doc = Document::with_version("1.4");
    let pages_id = doc.new_object_id();

    let image = Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => i64::from(width_px),
            "Height" => i64::from(height_px),
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
            "Filter" => "DCTDecode",
        },
        jpeg.to_vec(),
    )
    .with_compression(false);
    let image_id = doc.add_object(image);

    let content = Content {
        operations: vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![w.into(), 0.into(), 0.into(), h.into(), 0.into(), 0.into()],
            ),
            Operation::new("Do", vec![Object::Name(IMAGE_NAME.to_vec())]),
            Operation::new("Q", vec![]),
        ],
    };
    let encoded = content.encode().map_err(|e| ExportError::Encode(e.to_string()))?;
    let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![0.into(), 0.into(), w.into(), h.into()],
        "Contents" => content_id,
        "Resources" => dictionary! {
            "XObject" => dictionary! { "Im0" => image_id },
        },
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut out = Vec::new();
    doc.save_to(&mut out).map_err(|e| ExportError::Encode(e.to_string()))?;
    debug!(width_px, height_px, bytes = out.len(), "PDF assembled");
    Ok(out)
}
