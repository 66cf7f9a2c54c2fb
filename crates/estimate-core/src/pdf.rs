//! Single-page PDF assembly from a rasterized form
//!
//! The page adapter rasterizes the printable region to a JPEG (at 2x for
//! crispness); this module embeds that JPEG as a `DCTDecode` image XObject
//! on one page, scaled to fit inside the margins and centered.

use crate::error::EstimateError;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use image::codecs::jpeg::JpegDecoder;
use image::{ImageDecoder, ImageFormat};
use lopdf::{dictionary, Document, Object, Stream, StringFormat};
use serde::{Deserialize, Serialize};
use std::io::Cursor;

/// PDF points per inch
pub const POINTS_PER_INCH: f64 = 72.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageFormat {
    Letter,
    Legal,
    A4,
}

impl PageFormat {
    /// Portrait (width, height) in points
    pub fn size_pt(self) -> (f64, f64) {
        match self {
            PageFormat::Letter => (612.0, 792.0),
            PageFormat::Legal => (612.0, 1008.0),
            PageFormat::A4 => (595.28, 841.89),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Portrait,
    Landscape,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfOptions {
    pub format: PageFormat,
    pub orientation: Orientation,
    /// Margins in inches: top, right, bottom, left
    pub margins_in: [f64; 4],
    /// Rasterization oversampling factor
    pub scale: f64,
    /// JPEG quality passed to the canvas encoder (0..=1)
    pub image_quality: f64,
}

impl Default for PdfOptions {
    fn default() -> Self {
        Self {
            format: PageFormat::Letter,
            orientation: Orientation::Portrait,
            margins_in: [0.3, 0.3, 0.3, 0.3],
            scale: 2.0,
            image_quality: 0.98,
        }
    }
}

impl PdfOptions {
    /// Page (width, height) in points, honoring orientation
    pub fn page_size_pt(&self) -> (f64, f64) {
        let (w, h) = self.format.size_pt();
        match self.orientation {
            Orientation::Portrait => (w, h),
            Orientation::Landscape => (h, w),
        }
    }
}

/// Where the image lands on the page, in points from the bottom-left corner
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Scale an image to fit the printable area, keeping its aspect ratio, and
/// center it there.
pub fn fit_to_page(
    image_width: u32,
    image_height: u32,
    options: &PdfOptions,
) -> Result<Placement, EstimateError> {
    if image_width == 0 || image_height == 0 {
        return Err(EstimateError::Raster("image has zero size".into()));
    }

    let (page_w, page_h) = options.page_size_pt();
    let [top, right, bottom, left] = options.margins_in.map(|m| m.max(0.0) * POINTS_PER_INCH);
    let area_w = page_w - left - right;
    let area_h = page_h - top - bottom;
    if area_w <= 0.0 || area_h <= 0.0 {
        return Err(EstimateError::Pdf("margins leave no printable area".into()));
    }

    let (iw, ih) = (image_width as f64, image_height as f64);
    let scale = (area_w / iw).min(area_h / ih);
    let width = iw * scale;
    let height = ih * scale;

    Ok(Placement {
        x: left + (area_w - width) / 2.0,
        y: bottom + (area_h - height) / 2.0,
        width,
        height,
    })
}

/// A JPEG produced by the rasterizer
#[derive(Debug, Clone, PartialEq)]
pub struct RasterImage {
    pub jpeg: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub components: u8,
}

impl RasterImage {
    pub fn from_jpeg(jpeg: Vec<u8>) -> Result<Self, EstimateError> {
        let info = jpeg_info(&jpeg)?;
        Ok(Self {
            jpeg,
            width: info.width,
            height: info.height,
            components: info.components,
        })
    }

    /// Accepts the `data:image/jpeg;base64,...` string a canvas produces
    pub fn from_data_url(url: &str) -> Result<Self, EstimateError> {
        Self::from_jpeg(decode_data_url(url)?)
    }

    fn color_space(&self) -> &'static str {
        match self.components {
            1 => "DeviceGray",
            4 => "DeviceCMYK",
            _ => "DeviceRGB",
        }
    }
}

/// Decode a base64 `data:` URL into its payload bytes
pub fn decode_data_url(url: &str) -> Result<Vec<u8>, EstimateError> {
    let rest = url
        .strip_prefix("data:")
        .ok_or_else(|| EstimateError::Raster("not a data URL".into()))?;
    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| EstimateError::Raster("data URL has no payload".into()))?;
    if !meta.ends_with(";base64") {
        return Err(EstimateError::Raster(format!(
            "unsupported data URL encoding: {}",
            meta
        )));
    }
    BASE64
        .decode(payload.trim())
        .map_err(|e| EstimateError::Raster(format!("invalid base64: {}", e)))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JpegInfo {
    pub width: u32,
    pub height: u32,
    pub components: u8,
}

/// Read the dimensions and component count from a JPEG header. Only the
/// headers are parsed; no scanline is decoded.
pub fn jpeg_info(bytes: &[u8]) -> Result<JpegInfo, EstimateError> {
    match image::guess_format(bytes) {
        Ok(ImageFormat::Jpeg) => {}
        Ok(other) => {
            return Err(EstimateError::Raster(format!(
                "expected a JPEG, got {:?}",
                other
            )))
        }
        Err(e) => {
            return Err(EstimateError::Raster(format!(
                "unrecognized image data: {}",
                e
            )))
        }
    }

    let decoder = JpegDecoder::new(Cursor::new(bytes))
        .map_err(|e| EstimateError::Raster(format!("invalid JPEG header: {}", e)))?;
    let (width, height) = decoder.dimensions();
    Ok(JpegInfo {
        width,
        height,
        components: decoder.color_type().channel_count(),
    })
}

/// PDF text string: plain bytes for ASCII, UTF-16BE with a byte-order mark
/// otherwise
fn text_string(text: &str) -> Object {
    if text.is_ascii() {
        return Object::String(text.as_bytes().to_vec(), StringFormat::Literal);
    }
    let mut bytes = vec![0xFE, 0xFF];
    for unit in text.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    Object::String(bytes, StringFormat::Hexadecimal)
}

/// Build a one-page PDF with the raster drawn at its fitted placement
pub fn assemble_pdf(
    image: &RasterImage,
    options: &PdfOptions,
    title: Option<&str>,
) -> Result<Vec<u8>, EstimateError> {
    let placement = fit_to_page(image.width, image.height, options)?;
    let (page_w, page_h) = options.page_size_pt();

    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();

    let image_id = doc.add_object(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => image.width as i64,
            "Height" => image.height as i64,
            "ColorSpace" => image.color_space(),
            "BitsPerComponent" => 8,
            "Filter" => "DCTDecode",
        },
        image.jpeg.clone(),
    ));

    let content = format!(
        "q {:.4} 0 0 {:.4} {:.4} {:.4} cm /Im0 Do Q",
        placement.width, placement.height, placement.x, placement.y
    );
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![
            0.into(),
            0.into(),
            Object::Real(page_w as f32),
            Object::Real(page_h as f32),
        ],
        "Contents" => content_id,
        "Resources" => dictionary! {
            "XObject" => dictionary! {
                "Im0" => image_id,
            },
        },
    });

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![Object::Reference(page_id)],
            "Count" => 1,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", Object::Reference(catalog_id));

    let mut info = dictionary! {
        "Producer" => Object::String(
            format!("estimate-core {}", env!("CARGO_PKG_VERSION")).into_bytes(),
            StringFormat::Literal,
        ),
    };
    if let Some(title) = title {
        info.set("Title", text_string(title));
    }
    let info_id = doc.add_object(Object::Dictionary(info));
    doc.trailer.set("Info", Object::Reference(info_id));

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)
        .map_err(|e| EstimateError::Pdf(format!("Failed to save PDF: {}", e)))?;

    tracing::debug!(
        bytes = buffer.len(),
        width = image.width,
        height = image.height,
        "assembled estimate PDF"
    );

    Ok(buffer)
}
