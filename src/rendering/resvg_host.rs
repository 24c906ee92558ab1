use crate::error::HostError;
use crate::models::{DrawTarget, HostConfig};
use crate::rendering::Host;
use async_trait::async_trait;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::webp::WebPEncoder;
use image::ExtendedColorType;
use percent_encoding::percent_decode_str;
use resvg::usvg::{self, Transform};
use std::borrow::Cow;
use std::io::Cursor;
use std::sync::Arc;
use tiny_skia::Pixmap;

const SVG_MEDIA_TYPE: &str = "image/svg+xml";

/// Native rendering host: `usvg` decodes, `tiny-skia` pixmaps are the
/// drawing surfaces, and `png`/`image` encode the export.
///
/// Behaves like a browser canvas where it matters to callers: surfaces start
/// transparent, JPEG flattens transparency onto black, and an unsupported
/// MIME type silently exports PNG.
pub struct ResvgHost {
    /// Font database for text rendering
    fontdb: Arc<fontdb::Database>,
    config: HostConfig,
}

/// A parsed SVG tree plus its natural pixel size.
pub struct DecodedImage {
    tree: usvg::Tree,
    width: u32,
    height: u32,
}

/// Encoded surface contents waiting to be read.
#[derive(Debug, Clone)]
pub struct EncodedBlob {
    pub mime: &'static str,
    bytes: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExportKind {
    Png,
    Jpeg,
    Webp,
}

impl ExportKind {
    fn from_mime(mime: &str) -> Option<Self> {
        match mime {
            m if m.eq_ignore_ascii_case("image/png") => Some(ExportKind::Png),
            m if m.eq_ignore_ascii_case("image/jpeg") => Some(ExportKind::Jpeg),
            m if m.eq_ignore_ascii_case("image/webp") => Some(ExportKind::Webp),
            _ => None,
        }
    }

    fn mime(self) -> &'static str {
        match self {
            ExportKind::Png => "image/png",
            ExportKind::Jpeg => "image/jpeg",
            ExportKind::Webp => "image/webp",
        }
    }
}

impl ResvgHost {
    pub fn new(config: HostConfig) -> Self {
        let mut fontdb = fontdb::Database::new();

        for dir in &config.font_dirs {
            fontdb.load_fonts_dir(dir);
            tracing::debug!(dir = %dir.display(), "Loaded font directory");
        }

        if config.load_system_fonts {
            fontdb.load_system_fonts();
        }

        tracing::info!(
            font_count = fontdb.len(),
            "Loaded fonts for SVG text rendering"
        );

        Self {
            fontdb: Arc::new(fontdb),
            config,
        }
    }

    pub fn config(&self) -> &HostConfig {
        &self.config
    }

    /// Validate a requested surface size, truncating fractional pixels
    fn surface_size(&self, width: f32, height: f32) -> Result<(u32, u32), HostError> {
        let invalid = || HostError::InvalidSurface { width, height };

        let w = surface_dimension(width).ok_or_else(invalid)?;
        let h = surface_dimension(height).ok_or_else(invalid)?;

        let max_side = self.config.max_surface_side;
        if w == 0 || h == 0 || w > max_side || h > max_side {
            return Err(invalid());
        }
        if u64::from(w) * u64::from(h) > self.config.max_surface_area {
            return Err(invalid());
        }

        Ok((w, h))
    }

    fn jpeg_quality(&self, quality: f32) -> u8 {
        let quality = if (0.0..=1.0).contains(&quality) {
            quality
        } else {
            self.config.default_jpeg_quality
        };
        (quality * 100.0).round().clamp(1.0, 100.0) as u8
    }

    fn encode(&self, surface: &Pixmap, kind: ExportKind, quality: f32) -> Result<Vec<u8>, HostError> {
        match kind {
            ExportKind::Png => encode_png(surface),
            ExportKind::Jpeg => encode_jpeg(surface, self.jpeg_quality(quality)),
            ExportKind::Webp => encode_webp(surface),
        }
    }
}

impl Default for ResvgHost {
    fn default() -> Self {
        Self::new(HostConfig::default())
    }
}

#[async_trait(?Send)]
impl Host for ResvgHost {
    type Image = DecodedImage;
    type Surface = Pixmap;
    type Blob = EncodedBlob;

    async fn load_image(&self, locator: &str) -> Result<DecodedImage, HostError> {
        tokio::task::yield_now().await;

        let data = decode_data_locator(locator)?;
        let options = usvg::Options {
            fontdb: self.fontdb.clone(),
            ..Default::default()
        };
        let tree =
            usvg::Tree::from_data(&data, &options).map_err(|e| HostError::SvgParse(e.to_string()))?;

        let size = tree.size();
        let width = size.width().ceil() as u32;
        let height = size.height().ceil() as u32;
        tracing::debug!(width, height, "Decoded SVG");

        Ok(DecodedImage {
            tree,
            width,
            height,
        })
    }

    fn natural_size(&self, image: &DecodedImage) -> (u32, u32) {
        (image.width, image.height)
    }

    fn create_surface(&self, width: f32, height: f32) -> Result<Pixmap, HostError> {
        let (w, h) = self.surface_size(width, height)?;
        Pixmap::new(w, h).ok_or(HostError::InvalidSurface { width, height })
    }

    fn draw_image(
        &self,
        surface: &mut Pixmap,
        image: &DecodedImage,
        target: &DrawTarget,
    ) -> Result<(), HostError> {
        if !target.x.is_finite() || !target.y.is_finite() {
            return Err(HostError::InvalidGeometry(format!(
                "placement ({}, {})",
                target.x, target.y
            )));
        }

        let transform = match target.size {
            Some((width, height)) => {
                let natural = image.tree.size();
                let scale_x = width / natural.width();
                let scale_y = height / natural.height();
                if !scale_x.is_finite() || !scale_y.is_finite() {
                    return Err(HostError::InvalidGeometry(format!(
                        "size {width}x{height}"
                    )));
                }
                Transform::from_scale(scale_x, scale_y).post_translate(target.x, target.y)
            }
            None => Transform::from_translate(target.x, target.y),
        };

        resvg::render(&image.tree, transform, &mut surface.as_mut());
        Ok(())
    }

    async fn export(
        &self,
        surface: &Pixmap,
        mime: &str,
        quality: f32,
    ) -> Result<Option<EncodedBlob>, HostError> {
        tokio::task::yield_now().await;

        let kind = ExportKind::from_mime(mime).unwrap_or_else(|| {
            tracing::debug!(mime, "Unsupported export type, substituting PNG");
            ExportKind::Png
        });

        match self.encode(surface, kind, quality) {
            Ok(bytes) => Ok(Some(EncodedBlob {
                mime: kind.mime(),
                bytes,
            })),
            Err(e) => {
                tracing::warn!(%e, mime = kind.mime(), "Surface export produced no data");
                Ok(None)
            }
        }
    }

    async fn read_blob(&self, blob: EncodedBlob) -> Result<Vec<u8>, HostError> {
        tokio::task::yield_now().await;
        Ok(blob.bytes)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn surface_dimension(value: f32) -> Option<u32> {
    if !value.is_finite() || value < 0.0 {
        return None;
    }
    Some(value.trunc() as u32)
}

/// Extract the SVG payload from a percent-encoded `data:` locator.
fn decode_data_locator(locator: &str) -> Result<Cow<'_, [u8]>, HostError> {
    let rest = locator
        .strip_prefix("data:")
        .ok_or_else(|| HostError::InvalidLocator("not a data locator".to_string()))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| HostError::InvalidLocator("missing payload separator".to_string()))?;

    let media_type = header.split(';').next().unwrap_or_default();
    if !media_type.trim().eq_ignore_ascii_case(SVG_MEDIA_TYPE) {
        return Err(HostError::InvalidLocator(format!(
            "unsupported media type '{media_type}'"
        )));
    }

    Ok(percent_decode_str(payload).into())
}

/// Surface pixels with straight (non-premultiplied) alpha.
fn straight_rgba(pixmap: &Pixmap) -> Vec<u8> {
    pixmap
        .pixels()
        .iter()
        .flat_map(|pixel| {
            let c = pixel.demultiply();
            [c.red(), c.green(), c.blue(), c.alpha()]
        })
        .collect()
}

/// Surface pixels flattened onto black.
///
/// Compositing premultiplied color over black leaves the color channels as
/// they are.
fn flattened_rgb(pixmap: &Pixmap) -> Vec<u8> {
    pixmap
        .pixels()
        .iter()
        .flat_map(|pixel| [pixel.red(), pixel.green(), pixel.blue()])
        .collect()
}

fn encode_png(pixmap: &Pixmap) -> Result<Vec<u8>, HostError> {
    let data = straight_rgba(pixmap);
    let mut buf = Cursor::new(Vec::new());
    {
        let mut encoder = png::Encoder::new(&mut buf, pixmap.width(), pixmap.height());
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder
            .write_header()
            .map_err(|e| HostError::Encode(e.to_string()))?;
        writer
            .write_image_data(&data)
            .map_err(|e| HostError::Encode(e.to_string()))?;
        writer
            .finish()
            .map_err(|e| HostError::Encode(e.to_string()))?;
    }
    Ok(buf.into_inner())
}

fn encode_jpeg(pixmap: &Pixmap, quality: u8) -> Result<Vec<u8>, HostError> {
    let data = flattened_rgb(pixmap);
    let mut bytes = Vec::new();
    JpegEncoder::new_with_quality(&mut bytes, quality)
        .encode(&data, pixmap.width(), pixmap.height(), ExtendedColorType::Rgb8)
        .map_err(|e| HostError::Encode(e.to_string()))?;
    Ok(bytes)
}

fn encode_webp(pixmap: &Pixmap) -> Result<Vec<u8>, HostError> {
    let data = straight_rgba(pixmap);
    let mut bytes = Vec::new();
    WebPEncoder::new_lossless(&mut bytes)
        .encode(&data, pixmap.width(), pixmap.height(), ExtendedColorType::Rgba8)
        .map_err(|e| HostError::Encode(e.to_string()))?;
    Ok(bytes)
}
