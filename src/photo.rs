//! The uploaded photo: decode, flatten, optional width normalization, and
//! the built-in sample image used when no upload is present.

use image::{imageops, ImageBuffer, Rgba, RgbaImage};

use crate::color::rgba;
use crate::fonts::{FontBook, FontStyle};
use crate::text;
use crate::theme::StampError;
use crate::util;

/// JPEG quality applied when a photo is re-encoded during normalization.
/// Export quality (95) is separate and fixed by the download contract.
pub const NORMALIZE_JPEG_QUALITY: u8 = 90;

pub const SAMPLE_WIDTH: u32 = 800;
pub const SAMPLE_HEIGHT: u32 = 600;

#[derive(Clone, Debug)]
pub struct PhotoBuffer {
    image: RgbaImage,
}

impl PhotoBuffer {
    pub fn from_image(image: RgbaImage) -> Self {
        Self { image }
    }

    /// Decodes a base64 (or data URI) payload and flattens any transparency
    /// onto white, the way the composite will be exported.
    pub fn from_base64(payload: &str) -> Result<Self, StampError> {
        let bytes = util::b64_decode(payload)
            .ok_or_else(|| StampError::BadRequest("photo is not valid base64".into()))?;
        let img = image::load_from_memory(&bytes)
            .map_err(|e| StampError::BadRequest(format!("invalid photo: {e}")))?;
        let mut img = img.to_rgba8();

        for p in img.pixels_mut() {
            if p.0[3] < 255 {
                let a = p.0[3] as f32 / 255.0;
                let inv = 1.0 - a;
                p.0[0] = (p.0[0] as f32 * a + 255.0 * inv) as u8;
                p.0[1] = (p.0[1] as f32 * a + 255.0 * inv) as u8;
                p.0[2] = (p.0[2] as f32 * a + 255.0 * inv) as u8;
                p.0[3] = 255;
            }
        }
        Ok(Self { image: img })
    }

    /// Caps the photo at `target_width`, preserving aspect, and re-encodes
    /// through JPEG at the fixed normalization quality so downstream output
    /// matches what a normalized upload would look like. Photos already
    /// within the cap pass through untouched.
    pub fn normalize(self, target_width: u32) -> Result<Self, StampError> {
        if self.image.width() <= target_width {
            return Ok(self);
        }
        let w = target_width;
        let h = ((self.image.height() as u64 * target_width as u64)
            / self.image.width() as u64)
            .max(1) as u32;
        let resized = imageops::resize(&self.image, w, h, imageops::FilterType::Lanczos3);
        let jpeg = util::jpeg_encode_rgba8(&resized, NORMALIZE_JPEG_QUALITY)
            .map_err(StampError::Image)?;
        let round_trip = image::load_from_memory(&jpeg)
            .map_err(|e| StampError::Image(e.to_string()))?
            .to_rgba8();
        Ok(Self { image: round_trip })
    }

    /// The sample gradient photo shown before any upload: a soft blue-violet
    /// diagonal with a translucent caption.
    pub fn sample(fonts: Option<&FontBook>) -> Self {
        let (w, h) = (SAMPLE_WIDTH, SAMPLE_HEIGHT);
        let from = [0x8eu8, 0xc5, 0xfc];
        let to = [0xe0u8, 0xc3, 0xfc];
        // Linear gradient along the (w, h) diagonal.
        let denom = (w * w + h * h) as f32;
        let mut img: RgbaImage = ImageBuffer::from_fn(w, h, |x, y| {
            let t = ((x * w + y * h) as f32 / denom).clamp(0.0, 1.0);
            Rgba([
                (from[0] as f32 + (to[0] as f32 - from[0] as f32) * t) as u8,
                (from[1] as f32 + (to[1] as f32 - from[1] as f32) * t) as u8,
                (from[2] as f32 + (to[2] as f32 - from[2] as f32) * t) as u8,
                255,
            ])
        });
        if let Some(fonts) = fonts {
            let px = 60.0;
            let vm_center = h as f32 / 2.0 + px * 0.35;
            text::draw_text_centered(
                &mut img,
                fonts.get(FontStyle::Bold),
                px,
                w as f32 / 2.0,
                vm_center,
                rgba(255, 255, 255, 128),
                "CONTOH FOTO",
            );
        }
        Self { image: img }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine;

    fn png_b64(img: &RgbaImage) -> String {
        let bytes = util::png_encode_rgba8(img).unwrap();
        base64::engine::general_purpose::STANDARD.encode(bytes)
    }

    #[test]
    fn decodes_data_uri_and_flattens_alpha() {
        let mut img = RgbaImage::new(4, 4);
        for p in img.pixels_mut() {
            *p = Rgba([255, 0, 0, 0]); // fully transparent red
        }
        let payload = format!("data:image/png;base64,{}", png_b64(&img));
        let photo = PhotoBuffer::from_base64(&payload).unwrap();
        // Transparent pixels flatten to white.
        assert_eq!(photo.image().get_pixel(0, 0).0, [255, 255, 255, 255]);
    }

    #[test]
    fn rejects_garbage() {
        assert!(PhotoBuffer::from_base64("!!not base64!!").is_err());
        let bogus = base64::engine::general_purpose::STANDARD.encode(b"not an image");
        assert!(PhotoBuffer::from_base64(&bogus).is_err());
    }

    #[test]
    fn normalize_caps_width_and_keeps_aspect() {
        let img = RgbaImage::from_pixel(1600, 800, Rgba([10, 20, 30, 255]));
        let photo = PhotoBuffer::from_image(img).normalize(1280).unwrap();
        assert_eq!(photo.width(), 1280);
        assert_eq!(photo.height(), 640);
    }

    #[test]
    fn normalize_passes_small_photos_through() {
        let img = RgbaImage::from_pixel(640, 480, Rgba([10, 20, 30, 255]));
        let photo = PhotoBuffer::from_image(img.clone()).normalize(1280).unwrap();
        assert_eq!(photo.width(), 640);
        assert_eq!(photo.image().as_raw(), img.as_raw());
    }

    #[test]
    fn sample_dimensions_and_gradient_direction() {
        let photo = PhotoBuffer::sample(None);
        assert_eq!((photo.width(), photo.height()), (800, 600));
        let tl = photo.image().get_pixel(0, 0).0;
        let br = photo.image().get_pixel(799, 599).0;
        assert_eq!(tl, [0x8e, 0xc5, 0xfc, 255]);
        // Bottom-right approaches the second stop.
        assert!(br[0] > 0xd0);
    }
}
