//! Render dispatch: blit the photo, hand off to the selected theme, export.

use chrono::DateTime;
use chrono_tz::Tz;
use image::RgbaImage;

use crate::fonts::FontBook;
use crate::model::{CustomConfig, LocationRecord, Theme, TimeStamp};
use crate::photo::PhotoBuffer;
use crate::theme::{self, StampError};
use crate::util;

pub const EXPORT_JPEG_QUALITY: u8 = 95;

/// Everything a theme needs, by reference. Themes hold no state of their
/// own, so re-rendering the same input is pixel-identical.
pub struct RenderInput<'a> {
    pub map: Option<&'a RgbaImage>,
    pub logo: Option<&'a RgbaImage>,
    pub location: &'a LocationRecord,
    pub time: &'a TimeStamp,
    pub serial: &'a str,
    pub custom: &'a CustomConfig,
    /// Clock reading for themes that stamp render time (precision).
    pub rendered_at: DateTime<Tz>,
    pub fonts: &'a FontBook,
}

/// Draws the watermark for `theme` over the photo. Without a photo there is
/// nothing to do and `None` comes back (the silent no-op contract).
pub fn render(
    photo: Option<&PhotoBuffer>,
    theme: Theme,
    input: &RenderInput,
) -> Option<RgbaImage> {
    let photo = photo?;
    let _span = crate::perf::PerfSpan::new("render");

    // The canvas always matches the photo dimensions; this is the single
    // source of truth for the scale factor inside every theme.
    let mut canvas = photo.image().clone();

    match theme {
        Theme::Theme1 => theme::theme1::draw(&mut canvas, input),
        Theme::Theme2 => theme::theme2::draw(&mut canvas, input),
        Theme::Precision => theme::precision::draw(&mut canvas, input),
        Theme::Custom => theme::custom::draw(&mut canvas, input),
    }
    Some(canvas)
}

pub fn export_jpeg(canvas: &RgbaImage) -> Result<Vec<u8>, StampError> {
    util::jpeg_encode_rgba8(canvas, EXPORT_JPEG_QUALITY).map_err(StampError::Image)
}

/// `GPS_Watermark_{unix_millis}.jpg`
pub fn export_filename(unix_millis: i64) -> String {
    format!("GPS_Watermark_{unix_millis}.jpg")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock;
    use crate::fonts::test_font_book;
    use crate::map::MAP_SIZE;
    use chrono::TimeZone;
    use image::Rgba;

    fn borobudur() -> LocationRecord {
        LocationRecord {
            title: "Wisata Borobudur".into(),
            address: "Candi Borobudur, Magelang, Jawa Tengah".into(),
            latitude: -7.601301,
            longitude: 110.201094,
        }
    }

    fn fixed_time() -> DateTime<Tz> {
        clock::JAKARTA.with_ymd_and_hms(2026, 2, 9, 12, 10, 38).unwrap()
    }

    fn stub_map() -> RgbaImage {
        RgbaImage::from_pixel(MAP_SIZE, MAP_SIZE, Rgba([90, 140, 90, 255]))
    }

    fn stamp(dt: &DateTime<Tz>) -> TimeStamp {
        clock::timestamp_from(dt)
    }

    #[test]
    fn no_photo_is_a_silent_noop() {
        let Some(fonts) = test_font_book() else { return };
        let loc = borobudur();
        let at = fixed_time();
        let time = stamp(&at);
        let custom = CustomConfig::default();
        let input = RenderInput {
            map: None,
            logo: None,
            location: &loc,
            time: &time,
            serial: "TM-ABCDEFGHJKL",
            custom: &custom,
            rendered_at: at,
            fonts: &fonts,
        };
        assert!(render(None, Theme::Theme1, &input).is_none());
    }

    #[test]
    fn canvas_matches_photo_dimensions() {
        let Some(fonts) = test_font_book() else { return };
        let photo =
            PhotoBuffer::from_image(RgbaImage::from_pixel(1200, 900, Rgba([80, 80, 80, 255])));
        let loc = borobudur();
        let at = fixed_time();
        let time = stamp(&at);
        let custom = CustomConfig::default();
        let map = stub_map();
        let input = RenderInput {
            map: Some(&map),
            logo: None,
            location: &loc,
            time: &time,
            serial: "TM-ABCDEFGHJKL",
            custom: &custom,
            rendered_at: at,
            fonts: &fonts,
        };
        let out = render(Some(&photo), Theme::Precision, &input).unwrap();
        assert_eq!((out.width(), out.height()), (1200, 900));
        // The overlay actually changed pixels near the bottom of the frame.
        let untouched = RgbaImage::from_pixel(1200, 900, Rgba([80, 80, 80, 255]));
        assert_ne!(out.as_raw(), untouched.as_raw());
    }

    #[test]
    fn rendering_twice_is_pixel_identical() {
        let Some(fonts) = test_font_book() else { return };
        let photo =
            PhotoBuffer::from_image(RgbaImage::from_pixel(1000, 750, Rgba([120, 110, 100, 255])));
        let loc = borobudur();
        let at = fixed_time();
        let time = stamp(&at);
        let custom = CustomConfig::default();
        let map = stub_map();

        for theme in [Theme::Theme1, Theme::Theme2, Theme::Precision, Theme::Custom] {
            let input = RenderInput {
                map: Some(&map),
                logo: None,
                location: &loc,
                time: &time,
                serial: "TM-ABCDEFGHJKL",
                custom: &custom,
                rendered_at: at,
                fonts: &fonts,
            };
            let a = render(Some(&photo), theme, &input).unwrap();
            let b = render(Some(&photo), theme, &input).unwrap();
            assert_eq!(a.as_raw(), b.as_raw(), "theme {theme:?} not idempotent");
        }
    }

    #[test]
    fn empty_fields_render_with_placeholders() {
        let Some(fonts) = test_font_book() else { return };
        let photo =
            PhotoBuffer::from_image(RgbaImage::from_pixel(1000, 700, Rgba([40, 40, 40, 255])));
        let empty = LocationRecord {
            title: String::new(),
            address: String::new(),
            latitude: -7.601301,
            longitude: 110.201094,
        };
        // The exact fixed fallback strings, passed explicitly.
        let spelled_out = LocationRecord {
            title: crate::theme::theme1::TITLE_PLACEHOLDER.into(),
            address: crate::theme::theme1::ADDRESS_PLACEHOLDER.into(),
            ..empty.clone()
        };
        let filled = borobudur();
        let at = fixed_time();
        let time = stamp(&at);
        let custom = CustomConfig::default();

        let render_with = |loc: &LocationRecord| {
            let input = RenderInput {
                map: None,
                logo: None,
                location: loc,
                time: &time,
                serial: "",
                custom: &custom,
                rendered_at: at,
                fonts: &fonts,
            };
            render(Some(&photo), Theme::Theme1, &input).unwrap()
        };

        // Empty fields draw exactly the placeholder strings...
        assert_eq!(render_with(&empty).as_raw(), render_with(&spelled_out).as_raw());
        // ...which is real text, not a blank column.
        assert_ne!(render_with(&empty).as_raw(), render_with(&filled).as_raw());
    }

    #[test]
    fn export_filename_embeds_timestamp() {
        assert_eq!(export_filename(1770600000000), "GPS_Watermark_1770600000000.jpg");
    }

    #[test]
    fn export_jpeg_produces_jfif_bytes() {
        let canvas = RgbaImage::from_pixel(64, 48, Rgba([200, 10, 10, 255]));
        let bytes = export_jpeg(&canvas).unwrap();
        assert_eq!(&bytes[..2], &[0xFF, 0xD8], "missing JPEG SOI marker");
    }
}
