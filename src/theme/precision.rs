//! "Precision": a bordered square map with a bezier pin bottom-left, and a
//! right-aligned text stack bottom-right drawn bottom-up from a fresh clock
//! reading (the stamp reflects render time, not the captured TimeStamp).

use chrono::DateTime;
use chrono_tz::Tz;
use image::RgbaImage;

use super::palette::{PIN_RED, PIN_RED_DARK, WHITE};
use crate::clock;
use crate::color::rgba;
use crate::draw;
use crate::fonts::FontStyle;
use crate::model::LocationRecord;
use crate::render::RenderInput;
use crate::text::{self, TextShadow};

pub const FONT_SIZE: f32 = 35.0;
pub const LINE_SPACING: f32 = 1.2;

/// `7,6013S 110,2011E` — absolute values, 4 decimals, comma as the decimal
/// separator, hemisphere letters appended.
pub fn format_coords(lat: f64, lng: f64) -> String {
    let lat_hemi = if lat >= 0.0 { "N" } else { "S" };
    let lng_hemi = if lng >= 0.0 { "E" } else { "W" };
    format!(
        "{}{} {}{}",
        format!("{:.4}", lat.abs()).replace('.', ","),
        lat_hemi,
        format!("{:.4}", lng.abs()).replace('.', ","),
        lng_hemi
    )
}

/// Address hierarchy tokens by the fixed positional rule: with four or more
/// comma-separated tokens, indices 0, 2, 3, 4 are used (skipping 1; 4 may be
/// absent); with fewer, every token is kept in order.
pub fn address_tokens(address: &str) -> Vec<String> {
    let parts: Vec<&str> = address
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();
    if parts.len() >= 4 {
        [0usize, 2, 3, 4]
            .iter()
            .filter_map(|&i| parts.get(i))
            .map(|s| s.to_string())
            .collect()
    } else {
        parts.into_iter().map(str::to_string).collect()
    }
}

/// The stack in list order; the first entry lands on the bottom baseline.
pub fn lines(location: &LocationRecord, rendered_at: &DateTime<Tz>) -> Vec<String> {
    let mut out = vec![
        clock::precision_stamp(rendered_at),
        format_coords(location.latitude, location.longitude),
    ];
    out.extend(address_tokens(&location.address));
    out
}

pub fn draw(canvas: &mut RgbaImage, input: &RenderInput) {
    let scale = canvas.width() as f32 / 1000.0;
    let width = canvas.width() as f32;
    let height = canvas.height() as f32;
    let padding = 25.0 * scale;

    // Bottom left: square map.
    let map_size = 250.0 * scale;
    let map_x = padding;
    let map_y = height - map_size - padding;

    draw::stroke_rect(
        canvas,
        map_x,
        map_y,
        map_size,
        map_size,
        2.0 * scale,
        rgba(255, 255, 255, 102),
    );

    if let Some(map) = input.map {
        draw::blit_rounded(canvas, map, map_x, map_y, map_size, map_size, 0.0);

        text::draw_text(
            canvas,
            input.fonts.get(FontStyle::Bold),
            11.0 * scale,
            map_x + 6.0 * scale,
            map_y + map_size - 6.0 * scale,
            rgba(255, 255, 255, 204),
            "Google",
        );

        draw_pin(canvas, map_x + map_size / 2.0, map_y + map_size / 2.0, scale);
    } else {
        draw::fill_rect(canvas, map_x, map_y, map_size, map_size, rgba(0, 0, 0, 77));
    }

    // Bottom right: the text stack, bottom-up.
    let shadow = TextShadow {
        color: rgba(0, 0, 0, 255),
        blur: 4.0 * scale,
        dx: 1.0 * scale,
        dy: 1.0 * scale,
    };
    let text_x = width - padding;
    let font_px = FONT_SIZE * scale;
    let mut current_y = height - padding - 15.0 * scale;

    for line in lines(input.location, &input.rendered_at) {
        if line.is_empty() {
            continue;
        }
        text::draw_text_shadowed_right(
            canvas,
            input.fonts,
            FontStyle::Regular,
            font_px,
            text_x,
            current_y,
            WHITE,
            &line,
            &shadow,
        );
        current_y -= font_px * LINE_SPACING;
    }
}

/// Google-style pin: drop shadow ellipse, teardrop body from two cubic
/// beziers, darker center hole.
fn draw_pin(canvas: &mut RgbaImage, cx: f32, cy: f32, scale: f32) {
    let pin_w = 26.0 * scale;
    let pin_h = 38.0 * scale;

    draw::fill_ellipse(canvas, cx, cy, 6.0 * scale, 3.0 * scale, rgba(0, 0, 0, 51));

    let mut body = draw::cubic_bezier(
        (cx, cy),
        (cx - pin_w / 2.0, cy - pin_h / 2.0),
        (cx - pin_w / 2.0, cy - pin_h),
        (cx, cy - pin_h),
        24,
    );
    let right = draw::cubic_bezier(
        (cx, cy - pin_h),
        (cx + pin_w / 2.0, cy - pin_h),
        (cx + pin_w / 2.0, cy - pin_h / 2.0),
        (cx, cy),
        24,
    );
    body.extend(right);
    draw::fill_polygon(canvas, &body, PIN_RED);

    draw::fill_circle(canvas, cx, cy - pin_h * 0.7, pin_w / 5.0, PIN_RED_DARK);
}
