//! "Compact sticker": a semi-opaque rounded bar along the bottom with an
//! inset map excerpt, a text column, and a country flag.

use image::RgbaImage;

use super::palette::{FLAG_RED, PIN_RED, WHITE};
use super::{DATE_PLACEHOLDER, TIME_PLACEHOLDER};
use crate::color::rgba;
use crate::draw;
use crate::fonts::FontStyle;
use crate::render::RenderInput;
use crate::text::{self, TextShadow};
use crate::clock;

pub const TITLE_PLACEHOLDER: &str = "Kecamatan Borobudur, Jawa Tengah, Indonesia";
pub const ADDRESS_PLACEHOLDER: &str = "Jl. Daranindra No.1, Dusun VII, Borobudur...";

pub const ADDRESS_MAX_LINES: usize = 2;

pub fn draw(canvas: &mut RgbaImage, input: &RenderInput) {
    let scale = canvas.width() as f32 / 1000.0;
    let bar_height = 160.0 * scale;
    let bar_margin = 15.0 * scale;
    let bar_width = canvas.width() as f32 - bar_margin * 2.0;
    let bar_x = bar_margin;
    let bar_y = canvas.height() as f32 - bar_height - bar_margin;

    draw::fill_rounded_rect(
        canvas,
        bar_x,
        bar_y,
        bar_width,
        bar_height,
        15.0 * scale,
        rgba(0, 0, 0, 179),
    );

    // Map excerpt, clipped to a rounded square inside the bar.
    let map_padding = 8.0 * scale;
    let map_size = bar_height - map_padding * 2.0;
    let map_x = bar_x + map_padding;
    let map_y = bar_y + map_padding;

    if let Some(map) = input.map {
        draw::blit_rounded(canvas, map, map_x, map_y, map_size, map_size, 8.0 * scale);

        let label_shadow = TextShadow {
            color: rgba(0, 0, 0, 255),
            blur: 4.0 * scale,
            dx: 0.0,
            dy: 0.0,
        };
        text::draw_text_shadowed(
            canvas,
            input.fonts,
            FontStyle::Bold,
            12.0 * scale,
            map_x + 8.0 * scale,
            map_y + map_size - 8.0 * scale,
            WHITE,
            "Google",
            &label_shadow,
        );
        text::draw_text_shadowed_right(
            canvas,
            input.fonts,
            FontStyle::Regular,
            10.0 * scale,
            map_x + map_size - 8.0 * scale,
            map_y + map_size - 8.0 * scale,
            WHITE,
            "GPS Map Camera",
            &label_shadow,
        );

        // Pin: head circle, body triangle, white center dot.
        let pin = 24.0 * scale;
        let cx = map_x + map_size / 2.0;
        let cy = map_y + map_size / 2.0;
        draw::fill_circle(canvas, cx, cy - pin / 2.0, pin / 4.0, PIN_RED);
        draw::fill_polygon(
            canvas,
            &[
                (cx - pin / 4.0, cy - pin / 2.0),
                (cx + pin / 4.0, cy - pin / 2.0),
                (cx, cy),
            ],
            PIN_RED,
        );
        draw::fill_circle(canvas, cx, cy - pin / 2.0, pin / 8.0, WHITE);
    }

    // Text column.
    let text_x = map_x + map_size + 20.0 * scale;
    let flag_w = 45.0 * scale;
    let text_max_width = bar_x + bar_width - text_x - flag_w - 25.0 * scale;

    let title = input.location.title_or(TITLE_PLACEHOLDER);
    text::draw_text(
        canvas,
        input.fonts.get(FontStyle::Bold),
        28.0 * scale,
        text_x,
        bar_y + 45.0 * scale,
        WHITE,
        title,
    );

    let addr_px = 16.0 * scale;
    let regular = input.fonts.get(FontStyle::Regular);
    let address = input.location.address_or(ADDRESS_PLACEHOLDER);
    let lines = text::wrap_lines(address, text_max_width, ADDRESS_MAX_LINES, |s| {
        text::text_width(regular, addr_px, s)
    });

    let mut cur_y = bar_y + 70.0 * scale;
    for line in &lines {
        text::draw_text(canvas, regular, addr_px, text_x, cur_y, WHITE, line);
        cur_y += addr_px * 1.3;
    }

    let coords = format!(
        "Lat {:.6}° Long {:.6}°",
        input.location.latitude, input.location.longitude
    );
    text::draw_text(canvas, regular, addr_px, text_x, cur_y, WHITE, &coords);
    cur_y += addr_px * 1.3;

    let stamp = format!(
        "{} {} {}",
        input.time.date_or(DATE_PLACEHOLDER),
        input.time.time_or(TIME_PLACEHOLDER),
        clock::UTC_OFFSET_LABEL
    );
    text::draw_text(
        canvas,
        input.fonts.get(FontStyle::Italic),
        addr_px,
        text_x,
        cur_y,
        WHITE,
        &stamp,
    );

    // Flag block on the right edge of the bar.
    let flag_h = 30.0 * scale;
    let flag_x = bar_x + bar_width - flag_w - 20.0 * scale;
    let flag_y = bar_y + 25.0 * scale;
    draw::fill_rect(canvas, flag_x, flag_y, flag_w, flag_h / 2.0, FLAG_RED);
    draw::fill_rect(canvas, flag_x, flag_y + flag_h / 2.0, flag_w, flag_h / 2.0, WHITE);
    draw::stroke_rect(
        canvas,
        flag_x,
        flag_y,
        flag_w,
        flag_h,
        1.0 * scale,
        rgba(255, 255, 255, 102),
    );
}
