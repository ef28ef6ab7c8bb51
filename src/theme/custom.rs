//! "Custom": a user-parametrized floating box sized from measured text,
//! anchored by canvas percentage and clamped to stay fully on-canvas.

use image::RgbaImage;

use super::{DATE_PLACEHOLDER, TIME_PLACEHOLDER};
use crate::color::{hex_or_black, with_alpha};
use crate::draw;
use crate::fonts::FontStyle;
use crate::render::RenderInput;
use crate::text;
use crate::util;

pub const TITLE_PLACEHOLDER: &str = "Nama Lokasi";
pub const ADDRESS_PLACEHOLDER: &str = "Alamat...";

pub const ADDRESS_MAX_CHARS: usize = 60;

/// Anchors the box center at the percentage position, then clamps the left
/// edge first and the right/bottom overflow second, so anchor 0 pins to the
/// top-left corner and anchor 100 pins to the bottom-right corner.
pub fn place_box(
    canvas_w: f32,
    canvas_h: f32,
    box_w: f32,
    box_h: f32,
    anchor_x_pct: f32,
    anchor_y_pct: f32,
) -> (f32, f32) {
    let mut x = canvas_w * (anchor_x_pct / 100.0) - box_w / 2.0;
    let mut y = canvas_h * (anchor_y_pct / 100.0) - box_h / 2.0;
    if x < 0.0 {
        x = 0.0;
    }
    if x + box_w > canvas_w {
        x = canvas_w - box_w;
    }
    if y < 0.0 {
        y = 0.0;
    }
    if y + box_h > canvas_h {
        y = canvas_h - box_h;
    }
    (x, y)
}

pub fn draw(canvas: &mut RgbaImage, input: &RenderInput) {
    let scale = canvas.width() as f32 / 1000.0;
    let width = canvas.width() as f32;
    let height = canvas.height() as f32;
    let padding = 20.0 * scale;
    let cfg = input.custom;

    let title = {
        let over = cfg.title_override.trim();
        if !over.is_empty() {
            over
        } else {
            input.location.title_or(TITLE_PLACEHOLDER)
        }
    };
    let text_color = hex_or_black(&cfg.text_color);
    let bg = with_alpha(hex_or_black(&cfg.background_color), cfg.background_opacity);
    let font_size = cfg.font_size_base * scale;
    let small = font_size * 0.7;

    let bold = input.fonts.get(FontStyle::Bold);
    let regular = input.fonts.get(FontStyle::Regular);

    // Content metrics. The full address line is measured even though the
    // drawn one is truncated, matching the original sizing behavior.
    let date_text = format!(
        "{} {}",
        input.time.date_or(DATE_PLACEHOLDER),
        input.time.time_or(TIME_PLACEHOLDER)
    );
    let addr_text = input.location.address_or(ADDRESS_PLACEHOLDER);
    let lat_lng_text = format!(
        "Lat: {:.6} Long: {:.6}",
        input.location.latitude, input.location.longitude
    );

    let content_width = text::text_width(bold, font_size, title)
        .max(text::text_width(regular, small, &date_text))
        .max(text::text_width(regular, small, addr_text))
        .max(text::text_width(regular, small, &lat_lng_text));
    let line_height = font_size * 1.4;
    let total_height = line_height * 4.0 + padding;

    let map_size = if cfg.show_map { total_height + padding } else { 0.0 };
    let total_box_width = content_width + padding * 3.0 + map_size;
    let total_box_height = total_height.max(map_size) + padding;

    let (box_x, box_y) = place_box(
        width,
        height,
        total_box_width,
        total_box_height,
        cfg.anchor_x,
        cfg.anchor_y,
    );

    draw::fill_rounded_rect(
        canvas,
        box_x,
        box_y,
        total_box_width,
        total_box_height,
        15.0 * scale,
        bg,
    );

    // Optional map thumbnail on the left.
    let mut text_start_x = box_x + padding;
    if cfg.show_map {
        let map_draw_size = total_box_height - padding * 2.0;
        let map_draw_x = box_x + padding;
        let map_draw_y = box_y + padding;
        match input.map {
            Some(map) => draw::blit_rounded(
                canvas,
                map,
                map_draw_x,
                map_draw_y,
                map_draw_size,
                map_draw_size,
                8.0 * scale,
            ),
            None => draw::fill_rounded_rect(
                canvas,
                map_draw_x,
                map_draw_y,
                map_draw_size,
                map_draw_size,
                8.0 * scale,
                hex_or_black("#333333"),
            ),
        }
        text_start_x += map_draw_size + padding;
    }

    // Four text lines.
    let mut current_y = box_y + padding + font_size;
    text::draw_text(canvas, bold, font_size, text_start_x, current_y, text_color, title);
    current_y += line_height;

    text::draw_text(canvas, regular, small, text_start_x, current_y, text_color, &date_text);
    current_y += line_height;

    let addr_drawn = util::truncate_with_ellipsis(addr_text, ADDRESS_MAX_CHARS);
    text::draw_text(canvas, regular, small, text_start_x, current_y, text_color, &addr_drawn);
    current_y += line_height;

    current_y += line_height;
    text::draw_text(
        canvas,
        regular,
        small,
        text_start_x,
        current_y,
        text_color,
        &lat_lng_text,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anchor_zero_clamps_to_top_left() {
        let (x, y) = place_box(1000.0, 800.0, 300.0, 200.0, 0.0, 0.0);
        assert_eq!((x, y), (0.0, 0.0));
    }

    #[test]
    fn anchor_hundred_clamps_to_bottom_right() {
        let (x, y) = place_box(1000.0, 800.0, 300.0, 200.0, 100.0, 100.0);
        assert_eq!((x, y), (700.0, 600.0));
        // The box stays fully inside the canvas.
        assert!(x + 300.0 <= 1000.0);
        assert!(y + 200.0 <= 800.0);
    }

    #[test]
    fn centered_anchor_centers_the_box() {
        let (x, y) = place_box(1000.0, 800.0, 300.0, 200.0, 50.0, 50.0);
        assert_eq!((x, y), (350.0, 300.0));
    }
}
