//! "Institutional badge": top-right logo bundle, bottom-left time badge and
//! shadowed detail stack with an accent line, a rotated serial along the
//! right edge, and the bottom-right brand block.

use image::{imageops, RgbaImage};

use super::palette::{BRAND_YELLOW, CHECK_GREEN, FLAG_RED, SLATE_DARK, WHITE};
use super::{DATE_PLACEHOLDER, SERIAL_PLACEHOLDER, TIME_PLACEHOLDER};
use crate::color::rgba;
use crate::draw;
use crate::fonts::FontStyle;
use crate::model::or_placeholder;
use crate::render::RenderInput;
use crate::text::{self, TextRun, TextShadow};

pub const BADGE_LABEL_PLACEHOLDER: &str = "P2K2 ✓";
pub const ADDRESS_PLACEHOLDER: &str = "Jl. Daranindra No.1, Dusun VII, Kompleks Kantor...";

pub const CAPTION_LINE_1: &str = "KEMENTERIAN SOSIAL";
pub const CAPTION_LINE_2: &str = "REPUBLIK INDONESIA";

pub const ADDRESS_MAX_LINES: usize = 3;

pub fn draw(canvas: &mut RgbaImage, input: &RenderInput) {
    let scale = canvas.width() as f32 / 1000.0;
    let width = canvas.width() as f32;
    let height = canvas.height() as f32;
    let padding = 30.0 * scale;

    // Top right: institution logo with its caption. Skipped entirely when
    // the logo never loaded.
    if let Some(logo) = input.logo {
        let logo_w = 120.0 * scale;
        let logo_h = logo_w * (logo.height() as f32 / logo.width() as f32);
        let logo_x = width - logo_w - padding - 30.0 * scale;
        let logo_y = padding;

        let scaled = imageops::resize(
            logo,
            logo_w.round().max(1.0) as u32,
            logo_h.round().max(1.0) as u32,
            imageops::FilterType::Lanczos3,
        );
        draw::overlay_alpha(canvas, &scaled, logo_x.round() as i64, logo_y.round() as i64);

        let caption_x = logo_x + logo_w / 2.0;
        let bold = input.fonts.get(FontStyle::Bold);
        text::draw_text_centered(
            canvas,
            bold,
            16.0 * scale,
            caption_x,
            logo_y + logo_h + 25.0 * scale,
            super::palette::BLACK,
            CAPTION_LINE_1,
        );
        text::draw_text_centered(
            canvas,
            bold,
            16.0 * scale,
            caption_x,
            logo_y + logo_h + 42.0 * scale,
            super::palette::BLACK,
            CAPTION_LINE_2,
        );
    }

    // Bottom left: the two-tone time badge.
    let mut current_y = height - 300.0 * scale;
    let start_x = padding;

    let badge_px = 36.0 * scale;
    let badge_runs = [
        TextRun::new(
            format!("[{}]", input.location.title_or(BADGE_LABEL_PLACEHOLDER)),
            BRAND_YELLOW,
            FontStyle::Bold,
        ),
        TextRun::new(
            format!(" {}", input.time.time_or(TIME_PLACEHOLDER)),
            SLATE_DARK,
            FontStyle::Bold,
        ),
    ];
    let badge_padding_x = 20.0 * scale;
    let badge_w = text::runs_width(input.fonts, badge_px, &badge_runs) + badge_padding_x * 2.0;
    let badge_h = 70.0 * scale;

    draw::fill_rounded_rect(
        canvas,
        start_x,
        current_y,
        badge_w,
        badge_h,
        12.0 * scale,
        rgba(255, 255, 255, 242),
    );
    draw::stroke_rounded_rect(
        canvas,
        start_x,
        current_y,
        badge_w,
        badge_h,
        12.0 * scale,
        1.0 * scale,
        rgba(0, 0, 0, 26),
    );
    text::draw_runs(
        canvas,
        input.fonts,
        badge_px,
        start_x + badge_padding_x,
        current_y + 48.0 * scale,
        &badge_runs,
    );

    current_y += 95.0 * scale;

    // Accent line spanning the detail stack.
    draw::fill_rect(
        canvas,
        start_x - 14.0 * scale,
        current_y - 28.0 * scale,
        5.0 * scale,
        190.0 * scale,
        super::palette::BRAND_YELLOW,
    );

    let shadow = TextShadow {
        color: rgba(0, 0, 0, 204),
        blur: 6.0 * scale,
        dx: 2.0 * scale,
        dy: 2.0 * scale,
    };

    // Date line.
    text::draw_text_shadowed(
        canvas,
        input.fonts,
        FontStyle::Bold,
        24.0 * scale,
        start_x,
        current_y,
        WHITE,
        input.time.date_or(DATE_PLACEHOLDER),
        &shadow,
    );
    current_y += 40.0 * scale;

    // Wrapped address.
    let addr_px = 20.0 * scale;
    let regular = input.fonts.get(FontStyle::Regular);
    let address = input.location.address_or(ADDRESS_PLACEHOLDER);
    let lines = text::wrap_lines(address, 550.0 * scale, ADDRESS_MAX_LINES, |s| {
        text::text_width(regular, addr_px, s)
    });
    for (i, line) in lines.iter().enumerate() {
        text::draw_text_shadowed(
            canvas,
            input.fonts,
            FontStyle::Regular,
            addr_px,
            start_x,
            current_y,
            WHITE,
            line,
            &shadow,
        );
        if i + 1 < lines.len() {
            current_y += 28.0 * scale;
        }
    }
    current_y += 40.0 * scale;

    // Coordinates (hemisphere suffixes fixed, matching the original).
    let coords = format!(
        "{:.6}°S, {:.6}°E",
        input.location.latitude, input.location.longitude
    );
    text::draw_text_shadowed(
        canvas,
        input.fonts,
        FontStyle::Regular,
        addr_px,
        start_x,
        current_y,
        WHITE,
        &coords,
        &shadow,
    );
    current_y += 45.0 * scale;

    // Tri-color disclaimer line.
    let disclaimer = [
        TextRun::new("✓ ", CHECK_GREEN, FontStyle::Italic),
        TextRun::new("Timemark ", BRAND_YELLOW, FontStyle::Italic),
        TextRun::new("menjamin keaslian waktu", WHITE, FontStyle::Italic),
    ];
    text::draw_runs_shadowed(
        canvas,
        input.fonts,
        16.0 * scale,
        start_x,
        current_y,
        &disclaimer,
        &shadow,
    );

    // Rotated serial line along the right edge.
    let serial = or_placeholder(input.serial, SERIAL_PLACEHOLDER);
    let serial_runs = [
        TextRun::new("© ", rgba(255, 255, 255, 179), FontStyle::Regular),
        TextRun::new(serial, BRAND_YELLOW, FontStyle::Regular),
        TextRun::new(" Timemark Verified", rgba(255, 255, 255, 179), FontStyle::Regular),
    ];
    text::draw_runs_rotated_ccw(
        canvas,
        input.fonts,
        16.0 * scale,
        width - padding + 5.0 * scale,
        height / 2.0,
        &serial_runs,
    );

    // Bottom right: flag + brand block.
    let f_w = 50.0 * scale;
    let f_h = 32.0 * scale;
    let f_x = width - f_w - padding;
    let f_y = height - 200.0 * scale;
    draw::fill_rect(canvas, f_x, f_y, f_w, f_h / 2.0, FLAG_RED);
    draw::fill_rect(canvas, f_x, f_y + f_h / 2.0, f_w, f_h / 2.0, WHITE);
    draw::stroke_rect(canvas, f_x, f_y, f_w, f_h, 1.0 * scale, rgba(255, 255, 255, 77));

    let brand_shadow = TextShadow {
        color: rgba(0, 0, 0, 255),
        blur: 6.0 * scale,
        dx: 0.0,
        dy: 0.0,
    };
    let wordmark = [
        TextRun::new("Time", WHITE, FontStyle::Bold),
        TextRun::new("mark", BRAND_YELLOW, FontStyle::Bold),
    ];
    let brand_px = 38.0 * scale;
    let wordmark_w = text::runs_width(input.fonts, brand_px, &wordmark);
    text::draw_runs_shadowed(
        canvas,
        input.fonts,
        brand_px,
        width - padding - wordmark_w,
        height - 60.0 * scale,
        &wordmark,
        &brand_shadow,
    );
    text::draw_text_shadowed_right(
        canvas,
        input.fonts,
        FontStyle::Regular,
        16.0 * scale,
        width - padding,
        height - 35.0 * scale,
        WHITE,
        "Foto 100% akurat",
        &brand_shadow,
    );
}
