//! Text measurement and layout.
//!
//! Everything here draws at a *baseline* y, matching how the layouts express
//! their vertical constants. Widths are advance-based (no kerning) so that
//! measuring a string and then drawing it run-by-run lands on the same
//! cursor positions.

use image::{imageops, Rgba, RgbaImage};
use rusttype::{point, Font, Scale};

use crate::draw;
use crate::fonts::{FontBook, FontStyle};

pub fn text_width(font: &Font<'_>, px: f32, text: &str) -> f32 {
    if text.is_empty() {
        return 0.0;
    }
    let scale = Scale::uniform(px);
    text.chars()
        .map(|ch| font.glyph(ch).scaled(scale).h_metrics().advance_width)
        .sum()
}

pub fn draw_text(
    img: &mut RgbaImage,
    font: &Font<'_>,
    px: f32,
    x: f32,
    baseline_y: f32,
    color: Rgba<u8>,
    text: &str,
) {
    let scale = Scale::uniform(px);
    let mut caret = x;
    let alpha = color.0[3] as f32 / 255.0;
    for ch in text.chars() {
        let glyph = font.glyph(ch).scaled(scale);
        let advance = glyph.h_metrics().advance_width;
        let positioned = glyph.positioned(point(caret, baseline_y));
        if let Some(bb) = positioned.pixel_bounding_box() {
            positioned.draw(|gx, gy, v| {
                let px = gx as i64 + bb.min.x as i64;
                let py = gy as i64 + bb.min.y as i64;
                let a = (v * alpha * 255.0) as u8;
                if a > 0 {
                    draw::blend_px(
                        img,
                        px,
                        py,
                        Rgba([color.0[0], color.0[1], color.0[2], a]),
                    );
                }
            });
        }
        caret += advance;
    }
}

pub fn draw_text_centered(
    img: &mut RgbaImage,
    font: &Font<'_>,
    px: f32,
    center_x: f32,
    baseline_y: f32,
    color: Rgba<u8>,
    text: &str,
) {
    let w = text_width(font, px, text);
    draw_text(img, font, px, center_x - w / 2.0, baseline_y, color, text);
}

/// Greedy word wrap.
///
/// A line accepts a word while the measured candidate is `<=` the budget, so
/// a line whose width exactly equals `max_width` does not wrap. After
/// `max_lines` committed lines the remainder is dropped and the final line is
/// shrunk until it fits with a trailing "..." marker.
pub fn wrap_lines<F>(text: &str, max_width: f32, max_lines: usize, measure: F) -> Vec<String>
where
    F: Fn(&str) -> f32,
{
    if text.trim().is_empty() || max_lines == 0 {
        return Vec::new();
    }

    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if current.is_empty() {
            current = word.to_string();
            continue;
        }
        let candidate = format!("{current} {word}");
        if measure(&candidate) <= max_width {
            current = candidate;
        } else {
            lines.push(std::mem::take(&mut current));
            current = word.to_string();
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }

    if lines.len() > max_lines {
        lines.truncate(max_lines);
        let mut last = lines.pop().unwrap_or_default();
        while !last.is_empty() && measure(&format!("{last}...")) > max_width {
            match last.rsplit_once(' ') {
                Some((head, _)) => last = head.to_string(),
                None => {
                    last.pop();
                }
            }
        }
        let last = if last.is_empty() {
            "...".to_string()
        } else {
            format!("{last}...")
        };
        lines.push(last);
    }

    lines
}

/// One styled span of an inline multi-color line.
#[derive(Clone, Debug)]
pub struct TextRun {
    pub text: String,
    pub color: Rgba<u8>,
    pub style: FontStyle,
}

impl TextRun {
    pub fn new(text: impl Into<String>, color: Rgba<u8>, style: FontStyle) -> Self {
        Self { text: text.into(), color, style }
    }
}

pub fn runs_width(fonts: &FontBook, px: f32, runs: &[TextRun]) -> f32 {
    runs.iter()
        .map(|r| text_width(fonts.get(r.style), px, &r.text))
        .sum()
}

/// Draws the runs left to right, measuring each with its own face before
/// advancing the cursor. Returns the total advance.
pub fn draw_runs(
    img: &mut RgbaImage,
    fonts: &FontBook,
    px: f32,
    x: f32,
    baseline_y: f32,
    runs: &[TextRun],
) -> f32 {
    let mut caret = x;
    for run in runs {
        let font = fonts.get(run.style);
        draw_text(img, font, px, caret, baseline_y, run.color, &run.text);
        caret += text_width(font, px, &run.text);
    }
    caret - x
}

#[derive(Clone, Copy, Debug)]
pub struct TextShadow {
    pub color: Rgba<u8>,
    pub blur: f32,
    pub dx: f32,
    pub dy: f32,
}

fn shadow_pad(shadow: &TextShadow) -> f32 {
    shadow.blur * 3.0 + shadow.dx.abs().max(shadow.dy.abs()) + 2.0
}

/// Canvas-style drop shadow: the glyphs are rendered into a scratch buffer in
/// the shadow color, gaussian-blurred, composited at the offset, then the
/// crisp pass is drawn on top.
pub fn draw_runs_shadowed(
    img: &mut RgbaImage,
    fonts: &FontBook,
    px: f32,
    x: f32,
    baseline_y: f32,
    runs: &[TextRun],
    shadow: &TextShadow,
) {
    let total = runs_width(fonts, px, runs);
    if total > 0.0 && shadow.blur > 0.0 {
        let pad = shadow_pad(shadow).ceil();
        let vm = fonts.get(FontStyle::Regular).v_metrics(Scale::uniform(px));
        let w = (total + pad * 2.0).ceil() as u32;
        let h = ((vm.ascent - vm.descent) + pad * 2.0).ceil() as u32;
        let mut scratch = draw::new_canvas(w.max(1), h.max(1));

        let mut caret = pad;
        for run in runs {
            let font = fonts.get(run.style);
            draw_text(
                &mut scratch,
                font,
                px,
                caret,
                pad + vm.ascent,
                shadow.color,
                &run.text,
            );
            caret += text_width(font, px, &run.text);
        }
        let blurred = imageops::blur(&scratch, (shadow.blur * 0.5).max(0.1));
        draw::overlay_alpha(
            img,
            &blurred,
            (x - pad + shadow.dx).round() as i64,
            (baseline_y - vm.ascent - pad + shadow.dy).round() as i64,
        );
    }
    draw_runs(img, fonts, px, x, baseline_y, runs);
}

pub fn draw_text_shadowed(
    img: &mut RgbaImage,
    fonts: &FontBook,
    style: FontStyle,
    px: f32,
    x: f32,
    baseline_y: f32,
    color: Rgba<u8>,
    text: &str,
    shadow: &TextShadow,
) {
    let runs = [TextRun::new(text, color, style)];
    draw_runs_shadowed(img, fonts, px, x, baseline_y, &runs, shadow);
}

pub fn draw_text_shadowed_right(
    img: &mut RgbaImage,
    fonts: &FontBook,
    style: FontStyle,
    px: f32,
    anchor_x: f32,
    baseline_y: f32,
    color: Rgba<u8>,
    text: &str,
    shadow: &TextShadow,
) {
    let w = text_width(fonts.get(style), px, text);
    draw_text_shadowed(img, fonts, style, px, anchor_x - w, baseline_y, color, text, shadow);
}

/// Draws the runs rotated 90° counter-clockwise (reading bottom-to-top),
/// centered on the pivot point.
pub fn draw_runs_rotated_ccw(
    img: &mut RgbaImage,
    fonts: &FontBook,
    px: f32,
    pivot_x: f32,
    pivot_y: f32,
    runs: &[TextRun],
) {
    let total = runs_width(fonts, px, runs);
    if total <= 0.0 {
        return;
    }
    let vm = fonts.get(FontStyle::Regular).v_metrics(Scale::uniform(px));
    let pad = 2.0;
    let w = (total + pad * 2.0).ceil() as u32;
    let h = ((vm.ascent - vm.descent) + pad * 2.0).ceil() as u32;
    let mut scratch = draw::new_canvas(w.max(1), h.max(1));
    draw_runs(&mut scratch, fonts, px, pad, pad + vm.ascent, runs);

    let rotated = imageops::rotate270(&scratch);
    draw::overlay_alpha(
        img,
        &rotated,
        (pivot_x - rotated.width() as f32 / 2.0).round() as i64,
        (pivot_y - rotated.height() as f32 / 2.0).round() as i64,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::rgba;
    use crate::fonts::test_font_book;

    // Fixed-width fake measurer: 10 units per char, 10 per joining space.
    fn fake(s: &str) -> f32 {
        s.chars().count() as f32 * 10.0
    }

    #[test]
    fn wrap_boundary_is_strictly_exceeds() {
        // "aaaa bbbb" measures exactly 90; a budget of 90 must not wrap.
        assert_eq!(wrap_lines("aaaa bbbb", 90.0, 3, fake), vec!["aaaa bbbb"]);
        // One unit less and it wraps.
        assert_eq!(wrap_lines("aaaa bbbb", 89.0, 3, fake), vec!["aaaa", "bbbb"]);
    }

    #[test]
    fn wrap_caps_lines_with_ellipsis() {
        let lines = wrap_lines("aa bb cc dd ee ff", 50.0, 2, fake);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "aa bb");
        assert!(lines[1].ends_with("..."), "got {:?}", lines);
        // The ellipsized line still fits the budget.
        assert!(fake(&lines[1]) <= 50.0);
    }

    #[test]
    fn wrap_keeps_overlong_single_word() {
        // A word wider than the budget still occupies its own line.
        let lines = wrap_lines("abcdefghijkl", 50.0, 2, fake);
        assert_eq!(lines, vec!["abcdefghijkl"]);
    }

    #[test]
    fn wrap_empty_input_yields_no_lines() {
        assert!(wrap_lines("   ", 100.0, 2, fake).is_empty());
    }

    #[test]
    fn runs_width_sums_individual_faces() {
        let Some(fonts) = test_font_book() else { return };
        let runs = [
            TextRun::new("ab", rgba(255, 0, 0, 255), FontStyle::Bold),
            TextRun::new("cd", rgba(0, 255, 0, 255), FontStyle::Regular),
        ];
        let total = runs_width(&fonts, 24.0, &runs);
        let separate = text_width(fonts.get(FontStyle::Bold), 24.0, "ab")
            + text_width(fonts.get(FontStyle::Regular), 24.0, "cd");
        assert!((total - separate).abs() < 1e-3);
    }

    #[test]
    fn draw_runs_advances_cursor_per_run() {
        let Some(fonts) = test_font_book() else { return };
        let mut img = draw::new_canvas(200, 50);
        let runs = [
            TextRun::new("AB", rgba(255, 0, 0, 255), FontStyle::Regular),
            TextRun::new("CD", rgba(0, 0, 255, 255), FontStyle::Regular),
        ];
        let advance = draw_runs(&mut img, &fonts, 24.0, 5.0, 30.0, &runs);
        assert!((advance - runs_width(&fonts, 24.0, &runs)).abs() < 1e-3);
        // Something red landed left of something blue.
        let red_x = (0..200).find(|&x| (0..50).any(|y| img.get_pixel(x, y).0[0] > 128));
        let blue_x = (0..200).rev().find(|&x| (0..50).any(|y| img.get_pixel(x, y).0[2] > 128));
        let (Some(red_x), Some(blue_x)) = (red_x, blue_x) else {
            panic!("no glyph coverage drawn");
        };
        assert!(red_x < blue_x);
    }

    #[test]
    fn text_drawing_is_deterministic() {
        let Some(fonts) = test_font_book() else { return };
        let mut a = draw::new_canvas(120, 40);
        let mut b = draw::new_canvas(120, 40);
        for img in [&mut a, &mut b] {
            draw_text_shadowed(
                img,
                &fonts,
                FontStyle::Bold,
                20.0,
                4.0,
                28.0,
                rgba(255, 255, 255, 255),
                "Wisata",
                &TextShadow { color: rgba(0, 0, 0, 200), blur: 4.0, dx: 1.0, dy: 1.0 },
            );
        }
        assert_eq!(a.as_raw(), b.as_raw());
    }
}
