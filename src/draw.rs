//! CPU raster primitives shared by every theme renderer.
//!
//! All blending is premultiplied-free source-over on RGBA8 buffers; pixels
//! outside the destination are skipped rather than clamped.

use image::{imageops, ImageBuffer, Rgba, RgbaImage};

/// Source-over blend of one pixel. No-op outside the buffer.
pub fn blend_px(img: &mut RgbaImage, x: i64, y: i64, color: Rgba<u8>) {
    if x < 0 || y < 0 || x >= img.width() as i64 || y >= img.height() as i64 {
        return;
    }
    let a = color.0[3] as f32 / 255.0;
    if a <= 0.0 {
        return;
    }
    let dst = img.get_pixel_mut(x as u32, y as u32);
    let inv = 1.0 - a;
    dst.0[0] = (color.0[0] as f32 * a + dst.0[0] as f32 * inv) as u8;
    dst.0[1] = (color.0[1] as f32 * a + dst.0[1] as f32 * inv) as u8;
    dst.0[2] = (color.0[2] as f32 * a + dst.0[2] as f32 * inv) as u8;
    dst.0[3] = dst.0[3].max(color.0[3]);
}

/// Alpha-composites `over` onto `base` with its top-left at (x, y).
/// Signed coordinates so shadow/rotation scratch buffers can hang off-canvas.
pub fn overlay_alpha(base: &mut RgbaImage, over: &RgbaImage, x: i64, y: i64) {
    for oy in 0..over.height() {
        for ox in 0..over.width() {
            let p = over.get_pixel(ox, oy);
            if p.0[3] == 0 {
                continue;
            }
            blend_px(base, x + ox as i64, y + oy as i64, *p);
        }
    }
}

pub fn fill_rect(img: &mut RgbaImage, x: f32, y: f32, w: f32, h: f32, color: Rgba<u8>) {
    if w <= 0.0 || h <= 0.0 {
        return;
    }
    let x0 = x.round() as i64;
    let y0 = y.round() as i64;
    let x1 = (x + w).round() as i64;
    let y1 = (y + h).round() as i64;
    for py in y0..y1 {
        for px in x0..x1 {
            blend_px(img, px, py, color);
        }
    }
}

pub fn stroke_rect(
    img: &mut RgbaImage,
    x: f32,
    y: f32,
    w: f32,
    h: f32,
    line_width: f32,
    color: Rgba<u8>,
) {
    let lw = line_width.max(1.0);
    fill_rect(img, x, y, w, lw, color);
    fill_rect(img, x, y + h - lw, w, lw, color);
    fill_rect(img, x, y + lw, lw, h - 2.0 * lw, color);
    fill_rect(img, x + w - lw, y + lw, lw, h - 2.0 * lw, color);
}

/// Point-in-rounded-rect test in local box coordinates.
pub fn rounded_rect_contains(x: i32, y: i32, w: i32, h: i32, r: i32) -> bool {
    if x < 0 || y < 0 || x >= w || y >= h {
        return false;
    }
    if x >= r && x < w - r {
        return true;
    }
    if y >= r && y < h - r {
        return true;
    }
    let (cx, cy) = if x < r {
        if y < r {
            (r - 1, r - 1)
        } else {
            (r - 1, h - r)
        }
    } else if y < r {
        (w - r, r - 1)
    } else {
        (w - r, h - r)
    };
    let dx = x - cx;
    let dy = y - cy;
    dx * dx + dy * dy <= r * r
}

/// Fills a rounded rectangle, blending `color` (alpha respected) over the
/// existing pixels.
pub fn fill_rounded_rect(
    img: &mut RgbaImage,
    x: f32,
    y: f32,
    w: f32,
    h: f32,
    radius: f32,
    color: Rgba<u8>,
) {
    if w <= 0.0 || h <= 0.0 {
        return;
    }
    let x0 = x.round() as i64;
    let y0 = y.round() as i64;
    let wi = w.round() as i32;
    let hi = h.round() as i32;
    let r = radius.round().max(0.0) as i32;
    let r = r.min(wi / 2).min(hi / 2);
    for py in 0..hi {
        for px in 0..wi {
            if rounded_rect_contains(px, py, wi, hi, r) {
                blend_px(img, x0 + px as i64, y0 + py as i64, color);
            }
        }
    }
}

pub fn stroke_rounded_rect(
    img: &mut RgbaImage,
    x: f32,
    y: f32,
    w: f32,
    h: f32,
    radius: f32,
    line_width: f32,
    color: Rgba<u8>,
) {
    let wi = w.round() as i32;
    let hi = h.round() as i32;
    let r = (radius.round() as i32).min(wi / 2).min(hi / 2);
    let lw = line_width.round().max(1.0) as i32;
    let x0 = x.round() as i64;
    let y0 = y.round() as i64;
    for py in 0..hi {
        for px in 0..wi {
            let outer = rounded_rect_contains(px, py, wi, hi, r);
            let inner = rounded_rect_contains(
                px - lw,
                py - lw,
                wi - 2 * lw,
                hi - 2 * lw,
                (r - lw).max(0),
            );
            if outer && !inner {
                blend_px(img, x0 + px as i64, y0 + py as i64, color);
            }
        }
    }
}

/// Resizes `src` to (w, h) and blits it clipped to a rounded rectangle.
pub fn blit_rounded(
    img: &mut RgbaImage,
    src: &RgbaImage,
    x: f32,
    y: f32,
    w: f32,
    h: f32,
    radius: f32,
) {
    let wi = w.round().max(1.0) as u32;
    let hi = h.round().max(1.0) as u32;
    let scaled = if src.width() == wi && src.height() == hi {
        src.clone()
    } else {
        imageops::resize(src, wi, hi, imageops::FilterType::Lanczos3)
    };
    let x0 = x.round() as i64;
    let y0 = y.round() as i64;
    let r = radius.round().max(0.0) as i32;
    let r = r.min(wi as i32 / 2).min(hi as i32 / 2);
    for py in 0..hi {
        for px in 0..wi {
            if rounded_rect_contains(px as i32, py as i32, wi as i32, hi as i32, r) {
                blend_px(img, x0 + px as i64, y0 + py as i64, *scaled.get_pixel(px, py));
            }
        }
    }
}

pub fn fill_circle(img: &mut RgbaImage, cx: f32, cy: f32, r: f32, color: Rgba<u8>) {
    fill_ellipse(img, cx, cy, r, r, color);
}

pub fn fill_ellipse(img: &mut RgbaImage, cx: f32, cy: f32, rx: f32, ry: f32, color: Rgba<u8>) {
    if rx <= 0.0 || ry <= 0.0 {
        return;
    }
    let x0 = (cx - rx).floor() as i64;
    let x1 = (cx + rx).ceil() as i64;
    let y0 = (cy - ry).floor() as i64;
    let y1 = (cy + ry).ceil() as i64;
    for py in y0..=y1 {
        for px in x0..=x1 {
            let dx = (px as f32 + 0.5 - cx) / rx;
            let dy = (py as f32 + 0.5 - cy) / ry;
            if dx * dx + dy * dy <= 1.0 {
                blend_px(img, px, py, color);
            }
        }
    }
}

/// Even-odd scanline fill of a closed polygon.
pub fn fill_polygon(img: &mut RgbaImage, pts: &[(f32, f32)], color: Rgba<u8>) {
    if pts.len() < 3 {
        return;
    }
    let y_min = pts.iter().map(|p| p.1).fold(f32::INFINITY, f32::min).floor() as i64;
    let y_max = pts.iter().map(|p| p.1).fold(f32::NEG_INFINITY, f32::max).ceil() as i64;
    let mut xs: Vec<f32> = Vec::with_capacity(8);
    for py in y_min..=y_max {
        let yc = py as f32 + 0.5;
        xs.clear();
        for i in 0..pts.len() {
            let (x1, y1) = pts[i];
            let (x2, y2) = pts[(i + 1) % pts.len()];
            if (y1 <= yc && y2 > yc) || (y2 <= yc && y1 > yc) {
                let t = (yc - y1) / (y2 - y1);
                xs.push(x1 + t * (x2 - x1));
            }
        }
        xs.sort_by(|a, b| a.partial_cmp(b).unwrap());
        for pair in xs.chunks_exact(2) {
            let start = pair[0].round() as i64;
            let end = pair[1].round() as i64;
            for px in start..end {
                blend_px(img, px, py, color);
            }
        }
    }
}

/// Samples a cubic bezier into `steps` line segments (endpoint included).
pub fn cubic_bezier(
    p0: (f32, f32),
    p1: (f32, f32),
    p2: (f32, f32),
    p3: (f32, f32),
    steps: usize,
) -> Vec<(f32, f32)> {
    let mut out = Vec::with_capacity(steps + 1);
    for i in 0..=steps {
        let t = i as f32 / steps as f32;
        let u = 1.0 - t;
        let x = u * u * u * p0.0
            + 3.0 * u * u * t * p1.0
            + 3.0 * u * t * t * p2.0
            + t * t * t * p3.0;
        let y = u * u * u * p0.1
            + 3.0 * u * u * t * p1.1
            + 3.0 * u * t * t * p2.1
            + t * t * t * p3.1;
        out.push((x, y));
    }
    out
}

pub fn new_canvas(w: u32, h: u32) -> RgbaImage {
    ImageBuffer::from_pixel(w, h, Rgba([0, 0, 0, 0]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blend_ignores_out_of_bounds() {
        let mut img = new_canvas(4, 4);
        blend_px(&mut img, -1, 0, Rgba([255, 0, 0, 255]));
        blend_px(&mut img, 4, 4, Rgba([255, 0, 0, 255]));
        assert!(img.pixels().all(|p| p.0 == [0, 0, 0, 0]));
    }

    #[test]
    fn rounded_rect_corners_are_cut() {
        // 20x20 box, radius 6: the extreme corner pixel is outside the path,
        // the center of each edge is inside.
        assert!(!rounded_rect_contains(0, 0, 20, 20, 6));
        assert!(rounded_rect_contains(10, 0, 20, 20, 6));
        assert!(rounded_rect_contains(0, 10, 20, 20, 6));
        assert!(rounded_rect_contains(10, 10, 20, 20, 6));
        assert!(!rounded_rect_contains(19, 19, 20, 20, 6));
    }

    #[test]
    fn semi_transparent_fill_blends() {
        let mut img = ImageBuffer::from_pixel(2, 2, Rgba([255, 255, 255, 255]));
        fill_rect(&mut img, 0.0, 0.0, 2.0, 2.0, Rgba([0, 0, 0, 128]));
        let p = img.get_pixel(0, 0);
        assert!(p.0[0] > 100 && p.0[0] < 150, "blended gray, got {:?}", p);
    }

    #[test]
    fn polygon_fill_covers_triangle_interior() {
        let mut img = new_canvas(20, 20);
        fill_polygon(
            &mut img,
            &[(2.0, 2.0), (18.0, 2.0), (10.0, 18.0)],
            Rgba([255, 0, 0, 255]),
        );
        assert_eq!(img.get_pixel(10, 6).0, [255, 0, 0, 255]);
        assert_eq!(img.get_pixel(1, 18).0, [0, 0, 0, 0]);
    }

    #[test]
    fn overlay_respects_alpha_holes() {
        let mut base = ImageBuffer::from_pixel(4, 4, Rgba([10, 10, 10, 255]));
        let mut over = new_canvas(2, 2);
        over.put_pixel(0, 0, Rgba([200, 0, 0, 255]));
        overlay_alpha(&mut base, &over, 1, 1);
        assert_eq!(base.get_pixel(1, 1).0, [200, 0, 0, 255]);
        assert_eq!(base.get_pixel(2, 2).0, [10, 10, 10, 255]);
    }
}
