//! Outline drawing on RGB frames.
//!
//! Rasterisation is `imageproc::drawing::draw_line_segment_mut`. It walks
//! every point of the segment, so endpoints are first clipped to the frame
//! (padded by the brush) to keep far-off projections cheap.

use image::{Rgb, RgbImage};
use imageproc::drawing::draw_line_segment_mut;
use nalgebra::Point2;

/// Clip the segment `a -> b` to `[x0, x1] x [y0, y1]` (Liang-Barsky).
fn clip_segment(
    a: (f64, f64),
    b: (f64, f64),
    (x0, y0, x1, y1): (f64, f64, f64, f64),
) -> Option<((f64, f64), (f64, f64))> {
    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    let (mut enter, mut leave) = (0.0f64, 1.0f64);
    for (p, q) in [
        (-dx, a.0 - x0),
        (dx, x1 - a.0),
        (-dy, a.1 - y0),
        (dy, y1 - a.1),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
        } else if p < 0.0 {
            enter = enter.max(q / p);
        } else {
            leave = leave.min(q / p);
        }
    }
    (enter <= leave).then(|| {
        (
            (a.0 + dx * enter, a.1 + dy * enter),
            (a.0 + dx * leave, a.1 + dy * leave),
        )
    })
}

/// Draw a segment `thickness` pixels wide by stamping offset copies of a
/// one-pixel line over a square brush.
pub fn draw_line(
    img: &mut RgbImage,
    p0: Point2<f32>,
    p1: Point2<f32>,
    color: Rgb<u8>,
    thickness: u32,
) {
    if !(p0.x.is_finite() && p0.y.is_finite() && p1.x.is_finite() && p1.y.is_finite()) {
        return;
    }
    let pad = thickness as f64;
    let bounds = (
        -pad,
        -pad,
        img.width() as f64 + pad,
        img.height() as f64 + pad,
    );
    let Some((a, b)) = clip_segment(
        (p0.x as f64, p0.y as f64),
        (p1.x as f64, p1.y as f64),
        bounds,
    ) else {
        return;
    };
    let (a, b) = ((a.0.round(), a.1.round()), (b.0.round(), b.1.round()));

    let side = thickness.max(1) as i32;
    let lo = -(side - 1) / 2;
    for oy in lo..lo + side {
        for ox in lo..lo + side {
            let (ox, oy) = (ox as f64, oy as f64);
            draw_line_segment_mut(
                img,
                ((a.0 + ox) as f32, (a.1 + oy) as f32),
                ((b.0 + ox) as f32, (b.1 + oy) as f32),
                color,
            );
        }
    }
}

/// Draw the closed polygon through `points`.
pub fn draw_polygon(img: &mut RgbImage, points: &[Point2<f32>], color: Rgb<u8>, thickness: u32) {
    for (i, &p) in points.iter().enumerate() {
        let q = points[(i + 1) % points.len()];
        draw_line(img, p, q, color, thickness);
    }
}
