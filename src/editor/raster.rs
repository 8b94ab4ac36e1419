// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Minimal opaque rasterization for mask layers.
//!
//! Mask pixels carry class colours, so shapes are drawn without
//! anti-aliasing: a pixel belongs to a shape when its centre does.

use crate::util::geometry::{GridGeometry, LineSegment};
use image::{Rgba, RgbaImage};

/// Colour of the outer grid border in the overlay.
pub const GRID_BORDER: Rgba<u8> = Rgba([0x00, 0xe5, 0xff, 0xff]);
/// Colour of the inner grid lines in the overlay.
pub const GRID_LINE: Rgba<u8> = Rgba([34, 211, 238, 242]);

/// Overwrite every pixel with `color`.
pub fn fill(img: &mut RgbaImage, color: Rgba<u8>) {
    for pixel in img.pixels_mut() {
        *pixel = color;
    }
}

/// Pixel index range covering `[lo, hi]` in continuous coordinates, clipped to `0..len`.
fn span(lo: f64, hi: f64, len: u32) -> Option<(u32, u32)> {
    if len == 0 || hi < 0.0 || lo >= f64::from(len) {
        return None;
    }
    let start = lo.floor().max(0.0) as u32;
    let end = (hi.ceil() as u32).min(len - 1);
    Some((start, end))
}

/// Filled circle centred at `(cx, cy)`.
pub fn fill_disc(img: &mut RgbaImage, cx: f64, cy: f64, radius: f64, color: Rgba<u8>) {
    let Some((x0, x1)) = span(cx - radius, cx + radius, img.width()) else {
        return;
    };
    let Some((y0, y1)) = span(cy - radius, cy + radius, img.height()) else {
        return;
    };
    let r2 = radius * radius;
    for y in y0..=y1 {
        for x in x0..=x1 {
            let dx = f64::from(x) + 0.5 - cx;
            let dy = f64::from(y) + 0.5 - cy;
            if dx * dx + dy * dy <= r2 {
                img.put_pixel(x, y, color);
            }
        }
    }
}

/// Squared distance from `(px, py)` to the segment `a`–`b`.
fn distance_sq_to_segment(px: f64, py: f64, ax: f64, ay: f64, bx: f64, by: f64) -> f64 {
    let dx = bx - ax;
    let dy = by - ay;
    let len_sq = dx * dx + dy * dy;
    let t = if len_sq == 0.0 {
        0.0
    } else {
        (((px - ax) * dx + (py - ay) * dy) / len_sq).clamp(0.0, 1.0)
    };
    let ex = px - (ax + t * dx);
    let ey = py - (ay + t * dy);
    ex * ex + ey * ey
}

/// Line of the given width with round caps and joins.
///
/// A zero-length segment paints a dot of diameter `width`.
pub fn stroke_segment(
    img: &mut RgbaImage,
    (x1, y1): (f64, f64),
    (x2, y2): (f64, f64),
    width: f64,
    color: Rgba<u8>,
) {
    let half = width.max(1.0) / 2.0;
    let Some((px0, px1)) = span(x1.min(x2) - half, x1.max(x2) + half, img.width()) else {
        return;
    };
    let Some((py0, py1)) = span(y1.min(y2) - half, y1.max(y2) + half, img.height()) else {
        return;
    };
    let half_sq = half * half;
    for y in py0..=py1 {
        for x in px0..=px1 {
            let cx = f64::from(x) + 0.5;
            let cy = f64::from(y) + 0.5;
            if distance_sq_to_segment(cx, cy, x1, y1, x2, y2) <= half_sq {
                img.put_pixel(x, y, color);
            }
        }
    }
}

/// Stroke every placed wall line with the same width and colour.
pub fn stroke_walls(img: &mut RgbaImage, lines: &[LineSegment], width: f64, color: Rgba<u8>) {
    for line in lines {
        stroke_segment(img, (line.x1, line.y1), (line.x2, line.y2), width, color);
    }
}

/// Transparent layer with the cyan grid drawn on it.
pub fn grid_layer(geometry: &GridGeometry, width: u32, height: u32) -> RgbaImage {
    let mut layer = RgbaImage::new(width, height);
    let (w, h) = (geometry.width, geometry.height);
    for (a, b) in [
        ((0.0, 0.0), (w, 0.0)),
        ((w, 0.0), (w, h)),
        ((w, h), (0.0, h)),
        ((0.0, h), (0.0, 0.0)),
    ] {
        stroke_segment(&mut layer, a, b, 2.0, GRID_BORDER);
    }
    for (x1, y1, x2, y2) in geometry.grid_lines() {
        stroke_segment(&mut layer, (x1, y1), (x2, y2), 1.0, GRID_LINE);
    }
    layer
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
    const CLEAR: Rgba<u8> = Rgba([0, 0, 0, 0]);

    #[test]
    fn test_fill() {
        let mut img = RgbaImage::new(4, 3);
        fill(&mut img, RED);
        assert!(img.pixels().all(|p| *p == RED));
    }

    #[test]
    fn test_disc_is_clipped_to_image() {
        let mut img = RgbaImage::new(10, 10);
        fill_disc(&mut img, 0.0, 0.0, 3.0, RED);
        assert_eq!(*img.get_pixel(0, 0), RED);
        assert_eq!(*img.get_pixel(1, 1), RED);
        assert_eq!(*img.get_pixel(5, 5), CLEAR);

        // Entirely off-canvas is a no-op
        fill_disc(&mut img, -50.0, -50.0, 3.0, RED);
        fill_disc(&mut img, 500.0, 5.0, 3.0, RED);
    }

    #[test]
    fn test_stroke_covers_segment_and_caps() {
        let mut img = RgbaImage::new(20, 20);
        stroke_segment(&mut img, (5.0, 10.0), (15.0, 10.0), 4.0, RED);
        assert_eq!(*img.get_pixel(10, 10), RED);
        assert_eq!(*img.get_pixel(10, 8), RED);
        // Round cap extends past the end point
        assert_eq!(*img.get_pixel(16, 10), RED);
        assert_eq!(*img.get_pixel(10, 14), CLEAR);
        assert_eq!(*img.get_pixel(19, 10), CLEAR);
    }

    #[test]
    fn test_zero_length_stroke_is_a_dot() {
        let mut img = RgbaImage::new(20, 20);
        stroke_segment(&mut img, (10.0, 10.0), (10.0, 10.0), 6.0, RED);
        assert_eq!(*img.get_pixel(10, 10), RED);
        assert_eq!(*img.get_pixel(9, 9), RED);
        assert_eq!(*img.get_pixel(14, 10), CLEAR);
    }

    #[test]
    fn test_grid_layer_leaves_cells_transparent() {
        let geometry = GridGeometry::new(90, 90);
        let layer = grid_layer(&geometry, 90, 90);
        assert_eq!(*layer.get_pixel(0, 45), GRID_BORDER);
        assert_eq!(*layer.get_pixel(30, 45), GRID_LINE);
        assert_eq!(*layer.get_pixel(15, 15), CLEAR);
    }
}
