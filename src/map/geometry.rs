use glam::DVec2;

use crate::braille::BrailleCanvas;

/// Draw a line using Bresenham's algorithm
pub fn draw_line(canvas: &mut BrailleCanvas, x0: i32, y0: i32, x1: i32, y1: i32) {
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    let mut x = x0;
    let mut y = y0;

    loop {
        canvas.set_pixel_signed(x, y);

        if x == x1 && y == y1 {
            break;
        }

        let e2 = 2 * err;

        if e2 >= dy {
            if x == x1 {
                break;
            }
            err += dy;
            x += sx;
        }

        if e2 <= dx {
            if y == y1 {
                break;
            }
            err += dx;
            y += sy;
        }
    }
}

/// Stroke a closed ring given in pixel coordinates
pub fn stroke_ring(canvas: &mut BrailleCanvas, ring: &[DVec2]) {
    let w = canvas.pixel_width() as i32;
    let h = canvas.pixel_height() as i32;
    let Some(&last) = ring.last() else {
        return;
    };
    let mut prev = round(last);
    for &p in ring {
        let cur = round(p);
        // Skip segments entirely off one side of the canvas
        let off = (prev.0 < 0 && cur.0 < 0)
            || (prev.1 < 0 && cur.1 < 0)
            || (prev.0 >= w && cur.0 >= w)
            || (prev.1 >= h && cur.1 >= h);
        if !off {
            draw_line(canvas, prev.0, prev.1, cur.0, cur.1);
        }
        prev = cur;
    }
}

/// Fill rings (pixel coordinates) with the even-odd rule, sampling each
/// pixel row at its center
pub fn fill_rings(canvas: &mut BrailleCanvas, rings: &[Vec<DVec2>]) {
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for p in rings.iter().flatten() {
        min_y = min_y.min(p.y);
        max_y = max_y.max(p.y);
    }
    if !min_y.is_finite() || !max_y.is_finite() {
        return;
    }

    let y_start = (min_y.floor() as i32).max(0);
    let y_end = (max_y.ceil() as i32).min(canvas.pixel_height() as i32 - 1);
    let mut crossings: Vec<f64> = Vec::new();

    for y in y_start..=y_end {
        let yc = y as f64 + 0.5;
        crossings.clear();
        for ring in rings {
            let mut j = ring.len().wrapping_sub(1);
            for i in 0..ring.len() {
                let (a, b) = (ring[j], ring[i]);
                if (a.y <= yc) != (b.y <= yc) {
                    crossings.push(a.x + (yc - a.y) * (b.x - a.x) / (b.y - a.y));
                }
                j = i;
            }
        }
        crossings.sort_by(f64::total_cmp);
        for pair in crossings.chunks_exact(2) {
            let x0 = (pair[0] - 0.5).ceil() as i32;
            let x1 = (pair[1] - 0.5).floor() as i32;
            if x0 <= x1 {
                canvas.fill_span(y, x0, x1);
            }
        }
    }
}

#[inline]
fn round(p: DVec2) -> (i32, i32) {
    (p.x.round() as i32, p.y.round() as i32)
}
