//! Stroke rasterizer: renders a line segment as a rounded capsule with
//! (possibly distinct) radii at each end, using an exact signed-distance
//! function (Inigo Quilez's uneven-capsule SDF, reproduced verbatim).

use crate::error::RenderError;
use crate::format::{Color, Line, Style};
use crate::geom::{cross, dot, Point, Vec2};
use crate::render::Framebuffer;
use crate::style;

/// Floor radius so hairline widths stay visible at one pixel.
const MIN_RADIUS: f64 = 0.35;

/// Rasterize `line` as a capsule with radius `width_start/2` at `line.start`
/// and `width_end/2` at `line.end` (each floored at [`MIN_RADIUS`]).
pub fn stroke_line(
    framebuffer: &mut dyn Framebuffer,
    color_table: &[Color],
    style: &Style,
    width_start: f64,
    width_end: f64,
    line: Line,
    scale_x: f64,
    scale_y: f64,
) -> Result<(), RenderError> {
    let ra = (width_start / 2.0).max(MIN_RADIUS);
    let rb = (width_end / 2.0).max(MIN_RADIUS);

    let expand = width_start.max(width_end).max(2.0 * MIN_RADIUS);

    let min_lx = line.start.x.min(line.end.x) - expand;
    let max_lx = line.start.x.max(line.end.x) + expand;
    let min_ly = line.start.y.min(line.end.y) - expand;
    let max_ly = line.start.y.max(line.end.y) + expand;

    let width = framebuffer.width();
    let height = framebuffer.height();
    if width == 0 || height == 0 {
        return Ok(());
    }

    let min_px = (min_lx * scale_x).floor().max(0.0) as u32;
    let min_py = (min_ly * scale_y).floor().max(0.0) as u32;
    let max_px = ((max_lx * scale_x).ceil().max(0.0) as u32).min(width - 1);
    let max_py = ((max_ly * scale_y).ceil().max(0.0) as u32).min(height - 1);

    if min_px > max_px || min_py > max_py {
        return Ok(());
    }

    for py in min_py..=max_py {
        for px in min_px..=max_px {
            let p = Point::new(
                (px as f64 + 0.5) / scale_x,
                (py as f64 + 0.5) / scale_y,
            );

            if capsule_sdf(p, line.start, line.end, ra, rb) <= 0.0 {
                let color = style::sample(style, color_table, p);
                framebuffer.set_pixel(px, py, color.to_rgba8());
            }
        }
    }

    Ok(())
}

/// Exact signed distance from `p` to the capsule spanned by `pa`-`pb` with
/// radii `ra` (at `pa`) and `rb` (at `pb`). Negative inside, zero on the
/// boundary, positive outside.
fn capsule_sdf(p: Point, pa: Point, pb: Point, ra: f64, rb: f64) -> f64 {
    let p = Vec2::new(p.x - pa.x, p.y - pa.y);
    let pb = Vec2::new(pb.x - pa.x, pb.y - pa.y);

    let h = dot(pb, pb);
    if h == 0.0 {
        // Degenerate zero-length line: distance to the single radius-ra disc.
        return p.hypot() - ra;
    }

    let qx = (dot(p, Vec2::new(pb.y, -pb.x)) / h).abs();
    let qy = dot(p, pb) / h;

    let b = ra - rb;
    let c_x = (h - b * b).max(0.0).sqrt();
    let c_y = b;

    let c = Vec2::new(c_x, c_y);
    let q = Vec2::new(qx, qy);
    let k = cross(c, q);
    let m = dot(c, q);
    let n = dot(q, q);

    if k < 0.0 {
        (h * n).sqrt() - ra
    } else if k > c_x {
        (h * (n + 1.0 - 2.0 * qy)).sqrt() - rb
    } else {
        m - ra
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::test_support::RecordingFramebuffer;

    #[test]
    fn horizontal_line_covers_expected_band() {
        let mut fb = RecordingFramebuffer::new(100, 100);
        let colors = [Color::BLACK];
        let line = Line {
            start: Point::new(5.0, 50.0),
            end: Point::new(95.0, 50.0),
        };
        stroke_line(
            &mut fb,
            &colors,
            &Style::Flat { color_index: 0 },
            1.0,
            1.0,
            line,
            1.0,
            1.0,
        )
        .unwrap();

        assert!(fb.is_set(50, 50));
        assert!(fb.is_set(5, 50));
        assert!(fb.is_set(95, 50));
        assert!(!fb.is_set(50, 55));
    }

    #[test]
    fn constant_width_capsule_is_symmetric_under_endpoint_swap() {
        let colors = [Color::BLACK];
        let style = Style::Flat { color_index: 0 };

        let mut fb_ab = RecordingFramebuffer::new(60, 60);
        let line_ab = Line {
            start: Point::new(10.0, 10.0),
            end: Point::new(50.0, 40.0),
        };
        stroke_line(&mut fb_ab, &colors, &style, 4.0, 4.0, line_ab, 1.0, 1.0).unwrap();

        let mut fb_ba = RecordingFramebuffer::new(60, 60);
        let line_ba = Line {
            start: Point::new(50.0, 40.0),
            end: Point::new(10.0, 10.0),
        };
        stroke_line(&mut fb_ba, &colors, &style, 4.0, 4.0, line_ba, 1.0, 1.0).unwrap();

        assert_eq!(fb_ab.pixels_set(), fb_ba.pixels_set());
    }

    #[test]
    fn hairline_floor_keeps_zero_width_visible() {
        let mut fb = RecordingFramebuffer::new(20, 20);
        let colors = [Color::BLACK];
        let line = Line {
            start: Point::new(10.0, 10.0),
            end: Point::new(10.0, 10.0),
        };
        stroke_line(
            &mut fb,
            &colors,
            &Style::Flat { color_index: 0 },
            0.0,
            0.0,
            line,
            1.0,
            1.0,
        )
        .unwrap();
        assert!(fb.is_set(10, 10));
    }
}
