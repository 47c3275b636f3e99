//! Scanline polygon filler: horizontal ray-crossing parity test per
//! polyline, combined via either the non-zero or even-odd winding rule.
//!
//! Despite "winding" in the name, this counts per-polyline crossing parity
//! rather than a true signed winding number — correct for the conventional
//! case of same-direction outer loops and opposite-direction holes, which is
//! what TinyVG artwork produces.

use crate::error::RenderError;
use crate::format::{Color, Style};
use crate::geom::Point;
use crate::render::Framebuffer;
use crate::style;

/// Polygon fill rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindingRule {
    NonZero,
    EvenOdd,
}

/// Fill every pixel covered (per `rule`) by the union of `polylines`, in the
/// logical-to-pixel mapping given by `scale_x`/`scale_y`.
pub fn fill(
    framebuffer: &mut dyn Framebuffer,
    color_table: &[Color],
    style: &Style,
    polylines: &[&[Point]],
    rule: WindingRule,
    scale_x: f64,
    scale_y: f64,
) -> Result<(), RenderError> {
    let Some((min_x, min_y, max_x, max_y)) =
        pixel_bbox(polylines, scale_x, scale_y, framebuffer.width(), framebuffer.height())
    else {
        return Ok(());
    };

    for py in min_y..=max_y {
        for px in min_x..=max_x {
            let p = Point::new(
                (px as f64 + 0.5) / scale_x,
                (py as f64 + 0.5) / scale_y,
            );

            let mut inside_count = 0u32;
            for polyline in polylines {
                if polyline.len() < 2 {
                    continue;
                }
                if crossing_parity(polyline, p) {
                    inside_count += 1;
                }
            }

            let covered = match rule {
                WindingRule::NonZero => inside_count > 0,
                WindingRule::EvenOdd => inside_count % 2 == 1,
            };

            if covered {
                let color = style::sample(style, color_table, p);
                framebuffer.set_pixel(px, py, color.to_rgba8());
            }
        }
    }

    Ok(())
}

/// Count ray crossings for a single polyline and return whether `p` is
/// inside it (odd number of crossings).
fn crossing_parity(points: &[Point], p: Point) -> bool {
    let n = points.len();
    let mut inside = false;

    for i in 0..n {
        let j = if i == 0 { n - 1 } else { i - 1 };
        let p0 = points[j];
        let p1 = points[i];

        if (p0.y > p.y) != (p1.y > p.y) {
            let x_intersect = (p1.x - p0.x) * (p.y - p0.y) / (p1.y - p0.y) + p0.x;
            if p.x < x_intersect {
                inside = !inside;
            }
        }
    }

    inside
}

/// Integer pixel bounding box over all polylines, clipped to the
/// framebuffer. Returns `None` if there is no geometry or the box is
/// entirely outside the framebuffer.
fn pixel_bbox(
    polylines: &[&[Point]],
    scale_x: f64,
    scale_y: f64,
    width: u32,
    height: u32,
) -> Option<(u32, u32, u32, u32)> {
    let mut min_x = f64::INFINITY;
    let mut min_y = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    let mut any = false;

    for polyline in polylines {
        for p in *polyline {
            any = true;
            min_x = min_x.min(p.x * scale_x);
            min_y = min_y.min(p.y * scale_y);
            max_x = max_x.max(p.x * scale_x);
            max_y = max_y.max(p.y * scale_y);
        }
    }

    if !any || width == 0 || height == 0 {
        return None;
    }

    let min_x = min_x.floor().max(0.0) as u32;
    let min_y = min_y.floor().max(0.0) as u32;
    let max_x = (max_x.ceil().max(0.0) as u32).min(width - 1);
    let max_y = (max_y.ceil().max(0.0) as u32).min(height - 1);

    if min_x > max_x || min_y > max_y {
        return None;
    }

    Some((min_x, min_y, max_x, max_y))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::test_support::RecordingFramebuffer;

    fn tri() -> Vec<Point> {
        vec![
            Point::new(10.0, 10.0),
            Point::new(90.0, 10.0),
            Point::new(50.0, 90.0),
        ]
    }

    #[test]
    fn triangle_non_zero_covers_apex_but_not_far_corner() {
        let mut fb = RecordingFramebuffer::new(100, 100);
        let colors = [Color::BLACK];
        let poly = tri();
        fill(
            &mut fb,
            &colors,
            &Style::Flat { color_index: 0 },
            &[&poly],
            WindingRule::NonZero,
            1.0,
            1.0,
        )
        .unwrap();

        assert!(fb.is_set(50, 50));
        assert!(!fb.is_set(5, 5));
    }

    #[test]
    fn even_odd_leaves_hole_for_nested_opposite_square() {
        let mut fb = RecordingFramebuffer::new(100, 100);
        let colors = [Color::WHITE];
        let outer = vec![
            Point::new(10.0, 10.0),
            Point::new(90.0, 10.0),
            Point::new(90.0, 90.0),
            Point::new(10.0, 90.0),
        ];
        let inner = vec![
            Point::new(30.0, 30.0),
            Point::new(70.0, 30.0),
            Point::new(70.0, 70.0),
            Point::new(30.0, 70.0),
        ];
        fill(
            &mut fb,
            &colors,
            &Style::Flat { color_index: 0 },
            &[&outer, &inner],
            WindingRule::EvenOdd,
            1.0,
            1.0,
        )
        .unwrap();

        assert!(fb.is_set(15, 15));
        assert!(!fb.is_set(50, 50));
    }

    #[test]
    fn bbox_clips_to_framebuffer() {
        let points = vec![
            Point::new(-50.0, -50.0),
            Point::new(150.0, -50.0),
            Point::new(150.0, 150.0),
            Point::new(-50.0, 150.0),
        ];
        let (min_x, min_y, max_x, max_y) =
            pixel_bbox(&[&points], 1.0, 1.0, 100, 100).unwrap();
        assert_eq!((min_x, min_y, max_x, max_y), (0, 0, 99, 99));
    }
}
