//! Converts a logical [`Path`](crate::format::Path) into a list of polylines
//! ready for the scanline filler / stroke rasterizer, subdividing Bezier
//! curves and circular/elliptical arcs into straight segments.
//!
//! Output is accumulated in fixed-capacity scratch arrays (spec budgets:
//! 4096 points, 512 sub-paths) so a single `render` call never grows the
//! heap for scratch geometry.

use crate::error::RenderError;
use crate::format::{Path, PathCommand, PathSegment};
use crate::geom::{approx_eq_pixel, Mat2, Point, Vec2};

/// Number of straight segments a cubic/quadratic Bezier is subdivided into.
pub const BEZIER_DIVS: usize = 16;

/// Number of straight segments a full circle is subdivided into; arcs use a
/// fraction of this proportional to their sweep angle.
pub const CIRCLE_DIVS: usize = 100;

const MAX_POINTS: usize = 4096;
const MAX_SEGMENTS: usize = 512;

/// Fixed-capacity accumulator of flattened polylines: one contiguous point
/// buffer plus an index of `(offset, len)` ranges, one per sub-path.
pub struct ScratchPath {
    points: [Point; MAX_POINTS],
    point_len: usize,
    ranges: [(usize, usize); MAX_SEGMENTS],
    range_len: usize,
}

impl ScratchPath {
    fn new() -> ScratchPath {
        ScratchPath {
            points: [Point::new(0.0, 0.0); MAX_POINTS],
            point_len: 0,
            ranges: [(0, 0); MAX_SEGMENTS],
            range_len: 0,
        }
    }

    /// Append a point to the current (last-started) sub-path, applying the
    /// pixel-delta dedup filter against the previously accepted point.
    fn push_point(&mut self, p: Point) -> Result<(), RenderError> {
        if !p.x.is_finite() || !p.y.is_finite() {
            return Err(RenderError::InvalidGeometry);
        }

        if let Some((_, len)) = self.ranges[..self.range_len].last() {
            if *len > 0 {
                let last = self.points[self.point_len - 1];
                if approx_eq_pixel(last, p) {
                    return Ok(());
                }
            }
        }

        if self.point_len >= MAX_POINTS {
            return Err(RenderError::OutOfScratch);
        }

        self.points[self.point_len] = p;
        self.point_len += 1;
        self.ranges[self.range_len - 1].1 += 1;

        Ok(())
    }

    /// Begin a new sub-path at `start`.
    fn start_segment(&mut self, start: Point) -> Result<(), RenderError> {
        if !start.x.is_finite() || !start.y.is_finite() {
            return Err(RenderError::InvalidGeometry);
        }

        if self.range_len >= MAX_SEGMENTS {
            return Err(RenderError::OutOfScratch);
        }
        if self.point_len >= MAX_POINTS {
            return Err(RenderError::OutOfScratch);
        }

        self.ranges[self.range_len] = (self.point_len, 0);
        self.range_len += 1;

        self.points[self.point_len] = start;
        self.point_len += 1;
        self.ranges[self.range_len - 1].1 = 1;

        Ok(())
    }

    /// The flattened sub-paths (polylines), in encounter order.
    pub fn polylines(&self) -> impl Iterator<Item = &[Point]> {
        self.ranges[..self.range_len]
            .iter()
            .map(move |&(off, len)| &self.points[off..off + len])
    }

    pub fn is_empty(&self) -> bool {
        self.range_len == 0
    }
}

/// Flatten every segment of `path` into the returned scratch buffer, one
/// polyline per segment.
pub fn flatten_path(path: &Path) -> Result<ScratchPath, RenderError> {
    let mut out = ScratchPath::new();

    for segment in &path.segments {
        flatten_segment(segment, &mut out)?;
    }

    Ok(out)
}

fn flatten_segment(segment: &PathSegment, out: &mut ScratchPath) -> Result<(), RenderError> {
    out.start_segment(segment.start)?;
    let mut cursor = segment.start;
    let seg_start = segment.start;

    for cmd in &segment.commands {
        cursor = apply_command(cmd, cursor, seg_start, out)?;
    }

    Ok(())
}

fn apply_command(
    cmd: &PathCommand,
    cursor: Point,
    seg_start: Point,
    out: &mut ScratchPath,
) -> Result<Point, RenderError> {
    match *cmd {
        PathCommand::Line { to } => {
            out.push_point(to)?;
            Ok(to)
        }
        PathCommand::Horiz { x } => {
            let p = Point::new(x, cursor.y);
            out.push_point(p)?;
            Ok(p)
        }
        PathCommand::Vert { y } => {
            let p = Point::new(cursor.x, y);
            out.push_point(p)?;
            Ok(p)
        }
        PathCommand::Bezier { c0, c1, p1 } => {
            flatten_cubic_bezier(cursor, c0, c1, p1, out)?;
            Ok(p1)
        }
        PathCommand::QuadraticBezier { c, p1 } => {
            flatten_quadratic_bezier(cursor, c, p1, out)?;
            Ok(p1)
        }
        PathCommand::ArcCircle {
            target,
            radius,
            large_arc,
            sweep,
        } => {
            flatten_arc_circle(cursor, target, radius, large_arc, sweep, out)?;
            Ok(target)
        }
        PathCommand::ArcEllipse {
            target,
            radius_x,
            radius_y,
            rotation_deg,
            large_arc,
            sweep,
        } => {
            flatten_arc_ellipse(
                cursor,
                target,
                radius_x,
                radius_y,
                rotation_deg,
                large_arc,
                sweep,
                out,
            )?;
            Ok(target)
        }
        PathCommand::Close => {
            out.push_point(seg_start)?;
            Ok(seg_start)
        }
    }
}

/// De Casteljau evaluation of a cubic Bezier at parameter `t`.
fn cubic_at(p0: Point, c0: Point, c1: Point, p1: Point, t: f64) -> Point {
    let lerp = |a: Point, b: Point| Point::new(a.x + (b.x - a.x) * t, a.y + (b.y - a.y) * t);
    let ab = lerp(p0, c0);
    let bc = lerp(c0, c1);
    let cd = lerp(c1, p1);
    let abc = lerp(ab, bc);
    let bcd = lerp(bc, cd);
    lerp(abc, bcd)
}

fn flatten_cubic_bezier(
    p0: Point,
    c0: Point,
    c1: Point,
    p1: Point,
    out: &mut ScratchPath,
) -> Result<(), RenderError> {
    for i in 1..BEZIER_DIVS {
        let t = i as f64 / BEZIER_DIVS as f64;
        out.push_point(cubic_at(p0, c0, c1, p1, t))?;
    }
    out.push_point(p1)?;
    Ok(())
}

fn quadratic_at(p0: Point, c: Point, p1: Point, t: f64) -> Point {
    let lerp = |a: Point, b: Point| Point::new(a.x + (b.x - a.x) * t, a.y + (b.y - a.y) * t);
    let ab = lerp(p0, c);
    let bc = lerp(c, p1);
    lerp(ab, bc)
}

fn flatten_quadratic_bezier(
    p0: Point,
    c: Point,
    p1: Point,
    out: &mut ScratchPath,
) -> Result<(), RenderError> {
    for i in 1..BEZIER_DIVS {
        let t = i as f64 / BEZIER_DIVS as f64;
        out.push_point(quadratic_at(p0, c, p1, t))?;
    }
    out.push_point(p1)?;
    Ok(())
}

const ARC_SKIP_EPSILON: f64 = 1e-5;

/// Raw circle-arc flattening shared by `flatten_arc_circle` and the ellipse
/// reduction in `flatten_arc_ellipse`. Writes up to `CIRCLE_DIVS` points
/// (not including `p0`) into `raw`, returning the number written.
fn raw_arc_circle(
    p0: Point,
    p1: Point,
    mut radius: f64,
    large_arc: bool,
    turn_left: bool,
    raw: &mut [Point; CIRCLE_DIVS],
) -> usize {
    if distance_leq(p0, p1, ARC_SKIP_EPSILON) {
        return 0;
    }

    let delta = Vec2::new((p1.x - p0.x) / 2.0, (p1.y - p0.y) / 2.0);
    let mid = Point::new(p0.x + delta.x, p0.y + delta.y);

    let chord = delta.hypot() * 2.0;
    if chord > 2.0 * radius {
        radius = chord / 2.0;
    }

    let left_side = (turn_left && large_arc) || (!turn_left && !large_arc);
    let perp = Vec2::new(-delta.y, delta.x);
    let radius_vec = if left_side {
        perp
    } else {
        Vec2::new(-perp.x, -perp.y)
    };

    let delta_len_sq = delta.x * delta.x + delta.y * delta.y;
    let t = if delta_len_sq > 0.0 {
        (radius * radius / delta_len_sq - 1.0).max(0.0).sqrt()
    } else {
        0.0
    };

    let center = Point::new(
        mid.x + t * radius_vec.x,
        mid.y + t * radius_vec.y,
    );

    let half_chord = delta.hypot();
    let ratio = if radius > 0.0 {
        (half_chord / radius).clamp(-1.0, 1.0)
    } else {
        0.0
    };
    let mut angle = 2.0 * ratio.asin();
    if large_arc {
        angle = std::f64::consts::TAU - angle;
    }

    let steps = CIRCLE_DIVS - 1;
    let sign = if turn_left { -1.0 } else { 1.0 };
    let step = sign * angle / CIRCLE_DIVS as f64;

    let rel0 = Vec2::new(p0.x - center.x, p0.y - center.y);

    for i in 1..=steps {
        let theta = step * i as f64;
        let (s, c) = theta.sin_cos();
        let rotated = Vec2::new(
            rel0.x * c - rel0.y * s,
            rel0.x * s + rel0.y * c,
        );
        raw[i - 1] = Point::new(center.x + rotated.x, center.y + rotated.y);
    }

    steps
}

fn distance_leq(a: Point, b: Point, eps: f64) -> bool {
    ((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt() <= eps
}

fn flatten_arc_circle(
    p0: Point,
    p1: Point,
    radius: f64,
    large_arc: bool,
    turn_left: bool,
    out: &mut ScratchPath,
) -> Result<(), RenderError> {
    if distance_leq(p0, p1, ARC_SKIP_EPSILON) {
        return Ok(());
    }

    let mut raw = [Point::new(0.0, 0.0); CIRCLE_DIVS];
    let n = raw_arc_circle(p0, p1, radius, large_arc, turn_left, &mut raw);

    for &p in &raw[..n] {
        out.push_point(p)?;
    }
    out.push_point(p1)?;

    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn flatten_arc_ellipse(
    p0: Point,
    p1: Point,
    radius_x: f64,
    radius_y: f64,
    rotation_deg: f64,
    large_arc: bool,
    turn_left: bool,
    out: &mut ScratchPath,
) -> Result<(), RenderError> {
    if distance_leq(p0, p1, ARC_SKIP_EPSILON) {
        return Ok(());
    }
    if radius_y.abs() < 1e-9 || radius_x.abs() < 1e-9 {
        // Degenerate ellipse: filter rather than divide by zero.
        out.push_point(p1)?;
        return Ok(());
    }

    let radius_min = distance_half(p0, p1);
    let radius_lim = (radius_x * radius_x + radius_y * radius_y).sqrt();
    let up_scale = (radius_min / radius_lim).max(1.0);

    let ratio = radius_x / radius_y;
    let rotation_rad = rotation_deg.to_radians();

    let m = Mat2::rotation(-rotation_rad)
        .mul(Mat2::scale_y(ratio))
        .scaled(1.0 / up_scale);
    let m_inv = m.inverse();

    let p0t = m.apply(p0);
    let p1t = m.apply(p1);

    let mut raw = [Point::new(0.0, 0.0); CIRCLE_DIVS];
    let n = raw_arc_circle(p0t, p1t, radius_x * up_scale, large_arc, turn_left, &mut raw);

    for &p in &raw[..n] {
        out.push_point(m_inv.apply(p))?;
    }
    out.push_point(p1)?;

    Ok(())
}

fn distance_half(a: Point, b: Point) -> f64 {
    ((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt() / 2.0
}
