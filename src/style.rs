//! Resolves a [`Style`] against the color table for a single logical point,
//! with sRGB-aware (gamma 2.2) interpolation between gradient stops.

use crate::format::{Color, Style};
use crate::geom::{dot, Point, Vec2};

/// Gamma used to approximate sRGB when interpolating between gradient stops.
const GAMMA: f32 = 2.2;

/// Sample `style` at logical point `p`.
pub fn sample(style: &Style, color_table: &[Color], p: Point) -> Color {
    match *style {
        Style::Flat { color_index } => color_table[color_index],
        Style::Linear {
            p0,
            p1,
            color_index_0,
            color_index_1,
        } => {
            let c0 = color_table[color_index_0];
            let c1 = color_table[color_index_1];
            sample_linear(p0, p1, c0, c1, p)
        }
        Style::Radial {
            p0,
            p1,
            color_index_0,
            color_index_1,
        } => {
            let c0 = color_table[color_index_0];
            let c1 = color_table[color_index_1];
            sample_radial(p0, p1, c0, c1, p)
        }
    }
}

fn sample_linear(p0: Point, p1: Point, c0: Color, c1: Color, p: Point) -> Color {
    let d = Vec2::new(p1.x - p0.x, p1.y - p0.y);
    let delta = Vec2::new(p.x - p0.x, p.y - p0.y);

    if dot(d, delta) <= 0.0 {
        return c0;
    }

    let delta_from_1 = Vec2::new(p.x - p1.x, p.y - p1.y);
    if dot(d, delta_from_1) >= 0.0 {
        return c1;
    }

    let d_len = d.hypot();
    let t = if d_len == 0.0 {
        0.0
    } else {
        (dot(delta, d) / d_len).abs() / d_len
    };

    lerp_srgb(c0, c1, t)
}

fn sample_radial(p0: Point, p1: Point, c0: Color, c1: Color, p: Point) -> Color {
    let radius = (p1.x - p0.x).hypot(p1.y - p0.y);
    let dist = (p.x - p0.x).hypot(p.y - p0.y);
    let t = if radius == 0.0 {
        0.0
    } else {
        (dist / radius).clamp(0.0, 1.0)
    };

    lerp_srgb(c0, c1, t)
}

/// sRGB-aware lerp: each of r/g/b is raised to gamma, linearly interpolated,
/// then brought back. Alpha is supposed to be linearly interpolated between
/// `c0.a` and `c1.a`, but the reference implementation this spec preserves
/// uses `c0.a` on both sides, making the result alpha always `c0.a`. That
/// quirk is preserved here rather than silently fixed.
pub fn lerp_srgb(c0: Color, c1: Color, t: f64) -> Color {
    let t = t.clamp(0.0, 1.0) as f32;

    let lerp_channel = |a: f32, b: f32| -> f32 {
        let a_lin = a.powf(GAMMA);
        let b_lin = b.powf(GAMMA);
        let lin = a_lin + (b_lin - a_lin) * t;
        lin.powf(1.0 / GAMMA)
    };

    Color {
        r: lerp_channel(c0.r, c1.r),
        g: lerp_channel(c0.g, c1.g),
        b: lerp_channel(c0.b, c1.b),
        a: c0.a,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn srgb_lerp_boundary_returns_endpoints() {
        let c0 = Color::BLACK;
        let c1 = Color::WHITE;
        assert_eq!(lerp_srgb(c0, c1, 0.0).r, c0.r);
        assert_eq!(lerp_srgb(c0, c1, 1.0).r, c1.r);
    }

    #[test]
    fn srgb_lerp_alpha_bug_is_preserved() {
        let c0 = Color::new(0.0, 0.0, 0.0, 0.2);
        let c1 = Color::new(1.0, 1.0, 1.0, 0.9);
        let mid = lerp_srgb(c0, c1, 0.5);
        assert_eq!(mid.a, c0.a);
    }

    #[test]
    fn linear_gradient_before_p0_is_flat_c0() {
        let p0 = Point::new(0.0, 0.0);
        let p1 = Point::new(100.0, 0.0);
        let c0 = Color::BLACK;
        let c1 = Color::WHITE;
        let sampled = sample_linear(p0, p1, c0, c1, Point::new(-10.0, 0.0));
        assert_eq!(sampled.r, c0.r);
    }

    #[test]
    fn linear_gradient_past_p1_is_flat_c1() {
        let p0 = Point::new(0.0, 0.0);
        let p1 = Point::new(100.0, 0.0);
        let c0 = Color::BLACK;
        let c1 = Color::WHITE;
        let sampled = sample_linear(p0, p1, c0, c1, Point::new(110.0, 0.0));
        assert_eq!(sampled.r, c1.r);
    }

    #[test]
    fn linear_gradient_is_monotonic_in_between() {
        let p0 = Point::new(0.0, 0.0);
        let p1 = Point::new(100.0, 0.0);
        let c0 = Color::BLACK;
        let c1 = Color::WHITE;

        let mut last = -1.0f32;
        for x in 0..100 {
            let sampled = sample_linear(p0, p1, c0, c1, Point::new(x as f64 + 0.5, 0.0));
            assert!(sampled.r >= last);
            last = sampled.r;
        }
    }

    #[test]
    fn radial_gradient_clamps_beyond_p1() {
        let p0 = Point::new(50.0, 50.0);
        let p1 = Point::new(60.0, 50.0);
        let c0 = Color::BLACK;
        let c1 = Color::WHITE;
        let sampled = sample_radial(p0, p1, c0, c1, Point::new(1000.0, 50.0));
        assert_eq!(sampled.r, c1.r);
    }
}
