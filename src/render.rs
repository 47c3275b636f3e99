//! Dispatcher: translates each [`DrawCommand`] into flatten/fill/stroke
//! calls and owns the logical-to-pixel scale factors.

use crate::error::RenderError;
use crate::fill::{self, WindingRule};
use crate::flatten;
use crate::format::{Color, DrawCommand, Header, Line, Rectangle, Style};
use crate::geom::Point;
use crate::stroke;

/// The capability a render target must expose. Deliberately narrow — one
/// mutator, two size accessors — so any owner-retained buffer (an in-memory
/// `Canvas`, a windowing surface, a test double) can implement it.
pub trait Framebuffer {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    fn set_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]);
}

/// Logical-to-pixel scale factors derived from the framebuffer and header
/// dimensions.
#[derive(Debug, Clone, Copy)]
pub struct Painter {
    pub scale_x: f64,
    pub scale_y: f64,
}

impl Painter {
    pub fn new(framebuffer: &dyn Framebuffer, header: &Header) -> Painter {
        let scale_x = if header.width == 0 {
            1.0
        } else {
            framebuffer.width() as f64 / header.width as f64
        };
        let scale_y = if header.height == 0 {
            1.0
        } else {
            framebuffer.height() as f64 / header.height as f64
        };
        Painter { scale_x, scale_y }
    }
}

/// Render a single `DrawCommand` into `framebuffer`.
pub fn render(
    framebuffer: &mut dyn Framebuffer,
    header: &Header,
    color_table: &[Color],
    command: &DrawCommand,
) -> Result<(), RenderError> {
    let painter = Painter::new(framebuffer, header);

    match command {
        DrawCommand::FillPolygon { style, vertices } => {
            fill_polygon(framebuffer, color_table, style, vertices, &painter)
        }
        DrawCommand::FillRectangles { style, rectangles } => {
            fill_rectangles(framebuffer, color_table, style, rectangles, &painter)
        }
        DrawCommand::FillPath { style, path } => fill_flattened_path(
            framebuffer,
            color_table,
            style,
            path,
            &painter,
            WindingRule::EvenOdd,
        ),
        DrawCommand::DrawLines {
            style,
            line_width,
            lines,
        } => draw_lines(framebuffer, color_table, style, *line_width, lines, &painter),
        DrawCommand::DrawLineStrip {
            style,
            line_width,
            vertices,
        } => draw_line_strip(
            framebuffer, color_table, style, *line_width, vertices, &painter, false,
        ),
        DrawCommand::DrawLineLoop {
            style,
            line_width,
            vertices,
        } => draw_line_strip(
            framebuffer, color_table, style, *line_width, vertices, &painter, true,
        ),
        DrawCommand::DrawLinePath {
            style,
            line_width,
            path,
        } => stroke_flattened_path(framebuffer, color_table, style, *line_width, path, &painter),
        DrawCommand::OutlineFillPolygon {
            fill_style,
            line_style,
            line_width,
            vertices,
        } => {
            fill_polygon(framebuffer, color_table, fill_style, vertices, &painter)?;
            draw_line_strip(
                framebuffer,
                color_table,
                line_style,
                *line_width,
                vertices,
                &painter,
                true,
            )
        }
        DrawCommand::OutlineFillRectangles {
            fill_style,
            line_style,
            line_width,
            rectangles,
        } => outline_fill_rectangles(
            framebuffer,
            color_table,
            fill_style,
            line_style,
            *line_width,
            rectangles,
            &painter,
        ),
        DrawCommand::OutlineFillPath {
            fill_style,
            line_style,
            line_width,
            path,
        } => {
            fill_flattened_path(
                framebuffer,
                color_table,
                fill_style,
                path,
                &painter,
                WindingRule::NonZero,
            )?;
            stroke_flattened_path(framebuffer, color_table, line_style, *line_width, path, &painter)
        }
    }
}

fn fill_polygon(
    framebuffer: &mut dyn Framebuffer,
    color_table: &[Color],
    style: &Style,
    vertices: &[Point],
    painter: &Painter,
) -> Result<(), RenderError> {
    fill::fill(
        framebuffer,
        color_table,
        style,
        &[vertices],
        WindingRule::NonZero,
        painter.scale_x,
        painter.scale_y,
    )
}

fn fill_rectangles(
    framebuffer: &mut dyn Framebuffer,
    color_table: &[Color],
    style: &Style,
    rectangles: &[Rectangle],
    painter: &Painter,
) -> Result<(), RenderError> {
    for rect in rectangles {
        let corners = rect.corners();
        fill::fill(
            framebuffer,
            color_table,
            style,
            &[&corners],
            WindingRule::NonZero,
            painter.scale_x,
            painter.scale_y,
        )?;
    }
    Ok(())
}

fn fill_flattened_path(
    framebuffer: &mut dyn Framebuffer,
    color_table: &[Color],
    style: &Style,
    path: &crate::format::Path,
    painter: &Painter,
    rule: WindingRule,
) -> Result<(), RenderError> {
    let scratch = flatten::flatten_path(path)?;
    let polylines: Vec<&[Point]> = scratch.polylines().collect();
    fill::fill(
        framebuffer,
        color_table,
        style,
        &polylines,
        rule,
        painter.scale_x,
        painter.scale_y,
    )
}

fn draw_lines(
    framebuffer: &mut dyn Framebuffer,
    color_table: &[Color],
    style: &Style,
    line_width: f64,
    lines: &[Line],
    painter: &Painter,
) -> Result<(), RenderError> {
    for line in lines {
        stroke::stroke_line(
            framebuffer,
            color_table,
            style,
            line_width,
            line_width,
            *line,
            painter.scale_x,
            painter.scale_y,
        )?;
    }
    Ok(())
}

fn draw_line_strip(
    framebuffer: &mut dyn Framebuffer,
    color_table: &[Color],
    style: &Style,
    line_width: f64,
    vertices: &[Point],
    painter: &Painter,
    close: bool,
) -> Result<(), RenderError> {
    if vertices.len() < 2 {
        return Ok(());
    }

    for pair in vertices.windows(2) {
        stroke::stroke_line(
            framebuffer,
            color_table,
            style,
            line_width,
            line_width,
            Line {
                start: pair[0],
                end: pair[1],
            },
            painter.scale_x,
            painter.scale_y,
        )?;
    }

    if close {
        stroke::stroke_line(
            framebuffer,
            color_table,
            style,
            line_width,
            line_width,
            Line {
                start: *vertices.last().unwrap(),
                end: vertices[0],
            },
            painter.scale_x,
            painter.scale_y,
        )?;
    }

    Ok(())
}

fn stroke_flattened_path(
    framebuffer: &mut dyn Framebuffer,
    color_table: &[Color],
    style: &Style,
    line_width: f64,
    path: &crate::format::Path,
    painter: &Painter,
) -> Result<(), RenderError> {
    let scratch = flatten::flatten_path(path)?;
    for polyline in scratch.polylines() {
        if polyline.len() < 2 {
            continue;
        }
        for pair in polyline.windows(2) {
            stroke::stroke_line(
                framebuffer,
                color_table,
                style,
                line_width,
                line_width,
                Line {
                    start: pair[0],
                    end: pair[1],
                },
                painter.scale_x,
                painter.scale_y,
            )?;
        }
    }
    Ok(())
}

fn outline_fill_rectangles(
    framebuffer: &mut dyn Framebuffer,
    color_table: &[Color],
    fill_style: &Style,
    line_style: &Style,
    line_width: f64,
    rectangles: &[Rectangle],
    painter: &Painter,
) -> Result<(), RenderError> {
    for rect in rectangles {
        let corners = rect.corners();
        fill::fill(
            framebuffer,
            color_table,
            fill_style,
            &[&corners],
            WindingRule::NonZero,
            painter.scale_x,
            painter.scale_y,
        )?;

        // TL -> TR -> BR -> BL -> TL corner traversal order.
        for i in 0..4 {
            let start = corners[i];
            let end = corners[(i + 1) % 4];
            stroke::stroke_line(
                framebuffer,
                color_table,
                line_style,
                line_width,
                line_width,
                Line { start, end },
                painter.scale_x,
                painter.scale_y,
            )?;
        }
    }
    Ok(())
}


#[cfg(test)]
mod tests {
    use super::test_support::RecordingFramebuffer;
    use super::*;

    fn header(w: u32, h: u32) -> Header {
        Header {
            version: 1,
            scale: 0,
            color_encoding: crate::format::ColorEncoding::Rgba8888,
            coordinate_range: crate::format::CoordinateRange::Default,
            width: w,
            height: h,
            color_count: 0,
        }
    }

    #[test]
    fn flat_square_fills_exact_region() {
        let mut fb = RecordingFramebuffer::new(100, 100);
        let colors = [Color::BLACK, Color::WHITE, Color::new(1.0, 0.0, 0.0, 1.0)];
        let cmd = DrawCommand::FillRectangles {
            style: Style::Flat { color_index: 1 },
            rectangles: vec![Rectangle {
                x: 10.0,
                y: 10.0,
                width: 20.0,
                height: 20.0,
            }],
        };
        render(&mut fb, &header(100, 100), &colors, &cmd).unwrap();

        for y in 10..30 {
            for x in 10..30 {
                assert!(fb.is_set(x, y), "expected ({x},{y}) set");
            }
        }
        assert!(!fb.is_set(9, 15));
        assert!(!fb.is_set(30, 15));
    }

    #[test]
    fn rectangle_fill_matches_polygon_over_corners() {
        let colors = [Color::WHITE];
        let rect = Rectangle {
            x: 10.0,
            y: 10.0,
            width: 20.0,
            height: 20.0,
        };

        let mut fb_rect = RecordingFramebuffer::new(100, 100);
        render(
            &mut fb_rect,
            &header(100, 100),
            &colors,
            &DrawCommand::FillRectangles {
                style: Style::Flat { color_index: 0 },
                rectangles: vec![rect],
            },
        )
        .unwrap();

        let mut fb_poly = RecordingFramebuffer::new(100, 100);
        render(
            &mut fb_poly,
            &header(100, 100),
            &colors,
            &DrawCommand::FillPolygon {
                style: Style::Flat { color_index: 0 },
                vertices: rect.corners().to_vec(),
            },
        )
        .unwrap();

        assert_eq!(fb_rect.pixels_set(), fb_poly.pixels_set());
    }

    #[test]
    fn outline_fill_path_uses_non_zero_not_even_odd() {
        use crate::format::{Path, PathCommand, PathSegment};

        // Two same-direction, non-overlapping closed squares in one path.
        // Under even-odd both squares are filled anyway (each has its own
        // parity), so use two *nested* squares instead: even-odd would
        // punch a hole in the inner square, non-zero fills it solid.
        let outer = PathSegment {
            start: Point::new(10.0, 10.0),
            commands: vec![
                PathCommand::Line { to: Point::new(90.0, 10.0) },
                PathCommand::Line { to: Point::new(90.0, 90.0) },
                PathCommand::Line { to: Point::new(10.0, 90.0) },
                PathCommand::Close,
            ],
        };
        let inner = PathSegment {
            start: Point::new(30.0, 30.0),
            commands: vec![
                PathCommand::Line { to: Point::new(70.0, 30.0) },
                PathCommand::Line { to: Point::new(70.0, 70.0) },
                PathCommand::Line { to: Point::new(30.0, 70.0) },
                PathCommand::Close,
            ],
        };
        let path = Path {
            segments: vec![outer, inner],
        };

        let colors = [Color::WHITE];
        let mut fb = RecordingFramebuffer::new(100, 100);
        render(
            &mut fb,
            &header(100, 100),
            &colors,
            &DrawCommand::OutlineFillPath {
                fill_style: Style::Flat { color_index: 0 },
                line_style: Style::Flat { color_index: 0 },
                line_width: 1.0,
                path: path.clone(),
            },
        )
        .unwrap();
        assert!(
            fb.is_set(50, 50),
            "outline_fill_path must fill with non-zero, leaving the inner square solid"
        );

        let mut fb_even_odd = RecordingFramebuffer::new(100, 100);
        render(
            &mut fb_even_odd,
            &header(100, 100),
            &colors,
            &DrawCommand::FillPath {
                style: Style::Flat { color_index: 0 },
                path,
            },
        )
        .unwrap();
        assert!(
            !fb_even_odd.is_set(50, 50),
            "fill_path must still use even-odd, leaving the inner square a hole"
        );
    }

    #[test]
    fn scale_factors_follow_framebuffer_to_header_ratio() {
        let fb = RecordingFramebuffer::new(200, 100);
        let painter = Painter::new(&fb, &header(100, 100));
        assert_eq!(painter.scale_x, 2.0);
        assert_eq!(painter.scale_y, 1.0);
    }
}
