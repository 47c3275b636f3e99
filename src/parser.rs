//! Binary TinyVG decoder: turns a byte stream into the in-memory
//! [`Header`]/[`Color`] table/[`DrawCommand`] stream the renderer consumes.
//! The wire format is an external collaborator to the rendering core,
//! implemented concretely here so the crate ships a runnable decoder rather
//! than stopping at a sketched contract.

use byteorder::{ReadBytesExt, LE};
use std::io::Cursor;

use crate::error::ParseError;
use crate::format::{
    Color, ColorEncoding, CoordinateRange, DrawCommand, Header, Line, Path, PathCommand,
    PathSegment, Rectangle, Style,
};
use crate::geom::Point;

const MAGIC: [u8; 2] = [0x72, 0x56];

struct Reader<'a> {
    cursor: Cursor<&'a [u8]>,
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8]) -> Reader<'a> {
        Reader {
            cursor: Cursor::new(data),
        }
    }

    fn u8(&mut self) -> Result<u8, ParseError> {
        self.cursor.read_u8().map_err(|_| ParseError::UnexpectedEof)
    }

    fn u16(&mut self) -> Result<u16, ParseError> {
        self.cursor
            .read_u16::<LE>()
            .map_err(|_| ParseError::UnexpectedEof)
    }

    fn u32(&mut self) -> Result<u32, ParseError> {
        self.cursor
            .read_u32::<LE>()
            .map_err(|_| ParseError::UnexpectedEof)
    }

    fn i8(&mut self) -> Result<i8, ParseError> {
        self.cursor.read_i8().map_err(|_| ParseError::UnexpectedEof)
    }

    fn i16(&mut self) -> Result<i16, ParseError> {
        self.cursor
            .read_i16::<LE>()
            .map_err(|_| ParseError::UnexpectedEof)
    }

    fn i32(&mut self) -> Result<i32, ParseError> {
        self.cursor
            .read_i32::<LE>()
            .map_err(|_| ParseError::UnexpectedEof)
    }

    fn f32(&mut self) -> Result<f32, ParseError> {
        self.cursor
            .read_f32::<LE>()
            .map_err(|_| ParseError::UnexpectedEof)
    }

    fn at_eof(&self) -> bool {
        self.cursor.position() as usize >= self.cursor.get_ref().len()
    }

    /// 7-bits-per-byte unsigned varint, MSB of each byte means "continue".
    fn var_uint(&mut self) -> Result<u32, ParseError> {
        let mut result: u32 = 0;
        let mut shift = 0u32;
        loop {
            let byte = self.u8()?;
            result |= ((byte & 0x7F) as u32) << shift;
            if byte & 0x80 == 0 {
                break;
            }
            shift += 7;
            if shift >= 32 {
                return Err(ParseError::UnexpectedEof);
            }
        }
        Ok(result)
    }

    fn unit(&mut self, header: &Header) -> Result<f64, ParseError> {
        let raw = match header.coordinate_range {
            CoordinateRange::Reduced => self.i8()? as i64,
            CoordinateRange::Default => self.i16()? as i64,
            CoordinateRange::Enhanced => self.i32()? as i64,
        };
        Ok(raw as f64 / (1u32 << header.scale) as f64)
    }
}

fn read_point(r: &mut Reader, header: &Header) -> Result<Point, ParseError> {
    let x = r.unit(header)?;
    let y = r.unit(header)?;
    Ok(Point::new(x, y))
}

fn parse_header(r: &mut Reader) -> Result<Header, ParseError> {
    let magic = [r.u8()?, r.u8()?];
    if magic != MAGIC {
        return Err(ParseError::BadMagic);
    }

    let version = r.u8()?;
    if version != 1 {
        return Err(ParseError::UnsupportedVersion(version));
    }

    let scale_byte = r.u8()?;
    let scale = (scale_byte & 0xF0) >> 4;
    let color_encoding = match (scale_byte & 0b0000_1100) >> 2 {
        0 => ColorEncoding::Rgba8888,
        1 => ColorEncoding::Rgb565,
        2 => ColorEncoding::RgbaF32,
        _ => return Err(ParseError::InvalidColorEncoding),
    };
    let coordinate_range = match scale_byte & 0b0000_0011 {
        0 => CoordinateRange::Default,
        1 => CoordinateRange::Reduced,
        2 => CoordinateRange::Enhanced,
        _ => return Err(ParseError::InvalidCoordinateRange),
    };

    let mut header = Header {
        version,
        scale,
        color_encoding,
        coordinate_range,
        width: 0,
        height: 0,
        color_count: 0,
    };

    header.width = read_dimension(r, coordinate_range)?;
    header.height = read_dimension(r, coordinate_range)?;
    header.color_count = r.var_uint()?;

    Ok(header)
}

fn read_dimension(r: &mut Reader, coordinate_range: CoordinateRange) -> Result<u32, ParseError> {
    match coordinate_range {
        CoordinateRange::Reduced => Ok(r.u8()? as u32),
        CoordinateRange::Default => Ok(r.u16()? as u32),
        CoordinateRange::Enhanced => r.u32(),
    }
}

fn parse_color_table(r: &mut Reader, header: &Header) -> Result<Vec<Color>, ParseError> {
    (0..header.color_count)
        .map(|_| match header.color_encoding {
            ColorEncoding::Rgba8888 => parse_color_8888(r),
            ColorEncoding::RgbaF32 => parse_color_f32(r),
            ColorEncoding::Rgb565 => parse_color_565(r),
        })
        .collect()
}

fn parse_color_8888(r: &mut Reader) -> Result<Color, ParseError> {
    let red = r.u8()?;
    let green = r.u8()?;
    let blue = r.u8()?;
    let alpha = r.u8()?;
    Ok(Color {
        r: red as f32 / 255.0,
        g: green as f32 / 255.0,
        b: blue as f32 / 255.0,
        a: alpha as f32 / 255.0,
    })
}

fn parse_color_f32(r: &mut Reader) -> Result<Color, ParseError> {
    Ok(Color {
        r: r.f32()?,
        g: r.f32()?,
        b: r.f32()?,
        a: r.f32()?,
    })
}

fn parse_color_565(r: &mut Reader) -> Result<Color, ParseError> {
    let rgb = r.u16()?;
    Ok(Color {
        r: ((rgb & 0x001F) as f32) / 31.0,
        g: (((rgb & 0x07E0) >> 5) as f32) / 63.0,
        b: (((rgb & 0xF800) >> 11) as f32) / 31.0,
        a: 1.0,
    })
}

const CMD_END_OF_DOCUMENT: u8 = 0;
const CMD_FILL_POLYGON: u8 = 1;
const CMD_FILL_RECTANGLES: u8 = 2;
const CMD_FILL_PATH: u8 = 3;
const CMD_DRAW_LINES: u8 = 4;
const CMD_DRAW_LINE_LOOP: u8 = 5;
const CMD_DRAW_LINE_STRIP: u8 = 6;
const CMD_DRAW_LINE_PATH: u8 = 7;
const CMD_OUTLINE_FILL_POLYGON: u8 = 8;
const CMD_OUTLINE_FILL_RECTANGLES: u8 = 9;
const CMD_OUTLINE_FILL_PATH: u8 = 10;

fn read_style(r: &mut Reader, header: &Header, kind: u8) -> Result<Style, ParseError> {
    match kind {
        0 => Ok(Style::Flat {
            color_index: r.var_uint()? as usize,
        }),
        1 => {
            let p0 = read_point(r, header)?;
            let p1 = read_point(r, header)?;
            let color_index_0 = r.var_uint()? as usize;
            let color_index_1 = r.var_uint()? as usize;
            Ok(Style::Linear {
                p0,
                p1,
                color_index_0,
                color_index_1,
            })
        }
        2 => {
            let p0 = read_point(r, header)?;
            let p1 = read_point(r, header)?;
            let color_index_0 = r.var_uint()? as usize;
            let color_index_1 = r.var_uint()? as usize;
            Ok(Style::Radial {
                p0,
                p1,
                color_index_0,
                color_index_1,
            })
        }
        _ => Err(ParseError::InvalidColorEncoding),
    }
}

fn read_path(r: &mut Reader, header: &Header) -> Result<Path, ParseError> {
    let segment_count = r.var_uint()?;
    let mut segments = Vec::with_capacity(segment_count as usize);

    for _ in 0..segment_count {
        let start = read_point(r, header)?;
        let command_count = r.var_uint()?;
        let mut commands = Vec::with_capacity(command_count as usize);

        for _ in 0..command_count {
            commands.push(read_path_command(r, header)?);
        }

        segments.push(PathSegment { start, commands });
    }

    Ok(Path { segments })
}

fn read_path_command(r: &mut Reader, header: &Header) -> Result<PathCommand, ParseError> {
    let tag = r.u8()?;
    Ok(match tag {
        0 => PathCommand::Line {
            to: read_point(r, header)?,
        },
        1 => PathCommand::Horiz { x: r.unit(header)? },
        2 => PathCommand::Vert { y: r.unit(header)? },
        3 => PathCommand::Bezier {
            c0: read_point(r, header)?,
            c1: read_point(r, header)?,
            p1: read_point(r, header)?,
        },
        4 => PathCommand::QuadraticBezier {
            c: read_point(r, header)?,
            p1: read_point(r, header)?,
        },
        5 => {
            let target = read_point(r, header)?;
            let radius = r.unit(header)?;
            let flags = r.u8()?;
            PathCommand::ArcCircle {
                target,
                radius,
                large_arc: flags & 0x01 != 0,
                sweep: flags & 0x02 != 0,
            }
        }
        6 => {
            let target = read_point(r, header)?;
            let radius_x = r.unit(header)?;
            let radius_y = r.unit(header)?;
            let rotation_deg = r.unit(header)?;
            let flags = r.u8()?;
            PathCommand::ArcEllipse {
                target,
                radius_x,
                radius_y,
                rotation_deg,
                large_arc: flags & 0x01 != 0,
                sweep: flags & 0x02 != 0,
            }
        }
        7 => PathCommand::Close,
        other => return Err(ParseError::UnknownPathCommand(other)),
    })
}

fn read_vertices(r: &mut Reader, header: &Header) -> Result<Vec<Point>, ParseError> {
    let count = r.var_uint()?;
    (0..count).map(|_| read_point(r, header)).collect()
}

fn read_rectangles(r: &mut Reader, header: &Header) -> Result<Vec<Rectangle>, ParseError> {
    let count = r.var_uint()?;
    (0..count)
        .map(|_| {
            Ok(Rectangle {
                x: r.unit(header)?,
                y: r.unit(header)?,
                width: r.unit(header)?,
                height: r.unit(header)?,
            })
        })
        .collect()
}

fn read_lines(r: &mut Reader, header: &Header) -> Result<Vec<Line>, ParseError> {
    let count = r.var_uint()?;
    (0..count)
        .map(|_| {
            Ok(Line {
                start: read_point(r, header)?,
                end: read_point(r, header)?,
            })
        })
        .collect()
}

fn read_command(r: &mut Reader, header: &Header) -> Result<Option<DrawCommand>, ParseError> {
    let tag = r.u8()?;
    let command_id = tag & 0x3F;
    let style_kind = (tag & 0xC0) >> 6;

    if command_id == CMD_END_OF_DOCUMENT {
        return Ok(None);
    }

    let command = match command_id {
        CMD_FILL_POLYGON => DrawCommand::FillPolygon {
            style: read_style(r, header, style_kind)?,
            vertices: read_vertices(r, header)?,
        },
        CMD_FILL_RECTANGLES => DrawCommand::FillRectangles {
            style: read_style(r, header, style_kind)?,
            rectangles: read_rectangles(r, header)?,
        },
        CMD_FILL_PATH => DrawCommand::FillPath {
            style: read_style(r, header, style_kind)?,
            path: read_path(r, header)?,
        },
        CMD_DRAW_LINES => {
            let style = read_style(r, header, style_kind)?;
            let line_width = r.unit(header)?;
            DrawCommand::DrawLines {
                style,
                line_width,
                lines: read_lines(r, header)?,
            }
        }
        CMD_DRAW_LINE_LOOP => {
            let style = read_style(r, header, style_kind)?;
            let line_width = r.unit(header)?;
            DrawCommand::DrawLineLoop {
                style,
                line_width,
                vertices: read_vertices(r, header)?,
            }
        }
        CMD_DRAW_LINE_STRIP => {
            let style = read_style(r, header, style_kind)?;
            let line_width = r.unit(header)?;
            DrawCommand::DrawLineStrip {
                style,
                line_width,
                vertices: read_vertices(r, header)?,
            }
        }
        CMD_DRAW_LINE_PATH => {
            let style = read_style(r, header, style_kind)?;
            let line_width = r.unit(header)?;
            DrawCommand::DrawLinePath {
                style,
                line_width,
                path: read_path(r, header)?,
            }
        }
        CMD_OUTLINE_FILL_POLYGON => {
            let fill_style = read_style(r, header, style_kind)?;
            let line_style_tag = r.u8()?;
            let line_style = read_style(r, header, line_style_tag & 0x03)?;
            let line_width = r.unit(header)?;
            DrawCommand::OutlineFillPolygon {
                fill_style,
                line_style,
                line_width,
                vertices: read_vertices(r, header)?,
            }
        }
        CMD_OUTLINE_FILL_RECTANGLES => {
            let fill_style = read_style(r, header, style_kind)?;
            let line_style_tag = r.u8()?;
            let line_style = read_style(r, header, line_style_tag & 0x03)?;
            let line_width = r.unit(header)?;
            DrawCommand::OutlineFillRectangles {
                fill_style,
                line_style,
                line_width,
                rectangles: read_rectangles(r, header)?,
            }
        }
        CMD_OUTLINE_FILL_PATH => {
            let fill_style = read_style(r, header, style_kind)?;
            let line_style_tag = r.u8()?;
            let line_style = read_style(r, header, line_style_tag & 0x03)?;
            let line_width = r.unit(header)?;
            DrawCommand::OutlineFillPath {
                fill_style,
                line_style,
                line_width,
                path: read_path(r, header)?,
            }
        }
        other => return Err(ParseError::UnknownCommand(other)),
    };

    Ok(Some(command))
}

/// Decode a full in-memory TinyVG file: header, color table, and every draw
/// command up to (and not including) the end-of-document marker.
pub fn parse(data: &[u8]) -> Result<(Header, Vec<Color>, Vec<DrawCommand>), ParseError> {
    let mut r = Reader::new(data);

    let header = parse_header(&mut r)?;
    let color_table = parse_color_table(&mut r, &header)?;

    let mut commands = Vec::new();
    loop {
        if r.at_eof() {
            break;
        }
        match read_command(&mut r, &header)? {
            Some(cmd) => commands.push(cmd),
            None => break,
        }
    }

    Ok((header, color_table, commands))
}
