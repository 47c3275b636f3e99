//! Writes a [`Canvas`] as a 32-bit, top-left-origin, uncompressed TGA image:
//! the CLI's output format. The 18-byte TGA header is a fixed little-endian
//! byte layout, which is exactly what `packed_struct` is for; the pixel
//! stream itself is written with `byteorder` after swapping RGBA to BGRA.

use byteorder::WriteBytesExt;
use packed_struct::prelude::*;
use std::io::{self, Write};

use crate::canvas::Canvas;

#[derive(PackedStruct)]
#[packed_struct(endian = "lsb")]
struct TgaHeader {
    id_length: u8,
    color_map_type: u8,
    image_type: u8,
    color_map_first_entry: u16,
    color_map_length: u16,
    color_map_entry_size: u8,
    x_origin: u16,
    y_origin: u16,
    width: u16,
    height: u16,
    pixel_depth: u8,
    image_descriptor: u8,
}

const IMAGE_TYPE_UNCOMPRESSED_TRUE_COLOR: u8 = 2;

/// Bits 0-3: alpha channel depth (8). Bit 5: top-left origin.
const IMAGE_DESCRIPTOR_TOP_LEFT_32BPP: u8 = 0x08 | 0x20;

/// Write `canvas` to `out` as a 32-bit top-left-origin uncompressed TGA.
pub fn write_tga(canvas: &Canvas, out: &mut impl Write) -> io::Result<()> {
    let header = TgaHeader {
        id_length: 0,
        color_map_type: 0,
        image_type: IMAGE_TYPE_UNCOMPRESSED_TRUE_COLOR,
        color_map_first_entry: 0,
        color_map_length: 0,
        color_map_entry_size: 0,
        x_origin: 0,
        y_origin: 0,
        width: canvas.width() as u16,
        height: canvas.height() as u16,
        pixel_depth: 32,
        image_descriptor: IMAGE_DESCRIPTOR_TOP_LEFT_32BPP,
    };

    let packed = header
        .pack()
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))?;
    out.write_all(&packed)?;

    for rgba in canvas.pixels().chunks_exact(4) {
        // BGRA byte order.
        out.write_u8(rgba[2])?;
        out.write_u8(rgba[1])?;
        out.write_u8(rgba[0])?;
        out.write_u8(rgba[3])?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_is_eighteen_bytes() {
        let header = TgaHeader {
            id_length: 0,
            color_map_type: 0,
            image_type: IMAGE_TYPE_UNCOMPRESSED_TRUE_COLOR,
            color_map_first_entry: 0,
            color_map_length: 0,
            color_map_entry_size: 0,
            x_origin: 0,
            y_origin: 0,
            width: 4,
            height: 4,
            pixel_depth: 32,
            image_descriptor: IMAGE_DESCRIPTOR_TOP_LEFT_32BPP,
        };
        assert_eq!(header.pack().unwrap().len(), 18);
    }

    #[test]
    fn writes_bgra_pixel_order() {
        use crate::render::Framebuffer;

        let mut canvas = Canvas::new(1, 1);
        canvas.set_pixel(0, 0, [10, 20, 30, 255]);

        let mut buf = Vec::new();
        write_tga(&canvas, &mut buf).unwrap();

        assert_eq!(buf.len(), 18 + 4);
        assert_eq!(&buf[18..22], &[30, 20, 10, 255]);
    }
}
