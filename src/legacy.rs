//! Decoding of legacy (BMP-style) icon resources.
//!
//! A legacy resource is a `BITMAPINFOHEADER` whose height counts both the
//! color rows and the mask rows, an optional color table, the color rows, and
//! finally a 1-bit AND mask in which a set bit marks a transparent pixel.
//! Both pixel arrays are stored bottom row first, each row padded to a
//! multiple of four bytes.

use crate::error::{RebuildError, Result};
use crate::image::{PixelBuffer, MIN_HEIGHT, MIN_WIDTH};
use byteorder::{LittleEndian, ReadBytesExt};
use std::io::{self, Read};

//===========================================================================//

// The size of a BITMAPINFOHEADER struct, in bytes.
const BMP_HEADER_LEN: u32 = 40;

//===========================================================================//

/// Something that can turn a legacy icon resource into a canonical pixel
/// buffer.  Platforms with a native icon loader can plug it in here; the
/// crate ships [`PortableDibDecoder`] for everywhere else.
pub trait LegacyIconDecoder: Sync {
    /// Decodes `data`, a complete legacy icon resource.
    fn decode(&self, data: &[u8]) -> Result<PixelBuffer>;
}

/// A pure-Rust decoder for uncompressed legacy icon resources at 1, 4, 8,
/// 16, 24, or 32 bits per pixel.
#[derive(Clone, Copy, Debug, Default)]
pub struct PortableDibDecoder;

impl LegacyIconDecoder for PortableDibDecoder {
    fn decode(&self, data: &[u8]) -> Result<PixelBuffer> {
        read_dib(data).map_err(|error| match error {
            RebuildError::Io(error) => RebuildError::Decode(format!(
                "Truncated legacy icon resource: {}",
                error
            )),
            other => other,
        })
    }
}

//===========================================================================//

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum ColorDepth {
    Indexed(u16),
    Rgb555,
    Bgr,
    Bgra,
}

impl ColorDepth {
    fn from_bits_per_pixel(bits_per_pixel: u16) -> Option<ColorDepth> {
        match bits_per_pixel {
            1 | 4 | 8 => Some(ColorDepth::Indexed(bits_per_pixel)),
            16 => Some(ColorDepth::Rgb555),
            24 => Some(ColorDepth::Bgr),
            32 => Some(ColorDepth::Bgra),
            _ => None,
        }
    }

    fn bits_per_pixel(self) -> u16 {
        match self {
            ColorDepth::Indexed(bits) => bits,
            ColorDepth::Rgb555 => 16,
            ColorDepth::Bgr => 24,
            ColorDepth::Bgra => 32,
        }
    }

    fn palette_len(self, colors_used: u32) -> usize {
        match self {
            ColorDepth::Indexed(bits) => {
                let full = 1usize << bits;
                match colors_used as usize {
                    0 => full,
                    used => used.min(full),
                }
            }
            _ => 0,
        }
    }
}

/// Row length in bytes, padded to a four-byte boundary.
fn padded_row_len(width: u32, bits_per_pixel: u16) -> usize {
    let data_len = (width as usize * bits_per_pixel as usize + 7) / 8;
    (data_len + 3) / 4 * 4
}

/// Reads the width and the (un-doubled) height from the start of a legacy
/// resource.
fn read_dib_size<R: Read>(reader: &mut R) -> Result<(u32, u32)> {
    let header_len = reader.read_u32::<LittleEndian>()?;
    if header_len != BMP_HEADER_LEN {
        decode_error!(
            "Invalid BMP header size (was {}, must be {})",
            header_len,
            BMP_HEADER_LEN
        );
    }
    let width = reader.read_i32::<LittleEndian>()?;
    if width < (MIN_WIDTH as i32) {
        decode_error!(
            "Invalid BMP width (was {}, but must be at least {})",
            width,
            MIN_WIDTH
        );
    }
    let height = reader.read_i32::<LittleEndian>()?;
    if height % 2 != 0 {
        decode_error!(
            "Invalid height field in BMP header \
             (was {}, but must be divisible by 2)",
            height
        );
    }
    let height = height / 2;
    if height < (MIN_HEIGHT as i32) {
        decode_error!(
            "Invalid BMP height (was {}, but must be at least {})",
            height,
            MIN_HEIGHT
        );
    }
    Ok((width as u32, height as u32))
}

fn read_dib(data: &[u8]) -> Result<PixelBuffer> {
    let mut reader = data;
    let (width, height) = read_dib_size(&mut reader)?;
    let _planes = reader.read_u16::<LittleEndian>()?;
    let bits_per_pixel = reader.read_u16::<LittleEndian>()?;
    let compression = reader.read_u32::<LittleEndian>()?;
    let _image_size = reader.read_u32::<LittleEndian>()?;
    let _horz_ppm = reader.read_i32::<LittleEndian>()?;
    let _vert_ppm = reader.read_i32::<LittleEndian>()?;
    let colors_used = reader.read_u32::<LittleEndian>()?;
    let _colors_important = reader.read_u32::<LittleEndian>()?;
    if compression != 0 {
        decode_error!("Unsupported BMP compression ({})", compression);
    }
    let depth = match ColorDepth::from_bits_per_pixel(bits_per_pixel) {
        Some(depth) => depth,
        None => {
            decode_error!(
                "Unsupported BMP bits-per-pixel ({})",
                bits_per_pixel
            )
        }
    };

    // Palette entries are stored as blue, green, red, reserved.
    let palette_len = depth.palette_len(colors_used);
    let mut palette = Vec::<[u8; 3]>::with_capacity(palette_len);
    for _ in 0..palette_len {
        let mut entry = [0u8; 4];
        reader.read_exact(&mut entry)?;
        palette.push([entry[0], entry[1], entry[2]]);
    }
    // Entries past what the depth can index are never used.
    let surplus = 4 * (colors_used as u64).saturating_sub(palette_len as u64);
    if surplus > reader.len() as u64 {
        decode_error!(
            "BMP color table declares {} entries, but only {} bytes remain",
            colors_used,
            reader.len()
        );
    }
    reader = &reader[surplus as usize..];

    let row_len = padded_row_len(width, depth.bits_per_pixel());
    if (row_len as u64) * (height as u64) > reader.len() as u64 {
        decode_error!(
            "BMP color data needs {} rows of {} bytes, but only {} remain",
            height,
            row_len,
            reader.len()
        );
    }
    let mut image = PixelBuffer::new(width, height)?;
    let mut row = vec![0u8; row_len];
    for file_row in 0..height {
        reader.read_exact(&mut row)?;
        let y = height - file_row - 1;
        for x in 0..width {
            let bgra = read_color(depth, &row, x, &palette)?;
            image.set_pixel(x, y, bgra);
        }
    }

    // A 32-bit resource carries its own alpha, unless that channel is blank,
    // in which case the mask decides like it does for the other depths.
    let use_mask = depth != ColorDepth::Bgra
        || image.bgra_data().chunks_exact(4).all(|px| px[3] == 0);
    if use_mask {
        apply_and_mask(&mut reader, &mut image)?;
    }
    Ok(image)
}

fn read_color(
    depth: ColorDepth,
    row: &[u8],
    x: u32,
    palette: &[[u8; 3]],
) -> Result<[u8; 4]> {
    let x = x as usize;
    match depth {
        ColorDepth::Indexed(bits) => {
            let bit_offset = x * bits as usize;
            let byte = row[bit_offset / 8];
            let shift = 8 - bits as usize - bit_offset % 8;
            let index = (byte >> shift) & ((1u16 << bits) - 1) as u8;
            match palette.get(index as usize) {
                Some(&[blue, green, red]) => Ok([blue, green, red, u8::MAX]),
                None => decode_error!(
                    "BMP color index {} is outside the {}-entry color table",
                    index,
                    palette.len()
                ),
            }
        }
        ColorDepth::Rgb555 => {
            let color = u16::from_le_bytes([row[2 * x], row[2 * x + 1]]);
            let scale = |value: u16| ((value * 255 + 15) / 31) as u8;
            Ok([
                scale(color & 0x1f),
                scale((color >> 5) & 0x1f),
                scale((color >> 10) & 0x1f),
                u8::MAX,
            ])
        }
        ColorDepth::Bgr => {
            let px = &row[3 * x..][..3];
            Ok([px[0], px[1], px[2], u8::MAX])
        }
        ColorDepth::Bgra => {
            let px = &row[4 * x..][..4];
            Ok([px[0], px[1], px[2], px[3]])
        }
    }
}

fn apply_and_mask(
    reader: &mut &[u8],
    image: &mut PixelBuffer,
) -> io::Result<()> {
    let width = image.width();
    let height = image.height();
    let mut row = vec![0u8; padded_row_len(width, 1)];
    for file_row in 0..height {
        reader.read_exact(&mut row)?;
        let y = height - file_row - 1;
        for x in 0..width {
            let transparent = (row[x as usize / 8] >> (7 - x % 8)) & 0x1 == 1;
            let mut bgra = image.pixel(x, y);
            bgra[3] = if transparent { 0 } else { u8::MAX };
            image.set_pixel(x, y, bgra);
        }
    }
    Ok(())
}

//===========================================================================//


//===========================================================================//
