#![allow(dead_code)]

use byteorder::{LittleEndian, WriteBytesExt};

//===========================================================================//

/// One image to place in a test ICO file.
pub struct TestEntry {
    pub width: u8,
    pub height: u8,
    pub num_colors: u8,
    pub bits_per_pixel: u16,
    pub data: Vec<u8>,
}

/// Builds an ICO file with the images laid out back to back after the
/// directory.
pub fn build_ico(entries: &[TestEntry]) -> Vec<u8> {
    let mut file = Vec::new();
    file.write_u16::<LittleEndian>(0).unwrap();
    file.write_u16::<LittleEndian>(1).unwrap();
    file.write_u16::<LittleEndian>(entries.len() as u16).unwrap();
    let mut offset = 6 + 16 * entries.len() as u32;
    for entry in entries {
        file.write_u8(entry.width).unwrap();
        file.write_u8(entry.height).unwrap();
        file.write_u8(entry.num_colors).unwrap();
        file.write_u8(0).unwrap();
        file.write_u16::<LittleEndian>(1).unwrap();
        file.write_u16::<LittleEndian>(entry.bits_per_pixel).unwrap();
        file.write_u32::<LittleEndian>(entry.data.len() as u32).unwrap();
        file.write_u32::<LittleEndian>(offset).unwrap();
        offset += entry.data.len() as u32;
    }
    for entry in entries {
        file.extend_from_slice(&entry.data);
    }
    file
}

/// Builds a 24-bpp legacy icon resource from top-down RGBA pixels.  Pixels
/// with zero alpha are marked transparent in the AND mask.
pub fn build_dib_24bpp(width: u32, height: u32, rgba: &[u8]) -> Vec<u8> {
    assert_eq!(rgba.len(), (width * height * 4) as usize);
    let mut data = Vec::new();
    data.write_u32::<LittleEndian>(40).unwrap();
    data.write_i32::<LittleEndian>(width as i32).unwrap();
    data.write_i32::<LittleEndian>(2 * height as i32).unwrap();
    data.write_u16::<LittleEndian>(1).unwrap();
    data.write_u16::<LittleEndian>(24).unwrap();
    for _ in 0..6 {
        data.write_u32::<LittleEndian>(0).unwrap();
    }
    let color_row = ((width as usize * 3) + 3) / 4 * 4;
    let mask_row = ((width as usize + 7) / 8 + 3) / 4 * 4;
    for y in (0..height).rev() {
        let mut row = Vec::with_capacity(color_row);
        for x in 0..width {
            let px = &rgba[((y * width + x) * 4) as usize..][..4];
            row.extend_from_slice(&[px[2], px[1], px[0]]);
        }
        row.resize(color_row, 0);
        data.extend_from_slice(&row);
    }
    for y in (0..height).rev() {
        let mut row = vec![0u8; mask_row];
        for x in 0..width {
            if rgba[((y * width + x) * 4 + 3) as usize] == 0 {
                row[x as usize / 8] |= 0x80 >> (x % 8);
            }
        }
        data.extend_from_slice(&row);
    }
    data
}

//===========================================================================//
