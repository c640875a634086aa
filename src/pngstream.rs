use crate::error::Result;
use crate::image::{PixelBuffer, MIN_HEIGHT, MIN_WIDTH};
use png::{BitDepth, ColorType, Transformations};
use std::io::Write;

//===========================================================================//

/// The signature that all PNG streams start with.
pub const PNG_SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

//===========================================================================//

/// Decodes a PNG stream of any color type or bit depth into a canonical
/// buffer.
pub(crate) fn read_png(data: &[u8]) -> Result<PixelBuffer> {
    let mut decoder = png::Decoder::new(data);
    // Expand palettes, low bit depths and tRNS chunks; reduce 16-bit samples.
    decoder.set_transformations(
        Transformations::EXPAND | Transformations::STRIP_16,
    );
    let mut reader = match decoder.read_info() {
        Ok(reader) => reader,
        Err(error) => decode_error!("Malformed PNG data: {}", error),
    };
    {
        let info = reader.info();
        if info.width < MIN_WIDTH || info.height < MIN_HEIGHT {
            decode_error!(
                "Invalid PNG dimensions ({}x{})",
                info.width,
                info.height
            );
        }
    }
    let mut buffer = vec![0u8; reader.output_buffer_size()];
    let frame = match reader.next_frame(&mut buffer) {
        Ok(frame) => frame,
        Err(error) => decode_error!("Malformed PNG data: {}", error),
    };
    if frame.bit_depth != BitDepth::Eight {
        decode_error!("Unsupported PNG bit depth: {:?}", frame.bit_depth);
    }
    buffer.truncate(frame.buffer_size());
    let bgra = match frame.color_type {
        ColorType::Rgba => {
            let mut bgra = buffer;
            for px in bgra.chunks_exact_mut(4) {
                px.swap(0, 2);
            }
            bgra
        }
        ColorType::Rgb => buffer
            .chunks_exact(3)
            .flat_map(|px| [px[2], px[1], px[0], u8::MAX])
            .collect(),
        ColorType::GrayscaleAlpha => buffer
            .chunks_exact(2)
            .flat_map(|px| [px[0], px[0], px[0], px[1]])
            .collect(),
        ColorType::Grayscale => buffer
            .iter()
            .flat_map(|&gray| [gray, gray, gray, u8::MAX])
            .collect(),
        ColorType::Indexed => {
            decode_error!("PNG palette was not expanded");
        }
    };
    PixelBuffer::from_bgra_data(frame.width, frame.height, bgra)
}

/// Encodes a buffer as an 8-bit RGBA PNG stream.
pub(crate) fn write_png<W: Write>(
    image: &PixelBuffer,
    writer: W,
) -> Result<()> {
    match write_png_enc(image, writer) {
        Ok(()) => Ok(()),
        Err(png::EncodingError::IoError(error)) => Err(error.into()),
        Err(png::EncodingError::Format(error)) => {
            encode_error!("PNG format error: {}", error);
        }
        Err(png::EncodingError::LimitsExceeded) => {
            encode_error!("PNG limits exceeded");
        }
        Err(png::EncodingError::Parameter(error)) => {
            encode_error!("PNG parameter error: {}", error);
        }
    }
}

fn write_png_enc<W: Write>(
    image: &PixelBuffer,
    writer: W,
) -> std::result::Result<(), png::EncodingError> {
    let mut encoder = png::Encoder::new(writer, image.width(), image.height());
    encoder.set_color(ColorType::Rgba);
    encoder.set_depth(BitDepth::Eight);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(&image.to_rgba_data())?;
    writer.finish()
}

//===========================================================================//


//===========================================================================//
