use crate::error::Result;

//===========================================================================//

// Size limits for images in an ICO file:
pub(crate) const MIN_WIDTH: u32 = 1;
pub(crate) const MIN_HEIGHT: u32 = 1;

/// Bytes per pixel in the canonical layout.
pub const BYTES_PER_PIXEL: usize = 4;

//===========================================================================//

/// A decoded image in canonical form: 8-bit blue, green, red, alpha per
/// pixel, straight alpha, rows stored top to bottom `stride` bytes apart.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    stride: usize,
    bgra_data: Vec<u8>,
}

impl PixelBuffer {
    /// Creates a fully transparent black image of the given size.
    pub fn new(width: u32, height: u32) -> Result<PixelBuffer> {
        let stride = PixelBuffer::packed_stride(width, height)?;
        let bgra_data = vec![0u8; stride * height as usize];
        Ok(PixelBuffer { width, height, stride, bgra_data })
    }

    /// Wraps tightly packed BGRA data (`stride == 4 * width`).  Returns an
    /// error if the dimensions are out of range or `bgra_data` has the wrong
    /// length.
    pub fn from_bgra_data(
        width: u32,
        height: u32,
        bgra_data: Vec<u8>,
    ) -> Result<PixelBuffer> {
        let stride = PixelBuffer::packed_stride(width, height)?;
        let expected_data_len = stride * height as usize;
        if bgra_data.len() != expected_data_len {
            decode_error!(
                "Invalid data length (was {}, but must be {} for {}x{} image)",
                bgra_data.len(),
                expected_data_len,
                width,
                height
            );
        }
        Ok(PixelBuffer { width, height, stride, bgra_data })
    }

    /// Converts tightly packed RGBA data into a canonical buffer.
    pub fn from_rgba_data(
        width: u32,
        height: u32,
        mut rgba_data: Vec<u8>,
    ) -> Result<PixelBuffer> {
        for pixel in rgba_data.chunks_exact_mut(BYTES_PER_PIXEL) {
            pixel.swap(0, 2);
        }
        PixelBuffer::from_bgra_data(width, height, rgba_data)
    }

    fn packed_stride(width: u32, height: u32) -> Result<usize> {
        if width < MIN_WIDTH {
            decode_error!(
                "Invalid width (was {}, but must be at least {})",
                width,
                MIN_WIDTH
            );
        }
        if height < MIN_HEIGHT {
            decode_error!(
                "Invalid height (was {}, but must be at least {})",
                height,
                MIN_HEIGHT
            );
        }
        match (width as usize)
            .checked_mul(BYTES_PER_PIXEL)
            .filter(|stride| stride.checked_mul(height as usize).is_some())
        {
            Some(stride) => Ok(stride),
            None => decode_error!("Width * Height is too large"),
        }
    }

    /// Returns the width of the image, in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the height of the image, in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns the distance between the starts of consecutive rows, in bytes.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Returns the BGRA bytes, rows `stride()` bytes apart with no padding.
    pub fn bgra_data(&self) -> &[u8] {
        &self.bgra_data
    }

    /// Returns one row of pixels, without padding.
    pub fn row(&self, y: u32) -> &[u8] {
        let start = y as usize * self.stride;
        &self.bgra_data[start..][..self.width as usize * BYTES_PER_PIXEL]
    }

    /// Returns one mutable row of pixels, without padding.
    pub fn row_mut(&mut self, y: u32) -> &mut [u8] {
        let start = y as usize * self.stride;
        let len = self.width as usize * BYTES_PER_PIXEL;
        &mut self.bgra_data[start..][..len]
    }

    /// Returns the `[blue, green, red, alpha]` bytes at the given position.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let start = x as usize * BYTES_PER_PIXEL;
        let px = &self.row(y)[start..][..BYTES_PER_PIXEL];
        [px[0], px[1], px[2], px[3]]
    }

    /// Overwrites the `[blue, green, red, alpha]` bytes at the given
    /// position.
    pub fn set_pixel(&mut self, x: u32, y: u32, bgra: [u8; 4]) {
        let start = x as usize * BYTES_PER_PIXEL;
        self.row_mut(y)[start..][..BYTES_PER_PIXEL].copy_from_slice(&bgra);
    }

    /// Returns the image as tightly packed RGBA, top row first.
    pub fn to_rgba_data(&self) -> Vec<u8> {
        let row_len = self.width as usize * BYTES_PER_PIXEL;
        let mut rgba = Vec::with_capacity(row_len * self.height as usize);
        for y in 0..self.height {
            for px in self.row(y).chunks_exact(BYTES_PER_PIXEL) {
                rgba.extend_from_slice(&[px[2], px[1], px[0], px[3]]);
            }
        }
        rgba
    }
}

//===========================================================================//

#[cfg(test)]
mod tests {
    use super::PixelBuffer;
    use crate::error::RebuildError;

    #[test]
    fn new_buffer_is_transparent() {
        let buffer = PixelBuffer::new(3, 2).unwrap();
        assert_eq!(buffer.stride(), 12);
        assert_eq!(buffer.bgra_data().len(), 24);
        assert!(buffer.bgra_data().iter().all(|&byte| byte == 0));
    }

    #[test]
    fn rgba_conversion_swaps_red_and_blue() {
        let rgba = vec![1, 2, 3, 4, 5, 6, 7, 8];
        let buffer = PixelBuffer::from_rgba_data(2, 1, rgba.clone()).unwrap();
        assert_eq!(buffer.bgra_data(), &[3, 2, 1, 4, 7, 6, 5, 8]);
        assert_eq!(buffer.pixel(1, 0), [7, 6, 5, 8]);
        assert_eq!(buffer.to_rgba_data(), rgba);
    }

    #[test]
    fn set_pixel_addresses_rows_by_stride() {
        let mut buffer = PixelBuffer::new(2, 2).unwrap();
        buffer.set_pixel(1, 1, [10, 20, 30, 40]);
        assert_eq!(&buffer.bgra_data()[12..], &[10, 20, 30, 40]);
        assert_eq!(buffer.row(0), &[0; 8]);
    }

    #[test]
    fn rejects_zero_dimensions() {
        assert!(matches!(
            PixelBuffer::new(0, 4),
            Err(RebuildError::Decode(_))
        ));
        assert!(matches!(
            PixelBuffer::new(4, 0),
            Err(RebuildError::Decode(_))
        ));
    }

    #[test]
    fn rejects_wrong_data_length() {
        let result = PixelBuffer::from_bgra_data(2, 2, vec![0; 15]);
        assert!(matches!(result, Err(RebuildError::Decode(_))));
    }
}

//===========================================================================//
