use crate::error::Result;
use crate::image::PixelBuffer;
use crate::legacy::LegacyIconDecoder;
use crate::pngstream::{self, PNG_SIGNATURE};
use log::debug;

//===========================================================================//

/// The two ways a sub-image can be stored inside an ICO file.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum SubImageFormat {
    /// A complete PNG stream.
    ModernStream,
    /// A BMP-style color bitmap followed by a 1-bit transparency mask.
    LegacyResource,
}

impl SubImageFormat {
    /// Picks the format of `data` by looking at its first eight bytes.
    pub fn detect(data: &[u8]) -> SubImageFormat {
        if data.starts_with(&PNG_SIGNATURE) {
            SubImageFormat::ModernStream
        } else {
            SubImageFormat::LegacyResource
        }
    }

    /// Decodes `data`, which must be in this format, into a canonical
    /// buffer.  Legacy resources are handed to `legacy`.
    pub fn decode(
        self,
        data: &[u8],
        legacy: &dyn LegacyIconDecoder,
    ) -> Result<PixelBuffer> {
        match self {
            SubImageFormat::ModernStream => pngstream::read_png(data),
            SubImageFormat::LegacyResource => legacy.decode(data),
        }
    }
}

/// Detects the format of `data` and decodes it.
pub fn decode(
    data: &[u8],
    legacy: &dyn LegacyIconDecoder,
) -> Result<PixelBuffer> {
    let format = SubImageFormat::detect(data);
    let image = format.decode(data, legacy)?;
    debug!(
        "Decoded {:?} sub-image ({} bytes, {}x{})",
        format,
        data.len(),
        image.width(),
        image.height()
    );
    Ok(image)
}

/// Encodes `image` as a PNG stream.  Every image is written this way,
/// whatever format it was read from.
pub fn encode(image: &PixelBuffer) -> Result<Vec<u8>> {
    let mut data = Vec::new();
    pngstream::write_png(image, &mut data)?;
    Ok(data)
}

//===========================================================================//


//===========================================================================//
