//! A library for recoloring the images inside ICO files.
//!
//! Every image in an ICO file (PNG streams and legacy BMP-style resources
//! alike) is decoded into a [`PixelBuffer`], orange hues are shifted to deep
//! sky blue by a [`TintBand`], and the result is re-encoded as PNG.  The
//! directory is then rewritten so that sizes and offsets match the new data.
//!
//! ```no_run
//! let file = std::fs::read("app.ico").unwrap();
//! let rebuilt = icotint::rebuild(&file).unwrap();
//! std::fs::write("app-blue.ico", rebuilt).unwrap();
//! ```

#![warn(missing_docs)]

#[macro_use]
mod macros;

mod codec;
mod error;
mod icondir;
mod image;
mod legacy;
mod pngstream;
mod rebuild;
mod restype;
mod tint;

pub use crate::codec::{decode, encode, SubImageFormat};
pub use crate::error::{RebuildError, Result};
pub use crate::icondir::{
    rewrite_directory, write_container, ContainerHeader, DirectoryEntry,
    IconDir, ENTRY_LEN, HEADER_LEN,
};
pub use crate::image::{PixelBuffer, BYTES_PER_PIXEL};
pub use crate::legacy::{LegacyIconDecoder, PortableDibDecoder};
pub use crate::pngstream::PNG_SIGNATURE;
pub use crate::rebuild::{rebuild, rebuild_single_image, InputKind, Rebuilder};
pub use crate::restype::ResourceType;
pub use crate::tint::TintBand;
