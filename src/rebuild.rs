use crate::codec::{self, SubImageFormat};
use crate::error::Result;
use crate::icondir::{self, DirectoryEntry, IconDir};
use crate::legacy::{LegacyIconDecoder, PortableDibDecoder};
use crate::tint::TintBand;
use log::{info, warn};
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use std::fs;
use std::path::Path;

//===========================================================================//

/// What kind of file a path holds, judged by its extension.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum InputKind {
    /// A standalone PNG file.
    SingleImage,
    /// An ICO file.
    Container,
}

impl InputKind {
    /// Classifies `path` by its (case-insensitive) extension.  Returns an
    /// error for anything other than `.png` or `.ico`.
    pub fn from_path(path: &Path) -> Result<InputKind> {
        let extension = path
            .extension()
            .and_then(|extension| extension.to_str())
            .map(|extension| extension.to_ascii_lowercase());
        match extension.as_deref() {
            Some("png") => Ok(InputKind::SingleImage),
            Some("ico") => Ok(InputKind::Container),
            _ => config_error!("Unsupported extension: {:?}", path),
        }
    }
}

//===========================================================================//

/// Recolors ICO and PNG files.
///
/// Every image is decoded, passed through the [`TintBand`], and re-encoded
/// as PNG.  A rebuild either produces a whole new file or fails; a bad entry
/// never yields partial output.
#[derive(Clone, Debug)]
pub struct Rebuilder<D = PortableDibDecoder> {
    band: TintBand,
    legacy: D,
}

impl Rebuilder {
    /// Creates a rebuilder that decodes legacy resources with the portable
    /// decoder.
    pub fn new(band: TintBand) -> Rebuilder {
        Rebuilder { band, legacy: PortableDibDecoder }
    }
}

impl Default for Rebuilder {
    fn default() -> Rebuilder {
        Rebuilder::new(TintBand::default())
    }
}

impl<D: LegacyIconDecoder> Rebuilder<D> {
    /// Creates a rebuilder that hands legacy resources to `legacy`.
    pub fn with_legacy_decoder(band: TintBand, legacy: D) -> Rebuilder<D> {
        Rebuilder { band, legacy }
    }

    /// Returns the tint settings.
    pub fn band(&self) -> &TintBand {
        &self.band
    }

    /// Rebuilds a complete ICO file held in memory.
    pub fn rebuild(&self, file: &[u8]) -> Result<Vec<u8>> {
        let icondir = IconDir::parse(file)?;
        let entries = icondir.entries();

        #[cfg(feature = "parallel")]
        let images = entries
            .par_iter()
            .enumerate()
            .map(|(index, entry)| self.rebuild_entry(index, entry, file))
            .collect::<Result<Vec<_>>>()?;
        #[cfg(not(feature = "parallel"))]
        let images = entries
            .iter()
            .enumerate()
            .map(|(index, entry)| self.rebuild_entry(index, entry, file))
            .collect::<Result<Vec<_>>>()?;

        let output =
            icondir::write_container(icondir.header(), entries, &images)?;
        info!(
            "Rebuilt {} images ({} bytes in, {} bytes out)",
            entries.len(),
            file.len(),
            output.len()
        );
        Ok(output)
    }

    fn rebuild_entry(
        &self,
        index: usize,
        entry: &DirectoryEntry,
        file: &[u8],
    ) -> Result<Vec<u8>> {
        let result = entry.data(file).and_then(|data| {
            let mut image = codec::decode(data, &self.legacy)?;
            let (width, height) = (image.width(), image.height());
            if width != entry.width() || height != entry.height() {
                warn!(
                    "Entry {} is {}x{} but its directory entry says {}x{}",
                    index,
                    width,
                    height,
                    entry.width(),
                    entry.height()
                );
            }
            self.band.apply(&mut image);
            codec::encode(&image)
        });
        result.map_err(|error| error.in_entry(index))
    }

    /// Rebuilds a standalone PNG file held in memory.
    pub fn rebuild_single_image(&self, data: &[u8]) -> Result<Vec<u8>> {
        if SubImageFormat::detect(data) != SubImageFormat::ModernStream {
            decode_error!("Missing PNG signature");
        }
        let mut image = codec::decode(data, &self.legacy)?;
        self.band.apply(&mut image);
        let output = codec::encode(&image)?;
        info!(
            "Rebuilt {}x{} image ({} bytes in, {} bytes out)",
            image.width(),
            image.height(),
            data.len(),
            output.len()
        );
        Ok(output)
    }

    /// Rebuilds the file at `input` and writes the result to `output`.  The
    /// kind of file is chosen by the extension of `input`.  Nothing is
    /// written unless the rebuild succeeds.
    pub fn rebuild_file(&self, input: &Path, output: &Path) -> Result<()> {
        let kind = InputKind::from_path(input)?;
        let data = fs::read(input)?;
        let rebuilt = match kind {
            InputKind::SingleImage => self.rebuild_single_image(&data)?,
            InputKind::Container => self.rebuild(&data)?,
        };
        fs::write(output, rebuilt)?;
        Ok(())
    }
}

//===========================================================================//

/// Rebuilds an ICO file with the default tint settings.
pub fn rebuild(file: &[u8]) -> Result<Vec<u8>> {
    Rebuilder::new(TintBand::default()).rebuild(file)
}

/// Rebuilds a PNG file with the default tint settings.
pub fn rebuild_single_image(data: &[u8]) -> Result<Vec<u8>> {
    Rebuilder::new(TintBand::default()).rebuild_single_image(data)
}

//===========================================================================//


//===========================================================================//
