use crate::error::Result;
use crate::restype::ResourceType;
use byteorder::{ByteOrder, LittleEndian, WriteBytesExt};
use log::debug;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::io::Write;

//===========================================================================//

/// The size of the ICONDIR header, in bytes.
pub const HEADER_LEN: usize = 6;

/// The size of one ICONDIRENTRY record, in bytes.
pub const ENTRY_LEN: usize = 16;

// Every rewritten entry holds a full-color RGBA PNG stream.
const REWRITTEN_PLANES: u16 = 1;
const REWRITTEN_BITS_PER_PIXEL: u16 = 32;

//===========================================================================//

/// The fixed six-byte header at the start of an ICO file.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub struct ContainerHeader {
    restype: ResourceType,
    num_entries: u16,
}

impl ContainerHeader {
    /// Decodes the header from the start of `bytes`.
    pub fn read(bytes: &[u8]) -> Result<ContainerHeader> {
        if bytes.len() < HEADER_LEN {
            format_error!(
                "File too short for ICONDIR (was {} bytes, but must be at \
                 least {})",
                bytes.len(),
                HEADER_LEN
            );
        }
        let reserved = LittleEndian::read_u16(&bytes[0..2]);
        if reserved != 0 {
            format_error!(
                "Invalid reserved field value in ICONDIR \
                 (was {}, but must be 0)",
                reserved
            );
        }
        let restype = LittleEndian::read_u16(&bytes[2..4]);
        let restype = match ResourceType::from_number(restype) {
            Some(ResourceType::Icon) => ResourceType::Icon,
            Some(ResourceType::Cursor) => {
                format_error!("CUR files are not supported (type 2)")
            }
            None => format_error!("Invalid resource type ({})", restype),
        };
        let num_entries = LittleEndian::read_u16(&bytes[4..6]);
        Ok(ContainerHeader { restype, num_entries })
    }

    /// Encodes the header.
    pub fn write<W: Write>(&self, mut writer: W) -> Result<()> {
        writer.write_u16::<LittleEndian>(0)?; // reserved
        writer.write_u16::<LittleEndian>(self.restype.number())?;
        writer.write_u16::<LittleEndian>(self.num_entries)?;
        Ok(())
    }

    /// Returns the type of resource stored in the file.
    pub fn resource_type(&self) -> ResourceType {
        self.restype
    }

    /// Returns the number of directory entries.
    pub fn num_entries(&self) -> u16 {
        self.num_entries
    }

    /// Returns the size of the header plus the directory, which is also the
    /// offset of the first image in a rewritten file.
    pub fn directory_end(&self) -> usize {
        HEADER_LEN + ENTRY_LEN * self.num_entries as usize
    }
}

//===========================================================================//

/// One sixteen-byte ICONDIRENTRY record.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub struct DirectoryEntry {
    width_byte: u8,
    height_byte: u8,
    num_colors: u8,
    reserved: u8,
    color_planes: u16,
    bits_per_pixel: u16,
    data_size: u32,
    data_offset: u32,
}

impl DirectoryEntry {
    /// Decodes an entry from exactly `ENTRY_LEN` bytes.
    fn from_bytes(bytes: &[u8]) -> DirectoryEntry {
        debug_assert_eq!(bytes.len(), ENTRY_LEN);
        DirectoryEntry {
            width_byte: bytes[0],
            height_byte: bytes[1],
            num_colors: bytes[2],
            reserved: bytes[3],
            color_planes: LittleEndian::read_u16(&bytes[4..6]),
            bits_per_pixel: LittleEndian::read_u16(&bytes[6..8]),
            data_size: LittleEndian::read_u32(&bytes[8..12]),
            data_offset: LittleEndian::read_u32(&bytes[12..16]),
        }
    }

    /// Encodes the entry.
    pub fn write<W: Write>(&self, mut writer: W) -> Result<()> {
        writer.write_u8(self.width_byte)?;
        writer.write_u8(self.height_byte)?;
        writer.write_u8(self.num_colors)?;
        writer.write_u8(self.reserved)?;
        writer.write_u16::<LittleEndian>(self.color_planes)?;
        writer.write_u16::<LittleEndian>(self.bits_per_pixel)?;
        writer.write_u32::<LittleEndian>(self.data_size)?;
        writer.write_u32::<LittleEndian>(self.data_offset)?;
        Ok(())
    }

    /// Returns the width of the image, in pixels.  A stored width byte of
    /// zero means 256.
    pub fn width(&self) -> u32 {
        if self.width_byte == 0 {
            256
        } else {
            self.width_byte as u32
        }
    }

    /// Returns the height of the image, in pixels.  A stored height byte of
    /// zero means 256.
    pub fn height(&self) -> u32 {
        if self.height_byte == 0 {
            256
        } else {
            self.height_byte as u32
        }
    }

    /// Returns the palette size hint.
    pub fn num_colors(&self) -> u8 {
        self.num_colors
    }

    /// Returns the reserved byte, copied through unchanged.
    pub fn reserved(&self) -> u8 {
        self.reserved
    }

    /// Returns the number of color planes.
    pub fn color_planes(&self) -> u16 {
        self.color_planes
    }

    /// Returns the bits-per-pixel (color depth) of the image.
    pub fn bits_per_pixel(&self) -> u16 {
        self.bits_per_pixel
    }

    /// Returns the length of the encoded image data, in bytes.
    pub fn data_size(&self) -> u32 {
        self.data_size
    }

    /// Returns where the encoded image data starts, from the start of the
    /// file.
    pub fn data_offset(&self) -> u32 {
        self.data_offset
    }

    /// Returns the slice of `file` holding this entry's encoded image.
    /// Returns an error if the entry points outside of `file`.
    pub fn data<'a>(&self, file: &'a [u8]) -> Result<&'a [u8]> {
        let start = self.data_offset as u64;
        let end = start + self.data_size as u64;
        if end > file.len() as u64 {
            format_error!(
                "Image data at {}..{} lies outside the file ({} bytes)",
                start,
                end,
                file.len()
            );
        }
        Ok(&file[start as usize..end as usize])
    }

    /// Returns a copy of this entry describing a full-color PNG of
    /// `data_size` bytes at `data_offset`.  Dimensions and the reserved byte
    /// are kept.
    fn rewritten(&self, data_size: u32, data_offset: u32) -> DirectoryEntry {
        DirectoryEntry {
            num_colors: 0,
            color_planes: REWRITTEN_PLANES,
            bits_per_pixel: REWRITTEN_BITS_PER_PIXEL,
            data_size,
            data_offset,
            ..*self
        }
    }
}

//===========================================================================//

/// The header and directory of an ICO file.  Image data stays in the file
/// buffer and is reached through [`DirectoryEntry::data`].
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub struct IconDir {
    header: ContainerHeader,
    entries: Vec<DirectoryEntry>,
}

impl IconDir {
    /// Parses the header and directory of an ICO file held in memory,
    /// checking that every entry's image data lies inside `bytes`.
    pub fn parse(bytes: &[u8]) -> Result<IconDir> {
        let header = ContainerHeader::read(bytes)?;
        let directory_end = header.directory_end();
        if bytes.len() < directory_end {
            format_error!(
                "File too short for {} directory entries \
                 (was {} bytes, but must be at least {})",
                header.num_entries(),
                bytes.len(),
                directory_end
            );
        }
        let num_entries = header.num_entries() as usize;
        let mut entries = Vec::<DirectoryEntry>::with_capacity(num_entries);
        let records = bytes[HEADER_LEN..directory_end].chunks_exact(ENTRY_LEN);
        for (index, record) in records.enumerate() {
            let entry = DirectoryEntry::from_bytes(record);
            if let Err(error) = entry.data(bytes) {
                return Err(error.in_entry(index));
            }
            debug!(
                "Entry {}: {}x{}, {} bpp, {} bytes at offset {}",
                index,
                entry.width(),
                entry.height(),
                entry.bits_per_pixel(),
                entry.data_size(),
                entry.data_offset()
            );
            entries.push(entry);
        }
        Ok(IconDir { header, entries })
    }

    /// Returns the header.
    pub fn header(&self) -> &ContainerHeader {
        &self.header
    }

    /// Returns the entries, in file order.
    pub fn entries(&self) -> &[DirectoryEntry] {
        &self.entries
    }
}

//===========================================================================//

/// Builds the directory for a file whose images are replaced by `images`
/// (one PNG stream per entry, in the same order).  Images are laid out back
/// to back right after the directory.
pub fn rewrite_directory(
    entries: &[DirectoryEntry],
    images: &[Vec<u8>],
) -> Result<Vec<DirectoryEntry>> {
    if entries.len() != images.len() {
        format_error!(
            "Directory has {} entries but {} images were supplied",
            entries.len(),
            images.len()
        );
    }
    if entries.len() > u16::MAX as usize {
        format_error!(
            "Too many entries in IconDir (was {}, but max is {})",
            entries.len(),
            u16::MAX
        );
    }
    let mut data_offset = (HEADER_LEN + ENTRY_LEN * entries.len()) as u64;
    let mut rewritten = Vec::with_capacity(entries.len());
    for (entry, image) in entries.iter().zip(images) {
        let data_size = image.len() as u64;
        if data_offset + data_size > u32::MAX as u64 {
            format_error!("Rebuilt file would exceed 4 GiB");
        }
        rewritten.push(entry.rewritten(data_size as u32, data_offset as u32));
        data_offset += data_size;
    }
    Ok(rewritten)
}

/// Serializes a complete ICO file: header, rewritten directory, then every
/// image in order with no gaps.
pub fn write_container(
    header: &ContainerHeader,
    entries: &[DirectoryEntry],
    images: &[Vec<u8>],
) -> Result<Vec<u8>> {
    let entries = rewrite_directory(entries, images)?;
    let header = ContainerHeader {
        num_entries: entries.len() as u16,
        ..*header
    };
    let total_len = header.directory_end()
        + images.iter().map(|image| image.len()).sum::<usize>();
    let mut output = Vec::with_capacity(total_len);
    header.write(&mut output)?;
    for entry in entries.iter() {
        entry.write(&mut output)?;
    }
    for image in images.iter() {
        output.write_all(image)?;
    }
    debug_assert_eq!(output.len(), total_len);
    Ok(output)
}

//===========================================================================//

#[cfg(test)]
mod tests {
    use super::{rewrite_directory, write_container, IconDir};
    use crate::error::RebuildError;
    use crate::restype::ResourceType;

    // Two entries: a 2x2 image of 3 bytes at 38 and a 256x256 image of 2
    // bytes at 41.
    const TWO_ENTRIES: &[u8] = b"\
        \x00\x00\x01\x00\x02\x00\
        \
        \x02\x02\x10\x00\x01\x00\x04\x00\
        \x03\x00\x00\x00\x26\x00\x00\x00\
        \
        \x00\x00\x00\x00\x01\x00\x08\x00\
        \x02\x00\x00\x00\x29\x00\x00\x00\
        \
        \xaa\xbb\xcc\
        \xdd\xee";

    #[test]
    fn read_empty_icon_set() {
        let icondir = IconDir::parse(b"\x00\x00\x01\x00\x00\x00").unwrap();
        assert_eq!(icondir.header().resource_type(), ResourceType::Icon);
        assert_eq!(icondir.entries().len(), 0);
    }

    #[test]
    fn read_two_entries() {
        let icondir = IconDir::parse(TWO_ENTRIES).unwrap();
        let entries = icondir.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!((entries[0].width(), entries[0].height()), (2, 2));
        assert_eq!(entries[0].num_colors(), 16);
        assert_eq!(entries[0].bits_per_pixel(), 4);
        assert_eq!(entries[0].data(TWO_ENTRIES).unwrap(), b"\xaa\xbb\xcc");
        assert_eq!((entries[1].width(), entries[1].height()), (256, 256));
        assert_eq!(entries[1].data(TWO_ENTRIES).unwrap(), b"\xdd\xee");
    }

    #[test]
    fn short_header_is_a_format_error() {
        let result = IconDir::parse(b"\x00\x00\x01\x00\x00");
        assert!(matches!(result, Err(RebuildError::Format(_))));
        assert!(matches!(IconDir::parse(b""), Err(RebuildError::Format(_))));
    }

    #[test]
    fn cursor_and_unknown_types_are_format_errors() {
        let inputs = [b"\x00\x00\x02\x00\x00\x00", b"\x00\x00\x07\x00\x00\x00"];
        for input in inputs {
            let result = IconDir::parse(input);
            assert!(matches!(result, Err(RebuildError::Format(_))));
        }
    }

    #[test]
    fn nonzero_reserved_header_is_a_format_error() {
        let result = IconDir::parse(b"\x01\x00\x01\x00\x00\x00");
        assert!(matches!(result, Err(RebuildError::Format(_))));
    }

    #[test]
    fn truncated_directory_is_a_format_error() {
        let result = IconDir::parse(&TWO_ENTRIES[..30]);
        assert!(matches!(result, Err(RebuildError::Format(_))));
    }

    #[test]
    fn out_of_bounds_data_names_the_entry() {
        let truncated = &TWO_ENTRIES[..TWO_ENTRIES.len() - 1];
        let error = IconDir::parse(truncated).unwrap_err();
        assert_eq!(error.entry_index(), Some(1));
        assert!(matches!(error.root_cause(), RebuildError::Format(_)));
    }

    #[test]
    fn huge_offset_does_not_overflow() {
        let mut input = TWO_ENTRIES.to_vec();
        input[18..22].copy_from_slice(&[0xff; 4]);
        let error = IconDir::parse(&input).unwrap_err();
        assert_eq!(error.entry_index(), Some(0));
    }

    #[test]
    fn rewritten_offsets_are_contiguous() {
        let icondir = IconDir::parse(TWO_ENTRIES).unwrap();
        let images = vec![vec![1; 100], vec![2; 7]];
        let entries = rewrite_directory(icondir.entries(), &images).unwrap();
        assert_eq!(entries[0].data_offset(), 38);
        assert_eq!(entries[0].data_size(), 100);
        assert_eq!(entries[1].data_offset(), 138);
        assert_eq!(entries[1].data_size(), 7);
        for (old, new) in icondir.entries().iter().zip(entries.iter()) {
            assert_eq!(new.width(), old.width());
            assert_eq!(new.height(), old.height());
            assert_eq!(new.reserved(), old.reserved());
            assert_eq!(new.num_colors(), 0);
            assert_eq!(new.color_planes(), 1);
            assert_eq!(new.bits_per_pixel(), 32);
        }
    }

    #[test]
    fn write_two_entries() {
        let icondir = IconDir::parse(TWO_ENTRIES).unwrap();
        let images = vec![b"\x01\x02".to_vec(), b"\x03\x04\x05\x06".to_vec()];
        let output =
            write_container(icondir.header(), icondir.entries(), &images)
                .unwrap();
        let expected: &[u8] = b"\
            \x00\x00\x01\x00\x02\x00\
            \
            \x02\x02\x00\x00\x01\x00\x20\x00\
            \x02\x00\x00\x00\x26\x00\x00\x00\
            \
            \x00\x00\x00\x00\x01\x00\x20\x00\
            \x04\x00\x00\x00\x28\x00\x00\x00\
            \
            \x01\x02\
            \x03\x04\x05\x06";
        assert_eq!(output.as_slice(), expected);
    }

    #[test]
    fn write_empty_icon_set() {
        let icondir = IconDir::parse(b"\x00\x00\x01\x00\x00\x00").unwrap();
        let output =
            write_container(icondir.header(), icondir.entries(), &[]).unwrap();
        assert_eq!(output.as_slice(), b"\x00\x00\x01\x00\x00\x00");
    }

    #[test]
    fn image_count_must_match_directory() {
        let icondir = IconDir::parse(TWO_ENTRIES).unwrap();
        let result = rewrite_directory(icondir.entries(), &[vec![0]]);
        assert!(matches!(result, Err(RebuildError::Format(_))));
    }
}

//===========================================================================//
