use crate::restype::ResourceType;
use crate::Result;
use byteorder::{LittleEndian, ReadBytesExt};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Cursor, Read};
use std::path::Path;

//===========================================================================//

// The size of the ICONDIR header, in bytes.
const ICONDIR_LEN: usize = 6;

// The size of one serialized RESDIR record, in bytes.  A RESDIR is two bytes
// shorter than the 16-byte ICONDIRENTRY it mirrors, because the entry's
// four-byte file offset is replaced by a two-byte icon id.
const RESDIR_ENTRY_LEN: usize = 14;

//===========================================================================//

// One 16-byte ICONDIRENTRY as read from the directory table.  The four-byte
// image offset it declares is consumed from the wire but never used for
// seeking; image blobs are read in directory order.
struct DirEntry {
    width: u8,
    height: u8,
    num_colors: u8,
    reserved: u8,
    color_planes: u16,
    bits_per_pixel: u16,
    image_size: u32,
}

impl DirEntry {
    fn read<R: Read>(reader: &mut R) -> io::Result<DirEntry> {
        let width = reader.read_u8()?;
        let height = reader.read_u8()?;
        let num_colors = reader.read_u8()?;
        let reserved = reader.read_u8()?;
        let color_planes = reader.read_u16::<LittleEndian>()?;
        let bits_per_pixel = reader.read_u16::<LittleEndian>()?;
        let image_size = reader.read_u32::<LittleEndian>()?;
        let _image_offset = reader.read_u32::<LittleEndian>()?;
        Ok(DirEntry {
            width,
            height,
            num_colors,
            reserved,
            color_planes,
            bits_per_pixel,
            image_size,
        })
    }
}

//===========================================================================//

/// Metadata for one icon image, in the layout Windows embeds in a PE
/// `RT_GROUP_ICON` resource (a RESDIR record).
///
/// A `ResourceEntry` carries the fields of the ICONDIRENTRY it was built
/// from, except that the entry's file offset is replaced by a sequential
/// icon id, and the byte-size field counts the same image bytes under its
/// resource-side name.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub struct ResourceEntry {
    width: u8,
    height: u8,
    num_colors: u8,
    reserved: u8,
    color_planes: u16,
    bits_per_pixel: u16,
    resource_size: u32,
    icon_id: u16,
}

impl ResourceEntry {
    fn from_dir_entry(entry: &DirEntry, icon_id: u16) -> ResourceEntry {
        ResourceEntry {
            width: entry.width,
            height: entry.height,
            num_colors: entry.num_colors,
            reserved: entry.reserved,
            color_planes: entry.color_planes,
            bits_per_pixel: entry.bits_per_pixel,
            resource_size: entry.image_size,
            icon_id,
        }
    }

    /// Returns the width of the image, in pixels.  The wire byte stores 256
    /// as zero; this returns the decoded value.
    pub fn width(&self) -> u32 {
        if self.width == 0 {
            256
        } else {
            self.width as u32
        }
    }

    /// Returns the height of the image, in pixels.  The wire byte stores 256
    /// as zero; this returns the decoded value.
    pub fn height(&self) -> u32 {
        if self.height == 0 {
            256
        } else {
            self.height as u32
        }
    }

    /// Returns the number of colors in the image's palette, or zero if the
    /// image doesn't use a palette.
    pub fn num_colors(&self) -> u8 {
        self.num_colors
    }

    /// Returns the number of color planes (zero or one in a valid entry).
    pub fn color_planes(&self) -> u16 {
        self.color_planes
    }

    /// Returns the color depth of the image, in bits per pixel.
    pub fn bits_per_pixel(&self) -> u16 {
        self.bits_per_pixel
    }

    /// Returns the size of the image data, in bytes.
    pub fn resource_size(&self) -> u32 {
        self.resource_size
    }

    /// Returns the icon id assigned to the image: 1 for the first directory
    /// entry, counting up in directory order.
    pub fn icon_id(&self) -> u16 {
        self.icon_id
    }

    // Serializes the entry as a 14-byte RESDIR record.
    fn write_to(&self, bytes: &mut Vec<u8>) {
        bytes.push(self.width);
        bytes.push(self.height);
        bytes.push(self.num_colors);
        bytes.push(self.reserved);
        bytes.extend_from_slice(&self.color_planes.to_le_bytes());
        bytes.extend_from_slice(&self.bits_per_pixel.to_le_bytes());
        bytes.extend_from_slice(&self.resource_size.to_le_bytes());
        bytes.extend_from_slice(&self.icon_id.to_le_bytes());
    }
}

//===========================================================================//

/// The parsed contents of an ICO file: one resource entry and one raw image
/// blob per directory entry, in directory order.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub struct Icon {
    entries: Vec<ResourceEntry>,
    images: Vec<Vec<u8>>,
}

impl Icon {
    /// Reads and parses the ICO file at `path`.  The whole file is buffered
    /// before any field is examined.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Icon> {
        let bytes = fs::read(path)?;
        Icon::read(Cursor::new(bytes))
    }

    /// Parses an ICO stream.
    ///
    /// Validation is fail-fast in wire order: the 6-byte ICONDIR header (the
    /// reserved field must be zero, the type must declare ICO rather than
    /// CUR, and the entry count must be nonzero), then the whole 16-byte
    /// entry table (reserved byte zero, color planes zero or one), and only
    /// then the image blobs.  Blobs are consumed in directory order for
    /// exactly the byte count each entry declares; the offset fields in the
    /// entries are never honored, which is why no `Seek` bound is needed.
    pub fn read<R: Read>(mut reader: R) -> Result<Icon> {
        let reserved = reader.read_u16::<LittleEndian>()?;
        let restype = reader.read_u16::<LittleEndian>()?;
        let num_entries = reader.read_u16::<LittleEndian>()? as usize;
        if reserved != 0 {
            validation_error!(
                "Invalid reserved field value in ICONDIR (was 0x{:04X}, but \
                 must be 0x0000)",
                reserved
            );
        }
        match ResourceType::from_number(restype) {
            Some(ResourceType::Icon) => {}
            Some(ResourceType::Cursor) => validation_error!(
                "File is a {} cursor container, not {}",
                ResourceType::Cursor.name(),
                ResourceType::Icon.name()
            ),
            None => validation_error!(
                "Invalid resource type in ICONDIR (was {}, but must be 1)",
                restype
            ),
        }
        if num_entries == 0 {
            validation_error!("ICONDIR contains no image entries");
        }
        let mut dir_entries = Vec::<DirEntry>::with_capacity(num_entries);
        for _ in 0..num_entries {
            dir_entries.push(DirEntry::read(&mut reader)?);
        }
        // The whole directory is validated before any image byte is read.
        for entry in dir_entries.iter() {
            if entry.reserved != 0 {
                validation_error!(
                    "Invalid reserved field value in ICONDIRENTRY (was \
                     0x{:02X}, but must be 0x00)",
                    entry.reserved
                );
            }
            if entry.color_planes > 1 {
                validation_error!(
                    "Invalid color planes value in ICONDIRENTRY (was {}, but \
                     must be 0 or 1)",
                    entry.color_planes
                );
            }
        }
        let mut images = Vec::<Vec<u8>>::with_capacity(num_entries);
        for entry in dir_entries.iter() {
            let mut data = vec![0u8; entry.image_size as usize];
            reader.read_exact(&mut data)?;
            images.push(data);
        }
        let entries = dir_entries
            .iter()
            .enumerate()
            .map(|(index, entry)| {
                ResourceEntry::from_dir_entry(entry, (index + 1) as u16)
            })
            .collect();
        Ok(Icon { entries, images })
    }

    /// Returns the resource entries, one per image, in directory order.
    pub fn entries(&self) -> &[ResourceEntry] {
        &self.entries
    }

    /// Returns the raw image blobs, index-aligned with [`entries`][Self::entries].
    pub fn images(&self) -> &[Vec<u8>] {
        &self.images
    }

    /// Serializes the directory into the layout Windows stores in a PE
    /// `RT_GROUP_ICON` resource: a 6-byte NEWHEADER followed by one 14-byte
    /// RESDIR record per image, with no padding between records.  This only
    /// re-emits fields that parsing validated, so it cannot fail.
    pub fn resource_header(&self) -> Vec<u8> {
        let mut bytes = Vec::<u8>::with_capacity(
            ICONDIR_LEN + RESDIR_ENTRY_LEN * self.entries.len(),
        );
        bytes.extend_from_slice(&0u16.to_le_bytes()); // reserved
        bytes.extend_from_slice(&ResourceType::Icon.number().to_le_bytes());
        bytes.extend_from_slice(&(self.entries.len() as u16).to_le_bytes());
        for entry in self.entries.iter() {
            entry.write_to(&mut bytes);
        }
        bytes
    }
}

//===========================================================================//


//===========================================================================//
