//! A library for decoding BMP images and repacking them as ICO icon
//! resources.
//!
//! [`Bitmap`] decodes uncompressed BMP files at the byte-aligned color
//! depths and can re-encode a 24-bit image as a single-image ICO file.
//! [`Icon`] parses an ICO file into per-image metadata and raw image blobs,
//! and serializes the metadata back out in the `RT_GROUP_ICON` resource
//! layout that Windows PE executables embed.  [`icon_from_bmp`] chains the
//! two together, going from a BMP file on disk to a parsed [`Icon`] in one
//! call.

#![warn(missing_docs)]

#[macro_use]
mod macros;

mod bitmap;
mod bmpdepth;
mod convert;
mod error;
mod icon;
mod restype;

pub use crate::bitmap::Bitmap;
pub use crate::convert::icon_from_bmp;
pub use crate::error::Error;
pub use crate::icon::{Icon, ResourceEntry};
pub use crate::restype::ResourceType;

/// A specialized result type for this crate's operations.
pub type Result<T> = std::result::Result<T, Error>;

//===========================================================================//
