use thiserror::Error;

//===========================================================================//

/// The error type for every decode, encode, and conversion failure in this
/// crate.
///
/// All failures abort the current operation immediately; no operation yields
/// a partial result or silently coerces an invalid field. Messages carry the
/// offending value and the expected value(s) where one exists.
#[derive(Debug, Error)]
pub enum Error {
    /// The underlying file could not be opened, read, or written, or the
    /// input ended before a complete record was read.
    #[error("{0}")]
    Io(#[from] std::io::Error),

    /// The input is not the container format the caller asked to parse
    /// (e.g. the BMP magic bytes are missing).
    #[error("{0}")]
    Format(String),

    /// A header field is structurally present but holds a value outside its
    /// permitted range: a nonzero reserved field, a bad color-planes value,
    /// a zero entry count, an unsupported compression mode or bit depth, or
    /// dimensions an ICONDIRENTRY cannot represent.
    #[error("{0}")]
    Validation(String),
}

//===========================================================================//
