use crate::bmpdepth::BmpDepth;
use crate::restype::ResourceType;
use crate::Result;
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::fs;
use std::io::{Cursor, Read, Seek, SeekFrom, Write};
use std::path::Path;

//===========================================================================//

// The magic at the start of every BMP file ("BM", little-endian).
const BMP_MAGIC: u16 = 0x4D42;

// The size of a BITMAPINFOHEADER struct, in bytes.
const BMP_INFO_HEADER_LEN: u32 = 40;

// The sizes of the ICONDIR header and of one ICONDIRENTRY, in bytes.  The
// encoded image data starts directly after the one-entry directory.
const ICONDIR_LEN: u32 = 6;
const ICONDIRENTRY_LEN: u32 = 16;

//===========================================================================//

/// Row geometry for one BMP pixel array.  `padded_stride` is the on-disk row
/// size (the row's bits rounded up to the next 32-bit boundary, in bytes);
/// the trailing padding is read and discarded, never stored.  `raw_stride` is
/// the unpadded row size kept in the pixel buffer.  `top_down` mirrors the
/// sign of the header's height field: negative means the file already stores
/// rows top to bottom.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct RowLayout {
    padded_stride: usize,
    raw_stride: usize,
    top_down: bool,
}

fn row_layout(width: i32, height: i32, depth: BmpDepth) -> RowLayout {
    let width = width.unsigned_abs() as usize;
    let bits = depth.bits_per_pixel() as usize;
    RowLayout {
        padded_stride: ((bits * width + 31) / 32) * 4,
        raw_stride: width * depth.bytes_per_pixel(),
        top_down: height < 0,
    }
}

//===========================================================================//

/// A decoded BMP image: a dense pixel buffer plus its dimensions and color
/// depth.
///
/// Rows are held top-down with no padding, regardless of how the file stored
/// them; each pixel keeps the file's blue-green-red(-x) channel order at
/// `bits_per_pixel / 8` bytes per pixel.
#[derive(Clone, Debug)]
pub struct Bitmap {
    width: i32,
    height: i32,
    bits_per_pixel: u16,
    pixels: Vec<u8>,
}

impl Bitmap {
    /// Creates a bitmap from raw pixel data.  The `width` and `height` must
    /// be positive, `bits_per_pixel` must be 8, 16, 24, or 32, and `pixels`
    /// must hold exactly `width * height * (bits_per_pixel / 8)` bytes in
    /// top-down row-major order.  Panics if any of those constraints is
    /// violated.
    pub fn from_pixel_data(
        width: i32,
        height: i32,
        bits_per_pixel: u16,
        pixels: Vec<u8>,
    ) -> Bitmap {
        if width <= 0 {
            panic!("Invalid width (was {}, but must be positive)", width);
        }
        if height <= 0 {
            panic!("Invalid height (was {}, but must be positive)", height);
        }
        let depth = match BmpDepth::from_bits_per_pixel(bits_per_pixel) {
            Some(depth) => depth,
            None => panic!(
                "Invalid bits-per-pixel (was {}, but must be 8, 16, 24, \
                 or 32)",
                bits_per_pixel
            ),
        };
        let expected_len = (width as u64)
            * (height as u64)
            * (depth.bytes_per_pixel() as u64);
        if pixels.len() as u64 != expected_len {
            panic!(
                "Invalid pixel data length (was {}, but must be {} for a \
                 {}x{} image at {} bpp)",
                pixels.len(),
                expected_len,
                width,
                height,
                bits_per_pixel
            );
        }
        Bitmap { width, height, bits_per_pixel, pixels }
    }

    /// Reads and decodes the BMP file at `path`.  The whole file is buffered
    /// before any field is examined.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Bitmap> {
        let bytes = fs::read(path)?;
        Bitmap::read(Cursor::new(bytes))
    }

    /// Decodes an uncompressed BMP image.
    ///
    /// Only uncompressed files at the byte-aligned depths (8, 16, 24, or 32
    /// bits per pixel) are accepted.  A negative height field marks the rows
    /// as stored top-down; either way the decoded buffer comes out top-down,
    /// with the on-disk row padding stripped.  Pixel data is read from the
    /// offset the file header declares, which need not directly follow the
    /// headers.
    pub fn read<R: Read + Seek>(mut reader: R) -> Result<Bitmap> {
        // BITMAPFILEHEADER
        let magic = reader.read_u16::<LittleEndian>()?;
        let _file_size = reader.read_u32::<LittleEndian>()?;
        let _reserved_1 = reader.read_u16::<LittleEndian>()?;
        let _reserved_2 = reader.read_u16::<LittleEndian>()?;
        let data_offset = reader.read_u32::<LittleEndian>()?;
        // BITMAPINFOHEADER
        let _header_size = reader.read_u32::<LittleEndian>()?;
        let width = reader.read_i32::<LittleEndian>()?;
        let height = reader.read_i32::<LittleEndian>()?;
        let _planes = reader.read_u16::<LittleEndian>()?;
        let bits_per_pixel = reader.read_u16::<LittleEndian>()?;
        let compression = reader.read_u32::<LittleEndian>()?;
        let _image_size = reader.read_u32::<LittleEndian>()?;
        let _horz_ppm = reader.read_i32::<LittleEndian>()?;
        let _vert_ppm = reader.read_i32::<LittleEndian>()?;
        let _colors_used = reader.read_u32::<LittleEndian>()?;
        let _colors_important = reader.read_u32::<LittleEndian>()?;

        if magic != BMP_MAGIC {
            format_error!(
                "Not a BMP file (magic was 0x{:04X}, but must be 0x{:04X})",
                magic,
                BMP_MAGIC
            );
        }
        if compression != 0 {
            validation_error!(
                "Unsupported BMP compression (was {}, but must be 0)",
                compression
            );
        }
        let depth = match BmpDepth::from_bits_per_pixel(bits_per_pixel) {
            Some(depth) => depth,
            None => validation_error!(
                "Unsupported BMP bits-per-pixel ({})",
                bits_per_pixel
            ),
        };

        // The height's sign only selects the row order; all size arithmetic
        // uses the magnitudes.
        let width_mag = width.unsigned_abs();
        let height_mag = height.unsigned_abs();
        if width_mag > i32::MAX as u32 || height_mag > i32::MAX as u32 {
            validation_error!(
                "BMP dimensions are out of range ({}x{})",
                width,
                height
            );
        }
        let layout = row_layout(width, height, depth);
        let rows = height_mag as usize;
        let num_bytes = match rows.checked_mul(layout.raw_stride) {
            Some(num_bytes) => num_bytes,
            None => validation_error!(
                "BMP pixel buffer is too large ({}x{} at {} bpp)",
                width,
                height,
                bits_per_pixel
            ),
        };
        let mut pixels = vec![0u8; num_bytes];

        reader.seek(SeekFrom::Start(data_offset as u64))?;
        let mut row = vec![0u8; layout.padded_stride];
        for y in 0..rows {
            reader.read_exact(&mut row)?;
            // A bottom-up file stores the last image row first.
            let dest_y = if layout.top_down { y } else { rows - 1 - y };
            let start = dest_y * layout.raw_stride;
            pixels[start..start + layout.raw_stride]
                .copy_from_slice(&row[..layout.raw_stride]);
        }
        Ok(Bitmap {
            width: width_mag as i32,
            height: height_mag as i32,
            bits_per_pixel,
            pixels,
        })
    }

    /// Encodes the bitmap as a single-image ICO file at `path`.  If the
    /// bitmap can't be encoded, the file is not created.
    pub fn save_ico<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.check_encodable()?;
        let file = fs::File::create(path)?;
        self.write_ico(file)
    }

    // An ICONDIRENTRY stores width and height in a single byte each, and the
    // 256 value that a zero byte conventionally encodes cannot round-trip
    // through this single-image writer, so 256 is rejected along with
    // everything larger rather than silently truncated.
    fn check_encodable(&self) -> Result<()> {
        if self.bits_per_pixel != 24 {
            validation_error!(
                "Only 24-bit bitmaps can be encoded as ICO (was {} bpp)",
                self.bits_per_pixel
            );
        }
        if self.width < 1
            || self.width > 255
            || self.height < 1
            || self.height > 255
        {
            validation_error!(
                "Bitmap dimensions must each be in 1..=255 to fit an \
                 ICONDIRENTRY (was {}x{})",
                self.width,
                self.height
            );
        }
        Ok(())
    }

    /// Encodes the bitmap as a single-image ICO stream.
    ///
    /// Only 24-bit bitmaps with both dimensions in `1..=255` can be encoded;
    /// anything else is rejected rather than truncated.  Pixels are widened
    /// to 32-bit BGRA with every alpha byte fully opaque, followed by an
    /// all-zero (fully opaque) AND mask.
    pub fn write_ico<W: Write>(&self, mut writer: W) -> Result<()> {
        self.check_encodable()?;
        let width = self.width as u32;
        let height = self.height as u32;
        let image_size = width * height * 4;
        let mask_size = ((width + 31) / 32) * 4 * height;

        // ICONDIR
        writer.write_u16::<LittleEndian>(0)?; // reserved
        writer.write_u16::<LittleEndian>(ResourceType::Icon.number())?;
        writer.write_u16::<LittleEndian>(1)?; // one image
        // ICONDIRENTRY
        writer.write_u8(width as u8)?;
        writer.write_u8(height as u8)?;
        writer.write_u8(0)?; // no color palette
        writer.write_u8(0)?; // reserved
        writer.write_u16::<LittleEndian>(1)?; // color planes
        writer.write_u16::<LittleEndian>(32)?; // bits per pixel once widened
        writer.write_u32::<LittleEndian>(
            BMP_INFO_HEADER_LEN + image_size + mask_size,
        )?;
        writer.write_u32::<LittleEndian>(ICONDIR_LEN + ICONDIRENTRY_LEN)?;
        // BITMAPINFOHEADER.  The declared height is doubled by ICO
        // convention, counting the AND mask rows that follow the color data;
        // the image-size field counts the color data alone.
        writer.write_u32::<LittleEndian>(BMP_INFO_HEADER_LEN)?;
        writer.write_i32::<LittleEndian>(width as i32)?;
        writer.write_i32::<LittleEndian>(2 * height as i32)?;
        writer.write_u16::<LittleEndian>(1)?; // planes
        writer.write_u16::<LittleEndian>(32)?; // bits per pixel
        writer.write_u32::<LittleEndian>(0)?; // compression
        writer.write_u32::<LittleEndian>(image_size)?;
        writer.write_i32::<LittleEndian>(0)?; // horz ppm
        writer.write_i32::<LittleEndian>(0)?; // vert ppm
        writer.write_u32::<LittleEndian>(0)?; // colors used
        writer.write_u32::<LittleEndian>(0)?; // colors important
        // Color data, bottom row first, each BGR triple widened to BGRA.
        let width = width as usize;
        let mut row = Vec::<u8>::with_capacity(width * 4);
        for y in (0..height as usize).rev() {
            row.clear();
            for x in 0..width {
                let i = (y * width + x) * 3;
                row.push(self.pixels[i]); // blue
                row.push(self.pixels[i + 1]); // green
                row.push(self.pixels[i + 2]); // red
                row.push(u8::MAX); // alpha, fully opaque
            }
            writer.write_all(&row)?;
        }
        // The AND mask: one bit per pixel, rows padded to four bytes, all
        // zero (no pixel is masked out).
        writer.write_all(&vec![0u8; mask_size as usize])?;
        Ok(())
    }

    /// Returns the width of the image, in pixels.
    pub fn width(&self) -> i32 {
        self.width
    }

    /// Returns the height of the image, in pixels.
    pub fn height(&self) -> i32 {
        self.height
    }

    /// Returns the color depth of the image, in bits per pixel.
    pub fn bits_per_pixel(&self) -> u16 {
        self.bits_per_pixel
    }

    /// Returns the pixel data in top-down row-major order, with no row
    /// padding.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }
}

//===========================================================================//

#[cfg(test)]
mod tests {
    use super::{row_layout, Bitmap, BmpDepth, RowLayout};
    use crate::icon::Icon;
    use crate::Error;
    use std::io::Cursor;

    // A 2x2, 24-bit, bottom-up BMP whose pixel data starts at offset 54.
    // The logical top row is (1,2,3) (4,5,6); the bottom row is (7,8,9)
    // (10,11,12); the file stores the bottom row first, each row padded from
    // 6 to 8 bytes.
    const BMP_2X2: &[u8] = b"BM\x46\x00\x00\x00\x00\x00\x00\x00\x36\x00\x00\x00\
          \x28\x00\x00\x00\x02\x00\x00\x00\x02\x00\x00\x00\x01\x00\x18\x00\
          \x00\x00\x00\x00\x10\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\
          \x00\x00\x00\x00\x00\x00\x00\x00\
          \x07\x08\x09\x0a\x0b\x0c\x00\x00\
          \x01\x02\x03\x04\x05\x06\x00\x00";

    const PIXELS_2X2: &[u8] = b"\x01\x02\x03\x04\x05\x06\
                                \x07\x08\x09\x0a\x0b\x0c";

    #[test]
    fn row_layout_pads_to_four_bytes() {
        let cases: &[(i32, BmpDepth, usize, usize)] = &[
            (1, BmpDepth::TwentyFour, 4, 3),
            (2, BmpDepth::TwentyFour, 8, 6),
            (3, BmpDepth::TwentyFour, 12, 9),
            (4, BmpDepth::TwentyFour, 12, 12),
            (5, BmpDepth::TwentyFour, 16, 15),
            (5, BmpDepth::Eight, 8, 5),
            (3, BmpDepth::ThirtyTwo, 12, 12),
            (3, BmpDepth::Sixteen, 8, 6),
            (0, BmpDepth::TwentyFour, 0, 0),
        ];
        for &(width, depth, padded, raw) in cases.iter() {
            assert_eq!(
                row_layout(width, 1, depth),
                RowLayout {
                    padded_stride: padded,
                    raw_stride: raw,
                    top_down: false,
                },
                "width {} at {:?}",
                width,
                depth
            );
        }
    }

    #[test]
    fn row_layout_height_sign_picks_row_order() {
        assert!(!row_layout(4, 4, BmpDepth::TwentyFour).top_down);
        assert!(row_layout(4, -4, BmpDepth::TwentyFour).top_down);
    }

    #[test]
    fn row_layout_uses_width_magnitude() {
        assert_eq!(
            row_layout(-3, 1, BmpDepth::TwentyFour),
            row_layout(3, 1, BmpDepth::TwentyFour)
        );
    }

    #[test]
    fn decode_bottom_up_bmp() {
        let bitmap = Bitmap::read(Cursor::new(BMP_2X2)).unwrap();
        assert_eq!(bitmap.width(), 2);
        assert_eq!(bitmap.height(), 2);
        assert_eq!(bitmap.bits_per_pixel(), 24);
        assert_eq!(bitmap.pixels(), PIXELS_2X2);
    }

    #[test]
    fn decode_top_down_bmp() {
        // Same image as BMP_2X2, but with a height of -2 and the rows stored
        // top to bottom.
        let input: &[u8] =
            b"BM\x46\x00\x00\x00\x00\x00\x00\x00\x36\x00\x00\x00\
              \x28\x00\x00\x00\x02\x00\x00\x00\xfe\xff\xff\xff\x01\x00\x18\x00\
              \x00\x00\x00\x00\x10\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\
              \x00\x00\x00\x00\x00\x00\x00\x00\
              \x01\x02\x03\x04\x05\x06\x00\x00\
              \x07\x08\x09\x0a\x0b\x0c\x00\x00";
        let bitmap = Bitmap::read(Cursor::new(input)).unwrap();
        assert_eq!(bitmap.width(), 2);
        assert_eq!(bitmap.height(), 2);
        assert_eq!(bitmap.pixels(), PIXELS_2X2);
    }

    #[test]
    fn decode_honors_declared_pixel_data_offset() {
        // As BMP_2X2, but with four junk bytes between the headers and the
        // pixel data, and the declared offset bumped from 54 to 58.
        let input: &[u8] =
            b"BM\x4a\x00\x00\x00\x00\x00\x00\x00\x3a\x00\x00\x00\
              \x28\x00\x00\x00\x02\x00\x00\x00\x02\x00\x00\x00\x01\x00\x18\x00\
              \x00\x00\x00\x00\x10\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\
              \x00\x00\x00\x00\x00\x00\x00\x00\
              \xde\xad\xbe\xef\
              \x07\x08\x09\x0a\x0b\x0c\x00\x00\
              \x01\x02\x03\x04\x05\x06\x00\x00";
        let bitmap = Bitmap::read(Cursor::new(input)).unwrap();
        assert_eq!(bitmap.pixels(), PIXELS_2X2);
    }

    #[test]
    fn decode_eight_bit_bmp() {
        // 1x1 at 8 bpp: one pixel byte, padded to a four-byte row.
        let input: &[u8] =
            b"BM\x3a\x00\x00\x00\x00\x00\x00\x00\x36\x00\x00\x00\
              \x28\x00\x00\x00\x01\x00\x00\x00\x01\x00\x00\x00\x01\x00\x08\x00\
              \x00\x00\x00\x00\x04\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\
              \x00\x00\x00\x00\x00\x00\x00\x00\
              \xab\x00\x00\x00";
        let bitmap = Bitmap::read(Cursor::new(input)).unwrap();
        assert_eq!(bitmap.width(), 1);
        assert_eq!(bitmap.height(), 1);
        assert_eq!(bitmap.bits_per_pixel(), 8);
        assert_eq!(bitmap.pixels(), b"\xab");
    }

    #[test]
    fn decode_rejects_wrong_magic() {
        let mut input = BMP_2X2.to_vec();
        input[0] = b'P';
        let error = Bitmap::read(Cursor::new(input)).unwrap_err();
        assert!(matches!(error, Error::Format(_)), "got {:?}", error);
        assert!(error.to_string().contains("0x4D42"), "got {}", error);
    }

    #[test]
    fn decode_rejects_compressed_pixel_data() {
        // Compression field (offset 30) set to 1 (BI_RLE8).
        let mut input = BMP_2X2.to_vec();
        input[30] = 1;
        let error = Bitmap::read(Cursor::new(input)).unwrap_err();
        assert!(matches!(error, Error::Validation(_)), "got {:?}", error);
        assert!(error.to_string().contains("compression"), "got {}", error);
    }

    #[test]
    fn decode_rejects_sub_byte_depth() {
        // Bit-count field (offset 28) dropped to 4.
        let mut input = BMP_2X2.to_vec();
        input[28] = 4;
        let error = Bitmap::read(Cursor::new(input)).unwrap_err();
        assert!(matches!(error, Error::Validation(_)), "got {:?}", error);
        assert!(error.to_string().contains("bits-per-pixel"), "got {}", error);
    }

    #[test]
    fn decode_rejects_i32_min_width() {
        // i32::MIN has no positive counterpart, so neither the magnitude nor
        // the row arithmetic is meaningful.
        let mut input = BMP_2X2.to_vec();
        input[18..22].copy_from_slice(&i32::MIN.to_le_bytes());
        let error = Bitmap::read(Cursor::new(input)).unwrap_err();
        assert!(matches!(error, Error::Validation(_)), "got {:?}", error);
        assert!(error.to_string().contains("out of range"), "got {}", error);
    }

    #[test]
    fn decode_fails_io_on_truncated_header() {
        // Even a bad magic is not diagnosed before the headers are complete.
        let error = Bitmap::read(Cursor::new(&b"PM\x46\x00"[..])).unwrap_err();
        assert!(matches!(error, Error::Io(_)), "got {:?}", error);
    }

    #[test]
    fn decode_fails_io_on_truncated_rows() {
        // The final row's padding bytes count: dropping them is a short read.
        let input = &BMP_2X2[..BMP_2X2.len() - 2];
        let error = Bitmap::read(Cursor::new(input)).unwrap_err();
        assert!(matches!(error, Error::Io(_)), "got {:?}", error);
    }

    #[test]
    fn encode_one_pixel_bitmap_byte_exact() {
        let bitmap = Bitmap::from_pixel_data(1, 1, 24, vec![0x11, 0x22, 0x33]);
        let mut ico = Vec::<u8>::new();
        bitmap.write_ico(&mut ico).unwrap();
        let expected: &[u8] = b"\x00\x00\x01\x00\x01\x00\
              \x01\x01\x00\x00\x01\x00\x20\x00\x30\x00\x00\x00\x16\x00\x00\x00\
              \x28\x00\x00\x00\x01\x00\x00\x00\x02\x00\x00\x00\x01\x00\x20\x00\
              \x00\x00\x00\x00\x04\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\
              \x00\x00\x00\x00\x00\x00\x00\x00\
              \x11\x22\x33\xff\
              \x00\x00\x00\x00";
        assert_eq!(ico.as_slice(), expected);
    }

    #[test]
    fn encode_writes_rows_bottom_up_with_opaque_alpha() {
        let bitmap = Bitmap::from_pixel_data(2, 2, 24, PIXELS_2X2.to_vec());
        let mut ico = Vec::<u8>::new();
        bitmap.write_ico(&mut ico).unwrap();
        // 6 + 16 + 40 header bytes, 2*2*4 color bytes, 4*2 mask bytes.
        assert_eq!(ico.len(), 86);
        // The BITMAPINFOHEADER height is doubled to cover the AND mask.
        assert_eq!(&ico[30..34], b"\x04\x00\x00\x00");
        let color_data: &[u8] = b"\x07\x08\x09\xff\x0a\x0b\x0c\xff\
                                  \x01\x02\x03\xff\x04\x05\x06\xff";
        assert_eq!(&ico[62..78], color_data);
        assert_eq!(&ico[78..86], b"\x00\x00\x00\x00\x00\x00\x00\x00");
    }

    #[test]
    fn encode_rejects_non_24_bit_depth() {
        let bitmap = Bitmap::from_pixel_data(1, 1, 32, vec![0; 4]);
        let mut ico = Vec::<u8>::new();
        let error = bitmap.write_ico(&mut ico).unwrap_err();
        assert!(matches!(error, Error::Validation(_)), "got {:?}", error);
        assert!(error.to_string().contains("24-bit"), "got {}", error);
    }

    #[test]
    fn encode_rejects_dimensions_over_255() {
        // 256 would need the zero-byte convention and cannot round-trip.
        let bitmap = Bitmap::from_pixel_data(256, 1, 24, vec![0; 256 * 3]);
        let mut ico = Vec::<u8>::new();
        let error = bitmap.write_ico(&mut ico).unwrap_err();
        assert!(matches!(error, Error::Validation(_)), "got {:?}", error);
        assert!(error.to_string().contains("256"), "got {}", error);
    }

    #[test]
    fn encoded_ico_parses_back() {
        let bitmap = Bitmap::read(Cursor::new(BMP_2X2)).unwrap();
        let mut ico = Vec::<u8>::new();
        bitmap.write_ico(&mut ico).unwrap();
        let icon = Icon::read(Cursor::new(ico)).unwrap();
        assert_eq!(icon.entries().len(), 1);
        let entry = &icon.entries()[0];
        assert_eq!(entry.width(), 2);
        assert_eq!(entry.height(), 2);
        assert_eq!(entry.bits_per_pixel(), 32);
        assert_eq!(entry.icon_id(), 1);
        // 40-byte sub-header, 16 color bytes, 8 mask bytes.
        assert_eq!(entry.resource_size(), 64);
        assert_eq!(icon.images()[0].len(), 64);
        assert_eq!(&icon.images()[0][..4], b"\x28\x00\x00\x00");
    }

    #[test]
    #[should_panic(expected = "Invalid pixel data length")]
    fn from_pixel_data_panics_on_wrong_length() {
        let _ = Bitmap::from_pixel_data(2, 2, 24, vec![0; 11]);
    }
}

//===========================================================================//
