//===========================================================================//

/// The byte-aligned BMP color depths this crate decodes. Sub-byte depths
/// (1 and 4 bpp) pack palette indices within bytes and have no raw
/// pixel-buffer representation here, so they are rejected at decode.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum BmpDepth {
    Eight,
    Sixteen,
    TwentyFour,
    ThirtyTwo,
}

impl BmpDepth {
    pub(crate) fn from_bits_per_pixel(
        bits_per_pixel: u16,
    ) -> Option<BmpDepth> {
        match bits_per_pixel {
            8 => Some(BmpDepth::Eight),
            16 => Some(BmpDepth::Sixteen),
            24 => Some(BmpDepth::TwentyFour),
            32 => Some(BmpDepth::ThirtyTwo),
            _ => None,
        }
    }

    pub(crate) fn bits_per_pixel(&self) -> u16 {
        match *self {
            BmpDepth::Eight => 8,
            BmpDepth::Sixteen => 16,
            BmpDepth::TwentyFour => 24,
            BmpDepth::ThirtyTwo => 32,
        }
    }

    pub(crate) fn bytes_per_pixel(&self) -> usize {
        (self.bits_per_pixel() / 8) as usize
    }
}

//===========================================================================//

#[cfg(test)]
mod tests {
    use super::BmpDepth;

    #[test]
    fn bmp_depth_round_trip() {
        let depths = &[
            BmpDepth::Eight,
            BmpDepth::Sixteen,
            BmpDepth::TwentyFour,
            BmpDepth::ThirtyTwo,
        ];
        for &depth in depths.iter() {
            assert_eq!(
                BmpDepth::from_bits_per_pixel(depth.bits_per_pixel()),
                Some(depth)
            );
            assert_eq!(
                depth.bytes_per_pixel() * 8,
                depth.bits_per_pixel() as usize
            );
        }
    }

    #[test]
    fn sub_byte_depths_are_not_decodable() {
        assert_eq!(BmpDepth::from_bits_per_pixel(1), None);
        assert_eq!(BmpDepth::from_bits_per_pixel(4), None);
        assert_eq!(BmpDepth::from_bits_per_pixel(0), None);
        assert_eq!(BmpDepth::from_bits_per_pixel(48), None);
    }
}

//===========================================================================//
