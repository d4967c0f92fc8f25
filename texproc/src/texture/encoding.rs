//! Pixel encodings and per-level byte sizes.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Bytes per pixel of the uncompressed RGBA encoding.
pub const RGBA_BYTES_PER_PIXEL: usize = 4;

/// Texel edge length of a compressed block.
pub const BLOCK_DIMENSION: u32 = 4;

/// Channel masks of [`PixelEncoding::Rgba8`] read as a little-endian word.
pub const RGBA8_MASKS: [u32; 4] = [0x0000_00FF, 0x0000_FF00, 0x00FF_0000, 0xFF00_0000];

/// Pixel encoding of the bytes stored in a mip level.
///
/// DXT1 with 1-bit alpha shares the DXT1 block layout, and the DXT5
/// normal-map encoding shares the DXT5 layout, so both collapse onto the
/// plain variant here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PixelEncoding {
    /// Uncompressed, 4 bytes per pixel in R, G, B, A order.
    Rgba8,
    /// BC1: 8 bytes per 4×4 block.
    Dxt1,
    /// BC2: 16 bytes per 4×4 block (explicit alpha).
    Dxt3,
    /// BC3: 16 bytes per 4×4 block (interpolated alpha).
    Dxt5,
    /// Uncompressed with an explicit bit layout. Rows are padded to 32 bits.
    Packed {
        bit_count: u32,
        /// Red, green, blue and alpha masks.
        masks: [u32; 4],
    },
}

impl PixelEncoding {
    /// Size in bytes of one compressed block, or `None` for uncompressed data.
    pub fn block_size(self) -> Option<usize> {
        match self {
            PixelEncoding::Rgba8 | PixelEncoding::Packed { .. } => None,
            PixelEncoding::Dxt1 => Some(8),
            PixelEncoding::Dxt3 | PixelEncoding::Dxt5 => Some(16),
        }
    }

    /// Whether the encoding is a fixed-ratio block format.
    pub fn is_block_compressed(self) -> bool {
        self.block_size().is_some()
    }

    /// Number of bytes one level of the given extent occupies.
    ///
    /// Block formats round each axis up to whole 4×4 blocks. RGBA8 rows are
    /// 4 bytes per pixel, which is already 32-bit aligned; packed rows are
    /// rounded up to the next 32-bit boundary.
    ///
    /// # Example
    ///
    /// ```
    /// use texproc::texture::PixelEncoding;
    ///
    /// assert_eq!(PixelEncoding::Dxt1.level_size(128, 128), 32 * 32 * 8);
    /// assert_eq!(PixelEncoding::Dxt5.level_size(1, 1), 16);
    /// assert_eq!(PixelEncoding::Rgba8.level_size(3, 2), 24);
    ///
    /// let rgb565 = PixelEncoding::Packed { bit_count: 16, masks: [0xF800, 0x07E0, 0x001F, 0] };
    /// assert_eq!(rgb565.level_size(3, 2), 16);
    /// ```
    pub fn level_size(self, width: u32, height: u32) -> usize {
        match (self.row_pitch(width), self.block_size()) {
            (Some(pitch), _) => height as usize * pitch,
            (None, Some(block_size)) => {
                let blocks_wide = width.div_ceil(BLOCK_DIMENSION) as usize;
                let blocks_high = height.div_ceil(BLOCK_DIMENSION) as usize;
                blocks_wide * blocks_high * block_size
            }
            (None, None) => 0,
        }
    }

    /// Bytes per pixel row, or `None` for block formats.
    pub fn row_pitch(self, width: u32) -> Option<usize> {
        match self {
            PixelEncoding::Rgba8 => Some(width as usize * RGBA_BYTES_PER_PIXEL),
            PixelEncoding::Packed { bit_count, .. } => Some((width as usize * bit_count as usize).div_ceil(32) * 4),
            PixelEncoding::Dxt1 | PixelEncoding::Dxt3 | PixelEncoding::Dxt5 => None,
        }
    }

    /// Short display name.
    pub fn name(self) -> &'static str {
        match self {
            PixelEncoding::Rgba8 => "RGBA8",
            PixelEncoding::Dxt1 => "DXT1",
            PixelEncoding::Dxt3 => "DXT3",
            PixelEncoding::Dxt5 => "DXT5",
            PixelEncoding::Packed { .. } => "PACKED",
        }
    }
}

impl fmt::Display for PixelEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PixelEncoding::Packed { bit_count, .. } => write!(f, "{}{}", self.name(), bit_count),
            _ => f.write_str(self.name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_sizes() {
        assert_eq!(PixelEncoding::Rgba8.block_size(), None);
        assert_eq!(PixelEncoding::Dxt1.block_size(), Some(8));
        assert_eq!(PixelEncoding::Dxt3.block_size(), Some(16));
        assert_eq!(PixelEncoding::Dxt5.block_size(), Some(16));
    }

    #[test]
    fn test_level_size_rounds_partial_blocks_up() {
        // 5×3 needs 2×1 blocks
        assert_eq!(PixelEncoding::Dxt1.level_size(5, 3), 16);
        assert_eq!(PixelEncoding::Dxt3.level_size(5, 3), 32);
        // Sub-block levels still occupy a whole block
        assert_eq!(PixelEncoding::Dxt1.level_size(2, 2), 8);
        assert_eq!(PixelEncoding::Dxt1.level_size(1, 1), 8);
    }

    #[test]
    fn test_level_size_4096_bc1() {
        // 1024×1024 blocks * 8 bytes
        assert_eq!(PixelEncoding::Dxt1.level_size(4096, 4096), 8_388_608);
    }

    #[test]
    fn test_level_size_uncompressed() {
        assert_eq!(PixelEncoding::Rgba8.level_size(128, 64), 128 * 64 * 4);
        assert_eq!(PixelEncoding::Rgba8.level_size(0, 64), 0);
    }

    #[test]
    fn test_level_size_packed_pads_rows() {
        let rgb565 = PixelEncoding::Packed { bit_count: 16, masks: [0xF800, 0x07E0, 0x001F, 0] };
        assert_eq!(rgb565.block_size(), None);
        assert_eq!(rgb565.level_size(8, 8), 128);
        // One 16-bit pixel still fills a 32-bit row
        assert_eq!(rgb565.level_size(1, 1), 4);

        let rgb888 = PixelEncoding::Packed { bit_count: 24, masks: [0xFF_0000, 0xFF00, 0xFF, 0] };
        assert_eq!(rgb888.row_pitch(5), Some(16));
        assert_eq!(rgb888.level_size(5, 3), 48);
        assert_eq!(PixelEncoding::Dxt1.row_pitch(5), None);
    }

    #[test]
    fn test_display_names() {
        assert_eq!(PixelEncoding::Dxt5.to_string(), "DXT5");
        assert_eq!(PixelEncoding::Rgba8.to_string(), "RGBA8");
        let packed = PixelEncoding::Packed { bit_count: 16, masks: [0xF800, 0x07E0, 0x001F, 0] };
        assert_eq!(packed.to_string(), "PACKED16");
    }
}
