//! DirectDraw Surface (DDS) container writer.
//!
//! Serializes an assembled [`TextureAsset`] into a DDS file: a 4-byte magic,
//! a 124-byte header, then every level's bytes laid out face-major,
//! mip-minor.
//!
//! ```text
//! ┌──────┬────────────┬─────────────────────┬─────────────────────┬─────┐
//! │"DDS "│ header 124 │ face 0: mip 0..n    │ face 1: mip 0..n    │ ... │
//! └──────┴────────────┴─────────────────────┴─────────────────────┴─────┘
//! ```
//!
//! # Example
//!
//! ```
//! use texproc::dds::{expected_size, HEADER_SIZE};
//! use texproc::texture::{PixelEncoding, TextureType};
//!
//! // 4096×4096 BC1 with 5 levels: 11,173,888 data bytes plus the header
//! let size = expected_size(4096, 4096, PixelEncoding::Dxt1, TextureType::Texture2D, 5);
//! assert_eq!(size, HEADER_SIZE + 11_173_888);
//! ```

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use thiserror::Error;
use tracing::debug;

use crate::texture::{mip_extent, PixelEncoding, TextureAsset, TextureType, RGBA8_MASKS};

/// Magic number at the start of every DDS file.
pub const DDS_MAGIC: [u8; 4] = *b"DDS ";

/// Magic plus header.
pub const HEADER_SIZE: usize = 128;

const DDSD_CAPS: u32 = 0x1;
const DDSD_HEIGHT: u32 = 0x2;
const DDSD_WIDTH: u32 = 0x4;
const DDSD_PITCH: u32 = 0x8;
const DDSD_PIXELFORMAT: u32 = 0x1000;
const DDSD_MIPMAPCOUNT: u32 = 0x2_0000;
const DDSD_LINEARSIZE: u32 = 0x8_0000;

const DDPF_ALPHAPIXELS: u32 = 0x1;
const DDPF_FOURCC: u32 = 0x4;
const DDPF_RGB: u32 = 0x40;
const DDPF_NORMAL: u32 = 0x8000_0000;

const DDSCAPS_COMPLEX: u32 = 0x8;
const DDSCAPS_TEXTURE: u32 = 0x1000;
const DDSCAPS_MIPMAP: u32 = 0x40_0000;

const DDSCAPS2_CUBEMAP: u32 = 0x200;
const DDSCAPS2_CUBEMAP_ALL_FACES: u32 = 0xFC00;

/// Errors from writing or parsing DDS data.
#[derive(Debug, Error)]
pub enum DdsError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid DDS header: {0}")]
    InvalidHeader(String),
}

/// DDS file header, including the magic number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DdsHeader {
    pub width: u32,
    pub height: u32,
    pub mip_count: u32,
    pub encoding: PixelEncoding,
    pub texture_type: TextureType,
    pub normal_map: bool,
}

impl DdsHeader {
    /// Header for a texture of the given shape.
    ///
    /// # Arguments
    ///
    /// * `width`, `height` - Extent of level 0
    /// * `mip_count` - Levels per face
    /// * `encoding` - Encoding of every level
    /// * `texture_type` - 2D or cube map
    pub fn new(width: u32, height: u32, mip_count: u32, encoding: PixelEncoding, texture_type: TextureType) -> Self {
        Self {
            width,
            height,
            mip_count,
            encoding,
            texture_type,
            normal_map: false,
        }
    }

    /// Flag the pixel format as holding normals.
    pub fn with_normal_map(mut self, normal_map: bool) -> Self {
        self.normal_map = normal_map;
        self
    }

    /// Header describing an assembled asset.
    pub fn for_asset(asset: &TextureAsset) -> Self {
        let (width, height) = asset.base_extent().unwrap_or((0, 0));
        Self::new(
            width,
            height,
            asset.mip_count() as u32,
            asset.encoding(),
            asset.texture_type(),
        )
    }

    fn four_cc(&self) -> Option<&'static [u8; 4]> {
        match self.encoding {
            PixelEncoding::Rgba8 | PixelEncoding::Packed { .. } => None,
            PixelEncoding::Dxt1 => Some(b"DXT1"),
            PixelEncoding::Dxt3 => Some(b"DXT3"),
            PixelEncoding::Dxt5 => Some(b"DXT5"),
        }
    }

    /// Serialize to the 128 bytes that start a DDS file.
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut flags = DDSD_CAPS | DDSD_HEIGHT | DDSD_WIDTH | DDSD_PIXELFORMAT;
        let pitch_or_linear_size = if self.encoding.is_block_compressed() {
            flags |= DDSD_LINEARSIZE;
            self.encoding.level_size(self.width, self.height) as u32
        } else {
            flags |= DDSD_PITCH;
            self.encoding.level_size(self.width, 1) as u32
        };
        if self.mip_count > 1 {
            flags |= DDSD_MIPMAPCOUNT;
        }

        let mut caps = DDSCAPS_TEXTURE;
        if self.mip_count > 1 {
            caps |= DDSCAPS_COMPLEX | DDSCAPS_MIPMAP;
        }
        let mut caps2 = 0;
        if self.texture_type == TextureType::TextureCube {
            caps |= DDSCAPS_COMPLEX;
            caps2 |= DDSCAPS2_CUBEMAP | DDSCAPS2_CUBEMAP_ALL_FACES;
        }

        let mut pf_flags = if self.normal_map { DDPF_NORMAL } else { 0 };
        let (four_cc, bit_count, masks) = match self.four_cc() {
            Some(code) => {
                pf_flags |= DDPF_FOURCC;
                (u32::from_le_bytes(*code), 0, [0; 4])
            }
            None => {
                let (bit_count, masks) = match self.encoding {
                    PixelEncoding::Packed { bit_count, masks } => (bit_count, masks),
                    _ => (32, RGBA8_MASKS),
                };
                pf_flags |= DDPF_RGB;
                if masks[3] != 0 {
                    pf_flags |= DDPF_ALPHAPIXELS;
                }
                (0, bit_count, masks)
            }
        };

        let mut fields = [0u32; 31];
        fields[0] = 124;
        fields[1] = flags;
        fields[2] = self.height;
        fields[3] = self.width;
        fields[4] = pitch_or_linear_size;
        fields[5] = 0; // depth
        fields[6] = self.mip_count;
        // fields[7..18] reserved
        fields[18] = 32;
        fields[19] = pf_flags;
        fields[20] = four_cc;
        fields[21] = bit_count;
        fields[22..26].copy_from_slice(&masks);
        fields[26] = caps;
        fields[27] = caps2;

        let mut bytes = [0u8; HEADER_SIZE];
        bytes[..4].copy_from_slice(&DDS_MAGIC);
        for (i, field) in fields.iter().enumerate() {
            let offset = 4 + i * 4;
            bytes[offset..offset + 4].copy_from_slice(&field.to_le_bytes());
        }
        bytes
    }

    /// Parse a header written by [`to_bytes`](Self::to_bytes).
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DdsError> {
        if bytes.len() < HEADER_SIZE {
            return Err(DdsError::InvalidHeader(format!(
                "expected {} bytes, got {}",
                HEADER_SIZE,
                bytes.len()
            )));
        }
        if bytes[..4] != DDS_MAGIC {
            return Err(DdsError::InvalidHeader("missing DDS magic".to_string()));
        }
        let field = |i: usize| {
            let offset = 4 + i * 4;
            u32::from_le_bytes([bytes[offset], bytes[offset + 1], bytes[offset + 2], bytes[offset + 3]])
        };

        let pf_flags = field(19);
        let encoding = if pf_flags & DDPF_FOURCC != 0 {
            match &field(20).to_le_bytes() {
                b"DXT1" => PixelEncoding::Dxt1,
                b"DXT3" => PixelEncoding::Dxt3,
                b"DXT5" => PixelEncoding::Dxt5,
                other => {
                    return Err(DdsError::InvalidHeader(format!(
                        "unsupported FourCC {:?}",
                        String::from_utf8_lossy(other)
                    )))
                }
            }
        } else {
            let bit_count = field(21);
            let masks = [field(22), field(23), field(24), field(25)];
            match bit_count {
                32 if masks == RGBA8_MASKS => PixelEncoding::Rgba8,
                8 | 16 | 24 | 32 => PixelEncoding::Packed { bit_count, masks },
                other => {
                    return Err(DdsError::InvalidHeader(format!(
                        "unsupported bit count {}",
                        other
                    )))
                }
            }
        };

        let texture_type = if field(27) & DDSCAPS2_CUBEMAP != 0 {
            TextureType::TextureCube
        } else {
            TextureType::Texture2D
        };

        Ok(Self {
            width: field(3),
            height: field(2),
            mip_count: field(6).max(1),
            encoding,
            texture_type,
            normal_map: pf_flags & DDPF_NORMAL != 0,
        })
    }
}

/// Total file size for a texture of the given shape, header included.
pub fn expected_size(
    width: u32,
    height: u32,
    encoding: PixelEncoding,
    texture_type: TextureType,
    mip_count: u32,
) -> usize {
    let per_face: usize = (0..mip_count)
        .map(|mip| {
            let (w, h) = mip_extent(width, height, mip);
            encoding.level_size(w, h)
        })
        .sum();
    HEADER_SIZE + per_face * texture_type.face_count()
}

/// Serialize an asset to DDS bytes.
pub fn encode_asset(asset: &TextureAsset) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(HEADER_SIZE + asset.total_bytes());
    bytes.extend_from_slice(&DdsHeader::for_asset(asset).to_bytes());
    for face in asset.faces() {
        for level in face.levels() {
            bytes.extend_from_slice(level.data());
        }
    }
    bytes
}

/// Write an asset to a DDS file.
///
/// # Errors
///
/// Returns [`DdsError::Io`] if the file cannot be created or written.
pub fn write_asset(asset: &TextureAsset, path: impl AsRef<Path>) -> Result<(), DdsError> {
    let path = path.as_ref();
    let mut writer = BufWriter::new(File::create(path)?);
    writer.write_all(&DdsHeader::for_asset(asset).to_bytes())?;
    for face in asset.faces() {
        for level in face.levels() {
            writer.write_all(level.data())?;
        }
    }
    writer.flush()?;

    debug!(
        path = %path.display(),
        bytes = HEADER_SIZE + asset.total_bytes(),
        "Wrote DDS file"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::texture::{Face, MipLevel};

    fn asset(texture_type: TextureType, encoding: PixelEncoding, size: u32, mips: u32) -> TextureAsset {
        let faces = (0..texture_type.face_count())
            .map(|_| {
                Face::new(
                    (0..mips)
                        .map(|mip| {
                            let (w, h) = mip_extent(size, size, mip);
                            MipLevel::allocate(encoding, w, h)
                        })
                        .collect(),
                )
            })
            .collect();
        TextureAsset::new(texture_type, encoding, faces)
    }

    fn field(bytes: &[u8], i: usize) -> u32 {
        let offset = 4 + i * 4;
        u32::from_le_bytes(bytes[offset..offset + 4].try_into().unwrap())
    }

    #[test]
    fn test_header_bc1() {
        let bytes = DdsHeader::new(256, 128, 9, PixelEncoding::Dxt1, TextureType::Texture2D).to_bytes();
        assert_eq!(&bytes[..4], b"DDS ");
        assert_eq!(field(&bytes, 0), 124);
        assert_eq!(field(&bytes, 2), 128);
        assert_eq!(field(&bytes, 3), 256);
        assert_eq!(field(&bytes, 4), 64 * 32 * 8);
        assert_eq!(field(&bytes, 6), 9);
        assert_eq!(&bytes[84..88], b"DXT1");
        assert_ne!(field(&bytes, 1) & DDSD_MIPMAPCOUNT, 0);
        assert_ne!(field(&bytes, 26) & DDSCAPS_MIPMAP, 0);
    }

    #[test]
    fn test_header_cube_caps() {
        let bytes = DdsHeader::new(16, 16, 1, PixelEncoding::Dxt5, TextureType::TextureCube).to_bytes();
        assert_eq!(field(&bytes, 27), DDSCAPS2_CUBEMAP | DDSCAPS2_CUBEMAP_ALL_FACES);
        assert_eq!(field(&bytes, 1) & DDSD_MIPMAPCOUNT, 0);
    }

    #[test]
    fn test_header_rgba_masks() {
        let bytes = DdsHeader::new(4, 4, 1, PixelEncoding::Rgba8, TextureType::Texture2D).to_bytes();
        assert_eq!(field(&bytes, 4), 16);
        assert_eq!(field(&bytes, 21), 32);
        assert_eq!(field(&bytes, 22), 0x0000_00FF);
        assert_eq!(field(&bytes, 25), 0xFF00_0000);
    }

    #[test]
    fn test_header_packed_layout() {
        let rgb565 = PixelEncoding::Packed { bit_count: 16, masks: [0xF800, 0x07E0, 0x001F, 0] };
        let header = DdsHeader::new(6, 4, 1, rgb565, TextureType::Texture2D);
        let bytes = header.to_bytes();
        // 6 pixels of 16 bits pad to 12 bytes
        assert_eq!(field(&bytes, 4), 12);
        assert_eq!(field(&bytes, 19), DDPF_RGB);
        assert_eq!(field(&bytes, 21), 16);
        assert_eq!(field(&bytes, 22), 0xF800);
        assert_eq!(DdsHeader::from_bytes(&bytes).unwrap(), header);
    }

    #[test]
    fn test_header_normal_flag_roundtrip() {
        let header = DdsHeader::new(64, 64, 7, PixelEncoding::Dxt5, TextureType::Texture2D).with_normal_map(true);
        let parsed = DdsHeader::from_bytes(&header.to_bytes()).unwrap();
        assert_eq!(parsed, header);
    }

    #[test]
    fn test_from_bytes_rejects_garbage() {
        assert!(matches!(
            DdsHeader::from_bytes(&[0u8; 16]),
            Err(DdsError::InvalidHeader(_))
        ));
        let mut bytes = DdsHeader::new(4, 4, 1, PixelEncoding::Dxt1, TextureType::Texture2D).to_bytes();
        bytes[0] = b'X';
        assert!(DdsHeader::from_bytes(&bytes).is_err());
    }

    #[test]
    fn test_expected_size_4096_bc3_5_mipmaps() {
        // Twice the BC1 data
        let size = expected_size(4096, 4096, PixelEncoding::Dxt5, TextureType::Texture2D, 5);
        assert_eq!(size, HEADER_SIZE + 22_347_776);
    }

    #[test]
    fn test_encode_asset_matches_expected_size() {
        let cube = asset(TextureType::TextureCube, PixelEncoding::Dxt1, 32, 6);
        let bytes = encode_asset(&cube);
        assert_eq!(
            bytes.len(),
            expected_size(32, 32, PixelEncoding::Dxt1, TextureType::TextureCube, 6)
        );
        let header = DdsHeader::from_bytes(&bytes).unwrap();
        assert_eq!(header.texture_type, TextureType::TextureCube);
        assert_eq!(header.mip_count, 6);
    }

    #[test]
    fn test_write_asset_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.dds");
        let texture = asset(TextureType::Texture2D, PixelEncoding::Rgba8, 8, 4);

        write_asset(&texture, &path).unwrap();

        let written = std::fs::read(&path).unwrap();
        assert_eq!(written, encode_asset(&texture));
    }
}
