//! Assembled texture assets.
//!
//! A [`TextureAsset`] is an ordered list of faces (one for 2D textures, six
//! for cube maps), each holding a mip chain from the largest level down.
//! Levels own their bytes and carry the encoding they were produced in.

use std::fmt;

use crate::error::ValidationError;
use crate::texture::{mip_extent, PixelEncoding, TextureError};

/// Shape of a texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureType {
    /// A single 2D image.
    Texture2D,
    /// Six square faces forming a cube map.
    TextureCube,
}

impl TextureType {
    /// Number of faces a texture of this type has.
    pub fn face_count(self) -> usize {
        match self {
            TextureType::Texture2D => 1,
            TextureType::TextureCube => CubeFace::ALL.len(),
        }
    }
}

impl fmt::Display for TextureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextureType::Texture2D => f.write_str("2D"),
            TextureType::TextureCube => f.write_str("cube"),
        }
    }
}

/// Named cube map faces, in face-index order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CubeFace {
    PositiveX,
    NegativeX,
    PositiveY,
    NegativeY,
    PositiveZ,
    NegativeZ,
}

impl CubeFace {
    /// All faces in index order.
    pub const ALL: [CubeFace; 6] = [
        CubeFace::PositiveX,
        CubeFace::NegativeX,
        CubeFace::PositiveY,
        CubeFace::NegativeY,
        CubeFace::PositiveZ,
        CubeFace::NegativeZ,
    ];

    /// Face index used by the compressor's event stream.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Face for a stream index, if one exists.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

/// Single-writer storage for one level's bytes.
///
/// Storage is sized from its extent and encoding when created; the bytes are
/// written once the producer has delivered all of them.
pub trait ByteSink {
    /// Number of bytes the storage holds.
    fn byte_len(&self) -> usize;

    /// Replace the stored bytes. The slice length must equal [`byte_len`].
    ///
    /// [`byte_len`]: ByteSink::byte_len
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), TextureError>;
}

/// One mip level of one face.
#[derive(Clone, PartialEq, Eq)]
pub struct MipLevel {
    width: u32,
    height: u32,
    encoding: PixelEncoding,
    data: Vec<u8>,
}

impl MipLevel {
    /// Allocate zeroed storage for a level of the given extent.
    pub fn allocate(encoding: PixelEncoding, width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            encoding,
            data: vec![0; encoding.level_size(width, height)],
        }
    }

    /// Wrap existing bytes, checking their length against the encoding.
    pub fn from_bytes(
        encoding: PixelEncoding,
        width: u32,
        height: u32,
        data: Vec<u8>,
    ) -> Result<Self, TextureError> {
        let expected = encoding.level_size(width, height);
        if data.len() != expected {
            return Err(TextureError::SizeMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            encoding,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn encoding(&self) -> PixelEncoding {
        self.encoding
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Consume the level, returning its bytes.
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }
}

impl ByteSink for MipLevel {
    fn byte_len(&self) -> usize {
        self.data.len()
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), TextureError> {
        if bytes.len() != self.data.len() {
            return Err(TextureError::SizeMismatch {
                expected: self.data.len(),
                actual: bytes.len(),
            });
        }
        self.data.copy_from_slice(bytes);
        Ok(())
    }
}

impl fmt::Debug for MipLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MipLevel")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("encoding", &self.encoding)
            .field("bytes", &self.data.len())
            .finish()
    }
}

/// Ordered mip chain of one face, largest level first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Face {
    levels: Vec<MipLevel>,
}

impl Face {
    pub fn new(levels: Vec<MipLevel>) -> Self {
        Self { levels }
    }

    pub fn levels(&self) -> &[MipLevel] {
        &self.levels
    }

    pub fn level(&self, mip: usize) -> Option<&MipLevel> {
        self.levels.get(mip)
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

/// A structured, multi-face, multi-level texture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureAsset {
    texture_type: TextureType,
    encoding: PixelEncoding,
    faces: Vec<Face>,
}

impl TextureAsset {
    /// Create an asset from assembled faces.
    pub fn new(texture_type: TextureType, encoding: PixelEncoding, faces: Vec<Face>) -> Self {
        Self {
            texture_type,
            encoding,
            faces,
        }
    }

    pub fn texture_type(&self) -> TextureType {
        self.texture_type
    }

    pub fn encoding(&self) -> PixelEncoding {
        self.encoding
    }

    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    pub fn face(&self, index: usize) -> Option<&Face> {
        self.faces.get(index)
    }

    /// Face by cube-map name. `None` for 2D textures.
    pub fn cube_face(&self, face: CubeFace) -> Option<&Face> {
        match self.texture_type {
            TextureType::TextureCube => self.faces.get(face.index()),
            TextureType::Texture2D => None,
        }
    }

    /// Level count of the first face (all faces share it once validated).
    pub fn mip_count(&self) -> usize {
        self.faces.first().map(Face::len).unwrap_or(0)
    }

    /// Extent of level 0.
    pub fn base_extent(&self) -> Option<(u32, u32)> {
        self.faces
            .first()
            .and_then(|face| face.level(0))
            .map(|level| (level.width(), level.height()))
    }

    /// Total bytes across every face and level.
    pub fn total_bytes(&self) -> usize {
        self.faces
            .iter()
            .flat_map(|face| face.levels())
            .map(|level| level.data().len())
            .sum()
    }

    /// Check the structural invariants of the asset.
    ///
    /// # Checks
    ///
    /// 1. Face count matches the texture type
    /// 2. Every face has the same, non-zero number of levels
    /// 3. Level `i + 1` is level `i` halved and floored on each axis
    /// 4. Every level uses the asset's encoding and holds exactly the bytes
    ///    its extent requires
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] encountered.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let expected_faces = self.texture_type.face_count();
        if self.faces.len() != expected_faces {
            return Err(ValidationError::FaceCount {
                expected: expected_faces,
                actual: self.faces.len(),
            });
        }

        let chain_length = self.mip_count();
        for (face_index, face) in self.faces.iter().enumerate() {
            if face.is_empty() || face.len() != chain_length {
                return Err(ValidationError::MipCount {
                    face: face_index,
                    expected: chain_length.max(1),
                    actual: face.len(),
                });
            }

            let base = &face.levels[0];
            for (mip, level) in face.levels.iter().enumerate() {
                let expected_extent = mip_extent(base.width, base.height, mip as u32);
                let actual_extent = (level.width, level.height);
                if actual_extent != expected_extent {
                    return Err(ValidationError::LevelExtent {
                        face: face_index,
                        mip,
                        expected: expected_extent,
                        actual: actual_extent,
                    });
                }

                if level.encoding != self.encoding {
                    return Err(ValidationError::EncodingMismatch {
                        face: face_index,
                        mip,
                        expected: self.encoding,
                        actual: level.encoding,
                    });
                }

                let expected_size = self.encoding.level_size(level.width, level.height);
                if level.data.len() != expected_size {
                    return Err(ValidationError::LevelSize {
                        face: face_index,
                        mip,
                        expected: expected_size,
                        actual: level.data.len(),
                    });
                }
            }
        }

        Ok(())
    }
}
