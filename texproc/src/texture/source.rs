//! Source textures supplied by the caller.

use image::RgbaImage;

use crate::error::ConfigError;
use crate::texture::{mip_extent, TextureError, TextureType, RGBA_BYTES_PER_PIXEL};

/// One RGBA8 input image, pixels in R, G, B, A order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceImage {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl SourceImage {
    /// Wrap raw RGBA8 bytes.
    ///
    /// # Errors
    ///
    /// Returns [`TextureError::InvalidDimensions`] for a zero extent and
    /// [`TextureError::SizeMismatch`] when `data` is not `width × height × 4`
    /// bytes.
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Result<Self, TextureError> {
        if width == 0 || height == 0 {
            return Err(TextureError::InvalidDimensions {
                width,
                height,
                reason: "extent must be non-zero".to_string(),
            });
        }
        let expected = width as usize * height as usize * RGBA_BYTES_PER_PIXEL;
        if data.len() != expected {
            return Err(TextureError::SizeMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self { width, height, data })
    }

    /// Image filled with a single colour.
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Result<Self, TextureError> {
        Self::new(width, height, rgba.repeat(width as usize * height as usize))
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

impl From<RgbaImage> for SourceImage {
    fn from(image: RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        Self {
            width,
            height,
            data: image.into_raw(),
        }
    }
}

/// A 2D or cube texture, each face an ordered chain of source images.
///
/// Only level 0 of each face is required; further levels are optional and
/// used in place of generated ones when every face supplies them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceTexture {
    texture_type: TextureType,
    faces: Vec<Vec<SourceImage>>,
}

impl SourceTexture {
    /// 2D texture from a single image.
    pub fn texture_2d(image: impl Into<SourceImage>) -> Self {
        Self {
            texture_type: TextureType::Texture2D,
            faces: vec![vec![image.into()]],
        }
    }

    /// 2D texture with caller-supplied mip levels, largest first.
    pub fn texture_2d_with_mips(levels: Vec<SourceImage>) -> Self {
        Self {
            texture_type: TextureType::Texture2D,
            faces: vec![levels],
        }
    }

    /// Cube texture from six faces in [`CubeFace`](crate::texture::CubeFace)
    /// order.
    pub fn cube(faces: [SourceImage; 6]) -> Self {
        Self {
            texture_type: TextureType::TextureCube,
            faces: faces.into_iter().map(|face| vec![face]).collect(),
        }
    }

    /// Texture from explicit per-face chains.
    pub fn from_faces(texture_type: TextureType, faces: Vec<Vec<SourceImage>>) -> Self {
        Self { texture_type, faces }
    }

    pub fn texture_type(&self) -> TextureType {
        self.texture_type
    }

    pub fn faces(&self) -> &[Vec<SourceImage>] {
        &self.faces
    }

    /// Extent of level 0 of the first face.
    pub fn base_extent(&self) -> Option<(u32, u32)> {
        self.faces
            .first()
            .and_then(|chain| chain.first())
            .map(|image| (image.width, image.height))
    }

    /// Check that the texture can be described to a compressor.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidLayout`] when the face count does not match
    /// the type, a face has no level 0, level 0 is empty, faces differ in extent, cube faces
    /// are not square, or a chain does not halve level by level.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let expected = self.texture_type.face_count();
        if self.faces.len() != expected {
            return Err(ConfigError::InvalidLayout(format!(
                "{} texture needs {} faces, got {}",
                self.texture_type,
                expected,
                self.faces.len()
            )));
        }

        let (width, height) = self
            .base_extent()
            .ok_or_else(|| ConfigError::InvalidLayout("face 0 has no level 0 image".to_string()))?;
        if width == 0 || height == 0 {
            return Err(ConfigError::InvalidLayout(format!(
                "level 0 extent must be non-zero, got {}×{}",
                width, height
            )));
        }

        if self.texture_type == TextureType::TextureCube && width != height {
            return Err(ConfigError::InvalidLayout(format!(
                "cube faces must be square, got {}×{}",
                width, height
            )));
        }

        for (face, chain) in self.faces.iter().enumerate() {
            if chain.is_empty() {
                return Err(ConfigError::InvalidLayout(format!(
                    "face {} has no level 0 image",
                    face
                )));
            }
            for (mip, image) in chain.iter().enumerate() {
                let expected = mip_extent(width, height, mip as u32);
                if (image.width, image.height) != expected {
                    return Err(ConfigError::InvalidLayout(format!(
                        "face {} level {} is {}×{}, expected {}×{}",
                        face, mip, image.width, image.height, expected.0, expected.1
                    )));
                }
            }
        }
        Ok(())
    }
}
