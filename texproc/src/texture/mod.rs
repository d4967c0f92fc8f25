//! Texture data model.
//!
//! Inputs and outputs of a compression run:
//!
//! ```text
//!   SourceTexture                              TextureAsset
//!   ┌─────────────────────┐                    ┌──────────────────────────┐
//!   │ face 0: [img, ...]  │   compress +       │ face 0: [MipLevel, ...]  │
//!   │ face 1: [img, ...]  │ ─ assemble ──────► │ face 1: [MipLevel, ...]  │
//!   │ ...                 │                    │ ...                      │
//!   └─────────────────────┘                    └──────────────────────────┘
//!        RGBA8 images                            one PixelEncoding for all
//! ```
//!
//! 2D textures have one face and cube textures six, named by [`CubeFace`].
//! Each face is a mip chain from level 0 down, each level half the previous
//! on both axes (floored, never below 1).
//!
//! # Example
//!
//! ```
//! use texproc::texture::{mip_extent, PixelEncoding};
//!
//! let (w, h) = mip_extent(128, 128, 3);
//! assert_eq!((w, h), (16, 16));
//! assert_eq!(PixelEncoding::Dxt1.level_size(w, h), 128);
//! ```

mod asset;
mod encoding;
mod error;
mod extent;
mod source;

pub use asset::{ByteSink, CubeFace, Face, MipLevel, TextureAsset, TextureType};
pub use encoding::{PixelEncoding, BLOCK_DIMENSION, RGBA8_MASKS, RGBA_BYTES_PER_PIXEL};
pub use error::TextureError;
pub use extent::{full_mip_count, mip_extent, MAX_MIP_LEVELS};
pub use source::{SourceImage, SourceTexture};
