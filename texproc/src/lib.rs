//! texproc - texture compression output assembly
//!
//! This library drives a block compressor over a source texture and
//! assembles its streamed output into an in-memory [`TextureAsset`],
//! one buffer per face and mip level.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐   ┌──────────────┐   ┌──────────────────────┐
//! │ ProcessorSettings│──►│ FormatPolicy │──►│ InputOptions +       │
//! └──────────────────┘   └──────────────┘   │ CompressionOptions   │
//!                                           └──────────┬───────────┘
//!                                                      │
//!  SourceTexture ──► CompressionSession ──► Compressor::compress
//!                                                      │ begin_image / write_data
//!                                                      ▼
//!                        LastError ◄── error ── StreamAssembler
//!                                                      │ finish()
//!                                                      ▼
//!                                               TextureAsset ──► dds
//! ```
//!
//! # Modules
//!
//! - [`session`] - single-use run coordinator and failure classification
//! - [`assembler`] - output stream to per-level buffers
//! - [`policy`] - output format names to compressor settings
//! - [`compressor`] - compressor boundary and the software compressor
//! - [`texture`] - source and assembled texture types
//! - [`dds`] - DDS container encoding
//! - [`config`] - processor settings
//! - [`error`] - error taxonomy
//! - [`logging`] - tracing subscriber setup
//!
//! # Example
//!
//! ```
//! use texproc::compressor::SoftwareCompressor;
//! use texproc::config::ProcessorSettings;
//! use texproc::session::CompressionSession;
//! use texproc::texture::{SourceImage, SourceTexture};
//!
//! let image = SourceImage::solid(64, 64, [0, 128, 255, 255]).unwrap();
//! let source = SourceTexture::texture_2d(image);
//!
//! let mut session = CompressionSession::new(SoftwareCompressor::new(), ProcessorSettings::default());
//! let asset = session.run(&source).unwrap();
//! assert_eq!(asset.mip_count(), 7);
//! ```
//!
//! [`TextureAsset`]: texture::TextureAsset

pub mod assembler;
pub mod compressor;
pub mod config;
pub mod dds;
pub mod error;
pub mod logging;
pub mod policy;
pub mod session;
pub mod texture;

pub use assembler::{AssemblyError, StreamAssembler};
pub use config::ProcessorSettings;
pub use error::{ConfigError, NativeFailureKind, ProcessError, ValidationError};
pub use policy::{FormatPolicy, OutputFormat};
pub use session::{CompressionSession, SessionState};
pub use texture::{SourceImage, SourceTexture, TextureAsset};
