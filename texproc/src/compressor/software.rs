//! CPU implementation of the [`Compressor`] boundary.
//!
//! # Pipeline
//!
//! For each face, in face order:
//!
//! ```text
//! level-0 bytes ─► linear float ─► (height → normal) ─► resize to target
//!                                                            │
//!        ┌───────────────────────────────────────────────────┘
//!        ▼
//!   for each mip:  begin_image ─► output gamma ─► quantize ─► encode ─► write_data per row
//!        │
//!        └─► next level: caller data if usable, otherwise filtered from this one
//! ```
//!
//! Failures are reported through the error handler and end the run:
//!
//! | Condition | Code |
//! |-----------|------|
//! | No output handler attached | `FileOpen` |
//! | Layout undeclared, level-0 data missing | `InvalidInput` |
//! | Depth > 1, unpackable pixel format | `UnsupportedFeature` |
//! | Output handler refused bytes | `FileWrite` |

use tracing::{debug, trace};

use super::encode::encode_level;
use super::mipmap::LinearImage;
use super::normal::height_to_normal;
use super::options::{AlphaMode, CompressionOptions, Format, InputOptions, TextureLayout};
use super::output::{ErrorCode, OutputOptions};
use super::quantize::{binary_alpha, dither_binary_alpha, dither_channels, mask_bits, ALPHA4_BITS, RGB565_BITS};
use super::Compressor;
use crate::dds::DdsHeader;

/// Software texture compressor.
///
/// # Example
///
/// ```
/// use texproc::compressor::{
///     CompressionOptions, Compressor, Format, InputFormat, InputOptions, LastError,
///     OutputHandler, OutputOptions, SoftwareCompressor,
/// };
/// use texproc::texture::TextureType;
///
/// struct Collect(Vec<u8>);
///
/// impl OutputHandler for Collect {
///     fn begin_image(&mut self, _size: usize, _w: u32, _h: u32, _d: u32, _face: u32, _mip: u32) {}
///     fn write_data(&mut self, data: &[u8]) -> bool {
///         self.0.extend_from_slice(data);
///         true
///     }
/// }
///
/// let mut input = InputOptions::new();
/// input.set_texture_layout(TextureType::Texture2D, 8, 8, 1);
/// input.set_format(InputFormat::Rgba8);
/// assert!(input.set_mipmap_data(&[128; 8 * 8 * 4], 8, 8, 1, 0, 0));
///
/// let mut compression = CompressionOptions::new();
/// compression.set_format(Format::Dxt1);
///
/// let mut sink = Collect(Vec::new());
/// let mut errors = LastError::new();
/// let mut output = OutputOptions::new()
///     .with_output_handler(&mut sink)
///     .with_error_handler(&mut errors);
///
/// let mut compressor = SoftwareCompressor::new();
/// assert!(compressor.compress(&input, &compression, &mut output));
/// drop(output);
///
/// // 8×8, 4×4, 2×2 and 1×1 levels
/// assert_eq!(sink.0.len(), 32 + 8 + 8 + 8);
/// ```
#[derive(Debug, Clone, Default)]
pub struct SoftwareCompressor {
    runs: u64,
}

impl SoftwareCompressor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `compress` calls made on this instance.
    pub fn runs(&self) -> u64 {
        self.runs
    }

    fn run(
        &self,
        input: &InputOptions,
        compression: &CompressionOptions,
        output: &mut OutputOptions<'_>,
    ) -> Result<(), ErrorCode> {
        if !output.has_output_handler() {
            return Err(ErrorCode::FileOpen);
        }
        let layout = input.layout().ok_or(ErrorCode::InvalidInput)?;
        if layout.depth() > 1 {
            return Err(ErrorCode::UnsupportedFeature);
        }
        if let Some(pixel_format) = compression.pixel_format() {
            if compression.format() == Format::Rgba && !pixel_format.is_supported() {
                return Err(ErrorCode::UnsupportedFeature);
            }
        }
        let (target_width, target_height) = input.target_extents().ok_or(ErrorCode::InvalidInput)?;
        let mip_count = input.output_mipmap_count();

        for face in 0..layout.face_count() {
            if layout.image(face, 0).is_none() {
                return Err(ErrorCode::InvalidInput);
            }
        }

        if output.output_header() {
            let header = DdsHeader::new(
                target_width,
                target_height,
                mip_count,
                compression.encoding(),
                layout.texture_type(),
            )
            .with_normal_map(input.treats_as_normals());
            if !output.write_data(&header.to_bytes()) {
                return Err(ErrorCode::FileWrite);
            }
        }

        let use_source_levels = (layout.width(), layout.height()) == (target_width, target_height)
            && (0..layout.face_count()).all(|face| (0..mip_count).all(|mip| layout.image(face, mip).is_some()));

        debug!(
            faces = layout.face_count(),
            width = target_width,
            height = target_height,
            mips = mip_count,
            format = ?compression.format(),
            source_levels = use_source_levels,
            "Compressing texture"
        );

        let row_size = |width: u32| compression.row_size(width).max(1);

        for face in 0..layout.face_count() {
            let mut current = prepare_level(input, layout, face, 0).ok_or(ErrorCode::InvalidInput)?;
            if (current.width(), current.height()) != (target_width, target_height) {
                current = current.resize(
                    target_width,
                    target_height,
                    input.mipmap_filter(),
                    input.wrap_mode(),
                    alpha_weighted(input),
                );
            }

            for mip in 0..mip_count {
                if mip > 0 {
                    current = if use_source_levels {
                        prepare_level(input, layout, face, mip).ok_or(ErrorCode::InvalidInput)?
                    } else {
                        let mut next =
                            current.downsample(input.mipmap_filter(), input.wrap_mode(), alpha_weighted(input));
                        if input.treats_as_normals() && input.normalize_mipmaps() {
                            next.normalize_normals();
                        }
                        next
                    };
                }

                let (width, height) = (current.width(), current.height());
                let size = compression.level_size(width, height);
                output.begin_image(size, width, height, 1, face, mip);

                let mut level = current.clone();
                if !input.treats_as_normals() {
                    level.to_gamma(input.output_gamma());
                }
                let mut pixels = level.to_rgba8();
                quantize(compression, &mut pixels, width, height);
                let encoded = encode_level(compression.format(), compression.pixel_format(), &pixels, width, height);

                trace!(face, mip, width, height, size, "Emitting level");
                for chunk in encoded.chunks(row_size(width)) {
                    if !output.write_data(chunk) {
                        return Err(ErrorCode::FileWrite);
                    }
                }
            }
        }

        Ok(())
    }
}

impl Compressor for SoftwareCompressor {
    fn compress(
        &mut self,
        input: &InputOptions,
        compression: &CompressionOptions,
        output: &mut OutputOptions<'_>,
    ) -> bool {
        self.runs += 1;
        match self.run(input, compression, output) {
            Ok(()) => true,
            Err(code) => {
                debug!(code = ?code, "Compression failed");
                output.report_error(code);
                false
            }
        }
    }

    fn set_enable_cuda(&mut self, enabled: bool) {
        if enabled {
            debug!("CUDA acceleration requested; software compressor runs on the CPU");
        }
    }
}

fn alpha_weighted(input: &InputOptions) -> bool {
    input.alpha_mode() == AlphaMode::Transparency
}

/// Decode a supplied slot into a working image in linear space.
fn prepare_level(input: &InputOptions, layout: &TextureLayout, face: u32, mip: u32) -> Option<LinearImage> {
    let source = layout.image(face, mip)?;
    let mut image = LinearImage::from_bytes(&source.data, source.width, source.height, input.input_format());

    if input.convert_to_normal_map() {
        image = height_to_normal(&image, input.height_factors(), input.wrap_mode());
    } else if !input.is_normal_map() {
        image.to_linear(input.input_gamma());
    }
    Some(image)
}

fn quantize(compression: &CompressionOptions, pixels: &mut [u8], width: u32, height: u32) {
    let format = compression.format();

    if compression.color_dithering() {
        if format.is_block_compressed() {
            dither_channels(pixels, width, height, &RGB565_BITS);
        } else if let Some(pixel_format) = compression.pixel_format() {
            let masks = pixel_format.masks();
            let channels: Vec<(usize, u32)> = (0..3).map(|c| (c, mask_bits(masks[c]))).collect();
            dither_channels(pixels, width, height, &channels);
        }
    }

    if compression.binary_alpha() {
        if compression.alpha_dithering() {
            dither_binary_alpha(pixels, width, height, compression.alpha_threshold());
        } else {
            binary_alpha(pixels, compression.alpha_threshold());
        }
    } else if compression.alpha_dithering() {
        match format {
            Format::Dxt3 => dither_channels(pixels, width, height, &ALPHA4_BITS),
            Format::Dxt1a => dither_binary_alpha(pixels, width, height, 127),
            _ => {}
        }
    }
}
