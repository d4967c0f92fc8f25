//! The texture compressor boundary.
//!
//! A [`Compressor`] turns configured [`InputOptions`] and
//! [`CompressionOptions`] into a stream of levels delivered through the
//! handlers borrowed by [`OutputOptions`]. It is a black box to the rest of
//! the crate: sessions only depend on this trait.
//!
//! ```text
//! ┌──────────────┐   ┌────────────────────┐
//! │ InputOptions │   │ CompressionOptions │
//! └──────┬───────┘   └─────────┬──────────┘
//!        └──────────┬──────────┘
//!                   ▼
//!           ┌──────────────┐   begin_image / write_data   ┌───────────────┐
//!           │  Compressor  │ ───────────────────────────► │ OutputHandler │
//!           │   (trait)    │ ───────────────────────────► │ ErrorHandler  │
//!           └──────────────┘            error             └───────────────┘
//! ```
//!
//! [`SoftwareCompressor`] is the bundled implementation.

mod encode;
mod mipmap;
mod normal;
mod options;
mod output;
mod quantize;
mod software;

pub use options::{
    estimate_output_size, AlphaMode, CompressionOptions, Format, InputFormat, InputImage, InputOptions,
    MipmapFilter, PixelFormat, Quality, RoundMode, TextureLayout, WrapMode, DEFAULT_ALPHA_THRESHOLD, DEFAULT_GAMMA,
};
pub use output::{ErrorCode, ErrorHandler, LastError, OutputHandler, OutputOptions};
pub use software::SoftwareCompressor;

/// A texture compressor.
///
/// `compress` runs synchronously. Every handler callback happens on the
/// caller's stack before it returns, and handlers must not call back into
/// the compressor.
pub trait Compressor: Send {
    /// Compress the configured input, streaming levels to the output handler.
    ///
    /// Returns `false` on failure after reporting an [`ErrorCode`] to the
    /// error handler.
    fn compress(
        &mut self,
        input: &InputOptions,
        compression: &CompressionOptions,
        output: &mut OutputOptions<'_>,
    ) -> bool;

    /// Bytes a `compress` call would emit, excluding any container header.
    ///
    /// Must not invoke any handler.
    fn estimate_size(&self, input: &InputOptions, compression: &CompressionOptions) -> usize {
        estimate_output_size(input, compression)
    }

    /// Request GPU acceleration. Compressors without a device ignore it.
    fn set_enable_cuda(&mut self, _enabled: bool) {}

    /// Whether runs will use GPU acceleration.
    fn cuda_enabled(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send<T: Send>() {}

    #[test]
    fn test_software_compressor_is_send() {
        assert_send::<SoftwareCompressor>();
    }

    #[test]
    fn test_estimate_size_default_matches_emitted_bytes() {
        use crate::texture::TextureType;

        struct Count(usize);
        impl OutputHandler for Count {
            fn begin_image(&mut self, _: usize, _: u32, _: u32, _: u32, _: u32, _: u32) {}
            fn write_data(&mut self, data: &[u8]) -> bool {
                self.0 += data.len();
                true
            }
        }

        let mut input = InputOptions::new();
        input.set_texture_layout(TextureType::Texture2D, 20, 12, 1);
        input.set_format(InputFormat::Rgba8);
        assert!(input.set_mipmap_data(&[7; 20 * 12 * 4], 20, 12, 1, 0, 0));
        let mut compression = CompressionOptions::new();
        compression.set_format(Format::Dxt3);

        let mut compressor = SoftwareCompressor::new();
        let estimate = compressor.estimate_size(&input, &compression);

        let mut count = Count(0);
        {
            let mut output = OutputOptions::new().with_output_handler(&mut count);
            assert!(compressor.compress(&input, &compression, &mut output));
        }
        assert_eq!(count.0, estimate);
        assert_eq!(compressor.runs(), 1);
    }
}
