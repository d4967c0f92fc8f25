//! Processor settings.
//!
//! [`ProcessorSettings`] is everything a caller controls about one
//! compression run. Defaults match a typical colour texture pipeline:
//! BC1 output at normal quality, mipmaps generated down to 1×1, sRGB-ish
//! 2.2 gamma on both sides.
//!
//! Settings deserialize from partial documents; missing fields take their
//! defaults.
//!
//! # Example
//!
//! ```
//! use texproc::compressor::Quality;
//! use texproc::config::ProcessorSettings;
//! use texproc::policy::OutputFormat;
//!
//! let settings = ProcessorSettings::default()
//!     .with_format(OutputFormat::Dxt5)
//!     .with_quality(Quality::Production)
//!     .with_max_mip_level(Some(4));
//!
//! assert!(settings.validate().is_ok());
//! ```

use serde::{Deserialize, Serialize};

use crate::compressor::{AlphaMode, MipmapFilter, PixelFormat, Quality, RoundMode, WrapMode, DEFAULT_ALPHA_THRESHOLD, DEFAULT_GAMMA};
use crate::error::ConfigError;
use crate::policy::{FormatRequest, Gamma, OutputFormat};

/// Settings for one compression run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessorSettings {
    pub format: OutputFormat,
    pub quality: Quality,
    /// Derive normals from colour or height (normal-map formats only).
    pub convert_to_normal_map: bool,
    pub generate_mipmaps: bool,
    /// Cap on the number of levels; `None` for a full chain.
    pub max_mip_level: Option<u32>,
    /// Largest target extent; larger inputs are scaled down.
    pub max_extent: Option<u32>,
    pub input_gamma: f32,
    pub output_gamma: f32,
    pub wrap_mode: WrapMode,
    pub mipmap_filter: MipmapFilter,
    pub round_mode: RoundMode,
    pub alpha_mode: AlphaMode,
    pub color_dithering: bool,
    pub alpha_dithering: bool,
    pub binary_alpha: bool,
    pub alpha_threshold: u8,
    /// Explicit bit layout for uncompressed colour output.
    pub pixel_format: Option<PixelFormat>,
    /// Request GPU acceleration from compressors that have it.
    pub enable_cuda: bool,
}

impl Default for ProcessorSettings {
    fn default() -> Self {
        Self {
            format: OutputFormat::Dxt1,
            quality: Quality::Normal,
            convert_to_normal_map: false,
            generate_mipmaps: true,
            max_mip_level: None,
            max_extent: None,
            input_gamma: DEFAULT_GAMMA,
            output_gamma: DEFAULT_GAMMA,
            wrap_mode: WrapMode::Mirror,
            mipmap_filter: MipmapFilter::Box,
            round_mode: RoundMode::None,
            alpha_mode: AlphaMode::None,
            color_dithering: false,
            alpha_dithering: false,
            binary_alpha: false,
            alpha_threshold: DEFAULT_ALPHA_THRESHOLD,
            pixel_format: None,
            enable_cuda: false,
        }
    }
}

impl ProcessorSettings {
    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    /// Set the format by name.
    ///
    /// # Errors
    ///
    /// [`ConfigError::UnknownFormat`] for an unrecognized name.
    pub fn with_format_name(self, name: &str) -> Result<Self, ConfigError> {
        Ok(self.with_format(name.parse()?))
    }

    pub fn with_quality(mut self, quality: Quality) -> Self {
        self.quality = quality;
        self
    }

    pub fn with_convert_to_normal_map(mut self, convert: bool) -> Self {
        self.convert_to_normal_map = convert;
        self
    }

    pub fn with_mipmaps(mut self, generate: bool) -> Self {
        self.generate_mipmaps = generate;
        self
    }

    pub fn with_max_mip_level(mut self, max_level: Option<u32>) -> Self {
        self.max_mip_level = max_level;
        self
    }

    pub fn with_max_extent(mut self, max_extent: Option<u32>) -> Self {
        self.max_extent = max_extent;
        self
    }

    pub fn with_gamma(mut self, input: f32, output: f32) -> Self {
        self.input_gamma = input;
        self.output_gamma = output;
        self
    }

    pub fn with_wrap_mode(mut self, wrap_mode: WrapMode) -> Self {
        self.wrap_mode = wrap_mode;
        self
    }

    pub fn with_mipmap_filter(mut self, filter: MipmapFilter) -> Self {
        self.mipmap_filter = filter;
        self
    }

    pub fn with_round_mode(mut self, round_mode: RoundMode) -> Self {
        self.round_mode = round_mode;
        self
    }

    pub fn with_alpha_mode(mut self, alpha_mode: AlphaMode) -> Self {
        self.alpha_mode = alpha_mode;
        self
    }

    pub fn with_dithering(mut self, color: bool, alpha: bool) -> Self {
        self.color_dithering = color;
        self.alpha_dithering = alpha;
        self
    }

    pub fn with_binary_alpha(mut self, enabled: bool, threshold: u8) -> Self {
        self.binary_alpha = enabled;
        self.alpha_threshold = threshold;
        self
    }

    /// Pack [`OutputFormat::Color`] levels with this layout instead of RGBA8.
    pub fn with_pixel_format(mut self, pixel_format: PixelFormat) -> Self {
        self.pixel_format = Some(pixel_format);
        self
    }

    pub fn with_cuda(mut self, enabled: bool) -> Self {
        self.enable_cuda = enabled;
        self
    }

    pub fn gamma(&self) -> Gamma {
        Gamma::new(self.input_gamma, self.output_gamma)
    }

    /// The format request these settings describe.
    pub fn format_request(&self) -> FormatRequest {
        FormatRequest::new(self.format, self.quality)
            .with_gamma(self.gamma())
            .with_convert_to_normal_map(self.convert_to_normal_map)
    }

    /// Check value ranges.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidSetting`] for a non-positive or non-finite
    /// gamma, a zero max mip level, a zero max extent, or a pixel layout
    /// that is not 8, 16, 24 or 32 bits.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [("input_gamma", self.input_gamma), ("output_gamma", self.output_gamma)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::InvalidSetting {
                    name,
                    reason: format!("must be a positive finite number, got {}", value),
                });
            }
        }
        if self.max_mip_level == Some(0) {
            return Err(ConfigError::InvalidSetting {
                name: "max_mip_level",
                reason: "must be at least 1; use None for a full chain".to_string(),
            });
        }
        if self.max_extent == Some(0) {
            return Err(ConfigError::InvalidSetting {
                name: "max_extent",
                reason: "must be at least 1; use None for no limit".to_string(),
            });
        }
        if let Some(pixel_format) = self.pixel_format.filter(|layout| !layout.is_supported()) {
            return Err(ConfigError::InvalidSetting {
                name: "pixel_format",
                reason: format!("unsupported bit count {}", pixel_format.bit_count),
            });
        }
        Ok(())
    }
}
