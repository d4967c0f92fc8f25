//! Semantic output formats and their compressor settings.
//!
//! [`FormatPolicy::select`] maps a requested [`OutputFormat`] to a
//! [`FormatSelection`]:
//!
//! | Requested | Compressor format | Quality | Normal pipeline | Gamma |
//! |-----------|-------------------|---------|-----------------|-------|
//! | `Color` | RGBA | caller | no | caller |
//! | `NormalMap` | RGBA | caller | yes | caller |
//! | `Dxt1` | DXT1 | caller | no | caller |
//! | `Dxt1a` | DXT1a | caller | no | caller |
//! | `Dxt3` | DXT3 | caller | no | caller |
//! | `Dxt5` | DXT5 | caller | no | caller |
//! | `Dxt5n` | DXT5n | **Fastest** | yes | **1.0 / 1.0** |
//!
//! DXT5n encoding is very slow at higher quality levels, so its quality is
//! always forced down to `Fastest` whatever the caller asked for.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::compressor::{CompressionOptions, Format, InputOptions, Quality, DEFAULT_GAMMA};
use crate::error::ConfigError;

/// Semantic output format requested by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// Uncompressed colour.
    #[serde(alias = "colour")]
    Color,
    /// Uncompressed normal map.
    #[serde(alias = "normals")]
    NormalMap,
    Dxt1,
    Dxt1a,
    Dxt3,
    Dxt5,
    /// DXT5 with the normal-map swizzle.
    Dxt5n,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 7] = [
        OutputFormat::Color,
        OutputFormat::NormalMap,
        OutputFormat::Dxt1,
        OutputFormat::Dxt1a,
        OutputFormat::Dxt3,
        OutputFormat::Dxt5,
        OutputFormat::Dxt5n,
    ];

    /// Canonical lowercase name.
    pub fn name(self) -> &'static str {
        match self {
            OutputFormat::Color => "color",
            OutputFormat::NormalMap => "normal_map",
            OutputFormat::Dxt1 => "dxt1",
            OutputFormat::Dxt1a => "dxt1a",
            OutputFormat::Dxt3 => "dxt3",
            OutputFormat::Dxt5 => "dxt5",
            OutputFormat::Dxt5n => "dxt5n",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for OutputFormat {
    type Err = ConfigError;

    /// Parse a format name, case-insensitively.
    ///
    /// Accepts the canonical names plus `colour`, `normals`, `bc1`, `bc2`
    /// and `bc3`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "color" | "colour" => Ok(OutputFormat::Color),
            "normal_map" | "normalmap" | "normals" => Ok(OutputFormat::NormalMap),
            "dxt1" | "bc1" => Ok(OutputFormat::Dxt1),
            "dxt1a" => Ok(OutputFormat::Dxt1a),
            "dxt3" | "bc2" => Ok(OutputFormat::Dxt3),
            "dxt5" | "bc3" => Ok(OutputFormat::Dxt5),
            "dxt5n" => Ok(OutputFormat::Dxt5n),
            _ => Err(ConfigError::UnknownFormat(s.to_string())),
        }
    }
}

/// Input and output gamma pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Gamma {
    pub input: f32,
    pub output: f32,
}

impl Gamma {
    /// No gamma conversion.
    pub const LINEAR: Gamma = Gamma {
        input: 1.0,
        output: 1.0,
    };

    pub fn new(input: f32, output: f32) -> Self {
        Self { input, output }
    }
}

impl Default for Gamma {
    fn default() -> Self {
        Self::new(DEFAULT_GAMMA, DEFAULT_GAMMA)
    }
}

/// What the caller asked for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FormatRequest {
    pub format: OutputFormat,
    pub quality: Quality,
    pub gamma: Gamma,
    pub convert_to_normal_map: bool,
}

impl FormatRequest {
    pub fn new(format: OutputFormat, quality: Quality) -> Self {
        Self {
            format,
            quality,
            gamma: Gamma::default(),
            convert_to_normal_map: false,
        }
    }

    pub fn with_gamma(mut self, gamma: Gamma) -> Self {
        self.gamma = gamma;
        self
    }

    pub fn with_convert_to_normal_map(mut self, convert: bool) -> Self {
        self.convert_to_normal_map = convert;
        self
    }
}

/// Resolved compressor settings for a request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FormatSelection {
    pub compressor_format: Format,
    pub quality: Quality,
    /// Treat input as a normal map and renormalize the mip chain.
    pub normal_map_pipeline: bool,
    /// Convert colour or height input to a normal map first.
    pub convert_to_normal_map: bool,
    /// Gamma to configure; the caller's unless overridden.
    pub gamma: Gamma,
    /// Whether `gamma` was forced rather than taken from the request.
    pub gamma_forced: bool,
}

impl FormatSelection {
    /// The forced gamma, if any.
    pub fn gamma_override(&self) -> Option<Gamma> {
        self.gamma_forced.then_some(self.gamma)
    }

    /// Write the selection into compressor options.
    pub fn apply(&self, input: &mut InputOptions, compression: &mut CompressionOptions) {
        compression.set_format(self.compressor_format);
        compression.set_quality(self.quality);

        input.set_gamma(self.gamma.input, self.gamma.output);
        input.set_normal_map(self.normal_map_pipeline);
        input.set_normalize_mipmaps(self.normal_map_pipeline);
        input.set_convert_to_normal_map(self.convert_to_normal_map);
    }
}

/// Maps semantic formats to compressor settings.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormatPolicy;

impl FormatPolicy {
    /// Resolve a request. Deterministic and side-effect free.
    ///
    /// # Example
    ///
    /// ```
    /// use texproc::compressor::Quality;
    /// use texproc::policy::{FormatPolicy, FormatRequest, Gamma, OutputFormat};
    ///
    /// let request = FormatRequest::new(OutputFormat::Dxt5n, Quality::Production);
    /// let selection = FormatPolicy::select(&request);
    ///
    /// assert_eq!(selection.quality, Quality::Fastest);
    /// assert!(selection.normal_map_pipeline);
    /// assert_eq!(selection.gamma, Gamma::LINEAR);
    /// ```
    pub fn select(request: &FormatRequest) -> FormatSelection {
        let plain = |compressor_format: Format| FormatSelection {
            compressor_format,
            quality: request.quality,
            normal_map_pipeline: false,
            convert_to_normal_map: false,
            gamma: request.gamma,
            gamma_forced: false,
        };

        let selection = match request.format {
            OutputFormat::Color => plain(Format::Rgba),
            OutputFormat::NormalMap => FormatSelection {
                normal_map_pipeline: true,
                convert_to_normal_map: request.convert_to_normal_map,
                ..plain(Format::Rgba)
            },
            OutputFormat::Dxt1 => plain(Format::Dxt1),
            OutputFormat::Dxt1a => plain(Format::Dxt1a),
            OutputFormat::Dxt3 => plain(Format::Dxt3),
            OutputFormat::Dxt5 => plain(Format::Dxt5),
            OutputFormat::Dxt5n => FormatSelection {
                compressor_format: Format::Dxt5n,
                quality: Quality::Fastest,
                normal_map_pipeline: true,
                convert_to_normal_map: request.convert_to_normal_map,
                gamma: Gamma::LINEAR,
                gamma_forced: true,
            },
        };

        if selection.quality != request.quality {
            debug!(
                format = %request.format,
                requested = ?request.quality,
                selected = ?selection.quality,
                "Quality overridden"
            );
        }
        selection
    }

    /// Parse a format name and resolve it.
    ///
    /// # Errors
    ///
    /// [`ConfigError::UnknownFormat`] for an unrecognized name.
    pub fn select_named(
        name: &str,
        quality: Quality,
        gamma: Gamma,
        convert_to_normal_map: bool,
    ) -> Result<FormatSelection, ConfigError> {
        let format = name.parse::<OutputFormat>()?;
        Ok(Self::select(
            &FormatRequest::new(format, quality)
                .with_gamma(gamma)
                .with_convert_to_normal_map(convert_to_normal_map),
        ))
    }
}
