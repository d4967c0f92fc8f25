//! Single-use compression sessions.
//!
//! A [`CompressionSession`] drives one compressor run end to end:
//!
//! ```text
//!  Configuring ──run()──► Running ──┬──► Succeeded  (TextureAsset)
//!                                   └──► Failed     (ProcessError)
//! ```
//!
//! 1. Validate settings and the source texture
//! 2. Resolve the output format through [`FormatPolicy`]
//! 3. Declare the layout, then supply every source level face-major
//! 4. Run the compressor with a [`StreamAssembler`] and a [`LastError`]
//!    slot attached as handlers
//! 5. Classify failure, or finish and validate the asset
//!
//! The assembler, error slot and option objects are locals of `run`, so
//! they are released on every exit path in reverse order of creation.
//! Sessions are not reusable; build a new one to retry.

use std::fmt;

use tracing::{debug, error, info, info_span, warn};

use crate::assembler::StreamAssembler;
use crate::compressor::{CompressionOptions, Compressor, ErrorCode, InputFormat, InputOptions, LastError, OutputOptions};
use crate::config::ProcessorSettings;
use crate::error::{ConfigError, ProcessError, ValidationError};
use crate::policy::FormatPolicy;
use crate::texture::{SourceTexture, TextureAsset};

/// Lifecycle of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    Configuring,
    Running,
    Succeeded,
    Failed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Configuring => "configuring",
            SessionState::Running => "running",
            SessionState::Succeeded => "succeeded",
            SessionState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Fully configured compressor inputs for one run.
struct Configured {
    input: InputOptions,
    compression: CompressionOptions,
}

/// Coordinator for one compression run.
///
/// # Example
///
/// ```
/// use texproc::compressor::SoftwareCompressor;
/// use texproc::config::ProcessorSettings;
/// use texproc::policy::OutputFormat;
/// use texproc::session::{CompressionSession, SessionState};
/// use texproc::texture::{SourceImage, SourceTexture};
///
/// let source = SourceTexture::texture_2d(SourceImage::solid(32, 32, [200, 40, 40, 255]).unwrap());
/// let settings = ProcessorSettings::default().with_format(OutputFormat::Dxt1);
///
/// let mut session = CompressionSession::new(SoftwareCompressor::new(), settings);
/// let asset = session.run(&source).unwrap();
///
/// assert_eq!(session.state(), SessionState::Succeeded);
/// assert_eq!(asset.mip_count(), 6);
/// ```
pub struct CompressionSession<C: Compressor> {
    compressor: C,
    settings: ProcessorSettings,
    state: SessionState,
}

impl<C: Compressor> CompressionSession<C> {
    /// Create a session in the `Configuring` state.
    pub fn new(compressor: C, settings: ProcessorSettings) -> Self {
        Self {
            compressor,
            settings,
            state: SessionState::Configuring,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn settings(&self) -> &ProcessorSettings {
        &self.settings
    }

    pub fn compressor(&self) -> &C {
        &self.compressor
    }

    /// Give back the compressor.
    pub fn into_compressor(self) -> C {
        self.compressor
    }

    /// Bytes the compressor would emit for `source`, without running it.
    ///
    /// # Errors
    ///
    /// The same configuration errors `run` would report.
    pub fn estimate_size(&self, source: &SourceTexture) -> Result<usize, ProcessError> {
        let configured = self.configure(source)?;
        Ok(self
            .compressor
            .estimate_size(&configured.input, &configured.compression))
    }

    /// Compress `source` into a [`TextureAsset`].
    ///
    /// # Errors
    ///
    /// - [`ProcessError::Configuration`] for invalid settings or source, or
    ///   when the session has already run
    /// - [`ProcessError::Protocol`] when the compressor's output stream
    ///   breaks the level protocol
    /// - [`ProcessError::Native`] when the compressor reports failure
    /// - [`ProcessError::Validation`] when the assembled asset is malformed
    pub fn run(&mut self, source: &SourceTexture) -> Result<TextureAsset, ProcessError> {
        if self.state != SessionState::Configuring {
            return Err(ConfigError::SessionReused(self.state).into());
        }
        self.state = SessionState::Running;

        let (width, height) = source.base_extent().unwrap_or((0, 0));
        let span = info_span!(
            "compression_session",
            texture_type = %source.texture_type(),
            width,
            height,
            format = %self.settings.format,
        );
        let _enter = span.enter();

        let result = self.execute(source);
        self.state = match &result {
            Ok(_) => SessionState::Succeeded,
            Err(_) => SessionState::Failed,
        };
        result
    }

    fn execute(&mut self, source: &SourceTexture) -> Result<TextureAsset, ProcessError> {
        let configured = self.configure(source)?;
        let Configured { input, compression } = &configured;

        let expected_mips = input.output_mipmap_count() as usize;
        let target = input.target_extents();

        let mut assembler = StreamAssembler::new(source.texture_type(), compression.encoding());
        let mut last_error = LastError::new();
        self.compressor.set_enable_cuda(self.settings.enable_cuda);

        let succeeded = {
            let mut output = OutputOptions::new()
                .with_output_handler(&mut assembler)
                .with_error_handler(&mut last_error);
            self.compressor.compress(input, compression, &mut output)
        };

        // The only read of the error slot for this run.
        let reported = last_error.code();

        if let Some(fault) = assembler.take_fault() {
            error!(error = %fault, "Compressor output violated the level protocol");
            return Err(ProcessError::Protocol(fault));
        }

        if !succeeded {
            let code = reported.unwrap_or(ErrorCode::Unknown);
            let err = ProcessError::native(code);
            error!(code = ?code, error = %err, "Compression failed");
            return Err(err);
        }
        if let Some(code) = reported {
            warn!(code = ?code, "Compressor reported an error but succeeded");
        }

        let stats = assembler.stats();
        let asset = assembler.finish()?;
        asset.validate()?;

        if asset.mip_count() != expected_mips {
            return Err(ValidationError::MipCount {
                face: 0,
                expected: expected_mips,
                actual: asset.mip_count(),
            }
            .into());
        }
        if let (Some(expected), Some(actual)) = (target, asset.base_extent()) {
            if expected != actual {
                return Err(ValidationError::LevelExtent {
                    face: 0,
                    mip: 0,
                    expected,
                    actual,
                }
                .into());
            }
        }

        info!(
            faces = asset.faces().len(),
            mips = asset.mip_count(),
            encoding = %asset.encoding(),
            bytes = asset.total_bytes(),
            buffer_growths = stats.buffer_growths,
            "Compression succeeded"
        );
        Ok(asset)
    }

    /// Build compressor options for `source`.
    fn configure(&self, source: &SourceTexture) -> Result<Configured, ConfigError> {
        self.settings.validate()?;
        source.validate()?;

        let selection = FormatPolicy::select(&self.settings.format_request());
        debug!(
            format = ?selection.compressor_format,
            quality = ?selection.quality,
            normal_map = selection.normal_map_pipeline,
            convert = selection.convert_to_normal_map,
            "Selected output format"
        );

        let (width, height) = source
            .base_extent()
            .ok_or_else(|| ConfigError::InvalidLayout("source has no images".to_string()))?;

        let mut input = InputOptions::new();
        input.reset_texture_layout();
        input.set_texture_layout(source.texture_type(), width, height, 1);

        for (face, chain) in source.faces().iter().enumerate() {
            for (mip, image) in chain.iter().enumerate() {
                let (face, mip) = (face as u32, mip as u32);
                if !input.set_mipmap_data(image.data(), image.width(), image.height(), 1, face, mip) {
                    return Err(ConfigError::MipDataRejected {
                        face,
                        mip,
                        width: image.width(),
                        height: image.height(),
                    });
                }
            }
        }

        let settings = &self.settings;
        input.set_format(InputFormat::Rgba8);
        input.set_alpha_mode(settings.alpha_mode);
        input.set_wrap_mode(settings.wrap_mode);
        input.set_mipmap_filter(settings.mipmap_filter);
        input.set_mipmap_generation(settings.generate_mipmaps, settings.max_mip_level);
        input.set_round_mode(settings.round_mode);
        input.set_max_extents(settings.max_extent);

        let mut compression = CompressionOptions::new();
        compression.set_quantization(
            settings.color_dithering,
            settings.alpha_dithering,
            settings.binary_alpha,
            settings.alpha_threshold,
        );

        selection.apply(&mut input, &mut compression);
        if let Some(layout) = settings.pixel_format {
            compression.set_pixel_format(
                layout.bit_count,
                layout.red_mask,
                layout.green_mask,
                layout.blue_mask,
                layout.alpha_mask,
            );
        }

        Ok(Configured {
            input,
            compression,
        })
    }
}

impl<C: Compressor + fmt::Debug> fmt::Debug for CompressionSession<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompressionSession")
            .field("compressor", &self.compressor)
            .field("settings", &self.settings)
            .field("state", &self.state)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compressor::{PixelFormat, Quality, SoftwareCompressor};
    use crate::error::NativeFailureKind;
    use crate::policy::OutputFormat;
    use crate::texture::{mip_extent, PixelEncoding, SourceImage, TextureType};

    /// Replays a fixed event list, then returns a fixed result.
    #[derive(Debug, Clone, Default)]
    struct ScriptedCompressor {
        events: Vec<Event>,
        error: Option<ErrorCode>,
        succeed: bool,
        seen_quality: Option<Quality>,
        seen_gamma: Option<(f32, f32)>,
        cuda_requested: Option<bool>,
    }

    #[derive(Debug, Clone)]
    enum Event {
        Begin(usize, u32, u32, u32, u32),
        Write(usize),
        Report(ErrorCode),
    }

    impl ScriptedCompressor {
        fn failing(code: ErrorCode) -> Self {
            Self {
                error: Some(code),
                ..Default::default()
            }
        }

        /// Well-formed stream for a full chain.
        fn chain(encoding: PixelEncoding, faces: u32, width: u32, height: u32, mips: u32) -> Self {
            let mut events = Vec::new();
            for face in 0..faces {
                for mip in 0..mips {
                    let (w, h) = mip_extent(width, height, mip);
                    let size = encoding.level_size(w, h);
                    events.push(Event::Begin(size, w, h, face, mip));
                    events.push(Event::Write(size));
                }
            }
            Self {
                events,
                succeed: true,
                ..Default::default()
            }
        }
    }

    impl Compressor for ScriptedCompressor {
        fn compress(
            &mut self,
            input: &InputOptions,
            compression: &CompressionOptions,
            output: &mut OutputOptions<'_>,
        ) -> bool {
            self.seen_quality = Some(compression.quality());
            self.seen_gamma = Some((input.input_gamma(), input.output_gamma()));
            for event in &self.events {
                match *event {
                    Event::Begin(size, w, h, face, mip) => output.begin_image(size, w, h, 1, face, mip),
                    Event::Write(len) => {
                        if !output.write_data(&vec![0x5A; len]) {
                            output.report_error(ErrorCode::FileWrite);
                            return false;
                        }
                    }
                    Event::Report(code) => output.report_error(code),
                }
            }
            if let Some(code) = self.error {
                output.report_error(code);
            }
            self.succeed
        }

        fn set_enable_cuda(&mut self, enabled: bool) {
            self.cuda_requested = Some(enabled);
        }
    }

    fn source_2d(size: u32) -> SourceTexture {
        SourceTexture::texture_2d(SourceImage::solid(size, size, [10, 20, 30, 255]).unwrap())
    }

    #[test]
    fn test_new_session_is_configuring() {
        let session = CompressionSession::new(SoftwareCompressor::new(), ProcessorSettings::default());
        assert_eq!(session.state(), SessionState::Configuring);
    }

    #[test]
    fn test_successful_scripted_run() {
        let compressor = ScriptedCompressor::chain(PixelEncoding::Dxt1, 1, 16, 16, 5);
        let mut session = CompressionSession::new(compressor, ProcessorSettings::default());

        let asset = session.run(&source_2d(16)).unwrap();
        assert_eq!(session.state(), SessionState::Succeeded);
        assert_eq!(asset.mip_count(), 5);
        assert_eq!(asset.encoding(), PixelEncoding::Dxt1);
    }

    #[test]
    fn test_unsupported_feature_is_classified() {
        let compressor = ScriptedCompressor::failing(ErrorCode::UnsupportedFeature);
        let mut session = CompressionSession::new(compressor, ProcessorSettings::default());

        let err = session.run(&source_2d(8)).unwrap_err();
        assert!(err.is_unsupported_feature());
        assert!(matches!(
            err,
            ProcessError::Native {
                kind: NativeFailureKind::UnsupportedFeature,
                code: ErrorCode::UnsupportedFeature
            }
        ));
        assert_eq!(session.state(), SessionState::Failed);
    }

    #[test]
    fn test_most_recent_error_wins() {
        let mut compressor = ScriptedCompressor::failing(ErrorCode::CudaError);
        compressor.events = vec![Event::Report(ErrorCode::InvalidInput)];
        let mut session = CompressionSession::new(compressor, ProcessorSettings::default());
        let err = session.run(&source_2d(8)).unwrap_err();
        assert_eq!(err.native_code(), Some(ErrorCode::CudaError));
    }

    #[test]
    fn test_failure_without_code_is_unknown() {
        let compressor = ScriptedCompressor::default();
        let mut session = CompressionSession::new(compressor, ProcessorSettings::default());
        let err = session.run(&source_2d(8)).unwrap_err();
        assert!(matches!(
            err,
            ProcessError::Native {
                kind: NativeFailureKind::Unknown,
                code: ErrorCode::Unknown
            }
        ));
    }

    #[test]
    fn test_protocol_violation_takes_precedence() {
        let compressor = ScriptedCompressor {
            events: vec![Event::Begin(8, 4, 4, 0, 0), Event::Write(9)],
            succeed: true,
            ..Default::default()
        };
        let mut session = CompressionSession::new(compressor, ProcessorSettings::default());
        let err = session.run(&source_2d(4)).unwrap_err();
        assert!(matches!(err, ProcessError::Protocol(_)));
        assert_eq!(session.state(), SessionState::Failed);
    }

    #[test]
    fn test_short_chain_is_validation_error() {
        let compressor = ScriptedCompressor::chain(PixelEncoding::Dxt1, 1, 16, 16, 3);
        let mut session = CompressionSession::new(compressor, ProcessorSettings::default());
        let err = session.run(&source_2d(16)).unwrap_err();
        assert!(matches!(
            err,
            ProcessError::Validation(ValidationError::MipCount {
                expected: 5,
                actual: 3,
                ..
            })
        ));
    }

    #[test]
    fn test_missing_cube_faces_is_validation_error() {
        let compressor = ScriptedCompressor::chain(PixelEncoding::Dxt1, 5, 8, 8, 4);
        let mut session = CompressionSession::new(compressor, ProcessorSettings::default());
        let source = SourceTexture::cube(std::array::from_fn(|_| SourceImage::solid(8, 8, [0; 4]).unwrap()));
        let err = session.run(&source).unwrap_err();
        assert!(matches!(
            err,
            ProcessError::Validation(ValidationError::MipCount { face: 5, .. })
        ));
    }

    #[test]
    fn test_session_cannot_run_twice() {
        let compressor = ScriptedCompressor::chain(PixelEncoding::Dxt1, 1, 4, 4, 3);
        let mut session = CompressionSession::new(compressor, ProcessorSettings::default());
        assert!(session.run(&source_2d(4)).is_ok());

        let err = session.run(&source_2d(4)).unwrap_err();
        assert!(matches!(
            err,
            ProcessError::Configuration(ConfigError::SessionReused(SessionState::Succeeded))
        ));
    }

    #[test]
    fn test_invalid_settings_fail_before_compressing() {
        let compressor = ScriptedCompressor::chain(PixelEncoding::Dxt1, 1, 4, 4, 3);
        let settings = ProcessorSettings::default().with_gamma(0.0, 2.2);
        let mut session = CompressionSession::new(compressor, settings);

        let err = session.run(&source_2d(4)).unwrap_err();
        assert!(err.is_configuration());
        assert_eq!(session.compressor().seen_quality, None);
    }

    #[test]
    fn test_invalid_layout_fails_before_compressing() {
        let compressor = ScriptedCompressor::chain(PixelEncoding::Dxt1, 1, 4, 4, 3);
        let mut session = CompressionSession::new(compressor, ProcessorSettings::default());
        let source = SourceTexture::from_faces(TextureType::TextureCube, vec![]);

        let err = session.run(&source).unwrap_err();
        assert!(matches!(err, ProcessError::Configuration(ConfigError::InvalidLayout(_))));
        assert!(session.compressor().seen_quality.is_none());
    }

    #[test]
    fn test_dxt5n_policy_reaches_compressor() {
        let compressor = ScriptedCompressor::chain(PixelEncoding::Dxt5, 1, 4, 4, 3);
        let settings = ProcessorSettings::default()
            .with_format(OutputFormat::Dxt5n)
            .with_quality(Quality::Highest);
        let mut session = CompressionSession::new(compressor, settings);

        session.run(&source_2d(4)).unwrap();
        let compressor = session.into_compressor();
        assert_eq!(compressor.seen_quality, Some(Quality::Fastest));
        assert_eq!(compressor.seen_gamma, Some((1.0, 1.0)));
    }

    #[test]
    fn test_estimate_size_does_not_change_state() {
        let session = CompressionSession::new(SoftwareCompressor::new(), ProcessorSettings::default());
        // 16, 8, 4, 2, 1 → 128 + 32 + 8 + 8 + 8
        assert_eq!(session.estimate_size(&source_2d(16)).unwrap(), 184);
        assert_eq!(session.state(), SessionState::Configuring);
    }

    #[test]
    fn test_software_compressor_end_to_end() {
        let settings = ProcessorSettings::default().with_format(OutputFormat::Color);
        let mut session = CompressionSession::new(SoftwareCompressor::new(), settings);
        let asset = session.run(&source_2d(8)).unwrap();
        assert_eq!(asset.encoding(), PixelEncoding::Rgba8);
        assert_eq!(asset.mip_count(), 4);
        assert_eq!(asset.faces()[0].levels()[0].data().len(), 8 * 8 * 4);
    }

    #[test]
    fn test_explicit_pixel_layout_end_to_end() {
        let rgb565 = PixelFormat::new(16, 0xF800, 0x07E0, 0x001F, 0);
        let settings = ProcessorSettings::default()
            .with_format(OutputFormat::Color)
            .with_pixel_format(rgb565);
        let mut session = CompressionSession::new(SoftwareCompressor::new(), settings);

        let asset = session.run(&source_2d(8)).unwrap();
        assert_eq!(session.state(), SessionState::Succeeded);
        assert_eq!(asset.encoding(), rgb565.encoding());
        let sizes: Vec<usize> = asset.faces()[0].levels().iter().map(|level| level.data().len()).collect();
        assert_eq!(sizes, vec![128, 32, 8, 4]);
    }

    #[test]
    fn test_pixel_layout_ignored_for_block_formats() {
        let settings = ProcessorSettings::default()
            .with_format(OutputFormat::Dxt1)
            .with_pixel_format(PixelFormat::new(16, 0xF800, 0x07E0, 0x001F, 0));
        let mut session = CompressionSession::new(SoftwareCompressor::new(), settings);

        let asset = session.run(&source_2d(8)).unwrap();
        assert_eq!(asset.encoding(), PixelEncoding::Dxt1);
    }

    #[test]
    fn test_cuda_setting_reaches_compressor() {
        let compressor = ScriptedCompressor::chain(PixelEncoding::Dxt1, 1, 4, 4, 3);
        let settings = ProcessorSettings::default().with_cuda(true);
        let mut session = CompressionSession::new(compressor, settings);

        session.run(&source_2d(4)).unwrap();
        assert_eq!(session.into_compressor().cuda_requested, Some(true));
    }
}
