//! Integration tests for compression sessions.
//!
//! These tests drive the full flow:
//! - settings → format policy → compressor options
//! - compressor output stream → assembler → texture asset
//! - native failure codes → classified errors
//!
//! Run with: `cargo test --test session_integration`

use texproc::compressor::{
    CompressionOptions, Compressor, ErrorCode, InputOptions, OutputOptions, Quality, SoftwareCompressor,
};
use texproc::texture::{mip_extent, CubeFace, PixelEncoding, SourceImage, SourceTexture, TextureType};
use texproc::{
    CompressionSession, ConfigError, NativeFailureKind, OutputFormat, ProcessError, ProcessorSettings,
    SessionState,
};

// ============================================================================
// Helper Functions
// ============================================================================

/// A 2D gradient so block encoders see more than one colour.
fn gradient(width: u32, height: u32) -> SourceImage {
    let mut data = Vec::with_capacity((width * height * 4) as usize);
    for y in 0..height {
        for x in 0..width {
            data.extend_from_slice(&[(x * 255 / width.max(1)) as u8, (y * 255 / height.max(1)) as u8, 96, 255]);
        }
    }
    SourceImage::new(width, height, data).unwrap()
}

fn dxt1_size(width: u32, height: u32) -> usize {
    (width.div_ceil(4) * height.div_ceil(4) * 8) as usize
}

/// Compressor that reports a fixed error without producing output.
struct FailingCompressor {
    code: ErrorCode,
}

impl Compressor for FailingCompressor {
    fn compress(&mut self, _: &InputOptions, _: &CompressionOptions, output: &mut OutputOptions<'_>) -> bool {
        output.report_error(self.code);
        false
    }
}

// ============================================================================
// Integration Tests
// ============================================================================

/// 128×128 BC1 with a generated chain yields 8 levels of block-sized data.
#[test]
fn test_dxt1_full_chain_end_to_end() {
    let source = SourceTexture::texture_2d(gradient(128, 128));
    let settings = ProcessorSettings::default().with_format(OutputFormat::Dxt1);
    let mut session = CompressionSession::new(SoftwareCompressor::new(), settings);

    let asset = session.run(&source).expect("compression should succeed");

    assert_eq!(session.state(), SessionState::Succeeded);
    assert_eq!(asset.texture_type(), TextureType::Texture2D);
    assert_eq!(asset.encoding(), PixelEncoding::Dxt1);
    assert_eq!(asset.faces().len(), 1);

    let levels = asset.faces()[0].levels();
    let extents: Vec<u32> = levels.iter().map(|level| level.width()).collect();
    assert_eq!(extents, vec![128, 64, 32, 16, 8, 4, 2, 1]);

    for level in levels {
        assert_eq!(level.width(), level.height());
        assert_eq!(level.data().len(), dxt1_size(level.width(), level.height()));
    }
}

/// A cube with six 8×8 faces yields 6 faces of 4 levels each.
#[test]
fn test_cube_face_major_assembly() {
    let faces = std::array::from_fn(|index| SourceImage::solid(8, 8, [index as u8 * 40, 0, 0, 255]).unwrap());
    let source = SourceTexture::cube(faces);
    let settings = ProcessorSettings::default().with_format(OutputFormat::Color);
    let mut session = CompressionSession::new(SoftwareCompressor::new(), settings);

    let asset = session.run(&source).unwrap();

    assert_eq!(asset.texture_type(), TextureType::TextureCube);
    assert_eq!(asset.faces().len(), 6);
    for (index, face) in asset.faces().iter().enumerate() {
        assert_eq!(face.len(), 4);
        for (mip, level) in face.levels().iter().enumerate() {
            assert_eq!((level.width(), level.height()), mip_extent(8, 8, mip as u32));
        }
        // Solid faces keep their colour through every level
        let red = face.levels()[3].data()[0];
        assert_eq!(red, index as u8 * 40, "face {} smallest level", index);
    }

    let negative_z = asset.cube_face(CubeFace::NegativeZ).unwrap();
    assert_eq!(negative_z.levels()[0].data()[0], 200);
}

/// Unsupported-feature reports surface as their own failure kind.
#[test]
fn test_unsupported_feature_translation() {
    let source = SourceTexture::texture_2d(gradient(16, 16));
    let compressor = FailingCompressor {
        code: ErrorCode::UnsupportedFeature,
    };
    let mut session = CompressionSession::new(compressor, ProcessorSettings::default());

    let err = session.run(&source).unwrap_err();

    assert!(err.is_unsupported_feature());
    assert_eq!(err.native_code(), Some(ErrorCode::UnsupportedFeature));
    assert!(matches!(
        err,
        ProcessError::Native {
            kind: NativeFailureKind::UnsupportedFeature,
            ..
        }
    ));
    assert_eq!(session.state(), SessionState::Failed);
}

/// Each native code maps to a distinct caller-facing kind.
#[test]
fn test_native_codes_are_classified() {
    let cases = [
        (ErrorCode::InvalidInput, NativeFailureKind::InvalidInput),
        (ErrorCode::CudaError, NativeFailureKind::Internal),
        (ErrorCode::FileOpen, NativeFailureKind::FileOpen),
        (ErrorCode::FileWrite, NativeFailureKind::FileWrite),
        (ErrorCode::Unknown, NativeFailureKind::Unknown),
    ];
    for (code, expected) in cases {
        let source = SourceTexture::texture_2d(gradient(4, 4));
        let mut session = CompressionSession::new(FailingCompressor { code }, ProcessorSettings::default());
        match session.run(&source) {
            Err(ProcessError::Native { kind, code: reported }) => {
                assert_eq!(kind, expected);
                assert_eq!(reported, code);
            }
            other => panic!("expected native failure for {:?}, got {:?}", code, other),
        }
    }
}

/// The DXT5n path is forced to fastest quality and linear gamma.
#[test]
fn test_dxt5n_runs_with_forced_settings() {
    let source = SourceTexture::texture_2d(gradient(8, 8));
    let settings = ProcessorSettings::default()
        .with_format(OutputFormat::Dxt5n)
        .with_quality(Quality::Production);
    let mut session = CompressionSession::new(SoftwareCompressor::new(), settings);

    let asset = session.run(&source).unwrap();

    assert_eq!(asset.encoding(), PixelEncoding::Dxt5);
    let sizes: Vec<usize> = asset.faces()[0].levels().iter().map(|l| l.data().len()).collect();
    assert_eq!(sizes, vec![64, 16, 16, 16]);
}

/// Mip generation off yields only the base level.
#[test]
fn test_without_mipmaps() {
    let source = SourceTexture::texture_2d(gradient(32, 16));
    let settings = ProcessorSettings::default().with_mipmaps(false);
    let mut session = CompressionSession::new(SoftwareCompressor::new(), settings);

    let asset = session.run(&source).unwrap();
    assert_eq!(asset.mip_count(), 1);
    assert_eq!(asset.base_extent(), Some((32, 16)));
}

/// A max mip level caps the chain.
#[test]
fn test_max_mip_level_caps_chain() {
    let source = SourceTexture::texture_2d(gradient(64, 64));
    let settings = ProcessorSettings::default().with_max_mip_level(Some(3));
    let mut session = CompressionSession::new(SoftwareCompressor::new(), settings);

    let asset = session.run(&source).unwrap();
    assert_eq!(asset.mip_count(), 3);
}

/// A max extent scales the output down.
#[test]
fn test_max_extent_scales_output() {
    let source = SourceTexture::texture_2d(gradient(64, 32));
    let settings = ProcessorSettings::default().with_max_extent(Some(16));
    let mut session = CompressionSession::new(SoftwareCompressor::new(), settings);

    let asset = session.run(&source).unwrap();
    assert_eq!(asset.base_extent(), Some((16, 8)));
    assert_eq!(asset.mip_count(), 5);
}

/// Supplied mip levels are used instead of generated ones.
#[test]
fn test_supplied_mip_levels_are_used() {
    let levels = vec![
        SourceImage::solid(4, 4, [10, 10, 10, 255]).unwrap(),
        SourceImage::solid(2, 2, [200, 100, 50, 255]).unwrap(),
        SourceImage::solid(1, 1, [1, 2, 3, 4]).unwrap(),
    ];
    let source = SourceTexture::texture_2d_with_mips(levels);
    let settings = ProcessorSettings::default()
        .with_format(OutputFormat::Color)
        .with_gamma(1.0, 1.0);
    let mut session = CompressionSession::new(SoftwareCompressor::new(), settings);

    let asset = session.run(&source).unwrap();
    let face = &asset.faces()[0];
    assert_eq!(&face.levels()[1].data()[..4], &[200, 100, 50, 255]);
    assert_eq!(face.levels()[2].data(), &[1, 2, 3, 4]);
}

/// Configuration errors are raised before the compressor runs.
#[test]
fn test_unknown_format_name_fails_fast() {
    let err = ProcessorSettings::default().with_format_name("astc").unwrap_err();
    assert_eq!(err, ConfigError::UnknownFormat("astc".to_string()));
}

/// Settings documents from a host pipeline drive a run.
#[test]
fn test_settings_from_json_document() {
    let settings: ProcessorSettings = serde_json::from_str(
        r#"{
            "format": "dxt5",
            "quality": "highest",
            "max_mip_level": 2,
            "wrap_mode": "repeat"
        }"#,
    )
    .unwrap();
    assert!(settings.validate().is_ok());

    let source = SourceTexture::texture_2d(gradient(16, 16));
    let mut session = CompressionSession::new(SoftwareCompressor::new(), settings);
    let asset = session.run(&source).unwrap();

    assert_eq!(asset.encoding(), PixelEncoding::Dxt5);
    assert_eq!(asset.mip_count(), 2);
    assert_eq!(asset.faces()[0].levels()[0].data().len(), 256);
}

/// The size estimate matches what a run actually produces.
#[test]
fn test_estimate_matches_output() {
    let source = SourceTexture::texture_2d(gradient(40, 24));
    let settings = ProcessorSettings::default().with_format(OutputFormat::Dxt3);
    let mut session = CompressionSession::new(SoftwareCompressor::new(), settings);

    let estimate = session.estimate_size(&source).unwrap();
    let asset = session.run(&source).unwrap();
    assert_eq!(estimate, asset.total_bytes());
}

/// A compressor can be reused across sessions; sessions cannot.
#[test]
fn test_compressor_outlives_session() {
    let source = SourceTexture::texture_2d(gradient(8, 8));

    let mut first = CompressionSession::new(SoftwareCompressor::new(), ProcessorSettings::default());
    first.run(&source).unwrap();
    assert!(matches!(
        first.run(&source),
        Err(ProcessError::Configuration(ConfigError::SessionReused(_)))
    ));

    let compressor = first.into_compressor();
    assert_eq!(compressor.runs(), 1);

    let mut second = CompressionSession::new(compressor, ProcessorSettings::default());
    second.run(&source).unwrap();
    assert_eq!(second.into_compressor().runs(), 2);
}
