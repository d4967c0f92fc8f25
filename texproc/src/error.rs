//! Error taxonomy for texture processing.
//!
//! Every failure a [`CompressionSession`](crate::session::CompressionSession)
//! can surface is one of four kinds:
//!
//! - [`ProcessError::Configuration`] - bad caller input, detected before the
//!   compressor runs
//! - [`ProcessError::Protocol`] - the compressor's output stream broke the
//!   begin/append contract
//! - [`ProcessError::Native`] - the compressor reported failure; classified by
//!   its most recent error code
//! - [`ProcessError::Validation`] - the assembled texture failed its
//!   post-conditions
//!
//! None of them are retried. The native code is carried through unchanged so
//! callers can log or rethrow it.

use std::fmt;

use thiserror::Error;

use crate::assembler::AssemblyError;
use crate::compressor::ErrorCode;
use crate::session::SessionState;
use crate::texture::PixelEncoding;

/// Errors surfaced to the caller of a compression session.
#[derive(Debug, Error)]
pub enum ProcessError {
    /// Caller input was rejected before invoking the compressor.
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),

    /// The compressor's output stream violated the level protocol.
    #[error("Output protocol violation: {0}")]
    Protocol(#[from] AssemblyError),

    /// The compressor reported failure.
    #[error("Compressor failed ({kind}): {} [code {code:?}]", .code.message())]
    Native {
        /// Caller-facing classification of the failure.
        kind: NativeFailureKind,
        /// Most recent code recorded by the error callback.
        code: ErrorCode,
    },

    /// The assembled texture failed post-condition checks.
    #[error("Assembled texture failed validation: {0}")]
    Validation(#[from] ValidationError),
}

impl ProcessError {
    /// Build a native failure from the code left in the error slot.
    pub fn native(code: ErrorCode) -> Self {
        ProcessError::Native {
            kind: NativeFailureKind::from(code),
            code,
        }
    }

    /// True for configuration errors.
    pub fn is_configuration(&self) -> bool {
        matches!(self, ProcessError::Configuration(_))
    }

    /// True when the compressor rejected a feature it does not implement.
    pub fn is_unsupported_feature(&self) -> bool {
        matches!(
            self,
            ProcessError::Native {
                kind: NativeFailureKind::UnsupportedFeature,
                ..
            }
        )
    }

    /// The native error code, for native failures.
    pub fn native_code(&self) -> Option<ErrorCode> {
        match self {
            ProcessError::Native { code, .. } => Some(*code),
            _ => None,
        }
    }
}

/// Caller input problems.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// The requested output format name is not recognized.
    #[error("Unknown texture output format: {0}")]
    UnknownFormat(String),

    /// The source texture layout cannot be described to the compressor.
    #[error("Invalid texture layout: {0}")]
    InvalidLayout(String),

    /// A processor setting is out of range.
    #[error("Invalid setting `{name}`: {reason}")]
    InvalidSetting { name: &'static str, reason: String },

    /// The compressor's input configuration refused a source level.
    #[error("Mip data rejected for face {face}, level {mip} ({width}×{height})")]
    MipDataRejected {
        face: u32,
        mip: u32,
        width: u32,
        height: u32,
    },

    /// A session was run outside its configuring state.
    #[error("Session cannot run from state {0:?}; create a new session")]
    SessionReused(SessionState),
}

/// Post-condition failures of an assembled texture.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("expected {expected} faces, found {actual}")]
    FaceCount { expected: usize, actual: usize },

    #[error("face {face} has {actual} mip levels, expected {expected}")]
    MipCount {
        face: usize,
        expected: usize,
        actual: usize,
    },

    #[error("face {face} is missing mip level {mip}")]
    MissingLevel { face: usize, mip: usize },

    #[error(
        "face {face} level {mip} is {}×{}, expected {}×{}",
        .actual.0, .actual.1, .expected.0, .expected.1
    )]
    LevelExtent {
        face: usize,
        mip: usize,
        expected: (u32, u32),
        actual: (u32, u32),
    },

    #[error("face {face} level {mip} holds {actual} bytes, expected {expected}")]
    LevelSize {
        face: usize,
        mip: usize,
        expected: usize,
        actual: usize,
    },

    #[error("face {face} level {mip} is encoded as {actual}, expected {expected}")]
    EncodingMismatch {
        face: usize,
        mip: usize,
        expected: PixelEncoding,
        actual: PixelEncoding,
    },
}

/// Caller-facing classification of a native compressor failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NativeFailureKind {
    /// The input configuration or data was rejected.
    InvalidInput,
    /// The requested feature is not implemented by the compressor.
    UnsupportedFeature,
    /// Internal or compute-device failure.
    Internal,
    /// The output destination could not be opened.
    FileOpen,
    /// Writing through the output handler failed.
    FileWrite,
    /// No usable error code was recorded.
    Unknown,
}

impl From<ErrorCode> for NativeFailureKind {
    fn from(code: ErrorCode) -> Self {
        match code {
            ErrorCode::InvalidInput => NativeFailureKind::InvalidInput,
            ErrorCode::UnsupportedFeature | ErrorCode::UnsupportedOutputFormat => {
                NativeFailureKind::UnsupportedFeature
            }
            ErrorCode::CudaError => NativeFailureKind::Internal,
            ErrorCode::FileOpen => NativeFailureKind::FileOpen,
            ErrorCode::FileWrite => NativeFailureKind::FileWrite,
            ErrorCode::Unknown => NativeFailureKind::Unknown,
        }
    }
}

impl fmt::Display for NativeFailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NativeFailureKind::InvalidInput => "invalid input",
            NativeFailureKind::UnsupportedFeature => "unsupported feature",
            NativeFailureKind::Internal => "internal error",
            NativeFailureKind::FileOpen => "file open error",
            NativeFailureKind::FileWrite => "file write error",
            NativeFailureKind::Unknown => "unknown error",
        };
        f.write_str(name)
    }
}
