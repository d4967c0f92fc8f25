//! Output side of the compressor boundary.
//!
//! A compressor reports its results through two caller-owned handlers:
//!
//! ```text
//!   Compressor::compress()
//!        │
//!        ├── OutputHandler::begin_image(size, w, h, d, face, mip)
//!        ├── OutputHandler::write_data(chunk) -> bool     (zero or more)
//!        ├── OutputHandler::begin_image(...)
//!        ├── ...
//!        └── ErrorHandler::error(code)                    (on failure)
//! ```
//!
//! There is no end-of-level event. Both handlers are invoked synchronously
//! on the caller's stack while `compress` runs.

use std::fmt;

/// Error codes reported by a compressor through its error handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    Unknown,
    InvalidInput,
    UnsupportedFeature,
    CudaError,
    FileOpen,
    FileWrite,
    UnsupportedOutputFormat,
}

impl ErrorCode {
    /// Human-readable message for the code.
    pub fn message(self) -> &'static str {
        match self {
            ErrorCode::InvalidInput => "Invalid input",
            ErrorCode::UnsupportedFeature => "Unsupported feature",
            ErrorCode::CudaError => "CUDA error",
            ErrorCode::FileOpen => "Error opening file",
            ErrorCode::FileWrite => "Error writing through output handler",
            ErrorCode::UnsupportedOutputFormat => "The container file does not support the selected output format",
            ErrorCode::Unknown => "Unknown error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Receiver of the compressed byte stream.
pub trait OutputHandler {
    /// A new level starts. `size` is the exact number of bytes that follow.
    fn begin_image(&mut self, size: usize, width: u32, height: u32, depth: u32, face: u32, mip: u32);

    /// Bytes for the current level. Returning `false` asks the compressor to
    /// abort.
    fn write_data(&mut self, data: &[u8]) -> bool;
}

/// Receiver of compressor error codes.
pub trait ErrorHandler {
    fn error(&mut self, code: ErrorCode);
}

impl<F> ErrorHandler for F
where
    F: FnMut(ErrorCode),
{
    fn error(&mut self, code: ErrorCode) {
        self(code)
    }
}

/// Single most-recent-wins error slot.
///
/// Owned by exactly one run; read once after the compressor returns.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LastError {
    code: Option<ErrorCode>,
    reports: usize,
}

impl LastError {
    pub fn new() -> Self {
        Self::default()
    }

    /// Most recently recorded code, if any.
    pub fn code(&self) -> Option<ErrorCode> {
        self.code
    }

    /// Number of codes recorded over the slot's lifetime.
    pub fn reports(&self) -> usize {
        self.reports
    }
}

impl ErrorHandler for LastError {
    fn error(&mut self, code: ErrorCode) {
        self.code = Some(code);
        self.reports += 1;
    }
}

/// Output configuration for one compressor run.
///
/// Borrows the caller's handlers for the duration of the run, so neither
/// can outlive or be shared beyond it.
///
/// # Example
///
/// ```
/// use texproc::compressor::{ErrorCode, LastError, OutputOptions};
///
/// let mut last_error = LastError::new();
/// {
///     let mut output = OutputOptions::new().with_error_handler(&mut last_error);
///     output.report_error(ErrorCode::FileOpen);
/// }
/// assert_eq!(last_error.code(), Some(ErrorCode::FileOpen));
/// ```
#[derive(Default)]
pub struct OutputOptions<'a> {
    output_handler: Option<&'a mut dyn OutputHandler>,
    error_handler: Option<&'a mut dyn ErrorHandler>,
    output_header: bool,
}

impl<'a> OutputOptions<'a> {
    /// Options with no handlers and no container header.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_output_handler(mut self, handler: &'a mut dyn OutputHandler) -> Self {
        self.output_handler = Some(handler);
        self
    }

    pub fn with_error_handler(mut self, handler: &'a mut dyn ErrorHandler) -> Self {
        self.error_handler = Some(handler);
        self
    }

    /// Emit a DDS header through the output handler before the first level.
    pub fn with_output_header(mut self, enabled: bool) -> Self {
        self.output_header = enabled;
        self
    }

    pub fn set_output_header(&mut self, enabled: bool) {
        self.output_header = enabled;
    }

    pub fn output_header(&self) -> bool {
        self.output_header
    }

    pub fn has_output_handler(&self) -> bool {
        self.output_handler.is_some()
    }

    /// Forward a level start to the output handler, if one is attached.
    pub fn begin_image(&mut self, size: usize, width: u32, height: u32, depth: u32, face: u32, mip: u32) {
        if let Some(handler) = self.output_handler.as_deref_mut() {
            handler.begin_image(size, width, height, depth, face, mip);
        }
    }

    /// Forward bytes to the output handler. `false` without a handler.
    pub fn write_data(&mut self, data: &[u8]) -> bool {
        match self.output_handler.as_deref_mut() {
            Some(handler) => handler.write_data(data),
            None => false,
        }
    }

    /// Record an error code with the error handler, if one is attached.
    pub fn report_error(&mut self, code: ErrorCode) {
        if let Some(handler) = self.error_handler.as_deref_mut() {
            handler.error(code);
        }
    }
}

impl fmt::Debug for OutputOptions<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutputOptions")
            .field("output_handler", &self.output_handler.is_some())
            .field("error_handler", &self.error_handler.is_some())
            .field("output_header", &self.output_header)
            .finish()
    }
}
