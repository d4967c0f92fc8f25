//! Streaming reconstruction of compressor output.
//!
//! The compressor emits, for every level it produces:
//!
//! ```text
//! BeginLevel(size, w, h, d, face, mip)  AppendBytes(chunk)*  ...next BeginLevel
//! ```
//!
//! There is no end-of-level event. A level is complete only when the next
//! `BeginLevel` arrives or the stream ends, so the assembler keeps a single
//! pending slot and commits it on either trigger:
//!
//! ```text
//!             begin_level                     begin_level / finish
//!   (empty) ─────────────► [PendingLevel] ───────────────────────────► commit
//!                              │    ▲                                     │
//!                              └────┘ append_bytes (cursor ≤ size)       ▼
//!                                                               slots[face][mip]
//! ```
//!
//! Levels are addressed by `(face, mip)` slot, so arrival order does not
//! matter. An out-of-range face or mip, a second level for a filled slot,
//! bytes with no pending level, and bytes past the declared size are
//! protocol violations.
//!
//! The working buffer is reused across levels and zeroed on every
//! `begin_level`, so bytes the compressor never wrote read as zero.

use thiserror::Error;
use tracing::{debug, warn};

use crate::compressor::OutputHandler;
use crate::error::{ProcessError, ValidationError};
use crate::texture::{
    ByteSink, Face, MipLevel, PixelEncoding, TextureAsset, TextureError, TextureType, MAX_MIP_LEVELS,
};

/// Violations of the level stream protocol.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssemblyError {
    #[error("received {len} bytes with no level in progress")]
    NoPendingLevel { len: usize },

    #[error("face {face} level {mip}: {attempted} bytes exceed the declared {declared}")]
    Overflow {
        face: u32,
        mip: u32,
        declared: usize,
        attempted: usize,
    },

    #[error("face index {face} out of range for {face_count} faces")]
    FaceOutOfRange { face: u32, face_count: usize },

    #[error("mip index {mip} out of range")]
    MipOutOfRange { mip: u32 },

    #[error("face {face} level {mip} was delivered twice")]
    DuplicateLevel { face: u32, mip: u32 },

    #[error("face {face} level {mip}: declared {declared} bytes, {width}×{height} {encoding} needs {expected}")]
    SizeMismatch {
        face: u32,
        mip: u32,
        width: u32,
        height: u32,
        encoding: PixelEncoding,
        declared: usize,
        expected: usize,
    },

    #[error("level storage rejected bytes: {0}")]
    Storage(#[from] TextureError),
}

/// The level currently being received.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingLevel {
    pub size: usize,
    pub width: u32,
    pub height: u32,
    pub depth: u32,
    pub face: u32,
    pub mip: u32,
    /// Bytes received so far.
    pub cursor: usize,
}

/// Counters describing an assembly run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AssemblyStats {
    pub levels_committed: usize,
    pub bytes_received: usize,
    /// Times the working buffer had to grow its allocation.
    pub buffer_growths: usize,
}

/// Builds a [`TextureAsset`] from a compressor's level stream.
///
/// # Example
///
/// ```
/// use texproc::assembler::StreamAssembler;
/// use texproc::texture::{PixelEncoding, TextureType};
///
/// let mut assembler = StreamAssembler::new(TextureType::Texture2D, PixelEncoding::Dxt1);
/// assembler.begin_level(8, 4, 4, 1, 0, 0).unwrap();
/// assembler.append_bytes(&[0xAA; 8]).unwrap();
/// assembler.begin_level(8, 2, 2, 1, 0, 1).unwrap();
/// assembler.append_bytes(&[0xBB; 4]).unwrap();
///
/// let asset = assembler.finish().unwrap();
/// assert_eq!(asset.mip_count(), 2);
/// // Unwritten tail bytes are zero
/// assert_eq!(asset.faces()[0].levels()[1].data(), &[0xBB, 0xBB, 0xBB, 0xBB, 0, 0, 0, 0]);
/// ```
#[derive(Debug)]
pub struct StreamAssembler {
    texture_type: TextureType,
    encoding: PixelEncoding,
    slots: Vec<Vec<Option<MipLevel>>>,
    pending: Option<PendingLevel>,
    buffer: Vec<u8>,
    fault: Option<AssemblyError>,
    stats: AssemblyStats,
}

impl StreamAssembler {
    /// Create an assembler with an empty slot list per face.
    pub fn new(texture_type: TextureType, encoding: PixelEncoding) -> Self {
        Self {
            texture_type,
            encoding,
            slots: vec![Vec::new(); texture_type.face_count()],
            pending: None,
            buffer: Vec::new(),
            fault: None,
            stats: AssemblyStats::default(),
        }
    }

    pub fn texture_type(&self) -> TextureType {
        self.texture_type
    }

    pub fn encoding(&self) -> PixelEncoding {
        self.encoding
    }

    pub fn pending(&self) -> Option<&PendingLevel> {
        self.pending.as_ref()
    }

    pub fn stats(&self) -> AssemblyStats {
        self.stats
    }

    /// First protocol violation seen through the [`OutputHandler`] interface.
    pub fn fault(&self) -> Option<&AssemblyError> {
        self.fault.as_ref()
    }

    /// Take the recorded violation, leaving none.
    pub fn take_fault(&mut self) -> Option<AssemblyError> {
        self.fault.take()
    }

    /// Start a new level, committing the pending one first.
    ///
    /// # Errors
    ///
    /// Fails if committing the previous level fails, or if `face` or `mip`
    /// is out of range.
    pub fn begin_level(
        &mut self,
        size: usize,
        width: u32,
        height: u32,
        depth: u32,
        face: u32,
        mip: u32,
    ) -> Result<(), AssemblyError> {
        self.commit()?;

        if face as usize >= self.slots.len() {
            return Err(AssemblyError::FaceOutOfRange {
                face,
                face_count: self.slots.len(),
            });
        }
        if mip >= MAX_MIP_LEVELS {
            return Err(AssemblyError::MipOutOfRange { mip });
        }

        let capacity = self.buffer.capacity();
        self.buffer.clear();
        self.buffer.resize(size, 0);
        if self.buffer.capacity() > capacity {
            self.stats.buffer_growths += 1;
        }

        self.pending = Some(PendingLevel {
            size,
            width,
            height,
            depth,
            face,
            mip,
            cursor: 0,
        });
        Ok(())
    }

    /// Copy bytes into the pending level at its cursor.
    ///
    /// # Errors
    ///
    /// [`AssemblyError::NoPendingLevel`] without a pending level, and
    /// [`AssemblyError::Overflow`] if the chunk would pass the declared size.
    /// Nothing is written on error.
    pub fn append_bytes(&mut self, chunk: &[u8]) -> Result<(), AssemblyError> {
        let pending = self
            .pending
            .as_mut()
            .ok_or(AssemblyError::NoPendingLevel { len: chunk.len() })?;

        let end = pending.cursor + chunk.len();
        if end > pending.size {
            return Err(AssemblyError::Overflow {
                face: pending.face,
                mip: pending.mip,
                declared: pending.size,
                attempted: end,
            });
        }

        self.buffer[pending.cursor..end].copy_from_slice(chunk);
        pending.cursor = end;
        self.stats.bytes_received += chunk.len();
        Ok(())
    }

    /// Move the pending level into its slot. No-op without a pending level.
    ///
    /// # Errors
    ///
    /// [`AssemblyError::SizeMismatch`] when the declared size is not the
    /// encoding's size for the level extent, and
    /// [`AssemblyError::DuplicateLevel`] when the slot is already filled.
    pub fn commit(&mut self) -> Result<(), AssemblyError> {
        let Some(pending) = self.pending.take() else {
            return Ok(());
        };

        let expected = self.encoding.level_size(pending.width, pending.height);
        if pending.size != expected {
            return Err(AssemblyError::SizeMismatch {
                face: pending.face,
                mip: pending.mip,
                width: pending.width,
                height: pending.height,
                encoding: self.encoding,
                declared: pending.size,
                expected,
            });
        }

        let chain = &mut self.slots[pending.face as usize];
        let mip = pending.mip as usize;
        if chain.get(mip).is_some_and(Option::is_some) {
            return Err(AssemblyError::DuplicateLevel {
                face: pending.face,
                mip: pending.mip,
            });
        }

        let mut level = MipLevel::allocate(self.encoding, pending.width, pending.height);
        level.write_bytes(&self.buffer[..pending.size])?;

        if chain.len() <= mip {
            chain.resize(mip + 1, None);
        }
        chain[mip] = Some(level);
        self.stats.levels_committed += 1;

        debug!(
            face = pending.face,
            mip = pending.mip,
            width = pending.width,
            height = pending.height,
            size = pending.size,
            received = pending.cursor,
            "Committed level"
        );
        Ok(())
    }

    /// Commit the pending level and return the asset.
    ///
    /// # Errors
    ///
    /// [`ProcessError::Protocol`] if a fault was recorded through the
    /// [`OutputHandler`] or the final commit fails, and
    /// [`ProcessError::Validation`] with [`ValidationError::MissingLevel`]
    /// when a face's chain has a gap.
    pub fn finish(mut self) -> Result<TextureAsset, ProcessError> {
        if let Some(fault) = self.fault.take() {
            return Err(ProcessError::Protocol(fault));
        }
        self.commit()?;

        let mut faces = Vec::with_capacity(self.slots.len());
        for (face, chain) in self.slots.into_iter().enumerate() {
            let mut levels = Vec::with_capacity(chain.len());
            for (mip, slot) in chain.into_iter().enumerate() {
                match slot {
                    Some(level) => levels.push(level),
                    None => return Err(ValidationError::MissingLevel { face, mip }.into()),
                }
            }
            faces.push(Face::new(levels));
        }

        Ok(TextureAsset::new(self.texture_type, self.encoding, faces))
    }

    fn record_fault(&mut self, error: AssemblyError) {
        warn!(error = %error, "Output protocol violation");
        if self.fault.is_none() {
            self.fault = Some(error);
        }
    }
}

impl OutputHandler for StreamAssembler {
    fn begin_image(&mut self, size: usize, width: u32, height: u32, depth: u32, face: u32, mip: u32) {
        if self.fault.is_some() {
            return;
        }
        if let Err(error) = self.begin_level(size, width, height, depth, face, mip) {
            self.record_fault(error);
        }
    }

    fn write_data(&mut self, data: &[u8]) -> bool {
        if self.fault.is_some() {
            return false;
        }
        match self.append_bytes(data) {
            Ok(()) => true,
            Err(error) => {
                self.record_fault(error);
                false
            }
        }
    }
}
