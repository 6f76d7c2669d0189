//! Decoded audio sources
//!
//! The reducer only needs a stream of interleaved `f32` samples read in
//! fixed-size chunks. [`SampleSource`] is that capability; [`AudioBackend`]
//! fulfils it for files on disk using symphonia, and [`MemorySource`] for
//! samples that are already in memory.

mod memory;
mod symphonia_source;

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub use memory::MemorySource;
pub use symphonia_source::{AudioBackend, SymphoniaSource};

/// Bytes per decoded sample (sources always decode to 32-bit float)
pub const DECODED_BYTES_PER_SAMPLE: u64 = 4;

/// Audio source errors
#[derive(Error, Debug)]
pub enum AudioFileError {
    /// The decoding backend itself is unusable
    #[error("Audio backend initialization failed: {0}")]
    BackendInit(String),

    /// File not found or couldn't be opened
    #[error("Failed to open audio file: {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Container or codec the decoder doesn't understand
    #[error("Unsupported audio format: {0}")]
    UnsupportedFormat(String),

    /// Container holds no decodable audio track
    #[error("No audio track found in {0}")]
    NoAudioTrack(PathBuf),

    /// A chunked read failed mid-stream
    #[error("Read failed: {0}")]
    Read(String),
}

/// Sample resolution of the source material
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Byte,
    Short,
    Float,
    Unknown,
}

impl Resolution {
    /// Classify a codec's bit depth
    pub fn from_bits(bits: Option<u32>) -> Self {
        match bits {
            Some(8) => Resolution::Byte,
            Some(16) => Resolution::Short,
            Some(32) => Resolution::Float,
            _ => Resolution::Unknown,
        }
    }

    pub fn bits_per_sample(&self) -> Option<u32> {
        match self {
            Resolution::Byte => Some(8),
            Resolution::Short => Some(16),
            Resolution::Float => Some(32),
            Resolution::Unknown => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Resolution::Byte => "Byte",
            Resolution::Short => "Short",
            Resolution::Float => "Float",
            Resolution::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.bits_per_sample() {
            Some(bits) => write!(f, "{} ({})", bits, self.label()),
            None => write!(f, "-1 ({})", self.label()),
        }
    }
}

/// Static description of an opened stream
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StreamInfo {
    /// Total interleaved samples (frames * channels)
    pub total_samples: u64,
    /// Sample rate in Hz (0 if unknown)
    pub sample_rate: u32,
    /// Channel count
    pub channels: u16,
    /// Resolution of the source material
    pub resolution: Resolution,
}

impl StreamInfo {
    /// Length of the decoded float stream in bytes
    pub fn byte_len(&self) -> u64 {
        self.total_samples * DECODED_BYTES_PER_SAMPLE
    }

    /// Playback duration, if the sample rate is known
    pub fn duration(&self) -> Option<Duration> {
        if self.sample_rate == 0 || self.channels == 0 {
            return None;
        }
        let frames = self.total_samples / self.channels as u64;
        Some(Duration::from_secs_f64(frames as f64 / self.sample_rate as f64))
    }
}

/// A stream of decoded, interleaved `f32` samples
pub trait SampleSource {
    fn info(&self) -> &StreamInfo;

    /// Fill `buf` with the next samples
    ///
    /// The buffer is filled completely unless the stream ends first.
    /// Returns the number of samples written; `Ok(0)` means end of stream.
    fn read_chunk(&mut self, buf: &mut [f32]) -> Result<usize, AudioFileError>;
}

impl<S: SampleSource + ?Sized> SampleSource for Box<S> {
    fn info(&self) -> &StreamInfo {
        (**self).info()
    }

    fn read_chunk(&mut self, buf: &mut [f32]) -> Result<usize, AudioFileError> {
        (**self).read_chunk(buf)
    }
}

/// Something that can open audio locations as sample sources
pub trait SourceOpener {
    fn open_source(&self, path: &Path) -> Result<Box<dyn SampleSource>, AudioFileError>;
}
