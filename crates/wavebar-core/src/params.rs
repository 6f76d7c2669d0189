//! Waveform generation parameters
//!
//! One [`WaveformParameters`] value describes a single render request. It is
//! built fresh for every run and the last successful one is persisted by
//! [`crate::config::ParameterStore`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Persisted `AverageScale` value meaning "absolute peak, no scale"
pub const ABSOLUTE_PEAK_SENTINEL: f32 = -1.0;

/// Largest canvas accepted, in pixels (1 GiB of RGBA)
pub const MAX_CANVAS_PIXELS: u64 = 1 << 28;

/// How a chunk of samples is reduced to one amplitude
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PeakStrategy {
    /// Mean of absolute sample values, multiplied by `scale`
    ScaledAverage { scale: f32 },
    /// Largest absolute sample value
    AbsolutePeak,
}

impl PeakStrategy {
    /// Decode the persisted `AverageScale` field
    pub fn from_average_scale(average_scale: f32) -> Self {
        if average_scale == ABSOLUTE_PEAK_SENTINEL {
            PeakStrategy::AbsolutePeak
        } else {
            PeakStrategy::ScaledAverage {
                scale: average_scale,
            }
        }
    }

    /// Encode as the persisted `AverageScale` field
    pub fn average_scale(&self) -> f32 {
        match self {
            PeakStrategy::ScaledAverage { scale } => *scale,
            PeakStrategy::AbsolutePeak => ABSOLUTE_PEAK_SENTINEL,
        }
    }

    /// Human readable name, as shown in the strategy menu
    pub fn name(&self) -> &'static str {
        match self {
            PeakStrategy::ScaledAverage { .. } => "Scaled Average",
            PeakStrategy::AbsolutePeak => "Absolute Peak",
        }
    }
}

/// Horizontal bar layout shared by the reducer and the rasterizer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BarGeometry {
    /// Width of each bar in pixels
    pub block_size: u32,
    /// Gap between consecutive bars in pixels
    pub space_size: u32,
}

impl BarGeometry {
    pub fn new(block_size: u32, space_size: u32) -> Self {
        Self {
            block_size,
            space_size,
        }
    }

    /// Horizontal advance from one bar to the next
    pub fn step_size(&self) -> u64 {
        self.block_size as u64 + self.space_size as u64
    }

    /// Left edge of bar `index`
    pub fn bar_left(&self, index: usize) -> u64 {
        index as u64 * self.step_size()
    }
}

/// Invalid parameter values
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParamsError {
    #[error("{field} must be greater than zero")]
    NotPositive { field: &'static str },

    #[error("scale must be a finite, non-negative number (got {0})")]
    InvalidScale(f32),

    #[error("image of {width}x{height} pixels exceeds the limit of {} pixels", MAX_CANVAS_PIXELS)]
    CanvasTooLarge { width: u32, height: u32 },
}

/// Parameters of one waveform render
///
/// Field names are persisted in PascalCase (`AudioLocation`, `BlockSize`, ...).
/// Unknown fields are ignored and missing ones fall back to [`Default`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct WaveformParameters {
    /// Source audio file
    pub audio_location: PathBuf,
    /// Bar width in pixels
    pub block_size: u32,
    /// Gap between bars in pixels
    pub space_size: u32,
    /// Output image width in pixels
    pub image_width: u32,
    /// Output image height in pixels, also the tallest possible bar
    pub peak_height: u32,
    /// Chunk reduction strategy, stored as a float with `-1` for absolute peak
    #[serde(rename = "AverageScale", with = "average_scale")]
    pub strategy: PeakStrategy,
}

impl Default for WaveformParameters {
    fn default() -> Self {
        Self {
            audio_location: PathBuf::new(),
            block_size: 2,
            space_size: 1,
            image_width: 1000,
            peak_height: 200,
            strategy: PeakStrategy::AbsolutePeak,
        }
    }
}

impl WaveformParameters {
    /// Check the invariants the reducer and rasterizer rely on
    pub fn validate(&self) -> Result<(), ParamsError> {
        if self.block_size == 0 {
            return Err(ParamsError::NotPositive { field: "BlockSize" });
        }
        if self.image_width == 0 {
            return Err(ParamsError::NotPositive { field: "ImageWidth" });
        }
        if self.peak_height == 0 {
            return Err(ParamsError::NotPositive { field: "PeakHeight" });
        }
        if self.image_width as u64 * self.peak_height as u64 > MAX_CANVAS_PIXELS {
            return Err(ParamsError::CanvasTooLarge {
                width: self.image_width,
                height: self.peak_height,
            });
        }
        if let PeakStrategy::ScaledAverage { scale } = self.strategy {
            if !scale.is_finite() || scale < 0.0 {
                return Err(ParamsError::InvalidScale(scale));
            }
        }
        Ok(())
    }

    pub fn geometry(&self) -> BarGeometry {
        BarGeometry::new(self.block_size, self.space_size)
    }

    /// The persisted `AverageScale` value
    pub fn average_scale(&self) -> f32 {
        self.strategy.average_scale()
    }
}

impl fmt::Display for WaveformParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Audio Location: {}", self.audio_location.display())?;
        writeln!(f, "Block Size: {}", self.block_size)?;
        writeln!(f, "Space Size: {}", self.space_size)?;
        writeln!(f, "Image Width: {}", self.image_width)?;
        writeln!(f, "Peak Height: {}", self.peak_height)?;
        write!(f, "Peak Calculation Strategy: {}", self.strategy.name())?;
        if let PeakStrategy::ScaledAverage { scale } = self.strategy {
            write!(f, "\nScale: {}", scale)?;
        }
        Ok(())
    }
}

mod average_scale {
    use super::PeakStrategy;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(strategy: &PeakStrategy, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f32(strategy.average_scale())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<PeakStrategy, D::Error> {
        f32::deserialize(deserializer).map(PeakStrategy::from_average_scale)
    }
}
