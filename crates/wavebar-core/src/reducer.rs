//! Sample reduction
//!
//! Turns a decoded sample stream into one amplitude per bar. The stream is
//! read in fixed-size chunks of `samples_per_pixel * step_size` samples and
//! every full chunk is collapsed to a single value by the chosen
//! [`PeakStrategy`].

use crate::audio_file::{AudioFileError, SampleSource};
use crate::params::{BarGeometry, PeakStrategy, WaveformParameters};

/// Chunk sizing derived from stream length and image layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkGeometry {
    /// Stream samples covered by one pixel column (floor division)
    pub samples_per_pixel: u64,
    /// Pixels advanced per bar
    pub step_size: u64,
    /// Samples reduced into one bar
    pub chunk_len: usize,
}

impl ChunkGeometry {
    pub fn new(total_samples: u64, image_width: u32, geometry: BarGeometry) -> Self {
        let samples_per_pixel = if image_width == 0 {
            0
        } else {
            total_samples / image_width as u64
        };
        let step_size = geometry.step_size();
        // A chunk longer than the stream can never fill up
        let chunk_len = samples_per_pixel
            .checked_mul(step_size)
            .filter(|&len| len <= total_samples)
            .and_then(|len| usize::try_from(len).ok())
            .unwrap_or(0);
        Self {
            samples_per_pixel,
            step_size,
            chunk_len,
        }
    }

    /// Upper bound on the number of values a stream of `total_samples` yields
    pub fn max_values(&self, total_samples: u64) -> u64 {
        if self.chunk_len == 0 {
            0
        } else {
            total_samples / self.chunk_len as u64
        }
    }
}

/// Upper bound on samples held in memory during a reduction pass
const READ_BUFFER_LEN: usize = 64 * 1024;

/// Running magnitude sum and peak of one chunk
#[derive(Debug, Clone, Copy, Default)]
struct ChunkAccumulator {
    sum: f64,
    peak: f32,
    count: usize,
}

impl ChunkAccumulator {
    fn push(&mut self, samples: &[f32]) {
        for sample in samples {
            let magnitude = sample.abs();
            self.sum += magnitude as f64;
            self.peak = self.peak.max(magnitude);
        }
        self.count += samples.len();
    }

    fn finish(&self, strategy: PeakStrategy) -> f32 {
        if self.count == 0 {
            return 0.0;
        }
        match strategy {
            PeakStrategy::ScaledAverage { scale } => (self.sum / self.count as f64) as f32 * scale,
            PeakStrategy::AbsolutePeak => self.peak,
        }
    }
}

/// Reduce one chunk to a single amplitude
///
/// No clamping is applied; a large scale can push values above 1.0.
pub fn reduce_chunk(strategy: PeakStrategy, chunk: &[f32]) -> f32 {
    let mut acc = ChunkAccumulator::default();
    acc.push(chunk);
    acc.finish(strategy)
}

/// Outcome of a reduction pass
#[derive(Debug)]
pub struct Reduction {
    /// One value per full chunk, in stream order
    pub values: Vec<f32>,
    /// Set when a read failed and the pass stopped early
    pub read_error: Option<AudioFileError>,
}

impl Reduction {
    pub fn is_partial(&self) -> bool {
        self.read_error.is_some()
    }
}

/// Chunked reducer over a [`SampleSource`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleReducer {
    strategy: PeakStrategy,
    chunk: ChunkGeometry,
}

impl SampleReducer {
    pub fn new(strategy: PeakStrategy, chunk: ChunkGeometry) -> Self {
        Self { strategy, chunk }
    }

    /// Reducer for `params` over a stream of `total_samples`
    pub fn for_params(params: &WaveformParameters, total_samples: u64) -> Self {
        let chunk = ChunkGeometry::new(total_samples, params.image_width, params.geometry());
        Self::new(params.strategy, chunk)
    }

    pub fn chunk_geometry(&self) -> ChunkGeometry {
        self.chunk
    }

    /// Read `source` to the end, emitting one value per full chunk
    ///
    /// A short final chunk is dropped. A read error ends the pass and is
    /// returned alongside the values produced so far.
    pub fn reduce<S: SampleSource + ?Sized>(&self, source: &mut S) -> Reduction {
        let mut values = Vec::new();

        if self.chunk.chunk_len == 0 {
            log::debug!("reduce: chunk length is zero, nothing to read");
            return Reduction {
                values,
                read_error: None,
            };
        }

        let chunk_len = self.chunk.chunk_len;
        // Chunks larger than the buffer are accumulated over several reads
        let mut buffer = vec![0.0f32; chunk_len.min(READ_BUFFER_LEN)];
        let mut acc = ChunkAccumulator::default();
        loop {
            let wanted = (chunk_len - acc.count).min(buffer.len());
            let filled = match source.read_chunk(&mut buffer[..wanted]) {
                Ok(n) => n,
                Err(e) => {
                    log::warn!("reduce: read failed after {} chunks: {}", values.len(), e);
                    return Reduction {
                        values,
                        read_error: Some(e),
                    };
                }
            };
            acc.push(&buffer[..filled]);

            if filled < wanted {
                if acc.count > 0 {
                    log::debug!(
                        "reduce: dropping trailing partial chunk ({} of {} samples)",
                        acc.count,
                        chunk_len
                    );
                }
                break;
            }

            if acc.count == chunk_len {
                let value = acc.finish(self.strategy);
                log::debug!("At {} ({} samples): {}", values.len(), acc.count, value);
                values.push(value);
                acc = ChunkAccumulator::default();
            }
        }

        Reduction {
            values,
            read_error: None,
        }
    }
}
