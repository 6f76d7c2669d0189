//! Wavebar Core - reduce decoded audio to bar amplitudes and rasterize them
//!
//! The pipeline is:
//!
//! ```text
//! SampleSource --> SampleReducer --> Vec<f32> --> WaveformRasterizer --> RgbaImage --> PNG
//! ```
//!
//! [`config::ParameterStore`] keeps the last successful [`WaveformParameters`]
//! on disk between runs.

pub mod audio_file;
pub mod config;
pub mod output;
pub mod params;
pub mod raster;
pub mod reducer;

pub use audio_file::{
    AudioBackend, AudioFileError, MemorySource, Resolution, SampleSource, SourceOpener, StreamInfo,
};
pub use config::{ParameterStore, StoreError};
pub use output::{default_output_path, save_png, OutputError};
pub use params::{BarGeometry, ParamsError, PeakStrategy, WaveformParameters};
pub use raster::WaveformRasterizer;
pub use reducer::{ChunkGeometry, Reduction, SampleReducer};
