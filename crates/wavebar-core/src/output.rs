//! PNG output for rendered waveforms

use image::{ImageFormat, RgbaImage};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name used when no output path is configured
pub const DEFAULT_OUTPUT_FILE: &str = "Waveform.png";

/// Errors writing the rendered image
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to create output directory: {path}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write image {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// `<working directory>/Waveform.png`
pub fn default_output_path() -> PathBuf {
    crate::config::working_dir().join(DEFAULT_OUTPUT_FILE)
}

/// Write `image` as a PNG, replacing any existing file
pub fn save_png(image: &RgbaImage, path: &Path) -> Result<(), OutputError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| OutputError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    image
        .save_with_format(path, ImageFormat::Png)
        .map_err(|source| OutputError::Encode {
            path: path.to_path_buf(),
            source,
        })?;

    log::info!(
        "save_png: wrote {}x{} image to {:?}",
        image.width(),
        image.height(),
        path
    );
    Ok(())
}
