//! Settings for the wavebar console tool
//!
//! Stored as YAML next to where the tool is run (`wavebar.yaml`). Every field
//! has a default so a partial or missing file still works.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use wavebar_core::config::{resolve_in, LAST_PARAMS_FILE};
use wavebar_core::output::DEFAULT_OUTPUT_FILE;
use wavebar_core::raster::{Rgba, DEFAULT_BAR_COLOR};

/// Root configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Rendered image, relative paths resolve against the working directory
    pub output_file: PathBuf,
    /// Last-parameters record, resolved the same way
    pub params_file: PathBuf,
    /// Bar colour as RGBA
    pub bar_color: [u8; 4],
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            output_file: PathBuf::from(DEFAULT_OUTPUT_FILE),
            params_file: PathBuf::from(LAST_PARAMS_FILE),
            bar_color: DEFAULT_BAR_COLOR.0,
        }
    }
}

impl AppConfig {
    pub fn output_path(&self, base: &Path) -> PathBuf {
        resolve_in(base, &self.output_file)
    }

    pub fn params_path(&self, base: &Path) -> PathBuf {
        resolve_in(base, &self.params_file)
    }

    pub fn bar_color(&self) -> Rgba<u8> {
        Rgba(self.bar_color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use wavebar_core::config::{load_config, write_yaml};

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        let base = Path::new("/work");
        assert_eq!(config.output_path(base), PathBuf::from("/work/Waveform.png"));
        assert_eq!(config.params_path(base), PathBuf::from("/work/last_params.yaml"));
        assert_eq!(config.bar_color(), Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let temp = TempDir::new().unwrap();
        let config: AppConfig = load_config(&temp.path().join("wavebar.yaml"));
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_yaml_roundtrip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("wavebar.yaml");

        let config = AppConfig {
            output_file: PathBuf::from("/tmp/renders/song.png"),
            params_file: PathBuf::from("state/params.yaml"),
            bar_color: [0, 128, 255, 255],
        };
        write_yaml(&config, &path).unwrap();

        let loaded: AppConfig = load_config(&path);
        assert_eq!(loaded, config);
        assert_eq!(loaded.output_path(temp.path()), PathBuf::from("/tmp/renders/song.png"));
        assert_eq!(loaded.params_path(temp.path()), temp.path().join("state/params.yaml"));
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("wavebar.yaml");
        std::fs::write(&path, "bar_color: [255, 0, 0, 255]\n").unwrap();

        let loaded: AppConfig = load_config(&path);
        assert_eq!(loaded.bar_color(), Rgba([255, 0, 0, 255]));
        assert_eq!(loaded.output_file, PathBuf::from("Waveform.png"));
    }
}
