//! Path utilities for wavebar files
//!
//! Everything lives next to where the tool is run: the settings file, the
//! last-parameters record and (by default) the rendered image.

use std::path::{Path, PathBuf};

/// Application settings file name
pub const APP_CONFIG_FILE: &str = "wavebar.yaml";

/// Last-parameters record file name
pub const LAST_PARAMS_FILE: &str = "last_params.yaml";

/// Current working directory, or `.` if it can't be determined
pub fn working_dir() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

/// Resolve `path` against `base` unless it is already absolute
pub fn resolve_in(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

/// `<working directory>/wavebar.yaml`
pub fn default_config_path() -> PathBuf {
    working_dir().join(APP_CONFIG_FILE)
}
