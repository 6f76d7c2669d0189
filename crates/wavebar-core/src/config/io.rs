//! Generic YAML document I/O
//!
//! Works with any serializable type. [`read_yaml`]/[`write_yaml`] report
//! failures to the caller; [`load_config`] is the forgiving variant used for
//! application settings.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;

use super::StoreError;

/// Read a YAML document
///
/// Returns `Ok(None)` if the file doesn't exist.
pub fn read_yaml<T>(path: &Path) -> Result<Option<T>, StoreError>
where
    T: DeserializeOwned,
{
    log::debug!("read_yaml: Loading from {:?}", path);

    if !path.exists() {
        log::debug!("read_yaml: {:?} doesn't exist", path);
        return Ok(None);
    }

    let contents = std::fs::read_to_string(path).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let value = serde_yaml::from_str::<T>(&contents).map_err(|source| StoreError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    log::debug!("read_yaml: Successfully loaded {:?}", path);
    Ok(Some(value))
}

/// Write a YAML document, replacing any existing file
///
/// Creates parent directories if they don't exist.
pub fn write_yaml<T>(value: &T, path: &Path) -> Result<(), StoreError>
where
    T: Serialize,
{
    log::debug!("write_yaml: Saving to {:?}", path);

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| StoreError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let yaml = serde_yaml::to_string(value).map_err(StoreError::Serialize)?;

    std::fs::write(path, yaml).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    log::debug!("write_yaml: Saved {:?}", path);
    Ok(())
}

/// Load configuration from a YAML file
///
/// If the file doesn't exist, returns default config.
/// If the file exists but is invalid, logs a warning and returns default config.
pub fn load_config<T>(path: &Path) -> T
where
    T: DeserializeOwned + Default,
{
    match read_yaml(path) {
        Ok(Some(config)) => {
            log::info!("load_config: Loaded config from {:?}", path);
            config
        }
        Ok(None) => {
            log::info!("load_config: {:?} doesn't exist, using defaults", path);
            T::default()
        }
        Err(e) => {
            log::warn!("load_config: {}, using defaults", e);
            T::default()
        }
    }
}
