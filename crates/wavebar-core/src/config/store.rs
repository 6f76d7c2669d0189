//! The "last used parameters" record

use std::path::{Path, PathBuf};

use super::io::{read_yaml, write_yaml};
use super::paths::{working_dir, LAST_PARAMS_FILE};
use super::StoreError;
use crate::params::WaveformParameters;

/// Keeps exactly one [`WaveformParameters`] on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterStore {
    path: PathBuf,
}

impl ParameterStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `<dir>/last_params.yaml`
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(LAST_PARAMS_FILE))
    }

    /// Store at `<working directory>/last_params.yaml`
    pub fn in_working_dir() -> Self {
        Self::in_dir(&working_dir())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Overwrite the record with `params`
    ///
    /// Nothing is written when there is nothing to save yet.
    pub fn save(&self, params: Option<&WaveformParameters>) -> Result<(), StoreError> {
        let Some(params) = params else {
            log::debug!("ParameterStore: nothing to save");
            return Ok(());
        };
        write_yaml(params, &self.path)?;
        log::info!("ParameterStore: saved last parameters to {:?}", self.path);
        Ok(())
    }

    /// Read the record back
    ///
    /// `Ok(None)` when no record exists. A record that can't be read, doesn't
    /// parse, or holds invalid values is an error; callers report it and carry
    /// on as if there were no record.
    pub fn load(&self) -> Result<Option<WaveformParameters>, StoreError> {
        let Some(params) = read_yaml::<WaveformParameters>(&self.path)? else {
            return Ok(None);
        };
        params.validate().map_err(|source| StoreError::Invalid {
            path: self.path.clone(),
            source,
        })?;
        Ok(Some(params))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::PeakStrategy;

    fn sample_params(strategy: PeakStrategy) -> WaveformParameters {
        WaveformParameters {
            audio_location: PathBuf::from("/music/track one.mp3"),
            block_size: 3,
            space_size: 0,
            image_width: 1920,
            peak_height: 256,
            strategy,
        }
    }

    #[test]
    fn test_missing_record_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = ParameterStore::in_dir(dir.path());
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_roundtrip_absolute_peak() {
        let dir = tempfile::tempdir().unwrap();
        let store = ParameterStore::in_dir(dir.path());
        let params = sample_params(PeakStrategy::AbsolutePeak);

        store.save(Some(&params)).unwrap();
        let loaded = store.load().unwrap().unwrap();

        assert_eq!(loaded, params);
        assert_eq!(loaded.average_scale(), -1.0);
    }

    #[test]
    fn test_roundtrip_scaled_average() {
        let dir = tempfile::tempdir().unwrap();
        let store = ParameterStore::in_dir(dir.path());
        let params = sample_params(PeakStrategy::ScaledAverage { scale: 0.3 });

        store.save(Some(&params)).unwrap();
        assert_eq!(store.load().unwrap().unwrap(), params);
    }

    #[test]
    fn test_save_overwrites_previous_record() {
        let dir = tempfile::tempdir().unwrap();
        let store = ParameterStore::in_dir(dir.path());

        store.save(Some(&sample_params(PeakStrategy::AbsolutePeak))).unwrap();
        let newer = WaveformParameters {
            image_width: 640,
            ..sample_params(PeakStrategy::ScaledAverage { scale: 2.0 })
        };
        store.save(Some(&newer)).unwrap();

        assert_eq!(store.load().unwrap().unwrap(), newer);
    }

    #[test]
    fn test_save_none_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let store = ParameterStore::in_dir(dir.path());

        store.save(None).unwrap();
        assert!(!store.path().exists());
    }

    #[test]
    fn test_corrupt_record_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = ParameterStore::in_dir(dir.path());
        std::fs::write(store.path(), "BlockSize: [1, 2").unwrap();

        assert!(matches!(store.load(), Err(StoreError::Parse { .. })));
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = ParameterStore::in_dir(dir.path());
        std::fs::write(store.path(), "BlockSize: 0\nImageWidth: 100\n").unwrap();

        assert!(matches!(store.load(), Err(StoreError::Invalid { .. })));
    }
}
