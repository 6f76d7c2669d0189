//! Persistence for wavebar
//!
//! - Generic YAML loading/saving
//! - Standard file locations (all relative to the working directory)
//! - [`ParameterStore`]: the "last used parameters" record
//!
//! # Usage
//!
//! ```ignore
//! use wavebar_core::config::{load_config, ParameterStore};
//!
//! let settings: MyAppConfig = load_config(&config_path);
//!
//! let store = ParameterStore::in_working_dir();
//! let last = store.load()?;
//! store.save(Some(&params))?;
//! ```

mod io;
mod paths;
mod store;

use std::path::PathBuf;
use thiserror::Error;

pub use io::{load_config, read_yaml, write_yaml};
pub use paths::{default_config_path, resolve_in, working_dir, APP_CONFIG_FILE, LAST_PARAMS_FILE};
pub use store::ParameterStore;

use crate::params::ParamsError;

/// Errors reading or writing persisted documents
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Failed to serialize to YAML: {0}")]
    Serialize(#[source] serde_yaml::Error),

    #[error("Invalid parameters in {path}: {source}")]
    Invalid {
        path: PathBuf,
        #[source]
        source: ParamsError,
    },
}
