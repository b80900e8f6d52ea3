//! Optional TOML configuration file.
//!
//! Every key is optional; values present in the file replace the built-in
//! defaults and are in turn overridden by command-line flags.
//!
//! ```toml
//! durations = [10, 5, 2, 1]
//! scratch_dir = "temp"
//! output_dir = "out_files"
//! extension = "opus"
//! ffmpeg = "/usr/local/bin/ffmpeg"
//! order = "sequence"
//! on_failure = "continue"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{ClipSplitError, FailurePolicy, ManifestOrder};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Segment lengths in seconds.
    pub durations: Option<Vec<u32>>,
    pub scratch_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    /// Extension of the produced chunks, without the leading dot.
    pub extension: Option<String>,
    /// Path to the ffmpeg executable.
    pub ffmpeg: Option<PathBuf>,
    pub order: Option<ManifestOrder>,
    pub on_failure: Option<FailurePolicy>,
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ClipSplitError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ClipSplitError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ClipSplitError::Config {
            path: path.to_path_buf(),
            source,
        })
    }
}
