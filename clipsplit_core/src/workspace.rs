use std::fs;
use std::path::PathBuf;

use log::debug;

use crate::{ClipSplitError, Layout};

/// Wipe and recreate the scratch directory for `duration`.
///
/// Anything left over from a previous run is removed first, so the segmenter
/// always writes into an empty directory. Missing parents are created.
pub fn prepare_scratch(layout: &Layout, duration: u32) -> Result<PathBuf, ClipSplitError> {
    let dir = layout.scratch_dir(duration);
    let workspace_error = |source| ClipSplitError::Workspace {
        path: dir.clone(),
        source,
    };

    if dir.exists() {
        debug!("removing stale scratch directory '{}'", dir.display());
        fs::remove_dir_all(&dir).map_err(workspace_error)?;
    }
    fs::create_dir_all(&dir).map_err(workspace_error)?;

    Ok(dir)
}
