use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::{ClipSplitError, Layout};

/// Write `names` as a JSON array to the manifest for `duration`.
///
/// An existing manifest of the same name is replaced. Returns the path written.
pub fn write_manifest<S: AsRef<str>>(
    layout: &Layout,
    duration: u32,
    names: &[S],
) -> Result<PathBuf, ClipSplitError> {
    let path = layout.manifest_path(duration);
    let output_error = |path: &Path| {
        let path = path.to_path_buf();
        move |source| ClipSplitError::Output { path, source }
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(output_error(parent))?;
    }

    let names: Vec<&str> = names.iter().map(AsRef::as_ref).collect();
    let file = File::create(&path).map_err(output_error(&path))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, &names).map_err(|source| ClipSplitError::Manifest {
        path: path.clone(),
        source,
    })?;
    writer.flush().map_err(output_error(&path))?;

    Ok(path)
}

/// Read a manifest written by [`write_manifest`].
pub fn read_manifest<P: AsRef<Path>>(path: P) -> Result<Vec<String>, ClipSplitError> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|source| ClipSplitError::ManifestRead {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_slice(&bytes).map_err(|source| ClipSplitError::Manifest {
        path: path.to_path_buf(),
        source,
    })
}
