use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::debug;
use uuid::Uuid;

use crate::{ClipSplitError, ManifestOrder};

/// A segment published under a random name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutputEntry {
    /// File name inside the output directory, `<uuid>.<ext>`.
    pub name: String,
    /// Scratch file the copy was made from.
    pub source: PathBuf,
    /// Sequence index parsed from the scratch file name.
    pub index: Option<u64>,
}

/// Copy every file in `scratch_dir` into `output_dir` under a fresh random name.
///
/// The output directory is created if needed and is never cleared. Each
/// listed segment produces exactly one copy and one entry, in `order`.
pub fn materialize(
    scratch_dir: &Path,
    output_dir: &Path,
    extension: &str,
    order: ManifestOrder,
) -> Result<Vec<OutputEntry>, ClipSplitError> {
    materialize_with_progress(scratch_dir, output_dir, extension, order, |_, _| {})
}

pub(crate) fn materialize_with_progress<F>(
    scratch_dir: &Path,
    output_dir: &Path,
    extension: &str,
    order: ManifestOrder,
    mut on_copy: F,
) -> Result<Vec<OutputEntry>, ClipSplitError>
where
    F: FnMut(usize, usize),
{
    fs::create_dir_all(output_dir).map_err(|source| ClipSplitError::Output {
        path: output_dir.to_path_buf(),
        source,
    })?;

    let mut segments = list_files(scratch_dir).map_err(|source| ClipSplitError::Workspace {
        path: scratch_dir.to_path_buf(),
        source,
    })?;
    if order == ManifestOrder::Sequence {
        segments.sort_by_cached_key(|path| match segment_index(path) {
            Some(index) => (false, index, path.clone()),
            None => (true, 0, path.clone()),
        });
    }

    let total = segments.len();
    let mut entries = Vec::with_capacity(total);
    for (position, source) in segments.into_iter().enumerate() {
        let name = format!("{}.{extension}", Uuid::new_v4());
        let target = output_dir.join(&name);
        fs::copy(&source, &target).map_err(|err| ClipSplitError::Copy {
            from: source.clone(),
            to: target.clone(),
            source: err,
        })?;
        debug!("copied '{}' to '{}'", source.display(), target.display());

        entries.push(OutputEntry {
            name,
            index: segment_index(&source),
            source,
        });
        on_copy(position + 1, total);
    }

    Ok(entries)
}

fn list_files(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            files.push(entry.path());
        }
    }
    Ok(files)
}

/// Parse the trailing `_<digits>` counter of a segment file name.
///
/// `talk_10_000003.opus` yields `Some(3)`.
pub fn segment_index(path: &Path) -> Option<u64> {
    let stem = path.file_stem()?.to_str()?;
    let (_, digits) = stem.rsplit_once('_')?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use tempfile::tempdir;

    fn write_segments(dir: &Path, indexes: &[u64]) {
        for index in indexes {
            let name = format!("talk_1_{index:06}.opus");
            fs::write(dir.join(name), format!("segment {index}")).unwrap();
        }
    }

    #[test]
    fn segment_index_reads_the_trailing_counter() {
        assert_eq!(segment_index(Path::new("talk_10_000003.opus")), Some(3));
        assert_eq!(segment_index(Path::new("my_talk_1_000120.opus")), Some(120));
        assert_eq!(segment_index(Path::new("talk.opus")), None);
        assert_eq!(segment_index(Path::new("talk_1_final.opus")), None);
        assert_eq!(segment_index(Path::new("talk_.opus")), None);
    }

    #[test]
    fn sequence_order_follows_the_segment_counter() {
        let scratch = tempdir().unwrap();
        let output = tempdir().unwrap();
        write_segments(scratch.path(), &[11, 2, 0, 10, 1]);

        let entries = materialize(
            scratch.path(),
            output.path(),
            "opus",
            ManifestOrder::Sequence,
        )
        .unwrap();

        let indexes: Vec<_> = entries.iter().map(|entry| entry.index).collect();
        assert_eq!(indexes, [0u64, 1, 2, 10, 11].map(Some));
        for entry in &entries {
            let copied = fs::read_to_string(output.path().join(&entry.name)).unwrap();
            let index = entry.index.unwrap();
            assert_eq!(copied, format!("segment {index}"));
        }
    }

    #[test]
    fn unindexed_files_sort_after_segments() {
        let scratch = tempdir().unwrap();
        let output = tempdir().unwrap();
        write_segments(scratch.path(), &[1, 0]);
        fs::write(scratch.path().join("stray.opus"), b"stray").unwrap();

        let entries = materialize(
            scratch.path(),
            output.path(),
            "opus",
            ManifestOrder::Sequence,
        )
        .unwrap();

        let indexes: Vec<_> = entries.iter().map(|entry| entry.index).collect();
        assert_eq!(indexes, [Some(0u64), Some(1), None]);
    }

    #[test]
    fn listing_order_still_copies_every_segment_once() {
        let scratch = tempdir().unwrap();
        let output = tempdir().unwrap();
        write_segments(scratch.path(), &[0, 1, 2, 3]);

        let entries =
            materialize(scratch.path(), output.path(), "opus", ManifestOrder::Listing).unwrap();

        let mut indexes: Vec<_> = entries.iter().filter_map(|entry| entry.index).collect();
        indexes.sort_unstable();
        assert_eq!(indexes, [0, 1, 2, 3]);
        assert_eq!(fs::read_dir(output.path()).unwrap().count(), 4);
    }

    #[test]
    fn assigned_names_are_unique_and_keep_the_extension() {
        let scratch = tempdir().unwrap();
        let output = tempdir().unwrap();
        write_segments(scratch.path(), &[0, 1, 2, 3, 4, 5, 6, 7]);

        let entries = materialize(
            scratch.path(),
            output.path(),
            "opus",
            ManifestOrder::Sequence,
        )
        .unwrap();

        let names: HashSet<_> = entries.iter().map(|entry| entry.name.clone()).collect();
        assert_eq!(names.len(), entries.len());
        for name in &names {
            let stem = name.strip_suffix(".opus").expect("extension is kept");
            assert!(Uuid::parse_str(stem).is_ok(), "{name} is not a uuid");
        }
    }

    #[test]
    fn empty_scratch_creates_output_directory_without_entries() {
        let scratch = tempdir().unwrap();
        let output = tempdir().unwrap();
        let output_dir = output.path().join("talk/10");

        let entries =
            materialize(scratch.path(), &output_dir, "opus", ManifestOrder::Sequence).unwrap();

        assert!(entries.is_empty());
        assert!(output_dir.is_dir());
    }

    #[test]
    fn unwritable_output_directory_names_the_path() {
        let scratch = tempdir().unwrap();
        let output = tempdir().unwrap();
        write_segments(scratch.path(), &[0]);
        let blocker = output.path().join("talk");
        fs::write(&blocker, b"not a directory").unwrap();
        let output_dir = blocker.join("10");

        let err = materialize(scratch.path(), &output_dir, "opus", ManifestOrder::Sequence)
            .unwrap_err();

        match err {
            ClipSplitError::Output { path, .. } => assert_eq!(path, output_dir),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn missing_scratch_directory_names_the_path() {
        let root = tempdir().unwrap();
        let scratch = root.path().join("temp/10");

        let err = materialize(
            &scratch,
            &root.path().join("out"),
            "opus",
            ManifestOrder::Sequence,
        )
        .unwrap_err();

        match err {
            ClipSplitError::Workspace { path, .. } => assert_eq!(path, scratch),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn subdirectories_are_ignored() {
        let scratch = tempdir().unwrap();
        let output = tempdir().unwrap();
        write_segments(scratch.path(), &[0]);
        fs::create_dir(scratch.path().join("nested")).unwrap();

        let entries = materialize(
            scratch.path(),
            output.path(),
            "opus",
            ManifestOrder::Sequence,
        )
        .unwrap();

        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn progress_counts_every_copy() {
        let scratch = tempdir().unwrap();
        let output = tempdir().unwrap();
        write_segments(scratch.path(), &[0, 1, 2]);

        let mut seen = Vec::new();
        materialize_with_progress(
            scratch.path(),
            output.path(),
            "opus",
            ManifestOrder::Sequence,
            |copied, total| seen.push((copied, total)),
        )
        .unwrap();

        assert_eq!(seen, [(1, 3), (2, 3), (3, 3)]);
    }
}
