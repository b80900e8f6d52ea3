use std::path::{Path, PathBuf};

/// Naming scheme for the scratch and output trees of one input file.
///
/// Every path is a pure function of the roots, the input's base name and the
/// segment duration, so repeated runs land in the same places.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Layout {
    scratch_root: PathBuf,
    output_root: PathBuf,
    base_name: String,
    extension: String,
}

impl Layout {
    pub fn new<P, Q>(scratch_root: P, output_root: Q, base_name: &str, extension: &str) -> Self
    where
        P: Into<PathBuf>,
        Q: Into<PathBuf>,
    {
        Self {
            scratch_root: scratch_root.into(),
            output_root: output_root.into(),
            base_name: base_name.to_owned(),
            extension: extension.to_owned(),
        }
    }

    pub fn base_name(&self) -> &str {
        &self.base_name
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// `<scratch>/<duration>`
    pub fn scratch_dir(&self, duration: u32) -> PathBuf {
        self.scratch_root.join(duration.to_string())
    }

    /// Output pattern handed to the segmenter, with a six-digit `%06d` counter.
    pub fn segment_pattern(&self, duration: u32) -> PathBuf {
        segment_pattern(
            &self.scratch_dir(duration),
            &self.base_name,
            duration,
            &self.extension,
        )
    }

    /// `<out>/<basename>/<duration>`
    pub fn output_dir(&self, duration: u32) -> PathBuf {
        self.output_root
            .join(&self.base_name)
            .join(duration.to_string())
    }

    pub fn manifest_name(&self, duration: u32) -> String {
        format!("manifest_{duration}_{}.json", self.base_name)
    }

    pub fn manifest_path(&self, duration: u32) -> PathBuf {
        self.output_dir(duration).join(self.manifest_name(duration))
    }
}

/// `<dir>/<basename>_<duration>_%06d.<ext>`, the ffmpeg segment muxer template.
///
/// `%` in the directory and base name is doubled so ffmpeg reads it
/// literally. The extension never contains `%`.
pub(crate) fn segment_pattern(
    dir: &Path,
    base_name: &str,
    duration: u32,
    extension: &str,
) -> PathBuf {
    let dir = match dir.to_str() {
        Some(dir) if dir.contains('%') => PathBuf::from(dir.replace('%', "%%")),
        _ => dir.to_path_buf(),
    };
    let base_name = base_name.replace('%', "%%");
    dir.join(format!("{base_name}_{duration}_%06d.{extension}"))
}
