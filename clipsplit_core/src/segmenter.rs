use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use log::debug;

use crate::layout::segment_pattern;
use crate::ClipSplitError;

/// Everything a [`Segmenter`] needs to split one input at one duration.
#[derive(Clone, Debug)]
pub struct SegmentRequest<'a> {
    pub input: &'a Path,
    /// Freshly prepared, empty directory the segments must land in.
    pub scratch_dir: &'a Path,
    pub base_name: &'a str,
    /// Segment length in seconds.
    pub duration: u32,
    /// Extension of the produced segments, without the leading dot.
    pub extension: &'a str,
}

impl SegmentRequest<'_> {
    /// ffmpeg output template inside the scratch directory, with a `%06d`
    /// sequence counter and every literal `%` doubled.
    pub fn output_pattern(&self) -> PathBuf {
        segment_pattern(
            self.scratch_dir,
            self.base_name,
            self.duration,
            self.extension,
        )
    }
}

/// Result of a segmenter invocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SegmentOutcome {
    Completed,
    Failed(SegmentFailure),
}

impl SegmentOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, SegmentOutcome::Completed)
    }
}

/// Exit status and diagnostics captured from a failed invocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SegmentFailure {
    /// `None` when the program could not be started or was killed by a signal.
    pub status: Option<i32>,
    pub stderr: String,
}

impl SegmentFailure {
    pub fn to_error(&self, duration: u32) -> ClipSplitError {
        ClipSplitError::SegmentationFailed {
            duration,
            status: self.status,
            stderr: self.stderr.clone(),
        }
    }
}

/// Splits an input file into sequential chunks inside a scratch directory.
pub trait Segmenter {
    fn segment(&self, request: &SegmentRequest<'_>) -> SegmentOutcome;
}

/// [`Segmenter`] backed by the `ffmpeg` segment muxer.
///
/// Streams are copied without re-encoding, so segment boundaries fall on
/// packet boundaries chosen by ffmpeg.
#[derive(Clone, Debug)]
pub struct FfmpegSegmenter {
    program: PathBuf,
}

impl FfmpegSegmenter {
    pub fn new<P: AsRef<Path>>(program: P) -> Self {
        Self {
            program: program.as_ref().to_path_buf(),
        }
    }

    pub(crate) fn command(&self, request: &SegmentRequest<'_>) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(["-hide_banner", "-nostdin", "-loglevel", "error", "-y"])
            .arg("-i")
            .arg(request.input)
            .args(["-c", "copy", "-map", "0", "-segment_time"])
            .arg(request.duration.to_string())
            .args(["-f", "segment"])
            .arg(request.output_pattern())
            .stdin(Stdio::null());
        command
    }
}

impl Segmenter for FfmpegSegmenter {
    fn segment(&self, request: &SegmentRequest<'_>) -> SegmentOutcome {
        let mut command = self.command(request);
        debug!("running {command:?}");

        match command.output() {
            Ok(output) if output.status.success() => SegmentOutcome::Completed,
            Ok(output) => SegmentOutcome::Failed(SegmentFailure {
                status: output.status.code(),
                stderr: diagnostics(&output),
            }),
            Err(err) => SegmentOutcome::Failed(SegmentFailure {
                status: None,
                stderr: format!("unable to execute '{}': {err}", self.program.display()),
            }),
        }
    }
}

/// Trimmed stderr, falling back to stdout when stderr is empty.
fn diagnostics(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    if !stderr.is_empty() {
        return stderr;
    }
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}
