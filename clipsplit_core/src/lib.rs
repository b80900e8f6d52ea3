use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use log::{info, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

mod layout;
mod manifest;
mod materialize;
mod progress;
mod segmenter;
mod settings;
mod workspace;

pub use layout::Layout;
pub use manifest::{read_manifest, write_manifest};
pub use materialize::{materialize, segment_index, OutputEntry};
pub use progress::{NoProgress, ProgressEvent, ProgressReporter};
pub use segmenter::{FfmpegSegmenter, SegmentFailure, SegmentOutcome, SegmentRequest, Segmenter};
pub use settings::Settings;
pub use workspace::prepare_scratch;

/// Segment lengths, in seconds, used when nothing else is configured.
pub const DEFAULT_DURATIONS: [u32; 4] = [10, 5, 2, 1];
pub const DEFAULT_SCRATCH_DIR: &str = "temp";
pub const DEFAULT_OUTPUT_DIR: &str = "out_files";
pub const DEFAULT_EXTENSION: &str = "opus";
pub const DEFAULT_FFMPEG: &str = "ffmpeg";

/// Errors that can occur while segmenting and publishing clips.
#[derive(Debug, Error)]
pub enum ClipSplitError {
    /// Wrapper around IO errors encountered while reading or writing files.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The per-duration scratch directory could not be wiped or created.
    #[error("failed to prepare scratch directory '{}'", path.display())]
    Workspace {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A segment could not be copied into the output directory.
    #[error("failed to copy '{}' to '{}'", from.display(), to.display())]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The output directory or a manifest file could not be written.
    #[error("failed to write '{}'", path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A manifest file could not be read.
    #[error("failed to read manifest '{}'", path.display())]
    ManifestRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A manifest could not be serialized or parsed.
    #[error("invalid manifest '{}'", path.display())]
    Manifest {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The external segmenter reported a failure.
    #[error(
        "segmentation into {duration}s chunks failed ({}): {stderr}",
        describe_status(status)
    )]
    SegmentationFailed {
        duration: u32,
        status: Option<i32>,
        stderr: String,
    },

    /// Error produced when a file name cannot be derived from the input path.
    #[error("failed to derive a base name for the input file")]
    InvalidInputName,

    /// Error returned when no segment durations are configured.
    #[error("at least one segment duration is required")]
    EmptyDurationSet,

    /// Error returned when a segment duration is zero.
    #[error("segment durations must be greater than zero seconds")]
    InvalidDuration,

    /// Error returned when the output extension cannot be used in a file name.
    #[error("invalid output extension '{0}'")]
    InvalidExtension(String),

    /// The configuration file could not be read.
    #[error("failed to read configuration file '{}'", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML for [`Settings`].
    #[error("invalid configuration file '{}'", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

fn describe_status(status: &Option<i32>) -> String {
    match status {
        Some(code) => format!("exit status {code}"),
        None => String::from("no exit status"),
    }
}

/// Order in which segments are listed in a manifest.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ManifestOrder {
    /// Sorted by the sequence index the segmenter embeds in each file name.
    #[default]
    Sequence,
    /// Whatever order the file system lists the scratch directory in.
    Listing,
}

impl FromStr for ManifestOrder {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "sequence" => Ok(Self::Sequence),
            "listing" => Ok(Self::Listing),
            other => Err(format!(
                "unknown manifest order '{other}' (expected 'sequence' or 'listing')"
            )),
        }
    }
}

impl fmt::Display for ManifestOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sequence => write!(f, "sequence"),
            Self::Listing => write!(f, "listing"),
        }
    }
}

/// What the driver does when the segmenter reports a failure.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Log the failure and publish whatever the scratch directory holds.
    #[default]
    Continue,
    /// Stop the run with [`ClipSplitError::SegmentationFailed`].
    Abort,
}

/// Configuration for a segmentation run.
#[derive(Clone, Debug)]
pub struct Config {
    /// Media file handed to the segmenter. It is never opened by this crate.
    pub input_path: PathBuf,
    /// Segment lengths in seconds, processed in order.
    pub durations: Vec<u32>,
    /// Directory naming scheme for scratch and output files.
    pub layout: Layout,
    /// Program invoked by [`run`].
    pub ffmpeg: PathBuf,
    pub order: ManifestOrder,
    pub on_failure: FailurePolicy,
}

impl Config {
    /// Start building a [`Config`] for `input` with every other value defaulted.
    pub fn builder<P: AsRef<Path>>(input: P) -> ConfigBuilder {
        ConfigBuilder {
            input_path: input.as_ref().to_path_buf(),
            durations: DEFAULT_DURATIONS.to_vec(),
            scratch_dir: PathBuf::from(DEFAULT_SCRATCH_DIR),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            extension: DEFAULT_EXTENSION.to_owned(),
            ffmpeg: PathBuf::from(DEFAULT_FFMPEG),
            order: ManifestOrder::default(),
            on_failure: FailurePolicy::default(),
        }
    }

    /// Construct a [`Config`] using the default durations and directories.
    pub fn new<P: AsRef<Path>>(input: P) -> Result<Self, ClipSplitError> {
        Self::builder(input).build()
    }

    pub fn base_name(&self) -> &str {
        self.layout.base_name()
    }
}

/// Builder for [`Config`].
#[derive(Clone, Debug)]
pub struct ConfigBuilder {
    input_path: PathBuf,
    durations: Vec<u32>,
    scratch_dir: PathBuf,
    output_dir: PathBuf,
    extension: String,
    ffmpeg: PathBuf,
    order: ManifestOrder,
    on_failure: FailurePolicy,
}

impl ConfigBuilder {
    pub fn durations<I: IntoIterator<Item = u32>>(mut self, durations: I) -> Self {
        self.durations = durations.into_iter().collect();
        self
    }

    pub fn scratch_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.scratch_dir = dir.as_ref().to_path_buf();
        self
    }

    pub fn output_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.output_dir = dir.as_ref().to_path_buf();
        self
    }

    pub fn extension<S: Into<String>>(mut self, extension: S) -> Self {
        self.extension = extension.into();
        self
    }

    pub fn ffmpeg<P: AsRef<Path>>(mut self, program: P) -> Self {
        self.ffmpeg = program.as_ref().to_path_buf();
        self
    }

    pub fn order(mut self, order: ManifestOrder) -> Self {
        self.order = order;
        self
    }

    pub fn on_failure(mut self, policy: FailurePolicy) -> Self {
        self.on_failure = policy;
        self
    }

    /// Apply every value present in `settings`, leaving the others untouched.
    pub fn settings(mut self, settings: &Settings) -> Self {
        if let Some(durations) = &settings.durations {
            self.durations = durations.clone();
        }
        if let Some(dir) = &settings.scratch_dir {
            self.scratch_dir = dir.clone();
        }
        if let Some(dir) = &settings.output_dir {
            self.output_dir = dir.clone();
        }
        if let Some(extension) = &settings.extension {
            self.extension = extension.clone();
        }
        if let Some(program) = &settings.ffmpeg {
            self.ffmpeg = program.clone();
        }
        if let Some(order) = settings.order {
            self.order = order;
        }
        if let Some(policy) = settings.on_failure {
            self.on_failure = policy;
        }
        self
    }

    /// Validate the collected values and produce a [`Config`].
    pub fn build(self) -> Result<Config, ClipSplitError> {
        if self.durations.is_empty() {
            return Err(ClipSplitError::EmptyDurationSet);
        }
        if self.durations.contains(&0) {
            return Err(ClipSplitError::InvalidDuration);
        }

        let extension = self.extension.trim();
        if extension.is_empty()
            || extension.starts_with('.')
            || extension.contains(|c| matches!(c, '/' | '\\' | '%'))
        {
            return Err(ClipSplitError::InvalidExtension(self.extension));
        }

        let base_name = self
            .input_path
            .file_stem()
            .and_then(|s| s.to_str())
            .filter(|s| !s.is_empty())
            .ok_or(ClipSplitError::InvalidInputName)?;
        let layout = Layout::new(self.scratch_dir, self.output_dir, base_name, extension);

        Ok(Config {
            input_path: self.input_path,
            durations: self.durations,
            layout,
            ffmpeg: self.ffmpeg,
            order: self.order,
            on_failure: self.on_failure,
        })
    }
}

/// Outcome of processing a single duration.
#[derive(Clone, Debug)]
pub struct DurationReport {
    pub duration: u32,
    pub output_dir: PathBuf,
    pub manifest_path: PathBuf,
    /// Assigned names, in manifest order.
    pub entries: Vec<OutputEntry>,
    pub segmentation: SegmentOutcome,
}

/// Paths a run would touch for one duration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlannedDuration {
    pub duration: u32,
    pub scratch_dir: PathBuf,
    pub segment_pattern: PathBuf,
    pub output_dir: PathBuf,
    pub manifest_path: PathBuf,
}

/// Describe the directories and files a run would use, without touching the disk.
pub fn plan(config: &Config) -> Vec<PlannedDuration> {
    config
        .durations
        .iter()
        .map(|&duration| PlannedDuration {
            duration,
            scratch_dir: config.layout.scratch_dir(duration),
            segment_pattern: config.layout.segment_pattern(duration),
            output_dir: config.layout.output_dir(duration),
            manifest_path: config.layout.manifest_path(duration),
        })
        .collect()
}

/// Run every configured duration through ffmpeg.
pub fn run(config: &Config) -> Result<Vec<DurationReport>, ClipSplitError> {
    let segmenter = FfmpegSegmenter::new(&config.ffmpeg);
    run_with_progress(config, &segmenter, &mut NoProgress)
}

/// Run every configured duration through `segmenter`.
pub fn run_with_segmenter<S>(
    config: &Config,
    segmenter: &S,
) -> Result<Vec<DurationReport>, ClipSplitError>
where
    S: Segmenter + ?Sized,
{
    run_with_progress(config, segmenter, &mut NoProgress)
}

/// Run every configured duration, reporting progress to `progress`.
///
/// Durations are processed strictly in order. For each one the scratch
/// directory is wiped and recreated, the segmenter fills it, every segment is
/// copied under a fresh random name and the manifest is written. Output
/// directories are never cleared, so repeated runs accumulate files.
pub fn run_with_progress<S, R>(
    config: &Config,
    segmenter: &S,
    progress: &mut R,
) -> Result<Vec<DurationReport>, ClipSplitError>
where
    S: Segmenter + ?Sized,
    R: ProgressReporter + ?Sized,
{
    progress.report(ProgressEvent::Start {
        durations: config.durations.len(),
    });

    let mut reports = Vec::with_capacity(config.durations.len());
    for &duration in &config.durations {
        progress.report(ProgressEvent::DurationStarted { duration });
        info!(
            "splitting '{}' into {duration}s chunks",
            config.input_path.display()
        );

        let report = run_duration(config, segmenter, duration, progress)?;
        info!(
            "wrote {} entries to '{}'",
            report.entries.len(),
            report.manifest_path.display()
        );
        progress.report(ProgressEvent::DurationFinished {
            duration,
            entries: report.entries.len(),
        });
        reports.push(report);
    }

    progress.report(ProgressEvent::Finish);
    Ok(reports)
}

fn run_duration<S, R>(
    config: &Config,
    segmenter: &S,
    duration: u32,
    progress: &mut R,
) -> Result<DurationReport, ClipSplitError>
where
    S: Segmenter + ?Sized,
    R: ProgressReporter + ?Sized,
{
    let layout = &config.layout;
    let scratch_dir = prepare_scratch(layout, duration)?;

    let request = SegmentRequest {
        input: &config.input_path,
        scratch_dir: &scratch_dir,
        base_name: layout.base_name(),
        duration,
        extension: layout.extension(),
    };
    let segmentation = segmenter.segment(&request);
    if let SegmentOutcome::Failed(failure) = &segmentation {
        match config.on_failure {
            FailurePolicy::Abort => return Err(failure.to_error(duration)),
            FailurePolicy::Continue => {
                warn!("{}", failure.to_error(duration));
            }
        }
    }

    let output_dir = layout.output_dir(duration);
    let entries = materialize::materialize_with_progress(
        &scratch_dir,
        &output_dir,
        layout.extension(),
        config.order,
        |copied, total| {
            progress.report(ProgressEvent::SegmentCopied {
                duration,
                copied,
                total,
            })
        },
    )?;

    let names: Vec<&str> = entries.iter().map(|entry| entry.name.as_str()).collect();
    let manifest_path = write_manifest(layout, duration, names.as_slice())?;

    Ok(DurationReport {
        duration,
        output_dir,
        manifest_path,
        entries,
        segmentation,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_derives_base_name_from_file_stem() {
        let config = Config::new("media/talk.opus").unwrap();
        assert_eq!(config.base_name(), "talk");
        assert_eq!(config.durations, DEFAULT_DURATIONS.to_vec());
        assert_eq!(config.order, ManifestOrder::Sequence);
        assert_eq!(config.on_failure, FailurePolicy::Continue);
    }

    #[test]
    fn builder_rejects_empty_and_zero_durations() {
        let empty = Config::builder("talk.opus").durations([]).build();
        assert!(matches!(empty, Err(ClipSplitError::EmptyDurationSet)));

        let zero = Config::builder("talk.opus").durations([5, 0]).build();
        assert!(matches!(zero, Err(ClipSplitError::InvalidDuration)));
    }

    #[test]
    fn builder_rejects_unusable_extensions() {
        for extension in ["", ".opus", "a/b", "%d"] {
            let result = Config::builder("talk.opus").extension(extension).build();
            assert!(
                matches!(result, Err(ClipSplitError::InvalidExtension(_))),
                "extension {extension:?} should be rejected"
            );
        }
    }

    #[test]
    fn builder_rejects_paths_without_file_name() {
        let result = Config::builder("..").build();
        assert!(matches!(result, Err(ClipSplitError::InvalidInputName)));
    }

    #[test]
    fn settings_override_defaults_only_where_present() {
        let settings = Settings {
            durations: Some(vec![3]),
            order: Some(ManifestOrder::Listing),
            ..Settings::default()
        };
        let config = Config::builder("talk.opus")
            .settings(&settings)
            .build()
            .unwrap();

        assert_eq!(config.durations, vec![3]);
        assert_eq!(config.order, ManifestOrder::Listing);
        assert_eq!(config.ffmpeg, PathBuf::from(DEFAULT_FFMPEG));
        assert_eq!(config.layout.extension(), DEFAULT_EXTENSION);
    }

    #[test]
    fn plan_lists_paths_for_each_duration() {
        let config = Config::builder("talk.opus")
            .durations([10, 1])
            .build()
            .unwrap();
        let plan = plan(&config);

        assert_eq!(plan.len(), 2);
        assert_eq!(plan[0].duration, 10);
        assert_eq!(plan[0].scratch_dir, Path::new("temp").join("10"));
        assert_eq!(
            plan[0].segment_pattern,
            Path::new("temp").join("10").join("talk_10_%06d.opus")
        );
        assert_eq!(plan[1].output_dir, Path::new("out_files").join("talk").join("1"));
        assert_eq!(
            plan[1].manifest_path,
            Path::new("out_files")
                .join("talk")
                .join("1")
                .join("manifest_1_talk.json")
        );
    }

    #[test]
    fn manifest_order_parses_known_names() {
        assert_eq!("sequence".parse::<ManifestOrder>(), Ok(ManifestOrder::Sequence));
        assert_eq!("listing".parse::<ManifestOrder>(), Ok(ManifestOrder::Listing));
        assert!("random".parse::<ManifestOrder>().is_err());
    }

    #[test]
    fn segmentation_error_mentions_status_and_stderr() {
        let err = ClipSplitError::SegmentationFailed {
            duration: 5,
            status: Some(1),
            stderr: "talk.opus: No such file or directory".into(),
        };
        let message = err.to_string();
        assert!(message.contains("5s chunks"));
        assert!(message.contains("exit status 1"));
        assert!(message.contains("No such file or directory"));
    }
}
