mod cli;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clipsplit_core::{
    plan, run_with_progress, Config, FailurePolicy, FfmpegSegmenter, ManifestOrder, ProgressEvent,
    Settings,
};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use log::debug;

use crate::cli::build_cli;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let matches = build_cli().get_matches();

    let input_path = matches
        .get_one::<PathBuf>("file_path")
        .expect("required argument");

    let mut builder = Config::builder(input_path);
    if let Some(config_path) = matches.get_one::<PathBuf>("config") {
        let settings = Settings::from_file(config_path).with_context(|| {
            format!(
                "failed to load configuration from '{}'",
                config_path.display()
            )
        })?;
        debug!("loaded {settings:?} from '{}'", config_path.display());
        builder = builder.settings(&settings);
    }
    if let Some(durations) = matches.get_one::<Vec<u32>>("durations") {
        builder = builder.durations(durations.iter().copied());
    }
    if let Some(dir) = matches.get_one::<PathBuf>("scratch-dir") {
        builder = builder.scratch_dir(dir);
    }
    if let Some(dir) = matches.get_one::<PathBuf>("output") {
        builder = builder.output_dir(dir);
    }
    if let Some(extension) = matches.get_one::<String>("extension") {
        builder = builder.extension(extension.as_str());
    }
    if let Some(program) = matches.get_one::<PathBuf>("ffmpeg") {
        builder = builder.ffmpeg(program);
    }
    if let Some(order) = matches.get_one::<ManifestOrder>("order") {
        builder = builder.order(*order);
    }
    if matches.get_flag("strict") {
        builder = builder.on_failure(FailurePolicy::Abort);
    }

    let config = builder.build().with_context(|| {
        format!(
            "failed to create configuration for '{}'",
            input_path.display()
        )
    })?;

    if matches.get_flag("dry-run") {
        let planned = plan(&config);
        println!(
            "Dry run: would split '{}' into {} duration(s):",
            config.input_path.display(),
            planned.len()
        );
        for entry in planned {
            println!(
                "  {}s: {} -> {}",
                entry.duration,
                entry.segment_pattern.display(),
                entry.manifest_path.display()
            );
        }
        return Ok(());
    }

    let progress = if matches.get_flag("quiet") {
        ProgressBar::hidden()
    } else {
        let bar = ProgressBar::new(0);
        bar.set_draw_target(ProgressDrawTarget::stderr());
        bar
    };
    let bar_style = ProgressStyle::with_template(
        "{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}",
    )
    .unwrap_or_else(|_| ProgressStyle::default_bar());
    progress.set_style(bar_style);

    let segmenter = FfmpegSegmenter::new(&config.ffmpeg);
    let progress_handle = progress.clone();
    let result = run_with_progress(&config, &segmenter, &mut |event: ProgressEvent| match event {
        ProgressEvent::Start { durations } => {
            progress_handle.set_length(durations as u64);
            progress_handle.enable_steady_tick(Duration::from_millis(100));
        }
        ProgressEvent::DurationStarted { duration } => {
            progress_handle.set_message(format!("{duration}s: segmenting"));
        }
        ProgressEvent::SegmentCopied {
            duration,
            copied,
            total,
        } => {
            progress_handle.set_message(format!("{duration}s: copied {copied}/{total}"));
        }
        ProgressEvent::DurationFinished { .. } => progress_handle.inc(1),
        ProgressEvent::Finish => progress_handle.set_message("Completed"),
    })
    .with_context(|| format!("failed to split '{}'", input_path.display()));

    progress.finish_and_clear();

    for report in result? {
        println!(
            "{}s: {} chunk(s) -> {}",
            report.duration,
            report.entries.len(),
            report.manifest_path.display()
        );
    }

    Ok(())
}
