mod durations;

use std::path::PathBuf;

use clap::{builder::ValueParser, value_parser, Arg, ArgAction, Command};
use clipsplit_core::ManifestOrder;

pub use durations::parse_durations;

pub fn build_cli() -> Command {
    Command::new(env!("CARGO_PKG_NAME"))
        .author(env!("CARGO_PKG_AUTHORS"))
        .about("Split an audio file into randomly named chunks at several granularities")
        .version(env!("CARGO_PKG_VERSION"))
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("TOML file providing defaults for the options below")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("durations")
                .short('d')
                .long("durations")
                .value_name("LIST")
                .help("Comma-separated segment lengths, e.g. 10,5,2,1 or 1m,30s [default: 10,5,2,1]")
                .value_parser(ValueParser::new(parse_durations)),
        )
        .arg(
            Arg::new("scratch-dir")
                .long("scratch-dir")
                .value_name("DIR")
                .help("Scratch directory, wiped for every duration [default: temp]")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("OUTPUT_DIR")
                .help("Directory the renamed chunks and manifests are written to [default: out_files]")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("extension")
                .long("extension")
                .value_name("EXT")
                .help("Extension of the produced chunks [default: opus]"),
        )
        .arg(
            Arg::new("ffmpeg")
                .long("ffmpeg")
                .value_name("PATH")
                .help("ffmpeg executable used for segmentation [default: ffmpeg]")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("order")
                .long("order")
                .value_name("ORDER")
                .help("Manifest order: 'sequence' (segment order) or 'listing' (directory order)")
                .value_parser(ValueParser::new(|value: &str| value.parse::<ManifestOrder>())),
        )
        .arg(
            Arg::new("strict")
                .long("strict")
                .help("Abort when ffmpeg fails instead of publishing whatever it produced")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("dry-run")
                .long("dry-run")
                .help("Print the directories and manifests that would be written, then exit")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .help("Hide the progress bar")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("file_path")
                .value_name("FILE_PATH")
                .help("Path to the input audio file")
                .required(true)
                .value_parser(value_parser!(PathBuf)),
        )
}
