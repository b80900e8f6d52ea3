use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use clipsplit_core::{materialize, write_manifest, Layout, ManifestOrder};
use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use tempfile::TempDir;

/// Scratch directory pre-filled with fake segments, as ffmpeg would leave it.
struct SyntheticScratch {
    _dir: TempDir,
    path: PathBuf,
}

impl SyntheticScratch {
    fn new(segments: usize, segment_bytes: usize) -> io::Result<Self> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().to_path_buf();
        let payload = vec![0x4f_u8; segment_bytes];
        // Reverse order so sequence sorting has work to do.
        for index in (0..segments).rev() {
            fs::write(path.join(format!("bench_1_{index:06}.opus")), &payload)?;
        }
        Ok(Self { _dir: dir, path })
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

struct Scenario {
    name: &'static str,
    segments: usize,
    segment_bytes: usize,
    order: ManifestOrder,
}

fn materialize_benchmarks(c: &mut Criterion) {
    let scenarios = [
        Scenario {
            name: "60_small_sequence",
            segments: 60,
            segment_bytes: 4 * 1024,
            order: ManifestOrder::Sequence,
        },
        Scenario {
            name: "600_small_sequence",
            segments: 600,
            segment_bytes: 4 * 1024,
            order: ManifestOrder::Sequence,
        },
        Scenario {
            name: "600_small_listing",
            segments: 600,
            segment_bytes: 4 * 1024,
            order: ManifestOrder::Listing,
        },
        Scenario {
            name: "60_large_sequence",
            segments: 60,
            segment_bytes: 256 * 1024,
            order: ManifestOrder::Sequence,
        },
    ];

    let mut group = c.benchmark_group("materialize");

    for scenario in scenarios {
        let scratch = SyntheticScratch::new(scenario.segments, scenario.segment_bytes)
            .expect("failed to synthesize scratch directory");

        group.bench_with_input(
            BenchmarkId::from_parameter(scenario.name),
            &scenario,
            |b, scenario| {
                b.iter_batched(
                    || tempfile::tempdir().expect("failed to create output dir"),
                    |output| {
                        let layout = Layout::new(scratch.path(), output.path(), "bench", "opus");
                        let entries = materialize(
                            scratch.path(),
                            &layout.output_dir(1),
                            layout.extension(),
                            scenario.order,
                        )
                        .expect("materialize failed");
                        let names: Vec<&str> =
                            entries.iter().map(|entry| entry.name.as_str()).collect();
                        write_manifest(&layout, 1, names.as_slice()).expect("manifest write failed");
                        output
                    },
                    BatchSize::PerIteration,
                );
            },
        );
    }

    group.finish();
}

criterion_group!(benches, materialize_benchmarks);
criterion_main!(benches);
