/// Notifications emitted while a run progresses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProgressEvent {
    /// The run is starting with `durations` durations to process.
    Start { durations: usize },
    /// Segmentation for `duration` is about to start.
    DurationStarted { duration: u32 },
    /// `copied` of `total` segments have been published for `duration`.
    SegmentCopied {
        duration: u32,
        copied: usize,
        total: usize,
    },
    /// The manifest for `duration` has been written with `entries` names.
    DurationFinished { duration: u32, entries: usize },
    /// Every duration has been processed.
    Finish,
}

/// Receives [`ProgressEvent`]s from the driver.
pub trait ProgressReporter {
    fn report(&mut self, _event: ProgressEvent) {}
}

impl<F> ProgressReporter for F
where
    F: FnMut(ProgressEvent),
{
    fn report(&mut self, event: ProgressEvent) {
        self(event)
    }
}

/// Reporter that discards every event.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoProgress;

impl ProgressReporter for NoProgress {}
