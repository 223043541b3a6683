use std::path::PathBuf;

use crate::frame::MotionEstimate;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameStatus {
    /// Estimate solved and transform applied.
    Processed,
    /// Reference still seeding; the input was passed through unchanged.
    Skipped,
}

impl std::fmt::Display for FrameStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Processed => write!(f, "Processed"),
            Self::Skipped => write!(f, "Skipped (seeding)"),
        }
    }
}

/// What `process_frame` reports for one frame.
#[derive(Clone, Debug)]
pub struct FrameOutcome {
    /// Zero-based index since initialisation or the last reset.
    pub frame_index: u64,
    pub status: FrameStatus,
    pub estimate: MotionEstimate,
    /// Global shift applied to the output, `-(accumulated h)`. Zero for dense modes.
    pub correction: (f32, f32),
}

impl FrameOutcome {
    pub fn is_skipped(&self) -> bool {
        self.status == FrameStatus::Skipped
    }
}

/// Progress stage of a streaming run.
#[derive(Clone, Copy, Debug)]
pub enum StreamStage {
    Registering,
    Writing,
}

impl std::fmt::Display for StreamStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Registering => write!(f, "Registering frames"),
            Self::Writing => write!(f, "Writing output"),
        }
    }
}

/// Progress reporting for streaming runs.
///
/// All methods have default no-op implementations.
pub trait ProgressReporter: Send + Sync {
    /// A new stage has started. `total_items` is the frame count, if known.
    fn begin_stage(&self, _stage: StreamStage, _total_items: Option<usize>) {}

    /// One frame of the current stage finished.
    fn advance(&self, _items_done: usize) {}

    /// The current stage finished.
    fn finish_stage(&self) {}
}

/// Reporter that ignores every event.
pub struct NoOpReporter;

impl ProgressReporter for NoOpReporter {}

/// Totals from a streaming run.
#[derive(Clone, Debug, Default)]
pub struct StreamSummary {
    pub output: PathBuf,
    pub frames: usize,
    pub skipped: usize,
    /// Mean of `|h|` over processed frames (pixels).
    pub mean_motion: f32,
    /// Largest correction magnitude applied (pixels).
    pub max_correction: f32,
    pub elapsed_ms: u128,
}
