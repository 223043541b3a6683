use std::path::Path;
use std::time::Instant;

use ndarray::Array3;
use tracing::info;

use super::config::EngineConfig;
use super::registration::RegistrationEngine;
use super::types::{FrameStatus, ProgressReporter, StreamStage, StreamSummary};
use crate::error::Result;
use crate::frame::SampleKind;
use crate::io::ser::{SerColor, SerHeader, SerReader};
use crate::io::ser_writer::SerWriter;
use crate::sample::Sample;

/// Register every frame of a SER file and write the corrected frames to a
/// new SER file with the same header and timestamps.
pub fn register_ser(
    input: &Path,
    output: &Path,
    config: &EngineConfig,
    reporter: &dyn ProgressReporter,
) -> Result<StreamSummary> {
    let reader = SerReader::open(input)?;
    let format = reader.header.image_format();
    let mut engine = RegistrationEngine::initialize(format, config.clone())?;
    let mut writer = SerWriter::create(output, &output_header(&reader.header))?;

    let started = Instant::now();
    let total = reader.frame_count();
    reporter.begin_stage(StreamStage::Registering, Some(total));

    let mut summary = match format.pixel_format.sample_kind() {
        SampleKind::U8 => run::<u8>(&reader, &mut engine, &mut writer, reporter)?,
        SampleKind::F32 => run::<f32>(&reader, &mut engine, &mut writer, reporter)?,
    };
    reporter.finish_stage();

    reporter.begin_stage(StreamStage::Writing, None);
    if let Some(timestamps) = reader.timestamps() {
        writer.write_timestamps(&timestamps)?;
    }
    writer.finalize()?;
    reporter.finish_stage();

    summary.output = output.to_path_buf();
    summary.elapsed_ms = started.elapsed().as_millis();
    info!(
        frames = summary.frames,
        skipped = summary.skipped,
        mean_motion = summary.mean_motion,
        "SER registration finished"
    );
    Ok(summary)
}

fn run<T: Sample>(
    reader: &SerReader,
    engine: &mut RegistrationEngine,
    writer: &mut SerWriter,
    reporter: &dyn ProgressReporter,
) -> Result<StreamSummary> {
    let mut summary = StreamSummary::default();
    let mut motion_sum = 0.0f64;
    let mut output = Array3::<T>::zeros(engine.format().shape());

    for (index, frame) in reader.frames::<T>().enumerate() {
        let frame = frame?;
        let outcome = engine.process_frame(frame.view(), output.view_mut())?;
        // Seeding frames pass through, so their bytes are copied without re-encoding.
        match outcome.status {
            FrameStatus::Skipped => writer.write_raw_frame(reader.frame_raw(index)?)?,
            FrameStatus::Processed => writer.write_frame(output.view())?,
        }

        summary.frames += 1;
        match outcome.status {
            FrameStatus::Skipped => summary.skipped += 1,
            FrameStatus::Processed => {
                let (hx, hy) = outcome.estimate.mean();
                motion_sum += hx.hypot(hy) as f64;
                let (cx, cy) = outcome.correction;
                summary.max_correction = summary.max_correction.max(cx.hypot(cy));
            }
        }
        reporter.advance(index + 1);
    }

    let processed = summary.frames - summary.skipped;
    if processed > 0 {
        summary.mean_motion = (motion_sum / processed as f64) as f32;
    }
    Ok(summary)
}

/// Copy of the input header; Bayer data is written back as plain mono.
fn output_header(input: &SerHeader) -> SerHeader {
    let mut header = input.clone();
    header.color_id = match input.color() {
        SerColor::Bayer(_) => SerColor::Mono.id(),
        color => color.id(),
    };
    header
}
