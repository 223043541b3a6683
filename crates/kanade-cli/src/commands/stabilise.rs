use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use kanade_core::engine::config::EngineConfig;
use kanade_core::engine::stream::register_ser;
use kanade_core::engine::types::{ProgressReporter, StreamStage};
use tracing::info;

use super::{load_config, PresetArg, TransformArg};
use crate::summary::{print_engine_summary, print_stream_summary};

#[derive(Args)]
pub struct StabiliseArgs {
    /// Input SER file
    pub file: PathBuf,

    /// Engine config file (TOML); overrides the preset and tuning flags
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Starting preset
    #[arg(long, value_enum, default_value = "stabilise")]
    pub preset: PresetArg,

    /// Output transform
    #[arg(long, value_enum)]
    pub transform: Option<TransformArg>,

    /// Pyramid levels (default: automatic)
    #[arg(long)]
    pub levels: Option<usize>,

    /// Newton-Raphson iterations per level
    #[arg(long)]
    pub iterations: Option<usize>,

    /// Decay of the accumulated shift per frame, both axes (0-1]
    #[arg(long)]
    pub burn: Option<f32>,

    /// Frames used only to seed the reference
    #[arg(long)]
    pub seed_frames: Option<u64>,

    /// Output SER file
    #[arg(short, long, default_value = "registered.ser")]
    pub output: PathBuf,
}

pub fn run(args: &StabiliseArgs) -> Result<()> {
    let config = match args.config {
        Some(ref path) => load_config(path)?,
        None => build_config_from_args(args),
    };
    config.validate().context("Invalid engine settings")?;

    print_engine_summary(&config, &args.file, &args.output);
    info!(config = ?config, "Resolved engine config");

    let reporter = BarReporter::new()?;
    let summary = register_ser(&args.file, &args.output, &config, &reporter)
        .with_context(|| format!("Failed to register {}", args.file.display()))?;
    reporter.pb.finish_with_message("Done");

    print_stream_summary(&summary);
    Ok(())
}

fn build_config_from_args(args: &StabiliseArgs) -> EngineConfig {
    let mut config = args.preset.config();
    if let Some(transform) = args.transform {
        config.transform = transform.into();
    }
    if args.levels.is_some() {
        config.num_levels = args.levels;
    }
    if let Some(iterations) = args.iterations {
        config.iterations = iterations;
    }
    if let Some(burn) = args.burn {
        config.burn_x = burn;
        config.burn_y = burn;
    }
    if let Some(seed_frames) = args.seed_frames {
        config.seed_frames = seed_frames;
    }
    config
}

struct BarReporter {
    pb: ProgressBar,
}

impl BarReporter {
    fn new() -> Result<Self> {
        let pb = ProgressBar::new(0);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{msg:20} [{bar:40}] {pos}/{len}")?
                .progress_chars("=> "),
        );
        Ok(Self { pb })
    }
}

impl ProgressReporter for BarReporter {
    fn begin_stage(&self, stage: StreamStage, total_items: Option<usize>) {
        self.pb.set_message(stage.to_string());
        if let Some(total) = total_items {
            self.pb.set_length(total as u64);
            self.pb.set_position(0);
        }
    }

    fn advance(&self, items_done: usize) {
        self.pb.set_position(items_done as u64);
    }
}
