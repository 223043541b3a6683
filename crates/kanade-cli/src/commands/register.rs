use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use kanade_core::engine::registration::RegistrationEngine;
use kanade_core::frame::{MotionEstimate, PixelFormat};
use kanade_core::io::image_io::{load_color_image, load_image, save_image};
use ndarray::Array3;

use super::{load_config, PresetArg, TransformArg};

#[derive(Args)]
pub struct RegisterArgs {
    /// Reference image
    pub reference: PathBuf,

    /// Image to register against the reference
    pub target: PathBuf,

    /// Engine config file (TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Starting preset
    #[arg(long, value_enum, default_value = "stabilise")]
    pub preset: PresetArg,

    /// Output transform for the corrected image
    #[arg(long, value_enum)]
    pub transform: Option<TransformArg>,

    /// Pyramid levels (default: automatic)
    #[arg(long)]
    pub levels: Option<usize>,

    /// Load both images as RGB and keep colour in the corrected output;
    /// motion is still estimated from the luma plane
    #[arg(long)]
    pub color: bool,

    /// Save the corrected target (TIFF or PNG by extension)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn run(args: &RegisterArgs) -> Result<()> {
    let mut config = match args.config {
        Some(ref path) => load_config(path)?,
        None => args.preset.config(),
    };
    if let Some(transform) = args.transform {
        config.transform = transform.into();
    }
    if args.levels.is_some() {
        config.num_levels = args.levels;
    }
    // The reference is the only frame before the target.
    config.seed_frames = 1;

    let load = |path: &PathBuf| -> Result<Array3<f32>> {
        let frame = if args.color {
            load_color_image(path)
        } else {
            load_image(path)
        };
        frame.with_context(|| format!("Failed to load {}", path.display()))
    };
    let reference = load(&args.reference)?;
    let target = load(&args.target)?;
    if reference.dim() != target.dim() {
        bail!(
            "Image sizes differ: {:?} vs {:?}",
            reference.dim(),
            target.dim()
        );
    }

    let (h, w, _) = reference.dim();
    let pixel_format = if args.color {
        PixelFormat::RgbF32
    } else {
        PixelFormat::MonoF32
    };
    let mut engine = RegistrationEngine::new(w, h, pixel_format, config)?;
    let mut output = Array3::<f32>::zeros(reference.dim());
    engine.process_frame(reference.view(), output.view_mut())?;
    let outcome = engine.process_frame(target.view(), output.view_mut())?;

    println!("Reference:   {}", args.reference.display());
    println!("Target:      {}", args.target.display());
    println!("Levels:      {}", engine.pyramid().num_levels());
    match &outcome.estimate {
        MotionEstimate::Global { hx, hy } => {
            println!("Shift:       ({:+.3}, {:+.3}) px", hx, hy);
            println!(
                "Correction:  ({:+.3}, {:+.3}) px",
                outcome.correction.0, outcome.correction.1
            );
        }
        MotionEstimate::Dense { hx, hy } => {
            let (mean_x, mean_y) = outcome.estimate.mean();
            let peak = hx
                .iter()
                .zip(hy.iter())
                .map(|(x, y)| x.hypot(*y))
                .fold(0.0f32, f32::max);
            println!("Mean flow:   ({:+.3}, {:+.3}) px", mean_x, mean_y);
            println!("Peak flow:   {:.3} px", peak);
        }
    }

    if let Some(ref path) = args.output {
        save_image(output.view(), path)
            .with_context(|| format!("Failed to save {}", path.display()))?;
        println!("Output saved to {}", path.display());
    }

    Ok(())
}
