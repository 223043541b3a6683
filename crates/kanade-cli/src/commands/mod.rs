pub mod config;
pub mod info;
pub mod register;
pub mod stabilise;

use std::path::Path;

use anyhow::{Context, Result};
use clap::ValueEnum;
use kanade_core::engine::config::{EngineConfig, TransformMode};

#[derive(Clone, Copy, ValueEnum)]
pub enum PresetArg {
    /// Global shift, frame-to-frame
    Stabilise,
    /// Dense field against an averaged reference
    Dewarp,
}

impl PresetArg {
    pub fn config(self) -> EngineConfig {
        match self {
            Self::Stabilise => EngineConfig::stabilise(),
            Self::Dewarp => EngineConfig::dewarp(),
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum TransformArg {
    Passthrough,
    Integer,
    Subpixel,
    Cropped,
    Dewarp,
    Flow,
}

impl From<TransformArg> for TransformMode {
    fn from(arg: TransformArg) -> Self {
        match arg {
            TransformArg::Passthrough => TransformMode::NoTransform,
            TransformArg::Integer => TransformMode::IntegerShift,
            TransformArg::Subpixel => TransformMode::SubpixelShift,
            TransformArg::Cropped => TransformMode::CroppedFilteredSubpixelShift,
            TransformArg::Dewarp => TransformMode::DenseDewarp,
            TransformArg::Flow => TransformMode::FlowMagnitude,
        }
    }
}

/// Read an engine config from a TOML file.
pub fn load_config(path: &Path) -> Result<EngineConfig> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let config: EngineConfig = toml::from_str(&contents).context("Invalid engine config")?;
    config
        .validate()
        .with_context(|| format!("Rejected config {}", path.display()))?;
    Ok(config)
}
