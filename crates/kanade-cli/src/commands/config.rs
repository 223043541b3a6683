use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use super::PresetArg;

#[derive(Args)]
pub struct ConfigArgs {
    /// Preset to start from
    #[arg(long, value_enum, default_value = "stabilise")]
    pub preset: PresetArg,

    /// Write config to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Print or save a full EngineConfig preset as TOML.
pub fn run(args: &ConfigArgs) -> Result<()> {
    let config = args.preset.config();
    let toml_str = toml::to_string_pretty(&config)?;

    if let Some(ref path) = args.output {
        std::fs::write(path, &toml_str)
            .with_context(|| format!("Failed to write config to {}", path.display()))?;
        println!("Config saved to {}", path.display());
    } else {
        print!("{}", toml_str);
    }

    Ok(())
}
