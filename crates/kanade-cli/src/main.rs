mod commands;
mod summary;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "kanade", about = "Real-time video frame registration")]
#[command(version)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show SER file metadata and the pyramid it would use
    Info(commands::info::InfoArgs),
    /// Register every frame of a SER video and write the corrected video
    Stabilise(commands::stabilise::StabiliseArgs),
    /// Estimate the motion between two still images
    Register(commands::register::RegisterArgs),
    /// Print or save an engine config as TOML
    Config(commands::config::ConfigArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match &cli.command {
        Commands::Info(args) => commands::info::run(args),
        Commands::Stabilise(args) => commands::stabilise::run(args),
        Commands::Register(args) => commands::register::run(args),
        Commands::Config(args) => commands::config::run(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn register_color_flag_keeps_luma_estimation() {
        let cli = Cli::command();
        let register = cli.find_subcommand("register").unwrap();
        let color = register
            .get_arguments()
            .find(|arg| arg.get_id() == "color")
            .unwrap();
        let help = color.get_help().unwrap().to_string();
        assert!(help.contains("luma"));
        assert!(!help.contains("instead of luminance"));

        let parsed = Cli::try_parse_from(["kanade", "register", "a.png", "b.png", "--color"]).unwrap();
        assert!(matches!(parsed.command, Commands::Register(ref args) if args.color));
    }
}
