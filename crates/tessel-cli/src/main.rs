//! `tessel`: command-line driver for the distributed advection-diffusion
//! solver.

mod commands;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Distributed 2D advection-diffusion solver
#[derive(Parser, Debug)]
#[command(name = "tessel")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Distributed 2D advection-diffusion solver", long_about = None)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a simulation
    Run(commands::run::RunArgs),
    /// Check a configuration without running it
    Validate(commands::validate::ValidateArgs),
    /// Print the rank decomposition
    Layout(commands::layout::LayoutArgs),
    /// Reassemble one step's per-rank snapshots into a global CSV
    Stitch(commands::stitch::StitchArgs),
}

fn parse_level(name: &str) -> Level {
    match name.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(parse_level(&cli.log_level))
        .with_target(false)
        .with_thread_names(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Run(args) => commands::run::execute(args),
        Commands::Validate(args) => commands::validate::execute(args),
        Commands::Layout(args) => commands::layout::execute(args),
        Commands::Stitch(args) => commands::stitch::execute(args),
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
    fn run_flags_parse() {
        let cli = Cli::try_parse_from([
            "tessel", "run", "--nx", "128", "--vx", "-0.5", "--ranks", "6", "--bc", "periodic",
            "--log-level", "debug",
        ])
        .unwrap();
        assert_eq!(parse_level(&cli.log_level), Level::DEBUG);
        let Commands::Run(args) = cli.command else {
            panic!("expected run");
        };
        let cfg = args.config.merged().unwrap();
        assert_eq!(cfg.grid.nx, 128);
        assert_eq!(cfg.physics.vx, -0.5);
        assert_eq!(cfg.ranks, 6);
        assert_eq!(cfg.periodicity().unwrap(), tessel_grid::Periodicity::BOTH);
    }

    #[test]
    fn unknown_level_falls_back_to_info() {
        assert_eq!(parse_level("loud"), Level::INFO);
        assert_eq!(parse_level("WARN"), Level::WARN);
    }

    #[test]
    fn stitch_requires_step() {
        assert!(Cli::try_parse_from(["tessel", "stitch"]).is_err());
    }
}
