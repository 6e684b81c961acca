//! elemental: drive demo components through their lifecycle
//!
//! Usage:
//!   elemental mount                     → mount one counter, print its events
//!   elemental clone                     → mount a counter and a duplicate of its node
//!   elemental --debug fail              → failing mount with diagnostic records
//!   elemental --dump-config             → print the effective config as TOML

use clap::Parser;
use elemental::config::ElementalConfig;
use elemental::demo::{self, Scenario};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "elemental",
    about = "Component lifecycle runtime with clone detection",
    version = env!("CARGO_PKG_VERSION")
)]
struct Cli {
    /// Scenario to run
    #[arg(value_enum, default_value = "mount")]
    scenario: Scenario,

    /// Path to config file (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Emit a diagnostic record for every publish
    #[arg(long, default_value_t = false)]
    debug: bool,

    /// Log as JSON lines
    #[arg(long, default_value_t = false)]
    json: bool,

    /// Write logs to a file (in addition to stderr)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Print the effective config and exit
    #[arg(long, default_value_t = false)]
    dump_config: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => ElementalConfig::load(path),
        None => ElementalConfig::default(),
    };
    if cli.debug {
        config.diagnostics.debug = true;
        config.logging.filter = format!("{},elemental::diagnostics=debug", config.logging.filter);
    }
    if cli.json {
        config.logging.json = true;
    }
    if cli.log_file.is_some() {
        config.logging.file = cli.log_file.clone();
    }

    if cli.dump_config {
        print!("{}", config.to_toml());
        return Ok(());
    }

    let _guard = elemental::logging::init(&config.logging)?;

    for line in demo::run(cli.scenario, &config).await? {
        println!("{}", serde_json::to_string(&line)?);
    }

    Ok(())
}
