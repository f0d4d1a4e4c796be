use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use reef_sim::{ScenarioConfig, ScenarioRunner};

#[derive(Parser, Debug)]
#[command(name = "reef-sim")]
#[command(about = "Reef staking core scenario driver and conservation audit")]
struct Args {
    /// Path to the scenario TOML file
    #[arg(short, long, default_value = "scenario.toml")]
    scenario: PathBuf,

    /// Verbose logging (per-event detail)
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(if args.verbose { "debug" } else { "info" }),
    )
    .init();

    match run(&args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => {
            log::error!("conservation audit FAILED");
            ExitCode::FAILURE
        }
        Err(err) => {
            log::error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> anyhow::Result<bool> {
    let config = ScenarioConfig::load(&args.scenario)?;
    log::info!("loaded scenario '{}' from {}", config.name, args.scenario.display());

    let runner = ScenarioRunner::new(config)?;
    let report = runner.run()?;

    for audit in &report.incentives {
        let refunded = audit
            .refunded
            .map(|r| r.to_string())
            .unwrap_or_else(|| "-".to_string());
        log::info!(
            "incentive '{}': funded={} paid={} refunded={} remaining={} conserved={}",
            audit.name,
            audit.funded,
            audit.paid,
            refunded,
            audit.remaining,
            audit.conserved(),
        );
    }

    Ok(report.conserved())
}
