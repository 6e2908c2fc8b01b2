//! ChaosGuard CLI
//!
//! Command-line driver for the resilience demo: places orders against a
//! simulated dependency with chaos applied and prints the results as JSON.

#![allow(clippy::print_stdout)]

mod app;
mod cli;

use std::time::Duration;

use clap::Parser;
use domain::DemoScenario;
use infrastructure::{AppConfig, TelemetryConfig, init_telemetry};
use serde::Serialize;

use crate::app::App;
use crate::cli::{Cli, Commands, log_filter_from_verbosity};

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn load_config(cli: &Cli) -> anyhow::Result<AppConfig> {
    let config = match &cli.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load()?,
    };
    Ok(config)
}

fn telemetry_config(cli: &Cli, config: &AppConfig) -> TelemetryConfig {
    let mut telemetry = config.telemetry.clone();
    if cli.verbose > 0 {
        telemetry = telemetry.with_log_filter(log_filter_from_verbosity(cli.verbose));
    }
    if cli.json_logs {
        telemetry.json = true;
    }
    telemetry
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    init_telemetry(&telemetry_config(&cli, &config))?;

    let app = App::build(config, cli.timeout_ms.map(Duration::from_millis))?;

    match cli.command {
        Commands::Order {
            protected,
            count,
            parallel,
        } => {
            let outputs = app.place_orders(count, protected, parallel).await;
            print_json(&outputs)?;
            print_json(&app.status())?;
        },

        Commands::Scenario {
            number,
            count,
            protected,
        } => {
            let (scenario, outputs) = app.run_scenario(number, count, protected).await?;
            println!("Scenario {scenario}");
            print_json(&outputs)?;
            print_json(&app.status())?;
        },

        Commands::Demo { count } => {
            for scenario in DemoScenario::ALL {
                app.reset_counters();
                let (scenario, outputs) = app.run_scenario(scenario.number(), count, false).await?;
                println!("Scenario {scenario}");
                print_json(&outputs)?;
                print_json(&app.status())?;
            }
        },

        Commands::Status => print_json(&app.status())?,

        Commands::Breaker { reset } => {
            if reset {
                app.reset_breaker();
            }
            print_json(&app.breaker())?;
        },

        Commands::Config => print_json(app.config())?,
    }

    Ok(())
}
