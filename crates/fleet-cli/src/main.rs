//! fleet-cli
//!
//! Operator-facing front end for the fleet control plane. The coordinator
//! itself is transport-agnostic; this binary is one façade over it.
//!
//! Usage:
//!   fleet-cli demo           [--data-dir <path>]
//!   fleet-cli status         [--data-dir <path>]
//!   fleet-cli verify-audit   [--data-dir <path>]

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;

mod demo;

#[derive(Parser, Debug)]
#[command(name = "fleet-cli", version, about = "Shared mobility fleet control plane")]
struct Args {
    /// Directory holding the CSV stores and audit log.
    #[arg(long, global = true, default_value = "./data")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the six scripted end-to-end scenarios against a fresh fleet.
    Demo,

    /// Print every vehicle's id, state, battery and location.
    Status,

    /// Verify the audit log's checksum chain and print the result.
    VerifyAudit,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".parse().unwrap()),
        )
        .init();

    let args = Args::parse();
    std::fs::create_dir_all(&args.data_dir)
        .with_context(|| format!("creating data dir {}", args.data_dir.display()))?;

    match args.command {
        Command::Demo => demo::run(&args.data_dir),
        Command::Status => cmd_status(&args.data_dir),
        Command::VerifyAudit => cmd_verify_audit(&args.data_dir),
    }
}

fn cmd_status(data_dir: &std::path::Path) -> anyhow::Result<()> {
    let fleet = fleet_coordinator::Coordinator::open(data_dir)?;
    for vehicle in fleet.all_vehicles() {
        println!(
            "{:<12} {:<9?} battery={:>3}% temp={:>5.1}C city={:<10} ({:.4}, {:.4})",
            vehicle.id, vehicle.state, vehicle.battery_percent, vehicle.temperature_c, vehicle.city, vehicle.location.lat, vehicle.location.lon
        );
    }
    fleet.stop_telemetry_monitor();
    Ok(())
}

fn cmd_verify_audit(data_dir: &std::path::Path) -> anyhow::Result<()> {
    let fleet = fleet_coordinator::Coordinator::open(data_dir)?;
    let ok = fleet.verify_audit_chain();
    info!(ok, "audit chain verification");
    fleet.stop_telemetry_monitor();
    if ok {
        Ok(())
    } else {
        anyhow::bail!("audit chain verification failed")
    }
}
