#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that previews, applies and transfers land height commands.

mod command_transfer;
mod scenario;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use landscape_core::{
    ActionResult, CellCoord, Command, CommandEnvelope, CommandFlags, Event, LandSetHeightParams,
    PlayerId, SlopeStyle,
};
use landscape_system_command_runner::CommandRunner;
use landscape_world::{query, World};

#[derive(Parser, Debug)]
#[command(author, version, about = "Land height commands for tile-based parks", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Subcommand, Debug)]
enum CliCommand {
    /// Validate and price a land height change without applying it
    Query {
        /// Path to the scenario TOML file
        #[arg(long)]
        scenario: PathBuf,
        #[command(flatten)]
        target: TargetArgs,
    },
    /// Apply a land height change and report the result
    Execute {
        /// Path to the scenario TOML file
        #[arg(long)]
        scenario: PathBuf,
        #[command(flatten)]
        target: TargetArgs,
        /// Apply without charging the park ledger
        #[arg(long)]
        no_spend: bool,
    },
    /// Print the transfer string of a land height command
    Encode {
        #[command(flatten)]
        target: TargetArgs,
        /// Mark the command as a preview only
        #[arg(long)]
        query_only: bool,
        /// Mark the command as free of charge
        #[arg(long)]
        no_spend: bool,
    },
    /// Print the command held by a transfer string
    Decode {
        /// Transfer string produced by `encode`
        value: String,
    },
    /// Run transfer strings in order against a scenario
    Replay {
        /// Path to the scenario TOML file
        #[arg(long)]
        scenario: PathBuf,
        /// Transfer strings produced by `encode`
        #[arg(required = true)]
        commands: Vec<String>,
    },
}

#[derive(Args, Debug)]
struct TargetArgs {
    /// Column of the target cell
    #[arg(long)]
    column: u32,
    /// Row of the target cell
    #[arg(long)]
    row: u32,
    /// Target base height in height units
    #[arg(long)]
    height: u8,
    /// Slope style bits (N=1, E=2, S=4, W=8, diagonal=16)
    #[arg(long, default_value_t = 0)]
    style: u8,
    /// Player issuing the command
    #[arg(long, default_value_t = 0)]
    player: u8,
}

impl TargetArgs {
    fn envelope(&self, flags: u32) -> CommandEnvelope {
        CommandEnvelope::new(
            PlayerId::new(self.player),
            CommandFlags::from_bits(flags),
            Command::SetLandHeight(LandSetHeightParams::new(
                CellCoord::new(self.column, self.row),
                self.height,
                SlopeStyle::from_bits(self.style),
            )),
        )
    }
}

/// Entry point for the landscape command-line interface.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(true)
        .init();

    let cli = Cli::parse();
    match cli.command {
        CliCommand::Query { scenario, target } => {
            let envelope = target.envelope(CommandFlags::QUERY_ONLY);
            run_scenario(&scenario, &[envelope])
        }
        CliCommand::Execute {
            scenario,
            target,
            no_spend,
        } => {
            let flags = if no_spend { CommandFlags::NO_SPEND } else { 0 };
            run_scenario(&scenario, &[target.envelope(flags)])
        }
        CliCommand::Encode {
            target,
            query_only,
            no_spend,
        } => {
            let mut flags = 0;
            if query_only {
                flags |= CommandFlags::QUERY_ONLY;
            }
            if no_spend {
                flags |= CommandFlags::NO_SPEND;
            }
            let encoded = command_transfer::encode(&target.envelope(flags))
                .context("failed to encode command")?;
            println!("{encoded}");
            Ok(())
        }
        CliCommand::Decode { value } => {
            let envelope = command_transfer::decode(&value).context("failed to decode command")?;
            println!("{envelope:#?}");
            Ok(())
        }
        CliCommand::Replay { scenario, commands } => {
            let envelopes = commands
                .iter()
                .enumerate()
                .map(|(index, value)| {
                    command_transfer::decode(value)
                        .with_context(|| format!("command {index} is not a transfer string"))
                })
                .collect::<Result<Vec<_>>>()?;
            run_scenario(&scenario, &envelopes)
        }
    }
}

fn run_scenario(path: &Path, envelopes: &[CommandEnvelope]) -> Result<()> {
    let scenario::Scenario {
        mut world,
        policies,
    } = scenario::load(path)?;
    let mut runner = CommandRunner::new();

    for envelope in envelopes {
        let mut events = Vec::new();
        let result = runner
            .run(&mut world, &policies, envelope, &mut events)
            .context("failed to run command")?;
        let Command::SetLandHeight(params) = envelope.command;
        print_result(&world, params.cell, &result, &events);
    }

    let finance = query::finance(&world);
    println!(
        "cash {} ({} commands recorded)",
        finance.cash(),
        runner.log().len()
    );
    Ok(())
}

fn print_result(world: &World, cell: CellCoord, result: &ActionResult, events: &[Event]) {
    match result.reason {
        None => println!(
            "({}, {}): {:?} cost {}",
            cell.column(),
            cell.row(),
            result.status,
            result.cost
        ),
        Some(reason) => println!(
            "({}, {}): {:?} {:?} {:?} {:?}",
            cell.column(),
            cell.row(),
            result.status,
            reason,
            result.error_message,
            result.message_args
        ),
    }
    for event in events {
        println!("  {event:?}");
    }
    if let Some(surface) = query::surface(world, cell) {
        println!(
            "  surface height {} slope {:#04x} water {}",
            surface.element.base_height(),
            surface.surface.slope.bits(),
            surface.surface.water_height
        );
    }
}
