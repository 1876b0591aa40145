pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use crate::commands::check::CheckArgs;
use crate::commands::reconcile::ReconcileArgs;

#[derive(Debug, Parser)]
#[command(
    name = "tripwise",
    about = "Tripwise policy engine CLI",
    long_about = "Evaluate travel bookings, resolve permitted destinations, and reconcile \
                  traveller policies against an immutable policy snapshot.",
    after_help = "Examples:\n  tripwise check --policy pol-standard --fare 1250 --duration 9.5\n  tripwise countries --policy pol-standard\n  tripwise reconcile --organization org-1 --traveller u-1 --traveller u-2\n  tripwise doctor --json"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Evaluate a proposed booking against one policy in the snapshot")]
    Check {
        #[arg(long, help = "Policy id to evaluate against")]
        policy: String,
        #[arg(long, help = "Total fare amount, exact decimal")]
        fare: String,
        #[arg(long, help = "Scheduled flight duration in hours, exact decimal")]
        duration: String,
        #[arg(long, help = "Destination country id to check against the policy geography")]
        destination: Option<u32>,
        #[arg(long, help = "The requester holds an authorized above-limit override")]
        override_above_limit: bool,
        #[arg(long, help = "The traveller has a manager assigned for approval routing")]
        manager_assigned: bool,
        #[arg(long, help = "Snapshot file path, overriding configuration")]
        snapshot: Option<PathBuf>,
    },
    #[command(about = "Resolve the concrete set of countries a policy permits")]
    Countries {
        #[arg(long, help = "Policy id to expand")]
        policy: String,
        #[arg(long, help = "Snapshot file path, overriding configuration")]
        snapshot: Option<PathBuf>,
    },
    #[command(about = "Reconcile the travellers on one quote to a governing policy")]
    Reconcile {
        #[arg(long, help = "Organization the quote belongs to")]
        organization: String,
        #[arg(
            long = "traveller",
            required = true,
            help = "Traveller user id; repeat once per traveller"
        )]
        travellers: Vec<String>,
        #[arg(long, help = "Evaluate policy windows as of this RFC 3339 instant (default: now)")]
        at: Option<String>,
        #[arg(long, help = "Snapshot file path, overriding configuration")]
        snapshot: Option<PathBuf>,
    },
    #[command(
        about = "Inspect effective configuration values with source attribution"
    )]
    Config,
    #[command(about = "Validate configuration and snapshot integrity")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Check {
            policy,
            fare,
            duration,
            destination,
            override_above_limit,
            manager_assigned,
            snapshot,
        } => commands::check::run(CheckArgs {
            policy_id: policy,
            fare,
            duration,
            destination_country_id: destination,
            override_above_limit,
            manager_assigned,
            snapshot_path: snapshot,
        }),
        Command::Countries { policy, snapshot } => commands::countries::run(policy, snapshot),
        Command::Reconcile { organization, travellers, at, snapshot } => {
            commands::reconcile::run(ReconcileArgs {
                organization_id: organization,
                traveller_user_ids: travellers,
                at,
                snapshot_path: snapshot,
            })
        }
        Command::Config => commands::config::run(),
        Command::Doctor { json } => commands::doctor::run(json),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
