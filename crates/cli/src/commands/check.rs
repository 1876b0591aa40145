use std::path::PathBuf;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::Serialize;
use tripwise_core::{
    ApprovalContext, ApprovalDecision, BookingInput, BookingPolicyEngine, CabinClass, CountryId,
    DeterministicBookingEngine,
};

use crate::commands::{self, CommandResult, EXIT_DOMAIN, EXIT_INPUT};

const COMMAND: &str = "check";

#[derive(Debug, Clone)]
pub struct CheckArgs {
    pub policy_id: String,
    pub fare: String,
    pub duration: String,
    pub destination_country_id: Option<u32>,
    pub override_above_limit: bool,
    pub manager_assigned: bool,
    pub snapshot_path: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct CheckOutput {
    command: &'static str,
    policy_id: String,
    fare_total: Decimal,
    duration_hours: Decimal,
    destination_permitted: Option<bool>,
    effective_cabin: CabinClass,
    effective_price_cap: Option<Decimal>,
    approval: ApprovalDecision,
}

pub fn run(args: CheckArgs) -> CommandResult {
    let fare_total = match Decimal::from_str(args.fare.trim()) {
        Ok(value) => value,
        Err(error) => {
            return CommandResult::failure(
                COMMAND,
                "input_parse",
                format!("invalid fare `{}`: {error}", args.fare),
                EXIT_INPUT,
            );
        }
    };
    let duration_hours = match Decimal::from_str(args.duration.trim()) {
        Ok(value) => value,
        Err(error) => {
            return CommandResult::failure(
                COMMAND,
                "input_parse",
                format!("invalid duration `{}`: {error}", args.duration),
                EXIT_INPUT,
            );
        }
    };

    let config = match commands::load_config(COMMAND, args.snapshot_path) {
        Ok(config) => config,
        Err(result) => return result,
    };
    let snapshot = match commands::load_snapshot(COMMAND, &config) {
        Ok(snapshot) => snapshot,
        Err(result) => return result,
    };
    let policy = match commands::find_policy(COMMAND, &snapshot, &args.policy_id) {
        Ok(policy) => policy,
        Err(result) => return result,
    };

    let engine = DeterministicBookingEngine::default();
    let evaluation = match engine.evaluate_booking(BookingInput {
        policy,
        hierarchy: &snapshot.hierarchy,
        destination_country_id: args.destination_country_id.map(CountryId),
        approval: ApprovalContext {
            fare_total,
            duration_hours,
            override_above_limit: args.override_above_limit,
            manager_assigned: args.manager_assigned,
        },
    }) {
        Ok(evaluation) => evaluation,
        Err(error) => {
            return CommandResult::failure(COMMAND, "domain", error.to_string(), EXIT_DOMAIN);
        }
    };

    let payload = CheckOutput {
        command: COMMAND,
        policy_id: args.policy_id.clone(),
        fare_total,
        duration_hours,
        destination_permitted: evaluation.destination_permitted,
        effective_cabin: evaluation.effective_cabin,
        effective_price_cap: evaluation.effective_price_cap,
        approval: evaluation.approval.clone(),
    };

    let mut lines =
        vec![format!("booking check against policy `{}` ({}h flight):", args.policy_id, duration_hours)];
    lines.push(match evaluation.destination_permitted {
        Some(true) => "- destination: permitted".to_string(),
        Some(false) => "- destination: not permitted".to_string(),
        None => "- destination: unrestricted or not specified".to_string(),
    });
    lines.push(format!("- effective cabin: {}", evaluation.effective_cabin));
    lines.push(match evaluation.effective_price_cap {
        Some(cap) => format!("- effective price cap: {cap} {}", policy.currency),
        None => "- effective price cap: none".to_string(),
    });
    lines.push(format!(
        "- within policy: {}",
        if evaluation.approval.within_policy { "yes" } else { "no" }
    ));
    if evaluation.approval.auto_approved {
        lines.push("- auto-approved, no sign-off required".to_string());
    } else if evaluation.approval.required_targets.is_empty() {
        lines.push("- no approval targets required".to_string());
    } else {
        let targets: Vec<String> = evaluation
            .approval
            .required_targets
            .iter()
            .map(|target| format!("{target:?}"))
            .collect();
        lines.push(format!("- required approvals: {}", targets.join(", ")));
    }

    commands::render(COMMAND, config.output.format, &payload, lines.join("\n"))
}
