use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tripwise_core::{
    OrganizationId, PolicyAssignment, PolicyReconciler, ReconciliationInput, ReconciliationResult,
    UserId,
};

use crate::commands::{self, CommandResult, EXIT_INPUT};

const COMMAND: &str = "reconcile";

#[derive(Debug, Clone)]
pub struct ReconcileArgs {
    pub organization_id: String,
    pub traveller_user_ids: Vec<String>,
    /// RFC 3339 instant to evaluate policy windows at; defaults to now.
    pub at: Option<String>,
    pub snapshot_path: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct ReconcileOutput {
    command: &'static str,
    organization_id: String,
    evaluated_at: DateTime<Utc>,
    result: ReconciliationResult,
}

pub fn run(args: ReconcileArgs) -> CommandResult {
    let now = match &args.at {
        Some(raw) => match DateTime::parse_from_rfc3339(raw.trim()) {
            Ok(instant) => instant.with_timezone(&Utc),
            Err(error) => {
                return CommandResult::failure(
                    COMMAND,
                    "input_parse",
                    format!("invalid --at instant `{raw}`: {error}"),
                    EXIT_INPUT,
                );
            }
        },
        None => Utc::now(),
    };

    let config = match commands::load_config(COMMAND, args.snapshot_path) {
        Ok(config) => config,
        Err(result) => return result,
    };
    let snapshot = match commands::load_snapshot(COMMAND, &config) {
        Ok(snapshot) => snapshot,
        Err(result) => return result,
    };

    let reconciler = PolicyReconciler::new(snapshot.directory());
    let result = reconciler.reconcile(&ReconciliationInput {
        organization_id: OrganizationId(args.organization_id.clone()),
        traveller_user_ids: args.traveller_user_ids.iter().cloned().map(UserId).collect(),
        now,
    });

    let mut lines = vec![format!(
        "reconciled {} traveller(s) for organization `{}` as of {}:",
        args.traveller_user_ids.len(),
        args.organization_id,
        now.to_rfc3339()
    )];
    match &result.assignment {
        Some(PolicyAssignment::Single { policy_id, org_default, currency, cabin_coverage }) => {
            lines.push(format!(
                "- governing policy: `{}`{} ({currency}, cabin coverage {})",
                policy_id.0,
                if *org_default { " [organization default]" } else { "" },
                cabin_coverage.map_or_else(|| "none".to_string(), |cabin| cabin.to_string()),
            ));
        }
        Some(PolicyAssignment::Merged { policy }) => {
            lines.push(format!(
                "- ephemeral policy `{}` synthesized ({}, cabin coverage {})",
                policy.id.0,
                policy.currency,
                policy.max_cabin.map_or_else(|| "none".to_string(), |cabin| cabin.to_string()),
            ));
        }
        None => lines.push("- no effective policy; quote is unassignable".to_string()),
    }
    if !result.excluded_user_ids.is_empty() {
        let excluded: Vec<&str> =
            result.excluded_user_ids.iter().map(|user| user.0.as_str()).collect();
        lines.push(format!("- excluded travellers: {}", excluded.join(", ")));
    }
    for dropped in &result.dropped_candidates {
        lines.push(format!(
            "- dropped candidate `{}`: {:?}",
            dropped.policy_id.0, dropped.reason
        ));
    }

    let payload = ReconcileOutput {
        command: COMMAND,
        organization_id: args.organization_id,
        evaluated_at: now,
        result,
    };

    commands::render(COMMAND, config.output.format, &payload, lines.join("\n"))
}
