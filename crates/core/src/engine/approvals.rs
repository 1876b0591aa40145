use std::collections::BTreeSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::approval::{ApprovalDecision, ApproverTarget};
use crate::domain::policy::{ApprovalLevel, TravelPolicy};
use crate::engine::thresholds::effective_price_cap;
use crate::errors::DomainError;

/// Booking-side facts the approval evaluation needs alongside the policy.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalContext {
    pub fare_total: Decimal,
    pub duration_hours: Decimal,
    /// The requester is exercising an authorized above-limit override.
    #[serde(default)]
    pub override_above_limit: bool,
    /// A manager exists to route a manager approval to. With none assigned
    /// the fallback routing is the caller's problem, not this engine's.
    #[serde(default)]
    pub manager_assigned: bool,
}

pub trait ApprovalEngine: Send + Sync {
    fn evaluate(
        &self,
        policy: &TravelPolicy,
        context: &ApprovalContext,
    ) -> Result<ApprovalDecision, DomainError>;
}

#[derive(Default)]
pub struct DeterministicApprovalEngine;

impl ApprovalEngine for DeterministicApprovalEngine {
    fn evaluate(
        &self,
        policy: &TravelPolicy,
        context: &ApprovalContext,
    ) -> Result<ApprovalDecision, DomainError> {
        evaluate_approval(policy, context)
    }
}

/// Decides which sign-offs a proposed fare requires under a policy.
///
/// Three mutually exclusive branches, in order: auto-approval when the fare
/// is within the duration-effective cap and the policy auto-approves to its
/// limit (this short-circuits the manager and billing rules); the
/// exceeding-policy branch, where the only target ever added is the billing
/// contact on an authorized override; and the within-policy branch, which
/// accumulates manager, billing-contact, and level targets. Targets are
/// reported deduplicated in fixed precedence order.
pub fn evaluate_approval(
    policy: &TravelPolicy,
    context: &ApprovalContext,
) -> Result<ApprovalDecision, DomainError> {
    if context.fare_total < Decimal::ZERO {
        return Err(DomainError::NegativeAmount { amount: context.fare_total });
    }

    let cap = effective_price_cap(policy, context.duration_hours)?;
    let within_policy = cap.map_or(true, |cap| context.fare_total <= cap);

    if within_policy && policy.approvals.auto_approve_to_limit {
        return Ok(ApprovalDecision::auto_approved());
    }

    if !within_policy {
        let mut required_targets = Vec::new();
        if context.override_above_limit && policy.approvals.billing_contact_above_limit {
            required_targets.push(ApproverTarget::BillingContact);
        }
        return Ok(ApprovalDecision::exceeding_policy(required_targets));
    }

    let mut required_targets = BTreeSet::new();
    if policy.approvals.manager_approval_required && context.manager_assigned {
        required_targets.insert(ApproverTarget::Manager);
    }
    if policy.approvals.billing_contact_to_limit {
        required_targets.insert(ApproverTarget::BillingContact);
    }

    let levels = [
        (ApproverTarget::Level1, &policy.approvals.level1),
        (ApproverTarget::Level2, &policy.approvals.level2),
        (ApproverTarget::Level3, &policy.approvals.level3),
    ];
    for (target, level) in levels {
        if level_applies(level, context.fare_total) {
            required_targets.insert(target);
        }
    }

    Ok(ApprovalDecision::within_policy(required_targets.into_iter().collect()))
}

/// A level gates on its threshold with `>=`; an enabled level with no
/// threshold applies to every fare.
fn level_applies(level: &ApprovalLevel, fare_total: Decimal) -> bool {
    level.required && level.threshold_amount.map_or(true, |threshold| fare_total >= threshold)
}
