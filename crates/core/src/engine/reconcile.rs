use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::domain::currency::CurrencyCode;
use crate::domain::organization::{OrganizationId, OrganizationProfile, UserId};
use crate::domain::policy::{CabinClass, PolicyId, TravelPolicy, WindowStatus};

/// Read-only lookup seam the reconciler resolves travellers against.
///
/// Implementations hand out immutable snapshot data; the engine never
/// writes back. `organization_policies` must return a stable order across
/// calls, since ephemeral cabin coverage is taken from the first policy
/// that carries one.
pub trait PolicyDirectory: Send + Sync {
    fn assigned_policy_id(&self, user_id: &UserId) -> Option<PolicyId>;
    fn policy(&self, policy_id: &PolicyId) -> Option<&TravelPolicy>;
    fn organization(&self, organization_id: &OrganizationId) -> Option<&OrganizationProfile>;
    fn organization_policies(&self, organization_id: &OrganizationId) -> Vec<&TravelPolicy>;
}

/// Directory over in-memory records, in insertion order.
#[derive(Clone, Debug, Default)]
pub struct InMemoryPolicyDirectory {
    organizations: HashMap<OrganizationId, OrganizationProfile>,
    policies: Vec<TravelPolicy>,
    assignments: HashMap<UserId, PolicyId>,
}

impl InMemoryPolicyDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_organization(mut self, organization: OrganizationProfile) -> Self {
        self.organizations.insert(organization.id.clone(), organization);
        self
    }

    pub fn with_policy(mut self, policy: TravelPolicy) -> Self {
        self.policies.push(policy);
        self
    }

    pub fn with_assignment(mut self, user_id: UserId, policy_id: PolicyId) -> Self {
        self.assignments.insert(user_id, policy_id);
        self
    }
}

impl PolicyDirectory for InMemoryPolicyDirectory {
    fn assigned_policy_id(&self, user_id: &UserId) -> Option<PolicyId> {
        self.assignments.get(user_id).cloned()
    }

    fn policy(&self, policy_id: &PolicyId) -> Option<&TravelPolicy> {
        self.policies.iter().find(|policy| &policy.id == policy_id)
    }

    fn organization(&self, organization_id: &OrganizationId) -> Option<&OrganizationProfile> {
        self.organizations.get(organization_id)
    }

    fn organization_policies(&self, organization_id: &OrganizationId) -> Vec<&TravelPolicy> {
        self.policies
            .iter()
            .filter(|policy| &policy.organization_id == organization_id)
            .collect()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationInput {
    pub organization_id: OrganizationId,
    pub traveller_user_ids: Vec<UserId>,
    pub now: DateTime<Utc>,
}

/// The policy that ends up governing a multi-traveller quote.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PolicyAssignment {
    /// Every surviving traveller resolved to the same durable policy.
    Single {
        policy_id: PolicyId,
        org_default: bool,
        currency: CurrencyCode,
        cabin_coverage: Option<CabinClass>,
    },
    /// Distinct policies survived; a temporary policy carries the merged
    /// currency and cabin coverage. No other field is merged: aggregating
    /// caps, approvals, or geography across conflicting policies is left
    /// to the caller.
    Merged { policy: TravelPolicy },
}

/// Why a candidate policy id was dropped before assignment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateDrop {
    NotYetEffective,
    Expired,
    Missing,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DroppedCandidate {
    pub policy_id: PolicyId,
    pub reason: CandidateDrop,
}

/// Outcome of reconciling one organization's travellers. Gaps are data,
/// not errors: a quote with nothing assignable reports `assignment: None`
/// and lets the caller decide whether that aborts the quote.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationResult {
    pub assignment: Option<PolicyAssignment>,
    /// Travellers with no own assignment and no organization default.
    pub excluded_user_ids: Vec<UserId>,
    /// Distinct policy ids considered, first-occurrence order.
    pub candidate_policy_ids: Vec<PolicyId>,
    pub dropped_candidates: Vec<DroppedCandidate>,
}

/// Resolves which single policy governs a quote shared by travellers on
/// possibly different policies.
pub struct PolicyReconciler<D> {
    directory: D,
}

impl<D: PolicyDirectory> PolicyReconciler<D> {
    pub fn new(directory: D) -> Self {
        Self { directory }
    }

    pub fn directory(&self) -> &D {
        &self.directory
    }

    /// Travellers are deduplicated in first-occurrence order, resolved to a
    /// policy id (own assignment, else the organization default, else
    /// excluded), and the distinct candidate ids are filtered to those
    /// effective at `input.now`. One survivor governs directly; several get
    /// an ephemeral policy; none leaves the quote unassigned.
    pub fn reconcile(&self, input: &ReconciliationInput) -> ReconciliationResult {
        let organization = self.directory.organization(&input.organization_id);
        let default_policy_id =
            organization.and_then(|profile| profile.default_policy_id.clone());

        let mut excluded_user_ids = Vec::new();
        let mut candidate_policy_ids: Vec<PolicyId> = Vec::new();
        let mut seen_users = HashSet::new();

        for user_id in &input.traveller_user_ids {
            if !seen_users.insert(user_id.clone()) {
                continue;
            }

            let resolved = self
                .directory
                .assigned_policy_id(user_id)
                .or_else(|| default_policy_id.clone());
            match resolved {
                Some(policy_id) => {
                    if !candidate_policy_ids.contains(&policy_id) {
                        candidate_policy_ids.push(policy_id);
                    }
                }
                None => {
                    warn!(
                        user_id = %user_id.0,
                        organization_id = %input.organization_id.0,
                        "traveller has no assigned policy and no organization default; excluding"
                    );
                    excluded_user_ids.push(user_id.clone());
                }
            }
        }

        let mut dropped_candidates = Vec::new();
        let mut effective: Vec<&TravelPolicy> = Vec::new();
        for policy_id in &candidate_policy_ids {
            let Some(policy) = self.directory.policy(policy_id) else {
                warn!(policy_id = %policy_id.0, "candidate policy not found in snapshot; dropping");
                dropped_candidates.push(DroppedCandidate {
                    policy_id: policy_id.clone(),
                    reason: CandidateDrop::Missing,
                });
                continue;
            };

            match policy.window.status(input.now) {
                WindowStatus::Active => effective.push(policy),
                WindowStatus::Pending => {
                    warn!(policy_id = %policy_id.0, "candidate policy is not yet effective; dropping");
                    dropped_candidates.push(DroppedCandidate {
                        policy_id: policy_id.clone(),
                        reason: CandidateDrop::NotYetEffective,
                    });
                }
                WindowStatus::Expired => {
                    warn!(policy_id = %policy_id.0, "candidate policy has expired; dropping");
                    dropped_candidates.push(DroppedCandidate {
                        policy_id: policy_id.clone(),
                        reason: CandidateDrop::Expired,
                    });
                }
            }
        }

        let assignment = match effective.as_slice() {
            [] => None,
            [only] => Some(PolicyAssignment::Single {
                policy_id: only.id.clone(),
                org_default: default_policy_id.as_ref() == Some(&only.id),
                currency: only.currency.clone(),
                cabin_coverage: only.max_cabin,
            }),
            _ => Some(PolicyAssignment::Merged {
                policy: self.ephemeral_policy(input, organization),
            }),
        };

        ReconciliationResult {
            assignment,
            excluded_user_ids,
            candidate_policy_ids,
            dropped_candidates,
        }
    }

    fn ephemeral_policy(
        &self,
        input: &ReconciliationInput,
        organization: Option<&OrganizationProfile>,
    ) -> TravelPolicy {
        let currency = organization
            .and_then(|profile| profile.default_currency.clone())
            .unwrap_or_else(CurrencyCode::fallback);
        let cabin_coverage = self
            .directory
            .organization_policies(&input.organization_id)
            .into_iter()
            .find_map(|policy| policy.max_cabin);

        debug!(
            organization_id = %input.organization_id.0,
            currency = %currency,
            "synthesizing ephemeral policy for travellers on distinct policies"
        );

        TravelPolicy {
            id: PolicyId(format!("ephemeral-{}", Uuid::new_v4())),
            organization_id: input.organization_id.clone(),
            name: "Ephemeral reconciliation policy".to_string(),
            currency,
            default_cabin: CabinClass::default(),
            max_cabin: cabin_coverage,
            max_price: Decimal::ZERO,
            thresholds: Default::default(),
            approvals: Default::default(),
            geography: Default::default(),
            window: Default::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, TimeZone, Utc};
    use rust_decimal::Decimal;

    use crate::domain::currency::CurrencyCode;
    use crate::domain::organization::{OrganizationId, OrganizationProfile, UserId};
    use crate::domain::policy::{CabinClass, EffectiveWindow, PolicyId, TravelPolicy};

    use super::{
        CandidateDrop, InMemoryPolicyDirectory, PolicyAssignment, PolicyReconciler,
        ReconciliationInput,
    };

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 1, 12, 0, 0).unwrap()
    }

    fn organization(default_policy: Option<&str>) -> OrganizationProfile {
        OrganizationProfile {
            id: OrganizationId("org-1".to_string()),
            name: "Meridian Travel".to_string(),
            default_currency: Some(CurrencyCode::new("NZD").expect("NZD is valid")),
            default_policy_id: default_policy.map(|id| PolicyId(id.to_string())),
        }
    }

    fn policy(id: &str) -> TravelPolicy {
        TravelPolicy {
            id: PolicyId(id.to_string()),
            organization_id: OrganizationId("org-1".to_string()),
            name: format!("Policy {id}"),
            currency: CurrencyCode::new("AUD").expect("AUD is valid"),
            default_cabin: CabinClass::Economy,
            max_cabin: None,
            max_price: Decimal::ZERO,
            thresholds: Default::default(),
            approvals: Default::default(),
            geography: Default::default(),
            window: Default::default(),
        }
    }

    fn expired(mut policy: TravelPolicy) -> TravelPolicy {
        policy.window = EffectiveWindow {
            effective_from: None,
            expires_on: Some(Utc.with_ymd_and_hms(2025, 12, 31, 23, 59, 59).unwrap()),
        };
        policy
    }

    fn pending(mut policy: TravelPolicy) -> TravelPolicy {
        policy.window = EffectiveWindow {
            effective_from: Some(Utc.with_ymd_and_hms(2027, 1, 1, 0, 0, 0).unwrap()),
            expires_on: None,
        };
        policy
    }

    fn user(id: &str) -> UserId {
        UserId(id.to_string())
    }

    fn input(travellers: &[&str]) -> ReconciliationInput {
        ReconciliationInput {
            organization_id: OrganizationId("org-1".to_string()),
            traveller_user_ids: travellers.iter().map(|id| user(id)).collect(),
            now: now(),
        }
    }

    #[test]
    fn travellers_sharing_one_policy_get_a_single_assignment() {
        let directory = InMemoryPolicyDirectory::new()
            .with_organization(organization(None))
            .with_policy(policy("pol-a"))
            .with_assignment(user("u-1"), PolicyId("pol-a".to_string()))
            .with_assignment(user("u-2"), PolicyId("pol-a".to_string()));
        let reconciler = PolicyReconciler::new(directory);

        let result = reconciler.reconcile(&input(&["u-1", "u-2"]));

        assert_eq!(
            result.assignment,
            Some(PolicyAssignment::Single {
                policy_id: PolicyId("pol-a".to_string()),
                org_default: false,
                currency: CurrencyCode::new("AUD").unwrap(),
                cabin_coverage: None,
            })
        );
        assert!(result.excluded_user_ids.is_empty());
        assert_eq!(result.candidate_policy_ids, vec![PolicyId("pol-a".to_string())]);
        assert!(result.dropped_candidates.is_empty());
    }

    #[test]
    fn organization_default_backfills_unassigned_travellers() {
        let directory = InMemoryPolicyDirectory::new()
            .with_organization(organization(Some("pol-default")))
            .with_policy(policy("pol-default"));
        let reconciler = PolicyReconciler::new(directory);

        let result = reconciler.reconcile(&input(&["u-1"]));

        match result.assignment {
            Some(PolicyAssignment::Single { policy_id, org_default, .. }) => {
                assert_eq!(policy_id, PolicyId("pol-default".to_string()));
                assert!(org_default);
            }
            other => panic!("expected a single assignment, got {other:?}"),
        }
    }

    #[test]
    fn unresolvable_traveller_is_excluded_without_blocking_others() {
        let directory = InMemoryPolicyDirectory::new()
            .with_organization(organization(None))
            .with_policy(policy("pol-a"))
            .with_assignment(user("u-2"), PolicyId("pol-a".to_string()));
        let reconciler = PolicyReconciler::new(directory);

        let result = reconciler.reconcile(&input(&["u-1", "u-2"]));

        assert_eq!(result.excluded_user_ids, vec![user("u-1")]);
        assert!(matches!(result.assignment, Some(PolicyAssignment::Single { .. })));
    }

    #[test]
    fn duplicate_travellers_count_once_in_stable_order() {
        let directory = InMemoryPolicyDirectory::new()
            .with_organization(organization(None))
            .with_policy(policy("pol-b"))
            .with_policy(policy("pol-a"))
            .with_assignment(user("u-1"), PolicyId("pol-b".to_string()))
            .with_assignment(user("u-2"), PolicyId("pol-a".to_string()));
        let reconciler = PolicyReconciler::new(directory);

        let result = reconciler.reconcile(&input(&["u-1", "u-2", "u-1", "u-2"]));

        assert_eq!(
            result.candidate_policy_ids,
            vec![PolicyId("pol-b".to_string()), PolicyId("pol-a".to_string())]
        );
    }

    #[test]
    fn distinct_effective_policies_synthesize_an_ephemeral_policy() {
        let directory = InMemoryPolicyDirectory::new()
            .with_organization(organization(None))
            .with_policy(policy("pol-a"))
            .with_policy(policy("pol-b"))
            .with_assignment(user("u-1"), PolicyId("pol-a".to_string()))
            .with_assignment(user("u-2"), PolicyId("pol-b".to_string()));
        let reconciler = PolicyReconciler::new(directory);

        let result = reconciler.reconcile(&input(&["u-1", "u-2"]));

        match result.assignment {
            Some(PolicyAssignment::Merged { policy }) => {
                assert!(policy.id.0.starts_with("ephemeral-"));
                assert_eq!(policy.organization_id, OrganizationId("org-1".to_string()));
                assert_eq!(policy.currency, CurrencyCode::new("NZD").unwrap());
                assert_eq!(policy.max_cabin, None);
            }
            other => panic!("expected a merged assignment, got {other:?}"),
        }
    }

    #[test]
    fn ephemeral_currency_falls_back_to_aud_without_an_org_default() {
        let mut profile = organization(None);
        profile.default_currency = None;
        let directory = InMemoryPolicyDirectory::new()
            .with_organization(profile)
            .with_policy(policy("pol-a"))
            .with_policy(policy("pol-b"))
            .with_assignment(user("u-1"), PolicyId("pol-a".to_string()))
            .with_assignment(user("u-2"), PolicyId("pol-b".to_string()));
        let reconciler = PolicyReconciler::new(directory);

        let result = reconciler.reconcile(&input(&["u-1", "u-2"]));

        match result.assignment {
            Some(PolicyAssignment::Merged { policy }) => {
                assert_eq!(policy.currency, CurrencyCode::fallback());
            }
            other => panic!("expected a merged assignment, got {other:?}"),
        }
    }

    #[test]
    fn ephemeral_cabin_coverage_comes_from_first_org_policy_carrying_one() {
        let mut uncovered = policy("pol-a");
        uncovered.max_cabin = None;
        let mut covered = policy("pol-b");
        covered.max_cabin = Some(CabinClass::Business);

        let directory = InMemoryPolicyDirectory::new()
            .with_organization(organization(None))
            .with_policy(uncovered)
            .with_policy(covered)
            .with_assignment(user("u-1"), PolicyId("pol-a".to_string()))
            .with_assignment(user("u-2"), PolicyId("pol-b".to_string()));
        let reconciler = PolicyReconciler::new(directory);

        let result = reconciler.reconcile(&input(&["u-1", "u-2"]));

        match result.assignment {
            Some(PolicyAssignment::Merged { policy }) => {
                assert_eq!(policy.max_cabin, Some(CabinClass::Business));
            }
            other => panic!("expected a merged assignment, got {other:?}"),
        }
    }

    #[test]
    fn ephemeral_ids_are_unique_per_reconciliation() {
        let directory = InMemoryPolicyDirectory::new()
            .with_organization(organization(None))
            .with_policy(policy("pol-a"))
            .with_policy(policy("pol-b"))
            .with_assignment(user("u-1"), PolicyId("pol-a".to_string()))
            .with_assignment(user("u-2"), PolicyId("pol-b".to_string()));
        let reconciler = PolicyReconciler::new(directory);

        let first = reconciler.reconcile(&input(&["u-1", "u-2"]));
        let second = reconciler.reconcile(&input(&["u-1", "u-2"]));

        let id = |result: super::ReconciliationResult| match result.assignment {
            Some(PolicyAssignment::Merged { policy }) => policy.id,
            other => panic!("expected a merged assignment, got {other:?}"),
        };
        assert_ne!(id(first), id(second));
    }

    #[test]
    fn expired_policy_is_dropped_with_a_diagnostic_not_merged() {
        let directory = InMemoryPolicyDirectory::new()
            .with_organization(organization(None))
            .with_policy(policy("pol-a"))
            .with_policy(expired(policy("pol-old")))
            .with_assignment(user("u-1"), PolicyId("pol-a".to_string()))
            .with_assignment(user("u-2"), PolicyId("pol-old".to_string()));
        let reconciler = PolicyReconciler::new(directory);

        let result = reconciler.reconcile(&input(&["u-1", "u-2"]));

        assert!(matches!(
            result.assignment,
            Some(PolicyAssignment::Single { ref policy_id, .. }) if policy_id.0 == "pol-a"
        ));
        assert_eq!(result.dropped_candidates.len(), 1);
        assert_eq!(result.dropped_candidates[0].policy_id, PolicyId("pol-old".to_string()));
        assert_eq!(result.dropped_candidates[0].reason, CandidateDrop::Expired);
    }

    #[test]
    fn pending_and_expired_drops_are_distinguished() {
        let directory = InMemoryPolicyDirectory::new()
            .with_organization(organization(None))
            .with_policy(pending(policy("pol-future")))
            .with_policy(expired(policy("pol-past")))
            .with_assignment(user("u-1"), PolicyId("pol-future".to_string()))
            .with_assignment(user("u-2"), PolicyId("pol-past".to_string()));
        let reconciler = PolicyReconciler::new(directory);

        let result = reconciler.reconcile(&input(&["u-1", "u-2"]));

        assert_eq!(result.assignment, None);
        let reasons: Vec<CandidateDrop> =
            result.dropped_candidates.iter().map(|drop| drop.reason).collect();
        assert_eq!(reasons, vec![CandidateDrop::NotYetEffective, CandidateDrop::Expired]);
    }

    #[test]
    fn missing_policy_reference_is_reported_as_missing() {
        let directory = InMemoryPolicyDirectory::new()
            .with_organization(organization(None))
            .with_assignment(user("u-1"), PolicyId("pol-ghost".to_string()));
        let reconciler = PolicyReconciler::new(directory);

        let result = reconciler.reconcile(&input(&["u-1"]));

        assert_eq!(result.assignment, None);
        assert_eq!(result.dropped_candidates[0].reason, CandidateDrop::Missing);
    }

    #[test]
    fn all_travellers_unresolvable_is_an_outcome_not_an_error() {
        let directory = InMemoryPolicyDirectory::new().with_organization(organization(None));
        let reconciler = PolicyReconciler::new(directory);

        let result = reconciler.reconcile(&input(&["u-1", "u-2"]));

        assert_eq!(result.assignment, None);
        assert_eq!(result.excluded_user_ids, vec![user("u-1"), user("u-2")]);
        assert!(result.candidate_policy_ids.is_empty());
        assert!(result.dropped_candidates.is_empty());
    }

    #[test]
    fn unknown_organization_still_reconciles_assigned_travellers() {
        let directory = InMemoryPolicyDirectory::new()
            .with_policy(policy("pol-a"))
            .with_assignment(user("u-1"), PolicyId("pol-a".to_string()));
        let reconciler = PolicyReconciler::new(directory);

        let result = reconciler.reconcile(&input(&["u-1"]));

        assert!(matches!(result.assignment, Some(PolicyAssignment::Single { .. })));
    }
}
