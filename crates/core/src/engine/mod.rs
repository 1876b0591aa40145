pub mod approvals;
pub mod geography;
pub mod reconcile;
pub mod thresholds;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::approval::ApprovalDecision;
use crate::domain::geography::{CountryId, GeographyHierarchy};
use crate::domain::policy::{CabinClass, TravelPolicy};
use crate::errors::DomainError;

use self::{
    approvals::{ApprovalContext, ApprovalEngine, DeterministicApprovalEngine},
    geography::{DeterministicGeographyResolver, GeographyResolver},
    thresholds::{DeterministicThresholdResolver, ThresholdResolver},
};

#[derive(Clone, Debug)]
pub struct BookingInput<'a> {
    pub policy: &'a TravelPolicy,
    pub hierarchy: &'a GeographyHierarchy,
    /// Destination to check against the policy's geography, when known.
    pub destination_country_id: Option<CountryId>,
    pub approval: ApprovalContext,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingEvaluation {
    /// `None` when no destination was given or the policy carries no allow
    /// rules to check it against.
    pub destination_permitted: Option<bool>,
    pub effective_cabin: CabinClass,
    pub effective_price_cap: Option<Decimal>,
    pub approval: ApprovalDecision,
}

pub trait BookingPolicyEngine: Send + Sync {
    fn evaluate_booking(&self, input: BookingInput<'_>) -> Result<BookingEvaluation, DomainError>;
}

pub struct DeterministicBookingEngine<G, T, A> {
    geography_resolver: G,
    threshold_resolver: T,
    approval_engine: A,
}

impl<G, T, A> DeterministicBookingEngine<G, T, A> {
    pub fn new(geography_resolver: G, threshold_resolver: T, approval_engine: A) -> Self {
        Self { geography_resolver, threshold_resolver, approval_engine }
    }
}

impl Default
    for DeterministicBookingEngine<
        DeterministicGeographyResolver,
        DeterministicThresholdResolver,
        DeterministicApprovalEngine,
    >
{
    fn default() -> Self {
        Self::new(
            DeterministicGeographyResolver,
            DeterministicThresholdResolver,
            DeterministicApprovalEngine,
        )
    }
}

impl<G, T, A> BookingPolicyEngine for DeterministicBookingEngine<G, T, A>
where
    G: GeographyResolver,
    T: ThresholdResolver,
    A: ApprovalEngine,
{
    fn evaluate_booking(&self, input: BookingInput<'_>) -> Result<BookingEvaluation, DomainError> {
        let destination_permitted = match input.destination_country_id {
            Some(country_id) if input.policy.geography.has_allow_rules() => {
                let allowed = self
                    .geography_resolver
                    .allowed_countries(&input.policy.geography, input.hierarchy);
                Some(allowed.contains(&country_id))
            }
            _ => None,
        };
        let effective_cabin = self
            .threshold_resolver
            .effective_cabin(input.policy, input.approval.duration_hours)?;
        let effective_price_cap = self
            .threshold_resolver
            .effective_price_cap(input.policy, input.approval.duration_hours)?;
        let approval = self.approval_engine.evaluate(input.policy, &input.approval)?;

        Ok(BookingEvaluation {
            destination_permitted,
            effective_cabin,
            effective_price_cap,
            approval,
        })
    }
}
