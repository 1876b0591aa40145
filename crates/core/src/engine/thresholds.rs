use rust_decimal::Decimal;

use crate::domain::policy::{CabinClass, TravelPolicy};
use crate::errors::DomainError;

pub trait ThresholdResolver: Send + Sync {
    fn effective_cabin(
        &self,
        policy: &TravelPolicy,
        duration_hours: Decimal,
    ) -> Result<CabinClass, DomainError>;

    fn effective_price_cap(
        &self,
        policy: &TravelPolicy,
        duration_hours: Decimal,
    ) -> Result<Option<Decimal>, DomainError>;
}

#[derive(Default)]
pub struct DeterministicThresholdResolver;

impl ThresholdResolver for DeterministicThresholdResolver {
    fn effective_cabin(
        &self,
        policy: &TravelPolicy,
        duration_hours: Decimal,
    ) -> Result<CabinClass, DomainError> {
        effective_cabin(policy, duration_hours)
    }

    fn effective_price_cap(
        &self,
        policy: &TravelPolicy,
        duration_hours: Decimal,
    ) -> Result<Option<Decimal>, DomainError> {
        effective_price_cap(policy, duration_hours)
    }
}

/// Resolves the cabin a traveller may book for a flight of the given
/// duration.
///
/// Breakpoints are evaluated longest first (14h, 10h, 8h, 6h); the first
/// breakpoint at or below the duration with a cabin override set wins. A
/// matched breakpoint with no cabin set falls through to the next lower
/// one. When nothing matches, the blanket ceiling applies, then the
/// baseline cabin, so the resolution is total for any valid input.
pub fn effective_cabin(
    policy: &TravelPolicy,
    duration_hours: Decimal,
) -> Result<CabinClass, DomainError> {
    ensure_duration(duration_hours)?;
    policy.validate()?;

    for (boundary, rung) in policy.thresholds.longest_first() {
        if Decimal::from(boundary) <= duration_hours {
            if let Some(cabin) = rung.cabin {
                return Ok(cabin);
            }
        }
    }

    Ok(policy.max_cabin.unwrap_or(policy.default_cabin))
}

/// Resolves the price cap for a flight of the given duration, scanning the
/// breakpoints exactly as [`effective_cabin`] does but over the price side
/// of each override.
///
/// `Ok(None)` means the fare is uncapped. A cap of zero is the records'
/// sentinel for "no cap", so a resolved zero (breakpoint or blanket) maps
/// to `None` rather than to a cap nothing could satisfy.
pub fn effective_price_cap(
    policy: &TravelPolicy,
    duration_hours: Decimal,
) -> Result<Option<Decimal>, DomainError> {
    ensure_duration(duration_hours)?;
    policy.validate()?;

    for (boundary, rung) in policy.thresholds.longest_first() {
        if Decimal::from(boundary) <= duration_hours {
            if let Some(cap) = rung.price_cap {
                return Ok(real_cap(cap));
            }
        }
    }

    Ok(real_cap(policy.max_price))
}

fn ensure_duration(duration_hours: Decimal) -> Result<(), DomainError> {
    if duration_hours < Decimal::ZERO {
        return Err(DomainError::NegativeDuration { hours: duration_hours });
    }

    Ok(())
}

fn real_cap(cap: Decimal) -> Option<Decimal> {
    if cap.is_zero() {
        None
    } else {
        Some(cap)
    }
}
