use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::currency::CurrencyCode;
use crate::domain::geography::PolicyGeography;
use crate::domain::organization::OrganizationId;
use crate::errors::DomainError;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PolicyId(pub String);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CabinClass {
    #[default]
    Economy,
    PremiumEconomy,
    Business,
    First,
}

impl CabinClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Economy => "ECONOMY",
            Self::PremiumEconomy => "PREMIUM_ECONOMY",
            Self::Business => "BUSINESS",
            Self::First => "FIRST",
        }
    }
}

impl std::fmt::Display for CabinClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CabinClass {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "ECONOMY" => Ok(Self::Economy),
            "PREMIUM_ECONOMY" => Ok(Self::PremiumEconomy),
            "BUSINESS" => Ok(Self::Business),
            "FIRST" => Ok(Self::First),
            other => Err(DomainError::UnknownCabinClass { value: other.to_string() }),
        }
    }
}

/// Cabin and price overrides for a single duration breakpoint. Either field
/// may be set independently; an unset field falls through to the next lower
/// breakpoint.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThresholdOverride {
    #[serde(default)]
    pub cabin: Option<CabinClass>,
    #[serde(default)]
    pub price_cap: Option<Decimal>,
}

/// Duration-keyed overrides at the four fixed breakpoints.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DurationThresholds {
    #[serde(default)]
    pub at_6h: ThresholdOverride,
    #[serde(default)]
    pub at_8h: ThresholdOverride,
    #[serde(default)]
    pub at_10h: ThresholdOverride,
    #[serde(default)]
    pub at_14h: ThresholdOverride,
}

impl DurationThresholds {
    /// Breakpoints in evaluation order: longest threshold first.
    pub fn longest_first(&self) -> [(u32, &ThresholdOverride); 4] {
        [(14, &self.at_14h), (10, &self.at_10h), (8, &self.at_8h), (6, &self.at_6h)]
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalLevel {
    #[serde(default)]
    pub required: bool,
    /// Fare amount from which this level applies. Unset means the level is
    /// always required when enabled.
    #[serde(default)]
    pub threshold_amount: Option<Decimal>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalRules {
    #[serde(default)]
    pub auto_approve_to_limit: bool,
    #[serde(default)]
    pub manager_approval_required: bool,
    #[serde(default)]
    pub level1: ApprovalLevel,
    #[serde(default)]
    pub level2: ApprovalLevel,
    #[serde(default)]
    pub level3: ApprovalLevel,
    #[serde(default)]
    pub billing_contact_to_limit: bool,
    #[serde(default)]
    pub billing_contact_above_limit: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowStatus {
    Pending,
    Active,
    Expired,
}

/// The `[effective_from, expires_on]` range during which a policy applies.
/// Both bounds are inclusive; an unset bound is open.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectiveWindow {
    #[serde(default)]
    pub effective_from: Option<DateTime<Utc>>,
    #[serde(default)]
    pub expires_on: Option<DateTime<Utc>>,
}

impl EffectiveWindow {
    pub fn status(&self, now: DateTime<Utc>) -> WindowStatus {
        if let Some(from) = self.effective_from {
            if now < from {
                return WindowStatus::Pending;
            }
        }
        if let Some(until) = self.expires_on {
            if now > until {
                return WindowStatus::Expired;
            }
        }

        WindowStatus::Active
    }

    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.status(now) == WindowStatus::Active
    }
}

/// A named set of travel-spend rules owned by an organization.
///
/// Durable and ephemeral policies share this shape; an ephemeral one only
/// exists for the lifetime of a single reconciliation result.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TravelPolicy {
    pub id: PolicyId,
    pub organization_id: OrganizationId,
    pub name: String,
    pub currency: CurrencyCode,
    /// Baseline cabin when no breakpoint override or blanket ceiling applies.
    #[serde(default)]
    pub default_cabin: CabinClass,
    /// Blanket cabin ceiling; also the policy's cabin coverage on quotes.
    #[serde(default)]
    pub max_cabin: Option<CabinClass>,
    /// Blanket price ceiling. Zero is the documented sentinel for "no cap",
    /// never a real cap.
    #[serde(default)]
    pub max_price: Decimal,
    #[serde(default)]
    pub thresholds: DurationThresholds,
    #[serde(default)]
    pub approvals: ApprovalRules,
    #[serde(default)]
    pub geography: PolicyGeography,
    #[serde(default)]
    pub window: EffectiveWindow,
}

impl TravelPolicy {
    /// Rejects malformed records loudly instead of letting a negative cap or
    /// threshold flow into comparisons.
    pub fn validate(&self) -> Result<(), DomainError> {
        self.ensure_non_negative("max_price", self.max_price)?;

        let overrides = [
            ("thresholds.at_6h.price_cap", &self.thresholds.at_6h),
            ("thresholds.at_8h.price_cap", &self.thresholds.at_8h),
            ("thresholds.at_10h.price_cap", &self.thresholds.at_10h),
            ("thresholds.at_14h.price_cap", &self.thresholds.at_14h),
        ];
        for (field, threshold) in overrides {
            if let Some(cap) = threshold.price_cap {
                self.ensure_non_negative(field, cap)?;
            }
        }

        let levels = [
            ("approvals.level1.threshold_amount", &self.approvals.level1),
            ("approvals.level2.threshold_amount", &self.approvals.level2),
            ("approvals.level3.threshold_amount", &self.approvals.level3),
        ];
        for (field, level) in levels {
            if let Some(amount) = level.threshold_amount {
                self.ensure_non_negative(field, amount)?;
            }
        }

        Ok(())
    }

    fn ensure_non_negative(&self, field: &'static str, amount: Decimal) -> Result<(), DomainError> {
        if amount < Decimal::ZERO {
            return Err(DomainError::NegativeThreshold {
                policy_id: self.id.0.clone(),
                field,
                amount,
            });
        }

        Ok(())
    }
}
