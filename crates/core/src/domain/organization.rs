use serde::{Deserialize, Serialize};

use crate::domain::currency::CurrencyCode;
use crate::domain::policy::PolicyId;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrganizationId(pub String);

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationProfile {
    pub id: OrganizationId,
    pub name: String,
    #[serde(default)]
    pub default_currency: Option<CurrencyCode>,
    #[serde(default)]
    pub default_policy_id: Option<PolicyId>,
}
