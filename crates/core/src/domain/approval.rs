use serde::{Deserialize, Serialize};

/// Who must sign off before a booking proceeds.
///
/// Declaration order is the reporting precedence: manager first, numbered
/// levels next, billing contact always last. `Ord` derives from it, so a
/// `BTreeSet` of targets iterates in precedence order with duplicates gone.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApproverTarget {
    Manager,
    Level1,
    Level2,
    Level3,
    BillingContact,
}

impl ApproverTarget {
    pub const PRECEDENCE: [ApproverTarget; 5] = [
        ApproverTarget::Manager,
        ApproverTarget::Level1,
        ApproverTarget::Level2,
        ApproverTarget::Level3,
        ApproverTarget::BillingContact,
    ];
}

/// Immutable outcome of evaluating one proposed fare against one policy.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalDecision {
    pub within_policy: bool,
    pub auto_approved: bool,
    pub required_targets: Vec<ApproverTarget>,
}

impl ApprovalDecision {
    pub fn auto_approved() -> Self {
        Self { within_policy: true, auto_approved: true, required_targets: Vec::new() }
    }

    pub fn within_policy(required_targets: Vec<ApproverTarget>) -> Self {
        Self { within_policy: true, auto_approved: false, required_targets }
    }

    pub fn exceeding_policy(required_targets: Vec<ApproverTarget>) -> Self {
        Self { within_policy: false, auto_approved: false, required_targets }
    }
}
