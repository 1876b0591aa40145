pub mod config;
pub mod domain;
pub mod engine;
pub mod errors;
pub mod snapshot;

pub use config::{
    AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat, LoggingConfig, OutputConfig,
    OutputFormat, SnapshotConfig,
};
pub use domain::approval::{ApprovalDecision, ApproverTarget};
pub use domain::currency::CurrencyCode;
pub use domain::geography::{
    Continent, ContinentId, Country, CountryId, GeographyHierarchy, PolicyGeography, Region,
    RegionId,
};
pub use domain::organization::{OrganizationId, OrganizationProfile, UserId};
pub use domain::policy::{
    ApprovalLevel, ApprovalRules, CabinClass, DurationThresholds, EffectiveWindow, PolicyId,
    ThresholdOverride, TravelPolicy, WindowStatus,
};
pub use engine::approvals::{ApprovalContext, ApprovalEngine, DeterministicApprovalEngine};
pub use engine::geography::{DeterministicGeographyResolver, GeographyResolver};
pub use engine::reconcile::{
    CandidateDrop, DroppedCandidate, InMemoryPolicyDirectory, PolicyAssignment, PolicyDirectory,
    PolicyReconciler, ReconciliationInput, ReconciliationResult,
};
pub use engine::thresholds::{DeterministicThresholdResolver, ThresholdResolver};
pub use engine::{BookingEvaluation, BookingInput, BookingPolicyEngine, DeterministicBookingEngine};
pub use errors::{ApplicationError, DomainError};
pub use snapshot::{PolicySnapshot, SnapshotError, UserAssignment};
