use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::geography::GeographyHierarchy;
use crate::domain::organization::{OrganizationProfile, UserId};
use crate::domain::policy::{PolicyId, TravelPolicy};
use crate::engine::reconcile::InMemoryPolicyDirectory;

/// Immutable bundle of policy data the engines evaluate against.
///
/// The persistence layer that produces these lives outside this crate; the
/// CLI reads one from a JSON file, library callers may assemble one in
/// memory. Either way the snapshot is validated before use and never
/// mutated afterwards.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicySnapshot {
    #[serde(default)]
    pub organizations: Vec<OrganizationProfile>,
    #[serde(default)]
    pub policies: Vec<TravelPolicy>,
    #[serde(default)]
    pub assignments: Vec<UserAssignment>,
    #[serde(default)]
    pub hierarchy: GeographyHierarchy,
}

/// One user's assigned policy.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAssignment {
    pub user_id: UserId,
    pub policy_id: PolicyId,
}

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("could not read snapshot file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse snapshot file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: serde_json::Error },
    #[error("snapshot validation failed: {0}")]
    Validation(String),
}

impl PolicySnapshot {
    pub fn load_from_path(path: &Path) -> Result<Self, SnapshotError> {
        let raw = fs::read_to_string(path)
            .map_err(|source| SnapshotError::ReadFile { path: path.to_path_buf(), source })?;
        let snapshot: Self = serde_json::from_str(&raw)
            .map_err(|source| SnapshotError::ParseFile { path: path.to_path_buf(), source })?;

        snapshot.validate()?;
        Ok(snapshot)
    }

    /// Fail-fast referential and record checks. Every rejection names the
    /// offending record so a bad snapshot is fixable from the message alone.
    pub fn validate(&self) -> Result<(), SnapshotError> {
        let mut organization_ids = HashSet::new();
        for organization in &self.organizations {
            if !organization_ids.insert(&organization.id) {
                return Err(SnapshotError::Validation(format!(
                    "duplicate organization id `{}`",
                    organization.id.0
                )));
            }
        }

        let mut policy_ids = HashSet::new();
        for policy in &self.policies {
            if !policy_ids.insert(&policy.id) {
                return Err(SnapshotError::Validation(format!(
                    "duplicate policy id `{}`",
                    policy.id.0
                )));
            }
            if !organization_ids.contains(&policy.organization_id) {
                return Err(SnapshotError::Validation(format!(
                    "policy `{}` references unknown organization `{}`",
                    policy.id.0, policy.organization_id.0
                )));
            }
            policy
                .validate()
                .map_err(|error| SnapshotError::Validation(error.to_string()))?;
        }

        for organization in &self.organizations {
            if let Some(default_policy_id) = &organization.default_policy_id {
                if !policy_ids.contains(default_policy_id) {
                    return Err(SnapshotError::Validation(format!(
                        "organization `{}` default policy `{}` is not in the snapshot",
                        organization.id.0, default_policy_id.0
                    )));
                }
            }
        }

        let mut assigned_users = HashSet::new();
        for assignment in &self.assignments {
            if !assigned_users.insert(&assignment.user_id) {
                return Err(SnapshotError::Validation(format!(
                    "duplicate assignment for user `{}`",
                    assignment.user_id.0
                )));
            }
            if !policy_ids.contains(&assignment.policy_id) {
                return Err(SnapshotError::Validation(format!(
                    "assignment for user `{}` references unknown policy `{}`",
                    assignment.user_id.0, assignment.policy_id.0
                )));
            }
        }

        self.validate_hierarchy()
    }

    fn validate_hierarchy(&self) -> Result<(), SnapshotError> {
        let mut region_ids = HashSet::new();
        for region in &self.hierarchy.regions {
            if !region_ids.insert(region.id) {
                return Err(SnapshotError::Validation(format!(
                    "duplicate region id `{}`",
                    region.id.0
                )));
            }
        }

        let mut continent_ids = HashSet::new();
        for continent in &self.hierarchy.continents {
            if !continent_ids.insert(continent.id) {
                return Err(SnapshotError::Validation(format!(
                    "duplicate continent id `{}`",
                    continent.id.0
                )));
            }
            if let Some(region_id) = continent.region_id {
                if !region_ids.contains(&region_id) {
                    return Err(SnapshotError::Validation(format!(
                        "continent `{}` references unknown region `{}`",
                        continent.id.0, region_id.0
                    )));
                }
            }
        }

        let mut country_ids = HashSet::new();
        for country in &self.hierarchy.countries {
            if !country_ids.insert(country.id) {
                return Err(SnapshotError::Validation(format!(
                    "duplicate country id `{}`",
                    country.id.0
                )));
            }
            if let Some(continent_id) = country.continent_id {
                if !continent_ids.contains(&continent_id) {
                    return Err(SnapshotError::Validation(format!(
                        "country `{}` references unknown continent `{}`",
                        country.id.0, continent_id.0
                    )));
                }
            }
        }

        Ok(())
    }

    /// Directory view over this snapshot, in record order.
    pub fn directory(&self) -> InMemoryPolicyDirectory {
        let mut directory = InMemoryPolicyDirectory::new();
        for organization in &self.organizations {
            directory = directory.with_organization(organization.clone());
        }
        for policy in &self.policies {
            directory = directory.with_policy(policy.clone());
        }
        for assignment in &self.assignments {
            directory =
                directory.with_assignment(assignment.user_id.clone(), assignment.policy_id.clone());
        }
        directory
    }
}
