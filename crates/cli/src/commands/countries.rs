use std::path::PathBuf;

use serde::Serialize;
use tripwise_core::engine::geography::resolve_allowed_countries;

use crate::commands::{self, CommandResult};

const COMMAND: &str = "countries";

#[derive(Debug, Serialize)]
struct CountryEntry {
    id: u32,
    name: Option<String>,
}

#[derive(Debug, Serialize)]
struct CountriesOutput {
    command: &'static str,
    policy_id: String,
    /// False when the policy configures no allow-lists at all; the empty
    /// country list then means "unrestricted", not "nowhere".
    restricted: bool,
    countries: Vec<CountryEntry>,
}

pub fn run(policy_id: String, snapshot_path: Option<PathBuf>) -> CommandResult {
    let config = match commands::load_config(COMMAND, snapshot_path) {
        Ok(config) => config,
        Err(result) => return result,
    };
    let snapshot = match commands::load_snapshot(COMMAND, &config) {
        Ok(snapshot) => snapshot,
        Err(result) => return result,
    };
    let policy = match commands::find_policy(COMMAND, &snapshot, &policy_id) {
        Ok(policy) => policy,
        Err(result) => return result,
    };

    let restricted = policy.geography.has_allow_rules();
    let allowed = resolve_allowed_countries(&policy.geography, &snapshot.hierarchy);
    let countries: Vec<CountryEntry> = allowed
        .iter()
        .map(|country_id| CountryEntry {
            id: country_id.0,
            name: snapshot
                .hierarchy
                .countries
                .iter()
                .find(|country| country.id == *country_id)
                .map(|country| country.name.clone()),
        })
        .collect();

    let payload = CountriesOutput {
        command: COMMAND,
        policy_id: policy_id.clone(),
        restricted,
        countries,
    };

    let text = if !restricted {
        format!("policy `{policy_id}` configures no geography restrictions")
    } else {
        let mut lines =
            vec![format!("policy `{policy_id}` permits {} countries:", payload.countries.len())];
        for entry in &payload.countries {
            match &entry.name {
                Some(name) => lines.push(format!("- {} {name}", entry.id)),
                None => lines.push(format!("- {} (not in hierarchy)", entry.id)),
            }
        }
        lines.join("\n")
    };

    commands::render(COMMAND, config.output.format, &payload, text)
}
