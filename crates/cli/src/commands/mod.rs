pub mod check;
pub mod config;
pub mod countries;
pub mod doctor;
pub mod reconcile;

use std::path::PathBuf;

use serde::Serialize;
use tripwise_core::{
    AppConfig, ConfigOverrides, LoadOptions, OutputFormat, PolicySnapshot, TravelPolicy,
};

// Exit codes by failure class, shared by every subcommand.
pub const EXIT_CONFIG: u8 = 2;
pub const EXIT_SNAPSHOT: u8 = 3;
pub const EXIT_INPUT: u8 = 4;
pub const EXIT_LOOKUP: u8 = 5;
pub const EXIT_DOMAIN: u8 = 6;

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
}

impl CommandResult {
    pub fn success(command: &str, message: impl Into<String>) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message: message.into(),
        };
        Self { exit_code: 0, output: serialize_payload(payload) }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
        };
        Self { exit_code, output: serialize_payload(payload) }
    }
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            escape_json(&error.to_string())
        )
    })
}

pub(crate) fn escape_json(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Loads configuration, applying a per-invocation snapshot path override.
pub(crate) fn load_config(
    command: &str,
    snapshot_path: Option<PathBuf>,
) -> Result<AppConfig, CommandResult> {
    AppConfig::load(LoadOptions {
        overrides: ConfigOverrides { snapshot_path, ..ConfigOverrides::default() },
        ..LoadOptions::default()
    })
    .map_err(|error| {
        CommandResult::failure(command, "config_validation", error.to_string(), EXIT_CONFIG)
    })
}

pub(crate) fn load_snapshot(
    command: &str,
    config: &AppConfig,
) -> Result<PolicySnapshot, CommandResult> {
    PolicySnapshot::load_from_path(&config.snapshot.path)
        .map_err(|error| CommandResult::failure(command, "snapshot", error.to_string(), EXIT_SNAPSHOT))
}

pub(crate) fn find_policy<'a>(
    command: &str,
    snapshot: &'a PolicySnapshot,
    policy_id: &str,
) -> Result<&'a TravelPolicy, CommandResult> {
    snapshot.policies.iter().find(|policy| policy.id.0 == policy_id).ok_or_else(|| {
        CommandResult::failure(
            command,
            "unknown_policy",
            format!("policy `{policy_id}` is not in the snapshot"),
            EXIT_LOOKUP,
        )
    })
}

/// Success output honoring `[output] format`: the serialized payload for
/// JSON consumers, the prepared lines for humans.
pub(crate) fn render(
    command: &'static str,
    format: OutputFormat,
    payload: &impl Serialize,
    text: String,
) -> CommandResult {
    let output = match format {
        OutputFormat::Json => serde_json::to_string_pretty(payload).unwrap_or_else(|error| {
            format!(
                "{{\"command\":\"{command}\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        }),
        OutputFormat::Text => text,
    };

    CommandResult { exit_code: 0, output }
}
