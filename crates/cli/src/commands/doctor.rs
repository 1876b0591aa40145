use serde::Serialize;
use tripwise_core::{AppConfig, LoadOptions, PolicySnapshot};

use crate::commands::{escape_json, CommandResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

pub fn run(json_output: bool) -> CommandResult {
    let report = build_report();
    let exit_code = if report.overall_status == CheckStatus::Pass { 0 } else { 1 };

    let output = if json_output {
        serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        })
    } else {
        render_human(&report)
    };

    CommandResult { exit_code, output }
}

fn build_report() -> DoctorReport {
    let mut checks = Vec::new();

    match AppConfig::load(LoadOptions::default()) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });
            match PolicySnapshot::load_from_path(&config.snapshot.path) {
                Ok(snapshot) => {
                    checks.push(DoctorCheck {
                        name: "snapshot_integrity",
                        status: CheckStatus::Pass,
                        details: format!(
                            "snapshot `{}` loaded and validated",
                            config.snapshot.path.display()
                        ),
                    });
                    checks.push(census_check(&snapshot));
                }
                Err(error) => {
                    checks.push(DoctorCheck {
                        name: "snapshot_integrity",
                        status: CheckStatus::Fail,
                        details: error.to_string(),
                    });
                    checks.push(DoctorCheck {
                        name: "snapshot_census",
                        status: CheckStatus::Skipped,
                        details: "skipped because the snapshot did not load".to_string(),
                    });
                }
            }
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            checks.push(DoctorCheck {
                name: "snapshot_integrity",
                status: CheckStatus::Skipped,
                details: "skipped because configuration did not load".to_string(),
            });
            checks.push(DoctorCheck {
                name: "snapshot_census",
                status: CheckStatus::Skipped,
                details: "skipped because configuration did not load".to_string(),
            });
        }
    }

    let all_pass = checks.iter().all(|check| check.status == CheckStatus::Pass);
    let overall_status = if all_pass { CheckStatus::Pass } else { CheckStatus::Fail };
    let summary = if all_pass {
        "doctor: all readiness checks passed".to_string()
    } else {
        "doctor: one or more readiness checks failed".to_string()
    };

    DoctorReport { overall_status, summary, checks }
}

fn census_check(snapshot: &PolicySnapshot) -> DoctorCheck {
    DoctorCheck {
        name: "snapshot_census",
        status: CheckStatus::Pass,
        details: format!(
            "{} organization(s), {} policy(ies), {} assignment(s), {} region(s), {} continent(s), {} country(ies)",
            snapshot.organizations.len(),
            snapshot.policies.len(),
            snapshot.assignments.len(),
            snapshot.hierarchy.regions.len(),
            snapshot.hierarchy.continents.len(),
            snapshot.hierarchy.countries.len(),
        ),
    }
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = Vec::new();
    lines.push(report.summary.clone());

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}
