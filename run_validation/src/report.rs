//! Flat, serializable summary of a [`ValidationResult`].

use run_types::{ChemistryType, SequencingRun, Severity, ValidationResult};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportSummary {
    pub error_count: usize,
    pub warning_count: usize,
    pub collision_count: usize,
    pub dark_cycle_error_count: usize,
    pub application_error_count: usize,
    pub configuration_error_count: usize,
    pub color_balance_issue_lanes: usize,
}

/// One problem, whatever validator found it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportIssue {
    pub severity: Severity,
    pub category: String,
    pub message: String,
}

impl ReportIssue {
    fn new(severity: Severity, category: impl ToString, message: String) -> Self {
        ReportIssue {
            severity,
            category: category.to_string(),
            message,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub run_id: String,
    pub run_name: String,
    pub instrument: String,
    pub flowcell: String,
    pub chemistry_type: Option<ChemistryType>,
    pub summary: ReportSummary,
    pub issues: Vec<ReportIssue>,
}

impl ValidationReport {
    pub fn new(run: &SequencingRun, result: &ValidationResult) -> Self {
        let summary = ReportSummary {
            error_count: result.error_count(),
            warning_count: result.warning_count(),
            collision_count: result.index_collisions.len(),
            dark_cycle_error_count: result.dark_cycle_errors.len(),
            application_error_count: result.application_errors.len(),
            configuration_error_count: result.configuration_errors.len(),
            color_balance_issue_lanes: result.color_balance_issue_count(),
        };

        let duplicates = result
            .duplicate_sample_ids
            .iter()
            .map(|msg| ReportIssue::new(Severity::Error, "duplicate_sample_id", msg.clone()));
        let collisions = result
            .index_collisions
            .iter()
            .map(|c| ReportIssue::new(Severity::Error, "index_collision", c.description()));
        let dark_cycles = result
            .dark_cycle_errors
            .iter()
            .map(|e| ReportIssue::new(Severity::Error, "dark_cycle", e.description()));
        let applications = result.application_errors.iter().map(|e| {
            let message = if e.sample_name.is_empty() {
                e.detail.clone()
            } else {
                format!("{}: {}", e.sample_name, e.detail)
            };
            ReportIssue::new(Severity::Error, e.error_type, message)
        });
        let configuration = result
            .configuration_errors
            .iter()
            .map(|e| ReportIssue::new(e.severity, e.category, e.message.clone()));

        ValidationReport {
            run_id: run.id.clone(),
            run_name: run.run_name.clone(),
            instrument: run.instrument_platform.clone(),
            flowcell: run.flowcell_type.clone(),
            chemistry_type: result.chemistry_type,
            summary,
            issues: duplicates
                .chain(collisions)
                .chain(dark_cycles)
                .chain(applications)
                .chain(configuration)
                .collect(),
        }
    }
}
