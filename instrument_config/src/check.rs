//! Sanity checks on instrument definitions before they are used.

use crate::catalog::InstrumentCatalog;
use crate::definition::InstrumentDefinition;
use fxhash::FxHashMap;
use run_types::{ChemistryType, Severity};
use std::fmt;

const VALID_BASES: [&str; 4] = ["A", "C", "G", "T"];
const VALID_DYE_CHANNELS: [&str; 4] = ["Blue", "Green", "Red", "Yellow"];
const SAMPLESHEET_VERSIONS: [u32; 2] = [1, 2];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefinitionIssue {
    pub field: String,
    pub message: String,
    pub value: Option<String>,
}

impl fmt::Display for DefinitionIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) => write!(f, "{}: {} (got: '{value}')", self.field, self.message),
            None => write!(f, "{}: {}", self.field, self.message),
        }
    }
}

/// Findings for one instrument definition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DefinitionReport {
    pub instrument_name: String,
    pub errors: Vec<DefinitionIssue>,
    pub warnings: Vec<DefinitionIssue>,
}

impl DefinitionReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn add(&mut self, severity: Severity, field: &str, message: String, value: Option<String>) {
        let issue = DefinitionIssue {
            field: field.to_string(),
            message,
            value,
        };
        match severity {
            Severity::Error => self.errors.push(issue),
            Severity::Warning => self.warnings.push(issue),
        }
    }

    fn error(&mut self, field: &str, message: impl Into<String>) {
        self.add(Severity::Error, field, message.into(), None);
    }

    fn error_value(&mut self, field: &str, message: impl Into<String>, value: impl ToString) {
        self.add(Severity::Error, field, message.into(), Some(value.to_string()));
    }

    fn warning(&mut self, field: &str, message: impl Into<String>) {
        self.add(Severity::Warning, field, message.into(), None);
    }
}

pub fn validate_definition(def: &InstrumentDefinition) -> DefinitionReport {
    let mut report = DefinitionReport {
        instrument_name: def.name.clone(),
        ..Default::default()
    };

    if def.name.is_empty() {
        report.error("name", "Instrument name is required");
    }
    if def.samplesheet_name.is_empty() {
        report.error("samplesheet_name", "Samplesheet name is required");
    }
    if def.version.is_empty() {
        report.warning("version", "Version field is missing or empty");
    }
    if def.chemistry_type == ChemistryType::TwoColor && def.color_balance_enabled {
        check_color_balance(def, &mut report);
    }
    check_flowcells(def, &mut report);

    for app in &def.onboard_applications {
        if app.name.is_empty() {
            report.error("onboard_application", "Application name cannot be empty");
        }
    }
    for &version in &def.samplesheet_versions {
        if !SAMPLESHEET_VERSIONS.contains(&version) {
            report.error(
                "samplesheet_versions",
                format!("Invalid version: {version}. Supported versions are: [1, 2]"),
            );
        }
    }
    report
}

fn check_bases(report: &mut DefinitionReport, field: &str, bases: &[String]) {
    for base in bases {
        if !VALID_BASES.contains(&base.as_str()) {
            report.error(field, format!("Invalid base: {base}"));
        }
    }
}

fn check_color_balance(def: &InstrumentDefinition, report: &mut DefinitionReport) {
    if def.dye_channels.is_empty() {
        report.warning(
            "dye_channels",
            "Missing dye_channels for 2-color instrument with color_balance_enabled",
        );
    }
    for channel in &def.dye_channels {
        if !VALID_DYE_CHANNELS.contains(&channel.as_str()) {
            report.warning("dye_channels", format!("Unusual channel name: {channel}"));
        }
    }
    for (field, bases) in [
        ("channel1_bases", &def.channel1_bases),
        ("channel2_bases", &def.channel2_bases),
    ] {
        if bases.is_empty() {
            report.warning(field, format!("Missing {field}"));
        }
        check_bases(report, field, bases);
    }
    if !def.dark_base.is_empty() && !VALID_BASES.contains(&def.dark_base.as_str()) {
        report.error("dark_base", format!("Invalid base: {}", def.dark_base));
    }
}

fn check_flowcells(def: &InstrumentDefinition, report: &mut DefinitionReport) {
    if def.flowcells.is_empty() {
        report.error("flowcells", "At least one flowcell must be defined");
        return;
    }
    for fc in &def.flowcells {
        if fc.name.is_empty() {
            report.error("flowcells", "Flowcell name cannot be empty");
            continue;
        }
        if fc.lanes < 1 {
            report.error_value(
                &format!("flowcells.{}.lanes", fc.name),
                "Must be a positive integer",
                fc.lanes,
            );
        }
        if let Some(kit) = fc.reagent_kits.iter().find(|&&kit| kit == 0) {
            report.error_value(
                &format!("flowcells.{}.reagent_kits", fc.name),
                "All reagent kit values must be positive integers",
                kit,
            );
        }
    }
}

/// Check every definition, and that instrument names are unique. A duplicate
/// name is reported on each definition that shares it.
pub fn validate_catalog(catalog: &InstrumentCatalog) -> Vec<DefinitionReport> {
    let mut reports: Vec<DefinitionReport> =
        catalog.instrument.iter().map(validate_definition).collect();

    let mut by_name: FxHashMap<&str, Vec<usize>> = FxHashMap::default();
    for (i, def) in catalog.instrument.iter().enumerate() {
        if !def.name.is_empty() {
            by_name.entry(def.name.as_str()).or_default().push(i);
        }
    }
    let mut duplicated: Vec<usize> = by_name
        .into_values()
        .filter(|indices| indices.len() > 1)
        .flatten()
        .collect();
    duplicated.sort_unstable();
    for i in duplicated {
        reports[i].error("name", "Duplicate instrument name");
    }
    reports
}

/// Render reports for a terminal, skipping clean definitions.
pub fn format_reports(reports: &[DefinitionReport]) -> String {
    let mut lines = Vec::new();
    let (mut errors, mut warnings) = (0, 0);

    for report in reports {
        if report.errors.is_empty() && report.warnings.is_empty() {
            continue;
        }
        let header = if report.instrument_name.is_empty() {
            "Unknown instrument"
        } else {
            report.instrument_name.as_str()
        };
        lines.push(format!("{header}:"));
        for error in &report.errors {
            lines.push(format!("  ERROR: {error}"));
        }
        for warning in &report.warnings {
            lines.push(format!("  WARNING: {warning}"));
        }
        errors += report.errors.len();
        warnings += report.warnings.len();
    }

    if lines.is_empty() {
        return "All instruments validated successfully.".to_string();
    }
    lines.push(format!(
        "Validation complete: {errors} error(s), {warnings} warning(s)"
    ));
    lines.join("\n")
}
