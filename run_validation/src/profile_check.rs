//! Checks on test and application profile definitions, so that a malformed
//! profile is reported up front instead of silently failing to resolve.

use crate::profiles::ProfileSet;
use crate::version::{Specifier, Version};
use fxhash::FxHashSet;
use run_types::{ApplicationProfile, TestProfile};
use std::fmt;

/// One finding, scoped to a field of the profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileIssue {
    pub field: String,
    pub message: String,
    pub value: Option<String>,
}

impl fmt::Display for ProfileIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) => write!(f, "{}: {} (got: '{value}')", self.field, self.message),
            None => write!(f, "{}: {}", self.field, self.message),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileKind {
    Test,
    Application,
}

/// Findings for one profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileReport {
    pub kind: ProfileKind,
    /// `test_type` of a test profile, `name version` of an application profile.
    pub profile: String,
    pub errors: Vec<ProfileIssue>,
    pub warnings: Vec<ProfileIssue>,
}

impl ProfileReport {
    fn new(kind: ProfileKind, profile: String) -> Self {
        ProfileReport {
            kind,
            profile,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, field: impl Into<String>, message: &str, value: Option<&str>) {
        self.errors.push(ProfileIssue {
            field: field.into(),
            message: message.to_string(),
            value: value.map(str::to_string),
        });
    }

    fn warning(&mut self, field: &str, message: &str) {
        self.warnings.push(ProfileIssue {
            field: field.to_string(),
            message: message.to_string(),
            value: None,
        });
    }

    fn require(&mut self, field: &str, value: &str) -> bool {
        let present = !value.trim().is_empty();
        if !present {
            self.error(field, "Must not be empty", None);
        }
        present
    }

    fn require_version(&mut self, field: &str, value: &str) {
        if self.require(field, value) && value.trim().parse::<Version>().is_err() {
            self.error(field, "Not a valid version", Some(value));
        }
    }

    fn header(&self) -> String {
        let kind = match self.kind {
            ProfileKind::Test => "Test profile",
            ProfileKind::Application => "Application profile",
        };
        if self.profile.trim().is_empty() {
            format!("{kind} (unnamed)")
        } else {
            format!("{kind} {}", self.profile)
        }
    }
}

/// A version constraint is either a specifier set or a bare version.
fn is_version_constraint(value: &str) -> bool {
    value.parse::<Specifier>().is_ok() || value.parse::<Version>().is_ok()
}

pub fn validate_test_profile(profile: &TestProfile) -> ProfileReport {
    let mut report = ProfileReport::new(ProfileKind::Test, profile.test_type.clone());
    report.require("test_type", &profile.test_type);
    report.require("test_name", &profile.test_name);
    report.require("description", &profile.description);
    report.require_version("version", &profile.version);

    if profile.application_profiles.is_empty() {
        report.error(
            "application_profiles",
            "Must contain at least one entry",
            None,
        );
    }
    for (i, reference) in profile.application_profiles.iter().enumerate() {
        let field = format!("application_profiles[{i}]");
        if reference.profile_name.trim().is_empty() {
            report.error(format!("{field}.profile_name"), "Must not be empty", None);
        }
        let constraint = reference.profile_version.trim();
        if constraint.is_empty() {
            report.error(format!("{field}.profile_version"), "Must not be empty", None);
        } else if !is_version_constraint(constraint) {
            report.error(
                format!("{field}.profile_version"),
                "Not a valid version or version specifier",
                Some(&reference.profile_version),
            );
        }
    }
    report
}

pub fn validate_application_profile(profile: &ApplicationProfile) -> ProfileReport {
    let mut report = ProfileReport::new(
        ProfileKind::Application,
        format!("{} {}", profile.name, profile.version).trim().to_string(),
    );
    report.require("name", &profile.name);
    report.require_version("version", &profile.version);
    report.require("application_name", &profile.application_name);
    report.require("application_type", &profile.application_type);

    if profile.application_type.trim().eq_ignore_ascii_case("dragen") {
        for (field, present) in [
            ("settings", profile.settings.is_some()),
            ("data", profile.data.is_some()),
            ("data_fields", profile.data_fields.is_some()),
        ] {
            if !present {
                report.error(field, "Required for application type 'Dragen'", None);
            }
        }
    }
    report
}

/// Check every profile in `set`, test profiles first. A test type or an
/// application profile name and version listed more than once is flagged
/// on the later entries, which lookups never reach.
pub fn validate_profile_set(set: &ProfileSet) -> Vec<ProfileReport> {
    let mut seen_tests: FxHashSet<&str> = FxHashSet::default();
    let mut reports: Vec<ProfileReport> = Vec::new();
    for profile in &set.test_profiles {
        let mut report = validate_test_profile(profile);
        if !profile.test_type.is_empty() && !seen_tests.insert(profile.test_type.as_str()) {
            report.warning("test_type", "Shadowed by an earlier test profile");
        }
        reports.push(report);
    }

    let mut seen_apps: FxHashSet<(&str, &str)> = FxHashSet::default();
    for profile in &set.application_profiles {
        let mut report = validate_application_profile(profile);
        if !profile.name.is_empty()
            && !seen_apps.insert((profile.name.as_str(), profile.version.as_str()))
        {
            report.warning("version", "Shadowed by an earlier profile with this version");
        }
        reports.push(report);
    }
    reports
}

/// Render reports for a terminal, skipping clean profiles.
pub fn format_profile_reports(reports: &[ProfileReport]) -> String {
    let mut lines = Vec::new();
    let (mut errors, mut warnings) = (0, 0);

    for report in reports {
        if report.errors.is_empty() && report.warnings.is_empty() {
            continue;
        }
        lines.push(format!("{}:", report.header()));
        lines.extend(report.errors.iter().map(|e| format!("  ERROR: {e}")));
        lines.extend(report.warnings.iter().map(|w| format!("  WARNING: {w}")));
        errors += report.errors.len();
        warnings += report.warnings.len();
    }

    if lines.is_empty() {
        return "All profiles validated successfully.".to_string();
    }
    lines.push(format!(
        "Validation complete: {errors} error(s), {warnings} warning(s)"
    ));
    lines.join("\n")
}
