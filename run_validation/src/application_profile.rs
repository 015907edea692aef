//! Whether each sample's requested pipelines can run on the instrument.

use crate::profiles::ProfileCatalog;
use fxhash::{FxHashMap, FxHashSet};
use itertools::Itertools;
use run_types::{
    ApplicationErrorKind, ApplicationProfile, ApplicationValidationError, InstrumentCapabilities,
    Sample, SequencingRun, TestProfile,
};
use std::collections::{BTreeMap, BTreeSet};

/// Catalog lookups made once per distinct key.
struct CachedCatalog<'a> {
    catalog: &'a dyn ProfileCatalog,
    test_profiles: FxHashMap<String, Option<TestProfile>>,
    app_profiles: FxHashMap<(String, String), Option<ApplicationProfile>>,
}

impl<'a> CachedCatalog<'a> {
    fn new(catalog: &'a dyn ProfileCatalog) -> Self {
        CachedCatalog {
            catalog,
            test_profiles: FxHashMap::default(),
            app_profiles: FxHashMap::default(),
        }
    }

    fn test_profile(&mut self, test_type: &str) -> Option<TestProfile> {
        let catalog = self.catalog;
        self.test_profiles
            .entry(test_type.to_string())
            .or_insert_with(|| catalog.test_profile(test_type))
            .clone()
    }

    fn application_profile(&mut self, name: &str, constraint: &str) -> Option<ApplicationProfile> {
        let catalog = self.catalog;
        self.app_profiles
            .entry((name.to_string(), constraint.to_string()))
            .or_insert_with(|| catalog.application_profile(name, constraint))
            .clone()
    }
}

fn sample_error(
    sample: &Sample,
    error_type: ApplicationErrorKind,
    application_name: &str,
    profile_name: &str,
    detail: String,
) -> ApplicationValidationError {
    ApplicationValidationError {
        sample_id: sample.id.clone(),
        sample_name: sample.display_name().to_string(),
        test_id: sample.test_id.clone(),
        application_name: application_name.to_string(),
        profile_name: profile_name.to_string(),
        error_type,
        detail,
    }
}

/// Check every sample's test profile against the catalog and the instrument's
/// onboard applications. A missing test profile is reported once per test
/// type. An application required at more than one software version across
/// the run is reported once as a run-level conflict.
pub fn validate_application_profiles(
    run: &SequencingRun,
    instrument: &InstrumentCapabilities,
    catalog: &dyn ProfileCatalog,
) -> Vec<ApplicationValidationError> {
    let instrument_name = &instrument.name;
    let available = instrument.application_versions();
    let mut catalog = CachedCatalog::new(catalog);
    let mut missing_tests: FxHashSet<&str> = FxHashSet::default();
    // application -> software version -> profiles requiring it
    let mut required: BTreeMap<String, BTreeMap<String, BTreeSet<String>>> = BTreeMap::new();
    let mut errors = Vec::new();

    for sample in run.samples.iter().filter(|s| !s.test_id.is_empty()) {
        let Some(test_profile) = catalog.test_profile(&sample.test_id) else {
            if missing_tests.insert(&sample.test_id) {
                errors.push(sample_error(
                    sample,
                    ApplicationErrorKind::TestProfileNotFound,
                    "",
                    "",
                    format!("No test profile found for test type '{}'", sample.test_id),
                ));
            }
            continue;
        };

        for reference in &test_profile.application_profiles {
            let profile_name = &reference.profile_name;
            let Some(profile) =
                catalog.application_profile(profile_name, &reference.profile_version)
            else {
                errors.push(sample_error(
                    sample,
                    ApplicationErrorKind::ProfileNotFound,
                    "",
                    profile_name,
                    format!(
                        "Application profile '{profile_name}' version '{}' not found",
                        reference.profile_version
                    ),
                ));
                continue;
            };

            let app_name = profile.application_name.as_str();
            let Some(installed) = available.get(app_name) else {
                errors.push(sample_error(
                    sample,
                    ApplicationErrorKind::AppNotAvailable,
                    app_name,
                    profile_name,
                    format!(
                        "Application '{app_name}' (from profile '{profile_name}') \
                         is not available on {instrument_name}"
                    ),
                ));
                continue;
            };

            let sw_version = profile.software_version.as_str();
            if sw_version.is_empty() {
                continue;
            }
            if !installed.contains(sw_version) {
                errors.push(sample_error(
                    sample,
                    ApplicationErrorKind::VersionNotAvailable,
                    app_name,
                    profile_name,
                    format!(
                        "Application '{app_name}' version '{sw_version}' \
                         (from profile '{profile_name}') is not available on \
                         {instrument_name}. Available: {}",
                        installed.iter().join(", ")
                    ),
                ));
            }
            required
                .entry(app_name.to_string())
                .or_default()
                .entry(sw_version.to_string())
                .or_default()
                .insert(profile_name.clone());
        }
    }

    for (app_name, versions) in required {
        if versions.len() < 2 {
            continue;
        }
        let detail = versions
            .iter()
            .map(|(version, profiles)| format!("{version} (from {})", profiles.iter().join(", ")))
            .join(", ");
        errors.push(ApplicationValidationError {
            sample_id: String::new(),
            sample_name: String::new(),
            test_id: String::new(),
            application_name: app_name.clone(),
            profile_name: String::new(),
            error_type: ApplicationErrorKind::VersionConflict,
            detail: format!(
                "Application '{app_name}' requires multiple versions across samples: {detail}. \
                 All samples in a run must use the same version."
            ),
        });
    }

    errors
}
