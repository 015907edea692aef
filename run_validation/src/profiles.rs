//! Lookup of test profiles and version-constrained application profiles.

use crate::version::{Specifier, Version};
use log::debug;
use run_types::{ApplicationProfile, ApplicationProfileReference, TestProfile};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Source of the profiles a run's samples refer to. Lookups that find nothing
/// return `None`.
pub trait ProfileCatalog {
    /// The test profile whose `test_type` matches a sample's `test_id`.
    fn test_profile(&self, test_type: &str) -> Option<TestProfile>;

    /// The application profile called `name` that best satisfies `constraint`.
    fn application_profile(&self, name: &str, constraint: &str) -> Option<ApplicationProfile>;
}

/// An in-memory profile catalog, typically loaded from JSON.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileSet {
    pub test_profiles: Vec<TestProfile>,
    pub application_profiles: Vec<ApplicationProfile>,
}

impl ProfileCatalog for ProfileSet {
    fn test_profile(&self, test_type: &str) -> Option<TestProfile> {
        self.test_profiles
            .iter()
            .find(|p| p.test_type == test_type)
            .cloned()
    }

    fn application_profile(&self, name: &str, constraint: &str) -> Option<ApplicationProfile> {
        let candidates: Vec<&ApplicationProfile> = self
            .application_profiles
            .iter()
            .filter(|p| p.name == name)
            .collect();
        resolve_best_match(constraint, &candidates).cloned()
    }
}

/// Pick the candidate with the highest version satisfying `constraint`.
///
/// A constraint that does not parse as one (a bare `1.0.0`, say) is matched
/// against candidate versions as an exact string instead. Candidates whose
/// version does not parse never satisfy a parsed constraint. Among equal
/// versions the first listed wins.
pub fn resolve_best_match<'a>(
    constraint: &str,
    candidates: &[&'a ApplicationProfile],
) -> Option<&'a ApplicationProfile> {
    let specifier: Specifier = match constraint.parse() {
        Ok(specifier) => specifier,
        Err(err) => {
            debug!("{err}, matching '{constraint}' as an exact version");
            return candidates.iter().copied().find(|p| p.version == constraint);
        }
    };
    candidates
        .iter()
        .rev()
        .filter_map(|&p| {
            let version: Version = p.version.parse().ok()?;
            specifier.contains(&version).then_some((version, p))
        })
        .max_by(|(a, _), (b, _)| a.cmp(b))
        .map(|(_, p)| p)
}

/// Resolve every reference against `profiles`. The result has one entry per
/// distinct reference, `None` where nothing matched.
pub fn resolve_application_profiles<'a>(
    references: &[ApplicationProfileReference],
    profiles: &'a [ApplicationProfile],
) -> BTreeMap<ApplicationProfileReference, Option<&'a ApplicationProfile>> {
    let mut by_name: BTreeMap<&str, Vec<&'a ApplicationProfile>> = BTreeMap::new();
    for profile in profiles {
        by_name.entry(profile.name.as_str()).or_default().push(profile);
    }
    references
        .iter()
        .map(|r| {
            let resolved = by_name
                .get(r.profile_name.as_str())
                .and_then(|candidates| resolve_best_match(&r.profile_version, candidates));
            (r.clone(), resolved)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn profile(name: &str, version: &str) -> ApplicationProfile {
        ApplicationProfile {
            name: name.to_string(),
            version: version.to_string(),
            application_name: "BCLConvert".to_string(),
            software_version: format!("sw-{version}"),
            ..Default::default()
        }
    }

    fn versions(profiles: &[ApplicationProfile]) -> Vec<&ApplicationProfile> {
        profiles.iter().collect()
    }

    #[test]
    fn test_compatible_release_picks_highest_patch() {
        let profiles = vec![
            profile("BCLConvertNextera", "1.0.0"),
            profile("BCLConvertNextera", "1.0.5"),
            profile("BCLConvertNextera", "1.1.0"),
        ];
        let best = resolve_best_match("~=1.0.0", &versions(&profiles)).unwrap();
        assert_eq!(best.version, "1.0.5");
    }

    #[test]
    fn test_exact_string_fallback() {
        let profiles = vec![profile("P", "1.0"), profile("P", "1.0.0")];
        assert_eq!(
            resolve_best_match("1.0.0", &versions(&profiles)).unwrap().version,
            "1.0.0"
        );
        assert!(resolve_best_match("2.0", &versions(&profiles)).is_none());
        assert_eq!(
            resolve_best_match("not a version", &[&profile("P", "not a version")])
                .unwrap()
                .version,
            "not a version"
        );
    }

    #[test]
    fn test_unparseable_candidates_skipped() {
        let profiles = vec![profile("P", "latest"), profile("P", "1.2")];
        assert_eq!(
            resolve_best_match(">=1.0", &versions(&profiles)).unwrap().version,
            "1.2"
        );
        assert!(resolve_best_match(">=2.0", &versions(&profiles)).is_none());
    }

    #[test]
    fn test_ties_keep_first() {
        let profiles = vec![profile("P", "1.0"), profile("P", "1.0.0")];
        assert_eq!(
            resolve_best_match("==1.0", &versions(&profiles)).unwrap().version,
            "1.0"
        );
    }

    #[test]
    fn test_profile_set_lookup() {
        let set = ProfileSet {
            test_profiles: vec![TestProfile {
                test_type: "WGS".to_string(),
                application_profiles: vec![ApplicationProfileReference::new("P", "~=1.0")],
                ..Default::default()
            }],
            application_profiles: vec![profile("P", "1.0"), profile("P", "1.4"), profile("Q", "9.0")],
        };
        assert!(set.test_profile("RNA").is_none());
        assert_eq!(set.test_profile("WGS").unwrap().application_profiles.len(), 1);
        assert_eq!(set.application_profile("P", "~=1.0").unwrap().version, "1.4");
        assert!(set.application_profile("Q", "~=1.0").is_none());
        assert!(set.application_profile("R", "").is_none());
    }

    #[test]
    fn test_resolve_application_profiles() {
        let profiles = vec![profile("P", "1.0.0"), profile("P", "2.0.0")];
        let refs = vec![
            ApplicationProfileReference::new("P", ">=1.0"),
            ApplicationProfileReference::new("P", "1.0.0"),
            ApplicationProfileReference::new("Missing", ">=1.0"),
        ];
        let resolved = resolve_application_profiles(&refs, &profiles);
        assert_eq!(resolved.len(), 3);
        assert_eq!(resolved[&refs[0]].map(|p| p.version.as_str()), Some("2.0.0"));
        assert_eq!(resolved[&refs[1]].map(|p| p.version.as_str()), Some("1.0.0"));
        assert_eq!(resolved[&refs[2]], None);
    }

    #[test]
    fn test_profile_set_from_json() {
        let set: ProfileSet = serde_json::from_str(
            r#"{
                "test_profiles": [{
                    "test_type": "WGS",
                    "application_profiles": [{"profile_name": "P", "profile_version": "~=1.0"}]
                }],
                "application_profiles": [{
                    "name": "P",
                    "version": "1.0.2",
                    "application_name": "DragenGermline",
                    "software_version": "4.2.7"
                }]
            }"#,
        )
        .unwrap();
        assert_eq!(
            set.application_profile("P", "~=1.0").unwrap().software_version,
            "4.2.7"
        );
    }
}
