use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Points a test profile at an application profile by name and version constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationProfileReference {
    pub profile_name: String,
    /// Version constraint such as `~=1.0.0`, or a bare version.
    pub profile_version: String,
}

impl ApplicationProfileReference {
    pub fn new(profile_name: impl Into<String>, profile_version: impl Into<String>) -> Self {
        ApplicationProfileReference {
            profile_name: profile_name.into(),
            profile_version: profile_version.into(),
        }
    }
}

/// A sequencing test type and the application profiles it runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TestProfile {
    /// Matches `Sample::test_id`.
    pub test_type: String,
    pub test_name: String,
    pub description: String,
    pub version: String,
    pub application_profiles: Vec<ApplicationProfileReference>,
}

/// A concrete, versioned pipeline configuration for one onboard application.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationProfile {
    pub name: String,
    pub version: String,
    /// e.g. `Dragen`.
    pub application_type: String,
    /// e.g. `DragenGermline` or `BCLConvert`.
    pub application_name: String,
    /// Software version the profile requires. Empty when unconstrained.
    pub software_version: String,
    /// Sample sheet `Settings` section. Required for Dragen applications.
    pub settings: Option<Map<String, Value>>,
    /// Sample sheet `Data` section defaults.
    pub data: Option<Map<String, Value>>,
    /// Column names of the `Data` section.
    pub data_fields: Option<Vec<String>>,
}
