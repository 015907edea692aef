//! Records produced by the run validators.
//!
//! Every problem the engine detects is a value in [`ValidationResult`]; nothing
//! here is raised as an error.

use crate::instrument::{ChannelConfig, ChemistryType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use strum_macros::{Display, EnumIter, EnumString};

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Severity {
    /// The run must not be approved or exported.
    Error,
    /// Informational, does not block approval.
    Warning,
}

/// Which index read a record refers to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display,
)]
pub enum IndexKind {
    #[strum(to_string = "i7")]
    #[serde(rename = "i7")]
    I7,
    #[strum(to_string = "i5")]
    #[serde(rename = "i5")]
    I5,
    /// i7 and i5 compared together.
    #[strum(to_string = "i7+i5")]
    #[serde(rename = "i7+i5")]
    Combined,
}

/// Two samples in one lane whose indexes are too close to demultiplex safely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexCollision {
    pub sample1_id: String,
    pub sample1_name: String,
    pub sample2_id: String,
    pub sample2_name: String,
    pub lane: u32,
    pub index_type: IndexKind,
    /// For combined collisions, `i7+i5` of the first sample.
    pub sequence1: String,
    pub sequence2: String,
    pub hamming_distance: usize,
    pub mismatch_threshold: usize,
}

impl IndexCollision {
    pub fn description(&self) -> String {
        format!(
            "{} collision in lane {}: {} ({}) vs {} ({}) - distance {} <= threshold {}",
            self.index_type,
            self.lane,
            self.sample1_name,
            self.sequence1,
            self.sample2_name,
            self.sequence2,
            self.hamming_distance,
            self.mismatch_threshold
        )
    }
}

/// Square matrix of pairwise distances, `None` on the diagonal and wherever a
/// distance is undefined.
pub type DistanceGrid = Vec<Vec<Option<usize>>>;

/// Pairwise index distances for every indexed sample in one lane.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexDistanceMatrix {
    pub sample_ids: Vec<String>,
    pub sample_names: Vec<String>,
    pub i7_distances: DistanceGrid,
    pub i5_distances: DistanceGrid,
    pub combined_distances: DistanceGrid,
}

impl IndexDistanceMatrix {
    pub fn len(&self) -> usize {
        self.sample_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sample_ids.is_empty()
    }

    pub fn i7_distance(&self, i: usize, j: usize) -> Option<usize> {
        cell(&self.i7_distances, i, j)
    }

    pub fn i5_distance(&self, i: usize, j: usize) -> Option<usize> {
        cell(&self.i5_distances, i, j)
    }

    pub fn combined_distance(&self, i: usize, j: usize) -> Option<usize> {
        cell(&self.combined_distances, i, j)
    }
}

fn cell(grid: &DistanceGrid, i: usize, j: usize) -> Option<usize> {
    grid.get(i).and_then(|row| row.get(j)).copied().flatten()
}

/// An index whose first two cycles are both the dark base.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DarkCycleError {
    pub sample_id: String,
    pub sample_name: String,
    pub index_type: IndexKind,
    /// The index as stored on the sample.
    pub sequence: String,
    pub dark_base: char,
}

impl DarkCycleError {
    pub fn description(&self) -> String {
        format!(
            "{}: {} index ({}) starts with two dark bases ({}{})",
            self.sample_name, self.index_type, self.sequence, self.dark_base, self.dark_base
        )
    }
}

/// Leading dark-base diagnostics for one sample.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleDarkCycleInfo {
    pub sample_id: String,
    pub sample_name: String,
    pub i7_sequence: String,
    /// i5 as stored on the sample.
    pub i5_sequence: String,
    /// i5 as the instrument reads it.
    pub i5_read_sequence: String,
    pub dark_base: char,
    /// 0, 1 or 2.
    pub i7_leading_dark: usize,
    pub i5_leading_dark: usize,
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ColorBalanceStatus {
    #[default]
    Ok,
    Warning,
    Error,
}

/// Base composition and channel signal at one index cycle across a lane.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionColorBalance {
    /// 1-based cycle.
    pub position: usize,
    pub a_count: usize,
    pub c_count: usize,
    pub g_count: usize,
    pub t_count: usize,
    pub channel1_count: usize,
    pub channel2_count: usize,
    pub status: ColorBalanceStatus,
}

impl PositionColorBalance {
    pub fn total(&self) -> usize {
        self.a_count + self.c_count + self.g_count + self.t_count
    }

    pub fn channel1_percent(&self) -> f64 {
        percent(self.channel1_count, self.total())
    }

    pub fn channel2_percent(&self) -> f64 {
        percent(self.channel2_count, self.total())
    }
}

fn percent(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 * 100.0 / total as f64
    }
}

/// Color balance of every cycle of one index read in a lane.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexColorBalance {
    pub index_type: IndexKind,
    pub positions: Vec<PositionColorBalance>,
}

impl IndexColorBalance {
    pub fn max_position(&self) -> usize {
        self.positions.iter().map(|p| p.position).max().unwrap_or(0)
    }

    pub fn has_issues(&self) -> bool {
        self.positions
            .iter()
            .any(|p| p.status != ColorBalanceStatus::Ok)
    }

    pub fn error_count(&self) -> usize {
        self.count_status(ColorBalanceStatus::Error)
    }

    pub fn warning_count(&self) -> usize {
        self.count_status(ColorBalanceStatus::Warning)
    }

    fn count_status(&self, status: ColorBalanceStatus) -> usize {
        self.positions.iter().filter(|p| p.status == status).count()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaneColorBalance {
    pub lane: u32,
    /// Indexed samples in the lane.
    pub sample_count: usize,
    pub i7_balance: Option<IndexColorBalance>,
    pub i5_balance: Option<IndexColorBalance>,
}

impl LaneColorBalance {
    pub fn has_issues(&self) -> bool {
        [&self.i7_balance, &self.i5_balance]
            .into_iter()
            .flatten()
            .any(IndexColorBalance::has_issues)
    }
}

/// Structural check that produced a [`ConfigurationError`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ConfigCategory {
    InvalidSampleId,
    LaneOutOfRange,
    NoLaneAssignment,
    IndexLengthMismatch,
    MixedIndexing,
    IndexExceedsCycles,
    DuplicateIndexPair,
    MismatchThresholdRisk,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigurationError {
    pub severity: Severity,
    pub category: ConfigCategory,
    pub message: String,
    /// Affected samples, by display name.
    pub sample_names: Vec<String>,
    pub lane: Option<u32>,
}

impl ConfigurationError {
    pub fn error(category: ConfigCategory, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, category, message)
    }

    pub fn warning(category: ConfigCategory, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, category, message)
    }

    fn new(severity: Severity, category: ConfigCategory, message: impl Into<String>) -> Self {
        ConfigurationError {
            severity,
            category,
            message: message.into(),
            sample_names: Vec::new(),
            lane: None,
        }
    }

    pub fn with_samples(mut self, sample_names: Vec<String>) -> Self {
        self.sample_names = sample_names;
        self
    }

    pub fn in_lane(mut self, lane: u32) -> Self {
        self.lane = Some(lane);
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ApplicationErrorKind {
    TestProfileNotFound,
    ProfileNotFound,
    AppNotAvailable,
    VersionNotAvailable,
    VersionConflict,
}

/// A sample's requested pipeline cannot run on the instrument as configured.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationValidationError {
    /// Empty for run-level errors.
    pub sample_id: String,
    pub sample_name: String,
    pub test_id: String,
    pub application_name: String,
    pub profile_name: String,
    pub error_type: ApplicationErrorKind,
    pub detail: String,
}

/// Everything the validators found for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub duplicate_sample_ids: Vec<String>,
    pub index_collisions: Vec<IndexCollision>,
    pub distance_matrices: BTreeMap<u32, IndexDistanceMatrix>,
    pub dark_cycle_errors: Vec<DarkCycleError>,
    pub dark_cycle_samples: Vec<SampleDarkCycleInfo>,
    pub color_balance: BTreeMap<u32, LaneColorBalance>,
    pub application_errors: Vec<ApplicationValidationError>,
    pub configuration_errors: Vec<ConfigurationError>,
    pub chemistry_type: Option<ChemistryType>,
    pub color_balance_enabled: bool,
    pub channel_config: Option<ChannelConfig>,
}

impl ValidationResult {
    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }

    pub fn error_count(&self) -> usize {
        self.duplicate_sample_ids.len()
            + self.index_collisions.len()
            + self.dark_cycle_errors.len()
            + self.application_errors.len()
            + self
                .configuration_errors
                .iter()
                .filter(|e| e.is_error())
                .count()
    }

    pub fn warning_count(&self) -> usize {
        self.configuration_errors
            .iter()
            .filter(|e| e.severity == Severity::Warning)
            .count()
    }

    /// Number of lanes with at least one unbalanced cycle.
    pub fn color_balance_issue_count(&self) -> usize {
        self.color_balance
            .values()
            .filter(|lane| lane.has_issues())
            .count()
    }

    pub fn lane_matrix(&self, lane: u32) -> Option<&IndexDistanceMatrix> {
        self.distance_matrices.get(&lane)
    }

    pub fn lane_color_balance(&self, lane: u32) -> Option<&LaneColorBalance> {
        self.color_balance.get(&lane)
    }
}
