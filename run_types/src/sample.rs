use serde::{Deserialize, Serialize};

/// A named index (barcode) sequence from an index kit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct Index {
    pub name: String,
    pub sequence: String,
}

impl Index {
    pub fn new(name: impl Into<String>, sequence: impl Into<String>) -> Self {
        Index {
            name: name.into(),
            sequence: sequence.into(),
        }
    }
}

/// A sequencing sample with its lane assignment and assigned indexes.
///
/// Mismatch overrides and lanes are expected to have been clamped upstream
/// (mismatches to 0-3, lanes to positive integers).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Sample {
    /// Internal key, unique within a run.
    pub id: String,
    /// User-provided identifier, written to the sample sheet.
    pub sample_id: String,
    pub sample_name: String,
    /// Test type used to look up the sample's test profile.
    pub test_id: String,
    /// Explicit lane assignment. Empty means every lane of the flowcell.
    pub lanes: Vec<u32>,
    /// i7 index.
    pub index1: Option<Index>,
    /// i5 index.
    pub index2: Option<Index>,
    pub barcode_mismatches_index1: Option<u8>,
    pub barcode_mismatches_index2: Option<u8>,
}

impl Sample {
    /// Name shown to users: the sample ID, else the sample name, else the internal key.
    pub fn display_name(&self) -> &str {
        [&self.sample_id, &self.sample_name]
            .into_iter()
            .find(|s| !s.is_empty())
            .unwrap_or(&self.id)
    }

    /// The i7 sequence, if one is assigned and non-empty.
    pub fn index1_sequence(&self) -> Option<&str> {
        non_empty_sequence(self.index1.as_ref())
    }

    /// The i5 sequence, if one is assigned and non-empty.
    pub fn index2_sequence(&self) -> Option<&str> {
        non_empty_sequence(self.index2.as_ref())
    }

    pub fn index1_name(&self) -> Option<&str> {
        self.index1.as_ref().map(|x| x.name.as_str())
    }

    pub fn index2_name(&self) -> Option<&str> {
        self.index2.as_ref().map(|x| x.name.as_str())
    }

    /// True when the sample has an i7 sequence. An i5 on its own does not make
    /// a sample indexed.
    pub fn has_index(&self) -> bool {
        self.index1_sequence().is_some()
    }

    /// True when the sample has both an i7 and an i5 sequence.
    pub fn is_dual_indexed(&self) -> bool {
        self.has_index() && self.index2_sequence().is_some()
    }

    /// True when the sample has no explicit lanes and therefore goes to every lane.
    pub fn in_all_lanes(&self) -> bool {
        self.lanes.is_empty()
    }

    /// Mismatch tolerance used when demultiplexing i7 for this sample.
    pub fn effective_mismatches_index1(&self, run_default: u8) -> u8 {
        self.barcode_mismatches_index1.unwrap_or(run_default)
    }

    /// Mismatch tolerance used when demultiplexing i5 for this sample.
    pub fn effective_mismatches_index2(&self, run_default: u8) -> u8 {
        self.barcode_mismatches_index2.unwrap_or(run_default)
    }

    /// Display string for the lane assignment, e.g. `"1,2"` or `"All"`.
    pub fn lanes_display(&self) -> String {
        if self.lanes.is_empty() {
            return "All".to_string();
        }
        let mut lanes = self.lanes.clone();
        lanes.sort_unstable();
        lanes
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",")
    }
}

fn non_empty_sequence(index: Option<&Index>) -> Option<&str> {
    index
        .map(|x| x.sequence.as_str())
        .filter(|seq| !seq.is_empty())
}
