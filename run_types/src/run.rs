use crate::sample::Sample;
use serde::{Deserialize, Serialize};

/// Default barcode mismatch tolerance for both indexes.
pub const DEFAULT_BARCODE_MISMATCHES: u8 = 1;

/// Cycles allocated to each read segment of the run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunCycles {
    pub read1_cycles: u32,
    pub read2_cycles: u32,
    pub index1_cycles: u32,
    pub index2_cycles: u32,
}

impl RunCycles {
    pub fn new(read1_cycles: u32, read2_cycles: u32, index1_cycles: u32, index2_cycles: u32) -> Self {
        RunCycles {
            read1_cycles,
            read2_cycles,
            index1_cycles,
            index2_cycles,
        }
    }

    pub fn total_cycles(&self) -> u32 {
        self.read1_cycles + self.read2_cycles + self.index1_cycles + self.index2_cycles
    }
}

/// A configured sequencing run, read-only input to the validators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SequencingRun {
    pub id: String,
    pub run_name: String,
    /// Instrument name as it appears in the instrument catalog.
    pub instrument_platform: String,
    pub flowcell_type: String,
    pub run_cycles: Option<RunCycles>,
    pub barcode_mismatches_index1: u8,
    pub barcode_mismatches_index2: u8,
    pub samples: Vec<Sample>,
}

impl Default for SequencingRun {
    fn default() -> Self {
        SequencingRun {
            id: String::new(),
            run_name: String::new(),
            instrument_platform: String::new(),
            flowcell_type: String::new(),
            run_cycles: None,
            barcode_mismatches_index1: DEFAULT_BARCODE_MISMATCHES,
            barcode_mismatches_index2: DEFAULT_BARCODE_MISMATCHES,
            samples: Vec::new(),
        }
    }
}

impl SequencingRun {
    pub fn new(instrument_platform: impl Into<String>, flowcell_type: impl Into<String>) -> Self {
        SequencingRun {
            instrument_platform: instrument_platform.into(),
            flowcell_type: flowcell_type.into(),
            ..Default::default()
        }
    }

    pub fn with_samples(mut self, samples: Vec<Sample>) -> Self {
        self.samples = samples;
        self
    }

    pub fn with_run_cycles(mut self, run_cycles: RunCycles) -> Self {
        self.run_cycles = Some(run_cycles);
        self
    }

    /// True when at least one sample has an explicit lane assignment.
    pub fn has_explicit_lanes(&self) -> bool {
        self.samples.iter().any(|s| !s.lanes.is_empty())
    }
}
