//! Instrument definitions as written in an instrument file.

use run_types::{
    ChannelConfig, ChemistryType, I5Orientation, InstrumentCapabilities, OnboardApplication,
};
use serde::{Deserialize, Serialize};

fn default_lanes() -> u32 {
    1
}

fn default_samplesheet_versions() -> Vec<u32> {
    vec![2]
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowcellDefinition {
    pub name: String,
    #[serde(default = "default_lanes")]
    pub lanes: u32,
    /// Nominal read output of the flowcell.
    #[serde(default)]
    pub reads: u64,
    /// Supported reagent kit sizes, in cycles.
    #[serde(default)]
    pub reagent_kits: Vec<u32>,
    #[serde(default)]
    pub description: String,
}

/// One `[[instrument]]` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstrumentDefinition {
    pub name: String,
    /// Instrument name used in sample sheets, e.g. `NovaSeqXSeries`.
    #[serde(default)]
    pub samplesheet_name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub chemistry_type: ChemistryType,
    #[serde(default)]
    pub sbs_chemistry: String,
    #[serde(default)]
    pub has_dragen_onboard: bool,
    /// Orientation in which the instrument physically reads i5.
    #[serde(default)]
    pub i5_read_orientation: I5Orientation,
    /// Orientation BCL Convert expects for i5 in a v2 sample sheet.
    #[serde(default)]
    pub samplesheet_v2_i5_orientation: Option<I5Orientation>,
    #[serde(default)]
    pub color_balance_enabled: bool,
    #[serde(default)]
    pub dye_channels: Vec<String>,
    #[serde(default)]
    pub channel1_name: String,
    #[serde(default)]
    pub channel1_bases: Vec<String>,
    #[serde(default)]
    pub channel2_name: String,
    #[serde(default)]
    pub channel2_bases: Vec<String>,
    #[serde(default)]
    pub dark_base: String,
    #[serde(default = "default_samplesheet_versions")]
    pub samplesheet_versions: Vec<u32>,
    #[serde(default, rename = "flowcell")]
    pub flowcells: Vec<FlowcellDefinition>,
    /// One entry per installed version.
    #[serde(default, rename = "onboard_application")]
    pub onboard_applications: Vec<OnboardApplication>,
}

fn first_chars(bases: &[String]) -> Vec<char> {
    bases
        .iter()
        .filter_map(|b| b.trim().chars().next())
        .map(|b| b.to_ascii_uppercase())
        .collect()
}

impl InstrumentDefinition {
    pub fn flowcell(&self, name: &str) -> Option<&FlowcellDefinition> {
        self.flowcells.iter().find(|fc| fc.name == name)
    }

    pub fn samplesheet_v2_i5_orientation(&self) -> I5Orientation {
        self.samplesheet_v2_i5_orientation
            .unwrap_or(self.i5_read_orientation)
    }

    /// Channel layout for two-channel instruments that declare their
    /// channel-1 bases.
    pub fn channel_config(&self) -> Option<ChannelConfig> {
        if self.chemistry_type != ChemistryType::TwoColor || self.channel1_bases.is_empty() {
            return None;
        }
        Some(ChannelConfig {
            channel1_name: self.channel1_name.clone(),
            channel1_bases: first_chars(&self.channel1_bases),
            channel2_name: self.channel2_name.clone(),
            channel2_bases: first_chars(&self.channel2_bases),
            dark_base: self
                .dark_base
                .trim()
                .chars()
                .next()
                .map(|b| b.to_ascii_uppercase()),
            sbs_chemistry: self.sbs_chemistry.clone(),
        })
    }

    /// The snapshot the run validators work from.
    pub fn capabilities(&self) -> InstrumentCapabilities {
        InstrumentCapabilities {
            name: self.name.clone(),
            chemistry: self.chemistry_type,
            channels: self.channel_config(),
            i5_orientation: self.i5_read_orientation,
            color_balance_enabled: self.color_balance_enabled,
            flowcell_lanes: self
                .flowcells
                .iter()
                .map(|fc| (fc.name.clone(), fc.lanes))
                .collect(),
            onboard_applications: self.onboard_applications.clone(),
        }
    }
}
