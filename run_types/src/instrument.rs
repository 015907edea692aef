//! Capability snapshot of a sequencing instrument.
//!
//! Instruments differ in chemistry, dye channels and i5 read orientation. Those
//! differences are carried as data on [`InstrumentCapabilities`] rather than as
//! per-instrument code.

use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use strum_macros::{Display, EnumString};

/// Number of lanes assumed when the flowcell is not known to the instrument.
pub const DEFAULT_LANE_COUNT: u32 = 1;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
pub enum ChemistryType {
    /// Two-channel SBS: each base is a combination of two dye channels.
    #[default]
    #[strum(to_string = "2-color")]
    #[serde(rename = "2-color")]
    TwoColor,
    /// Four-channel SBS: each base has its own dye.
    #[strum(to_string = "4-color")]
    #[serde(rename = "4-color")]
    FourColor,
}

/// Orientation in which the instrument physically reads the i5 index.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
pub enum I5Orientation {
    #[default]
    #[strum(to_string = "forward")]
    #[serde(rename = "forward")]
    Forward,
    #[strum(to_string = "reverse-complement")]
    #[serde(rename = "reverse-complement")]
    ReverseComplement,
}

impl I5Orientation {
    /// The bases the instrument sees, cycle by cycle, for an i5 as stored.
    pub fn read_sequence(self, stored: &str) -> String {
        match self {
            I5Orientation::Forward => stored.to_string(),
            I5Orientation::ReverseComplement => seq_utils::reverse_complement(stored),
        }
    }
}

/// Dye channel layout of a two-channel chemistry.
///
/// XLEAP (NovaSeq X, NextSeq 1000/2000): Blue = A+C, Green = C+T, dark G.
/// Red/Green (NovaSeq 6000, NextSeq 500/550): Red = A+C, Green = A+T, dark G.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelConfig {
    pub channel1_name: String,
    pub channel1_bases: Vec<char>,
    pub channel2_name: String,
    pub channel2_bases: Vec<char>,
    /// Base producing no signal in either channel.
    pub dark_base: Option<char>,
    pub sbs_chemistry: String,
}

impl ChannelConfig {
    pub fn in_channel1(&self, base: char) -> bool {
        contains_base(&self.channel1_bases, base)
    }

    pub fn in_channel2(&self, base: char) -> bool {
        contains_base(&self.channel2_bases, base)
    }

    /// The dark base, upper-cased.
    pub fn dark_base(&self) -> Option<char> {
        self.dark_base.map(|b| b.to_ascii_uppercase())
    }
}

fn contains_base(bases: &[char], base: char) -> bool {
    bases.iter().any(|b| b.eq_ignore_ascii_case(&base))
}

/// An application installed on the instrument, one entry per installed version.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct OnboardApplication {
    pub name: String,
    pub software_version: String,
}

impl OnboardApplication {
    pub fn new(name: impl Into<String>, software_version: impl Into<String>) -> Self {
        OnboardApplication {
            name: name.into(),
            software_version: software_version.into(),
        }
    }
}

/// Everything the validators need to know about the instrument a run targets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstrumentCapabilities {
    pub name: String,
    pub chemistry: ChemistryType,
    /// Present only for two-channel chemistries with a configured channel layout.
    pub channels: Option<ChannelConfig>,
    pub i5_orientation: I5Orientation,
    pub color_balance_enabled: bool,
    /// Lane count per flowcell type.
    pub flowcell_lanes: BTreeMap<String, u32>,
    pub onboard_applications: Vec<OnboardApplication>,
}

impl InstrumentCapabilities {
    /// Number of lanes on the given flowcell. Unknown flowcells count as a
    /// single lane.
    pub fn lanes_for_flowcell(&self, flowcell_type: &str) -> u32 {
        if let Some(&lanes) = self.flowcell_lanes.get(flowcell_type) {
            return lanes;
        }
        warn!(
            "flowcell '{flowcell_type}' is not defined for instrument '{}', assuming {DEFAULT_LANE_COUNT} lane",
            self.name
        );
        DEFAULT_LANE_COUNT
    }

    /// The channel layout to use for color-balance and dark-cycle analysis, or
    /// None when that analysis does not apply to this instrument.
    pub fn color_balance_channels(&self) -> Option<&ChannelConfig> {
        if !self.color_balance_enabled || self.chemistry != ChemistryType::TwoColor {
            return None;
        }
        self.channels.as_ref()
    }

    /// Installed software versions keyed by application name.
    pub fn application_versions(&self) -> BTreeMap<&str, BTreeSet<&str>> {
        let mut versions: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
        for app in &self.onboard_applications {
            versions
                .entry(app.name.as_str())
                .or_default()
                .insert(app.software_version.as_str());
        }
        versions
    }
}
