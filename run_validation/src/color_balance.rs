//! Dye-channel analysis for two-channel chemistries.
//!
//! Every operation here returns an empty result when the instrument has color
//! balance disabled, is four-channel, or has no channel layout configured.

use crate::grouping::group_indexed_by_lane;
use run_types::{
    ChannelConfig, ColorBalanceStatus, DarkCycleError, I5Orientation, IndexColorBalance,
    IndexKind, InstrumentCapabilities, LaneColorBalance, PositionColorBalance, Sample,
    SampleDarkCycleInfo, SequencingRun,
};
use seq_utils::leading_base_count;
use std::collections::BTreeMap;

/// A channel below this share of a cycle's bases is flagged as a warning.
pub const MIN_CHANNEL_PERCENT: usize = 25;

/// Cycles at the start of an index read that must not both be dark.
const LEADING_CYCLES: usize = 2;

/// The dark base of the instrument, if dark-cycle analysis applies.
fn dark_base(instrument: &InstrumentCapabilities) -> Option<char> {
    instrument.color_balance_channels()?.dark_base()
}

/// Flag indexes whose first two read cycles are both the dark base. The i5 is
/// checked in the orientation the instrument reads it.
pub fn validate_dark_cycles(
    run: &SequencingRun,
    instrument: &InstrumentCapabilities,
) -> Vec<DarkCycleError> {
    let Some(dark) = dark_base(instrument) else {
        return Vec::new();
    };
    let starts_dark = |seq: &str| leading_base_count(seq, dark, LEADING_CYCLES) == LEADING_CYCLES;

    let mut errors = Vec::new();
    for sample in &run.samples {
        let error = |index_type, sequence: &str| DarkCycleError {
            sample_id: sample.id.clone(),
            sample_name: sample.display_name().to_string(),
            index_type,
            sequence: sequence.to_string(),
            dark_base: dark,
        };
        if let Some(i7) = sample.index1_sequence() {
            if starts_dark(i7) {
                errors.push(error(IndexKind::I7, i7));
            }
        }
        if let Some(i5) = sample.index2_sequence() {
            if starts_dark(instrument.i5_orientation.read_sequence(i5).as_str()) {
                errors.push(error(IndexKind::I5, i5));
            }
        }
    }
    errors
}

/// Leading dark-base counts for every sample with at least one index.
pub fn build_dark_cycle_info(
    run: &SequencingRun,
    instrument: &InstrumentCapabilities,
) -> Vec<SampleDarkCycleInfo> {
    let Some(dark) = dark_base(instrument) else {
        return Vec::new();
    };

    run.samples
        .iter()
        .filter(|s| s.index1_sequence().is_some() || s.index2_sequence().is_some())
        .map(|sample| {
            let i7 = sample.index1_sequence().unwrap_or_default();
            let i5 = sample.index2_sequence().unwrap_or_default();
            let i5_read = instrument.i5_orientation.read_sequence(i5);
            SampleDarkCycleInfo {
                sample_id: sample.id.clone(),
                sample_name: sample.display_name().to_string(),
                i7_sequence: i7.to_string(),
                i5_sequence: i5.to_string(),
                i7_leading_dark: leading_base_count(i7, dark, LEADING_CYCLES),
                i5_leading_dark: leading_base_count(&i5_read, dark, LEADING_CYCLES),
                i5_read_sequence: i5_read,
                dark_base: dark,
            }
        })
        .collect()
}

/// Per-cycle channel balance of the i7 and i5 reads in every lane with at
/// least one indexed sample.
pub fn calculate_color_balance(
    run: &SequencingRun,
    instrument: &InstrumentCapabilities,
) -> BTreeMap<u32, LaneColorBalance> {
    let Some(channels) = instrument.color_balance_channels() else {
        return BTreeMap::new();
    };
    let total_lanes = instrument.lanes_for_flowcell(&run.flowcell_type);

    group_indexed_by_lane(&run.samples, total_lanes)
        .into_iter()
        .map(|(lane, samples)| {
            let balance = lane_color_balance(
                lane,
                &samples,
                channels,
                instrument.i5_orientation,
            );
            (lane, balance)
        })
        .collect()
}

fn lane_color_balance(
    lane: u32,
    samples: &[&Sample],
    channels: &ChannelConfig,
    i5_orientation: I5Orientation,
) -> LaneColorBalance {
    let i7: Vec<String> = samples
        .iter()
        .filter_map(|s| s.index1_sequence())
        .map(str::to_string)
        .collect();
    let i5: Vec<String> = samples
        .iter()
        .filter_map(|s| s.index2_sequence())
        .map(|seq| i5_orientation.read_sequence(seq))
        .collect();

    LaneColorBalance {
        lane,
        sample_count: samples.len(),
        i7_balance: index_color_balance(IndexKind::I7, &i7, channels),
        i5_balance: index_color_balance(IndexKind::I5, &i5, channels),
    }
}

fn index_color_balance(
    index_type: IndexKind,
    sequences: &[String],
    channels: &ChannelConfig,
) -> Option<IndexColorBalance> {
    let max_len = sequences.iter().map(String::len).max()?;
    let reads: Vec<&[u8]> = sequences.iter().map(|s| s.as_bytes()).collect();

    let positions = (0..max_len)
        .map(|pos| {
            let mut balance = PositionColorBalance {
                position: pos + 1,
                ..Default::default()
            };
            for base in reads.iter().filter_map(|read| read.get(pos)) {
                match base.to_ascii_uppercase() {
                    b'A' => balance.a_count += 1,
                    b'C' => balance.c_count += 1,
                    b'G' => balance.g_count += 1,
                    b'T' => balance.t_count += 1,
                    _ => {}
                }
            }
            for (base, count) in [
                ('A', balance.a_count),
                ('C', balance.c_count),
                ('G', balance.g_count),
                ('T', balance.t_count),
            ] {
                if channels.in_channel1(base) {
                    balance.channel1_count += count;
                }
                if channels.in_channel2(base) {
                    balance.channel2_count += count;
                }
            }
            balance.status = classify(&balance);
            balance
        })
        .collect();

    Some(IndexColorBalance {
        index_type,
        positions,
    })
}

/// ERROR when a channel gets no signal at a cycle, WARNING when a channel is
/// below [`MIN_CHANNEL_PERCENT`]. A cycle no sequence reaches is OK.
fn classify(balance: &PositionColorBalance) -> ColorBalanceStatus {
    let total = balance.total();
    if total == 0 {
        return ColorBalanceStatus::Ok;
    }
    let (ch1, ch2) = (balance.channel1_count, balance.channel2_count);
    if ch1 == 0 || ch2 == 0 {
        ColorBalanceStatus::Error
    } else if ch1 * 100 < MIN_CHANNEL_PERCENT * total || ch2 * 100 < MIN_CHANNEL_PERCENT * total {
        ColorBalanceStatus::Warning
    } else {
        ColorBalanceStatus::Ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use run_types::{ChemistryType, Index};

    fn xleap(orientation: I5Orientation) -> InstrumentCapabilities {
        InstrumentCapabilities {
            name: "NovaSeq X Series".to_string(),
            chemistry: ChemistryType::TwoColor,
            channels: Some(ChannelConfig {
                channel1_name: "Blue".to_string(),
                channel1_bases: vec!['A', 'C'],
                channel2_name: "Green".to_string(),
                channel2_bases: vec!['C', 'T'],
                dark_base: Some('G'),
                sbs_chemistry: "XLEAP".to_string(),
            }),
            i5_orientation: orientation,
            color_balance_enabled: true,
            flowcell_lanes: [("10B".to_string(), 2)].into_iter().collect(),
            onboard_applications: Vec::new(),
        }
    }

    fn sample(id: &str, lanes: &[u32], i7: Option<&str>, i5: Option<&str>) -> Sample {
        Sample {
            id: id.to_string(),
            sample_id: id.to_string(),
            lanes: lanes.to_vec(),
            index1: i7.map(|seq| Index::new("i7", seq)),
            index2: i5.map(|seq| Index::new("i5", seq)),
            ..Default::default()
        }
    }

    fn run(samples: Vec<Sample>) -> SequencingRun {
        SequencingRun::new("NovaSeq X Series", "10B").with_samples(samples)
    }

    fn statuses(balance: &IndexColorBalance) -> Vec<ColorBalanceStatus> {
        balance.positions.iter().map(|p| p.status).collect()
    }

    #[test]
    fn test_two_leading_dark_is_error() {
        let run = run(vec![
            sample("S1", &[], Some("GGATTACT"), None),
            sample("S2", &[], Some("GATTACTA"), None),
        ]);
        let inst = xleap(I5Orientation::Forward);
        let errors = validate_dark_cycles(&run, &inst);
        assert_eq!(
            errors,
            vec![DarkCycleError {
                sample_id: "S1".to_string(),
                sample_name: "S1".to_string(),
                index_type: IndexKind::I7,
                sequence: "GGATTACT".to_string(),
                dark_base: 'G',
            }]
        );

        let info = build_dark_cycle_info(&run, &inst);
        assert_eq!(info.len(), 2);
        assert_eq!(info[0].i7_leading_dark, 2);
        assert_eq!(info[1].i7_leading_dark, 1);
        assert_eq!(info[1].i5_leading_dark, 0);
        assert_eq!(info[1].i5_read_sequence, "");
    }

    #[test]
    fn test_i5_checked_in_read_orientation() {
        // Reverse complement of AACC is GGTT.
        let run = run(vec![sample("S1", &[], Some("ACGTACGT"), Some("AACC"))]);

        let forward = xleap(I5Orientation::Forward);
        assert!(validate_dark_cycles(&run, &forward).is_empty());

        let rc = xleap(I5Orientation::ReverseComplement);
        let errors = validate_dark_cycles(&run, &rc);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].index_type, IndexKind::I5);
        assert_eq!(errors[0].sequence, "AACC");

        let info = build_dark_cycle_info(&run, &rc);
        assert_eq!(info[0].i5_sequence, "AACC");
        assert_eq!(info[0].i5_read_sequence, "GGTT");
        assert_eq!(info[0].i5_leading_dark, 2);
    }

    #[test]
    fn test_lowercase_dark_bases() {
        let run = run(vec![sample("S1", &[], Some("ggatc"), None)]);
        assert_eq!(validate_dark_cycles(&run, &xleap(I5Orientation::Forward)).len(), 1);
    }

    #[test]
    fn test_i5_only_sample_in_info_not_balance() {
        let run = run(vec![sample("S1", &[1], None, Some("GGTT"))]);
        let inst = xleap(I5Orientation::Forward);
        assert_eq!(build_dark_cycle_info(&run, &inst).len(), 1);
        assert!(calculate_color_balance(&run, &inst).is_empty());
    }

    #[test]
    fn test_disabled_or_four_color_is_empty() {
        let run = run(vec![sample("S1", &[], Some("GGGG"), Some("GGGG"))]);

        let mut disabled = xleap(I5Orientation::Forward);
        disabled.color_balance_enabled = false;
        assert!(validate_dark_cycles(&run, &disabled).is_empty());
        assert!(build_dark_cycle_info(&run, &disabled).is_empty());
        assert!(calculate_color_balance(&run, &disabled).is_empty());

        let mut four = xleap(I5Orientation::Forward);
        four.chemistry = ChemistryType::FourColor;
        assert!(validate_dark_cycles(&run, &four).is_empty());
        assert!(calculate_color_balance(&run, &four).is_empty());

        let mut no_channels = xleap(I5Orientation::Forward);
        no_channels.channels = None;
        assert!(calculate_color_balance(&run, &no_channels).is_empty());
    }

    #[test]
    fn test_uniform_bases_balanced() {
        let run = run(vec![
            sample("S1", &[1], Some("AAAA"), None),
            sample("S2", &[1], Some("CCCC"), None),
            sample("S3", &[1], Some("GGGG"), None),
            sample("S4", &[1], Some("TTTT"), None),
        ]);
        let balance = calculate_color_balance(&run, &xleap(I5Orientation::Forward));
        let lane = &balance[&1];
        assert_eq!(lane.sample_count, 4);
        assert!(lane.i5_balance.is_none());
        let i7 = lane.i7_balance.as_ref().unwrap();
        assert_eq!(statuses(i7), vec![ColorBalanceStatus::Ok; 4]);
        assert_eq!(i7.positions[0].channel1_count, 2);
        assert_eq!(i7.positions[0].channel2_count, 2);
        assert!(!lane.has_issues());
    }

    #[test]
    fn test_all_dark_is_error() {
        let run = run(vec![
            sample("S1", &[1], Some("GGGG"), None),
            sample("S2", &[1], Some("GGGG"), None),
        ]);
        let balance = calculate_color_balance(&run, &xleap(I5Orientation::Forward));
        let i7 = balance[&1].i7_balance.as_ref().unwrap();
        assert_eq!(statuses(i7), vec![ColorBalanceStatus::Error; 4]);
        assert!(balance[&1].has_issues());
    }

    #[test]
    fn test_low_channel_warning() {
        // Position 1: A,A,A,A,T -> Green (C+T) at 20%.
        let run = run(vec![
            sample("S1", &[1], Some("A"), None),
            sample("S2", &[1], Some("A"), None),
            sample("S3", &[1], Some("A"), None),
            sample("S4", &[1], Some("A"), None),
            sample("S5", &[1], Some("T"), None),
        ]);
        let balance = calculate_color_balance(&run, &xleap(I5Orientation::Forward));
        let i7 = balance[&1].i7_balance.as_ref().unwrap();
        assert_eq!(statuses(i7), vec![ColorBalanceStatus::Warning]);
        assert_eq!(i7.warning_count(), 1);
    }

    #[test]
    fn test_ragged_lengths_and_orientation() {
        let run = run(vec![
            sample("S1", &[2], Some("ACGTAC"), Some("AAAA")),
            sample("S2", &[2], Some("CATG"), Some("CCCC")),
        ]);
        let balance = calculate_color_balance(&run, &xleap(I5Orientation::ReverseComplement));
        assert_eq!(balance.keys().copied().collect::<Vec<_>>(), vec![2]);
        let lane = &balance[&2];
        let i7 = lane.i7_balance.as_ref().unwrap();
        assert_eq!(i7.max_position(), 6);
        assert_eq!(i7.positions[5].total(), 1);
        // Read as TTTT and GGGG: Blue has no signal.
        let i5 = lane.i5_balance.as_ref().unwrap();
        assert_eq!(i5.positions[0].t_count, 1);
        assert_eq!(i5.positions[0].g_count, 1);
        assert_eq!(i5.error_count(), 4);
    }
}
