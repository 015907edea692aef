//! Structural checks on a run's sample configuration.

use crate::grouping::{group_by_lane, group_in_order, LaneSamples};
use itertools::Itertools;
use run_types::{ConfigCategory, ConfigurationError, InstrumentCapabilities, Sample, SequencingRun};
use seq_utils::hamming_distance;
use std::collections::{BTreeMap, BTreeSet};

/// Names listed in a message before the rest are summarized as "and N more".
const MAX_NAMES_SHOWN: usize = 5;

/// Report every `sample_id` used by more than one sample. Samples without a
/// `sample_id` are not considered.
pub fn validate_sample_ids(run: &SequencingRun) -> Vec<String> {
    group_in_order(
        run.samples
            .iter()
            .filter(|s| !s.sample_id.is_empty())
            .map(|s| (s.sample_id.as_str(), ())),
    )
    .into_iter()
    .filter(|(_, uses)| uses.len() > 1)
    .map(|(sample_id, uses)| {
        format!(
            "Duplicate sample_id '{sample_id}' found {} times",
            uses.len()
        )
    })
    .collect()
}

/// Run every configuration check. A run without samples has nothing to check.
pub fn validate_configuration(
    run: &SequencingRun,
    instrument: &InstrumentCapabilities,
) -> Vec<ConfigurationError> {
    if run.samples.is_empty() {
        return Vec::new();
    }
    let total_lanes = instrument.lanes_for_flowcell(&run.flowcell_type);
    let lanes = group_by_lane(&run.samples, total_lanes);

    let mut errors = check_sample_id_characters(&run.samples);
    errors.extend(check_lane_range(&run.samples, total_lanes));
    errors.extend(check_missing_lanes(&run.samples));
    errors.extend(check_index_lengths(&lanes));
    errors.extend(check_mixed_indexing(&lanes));
    errors.extend(check_index_cycles(run));
    errors.extend(check_duplicate_index_pairs(&lanes));
    errors.extend(check_mismatch_threshold(run, &lanes));
    errors
}

fn is_valid_id_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

fn names_summary(names: &[String]) -> String {
    let shown = names.iter().take(MAX_NAMES_SHOWN).join(", ");
    if names.len() > MAX_NAMES_SHOWN {
        format!("{shown} and {} more", names.len() - MAX_NAMES_SHOWN)
    } else {
        shown
    }
}

fn display_names<'a>(samples: impl IntoIterator<Item = &'a Sample>) -> Vec<String> {
    samples
        .into_iter()
        .map(|s| s.display_name().to_string())
        .collect()
}

fn check_sample_id_characters(samples: &[Sample]) -> Vec<ConfigurationError> {
    samples
        .iter()
        .filter_map(|s| {
            let invalid: BTreeSet<char> =
                s.sample_id.chars().filter(|&c| !is_valid_id_char(c)).collect();
            if invalid.is_empty() {
                return None;
            }
            Some(
                ConfigurationError::error(
                    ConfigCategory::InvalidSampleId,
                    format!(
                        "Sample ID '{}' contains invalid characters: {}. \
                         Only alphanumeric characters, hyphens, and underscores are allowed.",
                        s.sample_id,
                        invalid.iter().map(|c| format!("'{c}'")).join(", ")
                    ),
                )
                .with_samples(vec![s.sample_id.clone()]),
            )
        })
        .collect()
}

fn check_lane_range(samples: &[Sample], total_lanes: u32) -> Vec<ConfigurationError> {
    let mut errors = Vec::new();
    for sample in samples {
        let name = sample.display_name();
        for &lane in sample.lanes.iter().unique() {
            if !(1..=total_lanes).contains(&lane) {
                errors.push(
                    ConfigurationError::error(
                        ConfigCategory::LaneOutOfRange,
                        format!(
                            "Sample '{name}' is assigned to lane {lane}, \
                             but the selected flowcell only has lanes 1-{total_lanes}."
                        ),
                    )
                    .with_samples(vec![name.to_string()])
                    .in_lane(lane),
                );
            }
        }
    }
    errors
}

/// Warn only when lane assignment is partial. If no sample has explicit lanes,
/// every sample going to every lane is the normal default.
fn check_missing_lanes(samples: &[Sample]) -> Option<ConfigurationError> {
    if samples.iter().all(Sample::in_all_lanes) {
        return None;
    }
    let unassigned: Vec<String> = samples
        .iter()
        .filter(|s| s.in_all_lanes())
        .map(|s| s.display_name().to_string())
        .collect();
    if unassigned.is_empty() {
        return None;
    }
    Some(
        ConfigurationError::warning(
            ConfigCategory::NoLaneAssignment,
            format!(
                "{} sample(s) have no lane assignment and will be placed in all lanes: {}",
                unassigned.len(),
                names_summary(&unassigned)
            ),
        )
        .with_samples(unassigned),
    )
}

/// `"8bp (3 samples), 10bp (1 samples)"` for the given sequences.
fn length_breakdown<'a>(sequences: impl Iterator<Item = &'a str>) -> Option<String> {
    let mut counts: BTreeMap<usize, usize> = BTreeMap::new();
    for seq in sequences {
        *counts.entry(seq.len()).or_default() += 1;
    }
    (counts.len() > 1).then(|| {
        counts
            .iter()
            .map(|(len, n)| format!("{len}bp ({n} samples)"))
            .join(", ")
    })
}

fn indexed_samples<'a>(samples: &[&'a Sample]) -> Vec<&'a Sample> {
    samples.iter().copied().filter(|s| s.has_index()).collect()
}

fn check_index_lengths(lanes: &LaneSamples<'_>) -> Vec<ConfigurationError> {
    let mut errors = Vec::new();
    for (&lane, samples) in lanes {
        let indexed = indexed_samples(samples);
        if indexed.len() < 2 {
            continue;
        }
        let reads = [
            ("i7", length_breakdown(indexed.iter().filter_map(|s| s.index1_sequence()))),
            ("i5", length_breakdown(indexed.iter().filter_map(|s| s.index2_sequence()))),
        ];
        for (read, breakdown) in reads {
            if let Some(detail) = breakdown {
                errors.push(
                    ConfigurationError::error(
                        ConfigCategory::IndexLengthMismatch,
                        format!(
                            "Lane {lane}: {read} index lengths are inconsistent - {detail}. \
                             All samples in a lane must have the same index length."
                        ),
                    )
                    .in_lane(lane),
                );
            }
        }
    }
    errors
}

fn check_mixed_indexing(lanes: &LaneSamples<'_>) -> Vec<ConfigurationError> {
    let mut errors = Vec::new();
    for (&lane, samples) in lanes {
        let indexed = indexed_samples(samples);
        if indexed.len() < 2 {
            continue;
        }
        let (dual, single): (Vec<&Sample>, Vec<&Sample>) =
            indexed.into_iter().partition(|s| s.is_dual_indexed());
        if dual.is_empty() || single.is_empty() {
            continue;
        }
        errors.push(
            ConfigurationError::error(
                ConfigCategory::MixedIndexing,
                format!(
                    "Lane {lane}: mixed single-indexed ({} samples) and dual-indexed ({} samples). \
                     All samples in a lane must use the same indexing mode.",
                    single.len(),
                    dual.len()
                ),
            )
            .in_lane(lane),
        );
    }
    errors
}

fn check_index_cycles(run: &SequencingRun) -> Vec<ConfigurationError> {
    let Some(cycles) = run.run_cycles else {
        return Vec::new();
    };
    let mut errors = Vec::new();
    for sample in &run.samples {
        let name = sample.display_name();
        let reads = [
            ("i7", "index1", sample.index1_sequence(), cycles.index1_cycles),
            ("i5", "index2", sample.index2_sequence(), cycles.index2_cycles),
        ];
        for (read, cycle_name, seq, available) in reads {
            let Some(seq) = seq else { continue };
            if (available as usize) < seq.len() {
                errors.push(
                    ConfigurationError::error(
                        ConfigCategory::IndexExceedsCycles,
                        format!(
                            "Sample '{name}': {read} index length ({}bp) exceeds run {cycle_name} \
                             cycles ({available}). Index cycles must be >= index length.",
                            seq.len()
                        ),
                    )
                    .with_samples(vec![name.to_string()]),
                );
            }
        }
    }
    errors
}

fn check_duplicate_index_pairs(lanes: &LaneSamples<'_>) -> Vec<ConfigurationError> {
    let mut errors = Vec::new();
    for (&lane, samples) in lanes {
        let pairs = samples.iter().filter_map(|s| {
            let i7 = s.index1_sequence()?;
            Some(((i7, s.index2_sequence().unwrap_or_default()), *s))
        });
        for ((i7, i5), shared) in group_in_order(pairs) {
            if shared.len() < 2 {
                continue;
            }
            let names = display_names(shared);
            let index_desc = if i5.is_empty() {
                format!("i7={i7}")
            } else {
                format!("i7={i7}, i5={i5}")
            };
            errors.push(
                ConfigurationError::error(
                    ConfigCategory::DuplicateIndexPair,
                    format!(
                        "Lane {lane}: {} samples share identical indexes ({index_desc}): {}. \
                         Demultiplexing cannot distinguish these samples.",
                        names.len(),
                        names_summary(&names)
                    ),
                )
                .with_samples(names)
                .in_lane(lane),
            );
        }
    }
    errors
}

/// Two reads of different samples can each carry `mismatches` errors and meet
/// in the middle, so a minimum distance of `2 * mismatches` or less risks
/// misassignment.
fn check_mismatch_threshold(
    run: &SequencingRun,
    lanes: &LaneSamples<'_>,
) -> Vec<ConfigurationError> {
    let mut errors = Vec::new();
    for (&lane, samples) in lanes {
        let indexed = indexed_samples(samples);
        let min_distance = indexed
            .iter()
            .filter_map(|s| s.index1_sequence())
            .tuple_combinations()
            .map(|(a, b)| hamming_distance(a, b))
            .min();
        let max_mismatch = indexed
            .iter()
            .map(|s| s.effective_mismatches_index1(run.barcode_mismatches_index1))
            .max();
        let (Some(min_distance), Some(max_mismatch)) = (min_distance, max_mismatch) else {
            continue;
        };
        if min_distance <= 2 * usize::from(max_mismatch) {
            errors.push(
                ConfigurationError::warning(
                    ConfigCategory::MismatchThresholdRisk,
                    format!(
                        "Lane {lane}: minimum i7 distance ({min_distance}) is at or below \
                         2x the barcode mismatch threshold ({max_mismatch}). \
                         Consider reducing the mismatch threshold to avoid misassignment."
                    ),
                )
                .in_lane(lane),
            );
        }
    }
    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use run_types::{Index, RunCycles, Severity};

    fn instrument(lanes: u32) -> InstrumentCapabilities {
        InstrumentCapabilities {
            name: "NovaSeq X Series".to_string(),
            flowcell_lanes: [("10B".to_string(), lanes)].into_iter().collect(),
            ..Default::default()
        }
    }

    fn sample(sample_id: &str, lanes: &[u32], i7: Option<&str>, i5: Option<&str>) -> Sample {
        Sample {
            id: format!("key-{sample_id}"),
            sample_id: sample_id.to_string(),
            lanes: lanes.to_vec(),
            index1: i7.map(|seq| Index::new("i7", seq)),
            index2: i5.map(|seq| Index::new("i5", seq)),
            barcode_mismatches_index1: Some(0),
            ..Default::default()
        }
    }

    fn run(samples: Vec<Sample>) -> SequencingRun {
        SequencingRun::new("NovaSeq X Series", "10B").with_samples(samples)
    }

    fn categories(errors: &[ConfigurationError]) -> Vec<ConfigCategory> {
        errors.iter().map(|e| e.category).collect()
    }

    #[test]
    fn test_duplicate_sample_ids() {
        let run = run(vec![
            sample("S1", &[], None, None),
            sample("S1", &[], None, None),
            sample("S2", &[], None, None),
            sample("S1", &[], None, None),
            sample("", &[], None, None),
            sample("", &[], None, None),
        ]);
        assert_eq!(
            validate_sample_ids(&run),
            vec!["Duplicate sample_id 'S1' found 3 times".to_string()]
        );
    }

    #[test]
    fn test_empty_run() {
        let run = run(vec![]);
        assert!(validate_sample_ids(&run).is_empty());
        assert!(validate_configuration(&run, &instrument(8)).is_empty());
    }

    #[test]
    fn test_sample_id_characters() {
        let errors = check_sample_id_characters(&[
            sample("good_id-1", &[], None, None),
            sample("bad id!", &[], None, None),
        ]);
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0].message,
            "Sample ID 'bad id!' contains invalid characters: ' ', '!'. \
             Only alphanumeric characters, hyphens, and underscores are allowed."
        );
        assert_eq!(errors[0].severity, Severity::Error);
        assert_eq!(errors[0].sample_names, vec!["bad id!"]);
    }

    #[test]
    fn test_lane_out_of_range() {
        let errors = check_lane_range(&[sample("S1", &[0, 2, 5, 5], None, None)], 4);
        assert_eq!(
            errors.iter().map(|e| e.lane).collect::<Vec<_>>(),
            vec![Some(0), Some(5)]
        );
        assert_eq!(
            errors[1].message,
            "Sample 'S1' is assigned to lane 5, but the selected flowcell only has lanes 1-4."
        );
    }

    #[test]
    fn test_missing_lanes_only_when_partial() {
        let none = [sample("S1", &[], None, None), sample("S2", &[], None, None)];
        assert!(check_missing_lanes(&none).is_none());

        let all = [sample("S1", &[1], None, None), sample("S2", &[2], None, None)];
        assert!(check_missing_lanes(&all).is_none());

        let mut partial = vec![sample("S0", &[1], None, None)];
        partial.extend((1..=7).map(|i| sample(&format!("S{i}"), &[], None, None)));
        let warning = check_missing_lanes(&partial).unwrap();
        assert_eq!(warning.severity, Severity::Warning);
        assert_eq!(
            warning.message,
            "7 sample(s) have no lane assignment and will be placed in all lanes: \
             S1, S2, S3, S4, S5 and 2 more"
        );
        assert_eq!(warning.sample_names.len(), 7);
    }

    #[test]
    fn test_index_length_mismatch() {
        let run = run(vec![
            sample("S1", &[1], Some("ACGTACGT"), Some("AAAAAAAA")),
            sample("S2", &[1], Some("ACGTACGT"), Some("CCCCCCCCCC")),
            sample("S3", &[1], Some("ACGTACGTAC"), Some("GGGGGGGG")),
        ]);
        let lanes = group_by_lane(&run.samples, 1);
        let errors = check_index_lengths(&lanes);
        assert_eq!(
            errors.iter().map(|e| e.message.as_str()).collect::<Vec<_>>(),
            vec![
                "Lane 1: i7 index lengths are inconsistent - 8bp (2 samples), 10bp (1 samples). \
                 All samples in a lane must have the same index length.",
                "Lane 1: i5 index lengths are inconsistent - 8bp (2 samples), 10bp (1 samples). \
                 All samples in a lane must have the same index length.",
            ]
        );
    }

    #[test]
    fn test_mixed_indexing() {
        let run = run(vec![
            sample("S1", &[1], Some("ACGTACGT"), Some("AAAAAAAA")),
            sample("S2", &[1], Some("TTGTACGT"), None),
            sample("S3", &[1], Some("GGGTACGT"), None),
            sample("S4", &[2], Some("GGGTACGT"), None),
            sample("S5", &[2], None, Some("GGGTACGT")),
        ]);
        let lanes = group_by_lane(&run.samples, 2);
        let errors = check_mixed_indexing(&lanes);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].lane, Some(1));
        assert_eq!(
            errors[0].message,
            "Lane 1: mixed single-indexed (2 samples) and dual-indexed (1 samples). \
             All samples in a lane must use the same indexing mode."
        );
    }

    #[test]
    fn test_index_exceeds_cycles() {
        let run = run(vec![sample("S1", &[], Some("ACGTACGTAC"), Some("ACGTACGT"))])
            .with_run_cycles(RunCycles::new(151, 151, 8, 8));
        let errors = check_index_cycles(&run);
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0].message,
            "Sample 'S1': i7 index length (10bp) exceeds run index1 cycles (8). \
             Index cycles must be >= index length."
        );

        let no_cycles = SequencingRun {
            run_cycles: None,
            ..run
        };
        assert!(check_index_cycles(&no_cycles).is_empty());
    }

    #[test]
    fn test_duplicate_index_pairs() {
        let run = run(vec![
            sample("S1", &[1], Some("ACGTACGT"), Some("AAAAAAAA")),
            sample("S2", &[1], Some("ACGTACGT"), Some("AAAAAAAA")),
            sample("S3", &[1], Some("ACGTACGT"), Some("CCCCCCCC")),
            sample("S4", &[1], Some("TTTTTTTT"), None),
            sample("S5", &[1], Some("TTTTTTTT"), None),
            sample("S6", &[2], Some("ACGTACGT"), Some("AAAAAAAA")),
        ]);
        let lanes = group_by_lane(&run.samples, 2);
        let errors = check_duplicate_index_pairs(&lanes);
        assert_eq!(
            errors.iter().map(|e| e.message.as_str()).collect::<Vec<_>>(),
            vec![
                "Lane 1: 2 samples share identical indexes (i7=ACGTACGT, i5=AAAAAAAA): S1, S2. \
                 Demultiplexing cannot distinguish these samples.",
                "Lane 1: 2 samples share identical indexes (i7=TTTTTTTT): S4, S5. \
                 Demultiplexing cannot distinguish these samples.",
            ]
        );
        assert_eq!(errors[0].sample_names, vec!["S1", "S2"]);
    }

    #[test]
    fn test_mismatch_threshold() {
        let mut s1 = sample("S1", &[1], Some("AAAAAAAA"), None);
        let s2 = sample("S2", &[1], Some("AAAAAATT"), None);
        let lanes_run = run(vec![s1.clone(), s2.clone()]);

        // Overrides of 0 mismatches: distance 2 is safe.
        let lanes = group_by_lane(&lanes_run.samples, 1);
        assert!(check_mismatch_threshold(&lanes_run, &lanes).is_empty());

        // Falls back to the run default of 1: 2 <= 2 warns.
        s1.barcode_mismatches_index1 = None;
        let risky = run(vec![s1, s2]);
        let lanes = group_by_lane(&risky.samples, 1);
        let errors = check_mismatch_threshold(&risky, &lanes);
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0].message,
            "Lane 1: minimum i7 distance (2) is at or below 2x the barcode mismatch threshold (1). \
             Consider reducing the mismatch threshold to avoid misassignment."
        );
    }

    #[test]
    fn test_validate_configuration_order() {
        let run = run(vec![
            sample("S 1", &[1, 9], Some("ACGTACGT"), None),
            sample("S2", &[], Some("ACGTACGT"), None),
        ]);
        assert_eq!(
            categories(&validate_configuration(&run, &instrument(2))),
            vec![
                ConfigCategory::InvalidSampleId,
                ConfigCategory::LaneOutOfRange,
                ConfigCategory::NoLaneAssignment,
                ConfigCategory::DuplicateIndexPair,
                ConfigCategory::MismatchThresholdRisk,
            ]
        );
    }
}
