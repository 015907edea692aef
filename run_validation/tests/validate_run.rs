use pretty_assertions::assert_eq;
use run_types::{
    ApplicationErrorKind, ChannelConfig, ChemistryType, ConfigCategory, I5Orientation, Index,
    IndexKind, InstrumentCapabilities, Sample, SequencingRun, Severity, ValidationResult,
};
use run_validation::{validate_run, ProfileSet, ValidationReport};
use std::collections::BTreeMap;

fn xleap() -> ChannelConfig {
    ChannelConfig {
        channel1_name: "Blue".to_string(),
        channel1_bases: vec!['A', 'C'],
        channel2_name: "Green".to_string(),
        channel2_bases: vec!['C', 'T'],
        dark_base: Some('G'),
        sbs_chemistry: "XLEAP-SBS".to_string(),
    }
}

fn two_color() -> InstrumentCapabilities {
    InstrumentCapabilities {
        name: "NovaSeq X Series".to_string(),
        chemistry: ChemistryType::TwoColor,
        channels: Some(xleap()),
        i5_orientation: I5Orientation::ReverseComplement,
        color_balance_enabled: true,
        flowcell_lanes: BTreeMap::from([("FC".to_string(), 2)]),
        onboard_applications: Vec::new(),
    }
}

fn four_color() -> InstrumentCapabilities {
    InstrumentCapabilities {
        name: "MiSeq".to_string(),
        chemistry: ChemistryType::FourColor,
        channels: None,
        i5_orientation: I5Orientation::Forward,
        color_balance_enabled: false,
        flowcell_lanes: BTreeMap::from([("FC".to_string(), 2)]),
        onboard_applications: Vec::new(),
    }
}

fn sample(id: &str, lanes: &[u32], i7: &str, i5: Option<&str>) -> Sample {
    Sample {
        id: format!("key-{id}"),
        sample_id: id.to_string(),
        lanes: lanes.to_vec(),
        index1: Some(Index::new(format!("{id}-i7"), i7)),
        index2: i5.map(|seq| Index::new(format!("{id}-i5"), seq)),
        ..Default::default()
    }
}

fn scenario() -> SequencingRun {
    let mut s1 = sample("S1", &[1], "ACGTACGT", None);
    s1.test_id = "WGS".to_string();
    let mut run = SequencingRun::new("NovaSeq X Series", "FC").with_samples(vec![
        s1,
        sample("S2", &[1], "ACGTACGA", None),
        sample("S3", &[2], "GGTTCCAA", Some("AACCGGTT")),
        sample("S4", &[2], "TTGGAACC", Some("CCAATTGG")),
    ]);
    run.run_name = "scenario".to_string();
    run
}

#[test]
fn test_empty_run() {
    let run = SequencingRun::new("NovaSeq X Series", "FC");
    let result = validate_run(&run, &two_color(), Some(&ProfileSet::default()));
    assert_eq!(
        result,
        ValidationResult {
            chemistry_type: Some(ChemistryType::TwoColor),
            color_balance_enabled: true,
            channel_config: Some(xleap()),
            ..Default::default()
        }
    );
    assert!(!result.has_errors());
    assert_eq!(result.warning_count(), 0);
}

#[test]
fn test_two_color_scenario() {
    let run = scenario();
    let result = validate_run(&run, &two_color(), Some(&ProfileSet::default()));

    assert!(result.duplicate_sample_ids.is_empty());

    assert_eq!(result.index_collisions.len(), 1);
    let collision = &result.index_collisions[0];
    assert_eq!(
        (collision.lane, collision.index_type, collision.hamming_distance),
        (1, IndexKind::I7, 1)
    );
    assert_eq!(
        collision.description(),
        "i7 collision in lane 1: S1 (ACGTACGT) vs S2 (ACGTACGA) - distance 1 <= threshold 2"
    );

    assert_eq!(result.distance_matrices.keys().copied().collect::<Vec<_>>(), vec![1, 2]);
    let lane2 = result.lane_matrix(2).unwrap();
    assert_eq!(lane2.sample_names, vec!["S3", "S4"]);
    assert_eq!(lane2.i7_distance(0, 1), Some(8));
    assert_eq!(lane2.combined_distance(1, 0), lane2.combined_distance(0, 1));
    assert_eq!(lane2.i7_distance(0, 0), None);
    assert_eq!(result.lane_matrix(1).unwrap().i5_distance(0, 1), None);

    assert_eq!(result.dark_cycle_errors.len(), 1);
    assert_eq!(result.dark_cycle_errors[0].sample_name, "S3");
    assert_eq!(result.dark_cycle_errors[0].index_type, IndexKind::I7);
    assert_eq!(result.dark_cycle_samples.len(), 4);
    assert_eq!(result.dark_cycle_samples[2].i7_leading_dark, 2);

    // lane 1 starts A/A and lane 2 starts G/T, both leave a channel empty
    assert_eq!(result.color_balance.len(), 2);
    assert_eq!(result.color_balance_issue_count(), 2);

    assert_eq!(result.application_errors.len(), 1);
    assert_eq!(
        result.application_errors[0].error_type,
        ApplicationErrorKind::TestProfileNotFound
    );

    assert_eq!(result.configuration_errors.len(), 1);
    let warning = &result.configuration_errors[0];
    assert_eq!(warning.category, ConfigCategory::MismatchThresholdRisk);
    assert_eq!(warning.severity, Severity::Warning);
    assert_eq!(warning.lane, Some(1));

    assert_eq!(result.error_count(), 3);
    assert_eq!(result.warning_count(), 1);
    assert!(result.has_errors());

    let report = ValidationReport::new(&run, &result);
    assert_eq!(report.run_name, "scenario");
    assert_eq!(report.summary.color_balance_issue_lanes, 2);
    assert_eq!(report.issues.len(), 4);
}

#[test]
fn test_four_color_skips_color_analysis() {
    let result = validate_run(&scenario(), &four_color(), None);
    assert_eq!(result.chemistry_type, Some(ChemistryType::FourColor));
    assert!(!result.color_balance_enabled);
    assert_eq!(result.channel_config, None);
    assert!(result.color_balance.is_empty());
    assert!(result.dark_cycle_errors.is_empty());
    assert!(result.dark_cycle_samples.is_empty());
    assert_eq!(result.index_collisions.len(), 1);
}

#[test]
fn test_without_catalog_skips_profiles() {
    let result = validate_run(&scenario(), &two_color(), None);
    assert!(result.application_errors.is_empty());
    assert_eq!(result.error_count(), 2);
}

#[test]
fn test_result_is_deterministic() {
    let run = scenario();
    let instrument = two_color();
    assert_eq!(
        validate_run(&run, &instrument, None),
        validate_run(&run, &instrument, None)
    );
}
