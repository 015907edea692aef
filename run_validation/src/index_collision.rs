//! Pairwise index distances within each lane.

use crate::grouping::group_indexed_by_lane;
use itertools::Itertools;
use run_types::{
    DistanceGrid, IndexCollision, IndexDistanceMatrix, IndexKind, InstrumentCapabilities, Sample,
    SequencingRun,
};
use seq_utils::hamming_distance;
use std::collections::BTreeMap;

/// i7-only pairs are safe at this distance or more.
pub const I7_ONLY_MIN_DISTANCE: usize = 3;
/// Dual-indexed pairs are safe when i7 + i5 distance reaches this.
pub const COMBINED_MIN_DISTANCE: usize = 4;

/// Find every pair of indexed samples sharing a lane whose indexes are too
/// similar to demultiplex. Pairs where both samples carry an i5 are judged on
/// the summed i7 and i5 distance, all other pairs on i7 alone.
pub fn validate_index_collisions(
    run: &SequencingRun,
    instrument: &InstrumentCapabilities,
) -> Vec<IndexCollision> {
    let total_lanes = instrument.lanes_for_flowcell(&run.flowcell_type);
    group_indexed_by_lane(&run.samples, total_lanes)
        .into_iter()
        .flat_map(|(lane, samples)| {
            samples
                .into_iter()
                .tuple_combinations()
                .filter_map(move |(s1, s2)| pair_collision(lane, s1, s2))
        })
        .collect()
}

fn pair_collision(lane: u32, s1: &Sample, s2: &Sample) -> Option<IndexCollision> {
    let i7_1 = s1.index1_sequence()?;
    let i7_2 = s2.index1_sequence()?;
    let i7_distance = hamming_distance(i7_1, i7_2);

    let (index_type, sequence1, sequence2, distance, threshold) =
        match (s1.index2_sequence(), s2.index2_sequence()) {
            (Some(i5_1), Some(i5_2)) => (
                IndexKind::Combined,
                format!("{i7_1}+{i5_1}"),
                format!("{i7_2}+{i5_2}"),
                i7_distance + hamming_distance(i5_1, i5_2),
                COMBINED_MIN_DISTANCE - 1,
            ),
            _ => (
                IndexKind::I7,
                i7_1.to_string(),
                i7_2.to_string(),
                i7_distance,
                I7_ONLY_MIN_DISTANCE - 1,
            ),
        };

    (distance <= threshold).then(|| IndexCollision {
        sample1_id: s1.id.clone(),
        sample1_name: s1.display_name().to_string(),
        sample2_id: s2.id.clone(),
        sample2_name: s2.display_name().to_string(),
        lane,
        index_type,
        sequence1,
        sequence2,
        hamming_distance: distance,
        mismatch_threshold: threshold,
    })
}

/// All-vs-all index distances per lane. Lanes with fewer than two indexed
/// samples are left out.
pub fn calculate_index_distances(
    run: &SequencingRun,
    instrument: &InstrumentCapabilities,
) -> BTreeMap<u32, IndexDistanceMatrix> {
    let total_lanes = instrument.lanes_for_flowcell(&run.flowcell_type);
    group_indexed_by_lane(&run.samples, total_lanes)
        .into_iter()
        .filter(|(_, samples)| samples.len() >= 2)
        .map(|(lane, samples)| (lane, lane_distances(&samples)))
        .collect()
}

fn lane_distances(samples: &[&Sample]) -> IndexDistanceMatrix {
    let n = samples.len();
    let mut i7_distances: DistanceGrid = vec![vec![None; n]; n];
    let mut i5_distances: DistanceGrid = vec![vec![None; n]; n];
    let mut combined_distances: DistanceGrid = vec![vec![None; n]; n];

    for (i, j) in (0..n).tuple_combinations() {
        let (s1, s2) = (samples[i], samples[j]);
        let i7 = seq_distance(s1.index1_sequence(), s2.index1_sequence());
        let i5 = seq_distance(s1.index2_sequence(), s2.index2_sequence());
        let combined = i7.zip(i5).map(|(a, b)| a + b);
        for (grid, value) in [
            (&mut i7_distances, i7),
            (&mut i5_distances, i5),
            (&mut combined_distances, combined),
        ] {
            grid[i][j] = value;
            grid[j][i] = value;
        }
    }

    IndexDistanceMatrix {
        sample_ids: samples.iter().map(|s| s.id.clone()).collect(),
        sample_names: samples
            .iter()
            .map(|s| s.display_name().to_string())
            .collect(),
        i7_distances,
        i5_distances,
        combined_distances,
    }
}

fn seq_distance(a: Option<&str>, b: Option<&str>) -> Option<usize> {
    Some(hamming_distance(a?, b?))
}
