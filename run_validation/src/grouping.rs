//! Lane membership of samples.

use fxhash::FxHashMap;
use itertools::Itertools;
use run_types::Sample;
use std::collections::BTreeMap;
use std::hash::Hash;

/// Samples per lane, in run order within each lane.
pub type LaneSamples<'a> = BTreeMap<u32, Vec<&'a Sample>>;

/// Assign each sample to its explicit lanes, or to every lane `1..=total_lanes`
/// when it has none. A lane listed twice on one sample counts once.
pub fn group_by_lane<'a>(
    samples: impl IntoIterator<Item = &'a Sample>,
    total_lanes: u32,
) -> LaneSamples<'a> {
    let mut lanes = LaneSamples::new();
    for sample in samples {
        if sample.in_all_lanes() {
            for lane in 1..=total_lanes {
                lanes.entry(lane).or_default().push(sample);
            }
        } else {
            for &lane in sample.lanes.iter().unique() {
                lanes.entry(lane).or_default().push(sample);
            }
        }
    }
    lanes
}

/// [`group_by_lane`] restricted to samples with an i7 index.
pub fn group_indexed_by_lane(samples: &[Sample], total_lanes: u32) -> LaneSamples<'_> {
    group_by_lane(samples.iter().filter(|s| s.has_index()), total_lanes)
}

/// Group values by key, keeping groups in order of first appearance.
pub(crate) fn group_in_order<K, V>(items: impl IntoIterator<Item = (K, V)>) -> Vec<(K, Vec<V>)>
where
    K: Hash + Eq + Clone,
{
    let mut slot: FxHashMap<K, usize> = FxHashMap::default();
    let mut groups: Vec<(K, Vec<V>)> = Vec::new();
    for (key, value) in items {
        if let Some(&i) = slot.get(&key) {
            groups[i].1.push(value);
        } else {
            slot.insert(key.clone(), groups.len());
            groups.push((key, vec![value]));
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use run_types::Index;

    fn sample(id: &str, lanes: &[u32], i7: Option<&str>) -> Sample {
        Sample {
            id: id.to_string(),
            sample_id: id.to_string(),
            lanes: lanes.to_vec(),
            index1: i7.map(|seq| Index::new("i7", seq)),
            ..Default::default()
        }
    }

    fn ids<'a>(lanes: &LaneSamples<'a>) -> Vec<(u32, Vec<&'a str>)> {
        lanes
            .iter()
            .map(|(lane, samples)| (*lane, samples.iter().map(|s| s.id.as_str()).collect()))
            .collect()
    }

    #[test]
    fn test_empty_lanes_means_all() {
        let samples = vec![
            sample("a", &[], Some("ACGT")),
            sample("b", &[2], Some("TTTT")),
            sample("c", &[], Some("GGGG")),
        ];
        assert_eq!(
            ids(&group_by_lane(&samples, 2)),
            vec![(1, vec!["a", "c"]), (2, vec!["a", "b", "c"])]
        );
    }

    #[test]
    fn test_duplicate_lane_counted_once() {
        let samples = vec![sample("a", &[1, 1, 3], None)];
        assert_eq!(
            ids(&group_by_lane(&samples, 4)),
            vec![(1, vec!["a"]), (3, vec!["a"])]
        );
    }

    #[test]
    fn test_indexed_only() {
        let samples = vec![sample("a", &[], Some("ACGT")), sample("b", &[], None)];
        assert_eq!(
            ids(&group_indexed_by_lane(&samples, 1)),
            vec![(1, vec!["a"])]
        );
        assert!(group_indexed_by_lane(&[], 8).is_empty());
    }

    #[test]
    fn test_group_in_order() {
        let groups = group_in_order([("x", 1), ("y", 2), ("x", 3)]);
        assert_eq!(groups, vec![("x", vec![1, 3]), ("y", vec![2])]);
    }
}
