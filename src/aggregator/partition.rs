use std::collections::BTreeMap;

use crate::models::VolumeSample;

/// Group samples by ticker and sort each partition by time ascending
///
/// Upstream ordering is not trusted: each partition is re-sorted here so the
/// non-decreasing timestamp invariant holds no matter how the store returned
/// the rows. The BTreeMap keeps ticker iteration order deterministic from
/// run to run.
pub fn partition_by_ticker(samples: Vec<VolumeSample>) -> BTreeMap<String, Vec<VolumeSample>> {
    let mut partitions: BTreeMap<String, Vec<VolumeSample>> = BTreeMap::new();

    for sample in samples {
        partitions
            .entry(sample.ticker.clone())
            .or_default()
            .push(sample);
    }

    for partition in partitions.values_mut() {
        // Stable sort: equal timestamps keep their arrival order
        partition.sort_by_key(|sample| sample.time);
    }

    partitions
}
