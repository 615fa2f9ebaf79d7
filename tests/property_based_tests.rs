//! Property-based tests for aggregation invariants
//!
//! Datapoints are built with explicit timestamps so expected totals are exact.

mod utils;

use proptest::prelude::*;
use scriptprof::{Datapoint, ProfileRegistry, ScriptProfile, SourceRange, Stats};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use utils::numbered_source;

const LINES: usize = 20;

fn session() -> ScriptProfile {
    ScriptProfile::with_registry(Arc::new(ProfileRegistry::new()))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_count_and_duration_match_inputs(
        samples in prop::collection::vec((1usize..=LINES, 0u64..1_000_000), 0..200),
    ) {
        // Property: per-line count and duration equal what was delivered
        let source = numbered_source("prop.script", LINES);
        let mut profile = session();
        let base = Instant::now();
        let mut expected: BTreeMap<usize, (u64, Duration)> = BTreeMap::new();

        for (line, nanos) in &samples {
            let range = SourceRange::for_line(source.clone(), *line).unwrap();
            let elapsed = Duration::from_nanos(*nanos);
            profile
                .add_datapoint(Datapoint::from_parts(range, base, Some(base + elapsed)))
                .unwrap();
            let entry = expected.entry(*line).or_default();
            entry.0 += 1;
            entry.1 += elapsed;
        }

        let stats = profile.dump_stats();
        if samples.is_empty() {
            prop_assert!(stats.is_empty());
        } else {
            let lines = &stats[&source];
            prop_assert_eq!(lines.len(), expected.len());
            for (line, (count, duration)) in &expected {
                prop_assert_eq!(lines[line].count, *count);
                prop_assert_eq!(lines[line].duration, *duration);
            }
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    #[test]
    fn prop_split_dumps_equal_single_dump(
        samples in prop::collection::vec((1usize..=LINES, 0u64..10_000), 1..100),
        split in 0usize..100,
    ) {
        // Property: dumping in two batches gives the same result as one batch
        let source = numbered_source("split.script", LINES);
        let base = Instant::now();
        let datapoints: Vec<Datapoint> = samples
            .iter()
            .map(|(line, micros)| {
                let range = SourceRange::for_line(source.clone(), *line).unwrap();
                Datapoint::from_parts(range, base, Some(base + Duration::from_micros(*micros)))
            })
            .collect();
        let split = split.min(datapoints.len());

        let mut once = session();
        for dp in &datapoints {
            once.add_datapoint(dp.clone()).unwrap();
        }
        let once_stats: Stats = once.dump_stats().clone();

        let mut twice = session();
        for dp in &datapoints[..split] {
            twice.add_datapoint(dp.clone()).unwrap();
        }
        twice.dump_stats();
        for dp in &datapoints[split..] {
            twice.add_datapoint(dp.clone()).unwrap();
        }
        let twice_stats: Stats = twice.dump_stats().clone();

        prop_assert_eq!(&once_stats, &twice_stats);
        // And a further dump with nothing new changes nothing
        prop_assert_eq!(twice.dump_stats(), &twice_stats);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_range_attributed_to_start_line(
        start in 0usize..200,
        len in 0usize..200,
    ) {
        // Property: a range's line is the first of the lines it covers
        let source = numbered_source("range.script", LINES);
        let range = SourceRange::new(source.clone(), start, start + len);

        let lines = range.lines();
        prop_assert_eq!(*lines.start(), range.line());
        prop_assert!(lines.end() >= lines.start());
        prop_assert!(*lines.end() <= source.line_count());
    }
}
