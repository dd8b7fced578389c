//! Property-based checks of the sort against an in-memory stable sort.

use std::fs;

use ivsort_lib::sort::ExternalSorter;
use proptest::prelude::*;

use crate::helpers::{Workspace, bed_text, dir_entries};

const CONTIGS: [&str; 5] = ["chr1", "chr10", "chr2", "chrX", "chrUn_KI270302v1"];

/// Sorts `records` with the given budget and returns the output lines.
fn sort_lines(records: &[(&str, i64)], budget: usize, threads: usize) -> Vec<String> {
    let ws = Workspace::new();
    let input = ws.file("in.bed", &bed_text(records));
    let output = ws.path().join("out.bed");
    ExternalSorter::new()
        .memory_limit(budget)
        .threads(threads)
        .temp_dir(ws.tmp())
        .sort(&input, &output)
        .expect("sort should succeed");
    assert!(dir_entries(&ws.tmp()).is_empty(), "run files left behind");
    fs::read_to_string(&output).unwrap().lines().map(str::to_string).collect()
}

/// The expected output: a stable sort of the input lines by (contig bytes, start).
fn expected_lines(records: &[(&str, i64)]) -> Vec<String> {
    let mut indexed: Vec<(usize, &(&str, i64))> = records.iter().enumerate().collect();
    indexed.sort_by(|(_, a), (_, b)| (a.0.as_bytes(), a.1).cmp(&(b.0.as_bytes(), b.1)));
    let text: String = indexed
        .into_iter()
        .map(|(i, (contig, start))| format!("{contig}\t{start}\t{}\tr{i}\n", start + 100))
        .collect();
    text.lines().map(str::to_string).collect()
}

fn records_strategy() -> impl Strategy<Value = Vec<(&'static str, i64)>> {
    prop::collection::vec((0..CONTIGS.len(), 0i64..500), 0..150)
        .prop_map(|v| v.into_iter().map(|(c, s)| (CONTIGS[c], s)).collect())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn proptest_output_is_stable_sort_of_input(
        records in records_strategy(),
        budget in 1usize..4_000,
    ) {
        let actual = sort_lines(&records, budget, 1);
        prop_assert_eq!(actual, expected_lines(&records));
    }

    #[test]
    fn proptest_parallel_output_matches_single_threaded(
        records in records_strategy(),
        budget in 1usize..4_000,
        threads in 2usize..5,
    ) {
        let single = sort_lines(&records, budget, 1);
        let parallel = sort_lines(&records, budget, threads);
        prop_assert_eq!(parallel, single);
    }

    #[test]
    fn proptest_unique_keys_are_budget_independent(
        keys in prop::collection::hash_set((0..CONTIGS.len(), 0i64..10_000), 0..120),
        small in 1usize..2_000,
    ) {
        let records: Vec<(&str, i64)> = keys.into_iter().map(|(c, s)| (CONTIGS[c], s)).collect();
        let spilled = sort_lines(&records, small, 1);
        let in_memory = sort_lines(&records, 1 << 30, 1);
        prop_assert_eq!(spilled.len(), records.len());
        prop_assert_eq!(spilled, in_memory);
    }
}
