//! Custom assertion helpers for integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::Path;

/// Lines of `text` that are not header lines (do not start with `#`, `track`
/// or `browser`).
pub fn data_lines(text: &str) -> Vec<&str> {
    text.lines()
        .filter(|l| !l.starts_with('#') && !l.starts_with("track") && !l.starts_with("browser"))
        .collect()
}

/// `(contig, start)` of each data line, reading the start from `start_col`
/// (0-based).
pub fn keys(text: &str, start_col: usize) -> Vec<(String, i64)> {
    data_lines(text)
        .into_iter()
        .map(|line| {
            let cols: Vec<&str> = line.split('\t').collect();
            (cols[0].to_string(), cols[start_col].parse().expect("numeric start"))
        })
        .collect()
}

/// Asserts that data lines are in non-decreasing (byte-wise contig, start) order.
///
/// # Panics
///
/// Panics on the first out-of-order pair.
pub fn assert_coordinate_sorted(text: &str, start_col: usize) {
    let keys = keys(text, start_col);
    for pair in keys.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        assert!(
            (a.0.as_bytes(), a.1) <= (b.0.as_bytes(), b.1),
            "records out of order: {}:{} before {}:{}",
            a.0,
            a.1,
            b.0,
            b.1
        );
    }
}

/// Sorted names of the entries of `dir`.
pub fn dir_entries(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .expect("Failed to read directory")
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

/// Asserts that two texts hold the same lines, ignoring order.
pub fn assert_same_lines(a: &str, b: &str) {
    let mut left: Vec<&str> = a.lines().collect();
    let mut right: Vec<&str> = b.lines().collect();
    left.sort_unstable();
    right.sort_unstable();
    assert_eq!(left, right, "line multisets differ");
}
