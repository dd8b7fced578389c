//! Error path integration tests.
//!
//! These tests verify that every failure surfaces as a `sorting failed:` error of
//! the right kind, and that a failed sort leaves no partial output or run files
//! behind.

use std::fs;

use ivsort_lib::errors::{ErrorKind, SortError};
use ivsort_lib::sort::{ExternalSorter, SortRequest, sort};
use rstest::rstest;

use crate::helpers::{Workspace, dir_entries};

#[test]
fn test_malformed_line_reports_line_number() {
    let ws = Workspace::new();
    let input = ws.file("bad.bed", "chr1\t1\t2\nchr1\t5\t6\nchr1\t10\nchr1\t3\t4\n");
    let output = ws.path().join("out.bed");

    let err = ExternalSorter::new().temp_dir(ws.tmp()).sort(&input, &output).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Decode);
    let decode = err.decode_error().unwrap();
    assert_eq!(decode.line_number, 3);
    assert_eq!(decode.line, "chr1\t10");
    assert!(err.to_string().starts_with("sorting failed: "));
    assert!(!output.exists());
    assert!(dir_entries(&ws.tmp()).is_empty());
    assert_eq!(dir_entries(ws.path()), vec!["bad.bed", "tmp"]);
}

#[test]
fn test_malformed_line_after_spills_cleans_up_runs() {
    let ws = Workspace::new();
    let mut text: String = (0..50).map(|i| format!("chr1\t{}\t{}\n", 100 - i, 200 - i)).collect();
    text.push_str("chr1\tnot-a-number\t5\n");
    let input = ws.file("bad.bed", &text);
    let output = ws.path().join("out.bed");

    let err = ExternalSorter::new()
        .memory_limit(300)
        .temp_dir(ws.tmp())
        .sort(&input, &output)
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Decode);
    assert_eq!(err.decode_error().unwrap().line_number, 51);
    assert!(!output.exists());
    assert!(dir_entries(&ws.tmp()).is_empty());
}

#[test]
fn test_failed_sort_preserves_existing_output() {
    let ws = Workspace::new();
    let input = ws.file("bad.bed", "chr1\t1\t2\nchr1\n");
    let output = ws.file("out.bed", "previous contents\n");

    ExternalSorter::new().temp_dir(ws.tmp()).sort(&input, &output).unwrap_err();
    assert_eq!(fs::read_to_string(&output).unwrap(), "previous contents\n");
}

#[rstest]
#[case::no_extension("peaks")]
#[case::bam("reads.bam")]
#[case::upper_case("PEAKS.BED")]
#[case::gzip_only("peaks.gz")]
fn test_unsupported_extension(#[case] name: &str) {
    let ws = Workspace::new();
    let input = ws.file(name, "chr1\t1\t2\n");

    let err = sort(&SortRequest::new(&input).with_temp_dir(ws.tmp())).unwrap_err();
    assert!(matches!(err, SortError::UnsupportedExtension { .. }));
    assert_eq!(err.kind(), ErrorKind::Configuration);
    assert!(err.to_string().starts_with("sorting failed: "));
}

#[test]
fn test_missing_input() {
    let ws = Workspace::new();
    let err = sort(&SortRequest::new(ws.path().join("missing.bed"))).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
    assert!(err.to_string().contains("missing.bed"));
}

#[test]
fn test_missing_temp_dir() {
    let ws = Workspace::new();
    let input = ws.file("in.bed", "chr1\t1\t2\n");
    let request = SortRequest::new(&input).with_temp_dir(ws.path().join("no-such-dir"));

    let err = sort(&request).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
    assert!(!ws.path().join("in.bed.sorted").exists());
}

#[test]
fn test_missing_output_directory() {
    let ws = Workspace::new();
    let input = ws.file("in.bed", "chr1\t1\t2\n");
    let request = SortRequest::new(&input)
        .with_output(ws.path().join("absent").join("out.bed"))
        .with_temp_dir(ws.tmp());

    let err = sort(&request).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
}

#[test]
fn test_output_is_a_directory() {
    let ws = Workspace::new();
    let input = ws.file("in.bed", "chr1\t1\t2\n");
    let request = SortRequest::new(&input).with_output(ws.tmp()).with_temp_dir(ws.tmp());

    let err = sort(&request).unwrap_err();
    assert!(matches!(err, SortError::InvalidPath { .. }));
}

#[test]
fn test_zero_memory_budget() {
    let ws = Workspace::new();
    let input = ws.file("in.bed", "chr1\t1\t2\n");

    let err = sort(&SortRequest::new(&input).with_max_memory_mb(0)).unwrap_err();
    assert!(matches!(err, SortError::InvalidParameter { .. }));
    assert!(!ws.path().join("in.bed.sorted").exists());
}

#[test]
fn test_merge_fan_in_below_two() {
    let ws = Workspace::new();
    let input = ws.file("in.bed", "chr1\t1\t2\n");
    let output = ws.path().join("out.bed");

    let err = ExternalSorter::new().merge_fan_in(1).sort(&input, &output).unwrap_err();
    assert!(matches!(err, SortError::InvalidParameter { .. }));
    assert_eq!(err.kind(), ErrorKind::Configuration);
    assert!(!output.exists());
}

#[rstest]
#[case::not_a_number("chr1\t0\t10\tabc\n", "invalid signal value 'abc'")]
#[case::missing_value("chr1\t0\t10\n", "expected at least 4 columns")]
#[case::not_finite("chr1\t0\t10\tNaN\n", "invalid signal value 'NaN'")]
fn test_bad_bedgraph_value(#[case] text: &str, #[case] reason: &str) {
    let ws = Workspace::new();
    let input = ws.file("in.bedGraph", text);
    let output = ws.path().join("out.bedGraph");

    let err = ExternalSorter::new().temp_dir(ws.tmp()).sort(&input, &output).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Decode);
    assert!(err.to_string().contains(reason), "{err}");
}

#[test]
fn test_gff_with_wrong_column_count() {
    let ws = Workspace::new();
    let input = ws.file("in.gff3", "##gff-version 3\nctg1\tsrc\tgene\t1\t10\n");
    let output = ws.path().join("out.gff3");

    let err = ExternalSorter::new().temp_dir(ws.tmp()).sort(&input, &output).unwrap_err();
    assert_eq!(err.decode_error().unwrap().line_number, 2);
    assert!(err.to_string().contains("expected 9 columns, found 5"));
}

#[test]
fn test_invalid_utf8_is_a_decode_error() {
    let ws = Workspace::new();
    let input = ws.path().join("in.bed");
    fs::write(&input, b"chr1\t1\t2\nchr\xff\t1\t2\n").unwrap();
    let output = ws.path().join("out.bed");

    let err = ExternalSorter::new().temp_dir(ws.tmp()).sort(&input, &output).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Decode);
    assert_eq!(err.decode_error().unwrap().line_number, 2);
}
