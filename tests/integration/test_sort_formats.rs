//! Sorting of each supported format, compressed and uncompressed.

use std::fs;

use ivsort_lib::sort::{ExternalSorter, SortRequest, sort};
use rstest::rstest;

use crate::helpers::{
    Workspace, assert_coordinate_sorted, assert_same_lines, data_lines, dir_entries, read_gzip,
    write_gzip,
};

#[test]
fn test_bedgraph_keeps_signal_column() {
    let ws = Workspace::new();
    let input = ws.file(
        "signal.bedGraph",
        "track type=bedGraph name=cov\n\
         chr2\t0\t100\t1.5\n\
         chr1\t100\t200\t-0.25\n\
         chr1\t0\t100\t3\n",
    );
    let output = ws.path().join("signal.sorted.bedGraph");
    ExternalSorter::new().memory_limit(1).temp_dir(ws.tmp()).sort(&input, &output).unwrap();

    assert_eq!(
        fs::read_to_string(&output).unwrap(),
        "track type=bedGraph name=cov\n\
         chr1\t0\t100\t3\n\
         chr1\t100\t200\t-0.25\n\
         chr2\t0\t100\t1.5\n"
    );
}

#[test]
fn test_gff_fasta_section_follows_records() {
    let ws = Workspace::new();
    let input = ws.file(
        "genes.gff3",
        "##gff-version 3\n\
         ctg2\tsrc\tgene\t500\t900\t.\t+\t.\tID=g3\n\
         ctg1\tsrc\tgene\t300\t400\t.\t-\t.\tID=g2\n\
         ##sequence-region ctg1 1 1000\n\
         ctg1\tsrc\tgene\t10\t90\t.\t+\t.\tID=g1\n\
         ##FASTA\n\
         >ctg1\n\
         ACGTACGT\n",
    );
    let output = ws.path().join("genes.sorted.gff3");
    ExternalSorter::new().memory_limit(1).temp_dir(ws.tmp()).sort(&input, &output).unwrap();

    assert_eq!(
        fs::read_to_string(&output).unwrap(),
        "##gff-version 3\n\
         ##sequence-region ctg1 1 1000\n\
         ctg1\tsrc\tgene\t10\t90\t.\t+\t.\tID=g1\n\
         ctg1\tsrc\tgene\t300\t400\t.\t-\t.\tID=g2\n\
         ctg2\tsrc\tgene\t500\t900\t.\t+\t.\tID=g3\n\
         ##FASTA\n\
         >ctg1\n\
         ACGTACGT\n"
    );
}

#[test]
fn test_spilled_gff_streams_fasta_section_through_temp_dir() {
    let ws = Workspace::new();
    let genes: String = (0..20)
        .map(|i| format!("ctg1\tsrc\tgene\t{}\t{}\t.\t+\t.\tID=g{i}\n", 1000 - i * 10, 1005))
        .collect();
    let fasta: String =
        (0..50).map(|i| format!(">seq{i}\n{}\n", "ACGT".repeat(20))).collect::<String>();
    let input = ws.file("genes.gff3", &format!("##gff-version 3\n{genes}##FASTA\n{fasta}"));
    let output = ws.path().join("genes.sorted.gff3");

    let stats =
        ExternalSorter::new().memory_limit(1).temp_dir(ws.tmp()).sort(&input, &output).unwrap();
    assert_eq!(stats.runs_written, 20);
    assert_eq!(stats.trailer_lines, 101);
    assert!(dir_entries(&ws.tmp()).is_empty());

    let text = fs::read_to_string(&output).unwrap();
    assert!(text.ends_with(&format!("##FASTA\n{fasta}")));
    let records: Vec<&str> = data_lines(&text).into_iter().take(20).collect();
    assert_coordinate_sorted(&records.join("\n"), 3);
}

#[test]
fn test_gtf_sorts_on_start_column() {
    let ws = Workspace::new();
    let input = ws.file(
        "tx.gtf",
        "chr1\tsrc\texon\t900\t950\t.\t+\t.\tgene_id \"a\";\n\
         chr1\tsrc\texon\t100\t150\t.\t+\t.\tgene_id \"a\";\n\
         chr1\tsrc\texon\t500\t550\t.\t+\t.\tgene_id \"a\";\n",
    );
    let output = ws.path().join("tx.sorted.gtf");
    ExternalSorter::new().temp_dir(ws.tmp()).sort(&input, &output).unwrap();
    assert_coordinate_sorted(&fs::read_to_string(&output).unwrap(), 3);
}

#[test]
fn test_vcf_header_and_records() {
    let ws = Workspace::new();
    let input = ws.file(
        "calls.vcf",
        "##fileformat=VCFv4.2\n\
         ##contig=<ID=chr1>\n\
         #CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\n\
         chr1\t300\t.\tA\tG\t50\tPASS\t.\n\
         chr1\t100\t.\tN\t<DEL>\t50\tPASS\tSVTYPE=DEL;END=250\n\
         chr1\t200\t.\tAC\tA\t50\tPASS\t.\n",
    );
    let output = ws.path().join("calls.sorted.vcf");
    ExternalSorter::new().memory_limit(1).temp_dir(ws.tmp()).sort(&input, &output).unwrap();

    let text = fs::read_to_string(&output).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    let header = "#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO";
    assert_eq!(&lines[..3], &["##fileformat=VCFv4.2", "##contig=<ID=chr1>", header]);
    assert_coordinate_sorted(&text, 1);
    assert_eq!(data_lines(&text).len(), 3);
    assert!(lines[3].ends_with("END=250"));
}

#[rstest]
#[case::bed("in.bed.gz", "chr2\t1\t2\nchr1\t1\t2\n", "chr1\t1\t2\nchr2\t1\t2\n")]
#[case::vcf(
    "in.vcf.gz",
    "#CHROM\nc2\t1\t.\tA\tC\t.\t.\t.\nc1\t1\t.\tA\tC\t.\t.\t.\n",
    "#CHROM\nc1\t1\t.\tA\tC\t.\t.\t.\nc2\t1\t.\tA\tC\t.\t.\t.\n"
)]
fn test_gzip_input_to_gzip_output(
    #[case] name: &str,
    #[case] content: &str,
    #[case] expected: &str,
) {
    let ws = Workspace::new();
    let input = write_gzip(ws.path(), name, content);
    let output = ws.path().join(format!("sorted.{name}"));
    ExternalSorter::new().memory_limit(1).temp_dir(ws.tmp()).sort(&input, &output).unwrap();

    let bytes = fs::read(&output).unwrap();
    assert_eq!(&bytes[..2], &[0x1f, 0x8b], "output should be gzip-compressed");
    assert_eq!(read_gzip(&output), expected);
}

#[test]
fn test_gzip_input_to_plain_output() {
    let ws = Workspace::new();
    let content = "chr3\t5\t6\nchr1\t5\t6\nchr2\t5\t6\n";
    let input = write_gzip(ws.path(), "in.bed.gz", content);
    let output = ws.path().join("out.bed");
    ExternalSorter::new().temp_dir(ws.tmp()).sort(&input, &output).unwrap();

    let text = fs::read_to_string(&output).unwrap();
    assert_eq!(text, "chr1\t5\t6\nchr2\t5\t6\nchr3\t5\t6\n");
    assert_same_lines(&text, content);
}

#[test]
fn test_default_output_of_gzip_input_is_plain_text() {
    let ws = Workspace::new();
    let input = write_gzip(ws.path(), "in.bed.gz", "chr2\t1\t2\nchr1\t1\t2\n");
    let request = SortRequest::new(&input).with_temp_dir(ws.tmp());
    let sorted = sort(&request).unwrap();

    assert!(sorted.to_string_lossy().ends_with("in.bed.gz.sorted"));
    assert_eq!(fs::read_to_string(&sorted).unwrap(), "chr1\t1\t2\nchr2\t1\t2\n");
}

#[test]
fn test_plain_input_to_gzip_output() {
    let ws = Workspace::new();
    let input = ws.file("in.bdg", "chr1\t50\t60\t1\nchr1\t10\t20\t2\n");
    let output = ws.path().join("out.bdg.gz");
    ExternalSorter::new().temp_dir(ws.tmp()).sort(&input, &output).unwrap();
    assert_eq!(read_gzip(&output), "chr1\t10\t20\t2\nchr1\t50\t60\t1\n");
}
