//! Sort genomic interval files by coordinate.
//!
//! Sorts BED, bedGraph, GFF/GTF and VCF files (optionally gzip-compressed) with a
//! bounded-memory external merge sort and prints the absolute path of the sorted
//! file.
//!
//! # Verification
//!
//! Use `--verify` to check if a file is correctly sorted without writing output.

use anyhow::{Result, bail};
use clap::Parser;
use ivsort_lib::logging::{OperationTimer, format_count};
use ivsort_lib::sort::{ExternalSorter, SortRequest, verify_sorted};
use ivsort_lib::validation::validate_file_exists;
use log::info;
use std::path::PathBuf;

use crate::commands::command::Command;

/// Sort an interval file.
#[derive(Debug, Parser)]
#[command(
    name = "sort",
    about = "\x1b[38;5;72m[SORTING]\x1b[0m        \x1b[36mSort a BED, bedGraph, GFF/GTF or VCF file by coordinate\x1b[0m",
    long_about = r#"
Sort a genomic interval file using a bounded-memory external merge sort.

Records are ordered by contig name (byte-wise, so chr10 sorts before chr2) and
then by start coordinate. Header lines (comments, track/browser lines, ##
directives) are written first, in their original order.

FORMATS (selected by extension, optionally followed by .gz):

  .bed                        BED
  .bdg .bg .bedGraph          bedGraph
  .gff .gff3 .gtf             GFF / GTF
  .vcf                        VCF

The output is gzip-compressed when its name ends in .gz. It is written to a
temporary file next to the output and renamed into place when complete.

EXAMPLES:

  # Sort into peaks.bed.sorted
  ivsort sort -i peaks.bed

  # Sort a large annotation with 2G of memory on a fast scratch disk
  ivsort sort -i genes.gtf.gz -o genes.sorted.gtf.gz -m 2G -T /scratch --threads 4

  # Verify a file is correctly sorted
  ivsort sort -i calls.vcf --verify
"#
)]
pub struct Sort {
    /// Input interval file.
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,

    /// Output file (defaults to the input path with ".sorted" appended).
    #[arg(short = 'o', long = "output", conflicts_with = "verify")]
    pub output: Option<PathBuf>,

    /// Verify the input file is correctly sorted (no output written).
    ///
    /// Reads records sequentially and checks that each record's key is >= the
    /// previous record's key. Exits 0 if sorted correctly, non-zero if any
    /// records are out of order.
    #[arg(long = "verify", conflicts_with = "output")]
    pub verify: bool,

    /// Maximum memory to use for buffering records.
    ///
    /// Accepts values like "500M", "2G" or "512K"; a bare number is megabytes.
    /// When the limit is reached, the buffered records are sorted and written
    /// to a temporary run file, and all runs are merged at the end.
    #[arg(short = 'm', long = "max-memory", default_value = "500M", value_parser = parse_memory)]
    pub max_memory: usize,

    /// Temporary directory for run files.
    ///
    /// If not specified, uses the system default temp directory.
    #[arg(short = 'T', long = "tmp-dir")]
    pub tmp_dir: Option<PathBuf>,

    /// Number of threads for sorting runs.
    #[arg(short = '@', short_alias = 't', long = "threads", default_value = "1")]
    pub threads: usize,
}

/// Parse memory size string (e.g., "512M", "1G", "2G"); a bare number is megabytes.
fn parse_memory(s: &str) -> Result<usize, String> {
    let s = s.trim().to_uppercase();

    if s.is_empty() {
        return Err("Empty memory size".to_string());
    }

    let (num_str, multiplier): (&str, u32) = if let Some(num) = s.strip_suffix('G') {
        (num, 1024 * 1024 * 1024)
    } else if let Some(num) = s.strip_suffix('M') {
        (num, 1024 * 1024)
    } else if let Some(num) = s.strip_suffix('K') {
        (num, 1024)
    } else {
        (s.as_str(), 1024 * 1024)
    };

    let num: f64 = num_str.parse().map_err(|_| format!("Invalid number: {num_str}"))?;

    if !num.is_finite() || num <= 0.0 {
        return Err("Memory size must be positive".to_string());
    }

    Ok((num * f64::from(multiplier)) as usize)
}

impl Command for Sort {
    fn execute(&self) -> Result<()> {
        validate_file_exists(&self.input, "Input file")?;

        if self.threads == 0 {
            bail!("--threads must be greater than 0");
        }

        if self.verify {
            return self.execute_verify();
        }

        self.execute_sort()
    }
}

impl Sort {
    /// Execute sort mode: sort the input and print the output path.
    fn execute_sort(&self) -> Result<()> {
        let output = match &self.output {
            Some(output) => output.clone(),
            None => SortRequest::new(&self.input).resolved_output(),
        };

        info!("Starting Sort");
        info!("Input: {}", self.input.display());
        info!("Output: {}", output.display());
        info!("Max memory: {} MB", self.max_memory / (1024 * 1024));
        info!("Threads: {}", self.threads);
        if let Some(ref tmp) = self.tmp_dir {
            info!("Temp directory: {}", tmp.display());
        }

        let mut sorter =
            ExternalSorter::new().memory_limit(self.max_memory).threads(self.threads);
        if let Some(ref tmp) = self.tmp_dir {
            sorter = sorter.temp_dir(tmp.clone());
        }

        let stats = sorter.sort(&self.input, &output)?;
        println!("{}", stats.output.display());
        Ok(())
    }

    /// Execute verify mode: read records and check sort order.
    fn execute_verify(&self) -> Result<()> {
        let timer = OperationTimer::new("Verifying sort order");

        info!("Starting Sort Verification");
        info!("Input: {}", self.input.display());

        let report = verify_sorted(&self.input)?;
        timer.log_completion(report.records);

        if let Some(violation) = &report.first_violation {
            bail!(
                "{} is not sorted: {} record(s) out of order, first at {}",
                self.input.display(),
                format_count(report.violations),
                violation
            );
        }

        info!("Result: PASS - file is correctly sorted");
        Ok(())
    }
}
