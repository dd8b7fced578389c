//! External merge sort of interval files.
//!
//! Sorting runs in two phases under a single memory limit:
//!
//! 1. **Run phase**: decode the input lazily, buffer records up to the memory
//!    limit, sort each full buffer and spill it to a run file. An input that fits
//!    in one buffer is never spilled.
//! 2. **Merge phase**: k-way merge of the runs into a temporary sibling of the
//!    output, preceded by the header lines and followed by any trailer, then an
//!    atomic rename onto the output path.
//!
//! Configuration (codec, memory limit, paths) is validated before any data is
//! read. Run files live in a per-call directory under the temp directory that is
//! removed on every exit path; on failure no output file is left behind.
//!
//! # Example
//!
//! ```no_run
//! use ivsort_lib::sort::ExternalSorter;
//! use std::path::Path;
//!
//! let stats = ExternalSorter::new()
//!     .memory_limit(256 * 1024 * 1024)
//!     .temp_dir("/scratch".into())
//!     .threads(4)
//!     .sort(Path::new("peaks.bed"), Path::new("peaks.sorted.bed"))?;
//! println!("{} records in {} runs", stats.total_records, stats.runs_written);
//! # Ok::<(), ivsort_lib::errors::SortError>(())
//! ```

use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::info;

use crate::errors::{Result, ResourceContext, SortError};
use crate::logging::{OperationTimer, format_count, log_sort_summary};
use crate::sort::builder::RunBuilder;
use crate::sort::codec::{RecordCodec, codec_for_path};
use crate::sort::input::RecordStream;
use crate::sort::merge::{DEFAULT_MERGE_FAN_IN, RunMerger};
use crate::sort::temp::{PendingOutput, SpillRegistry, parent_dir};
use crate::validation::{validate_positive, validate_readable_file, validate_writable_dir};

/// Default memory budget of a sort, in megabytes.
pub const DEFAULT_MAX_MEMORY_MB: u64 = 500;

/// Suffix appended to the input path when no output path is given.
pub const SORTED_SUFFIX: &str = ".sorted";

const BYTES_PER_MB: u64 = 1024 * 1024;

/// One sort invocation: which file to sort, where to put the result, and how
/// much memory and which scratch space to use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortRequest {
    /// File to sort; its extension selects the format.
    pub input_path: PathBuf,
    /// Destination; defaults to the input path with [`SORTED_SUFFIX`] appended.
    pub output_path: Option<PathBuf>,
    /// Memory budget in megabytes.
    pub max_memory_mb: u64,
    /// Parent directory for run files; defaults to the system temp directory.
    pub temp_dir: Option<PathBuf>,
}

impl SortRequest {
    /// Creates a request with the default output path and memory budget.
    #[must_use]
    pub fn new(input_path: impl Into<PathBuf>) -> Self {
        Self {
            input_path: input_path.into(),
            output_path: None,
            max_memory_mb: DEFAULT_MAX_MEMORY_MB,
            temp_dir: None,
        }
    }

    /// Sets the output path.
    #[must_use]
    pub fn with_output(mut self, output_path: impl Into<PathBuf>) -> Self {
        self.output_path = Some(output_path.into());
        self
    }

    /// Sets the memory budget in megabytes.
    #[must_use]
    pub fn with_max_memory_mb(mut self, max_memory_mb: u64) -> Self {
        self.max_memory_mb = max_memory_mb;
        self
    }

    /// Sets the parent directory for run files.
    #[must_use]
    pub fn with_temp_dir(mut self, temp_dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = Some(temp_dir.into());
        self
    }

    /// The output path this request writes to.
    #[must_use]
    pub fn resolved_output(&self) -> PathBuf {
        self.output_path.clone().unwrap_or_else(|| {
            let mut path = self.input_path.clone().into_os_string();
            path.push(SORTED_SUFFIX);
            PathBuf::from(path)
        })
    }
}

/// Sorts the file named by `request` and returns the absolute path of the
/// sorted output.
///
/// # Errors
///
/// Returns a [`SortError`] (message prefixed `sorting failed:`) if the request
/// is invalid, a data line cannot be decoded, or I/O fails.
pub fn sort(request: &SortRequest) -> Result<PathBuf> {
    validate_positive(request.max_memory_mb, "max-memory")?;
    let memory_limit = request
        .max_memory_mb
        .checked_mul(BYTES_PER_MB)
        .and_then(|bytes| usize::try_from(bytes).ok())
        .ok_or_else(|| SortError::InvalidParameter {
            parameter: "max-memory".to_string(),
            reason: format!("{} MB exceeds the addressable memory", request.max_memory_mb),
        })?;

    let mut sorter = ExternalSorter::new().memory_limit(memory_limit);
    if let Some(dir) = &request.temp_dir {
        sorter = sorter.temp_dir(dir.clone());
    }
    let stats = sorter.sort(&request.input_path, &request.resolved_output())?;
    Ok(stats.output)
}

/// Statistics of a finished sort.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortStats {
    /// Header lines copied to the top of the output.
    pub header_lines: usize,
    /// Lines carried verbatim after the records (a GFF `##FASTA` section).
    pub trailer_lines: u64,
    /// Data records read from the input.
    pub total_records: u64,
    /// Data records written to the output.
    pub output_records: u64,
    /// Runs spilled to disk (zero when the input fit in memory).
    pub runs_written: usize,
    /// Wall-clock time of the sort.
    pub elapsed: Duration,
    /// Absolute path of the output.
    pub output: PathBuf,
}

/// Bounded-memory sorter for interval files.
#[derive(Debug, Clone)]
pub struct ExternalSorter {
    memory_limit: usize,
    temp_dir: Option<PathBuf>,
    threads: usize,
    merge_fan_in: usize,
}

impl Default for ExternalSorter {
    fn default() -> Self {
        Self::new()
    }
}

impl ExternalSorter {
    /// Creates a single-threaded sorter with the default memory limit.
    #[must_use]
    pub fn new() -> Self {
        Self {
            memory_limit: (DEFAULT_MAX_MEMORY_MB * BYTES_PER_MB) as usize,
            temp_dir: None,
            threads: 1,
            merge_fan_in: DEFAULT_MERGE_FAN_IN,
        }
    }

    /// Sets the memory limit in bytes.
    #[must_use]
    pub fn memory_limit(mut self, limit: usize) -> Self {
        self.memory_limit = limit;
        self
    }

    /// Sets the parent directory for run files.
    #[must_use]
    pub fn temp_dir(mut self, path: PathBuf) -> Self {
        self.temp_dir = Some(path);
        self
    }

    /// Sets the number of threads used for sorting runs.
    #[must_use]
    pub fn threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    /// Sets the maximum number of run files merged at once. More runs than this
    /// are first merged in intermediate passes.
    #[must_use]
    pub fn merge_fan_in(mut self, fan_in: usize) -> Self {
        self.merge_fan_in = fan_in;
        self
    }

    /// Sorts `input` into `output`, choosing the format from the input's extension.
    ///
    /// # Errors
    ///
    /// Returns an error if the extension is not supported, the configuration is
    /// invalid, a data line cannot be decoded, or I/O fails.
    pub fn sort(&self, input: &Path, output: &Path) -> Result<SortStats> {
        let codec = codec_for_path(input)?;
        self.sort_with_codec(input, output, codec)
    }

    /// Sorts `input` into `output` using an explicit codec.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid, a data line cannot be
    /// decoded, or I/O fails.
    pub fn sort_with_codec(
        &self,
        input: &Path,
        output: &Path,
        codec: &dyn RecordCodec,
    ) -> Result<SortStats> {
        let temp_base = self.temp_base();
        self.validate(input, output, &temp_base)?;

        let timer = OperationTimer::new(&format!("Sorting {}", input.display()));
        info!(
            "Format: {}, memory limit: {} MB, threads: {}",
            codec.name(),
            format_count((self.memory_limit as u64).div_ceil(BYTES_PER_MB)),
            self.threads
        );

        let mut spill = SpillRegistry::new(&temp_base)?;

        info!("Phase 1: Building sorted runs...");
        let mut records = RecordStream::open(input, codec)?.trailer_file(spill.trailer_path());
        let built = RunBuilder::new(codec, self.memory_limit)
            .threads(self.threads)
            .build(&mut records, &mut spill)?;
        let trailer_lines = records.trailer_lines();
        let (header, trailer) = records.into_parts()?;

        let total_records = built.total_records;
        let runs_written = built.spilled();
        info!(
            "Phase 1 complete: {} records in {} run(s), {} spilled",
            format_count(total_records),
            built.runs.len(),
            runs_written
        );

        let merger = RunMerger::new(codec).fan_in(self.merge_fan_in);
        let runs = merger.reduce(built.runs, &mut spill)?;
        let spilled_paths: Vec<PathBuf> =
            runs.iter().filter_map(|run| run.path().map(Path::to_path_buf)).collect();

        info!("Phase 2: Writing {}", output.display());
        let mut pending = PendingOutput::create(output)?;
        write_lines(&mut pending, &header)?;
        let output_records = merger.merge_into(runs, &mut pending)?;
        if let Some(path) = &trailer {
            copy_trailer(path, &mut pending)?;
            spill.release(path)?;
        }

        for path in &spilled_paths {
            spill.release(path)?;
        }
        spill.close()?;
        let output = pending.commit()?;

        let elapsed = timer.log_completion(total_records);
        let stats = SortStats {
            header_lines: header.len(),
            trailer_lines,
            total_records,
            output_records,
            runs_written,
            elapsed,
            output,
        };
        log_sort_summary(&stats);
        Ok(stats)
    }

    fn temp_base(&self) -> PathBuf {
        self.temp_dir.clone().unwrap_or_else(std::env::temp_dir)
    }

    fn validate(&self, input: &Path, output: &Path, temp_base: &Path) -> Result<()> {
        validate_positive(self.memory_limit, "memory-limit")?;
        validate_positive(self.threads, "threads")?;
        if self.merge_fan_in < 2 {
            return Err(SortError::InvalidParameter {
                parameter: "merge-fan-in".to_string(),
                reason: format!("Must be at least 2, got: {}", self.merge_fan_in),
            });
        }
        validate_readable_file(input, "Input file")?;
        if output.is_dir() {
            return Err(SortError::InvalidPath {
                description: "Output file".to_string(),
                path: output.display().to_string(),
                reason: "Is a directory".to_string(),
            });
        }
        validate_writable_dir(parent_dir(output), "Output directory")?;
        validate_writable_dir(temp_base, "Temp directory")
    }
}

fn copy_trailer(path: &Path, writer: &mut PendingOutput) -> Result<()> {
    let context = || format!("failed to copy trailer file '{}'", path.display());
    let mut file = File::open(path).resource_context(context)?;
    io::copy(&mut file, writer).resource_context(context)?;
    Ok(())
}

fn write_lines(writer: &mut PendingOutput, lines: &[String]) -> Result<()> {
    for line in lines {
        writeln!(writer, "{line}").resource_context(|| {
            format!("failed to write output '{}'", writer.target().display())
        })?;
    }
    Ok(())
}
