//! Sorted runs and forward cursors over them.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::errors::{Result, ResourceContext, SortError};
use crate::sort::codec::RecordCodec;
use crate::sort::input::{LineReader, READ_BUFFER_SIZE};
use crate::sort::record::Record;
use crate::sort::temp::WRITE_BUFFER_SIZE;

/// A sorted sequence of records, either held in memory or spilled to a file.
#[derive(Debug)]
pub enum Run {
    /// Records kept in memory (the sole run of a small input).
    InMemory(Vec<Record>),
    /// Records encoded one per line in a file owned by the spill registry.
    Spilled {
        /// Location of the run file.
        path: PathBuf,
        /// Number of records in the file.
        records: u64,
    },
}

impl Run {
    /// Number of records in the run.
    #[must_use]
    pub fn len(&self) -> u64 {
        match self {
            Self::InMemory(records) => records.len() as u64,
            Self::Spilled { records, .. } => *records,
        }
    }

    /// Whether the run holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Path of the backing file, for spilled runs.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::InMemory(_) => None,
            Self::Spilled { path, .. } => Some(path),
        }
    }
}

/// Writes already sorted records to a new run file.
///
/// # Errors
///
/// Returns a resource error if the file cannot be created or written.
pub fn write_run(records: &[Record], codec: &dyn RecordCodec, path: &Path) -> Result<Run> {
    let context = || format!("failed to write run file '{}'", path.display());
    let file = File::create(path).resource_context(context)?;
    let mut writer = BufWriter::with_capacity(WRITE_BUFFER_SIZE, file);
    for record in records {
        codec.encode(record, &mut writer).resource_context(context)?;
    }
    writer.flush().resource_context(context)?;
    Ok(Run::Spilled { path: path.to_path_buf(), records: records.len() as u64 })
}

/// Forward-only reader over one run.
pub enum RunCursor<'a> {
    /// Iterates an in-memory run.
    Memory(std::vec::IntoIter<Record>),
    /// Decodes a spilled run file line by line.
    File {
        /// Line source.
        lines: LineReader<BufReader<File>>,
        /// Codec the run was written with.
        codec: &'a dyn RecordCodec,
        /// Location of the run file, for messages.
        path: PathBuf,
    },
}

impl<'a> RunCursor<'a> {
    /// Opens a cursor positioned before the first record of `run`.
    ///
    /// # Errors
    ///
    /// Returns a resource error if a run file cannot be opened.
    pub fn open(run: Run, codec: &'a dyn RecordCodec) -> Result<Self> {
        match run {
            Run::InMemory(records) => Ok(Self::Memory(records.into_iter())),
            Run::Spilled { path, .. } => {
                let file = File::open(&path).resource_context(|| {
                    format!("failed to open run file '{}'", path.display())
                })?;
                let reader = BufReader::with_capacity(READ_BUFFER_SIZE, file);
                Ok(Self::File {
                    lines: LineReader::new(reader).keep_carriage_returns(),
                    codec,
                    path,
                })
            }
        }
    }

    /// Returns the next record, or `None` once the run is exhausted.
    ///
    /// # Errors
    ///
    /// Returns a resource error if the run file cannot be read or holds a line
    /// that no longer decodes.
    pub fn next_record(&mut self) -> Result<Option<Record>> {
        match self {
            Self::Memory(records) => Ok(records.next()),
            Self::File { lines, codec, path } => {
                let context = || format!("failed to read run file '{}'", path.display());
                let Some((line_number, bytes)) = lines.next_line().resource_context(context)?
                else {
                    return Ok(None);
                };
                let line = std::str::from_utf8(bytes)
                    .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
                    .resource_context(context)?;
                match codec.decode(line, line_number) {
                    Ok(Some(record)) => Ok(Some(record)),
                    Ok(None) => {
                        Err(corrupt_run(path, format!("line {line_number} is not a record")))
                    }
                    Err(e) => Err(corrupt_run(path, e.to_string())),
                }
            }
        }
    }
}

fn corrupt_run(path: &Path, reason: String) -> SortError {
    SortError::resource(
        format!("corrupt run file '{}'", path.display()),
        io::Error::new(io::ErrorKind::InvalidData, reason),
    )
}
