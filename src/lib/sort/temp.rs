//! Temporary files owned by one sort call.
//!
//! [`SpillRegistry`] owns a uniquely named directory under the caller's temp
//! directory and hands out run file paths inside it. The directory and anything
//! left in it are removed when the registry is closed or dropped, so spill files
//! never outlive the call, whether it succeeds or fails.
//!
//! [`PendingOutput`] writes the sorted output to a hidden sibling of the target
//! and renames it into place on [`commit`](PendingOutput::commit). Dropping it
//! uncommitted deletes the partial file.

use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use flate2::Compression;
use flate2::write::GzEncoder;
use log::debug;
use tempfile::{NamedTempFile, TempDir};

use crate::errors::{Result, ResourceContext};
use crate::sort::codec::is_gzip_path;

/// Buffer size for writing run and output files.
pub const WRITE_BUFFER_SIZE: usize = 64 * 1024;

/// Directory a path lives in; `.` for bare file names.
pub(crate) fn parent_dir(path: &Path) -> &Path {
    path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or_else(|| Path::new("."))
}

/// Scoped owner of the spill files of one sort call.
#[derive(Debug)]
pub struct SpillRegistry {
    dir: TempDir,
    next_index: usize,
}

impl SpillRegistry {
    /// Creates a fresh per-call directory inside `base`.
    ///
    /// # Errors
    ///
    /// Returns a resource error if the directory cannot be created.
    pub fn new(base: &Path) -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix("ivsort-")
            .tempdir_in(base)
            .resource_context(|| {
                format!("failed to create temp directory in '{}'", base.display())
            })?;
        debug!("Spilling runs to {}", dir.path().display());
        Ok(Self { dir, next_index: 0 })
    }

    /// The per-call directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Number of run paths handed out.
    #[must_use]
    pub fn runs_allocated(&self) -> usize {
        self.next_index
    }

    /// Allocates the path of the next run file.
    pub fn next_path(&mut self) -> PathBuf {
        let path = self.dir.path().join(format!("run_{:04}.txt", self.next_index));
        self.next_index += 1;
        path
    }

    /// Path of the file holding lines carried after the sorted records.
    #[must_use]
    pub fn trailer_path(&self) -> PathBuf {
        self.dir.path().join("trailer.txt")
    }

    /// Deletes a run file that is no longer needed. Missing files are ignored.
    ///
    /// # Errors
    ///
    /// Returns a resource error if an existing file cannot be removed.
    pub fn release(&self, path: &Path) -> Result<()> {
        match fs::remove_file(path) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e)
                .resource_context(|| format!("failed to delete run file '{}'", path.display())),
            _ => Ok(()),
        }
    }

    /// Removes the per-call directory and everything in it.
    ///
    /// # Errors
    ///
    /// Returns a resource error if the directory cannot be removed.
    pub fn close(self) -> Result<()> {
        let path = self.dir.path().to_path_buf();
        self.dir
            .close()
            .resource_context(|| format!("failed to remove temp directory '{}'", path.display()))
    }
}

enum Sink {
    Plain(BufWriter<NamedTempFile>),
    Gzip(GzEncoder<BufWriter<NamedTempFile>>),
}

/// Output file that appears at its target path only once complete.
pub struct PendingOutput {
    target: PathBuf,
    sink: Sink,
}

impl PendingOutput {
    /// Creates the temporary sibling of `target`. The content is gzip-compressed
    /// when `target` ends in `.gz`.
    ///
    /// # Errors
    ///
    /// Returns a resource error if the temporary file cannot be created.
    pub fn create(target: &Path) -> Result<Self> {
        let parent = parent_dir(target);
        let file = tempfile::Builder::new()
            .prefix(".ivsort-")
            .suffix(".tmp")
            .tempfile_in(parent)
            .resource_context(|| {
                format!("failed to create temporary output in '{}'", parent.display())
            })?;

        let buffered = BufWriter::with_capacity(WRITE_BUFFER_SIZE, file);
        let sink = if is_gzip_path(target) {
            Sink::Gzip(GzEncoder::new(buffered, Compression::default()))
        } else {
            Sink::Plain(buffered)
        };
        Ok(Self { target: target.to_path_buf(), sink })
    }

    /// The final path of the output.
    #[must_use]
    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Finishes the content and atomically renames it onto the target, replacing
    /// any existing file. Returns the absolute path of the output.
    ///
    /// # Errors
    ///
    /// Returns a resource error if flushing, syncing or renaming fails; the
    /// temporary file is removed in that case.
    pub fn commit(self) -> Result<PathBuf> {
        let target = self.target;
        let context = || format!("failed to write output '{}'", target.display());

        let buffered = match self.sink {
            Sink::Plain(writer) => writer,
            Sink::Gzip(encoder) => encoder.finish().resource_context(context)?,
        };
        let file = buffered.into_inner().map_err(|e| e.into_error()).resource_context(context)?;
        file.as_file().sync_all().resource_context(context)?;
        file.persist(&target).map_err(|e| e.error).resource_context(context)?;

        target.canonicalize().resource_context(|| {
            format!("failed to resolve output path '{}'", target.display())
        })
    }
}

impl Write for PendingOutput {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match &mut self.sink {
            Sink::Plain(writer) => writer.write(buf),
            Sink::Gzip(writer) => writer.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match &mut self.sink {
            Sink::Plain(writer) => writer.flush(),
            Sink::Gzip(writer) => writer.flush(),
        }
    }
}
