//! Phase 1 of the external sort: cutting the input into sorted runs.
//!
//! Records are buffered until the estimated footprint of the buffer would exceed
//! the memory limit; the buffer is then sorted and spilled as one run. A buffer
//! is never cut while empty, so a single record larger than the limit still
//! forms a run of its own. When nothing was spilled the whole input is one
//! in-memory run and no temporary file is written.
//!
//! With more than one thread, full buffers are handed to a background worker
//! over a rendezvous channel and sorted with rayon while the next buffer fills.
//! The rayon pool is private to the call and sized to the thread count.
//! Run paths and indices are assigned at hand-off, so the runs are identical to
//! the single-threaded ones.

use std::mem;
use std::path::PathBuf;
use std::thread;

use crossbeam_channel::{Sender, bounded};
use log::debug;
use rayon::ThreadPool;
use rayon::prelude::*;

use crate::errors::{Result, SortError};
use crate::sort::codec::RecordCodec;
use crate::sort::keys::compare;
use crate::sort::record::Record;
use crate::sort::run::{Run, write_run};
use crate::sort::temp::SpillRegistry;

/// Runs cut from one input, in creation order.
#[derive(Debug)]
pub struct BuiltRuns {
    /// The runs; the index in this vector is the run index used for tie-breaks.
    pub runs: Vec<Run>,
    /// Number of records consumed from the input.
    pub total_records: u64,
}

impl BuiltRuns {
    /// Number of runs that were written to disk.
    #[must_use]
    pub fn spilled(&self) -> usize {
        self.runs.iter().filter(|run| run.path().is_some()).count()
    }
}

/// Records accumulated for the next run.
struct RunBuffer {
    records: Vec<Record>,
    used: usize,
    limit: usize,
}

impl RunBuffer {
    fn new(limit: usize) -> Self {
        Self { records: Vec::new(), used: 0, limit }
    }

    /// Adds a record, first returning the current contents if the record would
    /// push a non-empty buffer past the limit.
    fn push(&mut self, record: Record) -> Option<Vec<Record>> {
        let size = record.estimated_size();
        let full = if !self.records.is_empty() && self.used.saturating_add(size) > self.limit {
            self.used = 0;
            Some(mem::take(&mut self.records))
        } else {
            None
        };
        self.used = self.used.saturating_add(size);
        self.records.push(record);
        full
    }

    fn into_records(self) -> Vec<Record> {
        self.records
    }
}

/// Stable sort of one batch by the record ordering.
fn sort_batch(records: &mut [Record], parallel: bool) {
    if parallel {
        records.par_sort_by(compare);
    } else {
        records.sort_by(compare);
    }
}

/// Builds the rayon pool used to sort runs, sized to `threads`.
fn sort_pool(threads: usize) -> Result<ThreadPool> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(|i| format!("ivsort-sort-{i}"))
        .build()
        .map_err(|e| SortError::resource("failed to start sort threads", std::io::Error::other(e)))
}

/// Cuts a record stream into sorted runs under a memory limit.
pub struct RunBuilder<'a> {
    codec: &'a dyn RecordCodec,
    memory_limit: usize,
    threads: usize,
}

impl<'a> RunBuilder<'a> {
    /// Creates a single-threaded builder with the given limit in bytes.
    #[must_use]
    pub fn new(codec: &'a dyn RecordCodec, memory_limit: usize) -> Self {
        Self { codec, memory_limit, threads: 1 }
    }

    /// Sets the number of threads; more than one enables background run sorting.
    #[must_use]
    pub fn threads(mut self, threads: usize) -> Self {
        self.threads = threads.max(1);
        self
    }

    /// Consumes `records` and returns the runs.
    ///
    /// # Errors
    ///
    /// Returns the first error of the record stream, or a resource error if a
    /// run cannot be written. Files already spilled stay with `spill` and are
    /// removed with it.
    pub fn build<I>(&self, records: I, spill: &mut SpillRegistry) -> Result<BuiltRuns>
    where
        I: Iterator<Item = Result<Record>>,
    {
        if self.threads > 1 {
            self.build_parallel(records, spill)
        } else {
            self.build_inline(records, spill)
        }
    }

    fn build_inline<I>(&self, records: I, spill: &mut SpillRegistry) -> Result<BuiltRuns>
    where
        I: Iterator<Item = Result<Record>>,
    {
        let mut buffer = RunBuffer::new(self.memory_limit);
        let mut runs = Vec::new();
        let mut total_records = 0u64;

        for record in records {
            let record = record?;
            total_records += 1;
            if let Some(mut batch) = buffer.push(record) {
                sort_batch(&mut batch, false);
                runs.push(self.spill_batch(&batch, spill.next_path())?);
            }
        }

        let mut last = buffer.into_records();
        sort_batch(&mut last, false);
        self.finish(runs, last, total_records, spill)
    }

    fn build_parallel<I>(&self, records: I, spill: &mut SpillRegistry) -> Result<BuiltRuns>
    where
        I: Iterator<Item = Result<Record>>,
    {
        let codec = self.codec;
        let pool = sort_pool(self.threads)?;
        let pool = &pool;
        thread::scope(|scope| {
            let (tx, rx) = bounded::<(Vec<Record>, PathBuf)>(0);
            let worker = scope.spawn(move || -> Result<Vec<Run>> {
                let mut runs = Vec::new();
                for (mut batch, path) in rx {
                    pool.install(|| sort_batch(&mut batch, true));
                    let run = write_run(&batch, codec, &path)?;
                    debug!("Wrote run {} ({} records)", path.display(), batch.len());
                    runs.push(run);
                }
                Ok(runs)
            });

            let produced = self.feed(records, spill, &tx);
            drop(tx);
            let spilled = match worker.join() {
                Ok(result) => result,
                Err(panic) => std::panic::resume_unwind(panic),
            };

            let runs = spilled?;
            let (mut last, total_records) = produced?;
            pool.install(|| sort_batch(&mut last, true));
            self.finish(runs, last, total_records, spill)
        })
    }

    /// Fills buffers from `records`, sending each full one to the spill worker.
    /// Returns the final partial buffer and the record count.
    fn feed<I>(
        &self,
        records: I,
        spill: &mut SpillRegistry,
        tx: &Sender<(Vec<Record>, PathBuf)>,
    ) -> Result<(Vec<Record>, u64)>
    where
        I: Iterator<Item = Result<Record>>,
    {
        let mut buffer = RunBuffer::new(self.memory_limit);
        let mut total_records = 0u64;
        for record in records {
            let record = record?;
            total_records += 1;
            if let Some(batch) = buffer.push(record) {
                tx.send((batch, spill.next_path())).map_err(|_| {
                    SortError::resource(
                        "spill worker stopped",
                        std::io::Error::other("run channel closed"),
                    )
                })?;
            }
        }
        Ok((buffer.into_records(), total_records))
    }

    fn spill_batch(&self, batch: &[Record], path: PathBuf) -> Result<Run> {
        let run = write_run(batch, self.codec, &path)?;
        debug!("Wrote run {} ({} records)", path.display(), batch.len());
        Ok(run)
    }

    /// Appends the sorted final buffer: kept in memory when it is the only run,
    /// spilled otherwise.
    fn finish(
        &self,
        mut runs: Vec<Run>,
        last: Vec<Record>,
        total_records: u64,
        spill: &mut SpillRegistry,
    ) -> Result<BuiltRuns> {
        if runs.is_empty() {
            runs.push(Run::InMemory(last));
        } else if !last.is_empty() {
            runs.push(self.spill_batch(&last, spill.next_path())?);
        }
        Ok(BuiltRuns { runs, total_records })
    }
}
