//! Phase 2 of the external sort: k-way merge of sorted runs.
//!
//! A single run is streamed straight to the output. Several runs are merged with
//! a min-heap holding the current head of every run, ordered by the record
//! ordering and then by run index, so a tie between runs always goes to the run
//! created first.
//!
//! At most `fan_in` runs are open at once. When there are more, [`RunMerger::reduce`]
//! first merges groups of consecutive runs into new spilled runs, pass after pass.
//! Groups keep run order, so the tie-break between runs is unchanged.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::errors::{Result, ResourceContext};
use crate::sort::codec::RecordCodec;
use crate::sort::keys::compare;
use crate::sort::record::Record;
use crate::sort::run::{Run, RunCursor};
use crate::sort::temp::{SpillRegistry, WRITE_BUFFER_SIZE};

/// Default maximum number of runs merged at once.
pub const DEFAULT_MERGE_FAN_IN: usize = 256;

/// Current head of one run in the merge heap.
struct HeapEntry {
    record: Record,
    run_idx: usize,
}

impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for HeapEntry {}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        compare(&self.record, &other.record).then_with(|| self.run_idx.cmp(&other.run_idx))
    }
}

/// Merges sorted runs into one sorted stream of encoded lines.
pub struct RunMerger<'a> {
    codec: &'a dyn RecordCodec,
    fan_in: usize,
}

impl<'a> RunMerger<'a> {
    /// Creates a merger that encodes with `codec`.
    #[must_use]
    pub fn new(codec: &'a dyn RecordCodec) -> Self {
        Self { codec, fan_in: DEFAULT_MERGE_FAN_IN }
    }

    /// Sets the maximum number of runs merged at once (at least 2).
    #[must_use]
    pub fn fan_in(mut self, fan_in: usize) -> Self {
        self.fan_in = fan_in.max(2);
        self
    }

    /// Merges groups of consecutive runs into spilled runs until at most
    /// `fan_in` remain. The files of merged runs are released from `spill`.
    ///
    /// # Errors
    ///
    /// Returns a resource error if a run cannot be read or written.
    pub fn reduce(&self, mut runs: Vec<Run>, spill: &mut SpillRegistry) -> Result<Vec<Run>> {
        let mut pass = 0;
        while runs.len() > self.fan_in {
            pass += 1;
            info!("Merge pass {pass}: {} runs with fan-in {}", runs.len(), self.fan_in);
            let mut merged = Vec::with_capacity(runs.len().div_ceil(self.fan_in));
            let mut remaining = runs.into_iter();
            loop {
                let group: Vec<Run> = remaining.by_ref().take(self.fan_in).collect();
                match group.len() {
                    0 => break,
                    1 => merged.extend(group),
                    _ => merged.push(self.merge_group(group, spill)?),
                }
            }
            runs = merged;
        }
        Ok(runs)
    }

    fn merge_group(&self, group: Vec<Run>, spill: &mut SpillRegistry) -> Result<Run> {
        let consumed: Vec<PathBuf> =
            group.iter().filter_map(|run| run.path().map(Path::to_path_buf)).collect();
        let path = spill.next_path();
        let context = || format!("failed to write run file '{}'", path.display());

        let file = File::create(&path).resource_context(context)?;
        let mut writer = BufWriter::with_capacity(WRITE_BUFFER_SIZE, file);
        let records = self.merge_into(group, &mut writer)?;
        writer.flush().resource_context(context)?;
        drop(writer);

        for consumed in &consumed {
            spill.release(consumed)?;
        }
        debug!("Merged {} runs into {} ({records} records)", consumed.len(), path.display());
        Ok(Run::Spilled { path, records })
    }

    /// Writes every record of `runs` to `writer` in sorted order and returns the
    /// number of records written. Run files are left in place. All runs are open
    /// at once; call [`reduce`](Self::reduce) first to bound that number.
    ///
    /// # Errors
    ///
    /// Returns a resource error if a run cannot be read or the output cannot be
    /// written.
    pub fn merge_into(&self, runs: Vec<Run>, writer: &mut dyn Write) -> Result<u64> {
        let mut cursors = runs
            .into_iter()
            .map(|run| RunCursor::open(run, self.codec))
            .collect::<Result<Vec<_>>>()?;

        match cursors.len() {
            0 => Ok(0),
            1 => self.copy_run(&mut cursors[0], writer),
            n => {
                info!("Merging {n} runs...");
                self.merge_heap(&mut cursors, writer)
            }
        }
    }

    fn copy_run(&self, cursor: &mut RunCursor<'_>, writer: &mut dyn Write) -> Result<u64> {
        let mut written = 0u64;
        while let Some(record) = cursor.next_record()? {
            self.write(&record, writer)?;
            written += 1;
        }
        Ok(written)
    }

    fn merge_heap(&self, cursors: &mut [RunCursor<'_>], writer: &mut dyn Write) -> Result<u64> {
        let mut heap: BinaryHeap<Reverse<HeapEntry>> = BinaryHeap::with_capacity(cursors.len());
        for (run_idx, cursor) in cursors.iter_mut().enumerate() {
            if let Some(record) = cursor.next_record()? {
                heap.push(Reverse(HeapEntry { record, run_idx }));
            }
        }

        let mut written = 0u64;
        while let Some(Reverse(entry)) = heap.pop() {
            self.write(&entry.record, writer)?;
            written += 1;

            if let Some(record) = cursors[entry.run_idx].next_record()? {
                heap.push(Reverse(HeapEntry { record, run_idx: entry.run_idx }));
            }
        }
        Ok(written)
    }

    fn write(&self, record: &Record, writer: &mut dyn Write) -> Result<()> {
        self.codec.encode(record, writer).resource_context(|| "failed to write sorted output")
    }
}
