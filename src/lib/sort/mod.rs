//! Bounded-memory sorting of genomic interval files.
//!
//! This module sorts tab-delimited interval files (BED, bedGraph, GFF/GTF, VCF)
//! into coordinate order while holding at most a configured amount of record
//! data in memory:
//! - **Ordering**: contig name byte-wise, then start ascending (see [`keys`])
//! - **Formats**: selected by file extension, optionally gzip-compressed (see [`codec`])
//!
//! # Architecture
//!
//! The sorting process follows this pipeline:
//!
//! 1. **Read phase**: Stream lines, split off header lines, decode records lazily
//! 2. **Accumulate phase**: Buffer records until the memory limit is reached
//! 3. **Sort phase**: Stable in-memory sort of the buffer (parallel with rayon
//!    when more than one thread is configured)
//! 4. **Spill phase**: Write the sorted buffer to a run file in a per-call temp
//!    directory
//! 5. **Merge phase**: K-way merge of the runs using a min-heap, written to a
//!    temporary file and atomically renamed onto the output
//!
//! # Example
//!
//! ```no_run
//! use ivsort_lib::sort::{SortRequest, sort};
//!
//! let request = SortRequest::new("/data/peaks.bed").with_max_memory_mb(200);
//! let sorted = sort(&request)?;
//! println!("sorted file: {}", sorted.display());
//! # Ok::<(), ivsort_lib::errors::SortError>(())
//! ```

pub mod builder;
pub mod codec;
pub mod external;
pub mod input;
pub mod keys;
pub mod merge;
pub mod record;
pub mod run;
pub mod temp;
pub mod verify;

pub use codec::{CodecRegistry, RecordCodec, codec_for_path};
pub use external::{DEFAULT_MAX_MEMORY_MB, ExternalSorter, SortRequest, SortStats, sort};
pub use keys::{CoordinateKey, compare};
pub use record::Record;
pub use verify::{VerifyReport, Violation, verify_sorted};
