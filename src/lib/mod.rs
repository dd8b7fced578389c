//! # ivsort - Bounded-Memory Sorting of Genomic Interval Files
//!
//! This library sorts large tab-delimited interval files (BED, bedGraph, GFF/GTF,
//! VCF) into genomic coordinate order using an external merge sort, so files much
//! larger than the memory budget can be sorted.
//!
//! ## Overview
//!
//! ### Core Functionality
//!
//! - **[`sort`]** - External merge sort, record codecs, ordering rule and verification
//!
//! ### Utilities
//!
//! - **[`errors`]** - The `SortError` type shared by every operation
//! - **[`validation`]** - Input validation utilities for parameters and paths
//! - **[`progress`]** - Progress tracking and logging
//! - **[`logging`]** - Enhanced logging utilities with formatting
//!
//! ## Quick Start
//!
//! ### Sorting a File
//!
//! ```no_run
//! use ivsort_lib::sort::{SortRequest, sort};
//!
//! # fn main() -> anyhow::Result<()> {
//! // Sort with a 200 MB budget; the output defaults to "peaks.bed.sorted"
//! let request = SortRequest::new("peaks.bed").with_max_memory_mb(200);
//! let sorted = sort(&request)?;
//! println!("{}", sorted.display());
//! # Ok(())
//! # }
//! ```
//!
//! ### Checking Whether a File Is Sorted
//!
//! ```no_run
//! use ivsort_lib::sort::verify_sorted;
//! use std::path::Path;
//!
//! # fn main() -> anyhow::Result<()> {
//! let report = verify_sorted(Path::new("genes.gff3.gz"))?;
//! if let Some(violation) = &report.first_violation {
//!     println!("not sorted: {violation}");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Ordering
//!
//! Records are ordered by contig name compared byte-wise (`chr10` before `chr2`),
//! then by start coordinate. Header lines are written first, in their original
//! order.

#![deny(unsafe_code)]
// Clippy lint configuration for CI
// These lints are allowed because:
// - cast_*: Record counts and byte budgets are converted between integer widths
// - missing_*_doc: Documentation improvements tracked separately
// - needless_pass_by_value: Some APIs designed for ownership transfer
// - items_after_statements: Some test code uses late item declarations
// - unused_self: Trait implementations may not use self
#![allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::needless_pass_by_value,
    clippy::items_after_statements,
    clippy::unused_self,
    clippy::redundant_closure_for_method_calls,
    clippy::uninlined_format_args
)]

pub mod errors;
pub mod logging;
pub mod progress;
pub mod sort;
pub mod validation;
