//! CLI command implementations for ivsort.
//!
//! - [`sort`] - Sort an interval file, or verify that it is sorted

pub mod command;
pub mod sort;
