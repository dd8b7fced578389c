//! The ordering rule for interval records.
//!
//! Records are ordered by contig name, compared **byte-wise lexicographically**,
//! then by start coordinate ascending. Contig names are not ordered "naturally":
//! `chr10` sorts before `chr2`, and `chrX` after `chr9`. This is the simplest
//! reproducible contract and matches `LC_ALL=C sort -k1,1 -k2,2n`.
//!
//! Ties on `(contig, start)` are not broken by any other column. The sorter keeps
//! input order among tied records within a run and prefers the lower run index
//! across runs, so output is deterministic for a fixed input and memory budget,
//! but the relative order of tied records may change with the budget.

use std::cmp::Ordering;
use std::fmt;

use crate::sort::record::Record;

/// Compares two records by the ordering rule.
///
/// # Examples
///
/// ```
/// use ivsort_lib::sort::{Record, compare};
/// use std::cmp::Ordering;
///
/// let a = Record::new("chr10", 500, 600, vec![]);
/// let b = Record::new("chr2", 100, 200, vec![]);
/// assert_eq!(compare(&a, &b), Ordering::Less);
/// ```
#[inline]
#[must_use]
pub fn compare(a: &Record, b: &Record) -> Ordering {
    compare_parts(&a.contig, a.start, &b.contig, b.start)
}

#[inline]
fn compare_parts(contig_a: &str, start_a: i64, contig_b: &str, start_b: i64) -> Ordering {
    contig_a.as_bytes().cmp(contig_b.as_bytes()).then_with(|| start_a.cmp(&start_b))
}

/// Owned sort key of a record, used where a record must be remembered after it
/// has been written (verification, diagnostics).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CoordinateKey {
    /// Contig name.
    pub contig: String,
    /// Start coordinate.
    pub start: i64,
}

impl CoordinateKey {
    /// Extracts the key of a record.
    #[must_use]
    pub fn from_record(record: &Record) -> Self {
        Self { contig: record.contig.clone(), start: record.start }
    }

    /// Compares this key with a record's key.
    #[must_use]
    pub fn cmp_record(&self, record: &Record) -> Ordering {
        compare_parts(&self.contig, self.start, &record.contig, record.start)
    }
}

impl Ord for CoordinateKey {
    fn cmp(&self, other: &Self) -> Ordering {
        compare_parts(&self.contig, self.start, &other.contig, other.start)
    }
}

impl PartialOrd for CoordinateKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for CoordinateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.contig, self.start)
    }
}
