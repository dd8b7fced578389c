//! Checking whether a file is already sorted.

use std::fmt;
use std::path::Path;

use log::info;

use crate::errors::Result;
use crate::logging::format_count;
use crate::sort::codec::codec_for_path;
use crate::sort::input::RecordStream;
use crate::sort::keys::CoordinateKey;
use crate::validation::validate_readable_file;

/// A record that sorts before the record preceding it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// 1-based line number of the offending record.
    pub line_number: u64,
    /// Key of the preceding record.
    pub previous: CoordinateKey,
    /// Key of the offending record.
    pub current: CoordinateKey,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {} comes after {}", self.line_number, self.current, self.previous)
    }
}

/// Outcome of [`verify_sorted`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerifyReport {
    /// Number of data records checked.
    pub records: u64,
    /// Number of adjacent pairs out of order.
    pub violations: u64,
    /// The first out-of-order record, if any.
    pub first_violation: Option<Violation>,
}

impl VerifyReport {
    /// Whether the file satisfies the record ordering.
    #[must_use]
    pub fn is_sorted(&self) -> bool {
        self.violations == 0
    }
}

/// Reads `path` with the codec for its extension and checks every adjacent pair
/// of records against the record ordering. Nothing is written.
///
/// # Errors
///
/// Returns an error if the extension is unsupported, the file cannot be read, or
/// a data line cannot be decoded.
pub fn verify_sorted(path: &Path) -> Result<VerifyReport> {
    let codec = codec_for_path(path)?;
    validate_readable_file(path, "Input file")?;

    let mut records = RecordStream::open(path, codec)?;
    let mut report = VerifyReport::default();
    let mut previous: Option<CoordinateKey> = None;

    while let Some(record) = records.next() {
        let record = record?;
        report.records += 1;

        if let Some(prev) = &previous {
            if prev.cmp_record(&record).is_gt() {
                report.violations += 1;
                if report.first_violation.is_none() {
                    report.first_violation = Some(Violation {
                        line_number: records.line_number(),
                        previous: prev.clone(),
                        current: CoordinateKey::from_record(&record),
                    });
                }
            }
        }
        match previous.as_mut() {
            Some(key) => {
                key.contig.clone_from(&record.contig);
                key.start = record.start;
            }
            None => previous = Some(CoordinateKey::from_record(&record)),
        }
    }

    info!(
        "Verified {} records in {}: {} out of order",
        format_count(report.records),
        path.display(),
        format_count(report.violations)
    );
    Ok(report)
}
