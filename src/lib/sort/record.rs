//! Decoded interval records.

use std::io::{self, Write};

/// Fixed per-record overhead used for memory accounting: the `Record` struct
/// itself plus allocator slack on its vectors.
pub const RECORD_OVERHEAD: usize = 96;

/// Per-field overhead used for memory accounting (one `String` header).
pub const FIELD_OVERHEAD: usize = std::mem::size_of::<String>();

/// One data line of an interval file.
///
/// `fields` holds every tab-separated column exactly as read, including the
/// contig, start and end columns in their original text, so writing a record
/// back reproduces the input line byte for byte. `start <= end` is not checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Contig (chromosome) name.
    pub contig: String,
    /// Start coordinate, in the file format's own convention.
    pub start: i64,
    /// End coordinate, in the file format's own convention.
    pub end: i64,
    /// All columns as read.
    pub fields: Vec<String>,
}

impl Record {
    /// Creates a record from its parsed coordinates and raw columns.
    #[must_use]
    pub fn new(contig: impl Into<String>, start: i64, end: i64, fields: Vec<String>) -> Self {
        Self { contig: contig.into(), start, end, fields }
    }

    /// Estimated heap plus inline footprint of this record, in bytes.
    ///
    /// The estimate is the length of every column (and the separately held
    /// contig) plus [`FIELD_OVERHEAD`] per column and [`RECORD_OVERHEAD`].
    #[must_use]
    pub fn estimated_size(&self) -> usize {
        let text: usize = self.fields.iter().map(String::len).sum();
        RECORD_OVERHEAD + self.contig.len() + text + self.fields.len() * FIELD_OVERHEAD
    }

    /// Writes the record as one tab-separated line terminated by `\n`.
    pub fn write_line<W: Write + ?Sized>(&self, writer: &mut W) -> io::Result<()> {
        for (i, field) in self.fields.iter().enumerate() {
            if i > 0 {
                writer.write_all(b"\t")?;
            }
            writer.write_all(field.as_bytes())?;
        }
        writer.write_all(b"\n")
    }
}
