//! GFF2/GFF3/GTF codec.
//!
//! Nine columns: `seqid`, `source`, `type`, `start`, `end`, `score`, `strand`,
//! `phase`, `attributes`, with 1-based inclusive coordinates. `#` comments and
//! `##` directives are header lines. A `##FASTA` directive ends the feature
//! section; it and the embedded sequences that follow are passed through after
//! the sorted features.

use super::{RecordCodec, parse_coordinate};
use crate::sort::record::Record;

/// Number of columns on a GFF/GTF data line.
pub const GFF_COLUMNS: usize = 9;

/// Directive that starts the embedded FASTA section of a GFF3 file.
pub const FASTA_DIRECTIVE: &str = "##FASTA";

/// Codec for `.gff`, `.gff3` and `.gtf` files.
#[derive(Debug, Clone, Copy, Default)]
pub struct GffCodec;

impl RecordCodec for GffCodec {
    fn name(&self) -> &'static str {
        "gff"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &[".gff", ".gff3", ".gtf"]
    }

    fn ends_records(&self, line: &str) -> bool {
        line.trim_end() == FASTA_DIRECTIVE
    }

    fn parse_fields(&self, fields: Vec<String>) -> Result<Record, String> {
        if fields.len() != GFF_COLUMNS {
            return Err(format!("expected {GFF_COLUMNS} columns, found {}", fields.len()));
        }
        let start = parse_coordinate(&fields, 3, "start")?;
        let end = parse_coordinate(&fields, 4, "end")?;
        Ok(Record::new(fields[0].clone(), start, end, fields))
    }
}
