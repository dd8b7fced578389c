//! BED (Browser Extensible Data) codec.
//!
//! A data line has at least three tab-separated columns: `chrom`, `chromStart`,
//! `chromEnd`. Any further columns (name, score, strand, thick start, …) are
//! carried through untouched. `#` comments and `track`/`browser` declarations are
//! header lines.

use super::{RecordCodec, parse_coordinate, require_min_columns, starts_with_keyword};
use crate::sort::record::Record;

/// Minimum number of columns on a BED data line.
pub const BED_MIN_COLUMNS: usize = 3;

/// Whether a line is a UCSC `track`, `browser` or `type=` declaration.
pub(crate) fn is_track_declaration(line: &str) -> bool {
    starts_with_keyword(line, "track")
        || starts_with_keyword(line, "browser")
        || line.starts_with("type=")
}

/// Codec for `.bed` files.
#[derive(Debug, Clone, Copy, Default)]
pub struct BedCodec;

impl RecordCodec for BedCodec {
    fn name(&self) -> &'static str {
        "bed"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &[".bed"]
    }

    fn is_header_line(&self, line: &str) -> bool {
        line.starts_with('#') || is_track_declaration(line)
    }

    fn parse_fields(&self, fields: Vec<String>) -> Result<Record, String> {
        require_min_columns(&fields, BED_MIN_COLUMNS)?;
        let start = parse_coordinate(&fields, 1, "start")?;
        let end = parse_coordinate(&fields, 2, "end")?;
        Ok(Record::new(fields[0].clone(), start, end, fields))
    }
}
