//! bedGraph codec.
//!
//! Four columns: `chrom`, `start`, `end`, `value`. The value must be a finite
//! number; it is validated but written back in its original text.

use super::bed::is_track_declaration;
use super::{RecordCodec, parse_coordinate, require_min_columns};
use crate::sort::record::Record;

/// Minimum number of columns on a bedGraph data line.
pub const BEDGRAPH_MIN_COLUMNS: usize = 4;

/// Codec for `.bdg`, `.bg` and `.bedGraph` files.
#[derive(Debug, Clone, Copy, Default)]
pub struct BedGraphCodec;

impl RecordCodec for BedGraphCodec {
    fn name(&self) -> &'static str {
        "bedgraph"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &[".bdg", ".bg", ".bedGraph"]
    }

    fn is_header_line(&self, line: &str) -> bool {
        line.starts_with('#') || is_track_declaration(line)
    }

    fn parse_fields(&self, fields: Vec<String>) -> Result<Record, String> {
        require_min_columns(&fields, BEDGRAPH_MIN_COLUMNS)?;
        let start = parse_coordinate(&fields, 1, "start")?;
        let end = parse_coordinate(&fields, 2, "end")?;
        let value = &fields[3];
        match value.parse::<f64>() {
            Ok(v) if v.is_finite() => {}
            _ => return Err(format!("invalid signal value '{value}' in column 4")),
        }
        Ok(Record::new(fields[0].clone(), start, end, fields))
    }
}
