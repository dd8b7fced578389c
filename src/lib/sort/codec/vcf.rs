//! VCF codec.
//!
//! Data lines have at least eight columns: `CHROM`, `POS`, `ID`, `REF`, `ALT`,
//! `QUAL`, `FILTER`, `INFO`, optionally followed by `FORMAT` and samples. The
//! record spans `POS ..= POS + len(REF) - 1` unless the INFO column carries an
//! `END=` key (symbolic alleles, gVCF blocks), which then gives the end.
//! `##` meta lines and the `#CHROM` column header are header lines.

use super::{RecordCodec, parse_coordinate, require_min_columns};
use crate::sort::record::Record;

/// Minimum number of columns on a VCF data line.
pub const VCF_MIN_COLUMNS: usize = 8;

const REF_COLUMN: usize = 3;
const INFO_COLUMN: usize = 7;

/// Codec for `.vcf` files.
#[derive(Debug, Clone, Copy, Default)]
pub struct VcfCodec;

/// Value of the `END` key in a VCF INFO column, if present.
fn info_end(info: &str) -> Option<&str> {
    info.split(';').find_map(|entry| entry.strip_prefix("END="))
}

impl RecordCodec for VcfCodec {
    fn name(&self) -> &'static str {
        "vcf"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &[".vcf"]
    }

    fn parse_fields(&self, fields: Vec<String>) -> Result<Record, String> {
        require_min_columns(&fields, VCF_MIN_COLUMNS)?;
        let pos = parse_coordinate(&fields, 1, "position")?;
        let reference = &fields[REF_COLUMN];
        if reference.is_empty() {
            return Err("empty REF allele in column 4".to_string());
        }

        let end = match info_end(&fields[INFO_COLUMN]) {
            Some(raw) => raw
                .parse::<i64>()
                .map_err(|_| format!("non-numeric END '{raw}' in INFO column"))?,
            None => {
                let len = i64::try_from(reference.len())
                    .map_err(|_| "REF allele too long".to_string())?;
                pos.checked_add(len - 1)
                    .ok_or_else(|| "REF span overflows position".to_string())?
            }
        };
        Ok(Record::new(fields[0].clone(), pos, end, fields))
    }
}
