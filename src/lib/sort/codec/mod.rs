//! Per-format record codecs and the codec registry.
//!
//! A codec turns one text line into a [`Record`] and back. Formats differ only in
//! which columns hold the coordinates, how many columns a data line must have, and
//! which lines are headers; everything else (buffering, spilling, merging) is
//! shared. Codecs are capabilities looked up by file extension in an immutable
//! [`CodecRegistry`], not a type hierarchy.
//!
//! # Registered Formats
//!
//! | Codec      | Extensions                 | Coordinate columns          |
//! |------------|----------------------------|-----------------------------|
//! | `bed`      | `.bed`                     | 1, 2, 3                     |
//! | `bedgraph` | `.bdg`, `.bg`, `.bedGraph` | 1, 2, 3 (+ value in 4)      |
//! | `gff`      | `.gff`, `.gff3`, `.gtf`    | 1, 4, 5                     |
//! | `vcf`      | `.vcf`                     | 1, 2 (end from REF / `END`) |
//!
//! Each extension may carry a trailing `.gz` for gzip-compressed files. Matching is
//! a case-sensitive suffix match on the file name.

pub mod bed;
pub mod bedgraph;
pub mod gff;
pub mod vcf;

use std::io::{self, Write};
use std::path::Path;
use std::sync::LazyLock;

use crate::errors::{DecodeError, Result, SortError};
use crate::sort::record::Record;

pub use bed::BedCodec;
pub use bedgraph::BedGraphCodec;
pub use gff::GffCodec;
pub use vcf::VcfCodec;

/// Suffix marking a gzip-compressed file.
pub const GZIP_SUFFIX: &str = ".gz";

/// Column separator shared by every supported format.
pub const FIELD_SEPARATOR: char = '\t';

static REGISTRY: LazyLock<CodecRegistry> = LazyLock::new(CodecRegistry::with_default_formats);

/// Decoding and encoding of one line-oriented interval format.
///
/// Implementors supply [`name`](Self::name), [`extensions`](Self::extensions) and
/// [`parse_fields`](Self::parse_fields); the provided methods handle blank and
/// header lines, error reporting, and encoding.
pub trait RecordCodec: Send + Sync {
    /// Short format name used in logs.
    fn name(&self) -> &'static str;

    /// File extensions (including the leading dot) handled by this codec.
    fn extensions(&self) -> &'static [&'static str];

    /// Whether a non-blank line is a header/comment line rather than data.
    fn is_header_line(&self, line: &str) -> bool {
        line.starts_with('#')
    }

    /// Whether this line ends the record section of the file. The line itself and
    /// everything after it is carried through verbatim after the sorted records.
    fn ends_records(&self, _line: &str) -> bool {
        false
    }

    /// Builds a record from the columns of a data line.
    ///
    /// # Errors
    ///
    /// Returns a human-readable reason when the columns do not form a valid record.
    fn parse_fields(&self, fields: Vec<String>) -> std::result::Result<Record, String>;

    /// Decodes one line (without its line terminator).
    ///
    /// Returns `Ok(None)` for blank lines and header lines.
    ///
    /// # Errors
    ///
    /// Returns a [`DecodeError`] carrying `line_number` and the raw text when a
    /// data line cannot be parsed.
    fn decode(
        &self,
        line: &str,
        line_number: u64,
    ) -> std::result::Result<Option<Record>, DecodeError> {
        if line.trim().is_empty() || self.is_header_line(line) {
            return Ok(None);
        }
        let fields: Vec<String> = line.split(FIELD_SEPARATOR).map(str::to_owned).collect();
        self.parse_fields(fields)
            .map(Some)
            .map_err(|reason| DecodeError::new(line_number, line, reason))
    }

    /// Writes a record as one line, reproducing its original columns.
    fn encode(&self, record: &Record, writer: &mut dyn Write) -> io::Result<()> {
        record.write_line(writer)
    }

    /// Whether this codec handles the given path (optionally gzip-compressed).
    fn can_handle(&self, path: &Path) -> bool {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        let name = name.strip_suffix(GZIP_SUFFIX).unwrap_or(name);
        self.extensions().iter().any(|ext| name.ends_with(ext))
    }
}

/// Immutable lookup table from file extension to codec.
pub struct CodecRegistry {
    codecs: Vec<Box<dyn RecordCodec>>,
}

impl CodecRegistry {
    /// Creates a registry with no codecs.
    #[must_use]
    pub fn empty() -> Self {
        Self { codecs: Vec::new() }
    }

    /// Creates a registry holding every built-in format.
    #[must_use]
    pub fn with_default_formats() -> Self {
        let mut registry = Self::empty();
        registry.register(Box::new(BedCodec));
        registry.register(Box::new(BedGraphCodec));
        registry.register(Box::new(GffCodec));
        registry.register(Box::new(VcfCodec));
        registry
    }

    /// The process-wide registry of built-in formats.
    #[must_use]
    pub fn global() -> &'static Self {
        &REGISTRY
    }

    /// Adds a codec. Earlier registrations win when extensions overlap.
    pub fn register(&mut self, codec: Box<dyn RecordCodec>) {
        self.codecs.push(codec);
    }

    /// Every extension handled by a registered codec.
    #[must_use]
    pub fn supported_extensions(&self) -> Vec<&'static str> {
        self.codecs.iter().flat_map(|c| c.extensions().iter().copied()).collect()
    }

    /// Selects the codec for a path by extension.
    ///
    /// # Errors
    ///
    /// Returns [`SortError::UnsupportedExtension`] if no codec handles the path.
    pub fn for_path(&self, path: &Path) -> Result<&dyn RecordCodec> {
        self.codecs.iter().find(|c| c.can_handle(path)).map(|c| &**c).ok_or_else(|| {
            SortError::UnsupportedExtension {
                path: path.display().to_string(),
                supported: self.supported_extensions().join(", "),
            }
        })
    }
}

/// Selects a built-in codec for a path by extension.
///
/// # Errors
///
/// Returns [`SortError::UnsupportedExtension`] if no codec handles the path.
///
/// # Examples
///
/// ```
/// use ivsort_lib::sort::codec::codec_for_path;
/// use std::path::Path;
///
/// assert_eq!(codec_for_path(Path::new("genes.gff3.gz")).unwrap().name(), "gff");
/// assert!(codec_for_path(Path::new("reads.bam")).is_err());
/// ```
pub fn codec_for_path(path: &Path) -> Result<&'static dyn RecordCodec> {
    CodecRegistry::global().for_path(path)
}

/// Whether the path names a gzip-compressed file.
#[must_use]
pub fn is_gzip_path(path: &Path) -> bool {
    path.file_name().and_then(|n| n.to_str()).is_some_and(|n| n.ends_with(GZIP_SUFFIX))
}

/// Checks that a data line has at least `min` columns.
pub(crate) fn require_min_columns(
    fields: &[String],
    min: usize,
) -> std::result::Result<(), String> {
    if fields.len() < min {
        return Err(format!("expected at least {min} columns, found {}", fields.len()));
    }
    Ok(())
}

/// Parses an integer coordinate column.
pub(crate) fn parse_coordinate(
    fields: &[String],
    index: usize,
    name: &str,
) -> std::result::Result<i64, String> {
    let raw = &fields[index];
    raw.parse::<i64>()
        .map_err(|_| format!("non-numeric {name} coordinate '{raw}' in column {}", index + 1))
}

/// Whether `line` starts with `keyword` followed by whitespace or end of line.
pub(crate) fn starts_with_keyword(line: &str, keyword: &str) -> bool {
    line.strip_prefix(keyword)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with(char::is_whitespace))
}
