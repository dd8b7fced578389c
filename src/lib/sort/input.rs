//! Line-oriented input reading.
//!
//! [`open_input`] opens a plain or gzip-compressed file, [`LineReader`] numbers its
//! lines and strips terminators, and [`RecordStream`] turns the lines into decoded
//! [`Record`]s while collecting header and trailer lines on the side.

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use flate2::read::MultiGzDecoder;

use crate::errors::{DecodeError, Result, ResourceContext, SortError};
use crate::progress::ProgressTracker;
use crate::sort::codec::{RecordCodec, is_gzip_path};
use crate::sort::record::Record;
use crate::sort::temp::WRITE_BUFFER_SIZE;

/// Buffer size for reading input and run files.
pub const READ_BUFFER_SIZE: usize = 64 * 1024;

/// Opens a file for buffered reading, decompressing it when the name ends in `.gz`.
///
/// Concatenated gzip members (as written by `bgzip` or parallel compressors) are
/// read as one stream.
///
/// # Errors
///
/// Returns an I/O error if the file cannot be opened.
pub fn open_input(path: &Path) -> io::Result<Box<dyn BufRead + Send>> {
    let file = File::open(path)?;
    if is_gzip_path(path) {
        let decoder = MultiGzDecoder::new(BufReader::with_capacity(READ_BUFFER_SIZE, file));
        Ok(Box::new(BufReader::with_capacity(READ_BUFFER_SIZE, decoder)))
    } else {
        Ok(Box::new(BufReader::with_capacity(READ_BUFFER_SIZE, file)))
    }
}

/// Reads lines as bytes, tracking 1-based line numbers.
///
/// The trailing `\n` is removed from each line, and by default a trailing `\r`,
/// including on a final line that has no `\n`.
pub struct LineReader<R> {
    reader: R,
    buf: Vec<u8>,
    line_number: u64,
    strip_carriage_return: bool,
}

impl<R: BufRead> LineReader<R> {
    /// Creates a reader that strips both `\n` and `\r\n` terminators.
    pub fn new(reader: R) -> Self {
        Self { reader, buf: Vec::with_capacity(256), line_number: 0, strip_carriage_return: true }
    }

    /// Keeps a `\r` before the `\n` as part of the line.
    #[must_use]
    pub fn keep_carriage_returns(mut self) -> Self {
        self.strip_carriage_return = false;
        self
    }

    /// Number of the line most recently returned (0 before the first line).
    #[must_use]
    pub fn line_number(&self) -> u64 {
        self.line_number
    }

    /// Reads the next line, or `None` at end of input.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if reading fails.
    pub fn next_line(&mut self) -> io::Result<Option<(u64, &[u8])>> {
        self.buf.clear();
        if self.reader.read_until(b'\n', &mut self.buf)? == 0 {
            return Ok(None);
        }
        self.line_number += 1;

        let mut line = self.buf.as_slice();
        line = line.strip_suffix(b"\n").unwrap_or(line);
        if self.strip_carriage_return {
            line = line.strip_suffix(b"\r").unwrap_or(line);
        }
        Ok(Some((self.line_number, line)))
    }
}

/// Decoded records of one input file.
///
/// Yields every data record in file order. Header lines (comments, track and
/// browser lines, directives) are collected in encounter order wherever they
/// appear, and blank lines are dropped. Once the codec reports the end of the
/// record section, that line and everything after it is collected verbatim as
/// the trailer. Trailer lines are streamed to the file set with
/// [`trailer_file`](Self::trailer_file), or counted and dropped when none is set.
/// The first error ends the stream.
pub struct RecordStream<'a> {
    codec: &'a dyn RecordCodec,
    lines: LineReader<Box<dyn BufRead + Send>>,
    path: String,
    header: Vec<String>,
    trailer_path: Option<PathBuf>,
    trailer: Option<BufWriter<File>>,
    trailer_lines: u64,
    in_trailer: bool,
    done: bool,
    progress: ProgressTracker,
}

impl<'a> RecordStream<'a> {
    /// Opens `path` and decodes it with `codec`.
    ///
    /// # Errors
    ///
    /// Returns a resource error if the file cannot be opened.
    pub fn open(path: &Path, codec: &'a dyn RecordCodec) -> Result<Self> {
        let reader = open_input(path)
            .resource_context(|| format!("failed to open input '{}'", path.display()))?;
        Ok(Self::from_reader(reader, path.display().to_string(), codec))
    }

    /// Decodes lines from an already opened reader; `path` is used in messages.
    pub fn from_reader(
        reader: Box<dyn BufRead + Send>,
        path: impl Into<String>,
        codec: &'a dyn RecordCodec,
    ) -> Self {
        Self {
            codec,
            lines: LineReader::new(reader),
            path: path.into(),
            header: Vec::new(),
            trailer_path: None,
            trailer: None,
            trailer_lines: 0,
            in_trailer: false,
            done: false,
            progress: ProgressTracker::new(format!("Read {} records", codec.name())),
        }
    }

    /// Number of the line most recently read.
    #[must_use]
    pub fn line_number(&self) -> u64 {
        self.lines.line_number()
    }

    /// Header lines collected so far.
    #[must_use]
    pub fn header_lines(&self) -> &[String] {
        &self.header
    }

    /// Writes trailer lines to `path` instead of dropping them. The file is
    /// created only if the input has a trailer.
    #[must_use]
    pub fn trailer_file(mut self, path: PathBuf) -> Self {
        self.trailer_path = Some(path);
        self
    }

    /// Number of trailer lines seen so far.
    #[must_use]
    pub fn trailer_lines(&self) -> u64 {
        self.trailer_lines
    }

    /// Consumes the stream, returning the header lines and the path of the
    /// trailer file, if one was written.
    ///
    /// # Errors
    ///
    /// Returns a resource error if the trailer file cannot be flushed.
    pub fn into_parts(self) -> Result<(Vec<String>, Option<PathBuf>)> {
        let trailer = match (self.trailer, self.trailer_path) {
            (Some(mut writer), Some(path)) => {
                writer.flush().resource_context(|| {
                    format!("failed to write trailer file '{}'", path.display())
                })?;
                Some(path)
            }
            _ => None,
        };
        Ok((self.header, trailer))
    }

    fn write_trailer(&mut self, line: &str) -> Result<()> {
        self.trailer_lines += 1;
        let Some(path) = &self.trailer_path else {
            return Ok(());
        };
        let context = || format!("failed to write trailer file '{}'", path.display());
        if self.trailer.is_none() {
            let file = File::create(path).resource_context(context)?;
            self.trailer = Some(BufWriter::with_capacity(WRITE_BUFFER_SIZE, file));
        }
        if let Some(writer) = &mut self.trailer {
            writeln!(writer, "{line}").resource_context(context)?;
        }
        Ok(())
    }

    fn read_next(&mut self) -> Result<Option<Record>> {
        loop {
            let Some((line_number, bytes)) = self
                .lines
                .next_line()
                .resource_context(|| format!("failed to read input '{}'", self.path))?
            else {
                self.progress.log_final();
                return Ok(None);
            };

            let line = match std::str::from_utf8(bytes) {
                Ok(line) => line,
                Err(_) => {
                    let raw = String::from_utf8_lossy(bytes);
                    return Err(SortError::Decode {
                        path: self.path.clone(),
                        source: DecodeError::new(line_number, &raw, "line is not valid UTF-8"),
                    });
                }
            };

            if self.in_trailer || self.codec.ends_records(line) {
                self.in_trailer = true;
                let line = line.to_string();
                self.write_trailer(&line)?;
                continue;
            }

            match self.codec.decode(line, line_number) {
                Ok(Some(record)) => {
                    self.progress.record(1);
                    return Ok(Some(record));
                }
                Ok(None) => {
                    if !line.trim().is_empty() {
                        self.header.push(line.to_string());
                    }
                }
                Err(source) => return Err(SortError::Decode { path: self.path.clone(), source }),
            }
        }
    }
}

impl Iterator for RecordStream<'_> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.read_next() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
