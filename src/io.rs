//! Byte-level sources and sinks for format readers and serializers
//!
//! Format-specific readers and writers do their I/O through this seam so
//! the engines stay agnostic to where bytes come from or go. Compression is
//! auto-detected from the file extension on both sides:
//! - `.gz` / `.gzip` → gzip
//! - other → uncompressed
//!
//! # Example
//!
//! ```no_run
//! use phylostream::io::{DataSink, DataSource};
//!
//! # fn main() -> phylostream::Result<()> {
//! let source = DataSource::from_path("alignment.fasta.gz");
//! let reader = source.open()?; // transparently decompressed
//!
//! let sink = DataSink::from_path("out.nex");
//! # Ok(())
//! # }
//! ```

use crate::error::Result;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

fn is_gzip_extension(extension: Option<&str>) -> bool {
    matches!(extension, Some("gz") | Some("gzip"))
}

/// Input origin a format reader pulls bytes from
#[derive(Debug, Clone)]
pub enum DataSource {
    /// Local file path
    Local(PathBuf),
}

impl DataSource {
    /// Create a source from a file path
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        Self::Local(path.as_ref().to_path_buf())
    }

    /// Open the source as a buffered character reader
    ///
    /// Gzip input is decompressed transparently based on the extension.
    pub fn open(&self) -> Result<Box<dyn BufRead>> {
        match self {
            Self::Local(path) => {
                let file = File::open(path)?;
                if is_gzip_extension(path.extension().and_then(|s| s.to_str())) {
                    Ok(Box::new(BufReader::new(GzDecoder::new(file))))
                } else {
                    Ok(Box::new(BufReader::new(file)))
                }
            }
        }
    }
}

/// Output destination a format serializer writes bytes into
#[derive(Debug, Clone)]
pub enum DataSink {
    /// Write to a local file path
    Local(PathBuf),
    /// Write to standard output
    Stdout,
}

impl DataSink {
    /// Create a sink from a file path
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        Self::Local(path.as_ref().to_path_buf())
    }

    /// Create a sink for standard output
    pub fn stdout() -> Self {
        Self::Stdout
    }

    /// File extension, if this is a local file sink
    pub(crate) fn extension(&self) -> Option<&str> {
        match self {
            Self::Local(path) => path.extension().and_then(|s| s.to_str()),
            Self::Stdout => None,
        }
    }

    /// Whether this sink compresses its output
    pub fn is_compressed(&self) -> bool {
        is_gzip_extension(self.extension())
    }
}

enum WriterBackend {
    Plain(BufWriter<File>),
    Gzip(GzEncoder<BufWriter<File>>),
    Stdout(io::Stdout),
}

/// Buffered writer over a [`DataSink`] with compression auto-detection
///
/// Must be [`finish`](Self::finish)ed so compressed streams are terminated
/// properly.
pub struct CompressedWriter {
    backend: WriterBackend,
}

impl CompressedWriter {
    /// Open a writer over `sink`
    pub fn new(sink: DataSink) -> Result<Self> {
        let backend = match &sink {
            DataSink::Local(path) => {
                let file = BufWriter::new(File::create(path)?);
                if sink.is_compressed() {
                    WriterBackend::Gzip(GzEncoder::new(file, Compression::default()))
                } else {
                    WriterBackend::Plain(file)
                }
            }
            DataSink::Stdout => WriterBackend::Stdout(io::stdout()),
        };
        Ok(Self { backend })
    }

    /// Flush and close, terminating any compression stream
    pub fn finish(self) -> Result<()> {
        match self.backend {
            WriterBackend::Plain(mut w) => w.flush()?,
            WriterBackend::Gzip(encoder) => {
                encoder.finish()?.flush()?;
            }
            WriterBackend::Stdout(mut out) => out.flush()?,
        }
        Ok(())
    }
}

impl Write for CompressedWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match &mut self.backend {
            WriterBackend::Plain(w) => w.write(buf),
            WriterBackend::Gzip(w) => w.write(buf),
            WriterBackend::Stdout(w) => w.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match &mut self.backend {
            WriterBackend::Plain(w) => w.flush(),
            WriterBackend::Gzip(w) => w.flush(),
            WriterBackend::Stdout(w) => w.flush(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    #[test]
    fn test_extension_detection() {
        assert!(DataSink::from_path("out.nex.gz").is_compressed());
        assert!(DataSink::from_path("out.fasta.gzip").is_compressed());
        assert!(!DataSink::from_path("out.nex").is_compressed());
        assert!(!DataSink::stdout().is_compressed());
    }

    #[test]
    fn test_plain_write_read_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plain.txt");

        let mut writer = CompressedWriter::new(DataSink::from_path(&path)).unwrap();
        writer.write_all(b">seq1\nACGT\n").unwrap();
        writer.finish().unwrap();

        let mut content = String::new();
        DataSource::from_path(&path)
            .open()
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        assert_eq!(content, ">seq1\nACGT\n");
    }

    #[test]
    fn test_gzip_write_read_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("compressed.txt.gz");

        let mut writer = CompressedWriter::new(DataSink::from_path(&path)).unwrap();
        writer.write_all(b">seq1\nACGT\n").unwrap();
        writer.finish().unwrap();

        // The file on disk is gzip, not the raw text.
        let raw = std::fs::read(&path).unwrap();
        assert_eq!(&raw[..2], &[0x1f, 0x8b]);

        let mut content = String::new();
        DataSource::from_path(&path)
            .open()
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        assert_eq!(content, ">seq1\nACGT\n");
    }
}
