//! Input buffer providers.
//!
//! The decoder works on one contiguous, read-only byte buffer. Local files
//! are memory-mapped; remote files are fetched with HTTP Range requests into
//! memory. Either way the result is an [`ArchiveBuffer`].

mod http;
mod local;

pub use http::HttpRangeReader;
pub use local::LocalFileReader;

use std::ops::Deref;
use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use async_trait::async_trait;
use log::debug;
use thiserror::Error;

/// Bytes requested per `read_at` call when materializing a whole source.
const READ_CHUNK: usize = 4 * 1024 * 1024;

/// Trait for random access reading from a data source
#[async_trait]
pub trait ReadAt: Send + Sync {
    /// Read data at the specified offset into the buffer
    async fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<usize>;

    /// Get the total size of the data source
    fn size(&self) -> u64;
}

/// Failure to obtain a local buffer, by step.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("cannot open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot stat {}: {source}", path.display())]
    Stat {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot map {}: {source}", path.display())]
    Map {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A complete archive held in memory or mapped from disk.
pub enum ArchiveBuffer {
    Mapped(LocalFileReader),
    Owned(Vec<u8>),
}

impl Deref for ArchiveBuffer {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match self {
            ArchiveBuffer::Mapped(reader) => reader.as_bytes(),
            ArchiveBuffer::Owned(bytes) => bytes,
        }
    }
}

pub fn is_http_url(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

/// Open a local path or HTTP(S) URL as a single contiguous buffer.
pub async fn load(source: &str) -> Result<ArchiveBuffer> {
    if is_http_url(source) {
        let reader = HttpRangeReader::new(source.to_string()).await?;
        let bytes = read_fully(&reader).await?;
        debug!(
            "Fetched {} bytes ({} transferred)",
            bytes.len(),
            reader.transferred_bytes()
        );
        Ok(ArchiveBuffer::Owned(bytes))
    } else {
        Ok(ArchiveBuffer::Mapped(LocalFileReader::new(Path::new(source))?))
    }
}

/// Read an entire source into memory.
pub async fn read_fully<R: ReadAt + ?Sized>(reader: &R) -> Result<Vec<u8>> {
    let size = usize::try_from(reader.size())?;
    let mut buf = vec![0u8; size];

    let mut offset = 0;
    while offset < size {
        let end = (offset + READ_CHUNK).min(size);
        let n = reader.read_at(offset as u64, &mut buf[offset..end]).await?;
        if n == 0 {
            bail!("Unexpected end of data at offset {offset} of {size}");
        }
        offset += n;
    }

    Ok(buf)
}
