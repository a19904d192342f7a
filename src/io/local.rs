use super::{ReadAt, SourceError};
use anyhow::Result;
use async_trait::async_trait;
use memmap2::Mmap;
use std::fs::File;
use std::path::Path;

/// Local file mapped read-only into memory
pub struct LocalFileReader {
    // Zero-length files cannot be mapped on every platform.
    map: Option<Mmap>,
    size: u64,
}

impl LocalFileReader {
    pub fn new(path: &Path) -> std::result::Result<Self, SourceError> {
        let file = File::open(path).map_err(|source| SourceError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let size = file
            .metadata()
            .map_err(|source| SourceError::Stat {
                path: path.to_path_buf(),
                source,
            })?
            .len();

        if size == 0 {
            return Ok(Self { map: None, size });
        }

        // SAFETY: mapped read-only; the file must not be truncated while mapped.
        let map = unsafe { Mmap::map(&file) }.map_err(|source| SourceError::Map {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(Self {
            map: Some(map),
            size,
        })
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.map.as_deref().unwrap_or(&[])
    }
}

#[async_trait]
impl ReadAt for LocalFileReader {
    async fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<usize> {
        let bytes = self.as_bytes();
        let start = usize::try_from(offset)?.min(bytes.len());
        let n = buf.len().min(bytes.len() - start);
        buf[..n].copy_from_slice(&bytes[start..start + n]);
        Ok(n)
    }

    fn size(&self) -> u64 {
        self.size
    }
}
