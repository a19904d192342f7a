use flate2::Crc;
use log::trace;

use crate::error::{Error, Result, Stage};
use crate::view::View;

use super::inflate::decompress;
use super::parser::{Entries, Entry, find_eocd};
use super::structures::EocdRecord;

/// Upper bound on the buffer reserved up front by `extract_to_vec`; the
/// declared size is not trusted for allocation.
const MAX_PREALLOC: u64 = 1 << 20;

/// A ZIP archive over a borrowed buffer.
///
/// Construction locates and validates the EOCD record; entries are decoded
/// lazily by [`entries`](Self::entries). Nothing is copied out of the
/// buffer until an entry is extracted.
#[derive(Debug, Clone, Copy)]
pub struct ZipArchive<'a> {
    data: View<'a>,
    eocd: EocdRecord<'a>,
    eocd_offset: usize,
}

impl<'a> ZipArchive<'a> {
    pub fn new(data: &'a [u8]) -> Result<Self> {
        let data = View::new(data);
        let (eocd, eocd_offset) = find_eocd(data)?;
        Ok(Self {
            data,
            eocd,
            eocd_offset,
        })
    }

    pub fn eocd(&self) -> &EocdRecord<'a> {
        &self.eocd
    }

    /// Offset of the EOCD record from the start of the archive.
    pub fn eocd_offset(&self) -> usize {
        self.eocd_offset
    }

    pub fn comment(&self) -> View<'a> {
        self.eocd.comment
    }

    /// Number of entries the central directory declares.
    pub fn len(&self) -> usize {
        usize::from(self.eocd.total_entries)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// List all files in the archive
    pub fn entries(&self) -> Entries<'a> {
        // `find_eocd` validated the record against this same buffer.
        Entries::from_validated(self.data, self.eocd)
    }

    /// Decompress an entry, passing decoded bytes to `sink` as they are
    /// produced, then verify the decoded size and CRC-32.
    ///
    /// Decoding stops as soon as the output exceeds the declared
    /// uncompressed size; `sink` never sees more than that many bytes.
    pub fn extract_with<F>(&self, entry: &Entry<'a>, mut sink: F) -> Result<u64>
    where
        F: FnMut(&[u8]),
    {
        if entry.central.is_encrypted() || entry.local.is_encrypted() {
            return Err(Error::UnsupportedEncryption.at_entry(entry.index, Stage::Decompression));
        }

        let expected = entry.uncompressed_size();
        let mut crc = Crc::new();
        let mut seen = 0u64;
        let written = decompress(entry.compression_method(), entry.payload, |chunk| {
            seen += chunk.len() as u64;
            if seen > expected {
                // `seen` is a lower bound; the rest of the stream is not decoded.
                return Err(Error::SizeMismatch {
                    expected,
                    actual: seen,
                });
            }
            crc.update(chunk);
            sink(chunk);
            Ok(())
        })
        .map_err(|e| e.at_entry(entry.index, Stage::Decompression))?;

        trace!("Entry {}: decoded {written} bytes", entry.index);

        if written != expected {
            return Err(Error::SizeMismatch {
                expected,
                actual: written,
            }
            .at_entry(entry.index, Stage::Decompression));
        }
        if crc.sum() != entry.crc32() {
            return Err(Error::ChecksumMismatch {
                expected: entry.crc32(),
                actual: crc.sum(),
            }
            .at_entry(entry.index, Stage::Decompression));
        }

        Ok(written)
    }

    /// Extract file data to memory
    pub fn extract_to_vec(&self, entry: &Entry<'a>) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(entry.uncompressed_size().min(MAX_PREALLOC) as usize);
        self.extract_with(entry, |chunk| out.extend_from_slice(chunk))?;
        Ok(out)
    }
}
