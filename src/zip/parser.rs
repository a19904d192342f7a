//! Locating and walking the central directory.
//!
//! ## Parsing Strategy
//!
//! ZIP files are designed to be read from the end:
//! 1. Find the End of Central Directory (EOCD) record by scanning the tail
//!    of the archive backwards for its signature
//! 2. Walk the Central Directory one header at a time
//! 3. For each header, decode the Local File Header it points at and bound
//!    the entry's payload
//!
//! All offsets are checked by [`validate`](super::validate) before they are
//! used, so the work done is bounded by the archive size no matter what the
//! records claim.

use std::borrow::Cow;
use std::iter::FusedIterator;

use log::{debug, trace};

use crate::error::{Error, Result, Stage, ValidationError};
use crate::view::View;

use super::structures::{
    CentralDirectoryFileHeader, CompressionMethod, EocdRecord, LocalFileHeader, dos_date, dos_time,
};
use super::validate::{
    validate_central_header, validate_eocd, validate_eocd_position, validate_local_header,
};

/// Find and validate the End of Central Directory record.
///
/// Only the last `EocdRecord::max_bytes()` bytes can hold the record, since
/// its comment is at most 65535 bytes long. Candidates are tried from the
/// rightmost signature backwards; the first one that decodes and validates
/// wins. A comment that happens to contain the signature yields candidates
/// that fail validation and are skipped.
///
/// # Returns
///
/// A tuple of (EOCD record, offset of EOCD in the archive).
pub fn find_eocd(archive: View<'_>) -> Result<(EocdRecord<'_>, usize)> {
    let window_len = EocdRecord::max_bytes().min(archive.len());
    let window_start = archive.len() - window_len;
    let window = archive.last(window_len);

    if window.len() < EocdRecord::min_bytes() {
        return Err(Error::SignatureNotFound);
    }

    let mut end = window.len();
    while let Some(pos) = window.first(end).rfind(&EocdRecord::SIGNATURE_BYTES) {
        let offset = window_start + pos;
        let candidate = EocdRecord::read(window.skip(pos)).and_then(|eocd| {
            validate_eocd(&eocd, archive.len())?;
            validate_eocd_position(&eocd, offset)?;
            Ok(eocd)
        });

        match candidate {
            Ok(eocd) => {
                debug!(
                    "EOCD at offset {offset}: {} entries, central directory {} bytes at {}",
                    eocd.total_entries, eocd.central_dir_size, eocd.central_dir_offset
                );
                return Ok((eocd, offset));
            }
            Err(err) => debug!("Rejected EOCD candidate at offset {offset}: {err}"),
        }

        end = pos;
    }

    Err(Error::SignatureNotFound)
}

/// One archive entry: its central directory header, its local header and
/// the still-compressed payload.
#[derive(Debug, Clone, Copy)]
pub struct Entry<'a> {
    pub index: usize,
    pub central: CentralDirectoryFileHeader<'a>,
    pub local: LocalFileHeader<'a>,
    pub payload: View<'a>,
}

impl<'a> Entry<'a> {
    pub fn name(&self) -> Cow<'a, str> {
        self.central.file_name()
    }

    pub fn is_directory(&self) -> bool {
        self.central.is_directory()
    }

    pub fn compression_method(&self) -> CompressionMethod {
        self.central.compression()
    }

    pub fn compressed_size(&self) -> u64 {
        self.central.compressed_size.into()
    }

    pub fn uncompressed_size(&self) -> u64 {
        self.central.uncompressed_size.into()
    }

    pub fn crc32(&self) -> u32 {
        self.central.crc32
    }

    /// Parse modification date to (year, month, day)
    pub fn mod_date(&self) -> (u16, u8, u8) {
        dos_date(self.central.last_mod_date)
    }

    /// Parse modification time to (hour, minute, second)
    pub fn mod_time(&self) -> (u8, u8, u8) {
        dos_time(self.central.last_mod_time)
    }
}

/// Bytes of the central directory the walker may read: the declared size,
/// capped by what the declared entry count could occupy.
fn directory_span(eocd: &EocdRecord<'_>) -> usize {
    let most = u64::from(eocd.total_entries) * CentralDirectoryFileHeader::max_bytes() as u64;
    // Bounded by `central_dir_size`, a u32 already checked against the archive size.
    most.min(u64::from(eocd.central_dir_size)) as usize
}

/// Lazy walk over the central directory.
///
/// Yields one `Result` per entry and stops after the first failure:
/// once a variable-length field is corrupt, the offsets of every later
/// header are untrustworthy.
pub struct Entries<'a> {
    archive: View<'a>,
    eocd: EocdRecord<'a>,
    cursor: View<'a>,
    index: usize,
    failed: bool,
}

impl<'a> Entries<'a> {
    /// Start walking the central directory described by `eocd`.
    ///
    /// The EOCD is re-checked against the archive size so the walk never
    /// slices outside the buffer.
    pub fn new(archive: View<'a>, eocd: EocdRecord<'a>) -> Result<Self> {
        validate_eocd(&eocd, archive.len())?;
        Ok(Self::from_validated(archive, eocd))
    }

    /// `eocd` must already have passed `validate_eocd` against `archive`.
    pub(crate) fn from_validated(archive: View<'a>, eocd: EocdRecord<'a>) -> Self {
        let len = directory_span(&eocd);
        let cursor = archive.subrange(eocd.central_dir_offset as usize, len);

        Self {
            archive,
            eocd,
            cursor,
            index: 0,
            failed: false,
        }
    }

    fn total(&self) -> usize {
        usize::from(self.eocd.total_entries)
    }

    fn read_entry(&mut self, index: usize) -> Result<Entry<'a>> {
        let archive_size = self.archive.len();

        let (central, rest) = CentralDirectoryFileHeader::read(self.cursor)
            .and_then(|(header, rest)| {
                validate_central_header(&header, &self.eocd, archive_size)?;
                Ok((header, rest))
            })
            .map_err(|e| e.at_entry(index, Stage::CentralHeader))?;
        self.cursor = rest;

        // Validated: local_header_offset < central_dir_offset <= archive size.
        let offset = central.local_header_offset as usize;
        let region = self
            .archive
            .subrange(offset, self.eocd.central_dir_offset as usize - offset);

        let (local, rest) = LocalFileHeader::read(region)
            .and_then(|(header, rest)| {
                validate_local_header(&header, &central, &self.eocd, archive_size)?;
                let size = central.compressed_size as usize;
                if size > rest.len() {
                    return Err(ValidationError::PayloadOutOfBounds {
                        size: size as u64,
                        available: rest.len(),
                    }
                    .into());
                }
                Ok((header, rest))
            })
            .map_err(|e| e.at_entry(index, Stage::LocalHeader))?;

        let payload = rest.first(central.compressed_size as usize);
        trace!(
            "Entry {index}: {:?} at {offset}, {} bytes compressed",
            central.file_name(),
            payload.len()
        );

        Ok(Entry {
            index,
            central,
            local,
            payload,
        })
    }
}

impl<'a> Iterator for Entries<'a> {
    type Item = Result<Entry<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.index >= self.total() {
            return None;
        }

        let index = self.index;
        let entry = self.read_entry(index);
        match &entry {
            Ok(_) => self.index += 1,
            Err(err) => {
                debug!("Stopping central directory walk: {err}");
                self.failed = true;
            }
        }
        Some(entry)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.failed {
            (0, Some(0))
        } else {
            (0, Some(self.total() - self.index))
        }
    }
}

impl FusedIterator for Entries<'_> {}
