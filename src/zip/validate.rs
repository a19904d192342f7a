//! Cross-record consistency checks.
//!
//! Every offset and size read from an archive is checked against the true
//! archive size and against the records that reference it before it is used
//! to slice the buffer. These are pure predicates: they never touch the
//! buffer themselves.

use crate::error::{Error, Result, ValidationError};
use crate::view::View;

use super::structures::{CentralDirectoryFileHeader, EocdRecord, LocalFileHeader};

fn check_signature(record: &'static str, expected: u32, found: u32) -> Result<()> {
    if expected == found {
        Ok(())
    } else {
        Err(Error::SignatureMismatch {
            record,
            expected,
            found,
        })
    }
}

fn check_len(field: &'static str, declared: u16, bound: View<'_>) -> Result<()> {
    if usize::from(declared) == bound.len() {
        Ok(())
    } else {
        Err(ValidationError::LengthMismatch {
            field,
            declared: declared.into(),
            actual: bound.len(),
        }
        .into())
    }
}

/// Check an EOCD record against the size of the archive it was found in.
pub fn validate_eocd(eocd: &EocdRecord<'_>, archive_size: usize) -> Result<()> {
    let archive_size = archive_size as u64;

    check_signature("end of central directory", EocdRecord::SIGNATURE, eocd.signature)?;

    if eocd.this_disk != 0 || eocd.start_disk != 0 {
        return Err(ValidationError::MultiDisk {
            disk: eocd.this_disk,
            cd_disk: eocd.start_disk,
        }
        .into());
    }

    if eocd.total_entries != eocd.entries_this_disk {
        return Err(ValidationError::EntryCountMismatch {
            this_disk: eocd.entries_this_disk,
            total: eocd.total_entries,
        }
        .into());
    }

    check_len("archive comment", eocd.comment_len, eocd.comment)?;

    let offset = u64::from(eocd.central_dir_offset);
    let size = u64::from(eocd.central_dir_size);
    if offset >= archive_size || size > archive_size - offset {
        return Err(ValidationError::CentralDirectoryOutOfBounds {
            offset,
            size,
            archive_size,
        }
        .into());
    }

    let entries = u64::from(eocd.total_entries);
    let min = entries * CentralDirectoryFileHeader::min_bytes() as u64;
    let max = entries * CentralDirectoryFileHeader::max_bytes() as u64;
    if size < min || size > max {
        return Err(ValidationError::CentralDirectorySize {
            size,
            entries: eocd.total_entries,
            min,
            max,
        }
        .into());
    }

    Ok(())
}

/// The central directory must end before the EOCD record that describes it.
pub fn validate_eocd_position(eocd: &EocdRecord<'_>, eocd_offset: usize) -> Result<()> {
    let end = u64::from(eocd.central_dir_offset) + u64::from(eocd.central_dir_size);
    if end > eocd_offset as u64 {
        return Err(ValidationError::CentralDirectoryOverlapsEocd {
            eocd_offset: eocd_offset as u64,
        }
        .into());
    }
    Ok(())
}

/// Check a central directory header before following its local header offset.
pub fn validate_central_header(
    header: &CentralDirectoryFileHeader<'_>,
    eocd: &EocdRecord<'_>,
    archive_size: usize,
) -> Result<()> {
    check_signature(
        "central directory file header",
        CentralDirectoryFileHeader::SIGNATURE,
        header.signature,
    )?;

    if header.disk_number != 0 {
        return Err(ValidationError::MultiDisk {
            disk: header.disk_number,
            cd_disk: eocd.start_disk,
        }
        .into());
    }

    check_len("file name", header.name_len, header.name)?;
    check_len("extra field", header.extra_len, header.extra)?;
    check_len("file comment", header.comment_len, header.comment)?;

    let offset = u64::from(header.local_header_offset);
    let cd_offset = u64::from(eocd.central_dir_offset);
    let limit = cd_offset.min(archive_size as u64);
    if offset >= limit {
        return Err(ValidationError::LocalHeaderOutOfBounds { offset, limit }.into());
    }

    let gap = cd_offset - offset;
    if gap < LocalFileHeader::min_bytes() as u64 {
        return Err(ValidationError::LocalHeaderTooClose {
            offset,
            gap,
            min: LocalFileHeader::min_bytes(),
        }
        .into());
    }

    Ok(())
}

/// Check a local header against its central directory header and the EOCD.
pub fn validate_local_header(
    local: &LocalFileHeader<'_>,
    central: &CentralDirectoryFileHeader<'_>,
    eocd: &EocdRecord<'_>,
    archive_size: usize,
) -> Result<()> {
    check_signature("local file header", LocalFileHeader::SIGNATURE, local.signature)?;

    check_len("file name", local.name_len, local.name)?;
    check_len("extra field", local.extra_len, local.extra)?;

    let size = u64::from(local.compressed_size);
    let limit = u64::from(eocd.central_dir_offset).min(archive_size as u64);
    if size >= archive_size as u64 || size >= u64::from(eocd.central_dir_offset) {
        return Err(ValidationError::CompressedSizeOutOfBounds { size, limit }.into());
    }

    if local.name.as_bytes() != central.name.as_bytes() {
        return Err(ValidationError::HeaderMismatch { field: "file name" }.into());
    }

    if local.compression_method != central.compression_method {
        return Err(ValidationError::HeaderMismatch {
            field: "compression method",
        }
        .into());
    }

    // With a data descriptor the local CRC and sizes may be zero.
    if !local.has_data_descriptor() {
        if local.crc32 != central.crc32 {
            return Err(ValidationError::HeaderMismatch { field: "crc-32" }.into());
        }
        if local.compressed_size != central.compressed_size
            || local.uncompressed_size != central.uncompressed_size
        {
            return Err(ValidationError::HeaderMismatch { field: "sizes" }.into());
        }
    }

    Ok(())
}
