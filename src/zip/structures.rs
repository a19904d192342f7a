//! ZIP record layouts.
//!
//! Each record is a plain struct plus a `const` [`Format`] listing its fields
//! in on-disk order. Variable-length fields (names, extra fields, comments)
//! are [`View`]s into the archive buffer and are never copied.

use std::borrow::Cow;

use crate::codec::{Fields, Format, Record, Segment};
use crate::error::Result;
use crate::view::View;

/// ZIP compression methods
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionMethod {
    Stored,
    Deflate,
    Unknown(u16),
}

impl CompressionMethod {
    pub fn from_u16(value: u16) -> Self {
        match value {
            0 => CompressionMethod::Stored,
            8 => CompressionMethod::Deflate,
            _ => CompressionMethod::Unknown(value),
        }
    }
}

/// General purpose flag: entry is encrypted.
pub const FLAG_ENCRYPTED: u16 = 1 << 0;
/// General purpose flag: CRC and sizes follow the payload in a data descriptor.
pub const FLAG_DATA_DESCRIPTOR: u16 = 1 << 3;

/// Decode a DOS date into (year, month, day).
pub fn dos_date(date: u16) -> (u16, u8, u8) {
    let day = (date & 0x1F) as u8;
    let month = ((date >> 5) & 0x0F) as u8;
    let year = ((date >> 9) & 0x7F) + 1980;
    (year, month, day)
}

/// Decode a DOS time into (hour, minute, second).
pub fn dos_time(time: u16) -> (u8, u8, u8) {
    let second = ((time & 0x1F) * 2) as u8;
    let minute = ((time >> 5) & 0x3F) as u8;
    let hour = ((time >> 11) & 0x1F) as u8;
    (hour, minute, second)
}

/// End of Central Directory record (EOCD) - 22 bytes plus comment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EocdRecord<'a> {
    pub signature: u32,
    pub this_disk: u16,
    pub start_disk: u16,
    pub entries_this_disk: u16,
    pub total_entries: u16,
    pub central_dir_size: u32,
    pub central_dir_offset: u32,
    pub comment_len: u16,
    pub comment: View<'a>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EocdField {
    Signature,
    ThisDisk,
    StartDisk,
    EntriesThisDisk,
    TotalEntries,
    CentralDirSize,
    CentralDirOffset,
    CommentLen,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EocdBytes {
    Comment,
}

const EOCD_LAYOUT: &[Segment<EocdField, EocdBytes>] = &[
    Segment::int(EocdField::Signature, 4),
    Segment::int(EocdField::ThisDisk, 2),
    Segment::int(EocdField::StartDisk, 2),
    Segment::int(EocdField::EntriesThisDisk, 2),
    Segment::int(EocdField::TotalEntries, 2),
    Segment::int(EocdField::CentralDirSize, 4),
    Segment::int(EocdField::CentralDirOffset, 4),
    Segment::int(EocdField::CommentLen, 2),
    Segment::dynamic_u16(EocdBytes::Comment, EocdField::CommentLen),
];

impl<'a> Fields<'a> for EocdRecord<'a> {
    type Int = EocdField;
    type Bytes = EocdBytes;

    fn get(&self, field: EocdField) -> u64 {
        match field {
            EocdField::Signature => self.signature.into(),
            EocdField::ThisDisk => self.this_disk.into(),
            EocdField::StartDisk => self.start_disk.into(),
            EocdField::EntriesThisDisk => self.entries_this_disk.into(),
            EocdField::TotalEntries => self.total_entries.into(),
            EocdField::CentralDirSize => self.central_dir_size.into(),
            EocdField::CentralDirOffset => self.central_dir_offset.into(),
            EocdField::CommentLen => self.comment_len.into(),
        }
    }

    fn set(&mut self, field: EocdField, value: u64) {
        match field {
            EocdField::Signature => self.signature = value as u32,
            EocdField::ThisDisk => self.this_disk = value as u16,
            EocdField::StartDisk => self.start_disk = value as u16,
            EocdField::EntriesThisDisk => self.entries_this_disk = value as u16,
            EocdField::TotalEntries => self.total_entries = value as u16,
            EocdField::CentralDirSize => self.central_dir_size = value as u32,
            EocdField::CentralDirOffset => self.central_dir_offset = value as u32,
            EocdField::CommentLen => self.comment_len = value as u16,
        }
    }

    fn view(&self, field: EocdBytes) -> View<'a> {
        match field {
            EocdBytes::Comment => self.comment,
        }
    }

    fn bind(&mut self, field: EocdBytes, value: View<'a>) {
        match field {
            EocdBytes::Comment => self.comment = value,
        }
    }
}

impl<'a> Record<'a> for EocdRecord<'a> {
    const FORMAT: Format<EocdField, EocdBytes> = Format::new(EOCD_LAYOUT);
}

impl<'a> EocdRecord<'a> {
    pub const SIGNATURE: u32 = 0x06054b50;
    pub const SIGNATURE_BYTES: [u8; 4] = Self::SIGNATURE.to_le_bytes();

    pub const fn min_bytes() -> usize {
        <Self as Record<'a>>::FORMAT.min_bytes()
    }

    pub const fn max_bytes() -> usize {
        <Self as Record<'a>>::FORMAT.max_bytes()
    }

    /// Decode an EOCD record at the start of `view`. Any bytes after the
    /// comment are ignored.
    pub fn read(view: View<'a>) -> Result<Self> {
        let (record, _) = Self::decode(view)?;
        Ok(record)
    }

    pub fn write<'b>(&self, buf: &'b mut [u8]) -> Result<&'b mut [u8]> {
        self.encode(buf)
    }
}

/// Central Directory File Header (CDFH) - 46 bytes plus name, extra field and comment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CentralDirectoryFileHeader<'a> {
    pub signature: u32,
    pub version_made_by: u16,
    pub version_needed: u16,
    pub flags: u16,
    pub compression_method: u16,
    pub last_mod_time: u16,
    pub last_mod_date: u16,
    pub crc32: u32,
    pub compressed_size: u32,
    pub uncompressed_size: u32,
    pub name_len: u16,
    pub extra_len: u16,
    pub comment_len: u16,
    pub disk_number: u16,
    pub internal_attrs: u16,
    pub external_attrs: u32,
    pub local_header_offset: u32,
    pub name: View<'a>,
    pub extra: View<'a>,
    pub comment: View<'a>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CentralField {
    Signature,
    VersionMadeBy,
    VersionNeeded,
    Flags,
    CompressionMethod,
    LastModTime,
    LastModDate,
    Crc32,
    CompressedSize,
    UncompressedSize,
    NameLen,
    ExtraLen,
    CommentLen,
    DiskNumber,
    InternalAttrs,
    ExternalAttrs,
    LocalHeaderOffset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CentralBytes {
    Name,
    Extra,
    Comment,
}

const CENTRAL_LAYOUT: &[Segment<CentralField, CentralBytes>] = &[
    Segment::int(CentralField::Signature, 4),
    Segment::int(CentralField::VersionMadeBy, 2),
    Segment::int(CentralField::VersionNeeded, 2),
    Segment::int(CentralField::Flags, 2),
    Segment::int(CentralField::CompressionMethod, 2),
    Segment::int(CentralField::LastModTime, 2),
    Segment::int(CentralField::LastModDate, 2),
    Segment::int(CentralField::Crc32, 4),
    Segment::int(CentralField::CompressedSize, 4),
    Segment::int(CentralField::UncompressedSize, 4),
    Segment::int(CentralField::NameLen, 2),
    Segment::int(CentralField::ExtraLen, 2),
    Segment::int(CentralField::CommentLen, 2),
    Segment::int(CentralField::DiskNumber, 2),
    Segment::int(CentralField::InternalAttrs, 2),
    Segment::int(CentralField::ExternalAttrs, 4),
    Segment::int(CentralField::LocalHeaderOffset, 4),
    Segment::dynamic_u16(CentralBytes::Name, CentralField::NameLen),
    Segment::dynamic_u16(CentralBytes::Extra, CentralField::ExtraLen),
    Segment::dynamic_u16(CentralBytes::Comment, CentralField::CommentLen),
];

impl<'a> Fields<'a> for CentralDirectoryFileHeader<'a> {
    type Int = CentralField;
    type Bytes = CentralBytes;

    fn get(&self, field: CentralField) -> u64 {
        match field {
            CentralField::Signature => self.signature.into(),
            CentralField::VersionMadeBy => self.version_made_by.into(),
            CentralField::VersionNeeded => self.version_needed.into(),
            CentralField::Flags => self.flags.into(),
            CentralField::CompressionMethod => self.compression_method.into(),
            CentralField::LastModTime => self.last_mod_time.into(),
            CentralField::LastModDate => self.last_mod_date.into(),
            CentralField::Crc32 => self.crc32.into(),
            CentralField::CompressedSize => self.compressed_size.into(),
            CentralField::UncompressedSize => self.uncompressed_size.into(),
            CentralField::NameLen => self.name_len.into(),
            CentralField::ExtraLen => self.extra_len.into(),
            CentralField::CommentLen => self.comment_len.into(),
            CentralField::DiskNumber => self.disk_number.into(),
            CentralField::InternalAttrs => self.internal_attrs.into(),
            CentralField::ExternalAttrs => self.external_attrs.into(),
            CentralField::LocalHeaderOffset => self.local_header_offset.into(),
        }
    }

    fn set(&mut self, field: CentralField, value: u64) {
        match field {
            CentralField::Signature => self.signature = value as u32,
            CentralField::VersionMadeBy => self.version_made_by = value as u16,
            CentralField::VersionNeeded => self.version_needed = value as u16,
            CentralField::Flags => self.flags = value as u16,
            CentralField::CompressionMethod => self.compression_method = value as u16,
            CentralField::LastModTime => self.last_mod_time = value as u16,
            CentralField::LastModDate => self.last_mod_date = value as u16,
            CentralField::Crc32 => self.crc32 = value as u32,
            CentralField::CompressedSize => self.compressed_size = value as u32,
            CentralField::UncompressedSize => self.uncompressed_size = value as u32,
            CentralField::NameLen => self.name_len = value as u16,
            CentralField::ExtraLen => self.extra_len = value as u16,
            CentralField::CommentLen => self.comment_len = value as u16,
            CentralField::DiskNumber => self.disk_number = value as u16,
            CentralField::InternalAttrs => self.internal_attrs = value as u16,
            CentralField::ExternalAttrs => self.external_attrs = value as u32,
            CentralField::LocalHeaderOffset => self.local_header_offset = value as u32,
        }
    }

    fn view(&self, field: CentralBytes) -> View<'a> {
        match field {
            CentralBytes::Name => self.name,
            CentralBytes::Extra => self.extra,
            CentralBytes::Comment => self.comment,
        }
    }

    fn bind(&mut self, field: CentralBytes, value: View<'a>) {
        match field {
            CentralBytes::Name => self.name = value,
            CentralBytes::Extra => self.extra = value,
            CentralBytes::Comment => self.comment = value,
        }
    }
}

impl<'a> Record<'a> for CentralDirectoryFileHeader<'a> {
    const FORMAT: Format<CentralField, CentralBytes> = Format::new(CENTRAL_LAYOUT);
}

impl<'a> CentralDirectoryFileHeader<'a> {
    pub const SIGNATURE: u32 = 0x02014b50;

    pub const fn min_bytes() -> usize {
        <Self as Record<'a>>::FORMAT.min_bytes()
    }

    pub const fn max_bytes() -> usize {
        <Self as Record<'a>>::FORMAT.max_bytes()
    }

    /// Decode one header, returning it with the bytes that follow it.
    pub fn read(view: View<'a>) -> Result<(Self, View<'a>)> {
        Self::decode(view)
    }

    pub fn write<'b>(&self, buf: &'b mut [u8]) -> Result<&'b mut [u8]> {
        self.encode(buf)
    }

    /// File name, with invalid UTF-8 replaced.
    pub fn file_name(&self) -> Cow<'a, str> {
        String::from_utf8_lossy(self.name.as_bytes())
    }

    /// Directory entries end with '/'
    pub fn is_directory(&self) -> bool {
        self.name.ends_with(b"/")
    }

    pub fn compression(&self) -> CompressionMethod {
        CompressionMethod::from_u16(self.compression_method)
    }

    pub fn is_encrypted(&self) -> bool {
        self.flags & FLAG_ENCRYPTED != 0
    }
}

/// Local File Header (LFH) - 30 bytes plus name and extra field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LocalFileHeader<'a> {
    pub signature: u32,
    pub version_needed: u16,
    pub flags: u16,
    pub compression_method: u16,
    pub last_mod_time: u16,
    pub last_mod_date: u16,
    pub crc32: u32,
    pub compressed_size: u32,
    pub uncompressed_size: u32,
    pub name_len: u16,
    pub extra_len: u16,
    pub name: View<'a>,
    pub extra: View<'a>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalField {
    Signature,
    VersionNeeded,
    Flags,
    CompressionMethod,
    LastModTime,
    LastModDate,
    Crc32,
    CompressedSize,
    UncompressedSize,
    NameLen,
    ExtraLen,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalBytes {
    Name,
    Extra,
}

const LOCAL_LAYOUT: &[Segment<LocalField, LocalBytes>] = &[
    Segment::int(LocalField::Signature, 4),
    Segment::int(LocalField::VersionNeeded, 2),
    Segment::int(LocalField::Flags, 2),
    Segment::int(LocalField::CompressionMethod, 2),
    Segment::int(LocalField::LastModTime, 2),
    Segment::int(LocalField::LastModDate, 2),
    Segment::int(LocalField::Crc32, 4),
    Segment::int(LocalField::CompressedSize, 4),
    Segment::int(LocalField::UncompressedSize, 4),
    Segment::int(LocalField::NameLen, 2),
    Segment::int(LocalField::ExtraLen, 2),
    Segment::dynamic_u16(LocalBytes::Name, LocalField::NameLen),
    Segment::dynamic_u16(LocalBytes::Extra, LocalField::ExtraLen),
];

impl<'a> Fields<'a> for LocalFileHeader<'a> {
    type Int = LocalField;
    type Bytes = LocalBytes;

    fn get(&self, field: LocalField) -> u64 {
        match field {
            LocalField::Signature => self.signature.into(),
            LocalField::VersionNeeded => self.version_needed.into(),
            LocalField::Flags => self.flags.into(),
            LocalField::CompressionMethod => self.compression_method.into(),
            LocalField::LastModTime => self.last_mod_time.into(),
            LocalField::LastModDate => self.last_mod_date.into(),
            LocalField::Crc32 => self.crc32.into(),
            LocalField::CompressedSize => self.compressed_size.into(),
            LocalField::UncompressedSize => self.uncompressed_size.into(),
            LocalField::NameLen => self.name_len.into(),
            LocalField::ExtraLen => self.extra_len.into(),
        }
    }

    fn set(&mut self, field: LocalField, value: u64) {
        match field {
            LocalField::Signature => self.signature = value as u32,
            LocalField::VersionNeeded => self.version_needed = value as u16,
            LocalField::Flags => self.flags = value as u16,
            LocalField::CompressionMethod => self.compression_method = value as u16,
            LocalField::LastModTime => self.last_mod_time = value as u16,
            LocalField::LastModDate => self.last_mod_date = value as u16,
            LocalField::Crc32 => self.crc32 = value as u32,
            LocalField::CompressedSize => self.compressed_size = value as u32,
            LocalField::UncompressedSize => self.uncompressed_size = value as u32,
            LocalField::NameLen => self.name_len = value as u16,
            LocalField::ExtraLen => self.extra_len = value as u16,
        }
    }

    fn view(&self, field: LocalBytes) -> View<'a> {
        match field {
            LocalBytes::Name => self.name,
            LocalBytes::Extra => self.extra,
        }
    }

    fn bind(&mut self, field: LocalBytes, value: View<'a>) {
        match field {
            LocalBytes::Name => self.name = value,
            LocalBytes::Extra => self.extra = value,
        }
    }
}

impl<'a> Record<'a> for LocalFileHeader<'a> {
    const FORMAT: Format<LocalField, LocalBytes> = Format::new(LOCAL_LAYOUT);
}

impl<'a> LocalFileHeader<'a> {
    pub const SIGNATURE: u32 = 0x04034b50;

    pub const fn min_bytes() -> usize {
        <Self as Record<'a>>::FORMAT.min_bytes()
    }

    pub const fn max_bytes() -> usize {
        <Self as Record<'a>>::FORMAT.max_bytes()
    }

    /// Decode one header, returning it with the bytes that follow it
    /// (the start of the entry's payload).
    pub fn read(view: View<'a>) -> Result<(Self, View<'a>)> {
        Self::decode(view)
    }

    pub fn write<'b>(&self, buf: &'b mut [u8]) -> Result<&'b mut [u8]> {
        self.encode(buf)
    }

    pub fn has_data_descriptor(&self) -> bool {
        self.flags & FLAG_DATA_DESCRIPTOR != 0
    }

    pub fn is_encrypted(&self) -> bool {
        self.flags & FLAG_ENCRYPTED != 0
    }
}
