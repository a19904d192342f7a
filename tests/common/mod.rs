//! Builds small archives from the crate's own record encoders.

#![allow(dead_code)]

use std::io::Write;

use flate2::Compression;
use flate2::write::DeflateEncoder;
use zipview::View;
use zipview::codec::Record;
use zipview::zip::{CentralDirectoryFileHeader, EocdRecord, LocalFileHeader};

pub const FIXTURE: &[u8] = include_bytes!("../fixtures/test1-pyzip.zip");

pub const FIXTURE_MEMBERS: [(&str, &[u8]); 3] = [
    ("one.txt", b"this is test content1 - 1\n"),
    ("two.txt", b"this is another test content2 - 1\n"),
    (
        "sub/three.txt",
        b"this is yet a different test content3 - 1\n",
    ),
];

pub struct Member {
    pub name: String,
    pub method: u16,
    pub payload: Vec<u8>,
    pub crc32: u32,
    pub uncompressed_size: u32,
    pub local_extra: Vec<u8>,
    pub central_extra: Vec<u8>,
    pub comment: Vec<u8>,
}

impl Member {
    pub fn stored(name: &str, content: &[u8]) -> Self {
        Self {
            name: name.to_string(),
            method: 0,
            payload: content.to_vec(),
            crc32: crc32(content),
            uncompressed_size: content.len() as u32,
            local_extra: Vec::new(),
            central_extra: Vec::new(),
            comment: Vec::new(),
        }
    }

    pub fn directory(name: &str) -> Self {
        Self::stored(name, b"")
    }

    pub fn deflated(name: &str, content: &[u8]) -> Self {
        let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(content).unwrap();
        Self {
            name: name.to_string(),
            method: 8,
            payload: encoder.finish().unwrap(),
            crc32: crc32(content),
            uncompressed_size: content.len() as u32,
            local_extra: Vec::new(),
            central_extra: Vec::new(),
            comment: Vec::new(),
        }
    }
}

pub fn crc32(data: &[u8]) -> u32 {
    let mut crc = flate2::Crc::new();
    crc.update(data);
    crc.sum()
}

/// Local headers and payloads, then the central directory, then the EOCD.
pub fn build_archive(members: &[Member], comment: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    let mut central = Vec::new();

    for m in members {
        let name = View::new(m.name.as_bytes());
        let local = LocalFileHeader {
            signature: LocalFileHeader::SIGNATURE,
            version_needed: 20,
            compression_method: m.method,
            last_mod_time: 0x6000,
            last_mod_date: 0x58B1,
            crc32: m.crc32,
            compressed_size: m.payload.len() as u32,
            uncompressed_size: m.uncompressed_size,
            name_len: name.len() as u16,
            extra_len: m.local_extra.len() as u16,
            name,
            extra: View::new(&m.local_extra),
            ..LocalFileHeader::default()
        };
        let header = CentralDirectoryFileHeader {
            signature: CentralDirectoryFileHeader::SIGNATURE,
            version_made_by: 20,
            version_needed: 20,
            compression_method: m.method,
            last_mod_time: local.last_mod_time,
            last_mod_date: local.last_mod_date,
            crc32: m.crc32,
            compressed_size: m.payload.len() as u32,
            uncompressed_size: m.uncompressed_size,
            name_len: name.len() as u16,
            extra_len: m.central_extra.len() as u16,
            comment_len: m.comment.len() as u16,
            local_header_offset: out.len() as u32,
            name,
            extra: View::new(&m.central_extra),
            comment: View::new(&m.comment),
            ..CentralDirectoryFileHeader::default()
        };

        out.extend(local.to_bytes().unwrap());
        out.extend(&m.payload);
        central.push(header);
    }

    let cd_offset = out.len();
    for header in &central {
        out.extend(header.to_bytes().unwrap());
    }

    let eocd = EocdRecord {
        signature: EocdRecord::SIGNATURE,
        entries_this_disk: members.len() as u16,
        total_entries: members.len() as u16,
        central_dir_size: (out.len() - cd_offset) as u32,
        central_dir_offset: cd_offset as u32,
        comment_len: comment.len() as u16,
        comment: View::new(comment),
        ..EocdRecord::default()
    };
    out.extend(eocd.to_bytes().unwrap());
    out
}

/// Offset of the central directory recorded in a well-formed archive.
pub fn central_dir_offset(archive: &[u8]) -> usize {
    let (eocd, _) = zipview::zip::find_eocd(View::new(archive)).unwrap();
    eocd.central_dir_offset as usize
}
