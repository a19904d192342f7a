mod common;

use common::{FIXTURE, FIXTURE_MEMBERS, Member, build_archive, central_dir_offset};
use zipview::zip::inflate::CHUNK_SIZE;
use zipview::zip::{CompressionMethod, EocdRecord, Entries, find_eocd};
use zipview::{Error, Stage, ValidationError, View, ZipArchive};

#[test]
fn stored_hello() {
    let data = build_archive(&[Member::stored("hello.txt", b"hello")], b"");

    let (eocd, offset) = find_eocd(View::new(&data)).unwrap();
    assert_eq!(offset, data.len() - EocdRecord::min_bytes());
    assert_eq!(eocd.total_entries, 1);

    let entries: Vec<_> = Entries::new(View::new(&data), eocd)
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].name(), "hello.txt");
    assert_eq!(entries[0].compression_method(), CompressionMethod::Stored);
    assert_eq!(entries[0].payload.as_bytes(), b"hello");

    let archive = ZipArchive::new(&data).unwrap();
    assert_eq!(archive.extract_to_vec(&entries[0]).unwrap(), b"hello");
}

#[test]
fn signature_inside_comment_is_skipped() {
    // A full EOCD-shaped record in the comment whose central directory lies
    // outside the archive.
    let mut comment = b"see ".to_vec();
    comment.extend(EocdRecord::SIGNATURE_BYTES);
    comment.extend([0u8; 8]);
    comment.extend(0u32.to_le_bytes());
    comment.extend(0xFFFF_FF00u32.to_le_bytes());
    comment.extend(0u16.to_le_bytes());
    comment.extend(b" PK\x05\x06");

    let data = build_archive(&[Member::stored("a.txt", b"abc")], &comment);
    let archive = ZipArchive::new(&data).unwrap();

    assert_eq!(
        archive.eocd_offset(),
        data.len() - EocdRecord::min_bytes() - comment.len()
    );
    assert_eq!(archive.comment().as_bytes(), &comment[..]);
    assert_eq!(archive.entries().count(), 1);
}

#[test]
fn missing_eocd() {
    let data = build_archive(&[Member::stored("a.txt", b"abc")], b"");
    let truncated = &data[..data.len() - 1];
    assert!(matches!(
        find_eocd(View::new(truncated)),
        Err(Error::SignatureNotFound)
    ));
    assert!(matches!(
        ZipArchive::new(b"PK\x05\x06"),
        Err(Error::SignatureNotFound)
    ));
    assert!(matches!(ZipArchive::new(&[]), Err(Error::SignatureNotFound)));
}

#[test]
fn empty_archive() {
    let data = build_archive(&[], b"");
    let archive = ZipArchive::new(&data).unwrap();
    assert!(archive.is_empty());
    assert!(archive.entries().next().is_none());
}

#[test]
fn local_header_offset_past_central_directory() {
    let mut data = build_archive(&[Member::stored("a.txt", b"abc")], b"");
    let cd_offset = central_dir_offset(&data);
    // localHeaderOffset sits 42 bytes into the central header.
    data[cd_offset + 42..cd_offset + 46].copy_from_slice(&(cd_offset as u32).to_le_bytes());

    let archive = ZipArchive::new(&data).unwrap();
    let mut entries = archive.entries();
    match entries.next() {
        Some(Err(Error::Entry {
            index: 0,
            stage: Stage::CentralHeader,
            source,
        })) => assert!(matches!(
            *source,
            Error::StructuralValidationFailed(ValidationError::LocalHeaderOutOfBounds { .. })
        )),
        other => panic!("unexpected {other:?}"),
    }
    assert!(entries.next().is_none());
}

#[test]
fn walk_stops_at_first_bad_entry() {
    let mut data = build_archive(
        &[
            Member::stored("a.txt", b"first"),
            Member::stored("b.txt", b"second"),
        ],
        b"",
    );
    // Corrupt the first local header signature.
    data[0] = b'X';

    let archive = ZipArchive::new(&data).unwrap();
    let results: Vec<_> = archive.entries().collect();
    assert_eq!(results.len(), 1);
    match &results[0] {
        Err(err @ Error::Entry { index: 0, stage: Stage::LocalHeader, .. }) => {
            assert!(matches!(err.root(), Error::SignatureMismatch { .. }));
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn local_name_must_match_central_name() {
    let mut data = build_archive(&[Member::stored("a.txt", b"abc")], b"");
    // First byte of the local file name.
    data[30] = b'z';

    let archive = ZipArchive::new(&data).unwrap();
    let err = archive.entries().next().unwrap().unwrap_err();
    assert!(matches!(
        err.root(),
        Error::StructuralValidationFailed(ValidationError::HeaderMismatch { field: "file name" })
    ));
}

#[test]
fn checksum_is_verified() {
    let mut data = build_archive(&[Member::stored("a.txt", b"abc")], b"");
    // Flip a payload byte; headers stay consistent.
    data[30 + 5] = b'X';

    let archive = ZipArchive::new(&data).unwrap();
    let entry = archive.entries().next().unwrap().unwrap();
    let err = archive.extract_to_vec(&entry).unwrap_err();
    assert!(matches!(
        err,
        Error::Entry {
            stage: Stage::Decompression,
            ..
        }
    ));
    assert!(matches!(err.root(), Error::ChecksumMismatch { .. }));
}

#[test]
fn deflated_members_round_trip() {
    let text = b"the quick brown fox jumps over the lazy dog. ".repeat(64);
    let data = build_archive(
        &[
            Member::deflated("fox.txt", &text),
            Member::stored("empty", b""),
            Member::deflated("dir/small", b"x"),
        ],
        b"archive comment",
    );

    let archive = ZipArchive::new(&data).unwrap();
    assert_eq!(archive.len(), 3);
    assert_eq!(archive.comment().as_bytes(), b"archive comment");

    let entries: Vec<_> = archive.entries().collect::<Result<_, _>>().unwrap();
    assert_eq!(entries[0].compression_method(), CompressionMethod::Deflate);
    assert!(entries[0].compressed_size() < entries[0].uncompressed_size());
    assert_eq!(archive.extract_to_vec(&entries[0]).unwrap(), text);
    assert_eq!(archive.extract_to_vec(&entries[1]).unwrap(), b"");
    assert_eq!(archive.extract_to_vec(&entries[2]).unwrap(), b"x");
}

#[test]
fn unsupported_method() {
    let mut member = Member::stored("a.bz2", b"abc");
    member.method = 12;
    let data = build_archive(&[member], b"");

    let archive = ZipArchive::new(&data).unwrap();
    let entry = archive.entries().next().unwrap().unwrap();
    assert_eq!(entry.compression_method(), CompressionMethod::Unknown(12));
    let err = archive.extract_to_vec(&entry).unwrap_err();
    assert!(matches!(err.root(), Error::UnsupportedCompressionMethod(12)));
}

#[test]
fn python_zipfile_fixture() {
    let archive = ZipArchive::new(FIXTURE).unwrap();
    assert_eq!(archive.len(), FIXTURE_MEMBERS.len());

    let entries: Vec<_> = archive.entries().collect::<Result<_, _>>().unwrap();
    assert_eq!(entries.len(), FIXTURE_MEMBERS.len());

    for (entry, (name, content)) in entries.iter().zip(FIXTURE_MEMBERS) {
        assert_eq!(entry.name(), name);
        assert_eq!(entry.compression_method(), CompressionMethod::Deflate);
        assert!(!entry.is_directory());
        assert_eq!(entry.uncompressed_size(), content.len() as u64);
        assert_eq!(entry.mod_date(), (2024, 5, 17));
        assert_eq!(archive.extract_to_vec(entry).unwrap(), content);
    }
}

#[test]
fn oversized_output_stops_early() {
    let zeros = vec![0u8; 8 << 20];
    let mut member = Member::deflated("zeros.bin", &zeros);
    member.uncompressed_size = 1;
    let data = build_archive(&[member], b"");
    assert!(data.len() < 64 * 1024);

    let archive = ZipArchive::new(&data).unwrap();
    let entry = archive.entries().next().unwrap().unwrap();

    let mut delivered = 0;
    let err = archive
        .extract_with(&entry, |chunk| delivered += chunk.len())
        .unwrap_err();
    match err.root() {
        Error::SizeMismatch { expected: 1, actual } => {
            assert!(*actual <= CHUNK_SIZE as u64);
        }
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(delivered, 0);
}

#[test]
fn declared_size_larger_than_output() {
    let mut member = Member::stored("a.txt", b"abc");
    member.uncompressed_size = u32::MAX;
    let data = build_archive(&[member], b"");

    let archive = ZipArchive::new(&data).unwrap();
    let entry = archive.entries().next().unwrap().unwrap();
    let err = archive.extract_to_vec(&entry).unwrap_err();
    assert!(matches!(
        err.root(),
        Error::SizeMismatch {
            expected: 0xFFFF_FFFF,
            actual: 3
        }
    ));
}

#[test]
fn encrypted_entries_are_listed_but_not_extracted() {
    let mut data = build_archive(&[Member::stored("secret.txt", b"abc")], b"");
    let cd_offset = central_dir_offset(&data);
    // Bit 0 of the general purpose flags, in both headers.
    data[6] |= 1;
    data[cd_offset + 8] |= 1;

    let archive = ZipArchive::new(&data).unwrap();
    let entry = archive.entries().next().unwrap().unwrap();
    assert_eq!(entry.name(), "secret.txt");
    assert!(entry.central.is_encrypted());

    let err = archive.extract_to_vec(&entry).unwrap_err();
    assert!(matches!(
        err,
        Error::Entry {
            index: 0,
            stage: Stage::Decompression,
            ..
        }
    ));
    assert!(matches!(err.root(), Error::UnsupportedEncryption));
}

#[test]
fn extra_fields_and_comments_are_skipped() {
    let mut first = Member::deflated("notes.txt", b"first entry");
    first.local_extra = b"UT\x05\x00\x01\x11\x22\x33\x44".to_vec();
    first.central_extra = b"UT\x01\x00\x01".to_vec();
    first.comment = b"entry comment".to_vec();

    let mut second = Member::stored("plain.txt", b"second");
    second.local_extra = vec![0xAA; 3];

    let data = build_archive(&[first, second, Member::directory("dir/")], b"");

    let archive = ZipArchive::new(&data).unwrap();
    let entries: Vec<_> = archive.entries().collect::<Result<_, _>>().unwrap();
    assert_eq!(entries.len(), 3);

    assert_eq!(entries[0].name(), "notes.txt");
    assert_eq!(
        entries[0].local.extra.as_bytes(),
        b"UT\x05\x00\x01\x11\x22\x33\x44"
    );
    assert_eq!(entries[0].central.extra.as_bytes(), b"UT\x01\x00\x01");
    assert_eq!(entries[0].central.comment.as_bytes(), b"entry comment");
    assert_eq!(archive.extract_to_vec(&entries[0]).unwrap(), b"first entry");

    assert_eq!(entries[1].name(), "plain.txt");
    assert!(entries[1].central.extra.is_empty());
    assert_eq!(entries[1].payload.as_bytes(), b"second");
    assert_eq!(archive.extract_to_vec(&entries[1]).unwrap(), b"second");

    assert_eq!(entries[2].name(), "dir/");
    assert!(entries[2].is_directory());
    assert!(!entries[0].is_directory());
    assert_eq!(entries[2].uncompressed_size(), 0);
    assert_eq!(archive.extract_to_vec(&entries[2]).unwrap(), b"");
}
