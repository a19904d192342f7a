//! ZIP archive parsing and extraction.
//!
//! ## Architecture
//!
//! - [`structures`]: record layouts (EOCD, central directory and local file
//!   headers) described with the [`codec`](crate::codec)
//! - [`validate`]: cross-record consistency checks
//! - [`parser`]: EOCD location and the lazy central directory walk
//! - [`inflate`]: streaming decompression of entry payloads
//! - [`extractor`]: [`ZipArchive`], the high-level API
//!
//! ## ZIP Format Overview
//!
//! A ZIP file consists of:
//! 1. Local file headers and compressed data for each file
//! 2. Central Directory with metadata for all files
//! 3. End of Central Directory (EOCD) record at the end
//!
//! Records are decoded straight out of the archive buffer. Names, extra
//! fields and comments stay borrowed views into it.
//!
//! ## Limitations
//!
//! - No ZIP64 extensions
//! - Encrypted entries are listed but not extracted
//! - No multi-disk archive support
//! - Only STORED and DEFLATE compression methods

pub mod extractor;
pub mod inflate;
pub mod parser;
pub mod structures;
pub mod validate;

pub use extractor::ZipArchive;
pub use inflate::{decompress, inflate};
pub use parser::{Entries, Entry, find_eocd};
pub use structures::*;
