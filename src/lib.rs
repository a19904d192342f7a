//! # zipview
//!
//! A zero-copy ZIP reader built on a declarative bit-field codec.
//!
//! Binary records are described once as an ordered list of segments (see
//! [`codec`]) and decoded straight out of a borrowed byte buffer. The ZIP
//! layer uses that codec to locate the End of Central Directory record,
//! walk the central directory, resolve each entry's local header and stream
//! its payload through the decompressor.
//!
//! ## Features
//!
//! - Bit-granular fields that share bytes (as in protocol headers) and
//!   length-prefixed byte fields (as in container formats)
//! - Cross-validation of every offset and size before it is trusted
//! - Support for STORED (uncompressed) and DEFLATE compression methods
//! - Local files via memory mapping, remote files via HTTP Range requests
//!
//! ## Example
//!
//! ```no_run
//! use zipview::ZipArchive;
//!
//! fn main() -> anyhow::Result<()> {
//!     let data = std::fs::read("archive.zip")?;
//!     let archive = ZipArchive::new(&data)?;
//!
//!     for entry in archive.entries() {
//!         let entry = entry?;
//!         let content = archive.extract_to_vec(&entry)?;
//!         println!("{}: {} bytes", entry.name(), content.len());
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod codec;
pub mod dns;
pub mod error;
pub mod io;
pub mod view;
pub mod zip;

pub use cli::Cli;
pub use error::{Error, Result, Stage, ValidationError};
pub use io::{ArchiveBuffer, HttpRangeReader, LocalFileReader, ReadAt};
pub use view::View;
pub use zip::{Entry, ZipArchive};
