//! Streaming decompression of entry payloads.

use flate2::{Decompress, FlushDecompress, Status};
use log::{trace, warn};

use crate::error::{Error, Result};
use crate::view::View;

use super::structures::CompressionMethod;

/// Output is handed to the sink at most this many bytes at a time.
pub const CHUNK_SIZE: usize = 1024;

/// Decode `payload` according to `method`, passing decoded bytes to `sink`.
///
/// Returns the number of decoded bytes. The sink must copy anything it
/// wants to keep; the slice it receives is reused. An error from the sink
/// stops decoding and is returned as is.
pub fn decompress<F>(method: CompressionMethod, payload: View<'_>, sink: F) -> Result<u64>
where
    F: FnMut(&[u8]) -> Result<()>,
{
    match method {
        CompressionMethod::Stored => store(payload, sink),
        CompressionMethod::Deflate => inflate(payload, sink),
        CompressionMethod::Unknown(method) => Err(Error::UnsupportedCompressionMethod(method)),
    }
}

fn store<F>(payload: View<'_>, mut sink: F) -> Result<u64>
where
    F: FnMut(&[u8]) -> Result<()>,
{
    trace!("No compression, passing through {} bytes", payload.len());
    for chunk in payload.chunks(CHUNK_SIZE) {
        sink(chunk)?;
    }
    Ok(payload.len() as u64)
}

/// Inflate a raw deflate stream (no zlib header).
///
/// A stream that runs out of input before its final block is treated as
/// ending with the payload: everything decoded so far is delivered and the
/// call succeeds. Callers that need integrity verify size and CRC-32.
pub fn inflate<F>(payload: View<'_>, mut sink: F) -> Result<u64>
where
    F: FnMut(&[u8]) -> Result<()>,
{
    trace!("Inflating {} compressed bytes", payload.len());

    let mut decoder = Decompress::new(false);
    let mut out = [0u8; CHUNK_SIZE];

    loop {
        let consumed = decoder.total_in() as usize;
        let produced = decoder.total_out();
        let input = &payload[consumed..];

        let status = decoder
            .decompress(input, &mut out, FlushDecompress::None)
            .map_err(|e| Error::Decompression(e.to_string()))?;

        let written = (decoder.total_out() - produced) as usize;
        if written > 0 {
            sink(&out[..written])?;
        }

        let progressed = written > 0 || decoder.total_in() as usize > consumed;
        match status {
            Status::StreamEnd => return Ok(decoder.total_out()),
            Status::Ok | Status::BufError if progressed => continue,
            Status::Ok | Status::BufError => {
                if decoder.total_in() as usize == payload.len() {
                    warn!(
                        "Deflate stream ended without a final block after {} bytes",
                        decoder.total_out()
                    );
                    return Ok(decoder.total_out());
                }
                return Err(Error::Decompression(
                    "deflate stream stalled before end of input".to_string(),
                ));
            }
        }
    }
}
