use anyhow::{Context, Result, anyhow, bail};
use async_trait::async_trait;
use log::{debug, trace, warn};
use reqwest::header::{ACCEPT_RANGES, CONTENT_LENGTH, RANGE};
use reqwest::{Client, StatusCode};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use super::ReadAt;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const MAX_RETRY: u32 = 10;
const RETRY_BACKOFF: Duration = Duration::from_millis(500);

/// Reads a remote archive with HTTP Range requests.
///
/// The server must advertise `Accept-Ranges: bytes` and report a
/// `Content-Length`; both are checked once with a HEAD request.
pub struct HttpRangeReader {
    client: Client,
    url: String,
    size: u64,
    transferred_bytes: AtomicU64,
}

impl HttpRangeReader {
    pub async fn new(url: String) -> Result<Self> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        let resp = client
            .head(&url)
            .send()
            .await
            .with_context(|| format!("HEAD {url}"))?;
        if !resp.status().is_success() {
            bail!("HEAD {url} failed with status: {}", resp.status());
        }

        let headers = resp.headers();
        let ranges = headers
            .get(ACCEPT_RANGES)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("none");
        if !ranges.contains("bytes") {
            bail!("{url} does not support Range requests");
        }

        let size = headers
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| anyhow!("{url} did not return Content-Length"))?;

        debug!("{url}: {size} bytes, range requests supported");

        Ok(Self {
            client,
            url,
            size,
            transferred_bytes: AtomicU64::new(0),
        })
    }

    /// Bytes received from the network so far.
    pub fn transferred_bytes(&self) -> u64 {
        self.transferred_bytes.load(Ordering::Relaxed)
    }

    /// One GET for the inclusive range `start..=end`, copied into the front
    /// of `buf`. Retried on timeouts and connection failures.
    async fn fetch_into(&self, start: u64, end: u64, buf: &mut [u8]) -> Result<usize> {
        let mut attempt = 0;
        loop {
            let result = self
                .client
                .get(&self.url)
                .header(RANGE, format!("bytes={start}-{end}"))
                .send()
                .await;

            match result {
                Ok(resp) if resp.status() == StatusCode::PARTIAL_CONTENT => {
                    let bytes = resp.bytes().await?;
                    let n = bytes.len().min(buf.len());
                    buf[..n].copy_from_slice(&bytes[..n]);
                    return Ok(n);
                }
                Ok(resp) => bail!("Range request failed with status: {}", resp.status()),
                Err(e) if e.is_timeout() || e.is_connect() => {
                    attempt += 1;
                    if attempt >= MAX_RETRY {
                        return Err(e).context("Max retries exceeded");
                    }
                    warn!("Connection error, retry {attempt}/{MAX_RETRY}: {e}");
                    tokio::time::sleep(RETRY_BACKOFF * attempt).await;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}

/// Inclusive last byte of a read of `len` bytes at `offset`, or `None` when
/// nothing is left to read.
fn last_byte(offset: u64, len: usize, size: u64) -> Option<u64> {
    if len == 0 || offset >= size {
        return None;
    }
    Some((offset + len as u64 - 1).min(size - 1))
}

#[async_trait]
impl ReadAt for HttpRangeReader {
    async fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<usize> {
        let Some(end) = last_byte(offset, buf.len(), self.size) else {
            return Ok(0);
        };
        let expected = (end - offset + 1) as usize;

        let mut received = 0;
        while received < expected {
            let start = offset + received as u64;
            let n = self
                .fetch_into(start, end, &mut buf[received..expected])
                .await?;
            if n == 0 {
                bail!("Server returned an empty range at offset {start}");
            }

            received += n;
            self.transferred_bytes.fetch_add(n as u64, Ordering::Relaxed);
            trace!("{}: received {n} bytes at {start}", self.url);
        }

        Ok(received)
    }

    fn size(&self) -> u64 {
        self.size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_is_clamped_to_the_resource() {
        assert_eq!(last_byte(0, 10, 100), Some(9));
        assert_eq!(last_byte(95, 10, 100), Some(99));
        assert_eq!(last_byte(100, 10, 100), None);
        assert_eq!(last_byte(5, 0, 100), None);
    }
}
