//! Request framing by read settling.
//!
//! There is no delimiter or length prefix on the wire. Chunks of
//! `chunk_size` bytes are read and concatenated until a read comes back
//! short; the bytes gathered so far are one request.
//!
//! Known limitations: a request whose length is an exact multiple of
//! `chunk_size` waits for the next write (or EOF) before it is dispatched,
//! and two requests written back to back can arrive merged into one.

use tokio::io::{AsyncRead, AsyncReadExt};

/// Read one settled request. `Ok(None)` means the peer closed the
/// connection with nothing pending.
pub async fn read_request<R>(reader: &mut R, chunk_size: usize) -> std::io::Result<Option<Vec<u8>>>
where
    R: AsyncRead + Unpin,
{
    let mut request = Vec::new();
    let mut chunk = vec![0u8; chunk_size.max(1)];

    loop {
        let n = reader.read(&mut chunk).await?;
        if n == 0 {
            return Ok((!request.is_empty()).then_some(request));
        }
        request.extend_from_slice(&chunk[..n]);
        if n < chunk.len() {
            return Ok(Some(request));
        }
    }
}
