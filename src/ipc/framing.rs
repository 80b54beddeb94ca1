//! Reading and writing messages on the editor socket.
//!
//! Two wire formats are supported:
//!
//! - **Unframed** (what the editor plugin speaks): the request is written as
//!   one message and the reply is exactly one bounded [`read_chunk`]. There is
//!   no length prefix or delimiter, so a reply that does not arrive in one
//!   read is truncated.
//! - **Content-Length** (opt-in): HTTP-style header framing, the same as LSP.
//!
//! ```text
//! Content-Length: <length>\r\n
//! \r\n
//! <message-body>
//! ```
//!
//! The header parsing is case-insensitive and handles both CRLF and LF line endings.

use anyhow::{anyhow, bail, Context, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Maximum framed message size (100MB) to prevent OOM from a buggy peer.
pub const MAX_MESSAGE_SIZE: usize = 100 * 1024 * 1024;

/// Perform a single read of at most `max_len` bytes.
///
/// No attempt is made to gather a complete message; whatever the first read
/// yields is returned. A read of zero bytes means the peer closed the
/// connection and is reported as an error.
pub async fn read_chunk<R>(reader: &mut R, max_len: usize) -> Result<Vec<u8>>
where
    R: AsyncRead + Unpin,
{
    let mut buf = vec![0u8; max_len.max(1)];
    let n = reader
        .read(&mut buf)
        .await
        .context("Failed to read reply")?;

    if n == 0 {
        bail!("Connection closed by Unreal Engine");
    }

    buf.truncate(n);
    Ok(buf)
}

/// Write an unframed message and flush it.
pub async fn write_raw<W>(writer: &mut W, body: &[u8]) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    writer
        .write_all(body)
        .await
        .context("Failed to write request")?;
    writer.flush().await.context("Failed to flush request")?;
    Ok(())
}

/// Read a Content-Length framed message from the stream.
///
/// # Protocol
///
/// 1. Read headers until an empty line (handles both CRLF and LF)
/// 2. Extract Content-Length header (case-insensitive)
/// 3. Read exactly that many bytes for the body
///
/// The body is returned as raw bytes; UTF-8 handling is left to the decoder.
///
/// # Errors
///
/// Returns an error if:
/// - The stream is closed (EOF)
/// - No Content-Length header is found
/// - Content-Length exceeds MAX_MESSAGE_SIZE (100MB)
/// - The body cannot be read completely
pub async fn read_message<R>(reader: &mut R) -> Result<Vec<u8>>
where
    R: AsyncBufRead + Unpin,
{
    let mut content_length: Option<usize> = None;

    loop {
        let mut line = String::new();
        let bytes_read = reader
            .read_line(&mut line)
            .await
            .context("Failed to read header line")?;

        if bytes_read == 0 {
            return Err(anyhow!("Connection closed by Unreal Engine"));
        }

        let trimmed = line.trim();

        // Empty line signals end of headers
        if trimmed.is_empty() {
            break;
        }

        if let Some((key, value)) = trimmed.split_once(':') {
            if key.trim().eq_ignore_ascii_case("Content-Length") {
                let value = value.trim();
                content_length = Some(
                    value
                        .parse()
                        .with_context(|| format!("Invalid Content-Length value: {}", value))?,
                );
            }
            // Ignore other headers (e.g., Content-Type)
        }
    }

    let size = content_length.ok_or_else(|| anyhow!("Missing Content-Length header"))?;

    if size > MAX_MESSAGE_SIZE {
        return Err(anyhow!(
            "Message size {} exceeds maximum {} bytes",
            size,
            MAX_MESSAGE_SIZE
        ));
    }

    let mut body = vec![0u8; size];
    reader
        .read_exact(&mut body)
        .await
        .context("Failed to read message body")?;

    Ok(body)
}

/// Write a Content-Length framed message to the stream.
pub async fn write_message<W>(writer: &mut W, body: &[u8]) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let header = format!("Content-Length: {}\r\n\r\n", body.len());

    writer
        .write_all(header.as_bytes())
        .await
        .context("Failed to write message header")?;

    writer
        .write_all(body)
        .await
        .context("Failed to write message body")?;

    writer.flush().await.context("Failed to flush message")?;

    Ok(())
}
