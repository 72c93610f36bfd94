//! Byte-stream transport loop.
//!
//! Responsibilities:
//! - Drain the messenger's outbound queue into the writer (write + flush per frame)
//! - Feed inbound chunks to the frame decoder
//! - Dispatch each decoded message; log and drop malformed records
//! - On inbound EOF, keep writing until every in-flight handler has replied,
//!   then flush and return

use futures_util::stream::{FuturesUnordered, StreamExt};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, warn};

use ipcbus_core::error::{IpcBusError, Result};
use ipcbus_core::protocol::FrameDecoder;

use crate::dispatch::{Messenger, Outbound};

const READ_CHUNK_BYTES: usize = 8 * 1024;

/// Serve the messenger over process stdin/stdout.
pub async fn serve_stdio(
    messenger: Messenger,
    outbound: Outbound,
    max_frame_bytes: usize,
) -> Result<()> {
    serve(
        messenger,
        outbound,
        tokio::io::stdin(),
        tokio::io::stdout(),
        max_frame_bytes,
    )
    .await
}

/// Serve the messenger over any duplex byte stream.
pub async fn serve<R, W>(
    messenger: Messenger,
    mut outbound: Outbound,
    mut reader: R,
    mut writer: W,
    max_frame_bytes: usize,
) -> Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut decoder = FrameDecoder::new(max_frame_bytes);
    let mut chunk = vec![0u8; READ_CHUNK_BYTES];
    let mut inflight = FuturesUnordered::new();
    let mut reading = true;

    while reading || !inflight.is_empty() {
        tokio::select! {
            // outbound writer
            maybe_out = outbound.recv() => {
                let Some(frame) = maybe_out else { break; };
                write_frame(&mut writer, &frame).await?;
            }

            // handler tasks; their replies are queued before they finish
            Some(joined) = inflight.next(), if !inflight.is_empty() => {
                if let Err(e) = joined {
                    warn!(error = %e, "handler task aborted");
                }
            }

            // inbound reader
            read = reader.read(&mut chunk), if reading => {
                let n = read.map_err(|e| IpcBusError::Transport(format!("read failed: {e}")))?;
                if n == 0 {
                    info!(
                        pending = decoder.pending(),
                        inflight = inflight.len(),
                        "inbound stream closed"
                    );
                    reading = false;
                } else {
                    for decoded in decoder.push(&chunk[..n]) {
                        match decoded {
                            Ok(msg) => {
                                debug!(
                                    message_type = %msg.message_type,
                                    message_id = %msg.message_id,
                                    "inbound"
                                );
                                inflight.extend(messenger.dispatch(msg));
                            }
                            Err(e) => warn!(error = %e, "dropping malformed inbound record"),
                        }
                    }
                }
            }
        }
    }

    while let Ok(frame) = outbound.try_recv() {
        write_frame(&mut writer, &frame).await?;
    }
    writer
        .flush()
        .await
        .map_err(|e| IpcBusError::Transport(format!("flush failed: {e}")))
}

async fn write_frame<W: AsyncWrite + Unpin>(writer: &mut W, frame: &[u8]) -> Result<()> {
    writer
        .write_all(frame)
        .await
        .map_err(|e| IpcBusError::Transport(format!("write failed: {e}")))?;
    writer
        .flush()
        .await
        .map_err(|e| IpcBusError::Transport(format!("flush failed: {e}")))
}
