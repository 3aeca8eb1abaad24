/*
    wire.rs - Delta framing and encoding

    Frame layout on the stream: a 4-byte big-endian length prefix followed
    by that many bytes of JSON, one serialized log delta per frame:

        {"messages":[{"clock":N,"whomst":"<id>","txt":"<text>"}, ...]}

    A configured cap bounds how much a peer can make us buffer; a frame
    announcing more is rejected without reading the body. The sending side
    never produces such a frame: a delta too big for one frame is split at
    entry boundaries, and any contiguous run of a canonical log is itself
    canonical, so each piece passes the receiver's validation on its own.
    Decoded deltas are validated for canonical order before they are
    allowed anywhere near a merge.
*/

use super::errors::{SyncError, SyncResult};
use crate::core_log::{Entry, Log};
use serde::Serialize;
use std::io::ErrorKind;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Largest body the 4-byte length prefix can describe.
const PREFIX_LIMIT: usize = u32::MAX as usize;

/// Borrowing mirror of `Log`'s wire shape, so a slice of entries
/// serializes byte-identically to a whole log without cloning it.
#[derive(Serialize)]
struct FrameRef<'a> {
    messages: &'a [Entry],
}

/// Serialize `delta` and frame it onto the stream in bodies of at most
/// `cap` bytes.
///
/// A delta that serializes over the cap is split at entry boundaries into
/// as many frames as needed; an arbitrarily long backlog therefore still
/// fits under a fixed cap. Frames are encoded before anything is written,
/// so a delta holding a single entry too large to frame fails without
/// sending partial output.
pub async fn send_delta<W>(io: &mut W, delta: &Log, cap: usize) -> SyncResult<()>
where
    W: AsyncWrite + Unpin,
{
    let mut frames = Vec::new();
    encode_chunks(delta.entries(), cap, &mut frames)?;
    for body in frames {
        write_frame(io, &body).await?;
    }
    Ok(())
}

/// Split `entries` into frame bodies each no larger than `cap`, halving
/// the run until every piece fits. Fails only when one entry alone cannot
/// be framed under the cap.
fn encode_chunks(entries: &[Entry], cap: usize, frames: &mut Vec<Vec<u8>>) -> SyncResult<()> {
    let body = serde_json::to_vec(&FrameRef { messages: entries })?;
    if body.len() <= cap {
        frames.push(body);
        return Ok(());
    }
    if entries.len() <= 1 {
        return Err(SyncError::FrameTooLarge {
            got: body.len(),
            cap,
        });
    }
    let mid = entries.len() / 2;
    encode_chunks(&entries[..mid], cap, frames)?;
    encode_chunks(&entries[mid..], cap, frames)
}

async fn write_frame<W>(io: &mut W, body: &[u8]) -> SyncResult<()>
where
    W: AsyncWrite + Unpin,
{
    let len = u32::try_from(body.len()).map_err(|_| SyncError::FrameTooLarge {
        got: body.len(),
        cap: PREFIX_LIMIT,
    })?;
    io.write_all(&len.to_be_bytes()).await?;
    io.write_all(body).await?;
    io.flush().await?;
    Ok(())
}

/// Read and decode the next delta frame from the stream.
///
/// `cap` is the largest frame body accepted, in bytes. EOF on a frame
/// boundary is a clean close; EOF inside a frame is a transport error.
pub async fn recv_delta<R>(io: &mut R, cap: usize) -> SyncResult<Log>
where
    R: AsyncRead + Unpin,
{
    let mut len_buf = [0u8; 4];
    if let Err(e) = io.read_exact(&mut len_buf).await {
        return Err(match e.kind() {
            ErrorKind::UnexpectedEof => SyncError::Closed,
            _ => SyncError::Transport(e),
        });
    }

    let len = u32::from_be_bytes(len_buf) as usize;
    if len > cap {
        return Err(SyncError::FrameTooLarge { got: len, cap });
    }

    let mut body = vec![0u8; len];
    io.read_exact(&mut body).await?;

    let delta: Log = serde_json::from_slice(&body)?;
    if !delta.is_canonical() {
        return Err(SyncError::NonCanonical);
    }
    Ok(delta)
}
