//! Upstream chunk stream -> outbound HTTP body.
//!
//! A single pump task pulls completion chunks and pushes their text onto a
//! bounded channel whose receiver is the response body. The pump owns the
//! only sender, so the body ends exactly once, when the pump returns.

use axum::body::Body;
use bytes::Bytes;
use futures_util::{stream, StreamExt};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, error, info};

use crate::error::RelayError;
use crate::llm::ChunkStream;

/// Small on purpose: the pump stays at most this many fragments ahead of the client.
const RELAY_BUFFER: usize = 8;

/// Waits for the first upstream item so that a rejected call can still be
/// answered with a clean error before any headers are sent.
pub async fn open(mut chunks: ChunkStream) -> Result<ChunkStream, RelayError> {
    match chunks.next().await {
        Some(Ok(first)) => Ok(stream::once(async move { Ok(first) })
            .chain(chunks)
            .boxed()),
        Some(Err(e)) => Err(e),
        None => Ok(stream::empty().boxed()),
    }
}

pub fn relay_body(chunks: ChunkStream) -> Body {
    Body::from_stream(spawn_relay(chunks))
}

pub fn spawn_relay(chunks: ChunkStream) -> ReceiverStream<Result<Bytes, RelayError>> {
    let (tx, rx) = mpsc::channel(RELAY_BUFFER);
    tokio::spawn(pump(chunks, tx));
    ReceiverStream::new(rx)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Finished,
    Failed,
    ClientGone,
}

async fn pump(mut chunks: ChunkStream, tx: mpsc::Sender<Result<Bytes, RelayError>>) {
    let mut forwarded = 0usize;
    let mut bytes = 0usize;

    let outcome = loop {
        let item = tokio::select! {
            biased;
            _ = tx.closed() => break Outcome::ClientGone,
            item = chunks.next() => item,
        };
        match item {
            Some(Ok(chunk)) => {
                let Some(text) = chunk.content() else {
                    continue;
                };
                let fragment = Bytes::copy_from_slice(text.as_bytes());
                let len = fragment.len();
                if tx.send(Ok(fragment)).await.is_err() {
                    break Outcome::ClientGone;
                }
                forwarded += 1;
                bytes += len;
            }
            Some(Err(e)) => {
                error!("Upstream stream failed after {} chunks: {}", forwarded, e);
                // Ignored: a closed receiver means nobody is left to tell.
                let _ = tx.send(Err(e)).await;
                break Outcome::Failed;
            }
            None => break Outcome::Finished,
        }
    };

    match outcome {
        Outcome::ClientGone => debug!(
            "Client disconnected after {} chunks; abandoning upstream stream",
            forwarded
        ),
        _ => info!(
            chunks = forwarded,
            bytes,
            outcome = ?outcome,
            "Relay closed"
        ),
    }
}
