//! Stream front end
//!
//! Long-lived TCP connections push record batches through the frame codec.
//! Each connection runs on its own task; batches within one connection are
//! processed sequentially. Outcome lines go back over the same connection,
//! so a pushing client sees `written=N silent=N failed=N` per batch.
//!
//! Protocol failures (non-UTF-8 payload, malformed JSON, idle timeout)
//! terminate the connection after a best-effort error report; processing
//! failures are reported and the connection stays open.

use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpListener;
use tokio_util::codec::Framed;

use crate::config::StreamConfig;
use crate::core::pipeline::control::ServiceSignals;
use crate::core::pipeline::coordinator::RecordProcessor;
use crate::domain::errors::{CourierError, StreamError};
use crate::domain::record::ResultRecord;
use crate::domain::Result;
use crate::server::codec::FrameCodec;

/// Bind the configured address and serve connections until shutdown
///
/// # Errors
///
/// Returns an error when the listen address cannot be bound.
pub async fn serve(
    config: &StreamConfig,
    processor: Arc<dyn RecordProcessor>,
    signals: ServiceSignals,
) -> Result<()> {
    let listener = TcpListener::bind(&config.bind)
        .await
        .map_err(|e| CourierError::Io(format!("Failed to bind {}: {e}", config.bind)))?;
    tracing::info!(bind = %config.bind, "Stream front end listening");

    serve_with_listener(
        listener,
        Duration::from_secs(config.idle_timeout_seconds),
        processor,
        signals,
    )
    .await;
    Ok(())
}

/// Accept loop over an already-bound listener
pub async fn serve_with_listener(
    listener: TcpListener,
    idle_timeout: Duration,
    processor: Arc<dyn RecordProcessor>,
    mut signals: ServiceSignals,
) {
    loop {
        tokio::select! {
            accepted = listener.accept() => {
                match accepted {
                    Ok((socket, peer)) => {
                        tracing::info!(%peer, "Stream connection accepted");
                        let processor = Arc::clone(&processor);
                        tokio::spawn(async move {
                            match handle_connection(socket, idle_timeout, processor.as_ref()).await {
                                Ok(()) => tracing::info!(%peer, "Stream connection closed"),
                                Err(e) => {
                                    tracing::warn!(%peer, error = %e, "Stream connection terminated")
                                }
                            }
                        });
                    }
                    Err(e) => tracing::warn!(error = %e, "Failed to accept stream connection"),
                }
            }
            _ = signals.shutdown_requested() => {
                tracing::info!("Stream front end shutting down");
                break;
            }
        }
    }
}

/// Serve one connection until the client closes or a protocol error
///
/// Generic over the byte stream so in-memory pipes can stand in for
/// sockets.
pub async fn handle_connection<S>(
    socket: S,
    idle_timeout: Duration,
    processor: &dyn RecordProcessor,
) -> std::result::Result<(), StreamError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut framed = Framed::new(socket, FrameCodec);

    loop {
        let frame = match tokio::time::timeout(idle_timeout, framed.next()).await {
            Err(_) => {
                let _ = framed.send("error: connection idle timeout".to_string()).await;
                return Err(StreamError::IdleTimeout);
            }
            // Client closed the connection
            Ok(None) => return Ok(()),
            Ok(Some(Err(e))) => return Err(e),
            Ok(Some(Ok(frame))) => frame,
        };

        let payload = match std::str::from_utf8(&frame) {
            // Clients pad the final write with NULs up to their buffer size
            Ok(text) => text.trim_matches('\0').trim(),
            Err(e) => {
                let message = format!("payload is not UTF-8 text: {e}");
                let _ = framed.send(format!("error: {message}")).await;
                return Err(StreamError::InvalidPayload(message));
            }
        };

        if payload.is_empty() {
            continue;
        }

        let records: Vec<ResultRecord> = match serde_json::from_str(payload) {
            Ok(records) => records,
            Err(e) => {
                let message = format!("payload is not a JSON record array: {e}");
                let _ = framed.send(format!("error: {message}")).await;
                return Err(StreamError::InvalidPayload(message));
            }
        };

        tracing::info!(count = records.len(), "Stream batch received");
        match processor.process(records).await {
            Ok(summary) => framed.send(summary.summary_line()).await?,
            Err(e) => {
                tracing::error!(error = %e, "Stream batch processing failed");
                framed.send(format!("error: {e}")).await?;
            }
        }
    }
}
