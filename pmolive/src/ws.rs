//! [`PushTransport`] over an axum WebSocket
//!
//! The socket is split: the write half is shared behind a mutex for
//! deliveries, the read half is drained by a background task that cancels
//! the session token when the client closes or the connection drops.

use crate::error::TransportError;
use crate::transport::PushTransport;
use async_trait::async_trait;
use axum::extract::ws::{Message, WebSocket};
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

pub struct WebSocketTransport {
    sink: Mutex<SplitSink<WebSocket, Message>>,
}

impl WebSocketTransport {
    /// Splits an upgraded socket into a transport and its reader task
    ///
    /// The reader cancels `disconnect` when the peer goes away. Abort the
    /// returned handle once the session is over.
    pub fn split(socket: WebSocket, disconnect: CancellationToken) -> (Arc<Self>, JoinHandle<()>) {
        let (sink, mut stream) = socket.split();

        let reader = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = disconnect.cancelled() => break,
                    msg = stream.next() => match msg {
                        Some(Ok(Message::Close(frame))) => {
                            debug!(?frame, "WebSocket closed by client");
                            break;
                        }
                        Some(Ok(other)) => trace!(?other, "Ignoring client message"),
                        Some(Err(e)) => {
                            debug!("WebSocket read error: {}", e);
                            break;
                        }
                        None => break,
                    },
                }
            }
            disconnect.cancel();
        });

        (
            Arc::new(Self {
                sink: Mutex::new(sink),
            }),
            reader,
        )
    }

    /// Sends a close frame, ignoring errors
    pub async fn close(&self) {
        let _ = self.sink.lock().await.close().await;
    }
}

#[async_trait]
impl PushTransport for WebSocketTransport {
    async fn send_text(&self, payload: &str) -> Result<(), TransportError> {
        self.sink
            .lock()
            .await
            .send(Message::Text(payload.into()))
            .await
            .map_err(|e| TransportError::Write(e.to_string()))
    }
}
