//! Per-subscriber outbound channel and its HTTP response adapter

use std::convert::Infallible;

use bytes::Bytes;
use futures::{StreamExt, stream};
use tokio_stream::Stream;
use http_body_util::{BodyExt, StreamBody, combinators::UnsyncBoxBody};
use hyper::header::{CACHE_CONTROL, CONTENT_TYPE};
use hyper::{Response, StatusCode};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::event::SseEvent;
use crate::{Result, SseServerError};

#[derive(Debug)]
enum ClientFrame {
    Data(Bytes),
    Close,
}

/// The outbound channel for one subscriber.
///
/// Clonable handle over the connection's send side; all clones share the
/// close token, so [`SseClient::close`] is idempotent across the lot. Sends
/// never block the caller: a full buffer is reported as [`SseServerError::ClientBusy`]
/// rather than waiting on a slow client.
#[derive(Debug, Clone)]
pub struct SseClient {
    sender: mpsc::Sender<ClientFrame>,
    closed: CancellationToken,
}

impl SseClient {
    /// Create a client and the stream feeding the HTTP response body
    pub fn channel(buffer: usize) -> (SseClient, SseClientStream) {
        let (sender, receiver) = mpsc::channel(buffer);
        (
            SseClient {
                sender,
                closed: CancellationToken::new(),
            },
            SseClientStream { receiver },
        )
    }

    /// Encode the event via [`SseEvent::format`] and write it to the channel
    pub fn send(&self, event: &SseEvent) -> Result<()> {
        if self.closed.is_cancelled() {
            return Err(SseServerError::ClientClosed);
        }
        self.sender
            .try_send(ClientFrame::Data(Bytes::from(event.format())))
            .map_err(|err| match err {
                mpsc::error::TrySendError::Full(_) => SseServerError::ClientBusy,
                mpsc::error::TrySendError::Closed(_) => SseServerError::ClientClosed,
            })
    }

    /// Release the channel. Closing an already-closed client is a no-op.
    pub fn close(&self) {
        if self.closed.is_cancelled() {
            return;
        }
        self.closed.cancel();
        debug!("Closing SSE client channel");
        // Best effort: if the buffer is full the receiver still terminates
        // once every sender clone is dropped.
        let _ = self.sender.try_send(ClientFrame::Close);
    }

    /// Whether `close()` has been called on any clone
    pub fn is_closed(&self) -> bool {
        self.closed.is_cancelled()
    }

    /// Resolves once `close()` has been called on any clone. Lets tasks tied
    /// to the subscription end together with it instead of parking forever.
    pub async fn closed(&self) {
        self.closed.cancelled().await;
    }
}

/// Receive side of an [`SseClient`], owned by the HTTP response
pub struct SseClientStream {
    receiver: mpsc::Receiver<ClientFrame>,
}

impl SseClientStream {
    /// Convert to a stream of encoded SSE blocks, ending on close
    pub fn into_stream(self) -> impl Stream<Item = Bytes> {
        stream::unfold(self.receiver, |mut receiver| async move {
            match receiver.recv().await {
                Some(ClientFrame::Data(bytes)) => Some((bytes, receiver)),
                Some(ClientFrame::Close) | None => None,
            }
        })
    }

    /// Convert to a `text/event-stream` HTTP response with the headers a
    /// persistent SSE connection needs
    pub fn into_response(self) -> Response<UnsyncBoxBody<Bytes, Infallible>> {
        let frames = self
            .into_stream()
            .map(|bytes| Ok(hyper::body::Frame::data(bytes)));
        let body = StreamBody::new(frames).boxed_unsync();

        Response::builder()
            .status(StatusCode::OK)
            .header(CONTENT_TYPE, "text/event-stream")
            .header(CACHE_CONTROL, "no-cache")
            .header("Connection", "keep-alive")
            .body(body)
            .unwrap()
    }
}
