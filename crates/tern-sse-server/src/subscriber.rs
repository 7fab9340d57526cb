//! Subscriber identity and per-subscriber delivery

use tracing::warn;

use crate::client::SseClient;
use crate::event::SseEvent;

/// One client's registration to a named event stream.
///
/// Snapshot-clonable: the publisher hands cloned subscribers to the feed each
/// tick, and clones share the underlying client channel.
#[derive(Debug, Clone)]
pub struct SseSubscriber {
    stream_name: String,
    id: String,
    correlation_id: String,
    last_event_id: Option<String>,
    client: SseClient,
}

impl SseSubscriber {
    pub fn new(
        stream_name: impl Into<String>,
        id: impl Into<String>,
        correlation_id: impl Into<String>,
        last_event_id: Option<String>,
        client: SseClient,
    ) -> Self {
        Self {
            stream_name: stream_name.into(),
            id: id.into(),
            correlation_id: correlation_id.into(),
            last_event_id,
            client,
        }
    }

    /// The stream this subscriber is registered to
    pub fn stream_name(&self) -> &str {
        &self.stream_name
    }

    /// Subscriber id, derived from the owning connection's identity
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn correlation_id(&self) -> &str {
        &self.correlation_id
    }

    /// The `Last-Event-ID` the client reconnected with, if any
    pub fn last_event_id(&self) -> Option<&str> {
        self.last_event_id.as_deref()
    }

    /// The owned outbound channel
    pub fn client(&self) -> &SseClient {
        &self.client
    }

    /// Deliver one event to this subscriber's client.
    ///
    /// A failed send is logged and swallowed: one slow or closed subscriber
    /// must not abort delivery to the others in the same tick.
    pub fn deliver(&self, event: &SseEvent) {
        if let Err(err) = self.client.send(event) {
            warn!(
                stream = %self.stream_name,
                subscriber = %self.id,
                correlation_id = %self.correlation_id,
                error = %err,
                "Dropping event for subscriber"
            );
        }
    }
}
