//! Process-wide registry of per-stream publishers

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use uuid::Uuid;

use crate::client::SseClient;
use crate::publisher::{EventFeed, SsePublisher};
use crate::subscriber::SseSubscriber;

/// Configuration for stream publishing
#[derive(Debug, Clone)]
pub struct SseStreamConfig {
    /// Interval between feed timer fires
    pub feed_interval: Duration,
    /// Delay before the first timer fire after publisher creation
    pub initial_timer_delay: Duration,
    /// Buffer size for each subscriber's outbound channel
    pub channel_buffer_size: usize,
}

impl Default for SseStreamConfig {
    fn default() -> Self {
        Self {
            feed_interval: Duration::from_millis(1000),
            initial_timer_delay: Duration::from_millis(10),
            channel_buffer_size: 1000,
        }
    }
}

/// A subscribe request as handed over by the transport/dispatch layer.
/// Header values pass through verbatim.
#[derive(Debug, Clone)]
pub struct SubscribeRequest {
    /// Name of the event stream to join
    pub stream_name: String,
    /// The connection's identity, used as the subscriber id
    pub connection_id: String,
    /// Correlation id header, generated when absent
    pub correlation_id: Option<String>,
    /// `Last-Event-ID` header, if the client reconnected
    pub last_event_id: Option<String>,
}

/// Creates feeds for newly created publishers, one per stream name
pub type FeedFactory = dyn Fn(&str) -> Box<dyn EventFeed> + Send + Sync;

/// Owns every per-stream publisher for the process lifetime.
///
/// Created at stream-server startup and passed by reference to whatever
/// component creates stream subscriptions; entries are added lazily on first
/// subscribe and removed only by an explicit stop. The registry map has its
/// own lock, independent of any publisher's internal serialization.
pub struct SseStreamRegistry {
    publishers: RwLock<HashMap<String, SsePublisher>>,
    feed_factory: Box<FeedFactory>,
    config: SseStreamConfig,
}

impl SseStreamRegistry {
    /// Create a registry with default configuration
    pub fn new(feed_factory: impl Fn(&str) -> Box<dyn EventFeed> + Send + Sync + 'static) -> Self {
        Self::with_config(feed_factory, SseStreamConfig::default())
    }

    /// Create a registry with custom configuration
    pub fn with_config(
        feed_factory: impl Fn(&str) -> Box<dyn EventFeed> + Send + Sync + 'static,
        config: SseStreamConfig,
    ) -> Self {
        Self {
            publishers: RwLock::new(HashMap::new()),
            feed_factory: Box::new(feed_factory),
            config,
        }
    }

    /// The stream configuration in effect
    pub fn config(&self) -> &SseStreamConfig {
        &self.config
    }

    /// Register a subscriber for a stream, creating the stream's publisher on
    /// first use.
    ///
    /// `close_signal` is the transport's connection-close hook: when it fires,
    /// the unsubscribe for exactly this subscriber id is submitted, so
    /// disconnects self-clean without any publisher polling. Subscribing with
    /// a connection id already registered overwrites the prior registration.
    pub async fn subscribe(
        &self,
        request: SubscribeRequest,
        client: SseClient,
        close_signal: CancellationToken,
    ) -> SseSubscriber {
        let correlation_id = request
            .correlation_id
            .unwrap_or_else(|| Uuid::now_v7().to_string());

        let subscriber = SseSubscriber::new(
            request.stream_name.clone(),
            request.connection_id,
            correlation_id,
            request.last_event_id,
            client,
        );

        let publisher = self.publisher_for(&request.stream_name).await;
        publisher.subscribe(subscriber.clone()).await;

        // Connection-close cleanup, scoped to this subscriber's id. The
        // transport fires the token exactly once when the connection
        // terminates; the watcher then submits the unsubscribe to the
        // stream's publisher. The publisher closes the client whenever the
        // subscription ends (explicit unsubscribe or stream stop), which
        // releases the watcher if the token never fires.
        let subscriber_id = subscriber.id().to_string();
        let watched_client = subscriber.client().clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = close_signal.cancelled() => {
                    debug!(
                        stream = %publisher.stream_name(),
                        subscriber = %subscriber_id,
                        "Connection closed, unsubscribing"
                    );
                    publisher.unsubscribe(subscriber_id).await;
                }
                _ = watched_client.closed() => {}
            }
        });

        subscriber
    }

    /// Close and deregister one subscriber. Safe for unknown streams or ids.
    pub async fn unsubscribe(&self, stream_name: &str, subscriber_id: &str) {
        let publisher = {
            let publishers = self.publishers.read().await;
            publishers.get(stream_name).cloned()
        };
        if let Some(publisher) = publisher {
            publisher.unsubscribe(subscriber_id).await;
        }
    }

    /// Look up the stream's publisher, creating it on first use.
    ///
    /// Creation is not atomic against a concurrent create for the same
    /// stream: the publisher is spawned outside the write lock, and if the
    /// insert then finds an entry already present, the freshly created loser
    /// is stopped and the winner kept. At most one publisher per stream is
    /// ever active.
    async fn publisher_for(&self, stream_name: &str) -> SsePublisher {
        {
            let publishers = self.publishers.read().await;
            if let Some(publisher) = publishers.get(stream_name) {
                return publisher.clone();
            }
        }

        let fresh = SsePublisher::spawn(
            stream_name,
            (self.feed_factory)(stream_name),
            &self.config,
        );

        let winner = {
            let mut publishers = self.publishers.write().await;
            match publishers.entry(stream_name.to_string()) {
                Entry::Occupied(existing) => {
                    debug!(stream = %stream_name, "Lost publisher creation race");
                    Some(existing.get().clone())
                }
                Entry::Vacant(slot) => {
                    info!(stream = %stream_name, "Created publisher");
                    slot.insert(fresh.clone());
                    None
                }
            }
        };

        match winner {
            Some(existing) => {
                // The loser never saw a subscriber; stopping it cancels its
                // timer and halts its task.
                fresh.stop().await;
                existing
            }
            None => fresh,
        }
    }

    /// Stop and remove the publisher for one stream. Returns whether a
    /// publisher existed.
    pub async fn stop(&self, stream_name: &str) -> bool {
        let publisher = {
            let mut publishers = self.publishers.write().await;
            publishers.remove(stream_name)
        };
        match publisher {
            Some(publisher) => {
                publisher.stop().await;
                info!(stream = %stream_name, "Stopped publisher");
                true
            }
            None => false,
        }
    }

    /// Stop every publisher (server teardown)
    pub async fn shutdown(&self) {
        let drained: Vec<SsePublisher> = {
            let mut publishers = self.publishers.write().await;
            publishers.drain().map(|(_, publisher)| publisher).collect()
        };
        for publisher in &drained {
            publisher.stop().await;
        }
        if !drained.is_empty() {
            info!(count = drained.len(), "Stopped all publishers");
        }
    }

    /// Number of active publishers
    pub async fn publisher_count(&self) -> usize {
        self.publishers.read().await.len()
    }

    /// Number of subscribers on one stream (0 when the stream has no
    /// publisher)
    pub async fn subscriber_count(&self, stream_name: &str) -> usize {
        let publisher = {
            let publishers = self.publishers.read().await;
            publishers.get(stream_name).cloned()
        };
        match publisher {
            Some(publisher) => publisher.subscriber_count().await,
            None => 0,
        }
    }
}
