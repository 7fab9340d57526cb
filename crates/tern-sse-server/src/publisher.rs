//! Per-stream publisher actor and the feed collaborator contract

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::registry::SseStreamConfig;
use crate::subscriber::SseSubscriber;

const COMMAND_BUFFER: usize = 64;

/// Produces the events pushed to subscribers.
///
/// Invoked once per timer tick with a snapshot of the current subscribers;
/// the feed produces zero or more events and delivers them to each
/// subscriber's client (typically via [`SseSubscriber::deliver`], which
/// isolates per-subscriber failures). Implementations must not retain
/// subscriber references beyond the call.
#[async_trait]
pub trait EventFeed: Send + 'static {
    async fn produce(&mut self, subscribers: &[SseSubscriber]);
}

#[derive(Debug)]
enum PublisherCommand {
    Subscribe(SseSubscriber),
    Unsubscribe(String),
    SubscriberCount(oneshot::Sender<usize>),
    Stop(oneshot::Sender<()>),
}

/// Handle to the per-stream publisher task.
///
/// One publisher exists per stream name. The task owns the subscriber map,
/// the repeating feed timer, and the feed itself; registration and timer
/// fires are serialized through its command loop, so at most one of
/// subscribe, unsubscribe, tick, or stop runs at a time and each runs to
/// completion before the next. Lifecycle: starting, then running until
/// [`SsePublisher::stop`], which is terminal.
#[derive(Debug, Clone)]
pub struct SsePublisher {
    stream_name: String,
    commands: mpsc::Sender<PublisherCommand>,
}

impl SsePublisher {
    /// Spawn the publisher task for a stream. The timer first fires after a
    /// short fixed initial delay, then every `config.feed_interval`.
    pub fn spawn(
        stream_name: impl Into<String>,
        feed: Box<dyn EventFeed>,
        config: &SseStreamConfig,
    ) -> Self {
        let stream_name = stream_name.into();
        let (commands, command_rx) = mpsc::channel(COMMAND_BUFFER);

        debug!(stream = %stream_name, "Publisher starting");
        tokio::spawn(run_publisher(
            stream_name.clone(),
            feed,
            command_rx,
            config.clone(),
        ));

        Self {
            stream_name,
            commands,
        }
    }

    /// The stream this publisher serves
    pub fn stream_name(&self) -> &str {
        &self.stream_name
    }

    /// Register a subscriber under its id. A re-subscribe with an id already
    /// present overwrites the prior registration (last writer wins; the old
    /// entry is not closed here). After `stop()` this is a no-op.
    pub async fn subscribe(&self, subscriber: SseSubscriber) {
        let _ = self
            .commands
            .send(PublisherCommand::Subscribe(subscriber))
            .await;
    }

    /// Close and remove the subscriber with the given id. Unknown ids are a
    /// no-op.
    pub async fn unsubscribe(&self, subscriber_id: impl Into<String>) {
        let _ = self
            .commands
            .send(PublisherCommand::Unsubscribe(subscriber_id.into()))
            .await;
    }

    /// Number of currently registered subscribers (0 once stopped)
    pub async fn subscriber_count(&self) -> usize {
        let (reply, response) = oneshot::channel();
        if self
            .commands
            .send(PublisherCommand::SubscriberCount(reply))
            .await
            .is_err()
        {
            return 0;
        }
        response.await.unwrap_or(0)
    }

    /// Stop the publisher: cancel the timer, close every remaining
    /// subscriber, and halt the task. Terminal; safe to call concurrently
    /// with an in-flight tick (it takes effect before the next fire) and
    /// after a previous stop.
    pub async fn stop(&self) {
        let (reply, stopped) = oneshot::channel();
        if self
            .commands
            .send(PublisherCommand::Stop(reply))
            .await
            .is_ok()
        {
            let _ = stopped.await;
        }
    }

    /// Whether the publisher task has halted
    pub fn is_stopped(&self) -> bool {
        self.commands.is_closed()
    }
}

async fn run_publisher(
    stream_name: String,
    mut feed: Box<dyn EventFeed>,
    mut commands: mpsc::Receiver<PublisherCommand>,
    config: SseStreamConfig,
) {
    let mut subscribers: HashMap<String, SseSubscriber> = HashMap::new();

    let mut timer = tokio::time::interval_at(
        Instant::now() + config.initial_timer_delay,
        config.feed_interval,
    );
    timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

    info!(stream = %stream_name, interval_ms = config.feed_interval.as_millis() as u64, "Publisher running");

    let mut stop_ack: Option<oneshot::Sender<()>> = None;

    loop {
        tokio::select! {
            command = commands.recv() => match command {
                Some(PublisherCommand::Subscribe(subscriber)) => {
                    debug!(
                        stream = %stream_name,
                        subscriber = %subscriber.id(),
                        correlation_id = %subscriber.correlation_id(),
                        "Registered subscriber"
                    );
                    // Last writer wins on a duplicate id
                    subscribers.insert(subscriber.id().to_string(), subscriber);
                }
                Some(PublisherCommand::Unsubscribe(subscriber_id)) => {
                    if let Some(subscriber) = subscribers.remove(&subscriber_id) {
                        subscriber.client().close();
                        debug!(stream = %stream_name, subscriber = %subscriber_id, "Unsubscribed");
                    }
                }
                Some(PublisherCommand::SubscriberCount(reply)) => {
                    let _ = reply.send(subscribers.len());
                }
                Some(PublisherCommand::Stop(reply)) => {
                    stop_ack = Some(reply);
                    break;
                }
                None => break,
            },
            _ = timer.tick() => {
                let snapshot: Vec<SseSubscriber> = subscribers.values().cloned().collect();
                feed.produce(&snapshot).await;
            }
        }
    }

    // Stopped: close every remaining subscriber before halting
    for (_, subscriber) in subscribers.drain() {
        subscriber.client().close();
    }
    info!(stream = %stream_name, "Publisher stopped");

    if let Some(ack) = stop_ack {
        let _ = ack.send(());
    }
}
