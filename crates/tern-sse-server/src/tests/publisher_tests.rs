//! Publisher lifecycle and delivery tests

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use serde_json::json;

use crate::client::{SseClient, SseClientStream};
use crate::event::SseEvent;
use crate::message::MessageEvent;
use crate::publisher::{EventFeed, SsePublisher};
use crate::registry::SseStreamConfig;
use crate::subscriber::SseSubscriber;

/// Feed that emits one numbered tick event to every subscriber per fire
pub struct CounterFeed {
    next_id: u64,
}

impl CounterFeed {
    pub fn new() -> Self {
        Self { next_id: 1 }
    }
}

#[async_trait]
impl EventFeed for CounterFeed {
    async fn produce(&mut self, subscribers: &[SseSubscriber]) {
        if subscribers.is_empty() {
            return;
        }
        let event = SseEvent::builder()
            .id(self.next_id)
            .event("tick")
            .data(json!({ "seq": self.next_id }).to_string())
            .build();
        self.next_id += 1;
        for subscriber in subscribers {
            subscriber.deliver(&event);
        }
    }
}

fn test_config() -> SseStreamConfig {
    SseStreamConfig {
        feed_interval: Duration::from_millis(100),
        initial_timer_delay: Duration::from_millis(10),
        channel_buffer_size: 32,
    }
}

fn spawn_publisher(stream_name: &str) -> SsePublisher {
    SsePublisher::spawn(stream_name, Box::new(CounterFeed::new()), &test_config())
}

fn subscriber(stream_name: &str, id: &str, client: SseClient) -> SseSubscriber {
    SseSubscriber::new(stream_name, id, format!("corr-{id}"), None, client)
}

async fn collect_blocks(stream: SseClientStream) -> String {
    let blocks: Vec<Bytes> = stream.into_stream().collect().await;
    blocks
        .iter()
        .map(|bytes| std::str::from_utf8(bytes).unwrap().to_string())
        .collect()
}

#[tokio::test(start_paused = true)]
async fn test_timer_delivers_to_every_subscriber() {
    let publisher = spawn_publisher("ticker");

    let (client_a, stream_a) = SseClient::channel(32);
    let (client_b, stream_b) = SseClient::channel(32);
    publisher.subscribe(subscriber("ticker", "conn-a", client_a)).await;
    publisher.subscribe(subscriber("ticker", "conn-b", client_b)).await;

    // First fire at 10ms, second at 110ms
    tokio::time::sleep(Duration::from_millis(120)).await;
    publisher.stop().await;

    for stream in [stream_a, stream_b] {
        let body = collect_blocks(stream).await;
        let messages = MessageEvent::parse_all(&body);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].id(), Some("1"));
        assert_eq!(messages[0].event(), Some("tick"));
        assert_eq!(messages[1].id(), Some("2"));
    }
}

#[tokio::test(start_paused = true)]
async fn test_no_delivery_before_initial_delay() {
    let publisher = spawn_publisher("ticker");

    let (client, stream) = SseClient::channel(32);
    publisher.subscribe(subscriber("ticker", "conn-1", client)).await;

    tokio::time::sleep(Duration::from_millis(5)).await;
    publisher.stop().await;

    assert_eq!(collect_blocks(stream).await, "");
}

#[tokio::test(start_paused = true)]
async fn test_duplicate_subscriber_id_overwrites() {
    let publisher = spawn_publisher("ticker");

    let (old_client, old_stream) = SseClient::channel(32);
    let (new_client, new_stream) = SseClient::channel(32);

    publisher
        .subscribe(subscriber("ticker", "conn-1", old_client.clone()))
        .await;
    publisher
        .subscribe(subscriber("ticker", "conn-1", new_client.clone()))
        .await;

    assert_eq!(publisher.subscriber_count().await, 1);
    // The overwritten entry is not closed by the overwrite itself
    assert!(!old_client.is_closed());

    tokio::time::sleep(Duration::from_millis(20)).await;
    publisher.stop().await;

    // Only the last registration received the tick
    old_client.close();
    assert_eq!(MessageEvent::parse_all(&collect_blocks(old_stream).await).len(), 0);
    assert_eq!(MessageEvent::parse_all(&collect_blocks(new_stream).await).len(), 1);
    assert!(new_client.is_closed());
}

#[tokio::test(start_paused = true)]
async fn test_subscribe_unsubscribe_accounting() {
    let publisher = spawn_publisher("ticker");

    let mut clients = Vec::new();
    for n in 0..5 {
        let (client, _stream) = SseClient::channel(4);
        clients.push(client.clone());
        publisher
            .subscribe(subscriber("ticker", &format!("conn-{n}"), client))
            .await;
    }
    assert_eq!(publisher.subscriber_count().await, 5);

    // Two known ids and one unknown: only the known ones count
    publisher.unsubscribe("conn-1").await;
    publisher.unsubscribe("conn-3").await;
    publisher.unsubscribe("conn-missing").await;

    assert_eq!(publisher.subscriber_count().await, 3);
    assert!(clients[1].is_closed());
    assert!(clients[3].is_closed());
    assert!(!clients[0].is_closed());

    publisher.stop().await;
}

#[tokio::test(start_paused = true)]
async fn test_stop_closes_all_and_is_terminal() {
    let publisher = spawn_publisher("ticker");

    let (client_a, stream_a) = SseClient::channel(32);
    let (client_b, _stream_b) = SseClient::channel(32);
    publisher.subscribe(subscriber("ticker", "conn-a", client_a.clone())).await;
    publisher.subscribe(subscriber("ticker", "conn-b", client_b.clone())).await;

    publisher.stop().await;

    assert!(publisher.is_stopped());
    assert!(client_a.is_closed());
    assert!(client_b.is_closed());

    // No timer-driven delivery after stop
    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(collect_blocks(stream_a).await, "");

    // Stopped publishers accept no further subscriptions
    let (late_client, _late_stream) = SseClient::channel(4);
    publisher.subscribe(subscriber("ticker", "conn-late", late_client)).await;
    assert_eq!(publisher.subscriber_count().await, 0);

    // Repeated stop is safe
    publisher.stop().await;
}

#[tokio::test(start_paused = true)]
async fn test_one_failed_subscriber_does_not_abort_the_tick() {
    let publisher = spawn_publisher("ticker");

    let (closed_client, _closed_stream) = SseClient::channel(32);
    closed_client.close();
    let (live_client, live_stream) = SseClient::channel(32);

    publisher
        .subscribe(subscriber("ticker", "conn-dead", closed_client))
        .await;
    publisher
        .subscribe(subscriber("ticker", "conn-live", live_client))
        .await;

    tokio::time::sleep(Duration::from_millis(20)).await;
    publisher.stop().await;

    let messages = MessageEvent::parse_all(&collect_blocks(live_stream).await);
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].id(), Some("1"));
}
