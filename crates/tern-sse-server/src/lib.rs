//! # Server-Sent Events Streaming
//!
//! This crate provides the streaming half of the HTTP resource layer:
//! long-lived per-client subscriptions that receive periodically produced
//! events over a single persistent response channel.
//!
//! ## Components
//! - [`SseEvent`] / [`SseEventBuilder`]: one outbound SSE wire block
//! - [`MessageEvent`]: the decode-side counterpart (round-trips `format()`)
//! - [`SseClient`] / [`SseClientStream`]: the outbound channel for one
//!   subscriber, convertible into a `text/event-stream` hyper response
//! - [`SseSubscriber`]: one client's registration to a named stream
//! - [`SsePublisher`] / [`EventFeed`]: the per-stream actor that owns
//!   subscribers and drives periodic event production
//! - [`SseStreamRegistry`]: process-wide lookup-or-create of publishers,
//!   with connection-close-bound cleanup

pub mod client;
pub mod event;
pub mod message;
pub mod publisher;
pub mod registry;
pub mod subscriber;

#[cfg(test)]
mod tests;

// Re-export main types
pub use client::{SseClient, SseClientStream};
pub use event::{SseEvent, SseEventBuilder};
pub use message::MessageEvent;
pub use publisher::{EventFeed, SsePublisher};
pub use registry::{SseStreamConfig, SseStreamRegistry, SubscribeRequest};
pub use subscriber::SseSubscriber;

/// Result type for SSE streaming operations
pub type Result<T> = std::result::Result<T, SseServerError>;

/// SSE streaming errors
#[derive(Debug, thiserror::Error)]
pub enum SseServerError {
    /// The subscriber's outbound channel is closed
    #[error("client channel closed")]
    ClientClosed,

    /// The subscriber's outbound channel buffer is full
    #[error("client channel full")]
    ClientBusy,
}
