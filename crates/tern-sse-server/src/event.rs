//! Outbound SSE event construction and wire rendering

/// One outbound SSE wire block, built once via [`SseEventBuilder`] and
/// immutable afterwards.
///
/// An absent id and a blank id are distinct: `id: Some("")` means "has an id
/// line, value blank", which is how end-of-stream is signalled on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseEvent {
    comment: Option<String>,
    id: Option<String>,
    event: Option<String>,
    data: Option<String>,
    retry: Option<u64>,
    end_of_stream: bool,
}

impl SseEvent {
    /// Start building an event
    pub fn builder() -> SseEventBuilder {
        SseEventBuilder::new()
    }

    /// A keep-alive comment event (`: keepalive`)
    pub fn keep_alive() -> Self {
        Self::builder().comment("keepalive").build()
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn event(&self) -> Option<&str> {
        self.event.as_deref()
    }

    pub fn data(&self) -> Option<&str> {
        self.data.as_deref()
    }

    /// Retry timeout in milliseconds, absent when the event sets none
    pub fn retry(&self) -> Option<u64> {
        self.retry
    }

    pub fn is_end_of_stream(&self) -> bool {
        self.end_of_stream
    }

    /// Format as an SSE wire block.
    ///
    /// Field lines render in this exact order, only for present fields, and
    /// the block always ends with the blank line clients rely on to delimit
    /// events:
    ///
    /// ```text
    /// : {comment}
    /// id: {id}
    /// event: {event}
    /// data: {data}
    /// retry: {retry}
    /// <blank>
    /// ```
    ///
    /// An event with every field absent renders as the bare delimiter, which
    /// decoders discard; it is the one encoding that does not round-trip
    /// through [`MessageEvent::parse_all`](crate::MessageEvent::parse_all).
    pub fn format(&self) -> String {
        let mut result = String::new();

        if let Some(comment) = &self.comment {
            result.push_str(&format!(": {}\n", comment));
        }
        if let Some(id) = &self.id {
            result.push_str(&format!("id: {}\n", id));
        }
        if let Some(event) = &self.event {
            result.push_str(&format!("event: {}\n", event));
        }
        if let Some(data) = &self.data {
            result.push_str(&format!("data: {}\n", data));
        }
        if let Some(retry) = self.retry {
            result.push_str(&format!("retry: {}\n", retry));
        }

        // End of event
        result.push('\n');

        result
    }
}

/// Builder for [`SseEvent`].
///
/// The numeric id is rendered as its decimal string; "has an id" is tracked
/// separately from the rendered value so an absent id and an explicit blank
/// id stay distinguishable.
#[derive(Debug, Clone, Default)]
pub struct SseEventBuilder {
    comment: Option<String>,
    id: Option<String>,
    event: Option<String>,
    data: Option<String>,
    retry: Option<u64>,
    end_of_stream: bool,
}

impl SseEventBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Set the event id, rendered as a decimal string
    pub fn id(mut self, id: u64) -> Self {
        self.id = Some(id.to_string());
        self
    }

    pub fn event(mut self, event: impl Into<String>) -> Self {
        self.event = Some(event.into());
        self
    }

    pub fn data(mut self, data: impl Into<String>) -> Self {
        self.data = Some(data.into());
        self
    }

    /// Retry timeout in milliseconds
    pub fn retry_ms(mut self, retry: u64) -> Self {
        self.retry = Some(retry);
        self
    }

    /// Mark the stream as finished. Forces a blank id line.
    pub fn end_of_stream(mut self) -> Self {
        self.end_of_stream = true;
        self
    }

    pub fn build(self) -> SseEvent {
        let id = if self.end_of_stream {
            // End-of-stream always renders a blank id, whatever was set
            Some(String::new())
        } else {
            self.id
        };
        SseEvent {
            comment: self.comment,
            id,
            event: self.event,
            data: self.data,
            retry: self.retry,
            end_of_stream: self.end_of_stream,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_event_field_order() {
        let event = SseEvent::builder()
            .comment("heartbeat")
            .id(42)
            .event("update")
            .data("{\"count\":1}")
            .retry_ms(3000)
            .build();

        assert_eq!(
            event.format(),
            ": heartbeat\nid: 42\nevent: update\ndata: {\"count\":1}\nretry: 3000\n\n"
        );
    }

    #[test]
    fn test_absent_fields_render_no_lines() {
        let event = SseEvent::builder().data("payload").build();
        assert_eq!(event.format(), "data: payload\n\n");

        let empty = SseEvent::builder().build();
        assert_eq!(empty.format(), "\n");
    }

    #[test]
    fn test_end_of_stream_forces_blank_id() {
        let event = SseEvent::builder().id(7).end_of_stream().build();
        assert_eq!(event.id(), Some(""));
        assert!(event.is_end_of_stream());
        assert_eq!(event.format(), "id: \n\n");
    }

    #[test]
    fn test_absent_id_distinct_from_blank_id() {
        let absent = SseEvent::builder().data("x").build();
        let blank = SseEvent::builder().data("x").end_of_stream().build();

        assert_eq!(absent.id(), None);
        assert_eq!(blank.id(), Some(""));
        assert_ne!(absent, blank);
    }

    #[test]
    fn test_keep_alive_is_comment_only() {
        assert_eq!(SseEvent::keep_alive().format(), ": keepalive\n\n");
    }
}
