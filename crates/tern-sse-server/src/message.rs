//! Decoding SSE wire blocks back into structured events

use crate::event::SseEvent;

/// One decoded SSE wire block, the parse-side counterpart of [`SseEvent`].
///
/// For any event `e` with at least one present field,
/// `MessageEvent::parse_all(&e.format())` yields exactly one message whose
/// fields equal `e`'s; a fully absent event encodes to the bare delimiter,
/// which decodes to nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageEvent {
    comment: Option<String>,
    id: Option<String>,
    event: Option<String>,
    data: Option<String>,
    retry: Option<u64>,
    end_of_stream: bool,
}

impl MessageEvent {
    /// Parse a response body containing one or more concatenated SSE blocks.
    ///
    /// Blocks are split on the blank-line delimiter; each non-empty block
    /// yields exactly one message. A fieldless block (a bare delimiter, the
    /// encoding of an event with every field absent) yields nothing. A
    /// `retry` value that fails to parse as an integer is treated as absent.
    /// An id line with a blank value marks end-of-stream.
    pub fn parse_all(body: &str) -> Vec<MessageEvent> {
        body.split("\n\n")
            .filter(|block| !block.trim().is_empty())
            .map(Self::parse_block)
            .collect()
    }

    fn parse_block(block: &str) -> MessageEvent {
        let mut message = MessageEvent::default();

        for line in block.lines() {
            if let Some(value) = field_value(line, "id:") {
                if value.is_empty() {
                    message.end_of_stream = true;
                }
                message.id = Some(value.to_string());
            } else if let Some(value) = field_value(line, "event:") {
                message.event = Some(value.to_string());
            } else if let Some(value) = field_value(line, "data:") {
                message.data = Some(value.to_string());
            } else if let Some(value) = field_value(line, "retry:") {
                message.retry = value.parse::<u64>().ok();
            } else if let Some(value) = field_value(line, ":") {
                message.comment = Some(value.to_string());
            }
        }

        message
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

    pub fn retry(&self) -> Option<u64> {
        self.retry
    }

    pub fn is_end_of_stream(&self) -> bool {
        self.end_of_stream
    }
}

/// Field-for-field comparison against the encode-side event
impl PartialEq<SseEvent> for MessageEvent {
    fn eq(&self, event: &SseEvent) -> bool {
        self.comment.as_deref() == event.comment()
            && self.id.as_deref() == event.id()
            && self.event.as_deref() == event.event()
            && self.data.as_deref() == event.data()
            && self.retry == event.retry()
            && self.end_of_stream == event.is_end_of_stream()
    }
}

// Strip the field prefix and the single optional space after it
fn field_value<'a>(line: &'a str, prefix: &str) -> Option<&'a str> {
    line.strip_prefix(prefix)
        .map(|value| value.strip_prefix(' ').unwrap_or(value))
}
