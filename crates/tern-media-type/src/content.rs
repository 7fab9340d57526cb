//! Concrete, validated server-supported media types

use std::fmt;

use crate::descriptor::MediaTypeDescriptor;
use crate::parser::MediaTypeParser;
use crate::{NegotiationError, Result};

/// Top-level types from the IANA media type registry. This is a fixed list,
/// not a general registry.
const REGISTERED_TOP_LEVEL_TYPES: [&str; 9] = [
    "application",
    "audio",
    "font",
    "image",
    "model",
    "text",
    "video",
    "multipart",
    "message",
];

/// A media type the server is prepared to emit.
///
/// Unlike a raw [`MediaTypeDescriptor`], a `ContentMediaType` is always
/// concrete: the subtype is never `*` and the top-level type is a
/// case-insensitive match to the IANA registry list. Violations fail
/// construction with [`NegotiationError::MediaTypeNotSupported`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentMediaType {
    descriptor: MediaTypeDescriptor,
}

impl ContentMediaType {
    /// Build from a type pair, validating both fields
    pub fn new(mime_type: impl Into<String>, mime_sub_type: impl Into<String>) -> Result<Self> {
        MediaTypeDescriptor::builder()
            .mime_type(mime_type)
            .mime_sub_type(mime_sub_type)
            .build_with(Self::from_descriptor)
    }

    /// Wrap a parsed descriptor, validating it
    pub fn from_descriptor(descriptor: MediaTypeDescriptor) -> Result<Self> {
        if descriptor.has_wildcard_sub_type() || !Self::is_registered_type(descriptor.mime_type()) {
            return Err(NegotiationError::MediaTypeNotSupported(
                descriptor.to_string(),
            ));
        }
        Ok(Self { descriptor })
    }

    /// Parse and validate a descriptor string like `application/json;charset=utf-8`
    pub fn parse(descriptor: &str) -> Result<Self> {
        MediaTypeParser::parse(descriptor).build_with(Self::from_descriptor)
    }

    /// `application/json`
    pub fn json() -> Self {
        Self::well_known("application", "json")
    }

    /// `application/xml`
    pub fn xml() -> Self {
        Self::well_known("application", "xml")
    }

    /// `text/event-stream`
    pub fn event_stream() -> Self {
        Self::well_known("text", "event-stream")
    }

    // Known-valid type pairs skip validation
    fn well_known(mime_type: &str, mime_sub_type: &str) -> Self {
        Self {
            descriptor: MediaTypeDescriptor::builder()
                .mime_type(mime_type)
                .mime_sub_type(mime_sub_type)
                .build(),
        }
    }

    /// The same type pair with all parameters stripped, for comparing
    /// representations while ignoring negotiation parameters like `charset`.
    pub fn to_base_type(&self) -> Self {
        if self.descriptor.parameters().is_empty() {
            return self.clone();
        }
        Self::well_known(self.descriptor.mime_type(), self.descriptor.mime_sub_type())
    }

    /// The underlying descriptor
    pub fn descriptor(&self) -> &MediaTypeDescriptor {
        &self.descriptor
    }

    /// The top-level type
    pub fn mime_type(&self) -> &str {
        self.descriptor.mime_type()
    }

    /// The subtype (never `*`)
    pub fn mime_sub_type(&self) -> &str {
        self.descriptor.mime_sub_type()
    }

    fn is_registered_type(mime_type: &str) -> bool {
        REGISTERED_TOP_LEVEL_TYPES
            .iter()
            .any(|registered| registered.eq_ignore_ascii_case(mime_type))
    }
}

impl fmt::Display for ContentMediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.descriptor, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_content_types() {
        assert!(ContentMediaType::new("application", "json").is_ok());
        assert!(ContentMediaType::new("text", "html").is_ok());
        // Registry match is case-insensitive
        assert!(ContentMediaType::new("Application", "json").is_ok());
    }

    #[test]
    fn test_wildcard_subtype_rejected() {
        let err = ContentMediaType::new("application", "*").unwrap_err();
        assert_eq!(
            err,
            NegotiationError::MediaTypeNotSupported("application/*".to_string())
        );
    }

    #[test]
    fn test_unregistered_type_rejected() {
        let err = ContentMediaType::new("bogus", "x").unwrap_err();
        assert_eq!(
            err,
            NegotiationError::MediaTypeNotSupported("bogus/x".to_string())
        );
    }

    #[test]
    fn test_parse_composes_parser_and_validation() {
        let parsed = ContentMediaType::parse("application/json;charset=utf-8").unwrap();
        assert_eq!(parsed.mime_type(), "application");
        assert_eq!(parsed.mime_sub_type(), "json");
        assert_eq!(parsed.descriptor().parameter("charset"), Some("utf-8"));

        // Malformed input degrades to an empty descriptor, which then fails
        // validation rather than parsing.
        assert!(ContentMediaType::parse("typeOnly").is_err());
    }

    #[test]
    fn test_to_base_type_strips_parameters() {
        let with_params = ContentMediaType::parse("application/json;charset=utf-8").unwrap();
        let base = with_params.to_base_type();
        assert_eq!(base, ContentMediaType::json());

        // No parameters: base type is the same value
        assert_eq!(ContentMediaType::json().to_base_type(), ContentMediaType::json());
    }
}
