//! # Media Types and Content Negotiation
//!
//! This crate provides media type descriptors (`type/subtype;params`) and the
//! `Accept`-header negotiation used to pick the best response representation
//! from a server-supported set.
//!
//! ## Components
//! - [`MediaTypeDescriptor`] / [`MediaTypeBuilder`]: immutable descriptor values
//! - [`MediaTypeParser`]: lenient descriptor string parsing
//! - [`ContentMediaType`]: validated, concrete server-supported types
//! - [`AcceptMediaType`]: a media range with quality factor and ranking order
//! - [`ResponseMediaTypeSelector`]: the negotiation algorithm itself
//!
//! Negotiation components are pure and immutable once constructed; a selector
//! built from a header value can be shared across concurrent requests.

pub mod accept;
pub mod content;
pub mod descriptor;
pub mod parser;
pub mod selector;

// Re-export main types
pub use accept::AcceptMediaType;
pub use content::ContentMediaType;
pub use descriptor::{MediaTypeBuilder, MediaTypeDescriptor};
pub use parser::MediaTypeParser;
pub use selector::ResponseMediaTypeSelector;

/// Result type for negotiation operations
pub type Result<T> = std::result::Result<T, NegotiationError>;

/// Errors raised at the content negotiation boundary
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NegotiationError {
    /// No supported representation is acceptable, or a descriptor failed
    /// validation. Carries the original header text (selector) or the
    /// offending descriptor string (validation) for diagnostics.
    #[error("media type not supported: {0}")]
    MediaTypeNotSupported(String),
}
