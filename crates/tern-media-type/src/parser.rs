//! Lenient media type descriptor string parsing
//!
//! The parser never fails: malformed input degrades to an empty descriptor or
//! drops the offending parameter, and validation is left to the concrete
//! descriptor type built from the result.

use crate::descriptor::MediaTypeBuilder;

/// Parses descriptor strings like `application/json;charset=utf-8` into a
/// [`MediaTypeBuilder`].
pub struct MediaTypeParser;

impl MediaTypeParser {
    /// Parse a descriptor string.
    ///
    /// The first `;`-segment must split on `/` into exactly two parts to
    /// yield a type pair; anything else leaves both type fields empty.
    /// Parameter segments must split on `=` into exactly two parts; anything
    /// else is silently discarded.
    pub fn parse(descriptor: &str) -> MediaTypeBuilder {
        let mut segments = descriptor.split(';');
        let mut builder = MediaTypeBuilder::new();

        if let Some(type_pair) = segments.next() {
            let parts: Vec<&str> = type_pair.split('/').collect();
            if let [mime_type, mime_sub_type] = parts[..] {
                builder = builder
                    .mime_type(mime_type.trim())
                    .mime_sub_type(mime_sub_type.trim());
            }
        }

        for segment in segments {
            let parts: Vec<&str> = segment.split('=').collect();
            if let [name, value] = parts[..] {
                builder = builder.parameter(name.trim(), value.trim());
            }
        }

        builder
    }
}
