//! Accept-header media ranges with quality factor and ranking order

use std::cmp::Ordering;
use std::fmt;

use crate::content::ContentMediaType;
use crate::descriptor::MediaTypeDescriptor;
use crate::parser::MediaTypeParser;

/// One entry of an `Accept` header: a possibly wildcarded media range plus
/// the `q` quality factor (default 1.0).
///
/// The `Ord` implementation ranks by descending preference, so an ordered set
/// of `AcceptMediaType` iterates from most to least preferred:
/// 1. higher quality factor wins outright
/// 2. at equal quality, a concrete type outranks a `*` type
/// 3. then a concrete subtype outranks a `*` subtype
/// 4. then more parameters outrank fewer
///
/// Entries the comparator cannot distinguish are equal and collapse in an
/// ordered set.
#[derive(Debug, Clone)]
pub struct AcceptMediaType {
    descriptor: MediaTypeDescriptor,
    quality: f32,
}

impl AcceptMediaType {
    /// Wrap a parsed descriptor, reading the `q` parameter. A missing or
    /// unparseable `q` means 1.0.
    pub fn from_descriptor(descriptor: MediaTypeDescriptor) -> Self {
        let quality = descriptor
            .parameter("q")
            .and_then(|value| value.parse::<f32>().ok())
            .unwrap_or(1.0);
        Self {
            descriptor,
            quality,
        }
    }

    /// Parse one trimmed `Accept` header entry
    pub fn parse(entry: &str) -> Self {
        MediaTypeParser::parse(entry).build_with(Self::from_descriptor)
    }

    /// The quality factor in effect for this range
    pub fn quality_factor(&self) -> f32 {
        self.quality
    }

    /// The underlying descriptor
    pub fn descriptor(&self) -> &MediaTypeDescriptor {
        &self.descriptor
    }

    /// Whether this media range accepts the given supported type: the range's
    /// type is `*` or equal to the supported type, and likewise for the
    /// subtype.
    pub fn is_same_or_super_type_of(&self, supported: &ContentMediaType) -> bool {
        let type_matches = self.descriptor.has_wildcard_type()
            || self.descriptor.mime_type() == supported.mime_type();
        let sub_type_matches = self.descriptor.has_wildcard_sub_type()
            || self.descriptor.mime_sub_type() == supported.mime_sub_type();
        type_matches && sub_type_matches
    }

    // 0 for a concrete field, 1 for a wildcard: concrete sorts first
    fn type_wildcard_rank(&self) -> u8 {
        u8::from(self.descriptor.has_wildcard_type())
    }

    fn sub_type_wildcard_rank(&self) -> u8 {
        u8::from(self.descriptor.has_wildcard_sub_type())
    }
}

impl Ord for AcceptMediaType {
    fn cmp(&self, other: &Self) -> Ordering {
        // Quality factor dominates specificity; reversed so higher quality
        // sorts first.
        other
            .quality
            .total_cmp(&self.quality)
            .then_with(|| self.type_wildcard_rank().cmp(&other.type_wildcard_rank()))
            .then_with(|| {
                self.sub_type_wildcard_rank()
                    .cmp(&other.sub_type_wildcard_rank())
            })
            .then_with(|| {
                other
                    .descriptor
                    .parameters()
                    .len()
                    .cmp(&self.descriptor.parameters().len())
            })
    }
}

impl PartialOrd for AcceptMediaType {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Equality follows the ranking comparator, not descriptor identity: two
/// ranges the comparator cannot tell apart are the same for negotiation.
impl PartialEq for AcceptMediaType {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for AcceptMediaType {}

impl fmt::Display for AcceptMediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.descriptor, f)
    }
}
