//! Accept-header negotiation: pick the best supported representation

use std::collections::BTreeSet;

use tracing::debug;

use crate::accept::AcceptMediaType;
use crate::content::ContentMediaType;
use crate::{NegotiationError, Result};

/// Ranks the media ranges of one `Accept` header and selects the best
/// server-supported representation.
///
/// Construction parses each comma-separated entry into an
/// [`AcceptMediaType`] and ranks them in an ordered set. Entries the ranking
/// comparator cannot distinguish collapse into one; this mirrors the header
/// semantics (the duplicates would have matched the same types anyway) and is
/// documented, not a defect.
///
/// A selector is immutable once constructed and safe to share across
/// concurrent requests.
#[derive(Debug)]
pub struct ResponseMediaTypeSelector {
    header: String,
    ranked: BTreeSet<AcceptMediaType>,
}

impl ResponseMediaTypeSelector {
    /// Parse a raw `Accept` header value
    pub fn new(accept_header: impl Into<String>) -> Self {
        let header = accept_header.into();
        let ranked = header
            .split(',')
            .map(|entry| AcceptMediaType::parse(entry.trim()))
            .collect();
        Self { header, ranked }
    }

    /// The original unparsed header text
    pub fn accept_header(&self) -> &str {
        &self.header
    }

    /// Ranked media ranges, most preferred first
    pub fn ranked(&self) -> impl Iterator<Item = &AcceptMediaType> {
        self.ranked.iter()
    }

    /// Select the best representation from `supported`.
    ///
    /// Ranked ranges are tried from most to least preferred; within one range
    /// the supported types are tried in caller order, which acts as the
    /// priority among equally acceptable types. The first match wins. No
    /// match across the full product fails with
    /// [`NegotiationError::MediaTypeNotSupported`] carrying the original
    /// header text.
    pub fn select_type<'a>(&self, supported: &'a [ContentMediaType]) -> Result<&'a ContentMediaType> {
        for accept in &self.ranked {
            for content in supported {
                if accept.is_same_or_super_type_of(content) {
                    debug!(accept = %accept, selected = %content, "Selected response media type");
                    return Ok(content);
                }
            }
        }

        debug!(header = %self.header, "No acceptable media type among supported set");
        Err(NegotiationError::MediaTypeNotSupported(self.header.clone()))
    }
}
