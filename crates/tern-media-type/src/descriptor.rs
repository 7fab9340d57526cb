//! Media type descriptor value type and its fluent builder

use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Immutable `type/subtype;params` media type value.
///
/// Parameters preserve insertion order for serialization, but equality treats
/// them as an unordered collection: two descriptors are equal when type and
/// subtype match exactly and they carry the same parameter entries in any
/// order.
#[derive(Debug, Clone)]
pub struct MediaTypeDescriptor {
    mime_type: String,
    mime_sub_type: String,
    parameters: Vec<(String, String)>,
}

impl MediaTypeDescriptor {
    /// Start building a descriptor
    pub fn builder() -> MediaTypeBuilder {
        MediaTypeBuilder::new()
    }

    /// The top-level type (e.g. `application`), possibly `*`
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// The subtype (e.g. `json`), possibly `*`
    pub fn mime_sub_type(&self) -> &str {
        &self.mime_sub_type
    }

    /// Parameters in insertion order
    pub fn parameters(&self) -> &[(String, String)] {
        &self.parameters
    }

    /// Look up a parameter value by name
    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.parameters
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Whether the top-level type is the `*` wildcard
    pub fn has_wildcard_type(&self) -> bool {
        self.mime_type == "*"
    }

    /// Whether the subtype is the `*` wildcard
    pub fn has_wildcard_sub_type(&self) -> bool {
        self.mime_sub_type == "*"
    }
}

impl PartialEq for MediaTypeDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.mime_type == other.mime_type
            && self.mime_sub_type == other.mime_sub_type
            && self.parameters.len() == other.parameters.len()
            && self
                .parameters
                .iter()
                .all(|(name, value)| other.parameter(name) == Some(value.as_str()))
    }
}

impl Eq for MediaTypeDescriptor {}

impl Hash for MediaTypeDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.mime_type.hash(state);
        self.mime_sub_type.hash(state);

        // Parameter order must not affect the hash (equality is unordered),
        // so combine the entry hashes with XOR.
        let mut combined: u64 = 0;
        for entry in &self.parameters {
            let mut hasher = DefaultHasher::new();
            entry.hash(&mut hasher);
            combined ^= hasher.finish();
        }
        state.write_u64(combined);
    }
}

impl fmt::Display for MediaTypeDescriptor {
    /// Renders `type/subtype` followed by `;name=value` per parameter in
    /// insertion order. This exact rendering is part of the wire contract for
    /// `Content-Type`-style headers.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.mime_type, self.mime_sub_type)?;
        for (name, value) in &self.parameters {
            write!(f, ";{}={}", name, value)?;
        }
        Ok(())
    }
}

/// Fluent builder for [`MediaTypeDescriptor`] and its validated wrappers.
///
/// [`MediaTypeBuilder::build_with`] hands the finished descriptor to a
/// caller-supplied constructor so concrete types can validate at construction
/// time.
#[derive(Debug, Clone, Default)]
pub struct MediaTypeBuilder {
    mime_type: String,
    mime_sub_type: String,
    parameters: Vec<(String, String)>,
}

impl MediaTypeBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the top-level type
    pub fn mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = mime_type.into();
        self
    }

    /// Set the subtype
    pub fn mime_sub_type(mut self, mime_sub_type: impl Into<String>) -> Self {
        self.mime_sub_type = mime_sub_type.into();
        self
    }

    /// Register a parameter. A repeated name updates the value in place,
    /// keeping the original position.
    pub fn parameter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        let value = value.into();
        if let Some(entry) = self.parameters.iter_mut().find(|(n, _)| *n == name) {
            entry.1 = value;
        } else {
            self.parameters.push((name, value));
        }
        self
    }

    /// Finish building a plain descriptor
    pub fn build(self) -> MediaTypeDescriptor {
        self.build_with(|descriptor| descriptor)
    }

    /// Finish building through a caller-supplied constructor
    pub fn build_with<T>(self, make: impl FnOnce(MediaTypeDescriptor) -> T) -> T {
        make(MediaTypeDescriptor {
            mime_type: self.mime_type,
            mime_sub_type: self.mime_sub_type,
            parameters: self.parameters,
        })
    }
}
