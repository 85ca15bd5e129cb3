pub mod headers;

use std::{
    collections::BTreeMap,
    fmt,
    hash::{Hash, Hasher},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const CONTENT_TYPE: &str = "content-type";
pub const CONTENT_LENGTH: &str = "content-length";

/// A descriptive field value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(i64),
    Text(String),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Number(n) => write!(f, "{n}"),
            FieldValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Number(value)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MetadataError {
    #[error("required metadata field `{0}` is missing")]
    MissingField(&'static str),
}

/// The finalized descriptive record of one stored resource.
///
/// Only [`MetadataBuilder::build`] produces one, so the identifier, content
/// type and length are always present. Equality and hashing look at the
/// identifier alone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceMetadata {
    identifier: String,
    #[serde(rename = "content-type")]
    content_type: String,
    #[serde(rename = "content-length")]
    length: u64,
    // nested so caller keys never shadow the three fields above
    #[serde(rename = "metadata", default)]
    fields: BTreeMap<String, FieldValue>,
}

impl ResourceMetadata {
    pub fn builder() -> MetadataBuilder {
        MetadataBuilder::default()
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn length(&self) -> u64 {
        self.length
    }

    /// Every field, the standard `content-type` and `content-length` included.
    pub fn fields(&self) -> impl Iterator<Item = (&str, FieldValue)> + '_ {
        let standard: [(&str, FieldValue); 2] = [
            (CONTENT_TYPE, FieldValue::Text(self.content_type.clone())),
            (CONTENT_LENGTH, FieldValue::Number(self.length_as_i64())),
        ];
        standard.into_iter().chain(self.fields.iter().map(|(k, v)| (k.as_str(), v.clone())))
    }

    pub fn field(&self, key: &str) -> Option<FieldValue> {
        let key = key.to_ascii_lowercase();
        match key.as_str() {
            CONTENT_TYPE => Some(FieldValue::Text(self.content_type.clone())),
            CONTENT_LENGTH => Some(FieldValue::Number(self.length_as_i64())),
            _ => self.fields.get(&key).cloned(),
        }
    }

    pub fn field_as_string(&self, key: &str) -> Option<String> {
        self.field(key).map(|v| v.to_string())
    }

    /// `None` unless the field holds a number.
    pub fn field_as_int(&self, key: &str) -> Option<i64> {
        match self.field(key)? {
            FieldValue::Number(n) => Some(n),
            FieldValue::Text(_) => None,
        }
    }

    fn length_as_i64(&self) -> i64 {
        i64::try_from(self.length).unwrap_or(i64::MAX)
    }
}

impl PartialEq for ResourceMetadata {
    fn eq(&self, other: &Self) -> bool {
        self.identifier == other.identifier
    }
}

impl Eq for ResourceMetadata {}

impl Hash for ResourceMetadata {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identifier.hash(state);
    }
}

/// Accumulates fields for a resource that has not been stored yet.
///
/// Keys are lower-cased on insert. `content-type` and `content-length` are
/// routed to their dedicated slots rather than the free-form map.
#[derive(Debug, Clone, Default)]
pub struct MetadataBuilder {
    identifier: Option<String>,
    content_type: Option<String>,
    length: Option<u64>,
    fields: BTreeMap<String, FieldValue>,
}

impl MetadataBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collects metadata from request header fields: custom `xxx-<name>`
    /// fields plus the protocol-level content type and length.
    pub fn from_headers<'a, I>(headers: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let headers: Vec<(&str, &str)> = headers.into_iter().collect();
        let mut builder = Self::new();
        for (name, value) in &headers {
            if name.eq_ignore_ascii_case(CONTENT_TYPE) {
                builder.content_type = Some(value.to_string());
            } else if name.eq_ignore_ascii_case(CONTENT_LENGTH) {
                // unparsable declared lengths are dropped, the stored length is measured anyway
                builder.length = value.trim().parse().ok();
            }
        }
        for (key, value) in headers::decode(headers) {
            builder.fields.insert(key, FieldValue::Text(value));
        }
        builder
    }

    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = Some(identifier.into());
        self
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn with_length(mut self, length: u64) -> Self {
        self.length = Some(length);
        self
    }

    pub fn with_field(mut self, key: &str, value: impl Into<FieldValue>) -> Self {
        let key = key.to_ascii_lowercase();
        let value = value.into();
        if key == CONTENT_TYPE {
            self.content_type = Some(value.to_string());
        } else if key == CONTENT_LENGTH {
            self.length = match value {
                FieldValue::Number(n) => u64::try_from(n).ok(),
                FieldValue::Text(s) => s.trim().parse().ok(),
            };
        } else {
            self.fields.insert(key, value);
        }
        self
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// The length declared so far, which may not match what gets written.
    pub fn declared_length(&self) -> Option<u64> {
        self.length
    }

    pub fn build(self) -> Result<ResourceMetadata, MetadataError> {
        let identifier = self.identifier.ok_or(MetadataError::MissingField("identifier"))?;
        let content_type = self.content_type.ok_or(MetadataError::MissingField(CONTENT_TYPE))?;
        let length = self.length.ok_or(MetadataError::MissingField(CONTENT_LENGTH))?;

        Ok(ResourceMetadata { identifier, content_type, length, fields: self.fields })
    }
}
