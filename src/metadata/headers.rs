//! Mapping between descriptive fields and header-like name/value pairs.
//!
//! Inbound, only fields named `xxx-<name>` (case-insensitive, `<name>` made
//! of letters and underscores) are kept, under the lower-cased `<name>`.
//! Outbound, standard header names pass through unprefixed and every other
//! field gets the `xxx-` prefix back.

use crate::metadata::ResourceMetadata;

pub const CUSTOM_PREFIX: &str = "xxx-";

/// Well-known HTTP header vocabulary, emitted without a prefix.
pub const STANDARD_HEADERS: &[&str] = &[
    "accept",
    "accept-charset",
    "accept-encoding",
    "accept-language",
    "accept-ranges",
    "access-control-allow-credentials",
    "access-control-allow-headers",
    "access-control-allow-methods",
    "access-control-allow-origin",
    "access-control-expose-headers",
    "access-control-max-age",
    "access-control-request-headers",
    "access-control-request-method",
    "age",
    "allow",
    "authorization",
    "cache-control",
    "connection",
    "content-encoding",
    "content-disposition",
    "content-language",
    "content-length",
    "content-location",
    "content-range",
    "content-type",
    "cookie",
    "date",
    "etag",
    "expect",
    "expires",
    "from",
    "host",
    "if-match",
    "if-modified-since",
    "if-none-match",
    "if-range",
    "if-unmodified-since",
    "last-modified",
    "link",
    "location",
    "max-forwards",
    "origin",
    "pragma",
    "proxy-authenticate",
    "proxy-authorization",
    "range",
    "referer",
    "retry-after",
    "server",
    "set-cookie",
    "set-cookie2",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
    "user-agent",
    "vary",
    "via",
    "warning",
    "www-authenticate",
];

pub fn is_standard_header(name: &str) -> bool {
    STANDARD_HEADERS.iter().any(|h| h.eq_ignore_ascii_case(name))
}

/// Returns the descriptive field key carried by a custom header name, if any.
pub fn decode_field_name(header_name: &str) -> Option<String> {
    let prefix = header_name.get(..CUSTOM_PREFIX.len())?;
    if !prefix.eq_ignore_ascii_case(CUSTOM_PREFIX) {
        return None;
    }

    let name = &header_name[CUSTOM_PREFIX.len()..];
    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphabetic() || c == '_') {
        return None;
    }
    Some(name.to_ascii_lowercase())
}

/// Decodes custom fields, ignoring everything that does not follow the `xxx-` convention.
/// Values are kept verbatim.
pub fn decode<'a, I>(headers: I) -> Vec<(String, String)>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    headers
        .into_iter()
        .filter_map(|(name, value)| decode_field_name(name).map(|key| (key, value.to_string())))
        .collect()
}

pub fn encode_field_name(key: &str) -> String {
    if is_standard_header(key) { key.to_string() } else { format!("{CUSTOM_PREFIX}{key}") }
}

/// Encodes every field of a finalized record, values in their string form.
pub fn encode(metadata: &ResourceMetadata) -> Vec<(String, String)> {
    metadata.fields().map(|(key, value)| (encode_field_name(key), value.to_string())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::MetadataBuilder;

    fn find<'a>(encoded: &'a [(String, String)], name: &str) -> Option<&'a str> {
        encoded.iter().find(|(n, _)| n == name).map(|(_, v)| v.as_str())
    }

    #[test]
    fn decodes_description() {
        let decoded = decode([("xxx-Description", "The Description")]);
        assert_eq!(decoded, vec![("description".to_string(), "The Description".to_string())]);
    }

    #[test]
    fn prefix_is_case_insensitive() {
        assert_eq!(decode_field_name("XXX-Cute_Cat").as_deref(), Some("cute_cat"));
        assert_eq!(decode_field_name("xXx-name").as_deref(), Some("name"));
    }

    #[test]
    fn ignores_non_matching_names() {
        for name in ["xxx-", "xxx-with-dash", "xxx-digit1", "x-name", "content-type", "xx", "xxx-é"]
        {
            assert_eq!(decode_field_name(name), None, "{name} should be ignored");
        }
    }

    #[test]
    fn encodes_custom_and_standard_fields() {
        let md = MetadataBuilder::new()
            .with_identifier("id")
            .with_content_type("application/octet-stream")
            .with_length(10)
            .with_field("description", "The Description")
            .with_field("etag", "\"v1\"")
            .build()
            .unwrap();

        let encoded = encode(&md);
        assert_eq!(find(&encoded, "xxx-description"), Some("The Description"));
        assert_eq!(find(&encoded, "content-type"), Some("application/octet-stream"));
        assert_eq!(find(&encoded, "content-length"), Some("10"));
        assert_eq!(find(&encoded, "etag"), Some("\"v1\""));
        assert_eq!(encoded.len(), 4);
    }

    #[test]
    fn custom_field_round_trips() {
        let md = MetadataBuilder::new()
            .with_identifier("id")
            .with_content_type("text/plain")
            .with_length(0)
            .with_field("some_tag", "Mixed Case Value")
            .build()
            .unwrap();

        let encoded = encode(&md);
        let decoded = decode(encoded.iter().map(|(n, v)| (n.as_str(), v.as_str())));
        assert_eq!(decoded, vec![("some_tag".to_string(), "Mixed Case Value".to_string())]);
    }

    #[test]
    fn standard_names_match_any_case() {
        assert!(is_standard_header("Cache-Control"));
        assert!(is_standard_header("WWW-Authenticate"));
        assert!(!is_standard_header("description"));
        assert_eq!(encode_field_name("vary"), "vary");
        assert_eq!(encode_field_name("owner"), "xxx-owner");
    }
}
