use uuid::Uuid;

/// Returns a fresh random identifier (a version 4 UUID).
///
/// No coordination happens between callers; a collision is statistically
/// negligible and not guarded against.
pub fn next_identifier() -> String {
    Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn identifier_is_a_v4_uuid() {
        let id = next_identifier();
        let parsed = Uuid::parse_str(&id).expect("identifier should parse as a UUID");
        assert_eq!(parsed.get_version_num(), 4);
        assert_eq!(id.len(), 36);
    }

    #[test]
    fn identifiers_do_not_repeat() {
        let ids: HashSet<String> = (0..10_000).map(|_| next_identifier()).collect();
        assert_eq!(ids.len(), 10_000);
    }
}
