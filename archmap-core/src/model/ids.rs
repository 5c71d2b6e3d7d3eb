//! Deterministic component identifiers.

use xxhash_rust::xxh3::xxh3_64;

/// Derive the stable id for a component name.
///
/// The id is the xxh3-64 hash of the name rendered as 16 lowercase hex
/// characters. It is stable across runs and platforms, so repeated scans
/// of the same tree always agree on ids.
pub fn component_id(name: &str) -> String {
    format!("{:016x}", xxh3_64(name.as_bytes()))
}

/// Hash arbitrary content (used for parse-cache keys).
pub fn hash_content(content: &[u8]) -> u64 {
    xxh3_64(content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn component_id_is_stable() {
        assert_eq!(component_id("user-service"), component_id("user-service"));
    }

    #[test]
    fn component_id_is_16_hex_chars() {
        let id = component_id("payments");
        assert_eq!(id.len(), 16);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(id, id.to_lowercase());
    }

    #[test]
    fn distinct_names_get_distinct_ids() {
        assert_ne!(component_id("orders"), component_id("order"));
        assert_ne!(component_id("a"), component_id("b"));
    }
}
