//! Composite resource identifiers
//!
//! Child resources on the app platform are addressed only by a
//! (parent id, name) pair; the externally persisted key joins the two
//! with a fixed separator. One codec covers every composite-id resource
//! kind, parameterized by the field labels used in decode errors.

use crate::error::{CloudError, Result};

/// Separator between the two components of a composite resource id.
pub const RESOURCE_ID_SEPARATOR: char = '/';

/// Encoder/decoder for two-part resource ids.
///
/// The labels only affect decode error messages (e.g. `APP-ID` and
/// `BRANCH-NAME`); encoding and decoding behave identically for every
/// resource kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompositeIdCodec {
    parent_label: &'static str,
    child_label: &'static str,
}

impl CompositeIdCodec {
    pub const fn new(parent_label: &'static str, child_label: &'static str) -> Self {
        Self {
            parent_label,
            child_label,
        }
    }

    /// Joins the two components into the external id form.
    ///
    /// No validation happens on encode: an empty component silently
    /// produces an id that will fail to decode later, and a component
    /// containing the separator is not escaped and will mis-parse on
    /// decode (first-split-wins). Callers supply non-empty,
    /// separator-free components.
    pub fn encode(&self, parent: &str, child: &str) -> String {
        format!("{parent}{RESOURCE_ID_SEPARATOR}{child}")
    }

    /// Splits an external id back into its two components.
    ///
    /// Succeeds only when the id splits into exactly two non-empty parts;
    /// anything else is a malformed identifier, which signals corrupted
    /// persisted state and must never be tolerated silently.
    pub fn decode<'a>(&self, id: &'a str) -> Result<(&'a str, &'a str)> {
        let parts: Vec<&str> = id.split(RESOURCE_ID_SEPARATOR).collect();

        if parts.len() == 2 && !parts[0].is_empty() && !parts[1].is_empty() {
            return Ok((parts[0], parts[1]));
        }

        Err(CloudError::MalformedResourceId {
            id: id.to_string(),
            separator: RESOURCE_ID_SEPARATOR,
            parent_label: self.parent_label,
            child_label: self.child_label,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CODEC: CompositeIdCodec = CompositeIdCodec::new("APP-ID", "ENVIRONMENT-NAME");

    #[test]
    fn test_encode() {
        assert_eq!(CODEC.encode("app123", "envname"), "app123/envname");
    }

    #[test]
    fn test_decode() {
        assert_eq!(CODEC.decode("app123/envname").unwrap(), ("app123", "envname"));
    }

    #[test]
    fn test_roundtrip() {
        for (parent, child) in [("a", "b"), ("d1qke9zsv7gq8n", "staging"), ("x", "feature-login")] {
            let id = CODEC.encode(parent, child);
            assert_eq!(CODEC.decode(&id).unwrap(), (parent, child));
        }
    }

    #[test]
    fn test_decode_rejects_malformed() {
        for id in ["", "onlyone", "a/b/c", "/b", "a/", "/"] {
            let err = CODEC.decode(id).unwrap_err();
            assert!(
                matches!(err, CloudError::MalformedResourceId { .. }),
                "expected malformed id error for {id:?}, got {err:?}"
            );
        }
    }

    #[test]
    fn test_decode_error_names_id_and_fields() {
        let message = CODEC.decode("a/b/c").unwrap_err().to_string();
        assert!(message.contains("(a/b/c)"));
        assert!(message.contains("APP-ID/ENVIRONMENT-NAME"));
    }

    // Encode performs no validation; the malformed id is only caught on
    // the later decode.
    #[test]
    fn test_encode_empty_component_fails_on_decode() {
        let id = CODEC.encode("", "envname");
        assert_eq!(id, "/envname");
        assert!(CODEC.decode(&id).is_err());
    }

    // A separator inside a component is a known structural limitation:
    // the encoded id no longer splits into two parts.
    #[test]
    fn test_separator_in_component_misparses() {
        let id = CODEC.encode("app123", "release/2024");
        assert!(CODEC.decode(&id).is_err());
    }
}
