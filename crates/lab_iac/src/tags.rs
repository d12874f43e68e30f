//! `key=value` tag tokens.

use serde::{Deserialize, Serialize};

use crate::error::{IacError, IacResult};

/// A stack tag parsed from a single `key=value` token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub key: String,
    pub value: String,
}

impl Tag {
    /// Parse a `key=value` token. The value may be empty; the key may not.
    pub fn parse(token: &str) -> IacResult<Self> {
        let malformed = |reason: &str| IacError::MalformedTag {
            tag: token.to_string(),
            reason: reason.to_string(),
        };

        let (key, value) = token
            .split_once('=')
            .ok_or_else(|| malformed("expected key=value"))?;

        if value.contains('=') {
            return Err(malformed("more than one '=' separator"));
        }
        if key.trim().is_empty() {
            return Err(malformed("empty key"));
        }

        Ok(Self {
            key: key.to_string(),
            value: value.to_string(),
        })
    }
}

impl std::str::FromStr for Tag {
    type Err = IacError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key_value() {
        let tag: Tag = "owner=platform".parse().unwrap();
        assert_eq!(tag.key, "owner");
        assert_eq!(tag.value, "platform");
    }

    #[test]
    fn test_empty_value_allowed() {
        let tag = Tag::parse("scratch=").unwrap();
        assert_eq!(tag.value, "");
    }

    #[test]
    fn test_malformed_tokens() {
        for token in ["owner", "a=b=c", "=value", ""] {
            assert!(
                matches!(Tag::parse(token), Err(IacError::MalformedTag { .. })),
                "token {:?} should be rejected",
                token
            );
        }
    }
}
