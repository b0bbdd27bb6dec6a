//! Request-key codec: language prefixes, canonical paths, and lookup tokens.
//!
//! A request key is a symbolic identifier of the form
//! `<langTag>/documentation/<seg1>/<seg2>/...`, where the 2-character
//! language tag selects the natural language of the entry (`ls` for Swift,
//! `lo` for Objective-C). The codec turns such a key into the fixed-length
//! token the docset's lookup table is keyed by.
//!
//! The token scheme is a compatibility contract with the archive format, not
//! an internal choice: the lookup table on disk was generated as
//! `prefix + base64url(first 6 bytes of SHA-1(canonical path))`, so this
//! module must be bit-exact with that scheme or every lookup misses.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};

use crate::{Error, Result};

/// Length of every lookup token: 2-character prefix + 8 base64url characters.
pub const TOKEN_LEN: usize = 10;

/// Natural language a documentation entry is written for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Language {
    /// The primary language (request-key prefix `ls`).
    Swift,
    /// The secondary language (request-key prefix `lo`).
    ObjectiveC,
}

impl Language {
    /// The 2-character request-key prefix for this language.
    #[must_use]
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Swift => "ls",
            Self::ObjectiveC => "lo",
        }
    }

    /// The other language, used for cross-language link fallback.
    #[must_use]
    pub const fn other(self) -> Self {
        match self {
            Self::Swift => Self::ObjectiveC,
            Self::ObjectiveC => Self::Swift,
        }
    }

    /// Top-level output directory name for documents in this language.
    #[must_use]
    pub const fn dir_name(self) -> &'static str {
        match self {
            Self::Swift => "swift",
            Self::ObjectiveC => "objective-c",
        }
    }

    /// The language name used in declaration `languages` lists.
    #[must_use]
    pub const fn declaration_name(self) -> &'static str {
        match self {
            Self::Swift => "swift",
            Self::ObjectiveC => "occ",
        }
    }

    /// Fence tag for declaration code blocks in rendered markdown.
    #[must_use]
    pub const fn fence_tag(self) -> &'static str {
        match self {
            Self::Swift => "swift",
            Self::ObjectiveC => "objc",
        }
    }

    /// Map a request-key prefix back to a language.
    #[must_use]
    pub fn from_prefix(prefix: &str) -> Option<Self> {
        match prefix {
            "ls" => Some(Self::Swift),
            "lo" => Some(Self::ObjectiveC),
            _ => None,
        }
    }
}

/// A request key decoded into its structural parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedKey {
    /// Natural language the key addresses.
    pub language: Language,
    /// The `/`-joined path after the language tag, lower-cased for
    /// case-insensitive matching. Example: `documentation/uikit/uiwindow`.
    pub canonical_path: String,
}

/// Decode a request key into language and canonical path.
///
/// # Errors
///
/// Returns [`Error::InvalidKeyFormat`] when the key has no `/` separator or
/// its 2-character prefix is not a recognized language tag. This is a hard
/// error: it indicates a data-contract violation upstream, not a missing
/// document.
pub fn decode(key: &str) -> Result<DecodedKey> {
    let (prefix, rest) = key
        .split_once('/')
        .ok_or_else(|| Error::InvalidKeyFormat(key.to_string()))?;
    let language =
        Language::from_prefix(prefix).ok_or_else(|| Error::InvalidKeyFormat(key.to_string()))?;
    Ok(DecodedKey {
        language,
        canonical_path: rest.to_ascii_lowercase(),
    })
}

/// Compute the 10-character lookup token for a request key.
///
/// The token is the language prefix followed by the base64url encoding
/// (no padding) of the first 6 bytes of the SHA-1 digest of the canonical
/// path. Same key always yields the same token; the same path under the
/// other language tag yields a different token via the prefix.
///
/// # Errors
///
/// Returns [`Error::InvalidKeyFormat`] for an unrecognized language prefix.
pub fn token(key: &str) -> Result<String> {
    let decoded = decode(key)?;
    let digest = Sha1::digest(decoded.canonical_path.as_bytes());
    let mut token = String::with_capacity(TOKEN_LEN);
    token.push_str(decoded.language.prefix());
    token.push_str(&URL_SAFE_NO_PAD.encode(&digest[..6]));
    Ok(token)
}

/// The framework segment of a request key: the path segment immediately
/// following `documentation/`, if any.
#[must_use]
pub fn framework_of(key: &str) -> Option<&str> {
    let mut segments = key.split('/');
    let _prefix = segments.next()?;
    if segments.next()? != "documentation" {
        return None;
    }
    segments.next().filter(|s| !s.is_empty())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_decode_swift_key() {
        let decoded = decode("ls/documentation/uikit/UIWindow").unwrap();
        assert_eq!(decoded.language, Language::Swift);
        assert_eq!(decoded.canonical_path, "documentation/uikit/uiwindow");
    }

    #[test]
    fn test_decode_objc_key() {
        let decoded = decode("lo/documentation/foundation/nsstring").unwrap();
        assert_eq!(decoded.language, Language::ObjectiveC);
        assert_eq!(decoded.canonical_path, "documentation/foundation/nsstring");
    }

    #[test]
    fn test_decode_rejects_unknown_prefix() {
        let err = decode("xx/documentation/uikit/uiwindow").unwrap_err();
        assert_eq!(err.category(), "invalid_key");

        let err = decode("no-separator").unwrap_err();
        assert_eq!(err.category(), "invalid_key");
    }

    #[test]
    fn test_token_golden_value() {
        // Fixed on-disk contract: SHA-1("documentation/uikit/uiwindow")
        // truncated to 6 bytes and base64url-encoded without padding.
        let token = token("ls/documentation/uikit/uiwindow").unwrap();
        assert_eq!(token, "lsm-oLlKXO");
        assert_eq!(token.len(), TOKEN_LEN);
        assert!(token.starts_with("ls"));
    }

    #[test]
    fn test_token_case_insensitive() {
        let lower = token("ls/documentation/uikit/uiwindow").unwrap();
        let mixed = token("ls/Documentation/UIKit/UIWindow").unwrap();
        assert_eq!(lower, mixed);
    }

    #[test]
    fn test_token_differs_across_languages() {
        let swift = token("ls/documentation/uikit/uiwindow").unwrap();
        let objc = token("lo/documentation/uikit/uiwindow").unwrap();
        assert_ne!(swift, objc);
        // Same digest, different prefix.
        assert_eq!(swift[2..], objc[2..]);
    }

    #[test]
    fn test_framework_of() {
        assert_eq!(
            framework_of("ls/documentation/uikit/uiwindow"),
            Some("uikit")
        );
        assert_eq!(framework_of("ls/documentation/uikit"), Some("uikit"));
        assert_eq!(framework_of("ls/documentation"), None);
        assert_eq!(framework_of("ls/tutorials/uikit"), None);
    }

    #[test]
    fn test_language_round_trips() {
        for language in [Language::Swift, Language::ObjectiveC] {
            assert_eq!(Language::from_prefix(language.prefix()), Some(language));
            assert_eq!(language.other().other(), language);
        }
    }

    proptest! {
        #[test]
        fn test_token_is_deterministic_and_fixed_length(path in "[a-z0-9/_.-]{1,120}") {
            let key = format!("ls/{path}");
            let first = token(&key).unwrap();
            let second = token(&key).unwrap();
            prop_assert_eq!(&first, &second);
            prop_assert_eq!(first.len(), TOKEN_LEN);
            prop_assert!(first.starts_with("ls"));

            let other = token(&format!("lo/{path}")).unwrap();
            prop_assert_ne!(first, other);
        }
    }

    #[test]
    fn test_token_injective_over_corpus() {
        // Collision resistance sanity check over a generated corpus of keys.
        let mut seen = std::collections::HashMap::new();
        for framework in ["uikit", "appkit", "foundation", "coredata", "os"] {
            for i in 0..1_000 {
                for prefix in ["ls", "lo"] {
                    let key = format!("{prefix}/documentation/{framework}/symbol{i}");
                    let tok = token(&key).unwrap();
                    if let Some(previous) = seen.insert(tok.clone(), key.clone()) {
                        panic!("token collision between '{previous}' and '{key}'");
                    }
                }
            }
        }
        assert_eq!(seen.len(), 10_000);
    }
}
