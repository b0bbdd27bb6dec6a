//! Error types and handling for mdset-core operations.
//!
//! The conversion pipeline distinguishes sharply between *missing* data and
//! *broken* contracts. Partial archives are expected and normal, so every
//! "not found" condition (unknown lookup token, absent container, byte range
//! pointing at garbage) surfaces as `Ok(None)` from the pipeline stages, never
//! as an error. Errors are reserved for the few conditions that indicate a
//! real fault:
//!
//! - **I/O errors** on a container that is expected to exist
//! - **Invalid key format**: an unrecognized language prefix on a request key
//!   is an upstream contract violation, not a missing document
//! - **Configuration errors**: malformed options files
//!
//! Errors carry a [`category`](Error::category) for logging and per-entry
//! failure accounting in the orchestration layer.

use thiserror::Error;

/// The main error type for mdset-core operations.
///
/// All fallible public functions in mdset-core return `Result<T, Error>`.
/// Note that "document not found" is *not* an error anywhere in this crate;
/// pipeline stages return `Ok(None)` for missing or malformed entries.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation failed.
    ///
    /// Raised only for containers and files that are expected to exist.
    /// A container absent from the store is a `None`, not an `Io` error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A request key's language prefix is not one of the recognized tags.
    ///
    /// This is the one hard error at the key-codec boundary: the lookup
    /// table was generated with a fixed set of prefixes, so an unknown
    /// prefix means the caller handed us a key from a different universe.
    #[error("invalid request key '{0}': unrecognized language prefix")]
    InvalidKeyFormat(String),

    /// Storage-level failure beyond basic file I/O.
    ///
    /// Covers corrupt index rows and inconsistent container metadata.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Requested resource was not found where it was required to exist.
    ///
    /// Used sparingly; most lookups model absence as `Option` instead.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Configuration is invalid or inaccessible.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization or deserialization failed.
    ///
    /// Note that a JSON parse failure on an extracted byte range is *not*
    /// reported through this variant; the extractor treats it as "not found"
    /// because offset/length pairs occasionally point at unrelated regions
    /// in imperfect archives.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic error for uncategorized failures.
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl Error {
    /// Get the error category as a string identifier.
    ///
    /// Useful for grouping per-entry failures when the orchestration layer
    /// reports conversion statistics.
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match self {
            Self::Io(_) => "io",
            Self::InvalidKeyFormat(_) => "invalid_key",
            Self::Storage(_) => "storage",
            Self::NotFound(_) => "not_found",
            Self::Config(_) => "config",
            Self::Serialization(_) => "serialization",
            Self::Other(_) => "other",
        }
    }
}

/// Convenience type alias for `std::result::Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
