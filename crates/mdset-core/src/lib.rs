//! # mdset-core
//!
//! Core functionality for mdset - converting structured documentation
//! archives ("docsets") into plain markdown trees.
//!
//! One documentation entry lives as a compact, offset-addressed JSON payload
//! inside a compressed blob. This crate turns such an entry into a fully
//! cross-linked markdown document:
//!
//! 1. **Key codec**: a symbolic request key becomes a deterministic lookup
//!    token plus structural metadata (language, framework, path segments)
//! 2. **Container lookup & decompression**: the token maps to a
//!    `(containerId, offset, length)` triple; containers decompress once per
//!    run into a memoized cache
//! 3. **Byte-range extraction**: the slice parses into a typed document tree
//! 4. **Rendering**: every block/inline node renders to markdown, with named
//!    references resolved through the per-document reference table
//! 5. **Link resolution**: each reference becomes the correct relative
//!    filesystem link, accounting for differing frameworks, differing
//!    natural languages, and differing directory depths
//!
//! The on-disk index layout, archive extraction, HTML conversion, and file
//! I/O are external collaborators behind the [`ContainerIndex`],
//! [`ContainerStore`], and [`RemoteSource`] traits.
//!
//! ## Quick Start
//!
//! ```rust
//! use mdset_core::{Language, LanguageIndex, render_document, DocumentTree};
//!
//! let tree: DocumentTree =
//!     serde_json::from_str(r#"{"metadata": {"title": "UIWindow", "role": "symbol"}}"#)?;
//! let index = LanguageIndex::new();
//! let doc = render_document(&tree, Language::Swift, None, &index);
//! assert!(doc.to_markdown().starts_with("# UIWindow"));
//! # Ok::<(), serde_json::Error>(())
//! ```
//!
//! ## Error Handling
//!
//! "Not found" is a typed value, not an exception: partial corpora are
//! expected, so every pipeline stage returns `Ok(None)` for missing or
//! malformed entries and short-circuits. Hard errors ([`Error`]) are
//! reserved for contract violations such as an unrecognized request-key
//! prefix and for I/O failures on data that must exist.

/// Conversion options, loadable from a TOML file
pub mod config;
/// Container lookup and the memoizing decompression cache
pub mod container;
/// Entry-level conversion pipeline and statistics
pub mod convert;
/// Typed model of a documentation entry's JSON payload
pub mod document;
/// Error types and result aliases
pub mod error;
/// Byte-range extraction and the docset reader composition
pub mod extract;
/// Request-key codec: language prefixes and lookup tokens
pub mod key;
/// Markdown rendering of document trees
pub mod render;
/// Relative-link resolution between rendered documents
pub mod resolve;

// Re-export commonly used types
pub use config::ConvertOptions;
pub use container::{ContainerCache, ContainerIndex, ContainerRef, ContainerStore};
pub use convert::{ConvertStats, Converter};
pub use document::{Block, DocumentTree, Inline, Reference};
pub use error::{Error, Result};
pub use extract::{DocsetReader, RemoteSource, extract_document};
pub use key::{DecodedKey, Language, TOKEN_LEN};
pub use render::{RenderedDocument, TopicGroup, TopicItem, render_document};
pub use resolve::{
    LanguageIndex, LanguageSet, SourceContext, document_relative_path, framework_display_name,
    resolve_link, sanitize_file_stem,
};
