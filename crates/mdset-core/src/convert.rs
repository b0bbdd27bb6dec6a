//! Entry-level conversion: request key in, rendered markdown document out.
//!
//! [`Converter`] wires the pipeline together: key codec, container lookup,
//! decompression cache, byte-range extraction, and rendering with the
//! language-availability index. Each entry is a pure, synchronous
//! transformation; the converter only accumulates [`ConvertStats`] so the
//! orchestration layer can report failed versus successful entries.

use std::path::PathBuf;

use tracing::debug;

use crate::config::ConvertOptions;
use crate::container::{ContainerIndex, ContainerStore};
use crate::extract::{DocsetReader, RemoteSource};
use crate::key;
use crate::render::{RenderedDocument, render_document};
use crate::resolve::{LanguageIndex, SourceContext, document_relative_path};
use crate::Result;

/// Per-run conversion counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConvertStats {
    /// Entries rendered successfully.
    pub converted: u64,
    /// Entries with no local (or remote) document.
    pub missing: u64,
    /// Entries that raised a hard error.
    pub failed: u64,
}

/// Converts documentation entries to markdown documents.
pub struct Converter<I, S> {
    reader: DocsetReader<I, S>,
    language_index: LanguageIndex,
    options: ConvertOptions,
    remote: Option<Box<dyn RemoteSource>>,
    stats: ConvertStats,
}

impl<I: ContainerIndex, S: ContainerStore> Converter<I, S> {
    /// Create a converter over the docset's index and container store.
    ///
    /// `language_index` must be built from the full entry catalogue before
    /// any rendering begins; it is read-only afterwards.
    pub fn new(index: I, store: S, language_index: LanguageIndex) -> Self {
        Self {
            reader: DocsetReader::new(index, store),
            language_index,
            options: ConvertOptions::default(),
            remote: None,
            stats: ConvertStats::default(),
        }
    }

    /// Replace the conversion options.
    #[must_use]
    pub fn with_options(mut self, options: ConvertOptions) -> Self {
        self.options = options;
        self
    }

    /// Attach a remote fallback, consulted when local extraction yields
    /// nothing. Only takes effect when the options enable it.
    #[must_use]
    pub fn with_remote(mut self, remote: Box<dyn RemoteSource>) -> Self {
        self.remote = Some(remote);
        self
    }

    /// Render the entry addressed by a request key.
    ///
    /// Returns `Ok(None)` when no document can be found locally (or
    /// remotely, when the fallback is enabled). The entry's natural language
    /// comes from the key's prefix.
    ///
    /// # Errors
    ///
    /// [`crate::Error::InvalidKeyFormat`] for an unrecognized language
    /// prefix, or I/O errors from the collaborators. Hard errors are also
    /// counted in [`stats`](Self::stats).
    pub fn render_entry(&mut self, request_key: &str) -> Result<Option<RenderedDocument>> {
        match self.render_entry_inner(request_key) {
            Ok(Some(document)) => {
                self.stats.converted += 1;
                Ok(Some(document))
            },
            Ok(None) => {
                self.stats.missing += 1;
                Ok(None)
            },
            Err(err) => {
                self.stats.failed += 1;
                Err(err)
            },
        }
    }

    fn render_entry_inner(&mut self, request_key: &str) -> Result<Option<RenderedDocument>> {
        let decoded = key::decode(request_key)?;

        let tree = match self.reader.document_for_key(request_key)? {
            Some(tree) => tree,
            None => {
                let remote = self
                    .remote
                    .as_ref()
                    .filter(|_| self.options.remote_fallback);
                match remote.and_then(|r| r.fetch(request_key)) {
                    Some(tree) => {
                        debug!(request_key, "local extraction empty, remote fallback hit");
                        tree
                    },
                    None => return Ok(None),
                }
            },
        };

        let source = SourceContext::from_request_key(request_key)?;
        Ok(Some(render_document(
            &tree,
            decoded.language,
            Some(&source),
            &self.language_index,
        )))
    }

    /// Absolute output path for a request key under the configured root.
    ///
    /// Uses the same sanitization as link resolution, so written paths and
    /// computed links agree.
    ///
    /// # Errors
    ///
    /// [`crate::Error::InvalidKeyFormat`] for keys outside the
    /// documentation tree.
    pub fn output_path(&self, request_key: &str) -> Result<PathBuf> {
        Ok(self.options.output_dir.join(document_relative_path(request_key)?))
    }

    /// Conversion counters accumulated so far.
    #[must_use]
    pub const fn stats(&self) -> ConvertStats {
        self.stats
    }

    /// Evict all cached container buffers, bounding memory between batches.
    pub fn clear_cache(&mut self) {
        self.reader.clear_cache();
    }

    /// The language-availability index used during rendering.
    #[must_use]
    pub const fn language_index(&self) -> &LanguageIndex {
        &self.language_index
    }
}

impl<I, S> std::fmt::Debug for Converter<I, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Converter")
            .field("options", &self.options)
            .field("stats", &self.stats)
            .field("remote", &self.remote.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::container::ContainerRef;
    use crate::document::DocumentTree;
    use std::collections::HashMap;

    struct MapIndex(HashMap<String, ContainerRef>);

    impl ContainerIndex for MapIndex {
        fn lookup(&self, token: &str) -> Result<Option<ContainerRef>> {
            Ok(self.0.get(token).copied())
        }
    }

    struct MapStore(HashMap<i64, Vec<u8>>);

    impl ContainerStore for MapStore {
        fn read_container(&self, container_id: i64) -> Result<Option<Vec<u8>>> {
            Ok(self.0.get(&container_id).cloned())
        }
    }

    struct StubRemote;

    impl RemoteSource for StubRemote {
        fn fetch(&self, request_key: &str) -> Option<DocumentTree> {
            (request_key == "ls/documentation/uikit/uiscene").then(|| {
                serde_json::from_str(r#"{"metadata": {"title": "UIScene", "role": "symbol"}}"#)
                    .unwrap()
            })
        }
    }

    fn empty_converter() -> Converter<MapIndex, MapStore> {
        Converter::new(
            MapIndex(HashMap::new()),
            MapStore(HashMap::new()),
            LanguageIndex::new(),
        )
    }

    #[test]
    fn test_missing_entry_counts_as_missing() {
        let mut converter = empty_converter();
        let result = converter
            .render_entry("ls/documentation/uikit/uiwindow")
            .unwrap();
        assert!(result.is_none());
        assert_eq!(converter.stats().missing, 1);
        assert_eq!(converter.stats().converted, 0);
    }

    #[test]
    fn test_invalid_key_counts_as_failed() {
        let mut converter = empty_converter();
        let err = converter
            .render_entry("zz/documentation/uikit/uiwindow")
            .unwrap_err();
        assert_eq!(err.category(), "invalid_key");
        assert_eq!(converter.stats().failed, 1);
    }

    #[test]
    fn test_remote_fallback_requires_opt_in() {
        let mut converter = empty_converter().with_remote(Box::new(StubRemote));
        let result = converter
            .render_entry("ls/documentation/uikit/uiscene")
            .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_remote_fallback_when_enabled() {
        let options = ConvertOptions {
            remote_fallback: true,
            ..ConvertOptions::default()
        };
        let mut converter = empty_converter()
            .with_options(options)
            .with_remote(Box::new(StubRemote));

        let document = converter
            .render_entry("ls/documentation/uikit/uiscene")
            .unwrap()
            .unwrap();
        assert_eq!(document.title, "UIScene");
        assert_eq!(converter.stats().converted, 1);
    }

    #[test]
    fn test_output_path_uses_configured_root() {
        let options = ConvertOptions {
            output_dir: PathBuf::from("/tmp/out"),
            ..ConvertOptions::default()
        };
        let converter = empty_converter().with_options(options);
        assert_eq!(
            converter
                .output_path("ls/documentation/uikit/uiwindow")
                .unwrap(),
            PathBuf::from("/tmp/out/swift/uikit/uiwindow.md")
        );
    }
}
