//! Byte-range extraction: slice a container, parse JSON, sanity-check.
//!
//! The composition here is deliberately short-circuiting: key → token →
//! container reference → decompressed container → document slice, and any
//! stage that comes up empty yields `Ok(None)` up the chain. Imperfect
//! archives routinely contain offset/length pairs pointing at unrelated or
//! corrupted regions, so a slice that fails to parse is treated exactly like
//! a missing entry.

use tracing::debug;

use crate::container::{ContainerCache, ContainerIndex, ContainerStore};
use crate::document::DocumentTree;
use crate::{Result, key};

/// Slice `[offset, offset + length)` out of a decompressed container and
/// parse it as a document.
///
/// Returns `None` when the range is out of bounds, the slice is not valid
/// JSON, or the parsed value lacks both `metadata` and `schemaVersion` (the
/// minimal structural markers of a real document).
#[must_use]
pub fn extract_document(container: &[u8], offset: usize, length: usize) -> Option<DocumentTree> {
    let end = offset.checked_add(length)?;
    let slice = container.get(offset..end)?;

    let tree: DocumentTree = match serde_json::from_slice(slice) {
        Ok(tree) => tree,
        Err(err) => {
            debug!(offset, length, error = %err, "slice is not a JSON document");
            return None;
        },
    };

    if tree.metadata.is_none() && tree.schema_version.is_none() {
        debug!(offset, length, "slice parsed but lacks document markers");
        return None;
    }

    Some(tree)
}

/// Pulls documents out of a docset by request key.
///
/// Owns the run-scoped [`ContainerCache`]; the index and store collaborators
/// are injected so the core stays independent of the on-disk table layout.
#[derive(Debug)]
pub struct DocsetReader<I, S> {
    index: I,
    store: S,
    cache: ContainerCache,
}

impl<I: ContainerIndex, S: ContainerStore> DocsetReader<I, S> {
    /// Create a reader over an index and a container store.
    pub fn new(index: I, store: S) -> Self {
        Self {
            index,
            store,
            cache: ContainerCache::new(),
        }
    }

    /// Extract the document addressed by a request key.
    ///
    /// Returns `Ok(None)` when the token has no index entry, the container
    /// is absent, or the byte range does not hold a parseable document.
    ///
    /// # Errors
    ///
    /// [`crate::Error::InvalidKeyFormat`] for an unrecognized language
    /// prefix, or I/O errors from the collaborators.
    pub fn document_for_key(&mut self, request_key: &str) -> Result<Option<DocumentTree>> {
        let token = key::token(request_key)?;

        let Some(container_ref) = self.index.lookup(&token)? else {
            debug!(%token, request_key, "no container mapping for token");
            return Ok(None);
        };

        let Some(bytes) = self
            .cache
            .materialize(&self.store, container_ref.container_id)?
        else {
            return Ok(None);
        };

        Ok(extract_document(
            &bytes,
            container_ref.offset,
            container_ref.length,
        ))
    }

    /// Evict all cached container buffers.
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    /// Number of containers held by the run-scoped cache.
    #[must_use]
    pub fn cached_containers(&self) -> usize {
        self.cache.len()
    }
}

/// Optional fallback collaborator fetching a document remotely.
///
/// Invoked only when local extraction yields nothing and the caller opted
/// in. Returns the same document shape as local extraction, or `None`.
pub trait RemoteSource {
    /// Fetch the document for a request key, if available.
    fn fetch(&self, request_key: &str) -> Option<DocumentTree>;
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::container::ContainerRef;
    use std::collections::HashMap;

    const MINIMAL_DOC: &[u8] = br#"{"metadata": {"title": "UIWindow"}}"#;

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

    #[test]
    fn test_extract_document_happy_path() {
        let mut container = b"garbage-prefix".to_vec();
        let offset = container.len();
        container.extend_from_slice(MINIMAL_DOC);

        let tree = extract_document(&container, offset, MINIMAL_DOC.len()).unwrap();
        assert_eq!(
            tree.metadata.unwrap().title.as_deref(),
            Some("UIWindow")
        );
    }

    #[test]
    fn test_extract_document_rejects_out_of_bounds_range() {
        assert!(extract_document(MINIMAL_DOC, 10, usize::MAX).is_none());
        assert!(extract_document(MINIMAL_DOC, MINIMAL_DOC.len() + 1, 4).is_none());
    }

    #[test]
    fn test_extract_document_rejects_non_json_slice() {
        let container = b"this is not json at all";
        assert!(extract_document(container, 0, container.len()).is_none());
    }

    #[test]
    fn test_extract_document_rejects_unmarked_json() {
        // Valid JSON, but neither metadata nor schemaVersion: most likely an
        // unrelated region of the container.
        let container = br#"{"some": "other", "shape": true}"#;
        assert!(extract_document(container, 0, container.len()).is_none());
    }

    #[test]
    fn test_extract_document_accepts_schema_version_marker() {
        let container = br#"{"schemaVersion": {"major": 0, "minor": 3, "patch": 0}}"#;
        assert!(extract_document(container, 0, container.len()).is_some());
    }

    #[test]
    fn test_reader_short_circuits_on_unknown_token() {
        let mut reader = DocsetReader::new(MapIndex(HashMap::new()), MapStore(HashMap::new()));
        let result = reader
            .document_for_key("ls/documentation/uikit/uiwindow")
            .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_reader_short_circuits_on_missing_container() {
        let token = key::token("ls/documentation/uikit/uiwindow").unwrap();
        let index = MapIndex(HashMap::from([(
            token,
            ContainerRef {
                container_id: 9,
                offset: 0,
                length: MINIMAL_DOC.len(),
            },
        )]));
        let mut reader = DocsetReader::new(index, MapStore(HashMap::new()));

        let result = reader
            .document_for_key("ls/documentation/uikit/uiwindow")
            .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_reader_propagates_invalid_key_format() {
        let mut reader = DocsetReader::new(MapIndex(HashMap::new()), MapStore(HashMap::new()));
        let err = reader
            .document_for_key("zz/documentation/uikit/uiwindow")
            .unwrap_err();
        assert_eq!(err.category(), "invalid_key");
    }

    #[test]
    fn test_reader_finds_document_in_raw_container() {
        // Store holds the container uncompressed; the cache falls back to
        // raw bytes and extraction still works.
        let token = key::token("ls/documentation/uikit/uiwindow").unwrap();
        let index = MapIndex(HashMap::from([(
            token,
            ContainerRef {
                container_id: 1,
                offset: 0,
                length: MINIMAL_DOC.len(),
            },
        )]));
        let store = MapStore(HashMap::from([(1, MINIMAL_DOC.to_vec())]));
        let mut reader = DocsetReader::new(index, store);

        let tree = reader
            .document_for_key("ls/documentation/uikit/uiwindow")
            .unwrap()
            .unwrap();
        assert_eq!(tree.metadata.unwrap().title.as_deref(), Some("UIWindow"));
        assert_eq!(reader.cached_containers(), 1);
    }
}
