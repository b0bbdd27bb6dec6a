//! Container lookup and decompression with a run-scoped memo cache.
//!
//! Documents live packed inside compressed containers: one container holds
//! many documents' JSON payloads at different byte offsets. The index maps a
//! lookup token to a `(containerId, offset, length)` triple, and the store
//! hands back the raw container bytes. [`ContainerCache`] decompresses each
//! container once per conversion run and memoizes the result; callers control
//! memory growth with [`ContainerCache::clear`] between batches.

use std::collections::HashMap;
use std::io::Read;
use std::sync::Arc;

use flate2::read::ZlibDecoder;
use tracing::{debug, trace};

use crate::Result;

/// Byte range of one document inside a container.
///
/// Produced by an index lookup keyed by lookup token; immutable once read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerRef {
    /// Identifier of the container blob holding the document.
    pub container_id: i64,
    /// Byte offset of the document inside the decompressed container.
    pub offset: usize,
    /// Byte length of the document slice.
    pub length: usize,
}

/// Token-to-byte-range lookup, backed by the docset's index store.
///
/// Implementations wrap whatever key-value storage the archive uses (an
/// indexed SQLite table, in practice). A miss is `Ok(None)`, never an error;
/// the caller may fall back to remote retrieval.
pub trait ContainerIndex {
    /// Look up the container reference for a lookup token.
    fn lookup(&self, token: &str) -> Result<Option<ContainerRef>>;
}

/// Raw (still compressed) container payload access.
///
/// Implementations wrap a filesystem or blob store. A container absent from
/// the store is `Ok(None)`; I/O failure on a container that exists is the
/// error case.
pub trait ContainerStore {
    /// Read the raw bytes of a container, or `None` if it does not exist.
    fn read_container(&self, container_id: i64) -> Result<Option<Vec<u8>>>;
}

/// Memoizing decompressor for container payloads.
///
/// The first materialization of a container inflates it and caches the
/// buffer; subsequent calls return the cached bytes. The cache grows without
/// bound until [`clear`](Self::clear) is called, so callers batching large
/// conversions should clear between batches.
#[derive(Debug, Default)]
pub struct ContainerCache {
    containers: HashMap<i64, Arc<[u8]>>,
}

impl ContainerCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Decompressed bytes for `container_id`, memoized.
    ///
    /// Payloads that do not inflate as zlib are returned as-is: containers
    /// occasionally hold raw bytes such as embedded images, and that is not
    /// an error. Returns `Ok(None)` when the store has no such container.
    pub fn materialize(
        &mut self,
        store: &dyn ContainerStore,
        container_id: i64,
    ) -> Result<Option<Arc<[u8]>>> {
        if let Some(bytes) = self.containers.get(&container_id) {
            trace!(container_id, "container cache hit");
            return Ok(Some(Arc::clone(bytes)));
        }

        let Some(raw) = store.read_container(container_id)? else {
            debug!(container_id, "container missing from store");
            return Ok(None);
        };

        let bytes: Arc<[u8]> = match inflate(&raw) {
            Some(decompressed) => decompressed.into(),
            None => {
                debug!(container_id, "payload is not zlib-compressed, keeping raw bytes");
                raw.into()
            },
        };
        self.containers.insert(container_id, Arc::clone(&bytes));
        Ok(Some(bytes))
    }

    /// Drop every cached container buffer.
    pub fn clear(&mut self) {
        self.containers.clear();
    }

    /// Number of containers currently cached.
    #[must_use]
    pub fn len(&self) -> usize {
        self.containers.len()
    }

    /// Whether the cache holds no containers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.containers.is_empty()
    }
}

fn inflate(raw: &[u8]) -> Option<Vec<u8>> {
    let mut decoder = ZlibDecoder::new(raw);
    let mut out = Vec::new();
    match decoder.read_to_end(&mut out) {
        Ok(_) => Some(out),
        Err(_) => None,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::ZlibEncoder;
    use std::cell::Cell;
    use std::io::Write;

    struct CountingStore {
        payload: Vec<u8>,
        reads: Cell<usize>,
    }

    impl ContainerStore for CountingStore {
        fn read_container(&self, container_id: i64) -> Result<Option<Vec<u8>>> {
            if container_id != 1 {
                return Ok(None);
            }
            self.reads.set(self.reads.get() + 1);
            Ok(Some(self.payload.clone()))
        }
    }

    fn compress(data: &[u8]) -> Vec<u8> {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn test_materialize_inflates_zlib_payload() {
        let store = CountingStore {
            payload: compress(b"hello containers"),
            reads: Cell::new(0),
        };
        let mut cache = ContainerCache::new();

        let bytes = cache.materialize(&store, 1).unwrap().unwrap();
        assert_eq!(&bytes[..], b"hello containers");
    }

    #[test]
    fn test_materialize_memoizes_per_container() {
        let store = CountingStore {
            payload: compress(b"cached once"),
            reads: Cell::new(0),
        };
        let mut cache = ContainerCache::new();

        let first = cache.materialize(&store, 1).unwrap().unwrap();
        let second = cache.materialize(&store, 1).unwrap().unwrap();
        assert_eq!(first, second);
        assert_eq!(store.reads.get(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_materialize_falls_back_to_raw_bytes() {
        // An embedded image is stored uncompressed; inflation fails and the
        // raw payload comes back untouched.
        let store = CountingStore {
            payload: b"\x89PNG not actually zlib".to_vec(),
            reads: Cell::new(0),
        };
        let mut cache = ContainerCache::new();

        let bytes = cache.materialize(&store, 1).unwrap().unwrap();
        assert_eq!(&bytes[..], b"\x89PNG not actually zlib");
    }

    #[test]
    fn test_materialize_missing_container_is_none() {
        let store = CountingStore {
            payload: Vec::new(),
            reads: Cell::new(0),
        };
        let mut cache = ContainerCache::new();

        assert!(cache.materialize(&store, 42).unwrap().is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_clear_evicts_everything() {
        let store = CountingStore {
            payload: compress(b"evict me"),
            reads: Cell::new(0),
        };
        let mut cache = ContainerCache::new();

        cache.materialize(&store, 1).unwrap();
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(cache.is_empty());

        cache.materialize(&store, 1).unwrap();
        assert_eq!(store.reads.get(), 2);
    }
}
