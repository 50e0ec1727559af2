use cogex_core::{media_type_of, MediaBuffer, MediaResolver};
use std::collections::HashMap;
use std::io;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;
pub use string_cache::DefaultAtom as Atom;

/// Media loaded into memory ahead of a trial, keyed by source reference.
#[derive(Debug, Default)]
pub struct PreloadCache {
    next_id: u64,
    buffers: HashMap<Atom, MediaBuffer>,
}

impl PreloadCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `bytes` under `reference`, replacing any earlier buffer.
    pub fn insert(&mut self, reference: &str, bytes: impl Into<Arc<[u8]>>) -> MediaBuffer {
        let buffer = MediaBuffer {
            id: self.next_id,
            mime: format!("video/{}", media_type_of(reference)),
            bytes: bytes.into(),
        };
        self.next_id += 1;
        debug!(reference, id = buffer.id, len = buffer.len(), "media preloaded");
        self.buffers.insert(Atom::from(reference), buffer.clone());
        buffer
    }

    /// Reads `path` from disk and stores it under `reference`.
    pub fn load_file(&mut self, reference: &str, path: &Path) -> io::Result<MediaBuffer> {
        let bytes = std::fs::read(path)?;
        Ok(self.insert(reference, bytes))
    }

    pub fn contains(&self, reference: &str) -> bool {
        self.buffers.contains_key(&Atom::from(reference))
    }

    pub fn len(&self) -> usize {
        self.buffers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }
}

impl MediaResolver for PreloadCache {
    fn preloaded_buffer(&self, reference: &str) -> Option<MediaBuffer> {
        self.buffers.get(&Atom::from(reference)).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::PreloadCache;
    use cogex_core::MediaResolver;
    use std::io::Write;

    #[test]
    fn preloaded_reference_resolves_to_shared_buffer() {
        let mut cache = PreloadCache::new();
        let stored = cache.insert("clips/a.MP4", vec![1u8, 2, 3]);
        let found = cache.preloaded_buffer("clips/a.MP4").unwrap();
        assert_eq!(found, stored);
        assert_eq!(found.mime, "video/mp4");
        assert_eq!(&*found.bytes, &[1, 2, 3]);
        assert_eq!(found.uri(), "cogex-buffer:0");
    }

    #[test]
    fn unknown_reference_is_not_preloaded() {
        let cache = PreloadCache::new();
        assert!(cache.preloaded_buffer("missing.webm").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn reinserting_replaces_buffer() {
        let mut cache = PreloadCache::new();
        cache.insert("a.webm", vec![0u8]);
        cache.insert("a.webm", vec![9u8, 9]);
        assert_eq!(cache.len(), 1);
        let buffer = cache.preloaded_buffer("a.webm").unwrap();
        assert_eq!(buffer.id, 1);
        assert_eq!(buffer.len(), 2);
    }

    #[test]
    fn load_file_reads_bytes_from_disk() {
        let mut file = tempfile::Builder::new().suffix(".webm").tempfile().unwrap();
        file.write_all(b"webm-bytes").unwrap();

        let mut cache = PreloadCache::new();
        let buffer = cache.load_file("clip.webm", file.path()).unwrap();
        assert_eq!(&*buffer.bytes, b"webm-bytes");
        assert_eq!(buffer.mime, "video/webm");
        assert!(cache.contains("clip.webm"));
    }

    #[test]
    fn load_file_reports_missing_file() {
        let mut cache = PreloadCache::new();
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.webm");
        assert!(cache.load_file("x.webm", &missing).is_err());
        assert!(!cache.contains("x.webm"));
    }
}
