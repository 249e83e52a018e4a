//! BTreeMap-backed index
//!
//! An ordered map keeps keys sorted, which leaves the door open for prefix
//! and range iteration without changing the engine.

use std::collections::BTreeMap;

use parking_lot::RwLock;

use crate::storage::LogRecordPosition;

use super::Indexer;

/// Ordered index over `BTreeMap<Vec<u8>, LogRecordPosition>`.
///
/// The internal lock makes mutation safe on its own; lookups from concurrent
/// readers only take the read side.
#[derive(Default)]
pub struct BTreeIndex {
    tree: RwLock<BTreeMap<Vec<u8>, LogRecordPosition>>,
}

impl BTreeIndex {
    /// Creates an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live keys.
    pub fn len(&self) -> usize {
        self.tree.read().len()
    }

    /// True when no keys are present.
    pub fn is_empty(&self) -> bool {
        self.tree.read().is_empty()
    }
}

impl Indexer for BTreeIndex {
    fn put(&self, key: Vec<u8>, pos: LogRecordPosition) -> bool {
        self.tree.write().insert(key, pos);
        true
    }

    fn get(&self, key: &[u8]) -> Option<LogRecordPosition> {
        self.tree.read().get(key).copied()
    }

    fn delete(&self, key: &[u8]) -> bool {
        self.tree.write().remove(key).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(file_id: u32, offset: i64) -> LogRecordPosition {
        LogRecordPosition { file_id, offset }
    }

    #[test]
    fn test_put_and_get() {
        let index = BTreeIndex::new();

        assert!(index.put(b"alice".to_vec(), pos(0, 0)));
        assert!(index.put(b"bob".to_vec(), pos(0, 15)));

        assert_eq!(index.get(b"alice"), Some(pos(0, 0)));
        assert_eq!(index.get(b"bob"), Some(pos(0, 15)));
        assert_eq!(index.get(b"carol"), None);
    }

    #[test]
    fn test_put_replaces_existing_entry() {
        let index = BTreeIndex::new();

        assert!(index.put(b"k".to_vec(), pos(0, 0)));
        assert!(index.put(b"k".to_vec(), pos(2, 128)));

        assert_eq!(index.get(b"k"), Some(pos(2, 128)));
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_delete() {
        let index = BTreeIndex::new();

        index.put(b"k".to_vec(), pos(0, 0));
        assert!(index.delete(b"k"));
        assert_eq!(index.get(b"k"), None);

        // Deleting an absent key reports false.
        assert!(!index.delete(b"k"));
    }

    #[test]
    fn test_concurrent_readers() {
        use std::sync::Arc;

        let index = Arc::new(BTreeIndex::new());
        for i in 0..100u32 {
            index.put(i.to_be_bytes().to_vec(), pos(0, i64::from(i) * 15));
        }

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let index = Arc::clone(&index);
                std::thread::spawn(move || {
                    for i in 0..100u32 {
                        let got = index.get(&i.to_be_bytes()).unwrap();
                        assert_eq!(got.offset, i64::from(i) * 15);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
    }
}
