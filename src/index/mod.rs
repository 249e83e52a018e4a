//! In-memory key index
//!
//! The index is derived state: it maps every live key to the on-disk
//! position of its most recent record and is rebuilt from the data files on
//! startup. Nothing in here is persisted.
//!
//! # Design principles
//!
//! - Derived state: the log is the source of truth, never the index
//! - Updates occur after the corresponding append succeeds
//! - Safe for concurrent readers; writers are serialized by the engine

mod btree;

pub use btree::BTreeIndex;

use crate::options::IndexType;
use crate::storage::LogRecordPosition;

/// Key-to-position map contract, pluggable per [`IndexType`].
pub trait Indexer: Send + Sync {
    /// Inserts or replaces the position for `key`. Returns true on success;
    /// replacing an existing entry is a success.
    fn put(&self, key: Vec<u8>, pos: LogRecordPosition) -> bool;

    /// Looks up the position for `key`.
    fn get(&self, key: &[u8]) -> Option<LogRecordPosition>;

    /// Removes the entry for `key`. Returns false when the key was absent.
    fn delete(&self, key: &[u8]) -> bool;
}

/// Constructs the index backend for the given type.
///
/// # Panics
///
/// Panics for [`IndexType::Art`], which is a reserved tag without a backend.
pub fn new_indexer(index_type: IndexType) -> Box<dyn Indexer> {
    match index_type {
        IndexType::BTree => Box::new(BTreeIndex::new()),
        IndexType::Art => unimplemented!("adaptive radix tree index"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_builds_btree() {
        let index = new_indexer(IndexType::BTree);
        let pos = LogRecordPosition {
            file_id: 0,
            offset: 0,
        };
        assert!(index.put(b"k".to_vec(), pos));
        assert_eq!(index.get(b"k"), Some(pos));
    }

    #[test]
    #[should_panic]
    fn test_factory_panics_on_reserved_tag() {
        let _ = new_indexer(IndexType::Art);
    }
}
