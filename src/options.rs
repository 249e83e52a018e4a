//! Engine configuration
//!
//! Options are validated once at [`crate::Engine::open`] and immutable for
//! the lifetime of the instance.

use std::path::PathBuf;

use crate::errors::{Error, Result};

/// In-memory index backend selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(i8)]
pub enum IndexType {
    /// Ordered B-tree map. Supports future range iteration.
    #[default]
    BTree = 1,
    /// Adaptive radix tree. Reserved; not implemented.
    Art = 2,
}

/// Configuration for an [`crate::Engine`] instance.
#[derive(Debug, Clone)]
pub struct Options {
    /// Directory holding the data files
    pub dir_path: PathBuf,

    /// Maximum bytes per data file before rotation
    pub data_file_size: i64,

    /// Fsync the active file on every write when true
    pub sync_writes: bool,

    /// In-memory index backend
    pub index_type: IndexType,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            dir_path: std::env::temp_dir().join("siriuskv"),
            data_file_size: 256 * 1024 * 1024,
            sync_writes: false,
            index_type: IndexType::BTree,
        }
    }
}

impl Options {
    /// Checks the enumerated fields, leaving the options untouched.
    pub(crate) fn validate(&self) -> Result<()> {
        if self.dir_path.as_os_str().is_empty() {
            return Err(Error::DirPathIsEmpty);
        }
        if self.data_file_size <= 0 {
            return Err(Error::DataFileSizeZero);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let opts = Options::default();
        assert_eq!(opts.data_file_size, 256 * 1024 * 1024);
        assert!(!opts.sync_writes);
        assert_eq!(opts.index_type, IndexType::BTree);
        assert!(!opts.dir_path.as_os_str().is_empty());
    }

    #[test]
    fn test_empty_dir_path_rejected() {
        let opts = Options {
            dir_path: PathBuf::new(),
            ..Default::default()
        };
        assert!(matches!(opts.validate(), Err(Error::DirPathIsEmpty)));
    }

    #[test]
    fn test_non_positive_file_size_rejected() {
        for size in [0, -1] {
            let opts = Options {
                data_file_size: size,
                ..Default::default()
            };
            assert!(matches!(opts.validate(), Err(Error::DataFileSizeZero)));
        }
    }

    #[test]
    fn test_index_type_defaults_to_btree() {
        assert_eq!(IndexType::default(), IndexType::BTree);
    }
}
