//! Engine error types
//!
//! Every public operation returns [`Result`]. Operating-system I/O failures
//! are wrapped verbatim in [`Error::Io`]; everything else is an explicit
//! engine condition with a stable message.

use thiserror::Error;

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the storage engine
#[derive(Debug, Error)]
pub enum Error {
    /// Caller supplied a zero-length key to put/get/delete
    #[error("key is empty")]
    KeyIsEmpty,

    /// No live mapping for this key (absent or tombstoned)
    #[error("key not found")]
    KeyNotFound,

    /// The index backend rejected a mutation that should have succeeded
    #[error("index update failed")]
    IndexUpdateFailed,

    /// The index referenced a file id absent from the engine's open set
    #[error("data file not found")]
    DataFileNotFound,

    /// Option validation: empty data directory path
    #[error("dir path is empty")]
    DirPathIsEmpty,

    /// Option validation: non-positive data file size
    #[error("data file size must be greater than 0")]
    DataFileSizeZero,

    /// A file matching the data suffix has an unparseable id prefix
    #[error("data directory corrupted")]
    DataDirectoryCorrupted,

    /// Stored CRC does not match the record contents
    #[error("invalid record crc")]
    InvalidRecordCrc,

    /// End of a data file reached.
    ///
    /// Internal replay terminator; never returned by the public API.
    #[error("end of data file")]
    EndOfFile,

    /// Underlying I/O failure
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_are_stable() {
        assert_eq!(Error::KeyIsEmpty.to_string(), "key is empty");
        assert_eq!(Error::KeyNotFound.to_string(), "key not found");
        assert_eq!(Error::IndexUpdateFailed.to_string(), "index update failed");
        assert_eq!(Error::DataFileNotFound.to_string(), "data file not found");
        assert_eq!(Error::DirPathIsEmpty.to_string(), "dir path is empty");
        assert_eq!(
            Error::DataFileSizeZero.to_string(),
            "data file size must be greater than 0"
        );
        assert_eq!(
            Error::DataDirectoryCorrupted.to_string(),
            "data directory corrupted"
        );
    }

    #[test]
    fn test_io_error_is_wrapped_verbatim() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = Error::from(io);
        assert!(matches!(err, Error::Io(_)));
        assert!(err.to_string().contains("denied"));
    }
}
