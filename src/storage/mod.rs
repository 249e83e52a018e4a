//! Append-only log storage
//!
//! Persistent state lives in numbered data files, each a dense sequence of
//! checksummed records. Updates and deletes both append; nothing is ever
//! rewritten in place.
//!
//! # Design principles
//!
//! - Append-only, no in-place updates
//! - Checksum-verified on every read
//! - Latest record wins for the same key
//! - One active (writable) file; older files are immutable

mod checksum;
mod data_file;
mod record;

pub use checksum::{compute_checksum, verify_checksum};
pub use data_file::{data_file_name, DataFile, DATA_FILE_NAME_SUFFIX};
pub use record::{
    decode_log_record_header, encode_log_record, log_record_crc, LogRecord, LogRecordHeader,
    LogRecordPosition, LogRecordType, MAX_LOG_RECORD_HEADER_SIZE,
};
