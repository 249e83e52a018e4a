//! Data file: a single numbered append-only log
//!
//! Each data file holds a dense sequence of encoded records starting at
//! offset 0. Exactly one file (the largest id) accepts appends; files become
//! immutable once the engine rotates past them.

use std::path::{Path, PathBuf};

use crate::errors::{Error, Result};
use crate::fio::{FileIo, IoManager};

use super::record::{
    decode_log_record_header, log_record_crc, LogRecord, LogRecordType,
    MAX_LOG_RECORD_HEADER_SIZE,
};

/// Extension of every data file.
pub const DATA_FILE_NAME_SUFFIX: &str = ".data";

/// Builds the on-disk path for a file id: `<dir>/000000007.data`.
///
/// The 9-digit zero-padded form keeps lexicographic directory order equal to
/// numeric id order and round-trips through the startup scan.
pub fn data_file_name(dir: &Path, file_id: u32) -> PathBuf {
    dir.join(format!("{:09}{}", file_id, DATA_FILE_NAME_SUFFIX))
}

/// One numbered file of the append-only log.
pub struct DataFile {
    file_id: u32,
    /// Next byte to append; always equals the on-disk length.
    write_offset: i64,
    io: Box<dyn IoManager>,
}

impl DataFile {
    /// Opens the data file for `file_id` under `dir`, creating it if absent.
    ///
    /// The initial write offset is the current file size, so appends resume
    /// where the last session stopped.
    pub fn open(dir: &Path, file_id: u32) -> Result<Self> {
        let io = FileIo::new(&data_file_name(dir, file_id))?;
        let write_offset = io.size()? as i64;
        Ok(Self {
            file_id,
            write_offset,
            io: Box::new(io),
        })
    }

    /// Id of this file.
    pub fn file_id(&self) -> u32 {
        self.file_id
    }

    /// Current append position.
    pub fn write_offset(&self) -> i64 {
        self.write_offset
    }

    /// Overrides the append position. Used once, after startup replay of the
    /// active file.
    pub(crate) fn set_write_offset(&mut self, offset: i64) {
        self.write_offset = offset;
    }

    /// Appends a fully encoded record and advances the write offset.
    pub fn write(&mut self, buf: &[u8]) -> Result<()> {
        let n = self.io.write(buf)?;
        self.write_offset += n as i64;
        Ok(())
    }

    /// Reads the record starting at `offset`, returning it together with its
    /// total encoded length.
    ///
    /// Returns [`Error::EndOfFile`] when `offset` is at or past the end of
    /// the written data (including the all-zero tail of a partially written
    /// file) and [`Error::InvalidRecordCrc`] when the stored checksum does
    /// not match the record contents.
    pub fn read_log_record(&self, offset: i64) -> Result<(LogRecord, usize)> {
        let file_size = self.io.size()? as i64;
        if offset >= file_size {
            return Err(Error::EndOfFile);
        }

        // Clamp the header read so the last record of a file can still be
        // decoded without reading past EOF.
        let mut header_read = MAX_LOG_RECORD_HEADER_SIZE as i64;
        if offset + header_read > file_size {
            header_read = file_size - offset;
        }
        let mut header_buf = vec![0u8; header_read as usize];
        self.io.read_at(&mut header_buf, offset as u64)?;

        let (header, header_len) =
            decode_log_record_header(&header_buf).ok_or(Error::EndOfFile)?;
        if header.is_zero_sentinel() {
            return Err(Error::EndOfFile);
        }

        let rec_type = LogRecordType::from_u8(header.rec_type).ok_or(Error::InvalidRecordCrc)?;
        let key_size = header.key_size as usize;
        let value_size = header.value_size as usize;

        let mut key = vec![0u8; key_size + value_size];
        if key_size + value_size > 0 {
            self.io.read_at(&mut key, (offset + header_len as i64) as u64)?;
        }
        let value = key.split_off(key_size);

        let record = LogRecord {
            key,
            value,
            rec_type,
        };
        if log_record_crc(&record, &header_buf[4..header_len]) != header.crc {
            return Err(Error::InvalidRecordCrc);
        }

        Ok((record, header_len + key_size + value_size))
    }

    /// Flushes OS buffers for this file to durable storage.
    pub fn sync(&self) -> Result<()> {
        self.io.sync()
    }

    /// Final sync; the handle is released when the value drops.
    pub fn close(&self) -> Result<()> {
        self.io.close()
    }
}
