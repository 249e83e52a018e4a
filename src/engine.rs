//! Storage engine orchestration
//!
//! The engine owns one active (append-only) data file, a map of older
//! read-only files, and the in-memory index. Every write appends a record to
//! the active file and then updates the index; reads resolve the key through
//! the index and fetch the record at its recorded position.
//!
//! # Concurrency
//!
//! A single reader/writer lock serializes the public operations: put and
//! delete hold the exclusive side for the append and the index update, get
//! holds the shared side for the whole lookup. All file I/O happens with the
//! lock held, which makes replay order (ascending file id, ascending offset)
//! equal to write order.

use std::collections::HashMap;
use std::fs;

use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::errors::{Error, Result};
use crate::index::{new_indexer, Indexer};
use crate::options::Options;
use crate::storage::{
    encode_log_record, DataFile, LogRecord, LogRecordPosition, LogRecordType,
    DATA_FILE_NAME_SUFFIX,
};

/// A Bitcask-style embedded key-value store.
///
/// All operations take `&self`; the engine is safe to share across threads.
pub struct Engine {
    options: Options,
    index: Box<dyn Indexer>,
    state: RwLock<EngineState>,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// Mutable file state guarded by the engine lock.
struct EngineState {
    /// The file currently accepting appends. Absent until the first write
    /// into an empty database.
    active_file: Option<DataFile>,
    /// Previously active files, read-only from here on.
    older_files: HashMap<u32, DataFile>,
    /// Sorted ids discovered by the startup scan; only replay uses them.
    file_ids: Vec<u32>,
}

impl Engine {
    /// Opens (or creates) a database in `options.dir_path`.
    ///
    /// Scans the directory for data files, opens them all, and rebuilds the
    /// in-memory index by replaying every record in ascending file-id and
    /// offset order. A CRC failure during replay aborts the open.
    pub fn open(options: Options) -> Result<Self> {
        options.validate()?;

        if !options.dir_path.is_dir() {
            fs::create_dir_all(&options.dir_path)?;
        }

        let engine = Self {
            index: new_indexer(options.index_type),
            state: RwLock::new(EngineState {
                active_file: None,
                older_files: HashMap::new(),
                file_ids: Vec::new(),
            }),
            options,
        };

        {
            let mut state = engine.state.write();
            engine.load_data_files(&mut state)?;
            engine.load_index_from_data_files(&mut state)?;
        }

        Ok(engine)
    }

    /// Stores `value` under `key`, replacing any previous value.
    pub fn put(&self, key: &[u8], value: &[u8]) -> Result<()> {
        if key.is_empty() {
            return Err(Error::KeyIsEmpty);
        }

        let record = LogRecord {
            key: key.to_vec(),
            value: value.to_vec(),
            rec_type: LogRecordType::Normal,
        };

        let mut state = self.state.write();
        let pos = self.append_log_record(&mut state, &record)?;
        if !self.index.put(key.to_vec(), pos) {
            return Err(Error::IndexUpdateFailed);
        }
        Ok(())
    }

    /// Returns the value stored under `key`.
    pub fn get(&self, key: &[u8]) -> Result<Vec<u8>> {
        let state = self.state.read();

        if key.is_empty() {
            return Err(Error::KeyIsEmpty);
        }

        let pos = self.index.get(key).ok_or(Error::KeyNotFound)?;

        let data_file = match state.active_file.as_ref() {
            Some(active) if active.file_id() == pos.file_id => active,
            _ => state
                .older_files
                .get(&pos.file_id)
                .ok_or(Error::DataFileNotFound)?,
        };

        let (record, _) = data_file.read_log_record(pos.offset)?;
        if record.rec_type == LogRecordType::Deleted {
            return Err(Error::KeyNotFound);
        }
        Ok(record.value)
    }

    /// Removes `key` by appending a tombstone record.
    ///
    /// Deleting a key that is not present succeeds without writing.
    pub fn delete(&self, key: &[u8]) -> Result<()> {
        if key.is_empty() {
            return Err(Error::KeyIsEmpty);
        }

        let mut state = self.state.write();
        if self.index.get(key).is_none() {
            return Ok(());
        }

        let record = LogRecord {
            key: key.to_vec(),
            value: Vec::new(),
            rec_type: LogRecordType::Deleted,
        };
        self.append_log_record(&mut state, &record)?;

        if !self.index.delete(key) {
            return Err(Error::IndexUpdateFailed);
        }
        Ok(())
    }

    /// Fsyncs the active data file.
    pub fn sync(&self) -> Result<()> {
        let state = self.state.write();
        if let Some(active) = state.active_file.as_ref() {
            active.sync()?;
        }
        Ok(())
    }

    /// Syncs and releases all data files. Reopening the same directory
    /// yields an equivalent database.
    pub fn close(&self) -> Result<()> {
        let state = self.state.write();
        if let Some(active) = state.active_file.as_ref() {
            active.sync()?;
            active.close()?;
        }
        for file in state.older_files.values() {
            file.close()?;
        }
        Ok(())
    }

    /// Encodes `record` and appends it to the active file, rotating first
    /// when the record would overflow `data_file_size`. Called with the
    /// exclusive lock held.
    fn append_log_record(
        &self,
        state: &mut EngineState,
        record: &LogRecord,
    ) -> Result<LogRecordPosition> {
        // The first write into an empty database creates file 0.
        if state.active_file.is_none() {
            state.active_file = Some(DataFile::open(&self.options.dir_path, 0)?);
        }

        let (encoded, size) = encode_log_record(record);
        let size = size as i64;

        // A record never spans two files: rotate when this one would push
        // the active file past the size limit.
        let needs_rotation = state
            .active_file
            .as_ref()
            .is_some_and(|active| active.write_offset() + size > self.options.data_file_size);
        if needs_rotation {
            if let Some(active) = state.active_file.as_ref() {
                active.sync()?;
            }
            if let Some(prev) = state.active_file.take() {
                let next_id = prev.file_id() + 1;
                debug!(
                    previous = prev.file_id(),
                    next = next_id,
                    "rotating active data file"
                );
                let next = DataFile::open(&self.options.dir_path, next_id)?;
                state.older_files.insert(prev.file_id(), prev);
                state.active_file = Some(next);
            }
        }

        let active = match state.active_file.as_mut() {
            Some(file) => file,
            None => return Err(Error::DataFileNotFound),
        };

        let write_off = active.write_offset();
        active.write(&encoded)?;

        if self.options.sync_writes {
            active.sync()?;
        }

        Ok(LogRecordPosition {
            file_id: active.file_id(),
            offset: write_off,
        })
    }

    /// Scans the data directory, sorts the discovered file ids, and opens
    /// every data file. The largest id becomes the active file.
    fn load_data_files(&self, state: &mut EngineState) -> Result<()> {
        let mut file_ids: Vec<u32> = Vec::new();

        for entry in fs::read_dir(&self.options.dir_path)? {
            let entry = entry?;
            let file_name = entry.file_name();
            let Some(name) = file_name.to_str() else {
                continue;
            };
            if !name.ends_with(DATA_FILE_NAME_SUFFIX) {
                continue;
            }
            // 000000001.data -> 1; anything unparseable means the directory
            // has been tampered with.
            let id_part = name.split('.').next().unwrap_or("");
            let file_id: u32 = id_part
                .parse()
                .map_err(|_| Error::DataDirectoryCorrupted)?;
            file_ids.push(file_id);
        }

        file_ids.sort_unstable();
        debug!(files = file_ids.len(), "scanned data directory");

        if let (Some(&first), Some(&last)) = (file_ids.first(), file_ids.last()) {
            if (last - first + 1) as usize != file_ids.len() {
                warn!(
                    first,
                    last,
                    count = file_ids.len(),
                    "data file ids are not contiguous"
                );
            }
        }

        for (i, &file_id) in file_ids.iter().enumerate() {
            let data_file = DataFile::open(&self.options.dir_path, file_id)?;
            if i == file_ids.len() - 1 {
                state.active_file = Some(data_file);
            } else {
                state.older_files.insert(file_id, data_file);
            }
        }

        state.file_ids = file_ids;
        Ok(())
    }

    /// Rebuilds the index by replaying every file in ascending id order and
    /// every record in ascending offset order, so the last writer wins.
    /// Leaves the active file's write offset at the end of its records.
    fn load_index_from_data_files(&self, state: &mut EngineState) -> Result<()> {
        if state.file_ids.is_empty() {
            return Ok(());
        }

        let active_id = state.active_file.as_ref().map(DataFile::file_id);
        let file_ids = state.file_ids.clone();
        let mut records = 0u64;

        for &file_id in &file_ids {
            let mut offset = 0i64;
            loop {
                let data_file = if Some(file_id) == active_id {
                    state.active_file.as_ref()
                } else {
                    state.older_files.get(&file_id)
                };
                let Some(data_file) = data_file else {
                    return Err(Error::DataFileNotFound);
                };

                let (record, size) = match data_file.read_log_record(offset) {
                    Ok(read) => read,
                    Err(Error::EndOfFile) => break,
                    Err(e) => return Err(e),
                };

                let pos = LogRecordPosition { file_id, offset };
                let ok = if record.rec_type == LogRecordType::Deleted {
                    self.index.delete(&record.key)
                } else {
                    self.index.put(record.key, pos)
                };
                if !ok {
                    return Err(Error::IndexUpdateFailed);
                }

                records += 1;
                offset += size as i64;
            }

            if Some(file_id) == active_id {
                if let Some(active) = state.active_file.as_mut() {
                    active.set_write_offset(offset);
                }
            }
        }

        info!(
            records,
            files = file_ids.len(),
            "rebuilt index from data files"
        );
        Ok(())
    }
}
