//! siriuskv - an embedded Bitcask-style key-value storage engine
//!
//! Every write appends a record to a numbered log file; an in-memory index
//! maps each key to the on-disk position of its latest record; opening a
//! database replays the log files to rebuild that index.
//!
//! ```no_run
//! use siriuskv::{Engine, Options};
//!
//! fn main() -> siriuskv::Result<()> {
//!     let engine = Engine::open(Options::default())?;
//!     engine.put(b"hello", b"sirius")?;
//!     assert_eq!(engine.get(b"hello")?, b"sirius");
//!     engine.delete(b"hello")?;
//!     Ok(())
//! }
//! ```

pub mod engine;
pub mod errors;
pub mod fio;
pub mod index;
pub mod options;
pub mod storage;

pub use engine::Engine;
pub use errors::{Error, Result};
pub use options::{IndexType, Options};
