//! Standard-file implementation of [`IoManager`]

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;

use crate::errors::Result;

use super::IoManager;

/// I/O manager backed by a plain [`std::fs::File`].
///
/// The file is opened read/write in append mode and created when absent.
/// Positional reads go through the platform `FileExt`, so they share no
/// cursor with the append writer.
pub struct FileIo {
    file: File,
}

impl FileIo {
    /// Opens (or creates) the file at `path`.
    pub fn new(path: &Path) -> Result<Self> {
        let mut opts = OpenOptions::new();
        opts.create(true).read(true).append(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            opts.mode(super::DATA_FILE_PERM);
        }
        let file = opts.open(path)?;
        Ok(Self { file })
    }
}

impl IoManager for FileIo {
    fn read_at(&self, buf: &mut [u8], offset: u64) -> Result<usize> {
        #[cfg(unix)]
        {
            use std::os::unix::fs::FileExt;
            self.file.read_exact_at(buf, offset)?;
        }
        #[cfg(windows)]
        {
            use std::os::windows::fs::FileExt;
            let mut read = 0usize;
            while read < buf.len() {
                let n = self.file.seek_read(&mut buf[read..], offset + read as u64)?;
                if n == 0 {
                    return Err(std::io::Error::from(std::io::ErrorKind::UnexpectedEof).into());
                }
                read += n;
            }
        }
        Ok(buf.len())
    }

    fn write(&self, buf: &[u8]) -> Result<usize> {
        (&self.file).write_all(buf)?;
        Ok(buf.len())
    }

    fn sync(&self) -> Result<()> {
        self.file.sync_all()?;
        Ok(())
    }

    fn size(&self) -> Result<u64> {
        Ok(self.file.metadata()?.len())
    }

    fn close(&self) -> Result<()> {
        self.file.sync_all()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn open_io(dir: &TempDir, name: &str) -> FileIo {
        FileIo::new(&dir.path().join(name)).unwrap()
    }

    #[test]
    fn test_new_creates_file() {
        let dir = TempDir::new().unwrap();
        let _io = open_io(&dir, "a.data");
        assert!(dir.path().join("a.data").exists());
    }

    #[test]
    fn test_write_appends_and_size_tracks() {
        let dir = TempDir::new().unwrap();
        let io = open_io(&dir, "a.data");

        assert_eq!(io.write(b"key-a").unwrap(), 5);
        assert_eq!(io.write(b"key-b").unwrap(), 5);
        assert_eq!(io.size().unwrap(), 10);
    }

    #[test]
    fn test_read_at_is_positional() {
        let dir = TempDir::new().unwrap();
        let io = open_io(&dir, "a.data");
        io.write(b"hello world").unwrap();

        let mut buf = [0u8; 5];
        io.read_at(&mut buf, 6).unwrap();
        assert_eq!(&buf, b"world");

        // A second read at an earlier offset is unaffected by the first.
        io.read_at(&mut buf, 0).unwrap();
        assert_eq!(&buf, b"hello");
    }

    #[test]
    fn test_read_past_eof_fails() {
        let dir = TempDir::new().unwrap();
        let io = open_io(&dir, "a.data");
        io.write(b"abc").unwrap();

        let mut buf = [0u8; 8];
        assert!(io.read_at(&mut buf, 0).is_err());
    }

    #[test]
    fn test_reopen_preserves_contents() {
        let dir = TempDir::new().unwrap();
        {
            let io = open_io(&dir, "a.data");
            io.write(b"persisted").unwrap();
            io.sync().unwrap();
            io.close().unwrap();
        }

        let io = open_io(&dir, "a.data");
        assert_eq!(io.size().unwrap(), 9);
        let mut buf = [0u8; 9];
        io.read_at(&mut buf, 0).unwrap();
        assert_eq!(&buf, b"persisted");
    }
}
