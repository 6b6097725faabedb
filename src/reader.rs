//! xdb backing-store readers: full-buffer (whole file preloaded) and
//! positional file (no preload, one positional read per access).

use crate::error::XdbError;
use std::fs::File;
use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};

/// Random-access byte reader over an xdb payload.
///
/// `read` fills `dst` with exactly `dst.len()` bytes starting at `offset`,
/// failing if the backing store is shorter than `offset + dst.len()`. Each
/// physical read issued to the backing store increments the reader's I/O
/// counter by one; the full-buffer reader never issues a physical read, so
/// its counter never advances.
pub trait XdbReader: Send + Sync {
    fn read(&self, offset: u64, dst: &mut [u8]) -> Result<(), XdbError>;

    /// Number of physical reads issued since the counter was last reset.
    fn io_count(&self) -> u32;

    /// Reset the I/O counter to 0. Called at the top of every `search`.
    fn reset_io_count(&self);
}

/// Whole file preloaded into one owned byte region; `read` is a bounded copy.
pub struct FullBufferReader {
    data: Vec<u8>,
}

impl FullBufferReader {
    pub fn open(path: &Path) -> Result<Self, XdbError> {
        let data = std::fs::read(path)?;
        Ok(Self { data })
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    #[cfg(test)]
    pub(crate) fn from_bytes(data: Vec<u8>) -> Self {
        Self { data }
    }
}

impl XdbReader for FullBufferReader {
    fn read(&self, offset: u64, dst: &mut [u8]) -> Result<(), XdbError> {
        let start = offset as usize;
        let end = start
            .checked_add(dst.len())
            .ok_or(XdbError::InvalidFormat)?;
        if end > self.data.len() {
            return Err(XdbError::InvalidFormat);
        }
        dst.copy_from_slice(&self.data[start..end]);
        Ok(())
    }

    fn io_count(&self) -> u32 {
        0
    }

    fn reset_io_count(&self) {}
}

/// Opens the xdb file for shared, random-access read and issues positional
/// reads. Safe to call concurrently from multiple threads with no external
/// locking: `read_at`/`seek_read` take the file offset as an argument rather
/// than relying on a shared cursor, so two threads reading at once never
/// race each other.
pub struct FileReader {
    file: File,
    len: u64,
    io_count: AtomicU32,
}

impl FileReader {
    pub fn open(path: &Path) -> Result<Self, XdbError> {
        tracing::debug!("opening xdb file at {}", path.display());
        let file = File::open(path)?;
        let len = file.metadata()?.len();
        Ok(Self {
            file,
            len,
            io_count: AtomicU32::new(0),
        })
    }

    pub fn len(&self) -> u64 {
        self.len
    }

    #[cfg(unix)]
    fn read_at(&self, offset: u64, dst: &mut [u8]) -> std::io::Result<usize> {
        use std::os::unix::fs::FileExt;
        self.file.read_at(dst, offset)
    }

    #[cfg(windows)]
    fn read_at(&self, offset: u64, dst: &mut [u8]) -> std::io::Result<usize> {
        use std::os::windows::fs::FileExt;
        self.file.seek_read(dst, offset)
    }
}

impl XdbReader for FileReader {
    fn read(&self, offset: u64, dst: &mut [u8]) -> Result<(), XdbError> {
        let end = offset
            .checked_add(dst.len() as u64)
            .ok_or(XdbError::InvalidFormat)?;
        if end > self.len {
            return Err(XdbError::InvalidFormat);
        }

        let mut filled = 0usize;
        while filled < dst.len() {
            let n = self.read_at((offset as usize + filled) as u64, &mut dst[filled..])?;
            self.io_count.fetch_add(1, Ordering::Relaxed);
            if n == 0 {
                return Err(XdbError::IoError(std::io::Error::new(
                    std::io::ErrorKind::UnexpectedEof,
                    "short read from xdb file",
                )));
            }
            filled += n;
        }
        Ok(())
    }

    fn io_count(&self) -> u32 {
        self.io_count.load(Ordering::Relaxed)
    }

    fn reset_io_count(&self) {
        self.io_count.store(0, Ordering::Relaxed);
    }
}
