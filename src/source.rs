//! Random-access byte storage.
//!
//! Everything above this module reads through [`ByteSource::read_at`], which
//! takes an explicit offset and never moves a shared cursor. A source that is
//! `Sync` can therefore be read from several threads at once.

use crate::error::{Error, Result};
use std::fs::File;
use std::io;
use std::path::Path;

/// A finite byte range of known length that supports positional reads.
pub trait ByteSource {
    /// Total number of bytes in the source.
    fn len(&self) -> u64;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Read up to `buf.len()` bytes starting at `offset`.
    ///
    /// Returns the number of bytes read; `0` means `offset` is at or past
    /// the end of the source.
    fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<usize>;
}

impl ByteSource for [u8] {
    fn len(&self) -> u64 {
        <[u8]>::len(self) as u64
    }

    fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        let Ok(start) = usize::try_from(offset) else {
            return Ok(0);
        };
        if start >= <[u8]>::len(self) {
            return Ok(0);
        }
        let n = buf.len().min(<[u8]>::len(self) - start);
        buf[..n].copy_from_slice(&self[start..start + n]);
        Ok(n)
    }
}

impl ByteSource for Vec<u8> {
    fn len(&self) -> u64 {
        self.as_slice().len() as u64
    }

    fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        self.as_slice().read_at(buf, offset)
    }
}

impl<S: ByteSource + ?Sized> ByteSource for &S {
    fn len(&self) -> u64 {
        (**self).len()
    }

    fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        (**self).read_at(buf, offset)
    }
}

/// A file opened for positional reads, with its length taken at open time.
#[derive(Debug)]
pub struct FileSource {
    file: File,
    len: u64,
}

impl FileSource {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        let len = file.metadata()?.len();
        tracing::debug!(path = %path.as_ref().display(), len, "opened file source");
        Ok(Self { file, len })
    }
}

impl ByteSource for FileSource {
    fn len(&self) -> u64 {
        self.len
    }

    #[cfg(unix)]
    fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        use std::os::unix::fs::FileExt;
        self.file.read_at(buf, offset)
    }

    #[cfg(windows)]
    fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        use std::os::windows::fs::FileExt;
        self.file.seek_read(buf, offset)
    }
}

/// Fill `buf` from `offset`, tolerating partial reads.
///
/// Reaching the end of the source exactly as `buf` fills up is success;
/// running out of bytes before that is a [`Error::ShortRead`].
pub fn read_exact_at<S: ByteSource + ?Sized>(src: &S, buf: &mut [u8], offset: u64) -> Result<()> {
    let mut filled = 0usize;
    while filled < buf.len() {
        match src.read_at(&mut buf[filled..], offset + filled as u64) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(Error::Io(e)),
        }
    }
    if filled < buf.len() {
        return Err(Error::ShortRead {
            offset,
            wanted: buf.len() as u64,
            got: filled as u64,
        });
    }
    Ok(())
}

/// Read `len` bytes starting at `offset` into a fresh buffer.
pub fn read_slice<S: ByteSource + ?Sized>(src: &S, offset: u64, len: u64) -> Result<Vec<u8>> {
    let available = src.len().saturating_sub(offset);
    if len > available {
        return Err(Error::ShortRead { offset, wanted: len, got: available });
    }
    let mut v = vec![0u8; len as usize];
    read_exact_at(src, &mut v, offset)?;
    Ok(v)
}
