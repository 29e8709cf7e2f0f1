//! Positioned read/write abstraction over a seekable backing store (§4.B).
//!
//! This generalises `io::seekable::SeekableReader` (a thin `Seek`-then-read
//! wrapper, usable only by one session at a time) into a capability that
//! takes its offset per call, so a backend can in principle be shared by
//! re-entrant callers. Both sync and async flavours exist; there is no
//! single trait hierarchy that spans both because blocking a cooperative
//! async task on a sync call is exactly the bug this split prevents.

use async_trait::async_trait;
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::sync::Mutex;

use crate::tiff::errors::{TiffError, TiffResult};

/// Positioned, synchronous read over a backing store.
pub trait PositionedReader: Send + Sync {
    /// Reads into `buf` starting at `offset`. May return fewer bytes than
    /// `buf.len()` only when the read reaches EOF.
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<usize>;

    /// Reads exactly `buf.len()` bytes, failing with `UnexpectedEof`
    /// otherwise.
    fn read_exact_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<()> {
        let mut read = 0;
        while read < buf.len() {
            let n = self.read_at(offset + read as u64, &mut buf[read..])?;
            if n == 0 {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "positioned read reached EOF before filling buffer",
                ));
            }
            read += n;
        }
        Ok(())
    }
}

/// Positioned, synchronous write over a backing store.
pub trait PositionedWriter: Send + Sync {
    /// Writes the whole of `buf` at `offset`, extending the store if
    /// `offset` is past the current end.
    fn write_at(&self, offset: u64, buf: &[u8]) -> io::Result<()>;

    fn flush(&self) -> io::Result<()>;

    /// Releases the backing resource. Idempotent; guaranteed on every exit
    /// path by callers (§5).
    fn dispose(&self) -> io::Result<()> {
        self.flush()
    }
}

/// A `PositionedReader`/`PositionedWriter` pair built by locking a plain
/// `Read + Write + Seek` store around every call — the in-memory
/// (`Cursor<Vec<u8>>`) and single-threaded-file cases used by tests and by
/// the CLI's synchronous entry points.
pub struct SeekLockedStore<S> {
    inner: Mutex<S>,
}

impl<S> SeekLockedStore<S> {
    pub fn new(inner: S) -> Self {
        SeekLockedStore {
            inner: Mutex::new(inner),
        }
    }

    pub fn into_inner(self) -> S {
        self.inner.into_inner().unwrap_or_else(|e| e.into_inner())
    }
}

impl<S: Read + Write + Seek + Send> PositionedReader for SeekLockedStore<S> {
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
        let mut guard = self.inner.lock().unwrap();
        guard.seek(SeekFrom::Start(offset))?;
        guard.read(buf)
    }
}

impl<S: Read + Write + Seek + Send> PositionedWriter for SeekLockedStore<S> {
    fn write_at(&self, offset: u64, buf: &[u8]) -> io::Result<()> {
        let mut guard = self.inner.lock().unwrap();
        guard.seek(SeekFrom::Start(offset))?;
        guard.write_all(buf)
    }

    fn flush(&self) -> io::Result<()> {
        self.inner.lock().unwrap().flush()
    }
}

/// Positioned, asynchronous read over a backing store. Object-safe via
/// `async_trait` so pipeline middleware can hold `Arc<dyn AsyncPositionedReader>`.
#[async_trait]
pub trait AsyncPositionedReader: Send + Sync {
    async fn read_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<usize>;

    async fn read_exact_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<()> {
        let mut read = 0;
        while read < buf.len() {
            let n = self.read_at(offset + read as u64, &mut buf[read..]).await?;
            if n == 0 {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "positioned read reached EOF before filling buffer",
                ));
            }
            read += n;
        }
        Ok(())
    }
}

/// Positioned, asynchronous write over a backing store.
#[async_trait]
pub trait AsyncPositionedWriter: Send + Sync {
    async fn write_at(&self, offset: u64, buf: &[u8]) -> io::Result<()>;

    async fn flush(&self) -> io::Result<()>;

    async fn dispose(&self) -> io::Result<()> {
        self.flush().await
    }
}

#[async_trait]
impl AsyncPositionedReader for tokio::fs::File {
    async fn read_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
        use tokio::io::AsyncReadExt;
        #[cfg(unix)]
        {
            use std::os::unix::fs::FileExt;
            let std_file = self.try_clone().await?.into_std().await;
            return std_file.read_at(buf, offset);
        }
        #[cfg(not(unix))]
        {
            let mut file = self.try_clone().await?;
            use tokio::io::AsyncSeekExt;
            file.seek(std::io::SeekFrom::Start(offset)).await?;
            file.read(buf).await
        }
    }
}

#[async_trait]
impl AsyncPositionedWriter for tokio::fs::File {
    async fn write_at(&self, offset: u64, buf: &[u8]) -> io::Result<()> {
        #[cfg(unix)]
        {
            use std::os::unix::fs::FileExt;
            let std_file = self.try_clone().await?.into_std().await;
            return std_file.write_all_at(buf, offset);
        }
        #[cfg(not(unix))]
        {
            use tokio::io::{AsyncSeekExt, AsyncWriteExt};
            let mut file = self.try_clone().await?;
            file.seek(std::io::SeekFrom::Start(offset)).await?;
            file.write_all(buf).await
        }
    }

    async fn flush(&self) -> io::Result<()> {
        use tokio::io::AsyncWriteExt;
        self.try_clone().await?.flush().await
    }
}

/// Wraps a sync backend so it can be driven from async code without ever
/// blocking the runtime thread: sync positioned I/O over an in-memory
/// buffer or a file already open for exclusive access completes fast
/// enough that there is no suspension point to honour, so the call is
/// just forwarded synchronously inside the `async fn`.
pub struct AsyncOverSync<S> {
    inner: S,
}

impl<S> AsyncOverSync<S> {
    pub fn new(inner: S) -> Self {
        AsyncOverSync { inner }
    }
}

#[async_trait]
impl<S: PositionedReader> AsyncPositionedReader for AsyncOverSync<S> {
    async fn read_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read_at(offset, buf)
    }
}

#[async_trait]
impl<S: PositionedWriter> AsyncPositionedWriter for AsyncOverSync<S> {
    async fn write_at(&self, offset: u64, buf: &[u8]) -> io::Result<()> {
        self.inner.write_at(offset, buf)
    }

    async fn flush(&self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Wraps an async-only backend for a sync caller. Per §4.B this must never
/// block the runtime — so instead of attempting a `block_on`, every call
/// fails fast with `Unsupported`, pointing the caller at the async entry
/// point instead.
pub struct SyncOverAsync<S> {
    inner: S,
}

impl<S> SyncOverAsync<S> {
    pub fn new(inner: S) -> Self {
        SyncOverAsync { inner }
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: Send + Sync> PositionedReader for SyncOverAsync<S> {
    fn read_at(&self, _offset: u64, _buf: &mut [u8]) -> io::Result<usize> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "backend is async-only; use the async read_at entry point",
        ))
    }
}

impl<S: Send + Sync> PositionedWriter for SyncOverAsync<S> {
    fn write_at(&self, _offset: u64, _buf: &[u8]) -> io::Result<()> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "backend is async-only; use the async write_at entry point",
        ))
    }

    fn flush(&self) -> io::Result<()> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "backend is async-only; use the async flush entry point",
        ))
    }
}

/// Maps a sync-over-async `Unsupported` I/O error onto `TiffError::Unsupported`
/// rather than the generic `IoFailure`, matching §7's policy that misuse of
/// the async/sync boundary is distinguishable from a genuine backend fault.
pub fn map_backend_error(err: io::Error) -> TiffError {
    if err.kind() == io::ErrorKind::Unsupported {
        TiffError::Unsupported(err.to_string())
    } else {
        TiffError::IoFailure(err)
    }
}

pub fn checked_result<T>(result: io::Result<T>) -> TiffResult<T> {
    result.map_err(map_backend_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn seek_locked_store_round_trips() {
        let store = SeekLockedStore::new(Cursor::new(vec![0u8; 16]));
        store.write_at(4, &[1, 2, 3, 4]).unwrap();
        let mut buf = [0u8; 4];
        store.read_at(4, &mut buf).unwrap();
        assert_eq!(buf, [1, 2, 3, 4]);
    }

    #[test]
    fn sync_over_async_is_unsupported_not_blocking() {
        let wrapper: SyncOverAsync<()> = SyncOverAsync::new(());
        let mut buf = [0u8; 1];
        let err = wrapper.read_at(0, &mut buf).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::Unsupported);
    }
}
