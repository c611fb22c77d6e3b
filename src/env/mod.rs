use crate::util::{Code, Error, Result};

mod file_env;

pub use file_env::{BufferStream, FileStream, FileTldOpener, IoStream, Mode};

/// Origin for [`Stream::seek`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Whence {
    Set,
    Cur,
    End,
}

/// A seekable byte stream.
///
/// Reads and writes are all-or-nothing from the caller's point of view: a
/// transfer that moves fewer bytes than requested fails with
/// `StreamReadShort` / `StreamWriteShort`. Once closed, every operation
/// fails with `StreamInvalid`.
///
/// A stream is used by one caller at a time. Callers sharing one across
/// threads must synchronize externally.
pub trait Stream {
    fn read(&mut self, dst: &mut [u8]) -> Result<()>;
    fn write(&mut self, data: &[u8]) -> Result<()>;

    /// `Whence::Set` and `Whence::Cur` must be supported; `Whence::End` may
    /// fail with `StreamNotImplemented`.
    fn seek(&mut self, offset: i64, whence: Whence) -> Result<()>;

    fn tell(&mut self) -> Result<u64> {
        Err(Error::new(
            Code::StreamNotImplemented,
            "stream does not report its position",
        ))
    }

    fn close(&mut self) -> Result<()>;
}

/// Resolves TLD file names, as stored in an EDB, to readable streams.
pub trait TldOpener {
    fn open_tld(&mut self, tld_file: &str) -> Result<Box<dyn Stream>>;
    fn close(&mut self) -> Result<()>;
}

/// Closes `stream` and returns the first error seen, either `result`'s or
/// the close's.
pub fn close_after<T>(stream: &mut dyn Stream, result: Result<T>) -> Result<T> {
    let closed = stream.close();
    match result {
        Ok(value) => closed.map(|_| value),
        Err(err) => Err(err),
    }
}
