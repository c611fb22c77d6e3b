use std::{
    fs::{File, OpenOptions},
    io::{self, Cursor, Read, Seek, SeekFrom, Write},
    path::{Path, PathBuf},
};

use log::debug;

use super::{Stream, TldOpener, Whence};
use crate::{
    edb::FILENAME_MAX_LENGTH,
    util::{Code, Error, Result},
};

fn to_stream_error(code: Code, target: &str, error: io::Error) -> Error {
    Error::new(code, format!("{}: {}", target, error))
}

/// A [`Stream`] over anything that reads, writes and seeks.
pub struct IoStream<T> {
    inner: Option<T>,
    name: String,
}

pub type FileStream = IoStream<File>;
pub type BufferStream = IoStream<Cursor<Vec<u8>>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Read,
    /// Create or truncate
    Write,
    ReadWrite,
}

impl<T: Read + Write + Seek> IoStream<T> {
    pub fn new(inner: T, name: &str) -> Self {
        Self {
            inner: Some(inner),
            name: name.to_owned(),
        }
    }

    /// Returns the underlying object, or `None` if the stream was closed
    pub fn into_inner(self) -> Option<T> {
        self.inner
    }

    fn inner(&mut self) -> Result<&mut T> {
        match self.inner.as_mut() {
            Some(inner) => Ok(inner),
            None => Err(Error::new(
                Code::StreamInvalid,
                format!("{}: stream is closed", self.name),
            )),
        }
    }
}

impl FileStream {
    pub fn open(path: impl AsRef<Path>, mode: Mode) -> Result<Self> {
        let path = path.as_ref();
        let name = path.display().to_string();
        let mut options = OpenOptions::new();
        match mode {
            Mode::Read => options.read(true),
            Mode::Write => options.write(true).create(true).truncate(true),
            Mode::ReadWrite => options.read(true).write(true),
        };
        match options.open(path) {
            Ok(file) => Ok(Self::new(file, &name)),
            Err(error) => Err(to_stream_error(Code::StreamOpen, &name, error)),
        }
    }
}

impl BufferStream {
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self::new(Cursor::new(bytes), "<buffer>")
    }

    pub fn empty() -> Self {
        Self::from_bytes(Vec::new())
    }

    /// Contents written so far, or `None` if the stream was closed
    pub fn contents(&self) -> Option<&[u8]> {
        self.inner.as_ref().map(|c| c.get_ref().as_slice())
    }
}

impl<T: Read + Write + Seek> Stream for IoStream<T> {
    fn read(&mut self, dst: &mut [u8]) -> Result<()> {
        if dst.is_empty() {
            return Ok(());
        }
        let name = self.name.clone();
        let inner = self.inner()?;
        let mut filled = 0;
        while filled < dst.len() {
            match inner.read(&mut dst[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(error) if error.kind() == io::ErrorKind::Interrupted => continue,
                Err(error) => return Err(to_stream_error(Code::StreamRead, &name, error)),
            }
        }
        if filled < dst.len() {
            return Err(Error::new(
                Code::StreamReadShort,
                format!("{}: read {} of {} bytes", name, filled, dst.len()),
            ));
        }
        Ok(())
    }

    fn write(&mut self, data: &[u8]) -> Result<()> {
        if data.is_empty() {
            return Ok(());
        }
        let name = self.name.clone();
        let inner = self.inner()?;
        let mut written = 0;
        while written < data.len() {
            match inner.write(&data[written..]) {
                Ok(0) => break,
                Ok(n) => written += n,
                Err(error) if error.kind() == io::ErrorKind::Interrupted => continue,
                Err(error) => return Err(to_stream_error(Code::StreamWrite, &name, error)),
            }
        }
        if written < data.len() {
            return Err(Error::new(
                Code::StreamWriteShort,
                format!("{}: wrote {} of {} bytes", name, written, data.len()),
            ));
        }
        Ok(())
    }

    fn seek(&mut self, offset: i64, whence: Whence) -> Result<()> {
        let name = self.name.clone();
        let inner = self.inner()?;
        let target = match whence {
            Whence::Set => {
                if offset < 0 {
                    return Err(Error::new(
                        Code::StreamSeek,
                        format!("{}: negative absolute offset {}", name, offset),
                    ));
                }
                SeekFrom::Start(offset as u64)
            }
            Whence::Cur => SeekFrom::Current(offset),
            Whence::End => SeekFrom::End(offset),
        };
        match inner.seek(target) {
            Ok(_) => Ok(()),
            Err(error) => Err(to_stream_error(Code::StreamSeek, &name, error)),
        }
    }

    fn tell(&mut self) -> Result<u64> {
        let name = self.name.clone();
        let inner = self.inner()?;
        inner
            .stream_position()
            .map_err(|error| to_stream_error(Code::StreamTell, &name, error))
    }

    fn close(&mut self) -> Result<()> {
        let name = self.name.clone();
        let mut inner = match self.inner.take() {
            Some(inner) => inner,
            None => {
                return Err(Error::new(
                    Code::StreamInvalid,
                    format!("{}: stream already closed", name),
                ))
            }
        };
        inner
            .flush()
            .map_err(|error| to_stream_error(Code::StreamClose, &name, error))
    }
}

/// Opens TLD files relative to a directory.
pub struct FileTldOpener {
    path: Option<PathBuf>,
}

impl FileTldOpener {
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(Error::invalid_argument("TLD path is empty"));
        }
        Ok(Self {
            path: Some(path.to_path_buf()),
        })
    }
}

impl TldOpener for FileTldOpener {
    fn open_tld(&mut self, tld_file: &str) -> Result<Box<dyn Stream>> {
        let dir = match self.path.as_ref() {
            Some(dir) => dir,
            None => {
                return Err(Error::new(
                    Code::TldOpenerInvalid,
                    "TLD opener is closed",
                ))
            }
        };
        if tld_file.len() > FILENAME_MAX_LENGTH {
            return Err(Error::new(
                Code::StringUnterminated,
                format!("TLD file name is {} bytes long", tld_file.len()),
            ));
        }
        let path = dir.join(tld_file);
        debug!("opening TLD {}", path.display());
        Ok(Box::new(FileStream::open(path, Mode::Read)?))
    }

    fn close(&mut self) -> Result<()> {
        self.path = None;
        Ok(())
    }
}
