use std::fmt::Display;

use thiserror::Error as ThisError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Code {
    /// A required argument was missing or inconsistent
    InvalidArgument,
    BufferShort,
    ValueOutOfRange,
    Corruption,
    StringUnterminated,
    FlightInvalid,
    FlightRasterInvalid,
    EdbFilenameTooLong,
    TldTypeUnknown,
    TldOpenerInvalid,
    MemoryAllocFail,
    StreamInvalid,
    StreamNotImplemented,
    StreamOpen,
    StreamClose,
    StreamRead,
    StreamReadShort,
    StreamWrite,
    StreamWriteShort,
    StreamSeek,
    StreamTell,
}

impl Code {
    pub fn name(&self) -> &'static str {
        match self {
            Code::InvalidArgument => "InvalidArgument",
            Code::BufferShort => "BufferShort",
            Code::ValueOutOfRange => "ValueOutOfRange",
            Code::Corruption => "Corruption",
            Code::StringUnterminated => "StringUnterminated",
            Code::FlightInvalid => "FlightInvalid",
            Code::FlightRasterInvalid => "FlightRasterInvalid",
            Code::EdbFilenameTooLong => "EdbFilenameTooLong",
            Code::TldTypeUnknown => "TldTypeUnknown",
            Code::TldOpenerInvalid => "TldOpenerInvalid",
            Code::MemoryAllocFail => "MemoryAllocFail",
            Code::StreamInvalid => "StreamInvalid",
            Code::StreamNotImplemented => "StreamNotImplemented",
            Code::StreamOpen => "StreamOpen",
            Code::StreamClose => "StreamClose",
            Code::StreamRead => "StreamRead",
            Code::StreamReadShort => "StreamReadShort",
            Code::StreamWrite => "StreamWrite",
            Code::StreamWriteShort => "StreamWriteShort",
            Code::StreamSeek => "StreamSeek",
            Code::StreamTell => "StreamTell",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Code::InvalidArgument => "A required argument was missing or invalid",
            Code::BufferShort => "A buffer's allocated size was too small",
            Code::ValueOutOfRange => "A value was encountered that was out of range for its type",
            Code::Corruption => "Unable to complete an operation due to suspected corrupted data",
            Code::StringUnterminated => "Encountered a string that appeared unterminated",
            Code::FlightInvalid => "Invalid flight configuration",
            Code::FlightRasterInvalid => "An invalid raster number was specified",
            Code::EdbFilenameTooLong => {
                "Encountered a filename whose length exceeds what EDB supports"
            }
            Code::TldTypeUnknown => "Encountered an unknown TLD record type",
            Code::TldOpenerInvalid => "Invalid TLD opener",
            Code::MemoryAllocFail => "Unable to allocate memory",
            Code::StreamInvalid => "Invalid stream configuration",
            Code::StreamNotImplemented => {
                "Attempted to use a stream operation that was not implemented"
            }
            Code::StreamOpen => "Unable to open file",
            Code::StreamClose => "Unable to close file",
            Code::StreamRead => "Attempt to read failed",
            Code::StreamReadShort => "Fewer bytes read than expected",
            Code::StreamWrite => "Attempt to write failed",
            Code::StreamWriteShort => "Fewer bytes written than expected",
            Code::StreamSeek => "Unable to seek to position in file",
            Code::StreamTell => "Unable to tell position in file",
        }
    }
}

impl Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(ThisError, Debug, Clone, PartialEq, Eq)]
#[error("{code}: {msg}")]
pub struct Error {
    code: Code,
    msg: String,
}

impl Error {
    pub fn new(code: Code, msg: impl Into<String>) -> Self {
        Self {
            code,
            msg: msg.into(),
        }
    }

    pub fn invalid_argument(msg: &str) -> Self {
        Self::new(Code::InvalidArgument, msg)
    }

    pub fn buffer_short(msg: &str) -> Self {
        Self::new(Code::BufferShort, msg)
    }

    pub fn out_of_range(msg: &str) -> Self {
        Self::new(Code::ValueOutOfRange, msg)
    }

    pub fn corruption(msg: &str) -> Self {
        Self::new(Code::Corruption, msg)
    }

    pub fn alloc_fail(msg: &str) -> Self {
        Self::new(Code::MemoryAllocFail, msg)
    }

    pub fn code(&self) -> Code {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.msg
    }

    pub fn is_buffer_short(&self) -> bool {
        self.code == Code::BufferShort
    }

    pub fn is_out_of_range(&self) -> bool {
        self.code == Code::ValueOutOfRange
    }

    pub fn is_corruption(&self) -> bool {
        self.code == Code::Corruption
    }

    pub fn is_invalid_argument(&self) -> bool {
        self.code == Code::InvalidArgument
    }
}

pub type Result<T> = std::result::Result<T, Error>;
