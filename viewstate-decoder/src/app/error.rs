/*!
Errors that can happen during the application's runtime
*/

use std::{
    fmt::{Display, Formatter, Result},
    io::Error as IoError,
    path::PathBuf,
};

use nrbf_stream::error::{nrbf::NrbfError, viewstate::ViewStateError};

/// Errors that can happen during the application's runtime
#[derive(Debug)]
pub enum RuntimeError {
    InvalidOptions(String),
    ReadError(IoError, PathBuf),
    CreateError(IoError, PathBuf),
    DiskError(IoError),
    EnvelopeError(ViewStateError),
    ParseError(NrbfError),
}

impl RuntimeError {
    /// The process exit code this failure maps to: parse failures exit 1,
    /// I/O and option failures exit 2.
    pub fn exit_code(&self) -> i32 {
        match self {
            RuntimeError::InvalidOptions(_)
            | RuntimeError::ReadError(..)
            | RuntimeError::CreateError(..)
            | RuntimeError::DiskError(_) => 2,
            RuntimeError::EnvelopeError(_) | RuntimeError::ParseError(_) => 1,
        }
    }
}

impl Display for RuntimeError {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> Result {
        match self {
            RuntimeError::InvalidOptions(why) => write!(fmt, "Invalid options!\n{why}"),
            RuntimeError::ReadError(why, path) => write!(fmt, "{why}: {path:?}"),
            RuntimeError::CreateError(why, path) => write!(fmt, "{why}: {path:?}"),
            RuntimeError::DiskError(why) => write!(fmt, "{why}"),
            RuntimeError::EnvelopeError(why) => write!(fmt, "{why}"),
            RuntimeError::ParseError(why) => write!(fmt, "{why}"),
        }
    }
}
