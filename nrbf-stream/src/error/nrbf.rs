/*!
 Errors that can happen when parsing a serialized record stream.
*/

use std::{
    fmt::{Display, Formatter, Result},
    str::Utf8Error,
};

/// Errors that can happen when parsing a serialized record stream
///
/// Every variant is fatal to the parse that raised it; variants carry the
/// cursor position of the failure where one exists.
#[derive(Debug)]
pub enum NrbfError {
    /// A read ran past the end of the stream: (requested index, stream length)
    UnexpectedEof(usize, usize),
    /// A 7-bit length prefix did not terminate within 5 bytes
    InvalidVarInt(usize),
    /// String data was not valid UTF-8
    InvalidUtf8(Utf8Error),
    /// A record tag byte not present in the format's record table: (tag, position)
    UnknownRecord(u8, usize),
    /// A record parser was handed a stream positioned on a different tag: (expected, got, position)
    RecordTagMismatch(u8, u8, usize),
    /// A `ClassWithId` referenced a metadata id that was never registered
    UnknownClassMetadata(i32),
    /// A class layout or library was declared twice under the same id
    DuplicateClassMetadata(i32),
    /// A class declared membership in a library that was never declared
    UnknownLibrary(i32),
    /// A primitive kind byte not present in the format's primitive table: (kind, position)
    BadPrimitive(u8, usize),
    /// A structurally valid construct this parser does not implement
    UnsupportedFeature(String),
    /// The stream did not begin with a serialization header record
    MissingHeader,
}

impl Display for NrbfError {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> Result {
        match self {
            NrbfError::UnexpectedEof(idx, len) => {
                write!(fmt, "Index {idx:x} is outside of stream length {len:x}!")
            }
            NrbfError::InvalidVarInt(pos) => {
                write!(fmt, "Length prefix at {pos:x} is longer than 5 bytes!")
            }
            NrbfError::InvalidUtf8(why) => write!(fmt, "Unable to decode string data: {why}"),
            NrbfError::UnknownRecord(tag, pos) => {
                write!(fmt, "Unknown record tag {tag:#04x} at {pos:x}!")
            }
            NrbfError::RecordTagMismatch(expected, got, pos) => {
                write!(
                    fmt,
                    "Expected record tag {expected:#04x} but found {got:#04x} at {pos:x}!"
                )
            }
            NrbfError::UnknownClassMetadata(id) => {
                write!(fmt, "No class metadata registered under object id {id}!")
            }
            NrbfError::DuplicateClassMetadata(id) => {
                write!(fmt, "Metadata already registered under id {id}!")
            }
            NrbfError::UnknownLibrary(id) => write!(fmt, "No library declared with id {id}!"),
            NrbfError::BadPrimitive(kind, pos) => {
                write!(fmt, "Unknown primitive kind {kind:#04x} at {pos:x}!")
            }
            NrbfError::UnsupportedFeature(detail) => write!(fmt, "Unsupported feature: {detail}"),
            NrbfError::MissingHeader => {
                write!(fmt, "Stream does not begin with a serialization header!")
            }
        }
    }
}
