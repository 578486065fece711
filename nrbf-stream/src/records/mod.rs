/*!
 Contains logic and data structures used to parse serialized record streams into native Rust data structures.

 ## Overview

 The .NET Remoting Binary Format is a record-based binary serialization protocol produced by the
 `BinaryFormatter` class. A stream begins with a serialization header record and continues with a
 sequence of tagged records describing libraries, classes, arrays, strings, and primitive values,
 terminated by a message-end record.

 ## Wire grammar

 The grammar is specified in [MS-NRBF](https://learn.microsoft.com/en-us/openspecs/windows_protocols/ms-nrbf/75b9fe09-be15-475f-85b8-ae7b7558cfe5).
 All multi-byte integers are little-endian; strings are UTF-8 prefixed with a 7-bit variable-length count.

 ## Features

 - Record-dispatched pull parsing over a seekable byte cursor
 - Class layouts registered per parse so later records can reuse them by id
 - Recursive descent into serialized payloads embedded in byte arrays
*/

pub mod cursor;
pub mod models;
pub mod parser;
mod tests;
