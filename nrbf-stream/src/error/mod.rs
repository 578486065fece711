/*!
 This module defines the errors that can happen when decoding serialized payloads.
*/

pub mod nrbf;
pub mod viewstate;
