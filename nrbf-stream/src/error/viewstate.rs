/*!
 Errors that can happen when decoding the ASP.NET `__VIEWSTATE` envelope.
*/

use std::fmt::{Display, Formatter, Result};

use base64::DecodeError;

/// Errors that can happen when decoding the `__VIEWSTATE` envelope
#[derive(Debug)]
pub enum ViewStateError {
    InvalidBase64(DecodeError),
    EmptyPayload,
}

impl Display for ViewStateError {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> Result {
        match self {
            ViewStateError::InvalidBase64(why) => {
                write!(fmt, "Unable to decode base64 payload: {why}")
            }
            ViewStateError::EmptyPayload => write!(fmt, "View state payload is empty!"),
        }
    }
}
