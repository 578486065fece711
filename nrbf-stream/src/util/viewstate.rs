/*!
 Contains logic to unwrap the ASP.NET [`__VIEWSTATE`](https://learn.microsoft.com/en-us/previous-versions/aspnet/ms972976(v=msdn.10)) envelope around a serialized payload.

 View state arrives as base64 text, often URL-escaped and wrapped across lines by the
 tooling that captured it. This helper tolerates those transport artifacts and returns
 the raw bytes. It does not validate a MAC or decrypt protected view state; a payload
 that is not a serialized stream is still returned so the parser can report the real
 diagnostic.
*/

use base64::{prelude::BASE64_STANDARD, Engine};

use crate::error::viewstate::ViewStateError;

/// Decode `__VIEWSTATE` text into the raw payload bytes.
///
/// URL escapes for the base64 alphabet's symbol characters are reversed and all
/// whitespace is stripped before decoding.
///
/// # Example:
///
/// ```
/// use nrbf_stream::util::viewstate::decode_envelope;
///
/// let bytes = decode_envelope("/wEWAgL%2B26rYBgKM54rGBg%3d%3d").unwrap();
/// assert_eq!(bytes.first(), Some(&0xff));
/// ```
pub fn decode_envelope(text: &str) -> Result<Vec<u8>, ViewStateError> {
    let unescaped = text
        .replace("%2B", "+")
        .replace("%2b", "+")
        .replace("%2F", "/")
        .replace("%2f", "/")
        .replace("%3D", "=")
        .replace("%3d", "=");
    let compact: String = unescaped.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() {
        return Err(ViewStateError::EmptyPayload);
    }
    BASE64_STANDARD
        .decode(compact.as_bytes())
        .map_err(ViewStateError::InvalidBase64)
}

#[cfg(test)]
mod tests {
    use crate::{error::viewstate::ViewStateError, util::viewstate::decode_envelope};

    #[test]
    fn can_decode_plain_base64() {
        let result = decode_envelope("AAECAw==").unwrap();
        assert_eq!(result, vec![0, 1, 2, 3]);
    }

    #[test]
    fn can_decode_url_escaped() {
        let result = decode_envelope("AAECAw%3D%3D").unwrap();
        assert_eq!(result, vec![0, 1, 2, 3]);
    }

    #[test]
    fn can_decode_wrapped_lines() {
        let result = decode_envelope("AAEC\nAw==\n").unwrap();
        assert_eq!(result, vec![0, 1, 2, 3]);
    }

    #[test]
    fn cant_decode_empty() {
        assert!(matches!(
            decode_envelope("  \n "),
            Err(ViewStateError::EmptyPayload)
        ));
    }

    #[test]
    fn cant_decode_invalid() {
        assert!(matches!(
            decode_envelope("not*base64*at*all"),
            Err(ViewStateError::InvalidBase64(_))
        ));
    }
}
