//! Reading stream inputs.
//!
//! Streams are read to completion before parsing. The read is bounded with
//! `Read::take` so an oversized input is detected without buffering more than
//! `limit + 1` bytes.

use std::io::Read;

use crate::error::ParseError;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Read a whole stream, failing once it grows past `limit` bytes.
///
/// # Errors
///
/// Returns `ParseError::Io` on a read failure and `ParseError::InputTooLarge`
/// if the stream holds more than `limit` bytes.
pub fn read_bounded<R: Read>(reader: R, limit: u64) -> Result<Vec<u8>, ParseError> {
    let mut buffer = Vec::new();
    reader
        .take(limit.saturating_add(1))
        .read_to_end(&mut buffer)?;

    if buffer.len() as u64 > limit {
        return Err(ParseError::InputTooLarge { limit });
    }

    Ok(buffer)
}

/// Drop a leading UTF-8 byte order mark.
pub fn strip_bom_bytes(bytes: &[u8]) -> &[u8] {
    bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes)
}

/// Drop a leading byte order mark from text.
pub fn strip_bom(text: &str) -> &str {
    text.strip_prefix('\u{feff}').unwrap_or(text)
}

/// Read a whole stream as UTF-8 text without a byte order mark.
///
/// # Errors
///
/// As [`read_bounded`], plus `ParseError::InvalidEncoding` when the bytes are
/// not valid UTF-8.
pub fn read_text<R: Read>(reader: R, limit: u64) -> Result<String, ParseError> {
    let mut bytes = read_bounded(reader, limit)?;
    if bytes.starts_with(UTF8_BOM) {
        bytes.drain(..UTF8_BOM.len());
    }
    String::from_utf8(bytes).map_err(|_| ParseError::InvalidEncoding)
}
