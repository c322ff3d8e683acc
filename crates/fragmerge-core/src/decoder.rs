//! Positional JSON decoding
//!
//! A fragment is read once into a buffer, comments are blanked out in place,
//! and the same buffer is handed to `serde_json`. When decoding fails, the
//! reported position is turned back into a byte offset and the buffer is
//! rescanned so the diagnostic names the line and character of the offending
//! byte in the input as the operator wrote it.

mod comments;

use std::io::Read;

use serde::de::DeserializeOwned;
use serde_json::error::Category;

pub use comments::strip_comments;

use crate::error::DecodeError;

/// Initial capacity of the buffer a fragment is read into
const INITIAL_CAPACITY: usize = 10 * 1024;

/// Location of an offending byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    /// 1-based line number
    pub line: usize,
    /// 0-based character count since the last newline
    pub column: usize,
}

/// Translate a decoder offset into a line and character.
///
/// `offset` is the number of bytes the decoder consumed when it failed, so
/// the offending byte is `bytes[offset - 1]`. Returns `None` when the offset
/// does not point into `bytes`.
#[must_use]
pub fn find_offset(bytes: &[u8], offset: usize) -> Option<Position> {
    if offset == 0 || offset > bytes.len() {
        return None;
    }

    let consumed = &bytes[..offset - 1];
    let line = 1 + consumed.iter().filter(|&&b| b == b'\n').count();
    let line_start = consumed
        .iter()
        .rposition(|&b| b == b'\n')
        .map_or(0, |newline| newline + 1);

    Some(Position {
        line,
        column: count_chars(&consumed[line_start..]),
    })
}

/// Decode a value from `reader`, buffering everything it yields.
///
/// The reader is consumed exactly once, so non-seekable sources such as
/// standard input are fine.
///
/// # Errors
///
/// Returns [`DecodeError::Located`] when the failure can be pinned to a byte
/// of the input, and [`DecodeError::Unlocated`] otherwise (including read
/// failures).
pub fn decode_json<T, R>(mut reader: R) -> Result<T, DecodeError>
where
    T: DeserializeOwned,
    R: Read,
{
    let mut content = Vec::with_capacity(INITIAL_CAPACITY);
    reader
        .read_to_end(&mut content)
        .map_err(|e| DecodeError::Unlocated {
            source: Box::new(e),
        })?;

    decode_bytes(content)
}

/// Decode a value from an already buffered fragment.
///
/// # Errors
///
/// See [`decode_json`].
pub fn decode_bytes<T: DeserializeOwned>(mut content: Vec<u8>) -> Result<T, DecodeError> {
    strip_comments(&mut content);
    serde_json::from_slice(&content).map_err(|err| locate(&content, err))
}

fn locate(content: &[u8], err: serde_json::Error) -> DecodeError {
    let position = match err.classify() {
        Category::Syntax | Category::Data | Category::Eof => {
            offset_of(content, err.line(), err.column()).and_then(|o| find_offset(content, o))
        }
        Category::Io => None,
    };

    match position {
        Some(Position { line, column }) => DecodeError::Located {
            line,
            column,
            source: err,
        },
        None => DecodeError::Unlocated {
            source: Box::new(err),
        },
    }
}

/// Convert `serde_json`'s line and byte column back into a consumed offset.
///
/// A line of `0` means the error carries no position. Type errors point at
/// the offending byte rather than past it (column `0` at the start of a
/// line), and end-of-input errors point past the last byte; both are clamped
/// onto a byte of the buffer.
fn offset_of(bytes: &[u8], line: usize, column: usize) -> Option<usize> {
    if line == 0 {
        return None;
    }

    let line_start = if line == 1 {
        0
    } else {
        bytes
            .iter()
            .enumerate()
            .filter(|(_, b)| **b == b'\n')
            .nth(line - 2)
            .map(|(newline, _)| newline + 1)?
    };

    Some((line_start + column.max(1)).min(bytes.len()))
}

fn count_chars(bytes: &[u8]) -> usize {
    // continuation bytes look like 0b10xx_xxxx
    bytes.iter().filter(|&&b| b & 0xC0 != 0x80).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Map, Value, json};

    #[test]
    fn test_find_offset_third_line() {
        // lines of 5, 6 and 6 bytes including newlines
        let bytes = b"abcd\nabcde\nabcde\n";
        assert_eq!(bytes.len(), 17);

        let pos = find_offset(bytes, 17).unwrap();
        assert_eq!(pos, Position { line: 3, column: 5 });
    }

    #[test]
    fn test_find_offset_first_byte() {
        assert_eq!(
            find_offset(b"{}", 1),
            Some(Position { line: 1, column: 0 })
        );
    }

    #[test]
    fn test_find_offset_out_of_range() {
        assert_eq!(find_offset(b"{}", 0), None);
        assert_eq!(find_offset(b"{}", 3), None);
        assert_eq!(find_offset(b"", 1), None);
    }

    #[test]
    fn test_find_offset_counts_characters() {
        let bytes = "{\"k\": \"é\" x".as_bytes();
        // offending byte is the trailing 'x'
        let pos = find_offset(bytes, bytes.len()).unwrap();
        assert_eq!(pos, Position { line: 1, column: 10 });
    }

    #[test]
    fn test_decode_valid_fragment() {
        let input = br#"{"log": {"loglevel": "warning"}, "port": 1080}"#;
        let value: Map<String, Value> = decode_json(&input[..]).unwrap();

        assert_eq!(value["port"], json!(1080));
        assert_eq!(value["log"]["loglevel"], json!("warning"));
    }

    #[test]
    fn test_decode_syntax_error_is_located() {
        let input = b"{\n  \"a\": 1,\n  \"b\" 2\n}\n";
        let err = decode_json::<Map<String, Value>, _>(&input[..]).unwrap_err();

        match err {
            DecodeError::Located { line, column, .. } => {
                assert_eq!(line, 3);
                // the '2' that should have been a ':'
                assert_eq!(column, 6);
            }
            DecodeError::Unlocated { .. } => panic!("expected a located error"),
        }
    }

    #[test]
    fn test_decode_type_error_is_located() {
        let input = b"[1, 2]";
        let err = decode_json::<Map<String, Value>, _>(&input[..]).unwrap_err();

        assert!(matches!(err, DecodeError::Located { line: 1, .. }));
    }

    #[test]
    fn test_decode_with_comments() {
        let input = b"{\n  // proxy port\n  \"port\": 1080, /* inline */ \"x\": true\n}";
        let value: Map<String, Value> = decode_json(&input[..]).unwrap();

        assert_eq!(value["port"], json!(1080));
        assert_eq!(value["x"], json!(true));
    }

    #[test]
    fn test_decode_error_position_survives_comments() {
        let input = b"{\n  /* a\n     b */\n  \"port\": ,\n}";
        let err = decode_json::<Map<String, Value>, _>(&input[..]).unwrap_err();

        assert!(err.to_string().starts_with("failed to read config file at line 4"));
    }

    #[test]
    fn test_decode_truncated_input_points_at_last_byte() {
        let input = b"{\n  \"port\": 1080\n";
        let err = decode_json::<Map<String, Value>, _>(&input[..]).unwrap_err();

        match err {
            DecodeError::Located { line, column, .. } => {
                assert_eq!(line, 2);
                assert_eq!(column, 14);
            }
            DecodeError::Unlocated { .. } => panic!("expected a located error"),
        }
    }

    #[test]
    fn test_decode_empty_input_is_unlocated() {
        let err = decode_json::<Map<String, Value>, _>(&b""[..]).unwrap_err();
        assert!(matches!(err, DecodeError::Unlocated { .. }));
    }

    #[test]
    fn test_decode_read_failure_is_unlocated() {
        struct Broken;
        impl Read for Broken {
            fn read(&mut self, _: &mut [u8]) -> std::io::Result<usize> {
                Err(std::io::Error::other("device gone"))
            }
        }

        let err = decode_json::<Value, _>(Broken).unwrap_err();
        assert!(matches!(err, DecodeError::Unlocated { .. }));
        assert_eq!(err.to_string(), "failed to read config file");
    }

    #[test]
    fn test_offset_of_maps_lines() {
        let bytes = b"ab\ncd\nef";
        assert_eq!(offset_of(bytes, 1, 2), Some(2));
        assert_eq!(offset_of(bytes, 1, 0), Some(1));
        assert_eq!(offset_of(bytes, 3, 1), Some(7));
        assert_eq!(offset_of(bytes, 3, 5), Some(8));
        assert_eq!(offset_of(bytes, 4, 1), None);
        assert_eq!(offset_of(bytes, 0, 0), None);
    }
}
