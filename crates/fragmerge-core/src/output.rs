//! Rendering of merged documents

use serde::Serialize;

use crate::error::{MergeError, Result};

/// Output layout
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputStyle {
    /// Single line, no insignificant whitespace
    #[default]
    Compact,
    /// Two-space indentation
    Pretty,
}

/// Encode `value` as JSON bytes
///
/// # Errors
///
/// Returns [`MergeError::Serialize`] if the value cannot be encoded.
pub fn render<T: Serialize + ?Sized>(value: &T, style: OutputStyle) -> Result<Vec<u8>> {
    let encoded = match style {
        OutputStyle::Compact => serde_json::to_vec(value),
        OutputStyle::Pretty => serde_json::to_vec_pretty(value),
    };
    encoded.map_err(MergeError::Serialize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_compact() {
        let value = json!({"b": [1, 2], "a": {"c": null}});
        assert_eq!(
            render(&value, OutputStyle::Compact).unwrap(),
            br#"{"b":[1,2],"a":{"c":null}}"#
        );
    }

    #[test]
    fn test_pretty() {
        let value = json!({"port": 1080});
        assert_eq!(
            render(&value, OutputStyle::Pretty).unwrap(),
            b"{\n  \"port\": 1080\n}"
        );
    }

    #[test]
    fn test_large_integers_are_exact() {
        let value: serde_json::Value =
            serde_json::from_str(r#"{"max": 18446744073709551615, "min": -9223372036854775808}"#)
                .unwrap();
        assert_eq!(
            render(&value, OutputStyle::Compact).unwrap(),
            br#"{"max":18446744073709551615,"min":-9223372036854775808}"#
        );
    }
}
