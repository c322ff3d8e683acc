//! Error types for fragment loading, decoding and merging

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using [`MergeError`]
pub type Result<T> = std::result::Result<T, MergeError>;

/// A fragment could not be decoded into the requested shape.
///
/// The decoder tries to attach the line and character of the offending byte
/// before giving up and reporting the bare cause.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Syntax or type error whose position could be resolved
    #[error("failed to read config file at line {line} char {column}")]
    Located {
        /// 1-based line number
        line: usize,
        /// 0-based character count since the last newline
        column: usize,
        /// Underlying decoder error
        #[source]
        source: serde_json::Error,
    },

    /// Any failure without a resolvable position
    #[error("failed to read config file")]
    Unlocated {
        /// Underlying cause
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Errors surfaced by a merge invocation.
///
/// Every variant is fatal; the first one encountered aborts the whole merge.
#[derive(Debug, Error)]
pub enum MergeError {
    /// An input path is missing or unreadable
    #[error("failed to access {}", path.display())]
    Io {
        /// Offending path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Directory traversal failed while expanding a folder input
    #[error("failed to walk directory {}", path.display())]
    Walk {
        /// Folder being expanded
        path: PathBuf,
        /// Underlying traversal error
        #[source]
        source: walkdir::Error,
    },

    /// A fragment failed to decode
    #[error("invalid fragment {origin}")]
    Decode {
        /// Display name of the fragment's source
        origin: String,
        /// Positional diagnostic
        #[source]
        error: DecodeError,
    },

    /// Accumulator and fragment disagree on the kind of a key
    #[error("value type of key ({key}) mismatch, source is '{kind}' but target not")]
    TypeMismatch {
        /// Dotted path of the conflicting key
        key: String,
        /// Kind of the fragment's value
        kind: &'static str,
    },

    /// No fragment was resolved from the given paths
    #[error("no configuration fragments found in the given paths")]
    EmptyInput,

    /// The merged document could not be encoded
    #[error("failed to encode merged configuration")]
    Serialize(#[source] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_mismatch_message() {
        let err = MergeError::TypeMismatch {
            key: "outbounds".to_string(),
            kind: "array",
        };

        assert_eq!(
            err.to_string(),
            "value type of key (outbounds) mismatch, source is 'array' but target not"
        );
    }

    #[test]
    fn test_decode_error_messages() {
        let cause = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let located = DecodeError::Located {
            line: 3,
            column: 5,
            source: cause,
        };
        assert_eq!(
            located.to_string(),
            "failed to read config file at line 3 char 5"
        );

        let unlocated = DecodeError::Unlocated {
            source: Box::new(std::io::Error::other("boom")),
        };
        assert_eq!(unlocated.to_string(), "failed to read config file");
    }

    #[test]
    fn test_decode_context_names_source() {
        let err = MergeError::Decode {
            origin: "conf/01.json".to_string(),
            error: DecodeError::Unlocated {
                source: Box::new(std::io::Error::other("boom")),
            },
        };
        assert_eq!(err.to_string(), "invalid fragment conf/01.json");
        assert!(std::error::Error::source(&err).is_some());
    }
}
