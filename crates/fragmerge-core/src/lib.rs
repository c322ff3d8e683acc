//! # fragmerge-core
//!
//! Core library for merging JSON configuration fragments.
//!
//! Any number of partial, possibly overlapping fragments are folded into one
//! document with deterministic rules, lists are reordered by an optional
//! `priority` hint carried on their elements, and decode failures are
//! reported with the line and character of the offending byte.
//!
//! ```rust
//! use fragmerge_core::{ConfigMerger, MergeStrategy, OutputStyle};
//!
//! let merged = ConfigMerger::merge_slices(
//!     &[
//!         r#"{"outbounds":[{"tag":"x","priority":2}]}"#,
//!         r#"{"outbounds":[{"tag":"y","priority":1}]}"#,
//!     ],
//!     MergeStrategy::Generic,
//! )?;
//!
//! assert_eq!(
//!     merged.to_bytes(OutputStyle::Compact)?,
//!     br#"{"outbounds":[{"tag":"y"},{"tag":"x"}]}"#
//! );
//! # Ok::<_, fragmerge_core::MergeError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Positional JSON decoding
pub mod decoder;

/// Error types
pub mod error;

/// Fragment discovery and loading
pub mod loader;

/// Merge strategies and the priority pass
pub mod merge;

/// Serialization of merged documents
pub mod output;

pub use error::{DecodeError, MergeError, Result};
pub use loader::{FragmentLoader, FragmentSource};
pub use merge::{ConfigMerger, MergeStrategy, MergedDocument, Strategy};
pub use output::OutputStyle;
