//! Fragment merging
//!
//! Fragments are folded left to right into a single accumulator, then a
//! finishing pass reorders lists by their `priority` hint. Two strategies
//! implement that contract:
//!
//! - [`GenericMerge`]: schema-free, works on any JSON object and removes the
//!   hint everywhere
//! - [`SchemaMerge`]: knows the top-level sections, keeps each section's
//!   original text, only reorders routing rules and outbounds and leaves the
//!   hint in place
//!
//! Their output is not interchangeable byte for byte.

mod generic;
mod priority;
mod schema;


use std::fmt;
use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::debug;

pub use generic::{GenericMerge, is_zero, kind_of, merge_maps};
pub use priority::{PRIORITY_KEY, priority_of, sort_by_priority, sort_lists, strip_priority};
pub use schema::{ConfigDocument, RawSection, RoutingSection, SchemaMerge};

use crate::decoder::decode_bytes;
use crate::error::{MergeError, Result};
use crate::loader::{FragmentLoader, FragmentSource};
use crate::output::{OutputStyle, render};

/// One way of folding fragments into an accumulator
pub trait Strategy {
    /// Shape every fragment is decoded into, and the accumulator's shape
    type Document: DeserializeOwned + Serialize + Default;

    /// Fold `fragment` into `accumulator`, mutating it in place
    ///
    /// # Errors
    ///
    /// Returns [`MergeError::TypeMismatch`] when the two disagree on the kind
    /// of a key.
    fn fold(accumulator: &mut Self::Document, fragment: Self::Document) -> Result<()>;

    /// Post-merge pass run once after the last fragment
    ///
    /// # Errors
    ///
    /// Implementations may fail if the accumulator cannot be finalised.
    fn finish(accumulator: &mut Self::Document) -> Result<()>;
}

/// Strategy selector
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MergeStrategy {
    /// Schema-free merge, see [`GenericMerge`]
    #[default]
    Generic,
    /// Known-sections merge, see [`SchemaMerge`]
    Schema,
}

impl fmt::Display for MergeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Generic => f.write_str("generic"),
            Self::Schema => f.write_str("schema"),
        }
    }
}

/// Result of a merge, in the shape of the strategy that produced it
#[derive(Debug)]
pub enum MergedDocument {
    /// Output of [`GenericMerge`]
    Generic(Map<String, Value>),
    /// Output of [`SchemaMerge`]
    Schema(ConfigDocument),
}

impl MergedDocument {
    /// Serialize the merged document
    ///
    /// # Errors
    ///
    /// Returns [`MergeError::Serialize`] if encoding fails.
    pub fn to_bytes(&self, style: OutputStyle) -> Result<Vec<u8>> {
        match self {
            Self::Generic(map) => render(map, style),
            Self::Schema(document) => render(document, style),
        }
    }
}

/// Configuration merger
pub struct ConfigMerger;

impl Default for ConfigMerger {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigMerger {
    /// Create a new config merger
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Resolve `paths`, then merge every fragment found
    ///
    /// # Errors
    ///
    /// Returns the first [`MergeError`] met while resolving, decoding or
    /// folding. No partial result is produced.
    pub fn merge_paths<P: AsRef<Path>>(
        paths: &[P],
        strategy: MergeStrategy,
    ) -> Result<MergedDocument> {
        let sources = FragmentLoader::resolve(paths)?;
        Self::merge_sources(&sources, strategy)
    }

    /// Merge already resolved fragment sources, in order
    ///
    /// Every fragment is read and decoded before the first fold.
    ///
    /// # Errors
    ///
    /// See [`ConfigMerger::merge_paths`].
    pub fn merge_sources(
        sources: &[FragmentSource],
        strategy: MergeStrategy,
    ) -> Result<MergedDocument> {
        debug!(count = sources.len(), %strategy, "merging fragments");

        match strategy {
            MergeStrategy::Generic => {
                let fragments = Self::load_all::<GenericMerge>(sources)?;
                Self::fold::<GenericMerge>(fragments).map(MergedDocument::Generic)
            }
            MergeStrategy::Schema => {
                let fragments = Self::load_all::<SchemaMerge>(sources)?;
                Self::fold::<SchemaMerge>(fragments).map(MergedDocument::Schema)
            }
        }
    }

    /// Merge in-memory fragments, in order
    ///
    /// Fragments are named `fragment #1`, `fragment #2`... in diagnostics.
    ///
    /// # Errors
    ///
    /// See [`ConfigMerger::merge_paths`].
    pub fn merge_slices<B: AsRef<[u8]>>(
        fragments: &[B],
        strategy: MergeStrategy,
    ) -> Result<MergedDocument> {
        match strategy {
            MergeStrategy::Generic => {
                let fragments = Self::decode_all::<GenericMerge, B>(fragments)?;
                Self::fold::<GenericMerge>(fragments).map(MergedDocument::Generic)
            }
            MergeStrategy::Schema => {
                let fragments = Self::decode_all::<SchemaMerge, B>(fragments)?;
                Self::fold::<SchemaMerge>(fragments).map(MergedDocument::Schema)
            }
        }
    }

    /// Fold decoded fragments with strategy `S` and run its finishing pass
    ///
    /// # Errors
    ///
    /// Returns [`MergeError::EmptyInput`] for an empty list, or the first
    /// error raised by the strategy.
    pub fn fold<S: Strategy>(fragments: Vec<S::Document>) -> Result<S::Document> {
        if fragments.is_empty() {
            return Err(MergeError::EmptyInput);
        }

        let mut accumulator = S::Document::default();
        for (index, fragment) in fragments.into_iter().enumerate() {
            S::fold(&mut accumulator, fragment)?;
            debug!(fragment = index + 1, "folded fragment");
        }

        S::finish(&mut accumulator)?;
        Ok(accumulator)
    }

    fn load_all<S: Strategy>(sources: &[FragmentSource]) -> Result<Vec<S::Document>> {
        sources.iter().map(FragmentLoader::load::<S::Document>).collect()
    }

    fn decode_all<S: Strategy, B: AsRef<[u8]>>(fragments: &[B]) -> Result<Vec<S::Document>> {
        fragments
            .iter()
            .enumerate()
            .map(|(index, bytes)| {
                decode_bytes(bytes.as_ref().to_vec()).map_err(|error| MergeError::Decode {
                    origin: format!("fragment #{}", index + 1),
                    error,
                })
            })
            .collect()
    }
}
