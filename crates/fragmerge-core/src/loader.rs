//! Fragment discovery and loading
//!
//! Input paths are resolved into an ordered list of fragment sources:
//! folders expand to the `.json` / `.jsonc` files below them (sorted, walked
//! recursively), files pass through unchanged, and `-` stands for standard
//! input. Order matters because fragments are folded left to right.

use std::fmt;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use tracing::debug;
use walkdir::WalkDir;

use crate::decoder::decode_json;
use crate::error::{MergeError, Result};

/// Extensions recognised as configuration fragments inside folders
const FRAGMENT_EXTENSIONS: [&str; 2] = ["json", "jsonc"];

/// Path spelling that selects standard input
const STDIN_PATH: &str = "-";

/// Where a fragment is read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FragmentSource {
    /// A file on disk
    File(PathBuf),
    /// Standard input, read once
    Stdin,
}

impl FragmentSource {
    /// Path of the fragment, `None` for standard input
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::File(path) => Some(path),
            Self::Stdin => None,
        }
    }
}

impl fmt::Display for FragmentSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Stdin => f.write_str("<stdin>"),
        }
    }
}

/// Fragment loader
pub struct FragmentLoader;

impl Default for FragmentLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl FragmentLoader {
    /// Create a new fragment loader
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Resolve input paths into fragment sources, in fold order
    ///
    /// # Errors
    ///
    /// Returns [`MergeError::Io`] if a path does not exist,
    /// [`MergeError::Walk`] if a folder cannot be traversed and
    /// [`MergeError::EmptyInput`] if nothing was resolved.
    pub fn resolve<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<FragmentSource>> {
        let mut sources = Vec::new();

        for path in paths {
            let path = path.as_ref();
            if path.as_os_str() == STDIN_PATH {
                sources.push(FragmentSource::Stdin);
                continue;
            }

            let path = expand_home(path);
            let metadata = std::fs::metadata(&path).map_err(|source| MergeError::Io {
                path: path.clone(),
                source,
            })?;

            if metadata.is_dir() {
                let files = Self::scan_folder(&path)?;
                debug!(folder = %path.display(), count = files.len(), "expanded folder");
                sources.extend(files.into_iter().map(FragmentSource::File));
            } else {
                sources.push(FragmentSource::File(path));
            }
        }

        if sources.is_empty() {
            return Err(MergeError::EmptyInput);
        }

        Ok(sources)
    }

    /// Collect fragment files below `folder`, recursively and sorted by name
    ///
    /// # Errors
    ///
    /// Returns [`MergeError::Walk`] if directory traversal fails due to
    /// permission issues or I/O errors.
    pub fn scan_folder(folder: &Path) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();

        for entry in WalkDir::new(folder)
            .follow_links(false)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|source| MergeError::Walk {
                path: folder.to_path_buf(),
                source,
            })?;

            // symlinked fragments are kept; the read follows the link
            if !entry.file_type().is_dir() && is_fragment_file(entry.path()) {
                files.push(entry.into_path());
            }
        }

        Ok(files)
    }

    /// Read and decode one fragment
    ///
    /// # Errors
    ///
    /// Returns [`MergeError::Io`] if the file cannot be opened and
    /// [`MergeError::Decode`] if its content is not a valid fragment.
    pub fn load<T: DeserializeOwned>(source: &FragmentSource) -> Result<T> {
        debug!(source = %source, "loading fragment");

        let decoded = match source {
            FragmentSource::File(path) => {
                let file = File::open(path).map_err(|source| MergeError::Io {
                    path: path.clone(),
                    source,
                })?;
                decode_json(BufReader::new(file))
            }
            FragmentSource::Stdin => decode_json(io::stdin().lock()),
        };

        decoded.map_err(|error| MergeError::Decode {
            origin: source.to_string(),
            error,
        })
    }
}

fn is_fragment_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| FRAGMENT_EXTENSIONS.contains(&ext))
}

/// Expand a leading `~` to the home directory
///
/// Paths without one, or on systems without a home directory, are returned
/// unchanged.
#[must_use]
pub fn expand_home(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };

    match dirs::home_dir() {
        Some(home) => home.join(rest),
        None => path.to_path_buf(),
    }
}
