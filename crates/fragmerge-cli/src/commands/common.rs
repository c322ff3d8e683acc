//! Common types and utilities for command execution

use std::path::Path;

use fragmerge_core::OutputStyle;

/// Where and how the merged document is written
pub struct OutputOptions<'a> {
    /// Destination file, stdout when `None`
    pub output: Option<&'a Path>,
    /// Compact or indented rendering
    pub style: OutputStyle,
}

impl<'a> OutputOptions<'a> {
    /// Create new output options
    #[must_use]
    pub const fn new(output: Option<&'a Path>, pretty: bool) -> Self {
        let style = if pretty {
            OutputStyle::Pretty
        } else {
            OutputStyle::Compact
        };

        Self { output, style }
    }
}
