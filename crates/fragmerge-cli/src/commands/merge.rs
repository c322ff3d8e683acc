use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::Context;
use fragmerge_core::{ConfigMerger, MergeStrategy};
use tracing::info;

use super::OutputOptions;

pub struct Merge;

impl Merge {
    pub fn execute(
        inputs: &[PathBuf],
        strategy: MergeStrategy,
        options: &OutputOptions,
    ) -> anyhow::Result<()> {
        let merged = ConfigMerger::merge_paths(inputs, strategy)?;

        let mut bytes = merged.to_bytes(options.style)?;
        bytes.push(b'\n');

        match options.output {
            Some(path) => {
                fs::write(path, &bytes)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                info!(path = %path.display(), "merged configuration written");
            }
            None => {
                let mut stdout = io::stdout().lock();
                stdout
                    .write_all(&bytes)
                    .and_then(|()| stdout.flush())
                    .context("Failed to write to stdout")?;
            }
        }

        Ok(())
    }
}
