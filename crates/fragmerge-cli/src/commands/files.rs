use std::io::{self, Write};
use std::path::PathBuf;

use fragmerge_core::FragmentLoader;

pub struct Files;

impl Files {
    pub fn execute(inputs: &[PathBuf]) -> anyhow::Result<()> {
        let sources = FragmentLoader::resolve(inputs)?;

        let mut stdout = io::stdout().lock();
        for source in &sources {
            writeln!(stdout, "{source}")?;
        }

        Ok(())
    }
}
