use clap::{Parser, Subcommand, ValueEnum};
use fragmerge_core::MergeStrategy;
use std::path::PathBuf;

/// JSON Configuration Fragment Merger
///
/// Merge JSON configuration fragments from files and folders into a single document
#[derive(Parser, Debug)]
#[command(name = "fragmerge")]
#[command(about, long_about = None, version)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Merge fragments into one configuration document
    Merge {
        /// Input file or folder, `-` for standard input (repeatable)
        #[arg(short = 'i', long = "input", value_name = "PATH", required = true)]
        inputs: Vec<PathBuf>,

        /// Merge strategy
        #[arg(
            short,
            long,
            value_enum,
            env = "FRAGMERGE_STRATEGY",
            default_value = "generic"
        )]
        strategy: StrategyKind,

        /// Write the merged document to a file instead of stdout
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,

        /// Indent the output
        #[arg(long)]
        pretty: bool,
    },

    /// List resolved fragment files in merge order
    Files {
        /// Input file or folder, `-` for standard input (repeatable)
        #[arg(short = 'i', long = "input", value_name = "PATH", required = true)]
        inputs: Vec<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum StrategyKind {
    /// Schema-free merge, strips priority hints (default)
    Generic,
    /// Known top-level sections only, keeps section text verbatim
    Schema,
}

impl From<StrategyKind> for MergeStrategy {
    fn from(kind: StrategyKind) -> Self {
        match kind {
            StrategyKind::Generic => Self::Generic,
            StrategyKind::Schema => Self::Schema,
        }
    }
}
