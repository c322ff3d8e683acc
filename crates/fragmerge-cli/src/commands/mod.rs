pub mod common;
pub mod files;
pub mod merge;

pub use common::OutputOptions;
pub use files::Files;
pub use merge::Merge;
