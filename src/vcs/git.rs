//! Git support.

mod content;
mod log;
pub mod parser;
pub mod renames;

pub use content::GitLogFileContent;
pub use log::{command_line, GitLog};
