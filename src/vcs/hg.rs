//! Mercurial support.

mod content;
mod log;
pub mod parser;

pub use content::HgLogFileContent;
pub use log::{command_line, HgLog};
