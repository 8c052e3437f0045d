//! CLI interface for vcs-log.

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;

pub mod content;
pub mod log;

use crate::utils::Settings;
use crate::vcs::VcsSettings;

/// vcs-log: reads commit history from git and Mercurial repositories.
#[derive(Parser)]
#[command(name = "vcs-log")]
#[command(about = "Reads commit history from git and Mercurial repositories", long_about = None)]
#[command(version)]
pub struct Cli {
    /// The main command to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Main commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Lists commits and their file changes within a date range.
    Log(log::LogCommand),
    /// Prints one file as of one revision.
    Content(content::ContentCommand),
}

impl Cli {
    /// Executes the CLI command.
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Log(log_cmd) => log_cmd.execute().await,
            Commands::Content(content_cmd) => content_cmd.execute(),
        }
    }
}

/// Serialization format for command output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// YAML.
    Yaml,
    /// Pretty-printed JSON.
    Json,
}

impl OutputFormat {
    /// Renders `value` in this format.
    pub fn render<T: Serialize>(self, value: &T) -> Result<String> {
        match self {
            Self::Yaml => serde_yaml::to_string(value).context("Failed to serialize output as YAML"),
            Self::Json => {
                serde_json::to_string_pretty(value).context("Failed to serialize output as JSON")
            }
        }
    }
}

/// Parses an RFC 3339 timestamp or a `YYYY-MM-DD` date (midnight UTC).
pub fn parse_date(s: &str) -> Result<DateTime<Utc>> {
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(s) {
        return Ok(timestamp.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d").with_context(|| {
        format!("Invalid date '{s}'. Expected YYYY-MM-DD or an RFC 3339 timestamp")
    })?;
    date.and_hms_opt(0, 0, 0)
        .map(|midnight| midnight.and_utc())
        .with_context(|| format!("Invalid date '{s}'"))
}

/// Loads settings from the default location and applies CLI overrides.
pub(crate) fn load_vcs_settings(auto_detect_charset: bool) -> Result<VcsSettings> {
    let settings = Settings::load().context("Failed to load settings")?;
    let mut vcs = settings.to_vcs_settings()?;
    if auto_detect_charset {
        vcs.runner = vcs.runner.with_charset_auto_detect(true);
    }
    Ok(vcs)
}
