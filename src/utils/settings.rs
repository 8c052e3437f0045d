//! Settings and configuration utilities.
//!
//! Settings are read from $HOME/.vcs-log/settings.json. Environment
//! variables take precedence over the file's `env` map.

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use encoding_rs::Encoding;
use serde::Deserialize;

use crate::vcs::VcsSettings;

/// Overrides the git executable.
pub const GIT_PATH_VAR: &str = "VCS_LOG_GIT_PATH";

/// Overrides the Mercurial executable.
pub const HG_PATH_VAR: &str = "VCS_LOG_HG_PATH";

/// Overrides the Subversion executable.
pub const SVN_PATH_VAR: &str = "VCS_LOG_SVN_PATH";

/// Settings loaded from $HOME/.vcs-log/settings.json.
#[derive(Debug, Default, Deserialize)]
pub struct Settings {
    /// Environment variable fallbacks, also passed to every VCS process.
    #[serde(default)]
    pub env: HashMap<String, String>,

    /// Git executable.
    #[serde(default)]
    pub git_path: Option<String>,

    /// Mercurial executable.
    #[serde(default)]
    pub hg_path: Option<String>,

    /// Subversion executable.
    #[serde(default)]
    pub svn_path: Option<String>,

    /// Guess the charset of tool output instead of trusting `output_charset`.
    #[serde(default)]
    pub charset_auto_detect: bool,

    /// WHATWG label of the charset used to decode tool output.
    #[serde(default)]
    pub output_charset: Option<String>,

    /// Maximum concurrent rename lookups.
    #[serde(default)]
    pub rename_parallelism: Option<usize>,
}

impl Settings {
    /// Loads settings from the default location.
    pub fn load() -> Result<Self> {
        let settings_path = Self::get_settings_path()?;
        Self::load_from_path(&settings_path)
    }

    /// Loads settings from a specific path.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        // Missing file means defaults
        if !path.exists() {
            return Ok(Settings::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file: {}", path.display()))?;

        serde_json::from_str::<Settings>(&content)
            .with_context(|| format!("Failed to parse settings file: {}", path.display()))
    }

    /// Returns the default settings path.
    pub fn get_settings_path() -> Result<PathBuf> {
        let home_dir = dirs::home_dir().context("Failed to determine home directory")?;

        Ok(home_dir.join(".vcs-log").join("settings.json"))
    }

    /// Returns an environment variable with fallback to settings.
    pub fn get_env_var(&self, key: &str) -> Option<String> {
        match env::var(key) {
            Ok(value) => Some(value),
            Err(_) => self.env.get(key).cloned(),
        }
    }

    /// Builds the command settings, applying defaults for anything unset.
    pub fn to_vcs_settings(&self) -> Result<VcsSettings> {
        let defaults = VcsSettings::default();

        let mut runner = defaults
            .runner
            .with_charset_auto_detect(self.charset_auto_detect);
        if let Some(label) = &self.output_charset {
            let encoding = Encoding::for_label(label.trim().as_bytes())
                .with_context(|| format!("Unknown output charset: {label}"))?;
            runner = runner.with_output_charset(encoding);
        }

        Ok(VcsSettings {
            git_path: self
                .get_env_var(GIT_PATH_VAR)
                .or_else(|| self.git_path.clone())
                .unwrap_or(defaults.git_path),
            hg_path: self
                .get_env_var(HG_PATH_VAR)
                .or_else(|| self.hg_path.clone())
                .unwrap_or(defaults.hg_path),
            svn_path: self
                .get_env_var(SVN_PATH_VAR)
                .or_else(|| self.svn_path.clone())
                .unwrap_or(defaults.svn_path),
            environment: self.env.clone(),
            runner,
            rename_parallelism: self
                .rename_parallelism
                .unwrap_or(defaults.rename_parallelism)
                .max(1),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use encoding_rs::WINDOWS_1251;
    use std::fs;
    use tempfile::TempDir;

    fn write_settings(json: &str) -> (TempDir, PathBuf) {
        let temp_dir = TempDir::new().unwrap();
        let settings_path = temp_dir.path().join("settings.json");
        fs::write(&settings_path, json).unwrap();
        (temp_dir, settings_path)
    }

    #[test]
    fn settings_load_from_path() {
        let (_dir, path) = write_settings(
            r#"{
                "env": { "LANG": "C", "VCS_LOG_TEST_VAR": "test_value" },
                "hg_path": "/opt/hg/bin/hg",
                "rename_parallelism": 2
            }"#,
        );

        let settings = Settings::load_from_path(&path).unwrap();

        assert_eq!(settings.env.get("VCS_LOG_TEST_VAR").unwrap(), "test_value");
        assert_eq!(settings.hg_path.as_deref(), Some("/opt/hg/bin/hg"));
        assert_eq!(settings.rename_parallelism, Some(2));
        assert!(!settings.charset_auto_detect);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let settings = Settings::load_from_path(temp_dir.path().join("absent.json")).unwrap();
        assert!(settings.env.is_empty());
        assert!(settings.git_path.is_none());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let (_dir, path) = write_settings("{ not json");
        let error = Settings::load_from_path(&path).unwrap_err();
        assert!(error.to_string().starts_with("Failed to parse settings file"));
    }

    #[test]
    fn settings_get_env_var() {
        let (_dir, path) = write_settings(r#"{ "env": { "VCS_LOG_TEST_FALLBACK": "from_file" } }"#);
        let settings = Settings::load_from_path(&path).unwrap();

        env::set_var("VCS_LOG_TEST_FALLBACK", "from_env");
        assert_eq!(settings.get_env_var("VCS_LOG_TEST_FALLBACK").unwrap(), "from_env");

        env::remove_var("VCS_LOG_TEST_FALLBACK");
        assert_eq!(settings.get_env_var("VCS_LOG_TEST_FALLBACK").unwrap(), "from_file");
    }

    #[test]
    fn vcs_settings_from_file() {
        let (_dir, path) = write_settings(
            r#"{
                "env": { "HGPLAIN": "1" },
                "hg_path": "/opt/hg/bin/hg",
                "svn_path": "/opt/svn/bin/svn",
                "output_charset": "windows-1251",
                "charset_auto_detect": true,
                "rename_parallelism": 0
            }"#,
        );

        let vcs = Settings::load_from_path(&path)
            .unwrap()
            .to_vcs_settings()
            .unwrap();

        assert_eq!(vcs.environment.get("HGPLAIN").map(String::as_str), Some("1"));
        if env::var(HG_PATH_VAR).is_err() {
            assert_eq!(vcs.hg_path, "/opt/hg/bin/hg");
        }
        if env::var(SVN_PATH_VAR).is_err() {
            assert_eq!(vcs.svn_path, "/opt/svn/bin/svn");
        }
        assert_eq!(vcs.runner.charset().default_charset, WINDOWS_1251);
        assert!(vcs.runner.charset().auto_detect);
        assert_eq!(vcs.rename_parallelism, 1);
    }

    #[test]
    fn unknown_charset_is_rejected() {
        let settings = Settings {
            output_charset: Some("klingon-8".to_string()),
            ..Settings::default()
        };
        let error = settings.to_vcs_settings().unwrap_err();
        assert!(error.to_string().contains("klingon-8"));
    }
}
