//! Configuration loading and parsing

use anyhow::{bail, Context, Result};
use collision_detector::ChannelBinding;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main application configuration (loaded from config.toml)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub pairs: Vec<ChannelBinding>,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct InputConfig {
    #[serde(default)]
    pub files: Vec<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
    /// Report destination (stdout when absent)
    pub file: Option<PathBuf>,
    #[serde(default = "default_true")]
    pub include_summary: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            file: None,
            include_summary: true,
        }
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Txt,
    Json,
}

impl AppConfig {
    /// Channel pairs to analyze; a single default pair when none are configured
    pub fn bindings(&self) -> Vec<ChannelBinding> {
        if self.pairs.is_empty() {
            vec![ChannelBinding::default()]
        } else {
            self.pairs.clone()
        }
    }

    /// Check that the configuration describes at least one runnable job
    pub fn validate(&self) -> Result<()> {
        if self.input.files.is_empty() {
            bail!("No input files given (pass FILES or set [input] files in the config)");
        }

        for pair in &self.pairs {
            if pair.is_self_paired() {
                log::warn!(
                    "Pair '{}' / '{}' monitors a single channel",
                    pair.channel1,
                    pair.channel2
                );
            }
        }

        Ok(())
    }
}

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: AppConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    Ok(config)
}
