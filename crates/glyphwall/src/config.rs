//! Configuration management for the Glyphwall CLI.

use anyhow::Result;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use glyphwall_common::{CaptchaOptions, GlyphwallError};
use glyphwall_common::constants::DEFAULT_FONT_PATH;

/// Environment variable prefix, e.g. `GLYPHWALL__CAPTCHA__MIN_DOTS=50`
const ENV_PREFIX: &str = "GLYPHWALL";

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Font used to draw glyphs
    #[serde(default = "default_font_path")]
    pub font_path: PathBuf,

    /// Where rendered challenges are written
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Generator options passed through unchanged
    #[serde(default)]
    pub captcha: CaptchaOptions,
}

fn default_font_path() -> PathBuf { PathBuf::from(DEFAULT_FONT_PATH) }
fn default_output_dir() -> PathBuf { PathBuf::from("out") }

impl AppConfig {
    /// Load configuration from file and environment, with CLI overrides
    pub fn load(config_path: &str, args: &super::Args) -> Result<Self> {
        let mut builder = config::Config::builder();
        if Path::new(config_path).exists() {
            builder = builder.add_source(config::File::with_name(config_path));
        } else {
            tracing::warn!(path = config_path, "Config file not found, using defaults");
        }

        let settings = builder
            .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()
            .map_err(|e| {
                GlyphwallError::Config(format!("failed to load {config_path}: {e}"))
            })?;

        let mut config = Self::from_settings(settings)?;

        // Apply CLI overrides
        if let Some(ref font) = args.font {
            config.font_path = font.clone();
        }
        if let Some(ref output) = args.output {
            config.output_dir = output.clone();
        }

        Ok(config)
    }
}

impl AppConfig {
    /// Deserialize merged settings, falling back to defaults per key
    pub fn from_settings(settings: config::Config) -> glyphwall_common::Result<Self> {
        settings
            .try_deserialize()
            .map_err(|e| GlyphwallError::Config(format!("failed to parse settings: {e}")))
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            font_path: default_font_path(),
            output_dir: default_output_dir(),
            captcha: CaptchaOptions::default(),
        }
    }
}
