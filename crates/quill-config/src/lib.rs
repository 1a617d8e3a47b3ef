//! quill configuration
//!
//! Settings are read from `quill.toml`; every field has a default, and environment
//! variables override whatever the file says.

use anyhow::{Context, Result};
use quill_core::YOrigin;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File looked up by [`QuillConfig::load_or_default`].
pub const CONFIG_FILE: &str = "quill.toml";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct QuillConfig {
    /// Font lookup settings
    pub text: TextConfig,
    /// Rasterization settings
    pub render: RenderConfig,
    /// Image export settings
    pub export: ExportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TextConfig {
    /// Family used when a text element names none
    pub default_family: String,
    /// Extra directories scanned for font files
    pub font_dirs: Vec<PathBuf>,
    /// Scan the system font directories
    pub load_system_fonts: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RenderConfig {
    pub anti_alias: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct ExportConfig {
    /// How bottom-origin exports mirror the surface
    pub flip: FlipMode,
    /// Origin used by exports that don't pass one explicitly
    pub y_origin: YOrigin,
}

/// Strategy for producing a vertically mirrored copy of a surface.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum FlipMode {
    /// Blit the pixmap through a mirroring transform.
    #[default]
    Native,
    /// Paint a pattern of the surface onto a second surface.
    Repaint,
}

impl std::str::FromStr for FlipMode {
    type Err = quill_core::Error;

    fn from_str(s: &str) -> quill_core::Result<Self> {
        match s {
            "native" => Ok(FlipMode::Native),
            "repaint" => Ok(FlipMode::Repaint),
            other => Err(quill_core::Error::invalid(format!(
                "unknown flip mode {other:?}"
            ))),
        }
    }
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            default_family: "sans-serif".to_string(),
            font_dirs: Vec::new(),
            load_system_fonts: true,
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self { anti_alias: true }
    }
}

fn env_flag(val: &str) -> bool {
    val == "1" || val.eq_ignore_ascii_case("true")
}

impl QuillConfig {
    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    /// Load `quill.toml` from the current directory, or defaults if it is missing or
    /// unreadable.
    pub fn load_or_default() -> Self {
        match Self::load_from_file(CONFIG_FILE) {
            Ok(config) => config,
            Err(err) => {
                if Path::new(CONFIG_FILE).exists() {
                    log::warn!("ignoring {CONFIG_FILE}: {err:#}");
                }
                Self::default()
            }
        }
    }

    /// Merge configuration with environment variables
    ///
    /// Environment variables take precedence over configuration file values.
    /// Unparseable values are ignored.
    pub fn merge_with_env(&mut self) {
        if let Ok(family) = std::env::var("QUILL_FONT_FAMILY") {
            self.text.default_family = family;
        }
        if let Some(dirs) = std::env::var_os("QUILL_FONT_DIRS") {
            self.text.font_dirs = std::env::split_paths(&dirs).collect();
        }
        if let Ok(val) = std::env::var("QUILL_SYSTEM_FONTS") {
            self.text.load_system_fonts = env_flag(&val);
        }

        if let Ok(val) = std::env::var("QUILL_ANTI_ALIAS") {
            self.render.anti_alias = env_flag(&val);
        }

        if let Ok(val) = std::env::var("QUILL_FLIP") {
            match val.parse() {
                Ok(flip) => self.export.flip = flip,
                Err(err) => log::warn!("QUILL_FLIP: {err}"),
            }
        }
        if let Ok(val) = std::env::var("QUILL_Y_ORIGIN") {
            match val.parse() {
                Ok(origin) => self.export.y_origin = origin,
                Err(err) => log::warn!("QUILL_Y_ORIGIN: {err}"),
            }
        }
    }

    /// Load configuration with environment variable overrides
    ///
    /// 1. Load from quill.toml (or use defaults if not found)
    /// 2. Override with environment variables if present
    pub fn load() -> Self {
        let mut config = Self::load_or_default();
        config.merge_with_env();
        config
    }
}
