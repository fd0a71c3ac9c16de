use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Root of the application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub view: ViewConfig,
    #[serde(default)]
    pub style: StyleConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

impl AppConfig {
    /// Loads configuration from an explicit path.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Discovery chain: `CADVIEW_CONFIG` env var, then
    /// `./config/default.toml`, else built-in defaults.
    pub fn discover() -> Result<Self, ConfigError> {
        if let Some(path) = env::var_os("CADVIEW_CONFIG") {
            return Self::from_file(PathBuf::from(path));
        }

        let default_path = env::current_dir()
            .map(|dir| dir.join("config").join("default.toml"))
            .map_err(|source| ConfigError::Context {
                message: "failed to resolve the current working directory".to_string(),
                source,
            })?;

        if default_path.exists() {
            Self::from_file(default_path)
        } else {
            Ok(Self::default())
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "LoggingConfig::default_level")]
    pub level: String,
}

impl LoggingConfig {
    fn default_level() -> String {
        "info".to_string()
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
        }
    }
}

/// Fit parameters for the render pass.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ViewConfig {
    /// Fraction of the fitted scale to use, reserving margin (0..=1).
    #[serde(default = "ViewConfig::default_margin_factor")]
    pub margin_factor: f64,
    /// Scale substituted when the drawing extent is degenerate.
    #[serde(default = "ViewConfig::default_fallback_scale")]
    pub fallback_scale: f64,
    #[serde(default = "ViewConfig::default_view_width")]
    pub width: f64,
    #[serde(default = "ViewConfig::default_view_height")]
    pub height: f64,
}

impl ViewConfig {
    fn default_margin_factor() -> f64 {
        0.5
    }

    fn default_fallback_scale() -> f64 {
        1.0
    }

    fn default_view_width() -> f64 {
        800.0
    }

    fn default_view_height() -> f64 {
        600.0
    }
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            margin_factor: Self::default_margin_factor(),
            fallback_scale: Self::default_fallback_scale(),
            width: Self::default_view_width(),
            height: Self::default_view_height(),
        }
    }
}

/// Stroke styling. Defaults mirror the classic viewer: red outlines of
/// width 1, arcs drawn black with a red fill.
#[derive(Debug, Clone, Deserialize)]
pub struct StyleConfig {
    #[serde(default = "StyleConfig::default_stroke")]
    pub stroke: String,
    #[serde(default = "StyleConfig::default_stroke_width")]
    pub stroke_width: f64,
    #[serde(default = "StyleConfig::default_arc_stroke")]
    pub arc_stroke: String,
    #[serde(default = "StyleConfig::default_arc_fill")]
    pub arc_fill: String,
}

impl StyleConfig {
    fn default_stroke() -> String {
        "#ff0000".to_string()
    }

    fn default_stroke_width() -> f64 {
        1.0
    }

    fn default_arc_stroke() -> String {
        "#000000".to_string()
    }

    fn default_arc_fill() -> String {
        "#ff0000".to_string()
    }
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            stroke: Self::default_stroke(),
            stroke_width: Self::default_stroke_width(),
            arc_stroke: Self::default_arc_stroke(),
            arc_fill: Self::default_arc_fill(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    /// Directory for rendered files when `--out` is not given.
    #[serde(default)]
    pub directory: Option<PathBuf>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("{message}")]
    Context {
        message: String,
        #[source]
        source: std::io::Error,
    },
}
