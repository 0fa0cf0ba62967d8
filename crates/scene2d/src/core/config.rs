//! # Unified Configuration System
//!
//! This module consolidates the engine's configuration structures into a
//! single, coherent system: scene behavior, viewport defaults, and
//! application-level settings.
//!
//! ## Design Goals
//!
//! - **Centralized**: All configuration types in one place for easy discovery
//! - **Serializable**: Support for multiple config file formats (RON, TOML)
//! - **Type Safe**: Strong typing with validation and defaults

use crate::foundation::math::Vec2;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors produced while loading or parsing configuration files
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// The config file is not valid RON
    #[error("failed to parse RON config: {0}")]
    Ron(#[from] ron::error::SpannedError),

    /// The config file is not valid TOML
    #[error("failed to parse TOML config: {0}")]
    Toml(#[from] toml::de::Error),

    /// The config file extension is not a supported format
    #[error("unsupported config format: {0}")]
    UnsupportedFormat(String),
}

/// # Scene Configuration
///
/// Behavior switches for scene traversal and rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneConfig {
    /// Enable grid culling for tile maps
    ///
    /// When disabled, map rendering visits every cell; useful for
    /// debugging culling artifacts.
    pub enable_culling: bool,
}

impl SceneConfig {
    /// Create a new scene configuration with defaults
    pub fn new() -> Self {
        Self {
            enable_culling: true,
        }
    }

    /// Enable or disable grid culling
    pub fn with_culling(mut self, enabled: bool) -> Self {
        self.enable_culling = enabled;
        self
    }
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// # Viewport Configuration
///
/// Default render-target dimensions for applications that do not query a
/// live window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewportConfig {
    /// Target width in pixels
    pub width: f32,
    /// Target height in pixels
    pub height: f32,
}

impl ViewportConfig {
    /// Create a viewport configuration from explicit dimensions
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Viewport dimensions as a vector
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self::new(800.0, 600.0)
    }
}

/// # Complete Application Configuration
///
/// Top-level configuration that encompasses all engine subsystems.
/// This is the main configuration structure applications should use.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Application name, used for logging and window titles
    pub application_name: String,
    /// Log filter for the `log`/`env_logger` stack (e.g. `"info"`)
    pub log_level: String,
    /// Render target dimensions
    pub viewport: ViewportConfig,
    /// Scene traversal configuration
    pub scene: SceneConfig,
}

impl ApplicationConfig {
    /// Create a new application configuration with defaults
    pub fn new(app_name: impl Into<String>) -> Self {
        Self {
            application_name: app_name.into(),
            log_level: "info".to_string(),
            viewport: ViewportConfig::default(),
            scene: SceneConfig::default(),
        }
    }

    /// Set the log filter
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Set the viewport dimensions
    pub fn with_viewport(mut self, width: f32, height: f32) -> Self {
        self.viewport = ViewportConfig::new(width, height);
        self
    }

    /// Set the scene configuration
    pub fn with_scene(mut self, scene: SceneConfig) -> Self {
        self.scene = scene;
        self
    }

    /// Load a configuration file, dispatching on the file extension
    ///
    /// Supported formats: `.ron` and `.toml`.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;

        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default();

        match extension {
            "ron" => Ok(ron::de::from_str(&text)?),
            "toml" => Ok(toml::from_str(&text)?),
            other => Err(ConfigError::UnsupportedFormat(other.to_string())),
        }
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.application_name.is_empty() {
            return Err("Application name cannot be empty".to_string());
        }

        if self.viewport.width <= 0.0 || self.viewport.height <= 0.0 {
            return Err(format!(
                "Viewport dimensions must be positive, got {}x{}",
                self.viewport.width, self.viewport.height
            ));
        }

        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self::new("Scene2D Application")
    }
}
