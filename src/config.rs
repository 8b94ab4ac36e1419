// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Server configuration.
//!
//! Settings come from an optional YAML file and are then overridden by
//! command line flags. Every field has a default, so an empty file (or no
//! file) is a valid configuration.

use crate::editor::BrushSettings;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Top-level configuration file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default `env_logger` filter, used when `RUST_LOG` is unset.
    pub log_level: String,
    pub annotate: AnnotateConfig,
    pub gallery: GalleryConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            annotate: AnnotateConfig::default(),
            gallery: GalleryConfig::default(),
        }
    }
}

/// Annotation server settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnotateConfig {
    pub host: String,
    pub port: u16,
    /// Root holding `train/` and `val/`.
    pub dataset_dir: PathBuf,
    /// Largest accepted save request body.
    pub max_upload_bytes: usize,
    pub editor: EditorDefaults,
}

impl Default for AnnotateConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            dataset_dir: PathBuf::from("dataset_frames"),
            max_upload_bytes: 64 * 1024 * 1024,
            editor: EditorDefaults::default(),
        }
    }
}

/// Initial values of the page's tool controls.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorDefaults {
    #[serde(flatten)]
    pub brush: BrushSettings,
    /// Opacity of the mask layer over the frame, 0.1 to 1.
    pub mask_alpha: f32,
}

impl Default for EditorDefaults {
    fn default() -> Self {
        Self {
            brush: BrushSettings::default(),
            mask_alpha: 0.45,
        }
    }
}

impl EditorDefaults {
    /// Copy with sizes and opacity forced into the ranges the page accepts.
    pub fn clamped(self) -> Self {
        let mask_alpha = if self.mask_alpha.is_finite() {
            self.mask_alpha.clamp(0.1, 1.0)
        } else {
            0.45
        };
        Self {
            brush: self.brush.clamped(),
            mask_alpha,
        }
    }
}

/// Gallery server settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GalleryConfig {
    pub host: String,
    pub port: u16,
    pub images_dir: PathBuf,
    /// Thumbnails shown on each side of the current image.
    pub thumbnail_radius: usize,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            images_dir: PathBuf::from("images"),
            thumbnail_radius: 5,
        }
    }
}

/// Parse `host:port` into a bind address.
pub fn bind_addr(host: &str, port: u16) -> Result<SocketAddr> {
    format!("{host}:{port}")
        .parse()
        .with_context(|| format!("Invalid bind address {host}:{port}"))
}

impl Config {
    /// Load from a YAML file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::from_yaml(&text).with_context(|| format!("Invalid config {}", path.display()))
    }

    /// Parse YAML text. An empty document yields the defaults.
    pub fn from_yaml(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(text)?)
    }

    /// Load `path` if given, otherwise use defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_yaml_is_default() {
        assert_eq!(Config::from_yaml("").unwrap(), Config::default());
        assert_eq!(Config::from_yaml("\n  \n").unwrap(), Config::default());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = r#"
log_level: debug
annotate:
  port: 9001
  dataset_dir: /data/frames
  editor:
    brush_width: 30
    mask_alpha: 0.6
gallery:
  images_dir: shots
"#;
        let config = Config::from_yaml(yaml).unwrap();
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.annotate.port, 9001);
        assert_eq!(config.annotate.host, "127.0.0.1");
        assert_eq!(config.annotate.dataset_dir, PathBuf::from("/data/frames"));
        assert_eq!(config.annotate.editor.brush.brush_width, 30.0);
        assert_eq!(config.annotate.editor.brush.drone_radius, 10.0);
        assert_eq!(config.annotate.editor.mask_alpha, 0.6);
        assert_eq!(config.gallery.images_dir, PathBuf::from("shots"));
        assert_eq!(config.gallery.thumbnail_radius, 5);
    }

    #[test]
    fn test_rejects_wrong_types() {
        assert!(Config::from_yaml("annotate:\n  port: lots\n").is_err());
    }

    #[test]
    fn test_editor_defaults_clamped() {
        let defaults = EditorDefaults {
            brush: BrushSettings {
                brush_width: 900.0,
                ..BrushSettings::default()
            },
            mask_alpha: 0.0,
        }
        .clamped();
        assert_eq!(defaults.brush.brush_width, 300.0);
        assert_eq!(defaults.mask_alpha, 0.1);
    }

    #[test]
    fn test_bind_addr() {
        assert_eq!(bind_addr("0.0.0.0", 8000).unwrap().port(), 8000);
        assert!(bind_addr("not a host", 1).is_err());
    }
}
