// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Dataset frame identity and name validation.
//!
//! A frame is addressed by its split and a bare file name. Everything that
//! reaches the filesystem goes through [`FrameRef::new`] first, so a name
//! can never point outside its split directory.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Extensions the annotation server treats as frames (lowercase, no dot).
pub const FRAME_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "webp"];

/// Extensions the gallery lists (lowercase, no dot).
pub const GALLERY_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp", "bmp"];

/// Name of the per-split directory that holds saved masks.
pub const LABELS_DIR: &str = "labels";

/// Reasons a frame reference is refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    #[error("split must be train or val")]
    BadSplit,
    #[error("invalid image name")]
    BadName,
    #[error("unsupported image extension")]
    BadExtension,
    #[error("image not found")]
    NotFound,
}

/// Dataset partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Split {
    Train,
    Val,
}

impl Split {
    /// All splits, in display order.
    pub const ALL: [Split; 2] = [Split::Train, Split::Val];

    /// Directory name of the split under the dataset root.
    pub fn as_str(&self) -> &'static str {
        match self {
            Split::Train => "train",
            Split::Val => "val",
        }
    }
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Split {
    type Err = FrameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "train" => Ok(Split::Train),
            "val" => Ok(Split::Val),
            _ => Err(FrameError::BadSplit),
        }
    }
}

/// A validated `(split, image_name)` pair.
///
/// Existence on disk is not checked here; see
/// [`FrameStore::locate`](crate::io::dataset::FrameStore::locate).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FrameRef {
    split: Split,
    name: String,
}

impl FrameRef {
    /// Validate a raw split string and image name.
    pub fn parse(split: &str, name: &str) -> Result<Self, FrameError> {
        Self::new(split.parse()?, name)
    }

    /// Validate an image name for the given split.
    pub fn new(split: Split, name: &str) -> Result<Self, FrameError> {
        if !is_bare_basename(name) {
            return Err(FrameError::BadName);
        }
        if !has_extension(name, FRAME_EXTENSIONS) {
            return Err(FrameError::BadExtension);
        }
        Ok(Self {
            split,
            name: name.to_string(),
        })
    }

    pub fn split(&self) -> Split {
        self.split
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// File name without its final extension.
    pub fn stem(&self) -> &str {
        Path::new(&self.name)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(&self.name)
    }

    /// Path of the saved mask relative to the dataset root, always `/`-separated.
    pub fn label_relative_path(&self) -> String {
        format!("{}/{}/{}.png", self.split, LABELS_DIR, self.stem())
    }
}

impl fmt::Display for FrameRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.split, self.name)
    }
}

/// True when `name` is a single path component that names a file.
pub fn is_bare_basename(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', '\0'])
}

/// Case-insensitive extension check against a lowercase allow-list.
pub fn has_extension(name: &str, allowed: &[&str]) -> bool {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            allowed.iter().any(|a| *a == ext)
        })
        .unwrap_or(false)
}
