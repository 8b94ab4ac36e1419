// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Directory listings of image files.
//!
//! [`ImageLibrary`] is the gallery's listing service. It is scanned when
//! created and only changes when [`ImageLibrary::refresh`] is called, so
//! every request between refreshes sees the same snapshot.

use crate::models::frame::has_extension;
use anyhow::{Context, Result};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

/// Sorted names of the regular files in `dir` whose extension is in `extensions`.
///
/// A missing directory lists as empty.
pub fn scan_images(dir: &Path, extensions: &[&str]) -> io::Result<Vec<String>> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e),
    };

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry?;
        // Follows symlinks, same as `FrameStore::locate`.
        if !entry.path().is_file() {
            continue;
        }
        let Ok(name) = entry.file_name().into_string() else {
            log::debug!("Skipping non UTF-8 file name in {}", dir.display());
            continue;
        };
        if has_extension(&name, extensions) {
            names.push(name);
        }
    }
    names.sort();
    Ok(names)
}

/// Snapshot of an image directory with explicit refresh.
#[derive(Debug, Clone)]
pub struct ImageLibrary {
    dir: PathBuf,
    extensions: &'static [&'static str],
    images: Arc<RwLock<Arc<Vec<String>>>>,
}

impl ImageLibrary {
    /// Scan `dir` and build the initial snapshot.
    pub fn open(dir: impl Into<PathBuf>, extensions: &'static [&'static str]) -> Result<Self> {
        let dir = dir.into();
        let images = scan_images(&dir, extensions)
            .with_context(|| format!("Failed to list images in {}", dir.display()))?;
        log::info!("Found {} images in {}", images.len(), dir.display());
        Ok(Self {
            dir,
            extensions,
            images: Arc::new(RwLock::new(Arc::new(images))),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Current snapshot.
    pub fn images(&self) -> Arc<Vec<String>> {
        match self.images.read() {
            Ok(guard) => Arc::clone(&guard),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    /// Rescan the directory and replace the snapshot. Returns the new count.
    pub fn refresh(&self) -> Result<usize> {
        let images = scan_images(&self.dir, self.extensions)
            .with_context(|| format!("Failed to list images in {}", self.dir.display()))?;
        let count = images.len();
        let mut guard = match self.images.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = Arc::new(images);
        log::info!("Refreshed {}: {} images", self.dir.display(), count);
        Ok(count)
    }

    /// Name and on-disk size of the image at `index`.
    pub fn get(&self, index: usize) -> Option<(String, u64)> {
        let images = self.images();
        let name = images.get(index)?.clone();
        let size = std::fs::metadata(self.dir.join(&name))
            .map(|m| m.len())
            .unwrap_or(0);
        Some((name, size))
    }
}
