// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Dataset frames and their saved labels on disk.
//!
//! Layout under the dataset root:
//!
//! ```text
//! <root>/<split>/<frame>             source frames
//! <root>/<split>/labels/<stem>.png   saved masks, created on first save
//! ```

use crate::io::library::scan_images;
use crate::models::frame::{FrameError, FrameRef, Split, FRAME_EXTENSIONS, LABELS_DIR};
use image::ImageReader;
use std::io::{self, Cursor};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Frame(#[from] FrameError),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// A label written by [`FrameStore::save_label`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedLabel {
    /// Absolute path of the written file.
    pub path: PathBuf,
    /// `<split>/labels/<stem>.png`, relative to the dataset root.
    pub relative: String,
}

/// Access to frames and labels below one dataset root.
#[derive(Debug, Clone)]
pub struct FrameStore {
    root: PathBuf,
}

impl FrameStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn split_dir(&self, split: Split) -> PathBuf {
        self.root.join(split.as_str())
    }

    /// Sorted frame names in a split; empty when the split directory is missing.
    pub fn list(&self, split: Split) -> io::Result<Vec<String>> {
        scan_images(&self.split_dir(split), FRAME_EXTENSIONS)
    }

    /// Path of an existing frame file.
    pub fn locate(&self, frame: &FrameRef) -> Result<PathBuf, FrameError> {
        let path = self.split_dir(frame.split()).join(frame.name());
        if path.is_file() {
            Ok(path)
        } else {
            Err(FrameError::NotFound)
        }
    }

    /// Raw bytes of a frame.
    pub fn read(&self, frame: &FrameRef) -> Result<Vec<u8>, StoreError> {
        let path = self.locate(frame)?;
        Ok(std::fs::read(path)?)
    }

    /// Where the label for `frame` lives.
    pub fn label_path(&self, frame: &FrameRef) -> PathBuf {
        self.split_dir(frame.split())
            .join(LABELS_DIR)
            .join(format!("{}.png", frame.stem()))
    }

    /// Write `png` as the label of `frame`, replacing any previous one.
    ///
    /// The frame must exist. Frames that share a stem share a label file.
    pub fn save_label(&self, frame: &FrameRef, png: &[u8]) -> Result<SavedLabel, StoreError> {
        let source = self.locate(frame)?;
        warn_on_size_mismatch(&source, png, frame);

        let path = self.label_path(frame);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        if path.exists() {
            log::debug!("Overwriting {}", path.display());
        }
        std::fs::write(&path, png)?;

        let relative = frame.label_relative_path();
        log::info!("Saved label {} ({} bytes)", relative, png.len());
        Ok(SavedLabel { path, relative })
    }
}

/// Labels are expected at the frame's natural size; a mismatch is logged, not rejected.
fn warn_on_size_mismatch(source: &Path, png: &[u8], frame: &FrameRef) {
    let Ok(frame_size) = image::image_dimensions(source) else {
        return;
    };
    let label_size = ImageReader::new(Cursor::new(png))
        .with_guessed_format()
        .ok()
        .and_then(|reader| reader.into_dimensions().ok());
    match label_size {
        Some(size) if size != frame_size => log::warn!(
            "Label for {} is {}x{}, frame is {}x{}",
            frame,
            size.0,
            size.1,
            frame_size.0,
            frame_size.1
        ),
        None => log::warn!("Label for {} is not a readable image", frame),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, RgbaImage};
    use tempfile::tempdir;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let mut out = Vec::new();
        RgbaImage::new(width, height)
            .write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
            .unwrap();
        out
    }

    fn store_with(files: &[&str]) -> (tempfile::TempDir, FrameStore) {
        let dir = tempdir().unwrap();
        let train = dir.path().join("train");
        std::fs::create_dir_all(&train).unwrap();
        for name in files {
            std::fs::write(train.join(name), png_bytes(2, 2)).unwrap();
        }
        let store = FrameStore::new(dir.path());
        (dir, store)
    }

    #[test]
    fn test_list_sorted_and_filtered() {
        let (_dir, store) = store_with(&["frame010.png", "frame002.jpg", "notes.txt"]);
        std::fs::create_dir_all(store.split_dir(Split::Train).join(LABELS_DIR)).unwrap();

        let names = store.list(Split::Train).unwrap();
        assert_eq!(names, vec!["frame002.jpg", "frame010.png"]);
        assert_eq!(store.list(Split::Train).unwrap(), names);
    }

    #[test]
    fn test_list_missing_split_is_empty() {
        let (_dir, store) = store_with(&[]);
        assert!(store.list(Split::Val).unwrap().is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_list_follows_symlinks() {
        let (dir, store) = store_with(&["frame001.png"]);
        let outside = dir.path().join("shared");
        std::fs::create_dir_all(&outside).unwrap();
        std::fs::write(outside.join("real.png"), png_bytes(2, 2)).unwrap();
        std::os::unix::fs::symlink(
            outside.join("real.png"),
            store.split_dir(Split::Train).join("linked.png"),
        )
        .unwrap();

        let names = store.list(Split::Train).unwrap();
        assert_eq!(names, vec!["frame001.png", "linked.png"]);

        let linked = FrameRef::new(Split::Train, "linked.png").unwrap();
        assert_eq!(store.read(&linked).unwrap(), png_bytes(2, 2));
    }

    #[test]
    fn test_read_missing_is_not_found() {
        let (_dir, store) = store_with(&["frame001.png"]);
        let frame = FrameRef::new(Split::Train, "frame404.png").unwrap();
        assert!(matches!(
            store.read(&frame),
            Err(StoreError::Frame(FrameError::NotFound))
        ));

        let present = FrameRef::new(Split::Train, "frame001.png").unwrap();
        assert_eq!(store.read(&present).unwrap(), png_bytes(2, 2));
    }

    #[test]
    fn test_save_creates_labels_dir_and_overwrites() {
        let (dir, store) = store_with(&["frame001.png"]);
        let frame = FrameRef::new(Split::Train, "frame001.png").unwrap();

        let first = store.save_label(&frame, &png_bytes(2, 2)).unwrap();
        assert_eq!(first.relative, "train/labels/frame001.png");
        assert_eq!(first.path, dir.path().join("train/labels/frame001.png"));
        assert_eq!(std::fs::read(&first.path).unwrap(), png_bytes(2, 2));

        // Mismatched size is still written
        let second = store.save_label(&frame, &png_bytes(1, 1)).unwrap();
        assert_eq!(std::fs::read(&second.path).unwrap(), png_bytes(1, 1));
    }

    #[test]
    fn test_save_requires_existing_frame() {
        let (dir, store) = store_with(&[]);
        let frame = FrameRef::new(Split::Train, "ghost.png").unwrap();
        assert!(matches!(
            store.save_label(&frame, &png_bytes(1, 1)),
            Err(StoreError::Frame(FrameError::NotFound))
        ));
        assert!(!dir.path().join("train/labels").exists());
    }

    #[test]
    fn test_shared_stem_shares_label() {
        let (_dir, store) = store_with(&["shot.png", "shot.jpg"]);
        let png = FrameRef::new(Split::Train, "shot.png").unwrap();
        let jpg = FrameRef::new(Split::Train, "shot.jpg").unwrap();
        assert_eq!(store.label_path(&png), store.label_path(&jpg));
    }
}
