// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Semantic mask classes and their colours.
//!
//! The saved mask carries its labels as plain RGB colours, so the colour
//! table here is the file format.

use image::Rgba;
use serde::{Deserialize, Serialize};

/// Semantic class of a mask pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    /// Not visible / not yet labelled.
    Unknown,
    /// Walkable path.
    Path,
    /// Grid wall, only present after flattening.
    Wall,
    /// Drone marker.
    Drone,
    /// Orange marker.
    Orange,
}

impl Label {
    pub const ALL: [Label; 5] = [
        Label::Unknown,
        Label::Path,
        Label::Wall,
        Label::Drone,
        Label::Orange,
    ];

    /// Opaque colour used for this label in the mask.
    pub fn color(&self) -> Rgba<u8> {
        match self {
            Label::Unknown => Rgba([0xff, 0xff, 0xff, 0xff]),
            Label::Path => Rgba([0xff, 0xff, 0x00, 0xff]),
            Label::Wall => Rgba([0x00, 0x00, 0x00, 0xff]),
            Label::Drone => Rgba([0xff, 0x00, 0x00, 0xff]),
            Label::Orange => Rgba([0xff, 0x8c, 0x00, 0xff]),
        }
    }

    /// CSS hex form of [`Label::color`].
    pub fn css(&self) -> String {
        let [r, g, b, _] = self.color().0;
        format!("#{r:02x}{g:02x}{b:02x}")
    }

    /// Label whose colour exactly matches `pixel`, ignoring alpha.
    pub fn from_color(pixel: Rgba<u8>) -> Option<Label> {
        Self::ALL
            .into_iter()
            .find(|label| label.color().0[..3] == pixel.0[..3])
    }
}
