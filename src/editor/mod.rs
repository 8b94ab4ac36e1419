// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Mask editor state and transitions.
//!
//! [`MaskEditor`] holds everything the browser page keeps per frame: the
//! paint raster, the wall grid and the active tool. Pointer events are
//! plain method calls, so the editing rules can be exercised without a
//! canvas. The page mirrors these rules in JavaScript and takes its wall
//! geometry from the same functions through `/api/grid`.

pub mod raster;
pub mod walls;

use crate::io::data_url::encode_png_data_url;
use crate::models::{frame::FrameRef, label::Label};
use crate::util::geometry::{wall_lines, GridGeometry, SegmentId};
use anyhow::{Context, Result};
use image::{ImageFormat, RgbaImage};
use serde::{Deserialize, Serialize};
use std::io::Cursor;
use std::str::FromStr;
use walls::WallGrid;

/// Painting tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    Path,
    Unknown,
    Wall,
    Drone,
    Orange,
}

impl Tool {
    /// Label painted by this tool.
    pub fn label(&self) -> Label {
        match self {
            Tool::Path => Label::Path,
            Tool::Unknown => Label::Unknown,
            Tool::Wall => Label::Wall,
            Tool::Drone => Label::Drone,
            Tool::Orange => Label::Orange,
        }
    }

    /// Freehand tools paint while the pointer is held down.
    pub fn is_brush(&self) -> bool {
        matches!(self, Tool::Path | Tool::Unknown)
    }
}

impl FromStr for Tool {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "path" => Ok(Tool::Path),
            "unknown" => Ok(Tool::Unknown),
            "wall" => Ok(Tool::Wall),
            "drone" => Ok(Tool::Drone),
            "orange" => Ok(Tool::Orange),
            other => anyhow::bail!("unknown tool: {other}"),
        }
    }
}

/// Brush and marker sizes in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrushSettings {
    pub brush_width: f64,
    pub drone_radius: f64,
    pub orange_radius: f64,
}

impl BrushSettings {
    pub const MAX_BRUSH_WIDTH: f64 = 300.0;
    pub const MAX_MARKER_RADIUS: f64 = 200.0;

    /// Copy with every size clamped to the range the page accepts.
    pub fn clamped(self) -> Self {
        let clamp = |v: f64, max: f64| if v.is_finite() { v.clamp(1.0, max) } else { 1.0 };
        Self {
            brush_width: clamp(self.brush_width, Self::MAX_BRUSH_WIDTH),
            drone_radius: clamp(self.drone_radius, Self::MAX_MARKER_RADIUS),
            orange_radius: clamp(self.orange_radius, Self::MAX_MARKER_RADIUS),
        }
    }

    fn marker_radius(&self, tool: Tool) -> Option<f64> {
        match tool {
            Tool::Drone => Some(self.drone_radius),
            Tool::Orange => Some(self.orange_radius),
            _ => None,
        }
    }
}

impl Default for BrushSettings {
    fn default() -> Self {
        Self {
            brush_width: 18.0,
            drone_radius: 10.0,
            orange_radius: 10.0,
        }
    }
}

/// Lifecycle of the current frame's mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Freshly loaded or reset, nothing drawn yet.
    Empty,
    /// Has edits not yet saved.
    Painting,
    /// Last edit has been saved.
    Saved,
}

/// What a pointer-down did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerOutcome {
    Ignored,
    StrokeStarted,
    Stamped,
    WallToggled { id: SegmentId, set: bool },
}

/// Editing state for one frame.
#[derive(Debug, Clone)]
pub struct MaskEditor {
    frame: Option<FrameRef>,
    paint: RgbaImage,
    walls: WallGrid,
    geometry: GridGeometry,
    tool: Tool,
    settings: BrushSettings,
    last_point: Option<(f64, f64)>,
    phase: Phase,
}

impl Default for MaskEditor {
    fn default() -> Self {
        Self::new(BrushSettings::default())
    }
}

impl MaskEditor {
    /// Create an editor with no frame loaded.
    pub fn new(settings: BrushSettings) -> Self {
        Self {
            frame: None,
            paint: RgbaImage::new(0, 0),
            walls: WallGrid::default(),
            geometry: GridGeometry::new(0, 0),
            tool: Tool::Path,
            settings: settings.clamped(),
            last_point: None,
            phase: Phase::Empty,
        }
    }

    /// Switch to a frame of the given natural size, discarding all edits.
    pub fn load_frame(&mut self, frame: FrameRef, width: u32, height: u32) {
        log::debug!("Editing {frame} ({width}x{height})");
        self.frame = Some(frame);
        self.paint = RgbaImage::new(width, height);
        self.geometry = GridGeometry::new(width, height);
        self.reset();
    }

    /// Clear walls and repaint the whole mask as unknown.
    pub fn reset(&mut self) {
        self.walls.clear();
        raster::fill(&mut self.paint, Label::Unknown.color());
        self.last_point = None;
        self.phase = Phase::Empty;
    }

    pub fn frame(&self) -> Option<&FrameRef> {
        self.frame.as_ref()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    /// Select a tool. Any stroke in progress ends.
    pub fn set_tool(&mut self, tool: Tool) {
        self.tool = tool;
        self.last_point = None;
    }

    pub fn settings(&self) -> BrushSettings {
        self.settings
    }

    pub fn set_settings(&mut self, settings: BrushSettings) {
        self.settings = settings.clamped();
    }

    pub fn walls(&self) -> &WallGrid {
        &self.walls
    }

    pub fn paint(&self) -> &RgbaImage {
        &self.paint
    }

    pub fn geometry(&self) -> &GridGeometry {
        &self.geometry
    }

    pub fn is_stroking(&self) -> bool {
        self.last_point.is_some()
    }

    /// Label of a paint pixel, or `None` outside the raster.
    pub fn label_at(&self, x: u32, y: u32) -> Option<Label> {
        self.paint
            .get_pixel_checked(x, y)
            .and_then(|pixel| Label::from_color(*pixel))
    }

    fn touch(&mut self) {
        self.phase = Phase::Painting;
    }

    /// Pointer pressed at canvas coordinates `(x, y)`.
    pub fn pointer_down(&mut self, x: f64, y: f64) -> PointerOutcome {
        if self.frame.is_none() {
            return PointerOutcome::Ignored;
        }

        match self.tool {
            Tool::Wall => match self.geometry.nearest_segment(x, y) {
                Some(id) => {
                    let set = self.walls.toggle(id);
                    self.touch();
                    PointerOutcome::WallToggled { id, set }
                }
                None => PointerOutcome::Ignored,
            },
            Tool::Drone | Tool::Orange => {
                let radius = self.settings.marker_radius(self.tool).unwrap_or(1.0);
                raster::fill_disc(&mut self.paint, x, y, radius, self.tool.label().color());
                self.touch();
                PointerOutcome::Stamped
            }
            Tool::Path | Tool::Unknown => {
                self.last_point = Some((x, y));
                self.draw_brush((x, y), (x, y));
                self.touch();
                PointerOutcome::StrokeStarted
            }
        }
    }

    /// Pointer moved; extends the stroke if one is active. Returns whether anything was drawn.
    pub fn pointer_move(&mut self, x: f64, y: f64) -> bool {
        let Some(last) = self.last_point else {
            return false;
        };
        self.draw_brush(last, (x, y));
        self.last_point = Some((x, y));
        self.touch();
        true
    }

    /// Pointer released, cancelled or left the canvas.
    pub fn pointer_up(&mut self) {
        self.last_point = None;
    }

    fn draw_brush(&mut self, from: (f64, f64), to: (f64, f64)) {
        if !self.tool.is_brush() {
            return;
        }
        let color = self.tool.label().color();
        raster::stroke_segment(&mut self.paint, from, to, self.settings.brush_width, color);
    }

    /// Grid preview layer: cyan grid plus every set wall.
    pub fn overlay(&self) -> RgbaImage {
        let mut layer = raster::grid_layer(&self.geometry, self.paint.width(), self.paint.height());
        self.stroke_walls_onto(&mut layer);
        layer
    }

    /// Paint layer with walls baked in, as saved to disk.
    pub fn flatten(&self) -> RgbaImage {
        let mut out = self.paint.clone();
        self.stroke_walls_onto(&mut out);
        out
    }

    fn stroke_walls_onto(&self, img: &mut RgbaImage) {
        let lines = wall_lines(&self.geometry, &self.walls);
        raster::stroke_walls(img, &lines, self.geometry.wall_width(), Label::Wall.color());
    }

    /// Flatten and encode as the data URL the save endpoint accepts.
    pub fn encode_label(&self) -> Result<String> {
        let frame = self.frame.as_ref().context("no frame loaded")?;
        let mut png = Vec::new();
        self.flatten()
            .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .with_context(|| format!("Failed to encode label for {frame}"))?;
        Ok(encode_png_data_url(&png))
    }

    /// Record a successful save.
    pub fn mark_saved(&mut self) {
        if self.frame.is_some() {
            self.phase = Phase::Saved;
        }
    }
}
