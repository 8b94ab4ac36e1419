// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Wall grid geometry.
//!
//! The frame is split into a fixed 3×3 grid. Every wall line that ends up
//! on screen or in a saved mask is placed by [`wall_lines`], so the live
//! overlay, the flattened label and the browser page (through `/api/grid`)
//! agree to the pixel.

use crate::editor::walls::WallGrid;
use serde::Serialize;

/// Cells per side of the wall grid.
pub const GRID_SIZE: usize = 3;

/// Direction of a wall segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// Between horizontally adjacent cells; `row` is the cell row, `col` the boundary (0..2).
    Vertical,
    /// Between vertically adjacent cells; `row` is the boundary (0..2), `col` the cell column.
    Horizontal,
}

/// Address of one toggleable wall segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct SegmentId {
    pub orientation: Orientation,
    pub row: usize,
    pub col: usize,
}

impl SegmentId {
    pub fn vertical(row: usize, col: usize) -> Self {
        Self {
            orientation: Orientation::Vertical,
            row,
            col,
        }
    }

    pub fn horizontal(row: usize, col: usize) -> Self {
        Self {
            orientation: Orientation::Horizontal,
            row,
            col,
        }
    }
}

/// A wall segment placed in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LineSegment {
    #[serde(flatten)]
    pub id: SegmentId,
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

/// Grid layout for a frame of a given size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridGeometry {
    pub width: f64,
    pub height: f64,
    pub cell_width: f64,
    pub cell_height: f64,
}

impl GridGeometry {
    pub fn new(width: u32, height: u32) -> Self {
        let width = f64::from(width);
        let height = f64::from(height);
        Self {
            width,
            height,
            cell_width: width / GRID_SIZE as f64,
            cell_height: height / GRID_SIZE as f64,
        }
    }

    fn min_cell(&self) -> f64 {
        self.cell_width.min(self.cell_height)
    }

    /// Stroke width of a wall line.
    pub fn wall_width(&self) -> f64 {
        (self.min_cell() * 0.08).max(4.0)
    }

    /// Maximum click distance for a wall toggle.
    pub fn hit_threshold(&self) -> f64 {
        (self.min_cell() * 0.12).max(8.0)
    }

    /// Pixel placement of one segment.
    pub fn segment(&self, id: SegmentId) -> LineSegment {
        match id.orientation {
            Orientation::Vertical => {
                let x = (id.col + 1) as f64 * self.cell_width;
                LineSegment {
                    id,
                    x1: x,
                    y1: id.row as f64 * self.cell_height,
                    x2: x,
                    y2: (id.row + 1) as f64 * self.cell_height,
                }
            }
            Orientation::Horizontal => {
                let y = (id.row + 1) as f64 * self.cell_height;
                LineSegment {
                    id,
                    x1: id.col as f64 * self.cell_width,
                    y1: y,
                    x2: (id.col + 1) as f64 * self.cell_width,
                    y2: y,
                }
            }
        }
    }

    /// All 12 segments: verticals row by row, then horizontals boundary by boundary.
    pub fn segments(&self) -> Vec<LineSegment> {
        let verticals = (0..GRID_SIZE)
            .flat_map(|r| (0..GRID_SIZE - 1).map(move |b| SegmentId::vertical(r, b)));
        let horizontals = (0..GRID_SIZE - 1)
            .flat_map(|a| (0..GRID_SIZE).map(move |c| SegmentId::horizontal(a, c)));
        verticals
            .chain(horizontals)
            .map(|id| self.segment(id))
            .collect()
    }

    /// Inner grid lines as `(x1, y1, x2, y2)`, spanning the whole frame.
    pub fn grid_lines(&self) -> Vec<(f64, f64, f64, f64)> {
        (1..GRID_SIZE)
            .flat_map(|i| {
                let x = i as f64 * self.cell_width;
                let y = i as f64 * self.cell_height;
                [(x, 0.0, x, self.height), (0.0, y, self.width, y)]
            })
            .collect()
    }

    /// Segment closest to `(x, y)` within [`hit_threshold`](Self::hit_threshold).
    ///
    /// Only segments whose span contains the point along their own axis are
    /// candidates. On equal distance the earlier segment in scan order wins.
    pub fn nearest_segment(&self, x: f64, y: f64) -> Option<SegmentId> {
        let threshold = self.hit_threshold();
        let mut best: Option<(SegmentId, f64)> = None;

        for seg in self.segments() {
            let dist = match seg.id.orientation {
                Orientation::Vertical => {
                    if y < seg.y1 || y > seg.y2 {
                        continue;
                    }
                    (x - seg.x1).abs()
                }
                Orientation::Horizontal => {
                    if x < seg.x1 || x > seg.x2 {
                        continue;
                    }
                    (y - seg.y1).abs()
                }
            };
            if dist <= threshold && best.map_or(true, |(_, d)| dist < d) {
                best = Some((seg.id, dist));
            }
        }

        best.map(|(id, _)| id)
    }
}

/// Serializable description of a frame's grid, as served to the page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridLayout {
    pub width: u32,
    pub height: u32,
    pub cell_width: f64,
    pub cell_height: f64,
    pub wall_width: f64,
    pub hit_threshold: f64,
    pub segments: Vec<LineSegment>,
}

impl GridLayout {
    pub fn new(width: u32, height: u32) -> Self {
        let geometry = GridGeometry::new(width, height);
        Self {
            width,
            height,
            cell_width: geometry.cell_width,
            cell_height: geometry.cell_height,
            wall_width: geometry.wall_width(),
            hit_threshold: geometry.hit_threshold(),
            segments: geometry.segments(),
        }
    }
}

/// Placed lines for every wall that is currently set.
pub fn wall_lines(geometry: &GridGeometry, walls: &WallGrid) -> Vec<LineSegment> {
    geometry
        .segments()
        .into_iter()
        .filter(|seg| walls.is_set(seg.id))
        .collect()
}
