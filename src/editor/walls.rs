// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! On/off state of the twelve wall segments.

use crate::util::geometry::{Orientation, SegmentId, GRID_SIZE};
use serde::Serialize;

/// Wall state for the 3×3 grid.
///
/// `vertical[row][boundary]` sits between cells `boundary` and `boundary + 1`
/// of `row`; `horizontal[boundary][col]` sits between rows `boundary` and
/// `boundary + 1` of `col`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WallGrid {
    pub vertical: [[bool; GRID_SIZE - 1]; GRID_SIZE],
    pub horizontal: [[bool; GRID_SIZE]; GRID_SIZE - 1],
}

impl WallGrid {
    pub fn is_set(&self, id: SegmentId) -> bool {
        match id.orientation {
            Orientation::Vertical => self.vertical[id.row][id.col],
            Orientation::Horizontal => self.horizontal[id.row][id.col],
        }
    }

    /// Flip one segment and return its new state.
    pub fn toggle(&mut self, id: SegmentId) -> bool {
        let cell = match id.orientation {
            Orientation::Vertical => &mut self.vertical[id.row][id.col],
            Orientation::Horizontal => &mut self.horizontal[id.row][id.col],
        };
        *cell = !*cell;
        *cell
    }

    /// Clear every wall.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Number of segments currently set.
    pub fn count(&self) -> usize {
        self.vertical
            .iter()
            .flatten()
            .chain(self.horizontal.iter().flatten())
            .filter(|set| **set)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_twice_restores() {
        let mut walls = WallGrid::default();
        let id = SegmentId::vertical(2, 1);
        assert!(walls.toggle(id));
        assert!(walls.is_set(id));
        assert!(!walls.toggle(id));
        assert_eq!(walls, WallGrid::default());
    }

    #[test]
    fn test_toggle_touches_one_segment() {
        let mut walls = WallGrid::default();
        walls.toggle(SegmentId::horizontal(1, 0));
        assert_eq!(walls.count(), 1);
        assert!(walls.horizontal[1][0]);
        assert!(!walls.vertical[1][0]);
    }

    #[test]
    fn test_clear() {
        let mut walls = WallGrid::default();
        walls.toggle(SegmentId::vertical(0, 0));
        walls.toggle(SegmentId::horizontal(0, 2));
        walls.clear();
        assert_eq!(walls.count(), 0);
    }
}
