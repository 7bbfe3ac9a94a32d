use thiserror::Error;

use crate::geometry::{Rect, Vec2};

pub const DEFAULT_CELL_SIZE_PX: f32 = 20.0;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum NavGridError {
    #[error("cell size must be a positive finite number, got {cell_size}")]
    InvalidCellSize { cell_size: f32 },
    #[error("scene size must be finite and non-negative, got {width}x{height}")]
    InvalidSceneSize { width: f32, height: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellCoord {
    pub x: u32,
    pub y: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridCell {
    pub coord: CellCoord,
    pub is_obstacle: bool,
}

/// Inputs a grid was built from. Two equal keys rasterize identically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct NavGridKey {
    width_bits: u32,
    height_bits: u32,
    cell_size_bits: u32,
    obstacle_bits: [u32; 4],
}

impl NavGridKey {
    pub(crate) fn new(width: f32, height: f32, obstacle: Rect, cell_size: f32) -> Self {
        Self {
            width_bits: width.to_bits(),
            height_bits: height.to_bits(),
            cell_size_bits: cell_size.to_bits(),
            obstacle_bits: [
                obstacle.x.to_bits(),
                obstacle.y.to_bits(),
                obstacle.width.to_bits(),
                obstacle.height.to_bits(),
            ],
        }
    }
}

/// Uniform occupancy grid over the scene. Row-major, immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct NavGrid {
    cols: u32,
    rows: u32,
    cell_size: f32,
    cells: Vec<GridCell>,
}

impl NavGrid {
    pub fn build(
        width: f32,
        height: f32,
        obstacle: Rect,
        cell_size: f32,
    ) -> Result<Self, NavGridError> {
        if !cell_size.is_finite() || cell_size <= 0.0 {
            return Err(NavGridError::InvalidCellSize { cell_size });
        }
        if !width.is_finite() || !height.is_finite() || width < 0.0 || height < 0.0 {
            return Err(NavGridError::InvalidSceneSize { width, height });
        }

        let cols = (width / cell_size).floor() as u32;
        let rows = (height / cell_size).floor() as u32;
        let mut cells = Vec::with_capacity(cols as usize * rows as usize);
        for y in 0..rows {
            for x in 0..cols {
                let coord = CellCoord { x, y };
                let center = cell_center(coord, cell_size);
                cells.push(GridCell {
                    coord,
                    is_obstacle: obstacle.contains_strict(center),
                });
            }
        }

        Ok(Self {
            cols,
            rows,
            cell_size,
            cells,
        })
    }

    pub fn cols(&self) -> u32 {
        self.cols
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn cell(&self, coord: CellCoord) -> Option<&GridCell> {
        self.index_of(coord).and_then(|index| self.cells.get(index))
    }

    pub fn is_obstacle(&self, coord: CellCoord) -> bool {
        self.cell(coord).is_some_and(|cell| cell.is_obstacle)
    }

    pub fn obstacle_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_obstacle).count()
    }

    pub fn index_of(&self, coord: CellCoord) -> Option<usize> {
        if coord.x >= self.cols || coord.y >= self.rows {
            return None;
        }
        Some(coord.y as usize * self.cols as usize + coord.x as usize)
    }

    pub fn coord_of(&self, index: usize) -> CellCoord {
        let cols = self.cols.max(1) as usize;
        CellCoord {
            x: (index % cols) as u32,
            y: (index / cols) as u32,
        }
    }

    /// Cell under a world point, or `None` when the point is outside the grid.
    pub fn world_to_cell(&self, world: Vec2) -> Option<CellCoord> {
        let cell_x = (world.x / self.cell_size).floor();
        let cell_y = (world.y / self.cell_size).floor();
        if !cell_x.is_finite() || !cell_y.is_finite() || cell_x < 0.0 || cell_y < 0.0 {
            return None;
        }
        let coord = CellCoord {
            x: cell_x as u32,
            y: cell_y as u32,
        };
        self.index_of(coord).map(|_| coord)
    }

    /// Like `world_to_cell` but snaps outside points onto the nearest edge cell.
    pub fn world_to_cell_clamped(&self, world: Vec2) -> Option<CellCoord> {
        if self.is_empty() {
            return None;
        }
        let max_x = (self.cols - 1) as f32;
        let max_y = (self.rows - 1) as f32;
        let cell_x = (world.x / self.cell_size).floor();
        let cell_y = (world.y / self.cell_size).floor();
        let cell_x = if cell_x.is_nan() { 0.0 } else { cell_x.clamp(0.0, max_x) };
        let cell_y = if cell_y.is_nan() { 0.0 } else { cell_y.clamp(0.0, max_y) };
        Some(CellCoord {
            x: cell_x as u32,
            y: cell_y as u32,
        })
    }

    pub fn cell_center_world(&self, coord: CellCoord) -> Vec2 {
        cell_center(coord, self.cell_size)
    }

    /// Up, down, left, right. Off-grid slots are `None`.
    pub fn neighbors(&self, coord: CellCoord) -> [Option<CellCoord>; 4] {
        let up = (coord.y > 0).then(|| CellCoord {
            x: coord.x,
            y: coord.y - 1,
        });
        let down = (coord.y + 1 < self.rows).then(|| CellCoord {
            x: coord.x,
            y: coord.y + 1,
        });
        let left = (coord.x > 0).then(|| CellCoord {
            x: coord.x - 1,
            y: coord.y,
        });
        let right = (coord.x + 1 < self.cols).then(|| CellCoord {
            x: coord.x + 1,
            y: coord.y,
        });
        [up, down, left, right]
    }
}

fn cell_center(coord: CellCoord, cell_size: f32) -> Vec2 {
    Vec2 {
        x: coord.x as f32 * cell_size + cell_size / 2.0,
        y: coord.y as f32 * cell_size + cell_size / 2.0,
    }
}
