mod astar;
mod detour;
mod grid;

pub use astar::PathPlanner;
pub use detour::{simple_detour_path, DETOUR_MARGIN_PX};
pub use grid::{CellCoord, GridCell, NavGrid, NavGridError, DEFAULT_CELL_SIZE_PX};
