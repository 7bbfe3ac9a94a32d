use tracing::debug;

use crate::geometry::{Rect, Vec2};

use super::grid::{CellCoord, NavGrid, NavGridError, NavGridKey};

const NO_COST: u32 = u32::MAX;

#[derive(Debug, Clone, Copy)]
struct SearchNode {
    parent: Option<usize>,
    g_cost: u32,
    h_cost: u32,
}

impl SearchNode {
    const UNVISITED: Self = Self {
        parent: None,
        g_cost: NO_COST,
        h_cost: 0,
    };

    fn f_cost(&self) -> u32 {
        self.g_cost.saturating_add(self.h_cost)
    }
}

/// Owns the current occupancy grid and answers shortest-path queries over it.
#[derive(Debug, Clone, Default)]
pub struct PathPlanner {
    key: Option<NavGridKey>,
    grid: Option<NavGrid>,
}

impl PathPlanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rasterizes the scene again unless the inputs are unchanged.
    /// Returns whether a new grid was built.
    pub fn rebuild(
        &mut self,
        width: f32,
        height: f32,
        obstacle: Rect,
        cell_size: f32,
    ) -> Result<bool, NavGridError> {
        let key = NavGridKey::new(width, height, obstacle, cell_size);
        if self.key == Some(key) && self.grid.is_some() {
            return Ok(false);
        }

        let grid = NavGrid::build(width, height, obstacle, cell_size)?;
        debug!(
            cols = grid.cols(),
            rows = grid.rows(),
            obstacle_cells = grid.obstacle_count(),
            "nav_grid_built"
        );
        self.key = Some(key);
        self.grid = Some(grid);
        Ok(true)
    }

    pub fn clear(&mut self) {
        self.key = None;
        self.grid = None;
    }

    pub fn grid(&self) -> Option<&NavGrid> {
        self.grid.as_ref()
    }

    /// World-space waypoints from the start cell center to the goal cell
    /// center, or `None` when no grid is built or the goal is unusable or
    /// unreachable.
    pub fn find_path(&self, start: Vec2, goal: Vec2) -> Option<Vec<Vec2>> {
        let grid = self.grid.as_ref()?;
        if grid.is_empty() {
            return None;
        }
        let goal_cell = grid.world_to_cell(goal)?;
        let start_cell = grid.world_to_cell_clamped(start)?;
        if grid.is_obstacle(goal_cell) || grid.is_obstacle(start_cell) {
            return None;
        }

        let cells = find_path_cells(grid, start_cell, goal_cell)?;
        Some(
            cells
                .into_iter()
                .map(|cell| grid.cell_center_world(cell))
                .collect(),
        )
    }
}

fn find_path_cells(grid: &NavGrid, start: CellCoord, goal: CellCoord) -> Option<Vec<CellCoord>> {
    let start_index = grid.index_of(start)?;
    let goal_index = grid.index_of(goal)?;

    let node_count = grid.cell_count();
    let mut nodes = vec![SearchNode::UNVISITED; node_count];
    let mut in_open = vec![false; node_count];
    let mut closed = vec![false; node_count];
    let mut open: Vec<usize> = Vec::new();
    let mut expanded = 0usize;

    nodes[start_index] = SearchNode {
        parent: None,
        g_cost: 0,
        h_cost: manhattan_distance(start, goal),
    };
    open.push(start_index);
    in_open[start_index] = true;

    while !open.is_empty() {
        let best_slot = pick_lowest_f_slot(&open, &nodes);
        let current_index = open[best_slot];
        if current_index == goal_index {
            let path = reconstruct_cell_path(grid, &nodes, goal_index);
            debug!(expanded, path_len = path.len(), "astar_path_found");
            return Some(path);
        }

        // `remove` keeps the remaining entries in insertion order for tie-breaks.
        open.remove(best_slot);
        in_open[current_index] = false;
        closed[current_index] = true;
        expanded += 1;

        let current_g = nodes[current_index].g_cost;
        for neighbor in grid.neighbors(grid.coord_of(current_index)) {
            let Some(neighbor) = neighbor else {
                continue;
            };
            let Some(neighbor_index) = grid.index_of(neighbor) else {
                continue;
            };
            if closed[neighbor_index] || grid.is_obstacle(neighbor) {
                continue;
            }

            let tentative_g = current_g.saturating_add(1);
            if !in_open[neighbor_index] {
                nodes[neighbor_index] = SearchNode {
                    parent: Some(current_index),
                    g_cost: tentative_g,
                    h_cost: manhattan_distance(neighbor, goal),
                };
                open.push(neighbor_index);
                in_open[neighbor_index] = true;
            } else if tentative_g < nodes[neighbor_index].g_cost {
                let node = &mut nodes[neighbor_index];
                node.parent = Some(current_index);
                node.g_cost = tentative_g;
            }
        }
    }

    debug!(expanded, "astar_no_path");
    None
}

/// First entry wins among equal `f`.
fn pick_lowest_f_slot(open: &[usize], nodes: &[SearchNode]) -> usize {
    let mut best_slot = 0usize;
    for slot in 1..open.len() {
        if nodes[open[slot]].f_cost() < nodes[open[best_slot]].f_cost() {
            best_slot = slot;
        }
    }
    best_slot
}

fn reconstruct_cell_path(grid: &NavGrid, nodes: &[SearchNode], goal_index: usize) -> Vec<CellCoord> {
    let mut cells = Vec::new();
    let mut cursor = Some(goal_index);
    while let Some(index) = cursor {
        cells.push(grid.coord_of(index));
        cursor = nodes[index].parent;
    }
    cells.reverse();
    cells
}

fn manhattan_distance(a: CellCoord, b: CellCoord) -> u32 {
    a.x.abs_diff(b.x).saturating_add(a.y.abs_diff(b.y))
}

#[cfg(test)]
mod tests {
    use super::*;

    const CELL: f32 = 20.0;

    fn planner(width: f32, height: f32, obstacle: Rect) -> PathPlanner {
        let mut planner = PathPlanner::new();
        planner
            .rebuild(width, height, obstacle, CELL)
            .expect("grid build");
        planner
    }

    fn center(x: u32, y: u32) -> Vec2 {
        Vec2::new(x as f32 * CELL + CELL / 2.0, y as f32 * CELL + CELL / 2.0)
    }

    fn cells_of(planner: &PathPlanner, path: &[Vec2]) -> Vec<CellCoord> {
        let grid = planner.grid().expect("grid");
        path.iter()
            .map(|point| grid.world_to_cell(*point).expect("waypoint on grid"))
            .collect()
    }

    fn assert_four_connected(cells: &[CellCoord]) {
        for pair in cells.windows(2) {
            assert_eq!(
                manhattan_distance(pair[0], pair[1]),
                1,
                "non-adjacent step {:?} -> {:?}",
                pair[0],
                pair[1]
            );
        }
    }

    #[test]
    fn no_grid_means_no_path() {
        let planner = PathPlanner::new();
        assert!(planner
            .find_path(Vec2::new(10.0, 10.0), Vec2::new(50.0, 50.0))
            .is_none());
    }

    #[test]
    fn degenerate_empty_grid_refuses_search() {
        let planner = planner(10.0, 10.0, Rect::default());
        assert!(planner.grid().expect("grid").is_empty());
        assert!(planner
            .find_path(Vec2::new(1.0, 1.0), Vec2::new(5.0, 5.0))
            .is_none());
    }

    #[test]
    fn open_grid_path_length_equals_manhattan_distance() {
        let planner = planner(200.0, 200.0, Rect::default());
        for (start, goal) in [((0, 0), (9, 9)), ((3, 7), (8, 1)), ((5, 5), (5, 0))] {
            let path = planner
                .find_path(center(start.0, start.1), center(goal.0, goal.1))
                .expect("path");
            let expected_steps = start.0.abs_diff(goal.0) + start.1.abs_diff(goal.1);
            assert_eq!(path.len() as u32 - 1, expected_steps);
            assert_eq!(path.first().copied(), Some(center(start.0, start.1)));
            assert_eq!(path.last().copied(), Some(center(goal.0, goal.1)));
            assert_four_connected(&cells_of(&planner, &path));
        }
    }

    #[test]
    fn path_around_center_block_never_enters_obstacle() {
        // 10x10 cells; the block covers cells (4,4)..=(6,6).
        let obstacle = Rect::new(80.0, 80.0, 60.0, 60.0);
        let planner = planner(200.0, 200.0, obstacle);
        let grid = planner.grid().expect("grid");
        assert_eq!(grid.obstacle_count(), 9);

        let path = planner
            .find_path(center(0, 0), center(9, 9))
            .expect("reachable");
        // Manhattan distance is reachable along the block's edges.
        assert_eq!(path.len() - 1, 18);
        let cells = cells_of(&planner, &path);
        assert_four_connected(&cells);
        for cell in cells {
            assert!(!grid.is_obstacle(cell), "path entered obstacle at {cell:?}");
        }
    }

    #[test]
    fn goal_inside_obstacle_has_no_path() {
        let planner = planner(200.0, 200.0, Rect::new(80.0, 80.0, 60.0, 60.0));
        assert!(planner.find_path(center(0, 0), center(5, 5)).is_none());
    }

    #[test]
    fn goal_outside_grid_has_no_path() {
        let planner = planner(200.0, 200.0, Rect::default());
        assert!(planner
            .find_path(center(0, 0), Vec2::new(250.0, 10.0))
            .is_none());
    }

    #[test]
    fn walled_off_goal_exhausts_open_set() {
        // Column x=2 fully blocked on a 5x3 grid.
        let planner = planner(100.0, 60.0, Rect::new(40.0, -10.0, 20.0, 80.0));
        assert!(planner.find_path(center(0, 1), center(4, 1)).is_none());
    }

    #[test]
    fn start_equal_to_goal_is_single_waypoint() {
        let planner = planner(100.0, 100.0, Rect::default());
        let path = planner
            .find_path(Vec2::new(33.0, 47.0), Vec2::new(25.0, 41.0))
            .expect("path");
        assert_eq!(path, vec![center(1, 2)]);
    }

    #[test]
    fn start_on_far_edge_is_clamped_into_grid() {
        let planner = planner(100.0, 100.0, Rect::default());
        let path = planner
            .find_path(Vec2::new(100.0, 100.0), center(4, 2))
            .expect("path");
        assert_eq!(path.first().copied(), Some(center(4, 4)));
        assert_eq!(path.len(), 3);
    }

    #[test]
    fn ties_resolve_to_first_inserted_neighbor() {
        let planner = planner(60.0, 60.0, Rect::default());
        let path = planner.find_path(center(0, 0), center(2, 2)).expect("path");
        assert_eq!(
            path,
            vec![center(0, 0), center(0, 1), center(0, 2), center(1, 2), center(2, 2)]
        );
        let again = planner.find_path(center(0, 0), center(2, 2)).expect("path");
        assert_eq!(path, again);
    }

    #[test]
    fn rebuild_with_same_inputs_is_skipped() {
        let mut planner = PathPlanner::new();
        let obstacle = Rect::new(10.0, 10.0, 30.0, 30.0);
        assert_eq!(planner.rebuild(100.0, 100.0, obstacle, CELL), Ok(true));
        assert_eq!(planner.rebuild(100.0, 100.0, obstacle, CELL), Ok(false));
        assert_eq!(planner.rebuild(120.0, 100.0, obstacle, CELL), Ok(true));
    }
}
