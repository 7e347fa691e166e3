//! 8-connected A* directly over the occupancy grid.

use mp_core::{GridPoint, ObstacleRecord, Path};
use pathfinding::prelude::astar;

use crate::adapter::{Heuristic, PlannerAdapter, PlannerError};
use crate::occupancy::{Cell, OccupancyGrid};
use crate::prune::prune_path;
use crate::{scale_cost, scale_heuristic, unscale_cost};

const MOVES: [(i64, i64, f64); 8] = [
    (-1, 0, 1.0),
    (1, 0, 1.0),
    (0, -1, 1.0),
    (0, 1, 1.0),
    (-1, -1, std::f64::consts::SQRT_2),
    (-1, 1, std::f64::consts::SQRT_2),
    (1, -1, std::f64::consts::SQRT_2),
    (1, 1, std::f64::consts::SQRT_2),
];

/// Grid planner: the navigable space is the occupancy grid itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct GridPlanner;

impl GridPlanner {
    pub fn new() -> Self {
        Self
    }

    fn successors(grid: &OccupancyGrid, cell: Cell) -> Vec<(Cell, u64)> {
        MOVES
            .iter()
            .map(|&(dn, de, cost)| ((cell.0 + dn, cell.1 + de), cost))
            .filter(|(next, _)| grid.is_free(*next))
            .map(|(next, cost)| (next, scale_cost(cost)))
            .collect()
    }
}

impl PlannerAdapter for GridPlanner {
    type Space = OccupancyGrid;

    fn build_space(
        &self,
        obstacles: &[ObstacleRecord],
        target_altitude: f64,
        safety_margin: f64,
    ) -> Result<OccupancyGrid, PlannerError> {
        OccupancyGrid::from_obstacles(obstacles, target_altitude, safety_margin)
    }

    fn nearest_point(&self, space: &OccupancyGrid, coordinate: GridPoint) -> Option<GridPoint> {
        space.nearest_free(&coordinate).map(OccupancyGrid::point_of)
    }

    fn search(
        &self,
        space: &OccupancyGrid,
        heuristic: Heuristic,
        start: GridPoint,
        goal: GridPoint,
    ) -> Result<(Path, f64), PlannerError> {
        let start_cell = OccupancyGrid::cell_of(&start);
        let goal_cell = OccupancyGrid::cell_of(&goal);
        for (cell, point) in [(start_cell, start), (goal_cell, goal)] {
            if space.is_blocked(cell) {
                return Err(PlannerError::Blocked {
                    north: point.north,
                    east: point.east,
                });
            }
        }

        let goal_point = OccupancyGrid::point_of(goal_cell);
        let result = astar(
            &start_cell,
            |cell| Self::successors(space, *cell),
            |cell| scale_heuristic(heuristic(&OccupancyGrid::point_of(*cell), &goal_point)),
            |cell| *cell == goal_cell,
        );

        match result {
            Some((cells, cost)) => {
                let path = cells.into_iter().map(OccupancyGrid::point_of).collect();
                Ok((path, unscale_cost(cost)))
            }
            None => Err(PlannerError::NoPath { start, goal }),
        }
    }

    fn prune(&self, path: &Path, space: &OccupancyGrid) -> Path {
        prune_path(path, space)
    }
}
