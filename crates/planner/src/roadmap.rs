//! Lattice roadmap: a sparse graph over free space, searched with A*.
//!
//! Nodes sit on free cells every `node_spacing` cells; edges join the eight
//! lattice neighbours whenever the straight segment between them is clear.

use std::collections::HashMap;

use mp_core::{FrameOffsets, GridPoint, ObstacleRecord, Path};
use pathfinding::prelude::astar;

use crate::adapter::{Heuristic, NavigableSpace, PlannerAdapter, PlannerError};
use crate::occupancy::{Cell, OccupancyGrid};
use crate::prune::prune_path;
use crate::{scale_cost, scale_heuristic, unscale_cost};

pub const DEFAULT_NODE_SPACING: usize = 10;

/// Roadmap planner with a configurable lattice spacing (cells).
#[derive(Debug, Clone, Copy)]
pub struct RoadmapPlanner {
    node_spacing: usize,
}

impl Default for RoadmapPlanner {
    fn default() -> Self {
        Self {
            node_spacing: DEFAULT_NODE_SPACING,
        }
    }
}

impl RoadmapPlanner {
    pub fn new(node_spacing: usize) -> Result<Self, PlannerError> {
        if node_spacing == 0 {
            return Err(PlannerError::InvalidParameter(
                "roadmap node spacing must be at least one cell".to_string(),
            ));
        }
        Ok(Self { node_spacing })
    }
}

/// Navigable space of the roadmap planner.
#[derive(Debug, Clone)]
pub struct Roadmap {
    grid: OccupancyGrid,
    nodes: Vec<Cell>,
    adjacency: HashMap<Cell, Vec<(Cell, u64)>>,
}

impl Roadmap {
    fn build(grid: OccupancyGrid, spacing: usize) -> Self {
        let step = spacing as i64;
        let mut nodes = Vec::new();
        for n in (0..grid.north_size()).step_by(spacing) {
            for e in (0..grid.east_size()).step_by(spacing) {
                let cell = (n as i64, e as i64);
                if grid.is_free(cell) {
                    nodes.push(cell);
                }
            }
        }

        let mut adjacency: HashMap<Cell, Vec<(Cell, u64)>> =
            nodes.iter().map(|cell| (*cell, Vec::new())).collect();
        let mut edges = Vec::new();
        for &node in &nodes {
            for (dn, de) in [(0, step), (step, 0), (step, step), (step, -step)] {
                let other = (node.0 + dn, node.1 + de);
                if adjacency.contains_key(&other) && grid.line_of_sight(node, other) {
                    let length = OccupancyGrid::point_of(node)
                        .distance_to(&OccupancyGrid::point_of(other));
                    edges.push((node, other, scale_cost(length)));
                }
            }
        }
        for (a, b, cost) in edges {
            if let Some(list) = adjacency.get_mut(&a) {
                list.push((b, cost));
            }
            if let Some(list) = adjacency.get_mut(&b) {
                list.push((a, cost));
            }
        }

        Self {
            grid,
            nodes,
            adjacency,
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of undirected edges.
    pub fn edge_count(&self) -> usize {
        self.adjacency.values().map(Vec::len).sum::<usize>() / 2
    }

    pub fn contains_node(&self, point: &GridPoint) -> bool {
        self.adjacency.contains_key(&OccupancyGrid::cell_of(point))
    }
}

impl NavigableSpace for Roadmap {
    fn offsets(&self) -> FrameOffsets {
        self.grid.offsets()
    }
}

impl PlannerAdapter for RoadmapPlanner {
    type Space = Roadmap;

    fn build_space(
        &self,
        obstacles: &[ObstacleRecord],
        target_altitude: f64,
        safety_margin: f64,
    ) -> Result<Roadmap, PlannerError> {
        let grid = OccupancyGrid::from_obstacles(obstacles, target_altitude, safety_margin)?;
        let roadmap = Roadmap::build(grid, self.node_spacing);
        log::debug!(
            "roadmap built with {} nodes and {} edges (spacing {})",
            roadmap.node_count(),
            roadmap.edge_count(),
            self.node_spacing
        );
        Ok(roadmap)
    }

    fn nearest_point(&self, space: &Roadmap, coordinate: GridPoint) -> Option<GridPoint> {
        space
            .nodes
            .iter()
            .map(|cell| OccupancyGrid::point_of(*cell))
            .min_by(|a, b| {
                a.distance_to(&coordinate)
                    .total_cmp(&b.distance_to(&coordinate))
            })
    }

    fn search(
        &self,
        space: &Roadmap,
        heuristic: Heuristic,
        start: GridPoint,
        goal: GridPoint,
    ) -> Result<(Path, f64), PlannerError> {
        for point in [start, goal] {
            if !space.contains_node(&point) {
                return Err(PlannerError::Blocked {
                    north: point.north,
                    east: point.east,
                });
            }
        }

        let start_cell = OccupancyGrid::cell_of(&start);
        let goal_cell = OccupancyGrid::cell_of(&goal);
        let goal_point = OccupancyGrid::point_of(goal_cell);
        let result = astar(
            &start_cell,
            |cell| space.adjacency.get(cell).cloned().unwrap_or_default(),
            |cell| scale_heuristic(heuristic(&OccupancyGrid::point_of(*cell), &goal_point)),
            |cell| *cell == goal_cell,
        );

        match result {
            Some((cells, cost)) => Ok((
                cells.into_iter().map(OccupancyGrid::point_of).collect(),
                unscale_cost(cost),
            )),
            None => Err(PlannerError::NoPath { start, goal }),
        }
    }

    fn prune(&self, path: &Path, space: &Roadmap) -> Path {
        prune_path(path, &space.grid)
    }
}
