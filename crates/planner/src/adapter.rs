//! The capability interface the waypoint pipeline plans through.

use mp_core::{FrameOffsets, GridPoint, ObstacleRecord, Path};
use thiserror::Error;

/// Distance estimate between two grid points.
pub type Heuristic = fn(&GridPoint, &GridPoint) -> f64;

/// Errors reported by planner implementations.
#[derive(Debug, Error)]
pub enum PlannerError {
    #[error("obstacle map contains no obstacles to bound the planning area")]
    EmptyMap,
    #[error("invalid planner parameter: {0}")]
    InvalidParameter(String),
    #[error("grid position ({north}, {east}) is blocked or outside the map")]
    Blocked { north: f64, east: f64 },
    #[error("no path from ({}, {}) to ({}, {})", start.north, start.east, goal.north, goal.east)]
    NoPath { start: GridPoint, goal: GridPoint },
}

/// A planner's representation of free space at the planning altitude.
pub trait NavigableSpace {
    /// Offsets between the space's grid origin and the local frame origin.
    fn offsets(&self) -> FrameOffsets;
}

/// Build, search, and simplify over a navigable space.
pub trait PlannerAdapter {
    type Space: NavigableSpace;

    /// Construct the navigable space for `target_altitude`, keeping `safety_margin` clear of obstacles.
    fn build_space(
        &self,
        obstacles: &[ObstacleRecord],
        target_altitude: f64,
        safety_margin: f64,
    ) -> Result<Self::Space, PlannerError>;

    /// Closest point of the space's connectivity to `coordinate`, if the space has any.
    fn nearest_point(&self, space: &Self::Space, coordinate: GridPoint) -> Option<GridPoint>;

    /// Shortest path from `start` to `goal` and its cost.
    fn search(
        &self,
        space: &Self::Space,
        heuristic: Heuristic,
        start: GridPoint,
        goal: GridPoint,
    ) -> Result<(Path, f64), PlannerError>;

    /// Remove redundant points while keeping every remaining segment collision free.
    fn prune(&self, path: &Path, space: &Self::Space) -> Path;
}
