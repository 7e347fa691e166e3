//! Planner adapter contract and the planners shipped with the workspace.
//!
//! The waypoint pipeline only talks to [`PlannerAdapter`]; [`GridPlanner`] and
//! [`RoadmapPlanner`] are the two conforming implementations.

pub mod adapter;
pub mod grid;
pub mod heuristics;
pub mod occupancy;
pub mod prune;
pub mod roadmap;

pub use adapter::{Heuristic, NavigableSpace, PlannerAdapter, PlannerError};
pub use grid::GridPlanner;
pub use occupancy::OccupancyGrid;
pub use roadmap::{Roadmap, RoadmapPlanner};

/// Costs handed to the `pathfinding` crate are scaled to integers by this factor.
pub(crate) const COST_SCALE: f64 = 1000.0;

pub(crate) fn scale_cost(cost: f64) -> u64 {
    (cost * COST_SCALE).round() as u64
}

/// Heuristic values are floored so the scaled estimate never overshoots the true cost.
pub(crate) fn scale_heuristic(estimate: f64) -> u64 {
    (estimate * COST_SCALE).floor().max(0.0) as u64
}

pub(crate) fn unscale_cost(cost: u64) -> f64 {
    cost as f64 / COST_SCALE
}
