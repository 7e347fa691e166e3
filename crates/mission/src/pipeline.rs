//! Waypoint pipeline: obstacle map + goal position → ordered local-frame waypoints.
//!
//! Runs once per mission, synchronously, when the supervisor enters planning.

use std::path::{Path, PathBuf};

use mp_colliders::{HomeAnchor, ObstacleMapError, load_obstacle_map};
use mp_config::MissionSettings;
use mp_core::{GlobalPosition, GridPoint, ObstacleRecord, Waypoint, global_to_local};
use mp_planner::heuristics::euclidean;
use mp_planner::{NavigableSpace, PlannerAdapter, PlannerError};
use thiserror::Error;

use crate::vehicle::VehicleTelemetry;

/// Output of a successful planning run.
#[derive(Debug, Clone, PartialEq)]
pub struct FlightPlan {
    /// Home anchor the waypoints are expressed against (altitude 0).
    pub home: GlobalPosition,
    pub target_altitude: f64,
    /// Never empty.
    pub waypoints: Vec<Waypoint>,
}

/// Failures of the waypoint pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("obstacle map rejected: {0}")]
    ObstacleMap(#[from] ObstacleMapError),
    #[error("invalid planning input: {0}")]
    InvalidInput(String),
    #[error("navigable space construction failed: {0}")]
    Planner(#[source] PlannerError),
    #[error("{which} position ({north:.1}, {east:.1}) has no navigable point nearby")]
    OffMap {
        which: &'static str,
        north: f64,
        east: f64,
    },
    #[error("goal unreachable: {0}")]
    Unreachable(#[source] PlannerError),
}

impl PipelineError {
    /// Errors caused by the mission's inputs rather than by the search.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            PipelineError::ObstacleMap(_) | PipelineError::InvalidInput(_)
        )
    }
}

/// Plan waypoints from `current` to `goal` around `obstacles`.
///
/// Grid start and goal are the truncated local positions shifted by the space's
/// offsets; each pruned point is rounded to its cell and shifted back.
pub fn plan_waypoints<P: PlannerAdapter>(
    adapter: &P,
    home: &HomeAnchor,
    obstacles: &[ObstacleRecord],
    current: &GlobalPosition,
    goal: &GlobalPosition,
    target_altitude: f64,
    safety_margin: f64,
) -> Result<FlightPlan, PipelineError> {
    if !(target_altitude.is_finite() && target_altitude > 0.0) {
        return Err(PipelineError::InvalidInput(format!(
            "target altitude must be positive, got {target_altitude}"
        )));
    }
    if !(safety_margin.is_finite() && safety_margin >= 0.0) {
        return Err(PipelineError::InvalidInput(format!(
            "safety margin must be non-negative, got {safety_margin}"
        )));
    }
    for (which, position) in [("current", current), ("goal", goal)] {
        if !position.is_valid() {
            return Err(PipelineError::InvalidInput(format!(
                "{which} position ({}, {}) is outside the supported geodetic range",
                position.longitude, position.latitude
            )));
        }
    }

    let home = home.to_global();
    let current_local = global_to_local(current, &home);
    let goal_local = global_to_local(goal, &home);
    log::debug!(
        "home {:?}, current local {:?}, goal local {:?}",
        home,
        current_local,
        goal_local
    );

    let space = adapter
        .build_space(obstacles, target_altitude, safety_margin)
        .map_err(PipelineError::Planner)?;
    let offsets = space.offsets();
    log::debug!("north offset = {}, east offset = {}", offsets.north, offsets.east);

    let grid_start = offsets.local_to_grid(current_local.north, current_local.east);
    let grid_goal = offsets.local_to_grid(goal_local.north, goal_local.east);
    log::debug!("grid start {:?}, grid goal {:?}", grid_start, grid_goal);

    let start_node = nearest(adapter, &space, grid_start, "start")?;
    let goal_node = nearest(adapter, &space, grid_goal, "goal")?;

    let (path, cost) = adapter
        .search(&space, euclidean, start_node, goal_node)
        .map_err(|err| match err {
            PlannerError::NoPath { .. } => PipelineError::Unreachable(err),
            other => PipelineError::Planner(other),
        })?;
    let pruned = adapter.prune(&path, &space);
    log::info!(
        "found path with {} points (cost {:.1}), {} after pruning",
        path.len(),
        cost,
        pruned.len()
    );

    let waypoints: Vec<Waypoint> = pruned
        .iter()
        .map(|point| {
            let (north, east) = offsets.grid_to_local(&point.rounded());
            Waypoint::new(north, east, target_altitude, 0.0)
        })
        .collect();
    if waypoints.is_empty() {
        return Err(PipelineError::Unreachable(PlannerError::NoPath {
            start: start_node,
            goal: goal_node,
        }));
    }

    Ok(FlightPlan {
        home,
        target_altitude,
        waypoints,
    })
}

fn nearest<P: PlannerAdapter>(
    adapter: &P,
    space: &P::Space,
    point: GridPoint,
    which: &'static str,
) -> Result<GridPoint, PipelineError> {
    adapter
        .nearest_point(space, point)
        .ok_or(PipelineError::OffMap {
            which,
            north: point.north,
            east: point.east,
        })
}

/// Planning capability the supervisor calls on entering the planning state.
pub trait MissionPlanner {
    fn plan(&mut self, telemetry: &VehicleTelemetry) -> Result<FlightPlan, PipelineError>;
}

impl<F> MissionPlanner for F
where
    F: FnMut(&VehicleTelemetry) -> Result<FlightPlan, PipelineError>,
{
    fn plan(&mut self, telemetry: &VehicleTelemetry) -> Result<FlightPlan, PipelineError> {
        self(telemetry)
    }
}

/// Pipeline bound to an adapter and a mission's configured inputs.
///
/// The obstacle map is read at planning time, so map errors surface as planning failures.
#[derive(Debug, Clone)]
pub struct WaypointPipeline<P> {
    adapter: P,
    colliders: PathBuf,
    goal: GlobalPosition,
    target_altitude: f64,
    safety_margin: f64,
}

impl<P: PlannerAdapter> WaypointPipeline<P> {
    pub fn new(
        adapter: P,
        colliders: impl Into<PathBuf>,
        goal: GlobalPosition,
        target_altitude: f64,
        safety_margin: f64,
    ) -> Self {
        Self {
            adapter,
            colliders: colliders.into(),
            goal,
            target_altitude,
            safety_margin,
        }
    }

    pub fn from_settings(adapter: P, settings: &MissionSettings) -> Self {
        Self::new(
            adapter,
            settings.colliders.clone(),
            settings.goal.to_global(),
            settings.target_altitude,
            settings.safety_margin,
        )
    }

    pub fn colliders(&self) -> &Path {
        &self.colliders
    }

    pub fn goal(&self) -> GlobalPosition {
        self.goal
    }

    /// Load the obstacle map and plan from `current` to the configured goal.
    pub fn plan_from(&self, current: &GlobalPosition) -> Result<FlightPlan, PipelineError> {
        log::info!("searching for a path from {:?} to {:?}", current, self.goal);
        let map = load_obstacle_map(&self.colliders)?;
        plan_waypoints(
            &self.adapter,
            &map.home,
            &map.obstacles,
            current,
            &self.goal,
            self.target_altitude,
            self.safety_margin,
        )
    }
}

impl<P: PlannerAdapter> MissionPlanner for WaypointPipeline<P> {
    fn plan(&mut self, telemetry: &VehicleTelemetry) -> Result<FlightPlan, PipelineError> {
        self.plan_from(&telemetry.global_position)
    }
}
