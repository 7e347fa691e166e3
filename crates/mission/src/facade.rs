//! Re-exported APIs for consumers of the mission crate.

pub use crate::pipeline::{
    FlightPlan, MissionPlanner, PipelineError, WaypointPipeline, plan_waypoints,
};
pub use crate::supervisor::{
    FailureKind, MissionFailure, MissionState, Supervisor, SupervisorError, TelemetryEvent,
};
pub use crate::vehicle::{Vehicle, VehicleCommand, VehicleError, VehicleTelemetry, execute};
pub use mp_config::GuardThresholds;

pub mod planners {
    use mp_config::{MissionSettings, PlannerConfig};
    use mp_planner::{GridPlanner, PlannerError, RoadmapPlanner};

    use crate::pipeline::{MissionPlanner, WaypointPipeline};

    /// Build the waypoint pipeline selected by `settings.planner`.
    pub fn from_settings(
        settings: &MissionSettings,
    ) -> Result<Box<dyn MissionPlanner>, PlannerError> {
        let planner: Box<dyn MissionPlanner> = match settings.planner {
            PlannerConfig::Grid => Box::new(WaypointPipeline::from_settings(
                GridPlanner::new(),
                settings,
            )),
            PlannerConfig::Roadmap { node_spacing } => Box::new(WaypointPipeline::from_settings(
                RoadmapPlanner::new(node_spacing)?,
                settings,
            )),
        };
        log::debug!("using the {} planner", settings.planner.name());
        Ok(planner)
    }
}
