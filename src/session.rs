//! Glue shared by the binaries: settings with CLI overrides, offline planning, teardown.

use std::path::{Path, PathBuf};

use mp_colliders::load_obstacle_map;
use mp_config::{ConfigError, MissionSettings, load_mission_settings};
use mp_export::plan::PlanDocument;
use mp_mission::planners;
use mp_mission::{
    MissionPlanner, PipelineError, Vehicle, VehicleCommand, VehicleTelemetry, execute,
};
use mp_planner::PlannerError;
use thiserror::Error;

/// Errors raised while preparing or running a session.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Planner(#[from] PlannerError),
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

/// Values given on the command line that take precedence over the manifest.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub colliders: Option<PathBuf>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub nav_log: Option<PathBuf>,
}

/// Load mission settings from `path` and apply `overrides`.
pub fn load_settings(path: &Path, overrides: Overrides) -> Result<MissionSettings, SessionError> {
    let mut settings = load_mission_settings(path)?;
    if let Some(colliders) = overrides.colliders {
        settings.colliders = colliders;
    }
    if let Some(host) = overrides.host {
        settings.connection.host = host;
    }
    if let Some(port) = overrides.port {
        settings.connection.port = port;
    }
    if let Some(nav_log) = overrides.nav_log {
        settings.nav_log = Some(nav_log);
    }
    log::debug!("mission settings: {:?}", settings);
    Ok(settings)
}

/// Run the configured pipeline as if the vehicle sat at the map's home anchor.
pub fn plan_offline(settings: &MissionSettings) -> Result<PlanDocument, SessionError> {
    let map = load_obstacle_map(&settings.colliders).map_err(PipelineError::from)?;
    let home = map.home.to_global();
    let telemetry = VehicleTelemetry {
        global_position: home,
        global_home: home,
        ..VehicleTelemetry::default()
    };

    let mut planner = planners::from_settings(settings)?;
    let plan = planner.plan(&telemetry)?;

    Ok(PlanDocument {
        planner: settings.planner.name().to_string(),
        home: plan.home,
        start: home,
        goal: settings.goal.to_global(),
        target_altitude: plan.target_altitude,
        safety_margin: settings.safety_margin,
        waypoints: plan.waypoints,
    })
}

/// Put the vehicle back in a safe state after a failed mission: disarm, release control, stop.
///
/// Each command is attempted even if an earlier one fails.
pub fn teardown<V: Vehicle + ?Sized>(vehicle: &mut V) {
    for command in [
        VehicleCommand::Disarm,
        VehicleCommand::ReleaseControl,
        VehicleCommand::Stop,
    ] {
        let name = command.name();
        if let Err(err) = execute(vehicle, &[command]) {
            log::warn!("teardown `{name}` failed: {err}");
        }
    }
}
