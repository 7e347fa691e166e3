//! MAVLink transport: connects to the vehicle, turns incoming messages into
//! telemetry events and feeds them to the supervisor one at a time.

mod navlog;
mod vehicle;

use mp_mission::{MissionPlanner, MissionState, Supervisor, SupervisorError, VehicleError};
use thiserror::Error;

pub use navlog::NavLog;
pub use vehicle::{
    MavlinkVehicle, TelemetryUpdate, VEHICLE_SYSTEM_ID, apply_message, degrees_e7,
    set_home_message,
};

/// Errors raised by the MAVLink link.
#[derive(Debug, Error)]
pub enum LinkError {
    #[error("failed to connect to {address}: {source}")]
    Connect {
        address: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to receive MAVLink message: {0}")]
    Receive(#[from] mavlink::error::MessageReadError),
    #[error(transparent)]
    Vehicle(#[from] VehicleError),
    #[error(transparent)]
    Mission(#[from] SupervisorError),
}

/// Pump telemetry into `supervisor` until the mission finishes or the link is stopped.
///
/// Messages are handled strictly in arrival order; while planning runs, later
/// messages wait in the connection buffer. Every accepted update is appended
/// to `nav_log` when one is given.
pub fn run(
    vehicle: &mut MavlinkVehicle,
    supervisor: &mut Supervisor,
    planner: &mut dyn MissionPlanner,
    mut nav_log: Option<&mut NavLog>,
) -> Result<MissionState, LinkError> {
    while !supervisor.is_finished() && !vehicle.is_stopped() {
        vehicle.heartbeat_if_due()?;
        let Some(update) = vehicle.receive()? else {
            continue;
        };
        let telemetry = *vehicle.telemetry();
        if let Some(sink) = nav_log.as_deref_mut() {
            if let Err(err) = sink.record(update.message, &telemetry) {
                log::warn!("nav log: {err}");
            }
        }
        for &event in update.events {
            supervisor.step(event, &telemetry, planner, vehicle)?;
        }
    }
    log::info!("mission ended in {}", supervisor.state());
    Ok(supervisor.state())
}
