//! Contract with the vehicle transport: telemetry snapshot, commands, and their execution.

use mp_core::vector::{horizontal_distance, horizontal_norm};
use mp_core::{GlobalPosition, LocalPosition, Waypoint};
use thiserror::Error;

/// Read-only telemetry snapshot, refreshed by the transport before each event.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct VehicleTelemetry {
    pub local_position: LocalPosition,
    /// Local velocity `(north, east, down)` in m/s.
    pub local_velocity: [f64; 3],
    pub global_position: GlobalPosition,
    pub global_home: GlobalPosition,
    pub armed: bool,
    pub guided: bool,
}

impl VehicleTelemetry {
    /// Altitude above home from the local frame.
    pub fn altitude(&self) -> f64 {
        self.local_position.altitude()
    }

    pub fn horizontal_speed(&self) -> f64 {
        horizontal_norm(&self.local_velocity)
    }

    /// Horizontal distance from the vehicle to a target.
    pub fn horizontal_distance_to(&self, target: &Waypoint) -> f64 {
        horizontal_distance(
            &self.local_position.as_array(),
            &[target.north, target.east, 0.0],
        )
    }

    /// Global altitude relative to the home altitude.
    pub fn height_above_home(&self) -> f64 {
        self.global_position.altitude - self.global_home.altitude
    }
}

/// A command the supervisor asks the vehicle to perform.
#[derive(Debug, Clone, PartialEq)]
pub enum VehicleCommand {
    Arm,
    Disarm,
    TakeControl,
    ReleaseControl,
    Takeoff { altitude: f64 },
    Land,
    Stop,
    CmdPosition(Waypoint),
    SetHomePosition(GlobalPosition),
    /// Serialized waypoint list for external visualization; best effort.
    SendWaypoints(Vec<u8>),
}

impl VehicleCommand {
    pub fn name(&self) -> &'static str {
        match self {
            VehicleCommand::Arm => "arm",
            VehicleCommand::Disarm => "disarm",
            VehicleCommand::TakeControl => "take_control",
            VehicleCommand::ReleaseControl => "release_control",
            VehicleCommand::Takeoff { .. } => "takeoff",
            VehicleCommand::Land => "land",
            VehicleCommand::Stop => "stop",
            VehicleCommand::CmdPosition(_) => "cmd_position",
            VehicleCommand::SetHomePosition(_) => "set_home_position",
            VehicleCommand::SendWaypoints(_) => "send_waypoints",
        }
    }
}

/// Errors surfaced by a vehicle transport.
#[derive(Debug, Error)]
pub enum VehicleError {
    #[error("vehicle link failure: {0}")]
    Link(String),
    #[error("vehicle rejected `{command}`: {reason}")]
    Rejected {
        command: &'static str,
        reason: String,
    },
}

/// Command surface of the vehicle collaborator.
pub trait Vehicle {
    fn arm(&mut self) -> Result<(), VehicleError>;
    fn disarm(&mut self) -> Result<(), VehicleError>;
    fn take_control(&mut self) -> Result<(), VehicleError>;
    fn release_control(&mut self) -> Result<(), VehicleError>;
    fn takeoff(&mut self, altitude: f64) -> Result<(), VehicleError>;
    fn land(&mut self) -> Result<(), VehicleError>;
    fn stop(&mut self) -> Result<(), VehicleError>;
    fn cmd_position(
        &mut self,
        north: f64,
        east: f64,
        altitude: f64,
        heading: f64,
    ) -> Result<(), VehicleError>;
    fn set_home_position(
        &mut self,
        longitude: f64,
        latitude: f64,
        altitude: f64,
    ) -> Result<(), VehicleError>;
    fn send_waypoints(&mut self, payload: &[u8]) -> Result<(), VehicleError>;
}

/// Issue `commands` in order.
///
/// A failed `SendWaypoints` is logged and skipped; any other failure stops execution.
pub fn execute<V: Vehicle + ?Sized>(
    vehicle: &mut V,
    commands: &[VehicleCommand],
) -> Result<(), VehicleError> {
    for command in commands {
        let result = match command {
            VehicleCommand::Arm => vehicle.arm(),
            VehicleCommand::Disarm => vehicle.disarm(),
            VehicleCommand::TakeControl => vehicle.take_control(),
            VehicleCommand::ReleaseControl => vehicle.release_control(),
            VehicleCommand::Takeoff { altitude } => vehicle.takeoff(*altitude),
            VehicleCommand::Land => vehicle.land(),
            VehicleCommand::Stop => vehicle.stop(),
            VehicleCommand::CmdPosition(w) => {
                vehicle.cmd_position(w.north, w.east, w.altitude, w.heading)
            }
            VehicleCommand::SetHomePosition(home) => {
                vehicle.set_home_position(home.longitude, home.latitude, home.altitude)
            }
            VehicleCommand::SendWaypoints(payload) => {
                if let Err(err) = vehicle.send_waypoints(payload) {
                    log::warn!("waypoint overlay not delivered: {err}");
                }
                Ok(())
            }
        };
        result?;
    }
    Ok(())
}
