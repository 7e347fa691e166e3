//! MAVLink-backed implementation of the vehicle contract.

use std::io::Write;
use std::net::TcpStream;
use std::time::{Duration, Instant};

use mavlink::MavHeader;
use mavlink::common::{
    COMMAND_INT_DATA, COMMAND_LONG_DATA, HEARTBEAT_DATA, MavAutopilot, MavCmd, MavFrame,
    MavMessage, MavModeFlag, MavState, MavType, PositionTargetTypemask,
    SET_POSITION_TARGET_LOCAL_NED_DATA,
};
use mavlink::error::MessageReadError;
use mavlink::peek_reader::PeekReader;
use mp_core::{GlobalPosition, LocalPosition};
use mp_mission::{TelemetryEvent, Vehicle, VehicleError, VehicleTelemetry};

use crate::LinkError;

/// System id of the autopilot on the other end of the link.
pub const VEHICLE_SYSTEM_ID: u8 = 1;

/// Telemetry change caused by one accepted message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TelemetryUpdate {
    /// MAVLink message name, e.g. `LOCAL_POSITION_NED`.
    pub message: &'static str,
    /// Events to dispatch, in order.
    pub events: &'static [TelemetryEvent],
}

fn from_autopilot(heartbeat: &HEARTBEAT_DATA) -> bool {
    heartbeat.autopilot != MavAutopilot::MAV_AUTOPILOT_INVALID
        && heartbeat.mavtype != MavType::MAV_TYPE_GCS
}

/// Fold one incoming message into `telemetry`.
///
/// Messages from systems other than `vehicle_system` are ignored, as are
/// heartbeats from ground stations and companion components. Global and home
/// positions only refresh the snapshot; local position reports raise a
/// position event followed by a velocity event.
pub fn apply_message(
    telemetry: &mut VehicleTelemetry,
    vehicle_system: u8,
    header: &MavHeader,
    message: MavMessage,
) -> Option<TelemetryUpdate> {
    if header.system_id != vehicle_system {
        return None;
    }
    match message {
        MavMessage::HEARTBEAT(heartbeat) if from_autopilot(&heartbeat) => {
            let mode = heartbeat.base_mode;
            telemetry.armed = mode.contains(MavModeFlag::MAV_MODE_FLAG_SAFETY_ARMED);
            telemetry.guided = mode.contains(MavModeFlag::MAV_MODE_FLAG_GUIDED_ENABLED);
            Some(TelemetryUpdate {
                message: "HEARTBEAT",
                events: &[TelemetryEvent::State],
            })
        }
        MavMessage::LOCAL_POSITION_NED(ned) => {
            telemetry.local_position = LocalPosition::new(ned.x as f64, ned.y as f64, ned.z as f64);
            telemetry.local_velocity = [ned.vx as f64, ned.vy as f64, ned.vz as f64];
            Some(TelemetryUpdate {
                message: "LOCAL_POSITION_NED",
                events: &[TelemetryEvent::Position, TelemetryEvent::Velocity],
            })
        }
        MavMessage::GLOBAL_POSITION_INT(global) => {
            telemetry.global_position = GlobalPosition::new(
                global.lon as f64 / 1e7,
                global.lat as f64 / 1e7,
                global.alt as f64 / 1000.0,
            );
            Some(TelemetryUpdate {
                message: "GLOBAL_POSITION_INT",
                events: &[],
            })
        }
        MavMessage::HOME_POSITION(home) => {
            telemetry.global_home = GlobalPosition::new(
                home.longitude as f64 / 1e7,
                home.latitude as f64 / 1e7,
                home.altitude as f64 / 1000.0,
            );
            Some(TelemetryUpdate {
                message: "HOME_POSITION",
                events: &[],
            })
        }
        _ => None,
    }
}

/// Degrees scaled to the integer 1e-7 degree units MAVLink uses for positions.
pub fn degrees_e7(degrees: f64) -> i32 {
    (degrees * 1e7).round() as i32
}

/// `DO_SET_HOME` as a `COMMAND_INT`, so latitude and longitude keep full precision.
pub fn set_home_message(
    target_system: u8,
    target_component: u8,
    longitude: f64,
    latitude: f64,
    altitude: f64,
) -> MavMessage {
    MavMessage::COMMAND_INT(COMMAND_INT_DATA {
        // 0: use the supplied location rather than the current position.
        param1: 0.0,
        param2: 0.0,
        param3: 0.0,
        param4: 0.0,
        x: degrees_e7(latitude),
        y: degrees_e7(longitude),
        z: altitude as f32,
        command: MavCmd::MAV_CMD_DO_SET_HOME,
        target_system,
        target_component,
        frame: MavFrame::MAV_FRAME_GLOBAL,
        current: 0,
        autocontinue: 0,
    })
}

const HEARTBEAT_PERIOD: Duration = Duration::from_secs(1);

/// PX4 main modes used by `DO_SET_MODE`.
const PX4_MODE_MANUAL: f32 = 1.0;
const PX4_MODE_OFFBOARD: f32 = 6.0;

/// Vehicle reached over a MAVLink v2 TCP connection.
///
/// Telemetry is refreshed from incoming messages before the matching event is
/// reported, so the snapshot is always current when the supervisor reads it.
/// The waypoint overlay travels over the same socket as the MAVLink frames.
pub struct MavlinkVehicle {
    reader: PeekReader<TcpStream>,
    writer: TcpStream,
    telemetry: VehicleTelemetry,
    target_system: u8,
    target_component: u8,
    system_id: u8,
    component_id: u8,
    sequence: u8,
    last_heartbeat: Option<Instant>,
    stopped: bool,
}

impl MavlinkVehicle {
    /// Connect to the vehicle's MAVLink TCP endpoint, e.g. `127.0.0.1:5760`.
    pub fn connect(address: &str) -> Result<Self, LinkError> {
        let connect_error = |source: std::io::Error| LinkError::Connect {
            address: address.to_string(),
            source,
        };
        let stream = TcpStream::connect(address).map_err(&connect_error)?;
        let writer = stream.try_clone().map_err(&connect_error)?;
        log::info!("connected to {address}");

        Ok(Self {
            reader: PeekReader::new(stream),
            writer,
            telemetry: VehicleTelemetry::default(),
            target_system: VEHICLE_SYSTEM_ID,
            target_component: 1,
            system_id: 255,
            component_id: 0,
            sequence: 0,
            last_heartbeat: None,
            stopped: false,
        })
    }

    pub fn telemetry(&self) -> &VehicleTelemetry {
        &self.telemetry
    }

    /// `stop` has been issued; no further messages should be pumped.
    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Block for the next frame and fold it into the telemetry snapshot.
    ///
    /// Returns `None` for frames that change nothing, including ones the
    /// dialect cannot decode.
    pub fn receive(&mut self) -> Result<Option<TelemetryUpdate>, LinkError> {
        match mavlink::read_v2_msg::<MavMessage, _>(&mut self.reader) {
            Ok((header, message)) => Ok(apply_message(
                &mut self.telemetry,
                self.target_system,
                &header,
                message,
            )),
            Err(MessageReadError::Parse(err)) => {
                log::debug!("skipping undecodable frame: {err}");
                Ok(None)
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Send a GCS heartbeat if the last one is older than a second.
    pub fn heartbeat_if_due(&mut self) -> Result<(), VehicleError> {
        if self
            .last_heartbeat
            .is_some_and(|sent| sent.elapsed() < HEARTBEAT_PERIOD)
        {
            return Ok(());
        }
        let message = MavMessage::HEARTBEAT(HEARTBEAT_DATA {
            custom_mode: 0,
            mavtype: MavType::MAV_TYPE_GCS,
            autopilot: MavAutopilot::MAV_AUTOPILOT_INVALID,
            base_mode: MavModeFlag::empty(),
            system_status: MavState::MAV_STATE_ACTIVE,
            mavlink_version: 3,
        });
        self.send("heartbeat", &message)?;
        self.last_heartbeat = Some(Instant::now());
        Ok(())
    }

    fn make_header(&mut self) -> MavHeader {
        let sequence = self.sequence;
        self.sequence = self.sequence.wrapping_add(1);
        MavHeader {
            system_id: self.system_id,
            component_id: self.component_id,
            sequence,
        }
    }

    fn send(&mut self, command: &'static str, message: &MavMessage) -> Result<(), VehicleError> {
        let header = self.make_header();
        mavlink::write_v2_msg(&mut self.writer, header, message)
            .map(|_| ())
            .map_err(|err| VehicleError::Link(format!("{command}: {err}")))
    }

    fn send_command(
        &mut self,
        name: &'static str,
        command: MavCmd,
        params: [f32; 7],
    ) -> Result<(), VehicleError> {
        let message = MavMessage::COMMAND_LONG(COMMAND_LONG_DATA {
            target_system: self.target_system,
            target_component: self.target_component,
            command,
            confirmation: 0,
            param1: params[0],
            param2: params[1],
            param3: params[2],
            param4: params[3],
            param5: params[4],
            param6: params[5],
            param7: params[6],
        });
        log::debug!("sending {name}");
        self.send(name, &message)
    }
}

impl Vehicle for MavlinkVehicle {
    fn arm(&mut self) -> Result<(), VehicleError> {
        self.send_command(
            "arm",
            MavCmd::MAV_CMD_COMPONENT_ARM_DISARM,
            [1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
        )
    }

    fn disarm(&mut self) -> Result<(), VehicleError> {
        self.send_command(
            "disarm",
            MavCmd::MAV_CMD_COMPONENT_ARM_DISARM,
            [0.0; 7],
        )
    }

    fn take_control(&mut self) -> Result<(), VehicleError> {
        self.send_command(
            "take_control",
            MavCmd::MAV_CMD_DO_SET_MODE,
            [1.0, PX4_MODE_OFFBOARD, 0.0, 0.0, 0.0, 0.0, 0.0],
        )
    }

    fn release_control(&mut self) -> Result<(), VehicleError> {
        self.send_command(
            "release_control",
            MavCmd::MAV_CMD_DO_SET_MODE,
            [1.0, PX4_MODE_MANUAL, 0.0, 0.0, 0.0, 0.0, 0.0],
        )
    }

    fn takeoff(&mut self, altitude: f64) -> Result<(), VehicleError> {
        self.send_command(
            "takeoff",
            MavCmd::MAV_CMD_NAV_TAKEOFF,
            [
                0.0,
                0.0,
                0.0,
                f32::NAN,
                f32::NAN,
                f32::NAN,
                altitude as f32,
            ],
        )
    }

    fn land(&mut self) -> Result<(), VehicleError> {
        self.send_command(
            "land",
            MavCmd::MAV_CMD_NAV_LAND,
            [0.0, 0.0, 0.0, f32::NAN, f32::NAN, f32::NAN, 0.0],
        )
    }

    fn stop(&mut self) -> Result<(), VehicleError> {
        log::info!("closing vehicle link");
        self.stopped = true;
        Ok(())
    }

    fn cmd_position(
        &mut self,
        north: f64,
        east: f64,
        altitude: f64,
        heading: f64,
    ) -> Result<(), VehicleError> {
        let message =
            MavMessage::SET_POSITION_TARGET_LOCAL_NED(SET_POSITION_TARGET_LOCAL_NED_DATA {
                time_boot_ms: 0,
                target_system: self.target_system,
                target_component: self.target_component,
                coordinate_frame: MavFrame::MAV_FRAME_LOCAL_NED,
                type_mask: PositionTargetTypemask::empty(),
                x: north as f32,
                y: east as f32,
                z: -altitude as f32,
                vx: 0.0,
                vy: 0.0,
                vz: 0.0,
                afx: 0.0,
                afy: 0.0,
                afz: 0.0,
                yaw: heading as f32,
                yaw_rate: 0.0,
            });
        self.send("cmd_position", &message)
    }

    fn set_home_position(
        &mut self,
        longitude: f64,
        latitude: f64,
        altitude: f64,
    ) -> Result<(), VehicleError> {
        let message = set_home_message(
            self.target_system,
            self.target_component,
            longitude,
            latitude,
            altitude,
        );
        self.send("set_home_position", &message)
    }

    fn send_waypoints(&mut self, payload: &[u8]) -> Result<(), VehicleError> {
        self.writer
            .write_all(payload)
            .map_err(|err| VehicleError::Link(format!("waypoint overlay: {err}")))?;
        log::info!("sent {} byte waypoint overlay", payload.len());
        Ok(())
    }
}
