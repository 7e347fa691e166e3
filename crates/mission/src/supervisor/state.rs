//! Mission states, telemetry events, and the pure transition function.

use std::fmt;

use mp_config::GuardThresholds;
use mp_core::Waypoint;

use crate::vehicle::VehicleTelemetry;

/// Phase of the mission. Exactly one is current at any instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MissionState {
    #[default]
    Manual,
    Arming,
    Planning,
    Takeoff,
    Waypoint,
    Landing,
    Disarming,
}

impl fmt::Display for MissionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MissionState::Manual => "MANUAL",
            MissionState::Arming => "ARMING",
            MissionState::Planning => "PLANNING",
            MissionState::Takeoff => "TAKEOFF",
            MissionState::Waypoint => "WAYPOINT",
            MissionState::Landing => "LANDING",
            MissionState::Disarming => "DISARMING",
        };
        f.write_str(name)
    }
}

/// Telemetry signal that triggered a guard evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TelemetryEvent {
    Position,
    Velocity,
    State,
}

/// Everything the guards read, borrowed from the supervisor and the vehicle.
#[derive(Debug, Clone, Copy)]
pub struct GuardInputs<'a> {
    pub telemetry: &'a VehicleTelemetry,
    pub mission_active: bool,
    pub target: &'a Waypoint,
    pub queued_waypoints: usize,
    pub thresholds: &'a GuardThresholds,
}

/// A transition whose guard held; applying it yields [`Transition::target_state`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Arm,
    Plan,
    Takeoff,
    AdvanceWaypoint,
    Land,
    Disarm,
    Manual,
}

impl Transition {
    pub fn target_state(self) -> MissionState {
        match self {
            Transition::Arm => MissionState::Arming,
            Transition::Plan => MissionState::Planning,
            Transition::Takeoff => MissionState::Takeoff,
            Transition::AdvanceWaypoint => MissionState::Waypoint,
            Transition::Land => MissionState::Landing,
            Transition::Disarm => MissionState::Disarming,
            Transition::Manual => MissionState::Manual,
        }
    }
}

/// Evaluate the guards of `state` for `event`.
///
/// Position events drive takeoff and waypoint progress, velocity events drive
/// landing, state events drive everything else. Only state events consult the
/// mission-active flag.
pub fn transition(
    state: MissionState,
    event: TelemetryEvent,
    inputs: &GuardInputs<'_>,
) -> Option<Transition> {
    match event {
        TelemetryEvent::Position => position_transition(state, inputs),
        TelemetryEvent::Velocity => velocity_transition(state, inputs),
        TelemetryEvent::State => state_transition(state, inputs),
    }
}

fn position_transition(state: MissionState, inputs: &GuardInputs<'_>) -> Option<Transition> {
    let telemetry = inputs.telemetry;
    let thresholds = inputs.thresholds;
    match state {
        MissionState::Takeoff => {
            let reached =
                telemetry.altitude() >= thresholds.takeoff_altitude_fraction * inputs.target.altitude;
            reached.then_some(Transition::AdvanceWaypoint)
        }
        MissionState::Waypoint => {
            if telemetry.horizontal_distance_to(inputs.target) >= thresholds.waypoint_radius {
                None
            } else if inputs.queued_waypoints > 0 {
                Some(Transition::AdvanceWaypoint)
            } else if telemetry.horizontal_speed() < thresholds.landing_speed {
                Some(Transition::Land)
            } else {
                None
            }
        }
        _ => None,
    }
}

fn velocity_transition(state: MissionState, inputs: &GuardInputs<'_>) -> Option<Transition> {
    let telemetry = inputs.telemetry;
    let thresholds = inputs.thresholds;
    match state {
        MissionState::Landing
            if telemetry.height_above_home() < thresholds.landed_altitude
                && telemetry.local_position.down.abs() < thresholds.landed_down =>
        {
            Some(Transition::Disarm)
        }
        _ => None,
    }
}

fn state_transition(state: MissionState, inputs: &GuardInputs<'_>) -> Option<Transition> {
    if !inputs.mission_active {
        return None;
    }
    let telemetry = inputs.telemetry;
    match state {
        MissionState::Manual => Some(Transition::Arm),
        MissionState::Arming if telemetry.armed => Some(Transition::Plan),
        MissionState::Planning => Some(Transition::Takeoff),
        MissionState::Disarming if !telemetry.armed && !telemetry.guided => {
            Some(Transition::Manual)
        }
        _ => None,
    }
}
