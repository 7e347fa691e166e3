//! Event-driven mission supervisor.
//!
//! [`Supervisor::dispatch`] applies at most one transition per telemetry event and
//! returns the vehicle commands that go with it; [`Supervisor::step`] also runs them.
//! Events must be delivered one at a time.

mod state;

use std::collections::VecDeque;

use mp_config::GuardThresholds;
use mp_core::Waypoint;
use thiserror::Error;

use crate::pipeline::{FlightPlan, MissionPlanner, PipelineError};
use crate::vehicle::{self, Vehicle, VehicleCommand, VehicleError, VehicleTelemetry};

pub use state::{GuardInputs, MissionState, TelemetryEvent, Transition, transition};

/// Errors returned while supervising a mission.
#[derive(Debug, Error)]
pub enum SupervisorError {
    #[error("mission planning failed: {0}")]
    Planning(#[from] PipelineError),
    #[error(transparent)]
    Vehicle(#[from] VehicleError),
}

/// Category of a mission failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The obstacle map or planning inputs were malformed.
    Configuration,
    /// The goal cannot be reached from the vehicle position.
    Unreachable,
    /// The planner could not build or query its navigable space.
    Planner,
}

/// A recorded failure; once set the supervisor ignores further events.
#[derive(Debug, Clone, PartialEq)]
pub struct MissionFailure {
    /// State the supervisor was in when the failure occurred.
    pub state: MissionState,
    pub kind: FailureKind,
    pub message: String,
}

impl MissionFailure {
    fn from_pipeline(state: MissionState, err: &PipelineError) -> Self {
        let kind = match err {
            PipelineError::Unreachable(_) => FailureKind::Unreachable,
            _ if err.is_configuration() => FailureKind::Configuration,
            _ => FailureKind::Planner,
        };
        Self {
            state,
            kind,
            message: err.to_string(),
        }
    }
}

/// Owner of the mission state, target position and waypoint queue.
#[derive(Debug, Clone)]
pub struct Supervisor {
    state: MissionState,
    target: Waypoint,
    waypoints: Option<VecDeque<Waypoint>>,
    mission_active: bool,
    thresholds: GuardThresholds,
    failure: Option<MissionFailure>,
}

impl Default for Supervisor {
    fn default() -> Self {
        Self::new(GuardThresholds::default())
    }
}

impl Supervisor {
    pub fn new(thresholds: GuardThresholds) -> Self {
        Self {
            state: MissionState::Manual,
            target: Waypoint::default(),
            waypoints: None,
            mission_active: true,
            thresholds,
            failure: None,
        }
    }

    pub fn state(&self) -> MissionState {
        self.state
    }

    pub fn target(&self) -> Waypoint {
        self.target
    }

    /// Waypoints still queued, or `None` when no plan has been stored.
    pub fn remaining_waypoints(&self) -> Option<&VecDeque<Waypoint>> {
        self.waypoints.as_ref()
    }

    pub fn is_mission_active(&self) -> bool {
        self.mission_active
    }

    pub fn failure(&self) -> Option<&MissionFailure> {
        self.failure.as_ref()
    }

    pub fn thresholds(&self) -> &GuardThresholds {
        &self.thresholds
    }

    /// The mission has run to completion and will not restart.
    pub fn is_finished(&self) -> bool {
        self.state == MissionState::Manual && !self.mission_active
    }

    /// Evaluate one event and apply at most one transition.
    ///
    /// Returns the commands the transition issues, in order. A planning failure
    /// leaves the state unchanged, records a [`MissionFailure`] and is returned as
    /// an error; afterwards every event is ignored.
    pub fn dispatch(
        &mut self,
        event: TelemetryEvent,
        telemetry: &VehicleTelemetry,
        planner: &mut dyn MissionPlanner,
    ) -> Result<Vec<VehicleCommand>, SupervisorError> {
        if self.failure.is_some() {
            return Ok(Vec::new());
        }

        let inputs = GuardInputs {
            telemetry,
            mission_active: self.mission_active,
            target: &self.target,
            queued_waypoints: self.waypoints.as_ref().map_or(0, VecDeque::len),
            thresholds: &self.thresholds,
        };
        let Some(step) = transition(self.state, event, &inputs) else {
            return Ok(Vec::new());
        };

        let commands = match step {
            Transition::Arm => {
                log::info!("arming transition");
                vec![VehicleCommand::Arm, VehicleCommand::TakeControl]
            }
            Transition::Plan => {
                log::info!("searching for a path ...");
                match planner.plan(telemetry) {
                    Ok(plan) => self.store_plan(plan),
                    Err(err) => {
                        let failure = MissionFailure::from_pipeline(self.state, &err);
                        log::error!(
                            "mission failed in {} ({:?}): {}",
                            failure.state,
                            failure.kind,
                            failure.message
                        );
                        self.failure = Some(failure);
                        return Err(SupervisorError::Planning(err));
                    }
                }
            }
            Transition::Takeoff => {
                log::info!("takeoff transition");
                vec![VehicleCommand::Takeoff {
                    altitude: self.target.altitude,
                }]
            }
            Transition::AdvanceWaypoint => match self.advance_waypoint() {
                Some(command) => vec![command],
                None => return Ok(Vec::new()),
            },
            Transition::Land => {
                log::info!("landing transition");
                vec![VehicleCommand::Land]
            }
            Transition::Disarm => {
                log::info!("disarm transition");
                vec![VehicleCommand::Disarm, VehicleCommand::ReleaseControl]
            }
            Transition::Manual => {
                log::info!("manual transition");
                self.mission_active = false;
                vec![VehicleCommand::Stop]
            }
        };

        let next = step.target_state();
        log::debug!("{} -> {} on {:?}", self.state, next, event);
        self.state = next;
        Ok(commands)
    }

    /// [`dispatch`](Self::dispatch) the event, then execute the resulting commands on `vehicle`.
    pub fn step<V: Vehicle + ?Sized>(
        &mut self,
        event: TelemetryEvent,
        telemetry: &VehicleTelemetry,
        planner: &mut dyn MissionPlanner,
        vehicle: &mut V,
    ) -> Result<MissionState, SupervisorError> {
        let commands = self.dispatch(event, telemetry, planner)?;
        vehicle::execute(vehicle, &commands)?;
        Ok(self.state)
    }

    fn store_plan(&mut self, plan: FlightPlan) -> Vec<VehicleCommand> {
        self.target.altitude = plan.target_altitude;
        log::info!("stored {} waypoints", plan.waypoints.len());

        let mut commands = vec![VehicleCommand::SetHomePosition(plan.home)];
        match mp_export::waypoints::encode(&plan.waypoints) {
            Ok(payload) => commands.push(VehicleCommand::SendWaypoints(payload)),
            Err(err) => log::warn!("waypoint overlay not serialized: {err}"),
        }
        self.waypoints = Some(plan.waypoints.into());
        commands
    }

    fn advance_waypoint(&mut self) -> Option<VehicleCommand> {
        let next = self.waypoints.as_mut()?.pop_front()?;
        self.target = next;
        log::info!("target position {:?}", <[f64; 4]>::from(next));
        Some(VehicleCommand::CmdPosition(next))
    }
}
