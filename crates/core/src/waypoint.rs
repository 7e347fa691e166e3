//! Local-frame waypoints consumed by the mission supervisor.

use serde::{Deserialize, Serialize};

/// Target position `(north, east, altitude, heading)`.
///
/// Serializes as a four-element array, the shape simulators expect for the
/// waypoint overlay.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(into = "[f64; 4]", from = "[f64; 4]")]
pub struct Waypoint {
    pub north: f64,
    pub east: f64,
    pub altitude: f64,
    /// Heading in radians.
    pub heading: f64,
}

impl Waypoint {
    pub const fn new(north: f64, east: f64, altitude: f64, heading: f64) -> Self {
        Self {
            north,
            east,
            altitude,
            heading,
        }
    }
}

impl From<Waypoint> for [f64; 4] {
    fn from(w: Waypoint) -> Self {
        [w.north, w.east, w.altitude, w.heading]
    }
}

impl From<[f64; 4]> for Waypoint {
    fn from(v: [f64; 4]) -> Self {
        Waypoint::new(v[0], v[1], v[2], v[3])
    }
}
