//! Rectangular-prism obstacles in the local frame.

use serde::{Deserialize, Serialize};

/// Axis-aligned obstacle: centre and half-extents in metres.
///
/// `altitude` is measured upward from the home plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObstacleRecord {
    pub north: f64,
    pub east: f64,
    pub altitude: f64,
    pub half_north: f64,
    pub half_east: f64,
    pub half_altitude: f64,
}

impl ObstacleRecord {
    /// Highest point of the obstacle.
    pub fn top(&self) -> f64 {
        self.altitude + self.half_altitude
    }

    /// Whether the obstacle, grown by `margin`, reaches above `altitude`.
    pub fn blocks_altitude(&self, altitude: f64, margin: f64) -> bool {
        self.top() + margin > altitude
    }

    /// Footprint bounds `(north_min, north_max, east_min, east_max)` inflated by `margin`.
    pub fn footprint(&self, margin: f64) -> (f64, f64, f64, f64) {
        (
            self.north - self.half_north - margin,
            self.north + self.half_north + margin,
            self.east - self.half_east - margin,
            self.east + self.half_east + margin,
        )
    }
}
