//! Planner grid coordinates and the offsets relating them to the local NED frame.

use serde::{Deserialize, Serialize};

/// A 2-D position in the planner's grid coordinate space (cells, north/east).
///
/// Grid planners produce integral coordinates; graph planners may place nodes
/// between cell centres.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GridPoint {
    pub north: f64,
    pub east: f64,
}

impl GridPoint {
    pub const fn new(north: f64, east: f64) -> Self {
        Self { north, east }
    }

    /// Snap to the nearest integer cell.
    pub fn rounded(&self) -> Self {
        Self {
            north: self.north.round(),
            east: self.east.round(),
        }
    }

    pub fn distance_to(&self, other: &GridPoint) -> f64 {
        let dn = self.north - other.north;
        let de = self.east - other.east;
        (dn * dn + de * de).sqrt()
    }
}

/// Ordered sequence of grid positions produced by a search.
pub type Path = Vec<GridPoint>;

/// Translation between the grid origin and the local frame origin.
///
/// `local = grid + offset`, so the grid cell of a local position is `local - offset`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FrameOffsets {
    pub north: f64,
    pub east: f64,
}

impl FrameOffsets {
    /// Grid cell holding a local (north, east) position; components are truncated toward zero first.
    pub fn local_to_grid(&self, north: f64, east: f64) -> GridPoint {
        GridPoint {
            north: north.trunc() - self.north,
            east: east.trunc() - self.east,
        }
    }

    /// Local (north, east) of a grid point.
    pub fn grid_to_local(&self, point: &GridPoint) -> (f64, f64) {
        (point.north + self.north, point.east + self.east)
    }
}
