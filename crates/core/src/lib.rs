//! Core frames, projections, and shared primitives for the motion planning workspace.

pub mod frame;
pub mod grid;
pub mod obstacle;
pub mod utm;
pub mod waypoint;

pub use frame::{GlobalPosition, LocalPosition, global_to_local, local_to_global};
pub use grid::{FrameOffsets, GridPoint, Path};
pub use obstacle::ObstacleRecord;
pub use waypoint::Waypoint;

/// WGS-84 ellipsoid constants.
pub mod constants {
    /// Semi-major axis (m).
    pub const WGS84_A: f64 = 6_378_137.0;
    /// Flattening.
    pub const WGS84_F: f64 = 1.0 / 298.257_223_563;
    /// UTM central meridian scale factor.
    pub const UTM_K0: f64 = 0.9996;
    /// UTM false easting (m).
    pub const UTM_FALSE_EASTING: f64 = 500_000.0;
    /// UTM false northing applied in the southern hemisphere (m).
    pub const UTM_FALSE_NORTHING_SOUTH: f64 = 10_000_000.0;
}

/// Minimal vector helpers to avoid ad-hoc `[f64; N]` math everywhere.
pub mod vector {
    /// Alias for a 2D horizontal vector (north, east).
    pub type Vector2 = [f64; 2];
    /// Alias for a 3D vector in the NED frame.
    pub type Vector3 = [f64; 3];

    /// Euclidean norm of the horizontal components.
    #[inline]
    pub fn norm2(v: &Vector2) -> f64 {
        (v[0] * v[0] + v[1] * v[1]).sqrt()
    }

    /// Horizontal (north/east) norm of a NED vector, ignoring the down component.
    #[inline]
    pub fn horizontal_norm(v: &Vector3) -> f64 {
        norm2(&[v[0], v[1]])
    }

    /// Horizontal distance between two NED vectors.
    #[inline]
    pub fn horizontal_distance(a: &Vector3, b: &Vector3) -> f64 {
        norm2(&[a[0] - b[0], a[1] - b[1]])
    }
}
