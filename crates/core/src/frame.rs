//! Geodetic and local NED frames, and conversions between them anchored at a home point.

use serde::{Deserialize, Serialize};

use crate::utm::{self, UtmZone};

/// Geodetic position: longitude/latitude in degrees, altitude in metres (positive up).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GlobalPosition {
    pub longitude: f64,
    pub latitude: f64,
    pub altitude: f64,
}

impl GlobalPosition {
    pub const fn new(longitude: f64, latitude: f64, altitude: f64) -> Self {
        Self {
            longitude,
            latitude,
            altitude,
        }
    }

    /// True when latitude/longitude lie in the range UTM can represent.
    pub fn is_valid(&self) -> bool {
        self.longitude.is_finite()
            && self.latitude.is_finite()
            && self.altitude.is_finite()
            && (-180.0..=180.0).contains(&self.longitude)
            && (-80.0..=84.0).contains(&self.latitude)
    }
}

/// Local Cartesian position in metres, north-east-down, relative to a home point.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LocalPosition {
    pub north: f64,
    pub east: f64,
    pub down: f64,
}

impl LocalPosition {
    pub const fn new(north: f64, east: f64, down: f64) -> Self {
        Self { north, east, down }
    }

    /// Altitude above home (the negated down component).
    pub fn altitude(&self) -> f64 {
        -self.down
    }

    pub fn as_array(&self) -> [f64; 3] {
        [self.north, self.east, self.down]
    }
}

/// Convert a geodetic position to NED coordinates relative to `home`.
///
/// Both points are projected into the home's UTM zone so that positions near a
/// zone boundary stay continuous with the home frame.
pub fn global_to_local(global: &GlobalPosition, home: &GlobalPosition) -> LocalPosition {
    let zone = UtmZone::for_position(home.latitude, home.longitude);
    let (home_easting, home_northing) = utm::project(home.latitude, home.longitude, zone);
    let (easting, northing) = utm::project(global.latitude, global.longitude, zone);

    LocalPosition {
        north: northing - home_northing,
        east: easting - home_easting,
        down: -(global.altitude - home.altitude),
    }
}

/// Convert NED coordinates relative to `home` back to a geodetic position.
pub fn local_to_global(local: &LocalPosition, home: &GlobalPosition) -> GlobalPosition {
    let zone = UtmZone::for_position(home.latitude, home.longitude);
    let (home_easting, home_northing) = utm::project(home.latitude, home.longitude, zone);
    let (latitude, longitude) =
        utm::unproject(home_easting + local.east, home_northing + local.north, zone);

    GlobalPosition {
        longitude,
        latitude,
        altitude: home.altitude - local.down,
    }
}
