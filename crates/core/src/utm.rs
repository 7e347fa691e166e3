//! Universal Transverse Mercator projection on the WGS-84 ellipsoid.
//!
//! Forward and inverse mappings use the Krüger series in the third flattening `n`,
//! carried to fourth order. Within a zone the two directions agree to well below a
//! millimetre, which is what the local-frame round trip relies on.

use crate::constants::{
    UTM_FALSE_EASTING, UTM_FALSE_NORTHING_SOUTH, UTM_K0, WGS84_A, WGS84_F,
};

/// A UTM zone: longitude band number (1–60) and hemisphere.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UtmZone {
    pub number: u8,
    pub northern: bool,
}

impl UtmZone {
    /// Zone containing the given point, honouring the Norway and Svalbard exceptions.
    pub fn for_position(latitude: f64, longitude: f64) -> Self {
        Self {
            number: zone_number(latitude, longitude),
            northern: latitude >= 0.0,
        }
    }

    /// Longitude of the zone's central meridian in degrees.
    pub fn central_meridian(&self) -> f64 {
        f64::from(self.number - 1) * 6.0 - 180.0 + 3.0
    }

    fn false_northing(&self) -> f64 {
        if self.northern {
            0.0
        } else {
            UTM_FALSE_NORTHING_SOUTH
        }
    }
}

fn zone_number(latitude: f64, longitude: f64) -> u8 {
    if (56.0..64.0).contains(&latitude) && (3.0..12.0).contains(&longitude) {
        return 32;
    }

    if (72.0..=84.0).contains(&latitude) && longitude >= 0.0 {
        if longitude < 9.0 {
            return 31;
        } else if longitude < 21.0 {
            return 33;
        } else if longitude < 33.0 {
            return 35;
        } else if longitude < 42.0 {
            return 37;
        }
    }

    let band = ((longitude + 180.0) / 6.0).floor() as i64 + 1;
    band.clamp(1, 60) as u8
}

struct Series {
    rectifying_radius: f64,
    eccentricity: f64,
    alpha: [f64; 4],
    beta: [f64; 4],
    delta: [f64; 4],
}

fn series() -> Series {
    let n = WGS84_F / (2.0 - WGS84_F);
    let n2 = n * n;
    let n3 = n2 * n;
    let n4 = n3 * n;

    Series {
        rectifying_radius: WGS84_A / (1.0 + n) * (1.0 + n2 / 4.0 + n4 / 64.0),
        eccentricity: 2.0 * n.sqrt() / (1.0 + n),
        alpha: [
            n / 2.0 - 2.0 * n2 / 3.0 + 5.0 * n3 / 16.0 + 41.0 * n4 / 180.0,
            13.0 * n2 / 48.0 - 3.0 * n3 / 5.0 + 557.0 * n4 / 1440.0,
            61.0 * n3 / 240.0 - 103.0 * n4 / 140.0,
            49_561.0 * n4 / 161_280.0,
        ],
        beta: [
            n / 2.0 - 2.0 * n2 / 3.0 + 37.0 * n3 / 96.0 - n4 / 360.0,
            n2 / 48.0 + n3 / 15.0 - 437.0 * n4 / 1440.0,
            17.0 * n3 / 480.0 - 37.0 * n4 / 840.0,
            4397.0 * n4 / 161_280.0,
        ],
        delta: [
            2.0 * n - 2.0 * n2 / 3.0 - 2.0 * n3 + 116.0 * n4 / 45.0,
            7.0 * n2 / 3.0 - 8.0 * n3 / 5.0 - 227.0 * n4 / 45.0,
            56.0 * n3 / 15.0 - 136.0 * n4 / 35.0,
            4279.0 * n4 / 630.0,
        ],
    }
}

/// Project latitude/longitude (degrees) into `zone`, returning `(easting, northing)` in metres.
pub fn project(latitude: f64, longitude: f64, zone: UtmZone) -> (f64, f64) {
    let s = series();
    let phi = latitude.to_radians();
    let dlambda = (longitude - zone.central_meridian()).to_radians();

    let sin_phi = phi.sin();
    let t = (sin_phi.atanh() - s.eccentricity * (s.eccentricity * sin_phi).atanh()).sinh();
    let xi_p = t.atan2(dlambda.cos());
    let eta_p = (dlambda.sin() / (1.0 + t * t).sqrt()).atanh();

    let mut xi = xi_p;
    let mut eta = eta_p;
    for (j, alpha) in s.alpha.iter().enumerate() {
        let k = 2.0 * (j as f64 + 1.0);
        xi += alpha * (k * xi_p).sin() * (k * eta_p).cosh();
        eta += alpha * (k * xi_p).cos() * (k * eta_p).sinh();
    }

    let scale = UTM_K0 * s.rectifying_radius;
    let easting = UTM_FALSE_EASTING + scale * eta;
    let northing = zone.false_northing() + scale * xi;
    (easting, northing)
}

/// Inverse projection of `(easting, northing)` in `zone`, returning `(latitude, longitude)` in degrees.
pub fn unproject(easting: f64, northing: f64, zone: UtmZone) -> (f64, f64) {
    let s = series();
    let scale = UTM_K0 * s.rectifying_radius;
    let xi = (northing - zone.false_northing()) / scale;
    let eta = (easting - UTM_FALSE_EASTING) / scale;

    let mut xi_p = xi;
    let mut eta_p = eta;
    for (j, beta) in s.beta.iter().enumerate() {
        let k = 2.0 * (j as f64 + 1.0);
        xi_p -= beta * (k * xi).sin() * (k * eta).cosh();
        eta_p -= beta * (k * xi).cos() * (k * eta).sinh();
    }

    let chi = (xi_p.sin() / eta_p.cosh()).asin();
    let mut phi = chi;
    for (j, delta) in s.delta.iter().enumerate() {
        let k = 2.0 * (j as f64 + 1.0);
        phi += delta * (k * chi).sin();
    }

    let dlambda = eta_p.sinh().atan2(xi_p.cos());
    (phi.to_degrees(), zone.central_meridian() + dlambda.to_degrees())
}
