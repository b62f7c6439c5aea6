// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Geodesy helpers: great-circle distance and rhumb-line bearing.
//!
//! Both functions are total. They never panic and never return NaN for
//! finite inputs, so callers can feed them whatever the receiver reports.

use std::f64::consts::{FRAC_PI_4, PI, TAU};

use serde::{Deserialize, Serialize};

/// Mean Earth radius (IUGG) in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0088;

// Mercator y diverges at the poles
const MAX_MERCATOR_LATITUDE_DEG: f64 = 89.999_999;

/// A geographic position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    #[must_use]
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// True when both coordinates are finite and within their nominal ranges.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }

    /// Bit pattern of both coordinates, used to detect stationary targets.
    #[must_use]
    pub fn bits(&self) -> (u64, u64) {
        (self.lat.to_bits(), self.lon.to_bits())
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let ns = if self.lat < 0.0 { 'S' } else { 'N' };
        let ew = if self.lon < 0.0 { 'W' } else { 'E' };
        write!(f, "{:.6}{} {:.6}{}", self.lat.abs(), ns, self.lon.abs(), ew)
    }
}

/// Great-circle distance between two points in kilometres (haversine).
///
/// Symmetric in its arguments and zero for identical points.
#[must_use]
pub fn distance_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat1_rad = a.lat.to_radians();
    let lat2_rad = b.lat.to_radians();
    let delta_lat = (b.lat - a.lat).to_radians();
    let delta_lon = (b.lon - a.lon).to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * h.clamp(0.0, 1.0).sqrt().asin();

    EARTH_RADIUS_KM * c
}

/// True bearing from `a` to `b` in degrees, `[0, 360)`, along the rhumb line.
///
/// The longitude difference takes the short way across the antimeridian.
/// Identical points have no direction and yield `0.0`.
#[must_use]
pub fn bearing_deg(a: GeoPoint, b: GeoPoint) -> f64 {
    let mut delta_lon = (b.lon - a.lon).to_radians();
    if delta_lon > PI {
        delta_lon -= TAU;
    } else if delta_lon < -PI {
        delta_lon += TAU;
    }
    let delta_psi = mercator_y(b.lat) - mercator_y(a.lat);

    if delta_lon == 0.0 && delta_psi == 0.0 {
        return 0.0;
    }

    normalize_deg(delta_lon.atan2(delta_psi).to_degrees())
}

fn mercator_y(lat_deg: f64) -> f64 {
    let lat = lat_deg
        .clamp(-MAX_MERCATOR_LATITUDE_DEG, MAX_MERCATOR_LATITUDE_DEG)
        .to_radians();
    (lat / 2.0 + FRAC_PI_4).tan().ln()
}

/// Fold an angle in degrees into `[0, 360)`.
#[must_use]
pub fn normalize_deg(deg: f64) -> f64 {
    let d = deg.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if d >= 360.0 {
        0.0
    } else {
        d
    }
}
