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

//! Polar (distance, bearing) to radar-disc pixel mapping.
//!
//! Pixel coordinates are relative to the top-left of the square that holds
//! the radar disc, with y growing downwards. Bearing 0 points up and bearings
//! increase clockwise.

use crate::range::RangeRing;

/// Minimum length of a heading vector in pixels.
const HEADING_VECTOR_BASE_PX: f64 = 5.0;
/// Extra heading vector length per knot of ground speed.
const HEADING_VECTOR_PX_PER_KNOT: f64 = 0.1;

/// A position on the radar surface, in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelPoint {
    pub x: f64,
    pub y: f64,
}

impl PixelPoint {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn distance_to(&self, other: PixelPoint) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Map a polar position to pixels on a disc of `diameter_px`.
///
/// `max_distance_km` lands on the rim. The mapping does not clip: callers
/// must reject tracks beyond `max_distance_km` before placing them.
#[must_use]
pub fn to_pixel(distance_km: f64, bearing_deg: f64, max_distance_km: f64, diameter_px: f64) -> (f64, f64) {
    let center = diameter_px / 2.0;
    let r = if max_distance_km > 0.0 {
        distance_km / max_distance_km * center
    } else {
        0.0
    };
    if r == 0.0 {
        return (center, center);
    }
    let theta = bearing_deg.to_radians();
    (r * theta.sin() + center, -(r * theta.cos()) + center)
}

/// Coordinate transform bound to one viewport size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateTransform {
    diameter_px: f64,
}

impl CoordinateTransform {
    #[must_use]
    pub fn new(diameter_px: f64) -> Self {
        Self {
            diameter_px: diameter_px.max(1.0),
        }
    }

    #[must_use]
    pub fn diameter(&self) -> f64 {
        self.diameter_px
    }

    #[must_use]
    pub fn radius(&self) -> f64 {
        self.diameter_px / 2.0
    }

    #[must_use]
    pub fn center(&self) -> PixelPoint {
        PixelPoint::new(self.radius(), self.radius())
    }

    /// True if a track at `distance_km` is inside the current range.
    #[must_use]
    pub fn in_range(distance_km: f64, max_distance_km: f64) -> bool {
        distance_km.is_finite() && distance_km <= max_distance_km
    }

    /// Pixel position for a polar pair. See [`to_pixel`].
    #[must_use]
    pub fn place(&self, distance_km: f64, bearing_deg: f64, max_distance_km: f64) -> PixelPoint {
        let (x, y) = to_pixel(distance_km, bearing_deg, max_distance_km, self.diameter_px);
        PixelPoint::new(x, y)
    }

    /// Like [`place`](Self::place), but `None` when out of range.
    #[must_use]
    pub fn place_in_range(&self, distance_km: f64, bearing_deg: f64, max_distance_km: f64) -> Option<PixelPoint> {
        Self::in_range(distance_km, max_distance_km).then(|| self.place(distance_km, bearing_deg, max_distance_km))
    }

    #[must_use]
    pub fn ring_radius_px(&self, ring: &RangeRing) -> f64 {
        self.radius() * ring.radius_fraction()
    }

    /// True if `point` lies on the radar disc.
    #[must_use]
    pub fn contains(&self, point: PixelPoint) -> bool {
        point.distance_to(self.center()) <= self.radius()
    }

    /// End point of the heading vector drawn from a track symbol.
    ///
    /// The vector grows with ground speed; unknown speed gets the minimum
    /// length.
    #[must_use]
    pub fn heading_vector(from: PixelPoint, heading_deg: f64, ground_speed_kt: Option<f64>) -> PixelPoint {
        let length = HEADING_VECTOR_BASE_PX + ground_speed_kt.unwrap_or(0.0).max(0.0) * HEADING_VECTOR_PX_PER_KNOT;
        let theta = heading_deg.to_radians();
        PixelPoint::new(from.x + length * theta.sin(), from.y - length * theta.cos())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_distance_is_center_for_any_bearing() {
        for bearing in [0.0, 45.0, 90.0, 180.0, 270.0, 359.999] {
            assert_eq!(to_pixel(0.0, bearing, 64.0, 480.0), (240.0, 240.0));
        }
    }

    #[test]
    fn test_max_distance_lands_on_rim() {
        let (x, y) = to_pixel(64.0, 0.0, 64.0, 480.0);
        assert!((x - 240.0).abs() < 1e-9);
        assert!(y.abs() < 1e-9);

        let (x, y) = to_pixel(64.0, 90.0, 64.0, 480.0);
        assert!((x - 480.0).abs() < 1e-9);
        assert!((y - 240.0).abs() < 1e-9);

        let (x, y) = to_pixel(32.0, 180.0, 64.0, 480.0);
        assert!((x - 240.0).abs() < 1e-9);
        assert!((y - 360.0).abs() < 1e-9);
    }

    #[test]
    fn test_to_pixel_is_pure() {
        let a = to_pixel(12.345, 211.7, 16.0, 480.0);
        let b = to_pixel(12.345, 211.7, 16.0, 480.0);
        assert_eq!(a.0.to_bits(), b.0.to_bits());
        assert_eq!(a.1.to_bits(), b.1.to_bits());
    }

    #[test]
    fn test_transform_does_not_clip() {
        let transform = CoordinateTransform::new(480.0);
        let p = transform.place(128.0, 90.0, 64.0);
        assert!((p.x - 720.0).abs() < 1e-9);
        assert!(transform.place_in_range(128.0, 90.0, 64.0).is_none());
        assert!(transform.place_in_range(64.0, 90.0, 64.0).is_some());
    }

    #[test]
    fn test_contains() {
        let transform = CoordinateTransform::new(480.0);
        assert!(transform.contains(PixelPoint::new(240.0, 240.0)));
        assert!(transform.contains(PixelPoint::new(240.0, 0.0)));
        assert!(!transform.contains(PixelPoint::new(5.0, 5.0)));
        assert!(!transform.contains(PixelPoint::new(240.0, 500.0)));
    }

    #[test]
    fn test_heading_vector_length() {
        let from = PixelPoint::new(100.0, 100.0);
        let east = CoordinateTransform::heading_vector(from, 90.0, Some(450.0));
        assert!((east.x - 150.0).abs() < 1e-9);
        assert!((east.y - 100.0).abs() < 1e-9);

        let north = CoordinateTransform::heading_vector(from, 0.0, None);
        assert!((north.y - 95.0).abs() < 1e-9);
    }
}
