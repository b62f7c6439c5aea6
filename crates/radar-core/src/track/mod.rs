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

//! Per-vehicle track state and trail history.
//!
//! A [`Track`] is an append-only list of [`TrackSnapshot`]s, oldest first,
//! whose last element is the current state. Distance and bearing from the
//! viewer are computed once, when a snapshot is recorded, against the viewer
//! location of that moment. Trail points are never recomputed when the
//! viewer later moves.

use chrono::{DateTime, Utc};
use log::debug;

use crate::category::EmitterCategory;
use crate::geo::{self, GeoPoint};

/// Reported fields for one vehicle in one feed cycle. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackFields {
    /// Callsign or registration, trimmed.
    pub flight: Option<String>,
    /// Geometric altitude in feet.
    pub altitude_ft: Option<i32>,
    /// Vertical rate in feet per minute (positive = climb).
    pub vertical_rate_fpm: Option<i32>,
    /// Ground speed in knots.
    pub ground_speed_kt: Option<f64>,
    /// True track over ground in degrees.
    pub heading_deg: Option<f64>,
    pub category: EmitterCategory,
    pub position: Option<GeoPoint>,
    /// Seconds since any message was received from this vehicle.
    pub seen_s: Option<f64>,
    /// Seconds since the position was last updated.
    pub seen_pos_s: Option<f64>,
    /// Recent average signal strength in dBFS (always negative).
    pub rssi_dbfs: Option<f64>,
    /// Mode A code.
    pub squawk: Option<String>,
    /// ADS-B emergency status as reported, `"none"` when there is none.
    pub emergency: Option<String>,
}

impl TrackFields {
    /// Emergency status, if one other than `"none"` was reported.
    #[must_use]
    pub fn active_emergency(&self) -> Option<&str> {
        self.emergency
            .as_deref()
            .filter(|e| !e.is_empty() && !e.eq_ignore_ascii_case("none"))
    }

    /// Flight identifier for display, `"n/a"` when absent.
    #[must_use]
    pub fn flight_label(&self) -> &str {
        self.flight.as_deref().unwrap_or("n/a")
    }
}

/// One timestamped observation of a vehicle, with its geometry from the viewer.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackSnapshot {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub fields: TrackFields,
    /// Great-circle distance from the viewer in km; `None` without a position.
    pub distance_km: Option<f64>,
    /// Bearing from the viewer in degrees `[0, 360)`; `None` without a position.
    pub bearing_deg: Option<f64>,
}

impl TrackSnapshot {
    /// Record an observation, computing geometry against `viewer`.
    #[must_use]
    pub fn observe(id: &str, timestamp: DateTime<Utc>, viewer: GeoPoint, mut fields: TrackFields) -> Self {
        if let Some(pos) = fields.position {
            if !pos.is_valid() {
                debug!("Discarding out-of-range position {pos:?} for {id}");
                fields.position = None;
            }
        }
        let (distance_km, bearing_deg) = match fields.position {
            Some(pos) => (
                Some(geo::distance_km(viewer, pos)),
                Some(geo::bearing_deg(viewer, pos)),
            ),
            None => (None, None),
        };

        Self {
            id: id.to_string(),
            timestamp,
            fields,
            distance_km,
            bearing_deg,
        }
    }

    fn trail_point(&self) -> TrailPoint {
        TrailPoint {
            position: self.fields.position,
            distance_km: self.distance_km,
            bearing_deg: self.bearing_deg,
        }
    }
}

/// A past observation of a track, in viewer-relative polar form.
///
/// Observations without a position keep their slot with no geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrailPoint {
    pub position: Option<GeoPoint>,
    pub distance_km: Option<f64>,
    pub bearing_deg: Option<f64>,
}

impl TrailPoint {
    /// Distance and bearing, when the observation had a position.
    #[must_use]
    pub fn polar(&self) -> Option<(f64, f64)> {
        Some((self.distance_km?, self.bearing_deg?))
    }
}

/// A tracked vehicle: current snapshot plus everything before it.
#[derive(Debug, Clone)]
pub struct Track {
    id: String,
    past: Vec<TrackSnapshot>,
    current: TrackSnapshot,
}

impl Track {
    /// Start a track from its first observation.
    #[must_use]
    pub fn new(id: &str, timestamp: DateTime<Utc>, viewer: GeoPoint, fields: TrackFields) -> Self {
        Self {
            id: id.to_string(),
            past: Vec::new(),
            current: TrackSnapshot::observe(id, timestamp, viewer, fields),
        }
    }

    /// Append a new observation; it becomes the current snapshot.
    pub fn update(&mut self, timestamp: DateTime<Utc>, viewer: GeoPoint, fields: TrackFields) {
        let next = TrackSnapshot::observe(&self.id, timestamp, viewer, fields);
        let previous = std::mem::replace(&mut self.current, next);
        self.past.push(previous);
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn current(&self) -> &TrackSnapshot {
        &self.current
    }

    #[must_use]
    pub fn distance_km(&self) -> Option<f64> {
        self.current.distance_km
    }

    /// Number of observations recorded, including the current one.
    #[must_use]
    pub fn update_count(&self) -> usize {
        self.past.len() + 1
    }

    /// All snapshots, oldest first, ending with the current one.
    pub fn snapshots(&self) -> impl Iterator<Item = &TrackSnapshot> {
        self.past.iter().chain(std::iter::once(&self.current))
    }

    /// Past observations, newest first, excluding the current snapshot.
    ///
    /// `depth` of `None` returns the whole history, `Some(n)` at most `n`
    /// points after filtering. With `collapse_repeats`, runs of consecutive
    /// bit-identical positions (or consecutive missing positions) are reduced
    /// to their newest entry. Each call starts a fresh pass.
    pub fn history(
        &self,
        depth: Option<usize>,
        collapse_repeats: bool,
    ) -> impl Iterator<Item = TrailPoint> + '_ {
        let mut last_kept: Option<Option<(u64, u64)>> = None;
        self.past
            .iter()
            .rev()
            .map(TrackSnapshot::trail_point)
            .filter(move |point| {
                if !collapse_repeats {
                    return true;
                }
                let key = point.position.as_ref().map(GeoPoint::bits);
                if last_kept == Some(key) {
                    false
                } else {
                    last_kept = Some(key);
                    true
                }
            })
            .take(depth.unwrap_or(usize::MAX))
    }
}
