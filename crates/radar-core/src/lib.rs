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

//! Radar display engine for a handheld ADS-B receiver.
//!
//! Turns per-cycle aircraft reports into everything a radar-style display
//! needs: viewer-relative geometry, per-vehicle trails, a power-of-two range
//! with rings, pixel placement, interactive display state and session
//! statistics. Drawing itself is left to the front end.
//!
//! - **Geometry**: [`geo`] great-circle distance and rhumb-line bearing
//! - **Tracks**: [`track`] per-vehicle history, [`registry`] reconciliation
//! - **Display**: [`range`], [`transform`], [`display`], [`stats`]
//! - **Feed**: [`protocol`] dump1090 JSON documents
//! - **Engine**: [`engine`] composition, per-frame locking and intents
//!
//! # Quick Start
//!
//! ```
//! use std::collections::HashMap;
//!
//! use chrono::Utc;
//! use radar_core::{
//!     DisplayIntent, FeedCycle, GeoPoint, Orientation, Radar, RadarHandle, TrackFields, ViewerState,
//! };
//!
//! let handle = RadarHandle::new(Radar::default());
//!
//! let mut aircraft = HashMap::new();
//! aircraft.insert(
//!     "a1b2c3".to_string(),
//!     TrackFields {
//!         flight: Some("UAL123".to_string()),
//!         position: Some(GeoPoint::new(37.70, -122.30)),
//!         ..Default::default()
//!     },
//! );
//! let now = Utc::now();
//! handle.ingest(FeedCycle {
//!     timestamp: now,
//!     viewer: ViewerState {
//!         position: GeoPoint::new(37.60, -122.35),
//!         orientation: Orientation::default(),
//!         observed_at: now,
//!     },
//!     aircraft,
//! });
//!
//! handle.send(DisplayIntent::TrailsMore);
//! let frame = handle.render_frame(480.0).unwrap();
//! assert_eq!(frame.range.max_distance_km, 16);
//! println!("{} tracks in range", frame.in_range_count());
//! ```

pub mod category;
pub mod display;
pub mod engine;
pub mod error;
pub mod geo;
pub mod protocol;
pub mod range;
pub mod registry;
pub mod stats;
pub mod track;
pub mod transform;

pub use category::{CategorySet, EmitterCategory};
pub use display::{ControlHighlights, DisplayIntent, DisplayState, PanelMode, TrailSetting};
pub use engine::{
    FeedCycle, Frame, IntentSender, Orientation, PlacedTrack, Radar, RadarConfig, RadarHandle, RingView,
    ViewerState,
};
pub use error::RadarError;
pub use geo::GeoPoint;
pub use protocol::{AircraftJsonParser, FeedSnapshot, ParseError, Protocol, ReceiverInfo};
pub use range::{AutoRangeTarget, RangeController, RangeMode, RangeRing, RangeState};
pub use registry::{ReconcileReport, TrackRegistry};
pub use stats::{MetricStats, RunningStats};
pub use track::{Track, TrackFields, TrackSnapshot, TrailPoint};
pub use transform::{CoordinateTransform, PixelPoint};
