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

//! The radar engine.
//!
//! [`Radar`] composes the track registry, range controller, display state
//! and statistics. It is driven from two sides: the feed loop hands it one
//! [`FeedCycle`] at a time, and the front end applies [`DisplayIntent`]s and
//! asks for a [`Frame`]. [`RadarHandle`] wraps it for sharing between threads
//! with a single lock held for each frame.

mod frame;
mod handle;

pub use frame::{Frame, PlacedTrack, RingView};
pub use handle::{IntentSender, RadarHandle};

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::display::{ControlHighlights, DisplayIntent, DisplayState, PanelMode, TrailSetting};
use crate::geo::GeoPoint;
use crate::range::{AutoRangeTarget, RangeController, RangeMode, DEFAULT_MAX_DISTANCE_KM, DEFAULT_RING_DIVISORS};
use crate::registry::{ReconcileReport, TrackRegistry};
use crate::stats::RunningStats;
use crate::track::{Track, TrackFields};
use crate::transform::{CoordinateTransform, PixelPoint};

/// A click must land closer than this to a track symbol to select it.
pub const HIT_RADIUS_PX: f64 = 10.0;

/// Default radar disc diameter in pixels.
pub const DEFAULT_DIAMETER_PX: f64 = 480.0;

/// Viewer attitude. Used for display rotation only, never for geometry.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Orientation {
    pub heading_deg: f64,
    pub roll_deg: Option<f64>,
    pub pitch_deg: Option<f64>,
}

/// Where the viewer was, and how they held the display, for one cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewerState {
    pub position: GeoPoint,
    pub orientation: Orientation,
    pub observed_at: DateTime<Utc>,
}

/// One already-resolved feed cycle.
#[derive(Debug, Clone)]
pub struct FeedCycle {
    pub timestamp: DateTime<Utc>,
    pub viewer: ViewerState,
    pub aircraft: HashMap<String, TrackFields>,
}

/// Start-up settings for [`Radar`].
#[derive(Debug, Clone, PartialEq)]
pub struct RadarConfig {
    pub diameter_px: f64,
    pub initial_max_distance_km: f64,
    pub ring_divisors: Vec<f64>,
    pub auto_range_target: AutoRangeTarget,
    pub panel: PanelMode,
    pub collapse_trails: bool,
}

impl Default for RadarConfig {
    fn default() -> Self {
        Self {
            diameter_px: DEFAULT_DIAMETER_PX,
            initial_max_distance_km: DEFAULT_MAX_DISTANCE_KM,
            ring_divisors: DEFAULT_RING_DIVISORS.to_vec(),
            auto_range_target: AutoRangeTarget::default(),
            panel: PanelMode::default(),
            collapse_trails: true,
        }
    }
}

#[derive(Debug)]
pub struct Radar {
    registry: TrackRegistry,
    range: RangeController,
    display: DisplayState,
    stats: RunningStats,
    transform: CoordinateTransform,
    collapse_trails: bool,
    viewer: Option<ViewerState>,
    feed_timestamp: Option<DateTime<Utc>>,
    /// Pixel positions from the last frame, in render order.
    placements: Vec<(String, PixelPoint)>,
    highlights: ControlHighlights,
    quit_requested: bool,
}

impl Default for Radar {
    fn default() -> Self {
        Self::new(RadarConfig::default())
    }
}

impl Radar {
    #[must_use]
    pub fn new(config: RadarConfig) -> Self {
        let mut range = RangeController::new(config.initial_max_distance_km, config.ring_divisors);
        range.set_target(config.auto_range_target);
        let display = DisplayState::new().with_panel(config.panel);
        let highlights = ControlHighlights::derive(&display, range.state());

        Self {
            registry: TrackRegistry::new(),
            range,
            display,
            stats: RunningStats::new(),
            transform: CoordinateTransform::new(config.diameter_px),
            collapse_trails: config.collapse_trails,
            viewer: None,
            feed_timestamp: None,
            placements: Vec::new(),
            highlights,
            quit_requested: false,
        }
    }

    /// Reconcile the registry with one feed cycle and fold it into the stats.
    pub fn ingest(&mut self, cycle: FeedCycle) -> ReconcileReport {
        let report = self
            .registry
            .reconcile(cycle.timestamp, cycle.viewer.position, cycle.aircraft);

        // Fixed order keeps the exponential averages reproducible
        for track in self.registry.by_distance() {
            self.stats.update(track);
        }

        self.placements.retain(|(id, _)| self.registry.contains(id));
        self.viewer = Some(cycle.viewer);
        self.feed_timestamp = Some(cycle.timestamp);
        report
    }

    /// Apply one input intent. Returns true if any state changed.
    pub fn apply(&mut self, intent: DisplayIntent) -> bool {
        debug!("Applying {intent:?}");
        let range_changed = match intent {
            DisplayIntent::RangeAuto => self.range.set_mode(RangeMode::Auto),
            DisplayIntent::RangeManual => self.range.set_mode(RangeMode::Manual),
            DisplayIntent::RangeUp => self.range.range_up(),
            DisplayIntent::RangeDown => self.range.range_down(),
            DisplayIntent::SetRange(km) => {
                let before = self.range.state().clone();
                self.range.set_range(km).is_ok() && before != *self.range.state()
            }
            DisplayIntent::TargetNearest => self.range.set_target(AutoRangeTarget::Nearest),
            DisplayIntent::TargetFarthest => self.range.set_target(AutoRangeTarget::Farthest),
            other => return self.apply_local(other),
        };
        if range_changed {
            self.display.mark_dirty();
        }
        range_changed
    }

    fn apply_local(&mut self, intent: DisplayIntent) -> bool {
        match intent {
            DisplayIntent::TrailsAll => self.display.set_trail(TrailSetting::All),
            DisplayIntent::TrailsNone => self.display.set_trail(TrailSetting::Off),
            DisplayIntent::TrailsMore => self.display.trails_more(),
            DisplayIntent::TrailsFewer => self.display.trails_fewer(),
            DisplayIntent::Panel(panel) => self.display.set_panel(panel),
            DisplayIntent::SelectAt(point) => self.select_at(point),
            DisplayIntent::ClearSelection => self.display.select(None),
            DisplayIntent::LogStats => {
                for line in self.stats.report() {
                    info!("{line}");
                }
                false
            }
            DisplayIntent::ResetStats => {
                self.stats.reset();
                info!("Statistics reset");
                true
            }
            DisplayIntent::Quit => {
                info!("Quit requested");
                let changed = !self.quit_requested;
                self.quit_requested = true;
                changed
            }
            // Range intents are handled by `apply`
            _ => false,
        }
    }

    /// Pointer press on the radar surface.
    ///
    /// Outside the disc the click is ignored. Inside, it selects the nearest
    /// track symbol within [`HIT_RADIUS_PX`], or clears the selection.
    pub fn select_at(&mut self, point: PixelPoint) -> bool {
        if !self.transform.contains(point) {
            debug!("Ignoring click outside radar at ({:.0}, {:.0})", point.x, point.y);
            return false;
        }
        let hit = self.hit_test(point).map(str::to_string);
        self.display.select(hit)
    }

    /// Id of the track symbol nearest to `point` in the last frame.
    ///
    /// Equal pixel distances go to the track nearer the viewer, then the
    /// lower id.
    #[must_use]
    pub fn hit_test(&self, point: PixelPoint) -> Option<&str> {
        let mut best: Option<(&str, f64)> = None;
        for (id, pixel) in &self.placements {
            let d = pixel.distance_to(point);
            if d < HIT_RADIUS_PX && best.is_none_or(|(_, nearest)| d < nearest) {
                best = Some((id, d));
            }
        }
        best.map(|(id, _)| id)
    }

    /// Resize the radar disc. Returns true if the size changed.
    pub fn set_viewport(&mut self, diameter_px: f64) -> bool {
        let transform = CoordinateTransform::new(diameter_px);
        if transform == self.transform {
            return false;
        }
        self.transform = transform;
        true
    }

    /// Run auto-range and lay out everything visible.
    pub fn frame(&mut self) -> Frame {
        let distances: Vec<f64> = self.registry.iter().filter_map(Track::distance_km).collect();
        self.range.auto_update(distances);

        let max = f64::from(self.range.max_distance_km());
        let depth = self.display.trail().depth();
        let transform = self.transform;

        let mut placed = Vec::new();
        let mut out_of_range = Vec::new();
        for track in self.registry.by_distance() {
            let snapshot = track.current();
            let pixel = match (snapshot.distance_km, snapshot.bearing_deg) {
                (Some(distance), Some(bearing)) => transform.place_in_range(distance, bearing, max),
                _ => None,
            };
            let Some(pixel) = pixel else {
                out_of_range.push(track.id().to_string());
                continue;
            };
            let trail = track
                .history(depth, self.collapse_trails)
                .filter_map(|p| p.polar())
                .filter_map(|(distance, bearing)| transform.place_in_range(distance, bearing, max))
                .collect();
            placed.push(PlacedTrack {
                id: track.id().to_string(),
                pixel,
                snapshot: snapshot.clone(),
                trail,
            });
        }
        self.placements = placed.iter().map(|t| (t.id.clone(), t.pixel)).collect();

        let highlights_changed = self.display.take_dirty();
        if highlights_changed {
            self.highlights = ControlHighlights::derive(&self.display, self.range.state());
        }

        let rings = self
            .range
            .rings()
            .iter()
            .map(|ring| RingView {
                radius_px: transform.ring_radius_px(ring),
                ring: ring.clone(),
            })
            .collect();

        Frame {
            diameter_px: transform.diameter(),
            placed,
            out_of_range,
            range: self.range.state().clone(),
            rings,
            display: self.display.clone(),
            highlights: self.highlights,
            highlights_changed,
            selected: self
                .display
                .resolve_selection(&self.registry)
                .map(|track| track.current().clone()),
            stats: self.stats.clone(),
            viewer: self.viewer,
            feed_timestamp: self.feed_timestamp,
            track_count: self.registry.len(),
        }
    }

    #[must_use]
    pub fn registry(&self) -> &TrackRegistry {
        &self.registry
    }

    #[must_use]
    pub fn range(&self) -> &RangeController {
        &self.range
    }

    #[must_use]
    pub fn display(&self) -> &DisplayState {
        &self.display
    }

    #[must_use]
    pub fn stats(&self) -> &RunningStats {
        &self.stats
    }

    #[must_use]
    pub fn viewer(&self) -> Option<&ViewerState> {
        self.viewer.as_ref()
    }

    #[must_use]
    pub fn is_quit_requested(&self) -> bool {
        self.quit_requested
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    fn cycle(secs: i64, entries: &[(&str, f64, f64, Option<i32>)]) -> FeedCycle {
        FeedCycle {
            timestamp: ts(secs),
            viewer: ViewerState {
                position: GeoPoint::new(0.0, 0.0),
                orientation: Orientation::default(),
                observed_at: ts(secs),
            },
            aircraft: entries
                .iter()
                .map(|(id, lat, lon, alt)| {
                    let fields = TrackFields {
                        position: Some(GeoPoint::new(*lat, *lon)),
                        altitude_ft: *alt,
                        ..Default::default()
                    };
                    ((*id).to_string(), fields)
                })
                .collect(),
        }
    }

    // A is ~11 km east, B is ~22 km north of the viewer
    fn two_tracks(secs: i64) -> FeedCycle {
        cycle(secs, &[("A", 0.0, 0.1, None), ("B", 0.2, 0.0, None)])
    }

    #[test]
    fn test_auto_range_fits_farthest() {
        let mut radar = Radar::default();
        radar.ingest(two_tracks(0));
        let frame = radar.frame();

        assert_eq!(frame.range.max_distance_km, 32);
        assert_eq!(frame.track_count, 2);
        let ids: Vec<&str> = frame.placed.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["A", "B"]);
        assert!(frame.out_of_range.is_empty());

        let a = frame.positions()["A"];
        let expected_r = 11.12 / 32.0 * 240.0;
        assert!((a.x - (240.0 + expected_r)).abs() < 0.5);
        assert!((a.y - 240.0).abs() < 1e-6);
        assert_eq!(frame.rings.last().unwrap().radius_px, 240.0);
    }

    #[test]
    fn test_auto_range_nearest_drops_far_tracks() {
        let mut radar = Radar::default();
        assert!(radar.apply(DisplayIntent::TargetNearest));
        radar.ingest(two_tracks(0));
        let frame = radar.frame();

        assert_eq!(frame.range.max_distance_km, 16);
        assert_eq!(frame.in_range_count(), 1);
        assert_eq!(frame.out_of_range, vec!["B"]);
    }

    #[test]
    fn test_manual_range_is_left_alone() {
        let mut radar = Radar::default();
        assert!(radar.apply(DisplayIntent::RangeDown));
        radar.ingest(two_tracks(0));
        let frame = radar.frame();

        assert_eq!(frame.range.mode, RangeMode::Manual);
        assert_eq!(frame.range.max_distance_km, 32);
        assert!(frame.highlights.range_manual);
    }

    #[test]
    fn test_invalid_range_request_changes_nothing() {
        let mut radar = Radar::default();
        let before = radar.range().state().clone();
        assert!(!radar.apply(DisplayIntent::SetRange(0.0)));
        assert!(!radar.apply(DisplayIntent::SetRange(-3.0)));
        assert_eq!(*radar.range().state(), before);
        assert!(!radar.display().is_dirty());
    }

    #[test]
    fn test_click_selects_and_clears() {
        let mut radar = Radar::default();
        radar.ingest(two_tracks(0));
        let a = radar.frame().positions()["A"];

        assert!(radar.apply(DisplayIntent::SelectAt(PixelPoint::new(a.x + 3.0, a.y - 2.0))));
        assert_eq!(radar.display().selected_id(), Some("A"));
        let frame = radar.frame();
        assert!(frame.is_selected("A"));
        assert!(frame.selected.is_some());

        // outside the disc: ignored
        assert!(!radar.apply(DisplayIntent::SelectAt(PixelPoint::new(2.0, 2.0))));
        assert_eq!(radar.display().selected_id(), Some("A"));

        // empty spot on the disc: cleared
        assert!(radar.apply(DisplayIntent::SelectAt(PixelPoint::new(100.0, 240.0))));
        assert_eq!(radar.display().selected_id(), None);
    }

    #[test]
    fn test_hit_test_tie_breaks_by_distance_then_id() {
        let mut radar = Radar::default();
        radar.ingest(cycle(0, &[("zz", 0.0, 0.1, None), ("aa", 0.0, 0.1, None)]));
        let p = radar.frame().positions()["aa"];
        assert_eq!(radar.hit_test(p), Some("aa"));
        assert_eq!(radar.hit_test(PixelPoint::new(p.x + 11.0, p.y)), None);
    }

    #[test]
    fn test_stale_selection_renders_as_none() {
        let mut radar = Radar::default();
        radar.ingest(two_tracks(0));
        let a = radar.frame().positions()["A"];
        radar.apply(DisplayIntent::SelectAt(a));

        radar.ingest(cycle(1, &[("B", 0.2, 0.0, None)]));
        let frame = radar.frame();
        assert!(frame.selected.is_none());
        assert_eq!(frame.display.selected_id(), Some("A"));
    }

    #[test]
    fn test_highlights_recomputed_only_when_dirty() {
        let mut radar = Radar::default();
        let first = radar.frame();
        assert!(!first.highlights_changed);
        assert!(first.highlights.panel_summary);

        assert!(radar.apply(DisplayIntent::Panel(PanelMode::Details)));
        assert!(!radar.apply(DisplayIntent::Panel(PanelMode::Details)));
        let frame = radar.frame();
        assert!(frame.highlights_changed);
        assert!(frame.highlights.panel_details);
        assert!(!radar.frame().highlights_changed);
    }

    #[test]
    fn test_trails_follow_setting() {
        let mut radar = Radar::default();
        radar.apply(DisplayIntent::RangeManual);
        for i in 0..4 {
            radar.ingest(cycle(i, &[("A", 0.0, 0.1 + 0.01 * i as f64, None)]));
        }

        assert!(radar.frame().placed[0].trail.is_empty());
        radar.apply(DisplayIntent::TrailsMore);
        assert_eq!(radar.frame().placed[0].trail.len(), 1);
        radar.apply(DisplayIntent::TrailsAll);
        assert_eq!(radar.frame().placed[0].trail.len(), 3);
    }

    #[test]
    fn test_trail_skips_observations_without_position() {
        let mut radar = Radar::default();
        radar.apply(DisplayIntent::RangeManual);
        radar.apply(DisplayIntent::TrailsAll);
        radar.ingest(cycle(0, &[("A", 0.0, 0.1, None)]));
        let mut blind = cycle(1, &[]);
        blind.aircraft.insert("A".to_string(), TrackFields::default());
        radar.ingest(blind);
        radar.ingest(cycle(2, &[("A", 0.0, 0.12, None)]));

        let track = radar.registry().get("A").unwrap();
        assert_eq!(track.history(None, false).count(), 2);
        let frame = radar.frame();
        assert_eq!(frame.placed[0].trail.len(), 1);
    }

    #[test]
    fn test_stats_fold_once_per_cycle() {
        let mut radar = Radar::default();
        radar.ingest(cycle(0, &[("A", 0.0, 0.1, Some(100))]));
        radar.frame();
        radar.frame();
        radar.ingest(cycle(1, &[("A", 0.0, 0.1, Some(300))]));

        let stats = radar.stats();
        assert_eq!(stats.altitude_ft.samples, 2);
        assert!((stats.altitude_ft.avg - 175.0).abs() < 1e-9);

        radar.apply(DisplayIntent::ResetStats);
        assert_eq!(radar.stats().unique_count(), 0);
    }

    #[test]
    fn test_viewport_resize() {
        let mut radar = Radar::default();
        assert!(!radar.set_viewport(DEFAULT_DIAMETER_PX));
        assert!(radar.set_viewport(320.0));
        assert_eq!(radar.frame().diameter_px, 320.0);
    }

    #[test]
    fn test_quit() {
        let mut radar = Radar::default();
        assert!(radar.apply(DisplayIntent::Quit));
        assert!(radar.is_quit_requested());
        assert!(!radar.apply(DisplayIntent::Quit));
    }
}
