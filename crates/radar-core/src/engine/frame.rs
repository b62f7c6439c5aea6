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

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use super::ViewerState;
use crate::display::{ControlHighlights, DisplayState};
use crate::range::{RangeRing, RangeState};
use crate::stats::RunningStats;
use crate::track::TrackSnapshot;
use crate::transform::PixelPoint;

/// An in-range track with its screen position and trail.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedTrack {
    pub id: String,
    pub pixel: PixelPoint,
    pub snapshot: TrackSnapshot,
    /// Trail pixels, newest first.
    pub trail: Vec<PixelPoint>,
}

/// A range ring with its on-screen radius.
#[derive(Debug, Clone, PartialEq)]
pub struct RingView {
    pub ring: RangeRing,
    pub radius_px: f64,
}

/// Everything the front end needs to paint one frame.
#[derive(Debug, Clone)]
pub struct Frame {
    pub diameter_px: f64,
    /// In-range tracks, nearest first (ties by id).
    pub placed: Vec<PlacedTrack>,
    /// Ids of tracks beyond the current range, or without a position.
    pub out_of_range: Vec<String>,
    pub range: RangeState,
    pub rings: Vec<RingView>,
    pub display: DisplayState,
    pub highlights: ControlHighlights,
    /// True when the highlights were recomputed for this frame.
    pub highlights_changed: bool,
    /// The selection, resolved against the registry.
    pub selected: Option<TrackSnapshot>,
    pub stats: RunningStats,
    pub viewer: Option<ViewerState>,
    pub feed_timestamp: Option<DateTime<Utc>>,
    pub track_count: usize,
}

impl Frame {
    /// Id to pixel mapping of every in-range track.
    #[must_use]
    pub fn positions(&self) -> HashMap<&str, PixelPoint> {
        self.placed.iter().map(|t| (t.id.as_str(), t.pixel)).collect()
    }

    #[must_use]
    pub fn in_range_count(&self) -> usize {
        self.placed.len()
    }

    #[must_use]
    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.as_ref().is_some_and(|s| s.id == id)
    }
}
