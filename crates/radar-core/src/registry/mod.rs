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

//! Keyed collection of tracks, reconciled against each feed cycle.
//!
//! The registry mirrors the latest snapshot set exactly: ids present in the
//! cycle are created or updated, every other track is dropped. A vehicle that
//! disappears for one cycle and comes back starts over with a fresh history.

use std::cmp::Ordering;
use std::collections::HashMap;

use chrono::{DateTime, Utc};
use log::debug;

use crate::geo::GeoPoint;
use crate::track::{Track, TrackFields};

/// What a reconciliation changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub added: Vec<String>,
    pub updated: usize,
    pub removed: Vec<String>,
}

/// Track registry keyed by unique vehicle id.
#[derive(Default)]
pub struct TrackRegistry {
    tracks: HashMap<String, Track>,
}

impl std::fmt::Debug for TrackRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrackRegistry")
            .field("track_count", &self.tracks.len())
            .finish()
    }
}

impl TrackRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bring the registry in line with one cycle's snapshot set.
    ///
    /// Afterwards the registry keys equal the keys of `snapshots`.
    pub fn reconcile(
        &mut self,
        timestamp: DateTime<Utc>,
        viewer: GeoPoint,
        snapshots: HashMap<String, TrackFields>,
    ) -> ReconcileReport {
        let mut report = ReconcileReport::default();

        self.tracks.retain(|id, _| {
            let keep = snapshots.contains_key(id);
            if !keep {
                report.removed.push(id.clone());
            }
            keep
        });

        for (id, fields) in snapshots {
            if let Some(track) = self.tracks.get_mut(&id) {
                track.update(timestamp, viewer, fields);
                report.updated += 1;
            } else {
                let track = Track::new(&id, timestamp, viewer, fields);
                self.tracks.insert(id.clone(), track);
                report.added.push(id);
            }
        }

        report.added.sort();
        report.removed.sort();
        debug!(
            "Reconciled {} tracks: {} added, {} updated, {} removed",
            self.tracks.len(),
            report.added.len(),
            report.updated,
            report.removed.len()
        );
        report
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Track> {
        self.tracks.get(id)
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.tracks.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Track> {
        self.tracks.values()
    }

    /// Track ids in ascending order.
    #[must_use]
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.tracks.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Tracks ordered by ascending distance from the viewer, then by id.
    ///
    /// Tracks without a position sort after all placed tracks.
    #[must_use]
    pub fn by_distance(&self) -> Vec<&Track> {
        let mut tracks: Vec<&Track> = self.tracks.values().collect();
        tracks.sort_by(|a, b| compare_by_distance(a, b));
        tracks
    }
}

/// Deterministic render and hit-test order: nearest first, ties broken by id.
#[must_use]
pub fn compare_by_distance(a: &Track, b: &Track) -> Ordering {
    let by_distance = match (a.distance_km(), b.distance_km()) {
        (Some(da), Some(db)) => da.total_cmp(&db),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    by_distance.then_with(|| a.id().cmp(b.id()))
}
