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

//! Session statistics over every track observation.
//!
//! Averages are single-pole exponential averages (`avg' = (v + avg) / 2`),
//! not windowed means. They start from zero, so the first sample only counts
//! for half.

use std::collections::{BTreeMap, HashSet};

use crate::category::EmitterCategory;
use crate::track::Track;

/// Min, max and trailing average of one metric.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricStats {
    pub min: f64,
    pub max: f64,
    pub avg: f64,
    pub samples: u64,
}

impl Default for MetricStats {
    fn default() -> Self {
        Self {
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
            avg: 0.0,
            samples: 0,
        }
    }
}

impl MetricStats {
    pub fn update(&mut self, value: f64) {
        if !value.is_finite() {
            return;
        }
        self.avg = (value + self.avg) / 2.0;
        self.max = self.max.max(value);
        self.min = self.min.min(value);
        self.samples += 1;
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples == 0
    }

    fn report_line(&self, name: &str, precision: usize) -> String {
        if self.is_empty() {
            return format!("{name:<9} no samples");
        }
        format!(
            "{name:<9} min={:.precision$}, max={:.precision$}, avg={:.2}",
            self.min, self.max, self.avg
        )
    }
}

/// Running statistics for the session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunningStats {
    pub altitude_ft: MetricStats,
    pub vertical_rate_fpm: MetricStats,
    pub ground_speed_kt: MetricStats,
    pub distance_km: MetricStats,
    pub rssi_dbfs: MetricStats,
    categories: BTreeMap<EmitterCategory, u64>,
    unique_ids: HashSet<String>,
}

impl RunningStats {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold the current snapshot of `track` into the accumulators.
    pub fn update(&mut self, track: &Track) {
        let snapshot = track.current();
        let fields = &snapshot.fields;

        if !self.unique_ids.contains(track.id()) {
            self.unique_ids.insert(track.id().to_string());
        }

        if let Some(alt) = fields.altitude_ft {
            self.altitude_ft.update(f64::from(alt));
        }
        if let Some(rate) = fields.vertical_rate_fpm {
            self.vertical_rate_fpm.update(f64::from(rate));
        }
        if let Some(speed) = fields.ground_speed_kt {
            self.ground_speed_kt.update(speed);
        }
        if let Some(distance) = snapshot.distance_km {
            self.distance_km.update(distance);
        }
        if let Some(rssi) = fields.rssi_dbfs {
            self.rssi_dbfs.update(rssi);
        }

        *self.categories.entry(fields.category).or_insert(0) += 1;
    }

    /// Back to sentinel values with an empty id set.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Distinct ids seen this session, including tracks that have since gone.
    #[must_use]
    pub fn unique_count(&self) -> usize {
        self.unique_ids.len()
    }

    #[must_use]
    pub fn category_count(&self, category: EmitterCategory) -> u64 {
        self.categories.get(&category).copied().unwrap_or(0)
    }

    /// Non-zero category counts in code order, `Unknown` last.
    pub fn categories(&self) -> impl Iterator<Item = (EmitterCategory, u64)> + '_ {
        let coded = self
            .categories
            .iter()
            .filter(|(c, _)| **c != EmitterCategory::Unknown);
        let unknown = self.categories.get_key_value(&EmitterCategory::Unknown);
        coded
            .chain(unknown)
            .filter(|(_, n)| **n > 0)
            .map(|(c, n)| (*c, *n))
    }

    /// Human-readable summary, one line per entry.
    #[must_use]
    pub fn report(&self) -> Vec<String> {
        let mut lines = vec![
            format!("Unique ids: {}", self.unique_count()),
            self.altitude_ft.report_line("Altitude:", 0),
            self.vertical_rate_fpm.report_line("Rate:", 0),
            self.ground_speed_kt.report_line("Speed:", 1),
            self.distance_km.report_line("Distance:", 2),
            self.rssi_dbfs.report_line("RSSI:", 1),
        ];
        let histogram: Vec<String> = self
            .categories()
            .map(|(category, count)| format!("{}={count}", category.code()))
            .collect();
        if histogram.is_empty() {
            lines.push("Categories: none".to_string());
        } else {
            lines.push(format!("Categories: {}", histogram.join(" ")));
        }
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::CategorySet;
    use crate::geo::GeoPoint;
    use crate::track::TrackFields;
    use chrono::{TimeZone, Utc};

    fn track(id: &str, fields: TrackFields) -> Track {
        let ts = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        Track::new(id, ts, GeoPoint::new(0.0, 0.0), fields)
    }

    fn with_altitude(alt: i32) -> TrackFields {
        TrackFields {
            altitude_ft: Some(alt),
            ..Default::default()
        }
    }

    #[test]
    fn test_sentinels() {
        let stats = RunningStats::new();
        assert_eq!(stats.altitude_ft.max, f64::NEG_INFINITY);
        assert_eq!(stats.altitude_ft.min, f64::INFINITY);
        assert_eq!(stats.altitude_ft.avg, 0.0);
        assert_eq!(stats.unique_count(), 0);
    }

    #[test]
    fn test_exponential_average() {
        let mut stats = RunningStats::new();

        stats.update(&track("a", with_altitude(100)));
        assert!((stats.altitude_ft.avg - 50.0).abs() < 1e-9);

        stats.update(&track("a", with_altitude(300)));
        assert!((stats.altitude_ft.avg - 175.0).abs() < 1e-9);
        assert_eq!(stats.altitude_ft.max, 300.0);
        assert_eq!(stats.altitude_ft.min, 100.0);
        assert_eq!(stats.altitude_ft.samples, 2);
    }

    #[test]
    fn test_missing_values_are_skipped() {
        let mut stats = RunningStats::new();
        stats.update(&track("a", TrackFields::default()));

        assert!(stats.altitude_ft.is_empty());
        assert!(stats.ground_speed_kt.is_empty());
        // no position, no distance
        assert!(stats.distance_km.is_empty());
        assert_eq!(stats.unique_count(), 1);
        assert_eq!(stats.category_count(EmitterCategory::Unknown), 1);
    }

    #[test]
    fn test_unique_ids_are_monotonic_until_reset() {
        let mut stats = RunningStats::new();
        stats.update(&track("a", with_altitude(1000)));
        stats.update(&track("b", with_altitude(2000)));
        stats.update(&track("a", with_altitude(3000)));
        assert_eq!(stats.unique_count(), 2);

        stats.reset();
        assert_eq!(stats.unique_count(), 0);
        assert!(stats.altitude_ft.is_empty());
        assert_eq!(stats.altitude_ft.max, f64::NEG_INFINITY);
    }

    #[test]
    fn test_category_histogram() {
        let mut stats = RunningStats::new();
        let a3 = EmitterCategory::Coded {
            set: CategorySet::A,
            subtype: 3,
        };
        for (id, code) in [("a", "A3"), ("b", "A3"), ("c", "B1"), ("d", "Z9")] {
            let fields = TrackFields {
                category: EmitterCategory::parse(code),
                ..Default::default()
            };
            stats.update(&track(id, fields));
        }

        assert_eq!(stats.category_count(a3), 2);
        assert_eq!(stats.category_count(EmitterCategory::Unknown), 1);
        let codes: Vec<String> = stats.categories().map(|(c, _)| c.code()).collect();
        assert_eq!(codes, vec!["A3", "B1", "?"]);
    }

    #[test]
    fn test_report() {
        let mut stats = RunningStats::new();
        stats.update(&track("a", with_altitude(100)));
        let report = stats.report();

        assert_eq!(report[0], "Unique ids: 1");
        assert!(report[1].contains("min=100"));
        assert!(report[1].contains("avg=50.00"));
        assert!(report[3].contains("no samples"));
        assert_eq!(report.last().unwrap(), "Categories: ?=1");
    }
}
