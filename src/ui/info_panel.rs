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

//! Text panel under the radar: summary table, selected track, or session info.

use std::time::{Duration, Instant};

use chrono::{DateTime, SecondsFormat, Utc};
use egui::{Color32, FontId, RichText};
use radar_core::{Frame, PanelMode, TrackSnapshot};

const CPU_TEMP_PATH: &str = "/sys/class/thermal/thermal_zone0/temp";
const CPU_TEMP_INTERVAL: Duration = Duration::from_secs(5);
const TEXT: Color32 = Color32::from_rgb(255, 191, 0);

fn opt<T: std::fmt::Display>(value: Option<T>) -> String {
    value.map_or_else(String::new, |v| v.to_string())
}

fn opt_f(value: Option<f64>, decimals: usize) -> String {
    value.map_or_else(String::new, |v| format!("{v:.decimals$}"))
}

/// One row per track on the scope, closest first.
pub fn summary_lines(frame: &Frame) -> Vec<String> {
    let mut lines = vec![
        format!(
            "{:<8} {:>6} {:>5} {:>5} {:>6} {:>5} {:>4} {:>6}",
            "Flight", "Feet", "Knots", "Head.", "Dist.", "Azi.", "Cat.", "RSSI"
        ),
        format!(
            "{:-<8} {:->6} {:->5} {:->5} {:->6} {:->5} {:->4} {:->6}",
            "", "", "", "", "", "", "", ""
        ),
    ];
    for placed in &frame.placed {
        let s = &placed.snapshot;
        let f = &s.fields;
        lines.push(format!(
            "{:<8} {:>6} {:>5} {:>5} {:>6} {:>5} {:>4} {:>6}",
            f.flight_label(),
            opt(f.altitude_ft),
            opt_f(f.ground_speed_kt, 0),
            opt_f(f.heading_deg, 1),
            opt_f(s.distance_km, 2),
            opt_f(s.bearing_deg, 1),
            f.category.code(),
            opt_f(f.rssi_dbfs, 1),
        ));
    }
    lines
}

pub fn details_lines(selected: Option<&TrackSnapshot>) -> Vec<String> {
    let Some(s) = selected else {
        return vec!["No track selected".to_string()];
    };
    let f = &s.fields;
    vec![
        format!("Unique id:      {}", s.id),
        format!("Flight:         {}", f.flight_label()),
        format!("Altitude:       {} ft", opt(f.altitude_ft)),
        format!("Vertical rate:  {} ft/min", opt(f.vertical_rate_fpm)),
        format!("Ground speed:   {} kt", opt_f(f.ground_speed_kt, 1)),
        format!("Track heading:  {} deg", opt_f(f.heading_deg, 1)),
        format!("Category:       {} ({})", f.category.code(), f.category.description()),
        format!("Squawk:         {}", opt(f.squawk.as_deref())),
        format!("Emergency:      {}", f.active_emergency().unwrap_or("none")),
        format!("Position:       {}", opt(f.position)),
        format!("Distance:       {} km", opt_f(s.distance_km, 3)),
        format!("Bearing:        {} deg", opt_f(s.bearing_deg, 1)),
        format!("Last seen:      {} s", opt_f(f.seen_s, 1)),
        format!("Last position:  {} s", opt_f(f.seen_pos_s, 1)),
        format!("RSSI:           {} dBFS", opt_f(f.rssi_dbfs, 1)),
        format!("Timestamp:      {}", s.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)),
    ]
}

pub fn info_lines(frame: &Frame, started: DateTime<Utc>, cpu_temp_c: Option<f64>) -> Vec<String> {
    let (orientation, location) = match &frame.viewer {
        Some(viewer) => {
            let o = viewer.orientation;
            (
                format!(
                    "heading = {:.1}, roll = {}, pitch = {}",
                    o.heading_deg,
                    opt_f(o.roll_deg, 1),
                    opt_f(o.pitch_deg, 1)
                ),
                viewer.position.to_string(),
            )
        }
        None => (String::new(), String::new()),
    };
    let feed_time = frame
        .feed_timestamp
        .map(|ts| ts.to_rfc3339_opts(SecondsFormat::Secs, true))
        .unwrap_or_default();

    let mut lines = vec![
        format!("Start time:       {}", started.to_rfc3339_opts(SecondsFormat::Secs, true)),
        format!("Orientation:      {orientation}"),
        format!("Location:         {location}"),
        format!("Feed time:        {feed_time}"),
        format!("CPU temperature:  {} C", opt_f(cpu_temp_c, 1)),
        format!("Tracks:           {} ({} in range)", frame.track_count, frame.in_range_count()),
    ];
    lines.extend(frame.stats.report());
    lines
}

/// Millidegrees as written by the thermal zone driver.
pub fn parse_cpu_temp(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().map(|millis| millis / 1000.0)
}

pub fn cpu_temp_c() -> Option<f64> {
    std::fs::read_to_string(CPU_TEMP_PATH)
        .ok()
        .as_deref()
        .and_then(parse_cpu_temp)
}

/// Last CPU temperature reading, refreshed at most every few seconds.
#[derive(Debug, Default)]
pub struct CpuTempSampler {
    read_at: Option<Instant>,
    value: Option<f64>,
}

impl CpuTempSampler {
    /// Call outside the engine lock; `read` only runs when the cached value is stale.
    pub fn sample(&mut self, now: Instant, read: impl FnOnce() -> Option<f64>) -> Option<f64> {
        let stale = self
            .read_at
            .is_none_or(|at| now.saturating_duration_since(at) >= CPU_TEMP_INTERVAL);
        if stale {
            self.value = read();
            self.read_at = Some(now);
        }
        self.value
    }
}

pub fn show(ui: &mut egui::Ui, frame: &Frame, started: DateTime<Utc>, cpu_temp_c: Option<f64>) {
    let lines = match frame.display.panel() {
        PanelMode::Summary => summary_lines(frame),
        PanelMode::Details => details_lines(frame.selected.as_ref()),
        PanelMode::Info => info_lines(frame, started, cpu_temp_c),
    };
    egui::ScrollArea::vertical().show(ui, |ui| {
        for line in lines {
            ui.label(RichText::new(line).font(FontId::monospace(12.0)).color(TEXT));
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use radar_core::{EmitterCategory, FeedCycle, GeoPoint, Orientation, Radar, TrackFields, ViewerState};
    use std::collections::HashMap;

    fn frame() -> Frame {
        let ts = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let mut aircraft = HashMap::new();
        aircraft.insert(
            "a1b2c3".to_string(),
            TrackFields {
                flight: Some("UAL123".to_string()),
                altitude_ft: Some(12000),
                ground_speed_kt: Some(250.4),
                category: EmitterCategory::parse("A3"),
                position: Some(GeoPoint::new(0.1, 0.0)),
                ..Default::default()
            },
        );
        let mut radar = Radar::default();
        radar.ingest(FeedCycle {
            timestamp: ts,
            viewer: ViewerState {
                position: GeoPoint::new(0.0, 0.0),
                orientation: Orientation::default(),
                observed_at: ts,
            },
            aircraft,
        });
        radar.frame()
    }

    #[test]
    fn test_summary_table() {
        let lines = summary_lines(&frame());
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Flight"));
        let row: Vec<&str> = lines[2].split_whitespace().collect();
        assert_eq!(row[0], "UAL123");
        assert_eq!(row[1], "12000");
        assert_eq!(row[2], "250");
        assert_eq!(row[3], "11.12");
        assert_eq!(row[4], "0.0");
        assert_eq!(row[5], "A3");
    }

    #[test]
    fn test_details_without_selection() {
        assert_eq!(details_lines(None), vec!["No track selected"]);
        let f = frame();
        let lines = details_lines(Some(&f.placed[0].snapshot));
        assert!(lines[0].ends_with("a1b2c3"));
        assert!(lines.iter().any(|l| l.starts_with("Emergency:") && l.ends_with("none")));
    }

    #[test]
    fn test_info_lines() {
        let f = frame();
        let started = Utc.timestamp_opt(1_699_999_000, 0).unwrap();
        let lines = info_lines(&f, started, Some(48.3));
        assert!(lines[0].ends_with("2023-11-14T21:56:40Z"));
        assert!(lines[4].ends_with("48.3 C"));
        assert!(lines.iter().any(|l| l == "Unique ids: 1"));
        assert!(lines.iter().any(|l| l.starts_with("Categories: A3=1")));
    }

    #[test]
    fn test_cpu_temp_is_cached_between_reads() {
        let mut sampler = CpuTempSampler::default();
        let start = Instant::now();
        let mut reads = 0;

        assert_eq!(sampler.sample(start, || { reads += 1; Some(40.0) }), Some(40.0));
        assert_eq!(sampler.sample(start + Duration::from_secs(1), || { reads += 1; Some(41.0) }), Some(40.0));
        assert_eq!(reads, 1);
        assert_eq!(sampler.sample(start + CPU_TEMP_INTERVAL, || { reads += 1; Some(42.0) }), Some(42.0));
        assert_eq!(reads, 2);
    }

    #[test]
    fn test_parse_cpu_temp() {
        assert_eq!(parse_cpu_temp("48312\n"), Some(48.312));
        assert_eq!(parse_cpu_temp("warm"), None);
    }
}
