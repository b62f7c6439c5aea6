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

//! Log of emergencies and unusual vehicles seen by the feed.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufWriter, Write};

use log::info;
use radar_core::{CategorySet, FeedSnapshot, TrackFields};
use serde::Serialize;

use crate::config::ExceptsTarget;

/// The fields worth keeping about an exceptional vehicle.
#[derive(Debug, Serialize)]
struct ExceptRecord<'a> {
    flight: Option<&'a str>,
    category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    emergency: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    squawk: Option<&'a str>,
    altitude_ft: Option<i32>,
    ground_speed_kt: Option<f64>,
    lat: Option<f64>,
    lon: Option<f64>,
}

impl<'a> From<&'a TrackFields> for ExceptRecord<'a> {
    fn from(fields: &'a TrackFields) -> Self {
        Self {
            flight: fields.flight.as_deref(),
            category: fields.category.code(),
            emergency: fields.active_emergency(),
            squawk: fields.squawk.as_deref(),
            altitude_ft: fields.altitude_ft,
            ground_speed_kt: fields.ground_speed_kt,
            lat: fields.position.map(|p| p.lat),
            lon: fields.position.map(|p| p.lon),
        }
    }
}

/// Coded category outside class A. An unknown category is not unusual.
fn is_unusual(fields: &TrackFields) -> bool {
    fields.category.set().is_some_and(|set| set != CategorySet::A)
}

/// Line-oriented writer for exceptional vehicles.
pub struct ExceptsLog<W: Write> {
    sink: W,
}

impl<W: Write> std::fmt::Debug for ExceptsLog<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExceptsLog")
            .field("sink", &std::any::type_name::<W>())
            .finish()
    }
}

impl ExceptsLog<Box<dyn Write + Send>> {
    /// Truncates an existing file.
    pub fn open(target: &ExceptsTarget) -> io::Result<Self> {
        let sink: Box<dyn Write + Send> = match target {
            ExceptsTarget::Stdout => Box::new(io::stdout()),
            ExceptsTarget::File(path) => {
                info!("Writing exceptional vehicles to {}", path.display());
                Box::new(BufWriter::new(File::create(path)?))
            }
        };
        Ok(Self::new(sink))
    }
}

impl<W: Write> ExceptsLog<W> {
    pub fn new(sink: W) -> Self {
        Self { sink }
    }

    /// Write this cycle's emergencies and unusual vehicles, one line each
    /// when there are any. Returns the number of lines written.
    pub fn record(&mut self, snapshot: &FeedSnapshot) -> io::Result<usize> {
        let mut emergencies = BTreeMap::new();
        let mut unusual = BTreeMap::new();
        for (id, fields) in &snapshot.aircraft {
            if fields.active_emergency().is_some() {
                emergencies.insert(id.as_str(), ExceptRecord::from(fields));
            }
            if is_unusual(fields) {
                unusual.insert(id.as_str(), ExceptRecord::from(fields));
            }
        }

        let stamp = snapshot.timestamp.to_rfc3339();
        let mut lines = 0;
        if !emergencies.is_empty() {
            writeln!(self.sink, "{stamp} Emergencies: {}", serde_json::to_string(&emergencies)?)?;
            lines += 1;
        }
        if !unusual.is_empty() {
            writeln!(self.sink, "{stamp} Unusual Vehicles: {}", serde_json::to_string(&unusual)?)?;
            lines += 1;
        }
        if lines > 0 {
            self.sink.flush()?;
        }
        Ok(lines)
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.sink
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use radar_core::{EmitterCategory, GeoPoint};
    use std::collections::HashMap;

    fn snapshot(entries: Vec<(&str, TrackFields)>) -> FeedSnapshot {
        FeedSnapshot {
            timestamp: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
            message_count: None,
            aircraft: entries
                .into_iter()
                .map(|(id, f)| (id.to_string(), f))
                .collect::<HashMap<_, _>>(),
            unplaced: Vec::new(),
            skipped: 0,
        }
    }

    fn fields(category: &str, emergency: Option<&str>) -> TrackFields {
        TrackFields {
            flight: Some("TEST1".to_string()),
            category: EmitterCategory::parse(category),
            emergency: emergency.map(str::to_string),
            position: Some(GeoPoint::new(1.0, 2.0)),
            ..Default::default()
        }
    }

    #[test]
    fn test_nothing_exceptional_writes_nothing() {
        let mut log = ExceptsLog::new(Vec::new());
        let snap = snapshot(vec![
            ("aaaaaa", fields("A3", Some("none"))),
            ("bbbbbb", fields("", None)),
        ]);
        assert_eq!(log.record(&snap).unwrap(), 0);
        assert!(log.into_inner().is_empty());
    }

    #[test]
    fn test_emergency_and_unusual_lines() {
        let mut log = ExceptsLog::new(Vec::new());
        let snap = snapshot(vec![
            ("aaaaaa", fields("A3", Some("general"))),
            ("bbbbbb", fields("B6", None)),
            ("cccccc", fields("C2", Some("lifeguard"))),
        ]);
        assert_eq!(log.record(&snap).unwrap(), 2);

        let text = String::from_utf8(log.into_inner()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("Emergencies: {\"aaaaaa\""));
        assert!(lines[0].contains("\"cccccc\""));
        assert!(!lines[0].contains("bbbbbb"));
        assert!(lines[1].contains("Unusual Vehicles: {\"bbbbbb\""));
        assert!(lines[1].contains("\"category\":\"C2\""));
        assert!(!lines[1].contains("aaaaaa"));
    }

    #[test]
    fn test_debug_names_the_sink() {
        let log = ExceptsLog::new(Vec::<u8>::new());
        let text = format!("{log:?}");
        assert!(text.starts_with("ExceptsLog"));
        assert!(text.contains("Vec<u8>"));
    }

    #[test]
    fn test_unusual_needs_a_coded_category() {
        assert!(!is_unusual(&fields("?", None)));
        assert!(!is_unusual(&fields("A7", None)));
        assert!(is_unusual(&fields("D1", None)));
    }
}
