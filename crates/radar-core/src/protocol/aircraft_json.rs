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

//! dump1090 JSON document parser.
//!
//! Document format (abridged):
//! ```text
//! { "now": 1700000000.1, "messages": 123456,
//!   "aircraft": [ { "hex": "a1b2c3", "flight": "UAL123  ", "alt_geom": 35000,
//!                   "gs": 450.2, "track": 271.5, "lat": 37.6, "lon": -122.3, ... } ] }
//! ```
//!
//! Every record field is read independently. A field that is present but has
//! the wrong type is logged and treated as absent.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{ParseError, Protocol};
use crate::category::EmitterCategory;
use crate::geo::GeoPoint;
use crate::track::TrackFields;

/// One parsed `aircraft.json` document.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedSnapshot {
    /// When the decoder wrote the document.
    pub timestamp: DateTime<Utc>,
    /// Total Mode S messages the decoder has processed, if reported.
    pub message_count: Option<u64>,
    /// Placeable records keyed by id.
    pub aircraft: HashMap<String, TrackFields>,
    /// Ids of records dropped for lacking a usable position, sorted.
    pub unplaced: Vec<String>,
    /// Records without an id.
    pub skipped: usize,
}

/// Parser for dump1090 `aircraft.json` documents.
#[derive(Debug, Default)]
pub struct AircraftJsonParser {
    last_timestamp: Option<DateTime<Utc>>,
}

impl AircraftJsonParser {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Document time of the last successfully parsed document.
    #[must_use]
    pub fn last_timestamp(&self) -> Option<DateTime<Utc>> {
        self.last_timestamp
    }
}

impl Protocol for AircraftJsonParser {
    type Message = FeedSnapshot;
    type Error = ParseError;

    fn parse(&mut self, input: &[u8]) -> Result<Option<FeedSnapshot>, ParseError> {
        if input.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }

        let document: Value = serde_json::from_slice(input)?;
        let root = document
            .as_object()
            .ok_or_else(|| ParseError::InvalidFormat("top level is not an object".to_string()))?;

        let now = root.get("now").ok_or(ParseError::MissingField("now"))?;
        let timestamp = now
            .as_f64()
            .and_then(epoch_to_utc)
            .ok_or_else(|| ParseError::InvalidValue {
                field: "now",
                value: now.to_string(),
            })?;

        let records = root.get("aircraft").ok_or(ParseError::MissingField("aircraft"))?;
        let records = records.as_array().ok_or_else(|| ParseError::InvalidValue {
            field: "aircraft",
            value: "not an array".to_string(),
        })?;

        let mut snapshot = FeedSnapshot {
            timestamp,
            message_count: root.get("messages").and_then(Value::as_u64),
            aircraft: HashMap::with_capacity(records.len()),
            unplaced: Vec::new(),
            skipped: 0,
        };

        for value in records {
            let Some((id, map)) = value.as_object().and_then(|map| Some((record_id(map)?, map))) else {
                debug!("Skipping aircraft record without hex id");
                snapshot.skipped += 1;
                continue;
            };
            let fields = Record { id: &id, map }.fields();
            if fields.position.is_none() {
                snapshot.unplaced.push(id);
            } else {
                snapshot.aircraft.insert(id, fields);
            }
        }
        snapshot.unplaced.sort();

        if let Some(last) = self.last_timestamp {
            if timestamp < last {
                info!("Feed time went backwards ({last} -> {timestamp}), decoder restarted?");
            }
        }
        self.last_timestamp = Some(timestamp);

        Ok(Some(snapshot))
    }
}

fn record_id(map: &Map<String, Value>) -> Option<String> {
    map.get("hex")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|hex| !hex.is_empty())
        .map(str::to_string)
}

#[allow(clippy::cast_possible_truncation, reason = "millisecond epoch fits in i64")]
fn epoch_to_utc(secs: f64) -> Option<DateTime<Utc>> {
    if !secs.is_finite() || secs < 0.0 {
        return None;
    }
    DateTime::from_timestamp_millis((secs * 1000.0).round() as i64)
}

/// Field accessors for one aircraft record.
struct Record<'a> {
    id: &'a str,
    map: &'a Map<String, Value>,
}

impl Record<'_> {
    fn fields(&self) -> TrackFields {
        TrackFields {
            flight: self.string("flight"),
            altitude_ft: self.int("alt_geom").or_else(|| self.baro_altitude()),
            vertical_rate_fpm: self.int("geom_rate").or_else(|| self.int("baro_rate")),
            ground_speed_kt: self.float("gs"),
            heading_deg: self.float("track"),
            category: self
                .string("category")
                .map_or(EmitterCategory::Unknown, |code| EmitterCategory::parse(&code)),
            position: self.position(),
            seen_s: self.float("seen"),
            seen_pos_s: self.float("seen_pos"),
            rssi_dbfs: self.float("rssi"),
            squawk: self.string("squawk"),
            emergency: self.string("emergency"),
        }
    }

    fn get(&self, name: &str) -> Option<&Value> {
        self.map.get(name).filter(|v| !v.is_null())
    }

    fn malformed(&self, name: &str, value: &Value) {
        info!("Ignoring malformed '{name}' for {}: {value}", self.id);
    }

    fn float(&self, name: &str) -> Option<f64> {
        let value = self.get(name)?;
        let parsed = value.as_f64().filter(|v| v.is_finite());
        if parsed.is_none() {
            self.malformed(name, value);
        }
        parsed
    }

    #[allow(clippy::cast_possible_truncation, reason = "range checked by i32::try_from")]
    fn int(&self, name: &str) -> Option<i32> {
        let value = self.get(name)?;
        let parsed = value
            .as_i64()
            .or_else(|| value.as_f64().filter(|v| v.is_finite()).map(|v| v.round() as i64))
            .and_then(|v| i32::try_from(v).ok());
        if parsed.is_none() {
            self.malformed(name, value);
        }
        parsed
    }

    fn string(&self, name: &str) -> Option<String> {
        let value = self.get(name)?;
        match value.as_str() {
            Some(s) => Some(s.trim()).filter(|s| !s.is_empty()).map(str::to_string),
            None => {
                self.malformed(name, value);
                None
            }
        }
    }

    /// `alt_baro` is a number, or the string `"ground"`.
    fn baro_altitude(&self) -> Option<i32> {
        match self.get("alt_baro")? {
            Value::String(s) if s == "ground" => None,
            _ => self.int("alt_baro"),
        }
    }

    fn position(&self) -> Option<GeoPoint> {
        let point = GeoPoint::new(self.float("lat")?, self.float("lon")?);
        if point.is_valid() {
            Some(point)
        } else {
            info!("Ignoring out-of-range position for {}: {point}", self.id);
            None
        }
    }
}

/// The decoder's `receiver.json`, read once at start-up.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReceiverInfo {
    pub version: Option<String>,
    /// Document refresh interval in milliseconds.
    pub refresh: Option<u64>,
    pub history: Option<u64>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

impl ReceiverInfo {
    pub fn parse(input: &[u8]) -> Result<Self, ParseError> {
        Ok(serde_json::from_slice(input)?)
    }

    /// Receiver site location, when the decoder was configured with one.
    #[must_use]
    pub fn position(&self) -> Option<GeoPoint> {
        let point = GeoPoint::new(self.lat?, self.lon?);
        point.is_valid().then_some(point)
    }

    #[must_use]
    pub fn refresh_interval(&self) -> Option<Duration> {
        self.refresh.filter(|ms| *ms > 0).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOCUMENT: &str = r#"{
        "now": 1700000000.5,
        "messages": 4242,
        "aircraft": [
            {"hex": "a1b2c3", "flight": "UAL123  ", "alt_baro": 34975, "alt_geom": 35000,
             "gs": 450.2, "track": 271.5, "geom_rate": -64, "baro_rate": 128,
             "squawk": "1200", "emergency": "none", "category": "A3",
             "lat": 37.6, "lon": -122.3, "seen_pos": 0.4, "seen": 0.1, "rssi": -21.5},
            {"hex": "~0fa001", "category": "C1", "lat": 37.61, "lon": -122.31},
            {"hex": "d4e5f6", "flight": "DAL9", "alt_baro": 12000},
            {"flight": "NOHEX", "lat": 1.0, "lon": 2.0}
        ]
    }"#;

    #[test]
    fn test_parse_document() {
        let mut parser = AircraftJsonParser::new();
        let snapshot = parser.parse(DOCUMENT.as_bytes()).unwrap().unwrap();

        assert_eq!(snapshot.timestamp.timestamp_millis(), 1_700_000_000_500);
        assert_eq!(snapshot.message_count, Some(4242));
        assert_eq!(snapshot.aircraft.len(), 2);
        assert_eq!(snapshot.unplaced, vec!["d4e5f6"]);
        assert_eq!(snapshot.skipped, 1);
        assert_eq!(parser.last_timestamp(), Some(snapshot.timestamp));

        let ual = &snapshot.aircraft["a1b2c3"];
        assert_eq!(ual.flight.as_deref(), Some("UAL123"));
        assert_eq!(ual.altitude_ft, Some(35000));
        assert_eq!(ual.vertical_rate_fpm, Some(-64));
        assert_eq!(ual.ground_speed_kt, Some(450.2));
        assert_eq!(ual.heading_deg, Some(271.5));
        assert_eq!(ual.category.code(), "A3");
        assert_eq!(ual.position, Some(GeoPoint::new(37.6, -122.3)));
        assert_eq!(ual.rssi_dbfs, Some(-21.5));
        assert_eq!(ual.squawk.as_deref(), Some("1200"));
        assert_eq!(ual.active_emergency(), None);

        let vehicle = &snapshot.aircraft["~0fa001"];
        assert_eq!(vehicle.flight, None);
        assert_eq!(vehicle.altitude_ft, None);
        assert_eq!(vehicle.category.code(), "C1");
    }

    #[test]
    fn test_malformed_fields_read_as_absent() {
        let doc = br#"{"now": 1, "aircraft": [
            {"hex": "abc123", "gs": "fast", "alt_geom": "high", "flight": 7,
             "category": "Q9", "lat": 10.0, "lon": 20.0, "rssi": null}
        ]}"#;
        let snapshot = AircraftJsonParser::new().parse(doc).unwrap().unwrap();
        let fields = &snapshot.aircraft["abc123"];

        assert_eq!(fields.ground_speed_kt, None);
        assert_eq!(fields.altitude_ft, None);
        assert_eq!(fields.flight, None);
        assert_eq!(fields.rssi_dbfs, None);
        assert_eq!(fields.category, EmitterCategory::Unknown);
        assert!(fields.position.is_some());
    }

    #[test]
    fn test_altitude_and_rate_fallbacks() {
        let doc = br#"{"now": 1, "aircraft": [
            {"hex": "aaaaaa", "alt_baro": 12000, "baro_rate": 640, "lat": 1.0, "lon": 1.0},
            {"hex": "bbbbbb", "alt_baro": "ground", "lat": 1.0, "lon": 1.0}
        ]}"#;
        let snapshot = AircraftJsonParser::new().parse(doc).unwrap().unwrap();

        assert_eq!(snapshot.aircraft["aaaaaa"].altitude_ft, Some(12000));
        assert_eq!(snapshot.aircraft["aaaaaa"].vertical_rate_fpm, Some(640));
        assert_eq!(snapshot.aircraft["bbbbbb"].altitude_ft, None);
    }

    #[test]
    fn test_out_of_range_position_is_unplaced() {
        let doc = br#"{"now": 1, "aircraft": [{"hex": "cccccc", "lat": 91.0, "lon": 1.0}]}"#;
        let snapshot = AircraftJsonParser::new().parse(doc).unwrap().unwrap();
        assert!(snapshot.aircraft.is_empty());
        assert_eq!(snapshot.unplaced, vec!["cccccc"]);
    }

    #[test]
    fn test_blank_input() {
        let mut parser = AircraftJsonParser::new();
        assert!(parser.parse(b"").unwrap().is_none());
        assert!(parser.parse(b"  \n").unwrap().is_none());
    }

    #[test]
    fn test_unusable_documents() {
        let mut parser = AircraftJsonParser::new();
        assert!(matches!(parser.parse(b"{\"now\": 1"), Err(ParseError::Json(_))));
        assert!(matches!(parser.parse(b"[]"), Err(ParseError::InvalidFormat(_))));
        assert!(matches!(
            parser.parse(br#"{"aircraft": []}"#),
            Err(ParseError::MissingField("now"))
        ));
        assert!(matches!(
            parser.parse(br#"{"now": 1}"#),
            Err(ParseError::MissingField("aircraft"))
        ));
        assert!(matches!(
            parser.parse(br#"{"now": "later", "aircraft": []}"#),
            Err(ParseError::InvalidValue { field: "now", .. })
        ));
        assert!(parser.last_timestamp().is_none());
    }

    #[test]
    fn test_receiver_info() {
        let info = ReceiverInfo::parse(
            br#"{"version": "dump1090-fa 9.0", "refresh": 1000, "history": 120, "lat": 37.5, "lon": -122.2}"#,
        )
        .unwrap();
        assert_eq!(info.version.as_deref(), Some("dump1090-fa 9.0"));
        assert_eq!(info.refresh_interval(), Some(Duration::from_secs(1)));
        assert_eq!(info.position(), Some(GeoPoint::new(37.5, -122.2)));

        let bare = ReceiverInfo::parse(br#"{"version": "x"}"#).unwrap();
        assert_eq!(bare.position(), None);
        assert_eq!(bare.refresh_interval(), None);
    }
}
