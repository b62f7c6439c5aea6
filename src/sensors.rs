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

//! Where the viewer is and which way they face.

use chrono::Utc;
use log::{info, warn};
use radar_core::{GeoPoint, Orientation, ReceiverInfo, ViewerState};

/// Produces the viewer's position and orientation once per feed cycle.
pub trait ViewerSource: Send {
    /// `None` while no fix is available; the cycle is skipped.
    fn sample(&mut self) -> Option<ViewerState>;

    fn describe(&self) -> String;
}

/// A viewer that never moves.
#[derive(Debug, Clone, PartialEq)]
pub struct FixedViewer {
    position: GeoPoint,
    orientation: Orientation,
}

impl FixedViewer {
    pub fn new(position: GeoPoint, orientation: Orientation) -> Self {
        Self { position, orientation }
    }

    /// Pick a position from, in order, the configured one, the receiver's
    /// own location, or the null island with a warning.
    pub fn resolve(
        configured: Option<GeoPoint>,
        orientation: Option<Orientation>,
        receiver: Option<&ReceiverInfo>,
    ) -> Self {
        let position = match (configured, receiver.and_then(ReceiverInfo::position)) {
            (Some(position), _) => position,
            (None, Some(position)) => {
                info!("Using receiver location {position}");
                position
            }
            (None, None) => {
                warn!("No position configured and receiver has none, using 0,0");
                GeoPoint::new(0.0, 0.0)
            }
        };
        Self::new(position, orientation.unwrap_or_default())
    }
}

impl ViewerSource for FixedViewer {
    fn sample(&mut self) -> Option<ViewerState> {
        Some(ViewerState {
            position: self.position,
            orientation: self.orientation,
            observed_at: Utc::now(),
        })
    }

    fn describe(&self) -> String {
        format!(
            "fixed at {} heading {:.1}",
            self.position, self.orientation.heading_deg
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn receiver(lat: Option<f64>, lon: Option<f64>) -> ReceiverInfo {
        ReceiverInfo {
            lat,
            lon,
            ..Default::default()
        }
    }

    #[test]
    fn test_configured_position_wins() {
        let rx = receiver(Some(10.0), Some(20.0));
        let mut viewer = FixedViewer::resolve(Some(GeoPoint::new(1.0, 2.0)), None, Some(&rx));
        let state = viewer.sample().unwrap();
        assert_eq!(state.position, GeoPoint::new(1.0, 2.0));
        assert_eq!(state.orientation, Orientation::default());
    }

    #[test]
    fn test_falls_back_to_receiver() {
        let rx = receiver(Some(10.0), Some(20.0));
        let orientation = Orientation {
            heading_deg: 90.0,
            roll_deg: None,
            pitch_deg: None,
        };
        let mut viewer = FixedViewer::resolve(None, Some(orientation), Some(&rx));
        let state = viewer.sample().unwrap();
        assert_eq!(state.position, GeoPoint::new(10.0, 20.0));
        assert!((state.orientation.heading_deg - 90.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_falls_back_to_origin() {
        let rx = receiver(Some(10.0), None);
        let viewer = FixedViewer::resolve(None, None, Some(&rx));
        assert_eq!(viewer, FixedViewer::new(GeoPoint::new(0.0, 0.0), Orientation::default()));
        assert!(viewer.describe().starts_with("fixed at"));
    }
}
