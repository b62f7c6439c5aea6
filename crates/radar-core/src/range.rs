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

//! Display range selection.
//!
//! The maximum display radius is always a power of two kilometres, at least
//! one. In auto mode it follows the nearest or farthest track every frame;
//! in manual mode it only changes on request.

use std::str::FromStr;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::error::RadarError;

/// Starting radius when nothing else is configured.
pub const DEFAULT_MAX_DISTANCE_KM: f64 = 64.0;

/// Largest selectable radius; beyond half the Earth's circumference.
pub const MAX_RANGE_KM: u32 = 1 << 15;

/// Ring radii as divisors of the maximum distance, innermost first.
pub const DEFAULT_RING_DIVISORS: [f64; 5] = [8.0, 4.0, 2.0, 1.333_333, 1.0];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RangeMode {
    #[default]
    Auto,
    Manual,
}

/// Which track the auto range fits to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AutoRangeTarget {
    Nearest,
    #[default]
    Farthest,
}

impl FromStr for AutoRangeTarget {
    type Err = RadarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "nearest" => Ok(Self::Nearest),
            "farthest" => Ok(Self::Farthest),
            _ => Err(RadarError::UnknownAutoRangeTarget(s.to_string())),
        }
    }
}

/// One range ring: its divisor of the max distance and the labelled distance.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeRing {
    pub divisor: f64,
    pub distance_km: f64,
    pub label: String,
}

impl RangeRing {
    /// Ring radius as a fraction of the display radius.
    #[must_use]
    pub fn radius_fraction(&self) -> f64 {
        1.0 / self.divisor
    }
}

/// Current range selection, as handed to the renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeState {
    pub max_distance_km: u32,
    pub mode: RangeMode,
    pub target: AutoRangeTarget,
    pub rings: Vec<RangeRing>,
}

/// Owns [`RangeState`]; the only place it is mutated.
#[derive(Debug, Clone)]
pub struct RangeController {
    state: RangeState,
    divisors: Vec<f64>,
}

impl Default for RangeController {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DISTANCE_KM, DEFAULT_RING_DIVISORS.to_vec())
    }
}

impl RangeController {
    /// Create a controller in auto mode.
    ///
    /// Divisors below one (rings outside the display) or non-finite ones are
    /// ignored; an empty table falls back to [`DEFAULT_RING_DIVISORS`].
    #[must_use]
    pub fn new(initial_km: f64, divisors: Vec<f64>) -> Self {
        let mut divisors: Vec<f64> = divisors
            .into_iter()
            .filter(|d| d.is_finite() && *d >= 1.0)
            .collect();
        if divisors.is_empty() {
            divisors = DEFAULT_RING_DIVISORS.to_vec();
        }

        let mut controller = Self {
            state: RangeState {
                max_distance_km: 1,
                mode: RangeMode::Auto,
                target: AutoRangeTarget::default(),
                rings: Vec::new(),
            },
            divisors,
        };
        controller.set_max_distance(initial_km);
        controller.rebuild_rings();
        controller
    }

    #[must_use]
    pub fn state(&self) -> &RangeState {
        &self.state
    }

    #[must_use]
    pub fn max_distance_km(&self) -> u32 {
        self.state.max_distance_km
    }

    #[must_use]
    pub fn mode(&self) -> RangeMode {
        self.state.mode
    }

    #[must_use]
    pub fn target(&self) -> AutoRangeTarget {
        self.state.target
    }

    #[must_use]
    pub fn rings(&self) -> &[RangeRing] {
        &self.state.rings
    }

    /// Clamp to at least 1 km and round up to the next power of two.
    ///
    /// Returns true if the radius changed.
    pub fn set_max_distance(&mut self, requested_km: f64) -> bool {
        let next = ceil_pow2(requested_km);
        if next == self.state.max_distance_km {
            return false;
        }
        self.state.max_distance_km = next;
        self.rebuild_rings();
        true
    }

    /// Explicit range request: switches to manual mode.
    pub fn set_range(&mut self, requested_km: f64) -> Result<(), RadarError> {
        if !requested_km.is_finite() || requested_km <= 0.0 {
            warn!("Rejected range request of {requested_km} km");
            return Err(RadarError::InvalidRange(requested_km));
        }
        if requested_km < 1.0 {
            warn!("Minimum distance clamped to 1 km");
        }
        self.state.mode = RangeMode::Manual;
        self.set_max_distance(requested_km);
        Ok(())
    }

    /// Step out to the next power of two and switch to manual mode.
    pub fn range_up(&mut self) -> bool {
        let mode_changed = self.set_mode(RangeMode::Manual);
        let next = self.state.max_distance_km.saturating_mul(2);
        self.set_max_distance(f64::from(next)) || mode_changed
    }

    /// Step in to the previous power of two and switch to manual mode.
    pub fn range_down(&mut self) -> bool {
        let mode_changed = self.set_mode(RangeMode::Manual);
        let next = (self.state.max_distance_km / 2).max(1);
        self.set_max_distance(f64::from(next)) || mode_changed
    }

    /// Returns true if the mode changed.
    pub fn set_mode(&mut self, mode: RangeMode) -> bool {
        if self.state.mode == mode {
            return false;
        }
        self.state.mode = mode;
        true
    }

    /// Returns true if the target changed.
    pub fn set_target(&mut self, target: AutoRangeTarget) -> bool {
        if self.state.target == target {
            return false;
        }
        self.state.target = target;
        true
    }

    /// In auto mode, fit the radius to the nearest or farthest distance.
    ///
    /// Manual mode and an empty distance set leave the radius untouched.
    /// Returns true if the radius changed.
    pub fn auto_update<I>(&mut self, distances_km: I) -> bool
    where
        I: IntoIterator<Item = f64>,
    {
        if self.state.mode != RangeMode::Auto {
            return false;
        }
        let finite = distances_km.into_iter().filter(|d| d.is_finite());
        let chosen = match self.state.target {
            AutoRangeTarget::Farthest => finite.reduce(f64::max),
            AutoRangeTarget::Nearest => finite.reduce(f64::min),
        };
        let Some(distance) = chosen else {
            return false;
        };

        let changed = self.set_max_distance(distance);
        if changed {
            info!(
                "Auto range: {:?} track at {distance:.2} km, max distance now {} km",
                self.state.target, self.state.max_distance_km
            );
        }
        changed
    }

    fn rebuild_rings(&mut self) {
        let max = f64::from(self.state.max_distance_km);
        self.state.rings = self
            .divisors
            .iter()
            .map(|&divisor| {
                let distance_km = max / divisor;
                RangeRing {
                    divisor,
                    distance_km,
                    label: ring_label(distance_km),
                }
            })
            .collect();
    }
}

/// Smallest power of two `>= km`, clamped to `1..=MAX_RANGE_KM`.
#[must_use]
pub fn ceil_pow2(km: f64) -> u32 {
    if km.is_nan() || km <= 1.0 {
        return 1;
    }
    if km >= f64::from(MAX_RANGE_KM) {
        return MAX_RANGE_KM;
    }
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "km is within 1..MAX_RANGE_KM here"
    )]
    let whole = km.ceil() as u32;
    whole.next_power_of_two()
}

fn ring_label(distance_km: f64) -> String {
    if distance_km >= 2.0 {
        format!("{}km", distance_km.trunc())
    } else {
        let fixed = format!("{distance_km:.2}");
        let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
        format!("{trimmed}km")
    }
}
