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

//! Interactive display state: trail depth, info panel and selection.
//!
//! State only changes in response to discrete input intents, never because
//! time passed or tracks moved. Every setter reports whether it changed
//! anything; a change raises the dirty flag so dependent overlays (control
//! highlights) get recomputed before the next paint. Setting a field to the
//! value it already has is a no-op.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::RadarError;
use crate::range::{AutoRangeTarget, RangeMode, RangeState};
use crate::registry::TrackRegistry;
use crate::track::Track;
use crate::transform::PixelPoint;

/// How many past positions to draw behind each track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrailSetting {
    #[default]
    Off,
    All,
    /// The most recent `n` positions, `n > 0`.
    Last(u32),
}

impl TrailSetting {
    /// From the signed form: 0 is off, negative is all, `n > 0` is last `n`.
    #[must_use]
    pub fn from_signed(n: i64) -> Self {
        match n {
            0 => Self::Off,
            n if n < 0 => Self::All,
            n => Self::Last(u32::try_from(n).unwrap_or(u32::MAX)),
        }
    }

    #[must_use]
    pub fn to_signed(self) -> i64 {
        match self {
            Self::Off => 0,
            Self::All => -1,
            Self::Last(n) => i64::from(n),
        }
    }

    /// History depth for [`Track::history`]: `None` means unbounded.
    #[must_use]
    pub fn depth(self) -> Option<usize> {
        match self {
            Self::Off => Some(0),
            Self::All => None,
            Self::Last(n) => Some(usize::try_from(n).unwrap_or(usize::MAX)),
        }
    }

    #[must_use]
    pub fn more(self) -> Self {
        match self {
            Self::Off | Self::Last(0) => Self::Last(1),
            Self::Last(n) => Self::Last(n.saturating_add(1)),
            Self::All => Self::Off,
        }
    }

    #[must_use]
    pub fn fewer(self) -> Self {
        match self {
            Self::Last(0 | 1) => Self::Off,
            Self::Last(n) => Self::Last(n - 1),
            Self::Off | Self::All => Self::All,
        }
    }
}

/// Which info panel is shown under the radar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PanelMode {
    #[default]
    Summary,
    Details,
    Info,
}

impl FromStr for PanelMode {
    type Err = RadarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "summary" => Ok(Self::Summary),
            "details" => Ok(Self::Details),
            "info" => Ok(Self::Info),
            _ => Err(RadarError::UnknownPanelMode(s.to_string())),
        }
    }
}

/// A discrete user input, queued by the input side and applied between frames.
#[derive(Debug, Clone, PartialEq)]
pub enum DisplayIntent {
    RangeAuto,
    RangeManual,
    RangeUp,
    RangeDown,
    SetRange(f64),
    TargetNearest,
    TargetFarthest,
    TrailsAll,
    TrailsNone,
    TrailsMore,
    TrailsFewer,
    Panel(PanelMode),
    /// Pointer press on the radar surface.
    SelectAt(PixelPoint),
    ClearSelection,
    LogStats,
    ResetStats,
    Quit,
}

/// Mutable UI state. The selection is an id, resolved against the registry
/// whenever it is used.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DisplayState {
    trail: TrailSetting,
    panel: PanelMode,
    selected: Option<String>,
    dirty: bool,
}

impl DisplayState {
    /// Zero trail, summary panel, no selection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_panel(mut self, panel: PanelMode) -> Self {
        self.panel = panel;
        self
    }

    #[must_use]
    pub fn trail(&self) -> TrailSetting {
        self.trail
    }

    #[must_use]
    pub fn panel(&self) -> PanelMode {
        self.panel
    }

    /// The stored selection id, which may no longer exist.
    #[must_use]
    pub fn selected_id(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn set_trail(&mut self, trail: TrailSetting) -> bool {
        if self.trail == trail {
            return false;
        }
        self.trail = trail;
        self.mark_dirty();
        true
    }

    pub fn trails_more(&mut self) -> bool {
        self.set_trail(self.trail.more())
    }

    pub fn trails_fewer(&mut self) -> bool {
        self.set_trail(self.trail.fewer())
    }

    pub fn set_panel(&mut self, panel: PanelMode) -> bool {
        if self.panel == panel {
            return false;
        }
        self.panel = panel;
        self.mark_dirty();
        true
    }

    pub fn select(&mut self, id: Option<String>) -> bool {
        if self.selected == id {
            return false;
        }
        self.selected = id;
        self.mark_dirty();
        true
    }

    /// The selected track if it is still tracked; a vanished id reads as no
    /// selection.
    #[must_use]
    pub fn resolve_selection<'a>(&self, registry: &'a TrackRegistry) -> Option<&'a Track> {
        self.selected.as_deref().and_then(|id| registry.get(id))
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Read and clear the dirty flag.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }
}

/// Which control buttons are drawn in their pressed colour.
///
/// Always derived from the current state, never stored on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[allow(clippy::struct_excessive_bools, reason = "one flag per button")]
pub struct ControlHighlights {
    pub range_auto: bool,
    pub range_manual: bool,
    pub target_nearest: bool,
    pub target_farthest: bool,
    pub trails_all: bool,
    pub trails_none: bool,
    pub panel_summary: bool,
    pub panel_details: bool,
    pub panel_info: bool,
}

impl ControlHighlights {
    #[must_use]
    pub fn derive(display: &DisplayState, range: &RangeState) -> Self {
        Self {
            range_auto: range.mode == RangeMode::Auto,
            range_manual: range.mode == RangeMode::Manual,
            target_nearest: range.target == AutoRangeTarget::Nearest,
            target_farthest: range.target == AutoRangeTarget::Farthest,
            trails_all: display.trail == TrailSetting::All,
            trails_none: display.trail == TrailSetting::Off,
            panel_summary: display.panel == PanelMode::Summary,
            panel_details: display.panel == PanelMode::Details,
            panel_info: display.panel == PanelMode::Info,
        }
    }
}
