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

use thiserror::Error;

/// Caller errors raised by the radar engine.
///
/// Everything else (malformed fields, stale selections, degenerate geometry)
/// degrades to a default value instead of failing.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RadarError {
    #[error("invalid range request: {0} km (must be greater than zero)")]
    InvalidRange(f64),

    #[error("unknown panel mode: {0}")]
    UnknownPanelMode(String),

    #[error("unknown auto-range target: {0}")]
    UnknownAutoRangeTarget(String),
}
