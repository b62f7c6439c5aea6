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

//! ADS-B emitter categories.
//!
//! One closed enumeration shared by the track model, the renderer and the
//! statistics histogram.

use serde::{Deserialize, Serialize};

/// Category set letter (the first character of the emitter category code).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CategorySet {
    A,
    B,
    C,
    D,
    E,
}

impl CategorySet {
    pub const ALL: [Self; 5] = [Self::A, Self::B, Self::C, Self::D, Self::E];

    fn from_char(c: char) -> Option<Self> {
        match c {
            'A' => Some(Self::A),
            'B' => Some(Self::B),
            'C' => Some(Self::C),
            'D' => Some(Self::D),
            'E' => Some(Self::E),
            _ => None,
        }
    }

    #[must_use]
    pub fn letter(self) -> char {
        match self {
            Self::A => 'A',
            Self::B => 'B',
            Self::C => 'C',
            Self::D => 'D',
            Self::E => 'E',
        }
    }
}

/// Emitter category: a set letter plus a subtype digit `0..=7`, or unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub enum EmitterCategory {
    Coded { set: CategorySet, subtype: u8 },
    #[default]
    Unknown,
}

impl EmitterCategory {
    /// Parse a two-character category code such as `"A3"`.
    ///
    /// Anything that is not a known set letter followed by a digit `0..=7`
    /// is `Unknown`.
    #[must_use]
    pub fn parse(code: &str) -> Self {
        let mut chars = code.trim().chars();
        let (Some(letter), Some(digit), None) = (chars.next(), chars.next(), chars.next()) else {
            return Self::Unknown;
        };
        let Some(set) = CategorySet::from_char(letter.to_ascii_uppercase()) else {
            return Self::Unknown;
        };
        match digit.to_digit(10) {
            #[allow(clippy::cast_possible_truncation, reason = "digit is at most 7")]
            Some(d) if d <= 7 => Self::Coded {
                set,
                subtype: d as u8,
            },
            _ => Self::Unknown,
        }
    }

    /// Every coded category followed by `Unknown`.
    pub fn all() -> impl Iterator<Item = Self> {
        CategorySet::ALL
            .into_iter()
            .flat_map(|set| (0..8).map(move |subtype| Self::Coded { set, subtype }))
            .chain(std::iter::once(Self::Unknown))
    }

    /// Two-character code, or `"?"` when unknown.
    #[must_use]
    pub fn code(&self) -> String {
        match self {
            Self::Coded { set, subtype } => format!("{}{}", set.letter(), subtype),
            Self::Unknown => "?".to_string(),
        }
    }

    #[must_use]
    pub fn set(&self) -> Option<CategorySet> {
        match self {
            Self::Coded { set, .. } => Some(*set),
            Self::Unknown => None,
        }
    }

    /// Fixed-wing categories whose symbol is drawn pointing along the track.
    #[must_use]
    pub fn rotates_with_heading(&self) -> bool {
        matches!(
            self,
            Self::Coded {
                set: CategorySet::A,
                subtype: 1..=6
            }
        )
    }

    #[must_use]
    pub fn description(&self) -> &'static str {
        let Self::Coded { set, subtype } = self else {
            return "Unknown";
        };
        match (set, subtype) {
            (CategorySet::A, 1) => "Light (< 15500 lbs)",
            (CategorySet::A, 2) => "Small (15500 to 75000 lbs)",
            (CategorySet::A, 3) => "Large (75000 to 300000 lbs)",
            (CategorySet::A, 4) => "High vortex large",
            (CategorySet::A, 5) => "Heavy (> 300000 lbs)",
            (CategorySet::A, 6) => "High performance",
            (CategorySet::A, 7) => "Rotorcraft",
            (CategorySet::B, 1) => "Glider / sailplane",
            (CategorySet::B, 2) => "Lighter-than-air",
            (CategorySet::B, 3) => "Parachutist / skydiver",
            (CategorySet::B, 4) => "Ultralight / hang-glider / paraglider",
            (CategorySet::B, 6) => "Unmanned aerial vehicle",
            (CategorySet::B, 7) => "Space / trans-atmospheric vehicle",
            (CategorySet::C, 1) => "Surface vehicle - emergency",
            (CategorySet::C, 2) => "Surface vehicle - service",
            (CategorySet::C, 3) => "Point obstacle",
            (CategorySet::C, 4) => "Cluster obstacle",
            (CategorySet::C, 5) => "Line obstacle",
            (CategorySet::B | CategorySet::C, 5..=7) => "Reserved",
            (_, 0) => "No category information",
            _ => "Unassigned",
        }
    }
}

impl std::fmt::Display for EmitterCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_codes() {
        assert_eq!(
            EmitterCategory::parse("A3"),
            EmitterCategory::Coded {
                set: CategorySet::A,
                subtype: 3
            }
        );
        assert_eq!(EmitterCategory::parse("e0").code(), "E0");
        assert_eq!(EmitterCategory::parse(" B7 ").code(), "B7");
    }

    #[test]
    fn test_parse_rejects_everything_else() {
        for code in ["", "?", "A", "A8", "F1", "AA", "A12", "7A"] {
            assert_eq!(EmitterCategory::parse(code), EmitterCategory::Unknown, "{code}");
        }
    }

    #[test]
    fn test_all_has_forty_one_entries() {
        let all: Vec<_> = EmitterCategory::all().collect();
        assert_eq!(all.len(), 41);
        assert_eq!(all.first().map(EmitterCategory::code).as_deref(), Some("A0"));
        assert_eq!(all.last(), Some(&EmitterCategory::Unknown));
    }

    #[test]
    fn test_rotating_symbols() {
        assert!(EmitterCategory::parse("A1").rotates_with_heading());
        assert!(EmitterCategory::parse("A6").rotates_with_heading());
        assert!(!EmitterCategory::parse("A0").rotates_with_heading());
        assert!(!EmitterCategory::parse("A7").rotates_with_heading());
        assert!(!EmitterCategory::Unknown.rotates_with_heading());
    }

    #[test]
    fn test_descriptions() {
        assert_eq!(EmitterCategory::parse("A7").description(), "Rotorcraft");
        assert_eq!(EmitterCategory::parse("B5").description(), "Reserved");
        assert_eq!(EmitterCategory::parse("C0").description(), "No category information");
        assert_eq!(EmitterCategory::Unknown.description(), "Unknown");
    }
}
