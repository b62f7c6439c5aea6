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

//! Application configuration management.
//!
//! Persistent settings live in a TOML file managed by `confy`. Command-line
//! options override the file, and the file overrides the built-in defaults.
//! The merged result is a [`Settings`].

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use log::{info, LevelFilter};
use radar_core::{AutoRangeTarget, GeoPoint, Orientation, PanelMode, RadarConfig};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cli::Args;

pub const APP_NAME: &str = "pocket-radar";
const CONFIG_NAME: &str = "config";

/// Where dump1090-fa writes its JSON files on a stock install
pub const DEFAULT_FEED_PATH: &str = "/run/dump1090-fa";

/// Stdout marker for the excepts file
pub const STDOUT_PATH: &str = "-";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid position tuple '{0}', expected 'lat,lon'")]
    InvalidPosition(String),

    #[error("invalid orientation tuple '{0}', expected 'heading[,roll,pitch]'")]
    InvalidOrientation(String),

    #[error("invalid log level '{0}'")]
    InvalidLogLevel(String),

    #[error("configuration file error: {0}")]
    Confy(#[from] confy::ConfyError),
}

/// Application configuration stored in TOML format
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AppConfig {
    /// Configuration schema version for migrations
    #[serde(default = "default_config_version")]
    pub config_version: u32,

    /// Directory holding aircraft.json and receiver.json
    #[serde(default)]
    pub feed_path: Option<PathBuf>,

    /// How often to check aircraft.json for changes
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Log level: error, warn, info, debug or trace
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log to this file instead of stderr
    #[serde(default)]
    pub log_file: Option<PathBuf>,

    /// Exceptional vehicle log; "-" is stdout, empty disables it
    #[serde(default = "default_excepts_file")]
    pub excepts_file: String,

    #[serde(default)]
    pub full_screen: bool,

    #[serde(default = "default_window_width")]
    pub window_width: f32,

    #[serde(default = "default_window_height")]
    pub window_height: f32,

    /// Radar disc diameter in pixels
    #[serde(default = "default_radar_diameter")]
    pub radar_diameter: f32,

    /// Initial range, rounded up to a power of two
    #[serde(default = "default_max_distance_km")]
    pub max_distance_km: f64,

    #[serde(default = "default_ring_divisors")]
    pub ring_divisors: Vec<f64>,

    #[serde(default)]
    pub auto_range_target: AutoRangeTarget,

    #[serde(default)]
    pub default_panel: PanelMode,

    /// Draw a stationary target's repeated positions once
    #[serde(default = "default_true")]
    pub collapse_trails: bool,

    /// Fixed viewer position "lat,lon"
    #[serde(default)]
    pub position: Option<String>,

    /// Fixed viewer orientation "heading,roll,pitch"
    #[serde(default)]
    pub orientation: Option<String>,
}

// Default value functions for serde
fn default_config_version() -> u32 {
    1
}

fn default_poll_interval_ms() -> u64 {
    500
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_excepts_file() -> String {
    STDOUT_PATH.to_string()
}

fn default_window_width() -> f32 {
    480.0
}

fn default_window_height() -> f32 {
    800.0
}

fn default_radar_diameter() -> f32 {
    480.0
}

fn default_max_distance_km() -> f64 {
    radar_core::range::DEFAULT_MAX_DISTANCE_KM
}

fn default_ring_divisors() -> Vec<f64> {
    radar_core::range::DEFAULT_RING_DIVISORS.to_vec()
}

fn default_true() -> bool {
    true
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            config_version: default_config_version(),
            feed_path: None,
            poll_interval_ms: default_poll_interval_ms(),
            log_level: default_log_level(),
            log_file: None,
            excepts_file: default_excepts_file(),
            full_screen: false,
            window_width: default_window_width(),
            window_height: default_window_height(),
            radar_diameter: default_radar_diameter(),
            max_distance_km: default_max_distance_km(),
            ring_divisors: default_ring_divisors(),
            auto_range_target: AutoRangeTarget::default(),
            default_panel: PanelMode::default(),
            collapse_trails: true,
            position: None,
            orientation: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from `path`, or from the per-user default location.
    ///
    /// A missing file is created with default contents.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config: AppConfig = match path {
            Some(path) => confy::load_path(path)?,
            None => confy::load(APP_NAME, CONFIG_NAME)?,
        };
        if config.config_version < default_config_version() {
            info!(
                "Upgrading config file from version {} to {}",
                config.config_version,
                default_config_version()
            );
            config.config_version = default_config_version();
            config.save(path)?;
        }
        Ok(config)
    }

    /// Save configuration to disk
    pub fn save(&self, path: Option<&Path>) -> Result<(), ConfigError> {
        match path {
            Some(path) => confy::store_path(path, self)?,
            None => confy::store(APP_NAME, CONFIG_NAME, self)?,
        }
        Ok(())
    }

    /// Get the config file path for display to user
    pub fn config_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
        match path {
            Some(path) => Ok(path.to_path_buf()),
            None => Ok(confy::get_configuration_file_path(APP_NAME, CONFIG_NAME)?),
        }
    }
}

/// Where exceptional vehicles are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExceptsTarget {
    Stdout,
    File(PathBuf),
}

/// Effective settings after merging command line, config file and defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub feed_path: PathBuf,
    pub poll_interval: Duration,
    pub log_level: LevelFilter,
    pub log_file: Option<PathBuf>,
    pub excepts: Option<ExceptsTarget>,
    pub full_screen: bool,
    pub window_size: [f32; 2],
    pub position: Option<GeoPoint>,
    pub orientation: Option<Orientation>,
    pub verbose: u8,
    pub radar: RadarConfig,
}

impl Settings {
    /// Command line first, then the config file.
    pub fn resolve(args: &Args, config: &AppConfig) -> Result<Self, ConfigError> {
        let log_level = parse_log_level(args.log_level.as_deref().unwrap_or(&config.log_level))?;

        let excepts = match args.excepts_file.as_deref().unwrap_or(&config.excepts_file).trim() {
            "" => None,
            STDOUT_PATH => Some(ExceptsTarget::Stdout),
            path => Some(ExceptsTarget::File(PathBuf::from(path))),
        };

        let position = args
            .position
            .as_deref()
            .or(config.position.as_deref())
            .map(parse_position)
            .transpose()?;
        let orientation = args
            .orientation
            .as_deref()
            .or(config.orientation.as_deref())
            .map(parse_orientation)
            .transpose()?;

        let feed_path = args
            .feed_path
            .clone()
            .or_else(|| config.feed_path.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_FEED_PATH));

        Ok(Self {
            feed_path,
            poll_interval: Duration::from_millis(config.poll_interval_ms.max(50)),
            log_level,
            log_file: args.log_file.clone().or_else(|| config.log_file.clone()),
            excepts,
            full_screen: args.full_screen || config.full_screen,
            window_size: [config.window_width, config.window_height],
            position,
            orientation,
            verbose: args.verbose,
            radar: RadarConfig {
                diameter_px: f64::from(config.radar_diameter),
                initial_max_distance_km: config.max_distance_km,
                ring_divisors: config.ring_divisors.clone(),
                auto_range_target: config.auto_range_target,
                panel: config.default_panel,
                collapse_trails: config.collapse_trails,
            },
        })
    }
}

/// Accepts `log` level names plus the `WARNING`/`CRITICAL` spellings.
pub fn parse_log_level(level: &str) -> Result<LevelFilter, ConfigError> {
    match level.trim().to_ascii_lowercase().as_str() {
        "warning" => Ok(LevelFilter::Warn),
        "critical" | "fatal" => Ok(LevelFilter::Error),
        other => LevelFilter::from_str(other)
            .ok()
            .ok_or_else(|| ConfigError::InvalidLogLevel(level.to_string())),
    }
}

fn parse_floats(tuple: &str) -> Option<Vec<f64>> {
    tuple
        .split(',')
        .map(|part| part.trim().parse::<f64>().ok().filter(|v| v.is_finite()))
        .collect()
}

/// Parse `"lat,lon"` in decimal degrees.
pub fn parse_position(tuple: &str) -> Result<GeoPoint, ConfigError> {
    let invalid = || ConfigError::InvalidPosition(tuple.to_string());
    match parse_floats(tuple).as_deref() {
        Some(&[lat, lon]) => Some(GeoPoint::new(lat, lon)).filter(GeoPoint::is_valid).ok_or_else(invalid),
        _ => Err(invalid()),
    }
}

/// Parse `"heading"` or `"heading,roll,pitch"` in degrees.
pub fn parse_orientation(tuple: &str) -> Result<Orientation, ConfigError> {
    match parse_floats(tuple).as_deref() {
        Some(&[heading]) => Ok(Orientation {
            heading_deg: heading,
            roll_deg: None,
            pitch_deg: None,
        }),
        Some(&[heading, roll, pitch]) => Ok(Orientation {
            heading_deg: heading,
            roll_deg: Some(roll),
            pitch_deg: Some(pitch),
        }),
        _ => Err(ConfigError::InvalidOrientation(tuple.to_string())),
    }
}
