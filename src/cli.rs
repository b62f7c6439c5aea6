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

use std::path::PathBuf;

use clap::{ArgAction, Parser};

/// Radar-style display of the aircraft seen by a local dump1090 receiver.
#[derive(Debug, Clone, Parser)]
#[command(name = "pocket-radar", version, about)]
pub struct Args {
    /// Configuration file; created with defaults if it doesn't exist
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Where exceptional track information goes ('-' means stdout)
    #[arg(short, long, value_name = "PATH")]
    pub excepts_file: Option<String>,

    /// Run in full screen mode
    #[arg(short, long)]
    pub full_screen: bool,

    /// Logging level (error, warn, info, debug, trace)
    #[arg(short = 'L', long, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Log file, created if it doesn't exist
    #[arg(short = 'l', long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Fixed orientation instead of a compass
    #[arg(short, long, value_name = "HEADING,ROLL,PITCH", allow_hyphen_values = true)]
    pub orientation: Option<String>,

    /// Fixed position instead of GPS
    #[arg(short, long, value_name = "LAT,LON", allow_hyphen_values = true)]
    pub position: Option<String>,

    /// More output; repeat for even more
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Directory where dump1090-fa writes its JSON files
    #[arg(value_name = "PATH")]
    pub feed_path: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_command_is_well_formed() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_short_flags() {
        let args = Args::try_parse_from([
            "pocket-radar",
            "-c",
            "/tmp/radar.toml",
            "-L",
            "debug",
            "-l",
            "/tmp/radar.log",
            "-o",
            "-10,0,0",
            "-v",
            "/run/dump1090-fa",
        ])
        .unwrap();

        assert_eq!(args.config, Some(PathBuf::from("/tmp/radar.toml")));
        assert_eq!(args.log_level.as_deref(), Some("debug"));
        assert_eq!(args.log_file, Some(PathBuf::from("/tmp/radar.log")));
        assert_eq!(args.orientation.as_deref(), Some("-10,0,0"));
        assert_eq!(args.verbose, 1);
        assert_eq!(args.feed_path, Some(PathBuf::from("/run/dump1090-fa")));
        assert!(!args.full_screen);
    }
}
