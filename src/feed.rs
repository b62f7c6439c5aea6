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

//! Polls the decoder's JSON output and feeds the radar engine.
//!
//! dump1090 rewrites `aircraft.json` in its output directory about once a
//! second. The poller watches the file's modification time and hands each
//! new document to the engine as one feed cycle.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use log::{debug, info, warn};
use radar_core::{AircraftJsonParser, FeedCycle, FeedSnapshot, ParseError, Protocol, RadarHandle, ReceiverInfo};
use thiserror::Error;
use tokio::fs;
use tokio::time::{self, MissedTickBehavior};

use crate::excepts::ExceptsLog;
use crate::sensors::ViewerSource;

pub const AIRCRAFT_FILE: &str = "aircraft.json";
pub const RECEIVER_FILE: &str = "receiver.json";

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Watches one decoder output directory.
#[derive(Debug)]
pub struct FeedPoller {
    aircraft_path: PathBuf,
    receiver_path: PathBuf,
    interval: Duration,
    verbose: u8,
    parser: AircraftJsonParser,
    last_modified: Option<SystemTime>,
    last_error: Option<String>,
}

impl FeedPoller {
    pub fn new(feed_dir: &Path, interval: Duration, verbose: u8) -> Self {
        Self {
            aircraft_path: feed_dir.join(AIRCRAFT_FILE),
            receiver_path: feed_dir.join(RECEIVER_FILE),
            interval,
            verbose,
            parser: AircraftJsonParser::new(),
            last_modified: None,
            last_error: None,
        }
    }

    /// Read and log the receiver description. Missing or bad files are not fatal.
    pub async fn read_receiver(&self) -> Option<ReceiverInfo> {
        let bytes = match fs::read(&self.receiver_path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("Cannot read {}: {e}", self.receiver_path.display());
                return None;
            }
        };
        match ReceiverInfo::parse(&bytes) {
            Ok(receiver) => {
                info!(
                    "Receiver: version={} refresh={:?} history={:?} location={:?}",
                    receiver.version.as_deref().unwrap_or("unknown"),
                    receiver.refresh_interval(),
                    receiver.history,
                    receiver.position().map(|p| p.to_string()),
                );
                Some(receiver)
            }
            Err(e) => {
                warn!("Bad {}: {e}", self.receiver_path.display());
                None
            }
        }
    }

    /// Read the aircraft document if it changed since the last good read.
    pub async fn poll(&mut self) -> Result<Option<FeedSnapshot>, FeedError> {
        let modified = fs::metadata(&self.aircraft_path)
            .await
            .and_then(|meta| meta.modified())
            .map_err(|source| FeedError::Io {
                path: self.aircraft_path.clone(),
                source,
            })?;
        if self.last_modified == Some(modified) {
            return Ok(None);
        }

        let bytes = fs::read(&self.aircraft_path).await.map_err(|source| FeedError::Io {
            path: self.aircraft_path.clone(),
            source,
        })?;
        let snapshot = self.parser.parse(&bytes)?;
        if snapshot.is_some() {
            self.last_modified = Some(modified);
        }
        Ok(snapshot)
    }

    /// Repeated failures are logged once at warn, then at debug.
    fn report_error(&mut self, err: &FeedError) {
        let message = err.to_string();
        if self.last_error.as_deref() == Some(message.as_str()) {
            debug!("Feed read failed: {message}");
        } else {
            warn!("Feed read failed: {message}");
            self.last_error = Some(message);
        }
    }

    fn log_flights(&self, snapshot: &FeedSnapshot) {
        if self.verbose == 0 {
            return;
        }
        let mut flights: Vec<&str> = snapshot
            .aircraft
            .values()
            .filter_map(|fields| fields.flight.as_deref())
            .collect();
        flights.sort_unstable();
        info!("Flights: {flights:?}");
    }

    /// Poll until the radar's cancellation token fires.
    pub async fn run<W, F>(
        mut self,
        radar: RadarHandle,
        mut viewer: Box<dyn ViewerSource>,
        mut excepts: Option<ExceptsLog<W>>,
        repaint: F,
    ) where
        W: Write,
        F: Fn(),
    {
        info!(
            "Polling {} every {:?}, viewer {}",
            self.aircraft_path.display(),
            self.interval,
            viewer.describe()
        );
        let cancel_token = radar.cancellation_token();
        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                () = cancel_token.cancelled() => {
                    info!("Feed poller stopped");
                    return;
                }
                _ = ticker.tick() => {}
            }

            let snapshot = match self.poll().await {
                Ok(Some(snapshot)) => {
                    self.last_error = None;
                    snapshot
                }
                Ok(None) => continue,
                Err(e) => {
                    self.report_error(&e);
                    continue;
                }
            };

            self.log_flights(&snapshot);
            if !snapshot.unplaced.is_empty() {
                debug!("{} aircraft without a position", snapshot.unplaced.len());
            }
            if let Some(log) = excepts.as_mut() {
                if let Err(e) = log.record(&snapshot) {
                    warn!("Cannot write exceptional vehicles: {e}");
                }
            }

            let Some(viewer_state) = viewer.sample() else {
                warn!("No viewer position, skipping cycle");
                continue;
            };
            let cycle = FeedCycle {
                timestamp: snapshot.timestamp,
                viewer: viewer_state,
                aircraft: snapshot.aircraft,
            };
            match radar.ingest(cycle) {
                Some(report) => debug!(
                    "Cycle: {} added, {} updated, {} removed",
                    report.added.len(),
                    report.updated,
                    report.removed.len()
                ),
                None => {
                    info!("Feed poller stopped");
                    return;
                }
            }
            repaint();
        }
    }
}
